//! Error message steps, checked on whichever screen the scenario submitted

use anyhow::ensure;
use cucumber::then;

use crate::bdd::world::{ErrorScreen, ShopWorld};

async fn error_message(world: &ShopWorld) -> anyhow::Result<(bool, String)> {
    let pages = world.pages()?;
    Ok(match world.error_screen {
        ErrorScreen::Login => (
            pages.login.is_error_displayed().await,
            pages.login.error_text().await,
        ),
        ErrorScreen::Checkout => (
            pages.checkout.is_error_displayed().await,
            pages.checkout.error_text().await,
        ),
    })
}

#[then(expr = "debería aparecer un mensaje de error")]
async fn error_is_shown(world: &mut ShopWorld) -> anyhow::Result<()> {
    let (displayed, text) = error_message(world).await?;
    world
        .record(format!("Mensaje de error visible: {}, Texto: {}", displayed, text))
        .await;
    ensure!(displayed, "No error message on the {:?} screen", world.error_screen);
    Ok(())
}

#[then(expr = "el mensaje debería contener {string}")]
async fn message_contains(world: &mut ShopWorld, expected: String) -> anyhow::Result<()> {
    let (_, actual) = error_message(world).await?;
    world
        .record(format!("Texto esperado: {}, Mensaje actual: {}", expected, actual))
        .await;
    ensure!(
        actual.contains(&expected),
        "Error message '{}' does not contain '{}'",
        actual,
        expected
    );
    Ok(())
}
