use anyhow::{bail, ensure};
use cucumber::{then, when};

use super::buttons;
use crate::bdd::world::{ErrorScreen, ShopWorld};
use crate::pages::Screen;

#[then(expr = "debería ser redirigido a la página de información de checkout")]
async fn redirected_to_checkout(world: &mut ShopWorld) -> anyhow::Result<()> {
    world.pages()?.checkout.wait_until_loaded().await?;
    world.record("Redirección a la página de checkout").await;
    Ok(())
}

#[then(expr = "debería ver el título {string}")]
async fn sees_title(world: &mut ShopWorld, expected: String) -> anyhow::Result<()> {
    let checkout = &world.pages()?.checkout;
    ensure!(checkout.is_title_visible().await, "Checkout title is not shown");

    let actual = checkout.title_text().await?;
    world
        .record(format!("Título esperado: {}, Título actual: {}", expected, actual))
        .await;
    ensure!(
        actual.trim().eq_ignore_ascii_case(expected.trim()),
        "Title is '{}', expected '{}'",
        actual,
        expected
    );
    Ok(())
}

#[when(expr = "el usuario presiona el botón {string} sin ingresar información")]
async fn continue_without_data(world: &mut ShopWorld, label: String) -> anyhow::Result<()> {
    if label != buttons::CONTINUE {
        bail!("Unknown checkout button '{}'", label);
    }

    let checkout = world.pages()?.checkout.clone();
    ensure!(
        checkout.fields_empty().await?,
        "Shipping form is not empty before continuing"
    );
    checkout.perform_checkout_without_data().await?;
    world.error_screen = ErrorScreen::Checkout;
    world
        .record(format!("Botón {} presionado sin ingresar información", label))
        .await;
    Ok(())
}

#[then(expr = "el caso debería fallir si el mensaje de error no existe")]
async fn fail_without_error_message(world: &mut ShopWorld) -> anyhow::Result<()> {
    let expected = world.journey().checkout_error.clone();
    let result = world
        .pages()?
        .checkout
        .validate_error_message_exists(&expected)
        .await;
    world
        .record(format!("Validación del mensaje de error: {}", result.is_ok()))
        .await;
    result?;
    Ok(())
}
