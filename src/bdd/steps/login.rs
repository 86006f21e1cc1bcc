use anyhow::ensure;
use cucumber::{given, then, when};
use tracing::info;

use crate::bdd::world::{ErrorScreen, ShopWorld};
use crate::pages::Screen;

#[given(expr = "que el usuario abre la aplicación Sauce Demo")]
async fn app_is_open(world: &mut ShopWorld) -> anyhow::Result<()> {
    // The session launches the app
    world.pages()?;
    ensure!(world.is_driver_active(), "Driver session is not active");
    world.record("Aplicación Sauce Demo abierta").await;
    Ok(())
}

#[given(expr = "está en la pantalla de login")]
async fn on_login_screen(world: &mut ShopWorld) -> anyhow::Result<()> {
    let login = &world.pages()?.login;
    if !login.is_loaded().await {
        info!("Login screen not shown, opening it from the menu");
        login.open_from_menu().await?;
    }
    login.wait_until_loaded().await?;
    world.record("Pantalla de login cargada").await;
    Ok(())
}

#[when(expr = "el usuario ingresa credenciales válidas")]
async fn enter_valid_credentials(world: &mut ShopWorld) -> anyhow::Result<()> {
    let journey = world.journey().clone();
    let login = &world.pages()?.login;
    login.enter_username(&journey.valid_username).await?;
    login.enter_password(&journey.valid_password).await?;
    world.error_screen = ErrorScreen::Login;
    world
        .record(format!("Credenciales válidas ingresadas: {}", journey.valid_username))
        .await;
    Ok(())
}

#[when(expr = "el usuario ingresa credenciales inválidas")]
async fn enter_invalid_credentials(world: &mut ShopWorld) -> anyhow::Result<()> {
    let journey = world.journey().clone();
    let login = &world.pages()?.login;
    login.enter_username(&journey.invalid_username).await?;
    login.enter_password(&journey.invalid_password).await?;
    world.error_screen = ErrorScreen::Login;
    world.record("Credenciales inválidas ingresadas").await;
    Ok(())
}

#[when(expr = "presiona el botón de login")]
async fn press_login(world: &mut ShopWorld) -> anyhow::Result<()> {
    world.pages()?.login.click_login().await?;
    world.record("Botón de login presionado").await;
    Ok(())
}

#[when(expr = "el usuario realiza login exitoso")]
async fn successful_login(world: &mut ShopWorld) -> anyhow::Result<()> {
    let journey = world.journey().clone();
    world
        .pages()?
        .login
        .perform_login(&journey.valid_username, &journey.valid_password)
        .await?;
    world.error_screen = ErrorScreen::Login;
    world.record("Login exitoso con credenciales válidas").await;
    Ok(())
}

#[then(expr = "el usuario debería permanecer en la pantalla de login")]
async fn stays_on_login(world: &mut ShopWorld) -> anyhow::Result<()> {
    let loaded = world.pages()?.login.is_loaded().await;
    world.record(format!("Pantalla de login aún cargada: {}", loaded)).await;
    ensure!(loaded, "User left the login screen");
    Ok(())
}
