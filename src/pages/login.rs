//! Login screen

use async_trait::async_trait;
use tracing::info;

use super::Screen;
use crate::driver::{xpath_literal, Locator};
use crate::session::{Interaction, Presence};
use crate::Result;

pub const USERNAME: Locator = Locator::id(app_id!("nameET"));
pub const PASSWORD: Locator = Locator::id(app_id!("passwordET"));
pub const LOGIN_BUTTON: Locator = Locator::id(app_id!("loginBtn"));
pub const ERROR_MESSAGE: Locator = Locator::id(app_id!("errorTV"));
pub const MENU_BUTTON: Locator = Locator::id(app_id!("menuIV"));
pub const MENU_ITEM: Locator = Locator::id(app_id!("itemTV"));

/// Side-menu entry leading to the login screen
const LOGIN_MENU_LABEL: &str = "Log In";

#[derive(Debug, Clone)]
pub struct LoginPage {
    ui: Interaction,
}

impl LoginPage {
    pub fn new(ui: Interaction) -> Self {
        Self { ui }
    }

    pub async fn enter_username(&self, username: &str) -> Result<()> {
        info!("Entering username: {}", username);
        self.ui.type_into(&USERNAME, username).await
    }

    pub async fn enter_password(&self, password: &str) -> Result<()> {
        info!("Entering password");
        self.ui.type_into(&PASSWORD, password).await
    }

    pub async fn click_login(&self) -> Result<()> {
        info!("Clicking login button");
        self.ui.click(&LOGIN_BUTTON).await
    }

    pub async fn perform_login(&self, username: &str, password: &str) -> Result<()> {
        info!("Logging in as {}", username);
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_login().await
    }

    pub async fn clear_username(&self) -> Result<()> {
        self.ui.clear(&USERNAME).await
    }

    pub async fn clear_password(&self) -> Result<()> {
        self.ui.clear(&PASSWORD).await
    }

    /// Open the side menu and choose "Log In"
    pub async fn open_from_menu(&self) -> Result<()> {
        info!("Opening login screen from the menu");
        self.ui.click(&MENU_BUTTON).await?;
        let item = Locator::xpath(format!(
            "//*[@resource-id='{}' and @text={}]",
            MENU_ITEM.value(),
            xpath_literal(LOGIN_MENU_LABEL)
        ));
        self.ui.click(&item).await
    }

    pub async fn is_error_displayed(&self) -> bool {
        self.ui.is_visible(&ERROR_MESSAGE).await
    }

    /// Error label text, empty when no error is shown
    pub async fn error_text(&self) -> String {
        match self.ui.probe(&ERROR_MESSAGE).await {
            Presence::Present(label) => self.ui.driver().text(&label).await.unwrap_or_default(),
            Presence::Absent => String::new(),
        }
    }

    pub async fn error_contains(&self, expected: &str) -> bool {
        self.error_text().await.contains(expected)
    }

    pub async fn is_username_enabled(&self) -> bool {
        self.ui.is_enabled(&USERNAME).await
    }

    pub async fn is_password_enabled(&self) -> bool {
        self.ui.is_enabled(&PASSWORD).await
    }

    pub async fn is_login_enabled(&self) -> bool {
        self.ui.is_enabled(&LOGIN_BUTTON).await
    }

    pub async fn username_text(&self) -> Result<String> {
        self.ui.read_text(&USERNAME).await
    }

    pub async fn password_text(&self) -> Result<String> {
        self.ui.read_text(&PASSWORD).await
    }

    /// Both credential fields are empty
    pub async fn fields_empty(&self) -> Result<bool> {
        Ok(self.username_text().await?.is_empty() && self.password_text().await?.is_empty())
    }
}

#[async_trait]
impl Screen for LoginPage {
    fn name(&self) -> &'static str {
        "Login"
    }

    fn interaction(&self) -> &Interaction {
        &self.ui
    }

    fn ready_markers(&self) -> Vec<Locator> {
        vec![USERNAME, PASSWORD, LOGIN_BUTTON]
    }
}
