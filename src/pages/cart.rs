//! Cart screen

use async_trait::async_trait;
use tracing::info;

use super::{cart_badge_count, Screen};
use crate::driver::{xpath_literal, Locator};
use crate::session::Interaction;
use crate::Result;

pub const REMOVE_BUTTON: Locator = Locator::id(app_id!("removeBt"));
pub const CHECKOUT_BUTTON: Locator = Locator::id(app_id!("cartBt"));
pub const ITEM_TITLE: Locator = Locator::id(app_id!("titleTV"));

/// Remove button in the row of the product named `name`
pub fn remove_button_for(name: &str) -> Locator {
    Locator::xpath(format!(
        "//android.widget.TextView[@text={}]/following-sibling::*[@resource-id='{}']",
        xpath_literal(name),
        REMOVE_BUTTON.value()
    ))
}

#[derive(Debug, Clone)]
pub struct CartPage {
    ui: Interaction,
}

impl CartPage {
    pub fn new(ui: Interaction) -> Self {
        Self { ui }
    }

    /// Remove the first item
    pub async fn click_remove(&self) -> Result<()> {
        info!("Clicking remove");
        self.ui.click(&REMOVE_BUTTON).await
    }

    pub async fn click_checkout(&self) -> Result<()> {
        info!("Proceeding to checkout");
        self.ui.click(&CHECKOUT_BUTTON).await
    }

    pub async fn is_remove_visible(&self) -> bool {
        self.ui.is_visible(&REMOVE_BUTTON).await
    }

    pub async fn is_checkout_enabled(&self) -> bool {
        self.ui.is_enabled(&CHECKOUT_BUTTON).await
    }

    /// Product names listed in the cart
    pub async fn cart_items(&self) -> Result<Vec<String>> {
        self.ui.texts_of(&ITEM_TITLE).await
    }

    pub async fn remove_product(&self, name: &str) -> Result<()> {
        info!("Removing {} from cart", name);
        self.ui.click(&remove_button_for(name)).await
    }

    pub async fn is_product_in_cart(&self, name: &str) -> Result<bool> {
        Ok(self.cart_items().await?.iter().any(|item| item == name))
    }

    /// Count on the cart badge; 0 when the cart is empty
    pub async fn cart_items_count(&self) -> usize {
        cart_badge_count(&self.ui).await
    }
}

#[async_trait]
impl Screen for CartPage {
    fn name(&self) -> &'static str {
        "Cart"
    }

    fn interaction(&self) -> &Interaction {
        &self.ui
    }

    fn ready_markers(&self) -> Vec<Locator> {
        vec![REMOVE_BUTTON, CHECKOUT_BUTTON]
    }
}
