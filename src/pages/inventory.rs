//! Product catalog screen

use async_trait::async_trait;
use tracing::{debug, info};

use super::{cart_badge_count, Screen};
use crate::driver::{xpath_literal, Locator};
use crate::session::{Interaction, DEFAULT_MAX_SWIPES};
use crate::Result;

pub const PRODUCT_IMAGE: Locator = Locator::id(app_id!("productIV"));
pub const ADD_TO_CART_BUTTON: Locator = Locator::id(app_id!("cartBt"));
pub const CART_ICON: Locator = Locator::id(app_id!("cartIV"));
pub const PRODUCT_TITLE: Locator = Locator::id(app_id!("titleTV"));

pub const ADD_TO_CART_LABEL: &str = "ADD TO CART";
pub const REMOVE_LABEL: &str = "REMOVE";

/// Title of the product named `name`
pub fn product_title(name: &str) -> Locator {
    Locator::xpath(format!("//android.widget.TextView[@text={}]", xpath_literal(name)))
}

/// Row button labelled `label` next to the product named `name`
pub fn product_action(name: &str, label: &str) -> Locator {
    Locator::xpath(format!(
        "//android.widget.TextView[@text={}]/following-sibling::android.widget.TextView[@text={}]",
        xpath_literal(name),
        xpath_literal(label)
    ))
}

#[derive(Debug, Clone)]
pub struct InventoryPage {
    ui: Interaction,
}

impl InventoryPage {
    pub fn new(ui: Interaction) -> Self {
        Self { ui }
    }

    pub async fn click_product_image(&self) -> Result<()> {
        info!("Opening first product");
        self.ui.click(&PRODUCT_IMAGE).await
    }

    pub async fn click_add_to_cart(&self) -> Result<()> {
        info!("Clicking add to cart");
        self.ui.click(&ADD_TO_CART_BUTTON).await
    }

    pub async fn click_cart_icon(&self) -> Result<()> {
        info!("Opening cart");
        self.ui.click(&CART_ICON).await
    }

    /// Names of the products currently on screen
    pub async fn product_names(&self) -> Result<Vec<String>> {
        self.ui.texts_of(&PRODUCT_TITLE).await
    }

    pub async fn is_product_present(&self, name: &str) -> Result<bool> {
        let present = self.product_names().await?.iter().any(|n| n == name);
        debug!("Product '{}' present: {}", name, present);
        Ok(present)
    }

    pub async fn add_product_to_cart(&self, name: &str) -> Result<()> {
        info!("Adding to cart: {}", name);
        self.scroll_to_product(name).await?;
        self.ui.click(&product_action(name, ADD_TO_CART_LABEL)).await
    }

    pub async fn remove_product_from_cart(&self, name: &str) -> Result<()> {
        info!("Removing from cart: {}", name);
        self.scroll_to_product(name).await?;
        self.ui.click(&product_action(name, REMOVE_LABEL)).await
    }

    /// The product's row shows REMOVE
    pub async fn is_product_in_cart(&self, name: &str) -> bool {
        self.ui.is_visible(&product_action(name, REMOVE_LABEL)).await
    }

    /// The product's row shows ADD TO CART
    pub async fn can_add_product_to_cart(&self, name: &str) -> bool {
        self.ui.is_visible(&product_action(name, ADD_TO_CART_LABEL)).await
    }

    pub async fn total_products(&self) -> Result<usize> {
        Ok(self.product_names().await?.len())
    }

    /// Count on the cart badge; 0 when absent or unreadable
    pub async fn cart_items_count(&self) -> usize {
        cart_badge_count(&self.ui).await
    }

    pub async fn scroll_to_product(&self, name: &str) -> Result<()> {
        self.ui.scroll_to(&product_title(name), DEFAULT_MAX_SWIPES).await?;
        Ok(())
    }

    pub async fn scroll_down_products(&self) -> Result<()> {
        self.ui.scroll_down().await
    }

    pub async fn scroll_up_products(&self) -> Result<()> {
        self.ui.scroll_up().await
    }

    pub async fn products_available(&self) -> Result<bool> {
        Ok(self.total_products().await? > 0)
    }
}

#[async_trait]
impl Screen for InventoryPage {
    fn name(&self) -> &'static str {
        "Inventory"
    }

    fn interaction(&self) -> &Interaction {
        &self.ui
    }

    fn ready_markers(&self) -> Vec<Locator> {
        vec![PRODUCT_IMAGE, CART_ICON]
    }
}
