//! # Page objects
//!
//! One type per app screen: a locator table plus semantic actions and
//! queries built on [`Interaction`].
//!
//! ## Module structure
//! - `login`: credentials form and side menu
//! - `inventory`: product catalog and cart badge
//! - `cart`: cart contents and checkout entry
//! - `checkout`: shipping, payment and confirmation screens

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::driver::Locator;
use crate::session::{Interaction, Presence};
use crate::Result;

/// Full Android resource id for a short id
macro_rules! app_id {
    ($id:literal) => {
        concat!("com.saucelabs.mydemoapp.android:id/", $id)
    };
}

pub mod login;
pub mod inventory;
pub mod cart;
pub mod checkout;


pub use login::LoginPage;
pub use inventory::InventoryPage;
pub use cart::CartPage;
pub use checkout::{CheckoutPage, PaymentCard, ShippingAddress};

/// Cart badge shown in the header of every screen
pub const CART_BADGE: Locator = Locator::id(app_id!("cartTV"));

/// A screen of the app
#[async_trait]
pub trait Screen: Send + Sync {
    /// Screen name used in logs
    fn name(&self) -> &'static str;

    fn interaction(&self) -> &Interaction;

    /// Elements that must all be visible for the screen to count as loaded
    fn ready_markers(&self) -> Vec<Locator>;

    /// All ready markers are visible right now
    async fn is_loaded(&self) -> bool {
        for marker in self.ready_markers() {
            if !self.interaction().is_visible(&marker).await {
                debug!("{} not loaded: {} not visible", self.name(), marker);
                return false;
            }
        }
        true
    }

    /// Wait for every ready marker in turn
    async fn wait_until_loaded(&self) -> Result<()> {
        for marker in self.ready_markers() {
            self.interaction().wait_for_visible(&marker).await?;
        }
        info!("{} loaded", self.name());
        Ok(())
    }
}

/// Number shown on the cart badge; no badge means an empty cart
pub(crate) async fn cart_badge_count(ui: &Interaction) -> usize {
    let Presence::Present(badge) = ui.probe(&CART_BADGE).await else {
        return 0;
    };

    match ui.driver().text(&badge).await {
        Ok(text) => text.trim().parse().unwrap_or_else(|_| {
            warn!("Could not parse cart badge '{}'", text);
            0
        }),
        Err(e) => {
            warn!("Could not read cart badge: {}", e);
            0
        }
    }
}

/// Every page, sharing one interaction object
#[derive(Debug, Clone)]
pub struct Pages {
    pub login: LoginPage,
    pub inventory: InventoryPage,
    pub cart: CartPage,
    pub checkout: CheckoutPage,
}

impl Pages {
    pub fn new(ui: Interaction) -> Self {
        Self {
            login: LoginPage::new(ui.clone()),
            inventory: InventoryPage::new(ui.clone()),
            cart: CartPage::new(ui.clone()),
            checkout: CheckoutPage::new(ui),
        }
    }
}
