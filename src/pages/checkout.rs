//! Checkout screens: shipping address, payment, review and confirmation

use async_trait::async_trait;
use tracing::{error, info};

use super::Screen;
use crate::driver::Locator;
use crate::session::{Interaction, Presence};
use crate::{Error, Result};

pub const TITLE: Locator = Locator::id(app_id!("checkoutTitleTV"));
pub const FULL_NAME: Locator = Locator::id(app_id!("fullNameET"));
pub const FULL_NAME_ERROR: Locator = Locator::id(app_id!("fullNameErrorTV"));
pub const ADDRESS1: Locator = Locator::id(app_id!("address1ET"));
pub const ADDRESS2: Locator = Locator::id(app_id!("address2ET"));
pub const CITY: Locator = Locator::id(app_id!("cityET"));
pub const ZIP_CODE: Locator = Locator::id(app_id!("zipET"));
pub const COUNTRY: Locator = Locator::id(app_id!("countryET"));
/// Submit button of every checkout step (To Payment / Review Order / Place Order)
pub const PAYMENT_BUTTON: Locator = Locator::id(app_id!("paymentBtn"));
pub const CARD_HOLDER_NAME: Locator = Locator::id(app_id!("nameET"));
pub const CARD_NUMBER: Locator = Locator::id(app_id!("cardNumberET"));
pub const EXPIRATION_DATE: Locator = Locator::id(app_id!("expirationDateET"));
pub const SECURITY_CODE: Locator = Locator::id(app_id!("securityCodeET"));
pub const CHECKOUT_COMPLETE: Locator = Locator::id(app_id!("completeTV"));
pub const CONTINUE_SHOPPING: Locator = Locator::id(app_id!("shoopingBt"));

const SHIPPING_FIELDS: [Locator; 6] = [FULL_NAME, ADDRESS1, ADDRESS2, CITY, ZIP_CODE, COUNTRY];

/// Shipping address form values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingAddress {
    pub full_name: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

/// Payment form values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentCard {
    pub holder_name: String,
    pub number: String,
    pub expiration: String,
    pub security_code: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutPage {
    ui: Interaction,
}

impl CheckoutPage {
    pub fn new(ui: Interaction) -> Self {
        Self { ui }
    }

    pub async fn enter_full_name(&self, value: &str) -> Result<()> {
        self.ui.type_into(&FULL_NAME, value).await
    }

    pub async fn enter_address1(&self, value: &str) -> Result<()> {
        self.ui.type_into(&ADDRESS1, value).await
    }

    pub async fn enter_address2(&self, value: &str) -> Result<()> {
        self.ui.type_into(&ADDRESS2, value).await
    }

    pub async fn enter_city(&self, value: &str) -> Result<()> {
        self.ui.type_into(&CITY, value).await
    }

    pub async fn enter_zip_code(&self, value: &str) -> Result<()> {
        self.ui.type_into(&ZIP_CODE, value).await
    }

    pub async fn enter_country(&self, value: &str) -> Result<()> {
        self.ui.type_into(&COUNTRY, value).await
    }

    /// Fill every shipping field
    pub async fn fill_shipping_address(&self, address: &ShippingAddress) -> Result<()> {
        info!("Filling shipping address for {}", address.full_name);
        self.enter_full_name(&address.full_name).await?;
        self.enter_address1(&address.address1).await?;
        self.enter_address2(&address.address2).await?;
        self.enter_city(&address.city).await?;
        self.enter_zip_code(&address.zip_code).await?;
        self.enter_country(&address.country).await
    }

    pub async fn click_to_payment(&self) -> Result<()> {
        info!("Clicking To Payment");
        self.ui.click(&PAYMENT_BUTTON).await
    }

    pub async fn enter_card_holder_name(&self, value: &str) -> Result<()> {
        self.ui.type_into(&CARD_HOLDER_NAME, value).await
    }

    pub async fn enter_card_number(&self, value: &str) -> Result<()> {
        self.ui.type_into(&CARD_NUMBER, value).await
    }

    pub async fn enter_expiration_date(&self, value: &str) -> Result<()> {
        self.ui.type_into(&EXPIRATION_DATE, value).await
    }

    pub async fn enter_security_code(&self, value: &str) -> Result<()> {
        self.ui.type_into(&SECURITY_CODE, value).await
    }

    pub async fn fill_payment_card(&self, card: &PaymentCard) -> Result<()> {
        info!("Filling payment card for {}", card.holder_name);
        self.enter_card_holder_name(&card.holder_name).await?;
        self.enter_card_number(&card.number).await?;
        self.enter_expiration_date(&card.expiration).await?;
        self.enter_security_code(&card.security_code).await
    }

    pub async fn click_review_order(&self) -> Result<()> {
        info!("Clicking Review Order");
        self.ui.click(&PAYMENT_BUTTON).await
    }

    pub async fn click_place_order(&self) -> Result<()> {
        info!("Clicking Place Order");
        self.ui.click(&PAYMENT_BUTTON).await
    }

    /// Submit the shipping form
    pub async fn click_continue(&self) -> Result<()> {
        info!("Clicking continue");
        self.ui.click(&PAYMENT_BUTTON).await
    }

    pub async fn click_continue_shopping(&self) -> Result<()> {
        self.ui.click(&CONTINUE_SHOPPING).await
    }

    /// Submit the shipping form without filling anything in
    pub async fn perform_checkout_without_data(&self) -> Result<()> {
        info!("Continuing checkout without data");
        self.click_continue().await
    }

    pub async fn is_checkout_complete_visible(&self) -> bool {
        self.ui.is_visible(&CHECKOUT_COMPLETE).await
    }

    pub async fn is_title_visible(&self) -> bool {
        self.ui.is_visible(&TITLE).await
    }

    pub async fn title_text(&self) -> Result<String> {
        self.ui.read_text(&TITLE).await
    }

    /// Every shipping field is empty
    pub async fn fields_empty(&self) -> Result<bool> {
        for field in &SHIPPING_FIELDS {
            if !self.ui.read_text(field).await?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub async fn is_error_displayed(&self) -> bool {
        self.ui.is_visible(&FULL_NAME_ERROR).await
    }

    /// Validation message text, empty when none is shown
    pub async fn error_text(&self) -> String {
        match self.ui.probe(&FULL_NAME_ERROR).await {
            Presence::Present(label) => self.ui.driver().text(&label).await.unwrap_or_default(),
            Presence::Absent => String::new(),
        }
    }

    pub async fn error_contains(&self, expected: &str) -> bool {
        self.error_text().await.contains(expected)
    }

    /// Fail unless the validation message is shown and contains `expected`
    pub async fn validate_error_message_exists(&self, expected: &str) -> Result<bool> {
        let actual = self.error_text().await;

        if !self.is_error_displayed().await {
            error!("Expected error message '{}' is not displayed", expected);
            return Err(Error::ErrorMessageMissing {
                expected: expected.to_string(),
                actual,
            });
        }

        if !actual.contains(expected) {
            error!("Error message '{}' does not contain '{}'", actual, expected);
            return Err(Error::ErrorMessageMismatch {
                expected: expected.to_string(),
                actual,
            });
        }

        info!("Error message validated: {}", actual);
        Ok(true)
    }
}

#[async_trait]
impl Screen for CheckoutPage {
    fn name(&self) -> &'static str {
        "Checkout"
    }

    fn interaction(&self) -> &Interaction {
        &self.ui
    }

    fn ready_markers(&self) -> Vec<Locator> {
        vec![FULL_NAME, PAYMENT_BUTTON]
    }
}
