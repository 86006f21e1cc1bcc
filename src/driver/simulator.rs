//! In-process model of the "My Demo App" shopping application
//!
//! [`DemoApp`] keeps the navigation and cart state of the app and renders the
//! current screen as a [`UiNode`] hierarchy using the same resource ids as the
//! Android build. Element keys are stable across re-renders so that handles
//! found on one render still resolve after an unrelated state change.

use super::ui_tree::UiNode;
use crate::config::JourneyData;
use crate::Error;
use tracing::debug;

/// Android application package
pub const APP_PACKAGE: &str = "com.saucelabs.mydemoapp.android";

/// Catalog rows visible at once
pub const VISIBLE_ROWS: usize = 4;

/// Minimal finger travel, in pixels, that counts as a scroll
const SCROLL_THRESHOLD: f64 = 100.0;

const LOGIN_FAILED: &str = "Provided credentials do not match any user in this service.";
const USERNAME_REQUIRED: &str = "Username is required";
const PASSWORD_REQUIRED: &str = "Enter Password";

const EDIT_TEXT: &str = "android.widget.EditText";
const TEXT_VIEW: &str = "android.widget.TextView";
const IMAGE_VIEW: &str = "android.widget.ImageView";
const BUTTON: &str = "android.widget.Button";
const VIEW_GROUP: &str = "android.view.ViewGroup";
const RECYCLER_VIEW: &str = "androidx.recyclerview.widget.RecyclerView";

/// Products in catalog order
pub const PRODUCTS: [(&str, &str); 6] = [
    ("Sauce Labs Backpack", "$ 29.99"),
    ("Sauce Labs Bike Light", "$ 9.99"),
    ("Sauce Labs Bolt T-Shirt", "$ 15.99"),
    ("Sauce Labs Fleece Jacket", "$ 49.99"),
    ("Sauce Labs Onesie", "$ 7.99"),
    ("Test.allTheThings() T-Shirt", "$ 15.99"),
];

/// Full resource id for a short id
pub fn resource_id(short: &str) -> String {
    format!("{}:id/{}", APP_PACKAGE, short)
}

/// Screens of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Catalog,
    ProductDetail(usize),
    Login,
    Cart,
    Checkout,
    Payment,
    Review,
    Complete,
}

impl AppScreen {
    pub fn title(&self) -> &'static str {
        match self {
            AppScreen::Catalog => "Products",
            AppScreen::ProductDetail(_) => "Product Details",
            AppScreen::Login => "Login",
            AppScreen::Cart => "My Cart",
            AppScreen::Checkout => "Checkout",
            AppScreen::Payment => "Payment",
            AppScreen::Review => "Review Order",
            AppScreen::Complete => "Checkout Complete",
        }
    }
}

/// Shipping address form; field order matches the screen
const SHIPPING_FIELDS: [(&str, Option<&str>); 6] = [
    ("fullNameET", None),
    ("address1ET", Some("Please provide your address.")),
    ("address2ET", None),
    ("cityET", Some("Please provide your city.")),
    ("zipET", Some("Please provide your zip.")),
    ("countryET", Some("Please provide your country.")),
];

const PAYMENT_FIELDS: [&str; 4] = ["nameET", "cardNumberET", "expirationDateET", "securityCodeET"];

/// Simulated application state
#[derive(Debug, Clone)]
pub struct DemoApp {
    journey: JourneyData,
    screen: AppScreen,
    menu_open: bool,
    logged_in: bool,
    after_login: Option<AppScreen>,
    username: String,
    password: String,
    login_error: Option<&'static str>,
    /// Product indices in the order they were added
    cart: Vec<usize>,
    /// First visible catalog row
    scroll: usize,
    shipping: [String; 6],
    shipping_validated: bool,
    payment: [String; 4],
}

impl DemoApp {
    /// Freshly launched app showing the catalog
    pub fn new(journey: JourneyData) -> Self {
        Self {
            journey,
            screen: AppScreen::Catalog,
            menu_open: false,
            logged_in: false,
            after_login: None,
            username: String::new(),
            password: String::new(),
            login_error: None,
            cart: Vec::new(),
            scroll: 0,
            shipping: Default::default(),
            shipping_validated: false,
            payment: Default::default(),
        }
    }

    pub fn screen(&self) -> AppScreen {
        self.screen
    }

    pub fn title(&self) -> String {
        self.screen.title().to_string()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Names of the products in the cart
    pub fn cart_products(&self) -> Vec<&'static str> {
        self.cart.iter().map(|&i| PRODUCTS[i].0).collect()
    }

    fn navigate(&mut self, screen: AppScreen) {
        debug!("Simulator: {:?} -> {:?}", self.screen, screen);
        self.screen = screen;
        self.menu_open = false;
        if screen == AppScreen::Login {
            self.login_error = None;
        }
    }

    fn toggle_cart(&mut self, product: usize) {
        match self.cart.iter().position(|&p| p == product) {
            Some(pos) => {
                self.cart.remove(pos);
            }
            None => self.cart.push(product),
        }
    }

    /// Tap the element with `key`; taps on inert elements do nothing
    pub fn click(&mut self, key: &str) -> Result<(), Error> {
        if let Some(i) = indexed(key, "catalog.image.") {
            self.navigate(AppScreen::ProductDetail(i));
            return Ok(());
        }
        if let Some(i) = indexed(key, "catalog.action.") {
            self.toggle_cart(i);
            return Ok(());
        }
        if let Some(i) = indexed(key, "cart.remove.") {
            self.cart.retain(|&p| p != i);
            return Ok(());
        }
        if let Some(item) = key.strip_prefix("menu.item.") {
            return self.choose_menu_item(item);
        }

        match key {
            "header.menu" => self.menu_open = !self.menu_open,
            "header.cart" => self.navigate(AppScreen::Cart),
            "detail.add" => {
                if let AppScreen::ProductDetail(i) = self.screen {
                    if !self.cart.contains(&i) {
                        self.cart.push(i);
                    }
                }
            }
            "login.button" => self.submit_login(),
            "cart.checkout" => {
                if self.cart.is_empty() {
                    return Err(Error::webdriver(
                        "element not interactable",
                        "Proceed To Checkout is disabled",
                    ));
                }
                if self.logged_in {
                    self.navigate(AppScreen::Checkout);
                } else {
                    self.after_login = Some(AppScreen::Checkout);
                    self.navigate(AppScreen::Login);
                }
            }
            "cart.shopping" | "complete.shopping" => {
                if self.screen == AppScreen::Complete {
                    self.cart.clear();
                }
                self.navigate(AppScreen::Catalog);
            }
            "checkout.submit" => self.submit(),
            _ => debug!("Simulator: tap on inert element {}", key),
        }
        Ok(())
    }

    fn choose_menu_item(&mut self, item: &str) -> Result<(), Error> {
        match item {
            "catalog" => self.navigate(AppScreen::Catalog),
            "login" => self.navigate(AppScreen::Login),
            "logout" => {
                self.logged_in = false;
                self.navigate(AppScreen::Login);
            }
            "reset" => {
                self.cart.clear();
                self.menu_open = false;
            }
            other => return Err(Error::internal(format!("Unknown menu item {}", other))),
        }
        Ok(())
    }

    fn submit_login(&mut self) {
        self.login_error = if self.username.is_empty() {
            Some(USERNAME_REQUIRED)
        } else if self.password.is_empty() {
            Some(PASSWORD_REQUIRED)
        } else if self.username != self.journey.valid_username
            || self.password != self.journey.valid_password
        {
            Some(LOGIN_FAILED)
        } else {
            None
        };

        if self.login_error.is_none() {
            self.logged_in = true;
            self.username.clear();
            self.password.clear();
            let next = self.after_login.take().unwrap_or(AppScreen::Catalog);
            self.navigate(next);
        }
    }

    fn submit(&mut self) {
        match self.screen {
            AppScreen::Checkout => {
                self.shipping_validated = true;
                if self.missing_shipping_fields().is_empty() {
                    self.shipping_validated = false;
                    self.navigate(AppScreen::Payment);
                }
            }
            AppScreen::Payment => {
                if self.payment.iter().all(|f| !f.is_empty()) {
                    self.navigate(AppScreen::Review);
                }
            }
            AppScreen::Review => self.navigate(AppScreen::Complete),
            _ => {}
        }
    }

    fn missing_shipping_fields(&self) -> Vec<usize> {
        SHIPPING_FIELDS
            .iter()
            .enumerate()
            .filter(|(i, (id, message))| {
                (message.is_some() || *id == "fullNameET") && self.shipping[*i].is_empty()
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        if let Some(i) = indexed(key, "shipping.") {
            return self.shipping.get_mut(i);
        }
        if let Some(i) = indexed(key, "payment.") {
            return self.payment.get_mut(i);
        }
        match key {
            "login.name" => Some(&mut self.username),
            "login.password" => Some(&mut self.password),
            _ => None,
        }
    }

    /// Append `text` to an editable element
    pub fn type_text(&mut self, key: &str, text: &str) -> Result<(), Error> {
        match self.field_mut(key) {
            Some(field) => {
                field.push_str(text);
                Ok(())
            }
            None => Err(not_editable(key)),
        }
    }

    /// Clear an editable element
    pub fn clear(&mut self, key: &str) -> Result<(), Error> {
        match self.field_mut(key) {
            Some(field) => {
                field.clear();
                Ok(())
            }
            None => Err(not_editable(key)),
        }
    }

    /// Apply a vertical swipe; positive offsets move the list towards its end
    pub fn scroll(&mut self, offset: f64) {
        if self.screen != AppScreen::Catalog || self.menu_open || offset.abs() < SCROLL_THRESHOLD {
            return;
        }
        let max = PRODUCTS.len().saturating_sub(VISIBLE_ROWS);
        self.scroll = if offset > 0.0 {
            (self.scroll + 1).min(max)
        } else {
            self.scroll.saturating_sub(1)
        };
        debug!("Simulator: catalog scrolled to row {}", self.scroll);
    }

    /// Render the current screen
    pub fn render(&self) -> UiNode {
        let content = if self.menu_open {
            self.render_menu()
        } else {
            match self.screen {
                AppScreen::Catalog => self.render_catalog(),
                AppScreen::ProductDetail(i) => self.render_detail(i),
                AppScreen::Login => self.render_login(),
                AppScreen::Cart => self.render_cart(),
                AppScreen::Checkout => self.render_checkout(),
                AppScreen::Payment => self.render_payment(),
                AppScreen::Review => self.render_review(),
                AppScreen::Complete => self.render_complete(),
            }
        };

        UiNode::new("hierarchy").key("hierarchy").child(
            UiNode::new("android.widget.FrameLayout")
                .key("root")
                .child(self.render_header())
                .child(content),
        )
    }

    fn render_header(&self) -> UiNode {
        let mut header = UiNode::new(VIEW_GROUP).key("header").children([
            UiNode::new(IMAGE_VIEW)
                .key("header.menu")
                .id(resource_id("menuIV"))
                .desc("View menu"),
            UiNode::new(IMAGE_VIEW)
                .key("header.cart")
                .id(resource_id("cartIV"))
                .desc("View cart"),
        ]);
        if !self.cart.is_empty() {
            header = header.child(
                UiNode::new(TEXT_VIEW)
                    .key("header.badge")
                    .id(resource_id("cartTV"))
                    .text(self.cart.len().to_string()),
            );
        }
        header
    }

    fn render_menu(&self) -> UiNode {
        let account = if self.logged_in { ("logout", "Log Out") } else { ("login", "Log In") };
        let items = [("catalog", "Catalog"), account, ("reset", "Reset App State")];
        UiNode::new(RECYCLER_VIEW)
            .key("menu")
            .id(resource_id("menuRV"))
            .children(items.into_iter().map(|(key, label)| {
                UiNode::new(TEXT_VIEW)
                    .key(format!("menu.item.{}", key))
                    .id(resource_id("itemTV"))
                    .text(label)
            }))
    }

    fn render_catalog(&self) -> UiNode {
        let rows = (self.scroll..(self.scroll + VISIBLE_ROWS).min(PRODUCTS.len())).map(|i| {
            let (name, price) = PRODUCTS[i];
            let action = if self.cart.contains(&i) { "REMOVE" } else { "ADD TO CART" };
            UiNode::new(VIEW_GROUP).key(format!("catalog.row.{}", i)).children([
                UiNode::new(IMAGE_VIEW)
                    .key(format!("catalog.image.{}", i))
                    .id(resource_id("productIV"))
                    .desc(name),
                UiNode::new(TEXT_VIEW)
                    .key(format!("catalog.title.{}", i))
                    .id(resource_id("titleTV"))
                    .text(name),
                UiNode::new(TEXT_VIEW)
                    .key(format!("catalog.price.{}", i))
                    .id(resource_id("priceTV"))
                    .text(price),
                UiNode::new(TEXT_VIEW)
                    .key(format!("catalog.action.{}", i))
                    .id(resource_id("actionTV"))
                    .text(action),
            ])
        });

        UiNode::new(VIEW_GROUP).key("catalog").children([
            UiNode::new(TEXT_VIEW)
                .key("catalog.header")
                .id(resource_id("productTV"))
                .text("Products"),
            UiNode::new(RECYCLER_VIEW)
                .key("catalog.list")
                .id(resource_id("productRV"))
                .children(rows),
        ])
    }

    fn render_detail(&self, index: usize) -> UiNode {
        let (name, price) = PRODUCTS[index];
        UiNode::new(VIEW_GROUP).key("detail").children([
            UiNode::new(TEXT_VIEW)
                .key("detail.title")
                .id(resource_id("productTV"))
                .text(name),
            UiNode::new(TEXT_VIEW)
                .key("detail.price")
                .id(resource_id("priceTV"))
                .text(price),
            UiNode::new(BUTTON)
                .key("detail.add")
                .id(resource_id("cartBt"))
                .text("Add To Cart")
                .desc("Tap to add product to cart"),
        ])
    }

    fn render_login(&self) -> UiNode {
        let mut login = UiNode::new(VIEW_GROUP).key("login").children([
            UiNode::new(TEXT_VIEW)
                .key("login.header")
                .id(resource_id("loginTV"))
                .text("Login"),
            UiNode::new(EDIT_TEXT)
                .key("login.name")
                .id(resource_id("nameET"))
                .text(self.username.as_str()),
            UiNode::new(EDIT_TEXT)
                .key("login.password")
                .id(resource_id("passwordET"))
                .text(self.password.as_str()),
        ]);
        if let Some(message) = self.login_error {
            login = login.child(
                UiNode::new(TEXT_VIEW)
                    .key("login.error")
                    .id(resource_id("errorTV"))
                    .text(message),
            );
        }
        login.child(
            UiNode::new(BUTTON)
                .key("login.button")
                .id(resource_id("loginBtn"))
                .text("Login")
                .desc("Tap to login with given credentials"),
        )
    }

    fn render_cart(&self) -> UiNode {
        let cart = UiNode::new(VIEW_GROUP).key("cart").child(
            UiNode::new(TEXT_VIEW)
                .key("cart.header")
                .id(resource_id("productTV"))
                .text("My Cart"),
        );

        if self.cart.is_empty() {
            return cart.children([
                UiNode::new(TEXT_VIEW)
                    .key("cart.empty")
                    .id(resource_id("noItemTitleTV"))
                    .text("No Items"),
                UiNode::new(BUTTON)
                    .key("cart.shopping")
                    .id(resource_id("shoppingBt"))
                    .text("Go Shopping"),
            ]);
        }

        let rows = self.cart.iter().map(|&i| {
            let (name, price) = PRODUCTS[i];
            UiNode::new(VIEW_GROUP).key(format!("cart.row.{}", i)).children([
                UiNode::new(TEXT_VIEW)
                    .key(format!("cart.title.{}", i))
                    .id(resource_id("titleTV"))
                    .text(name),
                UiNode::new(TEXT_VIEW)
                    .key(format!("cart.price.{}", i))
                    .id(resource_id("priceTV"))
                    .text(price),
                UiNode::new(TEXT_VIEW)
                    .key(format!("cart.remove.{}", i))
                    .id(resource_id("removeBt"))
                    .text("Remove Item"),
            ])
        });

        cart.children([
            UiNode::new(RECYCLER_VIEW)
                .key("cart.list")
                .id(resource_id("productRV"))
                .children(rows),
            UiNode::new(BUTTON)
                .key("cart.checkout")
                .id(resource_id("cartBt"))
                .text("Proceed To Checkout"),
        ])
    }

    fn render_checkout(&self) -> UiNode {
        let missing = if self.shipping_validated {
            self.missing_shipping_fields()
        } else {
            Vec::new()
        };

        let mut form = UiNode::new(VIEW_GROUP).key("checkout").child(
            UiNode::new(TEXT_VIEW)
                .key("checkout.title")
                .id(resource_id("checkoutTitleTV"))
                .text("Enter a shipping address"),
        );

        for (i, (id, message)) in SHIPPING_FIELDS.iter().enumerate() {
            form = form.child(
                UiNode::new(EDIT_TEXT)
                    .key(format!("shipping.{}", i))
                    .id(resource_id(id))
                    .text(self.shipping[i].as_str()),
            );
            if missing.contains(&i) {
                let text = message.unwrap_or(self.journey.checkout_error.as_str());
                let error_id = id.replace("ET", "ErrorTV");
                form = form.child(
                    UiNode::new(TEXT_VIEW)
                        .key(format!("shipping.error.{}", i))
                        .id(resource_id(&error_id))
                        .text(text),
                );
            }
        }

        form.child(
            UiNode::new(BUTTON)
                .key("checkout.submit")
                .id(resource_id("paymentBtn"))
                .text("To Payment"),
        )
    }

    fn render_payment(&self) -> UiNode {
        let mut form = UiNode::new(VIEW_GROUP).key("payment").child(
            UiNode::new(TEXT_VIEW)
                .key("payment.title")
                .id(resource_id("enterPaymentMethodTV"))
                .text("Enter a payment method"),
        );
        for (i, id) in PAYMENT_FIELDS.iter().enumerate() {
            form = form.child(
                UiNode::new(EDIT_TEXT)
                    .key(format!("payment.{}", i))
                    .id(resource_id(id))
                    .text(self.payment[i].as_str()),
            );
        }
        form.child(
            UiNode::new(BUTTON)
                .key("checkout.submit")
                .id(resource_id("paymentBtn"))
                .text("Review Order"),
        )
    }

    fn render_review(&self) -> UiNode {
        let items = self.cart.iter().map(|&i| {
            UiNode::new(TEXT_VIEW)
                .key(format!("review.title.{}", i))
                .id(resource_id("titleTV"))
                .text(PRODUCTS[i].0)
        });
        UiNode::new(VIEW_GROUP)
            .key("review")
            .children(items)
            .child(
                UiNode::new(BUTTON)
                    .key("checkout.submit")
                    .id(resource_id("paymentBtn"))
                    .text("Place Order"),
            )
    }

    fn render_complete(&self) -> UiNode {
        UiNode::new(VIEW_GROUP).key("complete").children([
            UiNode::new(TEXT_VIEW)
                .key("complete.title")
                .id(resource_id("completeTV"))
                .text("Checkout Complete"),
            UiNode::new(BUTTON)
                .key("complete.shopping")
                .id(resource_id("shoopingBt"))
                .text("Continue Shopping"),
        ])
    }
}

fn indexed(key: &str, prefix: &str) -> Option<usize> {
    key.strip_prefix(prefix)?.parse().ok()
}

fn not_editable(key: &str) -> Error {
    Error::webdriver("invalid element state", format!("Element {} is not editable", key))
}
