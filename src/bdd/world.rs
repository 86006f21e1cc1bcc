//! Scenario world and suite-wide state

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::anyhow;
use cucumber::World;
use tracing::{error, info, warn};

use crate::config::{Backend, Config, JourneyData};
use crate::driver::{DriverConnector, MockConnector, RemoteConnector};
use crate::pages::Pages;
use crate::report::{Recorder, ScenarioStatus};
use crate::session::{DriverManager, Interaction};
use crate::{Error, Result};

static SUITE: OnceLock<Arc<Suite>> = OnceLock::new();

/// State shared by every scenario of a run
#[derive(Debug)]
pub struct Suite {
    config: Arc<Config>,
    connector: Arc<dyn DriverConnector>,
    recorder: Recorder,
}

impl Suite {
    pub fn new(config: Config, connector: Arc<dyn DriverConnector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
            recorder: Recorder::new(),
        }
    }

    /// Build the suite with the connector named by `config.runner.backend`
    pub fn from_config(config: Config) -> Result<Self> {
        let connector: Arc<dyn DriverConnector> = match config.runner.backend {
            Backend::Appium => Arc::new(RemoteConnector::new(Duration::from_secs(
                config.appium.new_command_timeout_secs,
            ))?),
            Backend::Simulator => Arc::new(MockConnector::new(config.journey.clone())),
        };
        info!("Using {:?} backend", config.runner.backend);
        Ok(Self::new(config, connector))
    }

    /// Make this the suite every new world attaches to; only one per process
    pub fn install(self) -> Result<Arc<Suite>> {
        let suite = Arc::new(self);
        SUITE
            .set(Arc::clone(&suite))
            .map_err(|_| Error::internal("A suite is already installed"))?;
        Ok(suite)
    }

    pub fn current() -> Option<Arc<Suite>> {
        SUITE.get().cloned()
    }

    fn current_or_simulated() -> Arc<Suite> {
        Arc::clone(SUITE.get_or_init(|| {
            warn!("No suite installed, falling back to the simulator with default configuration");
            let config = Config::default();
            let connector = Arc::new(MockConnector::new(config.journey.clone()));
            Arc::new(Suite::new(config, connector))
        }))
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }
}

/// Screen whose validation message a scenario is checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorScreen {
    #[default]
    Login,
    Checkout,
}

/// Per-scenario context
#[derive(Debug, World)]
#[world(init = Self::attach)]
pub struct ShopWorld {
    suite: Arc<Suite>,
    manager: DriverManager,
    pages: Option<Pages>,
    setup_error: Option<String>,
    report_id: Option<String>,
    /// Product the next catalog button applies to
    pub selected_product: Option<String>,
    /// Products this scenario put in the cart, in order
    pub cart_products: Vec<String>,
    /// Cart badge count remembered before the last cart change
    pub cart_count: usize,
    pub error_screen: ErrorScreen,
}

impl ShopWorld {
    fn attach() -> Self {
        Self::with_suite(Suite::current_or_simulated())
    }

    pub fn with_suite(suite: Arc<Suite>) -> Self {
        let manager = DriverManager::new(Arc::clone(&suite.config), Arc::clone(&suite.connector));
        Self {
            suite,
            manager,
            pages: None,
            setup_error: None,
            report_id: None,
            selected_product: None,
            cart_products: Vec::new(),
            cart_count: 0,
            error_screen: ErrorScreen::default(),
        }
    }

    pub fn journey(&self) -> &JourneyData {
        &self.suite.config.journey
    }

    pub fn is_driver_active(&self) -> bool {
        self.manager.is_active()
    }

    /// Open the report record and the driver session for a starting scenario
    pub async fn start(&mut self, feature: &str, name: &str, tags: &[String]) {
        info!("=== Starting scenario: {} ===", name);
        let id = self.suite.recorder.begin(feature, name, tags).await;
        self.report_id = Some(id);

        match self.manager.get_or_create().await {
            Ok(driver) => {
                let ui = Interaction::from_config(driver, &self.suite.config.appium);
                self.pages = Some(Pages::new(ui));
                self.record(format!("Scenario started: {}\nTags: {}", name, tags.join(", ")))
                    .await;
            }
            Err(e) => {
                error!("Could not create the driver: {}", e);
                self.record(format!("Driver creation failed: {}", e)).await;
                self.setup_error = Some(e.to_string());
            }
        }
    }

    /// Page objects of the scenario; fails when the driver could not be created
    pub fn pages(&self) -> anyhow::Result<&Pages> {
        if let Some(reason) = &self.setup_error {
            return Err(anyhow!("Scenario aborted, driver unavailable: {}", reason));
        }
        self.pages
            .as_ref()
            .ok_or_else(|| anyhow!("No driver session for this scenario"))
    }

    /// Append an annotation to the scenario report
    pub async fn record<S: Into<String>>(&self, message: S) {
        let Some(id) = &self.report_id else {
            return;
        };
        if let Err(e) = self.suite.recorder.note(id, message).await {
            warn!("Could not record report entry: {}", e);
        }
    }

    /// Close the report record and quit the driver
    pub async fn finish(&mut self, status: ScenarioStatus, failure: Option<String>) {
        if let Some(id) = self.report_id.take() {
            if status == ScenarioStatus::Failed {
                self.capture_screenshot(&id).await;
            }
            if let Err(e) = self.suite.recorder.finish(&id, status, failure).await {
                warn!("Could not close scenario report: {}", e);
            }
        }

        self.pages = None;
        self.manager.quit().await;
    }

    async fn capture_screenshot(&self, id: &str) {
        let Some(driver) = self.manager.current() else {
            return;
        };
        match driver.screenshot().await {
            Ok(png) => {
                if let Err(e) = self.suite.recorder.attach_screenshot(id, &png).await {
                    warn!("Could not attach screenshot: {}", e);
                }
            }
            Err(e) => warn!("Could not take failure screenshot: {}", e),
        }
    }
}
