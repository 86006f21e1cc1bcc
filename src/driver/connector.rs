//! Remote session connector

use super::capabilities::Capabilities;
use super::client::WebDriverClient;
use super::traits::{AutomationDriver, DriverConnector};
use super::types::NewSessionValue;
use crate::Error;
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Opens sessions on a remote WebDriver server
#[derive(Debug, Clone)]
pub struct RemoteConnector {
    http: reqwest::Client,
}

impl RemoteConnector {
    /// Create a connector whose HTTP requests time out after `request_timeout`
    pub fn new(request_timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { http })
    }

    /// Create a connector around an existing HTTP client
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DriverConnector for RemoteConnector {
    async fn connect(
        &self,
        endpoint: &str,
        capabilities: &Capabilities,
    ) -> Result<Arc<dyn AutomationDriver>, Error> {
        let endpoint = endpoint.trim_end_matches('/');
        info!("Opening session on {}", endpoint);

        let value = WebDriverClient::execute(
            &self.http,
            Method::POST,
            &format!("{}/session", endpoint),
            Some(capabilities.to_new_session_body()),
        )
        .await?;

        let session: NewSessionValue = serde_json::from_value(value)?;
        info!("Session {} created", session.session_id);

        Ok(Arc::new(WebDriverClient::new(
            self.http.clone(),
            endpoint,
            session.session_id,
        )))
    }
}
