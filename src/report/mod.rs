//! # Reporting sink
//!
//! Collects per-scenario annotations while the suite runs and renders them
//! through the configured output plugins.
//!
//! ## Module structure
//! - `writer`: plugin parsing plus the pretty, HTML and JSON writers
//!
//! A [`Recorder`] is cheap to clone; every clone appends to the same run.

pub mod writer;


pub use writer::{write_reports, Plugin};

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{Error, Result};

/// Final state of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Running,
    Passed,
    Failed,
    Skipped,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStatus::Running => "running",
            ScenarioStatus::Passed => "passed",
            ScenarioStatus::Failed => "failed",
            ScenarioStatus::Skipped => "skipped",
        }
    }
}

/// Timestamped annotation
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Everything recorded about one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub id: String,
    pub feature: String,
    pub name: String,
    pub tags: Vec<String>,
    pub status: ScenarioStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub entries: Vec<ReportEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    /// PNG screenshot, base64 encoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

/// Scenario counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_scenarios(scenarios: &[ScenarioReport]) -> Self {
        scenarios.iter().fold(Self::default(), |mut summary, scenario| {
            summary.total += 1;
            match scenario.status {
                ScenarioStatus::Passed => summary.passed += 1,
                // A scenario still running when the run ends never finished
                ScenarioStatus::Failed | ScenarioStatus::Running => summary.failed += 1,
                ScenarioStatus::Skipped => summary.skipped += 1,
            }
            summary
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Shared collector for scenario reports
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    scenarios: Arc<RwLock<Vec<ScenarioReport>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a record for a starting scenario and return its id
    pub async fn begin(&self, feature: &str, name: &str, tags: &[String]) -> String {
        let id = Uuid::new_v4().to_string();
        let report = ScenarioReport {
            id: id.clone(),
            feature: feature.to_string(),
            name: name.to_string(),
            tags: tags.to_vec(),
            status: ScenarioStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: None,
            entries: Vec::new(),
            failure: None,
            screenshot: None,
        };

        debug!("Report opened for '{}' ({})", name, id);
        self.scenarios.write().await.push(report);
        id
    }

    async fn update<F>(&self, id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut ScenarioReport),
    {
        let mut scenarios = self.scenarios.write().await;
        let report = scenarios
            .iter_mut()
            .find(|report| report.id == id)
            .ok_or_else(|| Error::internal(format!("Unknown scenario report: {}", id)))?;
        apply(report);
        Ok(())
    }

    /// Append an annotation to a scenario
    pub async fn note<S: Into<String>>(&self, id: &str, message: S) -> Result<()> {
        let entry = ReportEntry {
            at: Utc::now(),
            message: message.into(),
        };
        self.update(id, |report| report.entries.push(entry)).await
    }

    /// Attach a PNG screenshot to a scenario
    pub async fn attach_screenshot(&self, id: &str, png: &[u8]) -> Result<()> {
        let encoded = BASE64.encode(png);
        self.update(id, |report| report.screenshot = Some(encoded)).await
    }

    /// Close a scenario record with its final status
    pub async fn finish(&self, id: &str, status: ScenarioStatus, failure: Option<String>) -> Result<()> {
        let finished_at = Utc::now();
        self.update(id, |report| {
            if report.finished_at.is_some() {
                warn!("Scenario '{}' finished twice", report.name);
            }
            let elapsed = finished_at - report.started_at;
            report.status = status;
            report.finished_at = Some(finished_at);
            report.duration_ms = Some(elapsed.num_milliseconds().max(0) as u64);
            report.failure = failure;
        })
        .await
    }

    pub async fn scenario(&self, id: &str) -> Option<ScenarioReport> {
        self.scenarios.read().await.iter().find(|report| report.id == id).cloned()
    }

    /// Every scenario in start order
    pub async fn scenarios(&self) -> Vec<ScenarioReport> {
        self.scenarios.read().await.clone()
    }

    pub async fn summary(&self) -> RunSummary {
        RunSummary::from_scenarios(&self.scenarios.read().await)
    }
}
