//! Suite runner: feature selection, hooks and report output

use std::sync::Arc;

use cucumber::gherkin::tagexpr::TagOperation;
use cucumber::tag::Ext as _;
use cucumber::writer::Stats as _;
use cucumber::{cli, World as _};
use tracing::info;

use super::hooks::{self, scenario_tags};
use super::world::{ShopWorld, Suite};
use crate::config::Config;
use crate::report::{write_reports, Plugin, RunSummary};
use crate::{Error, Result};

/// Parse a tag expression such as `@reto1 or @reto2`
pub fn parse_tags(expression: &str) -> Result<TagOperation> {
    expression.trim().parse().map_err(|e| {
        Error::configuration(format!("Invalid tag expression '{}': {}", expression, e))
    })
}

/// Whether `tags` (with or without a leading '@') satisfy `filter`
pub fn selects<S: AsRef<str>>(filter: &TagOperation, tags: &[S]) -> bool {
    filter.eval(tags.iter().map(|tag| tag.as_ref().trim_start_matches('@')))
}

/// Run every feature selected by the configured tag expression
///
/// Installs the suite for this process, runs the scenarios one after another
/// (or up to `runner.max_concurrent_scenarios` at once) and writes the
/// configured report plugins.
pub async fn run(config: Config) -> anyhow::Result<RunSummary> {
    let suite = Suite::from_config(config)?.install()?;
    run_installed(suite).await
}

/// Run against a suite that is already installed
pub async fn run_installed(suite: Arc<Suite>) -> anyhow::Result<RunSummary> {
    let runner = &suite.config().runner;
    let plugins = Plugin::parse_all(&runner.plugins)?;
    let filter = parse_tags(&runner.tags)?;

    info!(
        "Running {} with tags '{}' ({} concurrent scenarios)",
        runner.features.display(),
        runner.tags,
        runner.max_concurrent_scenarios
    );

    let writer = ShopWorld::cucumber()
        .max_concurrent_scenarios(runner.max_concurrent_scenarios.max(1))
        .before(hooks::before)
        .after(hooks::after)
        .fail_on_skipped()
        // Selection comes from configuration, not from the process arguments
        .with_cli(cli::Opts::<_, _, _, cli::Empty>::default())
        .filter_run(runner.features.clone(), move |feature, rule, scenario| {
            selects(&filter, &scenario_tags(feature, rule, scenario))
        })
        .await;

    let scenarios = suite.recorder().scenarios().await;
    write_reports(&plugins, &scenarios)?;

    let summary = RunSummary::from_scenarios(&scenarios);
    info!(
        "{} scenarios: {} passed, {} failed, {} skipped",
        summary.total, summary.passed, summary.failed, summary.skipped
    );

    if writer.execution_has_failed() && !summary.has_failures() {
        // Parsing errors and hook panics never reach the recorder
        anyhow::bail!("Cucumber reported failures outside of the recorded scenarios");
    }
    Ok(summary)
}
