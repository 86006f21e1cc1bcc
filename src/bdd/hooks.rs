//! Scenario hooks
//!
//! `before` opens the report record and the driver; `after` records the
//! outcome, captures a screenshot on failure and always quits the driver.

use cucumber::event::ScenarioFinished;
use cucumber::gherkin::{Feature, Rule, Scenario};
use futures::future::{FutureExt, LocalBoxFuture};
use tracing::{info, warn};

use super::world::ShopWorld;
use crate::report::ScenarioStatus;

/// Feature, rule and scenario tags, each with a leading '@'
pub fn scenario_tags(feature: &Feature, rule: Option<&Rule>, scenario: &Scenario) -> Vec<String> {
    feature
        .tags
        .iter()
        .chain(rule.into_iter().flat_map(|r| r.tags.iter()))
        .chain(scenario.tags.iter())
        .map(|tag| {
            if tag.starts_with('@') {
                tag.clone()
            } else {
                format!("@{}", tag)
            }
        })
        .collect()
}

/// Report status and failure detail for a finished scenario
pub fn outcome(finished: &ScenarioFinished) -> (ScenarioStatus, Option<String>) {
    match finished {
        ScenarioFinished::StepPassed => (ScenarioStatus::Passed, None),
        ScenarioFinished::StepSkipped => (ScenarioStatus::Skipped, None),
        ScenarioFinished::StepFailed(.., err) => (ScenarioStatus::Failed, Some(err.to_string())),
        _ => (ScenarioStatus::Failed, Some("Scenario hook failed".to_string())),
    }
}

pub fn before<'a>(
    feature: &'a Feature,
    rule: Option<&'a Rule>,
    scenario: &'a Scenario,
    world: &'a mut ShopWorld,
) -> LocalBoxFuture<'a, ()> {
    async move {
        let tags = scenario_tags(feature, rule, scenario);
        world.start(&feature.name, &scenario.name, &tags).await;
    }
    .boxed_local()
}

pub fn after<'a>(
    _feature: &'a Feature,
    _rule: Option<&'a Rule>,
    scenario: &'a Scenario,
    finished: &'a ScenarioFinished,
    world: Option<&'a mut ShopWorld>,
) -> LocalBoxFuture<'a, ()> {
    async move {
        let (status, failure) = outcome(finished);
        info!("=== Finished scenario: {} ({}) ===", scenario.name, status.as_str());

        if let Some(reason) = &failure {
            warn!("Step failed in scenario '{}': {}", scenario.name, reason);
        }

        match world {
            Some(world) => {
                world
                    .record(format!("Scenario finished: {}\nStatus: {}", scenario.name, status.as_str()))
                    .await;
                world.finish(status, failure).await;
            }
            None => warn!("No world for scenario '{}', nothing to tear down", scenario.name),
        }
    }
    .boxed_local()
}
