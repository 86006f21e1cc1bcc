//! Output plugins
//!
//! Plugins are named the way cucumber runners name them: `pretty`,
//! `html:<directory>` and `json:<file>`.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use super::{RunSummary, ScenarioReport, ScenarioStatus};
use crate::markup::escape_markup;
use crate::{Error, Result};

const HTML_INDEX: &str = "index.html";

/// A configured report output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plugin {
    /// Plain-text summary on stdout
    Pretty,
    /// `index.html` inside the directory
    Html(PathBuf),
    /// Single JSON document
    Json(PathBuf),
}

impl FromStr for Plugin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "pretty" {
            return Ok(Plugin::Pretty);
        }

        let (kind, target) = s
            .split_once(':')
            .ok_or_else(|| Error::configuration(format!("Unknown report plugin: {}", s)))?;
        let target = target.trim();
        if target.is_empty() {
            return Err(Error::configuration(format!("Report plugin '{}' needs a path", kind)));
        }

        match kind {
            "html" => Ok(Plugin::Html(PathBuf::from(target))),
            "json" => Ok(Plugin::Json(PathBuf::from(target))),
            other => Err(Error::configuration(format!("Unknown report plugin: {}", other))),
        }
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plugin::Pretty => f.write_str("pretty"),
            Plugin::Html(dir) => write!(f, "html:{}", dir.display()),
            Plugin::Json(file) => write!(f, "json:{}", file.display()),
        }
    }
}

impl Plugin {
    /// Parse every plugin string, failing on the first bad one
    pub fn parse_all<S: AsRef<str>>(specs: &[S]) -> Result<Vec<Plugin>> {
        specs.iter().map(|spec| spec.as_ref().parse()).collect()
    }

    /// Render `scenarios` through this plugin
    pub fn write(&self, scenarios: &[ScenarioReport]) -> Result<()> {
        let summary = RunSummary::from_scenarios(scenarios);
        match self {
            Plugin::Pretty => {
                print!("{}", render_pretty(scenarios, &summary));
                Ok(())
            }
            Plugin::Html(dir) => {
                std::fs::create_dir_all(dir)?;
                let path = dir.join(HTML_INDEX);
                std::fs::write(&path, render_html(scenarios, &summary))?;
                info!("HTML report written to {}", path.display());
                Ok(())
            }
            Plugin::Json(file) => {
                ensure_parent(file)?;
                let document = JsonReport { summary, scenarios };
                std::fs::write(file, serde_json::to_vec_pretty(&document)?)?;
                info!("JSON report written to {}", file.display());
                Ok(())
            }
        }
    }
}

/// Write every plugin; stops at the first failure
pub fn write_reports(plugins: &[Plugin], scenarios: &[ScenarioReport]) -> Result<()> {
    for plugin in plugins {
        plugin.write(scenarios)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: RunSummary,
    scenarios: &'a [ScenarioReport],
}

fn ensure_parent(file: &Path) -> Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(std::fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

/// Text summary, one line per scenario
pub fn render_pretty(scenarios: &[ScenarioReport], summary: &RunSummary) -> String {
    let mut out = String::new();
    for scenario in scenarios {
        let _ = writeln!(
            out,
            "[{:>7}] {} :: {} ({} ms)",
            scenario.status.as_str(),
            scenario.feature,
            scenario.name,
            scenario.duration_ms.unwrap_or(0)
        );
        if let Some(failure) = &scenario.failure {
            let _ = writeln!(out, "          {}", failure);
        }
    }
    let _ = writeln!(
        out,
        "{} scenarios ({} passed, {} failed, {} skipped)",
        summary.total, summary.passed, summary.failed, summary.skipped
    );
    out
}

fn status_class(status: ScenarioStatus) -> &'static str {
    match status {
        ScenarioStatus::Passed => "passed",
        ScenarioStatus::Skipped => "skipped",
        ScenarioStatus::Failed | ScenarioStatus::Running => "failed",
    }
}

/// Self-contained HTML page; screenshots are inlined as data URIs
pub fn render_html(scenarios: &[ScenarioReport], summary: &RunSummary) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Journey report</title>\n\
         <style>\n\
         body { font-family: sans-serif; margin: 2em; }\n\
         .passed { border-left: 6px solid #2e7d32; }\n\
         .failed { border-left: 6px solid #c62828; }\n\
         .skipped { border-left: 6px solid #f9a825; }\n\
         section { padding: 0.5em 1em; margin-bottom: 1em; background: #fafafa; }\n\
         img { max-width: 320px; }\n\
         </style>\n</head>\n<body>\n",
    );

    let _ = writeln!(
        out,
        "<h1>{} scenarios: {} passed, {} failed, {} skipped</h1>",
        summary.total, summary.passed, summary.failed, summary.skipped
    );

    for scenario in scenarios {
        let _ = writeln!(out, "<section class=\"{}\">", status_class(scenario.status));
        let _ = writeln!(
            out,
            "<h2>{} :: {}</h2>",
            escape_markup(&scenario.feature),
            escape_markup(&scenario.name)
        );
        let _ = writeln!(
            out,
            "<p>{} &middot; {} ms &middot; {}</p>",
            scenario.status.as_str(),
            scenario.duration_ms.unwrap_or(0),
            escape_markup(&scenario.tags.join(" "))
        );

        out.push_str("<ul>\n");
        for entry in &scenario.entries {
            let _ = writeln!(
                out,
                "<li><code>{}</code> {}</li>",
                entry.at.format("%H:%M:%S%.3f"),
                escape_markup(&entry.message)
            );
        }
        out.push_str("</ul>\n");

        if let Some(failure) = &scenario.failure {
            let _ = writeln!(out, "<pre>{}</pre>", escape_markup(failure));
        }
        if let Some(png) = &scenario.screenshot {
            let _ = writeln!(out, "<img alt=\"screenshot\" src=\"data:image/png;base64,{}\">", png);
        }
        out.push_str("</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}
