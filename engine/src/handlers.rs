//! Command handlers for CLI operations
//!
//! - levels: Show how a plan file would be scheduled
//! - plan: Ask the reasoner for a plan and show its levels
//! - config show / path: Inspect configuration

use anyhow::{Context, Result};
use sdk::{EngineError, WardenErrorExt};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use crate::conductor::{execution_levels, Plan, Planner};
use crate::config::Config;
use crate::llm::ollama::OllamaReasoner;
use crate::tools::ToolRegistry;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Print the execution levels of a JSON plan file
pub fn handle_levels(path: &Path, format: OutputFormat) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    let plan: Plan = serde_json::from_str(&contents).context("Failed to parse plan JSON")?;
    plan.validate().map_err(with_hint)?;
    println!("{}", render_levels(&plan, format)?);
    Ok(())
}

/// Plan a request with the configured reasoner and print the result
pub async fn handle_plan(request: &str, config: &Config, format: OutputFormat) -> Result<()> {
    let reasoner = Arc::new(OllamaReasoner::from_config(&config.reasoner));
    let planner = Planner::new(reasoner, Arc::new(ToolRegistry::new()));

    let plan = planner.plan(request, &[]).await.map_err(with_hint)?;
    match (&plan.direct_response, format) {
        (Some(text), OutputFormat::Text) => println!("{}", text),
        _ => println!("{}", render_levels(&plan, format)?),
    }
    Ok(())
}

/// Attach the user-facing hint of an engine error
fn with_hint(err: EngineError) -> anyhow::Error {
    let hint = err.user_hint().to_string();
    anyhow::Error::new(err).context(hint)
}

/// Render a plan's levels as text or JSON
pub fn render_levels(plan: &Plan, format: OutputFormat) -> Result<String> {
    let levels = execution_levels(&plan.steps);
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            if !plan.reasoning.is_empty() {
                out.push_str(&format!("Reasoning: {}\n", plan.reasoning));
            }
            for (depth, level) in levels.iter().enumerate() {
                out.push_str(&format!("Level {}:\n", depth + 1));
                for &i in level {
                    let step = &plan.steps[i];
                    let mark = if step.requires_verification { " [verify]" } else { "" };
                    out.push_str(&format!("  {} -> {}{}\n", step.id, step.tool_name, mark));
                }
            }
            if levels.is_empty() {
                out.push_str("(no steps)\n");
            }
            Ok(out.trim_end().to_string())
        }
        OutputFormat::Json => {
            let levels: Vec<Vec<&str>> = levels
                .iter()
                .map(|level| level.iter().map(|&i| plan.steps[i].id.as_str()).collect())
                .collect();
            let output = json!({
                "reasoning": plan.reasoning,
                "direct_response": plan.direct_response,
                "levels": levels,
            });
            Ok(serde_json::to_string_pretty(&output)?)
        }
    }
}

/// Print the effective configuration
pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", toml::to_string_pretty(config)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

/// Print where the configuration is read from
pub fn handle_config_path(override_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };
    match format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => println!("{}", json!({ "path": path })),
    }
    Ok(())
}
