//! Detect command - decide whether the application needs Tomcat

use crate::cli::args::DetectArgs;
use crate::config::Config;
use crate::dependency::{BuildPlan, PlanEntry};
use crate::error::{TomcatError, TomcatResult};
use crate::home::TOMCAT_DEPENDENCY;
use crate::ui;
use std::path::Path;
use tracing::debug;

/// Directory that marks a servlet web application
const WEB_INF: &str = "WEB-INF";

/// Execute the detect command. Returns `false` when detection fails.
pub async fn execute(args: DetectArgs, config: &Config) -> TomcatResult<bool> {
    if !is_web_application(&args.app).await {
        debug!("No {} in {}", WEB_INF, args.app.display());
        ui::step_info(&format!("No {} directory found", WEB_INF));
        return Ok(false);
    }

    let plan = build_plan(config);
    let content = toml::to_string(&plan)?;
    tokio::fs::write(&args.plan, content).await.map_err(|e| {
        TomcatError::io(format!("writing build plan {}", args.plan.display()), e)
    })?;

    ui::step_ok_detail("Servlet application detected", WEB_INF);
    Ok(true)
}

async fn is_web_application(app: &Path) -> bool {
    tokio::fs::metadata(app.join(WEB_INF))
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Plan requiring Tomcat at launch
fn build_plan(config: &Config) -> BuildPlan {
    let mut entry = PlanEntry::new(TOMCAT_DEPENDENCY);
    entry.version = config.tomcat.default_version.clone();
    entry
        .metadata
        .insert("launch".to_string(), toml::Value::Boolean(true));

    BuildPlan {
        entries: vec![entry],
    }
}
