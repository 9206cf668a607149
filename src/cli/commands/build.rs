//! Build command - contribute the Tomcat layer

use crate::artifact::{CachedFetcher, TarGzExtractor};
use crate::cli::args::BuildArgs;
use crate::config::{Config, ConfigManager};
use crate::dependency::{resolve_dependency, BuildPlan, BuildpackDescriptor, Dependency};
use crate::error::{TomcatError, TomcatResult};
use crate::home::{CatalinaHome, Contribution, TOMCAT_DEPENDENCY};
use crate::layer::{EnvPhase, FsLayers, Layer};
use crate::ui;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// What a build produced
struct BuildReport {
    dependency: Dependency,
    contribution: Contribution,
    root: PathBuf,
    launch_env: BTreeMap<String, String>,
}

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> TomcatResult<()> {
    let config = config.clone();

    // Extraction and hashing block; keep them off the async workers
    let report = tokio::task::spawn_blocking(move || contribute(&args, &config))
        .await
        .map_err(|e| TomcatError::Internal(format!("build task failed: {}", e)))??;

    ui::section(&report.dependency.to_string());
    ui::step_ok_detail(
        &format!("Layer {}", report.contribution),
        &report.root.display().to_string(),
    );
    for (key, value) in &report.launch_env {
        ui::key_value(key, value);
    }
    Ok(())
}

fn contribute(args: &BuildArgs, config: &Config) -> TomcatResult<BuildReport> {
    let plan = BuildPlan::from_file(&args.plan)?;
    let buildpack = BuildpackDescriptor::from_dir(&args.buildpack)?;
    let dependency = resolve_dependency(TOMCAT_DEPENDENCY, &plan, &buildpack, &args.stack)?;

    let cache_dir = ConfigManager::cache_dir(config);
    debug!("Archive cache: {}", cache_dir.display());
    let fetcher = CachedFetcher::new(cache_dir).offline(args.offline || config.cache.offline);

    let layers = FsLayers::new(&args.layers);
    let mut home = CatalinaHome::new(
        dependency.clone(),
        layers.layer(TOMCAT_DEPENDENCY),
        &layers,
        &fetcher,
        &TarGzExtractor,
    )
    .with_env_var(config.tomcat.env_var.as_str())
    .with_command(config.tomcat.command.as_str());

    let contribution = home.contribute()?;

    // What the launcher will see from this layer alone
    let launch_env = home
        .layer()
        .env()?
        .apply(EnvPhase::Launch, &BTreeMap::new());

    Ok(BuildReport {
        dependency,
        contribution,
        root: home.layer().root().to_path_buf(),
        launch_env,
    })
}
