//! Dependency resolution
//!
//! Picks the version constraint for a dependency and resolves it against
//! the buildpack catalogue:
//! 1. `version` requested by the merged build plan entry
//! 2. `[metadata.default_versions]` in buildpack.toml
//! 3. any version

use crate::dependency::{BuildPlan, BuildpackDescriptor, Dependency};
use crate::error::TomcatResult;
use tracing::debug;

/// Version constraint requested for `id`
pub fn requested_version(
    id: &str,
    plan: &BuildPlan,
    buildpack: &BuildpackDescriptor,
) -> TomcatResult<String> {
    let entry = plan.shallow_merged(id)?;

    if let Some(version) = entry.requested_version() {
        debug!("Build plan requests {} {}", id, version);
        return Ok(version.to_string());
    }

    if let Some(version) = buildpack.default_version(id) {
        debug!("Using buildpack default version {} {}", id, version);
        return Ok(version.to_string());
    }

    Ok("*".to_string())
}

/// Resolve `id` from the plan against the buildpack's dependencies
pub fn resolve_dependency(
    id: &str,
    plan: &BuildPlan,
    buildpack: &BuildpackDescriptor,
    stack: &str,
) -> TomcatResult<Dependency> {
    let constraint = requested_version(id, plan, buildpack)?;
    let dep = buildpack.dependencies().best(id, &constraint, stack)?;
    debug!("Resolved {} {} to {}", id, constraint, dep);
    Ok(dep)
}
