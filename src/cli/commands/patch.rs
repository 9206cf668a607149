//! Patch command - run the CLASSPATH patch on a single script

use crate::cli::args::PatchArgs;
use crate::error::{TomcatError, TomcatResult};
use crate::home::{patch_classpath, patch_startup_script, PatchOutcome};
use crate::ui;

/// Execute the patch command
pub async fn execute(args: PatchArgs) -> TomcatResult<()> {
    let script = args.script.display().to_string();

    if args.dry_run {
        let content = tokio::fs::read_to_string(&args.script)
            .await
            .map_err(|e| TomcatError::patch_io(&args.script, e))?;
        let (_, count) = patch_classpath(&content);
        ui::key_value(&script, &format!("{} replacement(s) needed", count));
        return Ok(());
    }

    let path = args.script.clone();
    let outcome = tokio::task::spawn_blocking(move || patch_startup_script(&path))
        .await
        .map_err(|e| TomcatError::Internal(format!("patch task failed: {}", e)))??;

    match outcome {
        PatchOutcome::Unchanged => ui::step_info(&format!("{} already patched", script)),
        PatchOutcome::Patched(count) => {
            ui::step_ok_detail(&format!("Patched {}", script), &format!("{} line(s)", count))
        }
    }
    Ok(())
}
