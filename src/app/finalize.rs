use tracing::{info, warn};

use crate::domain::RunConfig;
use crate::report::{RunReport, render_text, write_json, write_text_report};

/// Prints the final report and writes the requested artifacts. Write
/// failures are warned about and never change the outcome of the run.
pub(crate) async fn finalize_run(config: &RunConfig, report: &RunReport) {
    println!();
    print!("{}", render_text(report));

    if let Some(dir) = config.output_dir.as_deref() {
        match write_text_report(dir, report).await {
            Ok(path) => {
                info!(path = %path.display(), "Report written");
                println!("Report saved to {}", path.display());
            }
            Err(err) => warn!(dir = %dir.display(), error = %err, "Failed to write report"),
        }
    }

    if let Some(path) = config.export_json.as_deref() {
        match write_json(path, report).await {
            Ok(()) => println!("JSON report saved to {}", path.display()),
            Err(err) => warn!(path = %path.display(), error = %err, "Failed to export JSON report"),
        }
    }
}
