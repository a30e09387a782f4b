//! One module per band, no size limit

use super::{EmitReport, ModuleSource, SOURCE_NOTE, label_export_name, module_path, write_module};
use crate::config::EmitConfig;
use crate::document::Document;
use crate::error::Result;
use crate::types::Monster;
use tracing::debug;

const USAGE_NOTE: &str =
    "Used for encounter generation, combat resolution, and idle phase encounters.";

/// Write every non-empty band to `<output_dir>/<baseName>.<ext>`
///
/// Existing files are overwritten. Empty bands produce no file.
///
/// # Errors
/// Returns error if the output directory or a module cannot be written
pub fn emit_single(document: &Document, config: &EmitConfig) -> Result<EmitReport> {
    let mut report = EmitReport::default();

    for (band, monsters) in document.bands() {
        if monsters.is_empty() {
            debug!(band = %band, "band is empty, no module written");
            continue;
        }

        let monsters: Vec<&Monster> = monsters.iter().collect();
        let export_name = label_export_name(band);
        let source = ModuleSource {
            title: band.label(),
            notes: &[SOURCE_NOTE, USAGE_NOTE],
            export_name: &export_name,
            monsters: &monsters,
        };

        let path = module_path(config, band.base_name());
        report.files.push(write_module(&path, band, &source, config)?);
    }

    Ok(report)
}
