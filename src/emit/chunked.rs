//! Size-bounded modules
//!
//! Each band is packed greedily, in order, into chunks whose estimated size
//! stays within `max_lines`. The estimate starts every chunk at
//! `header_overhead` lines and adds the rendered line count of each record.
//! A record that alone exceeds the limit still gets a chunk of its own.

use super::{
    EmitReport, ModuleSource, SOURCE_NOTE, module_path, stem_export_name, write_module,
};
use crate::band::Band;
use crate::config::EmitConfig;
use crate::document::Document;
use crate::error::Result;
use crate::render::line_count;
use crate::types::Monster;
use std::path::PathBuf;
use tracing::{debug, info};

const SPLIT_NOTE: &str =
    "Part of the monster database split for maintainability (<300 lines per file)";

/// Greedy order-preserving packing of `items` into chunks
///
/// The running size starts at `header_overhead`. An item that would push a
/// non-empty chunk past `max_lines` closes it and starts the next one.
/// Concatenating the chunks yields the input in order, and no chunk is empty.
pub fn split_into_chunks<T>(
    items: &[T],
    max_lines: usize,
    header_overhead: usize,
    mut lines_of: impl FnMut(&T) -> usize,
) -> Vec<Vec<&T>> {
    let mut chunks = Vec::new();
    let mut current: Vec<&T> = Vec::new();
    let mut current_lines = header_overhead;

    for item in items {
        let lines = lines_of(item);
        if current_lines + lines > max_lines && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_lines = header_overhead;
        }
        current.push(item);
        current_lines += lines;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Write every non-empty band as one or more size-bounded modules
///
/// A band that fits in one chunk is written to `<baseName>.<ext>`; otherwise
/// chunk `i` (1-indexed) goes to `<baseName>Part<i>.<ext>`.
///
/// # Errors
/// Returns error if the output directory or a module cannot be written
pub fn emit_chunked(document: &Document, config: &EmitConfig) -> Result<EmitReport> {
    let mut report = EmitReport::default();

    for (band, monsters) in document.bands() {
        if monsters.is_empty() {
            debug!(band = %band, "band is empty, no module written");
            continue;
        }

        let chunks = split_into_chunks(monsters, config.max_lines, config.header_overhead, line_count);
        let planned = plan_modules(band, chunks.len());
        debug!(band = %band, records = monsters.len(), chunks = chunks.len(), "split band");

        let outputs: Vec<PathBuf> = planned
            .iter()
            .map(|(stem, _)| module_path(config, stem))
            .collect();
        report
            .removed
            .extend(handle_stale_parts(band, &outputs, config)?);

        for ((stem, title), chunk) in planned.iter().zip(&chunks) {
            let export_name = stem_export_name(stem);
            let source = ModuleSource {
                title,
                notes: &[SPLIT_NOTE, SOURCE_NOTE],
                export_name: &export_name,
                monsters: chunk,
            };
            let path = module_path(config, stem);
            report.files.push(write_module(&path, band, &source, config)?);
        }
    }

    info!(
        files = report.files.len(),
        records = report.records(),
        "split modules written"
    );
    Ok(report)
}

/// File stem and header title for each chunk of a band
fn plan_modules(band: Band, chunks: usize) -> Vec<(String, String)> {
    if chunks == 1 {
        return vec![(band.base_name().to_string(), band.label().to_string())];
    }
    (1..=chunks)
        .map(|i| {
            (
                format!("{}Part{}", band.base_name(), i),
                format!("{} Part {}", band.label(), i),
            )
        })
        .collect()
}

/// Find this band's modules left over from earlier runs
///
/// They are deleted when `prune_stale_parts` is set and only reported
/// otherwise.
fn handle_stale_parts(band: Band, outputs: &[PathBuf], config: &EmitConfig) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(&config.output_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut removed = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_band_module(name, band, &config.file_extension) || outputs.contains(&path) {
            continue;
        }

        if config.prune_stale_parts {
            std::fs::remove_file(&path)?;
            info!(path = %path.display(), band = %band, "removed stale module");
            removed.push(path);
        } else {
            debug!(path = %path.display(), band = %band, "stale module left in place");
        }
    }
    removed.sort();
    Ok(removed)
}

/// `<baseName>.<ext>` or `<baseName>Part<N>.<ext>` for this band
fn is_band_module(file_name: &str, band: Band, extension: &str) -> bool {
    let Some(stem) = file_name
        .strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
    else {
        return false;
    };
    let Some(rest) = stem.strip_prefix(band.base_name()) else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    rest.strip_prefix("Part")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}
