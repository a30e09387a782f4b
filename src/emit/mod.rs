//! TypeScript module generation
//!
//! Two emitters read a [`Document`](crate::document::Document) and write one
//! TypeScript module per non-empty band:
//!
//! - [`emit_single`] writes each band to a single `<baseName>.ts` with no size
//!   limit
//! - [`emit_chunked`] packs each band into files of at most `max_lines`
//!   estimated lines, numbering them `<baseName>Part<i>.ts` when more than one
//!   is needed
//!
//! Every generated module has the same shape: a doc comment header, an import
//! of the record type, and one exported `Record<string, Monster>` constant
//! holding the rendered entries.

pub mod chunked;
pub mod single;

pub use chunked::{emit_chunked, split_into_chunks};
pub use single::emit_single;

use crate::band::Band;
use crate::config::EmitConfig;
use crate::error::Result;
use crate::render::render_monster;
use crate::types::Monster;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const DATABASE_TITLE: &str = "D&D 5e SRD Monster Database";
pub(crate) const SOURCE_NOTE: &str = "Monsters imported from the 5e-database API (https://www.dnd5eapi.co)";

/// A TypeScript module written by an emitter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenFile {
    /// Where the module was written
    pub path: PathBuf,
    /// Band the records belong to
    pub band: Band,
    /// Name of the exported constant
    pub export_name: String,
    /// Number of records in the module
    pub records: usize,
}

/// Outcome of one emitter run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Modules written, in band order
    pub files: Vec<WrittenFile>,
    /// Stale part files deleted before writing
    pub removed: Vec<PathBuf>,
}

impl EmitReport {
    /// Total records across all written modules
    pub fn records(&self) -> usize {
        self.files.iter().map(|f| f.records).sum()
    }
}

/// Everything needed to lay out one generated module
pub(crate) struct ModuleSource<'a> {
    /// Suffix of the header title, e.g. `CR 0-2` or `CR 0-2 Part 1`
    pub title: &'a str,
    /// Header lines printed after the title
    pub notes: &'a [&'a str],
    pub export_name: &'a str,
    pub monsters: &'a [&'a Monster],
}

/// Lay out a complete module: header, import, export and entries
pub(crate) fn render_module(source: &ModuleSource<'_>, config: &EmitConfig) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "/**\n * {} - {}\n *", DATABASE_TITLE, source.title);
    for note in source.notes {
        let _ = writeln!(out, " * {note}");
    }
    let _ = write!(
        out,
        " */\n\nimport {{ {ty} }} from '{module}';\n\nexport const {name}: Record<string, {ty}> = {{\n",
        ty = config.type_name,
        module = config.type_module,
        name = source.export_name,
    );

    let entries: Vec<String> = source
        .monsters
        .iter()
        .map(|m| render_monster(m))
        .collect();
    out.push_str(&entries.join(",\n\n"));
    out.push_str("\n};\n");
    out
}

/// Write a generated module, creating the output directory when needed
pub(crate) fn write_module(
    path: &Path,
    band: Band,
    source: &ModuleSource<'_>,
    config: &EmitConfig,
) -> Result<WrittenFile> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_module(source, config))?;

    info!(
        path = %path.display(),
        band = %band,
        records = source.monsters.len(),
        "generated module"
    );

    Ok(WrittenFile {
        path: path.to_path_buf(),
        band,
        export_name: source.export_name.to_string(),
        records: source.monsters.len(),
    })
}

/// `<output_dir>/<stem>.<ext>`
pub(crate) fn module_path(config: &EmitConfig, stem: &str) -> PathBuf {
    config
        .output_dir
        .join(format!("{}.{}", stem, config.file_extension))
}

/// Export name derived from a band label: `CR 11-15` → `MONSTERS_CR_11_15`
pub fn label_export_name(band: Band) -> String {
    format!(
        "MONSTERS_{}",
        band.label().to_uppercase().replace([' ', '-'], "_")
    )
}

/// Export name derived from a file stem: `monstersLowCRPart1` → `MONSTERS_LOWCRPART1`
pub fn stem_export_name(stem: &str) -> String {
    stem.replacen("monsters", "MONSTERS_", 1).to_uppercase()
}
