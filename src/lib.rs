//! # bestiary
//!
//! Offline tooling that turns the D&D 5e SRD monster API into static
//! TypeScript data modules.
//!
//! The pipeline has two stages joined by a JSON document on disk:
//!
//! 1. [`Fetcher`] walks the SRD monster list, skips excluded monsters,
//!    normalizes each payload into a [`Monster`] and buckets it into one of six
//!    challenge rating [`Band`]s, producing a [`Document`]
//! 2. an emitter renders every non-empty band as a TypeScript module, either
//!    one file per band ([`emit_single`]) or size-bounded parts
//!    ([`emit_chunked`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use bestiary::{Config, Fetcher, emit_chunked};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!
//!     let fetcher = Fetcher::new(config.fetch.clone())?;
//!     let (document, report) = fetcher.run().await?;
//!     println!("accepted {} monsters", report.accepted);
//!     document.save(&config.document_path)?;
//!
//!     let written = emit_chunked(&document, &config.emit)?;
//!     println!("wrote {} modules", written.files.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Challenge rating bands
pub mod band;
/// Configuration types
pub mod config;
/// JSON interchange document
pub mod document;
/// TypeScript module emitters
pub mod emit;
/// Error types
pub mod error;
/// SRD API access and monster selection
pub mod fetcher;
/// TypeScript rendering of single records
pub mod render;
/// Retry logic with exponential backoff
pub mod retry;
/// Core record types
pub mod types;


// Re-export commonly used types
pub use band::Band;
pub use config::{Config, EmitConfig, FetchConfig, RetryConfig, ThrottleConfig};
pub use document::Document;
pub use emit::{EmitReport, WrittenFile, emit_chunked, emit_single};
pub use error::{Error, Result};
pub use fetcher::{ApiClient, FetchReport, Fetcher, MonsterSource};
pub use render::{line_count, render_monster};
pub use types::{AbilityScores, Attack, LegendaryAction, Monster, SpecialAbility, TextMap};
