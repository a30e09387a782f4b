//! Monster selection from the SRD API
//!
//! The [`Fetcher`] walks the monster list in source order and builds a
//! [`Document`] of up to `target_count` records. The order of checks per
//! list entry matters:
//!
//! 1. excluded indices are skipped without any request
//! 2. the run stops once `target_count` records have been accepted
//! 3. the detail payload is fetched
//! 4. low-rating candidates are throttled once enough records were accepted
//! 5. the payload is normalized and bucketed into its band
//!
//! A failure for one candidate (request, payload or normalization) is logged
//! and that candidate is skipped. Only a failed list request aborts the run.

pub mod normalize;
pub mod source;

pub use normalize::{ApiMonster, MonsterRef, normalize};
pub use source::{ApiClient, MonsterSource};

use crate::band::Band;
use crate::config::FetchConfig;
use crate::document::Document;
use crate::error::Result;
use crate::types::Monster;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Counters describing one fetch run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Entries returned by the list endpoint
    pub listed: usize,
    /// Records accepted into the document
    pub accepted: usize,
    /// Entries skipped because their index is excluded
    pub excluded: usize,
    /// Candidates skipped by the low-rating throttle
    pub throttled: usize,
    /// Candidates skipped because fetching or normalizing them failed
    pub failed: usize,
}

/// Selects and normalizes monsters from a [`MonsterSource`]
pub struct Fetcher {
    config: FetchConfig,
    source: Box<dyn MonsterSource>,
    exclude: HashSet<String>,
}

impl Fetcher {
    /// Create a fetcher over the SRD REST API
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = ApiClient::new(&config)?;
        Ok(Self::with_source(config, Box::new(client)))
    }

    /// Create a fetcher over any monster source
    pub fn with_source(config: FetchConfig, source: Box<dyn MonsterSource>) -> Self {
        let exclude = config.exclude.iter().cloned().collect();
        Self {
            config,
            source,
            exclude,
        }
    }

    /// Run the selection and return the resulting document
    ///
    /// # Errors
    /// Returns error only if the monster list cannot be fetched
    pub async fn run(&self) -> Result<(Document, FetchReport)> {
        let entries = self.source.list().await?;
        info!(
            listed = entries.len(),
            target = self.config.target_count,
            "fetched monster list"
        );

        let mut document = Document::new();
        let mut report = FetchReport {
            listed: entries.len(),
            ..Default::default()
        };

        for entry in &entries {
            if self.exclude.contains(&entry.index) {
                debug!(index = %entry.index, "skipping excluded monster");
                report.excluded += 1;
                continue;
            }

            if report.accepted >= self.config.target_count {
                break;
            }

            match self.consider(entry, report.accepted).await {
                Ok(Some((band, monster))) => {
                    info!(
                        index = %monster.index,
                        rating = monster.challenge_rating,
                        band = %band,
                        accepted = report.accepted + 1,
                        "accepted monster"
                    );
                    document.push(band, monster);
                    report.accepted += 1;
                    tokio::time::sleep(self.config.request_delay).await;
                }
                Ok(None) => report.throttled += 1,
                Err(e) => {
                    warn!(monster = %entry.name, error = %e, "failed to fetch monster, skipping");
                    report.failed += 1;
                }
            }
        }

        info!(
            accepted = report.accepted,
            excluded = report.excluded,
            throttled = report.throttled,
            failed = report.failed,
            "fetch complete"
        );
        for (band, monsters) in document.bands() {
            info!(band = %band, count = monsters.len(), "band summary");
        }

        Ok((document, report))
    }

    /// Fetch and normalize one candidate; `None` when throttled
    async fn consider(
        &self,
        entry: &MonsterRef,
        accepted: usize,
    ) -> Result<Option<(Band, Monster)>> {
        let payload = self.source.detail(&entry.index).await?;
        let rating = payload.rating();

        let priority = is_priority(&payload, &entry.name);
        debug!(index = %entry.index, rating, priority, "candidate");

        let throttle = &self.config.throttle;
        if rating < throttle.below_rating && accepted > throttle.after_accepted {
            debug!(index = %entry.index, rating, accepted, "throttling low-rating monster");
            return Ok(None);
        }

        let monster = normalize(payload)?;
        let band = Band::for_rating(rating).unwrap_or_else(|| {
            warn!(
                index = %entry.index,
                rating,
                "challenge rating above the highest band, filing under {}",
                Band::Legendary
            );
            Band::Legendary
        });

        Ok(Some((band, monster)))
    }
}

/// High ratings, legendary actions, or a dragon of rating 10 or more.
///
/// The flag is informational only and never changes which monsters are kept.
/// The dragon check reads `list_name`, the name from the monster list.
pub fn is_priority(payload: &ApiMonster, list_name: &str) -> bool {
    let rating = payload.rating();
    rating >= 11.0
        || payload.has_legendary_actions()
        || (list_name.to_lowercase().contains("dragon") && rating >= 10.0)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
