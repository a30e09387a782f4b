//! Challenge rating bands
//!
//! Six fixed, disjoint rating ranges. A rating belongs to the first band (in
//! ascending order) whose inclusive upper bound is not below it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six difficulty bands
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    /// CR 0-2
    #[serde(rename = "CR 0-2")]
    Low,
    /// CR 3-5
    #[serde(rename = "CR 3-5")]
    Mid,
    /// CR 6-10
    #[serde(rename = "CR 6-10")]
    High,
    /// CR 11-15
    #[serde(rename = "CR 11-15")]
    VeryHigh,
    /// CR 16-20
    #[serde(rename = "CR 16-20")]
    Epic,
    /// CR 21-30
    #[serde(rename = "CR 21-30")]
    Legendary,
}

impl Band {
    /// All bands in ascending order
    pub const ALL: [Band; 6] = [
        Band::Low,
        Band::Mid,
        Band::High,
        Band::VeryHigh,
        Band::Epic,
        Band::Legendary,
    ];

    /// Band for a challenge rating, `None` above 30 (or for NaN)
    pub fn for_rating(rating: f64) -> Option<Band> {
        Band::ALL
            .into_iter()
            .find(|band| rating <= band.upper_bound())
    }

    /// Inclusive upper bound of the band
    pub fn upper_bound(self) -> f64 {
        match self {
            Band::Low => 2.0,
            Band::Mid => 5.0,
            Band::High => 10.0,
            Band::VeryHigh => 15.0,
            Band::Epic => 20.0,
            Band::Legendary => 30.0,
        }
    }

    /// Human-readable label, also the document key
    pub fn label(self) -> &'static str {
        match self {
            Band::Low => "CR 0-2",
            Band::Mid => "CR 3-5",
            Band::High => "CR 6-10",
            Band::VeryHigh => "CR 11-15",
            Band::Epic => "CR 16-20",
            Band::Legendary => "CR 21-30",
        }
    }

    /// Base name of the generated module(s) for this band
    pub fn base_name(self) -> &'static str {
        match self {
            Band::Low => "monstersLowCR",
            Band::Mid => "monstersMidCR",
            Band::High => "monstersHighCR",
            Band::VeryHigh => "monstersVeryHighCR",
            Band::Epic => "monstersEpicCR",
            Band::Legendary => "monstersLegendaryCR",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
