//! Search ordering modes.

use serde::{Deserialize, Serialize};

/// Ordering requested from a post search.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum SearchMode {
    /// Most recent first
    #[default]
    Latest,
    /// Most relevant first
    Top,
}

impl SearchMode {
    /// Value of the v2 `sort_order` query parameter.
    pub fn sort_order(&self) -> &'static str {
        match self {
            SearchMode::Latest => "recency",
            SearchMode::Top => "relevancy",
        }
    }
}
