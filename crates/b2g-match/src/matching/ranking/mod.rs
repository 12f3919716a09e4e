//! Lead ranking: scores a filtered candidate set against one subject and
//! summarizes the best page of results.

mod filters;
mod opportunities;
mod pipeline;
mod summary;

pub use filters::{
    AgeBracket, CandidateFilter, CandidateQuery, FilterError, RawCandidateFilter, StatusFilter,
};
pub use opportunities::{rank_opportunities, OpportunityRanking, OpportunityStats, RankedOpportunity};
pub use pipeline::{RankedLead, RankingError, RankingPipeline, RankingResult};
pub use summary::{executive_summary, PotentialCounts, RankingStats};

use std::time::Duration;

/// Tunables for the ranking pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    /// Same-division candidates are dropped only above this many candidates.
    pub competitor_exclusion_threshold: usize,
    /// Ceiling on candidates scored per request.
    pub max_processing: usize,
    /// Share of a candidate's capital used as the synthesized project value.
    pub estimated_value_fraction: f64,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub timeout: Option<Duration>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            competitor_exclusion_threshold: 100,
            max_processing: 100,
            estimated_value_fraction: 0.05,
            default_page_size: 50,
            max_page_size: 500,
            timeout: None,
        }
    }
}
