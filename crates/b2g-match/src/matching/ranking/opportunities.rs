use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;

use super::super::domain::{CompanyProfile, CounterpartProfile};
use super::super::scoring::{ScoreResult, ScoringEngine};
use super::summary::round_one;

const HIGH_COMPATIBILITY: f64 = 80.0;
const MEDIUM_COMPATIBILITY: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedOpportunity {
    pub opportunity: CounterpartProfile,
    pub result: ScoreResult,
}

/// Aggregates over every analysed opportunity, not only the returned ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OpportunityStats {
    pub mean_score: f64,
    /// Score of at least 80.
    pub high: usize,
    /// Score in `60..80`.
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRanking {
    pub analysed: usize,
    pub results: Vec<RankedOpportunity>,
    pub stats: OpportunityStats,
}

/// Score a list of tenders for one subject, best first.
pub fn rank_opportunities(
    engine: &ScoringEngine,
    subject: &CompanyProfile,
    opportunities: Vec<CounterpartProfile>,
    limit: Option<usize>,
) -> OpportunityRanking {
    let mut scored: Vec<RankedOpportunity> = opportunities
        .into_par_iter()
        .filter_map(|opportunity| match engine.try_calculate(subject, &opportunity) {
            Ok(result) => Some(RankedOpportunity {
                opportunity,
                result,
            }),
            Err(error) => {
                tracing::warn!(
                    reference = opportunity.reference.as_deref(),
                    %error,
                    "opportunity skipped"
                );
                None
            }
        })
        .collect();

    scored.sort_by(|left, right| {
        right
            .result
            .score_total
            .partial_cmp(&left.result.score_total)
            .unwrap_or(Ordering::Equal)
    });

    let mut stats = OpportunityStats::default();
    for entry in &scored {
        let score = entry.result.score_total;
        if score >= HIGH_COMPATIBILITY {
            stats.high += 1;
        } else if score >= MEDIUM_COMPATIBILITY {
            stats.medium += 1;
        } else {
            stats.low += 1;
        }
    }
    if !scored.is_empty() {
        let total: f64 = scored.iter().map(|entry| entry.result.score_total).sum();
        stats.mean_score = round_one(total / scored.len() as f64);
    }

    let analysed = scored.len();
    if let Some(limit) = limit {
        scored.truncate(limit);
    }

    tracing::info!(
        analysed,
        returned = scored.len(),
        high = stats.high,
        "opportunity ranking finished"
    );

    OpportunityRanking {
        analysed,
        results: scored,
        stats,
    }
}
