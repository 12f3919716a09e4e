use std::cmp::Ordering;
use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use super::super::domain::{CompanyProfile, CounterpartProfile};
use super::{ScoreResult, ScoringEngine, WeightProfileRegistry};

/// One company scored against a shared counterpart.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub company: CompanyProfile,
    pub result: ScoreResult,
}

/// Score every company against one counterpart, best first. `top_n` keeps
/// only the leading entries.
pub fn score_batch(
    engine: &ScoringEngine,
    companies: &[CompanyProfile],
    counterpart: &CounterpartProfile,
    top_n: Option<usize>,
) -> Vec<BatchEntry> {
    let mut entries: Vec<BatchEntry> = companies
        .par_iter()
        .map(|company| BatchEntry {
            result: engine.calculate(company, counterpart),
            company: company.clone(),
        })
        .collect();

    entries.sort_by(|left, right| {
        right
            .result
            .score_total
            .partial_cmp(&left.result.score_total)
            .unwrap_or(Ordering::Equal)
    });

    if let Some(limit) = top_n {
        entries.truncate(limit);
    }

    tracing::debug!(
        scored = entries.len(),
        profile = engine.profile().key(),
        "batch scoring finished"
    );
    entries
}

/// Score the same pair under every registered weight profile, keyed by
/// profile key.
pub fn compare_profiles(
    registry: &WeightProfileRegistry,
    engine: &ScoringEngine,
    subject: &CompanyProfile,
    counterpart: &CounterpartProfile,
) -> BTreeMap<String, ScoreResult> {
    registry
        .profiles()
        .map(|profile| {
            let scorer = engine.clone().with_profile(profile.clone());
            (
                profile.key().to_string(),
                scorer.calculate(subject, counterpart),
            )
        })
        .collect()
}
