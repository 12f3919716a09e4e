use std::collections::BTreeMap;

use serde::Serialize;

use super::super::domain::SectorCode;
use super::super::scoring::Classification;
use super::pipeline::RankedLead;

pub(crate) const POTENTIAL_HIGH: &str = "Alto";
pub(crate) const POTENTIAL_MEDIUM: &str = "Médio";
pub(crate) const POTENTIAL_LOW: &str = "Baixo";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PotentialCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PotentialCounts {
    fn record(&mut self, label: &str) {
        match label {
            POTENTIAL_HIGH => self.high += 1,
            POTENTIAL_MEDIUM => self.medium += 1,
            POTENTIAL_LOW => self.low += 1,
            _ => {}
        }
    }
}

/// Pipeline counters plus aggregates over the returned page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingStats {
    pub subject_sector: Option<SectorCode>,
    pub loaded: usize,
    /// Filters were relaxed to active-status-only.
    pub relaxed: bool,
    pub target_matches: usize,
    pub competitors_removed: usize,
    pub processed: usize,
    pub processing_capped: bool,
    pub scored: usize,
    pub skipped: usize,
    pub timed_out: bool,
    pub returned: usize,
    pub mean_score: f64,
    pub max_score: f64,
    pub top_state: Option<String>,
    pub tiers: BTreeMap<Classification, usize>,
    pub potential: PotentialCounts,
    pub states: BTreeMap<String, usize>,
}

impl RankingStats {
    pub(crate) fn describe_page(&mut self, page: &[RankedLead]) {
        self.returned = page.len();
        self.tiers.clear();
        self.states.clear();
        self.potential = PotentialCounts::default();

        if page.is_empty() {
            self.mean_score = 0.0;
            self.max_score = 0.0;
            self.top_state = None;
            return;
        }

        let total: f64 = page.iter().map(|lead| lead.compatibility).sum();
        self.mean_score = round_one(total / page.len() as f64);
        self.max_score = page
            .iter()
            .map(|lead| lead.compatibility)
            .fold(0.0, f64::max);

        for lead in page {
            *self.tiers.entry(lead.classification).or_default() += 1;
            self.potential.record(&lead.potential);
            if let Some(state) = lead.candidate.state.as_deref() {
                *self.states.entry(state.to_string()).or_default() += 1;
            }
        }

        // Ties resolve to the alphabetically first state.
        self.top_state = self
            .states
            .iter()
            .fold(None::<(&String, usize)>, |best, (state, count)| match best {
                Some((_, best_count)) if best_count >= *count => best,
                _ => Some((state, *count)),
            })
            .map(|(state, _)| state.clone());
    }
}

/// Plain-text digest of a ranking run.
pub fn executive_summary(
    stats: &RankingStats,
    state_filter: Option<&str>,
    municipality_filter: Option<&str>,
) -> String {
    let sector = stats
        .subject_sector
        .as_ref()
        .map(SectorCode::to_string)
        .unwrap_or_else(|| "not informed".to_string());

    let mut text = format!(
        "Lead survey for provider sector {sector}. Processed {} non-competing companies and returned {} leads. Mean score {} and maximum {}.",
        stats.processed, stats.returned, stats.mean_score, stats.max_score
    );

    match (state_filter, municipality_filter) {
        (Some(state), Some(municipality)) => text.push_str(&format!(
            " Geographic filter applied: state {state}, municipality {municipality}."
        )),
        (Some(state), None) => {
            text.push_str(&format!(" Geographic filter applied: state {state}."))
        }
        (None, Some(municipality)) => text.push_str(&format!(
            " Geographic filter applied: municipality {municipality}."
        )),
        (None, None) => {}
    }

    if stats.relaxed {
        text.push_str(" No company matched the filters, so the search was widened to active companies.");
    }
    if stats.timed_out {
        text.push_str(" The deadline expired before every candidate was scored.");
    }

    text.push_str(&format!(
        " Target sectors prioritized when available, with potential bonus. Top state: {}. Potential distribution: {POTENTIAL_HIGH} {}, {POTENTIAL_MEDIUM} {}, {POTENTIAL_LOW} {}.",
        stats.top_state.as_deref().unwrap_or("n/a"),
        stats.potential.high,
        stats.potential.medium,
        stats.potential.low
    ));
    text
}

pub(crate) fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
