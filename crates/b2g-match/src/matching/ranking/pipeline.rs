use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use super::super::directory::{CandidateSource, DirectoryError};
use super::super::domain::{CompanyProfile, CounterpartProfile};
use super::super::scoring::{
    Classification, ScoringEngine, ScoringError, SectorComplementarity, SectorTargets,
};
use super::filters::{CandidateFilter, CandidateQuery};
use super::summary::{
    executive_summary, round_one, RankingStats, POTENTIAL_HIGH, POTENTIAL_LOW, POTENTIAL_MEDIUM,
};
use super::RankingConfig;

/// One scored lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLead {
    pub candidate: CompanyProfile,
    /// Final score after the complementarity bonus, one decimal.
    pub compatibility: f64,
    pub potential: String,
    pub base_score: f64,
    pub bonus: f64,
    pub classification: Classification,
    pub target_match: bool,
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingResult {
    pub results: Vec<RankedLead>,
    /// Candidates left after filtering, before the processing cap.
    pub total_candidates: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub stats: RankingStats,
    pub executive_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RankingResult {
    fn empty(filter: &CandidateFilter, stats: RankingStats, message: &str) -> Self {
        Self {
            results: Vec::new(),
            total_candidates: 0,
            page: filter.page,
            page_size: filter.page_size,
            total_pages: 0,
            stats,
            executive_summary: String::new(),
            message: Some(message.to_string()),
        }
    }

    /// The deadline expired and only part of the candidates were scored.
    pub fn timed_out(&self) -> bool {
        self.stats.timed_out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error(transparent)]
    Source(#[from] DirectoryError),
}

enum Outcome {
    Scored(RankedLead),
    Skipped,
    Expired,
}

/// Ranks candidate companies as leads for one subject.
#[derive(Clone)]
pub struct RankingPipeline {
    engine: ScoringEngine,
    complementarity: Option<Arc<dyn SectorComplementarity>>,
    config: RankingConfig,
}

impl RankingPipeline {
    pub fn new(engine: ScoringEngine, config: RankingConfig) -> Self {
        Self {
            engine,
            complementarity: None,
            config,
        }
    }

    pub fn with_complementarity(mut self, table: Arc<dyn SectorComplementarity>) -> Self {
        self.complementarity = Some(table);
        self
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn rank<S>(
        &self,
        subject: &CompanyProfile,
        source: &S,
        filter: &CandidateFilter,
    ) -> Result<RankingResult, RankingError>
    where
        S: CandidateSource + ?Sized,
    {
        let started = Instant::now();
        let deadline = self.config.timeout.map(|timeout| started + timeout);
        let subject_sector = subject.primary_sector.clone();
        let mut stats = RankingStats {
            subject_sector: subject_sector.clone(),
            ..RankingStats::default()
        };

        let targets = self.targets(subject);
        tracing::debug!(
            sector = subject_sector.as_ref().map(|code| code.as_str()),
            primary = targets.as_ref().map_or(0, |t| t.primary.len()),
            secondary = targets.as_ref().map_or(0, |t| t.secondary.len()),
            "target sectors resolved"
        );

        let mut candidates = load_excluding(source, &filter.query, subject)?;
        if candidates.is_empty() {
            tracing::info!("no candidates matched the filters, relaxing to active companies");
            stats.relaxed = true;
            let fallback = CandidateQuery::active_only(filter.query.reference_date);
            candidates = load_excluding(source, &fallback, subject)?;
        }
        stats.loaded = candidates.len();
        if candidates.is_empty() {
            return Ok(RankingResult::empty(
                filter,
                stats,
                "no companies found for the given filters",
            ));
        }
        tracing::debug!(loaded = stats.loaded, relaxed = stats.relaxed, "candidates loaded");

        if let Some(targets) = &targets {
            let matching = candidates
                .iter()
                .filter(|candidate| is_target(targets, candidate))
                .count();
            stats.target_matches = matching;
            if matching > 0 {
                candidates.retain(|candidate| is_target(targets, candidate));
            }
            tracing::debug!(matching, "target-sector candidates");
        }

        if candidates.len() > self.config.competitor_exclusion_threshold {
            if let Some(sector) = &subject_sector {
                let before = candidates.len();
                candidates.retain(|candidate| {
                    !candidate
                        .primary_sector
                        .as_ref()
                        .is_some_and(|code| code.same_division(sector))
                });
                stats.competitors_removed = before - candidates.len();
                tracing::debug!(removed = stats.competitors_removed, "competitors removed");
            }
        }

        let total_candidates = candidates.len();
        if candidates.is_empty() {
            return Ok(RankingResult::empty(
                filter,
                stats,
                "no non-competing companies found",
            ));
        }

        candidates.sort_by(|left, right| right.capital.total_cmp(&left.capital));
        let ceiling = filter.max_processing.unwrap_or(self.config.max_processing);
        if candidates.len() > ceiling {
            tracing::warn!(
                candidates = candidates.len(),
                ceiling,
                "candidate volume above the processing ceiling"
            );
            candidates.truncate(ceiling);
            stats.processing_capped = true;
        }
        stats.processed = candidates.len();

        let outcomes: Vec<Outcome> = candidates
            .into_par_iter()
            .map(|candidate| {
                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    return Outcome::Expired;
                }
                match self.score_candidate(subject, candidate, targets.as_ref()) {
                    Ok(lead) => Outcome::Scored(lead),
                    Err((cnpj, error)) => {
                        tracing::warn!(cnpj = cnpj.as_deref(), %error, "candidate skipped");
                        Outcome::Skipped
                    }
                }
            })
            .collect();

        let mut leads = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Outcome::Scored(lead) => leads.push(lead),
                Outcome::Skipped => stats.skipped += 1,
                Outcome::Expired => stats.timed_out = true,
            }
        }
        stats.scored = leads.len();

        leads.sort_by(|left, right| {
            right
                .compatibility
                .partial_cmp(&left.compatibility)
                .unwrap_or(Ordering::Equal)
                .then_with(|| right.candidate.capital.total_cmp(&left.candidate.capital))
        });

        let total_pages = total_candidates.div_ceil(filter.page_size);
        let offset = (filter.page - 1).saturating_mul(filter.page_size);
        let page: Vec<RankedLead> = leads
            .into_iter()
            .skip(offset)
            .take(filter.page_size)
            .collect();
        stats.describe_page(&page);

        let summary = executive_summary(
            &stats,
            filter.query.state.map(|state| state.code()),
            filter.query.municipality.as_deref(),
        );

        tracing::info!(
            loaded = stats.loaded,
            processed = stats.processed,
            scored = stats.scored,
            skipped = stats.skipped,
            returned = stats.returned,
            timed_out = stats.timed_out,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "lead ranking finished"
        );

        Ok(RankingResult {
            results: page,
            total_candidates,
            page: filter.page,
            page_size: filter.page_size,
            total_pages,
            stats,
            executive_summary: summary,
            message: None,
        })
    }

    fn targets(&self, subject: &CompanyProfile) -> Option<SectorTargets> {
        let table = self.complementarity.as_ref()?;
        let sector = subject.primary_sector.as_ref()?;
        table.targets(sector).filter(|targets| !targets.is_empty())
    }

    fn score_candidate(
        &self,
        subject: &CompanyProfile,
        candidate: CompanyProfile,
        targets: Option<&SectorTargets>,
    ) -> Result<RankedLead, (Option<String>, ScoringError)> {
        let counterpart = self.counterpart_for(&candidate);
        let result = match self.engine.try_calculate(subject, &counterpart) {
            Ok(result) => result,
            Err(error) => return Err((candidate.cnpj.map(|cnpj| cnpj.to_string()), error)),
        };

        let pair = match (
            self.complementarity.as_ref(),
            subject.primary_sector.as_ref(),
            candidate.primary_sector.as_ref(),
        ) {
            (Some(table), Some(own), Some(other)) => table.complementarity(own, other),
            _ => None,
        };

        let bonus = pair
            .as_ref()
            .map(|pair| pair.bonus)
            .filter(|bonus| bonus.is_finite())
            .unwrap_or(0.0);
        let potential = pair
            .and_then(|pair| pair.potential_label)
            .unwrap_or_else(|| derived_potential(result.classification).to_string());
        let compatibility = (result.score_total + bonus).clamp(0.0, 100.0);
        let target_match = targets.is_some_and(|targets| is_target(targets, &candidate));

        Ok(RankedLead {
            compatibility: round_one(compatibility),
            potential,
            base_score: round_one(result.score_total),
            bonus,
            classification: Classification::from_score(compatibility),
            target_match,
            alerts: result.alerts,
            candidate,
        })
    }

    /// Describe the candidate as if it had published a project of its own.
    fn counterpart_for(&self, candidate: &CompanyProfile) -> CounterpartProfile {
        CounterpartProfile {
            company: CompanyProfile {
                primary_sector: candidate.primary_sector.clone(),
                state: candidate.state.clone(),
                municipality: candidate.municipality.clone(),
                ..CompanyProfile::default()
            },
            reference: candidate.cnpj.as_ref().map(|cnpj| cnpj.to_string()),
            estimated_value: candidate.capital * self.config.estimated_value_fraction,
            preferred_sizes: candidate.size.into_iter().collect(),
            requires_experience: false,
            requires_certificates: false,
            keywords: Vec::new(),
        }
    }
}

impl std::fmt::Debug for RankingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingPipeline")
            .field("engine", &self.engine)
            .field("complementarity", &self.complementarity.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Load candidates, leaving the subject itself out.
fn load_excluding<S>(
    source: &S,
    query: &CandidateQuery,
    subject: &CompanyProfile,
) -> Result<Vec<CompanyProfile>, DirectoryError>
where
    S: CandidateSource + ?Sized,
{
    let mut candidates = source.candidates(query)?;
    if subject.cnpj.is_some() {
        candidates.retain(|candidate| candidate.cnpj != subject.cnpj);
    }
    Ok(candidates)
}

fn is_target(targets: &SectorTargets, candidate: &CompanyProfile) -> bool {
    candidate
        .primary_sector
        .as_ref()
        .is_some_and(|code| targets.matches(code))
}

fn derived_potential(classification: Classification) -> &'static str {
    match classification {
        Classification::VeryHigh | Classification::High => POTENTIAL_HIGH,
        Classification::Medium => POTENTIAL_MEDIUM,
        Classification::Low | Classification::VeryLow => POTENTIAL_LOW,
    }
}
