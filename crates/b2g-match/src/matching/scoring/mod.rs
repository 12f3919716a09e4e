//! Multi-criteria compatibility scoring between a company and a counterpart.

mod batch;
pub(crate) mod rules;
mod sector;
mod weights;

pub use batch::{compare_profiles, score_batch, BatchEntry};
pub use rules::Assessment;
pub use sector::{
    sector_fit_for, Complementarity, ComplementarityFit, PrefixHeuristic, SectorComplementarity,
    SectorDirectory, SectorFit, SectorTargets,
};
pub use weights::{
    CriterionWeights, WeightProfile, WeightProfileError, WeightProfileRegistry,
    DEFAULT_PROFILE_KEY,
};

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{CompanyProfile, CounterpartProfile};

/// The six scoring criteria, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Sector,
    Location,
    Size,
    Capital,
    Experience,
    Certificates,
}

impl Criterion {
    pub const fn ordered() -> [Criterion; 6] {
        [
            Criterion::Sector,
            Criterion::Location,
            Criterion::Size,
            Criterion::Capital,
            Criterion::Experience,
            Criterion::Certificates,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Criterion::Sector => "sector",
            Criterion::Location => "location",
            Criterion::Size => "size",
            Criterion::Capital => "capital",
            Criterion::Experience => "experience",
            Criterion::Certificates => "certificates",
        }
    }
}

/// Five ordered compatibility tiers; later variants rank higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "Muito Baixa")]
    VeryLow,
    #[serde(rename = "Baixa")]
    Low,
    #[serde(rename = "Média")]
    Medium,
    #[serde(rename = "Alta")]
    High,
    #[serde(rename = "Muito Alta")]
    VeryHigh,
}

impl Classification {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::VeryHigh
        } else if score >= 70.0 {
            Self::High
        } else if score >= 50.0 {
            Self::Medium
        } else if score >= 30.0 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Classification::VeryHigh => "Muito Alta",
            Classification::High => "Alta",
            Classification::Medium => "Média",
            Classification::Low => "Baixa",
            Classification::VeryLow => "Muito Baixa",
        }
    }

    /// Highest tier first, for reports.
    pub const fn descending() -> [Classification; 5] {
        [
            Classification::VeryHigh,
            Classification::High,
            Classification::Medium,
            Classification::Low,
            Classification::VeryLow,
        ]
    }
}

/// Weighted contribution of one criterion, kept for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub name: Criterion,
    pub weight: f64,
    /// Raw score on the 0–100 scale.
    pub score: f64,
    pub contribution: f64,
    pub rationale: String,
}

/// Full breakdown of one `calculate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score_total: f64,
    pub classification: Classification,
    pub criteria: Vec<CriterionResult>,
    pub alerts: Vec<String>,
}

impl ScoreResult {
    fn failed(error: &ScoringError) -> Self {
        Self {
            score_total: 0.0,
            classification: Classification::VeryLow,
            criteria: Vec::new(),
            alerts: vec![format!("scoring failed: {error}")],
        }
    }

    pub fn criterion(&self, criterion: Criterion) -> Option<&CriterionResult> {
        self.criteria.iter().find(|result| result.name == criterion)
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            score_final: self.score_total,
            classification: self.classification,
            alerts: self.alerts.clone(),
        }
    }
}

/// Compact scoring contract for callers that only need the headline figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub score_final: f64,
    pub classification: Classification,
    pub alerts: Vec<String>,
}

/// Degraded-data warnings collected during a single scoring call.
#[derive(Debug, Default)]
pub struct AlertLog {
    entries: Vec<String>,
}

impl AlertLog {
    pub fn push(&mut self, alert: impl Into<String>) {
        self.entries.push(alert.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entries
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("{field} is not a finite amount")]
    NonFiniteAmount { field: &'static str },
}

/// Stateless scorer bound to one weight profile.
///
/// The engine holds no per-call state, so one instance can be shared across
/// threads; every call builds and returns its own alert list.
#[derive(Clone)]
pub struct ScoringEngine {
    profile: WeightProfile,
    sector_fit: Arc<dyn SectorFit>,
    reference_date: NaiveDate,
}

impl ScoringEngine {
    /// Engine using the prefix heuristic for sector fit and today's date for
    /// company age.
    pub fn new(profile: WeightProfile) -> Self {
        Self {
            profile,
            sector_fit: Arc::new(PrefixHeuristic),
            reference_date: Local::now().date_naive(),
        }
    }

    pub fn with_profile(mut self, profile: WeightProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_sector_fit(mut self, sector_fit: Arc<dyn SectorFit>) -> Self {
        self.sector_fit = sector_fit;
        self
    }

    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }

    pub fn profile(&self) -> &WeightProfile {
        &self.profile
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Score a pair without ever failing: internal errors degrade to a zero
    /// score in the lowest tier with the error recorded as an alert.
    pub fn calculate(
        &self,
        subject: &CompanyProfile,
        counterpart: &CounterpartProfile,
    ) -> ScoreResult {
        match self.try_calculate(subject, counterpart) {
            Ok(result) => result,
            Err(error) => {
                tracing::debug!(%error, "scoring degraded to a zero result");
                ScoreResult::failed(&error)
            }
        }
    }

    pub fn try_calculate(
        &self,
        subject: &CompanyProfile,
        counterpart: &CounterpartProfile,
    ) -> Result<ScoreResult, ScoringError> {
        if !subject.capital.is_finite() {
            return Err(ScoringError::NonFiniteAmount { field: "capital" });
        }
        if !counterpart.estimated_value.is_finite() {
            return Err(ScoringError::NonFiniteAmount {
                field: "estimated_value",
            });
        }

        let mut alerts = AlertLog::default();
        let other = &counterpart.company;

        let assessments = [
            (
                Criterion::Sector,
                rules::evaluate_sector(
                    self.sector_fit.as_ref(),
                    subject.primary_sector.as_ref(),
                    other.primary_sector.as_ref(),
                    &mut alerts,
                ),
            ),
            (
                Criterion::Location,
                rules::evaluate_location(
                    subject.state.as_deref(),
                    subject.municipality.as_deref(),
                    other.state.as_deref(),
                    other.municipality.as_deref(),
                    &mut alerts,
                ),
            ),
            (
                Criterion::Size,
                rules::evaluate_size(subject.size, &counterpart.preferred_sizes),
            ),
            (
                Criterion::Capital,
                rules::evaluate_capital(subject.capital, counterpart.estimated_value, &mut alerts),
            ),
            (
                Criterion::Experience,
                rules::evaluate_experience(
                    subject.registered_on.as_ref(),
                    counterpart.requires_experience,
                    self.reference_date,
                    &mut alerts,
                ),
            ),
            (
                Criterion::Certificates,
                rules::evaluate_standing(
                    subject.status,
                    counterpart.requires_certificates,
                    &mut alerts,
                ),
            ),
        ];

        let criteria: Vec<CriterionResult> = assessments
            .into_iter()
            .map(|(criterion, assessment)| {
                let weight = self.profile.weight(criterion);
                let score = assessment.score * 100.0;
                CriterionResult {
                    name: criterion,
                    weight,
                    score,
                    contribution: score * weight,
                    rationale: assessment.rationale,
                }
            })
            .collect();

        let score_total = criteria
            .iter()
            .map(|result| result.contribution)
            .sum::<f64>()
            .clamp(0.0, 100.0);

        Ok(ScoreResult {
            score_total,
            classification: Classification::from_score(score_total),
            criteria,
            alerts: alerts.into_vec(),
        })
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("profile", &self.profile.key())
            .field("reference_date", &self.reference_date)
            .finish()
    }
}
