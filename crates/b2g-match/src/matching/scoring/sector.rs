use std::sync::Arc;

use serde::Serialize;

use super::super::domain::SectorCode;
use super::rules::Assessment;
use super::AlertLog;

/// Relationship between a subject sector and a candidate sector as known to a
/// complementarity table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Complementarity {
    pub is_competitor: bool,
    pub potential_label: Option<String>,
    /// Potential on the `0.0..=1.0` scale.
    pub potential_score: Option<f64>,
    /// Bonus points added to a lead's compatibility.
    pub bonus: f64,
}

impl Complementarity {
    /// Potential clamped to `0.0..=1.0`; non-finite values count as missing.
    pub fn normalized_potential(&self) -> Option<f64> {
        self.potential_score
            .filter(|score| score.is_finite())
            .map(|score| score.clamp(0.0, 1.0))
    }
}

/// Sector class prefixes a provider sells into, split by priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectorTargets {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

impl SectorTargets {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }

    pub fn matches(&self, code: &SectorCode) -> bool {
        self.primary
            .iter()
            .chain(&self.secondary)
            .any(|prefix| !prefix.is_empty() && code.as_str().starts_with(prefix.as_str()))
    }
}

/// Sector-pair knowledge base consulted for competitor detection, potential
/// and target sectors.
pub trait SectorComplementarity: Send + Sync {
    /// `None` when the table holds nothing for the pair.
    fn complementarity(&self, subject: &SectorCode, candidate: &SectorCode)
        -> Option<Complementarity>;

    /// Sectors that typically buy from `provider`.
    fn targets(&self, provider: &SectorCode) -> Option<SectorTargets>;
}

/// Human-readable descriptions of sector codes.
pub trait SectorDirectory: Send + Sync {
    fn describe(&self, code: &SectorCode) -> Option<String>;
}

/// Strategy scoring how well two sector codes fit together.
pub trait SectorFit: Send + Sync {
    fn assess(
        &self,
        subject: &SectorCode,
        counterpart: &SectorCode,
        alerts: &mut AlertLog,
    ) -> Assessment;
}

/// Prefix comparison used when no complementarity table is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixHeuristic;

impl SectorFit for PrefixHeuristic {
    fn assess(
        &self,
        subject: &SectorCode,
        counterpart: &SectorCode,
        alerts: &mut AlertLog,
    ) -> Assessment {
        if subject.same_division(counterpart) {
            alerts.push("same sector, possible competition");
            Assessment::new(0.3, format!("same division ({})", subject.division()))
        } else if subject.section_digit() == counterpart.section_digit() {
            Assessment::new(0.6, "related sectors")
        } else {
            Assessment::new(0.5, "sectors not related")
        }
    }
}

/// Table-backed sector fit; pairs the table does not know use the prefix
/// heuristic.
#[derive(Clone)]
pub struct ComplementarityFit {
    table: Arc<dyn SectorComplementarity>,
}

impl ComplementarityFit {
    pub fn new(table: Arc<dyn SectorComplementarity>) -> Self {
        Self { table }
    }
}

impl SectorFit for ComplementarityFit {
    fn assess(
        &self,
        subject: &SectorCode,
        counterpart: &SectorCode,
        alerts: &mut AlertLog,
    ) -> Assessment {
        let known = self.table.complementarity(subject, counterpart);
        match known {
            Some(pair) if pair.is_competitor => {
                alerts.push("direct competitor");
                Assessment::new(0.1, "direct competitor")
            }
            Some(pair) => match pair.normalized_potential().filter(|score| *score > 0.0) {
                Some(score) => {
                    let label = pair
                        .potential_label
                        .unwrap_or_else(|| "complementary".to_string());
                    Assessment::new(score, format!("complementarity potential: {label}"))
                }
                None => PrefixHeuristic.assess(subject, counterpart, alerts),
            },
            None => PrefixHeuristic.assess(subject, counterpart, alerts),
        }
    }
}

/// Pick the sector strategy once: table-backed when a table is available.
pub fn sector_fit_for(table: Option<Arc<dyn SectorComplementarity>>) -> Arc<dyn SectorFit> {
    match table {
        Some(table) => Arc::new(ComplementarityFit::new(table)),
        None => Arc::new(PrefixHeuristic),
    }
}
