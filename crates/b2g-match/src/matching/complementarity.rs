//! In-memory sector complementarity table keyed by sector-code prefixes.

use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::domain::{parse_amount, SectorCode};
use super::scoring::{Complementarity, SectorComplementarity, SectorTargets};

/// How a buyer sector relates to a provider sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    #[serde(alias = "concorrente")]
    Competitor,
    /// Buyer is a primary target client of the provider.
    #[serde(alias = "primario", alias = "primário")]
    Primary,
    #[serde(alias = "secundario", alias = "secundário")]
    Secondary,
    /// Known pair that is neither a target nor a competitor.
    #[serde(alias = "complementar")]
    Complementary,
}

/// One row of the table. Prefixes hold digits only and match any code that
/// starts with them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComplementarityEntry {
    #[serde(alias = "cnae_prestador", deserialize_with = "prefix")]
    pub provider: String,
    #[serde(alias = "cnae_cliente", deserialize_with = "prefix")]
    pub buyer: String,
    #[serde(alias = "relacao")]
    pub relation: Relation,
    #[serde(
        default,
        alias = "potencial",
        deserialize_with = "empty_string_as_none"
    )]
    pub potential_label: Option<String>,
    #[serde(default, alias = "score", deserialize_with = "optional_number")]
    pub potential_score: Option<f64>,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub bonus: f64,
}

impl ComplementarityEntry {
    fn covers(&self, provider: &SectorCode, buyer: &SectorCode) -> bool {
        provider.as_str().starts_with(&self.provider) && buyer.as_str().starts_with(&self.buyer)
    }

    fn specificity(&self) -> usize {
        self.provider.len() + self.buyer.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComplementarityLoadError {
    #[error("failed to read complementarity table: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: sector prefix must contain digits")]
    EmptyPrefix { row: usize },
}

#[derive(Debug, Clone, Default)]
pub struct StaticComplementarityTable {
    entries: Vec<ComplementarityEntry>,
}

impl StaticComplementarityTable {
    pub fn new(entries: Vec<ComplementarityEntry>) -> Self {
        Self { entries }
    }

    /// Load a CSV with the header
    /// `provider,buyer,relation,potential_label,potential_score,bonus`.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, ComplementarityLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut entries = Vec::new();

        for (index, record) in csv_reader.deserialize::<ComplementarityEntry>().enumerate() {
            let entry = record?;
            if entry.provider.is_empty() || entry.buyer.is_empty() {
                return Err(ComplementarityLoadError::EmptyPrefix { row: index + 1 });
            }
            entries.push(entry);
        }

        tracing::debug!(entries = entries.len(), "complementarity table loaded");
        Ok(Self { entries })
    }

    pub fn insert(&mut self, entry: ComplementarityEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SectorComplementarity for StaticComplementarityTable {
    fn complementarity(
        &self,
        subject: &SectorCode,
        candidate: &SectorCode,
    ) -> Option<Complementarity> {
        // Longest matching prefixes win; earlier rows win ties.
        let entry = self
            .entries
            .iter()
            .filter(|entry| entry.covers(subject, candidate))
            .fold(None::<&ComplementarityEntry>, |best, entry| match best {
                Some(current) if current.specificity() >= entry.specificity() => Some(current),
                _ => Some(entry),
            })?;

        Some(Complementarity {
            is_competitor: entry.relation == Relation::Competitor,
            potential_label: entry.potential_label.clone(),
            potential_score: entry.potential_score,
            bonus: entry.bonus,
        })
    }

    fn targets(&self, provider: &SectorCode) -> Option<SectorTargets> {
        let mut targets = SectorTargets::default();
        for entry in self
            .entries
            .iter()
            .filter(|entry| provider.as_str().starts_with(&entry.provider))
        {
            let bucket = match entry.relation {
                Relation::Primary => &mut targets.primary,
                Relation::Secondary => &mut targets.secondary,
                Relation::Competitor | Relation::Complementary => continue,
            };
            if !bucket.contains(&entry.buyer) {
                bucket.push(entry.buyer.clone());
            }
        }

        if targets.is_empty() {
            None
        } else {
            Some(targets)
        }
    }
}

fn prefix<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.chars().filter(char::is_ascii_digit).collect())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(empty_string_as_none(deserializer)?.and_then(|value| parse_amount(&value)))
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_number(deserializer)?.unwrap_or(0.0))
}
