use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use super::Criterion;

pub const DEFAULT_PROFILE_KEY: &str = "default";

const WEIGHT_SUM_TOLERANCE: f64 = 1e-5;

/// Relative importance of each criterion. Components are non-negative and
/// sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeights {
    pub sector: f64,
    pub location: f64,
    pub size: f64,
    pub capital: f64,
    pub experience: f64,
    pub certificates: f64,
}

impl CriterionWeights {
    pub fn sum(&self) -> f64 {
        self.sector + self.location + self.size + self.capital + self.experience + self.certificates
    }

    pub const fn weight(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Sector => self.sector,
            Criterion::Location => self.location,
            Criterion::Size => self.size,
            Criterion::Capital => self.capital,
            Criterion::Experience => self.experience,
            Criterion::Certificates => self.certificates,
        }
    }
}

/// A validated, named weight set. Only constructible through
/// [`WeightProfile::new`], so every instance satisfies the sum invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightProfile {
    key: String,
    label: String,
    weights: CriterionWeights,
}

impl WeightProfile {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        weights: CriterionWeights,
    ) -> Result<Self, WeightProfileError> {
        let key = key.into();
        for criterion in Criterion::ordered() {
            let weight = weights.weight(criterion);
            if !weight.is_finite() || weight < 0.0 {
                return Err(WeightProfileError::NegativeWeight {
                    profile: key,
                    criterion: criterion.key(),
                    weight,
                });
            }
        }

        let total = weights.sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightProfileError::InvalidSum {
                profile: key,
                total,
            });
        }

        Ok(Self {
            key,
            label: label.into(),
            weights,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn weights(&self) -> CriterionWeights {
        self.weights
    }

    pub fn weight(&self, criterion: Criterion) -> f64 {
        self.weights.weight(criterion)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightProfileError {
    #[error("weights of profile '{profile}' must sum to 1.0, got {total}")]
    InvalidSum { profile: String, total: f64 },
    #[error("weight for {criterion} in profile '{profile}' must be a non-negative number, got {weight}")]
    NegativeWeight {
        profile: String,
        criterion: &'static str,
        weight: f64,
    },
    #[error("unknown weight profile '{requested}'; available: {}", available.join(", "))]
    UnknownProfile {
        requested: String,
        available: Vec<String>,
    },
    #[error("invalid weight profile document: {0}")]
    Document(String),
}

const BUILTIN_PROFILES: [(&str, &str, CriterionWeights); 4] = [
    (
        DEFAULT_PROFILE_KEY,
        "Padrão",
        CriterionWeights {
            sector: 0.35,
            location: 0.20,
            size: 0.15,
            capital: 0.15,
            experience: 0.10,
            certificates: 0.05,
        },
    ),
    (
        "licitacao_publica",
        "Licitação Pública",
        CriterionWeights {
            sector: 0.30,
            location: 0.15,
            size: 0.10,
            capital: 0.15,
            experience: 0.10,
            certificates: 0.20,
        },
    ),
    (
        "b2b_privado",
        "B2B Privado",
        CriterionWeights {
            sector: 0.40,
            location: 0.15,
            size: 0.15,
            capital: 0.20,
            experience: 0.10,
            certificates: 0.00,
        },
    ),
    (
        "projeto_local",
        "Projeto Local",
        CriterionWeights {
            sector: 0.25,
            location: 0.40,
            size: 0.10,
            capital: 0.10,
            experience: 0.10,
            certificates: 0.05,
        },
    ),
];

const PROFILE_ALIASES: [(&str, &str); 3] = [
    ("public_tender", "licitacao_publica"),
    ("private_b2b", "b2b_privado"),
    ("local_project", "projeto_local"),
];

/// Named weight profiles available to the scoring engine.
#[derive(Debug, Clone)]
pub struct WeightProfileRegistry {
    profiles: BTreeMap<String, WeightProfile>,
}

impl WeightProfileRegistry {
    /// Registry holding the four built-in profiles, each validated on the way in.
    pub fn builtin() -> Result<Self, WeightProfileError> {
        let mut registry = Self {
            profiles: BTreeMap::new(),
        };
        for (key, label, weights) in BUILTIN_PROFILES {
            registry.register(WeightProfile::new(key, label, weights)?);
        }
        Ok(registry)
    }

    /// Add or replace a profile under its key.
    pub fn register(&mut self, profile: WeightProfile) {
        self.profiles.insert(profile.key().to_string(), profile);
    }

    /// Register every profile from a JSON document shaped as
    /// `{"key": {"label": "...", "weights": {...}}}`.
    pub fn extend_from_json<R: Read>(&mut self, reader: R) -> Result<usize, WeightProfileError> {
        let document: BTreeMap<String, ProfileDocument> = serde_json::from_reader(reader)
            .map_err(|err| WeightProfileError::Document(err.to_string()))?;
        let count = document.len();
        for (key, entry) in document {
            let label = entry.label.unwrap_or_else(|| key.clone());
            self.register(WeightProfile::new(key, label, entry.weights)?);
        }
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Result<&WeightProfile, WeightProfileError> {
        let normalized = name.trim().to_ascii_lowercase();
        let key = PROFILE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, key)| (*key).to_string())
            .unwrap_or(normalized);

        self.profiles
            .get(&key)
            .ok_or_else(|| WeightProfileError::UnknownProfile {
                requested: name.to_string(),
                available: self.keys(),
            })
    }

    pub fn keys(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &WeightProfile> {
        self.profiles.values()
    }
}

#[derive(Debug, Deserialize)]
struct ProfileDocument {
    #[serde(default)]
    label: Option<String>,
    weights: CriterionWeights,
}
