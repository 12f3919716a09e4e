use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::super::domain::{amount_opt, CompanyProfile, CompanySize, RegistrationStatus};
use super::super::geography::FederativeUnit;
use super::RankingConfig;

/// Filter values as received from a caller, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCandidateFilter {
    #[serde(default, alias = "uf")]
    pub state: Option<String>,
    #[serde(default, alias = "municipio")]
    pub municipality: Option<String>,
    #[serde(default, alias = "porte")]
    pub size: Option<String>,
    #[serde(default, alias = "situacao")]
    pub status: Option<String>,
    #[serde(default, alias = "idade")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "amount_opt")]
    pub capital_min: Option<f64>,
    #[serde(default, deserialize_with = "amount_opt")]
    pub capital_max: Option<f64>,
    #[serde(default, alias = "pagina")]
    pub page: Option<usize>,
    #[serde(default, alias = "limite", alias = "tamanho_pagina")]
    pub page_size: Option<usize>,
    #[serde(default, alias = "max_processar")]
    pub max_processing: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid filter '{field}': {reason}")]
pub struct FilterError {
    pub field: &'static str,
    pub reason: String,
}

impl FilterError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Company age ranges measured in calendar years before the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgeBracket {
    #[serde(rename = "0-2")]
    UpToTwo,
    #[serde(rename = "2-5")]
    TwoToFive,
    #[serde(rename = "5-10")]
    FiveToTen,
    #[serde(rename = "10+")]
    OverTen,
}

impl AgeBracket {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "0-2" => Some(Self::UpToTwo),
            "2-5" => Some(Self::TwoToFive),
            "5-10" => Some(Self::FiveToTen),
            "10+" => Some(Self::OverTen),
            _ => None,
        }
    }

    /// Whether a company started on `started` falls in the bracket, comparing
    /// start years against the reference year.
    pub fn contains(self, started: NaiveDate, reference: NaiveDate) -> bool {
        let age = reference.year() - started.year();
        match self {
            AgeBracket::UpToTwo => age <= 2,
            AgeBracket::TwoToFive => age > 2 && age <= 5,
            AgeBracket::FiveToTen => age > 5 && age <= 10,
            AgeBracket::OverTen => age > 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    ActiveOnly,
    Any,
    Only(RegistrationStatus),
}

impl StatusFilter {
    fn accepts(self, status: Option<RegistrationStatus>) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::ActiveOnly => status == Some(RegistrationStatus::Active),
            StatusFilter::Only(expected) => status == Some(expected),
        }
    }
}

/// Structural candidate filters a [`CandidateSource`] applies while loading.
///
/// [`CandidateSource`]: crate::matching::directory::CandidateSource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateQuery {
    pub state: Option<FederativeUnit>,
    pub municipality: Option<String>,
    pub size: Option<CompanySize>,
    pub status: StatusFilter,
    pub age: Option<AgeBracket>,
    pub capital_min: Option<f64>,
    pub capital_max: Option<f64>,
    pub reference_date: NaiveDate,
}

impl CandidateQuery {
    /// The fallback used when the full filter set returns nothing.
    pub fn active_only(reference_date: NaiveDate) -> Self {
        Self {
            state: None,
            municipality: None,
            size: None,
            status: StatusFilter::ActiveOnly,
            age: None,
            capital_min: None,
            capital_max: None,
            reference_date,
        }
    }

    pub fn matches(&self, company: &CompanyProfile) -> bool {
        if let Some(state) = self.state {
            if company.state.as_deref().and_then(FederativeUnit::parse) != Some(state) {
                return false;
            }
        }

        if let Some(municipality) = &self.municipality {
            let same = company
                .municipality
                .as_deref()
                .is_some_and(|actual| actual.trim().to_uppercase() == *municipality);
            if !same {
                return false;
            }
        }

        if let Some(size) = self.size {
            match company.size {
                Some(actual) if actual.same_registry_band(size) => {}
                _ => return false,
            }
        }

        if !self.status.accepts(company.status) {
            return false;
        }

        if let Some(bracket) = self.age {
            match company.registration_date() {
                Some(started) if bracket.contains(started, self.reference_date) => {}
                _ => return false,
            }
        }

        if self.capital_min.is_some_and(|min| company.capital < min) {
            return false;
        }
        if self.capital_max.is_some_and(|max| company.capital > max) {
            return false;
        }

        true
    }
}

/// Validated ranking request: structural query plus pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateFilter {
    pub query: CandidateQuery,
    pub page: usize,
    pub page_size: usize,
    pub max_processing: Option<usize>,
}

impl CandidateFilter {
    pub fn parse(
        raw: &RawCandidateFilter,
        config: &RankingConfig,
        reference_date: NaiveDate,
    ) -> Result<Self, FilterError> {
        let state = match non_blank(raw.state.as_deref()) {
            Some(value) => Some(
                FederativeUnit::parse(value)
                    .ok_or_else(|| FilterError::new("uf", format!("unknown state '{value}'")))?,
            ),
            None => None,
        };

        let municipality = non_blank(raw.municipality.as_deref()).map(str::to_uppercase);

        let size = match non_blank(raw.size.as_deref()) {
            Some(value) => match CompanySize::parse(value) {
                CompanySize::Unknown => {
                    return Err(FilterError::new(
                        "porte",
                        format!("unknown company size '{value}'"),
                    ))
                }
                size => Some(size),
            },
            None => None,
        };

        let status = match non_blank(raw.status.as_deref()) {
            None => StatusFilter::ActiveOnly,
            Some(value) => match value.to_lowercase().as_str() {
                "todas" | "todos" | "any" | "all" => StatusFilter::Any,
                _ => match RegistrationStatus::parse(value) {
                    RegistrationStatus::Unknown => {
                        return Err(FilterError::new(
                            "situacao",
                            format!("unknown registration status '{value}'"),
                        ))
                    }
                    RegistrationStatus::Active => StatusFilter::ActiveOnly,
                    other => StatusFilter::Only(other),
                },
            },
        };

        let age = match non_blank(raw.age.as_deref()) {
            Some(value) => Some(AgeBracket::parse(value).ok_or_else(|| {
                FilterError::new(
                    "idade",
                    format!("expected one of 0-2, 2-5, 5-10, 10+; got '{value}'"),
                )
            })?),
            None => None,
        };

        let capital_min = validate_capital("capital_min", raw.capital_min)?;
        let capital_max = validate_capital("capital_max", raw.capital_max)?;
        if let (Some(min), Some(max)) = (capital_min, capital_max) {
            if min > max {
                return Err(FilterError::new(
                    "capital_min",
                    format!("minimum {min} exceeds maximum {max}"),
                ));
            }
        }

        let page = raw.page.unwrap_or(1);
        if page == 0 {
            return Err(FilterError::new("pagina", "pages start at 1"));
        }

        let page_size = raw.page_size.unwrap_or(config.default_page_size);
        if page_size == 0 || page_size > config.max_page_size {
            return Err(FilterError::new(
                "limite",
                format!(
                    "page size must be between 1 and {}, got {page_size}",
                    config.max_page_size
                ),
            ));
        }

        if raw.max_processing == Some(0) {
            return Err(FilterError::new(
                "max_processar",
                "processing ceiling must be at least 1",
            ));
        }

        Ok(Self {
            query: CandidateQuery {
                state,
                municipality,
                size,
                status,
                age,
                capital_min,
                capital_max,
                reference_date,
            },
            page,
            page_size,
            max_processing: raw.max_processing,
        })
    }
}

fn validate_capital(field: &'static str, value: Option<f64>) -> Result<Option<f64>, FilterError> {
    match value {
        Some(amount) if !amount.is_finite() || amount < 0.0 => Err(FilterError::new(
            field,
            format!("must be a non-negative amount, got {amount}"),
        )),
        other => Ok(other),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
