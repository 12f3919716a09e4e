use std::sync::Arc;

use chrono::NaiveDate;

use crate::matching::complementarity::{
    ComplementarityEntry, Relation, StaticComplementarityTable,
};
use crate::matching::directory::CompanyDirectory;
use crate::matching::domain::{
    Cnpj, CompanyProfile, CompanySize, CounterpartProfile, RegistrationDate, RegistrationStatus,
    SectorCode,
};
use crate::matching::ranking::RankingConfig;
use crate::matching::scoring::{ScoringEngine, WeightProfileRegistry};
use crate::matching::service::MatchService;

pub(super) const SUBJECT_CNPJ: &str = "11.222.333/0001-81";

pub(super) fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
}

pub(super) fn years_ago(years: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024 - years, 6, 1).expect("valid date")
}

pub(super) fn sector(code: &str) -> SectorCode {
    SectorCode::parse(code).expect("valid sector code")
}

pub(super) fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

pub(super) fn registry() -> WeightProfileRegistry {
    WeightProfileRegistry::builtin().expect("builtin profiles are valid")
}

pub(super) fn engine(profile: &str) -> ScoringEngine {
    let profile = registry()
        .get(profile)
        .expect("profile exists")
        .clone();
    ScoringEngine::new(profile).with_reference_date(reference_date())
}

/// Retail company in São Paulo, seven years old, medium size.
pub(super) fn retailer() -> CompanyProfile {
    CompanyProfile {
        cnpj: Cnpj::normalize(SUBJECT_CNPJ),
        legal_name: Some("Mercado Central Ltda".to_string()),
        trade_name: Some("Mercado Central".to_string()),
        primary_sector: Some(sector("4711301")),
        size: Some(CompanySize::Medium),
        capital: 2_000_000.0,
        registered_on: Some(RegistrationDate::Known(years_ago(7))),
        status: Some(RegistrationStatus::Active),
        state: Some("SP".to_string()),
        municipality: Some("SAO PAULO".to_string()),
        ..CompanyProfile::default()
    }
}

/// Tender in the retailer's own sector and state, without requirements.
pub(super) fn retail_tender() -> CounterpartProfile {
    CounterpartProfile {
        company: CompanyProfile {
            primary_sector: Some(sector("4711301")),
            state: Some("SP".to_string()),
            ..CompanyProfile::default()
        },
        reference: Some("PNCP-0001".to_string()),
        estimated_value: 10_000_000.0,
        ..CounterpartProfile::default()
    }
}

/// Software house used as the ranking subject.
pub(super) fn software_house() -> CompanyProfile {
    CompanyProfile {
        cnpj: Cnpj::normalize("12345678000195"),
        legal_name: Some("Codigo Certo Sistemas Ltda".to_string()),
        primary_sector: Some(sector("6201501")),
        size: Some(CompanySize::Small),
        capital: 400_000.0,
        registered_on: Some(RegistrationDate::Known(years_ago(6))),
        status: Some(RegistrationStatus::Active),
        state: Some("SP".to_string()),
        municipality: Some("CAMPINAS".to_string()),
        ..CompanyProfile::default()
    }
}

pub(super) fn candidate(
    cnpj: &str,
    code: &str,
    state: &str,
    capital: f64,
    status: RegistrationStatus,
) -> CompanyProfile {
    CompanyProfile {
        cnpj: Cnpj::normalize(cnpj),
        legal_name: Some(format!("Empresa {cnpj}")),
        primary_sector: Some(sector(code)),
        size: Some(CompanySize::Small),
        capital,
        registered_on: Some(RegistrationDate::Known(years_ago(8))),
        status: Some(status),
        state: Some(state.to_string()),
        municipality: Some("CAPITAL".to_string()),
        ..CompanyProfile::default()
    }
}

pub(super) fn candidates() -> Vec<CompanyProfile> {
    vec![
        candidate("44556677000186", "4711301", "SP", 3_000_000.0, RegistrationStatus::Active),
        candidate("22333444000181", "8610101", "RJ", 800_000.0, RegistrationStatus::Active),
        candidate("55667788000186", "6202300", "SP", 1_200_000.0, RegistrationStatus::Active),
        candidate("66554433000105", "4711301", "MG", 500_000.0, RegistrationStatus::ShutDown),
        candidate("77889900000166", "4751201", "PR", 150_000.0, RegistrationStatus::Active),
    ]
}

pub(super) fn directory() -> CompanyDirectory {
    let mut companies = candidates();
    companies.push(software_house());
    companies.push(retailer());
    CompanyDirectory::from_profiles(companies)
}

pub(super) fn entry(
    provider: &str,
    buyer: &str,
    relation: Relation,
    potential: Option<(&str, f64)>,
    bonus: f64,
) -> ComplementarityEntry {
    ComplementarityEntry {
        provider: provider.to_string(),
        buyer: buyer.to_string(),
        relation,
        potential_label: potential.map(|(label, _)| label.to_string()),
        potential_score: potential.map(|(_, score)| score),
        bonus,
    }
}

/// Software houses sell to retail first and to health care second.
pub(super) fn complementarity() -> Arc<StaticComplementarityTable> {
    Arc::new(StaticComplementarityTable::new(vec![
        entry("62", "62", Relation::Competitor, None, 0.0),
        entry("6201", "4711", Relation::Primary, Some(("Alto", 0.9)), 10.0),
        entry("6201", "86", Relation::Secondary, Some(("Médio", 0.6)), 5.0),
        entry("4711", "4711", Relation::Complementary, Some(("Alto", 0.9)), 0.0),
    ]))
}

pub(super) fn ranking_config() -> RankingConfig {
    RankingConfig::default()
}

pub(super) fn service() -> MatchService<CompanyDirectory> {
    MatchService::new(Arc::new(directory()), registry(), ranking_config())
        .with_reference_date(reference_date())
}

pub(super) fn service_with_table() -> MatchService<CompanyDirectory> {
    service().with_complementarity(complementarity())
}
