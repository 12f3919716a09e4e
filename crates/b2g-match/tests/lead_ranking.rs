use std::sync::Arc;

use b2g_match::matching::{
    CompanyDirectory, MatchError, MatchService, RankingConfig, RawCandidateFilter,
    RegistrationStatus, SectorCode, StaticComplementarityTable, WeightProfileRegistry,
};
use chrono::NaiveDate;

const SUBJECT: &str = "53.464.097/0001-50";

fn service() -> MatchService<CompanyDirectory> {
    let registry = include_bytes!("../data/empresas_sample.csv");
    let table = include_bytes!("../data/complementaridade.csv");

    let directory =
        CompanyDirectory::from_reader(&registry[..]).expect("sample registry loads");
    let complementarity =
        StaticComplementarityTable::from_csv(&table[..]).expect("sample table loads");
    let profiles = WeightProfileRegistry::builtin().expect("builtin profiles are valid");

    MatchService::new(Arc::new(directory), profiles, RankingConfig::default())
        .with_complementarity(Arc::new(complementarity))
        .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"))
}

#[test]
fn software_house_is_matched_with_its_target_sectors() {
    let result = service()
        .rank_by_cnpj(SUBJECT, &RawCandidateFilter::default(), None)
        .expect("ranking succeeds");

    assert_eq!(result.stats.loaded, 9);
    assert_eq!(result.stats.target_matches, 4);
    assert_eq!(result.total_candidates, 4);
    assert_eq!(result.results.len(), 4);
    assert!(result.message.is_none());

    for lead in &result.results {
        assert!(lead.target_match);
        assert!(lead.compatibility <= 100.0);
        assert_eq!(lead.candidate.status, Some(RegistrationStatus::Active));
        assert_ne!(
            lead.candidate.cnpj.as_ref().map(|cnpj| cnpj.as_str()),
            Some("53464097000150")
        );
    }
    assert!(result
        .results
        .windows(2)
        .all(|pair| pair[0].compatibility >= pair[1].compatibility));

    let pharmacy = result
        .results
        .iter()
        .find(|lead| lead.candidate.state.as_deref() == Some("MG"))
        .expect("pharmacy chain ranked");
    assert_eq!(pharmacy.bonus, 10.0);
    assert_eq!(pharmacy.potential, "Alto");

    let clinic = result
        .results
        .iter()
        .find(|lead| lead.candidate.state.as_deref() == Some("PR"))
        .expect("clinic ranked");
    assert_eq!(clinic.bonus, 5.0);
    assert_eq!(clinic.potential, "Médio");
}

#[test]
fn state_filter_narrows_the_candidate_pool() {
    let filter: RawCandidateFilter =
        serde_json::from_value(serde_json::json!({ "uf": "SP" })).expect("filter deserializes");
    let result = service()
        .rank_by_cnpj(SUBJECT, &filter, None)
        .expect("ranking succeeds");

    assert_eq!(result.stats.loaded, 3);
    assert_eq!(result.results.len(), 1);
    assert_eq!(
        result.results[0].candidate.trade_name.as_deref(),
        Some("Bom Preço")
    );
    assert!(result.executive_summary.contains("state SP"));
}

#[test]
fn ranking_output_serializes_for_reporting() {
    let result = service()
        .rank_by_cnpj(SUBJECT, &RawCandidateFilter::default(), Some("b2b_privado"))
        .expect("ranking succeeds");
    let value = serde_json::to_value(&result).expect("result serializes");

    assert_eq!(value["page"], 1);
    assert_eq!(value["total_pages"], 1);
    assert!(value["results"][0]["candidate"]["cnpj"].is_string());
    assert!(value.get("message").is_none());
}

#[test]
fn unknown_company_is_reported_as_not_found() {
    let error = service()
        .rank_by_cnpj("98.765.432/0001-98", &RawCandidateFilter::default(), None)
        .expect_err("company is not in the sample");
    assert!(error.is_not_found());
    assert!(matches!(error, MatchError::NotFound(_)));
}

#[test]
fn sector_descriptions_come_from_the_registry_export() {
    let service = service();
    let code = SectorCode::parse("6201-5/01").expect("valid sector code");
    assert_eq!(
        service.describe_sector(&code).as_deref(),
        Some("Desenvolvimento de programas de computador sob encomenda")
    );

    let unknown = SectorCode::parse("0111301").expect("valid sector code");
    assert!(service.describe_sector(&unknown).is_none());
}
