use super::common::*;
use crate::matching::ranking::RawCandidateFilter;
use crate::matching::service::MatchError;

#[test]
fn scores_with_the_default_profile() {
    let service = service();
    let result = service
        .score(&retailer(), &retail_tender(), None)
        .expect("scoring succeeds");
    assert!(approx(result.score_total, 68.5));
}

#[test]
fn unknown_profile_is_a_validation_error() {
    let service = service();
    let error = service
        .score(&retailer(), &retail_tender(), Some("aggressive"))
        .expect_err("profile is unknown");
    assert!(error.is_validation());
    assert!(error.to_string().contains("default"));
}

#[test]
fn default_profile_can_be_switched() {
    let switched = service()
        .with_default_profile("local_project")
        .expect("alias resolves");
    let result = switched
        .score(&retailer(), &retail_tender(), None)
        .expect("scoring succeeds");
    let expected = switched
        .score(&retailer(), &retail_tender(), Some("projeto_local"))
        .expect("scoring succeeds");
    assert_eq!(result, expected);

    assert!(service().with_default_profile("missing").is_err());
}

#[test]
fn scores_a_subject_resolved_by_cnpj() {
    let service = service_with_table();
    let result = service
        .score_by_cnpj("11222333000181", &retail_tender(), None)
        .expect("subject exists");
    assert!(approx(result.score_total, 89.5));
}

#[test]
fn missing_subject_is_not_found() {
    let service = service();
    match service.score_by_cnpj("98.765.432/0001-98", &retail_tender(), None) {
        Err(MatchError::NotFound(cnpj)) => assert_eq!(cnpj, "98765432000198"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn malformed_cnpj_is_a_validation_error() {
    let service = service();
    for raw in ["11222333000182", "11111111111111", "no digits"] {
        let error = service
            .rank_by_cnpj(raw, &RawCandidateFilter::default(), None)
            .expect_err("identifier is invalid");
        assert!(error.is_validation(), "{raw} gave {error}");
    }
}

#[test]
fn ranking_by_cnpj_uses_the_registry_subject() {
    let service = service_with_table();
    let result = service
        .rank_by_cnpj("12.345.678/0001-95", &RawCandidateFilter::default(), None)
        .expect("ranking succeeds");
    assert_eq!(result.stats.target_matches, 3);
    assert_eq!(
        result.stats.subject_sector.as_ref().map(|code| code.as_str()),
        Some("6201501")
    );
}

#[test]
fn malformed_filter_surfaces_as_validation() {
    let service = service();
    let raw = RawCandidateFilter {
        age: Some("ancient".to_string()),
        ..RawCandidateFilter::default()
    };
    match service.rank(&software_house(), &raw, None) {
        Err(MatchError::Filter(error)) => assert_eq!(error.field, "idade"),
        other => panic!("expected filter error, got {other:?}"),
    }
}

#[test]
fn compare_covers_every_registered_profile() {
    let service = service();
    let results = service
        .compare(&retailer(), &retail_tender())
        .expect("comparison succeeds");
    let keys: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["b2b_privado", "default", "licitacao_publica", "projeto_local"]
    );
}

#[test]
fn batch_and_opportunities_go_through_the_service() {
    let service = service();
    let entries = service
        .score_batch(&candidates(), &retail_tender(), None, None)
        .expect("batch succeeds");
    assert_eq!(entries.len(), candidates().len());

    let ranking = service
        .opportunities(&retailer(), vec![retail_tender()], None, Some("b2b_privado"))
        .expect("ranking succeeds");
    assert_eq!(ranking.analysed, 1);
}
