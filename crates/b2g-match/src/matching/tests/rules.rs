use std::sync::Arc;

use super::common::*;
use crate::matching::complementarity::{Relation, StaticComplementarityTable};
use crate::matching::domain::{CompanySize, RegistrationDate, RegistrationStatus};
use crate::matching::scoring::rules::{
    evaluate_capital, evaluate_experience, evaluate_location, evaluate_sector, evaluate_size,
    evaluate_standing,
};
use crate::matching::scoring::{sector_fit_for, AlertLog, PrefixHeuristic};

#[test]
fn sector_prefix_heuristic_tiers() {
    let mut alerts = AlertLog::default();
    let same = evaluate_sector(
        &PrefixHeuristic,
        Some(&sector("4711301")),
        Some(&sector("4712100")),
        &mut alerts,
    );
    assert_eq!(same.score, 0.3);
    assert!(!alerts.is_empty());

    let mut alerts = AlertLog::default();
    let related = evaluate_sector(
        &PrefixHeuristic,
        Some(&sector("4711301")),
        Some(&sector("4530703")),
        &mut alerts,
    );
    assert_eq!(related.score, 0.6);
    assert!(alerts.is_empty());

    let unrelated = evaluate_sector(
        &PrefixHeuristic,
        Some(&sector("4711301")),
        Some(&sector("8610101")),
        &mut alerts,
    );
    assert_eq!(unrelated.score, 0.5);
}

#[test]
fn missing_sector_is_neutral_with_alert() {
    let mut alerts = AlertLog::default();
    let assessment = evaluate_sector(&PrefixHeuristic, None, Some(&sector("4711301")), &mut alerts);
    assert_eq!(assessment.score, 0.5);
    assert_eq!(assessment.rationale, "sector not informed");
    assert_eq!(alerts.into_vec().len(), 1);
}

#[test]
fn table_flags_competitors_and_falls_back_for_unknown_pairs() {
    let fit = sector_fit_for(Some(complementarity()));

    let mut alerts = AlertLog::default();
    let rival = evaluate_sector(
        fit.as_ref(),
        Some(&sector("6201501")),
        Some(&sector("6202300")),
        &mut alerts,
    );
    assert_eq!(rival.score, 0.1);
    assert!(alerts
        .into_vec()
        .iter()
        .any(|alert| alert.contains("direct competitor")));

    let mut alerts = AlertLog::default();
    let buyer = evaluate_sector(
        fit.as_ref(),
        Some(&sector("6201501")),
        Some(&sector("4711301")),
        &mut alerts,
    );
    assert_eq!(buyer.score, 0.9);
    assert!(buyer.rationale.contains("Alto"));

    let unknown = evaluate_sector(
        fit.as_ref(),
        Some(&sector("6201501")),
        Some(&sector("6311900")),
        &mut alerts,
    );
    assert_eq!(unknown.score, 0.6);
}

#[test]
fn zero_potential_falls_back_to_prefix_heuristic() {
    let table = StaticComplementarityTable::new(vec![entry(
        "6201",
        "4711",
        Relation::Complementary,
        Some(("Baixo", 0.0)),
        0.0,
    )]);
    let fit = sector_fit_for(Some(Arc::new(table)));

    let mut alerts = AlertLog::default();
    let assessment = evaluate_sector(
        fit.as_ref(),
        Some(&sector("6201501")),
        Some(&sector("4711301")),
        &mut alerts,
    );
    assert_eq!(assessment.score, 0.5);
    assert!(!assessment.rationale.contains("Baixo"));
}

#[test]
fn location_tiers() {
    let mut alerts = AlertLog::default();
    let cases = [
        (Some("SP"), Some("Campinas"), Some("sp"), Some("CAMPINAS"), 1.0),
        (Some("SP"), Some("Campinas"), Some("SP"), Some("Santos"), 0.8),
        (Some("SP"), None, Some("MG"), None, 0.5),
        (Some("SP"), None, Some("ES"), None, 0.3),
        (Some("SP"), None, Some("AM"), None, 0.15),
        (None, None, Some("SP"), None, 0.5),
    ];

    for (state, municipality, other_state, other_municipality, expected) in cases {
        let assessment = evaluate_location(
            state,
            municipality,
            other_state,
            other_municipality,
            &mut alerts,
        );
        assert_eq!(
            assessment.score, expected,
            "{state:?}/{municipality:?} vs {other_state:?}/{other_municipality:?}"
        );
    }
    assert!(alerts.is_empty());
}

#[test]
fn unrecognized_state_scores_as_distant() {
    let mut alerts = AlertLog::default();
    let assessment = evaluate_location(Some("XX"), None, Some("SP"), None, &mut alerts);
    assert_eq!(assessment.score, 0.15);
    assert!(!alerts.is_empty());
}

#[test]
fn size_with_and_without_preference() {
    let preferred = [CompanySize::Small];
    assert_eq!(evaluate_size(Some(CompanySize::Small), &preferred).score, 1.0);
    assert_eq!(evaluate_size(Some(CompanySize::Medium), &preferred).score, 0.7);
    assert_eq!(evaluate_size(Some(CompanySize::Micro), &preferred).score, 0.7);
    assert_eq!(evaluate_size(Some(CompanySize::Large), &preferred).score, 0.4);

    assert_eq!(evaluate_size(Some(CompanySize::Large), &[]).score, 0.9);
    assert_eq!(evaluate_size(Some(CompanySize::Medium), &[]).score, 0.9);
    assert_eq!(evaluate_size(Some(CompanySize::Small), &[]).score, 0.7);
    assert_eq!(evaluate_size(Some(CompanySize::MicroIndividual), &[]).score, 0.5);
    assert_eq!(evaluate_size(Some(CompanySize::Unknown), &preferred).score, 0.5);
    assert_eq!(evaluate_size(None, &preferred).score, 0.5);
}

#[test]
fn capital_tiers_and_ratios() {
    let mut alerts = AlertLog::default();
    assert_eq!(evaluate_capital(6_000_000.0, 0.0, &mut alerts).score, 0.9);
    assert_eq!(evaluate_capital(1_000_000.0, 0.0, &mut alerts).score, 0.8);
    assert_eq!(evaluate_capital(500_000.0, 0.0, &mut alerts).score, 0.7);
    assert_eq!(evaluate_capital(100_000.0, 0.0, &mut alerts).score, 0.6);
    assert_eq!(evaluate_capital(99_999.0, 0.0, &mut alerts).score, 0.5);

    assert_eq!(evaluate_capital(200.0, 1_000.0, &mut alerts).score, 1.0);
    assert_eq!(evaluate_capital(150.0, 1_000.0, &mut alerts).score, 0.9);
    assert_eq!(evaluate_capital(100.0, 1_000.0, &mut alerts).score, 0.8);
    assert_eq!(evaluate_capital(50.0, 1_000.0, &mut alerts).score, 0.6);
    assert!(alerts.is_empty());

    assert_eq!(evaluate_capital(49.0, 1_000.0, &mut alerts).score, 0.3);
    assert_eq!(alerts.into_vec().len(), 1);

    let mut alerts = AlertLog::default();
    assert_eq!(evaluate_capital(0.0, 1_000.0, &mut alerts).score, 0.3);
    assert!(!alerts.is_empty());
}

#[test]
fn experience_by_company_age() {
    let today = reference_date();
    let mut alerts = AlertLog::default();
    let cases = [(16, 1.0), (10, 0.95), (7, 0.85), (3, 0.7), (2, 0.6), (1, 0.5)];
    for (years, expected) in cases {
        let started = RegistrationDate::Known(years_ago(years));
        let assessment = evaluate_experience(Some(&started), true, today, &mut alerts);
        assert_eq!(assessment.score, expected, "{years} years");
    }
    assert!(alerts.is_empty());

    let recent = RegistrationDate::Known(years_ago(0));
    assert_eq!(
        evaluate_experience(Some(&recent), false, today, &mut alerts).score,
        0.4
    );
    assert!(alerts.is_empty());
    assert_eq!(
        evaluate_experience(Some(&recent), true, today, &mut alerts).score,
        0.2
    );
    assert!(!alerts.is_empty());
}

#[test]
fn experience_handles_missing_and_future_dates() {
    let today = reference_date();
    let mut alerts = AlertLog::default();
    assert_eq!(evaluate_experience(None, false, today, &mut alerts).score, 0.5);
    assert!(alerts.is_empty());
    assert_eq!(evaluate_experience(None, true, today, &mut alerts).score, 0.3);

    let garbage = RegistrationDate::parse("not a date");
    assert_eq!(
        evaluate_experience(Some(&garbage), false, today, &mut alerts).score,
        0.5
    );

    let mut alerts = AlertLog::default();
    let future = RegistrationDate::Known(years_ago(-1));
    let assessment = evaluate_experience(Some(&future), false, today, &mut alerts);
    assert_eq!(assessment.score, 0.0);
    assert!(!alerts.is_empty());
}

#[test]
fn standing_by_registration_status() {
    let mut alerts = AlertLog::default();
    assert_eq!(
        evaluate_standing(Some(RegistrationStatus::Active), true, &mut alerts).score,
        1.0
    );
    assert_eq!(evaluate_standing(None, false, &mut alerts).score, 0.5);
    assert_eq!(
        evaluate_standing(Some(RegistrationStatus::Unknown), false, &mut alerts).score,
        0.5
    );
    assert!(alerts.is_empty());

    assert_eq!(evaluate_standing(None, true, &mut alerts).score, 0.3);
    assert_eq!(
        evaluate_standing(Some(RegistrationStatus::Void), true, &mut alerts).score,
        0.3
    );
    assert_eq!(alerts.into_vec().len(), 2);

    for status in [RegistrationStatus::ShutDown, RegistrationStatus::Cancelled] {
        let mut alerts = AlertLog::default();
        assert_eq!(evaluate_standing(Some(status), false, &mut alerts).score, 0.0);
        assert!(alerts
            .into_vec()
            .iter()
            .any(|alert| alert.contains("not active")));
    }
}

#[test]
fn irregular_status_always_raises_an_alert() {
    for status in [RegistrationStatus::Suspended, RegistrationStatus::Unfit] {
        let mut alerts = AlertLog::default();
        assert_eq!(evaluate_standing(Some(status), false, &mut alerts).score, 0.3);
        assert!(!alerts.is_empty());

        let mut alerts = AlertLog::default();
        assert_eq!(evaluate_standing(Some(status), true, &mut alerts).score, 0.1);
        assert!(!alerts.is_empty());
    }
}
