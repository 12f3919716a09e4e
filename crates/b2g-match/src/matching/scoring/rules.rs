use chrono::NaiveDate;

use super::super::domain::{CompanySize, RegistrationDate, RegistrationStatus, SectorCode};
use super::super::geography::FederativeUnit;
use super::sector::SectorFit;
use super::AlertLog;

const DAYS_PER_YEAR: f64 = 365.25;

/// Score in `0.0..=1.0` plus the reason behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub score: f64,
    pub rationale: String,
}

impl Assessment {
    pub(crate) fn new(score: f64, rationale: impl Into<String>) -> Self {
        Self {
            score,
            rationale: rationale.into(),
        }
    }
}

pub(crate) fn evaluate_sector(
    strategy: &dyn SectorFit,
    subject: Option<&SectorCode>,
    counterpart: Option<&SectorCode>,
    alerts: &mut AlertLog,
) -> Assessment {
    match (subject, counterpart) {
        (Some(subject), Some(counterpart)) => strategy.assess(subject, counterpart, alerts),
        _ => {
            alerts.push("sector code missing, neutral score applied");
            Assessment::new(0.5, "sector not informed")
        }
    }
}

pub(crate) fn evaluate_location(
    subject_state: Option<&str>,
    subject_municipality: Option<&str>,
    counterpart_state: Option<&str>,
    counterpart_municipality: Option<&str>,
    alerts: &mut AlertLog,
) -> Assessment {
    let (subject_state, counterpart_state) = match (
        non_blank(subject_state).map(str::to_uppercase),
        non_blank(counterpart_state).map(str::to_uppercase),
    ) {
        (Some(subject), Some(counterpart)) => (subject, counterpart),
        _ => return Assessment::new(0.5, "location not informed"),
    };

    if subject_state == counterpart_state {
        let same_municipality = match (
            non_blank(subject_municipality),
            non_blank(counterpart_municipality),
        ) {
            (Some(left), Some(right)) => left.to_lowercase() == right.to_lowercase(),
            _ => false,
        };
        if same_municipality {
            return Assessment::new(1.0, "same municipality");
        }
        return Assessment::new(0.8, "same state");
    }

    let (subject_unit, counterpart_unit) = match (
        FederativeUnit::parse(&subject_state),
        FederativeUnit::parse(&counterpart_state),
    ) {
        (Some(subject), Some(counterpart)) => (subject, counterpart),
        (subject, _) => {
            let unknown = if subject.is_none() {
                subject_state
            } else {
                counterpart_state
            };
            alerts.push(format!("unrecognized state code '{unknown}'"));
            return Assessment::new(0.15, "different regions");
        }
    };

    if subject_unit.borders(counterpart_unit) {
        return Assessment::new(0.5, "neighboring state");
    }

    if subject_unit.region() == counterpart_unit.region() {
        return Assessment::new(
            0.3,
            format!("same region ({})", subject_unit.region().label()),
        );
    }

    Assessment::new(0.15, "different regions")
}

pub(crate) fn evaluate_size(size: Option<CompanySize>, preferred: &[CompanySize]) -> Assessment {
    let level = match size.and_then(CompanySize::level) {
        Some(level) => level,
        None => return Assessment::new(0.5, "size not informed"),
    };

    let preferred_levels: Vec<u8> = preferred
        .iter()
        .filter_map(|size| size.level())
        .collect();

    if let Some(minimum) = preferred_levels.iter().min() {
        if preferred_levels.contains(&level) {
            return Assessment::new(1.0, "size matches preference");
        }
        if level.abs_diff(*minimum) <= 1 {
            return Assessment::new(0.7, "size close to preference");
        }
        return Assessment::new(0.4, "size far from preference");
    }

    match level {
        4.. => Assessment::new(0.9, "large company"),
        3 => Assessment::new(0.7, "small company"),
        _ => Assessment::new(0.5, "micro company"),
    }
}

pub(crate) fn evaluate_capital(
    capital: f64,
    estimated_value: f64,
    alerts: &mut AlertLog,
) -> Assessment {
    if capital <= 0.0 {
        alerts.push("share capital not declared");
        return Assessment::new(0.3, "capital not declared");
    }

    if estimated_value <= 0.0 {
        return if capital >= 5_000_000.0 {
            Assessment::new(0.9, "high share capital")
        } else if capital >= 1_000_000.0 {
            Assessment::new(0.8, "solid share capital")
        } else if capital >= 500_000.0 {
            Assessment::new(0.7, "adequate share capital")
        } else if capital >= 100_000.0 {
            Assessment::new(0.6, "moderate share capital")
        } else {
            Assessment::new(0.5, "limited share capital")
        };
    }

    let ratio = capital / estimated_value;
    if ratio >= 0.20 {
        Assessment::new(1.0, format!("capital covers {:.0}% of the value", ratio * 100.0))
    } else if ratio >= 0.15 {
        Assessment::new(0.9, "capital adequate for the project")
    } else if ratio >= 0.10 {
        Assessment::new(0.8, "capital sufficient")
    } else if ratio >= 0.05 {
        Assessment::new(0.6, "capital at the limit")
    } else {
        alerts.push("share capital may be insufficient for the project");
        Assessment::new(0.3, "capital insufficient")
    }
}

pub(crate) fn evaluate_experience(
    registered_on: Option<&RegistrationDate>,
    requires_experience: bool,
    reference_date: NaiveDate,
    alerts: &mut AlertLog,
) -> Assessment {
    let started = match registered_on {
        Some(RegistrationDate::Known(date)) => *date,
        Some(RegistrationDate::Unparseable(raw)) => {
            if requires_experience {
                alerts.push(format!("registration date '{raw}' is invalid"));
                return Assessment::new(0.3, "invalid registration date");
            }
            return Assessment::new(0.5, "invalid registration date");
        }
        None => {
            if requires_experience {
                alerts.push("registration date not informed");
                return Assessment::new(0.3, "experience not verifiable");
            }
            return Assessment::new(0.5, "registration date not informed");
        }
    };

    let days = (reference_date - started).num_days();
    if days < 0 {
        alerts.push("registration date lies in the future");
        return Assessment::new(0.0, "registration date in the future");
    }

    let years = days as f64 / DAYS_PER_YEAR;
    let whole_years = years.floor() as i64;
    if years >= 15.0 {
        Assessment::new(1.0, format!("{whole_years} years, highly experienced"))
    } else if years >= 10.0 {
        Assessment::new(0.95, format!("{whole_years} years, experienced"))
    } else if years >= 5.0 {
        Assessment::new(0.85, format!("{whole_years} years, consolidated"))
    } else if years >= 3.0 {
        Assessment::new(0.7, format!("{whole_years} years, established"))
    } else if years >= 2.0 {
        Assessment::new(0.6, format!("{whole_years} years, growing"))
    } else if years >= 1.0 {
        Assessment::new(0.5, format!("{whole_years} year(s), recent"))
    } else if requires_experience {
        alerts.push("company too young for the experience requirement");
        Assessment::new(0.2, "less than one year")
    } else {
        Assessment::new(0.4, "less than one year")
    }
}

pub(crate) fn evaluate_standing(
    status: Option<RegistrationStatus>,
    requires_certificates: bool,
    alerts: &mut AlertLog,
) -> Assessment {
    let status = match status {
        Some(status) => status,
        None => {
            if requires_certificates {
                alerts.push("registration status not verifiable");
                return Assessment::new(0.3, "status not informed");
            }
            return Assessment::new(0.5, "status not informed");
        }
    };

    match status {
        RegistrationStatus::Active => Assessment::new(1.0, "company active"),
        RegistrationStatus::ShutDown | RegistrationStatus::Cancelled => {
            alerts.push("company not active");
            Assessment::new(0.0, format!("company {}", status.label()))
        }
        RegistrationStatus::Suspended | RegistrationStatus::Unfit => {
            alerts.push(format!("irregular registration status: {}", status.label()));
            let score = if requires_certificates { 0.1 } else { 0.3 };
            Assessment::new(score, format!("company {}", status.label()))
        }
        RegistrationStatus::Void | RegistrationStatus::Unknown => {
            if requires_certificates {
                alerts.push("registration status not recognized");
                return Assessment::new(0.3, "status unknown");
            }
            Assessment::new(0.5, "status unknown")
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
