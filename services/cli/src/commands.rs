use std::fs::File;
use std::sync::Arc;

use b2g_match::config::AppConfig;
use b2g_match::error::AppError;
use b2g_match::matching::{
    CompanyDirectory, CompanyProfile, CounterpartProfile, MatchService, RawCandidateFilter,
    StaticComplementarityTable, WeightProfile, WeightProfileRegistry,
};
use b2g_match::telemetry;
use serde::Serialize;
use tracing::info;

use crate::cli::{
    BatchArgs, CompareArgs, OpportunitiesArgs, RankArgs, ScoreArgs, SourceArgs, SubjectArgs,
};
use crate::infra::{print_json, read_json};

/// Service wired from configuration and the data files named on the
/// command line.
pub(crate) struct Context {
    service: MatchService<CompanyDirectory>,
    pretty: bool,
}

impl Context {
    pub(crate) fn load(sources: &SourceArgs) -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        telemetry::init(&config.telemetry)?;

        let directory = match &sources.registry {
            Some(path) => CompanyDirectory::from_path(path)?,
            None => CompanyDirectory::new(),
        };

        let mut profiles = WeightProfileRegistry::builtin()?;
        if let Some(path) = &sources.profiles {
            let added = profiles.extend_from_json(File::open(path)?)?;
            info!(added, path = %path.display(), "custom weight profiles registered");
        }

        let mut service = MatchService::new(Arc::new(directory), profiles, config.ranking)
            .with_default_profile(&config.scoring.default_profile)?;
        if let Some(path) = &sources.complementarity {
            let table = StaticComplementarityTable::from_csv(File::open(path)?)?;
            info!(entries = table.len(), "complementarity table loaded");
            service = service.with_complementarity(Arc::new(table));
        }
        if let Some(today) = sources.today {
            service = service.with_reference_date(today);
        }

        info!(
            environment = ?config.environment,
            default_profile = %config.scoring.default_profile,
            "matching service ready"
        );
        Ok(Self {
            service,
            pretty: sources.pretty,
        })
    }

    fn emit<T: Serialize>(&self, value: &T) -> Result<(), AppError> {
        print_json(value, self.pretty)
    }

    fn subject(&self, args: &SubjectArgs) -> Result<CompanyProfile, AppError> {
        match (&args.cnpj, &args.subject) {
            (Some(cnpj), _) => Ok(self.service.subject(cnpj)?),
            (None, Some(path)) => read_json(path),
            (None, None) => Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "either --cnpj or --subject is required",
            ))),
        }
    }
}

#[derive(Serialize)]
struct ProfileListing<'a> {
    key: &'a str,
    label: &'a str,
    weights: b2g_match::matching::scoring::CriterionWeights,
}

impl<'a> From<&'a WeightProfile> for ProfileListing<'a> {
    fn from(profile: &'a WeightProfile) -> Self {
        Self {
            key: profile.key(),
            label: profile.label(),
            weights: profile.weights(),
        }
    }
}

pub(crate) fn run_profiles(context: &Context) -> Result<(), AppError> {
    let listing: Vec<ProfileListing<'_>> = context
        .service
        .profiles()
        .profiles()
        .map(ProfileListing::from)
        .collect();
    context.emit(&listing)
}

pub(crate) fn run_score(context: &Context, args: ScoreArgs) -> Result<(), AppError> {
    let subject = context.subject(&args.subject)?;
    let counterpart: CounterpartProfile = read_json(&args.counterpart)?;
    let result = context
        .service
        .score(&subject, &counterpart, args.profile.as_deref())?;

    if args.summary {
        context.emit(&result.summary())
    } else {
        context.emit(&result)
    }
}

pub(crate) fn run_compare(context: &Context, args: CompareArgs) -> Result<(), AppError> {
    let subject = context.subject(&args.subject)?;
    let counterpart: CounterpartProfile = read_json(&args.counterpart)?;
    let results = context.service.compare(&subject, &counterpart)?;
    context.emit(&results)
}

pub(crate) fn run_batch(context: &Context, args: BatchArgs) -> Result<(), AppError> {
    let companies: Vec<CompanyProfile> = read_json(&args.companies)?;
    let counterpart: CounterpartProfile = read_json(&args.counterpart)?;
    let entries = context.service.score_batch(
        &companies,
        &counterpart,
        args.profile.as_deref(),
        args.top,
    )?;
    context.emit(&entries)
}

pub(crate) fn run_rank(context: &Context, args: RankArgs) -> Result<(), AppError> {
    let subject = context.subject(&args.subject)?;
    let filter = rank_filter(&args)?;
    let result = context
        .service
        .rank(&subject, &filter, args.profile.as_deref())?;

    if result.timed_out() {
        tracing::warn!(
            scored = result.stats.scored,
            processed = result.stats.processed,
            "ranking returned a partial result"
        );
    }
    context.emit(&result)
}

pub(crate) fn run_opportunities(
    context: &Context,
    args: OpportunitiesArgs,
) -> Result<(), AppError> {
    let subject = context.subject(&args.subject)?;
    let opportunities: Vec<CounterpartProfile> = read_json(&args.opportunities)?;
    let ranking = context.service.opportunities(
        &subject,
        opportunities,
        args.limit,
        args.profile.as_deref(),
    )?;
    context.emit(&ranking)
}

/// Merge the optional filter file with the individual flags.
fn rank_filter(args: &RankArgs) -> Result<RawCandidateFilter, AppError> {
    let mut filter = match &args.filter {
        Some(path) => read_json::<RawCandidateFilter>(path)?,
        None => RawCandidateFilter::default(),
    };

    if let Some(value) = &args.uf {
        filter.state = Some(value.clone());
    }
    if let Some(value) = &args.municipio {
        filter.municipality = Some(value.clone());
    }
    if let Some(value) = &args.porte {
        filter.size = Some(value.clone());
    }
    if let Some(value) = &args.situacao {
        filter.status = Some(value.clone());
    }
    if let Some(value) = &args.idade {
        filter.age = Some(value.clone());
    }
    filter.capital_min = args.capital_min.or(filter.capital_min);
    filter.capital_max = args.capital_max.or(filter.capital_max);
    filter.page = args.page.or(filter.page);
    filter.page_size = args.page_size.or(filter.page_size);
    filter.max_processing = args.max_processing.or(filter.max_processing);
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank_args() -> RankArgs {
        RankArgs {
            subject: SubjectArgs {
                cnpj: Some("53464097000150".to_string()),
                subject: None,
            },
            filter: None,
            uf: None,
            municipio: None,
            porte: None,
            situacao: None,
            idade: None,
            capital_min: None,
            capital_max: None,
            page: None,
            page_size: None,
            max_processing: None,
            profile: None,
        }
    }

    #[test]
    fn flags_fill_the_raw_filter() {
        let args = RankArgs {
            uf: Some("sp".to_string()),
            situacao: Some("todas".to_string()),
            capital_min: Some(100_000.0),
            page_size: Some(10),
            ..rank_args()
        };
        let filter = rank_filter(&args).expect("filter builds");

        assert_eq!(filter.state.as_deref(), Some("sp"));
        assert_eq!(filter.status.as_deref(), Some("todas"));
        assert_eq!(filter.capital_min, Some(100_000.0));
        assert_eq!(filter.page_size, Some(10));
        assert!(filter.age.is_none());
        assert!(filter.page.is_none());
    }

    #[test]
    fn missing_filter_file_is_an_io_error() {
        let args = RankArgs {
            filter: Some("does/not/exist.json".into()),
            ..rank_args()
        };
        match rank_filter(&args) {
            Err(AppError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
