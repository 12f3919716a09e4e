use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};

use super::directory::{CandidateSource, DirectoryError, RegistryLookup};
use super::domain::{Cnpj, CompanyProfile, CounterpartProfile, SectorCode};
use super::ranking::{
    rank_opportunities, CandidateFilter, FilterError, OpportunityRanking, RankingConfig,
    RankingError, RankingPipeline, RankingResult, RawCandidateFilter,
};
use super::scoring::{
    compare_profiles, score_batch, sector_fit_for, BatchEntry, ScoreResult, ScoringEngine,
    SectorComplementarity, SectorDirectory, WeightProfileError, WeightProfileRegistry,
    DEFAULT_PROFILE_KEY,
};

/// Entry point composing the weight registry, the company directory and the
/// optional complementarity table.
pub struct MatchService<D> {
    directory: Arc<D>,
    profiles: Arc<WeightProfileRegistry>,
    complementarity: Option<Arc<dyn SectorComplementarity>>,
    ranking: RankingConfig,
    default_profile: String,
    reference_date: NaiveDate,
}

impl<D> MatchService<D>
where
    D: RegistryLookup + CandidateSource + 'static,
{
    pub fn new(directory: Arc<D>, profiles: WeightProfileRegistry, ranking: RankingConfig) -> Self {
        Self {
            directory,
            profiles: Arc::new(profiles),
            complementarity: None,
            ranking,
            default_profile: DEFAULT_PROFILE_KEY.to_string(),
            reference_date: Local::now().date_naive(),
        }
    }

    pub fn with_complementarity(mut self, table: Arc<dyn SectorComplementarity>) -> Self {
        self.complementarity = Some(table);
        self
    }

    /// Profile used when a call does not name one. Fails on unknown names.
    pub fn with_default_profile(mut self, name: &str) -> Result<Self, MatchError> {
        let key = self.profiles.get(name)?.key().to_string();
        self.default_profile = key;
        Ok(self)
    }

    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }

    pub fn profiles(&self) -> &WeightProfileRegistry {
        &self.profiles
    }

    /// Scoring engine for a named profile, or the default profile.
    pub fn engine(&self, profile: Option<&str>) -> Result<ScoringEngine, MatchError> {
        let name = profile.unwrap_or(self.default_profile.as_str());
        let profile = self.profiles.get(name)?.clone();
        Ok(ScoringEngine::new(profile)
            .with_sector_fit(sector_fit_for(self.complementarity.clone()))
            .with_reference_date(self.reference_date))
    }

    pub fn score(
        &self,
        subject: &CompanyProfile,
        counterpart: &CounterpartProfile,
        profile: Option<&str>,
    ) -> Result<ScoreResult, MatchError> {
        let engine = self.engine(profile)?;
        Ok(engine.calculate(subject, counterpart))
    }

    pub fn score_by_cnpj(
        &self,
        cnpj: &str,
        counterpart: &CounterpartProfile,
        profile: Option<&str>,
    ) -> Result<ScoreResult, MatchError> {
        let subject = self.subject(cnpj)?;
        self.score(&subject, counterpart, profile)
    }

    /// Score a pair under every registered profile.
    pub fn compare(
        &self,
        subject: &CompanyProfile,
        counterpart: &CounterpartProfile,
    ) -> Result<BTreeMap<String, ScoreResult>, MatchError> {
        let engine = self.engine(None)?;
        Ok(compare_profiles(&self.profiles, &engine, subject, counterpart))
    }

    pub fn score_batch(
        &self,
        companies: &[CompanyProfile],
        counterpart: &CounterpartProfile,
        profile: Option<&str>,
        top_n: Option<usize>,
    ) -> Result<Vec<BatchEntry>, MatchError> {
        let engine = self.engine(profile)?;
        Ok(score_batch(&engine, companies, counterpart, top_n))
    }

    pub fn rank(
        &self,
        subject: &CompanyProfile,
        filter: &RawCandidateFilter,
        profile: Option<&str>,
    ) -> Result<RankingResult, MatchError> {
        let filter = CandidateFilter::parse(filter, &self.ranking, self.reference_date)?;
        let mut pipeline = RankingPipeline::new(self.engine(profile)?, self.ranking.clone());
        if let Some(table) = &self.complementarity {
            pipeline = pipeline.with_complementarity(Arc::clone(table));
        }
        Ok(pipeline.rank(subject, self.directory.as_ref(), &filter)?)
    }

    pub fn rank_by_cnpj(
        &self,
        cnpj: &str,
        filter: &RawCandidateFilter,
        profile: Option<&str>,
    ) -> Result<RankingResult, MatchError> {
        let subject = self.subject(cnpj)?;
        self.rank(&subject, filter, profile)
    }

    pub fn opportunities(
        &self,
        subject: &CompanyProfile,
        opportunities: Vec<CounterpartProfile>,
        limit: Option<usize>,
        profile: Option<&str>,
    ) -> Result<OpportunityRanking, MatchError> {
        let engine = self.engine(profile)?;
        Ok(rank_opportunities(&engine, subject, opportunities, limit))
    }

    /// Resolve a subject by CNPJ through the registry.
    pub fn subject(&self, cnpj: &str) -> Result<CompanyProfile, MatchError> {
        let normalized =
            Cnpj::normalize(cnpj).ok_or_else(|| MatchError::InvalidCnpj(cnpj.to_string()))?;
        if !normalized.is_valid() {
            return Err(MatchError::InvalidCnpj(cnpj.to_string()));
        }
        self.directory
            .lookup(&normalized)?
            .ok_or_else(|| MatchError::NotFound(normalized.to_string()))
    }
}

impl<D> MatchService<D>
where
    D: RegistryLookup + CandidateSource + SectorDirectory + 'static,
{
    /// Registry description of a sector code, when the directory knows it.
    pub fn describe_sector(&self, code: &SectorCode) -> Option<String> {
        self.directory.describe(code)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error(transparent)]
    Profile(#[from] WeightProfileError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("invalid CNPJ '{0}'")]
    InvalidCnpj(String),
    #[error("company {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl MatchError {
    /// Caller supplied a bad profile name, filter value or identifier.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MatchError::Profile(_) | MatchError::Filter(_) | MatchError::InvalidCnpj(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MatchError::NotFound(_))
    }
}

impl From<RankingError> for MatchError {
    fn from(value: RankingError) -> Self {
        match value {
            RankingError::Source(err) => MatchError::Directory(err),
        }
    }
}
