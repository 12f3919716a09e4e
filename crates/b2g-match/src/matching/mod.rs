//! Company-to-opportunity matching: domain types, the scoring engine, lead
//! ranking and the collaborators they consume.

pub mod complementarity;
pub mod directory;
pub mod domain;
pub mod geography;
pub mod ranking;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use complementarity::{ComplementarityEntry, Relation, StaticComplementarityTable};
pub use directory::{CandidateSource, CompanyDirectory, DirectoryError, RegistryLookup};
pub use domain::{
    parse_amount, Cnpj, CompanyProfile, CompanySize, CounterpartProfile, RegistrationDate,
    RegistrationStatus, SectorCode,
};
pub use geography::{FederativeUnit, Region};
pub use ranking::{
    CandidateFilter, RankedLead, RankingConfig, RankingPipeline, RankingResult, RawCandidateFilter,
};
pub use scoring::{
    Classification, Criterion, CriterionResult, ScoreResult, ScoringEngine, WeightProfile,
    WeightProfileRegistry,
};
pub use service::{MatchError, MatchService};
