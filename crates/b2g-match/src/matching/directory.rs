//! Registry lookups and candidate sources, plus an in-memory directory that
//! can be loaded from a registry CSV export.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{
    parse_amount, Cnpj, CompanyProfile, CompanySize, RegistrationDate, RegistrationStatus,
    SectorCode,
};
use super::ranking::CandidateQuery;
use super::scoring::SectorDirectory;

/// Resolves a company registry identifier into its profile.
pub trait RegistryLookup: Send + Sync {
    fn lookup(&self, cnpj: &Cnpj) -> Result<Option<CompanyProfile>, DirectoryError>;
}

/// Supplies ranking candidates, applying the structural filters while loading.
pub trait CandidateSource: Send + Sync {
    fn candidates(&self, query: &CandidateQuery) -> Result<Vec<CompanyProfile>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read company directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed company directory: {0}")]
    Csv(#[from] csv::Error),
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Company profiles indexed by CNPJ, plus sector descriptions seen in the
/// export.
#[derive(Debug, Clone, Default)]
pub struct CompanyDirectory {
    companies: BTreeMap<Cnpj, CompanyProfile>,
    unidentified: Vec<CompanyProfile>,
    sector_descriptions: BTreeMap<SectorCode, String>,
}

impl CompanyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = CompanyProfile>) -> Self {
        let mut directory = Self::new();
        for profile in profiles {
            directory.insert(profile);
        }
        directory
    }

    /// Load a registry CSV export from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a registry CSV export. Column names follow the public registry
    /// layout (`cnpj`, `razao_social`, `cnae_fiscal_principal`, `uf`, ...).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut directory = Self::new();

        for record in csv_reader.deserialize::<RegistryRow>() {
            let row = record?;
            if let (Some(code), Some(description)) = (&row.primary_sector, &row.sector_description)
            {
                directory
                    .sector_descriptions
                    .entry(code.clone())
                    .or_insert_with(|| description.clone());
            }
            directory.insert(row.into_profile());
        }

        tracing::debug!(
            companies = directory.len(),
            sectors = directory.sector_descriptions.len(),
            "company directory loaded"
        );
        Ok(directory)
    }

    /// Add a profile; a later profile with the same CNPJ replaces the earlier one.
    pub fn insert(&mut self, profile: CompanyProfile) {
        match profile.cnpj.clone() {
            Some(cnpj) => {
                self.companies.insert(cnpj, profile);
            }
            None => self.unidentified.push(profile),
        }
    }

    pub fn describe_sector(&mut self, code: SectorCode, description: impl Into<String>) {
        self.sector_descriptions.insert(code, description.into());
    }

    pub fn len(&self) -> usize {
        self.companies.len() + self.unidentified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn profiles(&self) -> impl Iterator<Item = &CompanyProfile> {
        self.companies.values().chain(&self.unidentified)
    }
}

impl RegistryLookup for CompanyDirectory {
    fn lookup(&self, cnpj: &Cnpj) -> Result<Option<CompanyProfile>, DirectoryError> {
        Ok(self.companies.get(cnpj).cloned())
    }
}

impl CandidateSource for CompanyDirectory {
    fn candidates(&self, query: &CandidateQuery) -> Result<Vec<CompanyProfile>, DirectoryError> {
        Ok(self
            .profiles()
            .filter(|profile| query.matches(profile))
            .cloned()
            .collect())
    }
}

impl SectorDirectory for CompanyDirectory {
    fn describe(&self, code: &SectorCode) -> Option<String> {
        self.sector_descriptions.get(code).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct RegistryRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    cnpj: Option<String>,
    #[serde(
        default,
        alias = "razao_social_nome_empresarial",
        deserialize_with = "empty_string_as_none"
    )]
    razao_social: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    nome_fantasia: Option<String>,
    #[serde(
        default,
        rename = "cnae_fiscal_principal",
        alias = "cnae_fiscal",
        deserialize_with = "sector"
    )]
    primary_sector: Option<SectorCode>,
    #[serde(
        default,
        rename = "cnae_fiscal_descricao",
        alias = "cnae_descricao",
        deserialize_with = "empty_string_as_none"
    )]
    sector_description: Option<String>,
    #[serde(
        default,
        alias = "cnae_fiscal_secundaria",
        deserialize_with = "empty_string_as_none"
    )]
    cnaes_secundarios: Option<String>,
    #[serde(
        default,
        alias = "porte",
        deserialize_with = "empty_string_as_none"
    )]
    porte_da_empresa: Option<String>,
    #[serde(
        default,
        alias = "capital_social",
        deserialize_with = "empty_string_as_none"
    )]
    capital_social_da_empresa: Option<String>,
    #[serde(
        default,
        alias = "data_abertura",
        deserialize_with = "empty_string_as_none"
    )]
    data_de_inicio_atividade: Option<String>,
    #[serde(
        default,
        alias = "situacao",
        deserialize_with = "empty_string_as_none"
    )]
    situacao_cadastral: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    uf: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    municipio: Option<String>,
    #[serde(
        default,
        alias = "correio_eletronico",
        deserialize_with = "empty_string_as_none"
    )]
    email: Option<String>,
    #[serde(
        default,
        alias = "telefone_1",
        deserialize_with = "empty_string_as_none"
    )]
    telefone: Option<String>,
}

impl RegistryRow {
    fn into_profile(self) -> CompanyProfile {
        let secondary_sectors = self
            .cnaes_secundarios
            .as_deref()
            .map(|raw| {
                raw.split([',', ';', '|'])
                    .filter_map(SectorCode::parse)
                    .collect()
            })
            .unwrap_or_default();

        CompanyProfile {
            cnpj: self.cnpj.as_deref().and_then(Cnpj::normalize),
            legal_name: self.razao_social,
            trade_name: self.nome_fantasia,
            primary_sector: self.primary_sector,
            secondary_sectors,
            size: self.porte_da_empresa.as_deref().map(CompanySize::parse),
            capital: self
                .capital_social_da_empresa
                .as_deref()
                .and_then(parse_amount)
                .unwrap_or(0.0),
            registered_on: self
                .data_de_inicio_atividade
                .as_deref()
                .map(RegistrationDate::parse),
            status: self
                .situacao_cadastral
                .as_deref()
                .map(RegistrationStatus::parse),
            state: self.uf.map(|uf| uf.to_uppercase()),
            municipality: self.municipio.map(|name| name.to_uppercase()),
            email: self.email,
            phone: self.telefone,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn sector<'de, D>(deserializer: D) -> Result<Option<SectorCode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(empty_string_as_none(deserializer)?.and_then(|raw| SectorCode::parse(&raw)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const EXPORT: &str = "\
cnpj,razao_social,nome_fantasia,cnae_fiscal_principal,cnae_fiscal_descricao,porte_da_empresa,capital_social_da_empresa,data_de_inicio_atividade,situacao_cadastral,uf,municipio,telefone_1
11.222.333/0001-81,Mercado Central Ltda,Mercado Central,4711301,Hipermercados,05,\"1.500.000,00\",20100315,02,sp,São Paulo,1133334444
22333444000155,Clinica Boa Vida,,8610101,Atividades de atendimento hospitalar,03,250000,2019-06-01,08,RJ,Rio de Janeiro,
";

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
    }

    #[test]
    fn loads_registry_export() {
        let directory = CompanyDirectory::from_reader(EXPORT.as_bytes()).expect("export parses");
        assert_eq!(directory.len(), 2);

        let cnpj = Cnpj::normalize("11222333000181").expect("digits");
        let market = directory
            .lookup(&cnpj)
            .expect("lookup succeeds")
            .expect("company present");
        assert_eq!(market.display_name(), "Mercado Central");
        assert_eq!(market.capital, 1_500_000.0);
        assert_eq!(market.size, Some(CompanySize::Medium));
        assert_eq!(market.status, Some(RegistrationStatus::Active));
        assert_eq!(market.state.as_deref(), Some("SP"));
        assert_eq!(market.municipality.as_deref(), Some("SÃO PAULO"));
        assert_eq!(
            market.registration_date(),
            NaiveDate::from_ymd_opt(2010, 3, 15)
        );

        let code = SectorCode::parse("4711301").expect("valid code");
        assert_eq!(directory.describe(&code).as_deref(), Some("Hipermercados"));
    }

    #[test]
    fn candidates_respect_structural_filters() {
        let directory = CompanyDirectory::from_reader(EXPORT.as_bytes()).expect("export parses");

        let active = directory
            .candidates(&CandidateQuery::active_only(reference()))
            .expect("query succeeds");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].state.as_deref(), Some("SP"));

        let mut query = CandidateQuery::active_only(reference());
        query.capital_min = Some(2_000_000.0);
        assert!(directory
            .candidates(&query)
            .expect("query succeeds")
            .is_empty());
    }

    #[test]
    fn unknown_cnpj_is_absent() {
        let directory = CompanyDirectory::from_reader(EXPORT.as_bytes()).expect("export parses");
        let missing = Cnpj::normalize("99999999000199").expect("digits");
        assert!(directory.lookup(&missing).expect("lookup succeeds").is_none());
    }
}
