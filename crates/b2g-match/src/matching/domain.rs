use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Normalized 14-digit company registry identifier (CNPJ).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cnpj(String);

const CNPJ_LENGTH: usize = 14;
const FIRST_CHECK_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_CHECK_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

impl Cnpj {
    /// Keep digits only, left-pad short input with zeros and truncate long
    /// input to 14 digits. Returns `None` when the input has no digits.
    pub fn normalize(raw: &str) -> Option<Self> {
        let digits: String = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(CNPJ_LENGTH)
            .collect();
        if digits.is_empty() {
            return None;
        }
        Some(Self(format!("{digits:0>14}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify both mod-11 check digits. Repeated-digit sequences are invalid.
    pub fn is_valid(&self) -> bool {
        let digits: Vec<u32> = self.0.chars().filter_map(|c| c.to_digit(10)).collect();
        if digits.len() != CNPJ_LENGTH {
            return false;
        }
        if digits.iter().all(|digit| *digit == digits[0]) {
            return false;
        }

        let first = check_digit(&digits[..12], &FIRST_CHECK_WEIGHTS);
        let second = check_digit(&digits[..13], &SECOND_CHECK_WEIGHTS);
        digits[12] == first && digits[13] == second
    }
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip(weights)
        .map(|(digit, weight)| digit * weight)
        .sum();
    match sum % 11 {
        remainder if remainder < 2 => 0,
        remainder => 11 - remainder,
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Cnpj {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Economic activity code (CNAE), digits only and zero-padded to seven digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectorCode(String);

const SECTOR_CODE_LENGTH: usize = 7;

impl SectorCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        Some(Self(format!(
            "{digits:0>width$}",
            width = SECTOR_CODE_LENGTH
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-digit division, the level at which companies usually compete.
    pub fn division(&self) -> &str {
        self.prefix(2)
    }

    /// Leading digit, a coarse grouping of related divisions.
    pub fn section_digit(&self) -> &str {
        self.prefix(1)
    }

    /// Four-digit class used by complementarity tables.
    pub fn class(&self) -> &str {
        self.prefix(4)
    }

    pub fn prefix(&self, len: usize) -> &str {
        // Codes are ASCII digits, so byte offsets are char boundaries.
        &self.0[..len.min(self.0.len())]
    }

    pub fn same_division(&self, other: &SectorCode) -> bool {
        self.division() == other.division()
    }
}

impl fmt::Display for SectorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SectorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Company size category ordered from the smallest to the largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanySize {
    MicroIndividual,
    Micro,
    Small,
    Medium,
    Large,
    Unknown,
}

const SIZE_SYNONYMS: &[(&str, CompanySize)] = &[
    ("MEI", CompanySize::MicroIndividual),
    ("MICROEMPREENDEDOR INDIVIDUAL", CompanySize::MicroIndividual),
    ("MICRO_INDIVIDUAL", CompanySize::MicroIndividual),
    ("MICRO", CompanySize::Micro),
    ("ME", CompanySize::Micro),
    ("MICRO EMPRESA", CompanySize::Micro),
    ("MICROEMPRESA", CompanySize::Micro),
    ("01", CompanySize::Micro),
    ("1", CompanySize::Micro),
    ("PEQUENO", CompanySize::Small),
    ("PEQUENA", CompanySize::Small),
    ("EPP", CompanySize::Small),
    ("PEQUENO PORTE", CompanySize::Small),
    ("EMPRESA DE PEQUENO PORTE", CompanySize::Small),
    ("SMALL", CompanySize::Small),
    ("03", CompanySize::Small),
    ("3", CompanySize::Small),
    ("MEDIO", CompanySize::Medium),
    ("MÉDIO", CompanySize::Medium),
    ("MEDIA", CompanySize::Medium),
    ("MÉDIA", CompanySize::Medium),
    ("MEDIO PORTE", CompanySize::Medium),
    ("MÉDIO PORTE", CompanySize::Medium),
    ("MEDIUM", CompanySize::Medium),
    ("DEMAIS", CompanySize::Medium),
    ("05", CompanySize::Medium),
    ("5", CompanySize::Medium),
    ("GRANDE", CompanySize::Large),
    ("GRANDE PORTE", CompanySize::Large),
    ("LARGE", CompanySize::Large),
];

impl CompanySize {
    pub fn parse(raw: &str) -> Self {
        let key = raw.trim().to_uppercase();
        SIZE_SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == key)
            .map(|(_, size)| *size)
            .unwrap_or(Self::Unknown)
    }

    /// Position on the 1..=5 scale; `None` for [`CompanySize::Unknown`].
    pub const fn level(self) -> Option<u8> {
        match self {
            CompanySize::MicroIndividual => Some(1),
            CompanySize::Micro => Some(2),
            CompanySize::Small => Some(3),
            CompanySize::Medium => Some(4),
            CompanySize::Large => Some(5),
            CompanySize::Unknown => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CompanySize::MicroIndividual => "MEI",
            CompanySize::Micro => "MICRO",
            CompanySize::Small => "PEQUENO",
            CompanySize::Medium => "MEDIO",
            CompanySize::Large => "GRANDE",
            CompanySize::Unknown => "DESCONHECIDO",
        }
    }

    /// Registry exports collapse medium and large companies into one code.
    pub fn same_registry_band(self, other: CompanySize) -> bool {
        match (self, other) {
            (CompanySize::Medium | CompanySize::Large, CompanySize::Medium | CompanySize::Large) => {
                true
            }
            (left, right) => left == right,
        }
    }
}

impl Serialize for CompanySize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for CompanySize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Scalar::deserialize(deserializer)?;
        Ok(Self::parse(&raw.into_text()))
    }
}

/// Registry status of a company (situação cadastral).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationStatus {
    Active,
    Suspended,
    Unfit,
    ShutDown,
    Void,
    Cancelled,
    Unknown,
}

const STATUS_SYNONYMS: &[(&str, RegistrationStatus)] = &[
    ("ATIVA", RegistrationStatus::Active),
    ("ATIVO", RegistrationStatus::Active),
    ("ACTIVE", RegistrationStatus::Active),
    ("02", RegistrationStatus::Active),
    ("2", RegistrationStatus::Active),
    ("SUSPENSA", RegistrationStatus::Suspended),
    ("SUSPENDED", RegistrationStatus::Suspended),
    ("03", RegistrationStatus::Suspended),
    ("3", RegistrationStatus::Suspended),
    ("INAPTA", RegistrationStatus::Unfit),
    ("UNFIT", RegistrationStatus::Unfit),
    ("04", RegistrationStatus::Unfit),
    ("4", RegistrationStatus::Unfit),
    ("BAIXADA", RegistrationStatus::ShutDown),
    ("SHUT_DOWN", RegistrationStatus::ShutDown),
    ("08", RegistrationStatus::ShutDown),
    ("8", RegistrationStatus::ShutDown),
    ("NULA", RegistrationStatus::Void),
    ("VOID", RegistrationStatus::Void),
    ("01", RegistrationStatus::Void),
    ("1", RegistrationStatus::Void),
    ("CANCELADA", RegistrationStatus::Cancelled),
    ("CANCELLED", RegistrationStatus::Cancelled),
];

impl RegistrationStatus {
    pub fn parse(raw: &str) -> Self {
        let key = raw.trim().to_uppercase();
        STATUS_SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == key)
            .map(|(_, status)| *status)
            .unwrap_or(Self::Unknown)
    }

    pub const fn label(self) -> &'static str {
        match self {
            RegistrationStatus::Active => "ATIVA",
            RegistrationStatus::Suspended => "SUSPENSA",
            RegistrationStatus::Unfit => "INAPTA",
            RegistrationStatus::ShutDown => "BAIXADA",
            RegistrationStatus::Void => "NULA",
            RegistrationStatus::Cancelled => "CANCELADA",
            RegistrationStatus::Unknown => "DESCONHECIDA",
        }
    }
}

impl Serialize for RegistrationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for RegistrationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Scalar::deserialize(deserializer)?;
        Ok(Self::parse(&raw.into_text()))
    }
}

/// Registration (activity start) date as supplied by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationDate {
    Known(NaiveDate),
    Unparseable(String),
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d", "%d-%m-%Y", "%Y/%m/%d"];

impl RegistrationDate {
    pub fn parse(raw: &str) -> Self {
        let head: String = raw.trim().chars().take(10).collect();
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&head, format).ok())
            .map(Self::Known)
            .unwrap_or_else(|| Self::Unparseable(raw.trim().to_string()))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            RegistrationDate::Known(date) => Some(*date),
            RegistrationDate::Unparseable(_) => None,
        }
    }
}

impl From<NaiveDate> for RegistrationDate {
    fn from(value: NaiveDate) -> Self {
        Self::Known(value)
    }
}

impl Serialize for RegistrationDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RegistrationDate::Known(date) => {
                serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
            }
            RegistrationDate::Unparseable(raw) => serializer.serialize_str(raw),
        }
    }
}

/// Registry snapshot of a company: the evaluating subject or a ranked lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(
        default,
        deserialize_with = "optional_cnpj",
        skip_serializing_if = "Option::is_none"
    )]
    pub cnpj: Option<Cnpj>,
    #[serde(
        default,
        alias = "razao_social",
        skip_serializing_if = "Option::is_none"
    )]
    pub legal_name: Option<String>,
    #[serde(
        default,
        alias = "nome_fantasia",
        skip_serializing_if = "Option::is_none"
    )]
    pub trade_name: Option<String>,
    #[serde(
        default,
        alias = "cnae_fiscal",
        alias = "cnae_fiscal_principal",
        alias = "cnae_relacionado",
        deserialize_with = "optional_sector"
    )]
    pub primary_sector: Option<SectorCode>,
    #[serde(
        default,
        alias = "cnaes_secundarios",
        deserialize_with = "sector_set",
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    pub secondary_sectors: BTreeSet<SectorCode>,
    #[serde(
        default,
        alias = "porte",
        alias = "porte_da_empresa",
        deserialize_with = "optional_size"
    )]
    pub size: Option<CompanySize>,
    #[serde(
        default,
        alias = "capital_social",
        alias = "capital_social_da_empresa",
        deserialize_with = "amount"
    )]
    pub capital: f64,
    #[serde(
        default,
        alias = "data_abertura",
        alias = "data_de_inicio_atividade",
        deserialize_with = "optional_date"
    )]
    pub registered_on: Option<RegistrationDate>,
    #[serde(
        default,
        alias = "situacao_cadastral",
        alias = "situacao",
        deserialize_with = "optional_status"
    )]
    pub status: Option<RegistrationStatus>,
    #[serde(default, alias = "uf", deserialize_with = "optional_upper")]
    pub state: Option<String>,
    #[serde(default, alias = "municipio", deserialize_with = "optional_upper")]
    pub municipality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        alias = "telefone",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
}

impl CompanyProfile {
    /// Display name preferring the trade name, then the legal name, then the CNPJ.
    pub fn display_name(&self) -> String {
        self.trade_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.legal_name.as_deref())
            .map(str::to_string)
            .or_else(|| self.cnpj.as_ref().map(Cnpj::to_string))
            .unwrap_or_else(|| "unidentified company".to_string())
    }

    pub fn registration_date(&self) -> Option<NaiveDate> {
        self.registered_on.as_ref().and_then(RegistrationDate::date)
    }
}

/// An opportunity (tender) or a synthesized lead counterpart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterpartProfile {
    #[serde(flatten)]
    pub company: CompanyProfile,
    #[serde(
        default,
        alias = "numero_controle",
        alias = "numeroControlePNCP",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference: Option<String>,
    #[serde(
        default,
        alias = "valorEstimado",
        alias = "valor_estimado",
        deserialize_with = "amount"
    )]
    pub estimated_value: f64,
    #[serde(default, alias = "porte_preferencial")]
    pub preferred_sizes: Vec<CompanySize>,
    #[serde(default, alias = "exige_experiencia")]
    pub requires_experience: bool,
    #[serde(default, alias = "exige_certidoes")]
    pub requires_certificates: bool,
    #[serde(default, alias = "palavras_chave")]
    pub keywords: Vec<String>,
}

/// Registry payloads mix strings and numbers for the same field.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Integer(value) => value.to_string(),
            Scalar::Float(value) => value.to_string(),
        }
    }
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value
        .map(Scalar::into_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}

fn optional_upper<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.map(|text| text.to_uppercase()))
}

fn optional_cnpj<'de, D>(deserializer: D) -> Result<Option<Cnpj>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.and_then(|text| Cnpj::normalize(&text)))
}

fn optional_sector<'de, D>(deserializer: D) -> Result<Option<SectorCode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.and_then(|text| SectorCode::parse(&text)))
}

fn sector_set<'de, D>(deserializer: D) -> Result<BTreeSet<SectorCode>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Scalar>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .filter_map(|value| SectorCode::parse(&value.into_text()))
        .collect())
}

fn optional_size<'de, D>(deserializer: D) -> Result<Option<CompanySize>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.map(|text| CompanySize::parse(&text)))
}

fn optional_status<'de, D>(deserializer: D) -> Result<Option<RegistrationStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.map(|text| RegistrationStatus::parse(&text)))
}

fn optional_date<'de, D>(deserializer: D) -> Result<Option<RegistrationDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.map(|text| RegistrationDate::parse(&text)))
}

pub(crate) fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(match value {
        None => 0.0,
        Some(Scalar::Integer(value)) => value as f64,
        Some(Scalar::Float(value)) => value,
        Some(Scalar::Text(text)) => parse_amount(&text).unwrap_or(0.0),
    })
}

pub(crate) fn amount_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(Scalar::Integer(value)) => Some(value as f64),
        Some(Scalar::Float(value)) => Some(value),
        Some(Scalar::Text(text)) => parse_amount(&text),
    })
}

/// Parse a monetary amount written either as `1234.5` or in the Brazilian
/// `1.234,50` / `1.234.567` notation. Returns `None` for text that is not a
/// number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_start_matches("R$").trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = if trimmed.contains(',') || is_dot_grouped(trimmed) {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Digits grouped in threes by dots, as in `1.500` or `1.000.000`.
fn is_dot_grouped(text: &str) -> bool {
    let groups: Vec<&str> = text.split('.').collect();
    let all_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());
    match groups.split_first() {
        Some((head, rest)) if !rest.is_empty() => {
            (1..=3).contains(&head.len())
                && all_digits(*head)
                && rest.iter().all(|group| group.len() == 3 && all_digits(*group))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_accept_brazilian_grouping() {
        assert_eq!(parse_amount("1.000.000"), Some(1_000_000.0));
        assert_eq!(parse_amount("1.500"), Some(1_500.0));
        assert_eq!(parse_amount("R$ 1.000.000,00"), Some(1_000_000.0));
        assert_eq!(parse_amount("2.500,75"), Some(2_500.75));
    }

    #[test]
    fn amounts_keep_plain_decimals() {
        assert_eq!(parse_amount("0.85"), Some(0.85));
        assert_eq!(parse_amount("1234.5"), Some(1234.5));
        assert_eq!(parse_amount("350000"), Some(350_000.0));
        assert_eq!(parse_amount("12.34.5"), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("  "), None);
    }
}
