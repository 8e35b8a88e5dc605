use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// IBGE municipality code. Datasets and territory records carry it either as
/// a JSON string or as an integer; both normalize to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MunicipalityCode(pub String);

impl MunicipalityCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MunicipalityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MunicipalityCode {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<String> for MunicipalityCode {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<u32> for MunicipalityCode {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for MunicipalityCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawCode {
            Text(String),
            Number(u64),
            // Spreadsheet exports write integer columns as `5300108.0`.
            Float(f64),
        }

        match RawCode::deserialize(deserializer)? {
            RawCode::Text(text) => Ok(Self::from(text)),
            RawCode::Number(number) => Ok(Self(number.to_string())),
            RawCode::Float(number)
                if number.is_finite() && number >= 0.0 && number.fract() == 0.0 =>
            {
                Ok(Self(format!("{number:.0}")))
            }
            RawCode::Float(number) => Err(serde::de::Error::custom(format!(
                "municipality code {number} is not a whole number"
            ))),
        }
    }
}

/// Deduplicated, ordered set of municipalities handed to every analysis.
pub type MunicipalitySet = BTreeSet<MunicipalityCode>;

pub fn municipality_set<I, C>(codes: I) -> MunicipalitySet
where
    I: IntoIterator<Item = C>,
    C: Into<MunicipalityCode>,
{
    codes.into_iter().map(Into::into).collect()
}

/// One municipality entry inside a dataset category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDatasetRecord")]
pub struct DatasetRecord {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
}

impl DatasetRecord {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            municipality_name: None,
            state_code: None,
        }
    }

    pub fn named(value: f64, municipality_name: &str, state_code: &str) -> Self {
        Self {
            value,
            municipality_name: Some(municipality_name.to_string()),
            state_code: Some(state_code.to_string()),
        }
    }
}

// Crop files store the measure as `harvested_area`; every other dataset uses `value`.
#[derive(Deserialize)]
struct RawDatasetRecord {
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    harvested_area: Option<f64>,
    #[serde(default)]
    municipality_name: Option<String>,
    #[serde(default)]
    state_code: Option<String>,
}

impl From<RawDatasetRecord> for DatasetRecord {
    fn from(raw: RawDatasetRecord) -> Self {
        Self {
            value: raw.value.or(raw.harvested_area).unwrap_or(0.0),
            municipality_name: raw.municipality_name,
            state_code: raw.state_code,
        }
    }
}

pub type CategoryValues = HashMap<MunicipalityCode, DatasetRecord>;

/// Category name → municipality → record. Categories iterate in name order so
/// floating-point sums come out identical between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryDataset {
    categories: BTreeMap<String, CategoryValues>,
}

impl CategoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        category: impl Into<String>,
        code: impl Into<MunicipalityCode>,
        record: DatasetRecord,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(code.into(), record);
    }

    pub fn with_value(
        mut self,
        category: &str,
        code: impl Into<MunicipalityCode>,
        value: f64,
    ) -> Self {
        self.insert(category, code, DatasetRecord::new(value));
        self
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &CategoryValues)> {
        self.categories
            .iter()
            .map(|(name, values)| (name.as_str(), values))
    }

    pub fn category(&self, name: &str) -> Option<&CategoryValues> {
        self.categories.get(name)
    }

    pub fn record(&self, category: &str, code: &MunicipalityCode) -> Option<&DatasetRecord> {
        self.categories.get(category)?.get(code)
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    pub fn municipalities(&self) -> BTreeSet<&MunicipalityCode> {
        self.categories
            .values()
            .flat_map(|values| values.keys())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// The static sources the portal reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Crops,
    Fertilizers,
    Agrotoxicos,
    Consultoria,
    Corretivos,
    Despesas,
    Receitas,
    Escolaridade,
}

impl DatasetKind {
    pub fn ordered() -> [DatasetKind; 8] {
        [
            Self::Crops,
            Self::Fertilizers,
            Self::Agrotoxicos,
            Self::Consultoria,
            Self::Corretivos,
            Self::Despesas,
            Self::Receitas,
            Self::Escolaridade,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Crops => "Culturas",
            Self::Fertilizers => "Fertilizantes",
            Self::Agrotoxicos => "Agrotóxicos",
            Self::Consultoria => "Consultoria Técnica",
            Self::Corretivos => "Corretivos",
            Self::Despesas => "Despesas",
            Self::Receitas => "Receitas",
            Self::Escolaridade => "Escolaridade",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Crops => "crops",
            Self::Fertilizers => "fertilizers",
            Self::Agrotoxicos => "agrotoxicos",
            Self::Consultoria => "consultoria",
            Self::Corretivos => "corretivos",
            Self::Despesas => "despesas",
            Self::Receitas => "receitas",
            Self::Escolaridade => "escolaridade",
        }
    }

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Crops => "crop_data_static.json",
            Self::Fertilizers => "fertilizer_data_static_corrigido.json",
            Self::Agrotoxicos => "agrotoxico_data_static.json",
            Self::Consultoria => "consultoria_tecnica_data_static.json",
            Self::Corretivos => "corretivos_data_static.json",
            Self::Despesas => "despesa_data_static.json",
            Self::Receitas => "receita_data_static.json",
            Self::Escolaridade => "escolaridade_data_static.json",
        }
    }

    /// Accepts the English key or the Portuguese route segment used by the web client.
    pub fn from_key(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "crops" | "culturas" | "crop" => Some(Self::Crops),
            "fertilizers" | "fertilizantes" | "fertilizer" => Some(Self::Fertilizers),
            "agrotoxicos" | "agrotoxico" => Some(Self::Agrotoxicos),
            "consultoria" | "consultoria_tecnica" => Some(Self::Consultoria),
            "corretivos" => Some(Self::Corretivos),
            "despesas" | "despesa" => Some(Self::Despesas),
            "receitas" | "receita" => Some(Self::Receitas),
            "escolaridade" => Some(Self::Escolaridade),
            _ => None,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
