use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::datasets::{MunicipalityCode, MunicipalitySet};

pub const DEFAULT_REVENDA_COLOR: &str = "#4CAF50";
pub const DEFAULT_VENDEDOR_COLOR: &str = "#2196F3";

/// Identifier shared by revendas and vendedores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerritoryId(pub u64);

impl TerritoryId {
    /// Id carried by a validated payload until the service assigns a real one.
    pub(crate) const PENDING: TerritoryId = TerritoryId(0);
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered agri-retailer and the municipalities it serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenda {
    pub id: TerritoryId,
    pub nome: String,
    pub cnpj: String,
    pub cnae: String,
    pub cor: String,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub responsavel: Option<String>,
    pub municipios: Vec<MunicipalityCode>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sales representative and the municipalities assigned to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendedor {
    pub id: TerritoryId,
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub cpf: String,
    pub endereco: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub municipios: Vec<MunicipalityCode>,
    pub cor: String,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRevenda {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub cnpj: String,
    #[serde(default)]
    pub cnae: String,
    #[serde(default)]
    pub cor: Option<String>,
    #[serde(default)]
    pub endereco: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub responsavel: Option<String>,
    #[serde(default, alias = "municipios_codigos")]
    pub municipios: Vec<MunicipalityCode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevendaUpdate {
    pub nome: Option<String>,
    pub cnpj: Option<String>,
    pub cnae: Option<String>,
    pub cor: Option<String>,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub responsavel: Option<String>,
    #[serde(alias = "municipios_codigos")]
    pub municipios: Option<Vec<MunicipalityCode>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVendedor {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub endereco: Option<String>,
    #[serde(default)]
    pub data_nascimento: Option<NaiveDate>,
    #[serde(default)]
    pub cor: Option<String>,
    #[serde(default, alias = "municipios_codigos")]
    pub municipios: Vec<MunicipalityCode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendedorUpdate {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cpf: Option<String>,
    pub endereco: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub cor: Option<String>,
    #[serde(alias = "municipios_codigos")]
    pub municipios: Option<Vec<MunicipalityCode>>,
}

/// Rejected create or update payload. Messages are shown to end users as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Nome da revenda é obrigatório")]
    MissingRevendaName,
    #[error("CNPJ é obrigatório")]
    MissingCnpj,
    #[error("CNAE é obrigatório")]
    MissingCnae,
    #[error("Nome do vendedor é obrigatório")]
    MissingVendedorName,
    #[error("E-mail é obrigatório")]
    MissingEmail,
    #[error("Telefone é obrigatório")]
    MissingTelefone,
    #[error("CPF é obrigatório")]
    MissingCpf,
    #[error("Pelo menos um município deve ser selecionado")]
    NoMunicipalities,
}

/// Which registry a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryKind {
    Revenda,
    Vendedor,
}

impl TerritoryKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Revenda => "Revenda",
            Self::Vendedor => "Vendedor",
        }
    }

    pub const fn report_heading(self) -> &'static str {
        match self {
            Self::Revenda => "Informações da Revenda",
            Self::Vendedor => "Informações do Vendedor",
        }
    }
}

/// Common view over revendas and vendedores used by the store and analyses.
pub trait Territory: Clone + Send + Sync + 'static {
    const KIND: TerritoryKind;

    fn id(&self) -> TerritoryId;
    fn nome(&self) -> &str;
    fn municipios(&self) -> &[MunicipalityCode];
    fn is_active(&self) -> bool;

    /// Key that must stay unique among active records, with its display name.
    fn unique_keys(&self) -> Vec<(&'static str, &str)>;

    /// Label/value pairs describing the record in exported reports.
    fn profile(&self) -> Vec<(&'static str, String)>;

    fn municipality_set(&self) -> MunicipalitySet {
        self.municipios().iter().cloned().collect()
    }
}

impl Territory for Revenda {
    const KIND: TerritoryKind = TerritoryKind::Revenda;

    fn id(&self) -> TerritoryId {
        self.id
    }

    fn nome(&self) -> &str {
        &self.nome
    }

    fn municipios(&self) -> &[MunicipalityCode] {
        &self.municipios
    }

    fn is_active(&self) -> bool {
        self.ativo
    }

    fn unique_keys(&self) -> Vec<(&'static str, &str)> {
        vec![("CNPJ", self.cnpj.as_str())]
    }

    fn profile(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Nome", self.nome.clone()),
            ("CNPJ", self.cnpj.clone()),
            ("CNAE", self.cnae.clone()),
            ("Cor", self.cor.clone()),
        ]
    }
}

impl Territory for Vendedor {
    const KIND: TerritoryKind = TerritoryKind::Vendedor;

    fn id(&self) -> TerritoryId {
        self.id
    }

    fn nome(&self) -> &str {
        &self.nome
    }

    fn municipios(&self) -> &[MunicipalityCode] {
        &self.municipios
    }

    fn is_active(&self) -> bool {
        self.ativo
    }

    fn unique_keys(&self) -> Vec<(&'static str, &str)> {
        vec![("E-mail", self.email.as_str()), ("CPF", self.cpf.as_str())]
    }

    fn profile(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Nome", self.nome.clone()),
            ("E-mail", self.email.clone()),
            ("Telefone", self.telefone.clone()),
            ("CPF", self.cpf.clone()),
            ("Cor", self.cor.clone()),
        ]
    }
}

/// List view adding the municipality count the web client shows.
#[derive(Debug, Clone, Serialize)]
pub struct TerritoryView<T> {
    #[serde(flatten)]
    pub record: T,
    pub municipios_count: usize,
}

impl<T: Territory> From<T> for TerritoryView<T> {
    fn from(record: T) -> Self {
        let municipios_count = record.municipios().len();
        Self {
            record,
            municipios_count,
        }
    }
}

pub(crate) fn required(value: &str, error: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(error)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Drops blank and repeated codes, keeping the caller's order.
pub(crate) fn normalize_municipios(
    codes: Vec<MunicipalityCode>,
) -> Result<Vec<MunicipalityCode>, ValidationError> {
    let mut seen = MunicipalitySet::new();
    let normalized: Vec<MunicipalityCode> = codes
        .into_iter()
        .map(|code| MunicipalityCode::from(code.0))
        .filter(|code| !code.as_str().is_empty() && seen.insert(code.clone()))
        .collect();

    if normalized.is_empty() {
        Err(ValidationError::NoMunicipalities)
    } else {
        Ok(normalized)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl NewRevenda {
    pub(crate) fn validate(
        self,
        id: TerritoryId,
        now: DateTime<Utc>,
    ) -> Result<Revenda, ValidationError> {
        let nome = required(&self.nome, ValidationError::MissingRevendaName)?;
        let cnpj = required(&self.cnpj, ValidationError::MissingCnpj)?;
        let cnae = required(&self.cnae, ValidationError::MissingCnae)?;
        let municipios = normalize_municipios(self.municipios)?;

        Ok(Revenda {
            id,
            nome,
            cnpj,
            cnae,
            cor: non_blank(self.cor).unwrap_or_else(|| DEFAULT_REVENDA_COLOR.to_string()),
            endereco: non_blank(self.endereco),
            telefone: non_blank(self.telefone),
            email: non_blank(self.email),
            responsavel: non_blank(self.responsavel),
            municipios,
            ativo: true,
            created_at: now,
            updated_at: now,
        })
    }
}

impl RevendaUpdate {
    pub(crate) fn apply(
        self,
        revenda: &mut Revenda,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if let Some(nome) = self.nome {
            revenda.nome = required(&nome, ValidationError::MissingRevendaName)?;
        }
        if let Some(cnpj) = self.cnpj {
            revenda.cnpj = required(&cnpj, ValidationError::MissingCnpj)?;
        }
        if let Some(cnae) = self.cnae {
            revenda.cnae = required(&cnae, ValidationError::MissingCnae)?;
        }
        if let Some(municipios) = self.municipios {
            revenda.municipios = normalize_municipios(municipios)?;
        }
        if let Some(cor) = non_blank(self.cor) {
            revenda.cor = cor;
        }
        if self.endereco.is_some() {
            revenda.endereco = non_blank(self.endereco);
        }
        if self.telefone.is_some() {
            revenda.telefone = non_blank(self.telefone);
        }
        if self.email.is_some() {
            revenda.email = non_blank(self.email);
        }
        if self.responsavel.is_some() {
            revenda.responsavel = non_blank(self.responsavel);
        }
        revenda.updated_at = now;
        Ok(())
    }
}

impl NewVendedor {
    pub(crate) fn validate(
        self,
        id: TerritoryId,
        now: DateTime<Utc>,
    ) -> Result<Vendedor, ValidationError> {
        let nome = required(&self.nome, ValidationError::MissingVendedorName)?;
        let email = required(&self.email, ValidationError::MissingEmail)?;
        let telefone = required(&self.telefone, ValidationError::MissingTelefone)?;
        let cpf = required(&self.cpf, ValidationError::MissingCpf)?;
        let municipios = normalize_municipios(self.municipios)?;

        Ok(Vendedor {
            id,
            nome,
            email,
            telefone,
            cpf,
            endereco: non_blank(self.endereco),
            data_nascimento: self.data_nascimento,
            municipios,
            cor: non_blank(self.cor).unwrap_or_else(|| DEFAULT_VENDEDOR_COLOR.to_string()),
            ativo: true,
            created_at: now,
            updated_at: now,
        })
    }
}

impl VendedorUpdate {
    pub(crate) fn apply(
        self,
        vendedor: &mut Vendedor,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if let Some(nome) = self.nome {
            vendedor.nome = required(&nome, ValidationError::MissingVendedorName)?;
        }
        if let Some(email) = self.email {
            vendedor.email = required(&email, ValidationError::MissingEmail)?;
        }
        if let Some(telefone) = self.telefone {
            vendedor.telefone = required(&telefone, ValidationError::MissingTelefone)?;
        }
        if let Some(cpf) = self.cpf {
            vendedor.cpf = required(&cpf, ValidationError::MissingCpf)?;
        }
        if let Some(municipios) = self.municipios {
            vendedor.municipios = normalize_municipios(municipios)?;
        }
        if let Some(cor) = non_blank(self.cor) {
            vendedor.cor = cor;
        }
        if self.endereco.is_some() {
            vendedor.endereco = non_blank(self.endereco);
        }
        if self.data_nascimento.is_some() {
            vendedor.data_nascimento = self.data_nascimento;
        }
        vendedor.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn revenda_requires_fields_in_order() {
        let missing_all = NewRevenda::default();
        assert_eq!(
            missing_all.validate(TerritoryId(1), now()).unwrap_err(),
            ValidationError::MissingRevendaName
        );

        let missing_codes = NewRevenda {
            nome: "Agro Sul".to_string(),
            cnpj: "12.345.678/0001-90".to_string(),
            cnae: "4683-4/00".to_string(),
            municipios: vec![MunicipalityCode::from("  ")],
            ..NewRevenda::default()
        };
        assert_eq!(
            missing_codes.validate(TerritoryId(1), now()).unwrap_err().to_string(),
            "Pelo menos um município deve ser selecionado"
        );
    }

    #[test]
    fn revenda_defaults_color_and_dedupes_codes() {
        let payload: NewRevenda = serde_json::from_str(
            r#"{"nome": " Agro Sul ", "cnpj": "1", "cnae": "2",
                "municipios_codigos": [5107925, "5107925", "5103403"]}"#,
        )
        .expect("payload parses");
        let revenda = payload.validate(TerritoryId(7), now()).expect("valid revenda");

        assert_eq!(revenda.nome, "Agro Sul");
        assert_eq!(revenda.cor, DEFAULT_REVENDA_COLOR);
        assert_eq!(revenda.municipios.len(), 2);
        assert!(revenda.ativo);
    }

    #[test]
    fn update_touches_only_supplied_fields() {
        let mut vendedor = NewVendedor {
            nome: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            telefone: "65 99999-0000".to_string(),
            cpf: "000.000.000-00".to_string(),
            endereco: Some("Rua A".to_string()),
            municipios: vec![MunicipalityCode::from("5107925")],
            ..NewVendedor::default()
        }
        .validate(TerritoryId(3), now())
        .expect("valid vendedor");

        let later = now() + chrono::Duration::hours(1);
        VendedorUpdate {
            telefone: Some("65 98888-1111".to_string()),
            ..VendedorUpdate::default()
        }
        .apply(&mut vendedor, later)
        .expect("update applies");

        assert_eq!(vendedor.telefone, "65 98888-1111");
        assert_eq!(vendedor.endereco.as_deref(), Some("Rua A"));
        assert_eq!(vendedor.cor, DEFAULT_VENDEDOR_COLOR);
        assert_eq!(vendedor.updated_at, later);
        assert_eq!(vendedor.created_at, now());
    }

    #[test]
    fn update_rejects_blank_required_field() {
        let mut revenda = NewRevenda {
            nome: "Agro Sul".to_string(),
            cnpj: "1".to_string(),
            cnae: "2".to_string(),
            municipios: vec![MunicipalityCode::from("5107925")],
            ..NewRevenda::default()
        }
        .validate(TerritoryId(1), now())
        .expect("valid revenda");

        let error = RevendaUpdate {
            cnae: Some(" ".to_string()),
            ..RevendaUpdate::default()
        }
        .apply(&mut revenda, now())
        .unwrap_err();
        assert_eq!(error, ValidationError::MissingCnae);
        assert_eq!(revenda.cnae, "2");
    }
}
