//! CSV rendering of the commercial report, one sheet per file.

mod sheets;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::analysis::{commercial_analysis, CommercialAnalysis, PotentialAnalyzer, ScoreBreakdown};
use crate::datasets::{DatasetCatalog, MunicipalitySet};

/// Who the report is about and when it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub heading: String,
    pub name: String,
    pub profile: Vec<(String, String)>,
    pub municipality_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl ReportContext {
    /// `analise_comercial_<name>_<timestamp>` with path separators and spaces
    /// replaced.
    pub fn file_stem(&self) -> String {
        let safe_name: String = self
            .name
            .chars()
            .map(|c| if matches!(c, ' ' | '/' | '\\') { '_' } else { c })
            .collect();
        format!(
            "analise_comercial_{safe_name}_{}",
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }
}

/// Everything one export needs, computed from a single dataset snapshot.
#[derive(Debug, Clone)]
pub struct CommercialReport {
    pub context: ReportContext,
    pub analysis: CommercialAnalysis,
    pub matrix: ScoreBreakdown,
}

impl CommercialReport {
    /// Runs the commercial breakdown and the score matrix against one snapshot.
    pub fn from_snapshot(
        context: ReportContext,
        catalog: &DatasetCatalog,
        codes: &MunicipalitySet,
        analyzer: &PotentialAnalyzer,
    ) -> Self {
        Self {
            context,
            analysis: commercial_analysis(catalog, codes),
            matrix: analyzer.analyze(catalog, codes).calculation_matrix,
        }
    }

    pub fn file_name(&self, sheet: CommercialSheet) -> String {
        format!("{}_{}.csv", self.context.file_stem(), sheet.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommercialSheet {
    Resumo,
    Financeiro,
    Culturas,
    Fertilizantes,
    Agrotoxicos,
    Consultoria,
    Corretivos,
    Escolaridade,
    Municipios,
    Matriz,
}

impl CommercialSheet {
    pub const ALL: [CommercialSheet; 10] = [
        Self::Resumo,
        Self::Financeiro,
        Self::Culturas,
        Self::Fertilizantes,
        Self::Agrotoxicos,
        Self::Consultoria,
        Self::Corretivos,
        Self::Escolaridade,
        Self::Municipios,
        Self::Matriz,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Resumo => "resumo",
            Self::Financeiro => "financeiro",
            Self::Culturas => "culturas",
            Self::Fertilizantes => "fertilizantes",
            Self::Agrotoxicos => "agrotoxicos",
            Self::Consultoria => "consultoria",
            Self::Corretivos => "corretivos",
            Self::Escolaridade => "escolaridade",
            Self::Municipios => "municipios",
            Self::Matriz => "matriz",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Resumo => "Resumo Geral",
            Self::Financeiro => "Análise Financeira",
            Self::Culturas => "Culturas Detalhado",
            Self::Fertilizantes => "Fertilizantes",
            Self::Agrotoxicos => "Agrotóxicos",
            Self::Consultoria => "Consultoria Técnica",
            Self::Corretivos => "Corretivos",
            Self::Escolaridade => "Escolaridade",
            Self::Municipios => "Municípios",
            Self::Matriz => "Matriz de Cálculo",
        }
    }
}

impl fmt::Display for CommercialSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CommercialSheet {
    type Err = ExportError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|sheet| sheet.key() == wanted)
            .ok_or_else(|| ExportError::UnknownSheet(raw.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("unknown sheet '{0}'")]
    UnknownSheet(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to write {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("sheet is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub fn write_sheet<W: io::Write>(
    report: &CommercialReport,
    sheet: CommercialSheet,
    out: W,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);
    for row in sheets::rows(report, sheet) {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn render_sheet(
    report: &CommercialReport,
    sheet: CommercialSheet,
) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_sheet(report, sheet, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Writes every sheet into `dir`, returning the created paths in sheet order.
pub fn write_report_dir(
    report: &CommercialReport,
    dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::File {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(CommercialSheet::ALL.len());
    for sheet in CommercialSheet::ALL {
        let path = dir.join(report.file_name(sheet));
        let file = fs::File::create(&path).map_err(|source| ExportError::File {
            path: path.clone(),
            source,
        })?;
        write_sheet(report, sheet, io::BufWriter::new(file))?;
        written.push(path);
    }

    info!(
        dir = %dir.display(),
        sheets = written.len(),
        territory = %report.context.name,
        "commercial report exported"
    );
    Ok(written)
}
