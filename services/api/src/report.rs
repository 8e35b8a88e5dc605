use agro_potential::analysis::{PotentialAnalysis, PotentialAnalyzer};
use agro_potential::config::AppConfig;
use agro_potential::datasets::{
    DatasetProvider, DatasetStatistics, FileDatasetProvider, MunicipalityCode, MunicipalitySet,
};
use agro_potential::error::AppError;
use agro_potential::export::{write_report_dir, CommercialReport, ReportContext};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// IBGE municipality codes (repeat the flag or separate with commas)
    #[arg(long, value_delimiter = ',', required = true)]
    pub(crate) municipios: Vec<String>,
    /// Dataset directory (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Print the analysis as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// IBGE municipality codes (repeat the flag or separate with commas)
    #[arg(long, value_delimiter = ',', required = true)]
    pub(crate) municipios: Vec<String>,
    /// Directory receiving one CSV file per sheet
    #[arg(long)]
    pub(crate) output_dir: PathBuf,
    /// Name used in the report heading and file names
    #[arg(long, default_value = "selecao")]
    pub(crate) name: String,
    /// Dataset directory (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DatasetsArgs {
    /// Dataset directory (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let provider = open_provider(args.data_dir)?;
    let codes = selection(&args.municipios);
    let analysis = PotentialAnalyzer::default().analyze(&provider.catalog(), &codes);

    if args.json {
        match serde_json::to_string_pretty(&analysis) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Analysis payload unavailable: {err}"),
        }
    } else {
        render_potential(&analysis, codes.len());
    }
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let provider = open_provider(args.data_dir)?;
    let codes = selection(&args.municipios);

    let context = ReportContext {
        heading: "Seleção de Municípios".to_string(),
        name: args.name.clone(),
        profile: vec![("Nome".to_string(), args.name)],
        municipality_count: codes.len(),
        generated_at: Utc::now(),
    };
    let report = CommercialReport::from_snapshot(
        context,
        &provider.catalog(),
        &codes,
        &PotentialAnalyzer::default(),
    );

    let written = write_report_dir(&report, &args.output_dir)?;
    println!("Commercial report for {} municipalities", codes.len());
    for path in written {
        println!("- {}", path.display());
    }
    for warning in &report.analysis.warnings {
        println!("  Warning [{}]: {}", warning.source, warning.message);
    }
    Ok(())
}

pub(crate) fn run_datasets(args: DatasetsArgs) -> Result<(), AppError> {
    let provider = open_provider(args.data_dir)?;
    println!("Datasets in {}", provider.data_dir().display());
    render_statistics(&provider.catalog().statistics());
    Ok(())
}

fn open_provider(data_dir: Option<PathBuf>) -> Result<FileDatasetProvider, AppError> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => AppConfig::load()?.datasets.data_dir,
    };
    Ok(FileDatasetProvider::open(data_dir))
}

fn selection(raw: &[String]) -> MunicipalitySet {
    raw.iter()
        .map(|code| MunicipalityCode::from(code.as_str()))
        .filter(|code| !code.as_str().is_empty())
        .collect()
}

fn render_potential(analysis: &PotentialAnalysis, municipality_count: usize) {
    let matrix = &analysis.calculation_matrix;

    println!("Potential analysis for {municipality_count} municipalities");
    println!("- Final score: {:.1}/100", analysis.potential_score);
    println!(
        "- {} crops | {:.1} ha average productivity | estimated value {:.2}",
        analysis.crops_diversity, analysis.avg_productivity, analysis.total_value
    );
    println!(
        "- Usage: fertilizers {:.1}% | agrotoxicos {:.1}% | technical assistance {:.1}%",
        analysis.fertilizers_usage, analysis.agrotoxicos_usage, analysis.technical_assistance
    );

    println!("Calculation matrix:");
    let rows = [
        ("Diversidade", &matrix.diversity),
        ("Financeiro", &matrix.financial.component),
        ("Territorial", &matrix.territorial),
        ("Mercado", &matrix.market_activity.component),
        ("Bônus", &matrix.productivity_bonus),
    ];
    for (label, component) in rows {
        println!(
            "  - {label}: {:.1}/{:.0} ({})",
            component.score, component.max_points, component.description
        );
    }
    println!("  = {}", matrix.summary.description);

    println!("Recommendations:");
    for recommendation in &analysis.recommendations {
        println!("  - {recommendation}");
    }

    if analysis.degraded {
        println!("Degraded sources:");
        for warning in &analysis.warnings {
            println!("  - {}: {}", warning.source, warning.message);
        }
    }
}

fn render_statistics(statistics: &DatasetStatistics) {
    println!(
        "- {} crops across {} municipalities",
        statistics.total_crops, statistics.total_municipalities
    );
    println!(
        "- {} municipalities with fertilizer data | {:.0} establishments",
        statistics.total_fertilizer_municipalities, statistics.total_establishments
    );
    for entry in &statistics.datasets {
        let status = if entry.available { "" } else { " (unavailable)" };
        println!(
            "  - {}: {} categories{status}",
            entry.label, entry.categories
        );
    }
}
