use std::cmp::Ordering;

use crate::analysis::scoring::ScoreComponent;
use crate::analysis::CategoryRanking;
use crate::datasets::DatasetKind;
use crate::format::grouped;

use super::{CommercialReport, CommercialSheet};

type Row = Vec<String>;

pub(super) fn rows(report: &CommercialReport, sheet: CommercialSheet) -> Vec<Row> {
    let analysis = &report.analysis;
    match sheet {
        CommercialSheet::Resumo => summary(report),
        CommercialSheet::Financeiro => financial(report),
        CommercialSheet::Culturas => crops(report),
        CommercialSheet::Fertilizantes => {
            ranking(&analysis.fertilizer_data, DatasetKind::Fertilizers)
        }
        CommercialSheet::Agrotoxicos => {
            ranking(&analysis.agrotoxico_data, DatasetKind::Agrotoxicos)
        }
        CommercialSheet::Consultoria => {
            ranking(&analysis.consultoria_data, DatasetKind::Consultoria)
        }
        CommercialSheet::Corretivos => ranking(&analysis.corretivos_data, DatasetKind::Corretivos),
        CommercialSheet::Escolaridade => {
            ranking(&analysis.escolaridade_data, DatasetKind::Escolaridade)
        }
        CommercialSheet::Municipios => municipalities(report),
        CommercialSheet::Matriz => matrix(report),
    }
}

fn row<const N: usize>(cells: [&str; N]) -> Row {
    cells.iter().map(|cell| cell.to_string()).collect()
}

fn pair(label: &str, value: impl ToString) -> Row {
    vec![label.to_string(), value.to_string()]
}

fn decimal(value: f64) -> String {
    format!("{value:.2}")
}

fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

fn summary(report: &CommercialReport) -> Vec<Row> {
    let context = &report.context;
    let analysis = &report.analysis;
    let financial = &analysis.financial_data;
    let crop_area: f64 = analysis
        .crops_data
        .crops
        .iter()
        .map(|crop| crop.total_area)
        .sum();

    let mut rows = vec![row(["Item", "Valor"]), pair(&context.heading, "")];
    rows.extend(
        context
            .profile
            .iter()
            .map(|(label, value)| pair(label, value)),
    );
    rows.extend([
        pair("Total de Municípios", context.municipality_count),
        pair(
            "Data da Análise",
            context.generated_at.format("%d/%m/%Y %H:%M:%S"),
        ),
        pair("", ""),
        pair("Resumo Financeiro", ""),
        pair("Total Receita (R$)", grouped(financial.total_receita, 2)),
        pair("Total Despesa (R$)", grouped(financial.total_despesa, 2)),
        pair("Saldo (R$)", grouped(financial.saldo, 2)),
        pair("", ""),
        pair("Resumo Agrícola", ""),
        pair("Total de Culturas", analysis.crops_data.crops.len()),
        pair("Área Total Cultivada (ha)", grouped(crop_area, 2)),
        pair("", ""),
        pair("Resumo de Insumos", ""),
        pair(
            "Categorias de Fertilizantes",
            analysis.fertilizer_data.categories.len(),
        ),
        pair(
            "Categorias de Agrotóxicos",
            analysis.agrotoxico_data.categories.len(),
        ),
        pair(
            "Categorias de Consultoria",
            analysis.consultoria_data.categories.len(),
        ),
        pair(
            "Categorias de Corretivos",
            analysis.corretivos_data.categories.len(),
        ),
        pair(
            "Categorias de Escolaridade",
            analysis.escolaridade_data.categories.len(),
        ),
        pair("", ""),
        pair("Potencial", ""),
        pair(
            "Pontuação Final",
            format!("{:.1}", report.matrix.final_score()),
        ),
    ]);
    for warning in &analysis.warnings {
        rows.push(pair(
            &format!("Aviso ({})", warning.source),
            &warning.message,
        ));
    }
    rows
}

fn financial(report: &CommercialReport) -> Vec<Row> {
    let mut municipios: Vec<_> = report.analysis.financial_data.municipios.iter().collect();
    municipios.sort_by(|left, right| {
        right
            .saldo
            .partial_cmp(&left.saldo)
            .unwrap_or(Ordering::Equal)
    });

    let mut rows = vec![row([
        "Código IBGE",
        "Município",
        "UF",
        "Receita (R$)",
        "Despesa (R$)",
        "Saldo (R$)",
        "Margem (%)",
    ])];
    rows.extend(municipios.into_iter().map(|municipio| {
        let margin = if municipio.receita > 0.0 {
            municipio.saldo / municipio.receita.max(1.0) * 100.0
        } else {
            0.0
        };
        vec![
            municipio.code.to_string(),
            municipio.name.clone(),
            municipio.state.clone(),
            decimal(municipio.receita),
            decimal(municipio.despesa),
            decimal(municipio.saldo),
            decimal(margin),
        ]
    }));
    rows
}

fn crops(report: &CommercialReport) -> Vec<Row> {
    let crops = &report.analysis.crops_data.crops;
    let total_area: f64 = crops.iter().map(|crop| crop.total_area).sum();

    let mut rows = vec![row([
        "Cultura",
        "Área Total (ha)",
        "Nº Municípios",
        "Área Média por Município (ha)",
        "Participação (%)",
        "Ranking",
    ])];
    rows.extend(crops.iter().enumerate().map(|(index, crop)| {
        vec![
            crop.name.clone(),
            decimal(crop.total_area),
            crop.municipalities_count.to_string(),
            decimal(crop.total_area / crop.municipalities_count.max(1) as f64),
            decimal(share(crop.total_area, total_area)),
            (index + 1).to_string(),
        ]
    }));
    rows
}

fn ranking(data: &CategoryRanking, kind: DatasetKind) -> Vec<Row> {
    let total_label = match kind {
        DatasetKind::Escolaridade => "Total Pessoas",
        _ => "Total Estabelecimentos",
    };
    let grand_total = data.grand_total();

    let mut rows = vec![row(["Categoria", total_label, "Participação (%)", "Ranking"])];
    rows.extend(data.categories.iter().enumerate().map(|(index, category)| {
        vec![
            category.name.clone(),
            decimal(category.total),
            decimal(share(category.total, grand_total)),
            (index + 1).to_string(),
        ]
    }));
    rows
}

fn municipalities(report: &CommercialReport) -> Vec<Row> {
    let mut rows = vec![row(["Código IBGE", "Nome do Município", "UF"])];
    rows.extend(report.analysis.municipios_data.iter().map(|label| {
        vec![
            label.code.to_string(),
            label.name.clone(),
            label.state.clone(),
        ]
    }));
    rows
}

fn matrix(report: &CommercialReport) -> Vec<Row> {
    let matrix = &report.matrix;
    let component_row = |name: &str, component: &ScoreComponent| {
        vec![
            name.to_string(),
            decimal(component.raw_value),
            format!("{:.4}", component.normalized),
            decimal(component.weight),
            decimal(component.max_points),
            decimal(component.score),
            component.description.clone(),
        ]
    };

    vec![
        row([
            "Componente",
            "Valor Bruto",
            "Normalizado",
            "Peso",
            "Pontos Máximos",
            "Pontuação",
            "Descrição",
        ]),
        component_row("Diversidade", &matrix.diversity),
        component_row("Financeiro", &matrix.financial.component),
        component_row("Territorial", &matrix.territorial),
        component_row("Atividade de Mercado", &matrix.market_activity.component),
        component_row("Bônus de Produtividade", &matrix.productivity_bonus),
        vec![
            "Total".to_string(),
            String::new(),
            String::new(),
            String::new(),
            decimal(100.0),
            decimal(matrix.final_score()),
            matrix.summary.description.clone(),
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{
        commercial_analysis, compute_potential_score, MunicipalityFinance,
    };
    use crate::datasets::{municipality_set, CategoryDataset, DatasetCatalog, DatasetRecord};
    use crate::export::ReportContext;
    use chrono::TimeZone;

    fn report() -> CommercialReport {
        let codes = municipality_set(["5107925", "5103403"]);
        let mut crops = CategoryDataset::new();
        crops.insert("Soja", "5107925", DatasetRecord::named(300.0, "Sorriso", "MT"));
        crops.insert("Soja", "5103403", DatasetRecord::named(100.0, "Cuiabá", "MT"));
        crops.insert("Milho", "5107925", DatasetRecord::new(100.0));
        let catalog = DatasetCatalog::new()
            .with_dataset(DatasetKind::Crops, crops)
            .with_dataset(
                DatasetKind::Escolaridade,
                CategoryDataset::new()
                    .with_value("Fundamental", "5107925", 30.0)
                    .with_value("Superior", "5103403", 10.0),
            );

        let mut analysis = commercial_analysis(&catalog, &codes);
        analysis.financial_data.municipios = vec![
            MunicipalityFinance {
                code: "5103403".into(),
                name: "Cuiabá".to_string(),
                state: "MT".to_string(),
                receita: 0.0,
                despesa: 50.0,
                saldo: -50.0,
            },
            MunicipalityFinance {
                code: "5107925".into(),
                name: "Sorriso".to_string(),
                state: "MT".to_string(),
                receita: 200.0,
                despesa: 150.0,
                saldo: 50.0,
            },
        ];

        CommercialReport {
            context: ReportContext {
                heading: "Informações da Revenda".to_string(),
                name: "Agro Sul/MT".to_string(),
                profile: vec![("Nome".to_string(), "Agro Sul/MT".to_string())],
                municipality_count: codes.len(),
                generated_at: chrono::Utc
                    .with_ymd_and_hms(2025, 3, 1, 14, 30, 0)
                    .single()
                    .expect("valid timestamp"),
            },
            matrix: compute_potential_score(&catalog, &codes),
            analysis,
        }
    }

    #[test]
    fn financial_sheet_sorts_by_balance_and_guards_margin() {
        let rows = rows(&report(), CommercialSheet::Financeiro);
        assert_eq!(rows[1][1], "Sorriso");
        assert_eq!(rows[1][6], "25.00");
        assert_eq!(rows[2][1], "Cuiabá");
        assert_eq!(rows[2][6], "0.00");
    }

    #[test]
    fn crop_sheet_reports_share_and_ranking() {
        let rows = rows(&report(), CommercialSheet::Culturas);
        assert_eq!(rows[1], vec!["Soja", "400.00", "2", "200.00", "80.00", "1"]);
        assert_eq!(rows[2], vec!["Milho", "100.00", "1", "100.00", "20.00", "2"]);
    }

    #[test]
    fn escolaridade_sheet_counts_people() {
        let rows = rows(&report(), CommercialSheet::Escolaridade);
        assert_eq!(rows[0][1], "Total Pessoas");
        assert_eq!(rows[1], vec!["Fundamental", "30.00", "75.00", "1"]);
    }

    #[test]
    fn summary_sheet_stamps_analysis_date() {
        let rows = rows(&report(), CommercialSheet::Resumo);
        assert!(rows.contains(&vec![
            "Data da Análise".to_string(),
            "01/03/2025 14:30:00".to_string()
        ]));
        assert!(rows.iter().all(|row| row.len() == 2));
    }

    #[test]
    fn matrix_sheet_lists_every_component() {
        let rows = rows(&report(), CommercialSheet::Matriz);
        assert_eq!(rows.len(), 7);
        assert!(rows.iter().all(|row| row.len() == 7));
        assert_eq!(rows[6][0], "Total");
    }
}
