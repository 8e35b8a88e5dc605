use crate::format::currency;

use super::scoring::ScoreBreakdown;

const FALLBACK: &str = "Continue monitorando os dados para identificar oportunidades";

/// Turns a calculation matrix into ordered findings: one line per dimension
/// that crossed a threshold (or the fallback when none did), then the overall
/// tier, then the weakest dimension.
pub fn generate_recommendations(matrix: &ScoreBreakdown) -> Vec<String> {
    let mut recommendations = Vec::new();

    let diversity = &matrix.diversity;
    if diversity.score < 10.0 {
        recommendations.push(format!(
            "⚠️ Baixa diversidade ({:.0} culturas) - diversifique para reduzir riscos e aumentar {:.1} pontos",
            diversity.raw_value,
            diversity.max_points - diversity.score
        ));
    } else if diversity.score > 25.0 {
        recommendations.push(format!(
            "✅ Excelente diversidade ({:.0} culturas) - mantenha essa estratégia",
            diversity.raw_value
        ));
    }

    let financial = &matrix.financial.component;
    let saldo = financial.raw_value;
    if financial.score < 10.0 {
        if saldo < 0.0 {
            recommendations.push(format!(
                "⚠️ Saldo financeiro negativo ({}) - foque em eficiência e redução de custos",
                currency(saldo)
            ));
        } else {
            recommendations.push(format!(
                "⚠️ Baixa performance financeira - oportunidade de crescimento de até {:.1} pontos",
                financial.max_points - financial.score
            ));
        }
    } else if financial.score > 20.0 {
        recommendations.push(format!(
            "✅ Boa saúde financeira (saldo: {}) - mantenha o equilíbrio",
            currency(saldo)
        ));
    }

    let territorial = &matrix.territorial;
    if territorial.score < 8.0 {
        recommendations.push(format!(
            "📍 Abrangência limitada ({:.0} municípios) - considere expansão territorial para ganhar {:.1} pontos",
            territorial.raw_value,
            territorial.max_points - territorial.score
        ));
    } else if territorial.score > 15.0 {
        recommendations.push(format!(
            "✅ Boa cobertura territorial ({:.0} municípios) - aproveite a escala",
            territorial.raw_value
        ));
    }

    let market = &matrix.market_activity;
    if market.component.score < 10.0 {
        let mut weak_areas = Vec::new();
        if market.raw_values.fertilizers < 30.0 {
            weak_areas.push("fertilizantes");
        }
        if market.raw_values.consultoria < 25.0 {
            weak_areas.push("consultoria técnica");
        }
        if market.raw_values.agrotoxicos < 20.0 {
            weak_areas.push("agrotóxicos");
        }
        if !weak_areas.is_empty() {
            recommendations.push(format!(
                "📈 Baixa atividade de mercado em: {} - oportunidade de {:.1} pontos",
                weak_areas.join(", "),
                market.component.max_points - market.component.score
            ));
        }
    } else if market.component.score > 20.0 {
        recommendations
            .push("✅ Alto nível de atividade de mercado - mercado maduro e ativo".to_string());
    }

    let bonus = &matrix.productivity_bonus;
    if bonus.score < 2.0 {
        recommendations.push(format!(
            "⚡ Produtividade média baixa ({:.1} ha/município) - potencial de melhoria",
            bonus.raw_value
        ));
    } else if bonus.score > 4.0 {
        recommendations.push(format!(
            "✅ Alta produtividade média ({:.1} ha/município) - região muito produtiva",
            bonus.raw_value
        ));
    }

    if recommendations.is_empty() {
        recommendations.push(FALLBACK.to_string());
    }

    recommendations.push(tier_message(matrix.final_score()).to_string());

    let (dimension, points) = matrix.weakest_dimension();
    recommendations.push(format!(
        "🔍 PRIORIDADE: Melhorar {} ({points:.1} pts)",
        dimension.label()
    ));
    recommendations
}

fn tier_message(final_score: f64) -> &'static str {
    if final_score >= 80.0 {
        "🎯 EXCELENTE: Região prioritária para investimento e expansão"
    } else if final_score >= 60.0 {
        "👍 BOM: Região promissora com oportunidades sólidas"
    } else if final_score >= 40.0 {
        "⚖️ MÉDIO: Região com potencial, requer estratégia focada"
    } else {
        "⚠️ BAIXO: Região desafiadora, considere estratégias alternativas"
    }
}
