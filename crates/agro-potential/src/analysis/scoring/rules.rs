use crate::format::currency;

use super::rubric::ScoringRubric;
use super::{
    ComponentPoints, FinancialComponent, MarketActivityComponent, MarketSignals, ScoreBreakdown,
    ScoreComponent, ScoreSummary, ScoringInputs,
};

pub(crate) fn score_inputs(inputs: &ScoringInputs, rubric: &ScoringRubric) -> ScoreBreakdown {
    let diversity = diversity_component(inputs.crop_diversity, rubric);
    let financial = financial_component(inputs.total_receita, inputs.total_despesa, rubric);
    let territorial = territorial_component(inputs.municipality_count, rubric);
    let market_activity = market_activity_component(&inputs.market, rubric);
    let productivity_bonus = productivity_component(inputs.avg_productivity, rubric);

    let breakdown = ComponentPoints {
        diversity: diversity.score,
        financial: financial.component.score,
        territorial: territorial.score,
        market_activity: market_activity.component.score,
    };
    let base_score = breakdown.diversity
        + breakdown.financial
        + breakdown.territorial
        + breakdown.market_activity;
    let final_score = (base_score + productivity_bonus.score)
        .min(rubric.score_cap)
        .max(0.0);

    let summary = ScoreSummary {
        base_score,
        productivity_bonus: productivity_bonus.score,
        final_score,
        breakdown,
        description: format!(
            "Diversidade {:.1} + Financeiro {:.1} + Territorial {:.1} + Mercado {:.1} + Bônus {:.1} = {:.1}/{:.0}",
            breakdown.diversity,
            breakdown.financial,
            breakdown.territorial,
            breakdown.market_activity,
            productivity_bonus.score,
            final_score,
            rubric.score_cap
        ),
    };

    ScoreBreakdown {
        diversity,
        financial,
        territorial,
        market_activity,
        productivity_bonus,
        summary,
    }
}

fn diversity_component(crop_diversity: usize, rubric: &ScoringRubric) -> ScoreComponent {
    let criterion = rubric.diversity;
    let raw_value = crop_diversity as f64;
    let normalized = criterion.normalize(raw_value);

    ScoreComponent {
        raw_value,
        normalized,
        weight: criterion.weight,
        max_points: criterion.max_points,
        score: criterion.points(normalized),
        description: format!("{crop_diversity} culturas diferentes encontradas"),
    }
}

fn financial_component(receita: f64, despesa: f64, rubric: &ScoringRubric) -> FinancialComponent {
    let criterion = rubric.financial;
    let saldo = receita - despesa;

    // A deficit contributes nothing; it is never subtracted from the total.
    let normalized = if receita > 0.0 || despesa > 0.0 {
        let ratio = saldo.max(0.0) / receita.max(1.0);
        criterion.normalize(ratio)
    } else {
        0.0
    };

    FinancialComponent {
        component: ScoreComponent {
            raw_value: saldo,
            normalized,
            weight: criterion.weight,
            max_points: criterion.max_points,
            score: criterion.points(normalized),
            description: format!(
                "Saldo: {} (Receita: {}, Despesa: {})",
                currency(saldo),
                currency(receita),
                currency(despesa)
            ),
        },
        receita,
        despesa,
    }
}

fn territorial_component(municipality_count: usize, rubric: &ScoringRubric) -> ScoreComponent {
    let criterion = rubric.territorial;
    let raw_value = municipality_count as f64;
    let normalized = criterion.normalize(raw_value);

    ScoreComponent {
        raw_value,
        normalized,
        weight: criterion.weight,
        max_points: criterion.max_points,
        score: criterion.points(normalized),
        description: format!("{municipality_count} municípios na área de atuação"),
    }
}

fn market_activity_component(
    signals: &MarketSignals,
    rubric: &ScoringRubric,
) -> MarketActivityComponent {
    let criterion = rubric.market_activity;
    let mix = rubric.market_mix;
    let scale = criterion.saturation;

    let subscores = MarketSignals {
        fertilizers: (signals.fertilizers / scale) * mix.fertilizers,
        consultoria: (signals.consultoria / scale) * mix.consultoria,
        agrotoxicos: (signals.agrotoxicos / scale) * mix.agrotoxicos,
    };
    let normalized = (subscores.fertilizers + subscores.consultoria + subscores.agrotoxicos)
        .clamp(0.0, 1.0);

    MarketActivityComponent {
        component: ScoreComponent {
            raw_value: normalized * scale,
            normalized,
            weight: criterion.weight,
            max_points: criterion.max_points,
            score: criterion.points(normalized),
            description: format!(
                "Fertilizantes: {:.1}%, Consultoria: {:.1}%, Agrotóxicos: {:.1}%",
                signals.fertilizers, signals.consultoria, signals.agrotoxicos
            ),
        },
        raw_values: *signals,
        subscores,
    }
}

fn productivity_component(avg_productivity: f64, rubric: &ScoringRubric) -> ScoreComponent {
    let criterion = rubric.productivity;
    let normalized = criterion.normalize(avg_productivity);

    ScoreComponent {
        raw_value: avg_productivity,
        normalized,
        weight: criterion.weight,
        max_points: criterion.max_points,
        score: criterion.points(normalized),
        description: format!("Produtividade média: {avg_productivity:.1} ha/município"),
    }
}
