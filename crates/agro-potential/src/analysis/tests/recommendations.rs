use crate::analysis::{
    generate_recommendations, MarketSignals, PotentialScoringEngine, ScoringInputs,
};

fn recommend(inputs: ScoringInputs) -> Vec<String> {
    let matrix = PotentialScoringEngine::default().score(&inputs);
    generate_recommendations(&matrix)
}

#[test]
fn empty_territory_flags_every_dimension() {
    let recommendations = recommend(ScoringInputs::default());

    assert_eq!(
        recommendations,
        vec![
            "⚠️ Baixa diversidade (0 culturas) - diversifique para reduzir riscos e aumentar 30.0 pontos",
            "⚠️ Baixa performance financeira - oportunidade de crescimento de até 25.0 pontos",
            "📍 Abrangência limitada (0 municípios) - considere expansão territorial para ganhar 20.0 pontos",
            "📈 Baixa atividade de mercado em: fertilizantes, consultoria técnica, agrotóxicos - oportunidade de 25.0 pontos",
            "⚡ Produtividade média baixa (0.0 ha/município) - potencial de melhoria",
            "⚠️ BAIXO: Região desafiadora, considere estratégias alternativas",
            "🔍 PRIORIDADE: Melhorar diversidade de culturas (0.0 pts)",
        ]
    );
}

#[test]
fn negative_balance_gets_cost_warning() {
    let recommendations = recommend(ScoringInputs {
        total_receita: 1000.0,
        total_despesa: 1500.0,
        ..ScoringInputs::default()
    });

    assert!(recommendations.contains(
        &"⚠️ Saldo financeiro negativo (R$ -500.00) - foque em eficiência e redução de custos"
            .to_string()
    ));
}

#[test]
fn low_market_without_weak_signal_stays_silent() {
    let recommendations = recommend(ScoringInputs {
        market: MarketSignals {
            fertilizers: 30.0,
            consultoria: 25.0,
            agrotoxicos: 20.0,
        },
        ..ScoringInputs::default()
    });

    assert!(recommendations
        .iter()
        .all(|line| !line.contains("atividade de mercado em")));
}

#[test]
fn saturated_territory_is_praised() {
    let recommendations = recommend(ScoringInputs {
        municipality_count: 50,
        crop_diversity: 20,
        avg_productivity: 6000.0,
        total_receita: 2_500_000.0,
        total_despesa: 250_000.0,
        market: MarketSignals {
            fertilizers: 100.0,
            consultoria: 100.0,
            agrotoxicos: 100.0,
        },
    });

    assert_eq!(
        recommendations,
        vec![
            "✅ Excelente diversidade (20 culturas) - mantenha essa estratégia",
            "✅ Boa saúde financeira (saldo: R$ 2,250,000.00) - mantenha o equilíbrio",
            "✅ Boa cobertura territorial (50 municípios) - aproveite a escala",
            "✅ Alto nível de atividade de mercado - mercado maduro e ativo",
            "✅ Alta produtividade média (6000.0 ha/município) - região muito produtiva",
            "🎯 EXCELENTE: Região prioritária para investimento e expansão",
            "🔍 PRIORIDADE: Melhorar abrangência territorial (20.0 pts)",
        ]
    );
}

#[test]
fn mid_range_scores_fall_back_before_tier_and_priority() {
    // 12 + 12.5 + 10 + 12.5 with a 3 point bonus: no threshold crossed.
    let recommendations = recommend(ScoringInputs {
        municipality_count: 25,
        crop_diversity: 8,
        avg_productivity: 3000.0,
        total_receita: 2000.0,
        total_despesa: 1000.0,
        market: MarketSignals {
            fertilizers: 50.0,
            consultoria: 50.0,
            agrotoxicos: 50.0,
        },
    });

    assert_eq!(recommendations.len(), 3);
    assert_eq!(
        recommendations[0],
        "Continue monitorando os dados para identificar oportunidades"
    );
    assert!(recommendations[1].starts_with("⚖️ MÉDIO"));
    assert_eq!(
        recommendations[2],
        "🔍 PRIORIDADE: Melhorar abrangência territorial (10.0 pts)"
    );
}
