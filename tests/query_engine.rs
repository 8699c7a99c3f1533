use chrono::NaiveDate;
use finance_query_engine::{
    debt::DebtStrategyPlanner,
    insights::InsightKind,
    locale::RecommendationCategory,
    AccessGrant, AssistantError, Category, FinancialProfile, Intent, Liabilities, Locale,
    PrivacyFilter, QueryEngine, Transaction, TransactionKind,
};

fn engine() -> QueryEngine {
    QueryEngine::builtin().unwrap()
}

#[test]
fn total_assets_answer_carries_assets_block() {
    let engine = engine();
    let res = engine
        .answer(
            "What are my total assets?",
            &FinancialProfile::sample(),
            &AccessGrant::all(),
            None,
        )
        .unwrap();

    let block = engine
        .registry()
        .default_bundle()
        .recommendations
        .block(RecommendationCategory::Assets);
    assert!(res.text.contains("330,000"));
    assert!(res.text.contains(block));
}

#[test]
fn empty_query_is_rejected() {
    let err = engine()
        .answer("", &FinancialProfile::sample(), &AccessGrant::all(), None)
        .unwrap_err();
    assert!(matches!(err, AssistantError::InvalidInput(_)));
}

#[test]
fn hindi_greeting_gets_first_hindi_reply() {
    let engine = engine();
    let res = engine
        .answer("नमस्ते", &FinancialProfile::sample(), &AccessGrant::all(), None)
        .unwrap();

    let hi = engine.registry().bundle(&Locale::new("hi")).unwrap();
    assert_eq!(res.intent, Intent::Greeting);
    assert_eq!(res.locale, Locale::new("hi"));
    assert_eq!(res.text, hi.greeting_replies[0]);
}

#[test]
fn credit_score_is_never_a_liabilities_query() {
    let engine = engine();
    let en = Locale::new("en");
    for query in [
        "What is my credit score?",
        "show my credit score rating",
        "how good is my credit?",
    ] {
        assert_eq!(engine.classify(query, &en), Intent::CreditScoreQuery, "{}", query);
    }
}

#[test]
fn debt_schedule_for_reference_balances() {
    let liabilities = Liabilities {
        credit_card_debt: 2_500.0,
        personal_loan: 15_000.0,
        mortgage: 200_000.0,
        total: 217_500.0,
    };
    let plan = DebtStrategyPlanner::plan(&liabilities, None).unwrap();
    assert_eq!(plan.enhanced.phase1_months, 2.0);
    assert_eq!(plan.enhanced.phase2_months, 15.0);
    assert_eq!(plan.enhanced.total_months, 17.0);

    let text = engine()
        .answer(
            "How can I pay off my loan faster?",
            &FinancialProfile::sample(),
            &AccessGrant::all(),
            None,
        )
        .unwrap()
        .text;
    assert!(text.contains("17.0 months"));
}

#[test]
fn spending_spike_is_reported() {
    let expense = |amount: f64| Transaction {
        date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        kind: TransactionKind::Expense,
        amount,
        description: "Dinner".to_string(),
        category: "dining".to_string(),
    };
    let profile = FinancialProfile {
        transactions: Some(vec![expense(10.0), expense(10.0), expense(10.0), expense(100.0)]),
        ..Default::default()
    };

    let insights = engine().insights(&profile, &AccessGrant::all(), &Locale::new("en"));
    assert!(insights
        .iter()
        .any(|i| i.kind == InsightKind::SpendingAnomaly && i.description.contains("dining")));
}

#[test]
fn answers_only_use_granted_categories() {
    let engine = engine();
    let profile = FinancialProfile::sample();
    let info_na = &engine.registry().default_bundle().messages.info_na;

    let cases = [
        ("What are my total assets?", Category::Assets, "330,000"),
        ("What is my credit score?", Category::CreditScore, "750"),
        ("What is my EPF balance?", Category::Epf, "100,000"),
        ("What is my total investment value?", Category::Investments, "4,050"),
    ];

    for (query, category, figure) in cases {
        let grants = AccessGrant::all().with(category, false);
        let res = engine.answer(query, &profile, &grants, None).unwrap();
        assert_eq!(&res.text, info_na, "{}", query);

        let res = engine
            .answer(query, &profile, &AccessGrant::all(), None)
            .unwrap();
        assert!(res.text.contains(figure), "{}", query);
    }
}

#[test]
fn privacy_view_never_exposes_denied_keys() {
    let profile = FinancialProfile::sample();
    let grants = AccessGrant::none()
        .with(Category::Assets, true)
        .with(Category::Epf, true);
    let json = PrivacyFilter::apply(&profile, &grants)
        .to_pretty_json()
        .unwrap();

    assert!(json.contains("\"assets\""));
    assert!(json.contains("\"epf_balance\""));
    for hidden in ["liabilities", "transactions", "credit_score", "investments"] {
        assert!(!json.contains(&format!("\"{}\"", hidden)), "{}", hidden);
    }
}

#[test]
fn gujarati_query_is_answered_in_gujarati() {
    let engine = engine();
    let res = engine
        .answer(
            "મારી કુલ સંપત્તિ કેટલી છે?",
            &FinancialProfile::sample(),
            &AccessGrant::all(),
            None,
        )
        .unwrap();

    let gu = engine.registry().bundle(&Locale::new("gu")).unwrap();
    assert_eq!(res.locale.as_str(), "gu");
    assert!(res.text.contains("330,000"));
    assert!(res.text.ends_with(&gu.recommendations.assets));
}

#[test]
fn unmatched_query_gets_general_guidance() {
    let engine = engine();
    let res = engine
        .answer(
            "Tell me about the weather",
            &FinancialProfile::sample(),
            &AccessGrant::all(),
            None,
        )
        .unwrap();
    assert_eq!(res.intent, Intent::GeneralGuidance);
    assert_eq!(
        res.text,
        engine.registry().default_bundle().messages.general_guidance
    );
}
