//! Insight Engine - derived observations over the visible profile
//!
//! Each analyzer is independent and only runs over categories the privacy
//! view exposes. Results are computed per request and never cached.
//!
//! ## Built-in analyzers
//!
//! - **Predictive savings** - yearly projection of the monthly surplus
//! - **Spending anomaly** - a category whose largest expense dwarfs its mean
//! - **Debt optimization** - credit card first when a personal loan also exists
//! - **Investment opportunity** - liquid assets beyond a liabilities reserve

use serde::Serialize;
use std::collections::BTreeMap;

use crate::format::{money, money_whole, render};
use crate::locale::{InsightText, InsightTexts};
use crate::models::{sum_kind, TransactionKind};
use crate::privacy::ProfileView;

/// Minimum number of expenses in a category before spikes are considered
pub const ANOMALY_MIN_TRANSACTIONS: usize = 3;

/// A category is anomalous when its largest expense exceeds this multiple of its mean
pub const ANOMALY_SPIKE_FACTOR: f64 = 2.0;

/// Share of total liabilities kept liquid before the rest counts as investable
pub const LIQUID_RESERVE_RATIO: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    PredictiveSavings,
    SpendingAnomaly,
    DebtOptimization,
    InvestmentOpportunity,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::PredictiveSavings => "predictive_savings",
            InsightKind::SpendingAnomaly => "spending_anomaly",
            InsightKind::DebtOptimization => "debt_optimization",
            InsightKind::InvestmentOpportunity => "investment_opportunity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

impl Insight {
    fn localized(kind: InsightKind, text: &InsightText, slots: &[(&str, String)]) -> Self {
        Self {
            kind,
            title: text.title.clone(),
            description: render(&text.description, slots),
            recommendation: text.recommendation.clone(),
        }
    }
}

/// Inputs handed to every analyzer
pub struct AnalysisContext<'a> {
    pub view: &'a ProfileView<'a>,
    pub texts: &'a InsightTexts,
}

/// Pluggable analyzer
pub trait InsightAnalyzer: Send + Sync {
    fn kind(&self) -> InsightKind;

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight>;
}

pub struct PredictiveSavings;

impl InsightAnalyzer for PredictiveSavings {
    fn kind(&self) -> InsightKind {
        InsightKind::PredictiveSavings
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let Some(transactions) = ctx.view.transactions else {
            return vec![];
        };

        let surplus = sum_kind(transactions, TransactionKind::Income)
            - sum_kind(transactions, TransactionKind::Expense);
        if surplus <= 0.0 {
            return vec![];
        }

        vec![Insight::localized(
            self.kind(),
            &ctx.texts.predictive_savings,
            &[("yearly", money(surplus * 12.0))],
        )]
    }
}

pub struct SpendingAnomaly;

impl InsightAnalyzer for SpendingAnomaly {
    fn kind(&self) -> InsightKind {
        InsightKind::SpendingAnomaly
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let Some(transactions) = ctx.view.transactions else {
            return vec![];
        };

        // Ordered by category name
        let mut by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for tx in transactions.iter().filter(|t| t.kind == TransactionKind::Expense) {
            by_category
                .entry(tx.category.as_str())
                .or_default()
                .push(tx.amount);
        }

        by_category
            .into_iter()
            .filter_map(|(category, amounts)| {
                let spike = detect_spike(&amounts)?;
                Some(Insight::localized(
                    self.kind(),
                    &ctx.texts.spending_anomaly,
                    &[
                        ("category", category.to_string()),
                        ("max", money(spike.max)),
                        ("average", money_whole(spike.average)),
                    ],
                ))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spike {
    pub max: f64,
    pub average: f64,
}

/// `Some` when there are enough amounts and the largest is a spike
pub fn detect_spike(amounts: &[f64]) -> Option<Spike> {
    if amounts.len() < ANOMALY_MIN_TRANSACTIONS {
        return None;
    }

    let average = amounts.iter().sum::<f64>() / amounts.len() as f64;
    let max = amounts.iter().copied().fold(f64::MIN, f64::max);

    (max > average * ANOMALY_SPIKE_FACTOR).then_some(Spike { max, average })
}

pub struct DebtOptimization;

impl InsightAnalyzer for DebtOptimization {
    fn kind(&self) -> InsightKind {
        InsightKind::DebtOptimization
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        match ctx.view.liabilities {
            Some(l) if l.credit_card_debt > 0.0 && l.personal_loan > 0.0 => {
                vec![Insight::localized(
                    self.kind(),
                    &ctx.texts.debt_optimization,
                    &[("credit_card", money(l.credit_card_debt))],
                )]
            }
            _ => vec![],
        }
    }
}

pub struct InvestmentOpportunity;

impl InsightAnalyzer for InvestmentOpportunity {
    fn kind(&self) -> InsightKind {
        InsightKind::InvestmentOpportunity
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let (Some(assets), Some(liabilities)) = (ctx.view.assets, ctx.view.liabilities) else {
            return vec![];
        };

        let reserve = liabilities.total * LIQUID_RESERVE_RATIO;
        let liquid = assets.liquid();
        if liquid <= reserve {
            return vec![];
        }

        vec![Insight::localized(
            self.kind(),
            &ctx.texts.investment_opportunity,
            &[("excess", money_whole(liquid - reserve))],
        )]
    }
}

/// Runs registered analyzers in registration order
pub struct InsightEngine {
    analyzers: Vec<Box<dyn InsightAnalyzer>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Engine with the four built-in analyzers
    pub fn new() -> Self {
        let mut engine = Self::empty();

        engine.register(Box::new(PredictiveSavings));
        engine.register(Box::new(SpendingAnomaly));
        engine.register(Box::new(DebtOptimization));
        engine.register(Box::new(InvestmentOpportunity));

        engine
    }

    pub fn empty() -> Self {
        Self { analyzers: vec![] }
    }

    pub fn register(&mut self, analyzer: Box<dyn InsightAnalyzer>) {
        self.analyzers.push(analyzer);
    }

    pub fn analyze_all(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mut all = vec![];

        for analyzer in &self.analyzers {
            let found = analyzer.analyze(ctx);
            tracing::debug!(
                insight = analyzer.kind().as_str(),
                count = found.len(),
                "Insight analysis complete"
            );
            all.extend(found);
        }

        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleRegistry;
    use crate::models::{AccessGrant, Category, FinancialProfile, Transaction};
    use crate::privacy::PrivacyFilter;
    use chrono::NaiveDate;

    fn expense(category: &str, amount: f64) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            kind: TransactionKind::Expense,
            amount,
            description: "test".to_string(),
            category: category.to_string(),
        }
    }

    fn run(profile: &FinancialProfile, grants: &AccessGrant) -> Vec<Insight> {
        let registry = LocaleRegistry::shared().unwrap();
        let view = PrivacyFilter::apply(profile, grants);
        let ctx = AnalysisContext {
            view: &view,
            texts: &registry.default_bundle().insights,
        };
        InsightEngine::new().analyze_all(&ctx)
    }

    #[test]
    fn test_spike_detection() {
        assert!(detect_spike(&[10.0, 10.0, 10.0, 100.0]).is_some());
        assert!(detect_spike(&[10.0, 10.0, 10.0, 15.0]).is_none());
        assert!(detect_spike(&[10.0, 100.0]).is_none());

        let spike = detect_spike(&[10.0, 10.0, 10.0, 100.0]).unwrap();
        assert_eq!(spike.max, 100.0);
        assert_eq!(spike.average, 32.5);
    }

    #[test]
    fn test_sample_profile_insights_in_declaration_order() {
        let insights = run(&FinancialProfile::sample(), &AccessGrant::all());
        let kinds: Vec<InsightKind> = insights.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                InsightKind::PredictiveSavings,
                InsightKind::DebtOptimization,
                InsightKind::InvestmentOpportunity,
            ]
        );

        // (5000 - 1500) * 12
        assert!(insights[0].description.contains("$42,000"));
        assert!(insights[1].description.contains("$2,500"));
        // 30,000 liquid - 21,750 reserve
        assert!(insights[2].description.contains("$8,250"));
    }

    #[test]
    fn test_anomalies_sorted_by_category() {
        let mut profile = FinancialProfile::default();
        let mut txs = vec![];
        for category in ["travel", "dining"] {
            for amount in [12.0, 10.0, 10.0, 100.0] {
                txs.push(expense(category, amount));
            }
        }
        profile.transactions = Some(txs);

        let insights = run(&profile, &AccessGrant::all());
        let anomalies: Vec<&Insight> = insights
            .iter()
            .filter(|i| i.kind == InsightKind::SpendingAnomaly)
            .collect();
        assert_eq!(anomalies.len(), 2);
        assert!(anomalies[0].description.contains("dining"));
        assert!(anomalies[1].description.contains("travel"));
        assert!(anomalies[0].description.contains("$100"));
        assert!(anomalies[0].description.contains("average: $33"));
    }

    #[test]
    fn test_insights_respect_grants() {
        let profile = FinancialProfile::sample();
        assert!(run(&profile, &AccessGrant::none()).is_empty());

        let only_assets = AccessGrant::none().with(Category::Assets, true);
        assert!(run(&profile, &only_assets).is_empty());

        let only_liabilities = AccessGrant::none().with(Category::Liabilities, true);
        let insights = run(&profile, &only_liabilities);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::DebtOptimization);
    }

    #[test]
    fn test_localized_texts() {
        let registry = LocaleRegistry::shared().unwrap();
        let profile = FinancialProfile::sample();
        let view = PrivacyFilter::apply(&profile, &AccessGrant::all());
        let hi = registry
            .bundle(&crate::locale::Locale::new("hi"))
            .unwrap();
        let ctx = AnalysisContext {
            view: &view,
            texts: &hi.insights,
        };
        let insights = InsightEngine::new().analyze_all(&ctx);
        assert_eq!(insights[0].title, "भविष्य की बचत भविष्यवाणी");
    }
}
