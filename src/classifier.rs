//! Intent Classifier
//!
//! Resolves a lowercased query to exactly one [`Intent`] by walking an
//! ordered list of rules. Each rule tests substring containment against the
//! resolved locale's keyword sets unioned with the base locale's sets, so an
//! English keyword matches whatever language the query was detected as.
//! The first rule that matches wins; nothing matching yields general guidance.

use serde::Serialize;
use std::sync::Arc;

use crate::locale::{KeywordSet, KeywordTable, Locale, LocaleRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetsFacet {
    Total,
    Cash,
    Bank,
    Property,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiabilitiesFacet {
    Total,
    CreditCard,
    PersonalLoan,
    Mortgage,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpfFacet {
    Total,
    Contribution,
    Balance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentsFacet {
    Total,
    GainLoss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionsFacet {
    ExpenseTotal,
    IncomeTotal,
    Summary,
}

/// Resolved meaning of a query. Produced per query and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", content = "facet", rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    InsightsRequest,
    AssetsQuery(AssetsFacet),
    DebtStrategy,
    LiabilitiesQuery(LiabilitiesFacet),
    CreditScoreQuery,
    EpfQuery(EpfFacet),
    InvestmentsQuery(InvestmentsFacet),
    ExpenseTrendQuery,
    TransactionsQuery(TransactionsFacet),
    NetWorthQuery,
    VacationPlanning,
    BudgetCreation,
    GeneralGuidance,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::InsightsRequest => "insights_request",
            Intent::AssetsQuery(_) => "assets_query",
            Intent::DebtStrategy => "debt_strategy",
            Intent::LiabilitiesQuery(_) => "liabilities_query",
            Intent::CreditScoreQuery => "credit_score_query",
            Intent::EpfQuery(_) => "epf_query",
            Intent::InvestmentsQuery(_) => "investments_query",
            Intent::ExpenseTrendQuery => "expense_trend_query",
            Intent::TransactionsQuery(_) => "transactions_query",
            Intent::NetWorthQuery => "net_worth_query",
            Intent::VacationPlanning => "vacation_planning",
            Intent::BudgetCreation => "budget_creation",
            Intent::GeneralGuidance => "general_guidance",
        }
    }
}

/// Query text plus the two keyword tables it is matched against
pub struct MatchContext<'a> {
    text: &'a str,
    local: &'a KeywordTable,
    base: &'a KeywordTable,
}

impl<'a> MatchContext<'a> {
    pub fn any(&self, set: KeywordSet) -> bool {
        contains_any(self.text, self.local.set(set)) || contains_any(self.text, self.base.set(set))
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|kw| text.contains(kw.as_str()))
}

/// One step of the cascade
pub struct Rule {
    pub name: &'static str,
    matches: fn(&MatchContext<'_>) -> bool,
    build: fn(&MatchContext<'_>) -> Intent,
}

fn cascade() -> Vec<Rule> {
    vec![
        Rule {
            name: "insights",
            matches: |m| m.any(KeywordSet::Insights),
            build: |_| Intent::InsightsRequest,
        },
        Rule {
            name: "assets",
            matches: |m| m.any(KeywordSet::Assets),
            build: |m| {
                let facet = if m.any(KeywordSet::Total) {
                    AssetsFacet::Total
                } else if m.any(KeywordSet::Cash) {
                    AssetsFacet::Cash
                } else if m.any(KeywordSet::Bank) {
                    AssetsFacet::Bank
                } else if m.any(KeywordSet::Property) {
                    AssetsFacet::Property
                } else {
                    AssetsFacet::List
                };
                Intent::AssetsQuery(facet)
            },
        },
        // Any liability word also lands here, so the lookup below only
        // catches what this rule lets through
        Rule {
            name: "debt_strategy",
            matches: |m| m.any(KeywordSet::DebtTrigger) || m.any(KeywordSet::Liabilities),
            build: |_| Intent::DebtStrategy,
        },
        Rule {
            name: "liabilities",
            matches: |m| m.any(KeywordSet::Liabilities),
            build: |m| {
                let facet = if m.any(KeywordSet::Total) {
                    LiabilitiesFacet::Total
                } else if m.any(KeywordSet::CreditCard) {
                    LiabilitiesFacet::CreditCard
                } else if m.any(KeywordSet::PersonalLoan) {
                    LiabilitiesFacet::PersonalLoan
                } else if m.any(KeywordSet::Mortgage) {
                    LiabilitiesFacet::Mortgage
                } else {
                    LiabilitiesFacet::List
                };
                Intent::LiabilitiesQuery(facet)
            },
        },
        Rule {
            name: "credit_score",
            matches: |m| m.any(KeywordSet::CreditScore),
            build: |_| Intent::CreditScoreQuery,
        },
        Rule {
            name: "epf",
            matches: |m| m.any(KeywordSet::Epf),
            build: |m| {
                let facet = if m.any(KeywordSet::Total) {
                    EpfFacet::Total
                } else if m.any(KeywordSet::Contribution) {
                    EpfFacet::Contribution
                } else {
                    EpfFacet::Balance
                };
                Intent::EpfQuery(facet)
            },
        },
        Rule {
            name: "investments",
            matches: |m| m.any(KeywordSet::Investments),
            build: |m| {
                let facet = if m.any(KeywordSet::Total) {
                    InvestmentsFacet::Total
                } else if m.any(KeywordSet::GainLoss) {
                    InvestmentsFacet::GainLoss
                } else {
                    InvestmentsFacet::Total
                };
                Intent::InvestmentsQuery(facet)
            },
        },
        Rule {
            name: "expense_trend",
            matches: |m| m.any(KeywordSet::Expense) && m.any(KeywordSet::Trend),
            build: |_| Intent::ExpenseTrendQuery,
        },
        Rule {
            name: "transactions",
            matches: |m| {
                m.any(KeywordSet::Transactions)
                    || m.any(KeywordSet::Expense)
                    || m.any(KeywordSet::Income)
            },
            build: |m| {
                let facet = if m.any(KeywordSet::Total) && m.any(KeywordSet::Expense) {
                    TransactionsFacet::ExpenseTotal
                } else if m.any(KeywordSet::Total) && m.any(KeywordSet::Income) {
                    TransactionsFacet::IncomeTotal
                } else {
                    TransactionsFacet::Summary
                };
                Intent::TransactionsQuery(facet)
            },
        },
        Rule {
            name: "net_worth",
            matches: |m| m.any(KeywordSet::NetWorth),
            build: |_| Intent::NetWorthQuery,
        },
        // Travel is checked before budget so "vacation budget" plans a trip
        Rule {
            name: "vacation",
            matches: |m| m.any(KeywordSet::Travel),
            build: |_| Intent::VacationPlanning,
        },
        Rule {
            name: "budget",
            matches: |m| m.any(KeywordSet::Budget) || m.any(KeywordSet::BudgetPhrases),
            build: |_| Intent::BudgetCreation,
        },
    ]
}

pub struct IntentClassifier {
    registry: Arc<LocaleRegistry>,
    rules: Vec<Rule>,
}

impl IntentClassifier {
    pub fn new(registry: Arc<LocaleRegistry>) -> Self {
        Self {
            registry,
            rules: cascade(),
        }
    }

    /// Rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    fn context<'a>(&'a self, lowered: &'a str, locale: &Locale) -> MatchContext<'a> {
        let base = self.registry.default_bundle();
        let local = self.registry.bundle_or_default(Some(locale));
        MatchContext {
            text: lowered,
            local: &local.keywords,
            base: &base.keywords,
        }
    }

    /// Greeting tokens short-circuit before the cascade runs
    pub fn is_greeting(&self, lowered: &str, locale: &Locale) -> bool {
        self.context(lowered, locale).any(KeywordSet::Greeting)
    }

    /// Expects text already lowercased by the caller
    pub fn classify(&self, lowered: &str, locale: &Locale) -> Intent {
        let ctx = self.context(lowered, locale);
        self.rules
            .iter()
            .find(|rule| (rule.matches)(&ctx))
            .map(|rule| (rule.build)(&ctx))
            .unwrap_or(Intent::GeneralGuidance)
    }
}
