//! Locale bundle: keywords, templates and recommendation text for one language
//!
//! Bundles are plain data (JSON). Every table is a struct with named fields,
//! so a bundle missing an entry fails to deserialize, and lookups are
//! exhaustive matches instead of string-keyed dictionary probes.

use serde::{Deserialize, Serialize};

use super::Locale;
use crate::format::slot_names;

/// Inclusive code point range identifying a script
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptRange {
    pub start: u32,
    pub end: u32,
}

impl ScriptRange {
    pub fn contains(&self, ch: char) -> bool {
        let code = ch as u32;
        self.start <= code && code <= self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleBundle {
    pub code: Locale,
    pub display_name: String,
    /// Characters in this range select the locale during detection
    #[serde(default)]
    pub script: Option<ScriptRange>,
    pub keywords: KeywordTable,
    pub greeting_replies: Vec<String>,
    pub messages: MessageTemplates,
    pub insights: InsightTexts,
    pub recommendations: Recommendations,
}

//
// ================= Keywords =================
//

/// Names of the keyword sets the classifier consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordSet {
    Greeting,
    Insights,
    Assets,
    Total,
    Cash,
    Bank,
    Property,
    DebtTrigger,
    Liabilities,
    CreditCard,
    PersonalLoan,
    Mortgage,
    CreditScore,
    Epf,
    Contribution,
    Investments,
    GainLoss,
    Expense,
    Trend,
    Transactions,
    Income,
    NetWorth,
    Travel,
    Budget,
    BudgetPhrases,
}

impl KeywordSet {
    pub const ALL: [KeywordSet; 25] = [
        KeywordSet::Greeting,
        KeywordSet::Insights,
        KeywordSet::Assets,
        KeywordSet::Total,
        KeywordSet::Cash,
        KeywordSet::Bank,
        KeywordSet::Property,
        KeywordSet::DebtTrigger,
        KeywordSet::Liabilities,
        KeywordSet::CreditCard,
        KeywordSet::PersonalLoan,
        KeywordSet::Mortgage,
        KeywordSet::CreditScore,
        KeywordSet::Epf,
        KeywordSet::Contribution,
        KeywordSet::Investments,
        KeywordSet::GainLoss,
        KeywordSet::Expense,
        KeywordSet::Trend,
        KeywordSet::Transactions,
        KeywordSet::Income,
        KeywordSet::NetWorth,
        KeywordSet::Travel,
        KeywordSet::Budget,
        KeywordSet::BudgetPhrases,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KeywordSet::Greeting => "greeting",
            KeywordSet::Insights => "insights",
            KeywordSet::Assets => "assets",
            KeywordSet::Total => "total",
            KeywordSet::Cash => "cash",
            KeywordSet::Bank => "bank",
            KeywordSet::Property => "property",
            KeywordSet::DebtTrigger => "debt_trigger",
            KeywordSet::Liabilities => "liabilities",
            KeywordSet::CreditCard => "credit_card",
            KeywordSet::PersonalLoan => "personal_loan",
            KeywordSet::Mortgage => "mortgage",
            KeywordSet::CreditScore => "credit_score",
            KeywordSet::Epf => "epf",
            KeywordSet::Contribution => "contribution",
            KeywordSet::Investments => "investments",
            KeywordSet::GainLoss => "gain_loss",
            KeywordSet::Expense => "expense",
            KeywordSet::Trend => "trend",
            KeywordSet::Transactions => "transactions",
            KeywordSet::Income => "income",
            KeywordSet::NetWorth => "net_worth",
            KeywordSet::Travel => "travel",
            KeywordSet::Budget => "budget",
            KeywordSet::BudgetPhrases => "budget_phrases",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordTable {
    pub greeting: Vec<String>,
    pub insights: Vec<String>,
    pub assets: Vec<String>,
    pub total: Vec<String>,
    pub cash: Vec<String>,
    pub bank: Vec<String>,
    pub property: Vec<String>,
    pub debt_trigger: Vec<String>,
    pub liabilities: Vec<String>,
    pub credit_card: Vec<String>,
    pub personal_loan: Vec<String>,
    pub mortgage: Vec<String>,
    pub credit_score: Vec<String>,
    pub epf: Vec<String>,
    pub contribution: Vec<String>,
    pub investments: Vec<String>,
    pub gain_loss: Vec<String>,
    pub expense: Vec<String>,
    pub trend: Vec<String>,
    pub transactions: Vec<String>,
    pub income: Vec<String>,
    pub net_worth: Vec<String>,
    pub travel: Vec<String>,
    pub budget: Vec<String>,
    pub budget_phrases: Vec<String>,
}

impl KeywordTable {
    pub fn set(&self, set: KeywordSet) -> &[String] {
        match set {
            KeywordSet::Greeting => &self.greeting,
            KeywordSet::Insights => &self.insights,
            KeywordSet::Assets => &self.assets,
            KeywordSet::Total => &self.total,
            KeywordSet::Cash => &self.cash,
            KeywordSet::Bank => &self.bank,
            KeywordSet::Property => &self.property,
            KeywordSet::DebtTrigger => &self.debt_trigger,
            KeywordSet::Liabilities => &self.liabilities,
            KeywordSet::CreditCard => &self.credit_card,
            KeywordSet::PersonalLoan => &self.personal_loan,
            KeywordSet::Mortgage => &self.mortgage,
            KeywordSet::CreditScore => &self.credit_score,
            KeywordSet::Epf => &self.epf,
            KeywordSet::Contribution => &self.contribution,
            KeywordSet::Investments => &self.investments,
            KeywordSet::GainLoss => &self.gain_loss,
            KeywordSet::Expense => &self.expense,
            KeywordSet::Trend => &self.trend,
            KeywordSet::Transactions => &self.transactions,
            KeywordSet::Income => &self.income,
            KeywordSet::NetWorth => &self.net_worth,
            KeywordSet::Travel => &self.travel,
            KeywordSet::Budget => &self.budget,
            KeywordSet::BudgetPhrases => &self.budget_phrases,
        }
    }

    /// Queries are lowercased before matching, so keywords must be too
    fn normalize(&mut self) {
        for list in [
            &mut self.greeting,
            &mut self.insights,
            &mut self.assets,
            &mut self.total,
            &mut self.cash,
            &mut self.bank,
            &mut self.property,
            &mut self.debt_trigger,
            &mut self.liabilities,
            &mut self.credit_card,
            &mut self.personal_loan,
            &mut self.mortgage,
            &mut self.credit_score,
            &mut self.epf,
            &mut self.contribution,
            &mut self.investments,
            &mut self.gain_loss,
            &mut self.expense,
            &mut self.trend,
            &mut self.transactions,
            &mut self.income,
            &mut self.net_worth,
            &mut self.travel,
            &mut self.budget,
            &mut self.budget_phrases,
        ] {
            for keyword in list.iter_mut() {
                *keyword = keyword.trim().to_lowercase();
            }
            list.retain(|k| !k.is_empty());
        }
    }
}

//
// ================= Templates =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplates {
    pub info_na: String,
    pub assets_total: String,
    pub cash: String,
    pub bank: String,
    pub property: String,
    pub assets_list: String,
    pub liab_total: String,
    pub liab_cc: String,
    pub liab_pl: String,
    pub liab_mortgage: String,
    pub liab_list: String,
    pub credit_score: String,
    pub epf_total: String,
    pub epf_contrib: String,
    pub epf_balance: String,
    pub invest_total: String,
    pub invest_gl: String,
    pub tx_exp_total: String,
    pub tx_inc_total: String,
    pub tx_summary: String,
    pub net_worth: String,
    pub debt_plan: String,
    pub debt_guidance: String,
    pub debt_needs_budget: String,
    pub expense_trend: String,
    pub expense_trend_line: String,
    pub vacation_guide: String,
    pub vacation_budget: String,
    pub vacation_general: String,
    pub budget_plan: String,
    pub insights_header: String,
    pub insight_line: String,
    pub no_insights: String,
    pub general_guidance: String,
    pub technical_difficulty: String,
    pub summary_empty: String,
    pub summary_header: String,
    pub summary_line: String,
}

impl MessageTemplates {
    fn check(&self, problems: &mut Vec<String>) {
        check_template(problems, "info_na", &self.info_na, &[]);
        check_template(problems, "assets_total", &self.assets_total, &["total"]);
        check_template(problems, "cash", &self.cash, &["cash"]);
        check_template(problems, "bank", &self.bank, &["bank"]);
        check_template(problems, "property", &self.property, &["property"]);
        check_template(
            problems,
            "assets_list",
            &self.assets_list,
            &["cash", "bank", "property", "total"],
        );
        check_template(problems, "liab_total", &self.liab_total, &["total"]);
        check_template(problems, "liab_cc", &self.liab_cc, &["credit_card"]);
        check_template(problems, "liab_pl", &self.liab_pl, &["personal_loan"]);
        check_template(problems, "liab_mortgage", &self.liab_mortgage, &["mortgage"]);
        check_template(
            problems,
            "liab_list",
            &self.liab_list,
            &["credit_card", "personal_loan", "mortgage", "total"],
        );
        check_template(problems, "credit_score", &self.credit_score, &["score", "rating"]);
        check_template(problems, "epf_total", &self.epf_total, &["total"]);
        check_template(problems, "epf_contrib", &self.epf_contrib, &["employee", "employer"]);
        check_template(problems, "epf_balance", &self.epf_balance, &["total"]);
        check_template(problems, "invest_total", &self.invest_total, &["total"]);
        check_template(problems, "invest_gl", &self.invest_gl, &["gain_loss"]);
        check_template(problems, "tx_exp_total", &self.tx_exp_total, &["expenses"]);
        check_template(problems, "tx_inc_total", &self.tx_inc_total, &["income"]);
        check_template(problems, "tx_summary", &self.tx_summary, &["income", "expenses"]);
        check_template(problems, "net_worth", &self.net_worth, &["net_worth"]);
        check_template(
            problems,
            "debt_plan",
            &self.debt_plan,
            &[
                "credit_card",
                "personal_loan",
                "mortgage",
                "high_priority",
                "surplus",
                "boosted",
                "boost",
                "phase1",
                "phase2",
                "total",
                "alt_phase1",
                "alt_phase2",
                "alt_total",
            ],
        );
        check_template(problems, "debt_guidance", &self.debt_guidance, &[]);
        check_template(problems, "debt_needs_budget", &self.debt_needs_budget, &["surplus"]);
        check_template(
            problems,
            "expense_trend",
            &self.expense_trend,
            &["total", "categories", "housing", "food", "transport"],
        );
        check_template(
            problems,
            "expense_trend_line",
            &self.expense_trend_line,
            &["category", "amount", "share"],
        );
        check_template(problems, "vacation_guide", &self.vacation_guide, &[]);
        check_template(
            problems,
            "vacation_budget",
            &self.vacation_budget,
            &["income", "expenses", "surplus", "safe", "comfortable", "luxury"],
        );
        check_template(problems, "vacation_general", &self.vacation_general, &[]);
        check_template(
            problems,
            "budget_plan",
            &self.budget_plan,
            &[
                "income",
                "needs",
                "wants",
                "savings",
                "housing",
                "utilities",
                "groceries",
                "transportation",
                "insurance",
                "entertainment",
                "hobbies",
                "shopping",
                "travel",
                "emergency_fund",
                "debt_payment",
                "investments",
            ],
        );
        check_template(problems, "insights_header", &self.insights_header, &[]);
        check_template(
            problems,
            "insight_line",
            &self.insight_line,
            &["title", "description", "recommendation"],
        );
        check_template(problems, "no_insights", &self.no_insights, &[]);
        check_template(problems, "general_guidance", &self.general_guidance, &[]);
        check_template(problems, "technical_difficulty", &self.technical_difficulty, &[]);
        check_template(problems, "summary_empty", &self.summary_empty, &[]);
        check_template(problems, "summary_header", &self.summary_header, &[]);
        check_template(
            problems,
            "summary_line",
            &self.summary_line,
            &["index", "question", "answer"],
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightText {
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightTexts {
    pub predictive_savings: InsightText,
    pub spending_anomaly: InsightText,
    pub debt_optimization: InsightText,
    pub investment_opportunity: InsightText,
}

impl InsightTexts {
    fn check(&self, problems: &mut Vec<String>) {
        check_template(
            problems,
            "predictive_savings",
            &self.predictive_savings.description,
            &["yearly"],
        );
        check_template(
            problems,
            "spending_anomaly",
            &self.spending_anomaly.description,
            &["category", "max", "average"],
        );
        check_template(
            problems,
            "debt_optimization",
            &self.debt_optimization.description,
            &["credit_card"],
        );
        check_template(
            problems,
            "investment_opportunity",
            &self.investment_opportunity.description,
            &["excess"],
        );
    }
}

fn check_template(problems: &mut Vec<String>, name: &str, template: &str, required: &[&str]) {
    if template.trim().is_empty() {
        problems.push(format!("template '{}' is empty", name));
        return;
    }
    let present = slot_names(template);
    for slot in required {
        if !present.contains(slot) {
            problems.push(format!("template '{}' is missing slot {{{}}}", name, slot));
        }
    }
}

/// Recommendation block categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Assets,
    Liabilities,
    Investments,
    Spending,
    Savings,
    CreditScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub assets: String,
    pub liabilities: String,
    pub investments: String,
    pub spending: String,
    pub savings: String,
    pub credit_score: String,
}

impl Recommendations {
    pub fn block(&self, category: RecommendationCategory) -> &str {
        match category {
            RecommendationCategory::Assets => &self.assets,
            RecommendationCategory::Liabilities => &self.liabilities,
            RecommendationCategory::Investments => &self.investments,
            RecommendationCategory::Spending => &self.spending,
            RecommendationCategory::Savings => &self.savings,
            RecommendationCategory::CreditScore => &self.credit_score,
        }
    }
}

//
// ================= Validation =================
//

impl LocaleBundle {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let mut bundle: LocaleBundle = serde_json::from_str(json)?;
        bundle.keywords.normalize();
        bundle.validate()?;
        Ok(bundle)
    }

    /// Completeness check: every keyword set, reply list, template slot and
    /// recommendation block must be present and usable.
    pub fn validate(&self) -> crate::Result<()> {
        let mut problems = Vec::new();

        if self.display_name.trim().is_empty() {
            problems.push("display_name is empty".to_string());
        }

        if let Some(range) = self.script {
            if range.start > range.end {
                problems.push(format!(
                    "script range {:#x}..={:#x} is inverted",
                    range.start, range.end
                ));
            }
        }

        for set in KeywordSet::ALL {
            if self.keywords.set(set).is_empty() {
                problems.push(format!("keyword set '{}' is empty", set.name()));
            }
        }

        if self.greeting_replies.is_empty() {
            problems.push("greeting_replies is empty".to_string());
        }

        self.messages.check(&mut problems);
        self.insights.check(&mut problems);

        for category in [
            RecommendationCategory::Assets,
            RecommendationCategory::Liabilities,
            RecommendationCategory::Investments,
            RecommendationCategory::Spending,
            RecommendationCategory::Savings,
            RecommendationCategory::CreditScore,
        ] {
            if self.recommendations.block(category).trim().is_empty() {
                problems.push(format!("recommendation block {:?} is empty", category));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(crate::error::AssistantError::LocaleRegistry(format!(
                "bundle '{}' is incomplete: {}",
                self.code,
                problems.join("; ")
            )))
        }
    }
}
