//! Core data models for the finance query engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Categories & Grants =================
//

/// Grantable financial data categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Assets,
    Liabilities,
    Transactions,
    #[serde(alias = "epf_balance")]
    Epf,
    CreditScore,
    Investments,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Assets,
        Category::Liabilities,
        Category::Transactions,
        Category::Epf,
        Category::CreditScore,
        Category::Investments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Assets => "assets",
            Category::Liabilities => "liabilities",
            Category::Transactions => "transactions",
            Category::Epf => "epf",
            Category::CreditScore => "credit_score",
            Category::Investments => "investments",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category visibility switches. New users start with everything granted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccessGrant {
    pub assets: bool,
    pub liabilities: bool,
    pub transactions: bool,
    #[serde(alias = "epf_balance")]
    pub epf: bool,
    pub credit_score: bool,
    pub investments: bool,
}

impl AccessGrant {
    pub fn all() -> Self {
        Self {
            assets: true,
            liabilities: true,
            transactions: true,
            epf: true,
            credit_score: true,
            investments: true,
        }
    }

    pub fn none() -> Self {
        Self {
            assets: false,
            liabilities: false,
            transactions: false,
            epf: false,
            credit_score: false,
            investments: false,
        }
    }

    pub fn allows(&self, category: Category) -> bool {
        match category {
            Category::Assets => self.assets,
            Category::Liabilities => self.liabilities,
            Category::Transactions => self.transactions,
            Category::Epf => self.epf,
            Category::CreditScore => self.credit_score,
            Category::Investments => self.investments,
        }
    }

    /// Builder-style toggle, mostly for settings updates and tests
    pub fn with(mut self, category: Category, granted: bool) -> Self {
        let slot = match category {
            Category::Assets => &mut self.assets,
            Category::Liabilities => &mut self.liabilities,
            Category::Transactions => &mut self.transactions,
            Category::Epf => &mut self.epf,
            Category::CreditScore => &mut self.credit_score,
            Category::Investments => &mut self.investments,
        };
        *slot = granted;
        self
    }

    pub fn granted(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(move |c| self.allows(*c))
    }
}

impl Default for AccessGrant {
    fn default() -> Self {
        Self::all()
    }
}

//
// ================= Category Records =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assets {
    pub cash: f64,
    pub bank_balance: f64,
    pub property_value: f64,
    #[serde(alias = "total_assets")]
    pub total: f64,
}

impl Assets {
    pub fn liquid(&self) -> f64 {
        self.cash + self.bank_balance
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Liabilities {
    pub credit_card_debt: f64,
    pub personal_loan: f64,
    pub mortgage: f64,
    #[serde(alias = "total_liabilities")]
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    #[serde(rename = "type", alias = "kind")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpfBalance {
    pub employee_contribution: f64,
    pub employer_contribution: f64,
    #[serde(alias = "total_balance")]
    pub total: f64,
    #[serde(alias = "monthly_contribution")]
    pub monthly: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditScore {
    pub score: u32,
    pub rating: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockHolding {
    pub symbol: String,
    pub shares: f64,
    pub current_price: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundHolding {
    pub name: String,
    pub units: f64,
    pub nav: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Investments {
    #[serde(default)]
    pub stocks: Vec<StockHolding>,
    #[serde(default)]
    pub mutual_funds: Vec<FundHolding>,
    #[serde(alias = "total_investment_value")]
    pub total_value: f64,
    #[serde(default, alias = "total_gain_loss", skip_serializing_if = "Option::is_none")]
    pub gain_loss: Option<f64>,
}

/// Monthly budget record. Travels under the transactions grant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetRecord {
    pub monthly_income: f64,
    pub total_budgeted_expenses: f64,
}

impl BudgetRecord {
    pub fn surplus(&self) -> f64 {
        self.monthly_income - self.total_budgeted_expenses
    }
}

//
// ================= Profile =================
//

/// Read-only snapshot of a user's financial records
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Assets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liabilities: Option<Liabilities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default, alias = "epf", skip_serializing_if = "Option::is_none")]
    pub epf_balance: Option<EpfBalance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<CreditScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investments: Option<Investments>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetRecord>,
}

impl FinancialProfile {
    pub fn has(&self, category: Category) -> bool {
        match category {
            Category::Assets => self.assets.is_some(),
            Category::Liabilities => self.liabilities.is_some(),
            Category::Transactions => self.transactions.is_some(),
            Category::Epf => self.epf_balance.is_some(),
            Category::CreditScore => self.credit_score.is_some(),
            Category::Investments => self.investments.is_some(),
        }
    }

    /// Demonstration profile used when no profile source is configured
    pub fn sample() -> Self {
        let date = |m: u32, d: u32| NaiveDate::from_ymd_opt(2024, m, d).unwrap_or_default();

        Self {
            assets: Some(Assets {
                cash: 5_000.0,
                bank_balance: 25_000.0,
                property_value: 300_000.0,
                total: 330_000.0,
            }),
            liabilities: Some(Liabilities {
                credit_card_debt: 2_500.0,
                personal_loan: 15_000.0,
                mortgage: 200_000.0,
                total: 217_500.0,
            }),
            transactions: Some(vec![
                Transaction {
                    date: date(1, 15),
                    kind: TransactionKind::Income,
                    amount: 5_000.0,
                    description: "Salary".to_string(),
                    category: "income".to_string(),
                },
                Transaction {
                    date: date(1, 14),
                    kind: TransactionKind::Expense,
                    amount: 1_200.0,
                    description: "Rent".to_string(),
                    category: "housing".to_string(),
                },
                Transaction {
                    date: date(1, 13),
                    kind: TransactionKind::Expense,
                    amount: 300.0,
                    description: "Groceries".to_string(),
                    category: "food".to_string(),
                },
            ]),
            epf_balance: Some(EpfBalance {
                employee_contribution: 50_000.0,
                employer_contribution: 50_000.0,
                total: 100_000.0,
                monthly: 2_000.0,
            }),
            credit_score: Some(CreditScore {
                score: 750,
                rating: "Good".to_string(),
                last_updated: Some(date(1, 1)),
            }),
            investments: Some(Investments {
                stocks: vec![StockHolding {
                    symbol: "AAPL".to_string(),
                    shares: 10.0,
                    current_price: 150.0,
                    total_value: 1_500.0,
                }],
                mutual_funds: vec![FundHolding {
                    name: "Tech Growth Fund".to_string(),
                    units: 100.0,
                    nav: 25.5,
                    total_value: 2_550.0,
                }],
                total_value: 4_050.0,
                gain_loss: None,
            }),
            budget: None,
        }
    }
}

/// Sum of transaction amounts of one kind
pub fn sum_kind(transactions: &[Transaction], kind: TransactionKind) -> f64 {
    transactions
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.amount)
        .sum()
}
