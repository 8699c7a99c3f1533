//! 50/30/20 budget template built from transaction totals

use serde::Serialize;

use crate::models::{sum_kind, FinancialProfile, Transaction, TransactionKind};
use crate::privacy::ProfileView;

/// Demonstration income used when no income transactions are visible
pub const DEFAULT_MONTHLY_INCOME: f64 = 5_000.0;

/// Demonstration expenses paired with [`DEFAULT_MONTHLY_INCOME`]
pub const DEFAULT_MONTHLY_EXPENSES: f64 = 3_500.0;

pub const NEEDS_PERCENTAGE: u32 = 50;
pub const WANTS_PERCENTAGE: u32 = 30;
pub const SAVINGS_PERCENTAGE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Allocation<C> {
    pub percentage: u32,
    pub amount: f64,
    pub categories: C,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NeedsBreakdown {
    pub housing: f64,
    pub utilities: f64,
    pub groceries: f64,
    pub transportation: f64,
    pub insurance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WantsBreakdown {
    pub entertainment: f64,
    pub hobbies: f64,
    pub shopping: f64,
    pub travel: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SavingsBreakdown {
    pub emergency_fund: f64,
    pub debt_payment: f64,
    pub investments: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Allocations {
    pub needs: Allocation<NeedsBreakdown>,
    pub wants: Allocation<WantsBreakdown>,
    pub savings_debt: Allocation<SavingsBreakdown>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetPlan {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    /// True when the demonstration figures were substituted
    #[serde(skip)]
    pub uses_defaults: bool,
    pub allocations: Allocations,
}

/// Budget over whatever transactions are available.
///
/// Income and expenses are summed by kind. When no income is found both
/// figures are replaced by the demonstration defaults.
pub fn build_budget(transactions: Option<&[Transaction]>) -> BudgetPlan {
    let (mut income, mut expenses) = transactions
        .map(|txs| {
            (
                sum_kind(txs, TransactionKind::Income),
                sum_kind(txs, TransactionKind::Expense),
            )
        })
        .unwrap_or((0.0, 0.0));

    let uses_defaults = income == 0.0;
    if uses_defaults {
        income = DEFAULT_MONTHLY_INCOME;
        expenses = DEFAULT_MONTHLY_EXPENSES;
    }

    let needs = share(income, NEEDS_PERCENTAGE);
    let wants = share(income, WANTS_PERCENTAGE);
    let savings = share(income, SAVINGS_PERCENTAGE);

    BudgetPlan {
        monthly_income: income,
        monthly_expenses: expenses,
        uses_defaults,
        allocations: Allocations {
            needs: Allocation {
                percentage: NEEDS_PERCENTAGE,
                amount: needs,
                categories: NeedsBreakdown {
                    housing: needs * 0.40,
                    utilities: needs * 0.15,
                    groceries: needs * 0.25,
                    transportation: needs * 0.15,
                    insurance: needs * 0.05,
                },
            },
            wants: Allocation {
                percentage: WANTS_PERCENTAGE,
                amount: wants,
                categories: WantsBreakdown {
                    entertainment: wants * 0.30,
                    hobbies: wants * 0.20,
                    shopping: wants * 0.30,
                    travel: wants * 0.20,
                },
            },
            savings_debt: Allocation {
                percentage: SAVINGS_PERCENTAGE,
                amount: savings,
                categories: SavingsBreakdown {
                    emergency_fund: savings * 0.40,
                    debt_payment: savings * 0.40,
                    investments: savings * 0.20,
                },
            },
        },
    }
}

/// Budget over the privacy-filtered view; hidden transactions count as none
pub fn build_budget_for_view(view: &ProfileView<'_>) -> BudgetPlan {
    build_budget(view.transactions)
}

/// Budget over a whole profile, ignoring grants
pub fn build_budget_for_profile(profile: &FinancialProfile) -> BudgetPlan {
    build_budget(profile.transactions.as_deref())
}

fn share(income: f64, percentage: u32) -> f64 {
    income * f64::from(percentage) / 100.0
}
