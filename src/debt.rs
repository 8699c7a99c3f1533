//! Debt payoff scheduling
//!
//! Two schedules are produced from the same surplus: an enhanced snowball
//! that borrows a temporary boost for the credit card phase, and a
//! conservative one that uses the plain surplus throughout. The mortgage is
//! reported but never enters the payoff horizon.

use serde::Serialize;

use crate::error::DebtPlanError;
use crate::models::{BudgetRecord, Liabilities};

/// Monthly surplus assumed when no budget record is visible
pub const FALLBACK_MONTHLY_SURPLUS: f64 = 1_000.0;

/// Extra monthly payment taken from the emergency fund during phase 1
pub const TEMPORARY_BOOST: f64 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayoffSchedule {
    pub phase1_months: f64,
    pub phase2_months: f64,
    pub total_months: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurplusSource {
    Budget,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtPlan {
    pub credit_card_debt: f64,
    pub personal_loan: f64,
    pub mortgage: f64,
    pub high_priority_debt: f64,
    pub monthly_surplus: f64,
    pub surplus_source: SurplusSource,
    /// Phase 1 payment of the enhanced method
    pub boosted_payment: f64,
    pub enhanced: PayoffSchedule,
    pub conservative: PayoffSchedule,
}

pub struct DebtStrategyPlanner;

impl DebtStrategyPlanner {
    /// Budget surplus when a record is visible, otherwise the fallback estimate
    pub fn monthly_surplus(budget: Option<&BudgetRecord>) -> (f64, SurplusSource) {
        match budget {
            Some(record) => (record.surplus(), SurplusSource::Budget),
            None => (FALLBACK_MONTHLY_SURPLUS, SurplusSource::Fallback),
        }
    }

    pub fn plan(
        liabilities: &Liabilities,
        budget: Option<&BudgetRecord>,
    ) -> Result<DebtPlan, DebtPlanError> {
        let (surplus, source) = Self::monthly_surplus(budget);
        Self::plan_with_surplus(liabilities, surplus, source)
    }

    pub fn plan_with_surplus(
        liabilities: &Liabilities,
        surplus: f64,
        source: SurplusSource,
    ) -> Result<DebtPlan, DebtPlanError> {
        if surplus <= 0.0 || !surplus.is_finite() {
            return Err(DebtPlanError::NonPositiveSurplus(surplus));
        }

        let cc = liabilities.credit_card_debt;
        let pl = liabilities.personal_loan;
        let boosted = surplus + TEMPORARY_BOOST;

        let enhanced = schedule(cc / boosted, pl / surplus);
        let conservative = schedule(cc / surplus, pl / surplus);

        Ok(DebtPlan {
            credit_card_debt: cc,
            personal_loan: pl,
            mortgage: liabilities.mortgage,
            high_priority_debt: cc + pl,
            monthly_surplus: surplus,
            surplus_source: source,
            boosted_payment: boosted,
            enhanced,
            conservative,
        })
    }
}

fn schedule(phase1_months: f64, phase2_months: f64) -> PayoffSchedule {
    PayoffSchedule {
        phase1_months,
        phase2_months,
        total_months: phase1_months + phase2_months,
    }
}
