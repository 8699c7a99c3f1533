//! Category-gated view over a financial profile

use serde::Serialize;

use crate::models::{
    AccessGrant, Assets, BudgetRecord, Category, CreditScore, EpfBalance, FinancialProfile,
    Investments, Liabilities, Transaction,
};

/// Borrowed subset of a profile. A category is present only when it is both
/// granted and present in the source profile; callers cannot tell the two
/// cases apart.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProfileView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<&'a Assets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liabilities: Option<&'a Liabilities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<&'a [Transaction]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epf_balance: Option<&'a EpfBalance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<&'a CreditScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investments: Option<&'a Investments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<&'a BudgetRecord>,
}

impl<'a> ProfileView<'a> {
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

    /// Categories exposed by this view, in canonical order
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.has(*c))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.categories().is_empty()
    }

    /// Pretty JSON of the visible records, as handed to the generative backend
    pub fn to_pretty_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct PrivacyFilter;

impl PrivacyFilter {
    pub fn apply<'a>(profile: &'a FinancialProfile, grants: &AccessGrant) -> ProfileView<'a> {
        let gate = |category: Category| grants.allows(category);

        ProfileView {
            assets: profile.assets.as_ref().filter(|_| gate(Category::Assets)),
            liabilities: profile
                .liabilities
                .as_ref()
                .filter(|_| gate(Category::Liabilities)),
            transactions: profile
                .transactions
                .as_deref()
                .filter(|_| gate(Category::Transactions)),
            epf_balance: profile.epf_balance.as_ref().filter(|_| gate(Category::Epf)),
            credit_score: profile
                .credit_score
                .as_ref()
                .filter(|_| gate(Category::CreditScore)),
            investments: profile
                .investments
                .as_ref()
                .filter(|_| gate(Category::Investments)),
            // Budget figures are spending data and ride on the transactions grant
            budget: profile
                .budget
                .as_ref()
                .filter(|_| gate(Category::Transactions)),
        }
    }
}
