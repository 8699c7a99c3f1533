//! Response Synthesizer - turns an intent and a privacy view into text
//!
//! Every branch reads only from the [`ProfileView`], so a category the user
//! has not granted produces the same "not available" answer as one that was
//! never recorded. Recommendation blocks are appended after the answer for
//! the intents that carry one.

use std::collections::BTreeMap;

use crate::budget::build_budget_for_view;
use crate::classifier::{
    AssetsFacet, EpfFacet, Intent, InvestmentsFacet, LiabilitiesFacet, TransactionsFacet,
};
use crate::debt::{DebtStrategyPlanner, TEMPORARY_BOOST};
use crate::error::DebtPlanError;
use crate::format::{money, money_whole, months, percent, render};
use crate::insights::{AnalysisContext, Insight, InsightEngine};
use crate::locale::{LocaleBundle, RecommendationCategory};
use crate::models::{sum_kind, TransactionKind};
use crate::privacy::ProfileView;

/// Expense categories listed in a trend answer
pub const TREND_TOP_CATEGORIES: usize = 5;

/// Vacation budgets as a share of monthly income
const VACATION_SAFE: f64 = 0.10;
const VACATION_COMFORTABLE: f64 = 0.20;
const VACATION_LUXURY: f64 = 0.30;

pub struct ResponseSynthesizer {
    insights: InsightEngine,
}

impl Default for ResponseSynthesizer {
    fn default() -> Self {
        Self::new(InsightEngine::new())
    }
}

impl ResponseSynthesizer {
    pub fn new(insights: InsightEngine) -> Self {
        Self { insights }
    }

    pub fn insight_engine(&self) -> &InsightEngine {
        &self.insights
    }

    /// Localized insights over the view
    pub fn insights(&self, view: &ProfileView<'_>, bundle: &LocaleBundle) -> Vec<Insight> {
        let ctx = AnalysisContext {
            view,
            texts: &bundle.insights,
        };
        self.insights.analyze_all(&ctx)
    }

    /// First configured greeting reply of the bundle
    pub fn greeting(bundle: &LocaleBundle) -> String {
        bundle
            .greeting_replies
            .first()
            .cloned()
            .unwrap_or_default()
    }

    pub fn render(&self, intent: Intent, view: &ProfileView<'_>, bundle: &LocaleBundle) -> String {
        let m = &bundle.messages;

        match intent {
            Intent::Greeting => Self::greeting(bundle),
            Intent::InsightsRequest => self.render_insights(view, bundle),
            Intent::AssetsQuery(facet) => match view.assets {
                Some(a) => {
                    let answer = match facet {
                        AssetsFacet::Total => render(&m.assets_total, &[("total", money(a.total))]),
                        AssetsFacet::Cash => render(&m.cash, &[("cash", money(a.cash))]),
                        AssetsFacet::Bank => render(&m.bank, &[("bank", money(a.bank_balance))]),
                        AssetsFacet::Property => {
                            render(&m.property, &[("property", money(a.property_value))])
                        }
                        AssetsFacet::List => render(
                            &m.assets_list,
                            &[
                                ("cash", money(a.cash)),
                                ("bank", money(a.bank_balance)),
                                ("property", money(a.property_value)),
                                ("total", money(a.total)),
                            ],
                        ),
                    };
                    with_block(answer, bundle, RecommendationCategory::Assets)
                }
                None => m.info_na.clone(),
            },
            Intent::DebtStrategy => render_debt(view, bundle),
            Intent::LiabilitiesQuery(facet) => match view.liabilities {
                Some(l) => {
                    let answer = match facet {
                        LiabilitiesFacet::Total => {
                            render(&m.liab_total, &[("total", money(l.total))])
                        }
                        LiabilitiesFacet::CreditCard => {
                            render(&m.liab_cc, &[("credit_card", money(l.credit_card_debt))])
                        }
                        LiabilitiesFacet::PersonalLoan => {
                            render(&m.liab_pl, &[("personal_loan", money(l.personal_loan))])
                        }
                        LiabilitiesFacet::Mortgage => {
                            render(&m.liab_mortgage, &[("mortgage", money(l.mortgage))])
                        }
                        LiabilitiesFacet::List => render(
                            &m.liab_list,
                            &[
                                ("credit_card", money(l.credit_card_debt)),
                                ("personal_loan", money(l.personal_loan)),
                                ("mortgage", money(l.mortgage)),
                                ("total", money(l.total)),
                            ],
                        ),
                    };
                    with_block(answer, bundle, RecommendationCategory::Liabilities)
                }
                None => m.info_na.clone(),
            },
            Intent::CreditScoreQuery => match view.credit_score {
                Some(c) => {
                    let answer = render(
                        &m.credit_score,
                        &[("score", c.score.to_string()), ("rating", c.rating.clone())],
                    );
                    with_block(answer, bundle, RecommendationCategory::CreditScore)
                }
                None => m.info_na.clone(),
            },
            Intent::EpfQuery(facet) => match view.epf_balance {
                Some(e) => match facet {
                    EpfFacet::Total => render(&m.epf_total, &[("total", money(e.total))]),
                    EpfFacet::Contribution => render(
                        &m.epf_contrib,
                        &[
                            ("employee", money(e.employee_contribution)),
                            ("employer", money(e.employer_contribution)),
                        ],
                    ),
                    EpfFacet::Balance => render(&m.epf_balance, &[("total", money(e.total))]),
                },
                None => m.info_na.clone(),
            },
            Intent::InvestmentsQuery(facet) => {
                let answer = match (view.investments, facet) {
                    (Some(i), InvestmentsFacet::Total) => {
                        render(&m.invest_total, &[("total", money(i.total_value))])
                    }
                    (Some(i), InvestmentsFacet::GainLoss) => match i.gain_loss {
                        Some(gl) => render(&m.invest_gl, &[("gain_loss", money(gl))]),
                        None => return m.info_na.clone(),
                    },
                    (None, _) => return m.info_na.clone(),
                };
                with_block(answer, bundle, RecommendationCategory::Investments)
            }
            Intent::ExpenseTrendQuery => render_expense_trend(view, bundle),
            Intent::TransactionsQuery(facet) => match view.transactions {
                Some(txs) => {
                    let income = money(sum_kind(txs, TransactionKind::Income));
                    let expenses = money(sum_kind(txs, TransactionKind::Expense));
                    let answer = match facet {
                        TransactionsFacet::ExpenseTotal => {
                            render(&m.tx_exp_total, &[("expenses", expenses)])
                        }
                        TransactionsFacet::IncomeTotal => {
                            render(&m.tx_inc_total, &[("income", income)])
                        }
                        TransactionsFacet::Summary => render(
                            &m.tx_summary,
                            &[("income", income), ("expenses", expenses)],
                        ),
                    };
                    with_block(answer, bundle, RecommendationCategory::Spending)
                }
                None => m.info_na.clone(),
            },
            Intent::NetWorthQuery => match (view.assets, view.liabilities) {
                (Some(a), Some(l)) => {
                    let answer = render(&m.net_worth, &[("net_worth", money(a.total - l.total))]);
                    with_block(answer, bundle, RecommendationCategory::Savings)
                }
                _ => m.info_na.clone(),
            },
            Intent::VacationPlanning => render_vacation(view, bundle),
            Intent::BudgetCreation => render_budget(view, bundle),
            Intent::GeneralGuidance => m.general_guidance.clone(),
        }
    }

    /// Bulleted insight list, or the "not available" note when nothing applies
    pub fn render_insights(&self, view: &ProfileView<'_>, bundle: &LocaleBundle) -> String {
        let m = &bundle.messages;
        let insights = self.insights(view, bundle);

        if insights.is_empty() {
            return format!("{}\n\n{}", m.info_na, m.no_insights);
        }

        let lines: Vec<String> = insights
            .iter()
            .map(|i| {
                render(
                    &m.insight_line,
                    &[
                        ("title", i.title.clone()),
                        ("description", i.description.clone()),
                        ("recommendation", i.recommendation.clone()),
                    ],
                )
            })
            .collect();

        format!("{}\n\n{}", m.insights_header, lines.join("\n\n"))
    }
}

fn with_block(answer: String, bundle: &LocaleBundle, category: RecommendationCategory) -> String {
    format!("{}\n{}", answer, bundle.recommendations.block(category))
}

fn render_debt(view: &ProfileView<'_>, bundle: &LocaleBundle) -> String {
    let m = &bundle.messages;
    let Some(liabilities) = view.liabilities else {
        return m.debt_guidance.clone();
    };

    match DebtStrategyPlanner::plan(liabilities, view.budget) {
        Ok(plan) => render(
            &m.debt_plan,
            &[
                ("credit_card", money(plan.credit_card_debt)),
                ("personal_loan", money(plan.personal_loan)),
                ("mortgage", money(plan.mortgage)),
                ("high_priority", money(plan.high_priority_debt)),
                ("surplus", money(plan.monthly_surplus)),
                ("boosted", money(plan.boosted_payment)),
                ("boost", money(TEMPORARY_BOOST)),
                ("phase1", months(plan.enhanced.phase1_months)),
                ("phase2", months(plan.enhanced.phase2_months)),
                ("total", months(plan.enhanced.total_months)),
                ("alt_phase1", months(plan.conservative.phase1_months)),
                ("alt_phase2", months(plan.conservative.phase2_months)),
                ("alt_total", months(plan.conservative.total_months)),
            ],
        ),
        Err(DebtPlanError::NonPositiveSurplus(surplus)) => {
            tracing::debug!(surplus, "Debt plan needs a positive monthly surplus");
            render(&m.debt_needs_budget, &[("surplus", money(surplus))])
        }
    }
}

fn render_expense_trend(view: &ProfileView<'_>, bundle: &LocaleBundle) -> String {
    let m = &bundle.messages;
    let Some(transactions) = view.transactions else {
        return m.info_na.clone();
    };

    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Expense)
    {
        *by_category.entry(tx.category.as_str()).or_default() += tx.amount;
    }
    let total: f64 = by_category.values().sum();

    // Largest first; the map order breaks ties by name
    let mut ranked: Vec<(&str, f64)> = by_category.iter().map(|(c, a)| (*c, *a)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let lines: Vec<String> = ranked
        .iter()
        .take(TREND_TOP_CATEGORIES)
        .map(|(category, amount)| {
            let share = if total > 0.0 { amount / total * 100.0 } else { 0.0 };
            render(
                &m.expense_trend_line,
                &[
                    ("category", title_case(category)),
                    ("amount", money(*amount)),
                    ("share", percent(share)),
                ],
            )
        })
        .collect();

    let spent = |name: &str| money(by_category.get(name).copied().unwrap_or(0.0));

    render(
        &m.expense_trend,
        &[
            ("total", money(total)),
            ("categories", lines.join("\n")),
            ("housing", spent("housing")),
            ("food", spent("food")),
            ("transport", spent("transport")),
        ],
    )
}

fn render_vacation(view: &ProfileView<'_>, bundle: &LocaleBundle) -> String {
    let m = &bundle.messages;

    let detail = match view.budget {
        Some(b) => render(
            &m.vacation_budget,
            &[
                ("income", money(b.monthly_income)),
                ("expenses", money(b.total_budgeted_expenses)),
                ("surplus", money(b.surplus())),
                ("safe", money_whole(b.monthly_income * VACATION_SAFE)),
                (
                    "comfortable",
                    money_whole(b.monthly_income * VACATION_COMFORTABLE),
                ),
                ("luxury", money_whole(b.monthly_income * VACATION_LUXURY)),
            ],
        ),
        None => m.vacation_general.clone(),
    };

    format!("{}\n{}", m.vacation_guide, detail)
}

fn render_budget(view: &ProfileView<'_>, bundle: &LocaleBundle) -> String {
    let plan = build_budget_for_view(view);
    let a = plan.allocations;
    let (n, w, s) = (
        a.needs.categories,
        a.wants.categories,
        a.savings_debt.categories,
    );

    render(
        &bundle.messages.budget_plan,
        &[
            ("income", money_whole(plan.monthly_income)),
            ("needs", money_whole(a.needs.amount)),
            ("wants", money_whole(a.wants.amount)),
            ("savings", money_whole(a.savings_debt.amount)),
            ("housing", money_whole(n.housing)),
            ("utilities", money_whole(n.utilities)),
            ("groceries", money_whole(n.groceries)),
            ("transportation", money_whole(n.transportation)),
            ("insurance", money_whole(n.insurance)),
            ("entertainment", money_whole(w.entertainment)),
            ("hobbies", money_whole(w.hobbies)),
            ("shopping", money_whole(w.shopping)),
            ("travel", money_whole(w.travel)),
            ("emergency_fund", money_whole(s.emergency_fund)),
            ("debt_payment", money_whole(s.debt_payment)),
            ("investments", money_whole(s.investments)),
        ],
    )
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
