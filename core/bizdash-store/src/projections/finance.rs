use bizdash_model::{Transaction, TransactionKind};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::Projection;

/// Totals behind the finance KPIs and cash-flow chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceReport {
    pub income: f64,
    pub expenses: f64,
    /// `income - expenses`.
    pub balance: f64,
    pub expenses_by_category: BTreeMap<String, f64>,
    /// Net per `YYYY-MM`, ascending.
    pub net_by_month: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FinanceSummary;

impl Projection<Transaction> for FinanceSummary {
    type Output = FinanceReport;

    fn project(&self, transactions: &[Transaction]) -> FinanceReport {
        let mut income = 0.0;
        let mut expenses = 0.0;
        let mut expenses_by_category = BTreeMap::new();
        let mut net_by_month = BTreeMap::new();

        for tx in transactions {
            match tx.kind {
                TransactionKind::Income => income += tx.amount,
                TransactionKind::Expense => {
                    expenses += tx.amount;
                    *expenses_by_category.entry(tx.category.clone()).or_insert(0.0) += tx.amount;
                }
            }
            let month = tx.date.format("%Y-%m").to_string();
            *net_by_month.entry(month).or_insert(0.0) += tx.signed_amount();
        }

        FinanceReport {
            income,
            expenses,
            balance: income - expenses,
            expenses_by_category,
            net_by_month,
        }
    }
}
