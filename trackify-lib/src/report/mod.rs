//! Dashboard and analytics figures, recomputed from a user's transactions on
//! every request.

use crate::auth::RequireSession;
use actix_web::web;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use trackify_repo::transaction_repo::{Transaction, TransactionType};

mod handlers;

const RECENT_LIMIT: usize = 5;

/// Stored amounts too large to total. New transactions are capped well below
/// this, but rows written by other clients are not.
#[derive(Error, Debug, PartialEq)]
#[error("Transaction totals exceed the supported range")]
pub struct TotalOverflow;

fn checked_sum(total: Decimal, amount: Decimal) -> Result<Decimal, TotalOverflow> {
    total.checked_add(amount).ok_or(TotalOverflow)
}

#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct Summary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub savings_projection: Decimal,
    pub recent: Vec<Transaction>,
}

impl Summary {
    pub fn from_transactions(transactions: &[Transaction]) -> Result<Summary, TotalOverflow> {
        let income = total(transactions, TransactionType::Income)?;
        let expenses = total(transactions, TransactionType::Expense)?;

        let mut recent = transactions.to_vec();
        recent.sort_by(|a, b| b.date.cmp(&a.date));
        recent.truncate(RECENT_LIMIT);

        Ok(Summary {
            income,
            expenses,
            balance: income.checked_sub(expenses).ok_or(TotalOverflow)?,
            savings_projection: income.checked_mul(Decimal::new(2, 1)).ok_or(TotalOverflow)?,
            recent,
        })
    }
}

fn total(
    transactions: &[Transaction],
    transaction_type: TransactionType,
) -> Result<Decimal, TotalOverflow> {
    transactions
        .iter()
        .filter(|t| t.transaction_type == transaction_type)
        .try_fold(Decimal::ZERO, |total, t| checked_sum(total, t.amount))
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

/// Expense totals per category, in the order each category first appears.
pub fn category_breakdown(
    transactions: &[Transaction],
) -> Result<Vec<CategoryTotal>, TotalOverflow> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for transaction in transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense)
    {
        match totals
            .iter_mut()
            .find(|c| c.category == transaction.category)
        {
            Some(category_total) => {
                category_total.total = checked_sum(category_total.total, transaction.amount)?
            }
            None => totals.push(CategoryTotal {
                category: transaction.category.clone(),
                total: transaction.amount,
            }),
        }
    }
    Ok(totals)
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
}

pub fn monthly_breakdown(
    transactions: &[Transaction],
) -> Result<Vec<MonthlyTotal>, TotalOverflow> {
    let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for transaction in transactions {
        let month = transaction.date.format("%Y-%m").to_string();
        let (income, expense) = months.entry(month).or_default();
        match transaction.transaction_type {
            TransactionType::Income => *income = checked_sum(*income, transaction.amount)?,
            TransactionType::Expense => *expense = checked_sum(*expense, transaction.amount)?,
        }
    }

    Ok(months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTotal {
            month,
            income,
            expense,
        })
        .collect())
}

pub fn report_service(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/dashboard")
            .wrap(RequireSession::page())
            .route(web::get().to(handlers::dashboard)),
    )
    .service(
        web::resource("/analytics")
            .wrap(RequireSession::page())
            .route(web::get().to(handlers::analytics)),
    );
}
