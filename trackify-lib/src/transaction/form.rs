use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;
use trackify_repo::transaction_repo::{NewTransaction, TransactionType};

/// Largest amount a single transaction may carry. Keeps per-user totals far
/// inside the range of [Decimal].
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Amount must not be negative")]
    NegativeAmount,
    #[error("Amount must not exceed {}", MAX_AMOUNT)]
    AmountTooLarge,
    #[error("Invalid transaction type: {0}")]
    InvalidType(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Fields of the add-transaction form, exactly as submitted.
#[derive(Deserialize, Debug, Clone)]
pub struct AddTransactionForm {
    pub amount: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
}

impl AddTransactionForm {
    pub fn validate(self) -> Result<NewTransaction, ValidationError> {
        let amount = parse_amount(&self.amount)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::NegativeAmount);
        }
        if amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge);
        }

        let transaction_type = TransactionType::from_str(self.transaction_type.trim())
            .map_err(|_| ValidationError::InvalidType(self.transaction_type.clone()))?;

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(self.date.clone()))?;

        let description = self.description.filter(|d| !d.trim().is_empty());

        Ok(NewTransaction::new(
            amount,
            transaction_type,
            self.category,
            description,
            date,
        ))
    }
}

fn parse_amount(value: &str) -> Result<Decimal, ValidationError> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| match value.parse::<f64>() {
            // numeric, but beyond what Decimal can hold
            Ok(number) if number.is_finite() && number < -1.0 => ValidationError::NegativeAmount,
            Ok(number) if number.is_finite() && number > 1.0 => ValidationError::AmountTooLarge,
            _ => ValidationError::InvalidAmount(value.to_owned()),
        })
}
