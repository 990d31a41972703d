use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Revenue,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Revenue => "revenue",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, ThisError)]
#[error("unknown transaction type `{0}`; expected `revenue` or `expense`")]
pub struct UnknownTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revenue" => Ok(TransactionType::Revenue),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(UnknownTransactionType(s.to_string())),
        }
    }
}

impl TryFrom<String> for TransactionType {
    type Error = UnknownTransactionType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A transaction joined with its category and customer names.
#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct TransactionView {
    pub id: i64,
    pub transaction_date: NaiveDate,
    pub description: Option<String>,
    pub amount: Decimal,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub kind: TransactionType,
    pub category_id: i64,
    pub customer_id: Option<i64>,
    pub recurring: bool,
    pub recurring_frequency: Option<String>,
    pub category_name: Option<String>,
    pub customer_name: Option<String>,
}

/// Validated insert payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub transaction_date: NaiveDate,
    pub description: Option<String>,
    pub amount: Decimal,
    pub kind: TransactionType,
    pub category_id: i64,
    pub customer_id: Option<i64>,
    pub recurring: bool,
    pub recurring_frequency: Option<String>,
}

/// Column changes for a partial update. `None` leaves a column untouched;
/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub transaction_date: Option<NaiveDate>,
    pub description: Option<Option<String>>,
    pub amount: Option<Decimal>,
    pub kind: Option<TransactionType>,
    pub category_id: Option<i64>,
    pub customer_id: Option<Option<i64>>,
    pub recurring: Option<bool>,
    pub recurring_frequency: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub business_size: String,
    pub lifetime_value: Decimal,
    pub acquisition_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub category_name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub kind: TransactionType,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewCashflow {
    pub period_date: NaiveDate,
    pub projected_inflow: Decimal,
    pub projected_outflow: Decimal,
    pub actual_inflow: Option<Decimal>,
    pub actual_outflow: Option<Decimal>,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_parses_case_insensitively() {
        assert_eq!("Revenue".parse::<TransactionType>().unwrap(), TransactionType::Revenue);
        assert_eq!(" expense ".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(TransactionPatch::default().is_empty());
        let patch = TransactionPatch {
            description: Some(None),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
