//! Query strings and bodies accepted by the `/api/transactions` endpoints.

use crate::db::TransactionFilter;
use crate::db::models::{NewTransaction, TransactionPatch, TransactionType};
use crate::error::DashboardError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 1000;

/// Raw query-string values; validated by [`TransactionQuery::into_filter`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub customer: Option<String>,
}

/// Validated listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionListing {
    pub filter: TransactionFilter,
    pub limit: i64,
    pub offset: i64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(name: &str, value: Option<String>) -> Result<Option<NaiveDate>, DashboardError> {
    non_empty(value)
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|_| {
                DashboardError::bad_request(format!("`{name}` must be a date in YYYY-MM-DD form"))
            })
        })
        .transpose()
}

fn parse_int(name: &str, value: Option<String>, default: i64) -> Result<i64, DashboardError> {
    match non_empty(value) {
        None => Ok(default),
        Some(v) => v
            .parse::<i64>()
            .map_err(|_| DashboardError::bad_request(format!("`{name}` must be an integer"))),
    }
}

fn parse_kind(value: &str) -> Result<TransactionType, DashboardError> {
    value
        .parse::<TransactionType>()
        .map_err(|e| DashboardError::bad_request(e.to_string()))
}

impl TransactionQuery {
    pub fn into_filter(self) -> Result<TransactionListing, DashboardError> {
        let limit = parse_int("limit", self.limit, DEFAULT_LIMIT)?;
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(DashboardError::bad_request(format!(
                "`limit` must be between 1 and {MAX_LIMIT}"
            )));
        }
        let offset = parse_int("offset", self.offset, 0)?;
        if offset < 0 {
            return Err(DashboardError::bad_request("`offset` must not be negative"));
        }

        let kind = non_empty(self.kind).as_deref().map(parse_kind).transpose()?;
        let start_date = parse_date("startDate", self.start_date)?;
        let end_date = parse_date("endDate", self.end_date)?;
        if let (Some(start), Some(end)) = (start_date, end_date)
            && start > end
        {
            return Err(DashboardError::bad_request(
                "`startDate` must not be after `endDate`",
            ));
        }

        Ok(TransactionListing {
            filter: TransactionFilter {
                kind,
                start_date,
                end_date,
                category: non_empty(self.category),
                customer: non_empty(self.customer),
                customer_id: None,
            },
            limit,
            offset,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTransactionBody {
    pub transaction_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category_id: Option<i64>,
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub recurring: bool,
    pub recurring_frequency: Option<String>,
}

fn check_amount(amount: Decimal) -> Result<Decimal, DashboardError> {
    if amount <= Decimal::ZERO {
        return Err(DashboardError::bad_request("`amount` must be positive"));
    }
    Ok(amount)
}

impl CreateTransactionBody {
    pub fn validate(self) -> Result<NewTransaction, DashboardError> {
        let (Some(transaction_date), Some(amount), Some(kind), Some(category_id)) = (
            self.transaction_date,
            self.amount,
            non_empty(self.kind),
            self.category_id,
        ) else {
            return Err(DashboardError::bad_request(
                "Missing required fields: transaction_date, amount, type, and category_id are required",
            ));
        };

        Ok(NewTransaction {
            transaction_date,
            description: non_empty(self.description),
            amount: check_amount(amount)?,
            kind: parse_kind(&kind)?,
            category_id,
            customer_id: self.customer_id,
            recurring: self.recurring,
            recurring_frequency: non_empty(self.recurring_frequency),
        })
    }
}

/// Distinguishes an absent member (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchTransactionBody {
    pub transaction_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_id: Option<Option<i64>>,
    pub recurring: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub recurring_frequency: Option<Option<String>>,
}

impl PatchTransactionBody {
    pub fn validate(self) -> Result<TransactionPatch, DashboardError> {
        Ok(TransactionPatch {
            transaction_date: self.transaction_date,
            description: self.description.map(non_empty),
            amount: self.amount.map(check_amount).transpose()?,
            kind: self.kind.as_deref().map(parse_kind).transpose()?,
            category_id: self.category_id,
            customer_id: self.customer_id,
            recurring: self.recurring,
            recurring_frequency: self.recurring_frequency.map(non_empty),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn listing_defaults() {
        let listing = TransactionQuery::default().into_filter().unwrap();
        assert_eq!(listing.limit, DEFAULT_LIMIT);
        assert_eq!(listing.offset, 0);
        assert_eq!(listing.filter, TransactionFilter::default());
    }

    #[test]
    fn listing_parses_all_filters() {
        let query = TransactionQuery {
            limit: Some("20".into()),
            offset: Some("40".into()),
            kind: Some("revenue".into()),
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-03-31".into()),
            category: Some(" Consulting ".into()),
            customer: Some("".into()),
        };
        let listing = query.into_filter().unwrap();
        assert_eq!(listing.limit, 20);
        assert_eq!(listing.offset, 40);
        assert_eq!(listing.filter.kind, Some(TransactionType::Revenue));
        assert_eq!(listing.filter.category.as_deref(), Some("Consulting"));
        assert_eq!(listing.filter.customer, None);
    }

    #[test]
    fn listing_rejects_bad_input() {
        let bad = [
            TransactionQuery { kind: Some("refund".into()), ..Default::default() },
            TransactionQuery { limit: Some("0".into()), ..Default::default() },
            TransactionQuery { limit: Some("ten".into()), ..Default::default() },
            TransactionQuery { offset: Some("-1".into()), ..Default::default() },
            TransactionQuery { start_date: Some("01/02/2024".into()), ..Default::default() },
            TransactionQuery {
                start_date: Some("2024-05-01".into()),
                end_date: Some("2024-04-01".into()),
                ..Default::default()
            },
        ];
        for query in bad {
            assert!(matches!(query.into_filter(), Err(DashboardError::BadRequest(_))));
        }
    }

    #[test]
    fn create_requires_core_fields() {
        let body: CreateTransactionBody =
            serde_json::from_str(r#"{"amount": 100, "type": "revenue"}"#).unwrap();
        let err = body.validate().unwrap_err();
        assert!(err.to_string().starts_with("Missing required fields"));
    }

    #[test]
    fn create_validates_type_and_amount() {
        let body: CreateTransactionBody = serde_json::from_str(
            r#"{"transaction_date": "2024-02-01", "amount": 250.5, "type": "expense", "category_id": 3}"#,
        )
        .unwrap();
        let tx = body.validate().unwrap();
        assert_eq!(tx.amount, dec!(250.5));
        assert_eq!(tx.kind, TransactionType::Expense);
        assert!(!tx.recurring);

        let negative: CreateTransactionBody = serde_json::from_str(
            r#"{"transaction_date": "2024-02-01", "amount": -5, "type": "expense", "category_id": 3}"#,
        )
        .unwrap();
        assert!(negative.validate().is_err());
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let body: PatchTransactionBody =
            serde_json::from_str(r#"{"customer_id": null, "amount": 10}"#).unwrap();
        let patch = body.validate().unwrap();
        assert_eq!(patch.customer_id, Some(None));
        assert_eq!(patch.description, None);
        assert_eq!(patch.amount, Some(dec!(10)));
    }

    #[test]
    fn patch_blank_strings_clear_like_create() {
        let body: PatchTransactionBody = serde_json::from_str(
            r#"{"description": "  ", "recurring_frequency": "", "amount": 3}"#,
        )
        .unwrap();
        let patch = body.validate().unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.recurring_frequency, Some(None));

        let body: PatchTransactionBody =
            serde_json::from_str(r#"{"description": " Retainer "}"#).unwrap();
        assert_eq!(
            body.validate().unwrap().description,
            Some(Some("Retainer".to_string()))
        );
    }

    #[test]
    fn empty_patch_body_is_empty_patch() {
        let body: PatchTransactionBody = serde_json::from_str("{}").unwrap();
        assert!(body.validate().unwrap().is_empty());
    }
}
