use crate::db::models::{NewTransaction, TransactionPatch, TransactionType, TransactionView};
use crate::db::mysql::MySqlPool;
use crate::error::DashboardError;
use chrono::NaiveDate;
use sqlx::{MySql, QueryBuilder};

const VIEW_COLUMNS: &str = r#"SELECT
    t.id, t.transaction_date, t.description, t.amount, t.type,
    t.category_id, t.customer_id, t.recurring, t.recurring_frequency,
    cat.category_name, cu.name AS customer_name"#;

const VIEW_FROM: &str = r#"
FROM transactions t
LEFT JOIN categories cat ON cat.id = t.category_id
LEFT JOIN customers cu ON cu.id = t.customer_id"#;

/// Predicates for listing transactions. Every field is optional and ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Substring of the category name.
    pub category: Option<String>,
    /// Substring of the customer name.
    pub customer: Option<String>,
    pub customer_id: Option<i64>,
}

impl TransactionFilter {
    pub fn for_customer(customer_id: Option<i64>) -> Self {
        Self {
            customer_id,
            ..Default::default()
        }
    }

    fn push_conditions(&self, qb: &mut QueryBuilder<'static, MySql>) {
        let mut keyword = " WHERE ";
        let mut next = |qb: &mut QueryBuilder<'static, MySql>| {
            qb.push(keyword);
            keyword = " AND ";
        };

        if let Some(kind) = self.kind {
            next(qb);
            qb.push("t.type = ").push_bind(kind.as_str());
        }
        if let Some(start) = self.start_date {
            next(qb);
            qb.push("t.transaction_date >= ").push_bind(start);
        }
        if let Some(end) = self.end_date {
            next(qb);
            qb.push("t.transaction_date <= ").push_bind(end);
        }
        if let Some(category) = &self.category {
            next(qb);
            qb.push("cat.category_name LIKE ")
                .push_bind(like_pattern(category));
        }
        if let Some(customer) = &self.customer {
            next(qb);
            qb.push("cu.name LIKE ").push_bind(like_pattern(customer));
        }
        if let Some(customer_id) = self.customer_id {
            next(qb);
            qb.push("t.customer_id = ").push_bind(customer_id);
        }
    }

    pub fn list_query(&self, limit: i64, offset: i64) -> QueryBuilder<'static, MySql> {
        let mut qb = QueryBuilder::new(VIEW_COLUMNS);
        qb.push(VIEW_FROM);
        self.push_conditions(&mut qb);
        qb.push(" ORDER BY t.transaction_date DESC, t.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        qb
    }

    /// Same joins and predicates as [`Self::list_query`], without paging.
    pub fn count_query(&self) -> QueryBuilder<'static, MySql> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*)");
        qb.push(VIEW_FROM);
        self.push_conditions(&mut qb);
        qb
    }
}

/// `%needle%` with LIKE metacharacters escaped.
fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[derive(Clone)]
pub struct TransactionsStorage {
    pool: MySqlPool,
}

impl TransactionsStorage {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// One page of matching transactions plus the total match count.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TransactionView>, i64), DashboardError> {
        let mut rows_q = filter.list_query(limit, offset);
        let mut count_q = filter.count_query();
        let (rows, total) = tokio::try_join!(
            rows_q.build_query_as::<TransactionView>().fetch_all(&self.pool),
            count_q.build_query_scalar::<i64>().fetch_one(&self.pool),
        )?;
        Ok((rows, total))
    }

    /// Newest `limit` transactions, optionally for one customer.
    pub async fn recent(
        &self,
        limit: i64,
        customer_id: Option<i64>,
    ) -> Result<Vec<TransactionView>, DashboardError> {
        let mut qb = TransactionFilter::for_customer(customer_id).list_query(limit.max(1), 0);
        let rows = qb
            .build_query_as::<TransactionView>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, id: i64) -> Result<TransactionView, DashboardError> {
        self.find(id)
            .await?
            .ok_or_else(|| DashboardError::not_found(format!("Transaction with ID {id} not found")))
    }

    pub async fn find(&self, id: i64) -> Result<Option<TransactionView>, DashboardError> {
        let sql = format!("{VIEW_COLUMNS}{VIEW_FROM} WHERE t.id = ?");
        let row = sqlx::query_as::<_, TransactionView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert and return the stored row.
    pub async fn create(&self, tx: NewTransaction) -> Result<TransactionView, DashboardError> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (
                transaction_date, description, amount, type,
                category_id, customer_id, recurring, recurring_frequency
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tx.transaction_date)
        .bind(tx.description)
        .bind(tx.amount)
        .bind(tx.kind.as_str())
        .bind(tx.category_id)
        .bind(tx.customer_id)
        .bind(tx.recurring)
        .bind(tx.recurring_frequency)
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_id() as i64).await
    }

    /// Apply the supplied columns. Returns `None` when the row does not exist.
    pub async fn update(
        &self,
        id: i64,
        patch: TransactionPatch,
    ) -> Result<Option<TransactionView>, DashboardError> {
        if patch.is_empty() {
            return self.find(id).await;
        }

        let mut qb = update_query(id, patch);
        qb.build().execute(&self.pool).await?;
        self.find(id).await
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, DashboardError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn update_query(id: i64, patch: TransactionPatch) -> QueryBuilder<'static, MySql> {
    let mut qb = QueryBuilder::new("UPDATE transactions SET ");
    let mut set = qb.separated(", ");
    if let Some(date) = patch.transaction_date {
        set.push("transaction_date = ").push_bind_unseparated(date);
    }
    if let Some(description) = patch.description {
        set.push("description = ").push_bind_unseparated(description);
    }
    if let Some(amount) = patch.amount {
        set.push("amount = ").push_bind_unseparated(amount);
    }
    if let Some(kind) = patch.kind {
        set.push("type = ").push_bind_unseparated(kind.as_str());
    }
    if let Some(category_id) = patch.category_id {
        set.push("category_id = ").push_bind_unseparated(category_id);
    }
    if let Some(customer_id) = patch.customer_id {
        set.push("customer_id = ").push_bind_unseparated(customer_id);
    }
    if let Some(recurring) = patch.recurring {
        set.push("recurring = ").push_bind_unseparated(recurring);
    }
    if let Some(frequency) = patch.recurring_frequency {
        set.push("recurring_frequency = ").push_bind_unseparated(frequency);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unfiltered_list_has_no_where_clause() {
        let qb = TransactionFilter::default().list_query(50, 0);
        assert!(!qb.sql().contains("WHERE"));
        assert!(qb.sql().ends_with("LIMIT ? OFFSET ?"));
    }

    #[test]
    fn filters_are_anded_in_order() {
        let filter = TransactionFilter {
            kind: Some(TransactionType::Revenue),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            category: Some("Consult".into()),
            ..Default::default()
        };
        let sql = filter.list_query(10, 20).into_sql();
        assert!(sql.contains(
            "WHERE t.type = ? AND t.transaction_date >= ? AND cat.category_name LIKE ?"
        ));
        assert!(!sql.contains("cu.name LIKE"));
    }

    #[test]
    fn count_query_shares_where_clause() {
        let filter = TransactionFilter {
            customer: Some("Acme".into()),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
            ..Default::default()
        };
        let list = filter.list_query(10, 0).into_sql();
        let count = filter.count_query().into_sql();
        let where_clause = &count[count.find(" WHERE").unwrap()..];
        assert!(list.contains(where_clause));
        assert!(!count.contains("LIMIT"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern("Acme"), "%Acme%");
    }

    #[test]
    fn update_sets_only_supplied_columns() {
        let patch = TransactionPatch {
            amount: Some(dec!(12.50)),
            customer_id: Some(None),
            ..Default::default()
        };
        let sql = update_query(7, patch).into_sql();
        assert_eq!(
            sql,
            "UPDATE transactions SET amount = ?, customer_id = ? WHERE id = ?"
        );
    }
}
