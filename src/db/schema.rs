//! SQL DDL for the dashboard schema (MySQL / MariaDB).

/// Tables, in foreign-key order:
/// - `categories`: revenue and expense categories, keyed by `type`
/// - `customers`: `business_size` drives segmentation, `lifetime_value` the LTV charts
/// - `transactions`: `amount` is always positive; `type` carries the sign
/// - `sales_pipeline`: one row per deal per stage it entered
/// - `cashflow`, `kpi_metrics`: `customer_id` NULL means company-wide
pub const MYSQL_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    category_name VARCHAR(100) NOT NULL,
    type ENUM('revenue', 'expense') NOT NULL,
    UNIQUE KEY uq_categories_name_type (category_name, type)
);

CREATE TABLE IF NOT EXISTS customers (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NULL,
    business_size VARCHAR(50) NOT NULL,
    lifetime_value DECIMAL(15, 2) NOT NULL DEFAULT 0,
    acquisition_date DATE NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS transactions (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    transaction_date DATE NOT NULL,
    description VARCHAR(255) NULL,
    amount DECIMAL(15, 2) NOT NULL,
    type ENUM('revenue', 'expense') NOT NULL,
    category_id BIGINT NOT NULL,
    customer_id BIGINT NULL,
    recurring BOOLEAN NOT NULL DEFAULT FALSE,
    recurring_frequency VARCHAR(20) NULL,
    CONSTRAINT fk_transactions_category FOREIGN KEY (category_id) REFERENCES categories (id),
    CONSTRAINT fk_transactions_customer FOREIGN KEY (customer_id) REFERENCES customers (id) ON DELETE SET NULL,
    INDEX idx_transactions_date (transaction_date),
    INDEX idx_transactions_type_date (type, transaction_date)
);

CREATE TABLE IF NOT EXISTS sales_pipeline (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    stage_name VARCHAR(50) NOT NULL,
    stage_order INT NOT NULL,
    customer_id BIGINT NULL,
    entry_date DATE NOT NULL,
    exit_date DATE NULL,
    value DECIMAL(15, 2) NOT NULL DEFAULT 0,
    converted BOOLEAN NOT NULL DEFAULT FALSE,
    CONSTRAINT fk_pipeline_customer FOREIGN KEY (customer_id) REFERENCES customers (id) ON DELETE SET NULL,
    INDEX idx_pipeline_stage (stage_order)
);

CREATE TABLE IF NOT EXISTS cashflow (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    period_date DATE NOT NULL,
    projected_inflow DECIMAL(15, 2) NOT NULL,
    projected_outflow DECIMAL(15, 2) NOT NULL,
    actual_inflow DECIMAL(15, 2) NULL,
    actual_outflow DECIMAL(15, 2) NULL,
    notes VARCHAR(255) NULL,
    customer_id BIGINT NULL,
    CONSTRAINT fk_cashflow_customer FOREIGN KEY (customer_id) REFERENCES customers (id) ON DELETE CASCADE,
    INDEX idx_cashflow_period (period_date)
);

CREATE TABLE IF NOT EXISTS kpi_metrics (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    metric_name VARCHAR(100) NOT NULL,
    metric_value DECIMAL(15, 2) NOT NULL,
    target_value DECIMAL(15, 2) NOT NULL,
    metric_type VARCHAR(50) NOT NULL,
    description VARCHAR(255) NULL,
    metric_date DATE NOT NULL,
    customer_id BIGINT NULL,
    CONSTRAINT fk_kpi_customer FOREIGN KEY (customer_id) REFERENCES customers (id) ON DELETE CASCADE,
    INDEX idx_kpi_date (metric_date)
);
"#;

/// Individual statements of [`MYSQL_INIT`]; sqlx runs one statement per query.
pub fn statements() -> impl Iterator<Item = &'static str> {
    MYSQL_INIT
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_is_created_once() {
        let stmts: Vec<_> = statements().collect();
        assert_eq!(stmts.len(), 6);
        for table in [
            "categories",
            "customers",
            "transactions",
            "sales_pipeline",
            "cashflow",
            "kpi_metrics",
        ] {
            let needle = format!("CREATE TABLE IF NOT EXISTS {table} (");
            assert_eq!(stmts.iter().filter(|s| s.contains(&needle)).count(), 1);
        }
    }
}
