// InfluxDB repository implementation
use crate::application::inventory_repository::InventoryRepository;
use crate::domain::date_range::DateRange;
use crate::domain::inventory::{MakeCount, MonthlyInventorySize, MonthlyPrice};
use crate::infrastructure::config::{prepare_query, range_vars, QueriesConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

type Row = Map<String, Value>;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    host: String,
    token: String,
    database: String,
    queries: QueriesConfig,
    client: reqwest::Client,
}

impl InfluxRepository {
    pub fn new(host: String, token: String, database: String, queries: QueriesConfig) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            queries,
            client: reqwest::Client::new(),
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        format!(
            "{}/api/v3/query_sql?db={}&format=json&q={}",
            self.host,
            urlencoding::encode(&self.database),
            urlencoding::encode(query)
        )
    }

    async fn execute_query(&self, template: &str, range: DateRange) -> Result<Vec<Row>> {
        let query = prepare_query(template, &range_vars(range));
        let url = self.build_query_url(&query);
        tracing::debug!("Executing inventory query: {}", query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let rows = response
            .json::<Vec<Row>>()
            .await
            .context("Failed to parse InfluxDB response")?;

        tracing::debug!("Got {} rows from InfluxDB", rows.len());
        Ok(rows)
    }

    async fn query_scalar(&self, template: &str, column: &str, range: DateRange) -> Result<Option<f64>> {
        let rows = self.execute_query(template, range).await?;
        Ok(scalar_from_rows(&rows, column))
    }

    async fn query_table<T: DeserializeOwned>(&self, template: &str, range: DateRange) -> Result<Vec<T>> {
        let rows = self.execute_query(template, range).await?;
        rows_into(rows)
    }
}

/// Reads `column` from the first row, or the only value of a single-column
/// row. A missing row or a null aggregate means no data.
fn scalar_from_rows(rows: &[Row], column: &str) -> Option<f64> {
    let row = rows.first()?;
    let value = match row.get(column) {
        Some(value) => value,
        None if row.len() == 1 => row.values().next()?,
        None => return None,
    };
    value.as_f64()
}

fn rows_into<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)).context("Unexpected row shape from InfluxDB"))
        .collect()
}

#[async_trait]
impl InventoryRepository for InfluxRepository {
    async fn avg_inventory_price(&self, range: DateRange) -> Result<Option<f64>> {
        self.query_scalar(&self.queries.avg_inventory_price, "price", range)
            .await
    }

    async fn avg_vehicle_year(&self, range: DateRange) -> Result<Option<f64>> {
        self.query_scalar(&self.queries.avg_vehicle_year, "year", range)
            .await
    }

    async fn avg_vehicle_mileage(&self, range: DateRange) -> Result<Option<f64>> {
        self.query_scalar(&self.queries.avg_vehicle_mileage, "mileage", range)
            .await
    }

    async fn make_count(&self, range: DateRange) -> Result<Vec<MakeCount>> {
        self.query_table(&self.queries.make_count, range).await
    }

    async fn avg_price_by_month(&self, range: DateRange) -> Result<Vec<MonthlyPrice>> {
        self.query_table(&self.queries.avg_price_by_month, range).await
    }

    async fn avg_dealership_inventory_size_by_month(
        &self,
        range: DateRange,
    ) -> Result<Vec<MonthlyInventorySize>> {
        self.query_table(&self.queries.avg_dealership_inventory_size_by_month, range)
            .await
    }
}
