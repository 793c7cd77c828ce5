use crate::domain::date_range::DateRange;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    pub influx: InfluxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub panels: PanelsConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// Presentation constants and per-panel limits.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PanelsConfig {
    pub indicator_font_size: u32,
    pub indicator_height: u32,
    pub timeout_secs: u64,
    /// Significant digits in bar value labels
    pub value_format_digits: usize,
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            indicator_font_size: 32,
            indicator_height: 200,
            timeout_secs: 10,
            value_format_digits: 2,
        }
    }
}

impl PanelsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Lifetime limits for open page sessions.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionsConfig {
    /// Sessions untouched for this long are reclaimed
    pub idle_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub max_sessions: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: 1800,
            sweep_interval_secs: 60,
            max_sessions: 1000,
        }
    }
}

impl SessionsConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// SQL templates for the six aggregations.
#[derive(Debug, Deserialize, Clone)]
pub struct QueriesConfig {
    pub avg_inventory_price: String,
    pub avg_vehicle_year: String,
    pub avg_vehicle_mileage: String,
    pub make_count: String,
    pub avg_price_by_month: String,
    pub avg_dealership_inventory_size_by_month: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

pub fn load_influx_config() -> anyhow::Result<InfluxConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/influx"))
        .add_source(config::Environment::with_prefix("INFLUX").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_queries_config() -> anyhow::Result<QueriesConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/queries"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Template variables for a date range: `start`, `end` and `end_exclusive`.
pub fn range_vars(range: DateRange) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("start".to_string(), range.start_str());
    vars.insert("end".to_string(), range.end_str());
    vars.insert(
        "end_exclusive".to_string(),
        range.end_exclusive().format("%Y-%m-%d").to_string(),
    );
    vars
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_query() {
        let range = DateRange::parse("2022-01-01", "2022-06-30").unwrap();
        let vars = range_vars(range);

        let query = "SELECT avg(price) AS price FROM inventory WHERE time >= '${start}' AND time < '${end_exclusive}'";
        let result = prepare_query(query, &vars);

        assert_eq!(
            result,
            "SELECT avg(price) AS price FROM inventory WHERE time >= '2022-01-01' AND time < '2022-07-01'"
        );
    }

    #[test]
    fn test_panels_config_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[panels]\ntimeout_secs = 3\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let dashboard: DashboardConfig = settings.try_deserialize().unwrap();

        assert_eq!(dashboard.panels.timeout(), Duration::from_secs(3));
        assert_eq!(dashboard.panels.indicator_font_size, 32);
        assert_eq!(dashboard.panels.indicator_height, 200);
        assert_eq!(dashboard.panels.value_format_digits, 2);
        assert_eq!(dashboard.server.bind, "0.0.0.0:8080");
        assert_eq!(dashboard.sessions.idle_ttl(), Duration::from_secs(1800));
        assert_eq!(dashboard.sessions.max_sessions, 1000);
    }
}
