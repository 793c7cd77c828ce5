// Repository trait for inventory aggregates
use crate::domain::date_range::DateRange;
use crate::domain::inventory::{MakeCount, MonthlyInventorySize, MonthlyPrice};
use async_trait::async_trait;

/// Aggregation queries over the vehicle inventory. Every call covers the
/// inclusive `range`; scalar queries return `None` when no listing falls in it.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Mean listing price
    async fn avg_inventory_price(&self, range: DateRange) -> anyhow::Result<Option<f64>>;

    /// Mean model year
    async fn avg_vehicle_year(&self, range: DateRange) -> anyhow::Result<Option<f64>>;

    /// Mean odometer reading
    async fn avg_vehicle_mileage(&self, range: DateRange) -> anyhow::Result<Option<f64>>;

    /// Listing count per make, in the order the store ranks them
    async fn make_count(&self, range: DateRange) -> anyhow::Result<Vec<MakeCount>>;

    /// Mean price per calendar month, chronological
    async fn avg_price_by_month(&self, range: DateRange) -> anyhow::Result<Vec<MonthlyPrice>>;

    /// Mean listings per dealership per calendar month, chronological
    async fn avg_dealership_inventory_size_by_month(
        &self,
        range: DateRange,
    ) -> anyhow::Result<Vec<MonthlyInventorySize>>;
}

#[cfg(test)]
pub mod stub {
    //! In-memory repository for tests.
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    pub struct StubRepository {
        pub price: Option<f64>,
        pub year: Option<f64>,
        pub mileage: Option<f64>,
        pub makes: Vec<MakeCount>,
        pub monthly_prices: Vec<MonthlyPrice>,
        pub monthly_sizes: Vec<MonthlyInventorySize>,
        /// Query names that fail with an upstream error.
        pub failing: Vec<&'static str>,
        /// Query names that never answer within a test's lifetime.
        pub hanging: Vec<&'static str>,
        /// Added latency for a specific range start.
        pub slow_start: Option<(chrono::NaiveDate, Duration)>,
        pub calls: Mutex<Vec<(&'static str, DateRange)>>,
    }

    impl StubRepository {
        pub fn calls(&self) -> Vec<(&'static str, DateRange)> {
            self.calls.lock().unwrap().clone()
        }

        async fn enter(&self, name: &'static str, range: DateRange) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push((name, range));

            if let Some((start, delay)) = self.slow_start {
                if range.start == start {
                    tokio::time::sleep(delay).await;
                }
            }
            if self.hanging.contains(&name) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.failing.contains(&name) {
                anyhow::bail!("{} unavailable", name);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl InventoryRepository for StubRepository {
        async fn avg_inventory_price(&self, range: DateRange) -> anyhow::Result<Option<f64>> {
            self.enter("avg_inventory_price", range).await?;
            Ok(self.price)
        }

        async fn avg_vehicle_year(&self, range: DateRange) -> anyhow::Result<Option<f64>> {
            self.enter("avg_vehicle_year", range).await?;
            Ok(self.year)
        }

        async fn avg_vehicle_mileage(&self, range: DateRange) -> anyhow::Result<Option<f64>> {
            self.enter("avg_vehicle_mileage", range).await?;
            Ok(self.mileage)
        }

        async fn make_count(&self, range: DateRange) -> anyhow::Result<Vec<MakeCount>> {
            self.enter("make_count", range).await?;
            Ok(self.makes.clone())
        }

        async fn avg_price_by_month(&self, range: DateRange) -> anyhow::Result<Vec<MonthlyPrice>> {
            self.enter("avg_price_by_month", range).await?;
            Ok(self.monthly_prices.clone())
        }

        async fn avg_dealership_inventory_size_by_month(
            &self,
            range: DateRange,
        ) -> anyhow::Result<Vec<MonthlyInventorySize>> {
            self.enter("avg_dealership_inventory_size_by_month", range).await?;
            Ok(self.monthly_sizes.clone())
        }
    }
}
