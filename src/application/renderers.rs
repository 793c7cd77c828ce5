// Panel renderers - one aggregation query per panel, wrapped in a figure
use crate::application::inventory_repository::InventoryRepository;
use crate::domain::date_range::DateRange;
use crate::domain::format::format_si;
use crate::domain::inventory::{MakeCount, MonthlyInventorySize, MonthlyPrice};
use crate::domain::panel::{
    Bar, BarFigure, Figure, IndicatorFigure, LineFigure, LinePoint, PanelContent, PanelId,
};
use crate::infrastructure::config::PanelsConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("aggregation query failed: {0:#}")]
    Upstream(#[from] anyhow::Error),

    #[error("aggregation query timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Renders one panel for `range`. Failures and timeouts become the panel's
/// error state; they never escape to other panels.
pub async fn render_panel(
    repository: &dyn InventoryRepository,
    panel: PanelId,
    range: DateRange,
    settings: &PanelsConfig,
) -> PanelContent {
    let timeout = settings.timeout();
    let result = match tokio::time::timeout(timeout, render_figure(repository, panel, range, settings)).await {
        Ok(Ok(figure)) => Ok(figure),
        Ok(Err(e)) => Err(PanelError::Upstream(e)),
        Err(_) => Err(PanelError::TimedOut(timeout)),
    };

    match result {
        Ok(figure) => PanelContent::Ready { figure },
        Err(e) => {
            tracing::warn!("Panel {} failed for {}: {}", panel, range, e);
            PanelContent::Error {
                message: e.to_string(),
            }
        }
    }
}

/// Runs [`render_panel`] on its own task so a panicking renderer only takes
/// down its own panel.
pub async fn render_isolated(
    repository: Arc<dyn InventoryRepository>,
    panel: PanelId,
    range: DateRange,
    settings: Arc<PanelsConfig>,
) -> PanelContent {
    let task = tokio::spawn(async move {
        render_panel(repository.as_ref(), panel, range, &settings).await
    });

    match task.await {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("Renderer for {} aborted: {}", panel, e);
            PanelContent::Error {
                message: format!("renderer aborted: {}", e),
            }
        }
    }
}

/// Binding table from panel to its aggregation query and figure builder.
pub async fn render_figure(
    repository: &dyn InventoryRepository,
    panel: PanelId,
    range: DateRange,
    settings: &PanelsConfig,
) -> anyhow::Result<Figure> {
    tracing::debug!("Rendering {} for {}", panel, range);

    let figure = match panel {
        PanelId::AvgInventoryPrice => {
            indicator_figure(panel, repository.avg_inventory_price(range).await?, settings)
        }
        PanelId::AvgInventoryMakeYear => {
            indicator_figure(panel, repository.avg_vehicle_year(range).await?, settings)
        }
        PanelId::AvgInventoryMileage => {
            indicator_figure(panel, repository.avg_vehicle_mileage(range).await?, settings)
        }
        PanelId::MakeCountBarChart => {
            make_count_figure(repository.make_count(range).await?, settings.value_format_digits)
        }
        PanelId::AvgPriceLineChart => monthly_price_figure(repository.avg_price_by_month(range).await?),
        PanelId::AvgDealershipInventorySizeByMonthLineChart => monthly_inventory_size_figure(
            repository.avg_dealership_inventory_size_by_month(range).await?,
        ),
    };

    Ok(figure)
}

pub fn indicator_figure(panel: PanelId, value: Option<f64>, settings: &PanelsConfig) -> Figure {
    Figure::Indicator(IndicatorFigure {
        title: panel.title().to_string(),
        value,
        font_size: settings.indicator_font_size,
        height: settings.indicator_height,
    })
}

/// Bars keep the order the service returned.
pub fn make_count_figure(rows: Vec<MakeCount>, digits: usize) -> Figure {
    let bars = rows
        .into_iter()
        .map(|row| {
            let value = row.vin as f64;
            Bar {
                category: row.make,
                value,
                text: format_si(value, digits),
            }
        })
        .collect();

    Figure::Bar(BarFigure {
        title: PanelId::MakeCountBarChart.title().to_string(),
        x_label: "Make".to_string(),
        y_label: "Count of Vehicles".to_string(),
        bars,
    })
}

pub fn monthly_price_figure(rows: Vec<MonthlyPrice>) -> Figure {
    let points = rows
        .into_iter()
        .map(|row| LinePoint {
            x: row.inventory_month.format("%Y-%m-%d").to_string(),
            y: row.price,
        })
        .collect();

    Figure::Line(LineFigure {
        title: PanelId::AvgPriceLineChart.title().to_string(),
        x_label: "Inventory Month".to_string(),
        y_label: "Avg Inventory Price".to_string(),
        points,
    })
}

pub fn monthly_inventory_size_figure(rows: Vec<MonthlyInventorySize>) -> Figure {
    let points = rows
        .into_iter()
        .map(|row| LinePoint {
            x: row.inventory_month.format("%Y-%m-%d").to_string(),
            y: row.inventory_size,
        })
        .collect();

    Figure::Line(LineFigure {
        title: PanelId::AvgDealershipInventorySizeByMonthLineChart.title().to_string(),
        x_label: "Inventory Month".to_string(),
        y_label: "Average Inventory Size per Dealership".to_string(),
        points,
    })
}
