// Panel domain models - what each dashboard region shows
use super::date_range::DateRange;
use serde::Serialize;

/// The six panels driven by the date range selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelId {
    AvgInventoryPrice,
    AvgInventoryMakeYear,
    AvgInventoryMileage,
    MakeCountBarChart,
    AvgPriceLineChart,
    AvgDealershipInventorySizeByMonthLineChart,
}

impl PanelId {
    /// Binding table: every panel re-rendered on a range change.
    pub const BOUND: [PanelId; 6] = [
        PanelId::AvgInventoryPrice,
        PanelId::AvgInventoryMakeYear,
        PanelId::AvgInventoryMileage,
        PanelId::MakeCountBarChart,
        PanelId::AvgPriceLineChart,
        PanelId::AvgDealershipInventorySizeByMonthLineChart,
    ];

    /// Placeholder id used by the page layout.
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelId::AvgInventoryPrice => "avg_inventory_price",
            PanelId::AvgInventoryMakeYear => "avg_inventory_make_year",
            PanelId::AvgInventoryMileage => "avg_inventory_mileage",
            PanelId::MakeCountBarChart => "make_count_bar_chart",
            PanelId::AvgPriceLineChart => "avg_price_line_chart",
            PanelId::AvgDealershipInventorySizeByMonthLineChart => {
                "avg_dealership_inventory_size_by_month_line_chart"
            }
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PanelId::AvgInventoryPrice => "Average Inventory Price",
            PanelId::AvgInventoryMakeYear => "Average Inventory Make Year",
            PanelId::AvgInventoryMileage => "Average Inventory Mileage",
            PanelId::MakeCountBarChart => "Count of Used Cars by Make",
            PanelId::AvgPriceLineChart => "Average Inventory Price by Month",
            PanelId::AvgDealershipInventorySizeByMonthLineChart => {
                "Average Dealership Inventory Size by Month"
            }
        }
    }

    pub fn is_indicator(&self) -> bool {
        matches!(
            self,
            PanelId::AvgInventoryPrice | PanelId::AvgInventoryMakeYear | PanelId::AvgInventoryMileage
        )
    }
}

impl std::fmt::Display for PanelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFigure {
    pub title: String,
    /// `None` when the aggregate had no rows for the range.
    pub value: Option<f64>,
    pub font_size: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub category: String,
    pub value: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Figure {
    Indicator(IndicatorFigure),
    Bar(BarFigure),
    Line(LineFigure),
}

/// What a panel displays after a render attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelContent {
    Ready { figure: Figure },
    Error { message: String },
}

/// A finished render, tagged with the selection it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelUpdate {
    pub panel: PanelId,
    pub generation: u64,
    pub range: DateRange,
    pub content: PanelContent,
}

/// Per-panel state machine: Idle (last rendered content) or Computing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelState {
    Idle {
        range: Option<DateRange>,
        content: Option<PanelContent>,
    },
    Computing {
        range: DateRange,
        generation: u64,
    },
}

impl PanelState {
    pub fn is_computing(&self) -> bool {
        matches!(self, PanelState::Computing { .. })
    }
}
