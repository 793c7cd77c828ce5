// Page layout domain model - static arrangement of the summary page
use super::date_range::{DateRange, MIN_SELECTABLE_DATE};
use super::panel::PanelId;
use chrono::NaiveDate;
use serde::Serialize;

pub const PAGE_TITLE: &str = "Summary";

/// Layout slot without a renderer behind it.
pub const UNBOUND_PRICE_BY_MAKE: &str = "avg_price_by_make_bar_chart";

#[derive(Debug, Clone, Serialize)]
pub struct DateRangeSelector {
    pub id: String,
    pub min_date_allowed: NaiveDate,
    pub initial_visible_month: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Placeholder {
    pub id: String,
    /// `None` for slots no renderer feeds.
    pub panel: Option<PanelId>,
    pub bound: bool,
}

impl Placeholder {
    fn bound(panel: PanelId) -> Self {
        Self {
            id: panel.as_str().to_string(),
            panel: Some(panel),
            bound: true,
        }
    }

    fn unbound(id: &str) -> Self {
        Self {
            id: id.to_string(),
            panel: None,
            bound: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub selector: DateRangeSelector,
    pub indicators: Vec<Placeholder>,
    pub charts: Vec<Placeholder>,
}

impl Dashboard {
    pub fn new(default_range: DateRange) -> Self {
        let selector = DateRangeSelector {
            id: "date-picker".to_string(),
            min_date_allowed: MIN_SELECTABLE_DATE,
            initial_visible_month: default_range.start,
            start_date: default_range.start,
            end_date: default_range.end,
        };

        let indicators = PanelId::BOUND
            .into_iter()
            .filter(PanelId::is_indicator)
            .map(Placeholder::bound)
            .collect();

        let charts = vec![
            Placeholder::bound(PanelId::AvgPriceLineChart),
            Placeholder::bound(PanelId::MakeCountBarChart),
            Placeholder::unbound(UNBOUND_PRICE_BY_MAKE),
            Placeholder::bound(PanelId::AvgDealershipInventorySizeByMonthLineChart),
        ];

        Self {
            title: PAGE_TITLE.to_string(),
            selector,
            indicators,
            charts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_binds_every_panel_once() {
        let range = DateRange::default_for(NaiveDate::from_ymd_opt(2024, 8, 17).unwrap());
        let dashboard = Dashboard::new(range);

        let bound: Vec<PanelId> = dashboard
            .indicators
            .iter()
            .chain(&dashboard.charts)
            .filter_map(|p| p.panel)
            .collect();
        assert_eq!(bound.len(), PanelId::BOUND.len());
        for panel in PanelId::BOUND {
            assert!(bound.contains(&panel), "{} missing from layout", panel);
        }
    }

    #[test]
    fn test_layout_flags_unbound_placeholder() {
        let range = DateRange::default_for(NaiveDate::from_ymd_opt(2024, 8, 17).unwrap());
        let dashboard = Dashboard::new(range);

        assert_eq!(dashboard.indicators.len(), 3);
        assert_eq!(dashboard.charts.len(), 4);

        let unbound: Vec<&Placeholder> = dashboard
            .indicators
            .iter()
            .chain(&dashboard.charts)
            .filter(|p| !p.bound)
            .collect();
        assert_eq!(unbound.len(), 1);
        assert_eq!(unbound[0].id, UNBOUND_PRICE_BY_MAKE);
        assert_eq!(dashboard.selector.min_date_allowed, MIN_SELECTABLE_DATE);
        assert_eq!(dashboard.selector.initial_visible_month, range.start);
    }
}
