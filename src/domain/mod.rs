// Domain layer - date ranges, panels and page layout
pub mod dashboard;
pub mod date_range;
pub mod format;
pub mod inventory;
pub mod panel;
