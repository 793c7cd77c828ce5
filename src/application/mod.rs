// Application layer - use cases over the aggregation service
pub mod dashboard_service;
pub mod inventory_repository;
pub mod page_session;
pub mod renderers;
