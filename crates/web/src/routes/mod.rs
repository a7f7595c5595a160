pub mod config_route;
pub mod health_route;
pub mod page_route;
pub mod query_route;
