pub mod admin_service;
pub mod auth_service;
pub mod budget_service;
pub mod maintenance_service;
pub mod order_service;
pub mod throttle_service;
