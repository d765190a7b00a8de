// Application layer - use-case services and repository traits
pub mod customer_service;
pub mod dashboard_service;
pub mod error;
pub mod layout_service;
pub mod org_service;
pub mod repositories;
pub mod seed_service;
pub mod settings_service;
