pub mod annotation;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod labeler;
pub mod secure_workload_client;
pub mod workspaces_inventory_client;
