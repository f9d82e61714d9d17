pub mod connection;
pub mod core;
pub mod engine;
pub mod nodes;
pub mod observability;
