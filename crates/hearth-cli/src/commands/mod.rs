//! Command implementations.

pub mod analyze;
pub mod catalog;
pub mod config;
pub mod filter;

pub use self::analyze::execute_analyze;
pub use self::catalog::execute_catalog;
pub use self::config::execute_config;
pub use self::filter::execute_filter;
