pub mod config;
pub mod executor;
pub mod feed;
pub mod harvest;
pub mod model;
pub mod registry;
pub mod store;
pub mod telemetry;
pub mod traits;

// Re-export common types for convenience
pub use config::HarvesterConfig;
pub use executor::*;
pub use model::*;
pub use traits::*;
