pub mod analysis;
pub mod config;
pub mod engine;
pub mod filing;
pub mod metrics;
pub mod xbrl;

// Re-exports
pub use config::ResolverConfig;
pub use engine::Engine;
pub use metrics::{Category, FilingMetrics, FilingReport, Governance, MetricsTable};
pub use xbrl::context::Period;
