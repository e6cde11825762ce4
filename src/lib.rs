#![doc(test(attr(deny(warnings))))]

//! Budgeteer keeps a category/row budget plan against twelve months of
//! transactions, with CSV import and a line-oriented flat-file save format.

pub mod aggregate;
pub mod amount;
pub mod cli;
pub mod config;
pub mod errors;
pub mod format;
pub mod importer;
pub mod model;
pub mod storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("budgeteer=info".parse().unwrap());
        fmt().with_env_filter(filter).init();
        tracing::info!("Budgeteer tracing initialized.");
    });
}
