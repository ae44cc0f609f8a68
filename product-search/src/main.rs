//! Product Search Main Entry Point
//!
//! This binary provisions the search index schema and bulk-syncs the product
//! catalog into it. Ctrl-C requests cancellation: in-flight products finish,
//! nothing new is dispatched, and the run reports what it completed.

use dotenv::dotenv;
use product_search::{Dependencies, ServiceError};
use product_search_repository::SearchIndexError;
use std::env;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), ServiceError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("product_search=info,product_search_repository=info")
    });

    let json_format = env::var("LOG_FORMAT")
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_format {
        // JSON format for structured logging behind a log shipper
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "product-search",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        // Otherwise, use pretty console output
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        info!(
            service_name = "product-search",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize tracing
    init_tracing()?;

    info!("Starting product search reindex");

    // Initialize dependencies
    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    // Run the full reindex, cancelling on Ctrl-C
    let service = Arc::clone(&deps.service);
    let mut reindex = tokio::spawn(async move { service.reindex_all().await });

    let report = tokio::select! {
        result = &mut reindex => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Ctrl-C received, cancelling reindex");
            deps.service.cancel_reindex();
            (&mut reindex).await
        }
    };

    let report = report.map_err(|e| {
        SearchIndexError::store_unavailable(
            "reindex",
            format!("Reindex task did not complete: {}", e),
        )
    })?;

    info!(
        success = report.success,
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        cancelled = report.cancelled,
        "Reindex finished"
    );

    // Partial failures are reported in the summary rather than the exit code;
    // the synced subset stays available for queries either way.
    Ok(())
}
