//! Observability (logging and tracing)
//!
//! The library itself only emits `tracing` events: field resolution at
//! `trace`, tree construction and schema loading at `debug`, ignored input at
//! `warn`. Applications that do not already install a subscriber can call
//! [`init`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging stack
///
/// Sets up:
/// - Structured logging with JSON formatting (release) or pretty formatting (debug)
/// - Environment-based log level filtering via `RUST_LOG`
///
/// # Example
///
/// ```rust,no_run
/// use acton_forms::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    }

    Ok(())
}

fn default_filter() -> EnvFilter {
    if cfg!(debug_assertions) {
        EnvFilter::new("debug,acton_forms=trace")
    } else {
        EnvFilter::new("info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // The global subscriber can only be installed once
        let _ = init();
        assert!(init().is_err());
    }

    #[test]
    fn test_default_filter_builds() {
        let filter = default_filter();
        assert!(!filter.to_string().is_empty());
    }
}
