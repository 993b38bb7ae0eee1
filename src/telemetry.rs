//! Telemetry helpers for applications embedding `dorling-rs`.
//!
//! Tracing setup stays explicit and opt-in. Hosts can call
//! `init_default_tracing` or install their own `tracing` subscriber; the
//! build pipeline, force simulation and animation controller only emit events.

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_TRACING_FILTER: &str = "info";

/// Installs a compact `fmt` subscriber when the `telemetry` feature is enabled.
///
/// Lines carry their event target (`dorling_rs::simulation::engine`,
/// `dorling_rs::api::controller`, ...), matching the module paths accepted by
/// `RUST_LOG`, e.g. `RUST_LOG=dorling_rs::simulation=trace` for per-tick
/// output.
///
/// Returns `false` when the feature is disabled or the host already set a
/// global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACING_FILTER));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::init_default_tracing;

    #[cfg(not(feature = "telemetry"))]
    #[test]
    fn disabled_feature_installs_nothing() {
        assert!(!init_default_tracing());
    }

    #[cfg(feature = "telemetry")]
    #[test]
    fn second_initialization_is_rejected() {
        let _ = init_default_tracing();
        assert!(!init_default_tracing());
    }
}
