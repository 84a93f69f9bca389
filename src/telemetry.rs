//! Opt-in tracing setup for hosts that do not wire their own subscriber.
//!
//! The measurement core only emits `tracing` events; nothing here runs
//! unless the `telemetry` feature is enabled and the host asks for it.

/// Installs a compact stderr subscriber honoring `RUST_LOG`, defaulting to
/// `plotkit=debug` so skipped measure passes are visible while integrating.
///
/// Returns `false` when the feature is disabled or another global subscriber
/// already won the race.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("plotkit=debug"));

        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
