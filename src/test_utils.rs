use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging once per test binary. `RUST_LOG` overrides the
/// default filter.
pub fn init_test_logging() {
    INIT.call_once(|| {
        // Another subscriber may already be installed; keep it.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info,tower_http=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}
