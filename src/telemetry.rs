//! Structured logging setup.
//!
//! Verbosity comes from `RUST_LOG` (`warn` when unset). Output goes to
//! stderr so the summary on stdout stays machine readable.
//!
//! ```bash
//! RUST_LOG=comanda=debug comanda floor.csv
//! ```

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
