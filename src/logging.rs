//! Structured logging setup for the simulator.
//!
//! Honours `RUST_LOG` when set; otherwise defaults to info level, or debug
//! when the CLI `--verbose` flag is given. All output goes to stderr so the
//! corrected-hypothesis stream on stdout stays clean.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Safe to call more than once;
/// later calls are no-ops.
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "postedit_sim=debug"
    } else {
        "postedit_sim=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
    }
}
