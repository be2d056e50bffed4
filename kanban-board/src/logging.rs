//! Tracing setup for applications embedding the engine

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Install a stderr subscriber at `level`.
///
/// `RUST_LOG` directives are layered on top of the level. Returns `false` when
/// a global subscriber was already installed, which is not an error.
pub fn init_tracing(level: Level) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .map(|env| env.add_directive(level.into()))
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(Level::DEBUG);
        assert!(!init_tracing(Level::INFO));
    }
}
