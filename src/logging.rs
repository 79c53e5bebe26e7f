//! Log output for the binary.
//!
//! The library logs through the `log` facade. `init` installs a
//! `tracing_subscriber` fmt subscriber on stderr, whose `tracing-log` bridge
//! forwards those records. `RUST_LOG` overrides the `-v` count when set.

use tracing_subscriber::EnvFilter;

/// Map the number of `-v` flags to the level used for clickloop's own logs.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter directives used when `RUST_LOG` is not set. Other crates stay at
/// warn.
pub fn default_directives(verbosity: u8) -> String {
    format!("warn,clickloop={}", level_for(verbosity))
}

/// Install the stderr subscriber. Later calls are ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok();
    if installed {
        log::debug!("Logging at {}", level_for(verbosity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(7), "trace");
    }

    #[test]
    fn test_default_directives_scope_verbosity_to_clickloop() {
        assert_eq!(default_directives(0), "warn,clickloop=warn");
        assert_eq!(default_directives(2), "warn,clickloop=debug");
    }

    #[test]
    fn test_default_directives_parse() {
        for verbosity in 0..4 {
            assert!(EnvFilter::try_new(default_directives(verbosity)).is_ok());
        }
    }
}
