use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber. When `RUST_LOG` is set it alone decides what is logged.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let app_filter = app_targets(verbose, env_filter.is_some());
    let env_filter = env_filter.unwrap_or_else(|| EnvFilter::new(default_level(verbose)));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter)
        .with(env_filter)
        .try_init();
}

fn default_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Per-target caps applied only when no `RUST_LOG` override is present.
fn app_targets(verbose: bool, env_override: bool) -> Option<Targets> {
    if env_override {
        return None;
    }
    let level_filter = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    Some(
        Targets::new()
            .with_target("mission_console", level_filter)
            .with_default(LevelFilter::INFO),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_env_override_disables_target_caps() {
        assert!(app_targets(false, true).is_none());
        assert!(app_targets(true, true).is_none());
    }

    #[test]
    fn test_default_target_levels() {
        let quiet = app_targets(false, false).unwrap();
        assert!(quiet.would_enable("mission_console", &Level::WARN));
        assert!(!quiet.would_enable("mission_console", &Level::DEBUG));

        let verbose = app_targets(true, false).unwrap();
        assert!(verbose.would_enable("mission_console::providers", &Level::DEBUG));
        assert!(!verbose.would_enable("reqwest", &Level::DEBUG));
        assert!(verbose.would_enable("reqwest", &Level::INFO));

        assert_eq!(default_level(false), "warn");
        assert_eq!(default_level(true), "debug");
    }
}
