//! Resources compiled into the binary.

/// Logging config used when no external logging config layer loads.
pub const BUNDLED_LOGGING_CONFIG: &str = include_str!("../resources/logging_config.json");

#[cfg(test)]
mod tests {
    use hearth_core::domain::LoggingConfig;

    use super::*;

    #[test]
    fn bundled_logging_config_parses() {
        let config = LoggingConfig::parse_fragment(BUNDLED_LOGGING_CONFIG).unwrap();

        assert!(config.spec().is_ok());
        assert!(config.handler_names().iter().any(|h| h == "console"));
    }
}
