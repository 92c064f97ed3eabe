//! Logging setup and value redaction.

use std::io;

use rowmatch_cli::logging::{
    LogConfig, LogFormat, REDACTED_VALUE, init_logging_with_writer, log_data_enabled,
    redact_value,
};
use tracing::level_filters::LevelFilter;

// One test: the global subscriber can only be installed once per process.
#[test]
fn test_log_data_flag_controls_redaction() {
    assert!(!log_data_enabled());
    assert_eq!(redact_value("Smith"), REDACTED_VALUE);

    let config = LogConfig::default()
        .with_level(LevelFilter::TRACE)
        .with_format(LogFormat::Json)
        .with_log_data(true);
    init_logging_with_writer(&config, io::sink);

    assert!(log_data_enabled());
    assert_eq!(redact_value("Smith"), "Smith");
    tracing::trace!(value = redact_value("Smith"), "logged through the installed subscriber");
}
