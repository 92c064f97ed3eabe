//! Logging to a file instead of stderr.

use std::fs;

use rowmatch_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

// Own test binary: the global subscriber can only be installed once per process.
#[test]
fn test_log_file_receives_json_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rowmatch.log");
    fs::write(&path, "earlier run\n").unwrap();

    let mut config = LogConfig::default()
        .with_level(LevelFilter::INFO)
        .with_format(LogFormat::Json);
    config.use_env_filter = false;
    config.log_file = Some(path.clone());
    init_logging(&config).unwrap();

    // events outside the workspace crates pass at warn and above
    tracing::warn!(rows = 3, "loaded csv table");
    tracing::info!("below the configured level");

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("earlier run\n"));
    assert!(written.contains("loaded csv table"));
    assert!(written.contains("\"rows\":3"));
    assert!(!written.contains("below the configured level"));
}
