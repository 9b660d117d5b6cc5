//! Config loading integration tests

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use playguide::{Config, SystemMode};

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.server.listen, "0.0.0.0:3000");
    assert_eq!(config.database.path, PathBuf::from("data/playguide.db"));
    assert_eq!(config.system_mode(), SystemMode::Bootstrap);
    assert!(config.auth.admin_key.is_none());
}

#[test]
fn test_full_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[server]
listen = "127.0.0.1:8088"

[database]
path = "/var/lib/playguide/catalog.db"

[curation]
system_mode = "REVIEW"

[links]
timeout_secs = 3
concurrency = 2
user_agent = "catalog-bot"

[auth]
cron_secret = "tick"
admin_key = "curator"
"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.server.listen, "127.0.0.1:8088");
    assert_eq!(config.database.path, PathBuf::from("/var/lib/playguide/catalog.db"));
    assert_eq!(config.system_mode(), SystemMode::Review);
    assert_eq!(config.links.timeout(), Duration::from_secs(3));
    assert_eq!(config.links.concurrency, 2);
    assert_eq!(config.links.user_agent, "catalog-bot");
    assert_eq!(config.auth.cron_secret.as_deref(), Some("tick"));
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[links]\ntimeout_secs = \"soon\"\n").unwrap();
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn test_blank_mode_means_bootstrap() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[curation]\nsystem_mode = \"\"\n").unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.system_mode(), SystemMode::Bootstrap);
}

#[test]
fn test_zero_probe_timeout_is_refused() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[links]\ntimeout_secs = 0\n").unwrap();
    let err = Config::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
}

#[test]
fn test_probe_concurrency_is_clamped_on_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[links]\nconcurrency = 0\n").unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.links.concurrency, 1);
}
