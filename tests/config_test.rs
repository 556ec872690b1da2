//! Configuration loading and validation tests

use std::io::Write;

use macrowatch::config::Config;
use macrowatch::models::Impact;

const SAMPLE: &str = r#"
[feed]
url = "https://feed.example.com/calendar.json"
request_timeout_secs = 20

[calendar]
timezone = "Europe/London"
daily_alert_time = "06:45"
pre_event_lead_minutes = 30
impacts = ["high", "medium"]
countries = ["GBP", "USD"]
destination = "macro-alerts"

[sessions]
anchor = "2025-01-05T22:00:00Z"
pattern_hours = [48, 72]
lead_minutes = 5
destination = "session-alerts"
audit_dir = "/tmp/macrowatch-audit"

[pipeline]
interval_minutes = 30

[delivery]
webhook_url = "https://hooks.example.com/T123/B456"
auth_token = "secret"

[logging]
level = "debug"
format = "json"
"#;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_toml_file() {
    let file = write_config(SAMPLE);
    let config = Config::from_file(file.path()).unwrap();
    config.validate().unwrap();

    assert_eq!(config.feed.url, "https://feed.example.com/calendar.json");
    assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::London);
    assert_eq!(config.sessions.pattern_hours, vec![48, 72]);
    assert_eq!(config.delivery.auth_token.as_deref(), Some("secret"));
    assert_eq!(config.logging.format, "json");

    let filter = config.event_filter();
    assert_eq!(filter.impacts, vec![Impact::High, Impact::Medium]);
    assert_eq!(filter.countries, vec!["GBP", "USD"]);
}

#[test]
fn test_missing_file_is_an_error() {
    let result = Config::from_file(std::path::Path::new("/nonexistent/macrowatch.toml"));
    assert!(result.is_err());
}

#[test]
fn test_malformed_toml_is_an_error() {
    let file = write_config("[feed\nurl = ");
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_unknown_timezone_fails_validation_not_loading() {
    let content = SAMPLE.replace("Europe/London", "Atlantis/Central");
    let file = write_config(&content);

    // Loading succeeds; the bad zone is caught by validate().
    let config = Config::from_file(file.path()).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_bad_pattern_fails_validation() {
    let content = SAMPLE.replace("pattern_hours = [48, 72]", "pattern_hours = [48, -6]");
    let file = write_config(&content);
    assert!(Config::from_file(file.path()).unwrap().validate().is_err());
}

#[test]
fn test_repo_sample_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config.toml");
    let config = Config::from_file(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.timezone().unwrap(), chrono_tz::America::New_York);
}
