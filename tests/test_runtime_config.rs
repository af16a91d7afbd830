// CLASSIFICATION: COMMUNITY
// Filename: test_runtime_config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::env;
use std::fs;

use devsvc::config::CONFIG_PATH_ENV;
use devsvc::{Capabilities, RuntimeConfig};
use serial_test::serial;

fn with_config_env<F: FnOnce()>(value: Option<&str>, f: F) {
    let prev = env::var(CONFIG_PATH_ENV).ok();
    match value {
        Some(v) => env::set_var(CONFIG_PATH_ENV, v),
        None => env::remove_var(CONFIG_PATH_ENV),
    }
    f();
    match prev {
        Some(v) => env::set_var(CONFIG_PATH_ENV, v),
        None => env::remove_var(CONFIG_PATH_ENV),
    }
}

#[test]
#[serial]
fn load_active_reads_named_file() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devsvc.json");
    fs::write(
        &path,
        r#"{"diagnostics": false, "file_write": false, "web_server": {"host": "0.0.0.0"}}"#,
    )
    .unwrap();

    with_config_env(path.to_str(), || {
        let cfg = RuntimeConfig::load_active();
        assert!(!cfg.diagnostics);
        assert_eq!(cfg.web_server.host, "0.0.0.0");
        assert_eq!(cfg.web_server.port, 8181);
        let caps = cfg.capabilities();
        assert!(!caps.contains(Capabilities::DIAGNOSTICS));
        assert!(!caps.contains(Capabilities::FILE_WRITE));
        assert!(caps.contains(Capabilities::HEAP_SNAPSHOT_WRITER));
    });
}

#[test]
#[serial]
fn load_active_falls_back_to_defaults() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    with_config_env(missing.to_str(), || {
        assert_eq!(RuntimeConfig::load_active(), RuntimeConfig::default());
    });

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ diagnostics").unwrap();
    with_config_env(broken.to_str(), || {
        assert_eq!(RuntimeConfig::load_active(), RuntimeConfig::default());
    });
}
