use std::env;
use std::io::Write;
use std::sync::{Mutex, OnceLock};

use bidpilot_cli::commands::{config, doctor};
use serde_json::Value;

#[test]
fn doctor_passes_with_credentials_and_catalog() {
    let mut catalog = tempfile::NamedTempFile::new().expect("temp catalog");
    writeln!(catalog, "sku,description,unit_price").expect("write header");
    writeln!(catalog, "CAB-11KV-300,11kV cable,5000").expect("write row");
    let catalog_path = catalog.path().display().to_string();

    with_env(
        &[("BIDPILOT_API_KEY", "test-key"), ("BIDPILOT_MATERIAL_CATALOG", &catalog_path)],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 0, "expected all readiness checks to pass");

            let report = parse_payload(&result.output);
            assert_eq!(report["overall_status"], "pass");
            let checks = report["checks"].as_array().expect("checks array");
            let credential = checks
                .iter()
                .find(|check| check["name"] == "credential_readiness")
                .expect("credential check present");
            assert_eq!(credential["status"], "pass");
        },
    );
}

#[test]
fn doctor_fails_without_credentials() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1, "expected readiness failure exit code");

        let report = parse_payload(&result.output);
        assert_eq!(report["overall_status"], "fail");
        let checks = report["checks"].as_array().expect("checks array");
        let credential = checks
            .iter()
            .find(|check| check["name"] == "credential_readiness")
            .expect("credential check present");
        assert_eq!(credential["status"], "fail");
    });
}

#[test]
fn config_attributes_env_overrides() {
    with_env(&[("BIDPILOT_MODEL", "gemini-pro")], || {
        let output = config::run();
        assert!(output.contains("inference.model = gemini-pro  [env (BIDPILOT_MODEL)]"));
        assert!(output.contains("retry.max_retries_per_credential = 3  [default]"));
    });
}

#[test]
fn config_reports_credential_presence_without_values() {
    with_env(&[("BIDPILOT_API_KEY", "super-secret-value")], || {
        let output = config::run();
        assert!(output.contains("credentials.api_key = <redacted>"));
        assert!(!output.contains("super-secret-value"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "BIDPILOT_API_KEY",
        "BIDPILOT_API_KEY_1",
        "BIDPILOT_API_KEY_2",
        "BIDPILOT_BASE_URL",
        "BIDPILOT_MODEL",
        "BIDPILOT_MATERIAL_CATALOG",
        "BIDPILOT_SERVICE_CATALOG",
        "BIDPILOT_RUNS_DIR",
        "BIDPILOT_LOG_LEVEL",
        "BIDPILOT_LOG_FORMAT",
        "BIDPILOT_MAX_REVIEW_RETRIES",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
