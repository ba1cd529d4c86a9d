use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bidpilot_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let entries: Vec<(&str, String, Option<&str>)> = vec![
        ("inference.base_url", config.inference.base_url.clone(), Some("BIDPILOT_BASE_URL")),
        ("inference.model", config.inference.model.clone(), Some("BIDPILOT_MODEL")),
        (
            "inference.request_timeout_secs",
            config.inference.request_timeout_secs.to_string(),
            None,
        ),
        (
            "retry.max_retries_per_credential",
            config.retry.max_retries_per_credential.to_string(),
            None,
        ),
        ("retry.base_delay_secs", config.retry.base_delay_secs.to_string(), None),
        ("retry.intra_cycle_delay_ms", config.retry.intra_cycle_delay_ms.to_string(), None),
        ("retry.max_backoff_secs", config.retry.max_backoff_secs.to_string(), None),
        ("retry.jitter_min_secs", config.retry.jitter_min_secs.to_string(), None),
        ("retry.jitter_max_secs", config.retry.jitter_max_secs.to_string(), None),
        (
            "catalogs.material_path",
            config.catalogs.material_path.display().to_string(),
            Some("BIDPILOT_MATERIAL_CATALOG"),
        ),
        (
            "catalogs.service_path",
            config
                .catalogs
                .service_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<unset>".to_string()),
            Some("BIDPILOT_SERVICE_CATALOG"),
        ),
        (
            "output.runs_dir",
            config.output.runs_dir.display().to_string(),
            Some("BIDPILOT_RUNS_DIR"),
        ),
        (
            "review.max_retries",
            config.review.max_retries.to_string(),
            Some("BIDPILOT_MAX_REVIEW_RETRIES"),
        ),
        ("logging.level", config.logging.level.clone(), Some("BIDPILOT_LOG_LEVEL")),
        ("logging.format", format!("{:?}", config.logging.format), Some("BIDPILOT_LOG_FORMAT")),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in entries {
        lines.push(render_line(
            key,
            &value,
            field_source(key, env_key, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    // Credentials never live in the config file; only report presence.
    let primary = if env::var_os("BIDPILOT_API_KEY").is_some() { "<redacted>" } else { "<unset>" };
    lines.push(render_line("credentials.api_key", primary, "env (BIDPILOT_API_KEY)".to_string()));
    lines.push(render_line(
        "credentials.fallback_keys",
        &count_fallback_keys().to_string(),
        "env (BIDPILOT_API_KEY_*)".to_string(),
    ));

    lines.join("\n")
}

fn count_fallback_keys() -> usize {
    let mut count = 0;
    let mut index = 1;
    while env::var_os(format!("BIDPILOT_API_KEY_{index}")).is_some() {
        count += 1;
        index += 1;
    }
    count
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("bidpilot.toml");
    root.exists().then_some(root)
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(doc: &Value, key_path: &str) -> bool {
    let mut current = doc;
    for segment in key_path.split('.') {
        match current.get(segment) {
            Some(next) => current = next,
            None => return false,
        }
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("  {key} = {value}  [{source}]")
}

#[cfg(test)]
mod tests {
    use super::contains_path;

    #[test]
    fn nested_key_lookup_walks_the_toml_document() {
        let doc: toml::Value = "[inference]\nmodel = \"gemini-pro\"\n".parse().expect("toml");
        assert!(contains_path(&doc, "inference.model"));
        assert!(!contains_path(&doc, "inference.base_url"));
        assert!(!contains_path(&doc, "retry.base_delay_secs"));
    }
}
