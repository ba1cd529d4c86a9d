use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bidpilot_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use bidpilot_inference::{CredentialPool, GeminiProvider, ResilientClient, RetryPolicy};
use bidpilot_pipeline::{JitterWindow, Orchestrator, PipelineSettings, RunContext};

use super::CommandResult;

#[derive(Debug)]
pub struct RunArgs {
    pub rfp: PathBuf,
    pub material_catalog: Option<PathBuf>,
    pub service_catalog: Option<PathBuf>,
    pub runs_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub async fn run(args: RunArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions {
        config_path: args.config,
        require_file: false,
        overrides: ConfigOverrides {
            material_catalog: args.material_catalog,
            service_catalog: args.service_catalog,
            runs_dir: args.runs_dir,
            log_level: None,
        },
    }) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("run", "config", error.to_string(), 2),
    };
    init_logging(&config);

    let pool = match CredentialPool::from_env() {
        Ok(pool) => Arc::new(pool),
        Err(error) => return CommandResult::failure("run", "credentials", error.to_string(), 2),
    };

    let provider = match GeminiProvider::new(
        &config.inference.base_url,
        &config.inference.model,
        Duration::from_secs(config.inference.request_timeout_secs),
    ) {
        Ok(provider) => provider,
        Err(error) => return CommandResult::failure("run", "provider", error.to_string(), 2),
    };

    let policy = RetryPolicy {
        max_retries_per_credential: config.retry.max_retries_per_credential,
        intra_cycle_delay: Duration::from_millis(config.retry.intra_cycle_delay_ms),
        base_delay: Duration::from_secs(config.retry.base_delay_secs),
        max_backoff: Duration::from_secs(config.retry.max_backoff_secs),
    };
    let client = Arc::new(ResilientClient::new(provider, pool, policy));

    let orchestrator = Orchestrator::new(
        client,
        PipelineSettings {
            material_catalog: config.catalogs.material_path.clone(),
            service_catalog: config.catalogs.service_path.clone(),
            extraction_jitter: JitterWindow {
                min_secs: config.retry.jitter_min_secs,
                max_secs: config.retry.jitter_max_secs,
            },
            max_review_retries: config.review.max_retries,
        },
    );

    let mut ctx = match RunContext::create(&config.output.runs_dir, &args.rfp).await {
        Ok(ctx) => ctx,
        Err(error) => return CommandResult::failure("run", "io", error.to_string(), 2),
    };

    match orchestrator.run(&mut ctx).await {
        Ok(bid_path) => CommandResult::success(
            "run",
            format!(
                "run {} complete; final bid at {} (artifacts in {})",
                ctx.run_id,
                bid_path.display(),
                ctx.run_dir.display()
            ),
        ),
        Err(error) => CommandResult::failure("run", "pipeline", error.to_string(), 1),
    }
}

fn init_logging(config: &AppConfig) {
    use bidpilot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}
