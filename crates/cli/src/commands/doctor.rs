use bidpilot_core::catalog::{MaterialCatalog, ServiceCatalog};
use bidpilot_core::config::{AppConfig, LoadOptions};
use bidpilot_inference::CredentialPool;
use serde::Serialize;

use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                error.to_string().replace('"', "\\\"")
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_credentials());
            checks.push(check_material_catalog(&config));
            checks.push(check_service_catalog(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["credential_readiness", "material_catalog", "service_catalog"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_ok = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_ok { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_ok {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_credentials() -> DoctorCheck {
    match CredentialPool::from_env() {
        Ok(pool) => DoctorCheck {
            name: "credential_readiness",
            status: CheckStatus::Pass,
            details: format!("{} credential(s) available for rotation", pool.len()),
        },
        Err(error) => DoctorCheck {
            name: "credential_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_material_catalog(config: &AppConfig) -> DoctorCheck {
    match MaterialCatalog::load(&config.catalogs.material_path) {
        Ok(catalog) => DoctorCheck {
            name: "material_catalog",
            status: CheckStatus::Pass,
            details: format!(
                "{} SKUs loaded from {}",
                catalog.len(),
                config.catalogs.material_path.display()
            ),
        },
        Err(error) => DoctorCheck {
            name: "material_catalog",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_service_catalog(config: &AppConfig) -> DoctorCheck {
    // Pricing tolerates a missing service catalog, so its absence is a
    // skip here rather than a failure.
    let Some(path) = &config.catalogs.service_path else {
        return DoctorCheck {
            name: "service_catalog",
            status: CheckStatus::Skipped,
            details: "no service catalog configured; service costs priced at zero".to_string(),
        };
    };
    if !path.exists() {
        return DoctorCheck {
            name: "service_catalog",
            status: CheckStatus::Skipped,
            details: format!("{} not found; service costs priced at zero", path.display()),
        };
    }
    match ServiceCatalog::load(path) {
        Ok(catalog) => DoctorCheck {
            name: "service_catalog",
            status: CheckStatus::Pass,
            details: format!("{} service entries loaded from {}", catalog.entries().len(), path.display()),
        },
        Err(error) => DoctorCheck {
            name: "service_catalog",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];
    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("  [{marker}] {}: {}", check.name, check.details));
    }
    lines.join("\n")
}
