//! Core integrate and status pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: descriptors, projects and artifacts
//! all go through port traits.

use crate::ports::{LibrarySource, LoadedLibrary, WritePort};
use crate::settings::IntegrateSettings;
use anyhow::Context;
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use podlink_integrate::{
    IntegrateError, IntegrateOptions, IntegrationOutcome, TargetIntegrator, TargetStatus,
    inspect_library,
};
use podlink_project::ProjectStore;
use podlink_render::render_report_md;
use podlink_types::report::{
    IntegrationReport, LibraryResult, LibraryStatus, ReportArtifacts, ReportCounts, ReportFinding,
    ReportRunInfo, ReportSeverity, ReportStatus, ReportVerdict, ToolInfo,
};
use serde::Serialize;
use tracing::{debug, info};

/// Error type for pipeline results. Exit code 1 for every variant; policy
/// blocks are reported through `IntegrateRunOutcome::policy_block`.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Integrate(#[from] IntegrateError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Integrate(err) => err.exit_code(),
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run_integrate`.
pub struct IntegrateRunOutcome {
    pub outcomes: Vec<IntegrationOutcome>,
    pub report: IntegrationReport,
    /// Concatenated patches of every library, in integration order.
    pub patch: String,
    /// Warnings were raised and `fail_on_warnings` is set.
    pub policy_block: bool,
}

/// Integrate every library from `libraries`, in order.
///
/// Each library gets its own integrator, so it observes whatever earlier
/// libraries saved to a shared project. The first fatal error aborts the run;
/// libraries integrated before it stay saved.
pub fn run_integrate(
    settings: &IntegrateSettings,
    libraries: &dyn LibrarySource,
    store: &dyn ProjectStore,
    tool: ToolInfo,
) -> Result<IntegrateRunOutcome, ToolError> {
    let started_at = Utc::now();
    let loaded = libraries.load_libraries().context("load library descriptors")?;
    info!(count = loaded.len(), dry_run = settings.dry_run, "integrating libraries");

    let options = IntegrateOptions {
        dry_run: settings.dry_run,
    };
    let mut outcomes = Vec::with_capacity(loaded.len());
    for LoadedLibrary { path, library } in &loaded {
        debug!(descriptor = %path, library = %library.product_name, "integrating descriptor");
        let outcome = TargetIntegrator::new(library, store).integrate(&options)?;
        outcomes.push(outcome);
    }

    let warnings: usize = outcomes.iter().map(IntegrationOutcome::warning_count).sum();
    let policy_block = settings.fail_on_warnings && warnings > 0;
    let report = report_from_outcomes(&outcomes, tool, started_at, settings.dry_run, policy_block);
    let patch = outcomes.iter().map(|o| o.patch.as_str()).collect::<String>();

    Ok(IntegrateRunOutcome {
        outcomes,
        report,
        patch,
        policy_block,
    })
}

/// Integration state of one library, for `podlink status`.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryStatusReport {
    pub product_name: String,
    pub project_path: String,
    pub descriptor: String,
    pub targets: Vec<TargetStatus>,
}

/// Inspect every library without mutating anything.
pub fn run_status(
    libraries: &dyn LibrarySource,
    store: &dyn ProjectStore,
) -> Result<Vec<LibraryStatusReport>, ToolError> {
    let loaded = libraries.load_libraries().context("load library descriptors")?;
    let mut out = Vec::with_capacity(loaded.len());
    for LoadedLibrary { path, library } in &loaded {
        out.push(LibraryStatusReport {
            product_name: library.product_name.clone(),
            project_path: library.user_project_path.to_string(),
            descriptor: path.to_string(),
            targets: inspect_library(store, library)?,
        });
    }
    Ok(out)
}

/// Write report.json, report.md and patch.diff to the output directory.
pub fn write_artifacts(
    outcome: &IntegrateRunOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let report_json =
        serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

    let report_md = render_report_md(&outcome.report);
    writer.write_file(&out_dir.join("report.md"), report_md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;
    Ok(())
}

// ── report helpers ───────────────────────────────────────────────────────

pub(crate) fn report_from_outcomes(
    outcomes: &[IntegrationOutcome],
    tool: ToolInfo,
    started_at: DateTime<Utc>,
    dry_run: bool,
    policy_block: bool,
) -> IntegrationReport {
    let ended_at = Utc::now();
    let mut counts = ReportCounts {
        libraries: outcomes.len() as u64,
        ..ReportCounts::default()
    };
    let mut libraries = Vec::with_capacity(outcomes.len());
    let mut findings = Vec::new();

    for outcome in outcomes {
        counts.targets_integrated += outcome.integrated_targets.len() as u64;
        counts.targets_skipped += outcome.skipped_targets.len() as u64;
        counts.warnings += outcome.warning_count() as u64;

        let status = if outcome.is_noop() {
            LibraryStatus::UpToDate
        } else if outcome.saved {
            LibraryStatus::Integrated
        } else {
            LibraryStatus::DryRun
        };
        libraries.push(LibraryResult {
            product_name: outcome.product_name.clone(),
            project_path: outcome.project_path.to_string(),
            status,
            integrated_targets: outcome.integrated_targets.iter().map(|t| t.name.clone()).collect(),
            skipped_targets: outcome.skipped_targets.iter().map(|t| t.name.clone()).collect(),
            warnings: outcome.warning_count() as u64,
            file_change: outcome.file_change.clone(),
        });

        for diagnostic in &outcome.diagnostics {
            let target = diagnostic.target.clone();
            let key = diagnostic.key.as_deref().unwrap_or("-");
            findings.push(ReportFinding {
                severity: if diagnostic.is_warning() {
                    ReportSeverity::Warn
                } else {
                    ReportSeverity::Info
                },
                code: diagnostic.code.clone(),
                message: diagnostic.message.clone(),
                library: Some(outcome.product_name.clone()),
                fingerprint: Some(format!(
                    "{}/{}/{}/{}",
                    diagnostic.code,
                    outcome.product_name,
                    target.as_deref().unwrap_or("-"),
                    key
                )),
                target,
                data: Some(serde_json::json!({
                    "key": diagnostic.key,
                    "configurations": diagnostic.configurations,
                    "suggested_actions": diagnostic.suggested_actions,
                })),
            });
        }
    }

    let mut reasons = Vec::new();
    let status = if policy_block {
        reasons.push("fail_on_warnings".to_string());
        ReportStatus::Fail
    } else if counts.warnings > 0 {
        reasons.push("xcconfig_overrides".to_string());
        ReportStatus::Warn
    } else {
        ReportStatus::Pass
    };

    let duration_ms = (ended_at - started_at).num_milliseconds().max(0) as u64;
    IntegrationReport {
        schema: podlink_types::schema::PODLINK_REPORT_V1.to_string(),
        tool,
        run: ReportRunInfo {
            started_at: started_at.to_rfc3339(),
            ended_at: Some(ended_at.to_rfc3339()),
            duration_ms: Some(duration_ms),
            dry_run,
        },
        verdict: ReportVerdict {
            status,
            counts,
            reasons,
        },
        libraries,
        findings,
        artifacts: Some(ReportArtifacts {
            report_md: Some("report.md".to_string()),
            patch: Some("patch.diff".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podlink_integrate::TargetRef;
    use podlink_project::ObjectId;
    use podlink_types::diagnostic::{Diagnostic, Severity};

    fn tool() -> ToolInfo {
        ToolInfo {
            name: "podlink".to_string(),
            version: Some("0.0.0".to_string()),
            commit: None,
        }
    }

    fn outcome(integrated: &[&str], saved: bool, warnings: usize) -> IntegrationOutcome {
        IntegrationOutcome {
            product_name: "libPods.a".to_string(),
            project_path: "App.xcodeproj".into(),
            integrated_targets: integrated
                .iter()
                .map(|name| TargetRef {
                    id: ObjectId::new(format!("{name}-id")),
                    name: name.to_string(),
                })
                .collect(),
            skipped_targets: vec![],
            diagnostics: (0..warnings)
                .map(|i| Diagnostic {
                    severity: Severity::Warning,
                    code: "xcconfig_override".to_string(),
                    message: format!("warning {i}"),
                    suggested_actions: vec![],
                    target: Some("App".to_string()),
                    key: Some(format!("KEY_{i}")),
                    configurations: vec!["Debug".to_string()],
                })
                .collect(),
            events: vec![],
            saved,
            file_change: None,
            patch: String::new(),
        }
    }

    #[test]
    fn clean_run_passes() {
        let report = report_from_outcomes(&[outcome(&["App"], true, 0)], tool(), Utc::now(), false, false);
        assert_eq!(report.verdict.status, ReportStatus::Pass);
        assert_eq!(report.verdict.counts.targets_integrated, 1);
        assert_eq!(report.libraries[0].status, LibraryStatus::Integrated);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn warnings_become_findings() {
        let report = report_from_outcomes(&[outcome(&["App"], true, 2)], tool(), Utc::now(), false, false);
        assert_eq!(report.verdict.status, ReportStatus::Warn);
        assert_eq!(report.verdict.reasons, vec!["xcconfig_overrides"]);
        assert_eq!(report.findings.len(), 2);
        assert_eq!(
            report.findings[0].fingerprint.as_deref(),
            Some("xcconfig_override/libPods.a/App/KEY_0")
        );
        assert_eq!(report.findings[0].target.as_deref(), Some("App"));
    }

    #[test]
    fn policy_block_fails_the_verdict() {
        let report = report_from_outcomes(&[outcome(&["App"], true, 1)], tool(), Utc::now(), false, true);
        assert_eq!(report.verdict.status, ReportStatus::Fail);
        assert_eq!(report.verdict.reasons, vec!["fail_on_warnings"]);
    }

    #[test]
    fn library_status_reflects_outcome() {
        let report = report_from_outcomes(
            &[outcome(&[], false, 0), outcome(&["App"], false, 0)],
            tool(),
            Utc::now(),
            true,
            false,
        );
        let statuses: Vec<LibraryStatus> = report.libraries.iter().map(|l| l.status).collect();
        assert_eq!(statuses, vec![LibraryStatus::UpToDate, LibraryStatus::DryRun]);
        assert!(report.run.dry_run);
    }
}
