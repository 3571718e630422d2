//! Rendering helpers for human-readable artifacts and terminal output.

use podlink_types::diagnostic::{Diagnostic, Severity};
use podlink_types::event::IntegrationEvent;
use podlink_types::report::{IntegrationReport, LibraryStatus, ReportSeverity, ReportStatus};

pub fn render_report_md(report: &IntegrationReport) -> String {
    let mut out = String::new();
    out.push_str("# podlink report\n\n");
    out.push_str(&format!(
        "- Status: `{}`{}\n",
        report_status_label(report.verdict.status),
        if report.run.dry_run { " (dry run)" } else { "" }
    ));
    let counts = &report.verdict.counts;
    out.push_str(&format!(
        "- Libraries: {}\n- Targets integrated: {}\n- Targets already integrated: {}\n- Warnings: {}\n\n",
        counts.libraries, counts.targets_integrated, counts.targets_skipped, counts.warnings
    ));
    for reason in &report.verdict.reasons {
        out.push_str(&format!("> {}\n", reason));
    }
    if !report.verdict.reasons.is_empty() {
        out.push('\n');
    }

    out.push_str("## Libraries\n\n");
    if report.libraries.is_empty() {
        out.push_str("_No libraries found._\n");
    }
    for (i, lib) in report.libraries.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, lib.product_name));
        out.push_str(&format!("- Project: `{}`\n", lib.project_path));
        out.push_str(&format!("- Status: `{}`\n", library_status_label(lib.status)));
        if !lib.integrated_targets.is_empty() {
            out.push_str(&format!("- Integrated: {}\n", code_list(&lib.integrated_targets)));
        }
        if !lib.skipped_targets.is_empty() {
            out.push_str(&format!("- Already integrated: {}\n", code_list(&lib.skipped_targets)));
        }
        if lib.warnings > 0 {
            out.push_str(&format!("- Warnings: {}\n", lib.warnings));
        }
        if let Some(fc) = &lib.file_change {
            let before = fc.sha256_before.as_deref().unwrap_or("-");
            let after = fc.sha256_after.as_deref().unwrap_or("-");
            out.push_str(&format!("- File: `{}` {} → {}\n", fc.path, before, after));
        }
        out.push('\n');
    }

    if !report.findings.is_empty() {
        out.push_str("## Findings\n\n");
        for f in &report.findings {
            let scope = match (&f.library, &f.target) {
                (Some(lib), Some(target)) => format!(" ({lib} → {target})"),
                (Some(lib), None) => format!(" ({lib})"),
                _ => String::new(),
            };
            out.push_str(&format!(
                "- **{}** `{}`{}: {}\n",
                finding_severity_label(f.severity),
                f.code,
                scope,
                f.message
            ));
        }
    }

    out
}

/// Terminal form of a diagnostic: a `[!]` headline followed by one indented
/// line per suggested action.
pub fn render_diagnostic_text(diagnostic: &Diagnostic) -> String {
    let marker = match diagnostic.severity {
        Severity::Warning => "[!]",
        Severity::Info => "[i]",
    };
    let mut out = format!("{} {}\n", marker, diagnostic.message);
    for action in &diagnostic.suggested_actions {
        out.push_str(&format!("    - {}\n", action));
    }
    out
}

pub fn render_event_text(event: &IntegrationEvent) -> String {
    match event {
        IntegrationEvent::Section {
            library,
            project_path,
            targets,
            ..
        } => format!(
            "Integrating `{}` into {} {} of project `{}`\n",
            library,
            if targets.len() == 1 { "target" } else { "targets" },
            code_list(targets),
            project_path
        ),
        IntegrationEvent::StepCompleted { step, .. } => format!("  - {}\n", step.label()),
        IntegrationEvent::Saved { project_path } => format!("  Saved `{}`\n", project_path),
    }
}

fn code_list(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("`{}`", s))
        .collect::<Vec<_>>()
        .join(", ")
}

fn report_status_label(s: ReportStatus) -> &'static str {
    match s {
        ReportStatus::Pass => "pass",
        ReportStatus::Warn => "warn",
        ReportStatus::Fail => "fail",
    }
}

fn library_status_label(s: LibraryStatus) -> &'static str {
    match s {
        LibraryStatus::Integrated => "integrated",
        LibraryStatus::UpToDate => "up to date",
        LibraryStatus::DryRun => "dry run",
    }
}

fn finding_severity_label(s: ReportSeverity) -> &'static str {
    match s {
        ReportSeverity::Info => "info",
        ReportSeverity::Warn => "warning",
        ReportSeverity::Error => "error",
    }
}
