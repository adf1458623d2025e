// SPDX-License-Identifier: Apache-2.0

use crate::report::{default_filename, write_report, ReportError, ReportFormat};
use crate::transfer_log::read_transfer_log;
use errata_core::{
    add_container_info, collect_errors, find_flagged, missing_session_record, reconcile,
    unexpected_session_record, AuditError, AuditLog, CollectOptions, ExitCode, Scope,
};
use errata_model::{ContainerType, ErrorRecord};
use errata_platform::Platform;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliFailure {
    pub exit: ExitCode,
    pub message: String,
}

impl CliFailure {
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            exit: ExitCode::Usage,
            message: message.into(),
        }
    }
}

impl From<AuditError> for CliFailure {
    fn from(value: AuditError) -> Self {
        Self {
            exit: value.exit_code(),
            message: value.to_string(),
        }
    }
}

impl From<ReportError> for CliFailure {
    fn from(value: ReportError) -> Self {
        Self {
            exit: ExitCode::Validation,
            message: value.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditArgs {
    pub parent: Option<String>,
    pub destination: Option<String>,
    pub scope: Scope,
    pub format: Option<ReportFormat>,
    pub output: Option<PathBuf>,
    pub delete_error_logs: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct ReconcileArgs {
    pub parent: String,
    pub transfer_log: PathBuf,
    pub modality: String,
    pub format: Option<ReportFormat>,
    pub output: Option<PathBuf>,
}

pub fn run_audit(platform: &dyn Platform, args: &AuditArgs) -> Result<(), CliFailure> {
    let analysis = match (&args.destination, &args.parent) {
        (Some(destination), _) => Some(
            platform
                .get_analysis(destination)
                .map_err(AuditError::from)?,
        ),
        (None, Some(_)) => None,
        (None, None) => {
            return Err(CliFailure::usage("one of --parent or --destination is required"));
        }
    };
    let parent_id = analysis
        .as_ref()
        .map(|a| a.parent.id.clone())
        .or_else(|| args.parent.clone())
        .unwrap_or_default();
    let parent = platform
        .get_container(&parent_id)
        .map_err(AuditError::from)?;

    info!("finding containers with errors under {} {}", parent.container_type, parent.id);
    let mut references = find_flagged(platform, args.scope, &parent)?;
    info!("found {} flagged containers", references.len());
    add_container_info(platform, &mut references)?;

    info!("resolving status for flagged containers");
    let options = CollectOptions {
        delete_resolved: args.delete_error_logs && !args.dry_run,
        remove_stale_tags: !args.dry_run,
    };
    let mut audit_log = AuditLog::new();
    let records = collect_errors(platform, &references, &options, &mut audit_log)?;
    render_events(&audit_log);

    let now = OffsetDateTime::now_utc();
    let path = report_path(args.format, args.output.clone(), &parent.label, now)?;
    let format = resolved_format(args.format, &path)?;
    write_report(&path, format, &records)?;
    info!("wrote error report {}", path.display());

    if let Some(analysis) = analysis {
        if args.dry_run {
            info!("dry run: skipping analysis label update");
        } else {
            let stamp = now.format(&Rfc3339).unwrap_or_default();
            let label = format!("Metadata Error Report: COUNT={} [{stamp}]", records.len());
            platform
                .update_analysis_label(&parent, &analysis.id, &label)
                .map_err(AuditError::from)?;
            info!("updated analysis {} label", analysis.id);
        }
    }
    Ok(())
}

pub fn run_reconcile(platform: &dyn Platform, args: &ReconcileArgs) -> Result<(), CliFailure> {
    let parent = platform
        .get_container(&args.parent)
        .map_err(AuditError::from)?;
    if parent.container_type != ContainerType::Project {
        return Err(CliFailure::usage(format!(
            "reconcile requires a project parent, got {}",
            parent.container_type
        )));
    }

    let rows = read_transfer_log(&args.transfer_log)?;
    info!("read {} transfer log rows", rows.len());
    let sessions = platform
        .list_children(parent.container_type, &parent.id, ContainerType::Session, None)
        .map_err(AuditError::from)?;

    let mut audit_log = AuditLog::new();
    let result = reconcile(&sessions, &rows, &args.modality, &mut audit_log)?;
    render_events(&audit_log);

    let mut records: Vec<ErrorRecord> = result.missing.iter().map(missing_session_record).collect();
    let mut unexpected_refs: Vec<_> = result
        .unexpected
        .into_iter()
        .map(|(_, reference)| reference)
        .collect();
    add_container_info(platform, &mut unexpected_refs)?;
    records.extend(unexpected_refs.iter().map(unexpected_session_record));
    info!(
        "{} sessions missing from the platform, {} unexpected",
        result.missing.len(),
        records.len() - result.missing.len()
    );

    let now = OffsetDateTime::now_utc();
    let path = report_path(args.format, args.output.clone(), &parent.label, now)?;
    let format = resolved_format(args.format, &path)?;
    write_report(&path, format, &records)?;
    info!("wrote reconciliation report {}", path.display());
    Ok(())
}

fn report_path(
    format: Option<ReportFormat>,
    output: Option<PathBuf>,
    label: &str,
    now: OffsetDateTime,
) -> Result<PathBuf, ReportError> {
    match output {
        Some(path) => Ok(path),
        None => Ok(PathBuf::from(default_filename(
            label,
            format.unwrap_or(ReportFormat::Csv),
            now,
        ))),
    }
}

fn resolved_format(flag: Option<ReportFormat>, path: &std::path::Path) -> Result<ReportFormat, ReportError> {
    match flag {
        Some(format) => Ok(format),
        None => ReportFormat::from_path(path),
    }
}

fn render_events(log: &AuditLog) {
    for event in log.events() {
        let detail: Vec<String> = event
            .fields
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        let detail = detail.join(" ");
        if event.kind.is_warning() {
            warn!("{} {detail}", event.kind.as_str());
        } else {
            info!("{} {detail}", event.kind.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errata_model::{Analysis, AnalysisParent, Container, FileEntry, SubjectRef};
    use errata_platform::MemoryPlatform;
    use serde_json::json;
    use std::fs;

    fn tagged(mut container: Container) -> Container {
        container.tags.push("error".to_string());
        container
    }

    fn audit_args(output: PathBuf) -> AuditArgs {
        AuditArgs {
            parent: None,
            destination: Some("an1".to_string()),
            scope: Scope::All,
            format: Some(ReportFormat::Json),
            output: Some(output),
            delete_error_logs: true,
            dry_run: false,
        }
    }

    fn audit_platform() -> MemoryPlatform {
        let project = Container::new("p1", ContainerType::Project, "proj");
        let mut session = tagged(Container::new("s1", ContainerType::Session, "visit-01"));
        session.parents.insert("project".to_string(), "p1".to_string());
        let origin = FileEntry::new("scan.dicom.zip").with_field("modality", json!("MR"));
        session.files = vec![origin, FileEntry::new("scan.dicom.zip.error.log.json")];
        let log_bytes = serde_json::to_vec(&json!([
            {"revalidate": true, "schema": {"type": "string"}, "item": "modality"}
        ]))
        .expect("encode log");
        MemoryPlatform::new()
            .with_container(project)
            .with_container(session)
            .with_child("p1", "s1")
            .with_file_bytes("s1", "scan.dicom.zip.error.log.json", log_bytes)
            .with_analysis(Analysis {
                id: "an1".to_string(),
                label: "audit".to_string(),
                parent: AnalysisParent {
                    id: "p1".to_string(),
                    container_type: ContainerType::Project,
                },
            })
    }

    #[test]
    fn audit_writes_a_report_and_updates_the_analysis_label() {
        let platform = audit_platform();
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("report.json");
        run_audit(&platform, &audit_args(output.clone())).expect("audit");

        let raw = fs::read_to_string(&output).expect("report");
        let records: Vec<ErrorRecord> = serde_json::from_str(&raw).expect("decode");
        assert_eq!(records.len(), 1);
        assert!(records[0].resolved);

        let analysis = platform.get_analysis("an1").expect("analysis");
        assert!(analysis.label.starts_with("Metadata Error Report: COUNT=1"));
    }

    #[test]
    fn dry_run_leaves_the_platform_untouched() {
        let platform = audit_platform();
        let dir = tempfile::tempdir().expect("tempdir");
        let mut args = audit_args(dir.path().join("report.json"));
        args.dry_run = true;
        run_audit(&platform, &args).expect("audit");
        assert!(platform.mutations().is_empty());
        assert_eq!(platform.get_analysis("an1").expect("analysis").label, "audit");
    }

    #[test]
    fn audit_without_parent_or_destination_is_a_usage_error() {
        let platform = MemoryPlatform::new();
        let mut args = audit_args(PathBuf::from("unused.json"));
        args.destination = None;
        let failure = run_audit(&platform, &args).expect_err("must fail");
        assert_eq!(failure.exit, ExitCode::Usage);
    }

    #[test]
    fn reconcile_reports_missing_and_unexpected_sessions() {
        let project = Container::new("p1", ContainerType::Project, "proj");
        let mut session = Container::new("s1", ContainerType::Session, "baseline");
        session.parents.insert("project".to_string(), "p1".to_string());
        session.subject = Some(SubjectRef {
            code: Some("SUB-01".to_string()),
        });
        session.timestamp = Some("2020-01-05T14:30:00Z".to_string());
        let platform = MemoryPlatform::new()
            .with_container(project)
            .with_container(session)
            .with_child("p1", "s1");

        let dir = tempfile::tempdir().expect("tempdir");
        let log_path = dir.path().join("transfer.csv");
        fs::write(
            &log_path,
            "Subject,Timepoint,\"Modality - Exam Date\"\nSUB-02,baseline,\"MR - Feb 01, 2020\"\n",
        )
        .expect("write log");
        let output = dir.path().join("report.csv");
        run_reconcile(
            &platform,
            &ReconcileArgs {
                parent: "p1".to_string(),
                transfer_log: log_path,
                modality: "MR".to_string(),
                format: None,
                output: Some(output.clone()),
            },
        )
        .expect("reconcile");

        let raw = fs::read_to_string(&output).expect("report");
        let mut lines = raw.lines();
        assert_eq!(lines.next(), Some("path,url,error,resolved,_id,type"));
        let body: Vec<&str> = lines.collect();
        assert_eq!(body.len(), 2);
        assert!(body[0].contains("session SUB-02-baseline missing from platform"));
        assert!(body[1].contains("session not present in transfer log"));
        assert!(body[1].contains("s1"));
    }

    #[test]
    fn reconcile_rejects_non_project_parents() {
        let platform = MemoryPlatform::new()
            .with_container(Container::new("s1", ContainerType::Session, "visit-01"));
        let failure = run_reconcile(
            &platform,
            &ReconcileArgs {
                parent: "s1".to_string(),
                transfer_log: PathBuf::from("log.csv"),
                modality: "MR".to_string(),
                format: None,
                output: None,
            },
        )
        .expect_err("must fail");
        assert_eq!(failure.exit, ExitCode::Usage);
    }
}
