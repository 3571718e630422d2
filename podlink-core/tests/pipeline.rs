//! Pipeline behaviour across several libraries sharing one project.

use camino::{Utf8Path, Utf8PathBuf};
use podlink_core::adapters::InMemoryLibrarySource;
use podlink_core::pipeline::{run_integrate, run_status, write_artifacts};
use podlink_core::ports::{LoadedLibrary, WritePort};
use podlink_core::settings::IntegrateSettings;
use podlink_integrate::{TargetState, is_integrated};
use podlink_project::{InMemoryProjectStore, ObjectId, ProjectDocument, SettingValue};
use podlink_types::library::IntegrationTarget;
use podlink_types::report::{LibraryStatus, ReportStatus, ToolInfo};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::collections::BTreeMap;

const PROJECT: &str = "App.xcodeproj";

#[derive(Default)]
struct RecordingWriter {
    files: RefCell<BTreeMap<Utf8PathBuf, Vec<u8>>>,
}

impl WritePort for RecordingWriter {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        self.files.borrow_mut().insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, _path: &Utf8Path) -> anyhow::Result<()> {
        Ok(())
    }
}

fn tool() -> ToolInfo {
    ToolInfo {
        name: "podlink".to_string(),
        version: Some("0.3.1".to_string()),
        commit: None,
    }
}

fn descriptor(label: &str, targets: &[&ObjectId]) -> LoadedLibrary {
    LoadedLibrary {
        path: Utf8PathBuf::from(format!("{label}.json")),
        library: IntegrationTarget {
            product_name: format!("lib{label}.a"),
            label: label.to_string(),
            user_project_path: Utf8PathBuf::from(PROJECT),
            user_target_uuids: targets.iter().map(|t| t.to_string()).collect(),
            xcconfig_path: Utf8PathBuf::from(format!("Pods/{label}.xcconfig")),
            xcconfig_relative_path: format!("Pods/{label}.xcconfig"),
            copy_resources_script_relative_path: format!("Pods/{label}-resources.sh"),
            xcconfig_attributes: [("OTHER_LDFLAGS".to_string(), "-ObjC".to_string())]
                .into_iter()
                .collect(),
        },
    }
}

fn project() -> (ProjectDocument, ObjectId, ObjectId) {
    let mut doc = ProjectDocument::new();
    let app = doc.new_native_target("App", &["Debug", "Release"]).expect("target");
    let tests = doc.new_native_target("AppTests", &["Debug"]).expect("target");
    let debug = doc
        .build_configurations(app.as_str())
        .first()
        .map(|(id, _)| (*id).clone())
        .expect("debug");
    doc.build_configuration_mut(debug.as_str())
        .expect("config")
        .build_settings
        .insert("OTHER_LDFLAGS".to_string(), SettingValue::from("-lxml2"));
    (doc, app, tests)
}

#[test]
fn libraries_sharing_a_project_are_integrated_in_order() {
    let (doc, app, tests) = project();
    let store = InMemoryProjectStore::new();
    store.insert(PROJECT, &doc).expect("insert");
    let source = InMemoryLibrarySource::new(vec![
        descriptor("Tools", &[&app]),
        descriptor("Pods", &[&app, &tests]),
    ]);

    let run = run_integrate(&IntegrateSettings::default(), &source, &store, tool()).expect("run");

    let products: Vec<&str> = run.outcomes.iter().map(|o| o.product_name.as_str()).collect();
    assert_eq!(products, vec!["libPods.a", "libTools.a"]);
    assert_eq!(store.save_count(), 2);

    let saved = ProjectDocument::parse(
        Utf8Path::new(PROJECT),
        &store.contents(Utf8Path::new(PROJECT)).expect("contents"),
    )
    .expect("parse");
    assert!(is_integrated(&saved, app.as_str(), "libPods.a"));
    assert!(is_integrated(&saved, app.as_str(), "libTools.a"));
    assert!(is_integrated(&saved, tests.as_str(), "libPods.a"));

    assert_eq!(run.report.verdict.status, ReportStatus::Warn);
    assert_eq!(run.report.verdict.counts.targets_integrated, 3);
    assert_eq!(run.report.verdict.counts.warnings, 2);
    assert!(!run.policy_block);
}

#[test]
fn second_run_is_up_to_date() {
    let (doc, app, _) = project();
    let store = InMemoryProjectStore::new();
    store.insert(PROJECT, &doc).expect("insert");
    let source = InMemoryLibrarySource::new(vec![descriptor("Pods", &[&app])]);
    let settings = IntegrateSettings::default();

    run_integrate(&settings, &source, &store, tool()).expect("first");
    let run = run_integrate(&settings, &source, &store, tool()).expect("second");

    assert_eq!(store.save_count(), 1);
    assert_eq!(run.report.libraries[0].status, LibraryStatus::UpToDate);
    assert_eq!(run.report.verdict.status, ReportStatus::Pass);
    assert!(run.patch.is_empty());
}

#[test]
fn fail_on_warnings_sets_policy_block() {
    let (doc, app, _) = project();
    let store = InMemoryProjectStore::new();
    store.insert(PROJECT, &doc).expect("insert");
    let source = InMemoryLibrarySource::new(vec![descriptor("Pods", &[&app])]);
    let settings = IntegrateSettings {
        fail_on_warnings: true,
        ..IntegrateSettings::default()
    };

    let run = run_integrate(&settings, &source, &store, tool()).expect("run");

    assert!(run.policy_block);
    assert_eq!(run.report.verdict.status, ReportStatus::Fail);
}

#[test]
fn missing_target_stops_the_run() {
    let (doc, app, _) = project();
    let store = InMemoryProjectStore::new();
    store.insert(PROJECT, &doc).expect("insert");
    let before = store.contents(Utf8Path::new(PROJECT));
    let ghost = ObjectId::new("CCCCCCCCCCCCCCCCCCCCCCCC");
    let source = InMemoryLibrarySource::new(vec![descriptor("Pods", &[&app, &ghost])]);

    let err = match run_integrate(&IntegrateSettings::default(), &source, &store, tool()) {
        Ok(_) => panic!("expected missing target"),
        Err(err) => err,
    };

    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("CCCCCCCCCCCCCCCCCCCCCCCC"));
    assert_eq!(store.contents(Utf8Path::new(PROJECT)), before);
}

#[test]
fn dry_run_writes_patch_artifact_only() {
    let (doc, app, _) = project();
    let store = InMemoryProjectStore::new();
    store.insert(PROJECT, &doc).expect("insert");
    let source = InMemoryLibrarySource::new(vec![descriptor("Pods", &[&app])]);
    let settings = IntegrateSettings {
        dry_run: true,
        ..IntegrateSettings::default()
    };

    let run = run_integrate(&settings, &source, &store, tool()).expect("run");
    let writer = RecordingWriter::default();
    write_artifacts(&run, Utf8Path::new("out"), &writer).expect("write");

    assert_eq!(store.save_count(), 0);
    let files = writer.files.borrow();
    let names: Vec<&str> = files.keys().map(|p| p.as_str()).collect();
    assert_eq!(names, vec!["out/patch.diff", "out/report.json", "out/report.md"]);
    let patch = String::from_utf8(files[Utf8Path::new("out/patch.diff")].clone()).expect("utf8");
    assert!(patch.starts_with("diff --git a/App.xcodeproj b/App.xcodeproj"));

    let report: serde_json::Value =
        serde_json::from_slice(&files[Utf8Path::new("out/report.json")]).expect("json");
    assert_eq!(report["schema"], "podlink.report.v1");
    assert_eq!(report["run"]["dry_run"], true);
    assert_eq!(report["libraries"][0]["status"], "dry_run");
}

#[test]
fn status_reports_each_target() {
    let (doc, app, tests) = project();
    let store = InMemoryProjectStore::new();
    store.insert(PROJECT, &doc).expect("insert");
    run_integrate(
        &IntegrateSettings::default(),
        &InMemoryLibrarySource::new(vec![descriptor("Pods", &[&app])]),
        &store,
        tool(),
    )
    .expect("run");

    let ghost = ObjectId::new("DDDDDDDDDDDDDDDDDDDDDDDD");
    let source = InMemoryLibrarySource::new(vec![descriptor("Pods", &[&app, &tests, &ghost])]);
    let status = run_status(&source, &store).expect("status");

    let states: Vec<TargetState> = status[0].targets.iter().map(|t| t.state).collect();
    assert_eq!(
        states,
        vec![TargetState::Integrated, TargetState::Pending, TargetState::Missing]
    );
    assert_eq!(status[0].descriptor, "Pods.json");
}
