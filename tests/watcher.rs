// tests/watcher.rs

mod common;
use crate::common::builders::ProjectDir;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use notify::EventKind;
use notify::event::{AccessKind, CreateKind, ModifyKind};
use tokio::sync::mpsc;

use specwatch::Settings;
use specwatch::cli::CliArgs;
use specwatch::engine::{RuntimeEvent, TriggerReason};
use specwatch::watch::{ExcludeSet, is_change, spawn_watcher};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn access_events_are_not_changes() {
    assert!(!is_change(&EventKind::Access(AccessKind::Any)));
    assert!(is_change(&EventKind::Create(CreateKind::File)));
    assert!(is_change(&EventKind::Modify(ModifyKind::Any)));
    assert!(is_change(&EventKind::Any));
}

#[test]
fn exclude_globs_match_relative_to_root() -> TestResult {
    let excludes = ExcludeSet::new(&["**/*.swp".to_string(), "drafts/**".to_string()])?;
    let root = Path::new("/project/src");

    assert!(excludes.matches_path(root, Path::new("/project/src/.index.html.swp")));
    assert!(excludes.matches_path(root, Path::new("/project/src/drafts/x.html")));
    assert!(!excludes.matches_path(root, Path::new("/project/src/index.html")));
    assert!(!excludes.matches_path(root, Path::new("/elsewhere/drafts/x.html")));
    assert!(ExcludeSet::new(&[])?.is_empty());
    Ok(())
}

#[tokio::test]
async fn writing_a_source_file_requests_a_rebuild() -> TestResult {
    init_tracing();
    let project = ProjectDir::new();
    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(64);

    let _handle = spawn_watcher(project.src(), false, ExcludeSet::default(), tx)?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    project.write_src("index.html", "<p>changed</p>");

    match with_timeout(rx.recv()).await {
        Some(RuntimeEvent::RebuildRequested { reason }) => {
            assert_eq!(reason, TriggerReason::FileWatch);
        }
        other => panic!("expected rebuild request, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn excluded_changes_are_ignored() -> TestResult {
    init_tracing();
    let project = ProjectDir::new();
    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(64);

    let excludes = ExcludeSet::new(&["*.swp".to_string()])?;
    let _handle = spawn_watcher(project.src(), false, excludes, tx)?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    project.write_src("index.html.swp", "editor scratch");
    let quiet = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
    assert!(quiet.is_err(), "excluded write triggered {quiet:?}");

    project.write_src("index.html", "real change");
    assert!(with_timeout(rx.recv()).await.is_some());
    Ok(())
}

#[tokio::test]
async fn missing_source_directory_fails_to_watch() {
    init_tracing();
    let project = ProjectDir::new();
    let (tx, _rx) = mpsc::channel::<RuntimeEvent>(4);

    let result = spawn_watcher(project.root().join("absent"), false, ExcludeSet::default(), tx);
    assert!(result.is_err());
}

#[tokio::test]
async fn nested_entry_edits_request_a_rebuild() -> TestResult {
    init_tracing();
    let project = ProjectDir::new();
    project.write_src("spec/index.html", "<p>v1</p>");
    let config = project.write_config("[paths]\nentry = \"spec/index.html\"\n");

    let args = CliArgs::try_parse_from(["specwatch", "--config", config.to_str().unwrap()])?;
    let settings = Settings::load(&args)?;

    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(64);
    let mut handles = Vec::new();
    for root in settings.watch_roots() {
        handles.push(spawn_watcher(&root, false, ExcludeSet::default(), tx.clone())?);
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    project.write_src("spec/index.html", "<p>v2</p>");

    match with_timeout(rx.recv()).await {
        Some(RuntimeEvent::RebuildRequested { reason }) => {
            assert_eq!(reason, TriggerReason::FileWatch);
        }
        other => panic!("expected rebuild request, got {other:?}"),
    }
    Ok(())
}
