// tests/runtime_backend.rs

mod common;
use crate::common::builders::ProjectDir;
use crate::common::fake_backend::FakeBackend;
use crate::common::fake_builder::FakeBuilder;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use specwatch::build::BuildOptions;
use specwatch::engine::{
    CoreRuntime, RebuildOutcome, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason,
};
use specwatch::fs::RealFileSystem;
use specwatch::rebuild::{RealRebuildBackend, Rebuilder};
use specwatch::resolve::Resolver;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn once_mode_runs_single_rebuild_and_exits() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let started = Arc::new(Mutex::new(Vec::new()));
    let backend = FakeBackend::new(rt_tx.clone(), started.clone());

    rt_tx
        .send(RuntimeEvent::RebuildRequested {
            reason: TriggerReason::Startup,
        })
        .await?;

    let core = CoreRuntime::new(RuntimeOptions {
        exit_when_idle: true,
    });
    let summary = with_timeout(Runtime::new(core, rt_rx, backend).run()).await?;

    assert_eq!(*started.lock().unwrap(), vec![TriggerReason::Startup]);
    assert_eq!(summary.started, 1);
    assert_eq!(summary.succeeded, 1);
    Ok(())
}

#[tokio::test]
async fn failed_outcomes_are_counted() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let started = Arc::new(Mutex::new(Vec::new()));
    let backend = FakeBackend::new(rt_tx.clone(), started.clone())
        .with_outcomes(&[RebuildOutcome::Failed]);

    rt_tx
        .send(RuntimeEvent::RebuildRequested {
            reason: TriggerReason::Startup,
        })
        .await?;

    let core = CoreRuntime::new(RuntimeOptions {
        exit_when_idle: true,
    });
    let summary = with_timeout(Runtime::new(core, rt_rx, backend).run()).await?;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 0);
    Ok(())
}

#[tokio::test]
async fn shutdown_request_stops_a_watching_runtime() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let started = Arc::new(Mutex::new(Vec::new()));
    let backend = FakeBackend::new(rt_tx.clone(), started.clone());

    let runtime = Runtime::new(CoreRuntime::new(RuntimeOptions::default()), rt_rx, backend);
    let handle = tokio::spawn(runtime.run());

    rt_tx
        .send(RuntimeEvent::RebuildRequested {
            reason: TriggerReason::FileWatch,
        })
        .await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

    let summary = with_timeout(handle).await??;
    assert_eq!(summary.started, 1);
    assert_eq!(*started.lock().unwrap(), vec![TriggerReason::FileWatch]);
    Ok(())
}

#[tokio::test]
async fn burst_of_changes_during_slow_build_never_overlaps() -> TestResult {
    init_tracing();
    let project = ProjectDir::new();
    project.write_src("index.html", "v1");

    let builder = FakeBuilder::echo().with_delay(Duration::from_millis(200));
    let fs = Arc::new(RealFileSystem);
    let rebuilder = Arc::new(Rebuilder::new(
        Arc::new(builder.clone()),
        Resolver::new(fs.clone(), project.out(), project.src()),
        fs,
        project.src().join("index.html"),
        project.out().join("index.html"),
        BuildOptions::default(),
    ));

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let backend = RealRebuildBackend::new(rebuilder, rt_tx.clone());

    rt_tx
        .send(RuntimeEvent::RebuildRequested {
            reason: TriggerReason::Startup,
        })
        .await?;

    let core = CoreRuntime::new(RuntimeOptions {
        exit_when_idle: true,
    });
    let handle = tokio::spawn(Runtime::new(core, rt_rx, backend).run());

    // While the first build sleeps, the sources change several times.
    tokio::time::sleep(Duration::from_millis(50)).await;
    project.write_src("index.html", "v2");
    for _ in 0..5 {
        rt_tx
            .send(RuntimeEvent::RebuildRequested {
                reason: TriggerReason::FileWatch,
            })
            .await?;
    }

    let summary = with_timeout(handle).await??;

    assert_eq!(summary.started, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(builder.calls(), 2);
    assert_eq!(builder.max_in_flight(), 1);
    assert_eq!(project.read_out("index.html").as_deref(), Some("v2"));
    Ok(())
}

#[tokio::test]
async fn panicking_build_counts_as_failed_and_runtime_moves_on() -> TestResult {
    init_tracing();
    let project = ProjectDir::new();
    project.write_src("index.html", "after panic");

    let builder = FakeBuilder::panic_once();
    let fs = Arc::new(RealFileSystem);
    let rebuilder = Arc::new(Rebuilder::new(
        Arc::new(builder.clone()),
        Resolver::new(fs.clone(), project.out(), project.src()),
        fs,
        project.src().join("index.html"),
        project.out().join("index.html"),
        BuildOptions::default(),
    ));

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let backend = RealRebuildBackend::new(rebuilder, rt_tx.clone());

    rt_tx
        .send(RuntimeEvent::RebuildRequested {
            reason: TriggerReason::Startup,
        })
        .await?;
    rt_tx
        .send(RuntimeEvent::RebuildRequested {
            reason: TriggerReason::FileWatch,
        })
        .await?;

    let core = CoreRuntime::new(RuntimeOptions {
        exit_when_idle: true,
    });
    let summary = with_timeout(Runtime::new(core, rt_rx, backend).run()).await?;

    assert_eq!(summary.started, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(builder.calls(), 2);
    assert_eq!(project.read_out("index.html").as_deref(), Some("after panic"));
    Ok(())
}
