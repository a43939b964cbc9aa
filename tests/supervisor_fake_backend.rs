// tests/supervisor_fake_backend.rs

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use jac::config::{ConfigFile, StaticCatalog};
use jac::engine::tail::manual_ticks;
use jac::errors::SupervisorError;
use jac::events::TailEvent;
use jac::supervisor::{RunningWorker, Supervisor};
use jac::types::{LaunchMode, NotificationKind};
use jac_test_utils::builders::{ConfigBuilder, WorkerBuilder};
use jac_test_utils::fake_backend::FakeBackend;
use jac_test_utils::sink::CollectingSink;
use jac_test_utils::{init_tracing, with_timeout};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn catalog() -> ConfigFile {
    ConfigBuilder::new()
        .start_delay_secs(15)
        .with_global_env("SPRING_PROFILES_ACTIVE", "dev")
        .with_worker(WorkerBuilder::new("gateway").order(2).build())
        .with_worker(WorkerBuilder::new("billing").order(1).env("SPRING_PROFILES_ACTIVE", "billing").build())
        .with_worker(WorkerBuilder::new("legacy").order(0).inactive().build())
        .build()
}

fn supervisor(
    backend: FakeBackend,
    config: ConfigFile,
) -> (Supervisor<FakeBackend>, Arc<CollectingSink>, StaticCatalog) {
    init_tracing();
    let sink = Arc::new(CollectingSink::new());
    let catalog = StaticCatalog::new(config);
    let sup = Supervisor::new(backend, Arc::new(catalog.clone()), sink.clone());
    (sup, sink, catalog)
}

#[tokio::test]
async fn start_launches_in_the_mode_chosen_by_quiet_mode() -> TestResult {
    let (sup, sink, catalog) = supervisor(FakeBackend::new(), catalog());

    let result = sup.start("billing").await?;
    assert_eq!(result.executable_path, WorkerBuilder::new("billing").build().executable_path);

    let records = sup.backend().launch_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].mode, LaunchMode::Interactive);
    assert_eq!(
        records[0].env,
        vec![
            ("SPRING_PROFILES_ACTIVE".to_string(), "dev".to_string()),
            ("SPRING_PROFILES_ACTIVE".to_string(), "billing".to_string()),
        ]
    );

    let infos = sink.notifications_of(NotificationKind::Info);
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].title, "billing");

    // The catalog is re-read on every call.
    let quiet = ConfigBuilder::new()
        .quiet_mode(true)
        .with_worker(WorkerBuilder::new("orders").build())
        .build();
    catalog.replace(quiet);
    sup.start("orders").await?;
    assert_eq!(sup.backend().launch_records()[1].mode, LaunchMode::Silent);
    Ok(())
}

#[tokio::test]
async fn explicit_mode_overrides_quiet_mode() -> TestResult {
    let config = ConfigBuilder::new()
        .quiet_mode(true)
        .with_worker(WorkerBuilder::new("billing").build())
        .build();
    let (sup, _sink, _catalog) = supervisor(FakeBackend::new(), config);
    let sup = sup.with_launch_mode(LaunchMode::Interactive);

    sup.start("billing").await?;
    assert_eq!(sup.backend().launch_records()[0].mode, LaunchMode::Interactive);
    Ok(())
}

#[tokio::test]
async fn start_refuses_a_worker_whose_archive_is_running() -> TestResult {
    let billing_jar = WorkerBuilder::new("billing").build().executable_path;
    let backend = FakeBackend::new().with_running(4242, &billing_jar);
    let (sup, sink, _catalog) = supervisor(backend, catalog());

    match sup.start("billing").await {
        Err(SupervisorError::AlreadyRunning(name)) => assert_eq!(name, "billing"),
        other => panic!("expected AlreadyRunning, got {other:?}"),
    }
    assert!(sup.backend().launch_attempts().is_empty());

    let errors = sink.notifications_of(NotificationKind::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("already running"));
    Ok(())
}

#[tokio::test]
async fn starting_twice_is_caught_by_discovery() -> TestResult {
    let (sup, _sink, _catalog) = supervisor(FakeBackend::new(), catalog());

    sup.start("gateway").await?;
    assert!(matches!(
        sup.start("gateway").await,
        Err(SupervisorError::AlreadyRunning(_))
    ));
    assert_eq!(sup.backend().launched(), vec!["gateway"]);
    Ok(())
}

#[tokio::test]
async fn start_prefers_the_active_entry_over_an_inactive_namesake() -> TestResult {
    let config = ConfigBuilder::new()
        .with_worker(WorkerBuilder::new("reports").jar("/opt/old/reports.jar").inactive().build())
        .with_worker(WorkerBuilder::new("reports").jar("/opt/new/reports.jar").build())
        .with_worker(WorkerBuilder::new("archive").jar("/opt/archive/archive.jar").inactive().build())
        .build();
    let (sup, _sink, _catalog) = supervisor(FakeBackend::new(), config);

    let result = sup.start("reports").await?;
    assert_eq!(result.executable_path, std::path::PathBuf::from("/opt/new/reports.jar"));

    // A name only an inactive entry carries can still be started by hand.
    let result = sup.start("archive").await?;
    assert_eq!(result.executable_path, std::path::PathBuf::from("/opt/archive/archive.jar"));
    Ok(())
}

#[tokio::test]
async fn unknown_worker_is_reported() {
    let (sup, sink, _catalog) = supervisor(FakeBackend::new(), catalog());

    assert!(matches!(
        sup.start("nope").await,
        Err(SupervisorError::UnknownWorker(name)) if name == "nope"
    ));
    assert_eq!(sink.notifications_of(NotificationKind::Error).len(), 1);
}

#[tokio::test]
async fn discovery_failure_surfaces_as_an_error() {
    let (sup, sink, _catalog) = supervisor(FakeBackend::new().failing_discovery(), catalog());

    assert!(matches!(
        sup.running_workers().await,
        Err(SupervisorError::Discovery(_))
    ));
    assert!(matches!(sup.start("billing").await, Err(SupervisorError::Discovery(_))));
    assert_eq!(sink.notifications_of(NotificationKind::Error).len(), 2);
}

#[tokio::test]
async fn running_workers_joins_discovery_with_the_catalog() -> TestResult {
    let billing_jar = WorkerBuilder::new("billing").build().executable_path;
    let backend = FakeBackend::new()
        .with_running(10, &billing_jar)
        .with_running(11, "/opt/unrelated/tool.jar");
    let (sup, _sink, _catalog) = supervisor(backend, catalog());

    assert_eq!(
        sup.running_workers().await?,
        vec![RunningWorker {
            name: "billing".to_string(),
            pid: 10,
            executable_path: billing_jar,
        }]
    );
    assert!(sup.is_running("billing").await?);
    assert!(!sup.is_running("gateway").await?);
    Ok(())
}

#[tokio::test]
async fn status_lists_every_catalog_entry() -> TestResult {
    let gateway_jar = WorkerBuilder::new("gateway").build().executable_path;
    let backend = FakeBackend::new().with_running(77, &gateway_jar);
    let (sup, _sink, _catalog) = supervisor(backend, catalog());

    let status = sup.status().await?;
    let summary: Vec<(&str, Option<u32>, bool)> = status
        .iter()
        .map(|s| (s.name.as_str(), s.pid, s.active))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("gateway", Some(77), true),
            ("billing", None, true),
            ("legacy", None, false),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn stop_terminates_the_matching_process() -> TestResult {
    let billing_jar = WorkerBuilder::new("billing").build().executable_path;
    let backend = FakeBackend::new().with_running(10, &billing_jar);
    let (sup, sink, _catalog) = supervisor(backend, catalog());

    assert_eq!(sup.stop("billing").await?, 10);
    assert_eq!(sup.backend().terminated(), vec![10]);

    let successes = sink.notifications_of(NotificationKind::Success);
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].title, "billing");

    assert!(matches!(
        sup.stop("billing").await,
        Err(SupervisorError::NotRunning(name)) if name == "billing"
    ));
    Ok(())
}

#[tokio::test]
async fn stop_all_keeps_going_after_a_failure() -> TestResult {
    let jar = |name: &str| WorkerBuilder::new(name).build().executable_path;
    let backend = FakeBackend::new()
        .with_running(1, jar("gateway"))
        .with_running(2, jar("billing"))
        .with_running(3, jar("legacy"))
        .failing_terminate(2);
    let (sup, sink, _catalog) = supervisor(backend, catalog());

    let report = sup.stop_all().await?;

    assert_eq!(report.stopped, vec!["gateway", "legacy"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "billing");
    assert!(!report.is_clean());
    assert_eq!(sup.backend().terminated(), vec![1, 3]);

    assert_eq!(sink.notifications_of(NotificationKind::Success).len(), 2);
    let errors = sink.notifications_of(NotificationKind::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].title, "billing");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn start_all_uses_order_delay_and_duplicate_check() -> TestResult {
    let gateway_jar = WorkerBuilder::new("gateway").build().executable_path;
    let backend = FakeBackend::new().with_running(5, &gateway_jar);
    let (sup, sink, _catalog) = supervisor(backend, catalog());

    let start = tokio::time::Instant::now();
    let handle = sup.start_all()?.ok_or("bulk start was not scheduled")?;
    assert!(sup.is_bulk_start_running());
    assert!(sup.start_all()?.is_none());

    let summary = handle.await?;

    // billing (order 1) first, gateway (order 2) already running, legacy inactive.
    assert_eq!(summary.started, vec!["billing"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "gateway");
    assert_eq!(start.elapsed(), Duration::from_secs(15));
    assert_eq!(sup.backend().launched(), vec!["billing"]);
    assert!(!sup.is_bulk_start_running());

    let warns = sink.notifications_of(NotificationKind::Warn);
    assert!(warns.iter().any(|n| n.message == "Bulk start is already in progress"));
    assert!(warns.iter().any(|n| n.message == "1 started, 1 failed"));
    Ok(())
}

#[tokio::test]
async fn tail_follows_the_worker_log_file() -> TestResult {
    let dir = tempdir()?;
    let config = ConfigBuilder::new()
        .log_dir(dir.path())
        .tail_batch_lines(1)
        .with_worker(WorkerBuilder::new("billing").build())
        .build();
    let log_path = dir.path().join("jac-billing.log");
    std::fs::write(&log_path, "Started BillingApplication\nready\n")?;

    let (sup, sink, _catalog) = supervisor(FakeBackend::new(), config);

    let (ticks, source) = manual_ticks();
    let handle = sup.tail_with("billing", source)?;
    assert!(sup.is_tailing());
    assert!(ticks.advance().await);

    assert!(matches!(
        sup.tail("billing"),
        Err(SupervisorError::Tail(jac::errors::TailError::AlreadyRunning))
    ));

    sup.stop_tail();
    with_timeout(handle).await?;

    assert_eq!(
        sink.tail_events(),
        vec![
            TailEvent::Started(log_path),
            TailEvent::Lines(vec!["Started BillingApplication".to_string()]),
            TailEvent::Lines(vec!["ready".to_string()]),
            TailEvent::Stopped,
        ]
    );
    assert_eq!(sink.notifications_of(NotificationKind::Error).len(), 1);
    Ok(())
}

#[tokio::test]
async fn tail_of_unknown_worker_is_rejected() {
    let (sup, _sink, _catalog) = supervisor(FakeBackend::new(), catalog());
    assert!(matches!(
        sup.tail("nope"),
        Err(SupervisorError::UnknownWorker(_))
    ));
    assert!(!sup.is_tailing());
}
