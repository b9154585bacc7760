//! Coordinator-level tests: election, worker semantics, and a real
//! `--child` invocation of the built binary.

use counterd::consts;
use counterd::election::{Role, elect};
use counterd::logger::EventLog;
use counterd::spawner::WorkerMode;
use counterd::worker::run_worker;
use counterd_shm::{CounterRegion, platform};
use std::process::Command;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// ─── Helpers ────────────────────────────────────────────────────────

/// Generate a unique region name for test isolation.
fn test_region_name(suffix: &str) -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static CTR: AtomicU32 = AtomicU32::new(0);
    let id = CTR.fetch_add(1, Ordering::Relaxed);
    format!("coord_test_{}_{id}_{suffix}", platform::current_pid())
}

fn test_log(region: &Arc<CounterRegion>, dir: &tempfile::TempDir) -> EventLog {
    EventLog::new(Arc::clone(region), dir.path().join("events.log"))
}

// ─── Election ───────────────────────────────────────────────────────

#[test]
fn test_exactly_one_master_per_region() {
    let name = test_region_name("roles");

    let (role_a, region_a) = elect(&name).expect("first elect");
    assert_eq!(role_a, Role::Master);
    assert!(region_a.is_owner());

    let (role_b, region_b) = elect(&name).expect("second elect");
    assert_eq!(role_b, Role::Slave);
    assert!(!region_b.is_owner());
}

#[test]
fn test_slave_election_preserves_counter() {
    let name = test_region_name("preserve");

    let (_, master) = elect(&name).expect("master elect");
    master.with_lock(|c| *c = 5).expect("lock");

    let (role, slave) = elect(&name).expect("slave elect");
    assert_eq!(role, Role::Slave);
    assert_eq!(slave.with_lock(|c| *c).expect("lock"), 5);
}

// ─── Worker semantics ───────────────────────────────────────────────

#[test]
fn test_add_worker_adds_ten_and_logs_result() {
    let name = test_region_name("add");
    let region = Arc::new(CounterRegion::create_exclusive(&name).expect("create"));
    region.with_lock(|c| *c = 3).expect("lock");

    let dir = tempfile::tempdir().unwrap();
    let log = test_log(&region, &dir);
    run_worker(&region, &log, WorkerMode::Add);

    assert_eq!(region.with_lock(|c| *c).expect("lock"), 13);

    let content = std::fs::read_to_string(log.path()).unwrap();
    assert!(content.contains("[COPY1] Start:"));
    assert!(content.contains("[COPY1] End:"));
    assert!(content.contains("counter=13"));
}

#[test]
fn test_double_halve_worker_exposes_doubled_value_during_pause() {
    let name = test_region_name("window");
    let region = Arc::new(CounterRegion::create_exclusive(&name).expect("create"));
    region.with_lock(|c| *c = 8).expect("lock");

    let dir = tempfile::tempdir().unwrap();
    let log = test_log(&region, &dir);

    let worker_region = Arc::clone(&region);
    let worker_log = log.clone();
    let handle = thread::spawn(move || {
        run_worker(&worker_region, &worker_log, WorkerMode::DoubleHalve);
    });

    // Mid-pause the worker holds no lock, so the doubled value is
    // observable by everyone else.
    thread::sleep(Duration::from_millis(500));
    assert_eq!(region.with_lock(|c| *c).expect("lock"), 16);

    handle.join().unwrap();
    assert_eq!(region.with_lock(|c| *c).expect("lock"), 8);
}

// ─── End to end ─────────────────────────────────────────────────────

/// Drives the real binary through both `--child` modes against the
/// well-known region name. Single test so the global name is not raced
/// by parallel test threads.
#[test]
fn test_child_invocations_end_to_end() {
    // Clear any stale region left by an interrupted earlier run.
    let _ = CounterRegion::unlink(consts::REGION_NAME);
    let region =
        CounterRegion::create_exclusive(consts::REGION_NAME).expect("create well-known region");

    let dir = tempfile::tempdir().unwrap();
    let exe = env!("CARGO_BIN_EXE_counterd");

    let status = Command::new(exe)
        .args(["--child", "1"])
        .current_dir(dir.path())
        .status()
        .expect("run --child 1");
    assert!(status.success());
    assert_eq!(region.with_lock(|c| *c).expect("lock"), 10);

    let status = Command::new(exe)
        .args(["--child", "2"])
        .current_dir(dir.path())
        .status()
        .expect("run --child 2");
    assert!(status.success());
    assert_eq!(region.with_lock(|c| *c).expect("lock"), 10);

    // Both children logged start and end into the shared log file.
    let content = std::fs::read_to_string(dir.path().join(consts::LOG_FILE)).unwrap();
    assert!(content.contains("[MAIN] Start:"));
    assert!(content.contains("[COPY1] End:"));
    assert!(content.contains("[COPY2] End:"));
}

#[test]
fn test_child_fails_fast_without_a_region() {
    let name = test_region_name("orphan");
    // No region of this name exists; a worker attach must fail, which is
    // what a real `--child` process turns into exit code 1.
    assert!(CounterRegion::attach(&name).is_err());
}
