//! # counterd
//!
//! Cross-process shared-counter coordinator.
//!
//! Invoked without arguments the process races to create the shared
//! region: the winner becomes the master and runs the periodic scheduler
//! plus the console input task; a loser reports that a coordinator is
//! already running and exits. Invoked with `--child <1|2>` (the form the
//! master's spawn cycle uses) the process skips election, attaches as a
//! slave, performs exactly one counter operation, and exits.

use clap::Parser;
use counterd::consts;
use counterd::election::{self, Role};
use counterd::logger::{EventLog, now_string};
use counterd::scheduler::{self, Scheduler};
use counterd::spawner::WorkerMode;
use counterd::worker;
use counterd_shm::{CounterRegion, platform};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// counterd, the master/slave shared-counter coordinator
#[derive(Parser, Debug)]
#[command(name = "counterd")]
#[command(version)]
#[command(about = "Master/slave shared-counter coordinator over POSIX shared memory")]
struct Args {
    /// Run as a spawned worker copy: mode 1 adds 10 to the counter,
    /// mode 2 doubles it, waits 2 s, then halves it.
    #[arg(long, value_name = "MODE", value_parser = clap::value_parser!(u8).range(1..=2))]
    child: Option<u8>,

    /// Remove a stale shared region left behind by a crashed master, then
    /// exit.
    #[arg(long, conflicts_with = "child")]
    remove: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output diagnostics in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }
}

fn setup_tracing(args: &Args) {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if args.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.remove {
        CounterRegion::unlink(consts::REGION_NAME)?;
        info!("region '{}' removed", consts::REGION_NAME);
        return Ok(());
    }

    if let Some(mode_arg) = args.child {
        let mode = WorkerMode::from_arg(mode_arg).ok_or("worker mode must be 1 or 2")?;
        return run_child(mode);
    }

    run_coordinator()
}

/// Worker copy: attach as slave (exit 1 if the region is gone), apply one
/// operation, exit 0.
fn run_child(mode: WorkerMode) -> Result<(), Box<dyn std::error::Error>> {
    let region = Arc::new(CounterRegion::attach(consts::REGION_NAME)?);
    let log = EventLog::new(Arc::clone(&region), consts::LOG_FILE);

    log.append(
        "MAIN",
        &format!(
            "Start: PID={}, time={} (SLAVE)",
            platform::current_pid(),
            now_string()
        ),
    );

    worker::run_worker(&region, &log, mode);
    Ok(())
}

fn run_coordinator() -> Result<(), Box<dyn std::error::Error>> {
    let (role, region) = election::elect(consts::REGION_NAME)?;
    let region = Arc::new(region);
    let log = EventLog::new(Arc::clone(&region), consts::LOG_FILE);
    let pid = platform::current_pid();

    log.append(
        "MAIN",
        &format!("Start: PID={pid}, time={} ({})", now_string(), role.tag()),
    );

    if role == Role::Slave {
        info!(
            "a coordinator already owns region '{}'; exiting",
            consts::REGION_NAME
        );
        return Ok(());
    }

    // The spawn cycle respawns this executable; not knowing our own path
    // is fatal.
    let exe = std::env::current_exe()?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    // The listener blocks on stdin for its whole life; keep the handle
    // unjoined, it holds no strong reference to the region.
    let _input = scheduler::spawn_input_listener(
        Arc::downgrade(&region),
        PathBuf::from(consts::LOG_FILE),
        Arc::clone(&running),
    )?;

    let mut sched = Scheduler::new(Arc::clone(&region), log.clone(), exe, Arc::clone(&running));
    sched.run();

    log.append("MAIN", &format!("Stop: PID={pid}, time={}", now_string()));
    // Dropping the owning region handle unlinks it: clean teardown makes
    // the name reusable for the next master.
    Ok(())
}
