//! # Controller Bridge
//!
//! Routes the game controllers attached to a Linux host to the controller
//! ports of an emulation core.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (first argument, else `config/default.toml`,
//!      else built-in defaults)
//!    - Set up logging with tracing subscriber
//!
//! 2. **Main Loop**
//!    - Rescan `/dev/input` every `rescan_interval_ms`; refresh the
//!      controller session when the set of controller nodes changed
//!    - Run one event reader per controller node, feeding the dispatcher
//!    - Handle Ctrl+C for graceful shutdown

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::{interval, timeout, Duration};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use controller_bridge::config::{Config, LoggingConfig};
use controller_bridge::controller::{ControllerSession, EventDispatcher};
use controller_bridge::host::evdev::{read_events, EvdevHost};
use controller_bridge::host::{HostDevice, HostEvent};
use controller_bridge::sink::InMemorySink;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix of rolling log files
const LOG_FILE_PREFIX: &str = "controller-bridge.log";

/// Event nodes that currently have a reader task
type ActiveReaders = Arc<Mutex<HashSet<PathBuf>>>;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(std::env::args().nth(1))?;
    let _log_guard = init_logging(&config.logging);

    info!("Controller Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let host = Arc::new(EvdevHost::new(&config.input.device_root));
    let sink = Arc::new(InMemorySink::new());
    let session = Arc::new(ControllerSession::new(
        host.clone(),
        sink,
        Arc::new(config.clone()),
        config.input.overlay_port,
    ));
    let dispatcher = EventDispatcher::new(Arc::clone(&session));

    let enumeration_timeout = Duration::from_millis(config.input.enumeration_timeout_ms);
    let mut rescan = interval(Duration::from_millis(config.input.rescan_interval_ms));
    let readers: ActiveReaders = Arc::new(Mutex::new(HashSet::new()));
    let scanning = InFlight::default();
    let refreshing = InFlight::default();
    let mut known_nodes: Option<Vec<PathBuf>> = None;

    info!("Watching {} for controllers", host.root().display());
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = rescan.tick() => {
                let host = Arc::clone(&host);
                let scan = run_blocking(&scanning, enumeration_timeout, "Device scan", move || {
                    host.scan()
                });
                let Some(scanned) = scan.await else {
                    continue;
                };

                let controllers = controller_nodes(scanned);
                let nodes: Vec<PathBuf> =
                    controllers.iter().map(|(path, _)| path.clone()).collect();
                if known_nodes.as_ref() != Some(&nodes) {
                    debug!("Controller nodes changed: {:?}", nodes);
                    let session = Arc::clone(&session);
                    let refresh = run_blocking(
                        &refreshing,
                        enumeration_timeout,
                        "Controller refresh",
                        move || session.refresh(),
                    );
                    known_nodes = refresh.await.map(|_| nodes);
                }

                for (path, device) in controllers {
                    let newly_added = readers
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(path.clone());
                    if newly_added {
                        spawn_reader(path, device, dispatcher.clone(), Arc::clone(&readers));
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    Ok(())
}

/// Loads the configuration named on the command line, else the default file
/// when present, else built-in defaults.
fn load_config(path: Option<String>) -> Result<Config> {
    match path {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load configuration from {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}

/// Installs the tracing subscriber.
///
/// `RUST_LOG` overrides the configured level. With a log directory set, a
/// daily-rolling file layer is added; the returned guard must be held until
/// exit so buffered lines are flushed.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.log_dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logging.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Some(guard)
}

/// Keeps the scanned nodes that belong to a game controller.
fn controller_nodes(scanned: Vec<(PathBuf, HostDevice)>) -> Vec<(PathBuf, HostDevice)> {
    scanned
        .into_iter()
        .filter(|(_, device)| device.sources.is_game_controller())
        .collect()
}

/// Marks a blocking job as running until its guard is dropped.
///
/// A timed-out `spawn_blocking` task keeps its thread; the flag stays set
/// until the work itself returns, so a hung job is never started twice.
#[derive(Debug, Clone, Default)]
struct InFlight(Arc<AtomicBool>);

struct InFlightGuard(Arc<AtomicBool>);

impl InFlight {
    fn try_start(&self) -> Option<InFlightGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(InFlightGuard(Arc::clone(&self.0)))
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs `work` off the async workers, bounded by `limit`.
///
/// Returns `None` when the previous run of `job` is still busy, the task
/// failed or the limit passed.
async fn run_blocking<T, F>(job: &InFlight, limit: Duration, what: &str, work: F) -> Option<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let Some(guard) = job.try_start() else {
        debug!("{} still running, skipping this rescan", what);
        return None;
    };

    let task = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        work()
    });
    match timeout(limit, task).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!("{} task failed: {}", what, e);
            None
        }
        Err(_) => {
            warn!("{} exceeded {:?}, retrying at next rescan", what, limit);
            None
        }
    }
}

/// Spawns the event reader of one controller node.
fn spawn_reader(
    path: PathBuf,
    device: HostDevice,
    dispatcher: EventDispatcher,
    readers: ActiveReaders,
) {
    tokio::spawn(async move {
        let result = read_events(&path, &device, |event| match &event {
            // A button from an unknown controller refreshes the session
            HostEvent::Key(_) => {
                tokio::task::block_in_place(|| dispatcher.dispatch(&event));
            }
            HostEvent::Motion(_) => {
                dispatcher.dispatch(&event);
            }
        })
        .await;

        if let Err(e) = result {
            info!("Stopped reading {}: {}", path.display(), e);
        }
        readers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&path);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use controller_bridge::host::InputSources;

    fn device(sources: InputSources) -> HostDevice {
        HostDevice {
            id: 0,
            name: "Test".to_string(),
            sources,
            controller_number: 1,
            vendor_id: 0,
            product_id: 0,
            axes: Vec::new(),
        }
    }

    #[test]
    fn test_controller_nodes_filters_non_controllers() {
        let scanned = vec![
            (PathBuf::from("/dev/input/event0"), device(InputSources::KEYBOARD)),
            (PathBuf::from("/dev/input/event3"), device(InputSources::GAMEPAD)),
            (PathBuf::from("/dev/input/event4"), device(InputSources::JOYSTICK)),
        ];

        let nodes: Vec<_> = controller_nodes(scanned).into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            nodes,
            vec![PathBuf::from("/dev/input/event3"), PathBuf::from("/dev/input/event4")]
        );
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[input]\noverlay_port = 50\n").unwrap();
        temp_file.flush().unwrap();

        let path = temp_file.path().to_string_lossy().to_string();
        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.input.overlay_port, 50);
    }

    #[tokio::test]
    async fn test_hung_job_is_not_started_twice() {
        let job = InFlight::default();
        let (release, wait) = std::sync::mpsc::channel::<()>();
        let limit = Duration::from_millis(20);

        let hung = run_blocking(&job, limit, "Scan", move || wait.recv().is_ok());
        assert_eq!(hung.await, None);
        assert!(job.is_running());

        // Still blocked: the second run never starts its work
        let started = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&started);
        let second = run_blocking(&job, limit, "Scan", move || flag.store(true, Ordering::SeqCst));
        assert_eq!(second.await, None);
        assert!(!started.load(Ordering::SeqCst));

        release.send(()).unwrap();
        while job.is_running() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let third = run_blocking(&job, Duration::from_secs(5), "Scan", || 7);
        assert_eq!(third.await, Some(7));
    }

    #[test]
    fn test_load_config_missing_explicit_path_fails() {
        let result = load_config(Some("/nonexistent/bridge.toml".to_string()));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("/nonexistent/bridge.toml"));
    }
}
