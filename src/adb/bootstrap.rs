// Process-wide ADB client bootstrap
//
// The `adb` executable is asked to start the server first. If that fails the
// server is contacted directly through `adb_client`, which is less reliable
// during startup, so the connection is probed a bounded number of times.
use super::config::{AdbConfig, RetryPolicy};
use super::daemon;
use super::error::{AdbError, AdbResult};
use super::server::AdbHandle;
use super::types::SlotState;
use crate::metrics::{self, LogMetrics, MetricsSink};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex};
use tokio::sync::OnceCell;

/// The three things bootstrap needs from a daemon: a way to start it, a way
/// to build a handle, and a cheap request proving the handle works.
#[allow(async_fn_in_trait)]
pub trait DaemonBackend: Send + Sync {
    type Handle: Send + Sync + 'static;

    async fn start_daemon(&self) -> AdbResult<()>;
    fn connect(&self) -> AdbResult<Self::Handle>;
    async fn probe(&self, handle: &Self::Handle) -> AdbResult<()>;
}

/// Production backend: `adb start-server`, then an `adb_client` handle.
#[derive(Debug, Clone)]
pub struct ShellFirstBackend {
    config: AdbConfig,
}

impl ShellFirstBackend {
    pub fn new(config: AdbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdbConfig {
        &self.config
    }
}

impl DaemonBackend for ShellFirstBackend {
    type Handle = AdbHandle;

    async fn start_daemon(&self) -> AdbResult<()> {
        daemon::start_server(&self.config.adb_path()).await
    }

    fn connect(&self) -> AdbResult<AdbHandle> {
        let address = self.config.server_address()?;
        Ok(AdbHandle::new(address, self.config.probe_timeout))
    }

    async fn probe(&self, handle: &AdbHandle) -> AdbResult<()> {
        handle.list_devices().await.map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    TryPrimary,
    TryFallbackProbe { attempt: u32 },
}

enum ProbeOutcome {
    Ready,
    Retry(AdbError),
    Exhausted(AdbError),
}

fn classify_probe(result: AdbResult<()>, attempt: u32, policy: &RetryPolicy) -> ProbeOutcome {
    match result {
        Ok(()) => ProbeOutcome::Ready,
        Err(e) if attempt < policy.max_attempts => ProbeOutcome::Retry(e),
        Err(e) => ProbeOutcome::Exhausted(e),
    }
}

/// Creates a client handle, shell path first, probed library path second.
///
/// Only exhaustion of the probe budget (or a fallback handle that cannot be
/// built at all) surfaces as an error; a failed primary path is logged and
/// absorbed.
pub async fn create_client<B: DaemonBackend>(
    backend: &B,
    policy: &RetryPolicy,
    sink: &dyn MetricsSink,
) -> AdbResult<B::Handle> {
    let mut fallback: Option<B::Handle> = None;
    let mut phase = Phase::TryPrimary;

    loop {
        phase = match phase {
            Phase::TryPrimary => {
                let started = backend.start_daemon().await;
                let result = started.and_then(|()| backend.connect());
                metrics::report(sink, metrics::CREATE_CLIENT_SHELL, &result);
                match result {
                    Ok(handle) => {
                        log::info!("ADB client created via shell adb command");
                        return Ok(handle);
                    }
                    Err(e) => {
                        log::warn!(
                            "Failed to create adb client using shell adb command. Trying with adb_client.\n{e}"
                        );
                        Phase::TryFallbackProbe { attempt: 1 }
                    }
                }
            }
            Phase::TryFallbackProbe { attempt } => {
                let handle = match fallback.take() {
                    Some(handle) => handle,
                    None => match backend.connect() {
                        Ok(handle) => handle,
                        Err(e) => {
                            metrics::report_err(sink, metrics::CREATE_CLIENT_LIBRARY, &e);
                            return Err(e);
                        }
                    },
                };

                match classify_probe(backend.probe(&handle).await, attempt, policy) {
                    ProbeOutcome::Ready => {
                        metrics::report_ok(sink, metrics::CREATE_CLIENT_LIBRARY);
                        log::info!("ADB client created via adb_client after {attempt} probe(s)");
                        return Ok(handle);
                    }
                    ProbeOutcome::Retry(e) => {
                        log::warn!(
                            "Failed to start adb client (attempt {attempt}/{}). Retrying. {e}",
                            policy.max_attempts
                        );
                        fallback = Some(handle);
                        tokio::time::sleep(policy.delay).await;
                        Phase::TryFallbackProbe {
                            attempt: attempt + 1,
                        }
                    }
                    ProbeOutcome::Exhausted(e) => {
                        log::warn!(
                            "Failed to start adb client (attempt {attempt}/{}). Giving up. {e}",
                            policy.max_attempts
                        );
                        let error = AdbError::ProbeExhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        };
                        metrics::report_err(sink, metrics::CREATE_CLIENT_LIBRARY, &error);
                        return Err(error);
                    }
                }
            }
        };
    }
}

struct Generation<H> {
    // Creation futures currently alive; a dropped caller takes its count with it.
    running: AtomicUsize,
    outcome: OnceCell<AdbResult<Arc<H>>>,
}

impl<H> Generation<H> {
    fn new() -> Self {
        Self {
            running: AtomicUsize::new(0),
            outcome: OnceCell::new(),
        }
    }
}

struct Running<'a>(&'a AtomicUsize);

impl<'a> Running<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Running(counter)
    }
}

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Once-guarded slot holding a shared client handle.
///
/// The first caller runs the creation future; every caller arriving while it
/// runs awaits the same outcome. Failures are cached like successes until
/// [`ClientSlot::reset`].
pub struct ClientSlot<H> {
    current: Mutex<Arc<Generation<H>>>,
}

impl<H> Default for ClientSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ClientSlot<H> {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Arc::new(Generation::new())),
        }
    }

    fn generation(&self) -> Arc<Generation<H>> {
        match self.current.lock() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub async fn get_or_create<F, Fut>(&self, create: F) -> AdbResult<Arc<H>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AdbResult<H>>,
    {
        let generation = self.generation();
        generation
            .outcome
            .get_or_init(|| async {
                let _running = Running::enter(&generation.running);
                create().await.map(Arc::new)
            })
            .await
            .clone()
    }

    pub fn state(&self) -> SlotState {
        let generation = self.generation();
        match generation.outcome.get() {
            Some(Ok(_)) => SlotState::Ready,
            Some(Err(_)) => SlotState::Failed,
            None if generation.running.load(Ordering::SeqCst) > 0 => SlotState::InProgress,
            None => SlotState::Uninitialized,
        }
    }

    /// Drops the cached outcome so the next caller creates a fresh handle.
    /// Callers already awaiting the previous creation still receive its result.
    pub fn reset(&self) {
        let fresh = Arc::new(Generation::new());
        match self.current.lock() {
            Ok(mut current) => *current = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }
}

static CLIENT: LazyLock<ClientSlot<AdbHandle>> = LazyLock::new(ClientSlot::new);

/// Returns the process-wide ADB client handle, creating it on first use.
pub async fn get_client_handle() -> AdbResult<Arc<AdbHandle>> {
    get_client_handle_with(&RetryPolicy::default(), &LogMetrics).await
}

/// Like [`get_client_handle`] with an explicit retry policy and metrics sink.
///
/// Only the caller that actually runs creation uses `policy` and `sink`;
/// callers joining an in-flight or cached outcome have theirs ignored.
pub async fn get_client_handle_with(
    policy: &RetryPolicy,
    sink: &dyn MetricsSink,
) -> AdbResult<Arc<AdbHandle>> {
    CLIENT
        .get_or_create(|| async {
            let backend = ShellFirstBackend::new(AdbConfig::from_env());
            let result = create_client(&backend, policy, sink).await;
            metrics::report(sink, metrics::CREATE_CLIENT, &result);
            result
        })
        .await
}

pub fn client_handle_state() -> SlotState {
    CLIENT.state()
}

pub fn reset_client_handle() {
    CLIENT.reset();
}
