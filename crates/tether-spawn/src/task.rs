//! Task adapter for fire-and-forget and parallel work
//!
//! The same propagation pattern as the spawn adapters, applied to short-lived
//! tasks: capture the calling unit's config, restore it inside the new task,
//! execute its callbacks, then run the body.

use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::task::JoinHandle;

use tether_core::{ambient, CallbackError, Config};

/// Default bound for [`TaskHandle::join`] and per-item `map_async` awaits
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_millis(5000);

/// Failures observed when joining a spawned task
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// A propagated callback faulted before the body ran
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// The task did not produce a result within the bound
    #[error("task did not complete within {0:?}")]
    Timeout(Duration),

    /// The task body panicked or was killed
    #[error("task panicked or was killed")]
    Panicked,
}

/// What to do with a spawned task whose awaiting side timed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Abort the spawned task and report the item as timed out
    KillTask,
    /// Report the item as timed out but let the task keep running
    LetRun,
}

/// Options for [`map_async`]
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// How many items run concurrently
    pub max_concurrency: usize,
    /// Yield results in input order (`true`) or completion order (`false`)
    pub ordered: bool,
    /// Per-item await bound
    pub timeout: Duration,
    /// Policy applied when an item hits its bound
    pub on_timeout: TimeoutPolicy,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            max_concurrency: std::thread::available_parallelism().map_or(4, NonZeroUsize::get),
            ordered: true,
            timeout: DEFAULT_JOIN_TIMEOUT,
            on_timeout: TimeoutPolicy::KillTask,
        }
    }
}

/// Handle to one spawned task's pending result
#[derive(Debug)]
pub struct TaskHandle<T> {
    join: JoinHandle<Result<T, TaskError>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Await the result with the default 5 s bound.
    ///
    /// # Errors
    /// See [`TaskHandle::join_timeout`].
    pub async fn join(self) -> Result<T, TaskError> {
        self.join_timeout(DEFAULT_JOIN_TIMEOUT).await
    }

    /// Await the result, blocking the calling unit only.
    ///
    /// On timeout the task itself is left running; only the await gives up.
    ///
    /// # Errors
    /// [`TaskError::Timeout`] on expiry, [`TaskError::Panicked`] if the body
    /// panicked, [`TaskError::Callback`] if propagation faulted.
    pub async fn join_timeout(self, timeout: Duration) -> Result<T, TaskError> {
        match tokio::time::timeout(timeout, self.join).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(TaskError::Panicked),
            Err(_) => Err(TaskError::Timeout(timeout)),
        }
    }
}

/// Run a body on a new task carrying the calling unit's config
pub fn run_async<F, Fut, T>(body: F) -> TaskHandle<T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    spawn_with_config(ambient::current(), body)
}

/// Like [`run_async`], applying the body to caller-supplied args
pub fn run_async_with<A, F, Fut, T>(body: F, args: A) -> TaskHandle<T>
where
    A: Send + 'static,
    F: FnOnce(A) -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    spawn_with_config(ambient::current(), move || body(args))
}

fn spawn_with_config<F, Fut, T>(config: Config, body: F) -> TaskHandle<T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let join = tokio::spawn(ambient::scope(config.clone(), async move {
        config.execute_callbacks()?;
        Ok(body().await)
    }));
    TaskHandle { join }
}

/// Await every handle, bounded by one shared timeout.
///
/// # Errors
/// The first task failure, or [`TaskError::Timeout`] if the whole batch did
/// not finish in time.
pub async fn join_all<T: Send + 'static>(
    handles: Vec<TaskHandle<T>>,
    timeout: Duration,
) -> Result<Vec<T>, TaskError> {
    let gather = async move {
        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.join.await {
                Ok(result) => results.push(result?),
                Err(_) => return Err(TaskError::Panicked),
            }
        }
        Ok(results)
    };
    tokio::time::timeout(timeout, gather)
        .await
        .map_err(|_| TaskError::Timeout(timeout))?
}

/// Map a body over items on concurrent tasks, each carrying the calling
/// unit's config.
///
/// Returns a lazy stream of per-item results: input order when
/// `options.ordered` is set, completion order otherwise. Items that hit the
/// per-item bound yield [`TaskError::Timeout`] and are killed or left
/// running per [`MapOptions::on_timeout`]. No cancellation signal reaches
/// the body; enforcement is on the awaiting side.
pub fn map_async<I, F, Fut, T>(
    items: I,
    body: F,
    options: MapOptions,
) -> BoxStream<'static, Result<T, TaskError>>
where
    I: IntoIterator + Send + 'static,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let captured = ambient::current();
    let MapOptions {
        max_concurrency,
        ordered,
        timeout: per_item,
        on_timeout,
    } = options;
    let concurrency = max_concurrency.max(1);

    let pending = items.into_iter().map(move |item| {
        let config = captured.clone();
        let body = body.clone();
        async move {
            let join = tokio::spawn(ambient::scope(config.clone(), async move {
                config.execute_callbacks()?;
                Ok(body(item).await)
            }));
            let abort = join.abort_handle();
            match tokio::time::timeout(per_item, join).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(TaskError::Panicked),
                Err(_) => {
                    if on_timeout == TimeoutPolicy::KillTask {
                        abort.abort();
                    }
                    Err(TaskError::Timeout(per_item))
                }
            }
        }
    });

    let stream = stream::iter(pending);
    if ordered {
        stream.buffered(concurrency).boxed()
    } else {
        stream.buffer_unordered(concurrency).boxed()
    }
}
