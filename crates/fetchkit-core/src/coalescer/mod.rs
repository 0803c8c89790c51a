//! Suppression of duplicate concurrent requests.
//!
//! A [`Coalescer`] sits in front of another [`NetworkInteractor`]. The first caller for a
//! given key spawns the actual request as a background task and registers a shared
//! channel for its result. Every caller that arrives with an equal key while that task is
//! still running joins the channel instead of issuing a second request.

use std::collections::HashMap;
use std::sync::Arc;

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use tokio::task::AbortHandle;

use crate::error::{NetworkError, NetworkResult};
use crate::interactor::{NetworkInteractor, Response};
use crate::request::Request;
use crate::utils::CallOnDrop;

mod key;

pub use key::{FullIdentity, KeyStrategy, ReducedFields};

type ResponseChannel = Shared<oneshot::Receiver<NetworkResult<Response>>>;

struct InFlight {
    generation: u64,
    channel: ResponseChannel,
    handle: AbortHandle,
}

struct Registry<S> {
    entries: HashMap<S, InFlight>,
    next_generation: u64,
}

impl<S: KeyStrategy> Registry<S> {
    /// Removes the entry for `key`, unless it has been replaced by newer work.
    fn remove_if_current(&mut self, key: &S, generation: u64) {
        if self
            .entries
            .get(key)
            .is_some_and(|entry| entry.generation == generation)
        {
            self.entries.remove(key);
        }
    }
}

/// Whether a caller started the shared work or joined it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Originator,
    Joiner,
}

/// A [`NetworkInteractor`] that shares one round-trip between concurrent identical requests.
///
/// Requests are considered identical when the [`KeyStrategy`] `S` derives equal keys for
/// them. Only in-flight work is shared: once a request completes, the next call for the
/// same key goes to the inner interactor again.
///
/// The work runs on the Tokio runtime, so dropping the future of a caller never cancels
/// it. Use [`cancel_all`](Self::cancel_all) to abort everything that is in flight.
pub struct Coalescer<I, S = ReducedFields> {
    inner: Arc<I>,
    registry: Arc<Mutex<Registry<S>>>,
}

impl<I> Coalescer<I> {
    /// Creates a coalescer that keys requests by [`ReducedFields`].
    pub fn new(inner: I) -> Self {
        Self::with_strategy(inner)
    }
}

impl<I, S> Coalescer<I, S> {
    /// Creates a coalescer that keys requests with the strategy `S`.
    pub fn with_strategy(inner: I) -> Self {
        Self {
            inner: Arc::new(inner),
            registry: Arc::new(Mutex::new(Registry {
                entries: HashMap::new(),
                next_generation: 0,
            })),
        }
    }

    /// The wrapped interactor.
    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// The number of requests currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.registry.lock().entries.len()
    }

    /// Aborts all in-flight work.
    ///
    /// The registry is empty when this returns. Callers that started the aborted work
    /// receive [`NetworkError::Cancelled`], callers that joined it retry once.
    pub fn cancel_all(&self) {
        let entries = std::mem::take(&mut self.registry.lock().entries);

        let count = entries.len();
        for entry in entries.into_values() {
            entry.handle.abort();
        }

        metric!(counter("coalescer.cancel_all") += 1);
        tracing::debug!(count, "Cancelled all in-flight requests");
    }
}

impl<I, S> Clone for Coalescer<I, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<I, S> Coalescer<I, S>
where
    I: NetworkInteractor + 'static,
    S: KeyStrategy,
{
    /// Joins the in-flight work for `key`, or spawns and registers new work for `request`.
    ///
    /// Lookup and registration happen under a single lock, so two callers can never both
    /// become originators for the same key.
    fn join_or_spawn(&self, key: &S, request: &Request) -> (Role, u64, ResponseChannel) {
        let mut registry = self.registry.lock();

        if let Some(entry) = registry.entries.get(key) {
            metric!(counter("coalescer.channel.hit") += 1);
            tracing::trace!(url = %request.url, "Joining in-flight request");
            return (Role::Joiner, entry.generation, entry.channel.clone());
        }

        metric!(counter("coalescer.channel.miss") += 1);

        let generation = registry.next_generation;
        registry.next_generation += 1;

        let (sender, receiver) = oneshot::channel();

        // Created outside the task so that it is dropped even if the task is aborted
        // before its first poll.
        let remove_token = {
            let registry = Arc::clone(&self.registry);
            let key = key.clone();
            CallOnDrop::new(move || {
                registry.lock().remove_if_current(&key, generation);
            })
        };

        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        let url = request.url.clone();
        let work = async move {
            tracing::debug!(%url, generation, "Starting request");
            let result = inner.response(request).await;
            // Evict before publishing, so late callers either join a channel that will
            // receive data or start new work.
            drop(remove_token);
            tracing::debug!(%url, generation, ok = result.is_ok(), "Request completed");
            sender.send(result).ok();
        };

        let handle = tokio::spawn(work).abort_handle();
        let channel = receiver.shared();

        registry.entries.insert(
            key.clone(),
            InFlight {
                generation,
                channel: channel.clone(),
                handle,
            },
        );
        metric!(gauge("coalescer.in_flight") = registry.entries.len() as u64);

        (Role::Originator, generation, channel)
    }

    async fn coalesce(&self, request: Request) -> NetworkResult<Response> {
        let key = S::derive(&request);
        let (role, generation, channel) = self.join_or_spawn(&key, &request);

        match channel.await {
            Ok(result) => result,
            Err(oneshot::Canceled) if role == Role::Originator => Err(NetworkError::Cancelled),
            Err(oneshot::Canceled) => {
                tracing::debug!(url = %request.url, "Joined request was cancelled, retrying");
                self.registry.lock().remove_if_current(&key, generation);

                let (_, _, channel) = self.join_or_spawn(&key, &request);
                channel.await.unwrap_or(Err(NetworkError::Cancelled))
            }
        }
    }
}

impl<I, S> NetworkInteractor for Coalescer<I, S>
where
    I: NetworkInteractor + 'static,
    S: KeyStrategy,
{
    async fn response(&self, request: Request) -> NetworkResult<Response> {
        self.coalesce(request).await
    }
}
