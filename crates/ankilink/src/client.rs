//! The AnkiConnect client and builder.
//!
//! # Calling conventions
//!
//! [`AnkiClient::invoke`] is the async path and is what you want inside any
//! tokio context. [`AnkiClient::invoke_blocking`] serves callers outside
//! async code; it resolves a strategy in this order:
//!
//! 1. A client built with [`ClientBuilder::force_async`] refuses to block at
//!    all and fails with [`Error::Config`].
//! 2. A runtime handle supplied via [`ClientBuilder::handle`] receives the
//!    request as a spawned task; the calling thread blocks on a channel for
//!    at most the configured timeout.
//! 3. If the calling thread is already inside a runtime context, the request
//!    is handed off to that runtime the same way. On a multi-thread runtime
//!    the workers complete it; on a current-thread runtime nothing can drive
//!    it while the caller blocks, so the bounded wait expires into
//!    [`Error::Timeout`] instead of deadlocking.
//! 4. Otherwise a throwaway current-thread runtime drives the request to
//!    completion on the calling thread.
//!
//! For identical server responses, both entry points return identical values.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::runtime::{Builder as RuntimeBuilder, Handle};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::{Error, Result};
use crate::request::{self, Params, WireRequest};

/// Default host for AnkiConnect, scheme included.
const DEFAULT_HOST: &str = "http://127.0.0.1";

/// Default port for AnkiConnect.
const DEFAULT_PORT: u16 = 8765;

/// Default timeout, shared by the HTTP request and the blocking handoff wait.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on simultaneously-open response reads.
const DEFAULT_CONCURRENCY_LIMIT: usize = 50;

/// The client for dispatching actions to AnkiConnect.
///
/// Configuration is fixed at construction; the client is cheap to clone and
/// safe to share across concurrent invocations.
///
/// # Example
///
/// ```no_run
/// use ankilink::AnkiClient;
///
/// # async fn example() -> ankilink::Result<()> {
/// let client = AnkiClient::new();
/// let tags = client.call("getTags").await?;
/// println!("tags: {tags}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AnkiClient {
    http_client: Client,
    default_host: String,
    default_port: u16,
    timeout: Duration,
    force_async: bool,
    read_permits: Arc<Semaphore>,
    handle: Option<Handle>,
}

impl AnkiClient {
    /// Create a client with default settings.
    ///
    /// Connects to `http://127.0.0.1:8765` with a 10 second timeout.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for custom client configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Invoke an action that takes no parameters.
    pub async fn call(&self, action: &str) -> Result<Value> {
        self.invoke(action, Params::new()).await
    }

    /// Invoke an action and return its raw `result` value.
    ///
    /// `params` may carry `host` (string) and `port` (integer) entries to
    /// retarget this single call; they are stripped before serialization and
    /// never reach AnkiConnect. Every other entry is forwarded verbatim.
    ///
    /// A `result` of `null` or `false` is a successful outcome, not an
    /// error; only a non-null `error` field fails the call.
    pub async fn invoke(&self, action: &str, mut params: Params) -> Result<Value> {
        let address =
            request::resolve_address(&mut params, &self.default_host, self.default_port)?;
        let body = WireRequest::new(action, &params);

        debug!(action, %address, "dispatching request");
        let response = self
            .http_client
            .post(&address)
            .json(&body)
            .send()
            .await
            .map_err(|source| Error::Transport {
                address: address.clone(),
                source,
            })?;

        // The permit bounds response consumption only; the POST above is
        // submitted unconditionally.
        let _permit = self
            .read_permits
            .acquire()
            .await
            .expect("response semaphore is never closed");
        let raw = response.text().await.map_err(|source| Error::Transport {
            address,
            source,
        })?;
        let decoded: Value = serde_json::from_str(&raw)
            .map_err(|e| Error::Protocol(format!("response is not valid JSON: {e}")))?;

        debug!(action, "response received");
        request::unwrap_response(decoded)
    }

    /// Invoke an action from non-async code, resolving the calling
    /// convention at runtime (see the [module docs](self) for the strategy
    /// order).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ankilink::{AnkiClient, Params};
    ///
    /// # fn example() -> ankilink::Result<()> {
    /// let client = AnkiClient::new();
    /// let tags = client.invoke_blocking("getTags", Params::new())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn invoke_blocking(&self, action: &str, params: Params) -> Result<Value> {
        if self.force_async {
            return Err(Error::Config(
                "client was built with force_async; call `invoke` from an \
                 async context instead"
                    .into(),
            ));
        }

        if let Some(handle) = &self.handle {
            debug!(action, "handing call off to the configured runtime");
            return self.handoff(handle.clone(), action, params);
        }

        if let Ok(handle) = Handle::try_current() {
            debug!(action, "handing call off to the ambient runtime");
            return self.handoff(handle, action, params);
        }

        debug!(action, "driving call on a private runtime");
        let runtime = RuntimeBuilder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build a runtime for the blocking call");
        runtime.block_on(self.invoke(action, params))
    }

    /// Spawn the invocation onto `handle` and block the calling thread for
    /// at most the configured timeout.
    fn handoff(&self, handle: Handle, action: &str, params: Params) -> Result<Value> {
        let (tx, rx) = mpsc::channel();
        let client = self.clone();
        let action = action.to_owned();
        handle.spawn(async move {
            // The receiver gives up on timeout, so the send may fail.
            let _ = tx.send(client.invoke(&action, params).await);
        });
        match rx.recv_timeout(self.timeout) {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }
}

impl Default for AnkiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating a customized [`AnkiClient`].
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use ankilink::AnkiClient;
///
/// let client = AnkiClient::builder()
///     .host("http://localhost")
///     .port(8765)
///     .timeout(Duration::from_secs(60))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    default_host: String,
    default_port: u16,
    timeout: Duration,
    force_async: bool,
    concurrency_limit: usize,
    handle: Option<Handle>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            default_host: DEFAULT_HOST.to_string(),
            default_port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            force_async: false,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            handle: None,
        }
    }

    /// Set the default host, scheme included.
    ///
    /// Defaults to `http://127.0.0.1`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.default_host = host.into();
        self
    }

    /// Set the default port.
    ///
    /// Defaults to `8765`.
    pub fn port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Set the timeout for the HTTP request and the blocking handoff wait.
    ///
    /// Defaults to 10 seconds. Bulk actions (`sync`, large `findNotes`) can
    /// legitimately take longer; raise this when calling them.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    /// Make [`AnkiClient::invoke_blocking`] refuse to run, for callers who
    /// know they are always in an async context.
    ///
    /// Defaults to `false`.
    pub fn force_async(mut self, force_async: bool) -> Self {
        self.force_async = force_async;
        self
    }

    /// Cap the number of simultaneously-open response reads.
    ///
    /// Defaults to 50. Request submission is not gated, only consumption of
    /// the responses, which is what actually ties up the add-on. A limit of
    /// 0 would gate every read forever, so it is clamped to 1.
    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    /// Supply a runtime handle for [`AnkiClient::invoke_blocking`] to hand
    /// calls off to, for clients constructed on one thread and used to block
    /// on another.
    pub fn handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Build the client.
    pub fn build(self) -> AnkiClient {
        let http_client = Client::builder()
            .timeout(self.timeout)
            .build()
            .expect("failed to build HTTP client");

        AnkiClient {
            http_client,
            default_host: self.default_host,
            default_port: self.default_port,
            timeout: self.timeout,
            force_async: self.force_async,
            read_permits: Arc::new(Semaphore::new(self.concurrency_limit)),
            handle: self.handle,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
