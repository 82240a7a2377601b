//! Error types for the ankilink crate.
//!
//! Every failure of a single invocation maps to exactly one variant; nothing
//! is retried or downgraded. The most common errors you'll encounter are:
//!
//! - [`Error::Transport`]: Anki is not running, AnkiConnect is not installed,
//!   or the address is wrong. The message always names the address attempted.
//! - [`Error::Action`]: AnkiConnect itself rejected the action (e.g. deck not
//!   found). The message is the literal error string from the add-on.
//!
//! # Example
//!
//! ```no_run
//! use ankilink::{AnkiClient, Error};
//!
//! # async fn example() {
//! let client = AnkiClient::new();
//!
//! match client.call("getTags").await {
//!     Ok(tags) => println!("{tags}"),
//!     Err(Error::Transport { address, .. }) => {
//!         eprintln!("could not reach AnkiConnect at {address}");
//!     }
//!     Err(e) => eprintln!("error: {e}"),
//! }
//! # }
//! ```

use std::time::Duration;

use thiserror::Error;

/// The error type for AnkiConnect invocations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced an HTTP response.
    ///
    /// Raised for connection refused, unresolved hosts, and any other
    /// client-level network failure.
    #[error(
        "error reaching AnkiConnect: '{source}': is Anki open? is the \
         ankiconnect add-on enabled? is your firewall configured? \
         Address is '{address}'"
    )]
    Transport {
        /// The `{host}:{port}` address the request was sent to.
        address: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response did not conform to the `{result, error}` wire contract,
    /// or was not valid JSON. The message states what was actually received.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// AnkiConnect reported a semantic failure.
    ///
    /// The message is the remote error string verbatim. Common messages
    /// include "deck was not found" and "cannot create note because it
    /// is a duplicate".
    #[error("received error: '{0}'")]
    Action(String),

    /// The bounded wait for a call handed off to another thread's runtime
    /// expired.
    #[error(
        "timed out after {0:?} waiting for the runtime to finish the call; \
         all calling strategies were exhausted"
    )]
    Timeout(Duration),

    /// A construction-only setting was supplied as a per-call override, or
    /// an override had the wrong type.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A specialized Result type for AnkiConnect invocations.
pub type Result<T> = std::result::Result<T, Error>;
