//! A minimal async/sync Rust client for the AnkiConnect HTTP API.
//!
//! Unlike typed AnkiConnect bindings, this crate treats every action as an
//! opaque pass-through: you supply an action name and a JSON parameter map,
//! and you get back whatever JSON value the add-on returned. All scheduling,
//! deck, and note semantics live on the Anki side.
//!
//! # Quick Start
//!
//! ```no_run
//! use ankilink::{AnkiClient, params};
//!
//! # async fn example() -> ankilink::Result<()> {
//! let client = AnkiClient::new();
//!
//! // Actions without parameters
//! let tags = client.call("getTags").await?;
//! println!("tags: {tags}");
//!
//! // Actions with parameters
//! let result = client
//!     .invoke("changeDeck", params!({ "cards": [1502098034045_i64], "deck": "Japanese::JLPT N3" }))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Blocking callers
//!
//! Code that is not async can use [`AnkiClient::invoke_blocking`], which
//! resolves the calling convention at runtime: it drives the request on a
//! private runtime when no scheduler is active, or hands the work off to an
//! already-running runtime and blocks with a bounded wait. See the
//! [`client`] module docs for the exact strategy order.
//!
//! # Per-call overrides
//!
//! A `host` (string) or `port` (integer) entry in the parameter map retargets
//! that single call and is stripped before the request is serialized; it is
//! never forwarded to AnkiConnect.
//!
//! # Requirements
//!
//! - Anki must be running with the [AnkiConnect](https://ankiweb.net/shared/info/2055492159) add-on installed
//! - By default, the client connects to `http://127.0.0.1:8765`

pub mod client;
pub mod error;
mod request;

pub use client::{AnkiClient, ClientBuilder};
pub use error::{Error, Result};
pub use request::Params;

/// Build a [`Params`] map from JSON object syntax.
///
/// ```
/// use ankilink::params;
///
/// let p = params!({ "cards": [1, 2], "deck": "X" });
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    ({ $($body:tt)* }) => {
        match ::serde_json::json!({ $($body)* }) {
            ::serde_json::Value::Object(map) => map,
            _ => unreachable!("json object literal"),
        }
    };
}
