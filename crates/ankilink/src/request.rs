//! Wire types and response validation for the AnkiConnect protocol.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// The AnkiConnect protocol version this crate speaks.
pub(crate) const API_VERSION: u8 = 6;

/// A JSON parameter map for an action.
///
/// Entirely opaque to this crate apart from the reserved `host` and `port`
/// override keys, which are stripped before serialization.
pub type Params = Map<String, Value>;

/// Settings that only exist at construction time. Supplying one per call is
/// an error rather than a silent no-op.
const CONSTRUCTION_ONLY_KEYS: &[&str] = &["async_mode", "force_async"];

/// The request format expected by AnkiConnect.
#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    /// The action to perform.
    pub action: &'a str,
    /// The API version (always 6).
    pub version: u8,
    /// Parameters for the action, overrides already removed.
    pub params: &'a Params,
}

impl<'a> WireRequest<'a> {
    pub fn new(action: &'a str, params: &'a Params) -> Self {
        Self {
            action,
            version: API_VERSION,
            params,
        }
    }
}

/// Strip the `host`/`port` override keys from `params` and resolve the
/// address for this call, falling back to the instance defaults.
///
/// Also rejects construction-only settings smuggled in as params.
pub(crate) fn resolve_address(
    params: &mut Params,
    default_host: &str,
    default_port: u16,
) -> Result<String> {
    for key in CONSTRUCTION_ONLY_KEYS {
        if params.contains_key(*key) {
            return Err(Error::Config(format!(
                "'{key}' can only be set when building the client, \
                 not per call"
            )));
        }
    }

    let host = match params.remove("host") {
        Some(Value::String(host)) => host,
        Some(other) => {
            return Err(Error::Config(format!(
                "'host' override must be a string, got: {other}"
            )));
        }
        None => default_host.to_owned(),
    };
    let port = match params.remove("port") {
        Some(value) => value
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .ok_or_else(|| {
                Error::Config(format!("'port' override must be a port number, got: {value}"))
            })?,
        None => default_port,
    };

    Ok(format!("{host}:{port}"))
}

/// Validate the `{result, error}` shape of a decoded response and unwrap it.
///
/// The contract is exactly two fields. `error` non-null is a failure no
/// matter what `result` holds; `error` null makes `result` authoritative,
/// including when it is `null` or `false`.
pub(crate) fn unwrap_response(response: Value) -> Result<Value> {
    let Value::Object(mut fields) = response else {
        return Err(Error::Protocol(format!(
            "response is not a JSON object: \"{response}\""
        )));
    };

    if fields.len() != 2 {
        return Err(Error::Protocol(format!(
            "response has an unexpected number of fields: {}, expected 2",
            fields.len()
        )));
    }
    if !fields.contains_key("error") {
        return Err(Error::Protocol(format!(
            "response is missing the \"error\" field: \"{}\"",
            Value::Object(fields)
        )));
    }
    let Some(result) = fields.remove("result") else {
        return Err(Error::Protocol(format!(
            "response is missing the \"result\" field: \"{}\"",
            Value::Object(fields)
        )));
    };

    match &fields["error"] {
        Value::Null => Ok(result),
        Value::String(message) => Err(Error::Action(message.clone())),
        other => Err(Error::Action(other.to_string())),
    }
}
