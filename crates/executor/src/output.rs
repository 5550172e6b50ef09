//! Output enum for command execution results, and the response envelope.
//!
//! Every command produces exactly one output type. This mapping is deterministic:
//! the same command always produces the same output variant (though the values
//! may differ based on store state).

use http::StatusCode;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Successful command execution results.
///
/// | Command | Output |
/// |---------|--------|
/// | `List` | `Records` |
/// | `Get`, `Upsert`, `Patch` | `Record` |
/// | `Create` | `Created` |
/// | `Destroy` | `Deleted` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// Rendered records, in store order
    Records(Vec<Value>),

    /// One rendered record
    Record(Value),

    /// A freshly created record
    Created(Value),

    /// The record was removed
    Deleted,
}

impl Output {
    /// Status code of a successful command
    pub fn status(&self) -> StatusCode {
        match self {
            Output::Records(_) | Output::Record(_) => StatusCode::OK,
            Output::Created(_) => StatusCode::CREATED,
            Output::Deleted => StatusCode::NO_CONTENT,
        }
    }

    /// Response body (None for "no content")
    pub fn into_body(self) -> Option<Value> {
        match self {
            Output::Records(records) => Some(Value::Array(records)),
            Output::Record(record) | Output::Created(record) => Some(record),
            Output::Deleted => None,
        }
    }
}

/// What the transport layer sends back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Status code
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    /// JSON body, None for an empty body
    pub body: Option<Value>,
}

fn serialize_status<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

impl Response {
    /// Response with a body
    pub fn new(status: StatusCode, body: Option<Value>) -> Self {
        Response { status, body }
    }

    /// Response for a successful command
    pub fn from_output(output: Output) -> Self {
        Response {
            status: output.status(),
            body: output.into_body(),
        }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body, or JSON null for an empty body
    pub fn body_or_null(&self) -> &Value {
        static NULL: Value = Value::Null;
        self.body.as_ref().unwrap_or(&NULL)
    }
}
