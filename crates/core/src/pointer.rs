//! JSON Pointer (RFC 6901)
//!
//! A pointer is a sequence of reference tokens addressing a location inside a
//! JSON document. The empty string points at the whole document; every other
//! pointer starts with `/` and separates tokens with `/`. Inside a token `~1`
//! stands for `/` and `~0` stands for `~`.
//!
//! | Pointer | Tokens |
//! |---------|--------|
//! | `` | (root) |
//! | `/title` | `title` |
//! | `/tags/0` | `tags`, `0` |
//! | `/tags/-` | `tags`, `-` (one past the last array element) |
//! | `/a~1b` | `a/b` |
//!
//! # Examples
//!
//! ```
//! use galaxy_core::pointer::{resolve, JsonPointer};
//! use serde_json::json;
//!
//! let doc = json!({"github": {"forks_count": 3}, "tags": ["rust"]});
//!
//! let ptr: JsonPointer = "/github/forks_count".parse().unwrap();
//! assert_eq!(resolve(&doc, &ptr), Some(&json!(3)));
//!
//! let ptr: JsonPointer = "/tags/0".parse().unwrap();
//! assert_eq!(resolve(&doc, &ptr), Some(&json!("rust")));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for pointer parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// Non-empty pointer that does not start with `/`
    #[error("pointer '{0}' must be empty or start with '/'")]
    MissingLeadingSlash(String),
    /// `~` not followed by `0` or `1`
    #[error("invalid escape sequence in pointer '{pointer}' at byte {position}")]
    InvalidEscape {
        /// The offending pointer
        pointer: String,
        /// Byte offset of the `~`
        position: usize,
    },
}

/// A parsed JSON Pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JsonPointer {
    tokens: Vec<String>,
}

impl JsonPointer {
    /// The root pointer (whole document)
    pub fn root() -> Self {
        JsonPointer { tokens: Vec::new() }
    }

    /// Build a pointer from unescaped tokens
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JsonPointer {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Unescaped reference tokens
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True for the root pointer
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True for the root pointer
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// First token, i.e. the top-level field this pointer addresses
    pub fn first(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Append a token (builder pattern)
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.tokens.push(token.into());
        self
    }

    /// Split into the parent pointer and the last token (None if root)
    pub fn split_last(&self) -> Option<(JsonPointer, &str)> {
        let (last, parent) = self.tokens.split_last()?;
        Some((
            JsonPointer {
                tokens: parent.to_vec(),
            },
            last.as_str(),
        ))
    }

    /// Check if this pointer is a strict prefix of another
    ///
    /// `/a` is a proper prefix of `/a/b` but not of `/a` or `/ab`.
    pub fn is_proper_prefix_of(&self, other: &JsonPointer) -> bool {
        self.tokens.len() < other.tokens.len()
            && self
                .tokens
                .iter()
                .zip(other.tokens.iter())
                .all(|(a, b)| a == b)
    }
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(JsonPointer::root());
        }
        if !s.starts_with('/') {
            return Err(PointerError::MissingLeadingSlash(s.to_string()));
        }

        let bytes = s.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'~' && !matches!(bytes.get(i + 1), Some(b'0') | Some(b'1')) {
                return Err(PointerError::InvalidEscape {
                    pointer: s.to_string(),
                    position: i,
                });
            }
        }

        let tokens = s[1..].split('/').map(unescape_token).collect();
        Ok(JsonPointer { tokens })
    }
}

impl TryFrom<String> for JsonPointer {
    type Error = PointerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<JsonPointer> for String {
    fn from(p: JsonPointer) -> Self {
        p.to_string()
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", escape_token(token))?;
        }
        Ok(())
    }
}

/// Escape a reference token (`~` → `~0`, `/` → `~1`)
pub fn escape_token(token: &str) -> String {
    if !token.contains('/') && !token.contains('~') {
        return token.to_string();
    }
    token.replace('~', "~0").replace('/', "~1")
}

/// Unescape a reference token (`~1` → `/`, then `~0` → `~`)
pub fn unescape_token(token: &str) -> String {
    if !token.contains('~') {
        return token.to_string();
    }
    token.replace("~1", "/").replace("~0", "~")
}

/// Parse an array index token
///
/// Only canonical decimal integers are accepted: `0`, `7`, `12`. Leading
/// zeros, signs and the `-` append token return None.
pub fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

/// Resolve a pointer against a document
pub fn resolve<'a>(doc: &'a Value, pointer: &JsonPointer) -> Option<&'a Value> {
    let mut current = doc;
    for token in pointer.tokens() {
        current = match current {
            Value::Object(map) => map.get(token.as_str())?,
            Value::Array(arr) => arr.get(parse_index(token)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve a pointer against a document, mutably
pub fn resolve_mut<'a>(doc: &'a mut Value, pointer: &JsonPointer) -> Option<&'a mut Value> {
    let mut current = doc;
    for token in pointer.tokens() {
        current = match current {
            Value::Object(map) => map.get_mut(token.as_str())?,
            Value::Array(arr) => arr.get_mut(parse_index(token)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// JSON kind name of a value, for error messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
