//! Account credentials
//!
//! Collections built `with_credentials` store a `password` digest and its
//! `salt` instead of the clear password. [`prepare_credentials`] runs before
//! validation on every write and decides whether the password changed:
//!
//! | Payload `password` | Effect |
//! |--------------------|--------|
//! | absent | stored digest and salt carried over |
//! | equal to stored digest | unchanged, salt carried over |
//! | empty, no OAuth provider | `Invalid password` |
//! | empty, OAuth provider | no password stored |
//! | anything else | fresh salt, password replaced by its digest |
//!
//! A client never sets `salt` directly.

use crate::error::{Error, Result};
use crate::password::{self, KdfParams};
use crate::record::ID_FIELD;
use crate::schema::{FieldErrorKind, ValidationReport};
use serde_json::{json, Map, Value};

/// Providers whose accounts need neither email nor password
pub const OAUTH_PROVIDERS: [&str; 4] = ["github", "twitter", "facebook", "google"];

/// Field holding the digest
pub const PASSWORD_FIELD: &str = "password";

/// Field holding the base64 salt
pub const SALT_FIELD: &str = "salt";

const EMAIL_FIELD: &str = "email";
const PROVIDER_FIELD: &str = "provider";

fn str_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str)
}

/// True if the account signs in through an OAuth provider
pub fn is_oauth(fields: &Map<String, Value>) -> bool {
    str_field(fields, PROVIDER_FIELD).map_or(false, |p| OAUTH_PROVIDERS.contains(&p))
}

/// Hash a new password, or carry the stored credentials over
///
/// `previous` is the stored record's fields on replace and patch, None on
/// insert.
pub fn prepare_credentials(
    collection: &str,
    fields: &mut Map<String, Value>,
    previous: Option<&Map<String, Value>>,
    params: &KdfParams,
) -> Result<()> {
    fields.remove(SALT_FIELD);
    let oauth = is_oauth(fields);

    let mut report = ValidationReport::new(collection);
    if str_field(fields, EMAIL_FIELD) == Some("") && !oauth {
        report.push(EMAIL_FIELD, FieldErrorKind::Invalid, "Email cannot be blank");
    }

    let stored_digest = previous.and_then(|p| str_field(p, PASSWORD_FIELD));
    let stored_salt = previous.and_then(|p| p.get(SALT_FIELD)).cloned();

    match fields.get(PASSWORD_FIELD) {
        None => {
            if let (Some(digest), Some(salt)) = (stored_digest, stored_salt) {
                fields.insert(PASSWORD_FIELD.to_string(), Value::String(digest.to_string()));
                fields.insert(SALT_FIELD.to_string(), salt);
            }
        }
        Some(Value::String(pw)) if Some(pw.as_str()) == stored_digest => {
            if let Some(salt) = stored_salt {
                fields.insert(SALT_FIELD.to_string(), salt);
            }
        }
        Some(Value::String(pw)) if !pw.is_empty() => {
            let salt = params.new_salt();
            let digest = password::hash(pw, &salt, params)?;
            fields.insert(PASSWORD_FIELD.to_string(), Value::String(digest));
            fields.insert(SALT_FIELD.to_string(), Value::String(salt));
        }
        Some(Value::String(_)) | Some(Value::Null) => {
            if oauth {
                fields.remove(PASSWORD_FIELD);
            } else {
                report.push(PASSWORD_FIELD, FieldErrorKind::Invalid, "Invalid password");
            }
        }
        Some(_) => {
            report.push(
                PASSWORD_FIELD,
                FieldErrorKind::Type,
                "Cast to String failed for path `password`",
            );
        }
    }

    report.into_result().map_err(Error::from)
}

/// Check a clear password against the stored credentials
pub fn authenticate(fields: &Map<String, Value>, candidate: &str, params: &KdfParams) -> bool {
    match (str_field(fields, SALT_FIELD), str_field(fields, PASSWORD_FIELD)) {
        (Some(salt), Some(digest)) => password::verify(candidate, salt, digest, params),
        _ => false,
    }
}

/// Public profile view of a rendered account
pub fn profile(doc: &Value) -> Value {
    json!({
        "name": doc.get("name").cloned().unwrap_or(Value::Null),
        "role": doc.get("role").cloned().unwrap_or(Value::Null),
    })
}

/// Token claims view of a rendered account
pub fn token(doc: &Value) -> Value {
    json!({
        "_id": doc.get(ID_FIELD).cloned().unwrap_or(Value::Null),
        "role": doc.get("role").cloned().unwrap_or(Value::Null),
    })
}
