//! Versioned persisted documents.
//!
//! Every blob written to the store is `{"version": 1, ...}`. Loading is
//! lenient: stored fields are merged over the defaults one at a time and a
//! field that does not deserialize is dropped with a warning. Importing is
//! strict: the whole document must parse or nothing changes.
//!
//! | Key                   | Version 1 payload                 | Version 0 (legacy)     |
//! |-----------------------|-----------------------------------|------------------------|
//! | `pathways.progress`   | `{"version":1,"user":{...}}`      | `{"user":{...}}`       |
//! | `pathways.challenges` | `{"version":1,"activeChallenges"…}` | bare challenge object |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::challenges::ChallengeState;
use crate::error::{CoreError, Result};
use crate::progress::UserProgress;

pub const PROGRESS_KEY: &str = "pathways.progress";
pub const CHALLENGES_KEY: &str = "pathways.challenges";
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ProgressDocument<'a> {
    version: u32,
    user: &'a UserProgress,
}

#[derive(Serialize)]
struct ChallengeDocument<'a> {
    version: u32,
    #[serde(flatten)]
    state: &'a ChallengeState,
}

/// Full backup produced by export and accepted by import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Absent in legacy backups.
    #[serde(default)]
    pub version: u32,
    pub user: UserProgress,
    #[serde(default)]
    pub challenges: Option<ChallengeState>,
}

impl ExportDocument {
    pub fn new(user: UserProgress, challenges: ChallengeState) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            user,
            challenges: Some(challenges),
        }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Strict parse: any error rejects the whole document.
    pub fn parse(text: &str) -> Result<Self> {
        let doc: ExportDocument =
            serde_json::from_str(text).map_err(|e| CoreError::MalformedState {
                key: "import".into(),
                message: e.to_string(),
            })?;
        if doc.version > DOCUMENT_VERSION {
            return Err(CoreError::MalformedState {
                key: "import".into(),
                message: format!("unsupported document version {}", doc.version),
            });
        }
        Ok(doc)
    }
}

pub fn progress_blob(user: &UserProgress) -> Result<String> {
    Ok(serde_json::to_string(&ProgressDocument {
        version: DOCUMENT_VERSION,
        user,
    })?)
}

pub fn challenges_blob(state: &ChallengeState) -> Result<String> {
    Ok(serde_json::to_string(&ChallengeDocument {
        version: DOCUMENT_VERSION,
        state,
    })?)
}

/// Progress from a stored blob, falling back to `defaults` field by field.
pub fn load_progress(blob: Option<&str>, defaults: UserProgress) -> UserProgress {
    let payload = open_document(PROGRESS_KEY, blob).and_then(|mut doc| {
        match doc.remove("user") {
            Some(Value::Object(user)) => Some(user),
            // Flat legacy record without the `user` wrapper.
            _ if doc.contains_key("xp") => Some(doc),
            _ => {
                tracing::warn!(key = PROGRESS_KEY, "stored document has no user record");
                None
            }
        }
    });
    merge_over_defaults(PROGRESS_KEY, payload, defaults)
}

/// Challenge state from a stored blob, falling back to `defaults` field by
/// field.
pub fn load_challenges(blob: Option<&str>, defaults: ChallengeState) -> ChallengeState {
    let payload = open_document(CHALLENGES_KEY, blob).map(|mut doc| {
        doc.remove("version");
        doc
    });
    merge_over_defaults(CHALLENGES_KEY, payload, defaults)
}

/// Parse a stored blob into its top-level object and check the version.
fn open_document(key: &str, blob: Option<&str>) -> Option<Map<String, Value>> {
    let blob = blob?;
    let value: Value = match serde_json::from_str(blob) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(key, error = %e, "stored document is not valid JSON, using defaults");
            return None;
        }
    };
    let Value::Object(doc) = value else {
        tracing::warn!(key, "stored document is not an object, using defaults");
        return None;
    };

    let version = doc.get("version").and_then(Value::as_u64).unwrap_or(0);
    if version == 0 {
        tracing::debug!(key, "migrating legacy document to version {DOCUMENT_VERSION}");
    } else if version > u64::from(DOCUMENT_VERSION) {
        tracing::warn!(key, version, "document is newer than this build, reading known fields");
    }
    Some(doc)
}

fn merge_over_defaults<T>(key: &str, payload: Option<Map<String, Value>>, defaults: T) -> T
where
    T: Serialize + DeserializeOwned,
{
    let Some(stored) = payload else {
        return defaults;
    };
    let mut root = match serde_json::to_value(&defaults) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(key, error = %e, "cannot serialize defaults");
            return defaults;
        }
    };

    merge_fields::<T>(key, &mut root, "", &stored);

    match serde_json::from_value(root) {
        Ok(merged) => merged,
        Err(e) => {
            tracing::warn!(key, error = %e, "merged document failed to load, using defaults");
            defaults
        }
    }
}

/// Copy `stored` fields into `root` at `pointer`, keeping a field only if the
/// whole document still deserializes as `T` afterwards.
///
/// Recurses into nested records (non-empty default objects such as
/// `preferences`) so a partial nested object keeps its other defaults.
fn merge_fields<T: DeserializeOwned>(
    key: &str,
    root: &mut Value,
    pointer: &str,
    stored: &Map<String, Value>,
) {
    for (field, value) in stored {
        let field_pointer = format!("{pointer}/{}", escape_pointer(field));
        let Some(current) = root.pointer(&field_pointer).cloned() else {
            tracing::debug!(key, field = %field_pointer, "ignoring unknown stored field");
            continue;
        };

        if let (Value::Object(defaults), Value::Object(nested)) = (&current, value) {
            if !defaults.is_empty() {
                merge_fields::<T>(key, root, &field_pointer, nested);
                continue;
            }
        }

        if let Some(slot) = root.pointer_mut(&field_pointer) {
            *slot = value.clone();
        }
        if let Err(e) = serde_json::from_value::<T>(root.clone()) {
            tracing::warn!(key, field = %field_pointer, error = %e, "dropping invalid stored field");
            if let Some(slot) = root.pointer_mut(&field_pointer) {
                *slot = current;
            }
        }
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
