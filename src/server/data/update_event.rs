//! Shared update-event file.
//!
//! The payment side appends `{"guild_id", "tier", "expires", "processed"}` objects to a JSON
//! array; the reconciler reads the whole array, flips `processed` on what it applied and
//! writes the array back.
//!
//! Elements are decoded one by one. An element that is not a valid event is kept as raw JSON
//! and written back untouched, so one bad entry never hides or destroys the others.

use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::server::{
    data::json_file::{read_json, set_aside, write_json_atomic, JsonRead},
    error::store::StoreError,
    model::entitlement::UpdateEvent,
};

/// One element of the update file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpdateEntry {
    Event(UpdateEvent),
    /// Element that does not decode as an event.
    Malformed(Value),
}

impl UpdateEntry {
    pub fn as_event(&self) -> Option<&UpdateEvent> {
        match self {
            Self::Event(event) => Some(event),
            Self::Malformed(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UpdateEventStore {
    path: PathBuf,
}

impl UpdateEventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads all entries, processed or not. Absent or corrupt files yield an empty list.
    pub async fn load(&self) -> Vec<UpdateEntry> {
        match self.read().await {
            JsonRead::Parsed(entries) => entries,
            JsonRead::Missing | JsonRead::Unreadable(_) | JsonRead::Corrupt => Vec::new(),
        }
    }

    /// Rewrites the file with `entries`.
    pub async fn save(&self, entries: &[UpdateEntry]) -> Result<(), StoreError> {
        write_json_atomic(&self.path, entries).await
    }

    /// Appends one event so the next sweep picks it up.
    ///
    /// A file that cannot be decoded is moved aside first rather than overwritten.
    pub async fn append(&self, event: UpdateEvent) -> Result<(), StoreError> {
        let mut entries = match self.read().await {
            JsonRead::Parsed(entries) => entries,
            JsonRead::Missing => Vec::new(),
            JsonRead::Unreadable(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
            JsonRead::Corrupt => {
                set_aside(&self.path, "corrupt").await?;
                Vec::new()
            }
        };
        entries.push(UpdateEntry::Event(event));
        self.save(&entries).await
    }

    async fn read(&self) -> JsonRead<Vec<UpdateEntry>> {
        let elements = match read_json::<Value>(&self.path).await {
            JsonRead::Parsed(Value::Array(elements)) => elements,
            JsonRead::Parsed(_) => {
                tracing::warn!(
                    "{} is not a JSON array, treating as empty",
                    self.path.display()
                );
                return JsonRead::Corrupt;
            }
            JsonRead::Missing => return JsonRead::Missing,
            JsonRead::Unreadable(e) => return JsonRead::Unreadable(e),
            JsonRead::Corrupt => return JsonRead::Corrupt,
        };

        let entries = elements
            .into_iter()
            .enumerate()
            .map(
                |(index, raw)| match serde_json::from_value::<UpdateEvent>(raw.clone()) {
                    Ok(event) => UpdateEntry::Event(event),
                    Err(e) => {
                        tracing::warn!(
                            "Skipping malformed premium update #{} in {}: {}",
                            index,
                            self.path.display(),
                            e
                        );
                        UpdateEntry::Malformed(raw)
                    }
                },
            )
            .collect();

        JsonRead::Parsed(entries)
    }
}
