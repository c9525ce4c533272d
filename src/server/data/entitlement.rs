//! Persistent entitlement store.
//!
//! Guild entitlements live in a single JSON file with the canonical shape
//! `{"guilds": {"<guild_id>": {"guild_id": ..., "tier": ..., "expires_at": ..., "processed": true}}}`.
//! Older deployments wrote a bare premium list, `{"guild_ids": [...]}`; that shape is still
//! read (entries become non-expiring records with tier `none`) but never written.
//!
//! Records are decoded one by one. A record that does not decode is logged, left out of the
//! loaded mapping and written back verbatim on the next save. A file that does not decode at
//! all, or a legacy list, is moved aside before the first write replaces it.
//!
//! The store has no locking of its own. The reconciler is its only writer and serializes
//! all mutations behind its batch lock.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::server::{
    data::json_file::{read_json, set_aside, write_json_atomic, JsonRead},
    error::store::StoreError,
    model::entitlement::{EntitlementRecord, Tier},
};

/// Guild id → entitlement, ordered so the file is written deterministically.
pub type EntitlementMap = BTreeMap<String, EntitlementRecord>;

/// Shape the store file was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Missing,
    Unreadable,
    Canonical,
    Legacy,
    Corrupt,
}

/// Store file as read from disk.
#[derive(Debug)]
struct Document {
    source: Source,
    /// Read error, kept so a write can report why it refused to replace the file.
    read_error: Option<std::io::Error>,
    guilds: EntitlementMap,
    /// Raw entries that did not decode, keyed by guild id.
    malformed: Map<String, Value>,
}

impl Document {
    fn empty(source: Source) -> Self {
        Self {
            source,
            read_error: None,
            guilds: EntitlementMap::new(),
            malformed: Map::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EntitlementStore {
    path: PathBuf,
}

impl EntitlementStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads every well-formed entitlement from disk.
    ///
    /// # Returns
    /// - The stored mapping, or an empty mapping if the file is absent or corrupt
    pub async fn load(&self) -> EntitlementMap {
        self.read_document().await.guilds
    }

    /// Replaces the stored entitlements with `entitlements`.
    ///
    /// Entries on disk that could not be decoded are kept unless `entitlements` holds a
    /// record for the same guild.
    ///
    /// # Returns
    /// - `Ok(())` - Mapping written atomically
    /// - `Err(StoreError)` - File could not be written; the change is not durable
    pub async fn save(&self, entitlements: &EntitlementMap) -> Result<(), StoreError> {
        let mut document = self.read_document().await;
        document.guilds = entitlements.clone();
        self.write_document(&mut document).await
    }

    /// Sets a guild's entitlement, replacing any existing record (last write wins).
    ///
    /// # Returns
    /// - `Ok(EntitlementRecord)` - The record now stored for the guild
    /// - `Err(StoreError)` - File could not be written
    pub async fn upsert(
        &self,
        guild_id: &str,
        tier: Tier,
        expires_at: Option<i64>,
    ) -> Result<EntitlementRecord, StoreError> {
        let mut document = self.read_document().await;
        let record = EntitlementRecord::new(guild_id, tier, expires_at);
        document
            .guilds
            .insert(guild_id.to_string(), record.clone());
        self.write_document(&mut document).await?;

        Ok(record)
    }

    /// Removes a guild's entitlement.
    ///
    /// # Returns
    /// - `Ok(true)` - A record existed and was removed
    /// - `Ok(false)` - Guild had no record; nothing was written
    /// - `Err(StoreError)` - File could not be written
    pub async fn remove(&self, guild_id: &str) -> Result<bool, StoreError> {
        let mut document = self.read_document().await;
        let removed = document.guilds.remove(guild_id).is_some()
            | document.malformed.remove(guild_id).is_some();
        if !removed {
            return Ok(false);
        }
        self.write_document(&mut document).await?;

        Ok(true)
    }

    pub async fn get(&self, guild_id: &str) -> Option<EntitlementRecord> {
        self.load().await.remove(guild_id)
    }

    /// Returns whether the guild holds an entitlement that has not expired at `now`.
    pub async fn is_premium(&self, guild_id: &str, now: i64) -> bool {
        self.get(guild_id)
            .await
            .is_some_and(|record| record.is_active(now))
    }

    async fn read_document(&self) -> Document {
        let root = match read_json::<Value>(&self.path).await {
            JsonRead::Missing => return Document::empty(Source::Missing),
            JsonRead::Corrupt => return Document::empty(Source::Corrupt),
            JsonRead::Unreadable(e) => {
                return Document {
                    read_error: Some(e),
                    ..Document::empty(Source::Unreadable)
                }
            }
            JsonRead::Parsed(root) => root,
        };

        if let Some(Value::Object(guilds)) = root.get("guilds") {
            let mut document = Document::empty(Source::Canonical);
            for (guild_id, raw) in guilds {
                match serde_json::from_value::<EntitlementRecord>(raw.clone()) {
                    Ok(record) => {
                        document.guilds.insert(guild_id.clone(), record);
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Skipping malformed entitlement for guild {} in {}: {}",
                            guild_id,
                            self.path.display(),
                            e
                        );
                        document.malformed.insert(guild_id.clone(), raw.clone());
                    }
                }
            }
            return document;
        }

        if let Some(Value::Array(guild_ids)) = root.get("guild_ids") {
            tracing::info!(
                "Loaded legacy premium list with {} guilds from {}",
                guild_ids.len(),
                self.path.display()
            );
            let mut document = Document::empty(Source::Legacy);
            for id in guild_ids {
                let guild_id = match id {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    other => {
                        tracing::warn!("Skipping malformed legacy premium entry {}", other);
                        continue;
                    }
                };
                document.guilds.insert(
                    guild_id.clone(),
                    EntitlementRecord::new(guild_id, Tier::None, None),
                );
            }
            return document;
        }

        tracing::warn!(
            "{} has an unrecognized shape, treating as empty",
            self.path.display()
        );
        Document::empty(Source::Corrupt)
    }

    async fn write_document(&self, document: &mut Document) -> Result<(), StoreError> {
        match document.source {
            Source::Unreadable => {
                let source = document
                    .read_error
                    .take()
                    .unwrap_or_else(|| std::io::Error::other("store file is unreadable"));
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
            Source::Corrupt => {
                set_aside(&self.path, "corrupt").await?;
            }
            Source::Legacy => {
                set_aside(&self.path, "legacy").await?;
            }
            Source::Missing | Source::Canonical => {}
        }

        let mut guilds = document.malformed.clone();
        for (guild_id, record) in &document.guilds {
            let value = serde_json::to_value(record).map_err(|source| StoreError::Encode {
                path: self.path.clone(),
                source,
            })?;
            guilds.insert(guild_id.clone(), value);
        }

        let mut root = Map::new();
        root.insert("guilds".to_string(), Value::Object(guilds));
        write_json_atomic(&self.path, &Value::Object(root)).await
    }
}
