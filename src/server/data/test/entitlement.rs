use super::*;

/// Tests loading when the store file does not exist.
///
/// Expected: empty mapping, no error
#[tokio::test]
async fn loads_empty_when_absent() {
    let test = TestBuilder::new().build().await.unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    assert!(store.load().await.is_empty());
}

/// Tests loading a corrupt store file.
///
/// Verifies that malformed JSON is treated as empty state rather than an error, and
/// that the corrupt file is left untouched by the read.
///
/// Expected: empty mapping
#[tokio::test]
async fn loads_empty_when_corrupt() {
    let test = TestBuilder::new().build().await.unwrap();
    test.write_raw(&test.premium_path, "{\"guilds\": {\"42\": ")
        .await
        .unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    assert!(store.load().await.is_empty());
    assert!(test.premium_path.exists());
}

/// Tests that save followed by load reproduces the mapping.
///
/// Expected: identical mapping, including records with and without expiry
#[tokio::test]
async fn save_load_round_trip() {
    let test = TestBuilder::new().build().await.unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    let mut entitlements = EntitlementMap::new();
    entitlements.insert(
        "42".to_string(),
        EntitlementRecord::new("42", Tier::Standard, Some(1_900_000_000)),
    );
    entitlements.insert(
        "7".to_string(),
        EntitlementRecord::new("7", Tier::Professional, None),
    );

    store.save(&entitlements).await.unwrap();
    assert_eq!(store.load().await, entitlements);
}

/// Tests that loading then saving a well-formed file leaves it unchanged.
///
/// Expected: file contents identical after load/save
#[tokio::test]
async fn load_save_preserves_file() {
    let contents = fixture::premium_mapping(&[
        ("42", "standard", Some(1_900_000_000)),
        ("99", "basic", None),
    ]);
    let test = TestBuilder::new()
        .with_premium_file(contents.clone())
        .build()
        .await
        .unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    let loaded = store.load().await;
    store.save(&loaded).await.unwrap();

    assert_eq!(test.read_premium_file().await, contents);
}

/// Tests reading the legacy `guild_ids` list.
///
/// Expected: one non-expiring record per listed guild, numeric ids accepted
#[tokio::test]
async fn loads_legacy_list() {
    let test = TestBuilder::new()
        .with_premium_file(json!({ "guild_ids": ["42", 1234] }))
        .build()
        .await
        .unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    let loaded = store.load().await;
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded["42"], EntitlementRecord::new("42", Tier::None, None));
    assert!(loaded.contains_key("1234"));

    store.save(&loaded).await.unwrap();
    let written = test.read_premium_file().await;
    assert!(written.get("guilds").is_some());
    assert!(written.get("guild_ids").is_none());
}

/// Tests upsert replacing an existing record.
///
/// Expected: last write wins, other guilds untouched
#[tokio::test]
async fn upsert_replaces_record() {
    let test = TestBuilder::new()
        .with_premium_file(fixture::premium_mapping(&[
            ("42", "basic", None),
            ("7", "standard", None),
        ]))
        .build()
        .await
        .unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    let record = store
        .upsert("42", Tier::Professional, Some(2_000_000_000))
        .await
        .unwrap();
    assert!(record.processed);

    let loaded = store.load().await;
    assert_eq!(loaded["42"].tier, Tier::Professional);
    assert_eq!(loaded["42"].expires_at, Some(2_000_000_000));
    assert_eq!(loaded["7"].tier, Tier::Standard);
}

/// Tests removing existing and missing guilds.
///
/// Expected: true for an existing record, false for an unknown guild
#[tokio::test]
async fn remove_reports_existence() {
    let test = TestBuilder::new()
        .with_premium_file(fixture::premium_mapping(&[("42", "basic", None)]))
        .build()
        .await
        .unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    assert!(store.remove("42").await.unwrap());
    assert!(!store.remove("42").await.unwrap());
    assert!(store.get("42").await.is_none());
}

/// Tests the premium check against expiry.
///
/// Expected: expired records are not premium
#[tokio::test]
async fn is_premium_honors_expiry() {
    let now = fixture::now();
    let test = TestBuilder::new()
        .with_premium_file(fixture::premium_mapping(&[
            ("1", "basic", Some(now + 3_600)),
            ("2", "basic", Some(now - 3_600)),
            ("3", "standard", None),
        ]))
        .build()
        .await
        .unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    assert!(store.is_premium("1", now).await);
    assert!(!store.is_premium("2", now).await);
    assert!(store.is_premium("3", now).await);
    assert!(!store.is_premium("4", now).await);
}

/// Tests that a write into an unwritable location is reported.
///
/// Expected: Err(StoreError) when the parent path is a regular file
#[tokio::test]
async fn save_fails_when_unwritable() {
    let test = TestBuilder::new().build().await.unwrap();
    let blocker = test.path("not-a-dir");
    test.write_raw(&blocker, "").await.unwrap();
    let store = EntitlementStore::new(blocker.join("premium.json"));

    assert!(store.save(&EntitlementMap::new()).await.is_err());
}

/// Tests a write when one stored record does not decode.
///
/// Verifies that load skips the bad record but returns the others, and that an upsert
/// for another guild writes the bad record back byte-for-byte.
///
/// Expected: good records loaded, malformed record preserved verbatim on disk
#[tokio::test]
async fn malformed_record_is_kept_verbatim() {
    let bad = json!({ "guild_id": "9", "tier": "basic", "expires_at": 1.5, "processed": true });
    let test = TestBuilder::new()
        .with_premium_file(json!({
            "guilds": {
                "42": { "guild_id": "42", "tier": "standard", "expires_at": null, "processed": true },
                "9": bad.clone(),
            }
        }))
        .build()
        .await
        .unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    let loaded = store.load().await;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded["42"].tier, Tier::Standard);

    store.upsert("7", Tier::Basic, None).await.unwrap();

    let written = test.read_premium_file().await;
    assert_eq!(written["guilds"]["9"], bad);
    assert_eq!(written["guilds"]["42"]["tier"], "standard");
    assert_eq!(written["guilds"]["7"]["tier"], "basic");
}

/// Tests removing a guild whose stored record does not decode.
///
/// Expected: true, and the raw record is gone from the file
#[tokio::test]
async fn remove_drops_malformed_record() {
    let test = TestBuilder::new()
        .with_premium_file(json!({ "guilds": { "9": { "guild_id": "9", "tier": 3 } } }))
        .build()
        .await
        .unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    assert!(store.remove("9").await.unwrap());
    assert_eq!(test.read_premium_file().await, json!({ "guilds": {} }));
}

/// Tests writing over a store file that does not decode at all.
///
/// Verifies that the original bytes are moved to a `.corrupt-<time>` sibling before the
/// new record is written.
///
/// Expected: corrupt contents preserved beside the fresh store file
#[tokio::test]
async fn upsert_moves_corrupt_file_aside() {
    let test = TestBuilder::new().build().await.unwrap();
    test.write_raw(&test.premium_path, "{\"guilds\": {\"42\": ")
        .await
        .unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    store.upsert("7", Tier::Basic, None).await.unwrap();

    assert_eq!(store.load().await.len(), 1);
    let mut kept = Vec::new();
    let mut dir = tokio::fs::read_dir(test.dir.path()).await.unwrap();
    while let Some(entry) = dir.next_entry().await.unwrap() {
        if entry.file_name().to_string_lossy().contains(".corrupt-") {
            kept.push(tokio::fs::read_to_string(entry.path()).await.unwrap());
        }
    }
    assert_eq!(kept, vec!["{\"guilds\": {\"42\": ".to_string()]);
}

/// Tests a write when the store path cannot be read.
///
/// Verifies that a directory in place of the store file is neither renamed nor replaced,
/// and that the failed write leaves no temporary file behind.
///
/// Expected: Err(StoreError), directory untouched, no other files in the data directory
#[tokio::test]
async fn upsert_fails_when_store_unreadable() {
    let test = TestBuilder::new().build().await.unwrap();
    tokio::fs::create_dir(&test.premium_path).await.unwrap();
    let store = EntitlementStore::new(&test.premium_path);

    assert!(store.upsert("7", Tier::Basic, None).await.is_err());

    assert!(test.premium_path.is_dir());
    let mut names = Vec::new();
    let mut dir = tokio::fs::read_dir(test.dir.path()).await.unwrap();
    while let Some(entry) = dir.next_entry().await.unwrap() {
        names.push(entry.file_name());
    }
    assert_eq!(names, vec![test.premium_path.file_name().unwrap().to_os_string()]);
}
