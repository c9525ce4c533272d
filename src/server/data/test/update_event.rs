use super::*;

/// Tests loading the update file in payment-side format.
///
/// Expected: events decoded with their processed flags
#[tokio::test]
async fn loads_events() {
    let test = TestBuilder::new()
        .with_update_events(vec![
            fixture::update_event("42", Some("standard"), Some(1_900_000_000), false),
            fixture::update_event("7", None, None, true),
        ])
        .build()
        .await
        .unwrap();
    let store = UpdateEventStore::new(&test.updates_path);

    let entries = store.load().await;
    let events: Vec<&UpdateEvent> = entries.iter().filter_map(UpdateEntry::as_event).collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].guild_id, "42");
    assert_eq!(events[0].expires_at, Some(1_900_000_000));
    assert!(!events[0].processed);
    assert!(events[1].tier.is_none());
    assert!(events[1].processed);
}

/// Tests that rewriting the file keeps fields this service does not know about.
///
/// Expected: extra keys survive load/save
#[tokio::test]
async fn save_preserves_extra_fields() {
    let mut event = fixture::update_event("42", Some("basic"), None, false);
    event["customer"] = json!("cus_123");
    let test = TestBuilder::new()
        .with_update_events(vec![event])
        .build()
        .await
        .unwrap();
    let store = UpdateEventStore::new(&test.updates_path);

    let entries = store.load().await;
    store.save(&entries).await.unwrap();

    assert_eq!(test.read_update_file().await[0]["customer"], "cus_123");
}

/// Tests appending to an absent file.
///
/// Expected: file created holding the single appended event
#[tokio::test]
async fn append_creates_file() {
    let test = TestBuilder::new().build().await.unwrap();
    let store = UpdateEventStore::new(&test.updates_path);

    store
        .append(UpdateEvent::grant("42", "basic", None))
        .await
        .unwrap();
    store.append(UpdateEvent::revoke("7")).await.unwrap();

    let entries = store.load().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1], UpdateEntry::Event(UpdateEvent::revoke("7")));
}

/// Tests a corrupt update file.
///
/// Expected: empty list
#[tokio::test]
async fn loads_empty_when_corrupt() {
    let test = TestBuilder::new().build().await.unwrap();
    test.write_raw(&test.updates_path, "[{\"guild_id\":")
        .await
        .unwrap();
    let store = UpdateEventStore::new(&test.updates_path);

    assert!(store.load().await.is_empty());
}

/// Tests a file where one element is not a valid event.
///
/// Expected: valid events decoded, the bad element kept raw and written back unchanged
#[tokio::test]
async fn malformed_element_is_kept_verbatim() {
    let bad = json!({ "guild_id": null, "tier": "basic" });
    let test = TestBuilder::new()
        .with_update_events(vec![
            fixture::update_event("42", Some("basic"), None, false),
            bad.clone(),
        ])
        .build()
        .await
        .unwrap();
    let store = UpdateEventStore::new(&test.updates_path);

    let entries = store.load().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].as_event().map(|e| e.guild_id.as_str()), Some("42"));
    assert_eq!(entries[1], UpdateEntry::Malformed(bad.clone()));

    store.save(&entries).await.unwrap();
    assert_eq!(test.read_update_file().await[1], bad);
}

/// Tests appending to a file that does not decode.
///
/// Verifies that the unreadable file is moved aside with its contents intact instead of
/// being overwritten by the new event.
///
/// Expected: new file holds only the appended event, old contents kept in a sibling file
#[tokio::test]
async fn append_moves_corrupt_file_aside() {
    let test = TestBuilder::new().build().await.unwrap();
    test.write_raw(&test.updates_path, "[{\"guild_id\":")
        .await
        .unwrap();
    let store = UpdateEventStore::new(&test.updates_path);

    store
        .append(UpdateEvent::grant("42", "basic", None))
        .await
        .unwrap();

    assert_eq!(test.read_update_file().await.as_array().map(Vec::len), Some(1));

    let mut kept = Vec::new();
    let mut dir = tokio::fs::read_dir(test.dir.path()).await.unwrap();
    while let Some(entry) = dir.next_entry().await.unwrap() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains(".corrupt-") {
            kept.push(tokio::fs::read_to_string(entry.path()).await.unwrap());
        }
    }
    assert_eq!(kept, vec!["[{\"guild_id\":".to_string()]);
}
