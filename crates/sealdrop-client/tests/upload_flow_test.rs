//! Batch upload: staging, server reconciliation, and failure isolation.

mod common;

use common::{ready_key_service, recording_sink, temp_store, MemoryTransport};
use sealdrop_client::{download_file, upload_batch};
use sealdrop_core::{FileStatus, SealdropError};

#[tokio::test]
async fn single_upload_records_server_assigned_name() {
    let keys = ready_key_service().await;
    let (_dir, mut store) = temp_store();
    let transport = MemoryTransport::new();
    let (sink, events) = recording_sink();

    let files = vec![("report.pdf".to_string(), b"quarterly numbers".to_vec())];
    let outcomes = upload_batch(&keys, &mut store, &transport, &files, Some(&sink))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, FileStatus::Uploaded);
    assert_eq!(outcomes[0].stored_name.as_deref(), Some("report.pdf"));

    let meta = store.find("report.pdf").unwrap();
    assert_eq!(meta.stored_name.as_deref(), Some("report.pdf"));

    let events = events.lock().unwrap();
    let statuses: Vec<FileStatus> = events.iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec![FileStatus::Pending, FileStatus::Uploaded]);
}

#[tokio::test]
async fn reupload_supersedes_metadata_and_follows_rename() {
    let keys = ready_key_service().await;
    let (_dir, mut store) = temp_store();
    let transport = MemoryTransport::new();

    let first = vec![("report.pdf".to_string(), b"version one".to_vec())];
    upload_batch(&keys, &mut store, &transport, &first, None)
        .await
        .unwrap();
    let first_meta = store.find("report.pdf").unwrap().clone();

    let second = vec![("report.pdf".to_string(), b"version two".to_vec())];
    upload_batch(&keys, &mut store, &transport, &second, None)
        .await
        .unwrap();

    // One active record; parameters fully replaced, never reused
    assert_eq!(store.len(), 1);
    let second_meta = store.find("report.pdf").unwrap();
    assert_eq!(second_meta.stored_name.as_deref(), Some("report(1).pdf"));
    assert_ne!(second_meta.salt, first_meta.salt);
    assert_ne!(second_meta.nonce, first_meta.nonce);

    // Retrieval addresses the renamed object and yields the new content
    let plaintext = download_file(&keys, &store, &transport, "report.pdf")
        .await
        .unwrap();
    assert_eq!(plaintext, b"version two");

    // The superseded object is orphaned on the server, not deleted
    assert_eq!(transport.object_count(), 2);
    assert!(transport.object("report.pdf").is_some());
}

#[tokio::test]
async fn encryption_failure_excludes_only_that_file() {
    let keys = ready_key_service().await;
    let (_dir, mut store) = temp_store();
    let transport = MemoryTransport::new();
    let (sink, events) = recording_sink();

    // An empty name cannot serve as derivation context or primary key
    let files = vec![
        ("notes.txt".to_string(), b"first file".to_vec()),
        (String::new(), b"second file".to_vec()),
    ];
    let outcomes = upload_batch(&keys, &mut store, &transport, &files, Some(&sink))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].status, FileStatus::Uploaded);
    assert_eq!(outcomes[1].status, FileStatus::EncryptionFailed);
    assert!(outcomes[1].stored_name.is_none());

    // Only the healthy file reached the server
    assert_eq!(transport.object_count(), 1);
    assert!(store.find("notes.txt").is_some());
    assert!(store.find("").is_none());

    let events = events.lock().unwrap();
    assert!(events
        .iter()
        .any(|e| e.file_name.is_empty() && e.status == FileStatus::EncryptionFailed));
}

#[tokio::test]
async fn transport_failure_commits_no_stored_names() {
    let keys = ready_key_service().await;
    let (_dir, mut store) = temp_store();
    let transport = MemoryTransport::new();
    transport.fail_uploads(true);

    let files = vec![("a.txt".to_string(), b"payload".to_vec())];
    let result = upload_batch(&keys, &mut store, &transport, &files, None).await;
    assert!(matches!(result, Err(SealdropError::Transport(_))));

    // The provisional record is still pending and unusable for retrieval
    assert!(store.find("a.txt").unwrap().is_pending());
    let download = download_file(&keys, &store, &transport, "a.txt").await;
    assert!(matches!(
        download,
        Err(SealdropError::MetadataMissing { .. })
    ));

    // Caller-driven cleanup
    assert_eq!(store.prune_pending().unwrap(), 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn upload_failed_events_emitted_on_batch_failure() {
    let keys = ready_key_service().await;
    let (_dir, mut store) = temp_store();
    let transport = MemoryTransport::new();
    transport.fail_uploads(true);
    let (sink, events) = recording_sink();

    let files = vec![
        ("a.txt".to_string(), b"one".to_vec()),
        ("b.txt".to_string(), b"two".to_vec()),
    ];
    let _ = upload_batch(&keys, &mut store, &transport, &files, Some(&sink)).await;

    let events = events.lock().unwrap();
    let failed: Vec<&str> = events
        .iter()
        .filter(|e| e.status == FileStatus::UploadFailed)
        .map(|e| e.file_name.as_str())
        .collect();
    assert_eq!(failed, vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn upload_before_key_import_fails_for_the_whole_batch() {
    let keys = sealdrop_client::KeyService::new();
    let (_dir, mut store) = temp_store();
    let transport = MemoryTransport::new();

    let files = vec![("a.txt".to_string(), b"payload".to_vec())];
    let result = upload_batch(&keys, &mut store, &transport, &files, None).await;

    assert!(matches!(result, Err(SealdropError::KeyNotReady)));
    assert!(store.is_empty());
    assert_eq!(transport.object_count(), 0);
}

#[tokio::test]
async fn same_name_twice_in_one_batch_keeps_submission_order() {
    let keys = ready_key_service().await;
    let (_dir, mut store) = temp_store();
    let transport = MemoryTransport::new();

    let files = vec![
        ("dup.txt".to_string(), b"first copy".to_vec()),
        ("dup.txt".to_string(), b"second copy".to_vec()),
    ];
    let outcomes = upload_batch(&keys, &mut store, &transport, &files, None)
        .await
        .unwrap();

    assert_eq!(outcomes[0].stored_name.as_deref(), Some("dup.txt"));
    assert_eq!(outcomes[1].stored_name.as_deref(), Some("dup(1).txt"));

    // The later record wins the primary key; its content round-trips
    let meta = store.find("dup.txt").unwrap();
    assert_eq!(meta.stored_name.as_deref(), Some("dup(1).txt"));
    let plaintext = download_file(&keys, &store, &transport, "dup.txt")
        .await
        .unwrap();
    assert_eq!(plaintext, b"second copy");
}
