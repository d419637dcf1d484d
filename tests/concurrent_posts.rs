//! Concurrency safety of the snapshot stores: parallel writers must never
//! drop each other's updates, because every load-modify-save cycle runs
//! under the store's mutex.

use std::sync::Arc;

use goosebbs::storage::Storage;

#[tokio::test]
async fn parallel_posts_are_never_lost() {
    let tmpdir = tempfile::tempdir().unwrap();
    let storage = Arc::new(Storage::new(tmpdir.path().join("data")).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..8 {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            storage
                .post_message(&format!("post {}", i), "body", &format!("user{}", i))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let messages = storage.list_messages().await.unwrap();
    assert_eq!(messages.len(), 8, "every concurrent post must land");
    for i in 0..8 {
        assert!(
            messages.iter().any(|m| m.subject == format!("post {}", i)),
            "post {} went missing",
            i
        );
    }
}

#[tokio::test]
async fn parallel_signups_for_one_name_have_one_winner() {
    let tmpdir = tempfile::tempdir().unwrap();
    let storage = Arc::new(Storage::new(tmpdir.path().join("data")).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..4 {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            storage.create_user("highlander", &format!("pw{}", i)).await
        }));
    }
    let mut wins = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            wins += 1;
        }
    }
    assert_eq!(wins, 1, "exactly one signup may win the race");
    assert_eq!(storage.user_count().await.unwrap(), 1);
}
