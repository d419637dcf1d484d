use goosebbs::storage::{Storage, StorageError, NO_SUBJECT};

#[tokio::test]
async fn board_starts_empty_and_appends_in_order() {
    let tmpdir = tempfile::tempdir().unwrap();
    let storage = Storage::new(tmpdir.path().join("data")).await.unwrap();

    assert!(storage.list_messages().await.unwrap().is_empty());

    storage.post_message("first", "body one", "alice").await.unwrap();
    storage.post_message("second", "body two", "bob").await.unwrap();
    storage.post_message("third", "body three", "alice").await.unwrap();

    let messages = storage.list_messages().await.unwrap();
    assert_eq!(messages.len(), 3);
    let subjects: Vec<&str> = messages.iter().map(|m| m.subject.as_str()).collect();
    assert_eq!(subjects, vec!["first", "second", "third"]);

    // read(N) is the most recent post; both ends past the range fail
    let last = storage.read_message(3).await.unwrap();
    assert_eq!(last.subject, "third");
    assert!(matches!(
        storage.read_message(0).await,
        Err(StorageError::OutOfRange(0))
    ));
    assert!(matches!(
        storage.read_message(4).await,
        Err(StorageError::OutOfRange(4))
    ));
}

#[tokio::test]
async fn empty_subject_gets_the_placeholder() {
    let tmpdir = tempfile::tempdir().unwrap();
    let storage = Storage::new(tmpdir.path().join("data")).await.unwrap();

    let posted = storage.post_message("", "no subject here", "alice").await.unwrap();
    assert_eq!(posted.subject, NO_SUBJECT);

    let listed = storage.read_message(1).await.unwrap();
    assert_eq!(listed.subject, NO_SUBJECT);
}

#[tokio::test]
async fn body_newlines_are_preserved() {
    let tmpdir = tempfile::tempdir().unwrap();
    let storage = Storage::new(tmpdir.path().join("data")).await.unwrap();

    storage
        .post_message("multi", "line1\nline2\nline3", "alice")
        .await
        .unwrap();
    let message = storage.read_message(1).await.unwrap();
    assert_eq!(message.body, "line1\nline2\nline3");
}

#[tokio::test]
async fn posts_survive_a_reopen() {
    let tmpdir = tempfile::tempdir().unwrap();
    let data_dir = tmpdir.path().join("data");

    {
        let storage = Storage::new(&data_dir).await.unwrap();
        storage.post_message("hello", "still here", "alice").await.unwrap();
    }

    let reopened = Storage::new(&data_dir).await.unwrap();
    let messages = reopened.list_messages().await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].author, "alice");
}
