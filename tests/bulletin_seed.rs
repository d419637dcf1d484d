use goosebbs::storage::{Storage, StorageError};

#[tokio::test]
async fn first_run_seeds_default_bulletins() {
    let tmpdir = tempfile::tempdir().unwrap();
    let storage = Storage::with_seed(tmpdir.path().join("data"), "Goose Retro BBS")
        .await
        .unwrap();

    let bulletins = storage.list_bulletins().await.unwrap();
    assert!(!bulletins.is_empty(), "first run must seed at least one bulletin");
    assert!(bulletins[0].title.contains("Goose Retro BBS"));

    // Pure reads: repeated listing returns the same collection
    let again = storage.list_bulletins().await.unwrap();
    assert_eq!(again.len(), bulletins.len());
    for (a, b) in bulletins.iter().zip(again.iter()) {
        assert_eq!(a.title, b.title);
        assert_eq!(a.body, b.body);
    }
}

#[tokio::test]
async fn reopen_does_not_reseed() {
    let tmpdir = tempfile::tempdir().unwrap();
    let data_dir = tmpdir.path().join("data");

    let first = Storage::with_seed(&data_dir, "First Name").await.unwrap();
    let seeded = first.list_bulletins().await.unwrap();
    drop(first);

    // A different seed name on reopen must not touch the existing file
    let second = Storage::with_seed(&data_dir, "Second Name").await.unwrap();
    let kept = second.list_bulletins().await.unwrap();
    assert_eq!(kept.len(), seeded.len());
    assert!(kept[0].title.contains("First Name"));
}

#[tokio::test]
async fn bulletin_positions_are_one_based() {
    let tmpdir = tempfile::tempdir().unwrap();
    let storage = Storage::new(tmpdir.path().join("data")).await.unwrap();

    let bulletins = storage.list_bulletins().await.unwrap();
    let first = storage.read_bulletin(1).await.unwrap();
    assert_eq!(first.title, bulletins[0].title);

    assert!(matches!(
        storage.read_bulletin(0).await,
        Err(StorageError::OutOfRange(0))
    ));
    let past_end = bulletins.len() + 1;
    assert!(matches!(
        storage.read_bulletin(past_end).await,
        Err(StorageError::OutOfRange(_))
    ));
}
