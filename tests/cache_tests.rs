use bytes::Bytes;

use packrat::{unix_now, CacheStore, InsertOutcome, MAX_CACHE_SIZE, MAX_ENTRY_AGE, MAX_OBJECT_SIZE};

#[tokio::test]
async fn fifty_tasks_share_one_store() {
    let cache = CacheStore::new();
    let mut tasks = Vec::new();
    for i in 0..50 {
        let cache = cache.clone();
        tasks.push(tokio::spawn(async move {
            let url = format!("http://site{i}.test/");
            let body = Bytes::from(vec![i as u8; 256]);
            let outcome = cache.insert(url.clone(), body.clone(), unix_now()).await;
            assert!(matches!(outcome, InsertOutcome::Inserted { .. }));
            let entry = cache.get(&url).await.unwrap();
            assert_eq!(entry.body, body);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(cache.len().await, 50);

    // every entry charges url + body + timestamp
    let expected: usize = (0..50)
        .map(|i| format!("http://site{i}.test/").len() + 256 + 8)
        .sum();
    assert_eq!(cache.total_size(), expected);
}

#[tokio::test]
async fn budget_holds_under_racing_inserts() {
    let cache = CacheStore::new();
    let mut tasks = Vec::new();
    for i in 0..20 {
        let cache = cache.clone();
        tasks.push(tokio::spawn(async move {
            let body = Bytes::from(vec![0u8; 800_000]);
            cache.insert(format!("u{i}"), body, unix_now()).await
        }));
    }
    let mut admitted = 0;
    for task in tasks {
        if matches!(task.await.unwrap(), InsertOutcome::Inserted { .. }) {
            admitted += 1;
        }
    }
    assert!(cache.total_size() <= MAX_CACHE_SIZE);
    assert_eq!(admitted, cache.len().await);
    // six 800 kB entries fit in the 5 MB budget, a seventh would not
    assert_eq!(admitted, 6);
}

#[tokio::test]
async fn racing_updates_to_one_url_never_double_count() {
    let cache = CacheStore::new();
    let mut tasks = Vec::new();
    for i in 0..32usize {
        let cache = cache.clone();
        tasks.push(tokio::spawn(async move {
            let body = Bytes::from(vec![0u8; 1_000 + i]);
            cache
                .insert("http://hot.test/".to_string(), body, unix_now())
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(cache.len().await, 1);
    let entry = cache.get("http://hot.test/").await.unwrap();
    assert_eq!(
        cache.total_size(),
        "http://hot.test/".len() + entry.body.len() + 8
    );
}

#[tokio::test]
async fn sweep_restores_headroom() {
    let cache = CacheStore::new();
    let now = unix_now();
    for i in 0..4 {
        let outcome = cache
            .insert(
                format!("u{i}"),
                Bytes::from(vec![0u8; MAX_OBJECT_SIZE]),
                now - MAX_ENTRY_AGE - 1,
            )
            .await;
        assert!(matches!(outcome, InsertOutcome::Inserted { .. }));
    }

    let full_size = Bytes::from(vec![0u8; MAX_OBJECT_SIZE]);
    assert_eq!(
        cache.insert("u4".to_string(), full_size.clone(), now).await,
        InsertOutcome::CacheFull
    );

    assert_eq!(cache.evict_stale(now).await, 4);
    assert_eq!(cache.total_size(), 0);

    assert!(matches!(
        cache.insert("u4".to_string(), full_size, now).await,
        InsertOutcome::Inserted { .. }
    ));
}

#[tokio::test]
async fn cloned_out_entries_survive_eviction() {
    let cache = CacheStore::new();
    cache
        .insert("a".to_string(), Bytes::from_static(b"body"), 0)
        .await;
    let entry = cache.get("a").await.unwrap();

    cache.evict_stale(MAX_ENTRY_AGE + 10).await;
    assert!(cache.get("a").await.is_none());
    assert_eq!(entry.body, Bytes::from_static(b"body"));
}
