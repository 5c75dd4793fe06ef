//! Integration tests for the pin/photo store.
//!
//! Each test runs against its own temporary SQLite file.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use futures::StreamExt;
use futures::future::join_all;
use tokio::sync::broadcast::error::TryRecvError;

use virtual_tourist_core::{
    ALBUM_SIZE, ChangeKind, Coordinate, EntityRef, MapRegion, PhotoId, PinId, StoreEvent,
};
use virtual_tourist::RepositoryError;
use virtual_tourist::db::settings::MAP_REGION_KEY;
use virtual_tourist::db::{SettingsRepository, create_pool};
use virtual_tourist_integration_tests::TestStore;

fn san_francisco() -> Coordinate {
    Coordinate::new(37.7749, -122.4194).unwrap()
}

fn urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://live.staticflickr.com/65535/{i}_m.jpg"))
        .collect()
}

// ============================================================================
// Pins
// ============================================================================

#[tokio::test]
async fn test_find_pin_after_create() {
    let ctx = TestStore::new().await;

    let created = ctx.store.create_pin(san_francisco()).await.unwrap();
    let found = ctx.store.find_pin(san_francisco()).await.unwrap().unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(found.coordinate, san_francisco());
}

#[tokio::test]
async fn test_find_pin_requires_exact_coordinate() {
    let ctx = TestStore::new().await;
    ctx.store.create_pin(san_francisco()).await.unwrap();

    let nearby = Coordinate::new(37.7750, -122.4194).unwrap();
    assert!(ctx.store.find_pin(nearby).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_pins() {
    let ctx = TestStore::new().await;
    assert!(ctx.store.list_pins().await.unwrap().is_empty());

    let first = ctx.store.create_pin(san_francisco()).await.unwrap();
    let second = ctx
        .store
        .create_pin(Coordinate::new(-33.8688, 151.2093).unwrap())
        .await
        .unwrap();

    let ids: Vec<PinId> = ctx
        .store
        .list_pins()
        .await
        .unwrap()
        .into_iter()
        .map(|pin| pin.id)
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.id));
    assert!(ids.contains(&second.id));
}

#[tokio::test]
async fn test_get_pin() {
    let ctx = TestStore::new().await;
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();

    assert_eq!(ctx.store.get_pin(pin.id).await.unwrap(), Some(pin));
    assert!(ctx.store.get_pin(PinId::new(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_pin_cascades_to_photos() {
    let ctx = TestStore::new().await;
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();
    let photos = ctx.store.replace_photos(pin.id, &urls(5)).await.unwrap();
    assert_eq!(photos.len(), 5);

    assert!(ctx.store.delete_pin(pin.id).await.unwrap());

    assert!(ctx.store.list_photos(pin.id).await.unwrap().is_empty());
    for photo in photos {
        assert!(ctx.store.get_photo(photo.id).await.unwrap().is_none());
    }
    assert!(ctx.store.find_pin(san_francisco()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_pin_keeps_other_albums() {
    let ctx = TestStore::new().await;
    let doomed = ctx.store.create_pin(san_francisco()).await.unwrap();
    let kept = ctx
        .store
        .create_pin(Coordinate::new(48.8566, 2.3522).unwrap())
        .await
        .unwrap();
    ctx.store.replace_photos(doomed.id, &urls(3)).await.unwrap();
    ctx.store.replace_photos(kept.id, &urls(4)).await.unwrap();

    ctx.store.delete_pin(doomed.id).await.unwrap();

    assert_eq!(ctx.store.list_photos(kept.id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_delete_missing_pin_is_noop() {
    let ctx = TestStore::new().await;
    assert!(!ctx.store.delete_pin(PinId::new(42)).await.unwrap());
}

// ============================================================================
// Photos
// ============================================================================

#[tokio::test]
async fn test_replace_photos_inserts_stubs() {
    let ctx = TestStore::new().await;
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();

    let photos = ctx.store.replace_photos(pin.id, &urls(3)).await.unwrap();

    assert_eq!(photos.len(), 3);
    for (photo, url) in photos.iter().zip(urls(3)) {
        assert_eq!(photo.pin_id, pin.id);
        assert_eq!(photo.image_url, url);
        assert!(photo.is_stub());
    }
}

#[tokio::test]
async fn test_replace_photos_removes_previous_album() {
    let ctx = TestStore::new().await;
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();
    let old = ctx.store.replace_photos(pin.id, &urls(6)).await.unwrap();

    let fresh: Vec<String> = (0..4).map(|i| format!("https://example.org/{i}.jpg")).collect();
    let new = ctx.store.replace_photos(pin.id, &fresh).await.unwrap();

    let stored = ctx.store.list_photos(pin.id).await.unwrap();
    assert_eq!(stored, new);
    for photo in old {
        assert!(ctx.store.get_photo(photo.id).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn test_replace_photos_caps_at_album_size() {
    let ctx = TestStore::new().await;
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();

    let photos = ctx.store.replace_photos(pin.id, &urls(20)).await.unwrap();

    assert_eq!(photos.len(), ALBUM_SIZE);
    assert_eq!(ctx.store.list_photos(pin.id).await.unwrap().len(), ALBUM_SIZE);
}

#[tokio::test]
async fn test_replace_photos_for_deleted_pin_is_noop() {
    let ctx = TestStore::new().await;
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();
    ctx.store.delete_pin(pin.id).await.unwrap();

    let photos = ctx.store.replace_photos(pin.id, &urls(3)).await.unwrap();

    assert!(photos.is_empty());
    assert!(ctx.store.list_photos(pin.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_count_photos() {
    let ctx = TestStore::new().await;
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();
    assert_eq!(ctx.store.count_photos(pin.id).await.unwrap(), 0);

    let photos = ctx.store.replace_photos(pin.id, &urls(4)).await.unwrap();
    ctx.store.set_photo_image(photos[0].id, b"jpeg").await.unwrap();
    assert_eq!(ctx.store.count_photos(pin.id).await.unwrap(), 4);

    ctx.store.delete_photo(photos[1].id).await.unwrap();
    assert_eq!(ctx.store.count_photos(pin.id).await.unwrap(), 3);
    assert_eq!(ctx.store.count_photos(PinId::new(999)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_set_photo_image_is_idempotent() {
    let ctx = TestStore::new().await;
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();
    let photo = ctx.store.replace_photos(pin.id, &urls(1)).await.unwrap()[0].clone();
    let data = vec![0xFF, 0xD8, 0xFF, 0xE0];

    assert!(ctx.store.set_photo_image(photo.id, &data).await.unwrap());
    let once = ctx.store.get_photo(photo.id).await.unwrap().unwrap();

    assert!(ctx.store.set_photo_image(photo.id, &data).await.unwrap());
    let twice = ctx.store.get_photo(photo.id).await.unwrap().unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice.image_data.as_deref(), Some(data.as_slice()));
}

#[tokio::test]
async fn test_set_image_on_deleted_photo_is_noop() {
    let ctx = TestStore::new().await;
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();
    let photo = ctx.store.replace_photos(pin.id, &urls(1)).await.unwrap()[0].clone();
    ctx.store.delete_photo(photo.id).await.unwrap();

    assert!(!ctx.store.set_photo_image(photo.id, b"late").await.unwrap());
    assert!(ctx.store.get_photo(photo.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_photo() {
    let ctx = TestStore::new().await;
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();
    let photos = ctx.store.replace_photos(pin.id, &urls(3)).await.unwrap();

    assert!(ctx.store.delete_photo(photos[1].id).await.unwrap());
    assert!(!ctx.store.delete_photo(photos[1].id).await.unwrap());

    let remaining: Vec<PhotoId> = ctx
        .store
        .list_photos(pin.id)
        .await
        .unwrap()
        .into_iter()
        .map(|photo| photo.id)
        .collect();
    assert_eq!(remaining, vec![photos[0].id, photos[2].id]);
}

#[tokio::test]
async fn test_store_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("reopen.db").display());
    let url = secrecy::SecretString::from(url);

    let store = virtual_tourist::Store::open(&url).await.unwrap();
    let pin = store.create_pin(san_francisco()).await.unwrap();
    store.replace_photos(pin.id, &urls(2)).await.unwrap();
    store.close().await;

    let reopened = virtual_tourist::Store::open(&url).await.unwrap();
    assert_eq!(reopened.find_pin(san_francisco()).await.unwrap(), Some(pin.clone()));
    assert_eq!(reopened.list_photos(pin.id).await.unwrap().len(), 2);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_see_whole_albums() {
    let ctx = TestStore::new().await;
    let pin_id = ctx.store.create_pin(san_francisco()).await.unwrap().id;

    let old_album = urls(5);
    let new_album: Vec<String> = (0..3).map(|i| format!("https://example.org/{i}.jpg")).collect();
    ctx.store.replace_photos(pin_id, &old_album).await.unwrap();

    let writer = {
        let store = ctx.store.clone();
        let (old_album, new_album) = (old_album.clone(), new_album.clone());
        tokio::spawn(async move {
            for round in 0..200 {
                let album = if round % 2 == 0 { &new_album } else { &old_album };
                store.replace_photos(pin_id, album).await.unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let store = ctx.store.clone();
            let (old_album, new_album) = (old_album.clone(), new_album.clone());
            tokio::spawn(async move {
                for _ in 0..400 {
                    let seen: Vec<String> = store
                        .list_photos(pin_id)
                        .await
                        .unwrap()
                        .into_iter()
                        .map(|photo| photo.image_url)
                        .collect();
                    assert!(
                        seen == old_album || seen == new_album,
                        "partial album observed: {seen:?}"
                    );
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_replacements_do_not_interleave() {
    let ctx = TestStore::new().await;
    let pin_id = ctx.store.create_pin(san_francisco()).await.unwrap().id;

    let albums: Vec<Vec<String>> = (1..=8)
        .map(|writer| {
            (0..writer)
                .map(|i| format!("https://example.org/{writer}/{i}.jpg"))
                .collect()
        })
        .collect();

    let writes = albums.iter().cloned().map(|album| {
        let store = ctx.store.clone();
        tokio::spawn(async move { store.replace_photos(pin_id, &album).await.unwrap() })
    });
    for result in join_all(writes).await {
        result.unwrap();
    }

    let stored: Vec<String> = ctx
        .store
        .list_photos(pin_id)
        .await
        .unwrap()
        .into_iter()
        .map(|photo| photo.image_url)
        .collect();
    assert!(albums.contains(&stored), "mixed album stored: {stored:?}");
}

// ============================================================================
// Map region
// ============================================================================

#[tokio::test]
async fn test_map_region_round_trip() {
    let ctx = TestStore::new().await;
    assert!(ctx.store.map_region().await.unwrap().is_none());

    let region = MapRegion::new(san_francisco(), 0.5, 0.75).unwrap();
    ctx.store.save_map_region(&region).await.unwrap();
    assert_eq!(ctx.store.map_region().await.unwrap(), Some(region));

    let moved = MapRegion::new(Coordinate::new(0.0, 0.0).unwrap(), 40.0, 60.0).unwrap();
    ctx.store.save_map_region(&moved).await.unwrap();
    assert_eq!(ctx.store.map_region().await.unwrap(), Some(moved));
}

#[tokio::test]
async fn test_invalid_stored_map_region_is_corruption() {
    let ctx = TestStore::new().await;
    let pool = create_pool(ctx.database_url()).await.unwrap();
    SettingsRepository::new(&pool)
        .put(
            MAP_REGION_KEY,
            &serde_json::json!({
                "center": { "latitude": 10.0, "longitude": 20.0 },
                "latitude_delta": 0.0,
                "longitude_delta": -1.0
            }),
        )
        .await
        .unwrap();
    pool.close().await;

    let err = ctx.store.map_region().await.unwrap_err();
    assert!(matches!(err, RepositoryError::DataCorruption(_)));
}

// ============================================================================
// Change events
// ============================================================================

#[tokio::test]
async fn test_events_follow_commits() {
    let ctx = TestStore::new().await;
    let mut events = ctx.store.subscribe();

    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::pin(ChangeKind::Inserted, pin.id)
    );

    let photos = ctx.store.replace_photos(pin.id, &urls(2)).await.unwrap();
    for photo in &photos {
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::photo(ChangeKind::Inserted, pin.id, photo.id)
        );
    }

    ctx.store.set_photo_image(photos[0].id, b"jpeg").await.unwrap();
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::photo(ChangeKind::Updated, pin.id, photos[0].id)
    );

    ctx.store.delete_pin(pin.id).await.unwrap();
    for photo in &photos {
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::photo(ChangeKind::Deleted, pin.id, photo.id)
        );
    }
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::pin(ChangeKind::Deleted, pin.id)
    );
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_noop_mutations_publish_nothing() {
    let ctx = TestStore::new().await;
    let mut events = ctx.store.subscribe();

    ctx.store.delete_pin(PinId::new(7)).await.unwrap();
    ctx.store.delete_photo(PhotoId::new(7)).await.unwrap();
    ctx.store.set_photo_image(PhotoId::new(7), b"x").await.unwrap();

    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_changes_stream() {
    let ctx = TestStore::new().await;
    let mut changes = Box::pin(ctx.store.changes());

    let region = MapRegion::new(san_francisco(), 1.0, 1.0).unwrap();
    ctx.store.save_map_region(&region).await.unwrap();
    let pin = ctx.store.create_pin(san_francisco()).await.unwrap();

    let first = tokio::time::timeout(Duration::from_secs(5), changes.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.entity, EntityRef::MapRegion);

    let second = tokio::time::timeout(Duration::from_secs(5), changes.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.pin_id(), Some(pin.id));
}
