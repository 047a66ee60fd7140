use chrono::{Duration, TimeZone, Utc};
use dramapop::history::{HistoryStore, JsonFileHistoryStore, MemoryHistoryStore};
use dramapop::models::{DramaId, WatchHistoryItem};
use tempfile::TempDir;

fn item(drama: &str, episode: u32, progress: i64, minutes_ago: i64) -> WatchHistoryItem {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
    WatchHistoryItem::new(
        DramaId::new(drama),
        episode,
        Some(60),
        progress,
        now - Duration::minutes(minutes_ago),
    )
}

#[test]
fn test_51st_entry_evicts_oldest() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    let mut store = JsonFileHistoryStore::open(&path, 50).unwrap();

    for n in 0..50 {
        store
            .upsert(item(&format!("drama-{n}"), 1, 0, 100 - n))
            .unwrap();
    }
    store.upsert(item("drama-new", 1, 0, 0)).unwrap();

    let reopened = JsonFileHistoryStore::open(&path, 50).unwrap();
    let all = reopened.get_all().unwrap();
    assert_eq!(all.len(), 50);
    assert_eq!(all[0].drama_id, DramaId::new("drama-new"));
    assert!(reopened.get(&DramaId::new("drama-0")).unwrap().is_none());
    assert!(reopened.get(&DramaId::new("drama-1")).unwrap().is_some());
}

#[test]
fn test_progress_clamps_survive_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    let mut store = JsonFileHistoryStore::open(&path, 50).unwrap();

    store.upsert(item("over", 1, 150, 0)).unwrap();
    store.upsert(item("under", 1, -5, 0)).unwrap();

    let reopened = JsonFileHistoryStore::open(&path, 50).unwrap();
    assert_eq!(
        reopened
            .get(&DramaId::new("over"))
            .unwrap()
            .unwrap()
            .progress,
        100
    );
    assert_eq!(
        reopened
            .get(&DramaId::new("under"))
            .unwrap()
            .unwrap()
            .progress,
        0
    );
}

#[test]
fn test_one_entry_per_drama() {
    let mut store = MemoryHistoryStore::new(50);

    store.upsert(item("d1", 1, 90, 30)).unwrap();
    store.upsert(item("d2", 4, 10, 20)).unwrap();
    store.upsert(item("d1", 2, 5, 10)).unwrap();

    let all = store.get_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].drama_id, DramaId::new("d1"));
    assert_eq!((all[0].episode_index, all[0].progress), (2, 5));
}

#[test]
fn test_forget_and_clear() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    let mut store = JsonFileHistoryStore::open(&path, 50).unwrap();
    store.upsert(item("d1", 1, 0, 0)).unwrap();
    store.upsert(item("d2", 1, 0, 0)).unwrap();

    assert!(store.remove(&DramaId::new("d1")).unwrap());
    assert!(!store.remove(&DramaId::new("d1")).unwrap());
    assert_eq!(
        JsonFileHistoryStore::open(&path, 50)
            .unwrap()
            .get_all()
            .unwrap()
            .len(),
        1
    );

    store.clear().unwrap();
    assert!(
        JsonFileHistoryStore::open(&path, 50)
            .unwrap()
            .get_all()
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_file_uses_camel_case_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    let mut store = JsonFileHistoryStore::open(&path, 50).unwrap();
    store.upsert(item("d1", 3, 42, 0)).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(raw[0]["dramaId"], "d1");
    assert_eq!(raw[0]["episodeIndex"], 3);
    assert_eq!(raw[0]["totalEpisodes"], 60);
    assert_eq!(raw[0]["progress"], 42);
    assert!(raw[0]["lastWatchedAt"].is_string());
}
