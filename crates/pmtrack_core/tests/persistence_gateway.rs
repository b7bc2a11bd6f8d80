use pmtrack_core::db::open_store_db;
use pmtrack_core::{
    default_collection, resolve_active_id, KeyValueStore, Machine, MachineCollection,
    MachineRepository, MemoryStore, SqliteStore, Task, MACHINES_KEY,
};

#[test]
fn empty_store_loads_default_machine_set() {
    let repo = MachineRepository::new(MemoryStore::new());
    let loaded = repo.load();
    assert_eq!(loaded, default_collection());
    assert!(repo.store().is_empty(), "load must not write");
}

#[test]
fn mutating_loaded_defaults_does_not_leak_into_next_load() {
    let repo = MachineRepository::new(MemoryStore::new());

    let mut first = repo.load();
    first.remove("compressor-1");
    first
        .get_mut("forklift-1")
        .unwrap()
        .tasks
        .push(Task::new("extra", "Extra", "1w"));

    let second = repo.load();
    assert!(second.contains("compressor-1"));
    assert_eq!(second, default_collection());
}

#[test]
fn corrupt_json_falls_back_to_defaults() {
    for raw in ["{not json", "[1, 2, 3]", "null", "\"text\"", "{\"m1\": {\"id\": 5}}"] {
        let repo = MachineRepository::new(MemoryStore::with_entries([(MACHINES_KEY, raw)]));
        assert_eq!(repo.load(), default_collection(), "raw {raw}");
    }
}

#[test]
fn load_takes_machine_ids_from_stored_keys() {
    let raw = r#"{"gen-main":{"id":"generator-1","name":"Generator"}}"#;
    let repo = MachineRepository::new(MemoryStore::with_entries([(MACHINES_KEY, raw)]));
    let loaded = repo.load();
    assert_eq!(loaded.ids().collect::<Vec<_>>(), vec!["gen-main"]);
    assert_eq!(loaded.get("gen-main").unwrap().id, "gen-main");
}

#[test]
fn saved_collection_is_loaded_back_in_order() {
    let repo = MachineRepository::new(MemoryStore::new());
    let collection = MachineCollection::from_machines([
        Machine::new("zeta", "Zeta").with_task(Task::new("t1", "Wipe", "3d")),
        Machine::new("alpha", "Alpha"),
    ]);

    repo.save(&collection).unwrap();
    let loaded = repo.load();
    assert_eq!(loaded, collection);
    assert_eq!(loaded.first_id(), Some("zeta"));
}

#[test]
fn save_overwrites_previous_value_under_single_key() {
    let store = MemoryStore::new();
    let repo = MachineRepository::new(&store);
    repo.save(&default_collection()).unwrap();
    repo.save(&MachineCollection::from_machines([Machine::new("only", "Only")]))
        .unwrap();

    assert_eq!(store.len(), 1);
    let raw = store.get(MACHINES_KEY).unwrap().unwrap();
    assert!(raw.contains("\"only\""));
    assert!(!raw.contains("compressor-1"));
}

#[test]
fn resolve_active_id_keeps_valid_and_repoints_stale_ids() {
    let collection =
        MachineCollection::from_machines([Machine::new("A", "A"), Machine::new("B", "B")]);
    assert_eq!(resolve_active_id(&collection, Some("C")).as_deref(), Some("A"));
    assert_eq!(resolve_active_id(&collection, Some("B")).as_deref(), Some("B"));
}

#[test]
fn sqlite_store_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pm.sqlite3");
    let collection = MachineCollection::from_machines([Machine::new("lathe", "Lathe")]);

    {
        let conn = open_store_db(&path).unwrap();
        let repo = MachineRepository::new(SqliteStore::new(&conn));
        repo.save(&collection).unwrap();
        repo.save_active_id(Some("lathe")).unwrap();
    }

    let conn = open_store_db(&path).unwrap();
    let repo = MachineRepository::new(SqliteStore::new(&conn));
    assert_eq!(repo.load(), collection);
    assert_eq!(repo.load_active_id().as_deref(), Some("lathe"));
}
