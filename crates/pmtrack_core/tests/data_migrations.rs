use pmtrack_core::{
    default_collection, run_migrations, Machine, MachineCollection, Task, DEPRECATED_MACHINE_ID,
    REQUIRED_MACHINE_ID,
};

fn legacy_collection() -> MachineCollection {
    MachineCollection::from_machines([
        Machine::new(DEPRECATED_MACHINE_ID, "Demo Machine")
            .with_task(Task::new("t1", "Demo task", "1m")),
        Machine::new("press-7", "Press"),
    ])
}

#[test]
fn migration_removes_deprecated_and_inserts_required_with_one_save() {
    let mut collection = legacy_collection();
    let mut saves = Vec::new();

    let active = run_migrations(&mut collection, Some("press-7"), |migrated| {
        saves.push(migrated.clone())
    });

    assert_eq!(active.as_deref(), Some("press-7"));
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0], collection);
    assert!(!collection.contains(DEPRECATED_MACHINE_ID));
    let required = collection.get(REQUIRED_MACHINE_ID).unwrap();
    assert!(required.tasks.is_empty());
    assert_eq!(
        collection.ids().collect::<Vec<_>>(),
        vec!["press-7", REQUIRED_MACHINE_ID]
    );
}

#[test]
fn migration_is_idempotent_and_second_run_does_not_save() {
    let mut collection = legacy_collection();
    let mut save_count = 0;

    run_migrations(&mut collection, None, |_| save_count += 1);
    let after_first = collection.clone();
    run_migrations(&mut collection, None, |_| save_count += 1);

    assert_eq!(collection, after_first);
    assert_eq!(save_count, 1);
}

#[test]
fn active_id_pointing_at_removed_machine_moves_to_first_remaining() {
    let mut collection = legacy_collection();
    let active = run_migrations(&mut collection, Some(DEPRECATED_MACHINE_ID), |_| {});
    assert_eq!(active.as_deref(), Some("press-7"));
}

#[test]
fn unrelated_active_id_is_returned_unchanged() {
    let mut collection = default_collection();
    let active = run_migrations(&mut collection, Some("missing"), |_| {
        panic!("defaults need no save")
    });
    assert_eq!(active.as_deref(), Some("missing"));

    let active = run_migrations(&mut collection, None, |_| panic!("defaults need no save"));
    assert_eq!(active, None);
}

#[test]
fn required_machine_already_present_keeps_its_tasks() {
    let mut collection = MachineCollection::from_machines([Machine::new(
        REQUIRED_MACHINE_ID,
        "My Generator",
    )
    .with_task(Task::new("load-test", "Monthly load test", "1m"))]);

    let mut saved = false;
    run_migrations(&mut collection, None, |_| saved = true);

    assert!(!saved);
    let machine = collection.get(REQUIRED_MACHINE_ID).unwrap();
    assert_eq!(machine.name, "My Generator");
    assert_eq!(machine.tasks.len(), 1);
}
