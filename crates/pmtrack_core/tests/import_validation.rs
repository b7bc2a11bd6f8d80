use pmtrack_core::{parse_import, ImportError};

#[test]
fn empty_and_whitespace_files_are_reported_as_empty() {
    assert_eq!(parse_import(""), Err(ImportError::EmptyFile));
    assert_eq!(parse_import("  \n\t"), Err(ImportError::EmptyFile));
}

#[test]
fn invalid_json_is_reported_distinctly() {
    let err = parse_import("{\"machines\": ").unwrap_err();
    assert!(matches!(err, ImportError::InvalidJson(_)));
}

#[test]
fn missing_machines_key_is_reported() {
    assert_eq!(
        parse_import("{\"exportedAt\": \"2025-01-01T00:00:00Z\"}"),
        Err(ImportError::MissingMachines)
    );
    assert_eq!(parse_import("[1, 2]"), Err(ImportError::MissingMachines));
}

#[test]
fn malformed_or_empty_machine_maps_are_rejected() {
    let err = parse_import("{\"machines\": [1, 2]}").unwrap_err();
    assert!(matches!(err, ImportError::InvalidMachines(_)));
    assert_eq!(
        parse_import("{\"machines\": {}}"),
        Err(ImportError::NoMachines)
    );
}

#[test]
fn minimal_backup_without_optional_fields_imports() {
    let text = r#"{
        "machines": {
            "mill": {
                "id": "mill",
                "name": "Mill",
                "tasks": [{ "id": "t1", "name": "Grease", "freq": "2m", "freqLabel": "2 Months" }],
                "state": { "t1": { "nextDue": "2025-03-01", "history": [{ "date": "2025-01-01" }] } },
                "notes": {}
            }
        },
        "exportedAt": "2025-01-02T00:00:00.000Z",
        "someFutureField": true
    }"#;
    let collection = parse_import(text).unwrap();
    let mill = collection.get("mill").unwrap();
    assert_eq!(mill.tasks[0].freq, "2m");
    assert_eq!(
        mill.task_state("t1").unwrap().next_due.as_deref(),
        Some("2025-03-01")
    );
}

#[test]
fn machine_key_that_disagrees_with_its_id_is_rejected() {
    let text = r#"{
        "machines": {
            "gen-main": { "id": "generator-1", "name": "Generator" }
        }
    }"#;
    let err = parse_import(text).unwrap_err();
    match err {
        ImportError::InvalidMachines(details) => {
            assert!(details.contains("gen-main"));
            assert!(details.contains("generator-1"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
