use super::*;
use crate::ids::{OwnerId, OwnerIdError};
use serde_json::json;

#[test]
fn owner_id_validation() {
    assert_eq!(OwnerId::try_new("").unwrap_err(), OwnerIdError::Empty);
    assert_eq!(OwnerId::try_new("   ").unwrap_err(), OwnerIdError::Empty);
    assert_eq!(
        OwnerId::try_new("a".repeat(129)).unwrap_err(),
        OwnerIdError::TooLong
    );
    assert_eq!(
        OwnerId::try_new("bad\u{0007}owner").unwrap_err(),
        OwnerIdError::ContainsControl
    );
    assert_eq!(OwnerId::try_new("user-7").unwrap().as_str(), "user-7");
}

#[test]
fn owner_id_length_counts_characters() {
    let accented = "é".repeat(128);
    assert_eq!(OwnerId::try_new(accented.clone()).unwrap().as_str(), accented);
    assert_eq!(
        OwnerId::try_new("é".repeat(129)).unwrap_err(),
        OwnerIdError::TooLong
    );
}

#[test]
fn row_ids_parse_plain_and_display_forms() {
    assert_eq!("42".parse::<CheckpointId>(), Ok(CheckpointId::new(42)));
    assert_eq!(
        "checkpoint#7".parse::<CheckpointId>(),
        Ok(CheckpointId::new(7))
    );
    assert_eq!(CheckpointId::new(7).to_string(), "checkpoint#7");
    assert_eq!("".parse::<BranchId>(), Err(RowIdError::Empty));
    assert_eq!("0".parse::<BranchId>(), Err(RowIdError::NotPositive));
    assert_eq!("-3".parse::<BranchId>(), Err(RowIdError::InvalidDigits));
    assert_eq!("branch#x".parse::<BranchId>(), Err(RowIdError::InvalidDigits));
}

#[test]
fn checkpoint_target_prefers_ids_over_names() {
    assert_eq!(
        CheckpointTarget::parse("12"),
        CheckpointTarget::Id(CheckpointId::new(12))
    );
    assert_eq!(
        CheckpointTarget::parse(" before deploy "),
        CheckpointTarget::Name("before deploy".to_string())
    );
}

#[test]
fn names_are_trimmed_and_validated() {
    assert_eq!(normalize_name("  start "), Ok("start".to_string()));
    assert_eq!(normalize_name(" "), Err(NameError::Empty));
    assert_eq!(normalize_name(&"x".repeat(201)), Err(NameError::TooLong));
    assert_eq!(normalize_name("a\nb"), Err(NameError::ContainsControl));
    assert_eq!(name_lookup_key(" Start "), "start");
}

#[test]
fn generated_labels() {
    assert_eq!(
        manual_checkpoint_label(0),
        "Checkpoint at 1970-01-01 00:00:00"
    );
    assert_eq!(
        manual_checkpoint_label(1_754_919_876_000),
        "Checkpoint at 2025-08-11 13:44:36"
    );
    assert_eq!(auto_checkpoint_label(" write_file ", 3), "After write_file #3");
}

#[test]
fn merge_state_replaces_top_level_keys_only() {
    let mut state = json!({"counter": 1, "nested": {"a": 1, "b": 2}})
        .as_object()
        .cloned()
        .unwrap();
    let patch = json!({"counter": 2, "nested": {"a": 9}, "new": true})
        .as_object()
        .cloned()
        .unwrap();
    merge_state(&mut state, &patch);
    assert_eq!(
        serde_json::Value::Object(state),
        json!({"counter": 2, "nested": {"a": 9}, "new": true})
    );
}

#[test]
fn turns_serialize_with_lowercase_roles() {
    let turn = Turn::new(Role::Assistant, "hello", 5);
    let value = serde_json::to_value(&turn).unwrap();
    assert_eq!(
        value,
        json!({"role": "assistant", "content": "hello", "created_at_ms": 5})
    );
    assert_eq!(Role::parse("USER"), Some(Role::User));
    assert_eq!(Role::parse("robot"), None);
}
