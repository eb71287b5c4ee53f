#![forbid(unsafe_code)]

use fp_core::ids::OwnerId;
use fp_core::{Branch, CheckpointId, Role, StateBlob};
use fp_storage::{
    CreateBranchRequest, CreateCheckpointRequest, CreateProjectRequest, ListCheckpointsRequest,
    SqliteStore, StoreError,
};
use serde_json::json;
use tempfile::TempDir;

fn branch_with_turns(store: &mut SqliteStore, turns: &[(Role, &str)]) -> Branch {
    let owner = OwnerId::try_new("alice").expect("owner id");
    let project = store
        .create_project(CreateProjectRequest::new(owner, "Snapshots"))
        .expect("project");
    let mut branch = store
        .create_branch(CreateBranchRequest::empty(project.id))
        .expect("branch");
    for (role, content) in turns {
        branch = store.append_turn(branch.id, *role, content).expect("turn");
    }
    branch
}

#[test]
fn checkpoint_is_a_deep_copy_of_the_branch() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    let branch = branch_with_turns(&mut store, &[(Role::User, "hi"), (Role::Assistant, "hello")]);
    let mut patch = StateBlob::new();
    patch.insert("plan".to_string(), json!({"steps": ["a", "b"]}));
    let branch = store.update_state(branch.id, &patch).expect("state");

    let checkpoint = store
        .create_checkpoint(CreateCheckpointRequest::manual(branch.id, Some(" start ")))
        .expect("checkpoint");
    assert_eq!(checkpoint.name, "start");
    assert!(!checkpoint.automatic);
    assert_eq!(checkpoint.state, branch.state);
    assert_eq!(checkpoint.turns, branch.turns);

    store.append_turn(branch.id, Role::User, "later").expect("turn");
    let mut patch = StateBlob::new();
    patch.insert("plan".to_string(), json!(null));
    store.update_state(branch.id, &patch).expect("state");

    let stored = store.get_checkpoint(checkpoint.id).expect("get checkpoint");
    assert_eq!(stored, checkpoint);
    assert_eq!(stored.turn_count(), 2);
    assert_eq!(stored.state.get("plan"), Some(&json!({"steps": ["a", "b"]})));
}

#[test]
fn unnamed_checkpoint_gets_timestamp_label() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    let branch = branch_with_turns(&mut store, &[]);

    let checkpoint = store
        .create_checkpoint(CreateCheckpointRequest::manual(branch.id, None))
        .expect("checkpoint");
    assert!(checkpoint.name.starts_with("Checkpoint at "));
    assert_eq!(checkpoint.name.len(), "Checkpoint at 2025-01-01 00:00:00".len());
}

#[test]
fn list_is_newest_first_and_pages() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    let branch = branch_with_turns(&mut store, &[(Role::User, "hi")]);

    let mut created = Vec::new();
    for name in ["one", "two", "three"] {
        let checkpoint = store
            .create_checkpoint(CreateCheckpointRequest::manual(branch.id, Some(name)))
            .expect("checkpoint");
        created.push(checkpoint.id);
    }
    let mut automatic = CreateCheckpointRequest::manual(branch.id, Some("auto"));
    automatic.automatic = true;
    let auto = store.create_checkpoint(automatic).expect("auto checkpoint");

    let all = store
        .list_checkpoints(ListCheckpointsRequest::all(branch.id))
        .expect("list all");
    let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["auto", "three", "two", "one"]);

    let page = store
        .list_checkpoints(ListCheckpointsRequest {
            limit: Some(2),
            offset: 1,
            ..ListCheckpointsRequest::all(branch.id)
        })
        .expect("page");
    let ids: Vec<_> = page.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![created[2], created[1]]);

    let autos = store
        .list_checkpoints(ListCheckpointsRequest::automatic(branch.id))
        .expect("automatic only");
    assert_eq!(autos.len(), 1);
    assert_eq!(autos[0].id, auto.id);

    let latest = store.latest_checkpoint(branch.id).expect("latest");
    assert_eq!(latest.map(|c| c.id), Some(auto.id));

    let counts = store.count_checkpoints(branch.id).expect("counts");
    assert_eq!((counts.total, counts.automatic, counts.manual), (4, 1, 3));
}

#[test]
fn counter_tracks_creates_and_deletes() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    let branch = branch_with_turns(&mut store, &[(Role::User, "hi")]);

    let first = store
        .create_checkpoint(CreateCheckpointRequest::manual(branch.id, Some("a")))
        .expect("a");
    store
        .create_checkpoint(CreateCheckpointRequest::manual(branch.id, Some("b")))
        .expect("b");
    assert_eq!(store.get_branch(branch.id).expect("branch").checkpoint_count, 2);

    store.delete_checkpoint(first.id).expect("delete");
    let branch = store.get_branch(branch.id).expect("branch");
    assert_eq!(branch.checkpoint_count, 1);
    assert_eq!(
        branch.checkpoint_count,
        store.count_checkpoints(branch.id).expect("count").total
    );

    let err = store.delete_checkpoint(first.id).expect_err("already gone");
    assert!(err.is_not_found());
    assert_eq!(store.get_branch(branch.id).expect("branch").checkpoint_count, 1);
}

#[test]
fn missing_checkpoint_and_branch_are_not_found() {
    let dir = TempDir::new().expect("temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");

    let err = store
        .get_checkpoint(CheckpointId::new(77))
        .expect_err("missing checkpoint");
    assert!(matches!(err, StoreError::CheckpointNotFound(_)));

    let err = store
        .list_checkpoints(ListCheckpointsRequest::all(fp_core::BranchId::new(5)))
        .expect_err("missing branch");
    assert!(matches!(err, StoreError::BranchNotFound(_)));
}

#[test]
fn invalid_checkpoint_name_is_rejected_without_side_effects() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    let branch = branch_with_turns(&mut store, &[]);

    let err = store
        .create_checkpoint(CreateCheckpointRequest::manual(branch.id, Some("bad\nname")))
        .expect_err("control characters");
    assert_eq!(err.code(), "INVALID_INPUT");
    assert_eq!(store.get_branch(branch.id).expect("branch").checkpoint_count, 0);
}
