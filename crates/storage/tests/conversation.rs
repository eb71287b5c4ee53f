#![forbid(unsafe_code)]

use fp_core::engine::{ConversationEngine, EngineReply};
use fp_core::ids::OwnerId;
use fp_core::{Branch, Role, StateBlob, Turn};
use fp_storage::{CreateBranchRequest, CreateProjectRequest, ErrorKind, SqliteStore};
use serde_json::json;
use std::collections::VecDeque;
use tempfile::TempDir;

#[derive(Debug, thiserror::Error)]
#[error("script exhausted")]
struct ScriptExhausted;

/// Replays canned replies and records what it was shown.
#[derive(Default)]
struct ScriptedEngine {
    replies: VecDeque<EngineReply>,
    seen_turns: Vec<usize>,
}

impl ConversationEngine for ScriptedEngine {
    type Error = ScriptExhausted;

    fn respond(&mut self, turns: &[Turn], _state: &StateBlob) -> Result<EngineReply, Self::Error> {
        self.seen_turns.push(turns.len());
        self.replies.pop_front().ok_or(ScriptExhausted)
    }
}

fn new_branch(store: &mut SqliteStore) -> Branch {
    let owner = OwnerId::try_new("alice").expect("owner id");
    let project = store
        .create_project(CreateProjectRequest::new(owner, "Chat"))
        .expect("project");
    store
        .create_branch(CreateBranchRequest::empty(project.id))
        .expect("branch")
}

#[test]
fn run_turn_records_both_sides_and_captures_on_trigger() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    let branch = new_branch(&mut store);

    let mut patch = StateBlob::new();
    patch.insert("destination".to_string(), json!("Porto"));
    let mut engine = ScriptedEngine {
        replies: VecDeque::from([
            EngineReply::text("Where to?"),
            EngineReply::text("Booked.")
                .with_state(patch)
                .with_trigger("book_hotel"),
        ]),
        ..ScriptedEngine::default()
    };

    let first = store
        .run_turn(&mut engine, branch.id, "plan a trip")
        .expect("first turn");
    assert!(first.checkpoint.is_none());
    assert_eq!(first.branch.turns.len(), 2);

    let second = store
        .run_turn(&mut engine, branch.id, "Porto please")
        .expect("second turn");
    assert_eq!(engine.seen_turns, vec![1, 3]);

    let roles: Vec<_> = second.branch.turns.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(second.branch.state.get("destination"), Some(&json!("Porto")));

    let checkpoint = second.checkpoint.expect("auto checkpoint");
    assert!(checkpoint.automatic);
    assert_eq!(checkpoint.name, "After book_hotel #1");
    assert_eq!(checkpoint.turns, second.branch.turns);
    assert_eq!(checkpoint.state, second.branch.state);
}

#[test]
fn engine_failure_keeps_only_the_user_turn() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    let branch = new_branch(&mut store);
    let mut engine = ScriptedEngine::default();

    let err = store
        .run_turn(&mut engine, branch.id, "anyone there?")
        .expect_err("engine fails");
    assert_eq!(err.kind(), ErrorKind::EngineFailure);
    assert_eq!(err.code(), "ENGINE_FAILURE");

    let branch = store.get_branch(branch.id).expect("branch");
    assert_eq!(branch.turns.len(), 1);
    assert_eq!(branch.turns[0].role, Role::User);
    assert_eq!(branch.checkpoint_count, 0);
}
