#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub const DEFAULT_KEEP_LATEST: usize = 5;

/// Checkpoint-management actions. Invoking one of these never triggers an automatic capture.
pub const CHECKPOINT_ACTION_TAGS: &[&str] = &[
    "create_checkpoint",
    "list_checkpoints",
    "rollback_to_checkpoint",
    "delete_checkpoint",
    "get_checkpoint_info",
    "cleanup_auto_checkpoints",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoCheckpointPolicy {
    pub enabled: bool,
    /// Retention used by `prune` callers and by `prune_after_capture`.
    pub keep_latest: usize,
    pub prune_after_capture: bool,
    pub ignored_tags: Vec<String>,
}

impl Default for AutoCheckpointPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            keep_latest: DEFAULT_KEEP_LATEST,
            prune_after_capture: false,
            ignored_tags: CHECKPOINT_ACTION_TAGS
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
        }
    }
}

impl AutoCheckpointPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Returns the normalized tag when a mutation carrying it should be captured.
    pub fn capture_tag<'a>(&self, trigger_tag: Option<&'a str>) -> Option<&'a str> {
        if !self.enabled {
            return None;
        }
        let tag = trigger_tag.map(str::trim).filter(|tag| !tag.is_empty())?;
        if self.is_ignored(tag) {
            return None;
        }
        Some(tag)
    }

    pub fn is_ignored(&self, tag: &str) -> bool {
        let tag = tag.trim();
        // `name_tool` matches an ignored `name`.
        let base = tag.strip_suffix("_tool").unwrap_or(tag);
        self.ignored_tags
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(tag) || ignored.eq_ignore_ascii_case(base))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackPolicy {
    /// Copy the source branch's checkpoints up to the target into the forked branch.
    pub inherit_checkpoints: bool,
}

impl Default for RollbackPolicy {
    fn default() -> Self {
        Self {
            inherit_checkpoints: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_tag_requires_enabled_policy_and_non_empty_tag() {
        let policy = AutoCheckpointPolicy::default();
        assert_eq!(policy.capture_tag(Some(" write_file ")), Some("write_file"));
        assert_eq!(policy.capture_tag(Some("   ")), None);
        assert_eq!(policy.capture_tag(None), None);

        let disabled = AutoCheckpointPolicy::disabled();
        assert_eq!(disabled.capture_tag(Some("write_file")), None);
    }

    #[test]
    fn checkpoint_actions_never_trigger_captures() {
        let policy = AutoCheckpointPolicy::default();
        assert_eq!(policy.capture_tag(Some("create_checkpoint")), None);
        assert_eq!(policy.capture_tag(Some("rollback_to_checkpoint_tool")), None);
        assert_eq!(policy.capture_tag(Some("Delete_Checkpoint")), None);
        assert_eq!(policy.capture_tag(Some("search_web")), Some("search_web"));
    }
}
