use std::collections::HashMap;

use serde::Serialize;

pub const LEAVE_PROMPT: &str = "You have unsaved course role changes. Leave this page anyway?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum NavigationDecision {
    Allow,
    Confirm { prompt: String },
}

/// Tracks the unsaved-changes predicate and turns it into a navigation
/// decision. Re-armed on every edit through `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NavigationGuard {
    armed: bool,
}

impl NavigationGuard {
    pub fn update(&mut self, has_unsaved_changes: bool) {
        if self.armed != has_unsaved_changes {
            log::debug!("navigation guard armed={has_unsaved_changes}");
        }
        self.armed = has_unsaved_changes;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn check(&self) -> NavigationDecision {
        if self.armed {
            NavigationDecision::Confirm { prompt: LEAVE_PROMPT.to_string() }
        } else {
            NavigationDecision::Allow
        }
    }
}

/// Key-value persistence for the "has unsaved changes" flag so it survives
/// a remount within the same browser session. Provided by the host.
pub trait UnsavedFlagStore {
    fn put(&mut self, key: &str, value: bool);
    fn get(&self, key: &str) -> Option<bool>;
}

/// Storage key for a subject's flag.
pub fn unsaved_flag_key(username: &str) -> String {
    format!("{username}hasUnsavedChanges")
}

pub fn persist_unsaved_flag(store: &mut dyn UnsavedFlagStore, username: &str, has_unsaved_changes: bool) {
    store.put(&unsaved_flag_key(username), has_unsaved_changes);
}

pub fn read_unsaved_flag(store: &dyn UnsavedFlagStore, username: &str) -> bool {
    store.get(&unsaved_flag_key(username)).unwrap_or(false)
}

impl UnsavedFlagStore for HashMap<String, bool> {
    fn put(&mut self, key: &str, value: bool) {
        self.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<bool> {
        HashMap::get(self, key).copied()
    }
}
