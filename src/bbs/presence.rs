//! Shared roster of currently authenticated usernames.
//!
//! One instance is created by the server and handed to every session behind
//! an `Arc`. The registry is a set: a second login for the same username
//! does not add a second entry, and a single logoff or disconnect clears
//! the entry even if another session for that user is still connected.
//! Nothing here is persisted; a restart starts from an empty roster.

use std::collections::BTreeSet;
use std::sync::Mutex;

/// In-memory online-user registry.
#[derive(Debug, Default)]
pub struct Presence {
    online: Mutex<BTreeSet<String>>,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user online. Returns false when the name was already present.
    pub fn add(&self, username: &str) -> bool {
        self.online
            .lock()
            .expect("presence mutex poisoned")
            .insert(username.to_string())
    }

    /// Mark a user offline. Returns false when the name was not present,
    /// which makes duplicate cleanup calls harmless.
    pub fn remove(&self, username: &str) -> bool {
        self.online
            .lock()
            .expect("presence mutex poisoned")
            .remove(username)
    }

    /// Snapshot of online usernames, sorted ascending.
    pub fn list(&self) -> Vec<String> {
        self.online
            .lock()
            .expect("presence mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.online.lock().expect("presence mutex poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::Presence;

    #[test]
    fn roster_is_a_sorted_set() {
        let presence = Presence::new();
        assert!(presence.add("zed"));
        assert!(presence.add("alice"));
        assert!(!presence.add("alice"), "double login should not duplicate");
        assert_eq!(presence.list(), vec!["alice".to_string(), "zed".to_string()]);
        assert_eq!(presence.count(), 2);
    }

    #[test]
    fn removal_is_idempotent() {
        let presence = Presence::new();
        presence.add("alice");
        assert!(presence.remove("alice"));
        assert!(!presence.remove("alice"), "second removal is a no-op");
        assert!(presence.list().is_empty());
    }
}
