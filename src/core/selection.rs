//! Ordered multi-selection of workspace commits for a release.

use crate::git::WorkspaceCommit;

/// Commits picked for a release, in selection order.
///
/// Membership is keyed by commit hash. Toggling a commit off and on again
/// restores membership but moves it to the end.
#[derive(Debug, Clone, Default)]
pub struct SelectedCommitSet {
    items: Vec<WorkspaceCommit>,
}

impl SelectedCommitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `commit` if absent, remove it if present. Returns whether the
    /// commit is selected afterwards.
    pub fn toggle(&mut self, commit: &WorkspaceCommit) -> bool {
        if let Some(index) = self.items.iter().position(|c| c.hash == commit.hash) {
            self.items.remove(index);
            false
        } else {
            self.items.push(commit.clone());
            true
        }
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.items.iter().any(|c| c.hash == hash)
    }

    /// Selected commits in insertion order.
    pub fn ordered(&self) -> &[WorkspaceCommit] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn hashes(&self) -> Vec<String> {
        self.items.iter().map(|c| c.hash.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str) -> WorkspaceCommit {
        WorkspaceCommit {
            hash: hash.to_string(),
            subject: format!("subject {hash}"),
            body: String::new(),
            date: String::new(),
            diff: String::new(),
        }
    }

    #[test]
    fn test_toggle_keeps_insertion_order() {
        let (c1, c2, c3) = (commit("c1"), commit("c2"), commit("c3"));
        let mut set = SelectedCommitSet::new();

        assert!(set.toggle(&c3));
        assert!(set.toggle(&c1));
        assert!(set.toggle(&c2));
        assert!(!set.toggle(&c1));

        assert_eq!(set.hashes(), vec!["c3", "c2"]);
        assert!(!set.contains("c1"));
    }

    #[test]
    fn test_double_toggle_of_new_commit_is_identity() {
        let mut set = SelectedCommitSet::new();
        set.toggle(&commit("a"));
        set.toggle(&commit("b"));
        let before = set.hashes();

        set.toggle(&commit("x"));
        set.toggle(&commit("x"));
        assert_eq!(set.hashes(), before);
    }

    #[test]
    fn test_double_toggle_of_selected_commit_moves_it_last() {
        let mut set = SelectedCommitSet::new();
        set.toggle(&commit("a"));
        set.toggle(&commit("b"));

        set.toggle(&commit("a"));
        set.toggle(&commit("a"));
        assert_eq!(set.hashes(), vec!["b", "a"]);
    }

    #[test]
    fn test_clear() {
        let mut set = SelectedCommitSet::new();
        set.toggle(&commit("a"));
        set.clear();
        assert!(set.is_empty());
    }
}
