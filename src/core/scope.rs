//! Directory browser backing the scope picker.

use std::path::{Path, PathBuf};

use crate::core::list::SelectList;
use crate::git::GitStatusSnapshot;

/// A file or directory in the browser's current directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub is_dir: bool,
    /// Staged status code (`M` for directories holding staged changes)
    pub status: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("cannot move outside workspace")]
    OutsideWorkspace,

    #[error("{0} is not a directory")]
    NotADirectory(String),

    #[error("nothing is selected")]
    NothingSelected,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Browses the repository, confined to the snapshot root.
#[derive(Debug, Clone)]
pub struct ScopeBrowser {
    snapshot: GitStatusSnapshot,
    pwd: PathBuf,
    pub entries: SelectList<FileEntry>,
}

impl ScopeBrowser {
    /// Open the browser at the snapshot root.
    pub fn open(snapshot: GitStatusSnapshot) -> Result<Self, ScopeError> {
        let pwd = snapshot.root.clone();
        let entries = SelectList::new(read_entries(&pwd, &snapshot)?);
        Ok(Self { snapshot, pwd, entries })
    }

    pub fn pwd(&self) -> &Path {
        &self.pwd
    }

    pub fn at_root(&self) -> bool {
        self.pwd == self.snapshot.root
    }

    /// Current directory relative to the root (empty at the root).
    pub fn relative_pwd(&self) -> PathBuf {
        self.pwd.strip_prefix(&self.snapshot.root).map(Path::to_path_buf).unwrap_or_default()
    }

    fn change_dir(&mut self, target: PathBuf) -> Result<(), ScopeError> {
        let entries = read_entries(&target, &self.snapshot)?;
        self.pwd = target;
        self.entries.clear_filter();
        self.entries.set_items(entries);
        self.entries.select_first();
        Ok(())
    }

    /// Move to the parent directory. Refused at the root.
    pub fn ascend(&mut self) -> Result<(), ScopeError> {
        if self.at_root() {
            return Err(ScopeError::OutsideWorkspace);
        }
        let parent = self.pwd.parent().map(Path::to_path_buf).ok_or(ScopeError::OutsideWorkspace)?;
        if !parent.starts_with(&self.snapshot.root) {
            return Err(ScopeError::OutsideWorkspace);
        }
        self.change_dir(parent)
    }

    /// Enter the highlighted directory.
    pub fn descend(&mut self) -> Result<(), ScopeError> {
        let entry = self.entries.selected().cloned().ok_or(ScopeError::NothingSelected)?;
        if !entry.is_dir {
            return Err(ScopeError::NotADirectory(entry.name));
        }
        self.change_dir(self.pwd.join(&entry.name))
    }

    /// The name used as commit scope for the highlighted entry.
    pub fn selected_scope(&self) -> Option<String> {
        self.entries.selected().map(|entry| entry.name.clone())
    }
}

/// Directory listing with directories first, then files, each sorted by
/// name. The `.git` directory is skipped.
fn read_entries(dir: &Path, snapshot: &GitStatusSnapshot) -> Result<Vec<FileEntry>, ScopeError> {
    let io_err = |source| ScopeError::Io { path: dir.to_path_buf(), source };
    let relative_dir = dir.strip_prefix(&snapshot.root).map(Path::to_path_buf).unwrap_or_default();

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == ".git" {
            continue;
        }
        let is_dir = entry.file_type().map_err(io_err)?.is_dir();
        let status = snapshot.status_of(&relative_dir.join(&name), is_dir).map(str::to_string);
        entries.push(FileEntry { name, is_dir, status });
    }

    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::git::propagate_directory_status;

    fn snapshot(root: &Path, staged: &[&str]) -> GitStatusSnapshot {
        let file_status: BTreeMap<PathBuf, String> =
            staged.iter().map(|p| (PathBuf::from(p), "M".to_string())).collect();
        let affected_directories = propagate_directory_status(file_status.keys());
        GitStatusSnapshot { root: root.to_path_buf(), file_status, affected_directories }
    }

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/ui")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("src/ui/button.go"), "package ui").unwrap();
        std::fs::write(dir.path().join("README.md"), "# readme").unwrap();
        dir
    }

    #[test]
    fn test_entries_are_directories_first_with_status() {
        let dir = workspace();
        let browser = ScopeBrowser::open(snapshot(dir.path(), &["src/ui/button.go"])).unwrap();

        let names: Vec<_> = browser.entries.items().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["docs", "src", "README.md"]);

        let src = &browser.entries.items()[1];
        assert_eq!(src.status.as_deref(), Some("M"));
        assert_eq!(browser.entries.items()[0].status, None);
    }

    #[test]
    fn test_ascend_at_root_is_refused() {
        let dir = workspace();
        let mut browser = ScopeBrowser::open(snapshot(dir.path(), &[])).unwrap();

        assert!(matches!(browser.ascend(), Err(ScopeError::OutsideWorkspace)));
        assert_eq!(browser.pwd(), dir.path());
    }

    #[test]
    fn test_descend_and_ascend() {
        let dir = workspace();
        let mut browser = ScopeBrowser::open(snapshot(dir.path(), &["src/ui/button.go"])).unwrap();

        browser.entries.select_next();
        browser.descend().unwrap();
        assert_eq!(browser.relative_pwd(), PathBuf::from("src"));
        assert_eq!(browser.entries.selected().map(|e| e.name.as_str()), Some("ui"));
        assert_eq!(browser.entries.selected().and_then(|e| e.status.as_deref()), Some("M"));

        browser.descend().unwrap();
        assert_eq!(browser.selected_scope().as_deref(), Some("button.go"));
        assert!(matches!(browser.descend(), Err(ScopeError::NotADirectory(_))));

        browser.ascend().unwrap();
        browser.ascend().unwrap();
        assert!(browser.at_root());
    }
}
