//! Git integration module.
//!
//! Every repository question the wizard asks goes through [`GitResolver`],
//! which shells out to the `git` binary through a [`GitShell`]. Production
//! code uses [`SystemGit`]; tests substitute a scripted shell.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Errors produced while talking to git.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// The working directory is not inside a git work tree.
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    /// git exited with a failure status and printed a diagnostic.
    #[error("`git {command}` failed: {stderr}")]
    GitCommandFailed { command: String, stderr: String },

    /// The git binary could not be spawned.
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw output of a single git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// A successful invocation printing `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self { success: true, stdout: stdout.into(), stderr: String::new() }
    }

    /// A failed invocation printing `stderr`.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self { success: false, stdout: String::new(), stderr: stderr.into() }
    }
}

/// Something that can run git with a list of arguments.
pub trait GitShell: Send + Sync {
    fn run(&self, args: &[&str]) -> std::io::Result<GitOutput>;
}

/// Runs the real `git` binary inside a fixed working directory.
#[derive(Debug, Clone)]
pub struct SystemGit {
    workdir: PathBuf,
}

impl SystemGit {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self { workdir: workdir.into() }
    }
}

impl GitShell for SystemGit {
    fn run(&self, args: &[&str]) -> std::io::Result<GitOutput> {
        let output = Command::new("git").args(args).current_dir(&self.workdir).output()?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A commit in the workspace history, as shown in the release picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceCommit {
    pub hash: String,
    pub subject: String,
    pub body: String,
    pub date: String,
    pub diff: String,
}

impl WorkspaceCommit {
    /// First seven characters of the hash.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// Commits offered for a release, with the branch and tag they sit on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceHistory {
    pub commits: Vec<WorkspaceCommit>,
    pub branch: String,
    /// Latest tag, empty when the repository has none
    pub version: String,
}

/// Staged-change view of the repository used by the scope browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitStatusSnapshot {
    /// Absolute repository root.
    pub root: PathBuf,
    /// Staged file path (relative to `root`) to its status code.
    pub file_status: BTreeMap<PathBuf, String>,
    /// Directories (relative to `root`) containing at least one staged file.
    /// The empty path stands for the root itself.
    pub affected_directories: BTreeSet<PathBuf>,
}

impl GitStatusSnapshot {
    /// Status of a path relative to the root. Directories report `M` when
    /// they contain a staged change.
    pub fn status_of(&self, relative: &Path, is_dir: bool) -> Option<&str> {
        if is_dir {
            self.affected_directories.contains(relative).then_some("M")
        } else {
            self.file_status.get(relative).map(String::as_str)
        }
    }

    pub fn has_staged_changes(&self) -> bool {
        !self.file_status.is_empty()
    }
}

/// Marks every ancestor directory of each staged path.
///
/// Ancestors are walked up to, but not including, the root. A file sitting
/// directly in the root marks the root itself (the empty path).
pub fn propagate_directory_status<'a, I>(paths: I) -> BTreeSet<PathBuf>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    let mut affected = BTreeSet::new();

    for path in paths {
        let mut parent = path.parent();
        if parent.is_some_and(|p| p.as_os_str().is_empty()) {
            affected.insert(PathBuf::new());
            continue;
        }
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            affected.insert(dir.to_path_buf());
            parent = dir.parent();
        }
    }

    affected
}

const LOG_ITEM_START: &str = "COMMIT_ITEM_START";
const LOG_METADATA_END: &str = "COMMIT_METADATA_END";
const LOG_PRETTY_FORMAT: &str = "--pretty=format:%x00COMMIT_ITEM_START%x00%H%x00%s%x00%b%x00%ad%x00COMMIT_METADATA_END%x00";

/// Parses `git log -p` output produced with [`LOG_PRETTY_FORMAT`].
pub fn parse_log(raw: &str) -> Vec<WorkspaceCommit> {
    let marker = format!("\0{LOG_ITEM_START}\0");

    raw.split(marker.as_str())
        .filter(|chunk| !chunk.trim().is_empty())
        .filter_map(|chunk| {
            let (metadata, diff) = match chunk.split_once(&format!("\0{LOG_METADATA_END}\0")) {
                Some((meta, diff)) => (meta, diff),
                None => (chunk, ""),
            };
            let mut fields = metadata.split('\0');
            let hash = fields.next()?.trim().to_string();
            if hash.is_empty() {
                return None;
            }
            let subject = fields.next().unwrap_or_default().trim().to_string();
            let body = fields.next().unwrap_or_default().trim().to_string();
            let date = fields.next().unwrap_or_default().trim().to_string();

            Some(WorkspaceCommit { hash, subject, body, date, diff: diff.trim().to_string() })
        })
        .collect()
}

/// Answers the wizard's repository questions.
pub struct GitResolver {
    shell: Box<dyn GitShell>,
}

impl std::fmt::Debug for GitResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitResolver").finish_non_exhaustive()
    }
}

impl GitResolver {
    pub fn new(shell: Box<dyn GitShell>) -> Self {
        Self { shell }
    }

    /// Resolver backed by the system `git` running in `workdir`.
    pub fn system(workdir: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(SystemGit::new(workdir)))
    }

    /// Runs git and maps a failure that printed diagnostics to an error.
    /// Failures with empty stderr are returned to the caller untouched.
    fn invoke(&self, args: &[&str]) -> Result<GitOutput, GitError> {
        tracing::debug!(command = %args.join(" "), "running git");
        let output = self.shell.run(args)?;

        if !output.success && !output.stderr.trim().is_empty() {
            return Err(GitError::GitCommandFailed {
                command: args.join(" "),
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output)
    }

    fn invoke_strict(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.invoke(args)?;
        if !output.success {
            return Err(GitError::GitCommandFailed {
                command: args.join(" "),
                stderr: "exited with a failure status".to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// Absolute path of the repository root.
    pub fn resolve_root(&self) -> Result<PathBuf, GitError> {
        let output = self.shell.run(&["rev-parse", "--show-toplevel"])?;
        let root = output.stdout.trim();

        if !output.success || root.is_empty() {
            return Err(GitError::NotARepository(PathBuf::from(".")));
        }

        Ok(PathBuf::from(root))
    }

    /// Staged paths mapped to their single-letter status code.
    ///
    /// Paths come from `-z` output so git never quotes them. A failed
    /// invocation with no diagnostics counts as "nothing staged".
    pub fn diff_name_status(&self) -> Result<BTreeMap<PathBuf, String>, GitError> {
        let output = self.invoke(&["diff", "--cached", "--name-status", "-z"])?;
        if !output.success {
            return Ok(BTreeMap::new());
        }

        let mut statuses = BTreeMap::new();
        let mut fields = output.stdout.split('\0').filter(|f| !f.is_empty());
        while let Some(code) = fields.next() {
            // Renames and copies list the source path, then the destination.
            let paths = if code.starts_with(['R', 'C']) { 2 } else { 1 };
            let Some(path) = fields.by_ref().take(paths).last() else {
                break;
            };
            let code: String = code.chars().take(1).collect();
            statuses.insert(PathBuf::from(path), code);
        }

        Ok(statuses)
    }

    /// Staged file names in the order git lists them, unquoted.
    pub fn staged_files(&self) -> Result<Vec<String>, GitError> {
        let output = self.invoke(&["diff", "--cached", "--name-only", "-z"])?;
        if !output.success {
            return Ok(Vec::new());
        }

        Ok(output.stdout.split('\0').filter(|f| !f.is_empty()).map(str::to_string).collect())
    }

    /// Concatenated per-file staged diffs, each wrapped as
    /// `=== <file> ===\n<diff>\n`.
    ///
    /// Appending stops before the first block that would push the total
    /// past `max_chars`, so the result never exceeds the budget.
    pub fn staged_diff_summary(&self, max_chars: usize) -> Result<String, GitError> {
        let mut summary = String::new();
        let mut count = 0usize;

        for file in self.staged_files()? {
            let diff = self.invoke_strict(&["diff", "--cached", "--", &file])?;
            let block = format!("=== {} ===\n{}\n", file, diff.trim_end());
            let block_len = block.chars().count();

            if count + block_len > max_chars {
                tracing::debug!(file = %file, count, max_chars, "diff budget reached");
                break;
            }

            count += block_len;
            summary.push_str(&block);
        }

        Ok(summary)
    }

    /// Local branch names.
    pub fn list_branches(&self) -> Result<Vec<String>, GitError> {
        let stdout = self.invoke_strict(&["branch", "--format=%(refname:short)"])?;
        Ok(stdout.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
    }

    pub fn current_branch(&self) -> Result<String, GitError> {
        Ok(self.invoke_strict(&["rev-parse", "--abbrev-ref", "HEAD"])?.trim().to_string())
    }

    /// Most recent reachable tag, or an empty string when none exists.
    pub fn latest_tag(&self) -> Result<String, GitError> {
        match self.invoke(&["describe", "--tags", "--abbrev=0"]) {
            Ok(output) if output.success => Ok(output.stdout.trim().to_string()),
            Ok(_) => Ok(String::new()),
            Err(GitError::GitCommandFailed { stderr, .. }) if stderr.contains("No names found") => {
                Ok(String::new())
            }
            Err(GitError::GitCommandFailed { stderr, .. }) if stderr.contains("cannot describe") => {
                Ok(String::new())
            }
            Err(err) => Err(err),
        }
    }

    /// The `max_count` most recent commits with their patches, newest first.
    pub fn workspace_commits(&self, max_count: usize) -> Result<Vec<WorkspaceCommit>, GitError> {
        let max_count = format!("--max-count={max_count}");
        let stdout = self.invoke_strict(&[
            "log",
            "-p",
            &max_count,
            "--date=format:%y-%m-%d %H:%M",
            LOG_PRETTY_FORMAT,
        ])?;
        Ok(parse_log(&stdout))
    }

    /// Everything the release picker shows: recent commits, the current
    /// branch and the latest tag. Branch and tag failures degrade to empty.
    pub fn workspace_history(&self, max_count: usize) -> Result<WorkspaceHistory, GitError> {
        let commits = self.workspace_commits(max_count)?;
        let branch = self.current_branch().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not resolve current branch");
            String::new()
        });
        let version = self.latest_tag().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not resolve latest tag");
            String::new()
        });

        Ok(WorkspaceHistory { commits, branch, version })
    }

    /// Root, staged statuses and affected directories in one call.
    pub fn status_snapshot(&self) -> Result<GitStatusSnapshot, GitError> {
        let root = self.resolve_root()?;
        let file_status = self.diff_name_status()?;
        let affected_directories = propagate_directory_status(file_status.keys());

        Ok(GitStatusSnapshot { root, file_status, affected_directories })
    }
}
