use crate::config::Config;
use crate::error::{GitError, Result};
use std::path::{Path, PathBuf};

pub const GITDIR_NAME: &str = ".pygit";

/// Names excluded from worktree scans and worktree clearing, in addition to
/// the gitdir itself.
pub const EXTRA_IGNORED_NAMES: &[&str] = &["target"];

/// A discovered or newly created repository: a (worktree, gitdir) pair.
pub struct Repository {
    pub worktree: PathBuf,
    pub gitdir: PathBuf,
    config: Config,
}

impl Repository {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Computes `gitdir/path/components...`.
    pub fn path(&self, path: &[&str]) -> PathBuf {
        let mut p = self.gitdir.clone();
        for part in path {
            p.push(part);
        }
        p
    }

    /// Same as `path`, but ensures the parent directories of the final
    /// component exist first.
    pub fn file(&self, path: &[&str]) -> Result<PathBuf> {
        if path.len() > 1 {
            self.dir(&path[..path.len() - 1], false)?;
        }
        Ok(self.path(path))
    }

    /// Resolves `gitdir/path`, creating it (and parents) if `mkdir` is set
    /// and it doesn't exist. Fails with `NotADirectory` if it exists and
    /// isn't a directory.
    pub fn dir(&self, path: &[&str], mkdir: bool) -> Result<Option<PathBuf>> {
        let full = self.path(path);
        if full.exists() {
            if full.is_dir() {
                return Ok(Some(full));
            }
            return Err(GitError::NotADirectory {
                path: full.display().to_string(),
            });
        }
        if mkdir {
            std::fs::create_dir_all(&full).map_err(|e| GitError::io(full.display().to_string(), e))?;
            Ok(Some(full))
        } else {
            Ok(None)
        }
    }

    /// Returns true if `path` (absolute, under the worktree) should be
    /// excluded from scans and from worktree clearing.
    pub fn is_ignored(&self, path: &Path) -> bool {
        path.components().any(|c| {
            let name = c.as_os_str().to_string_lossy();
            name == GITDIR_NAME || EXTRA_IGNORED_NAMES.contains(&name.as_ref())
        })
    }
}

/// Creates a new repository at `path`. `path` need not exist; if it does,
/// it must be an empty directory, or a directory whose gitdir is absent or
/// empty.
pub fn init(path: &Path) -> Result<Repository> {
    let worktree = path.to_path_buf();
    let gitdir = worktree.join(GITDIR_NAME);

    if worktree.exists() {
        if !worktree.is_dir() {
            return Err(GitError::NotADirectory {
                path: worktree.display().to_string(),
            });
        }
        if gitdir.exists() && std::fs::read_dir(&gitdir).map(|mut d| d.next().is_some()).unwrap_or(false) {
            return Err(GitError::RepoAlreadyExists {
                path: worktree.display().to_string(),
            });
        }
    } else {
        std::fs::create_dir_all(&worktree).map_err(|e| GitError::io(worktree.display().to_string(), e))?;
    }

    let repo = Repository {
        worktree: worktree.clone(),
        gitdir: gitdir.clone(),
        config: Config::default(),
    };

    repo.dir(&["branches"], true)?;
    repo.dir(&["objects"], true)?;
    repo.dir(&["refs", "tags"], true)?;
    repo.dir(&["refs", "heads"], true)?;

    std::fs::write(
        repo.file(&["description"])?,
        "Unnamed repository; edit this file 'description' to name the repository.\n",
    )
    .map_err(|e| GitError::io(gitdir.display().to_string(), e))?;

    std::fs::write(repo.file(&["HEAD"])?, b"ref: refs/heads/main\n")
        .map_err(|e| GitError::io(gitdir.display().to_string(), e))?;

    let config = Config::default_repo_config();
    config.write_file(&repo.file(&["config"])?)?;

    log::debug!("initialized repository at {}", worktree.display());

    Ok(Repository {
        worktree,
        gitdir,
        config,
    })
}

/// Walks from `path` toward the filesystem root looking for a gitdir.
pub fn find(path: &Path) -> Result<Repository> {
    let canonical = path
        .canonicalize()
        .map_err(|e| GitError::io(path.display().to_string(), e))?;
    find_from(&canonical)
}

fn find_from(path: &Path) -> Result<Repository> {
    let gitdir = path.join(GITDIR_NAME);
    if gitdir.is_dir() {
        return open(path);
    }
    match path.parent() {
        Some(parent) if parent != path => find_from(parent),
        _ => Err(GitError::NoRepository {
            path: path.display().to_string(),
        }),
    }
}

/// Opens a repository known to exist at `worktree`, validating its config.
pub fn open(worktree: &Path) -> Result<Repository> {
    let gitdir = worktree.join(GITDIR_NAME);
    let config_path = gitdir.join("config");
    let config = if config_path.exists() {
        Config::read_file(&config_path)?
    } else {
        Config::default()
    };
    config.check_format_version()?;
    Ok(Repository {
        worktree: worktree.to_path_buf(),
        gitdir,
        config,
    })
}
