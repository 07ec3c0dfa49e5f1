use crate::error::{GitError, Result};
use crate::object::{self, Object};
use crate::repo::Repository;
use crate::tree::{MODE_BLOB, MODE_EXEC, MODE_TREE, Tree, TreeEntry};
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn mode_for(meta: &std::fs::Metadata) -> &'static str {
    if meta.is_dir() {
        MODE_TREE
    } else if meta.permissions().mode() & 0o111 != 0 {
        MODE_EXEC
    } else {
        MODE_BLOB
    }
}

/// Lists the immediate (depth-1) non-ignored entries of `dir`, sorted by
/// file name for determinism of iteration (canonical tree ordering is
/// still re-applied at serialize time).
fn list_dir(repo: &Repository, dir: &Path) -> Result<Vec<PathBuf>> {
    let walker = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .standard_filters(false)
        .hidden(false)
        .build();
    let mut entries: Vec<PathBuf> = walker
        .filter_map(|e| e.ok())
        .filter(|e| e.depth() != 0)
        .map(|e| e.path().to_path_buf())
        .filter(|p| !repo.is_ignored(p))
        .collect();
    entries.sort();
    Ok(entries)
}

/// Scans `dir` (non-recursively at each level; recursion happens through
/// subdirectory calls) and writes a tree object for it.
pub fn write_tree(repo: &Repository, dir: &Path) -> Result<String> {
    let mut entries = Vec::new();
    for path in list_dir(repo, dir)? {
        let meta = std::fs::symlink_metadata(&path).map_err(|e| GitError::io(path.display().to_string(), e))?;
        let name = path
            .file_name()
            .expect("listed entries always have a name")
            .to_string_lossy()
            .into_owned();

        if meta.file_type().is_symlink() {
            continue;
        } else if meta.is_dir() {
            let oid = write_tree(repo, &path)?;
            entries.push(TreeEntry {
                mode: MODE_TREE.to_string(),
                name,
                oid,
            });
        } else if meta.is_file() {
            let data = std::fs::read(&path).map_err(|e| GitError::io(path.display().to_string(), e))?;
            let oid = object::write_object(Some(repo), &Object::Blob(data))?;
            entries.push(TreeEntry {
                mode: mode_for(&meta).to_string(),
                name,
                oid,
            });
        }
    }
    let oid = object::write_object(Some(repo), &Object::Tree(Tree { entries }))?;
    Ok(oid)
}

/// Recursively enumerates a tree object into an `absolute path -> blob oid`
/// mapping, rooted at `base`.
fn enumerate_tree(
    repo: &Repository,
    oid: &str,
    base: &Path,
    out: &mut BTreeMap<PathBuf, String>,
) -> Result<()> {
    let tree = match object::read_object(repo, oid)? {
        Object::Tree(tree) => tree,
        other => {
            return Err(GitError::MalformedTree {
                message: format!("{oid} is a {}, not a tree", other.kind()),
            });
        }
    };
    for entry in &tree.entries {
        if entry.name.contains('/') || entry.name == "." || entry.name == ".." {
            return Err(GitError::MalformedTree {
                message: format!("illegal entry name: {:?}", entry.name),
            });
        }
        let path = base.join(&entry.name);
        match entry.kind() {
            crate::tree::EntryKind::Tree => enumerate_tree(repo, &entry.oid, &path, out)?,
            crate::tree::EntryKind::Blob => {
                out.insert(path, entry.oid.clone());
            }
        }
    }
    Ok(())
}

/// Removes every non-ignored file and resulting-empty directory under
/// `dir`, bottom-up. Ignored entries (and directories containing only
/// ignored content) are left untouched.
fn clear_worktree(repo: &Repository, dir: &Path) -> Result<()> {
    if repo.is_ignored(dir) {
        return Ok(());
    }
    let mut children: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| GitError::io(dir.display().to_string(), e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    children.sort();
    for child in &children {
        if repo.is_ignored(child) {
            continue;
        }
        let meta = std::fs::symlink_metadata(child).map_err(|e| GitError::io(child.display().to_string(), e))?;
        if meta.is_dir() {
            clear_worktree(repo, child)?;
            // Only remove if it ended up empty (ignored content may remain).
            if std::fs::read_dir(child)
                .map_err(|e| GitError::io(child.display().to_string(), e))?
                .next()
                .is_none()
            {
                std::fs::remove_dir(child).map_err(|e| GitError::io(child.display().to_string(), e))?;
            }
        } else {
            std::fs::remove_file(child).map_err(|e| GitError::io(child.display().to_string(), e))?;
        }
    }
    Ok(())
}

/// First empties the worktree of non-ignored content, then materializes the
/// tree at `oid` back onto disk.
pub fn read_tree(repo: &Repository, oid: &str) -> Result<()> {
    clear_worktree(repo, &repo.worktree)?;

    let mut mapping = BTreeMap::new();
    enumerate_tree(repo, oid, &repo.worktree, &mut mapping)?;

    for (path, blob_oid) in mapping {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GitError::io(parent.display().to_string(), e))?;
        }
        match object::read_object(repo, &blob_oid)? {
            Object::Blob(data) => {
                std::fs::write(&path, data).map_err(|e| GitError::io(path.display().to_string(), e))?;
            }
            other => {
                return Err(GitError::MalformedTree {
                    message: format!("{blob_oid} is a {}, not a blob", other.kind()),
                });
            }
        }
    }
    Ok(())
}
