use crate::error::{GitError, Result};
use crate::repo::Repository;
use std::path::{Path, PathBuf};

const SYMBOLIC_PREFIX: &str = "ref: ";

/// Writes `bytes` to `path` via a temp-file-then-rename, so a reader never
/// observes a partially written ref or HEAD.
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GitError::io(parent.display().to_string(), e))?;
    }
    let mut tmp = tempfile::NamedTempFile::new_in(path.parent().unwrap())
        .map_err(|e| GitError::io(path.display().to_string(), e))?;
    use std::io::Write as _;
    tmp.write_all(bytes)
        .map_err(|e| GitError::io(path.display().to_string(), e))?;
    tmp.persist(path)
        .map_err(|e| GitError::io(path.display().to_string(), e.error))?;
    Ok(())
}

/// Reads a ref file (or HEAD) and returns its raw trimmed contents, or
/// `None` if the file is absent or empty.
fn read_ref_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|e| GitError::io(path.display().to_string(), e))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

/// Reads HEAD, following one level of symbolic indirection
/// (`ref: refs/heads/<name>`) down to the OID it ultimately names, or
/// `None` for an unborn branch (symbolic HEAD pointing at a ref that
/// doesn't exist yet).
pub fn get_head(repo: &Repository) -> Result<Option<String>> {
    let head_path = repo.path(&["HEAD"]);
    match read_ref_file(&head_path)? {
        None => Ok(None),
        Some(contents) => {
            if let Some(ref_path) = contents.strip_prefix(SYMBOLIC_PREFIX) {
                read_ref_file(&repo.path(&[ref_path.trim()]))
            } else {
                Ok(Some(contents))
            }
        }
    }
}

/// The ref path HEAD currently points at (e.g. `refs/heads/main`), or
/// `None` if HEAD is detached (a bare OID, not a symbolic pointer).
pub fn head_ref_path(repo: &Repository) -> Result<Option<String>> {
    let head_path = repo.path(&["HEAD"]);
    match read_ref_file(&head_path)? {
        Some(contents) => Ok(contents
            .strip_prefix(SYMBOLIC_PREFIX)
            .map(|s| s.trim().to_string())),
        None => Ok(None),
    }
}

/// Sets HEAD to `oid`. If HEAD is currently symbolic, the branch ref it
/// points at is updated in place (and created if the branch was unborn);
/// otherwise HEAD itself is overwritten with the detached OID.
pub fn set_head(repo: &Repository, oid: &str) -> Result<()> {
    match head_ref_path(repo)? {
        Some(ref_path) => atomic_write(&repo.path(&[ref_path.as_str()]), oid.as_bytes()),
        None => atomic_write(&repo.path(&["HEAD"]), oid.as_bytes()),
    }
}

/// Creates (or overwrites) a lightweight tag `refs/tags/<name>` pointing at
/// `oid`.
pub fn create_tag(repo: &Repository, name: &str, oid: &str) -> Result<()> {
    let path = repo.path(&["refs", "tags", name]);
    atomic_write(&path, oid.as_bytes())
}

/// One entry from `iter_refs`: a ref name (e.g. `HEAD`, `refs/heads/main`)
/// and the OID it resolves to.
pub struct Ref {
    pub name: String,
    pub oid: String,
}

/// Enumerates every file under `refs/`, plus HEAD, each resolved to a
/// concrete OID (HEAD's symbolic indirection is followed).
pub fn iter_refs(repo: &Repository) -> Result<Vec<Ref>> {
    let mut out = Vec::new();
    if let Some(oid) = get_head(repo)? {
        out.push(Ref {
            name: "HEAD".to_string(),
            oid,
        });
    }
    let refs_dir = repo.path(&["refs"]);
    collect_refs(repo, &refs_dir, "refs", &mut out)?;
    Ok(out)
}

fn collect_refs(repo: &Repository, dir: &Path, prefix: &str, out: &mut Vec<Ref>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| GitError::io(dir.display().to_string(), e))?
        .filter_map(|e| e.ok())
        .collect();
    names.sort_by_key(|e| e.file_name());
    for entry in names {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let ref_name = format!("{prefix}/{name}");
        if path.is_dir() {
            collect_refs(repo, &path, &ref_name, out)?;
        } else if let Some(oid) = read_ref_file(&path)? {
            out.push(Ref { name: ref_name, oid });
        }
    }
    Ok(())
}

/// MVP name resolution: `@` aliases HEAD, everything else is taken as a
/// literal OID.
pub fn find_object(repo: &Repository, name: &str) -> Result<String> {
    if name == "@" {
        get_head(repo)?.ok_or_else(|| GitError::ObjectNotFound {
            oid: "@ (HEAD is unborn)".to_string(),
        })
    } else {
        Ok(name.to_string())
    }
}

pub fn gitdir_path(repo: &Repository, parts: &[&str]) -> PathBuf {
    repo.path(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fresh_repo_has_unborn_head() {
        let tmp = TempDir::new().unwrap();
        let repo = crate::repo::init(&tmp.path().join("repo")).unwrap();
        assert_eq!(get_head(&repo).unwrap(), None);
        assert_eq!(
            head_ref_path(&repo).unwrap(),
            Some("refs/heads/main".to_string())
        );
    }

    #[test]
    fn set_head_updates_the_branch_it_points_at() {
        let tmp = TempDir::new().unwrap();
        let repo = crate::repo::init(&tmp.path().join("repo")).unwrap();
        let oid = "a".repeat(40);
        set_head(&repo, &oid).unwrap();
        assert_eq!(get_head(&repo).unwrap(), Some(oid.clone()));
        let branch = std::fs::read_to_string(repo.path(&["refs", "heads", "main"])).unwrap();
        assert_eq!(branch, oid);
    }

    #[test]
    fn tags_are_overwritable() {
        let tmp = TempDir::new().unwrap();
        let repo = crate::repo::init(&tmp.path().join("repo")).unwrap();
        create_tag(&repo, "v1", &"b".repeat(40)).unwrap();
        create_tag(&repo, "v1", &"c".repeat(40)).unwrap();
        let contents = std::fs::read_to_string(repo.path(&["refs", "tags", "v1"])).unwrap();
        assert_eq!(contents, "c".repeat(40));
    }

    #[test]
    fn at_alias_resolves_to_head() {
        let tmp = TempDir::new().unwrap();
        let repo = crate::repo::init(&tmp.path().join("repo")).unwrap();
        let oid = "d".repeat(40);
        set_head(&repo, &oid).unwrap();
        assert_eq!(find_object(&repo, "@").unwrap(), oid);
    }
}
