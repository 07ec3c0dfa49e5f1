use crate::error::Result;
use crate::kvlm::Kvlm;
use crate::object::{self, Object};
use crate::refs;
use crate::repo::Repository;
use crate::worktree;

/// Snapshots the worktree, links it to the prior HEAD (if any), and
/// advances HEAD to the new commit. No author/committer metadata is
/// recorded.
pub fn commit(repo: &Repository, message: &str) -> Result<String> {
    let tree_oid = worktree::write_tree(repo, &repo.worktree)?;

    let mut kvlm = Kvlm::new();
    kvlm.append("tree", tree_oid.as_bytes());
    if let Some(parent_oid) = refs::get_head(repo)? {
        kvlm.append("parent", parent_oid.as_bytes());
    }
    kvlm.message = format!("{message}\n").into_bytes();

    let oid = object::write_object(Some(repo), &Object::Commit(kvlm))?;
    refs::set_head(repo, &oid)?;
    log::debug!("committed {oid}");
    Ok(oid)
}

/// One record in a `log` walk.
pub struct LogEntry {
    pub oid: String,
    pub is_head: bool,
    pub message: String,
}

/// Reads the commit at `oid`.
pub fn read_commit(repo: &Repository, oid: &str) -> Result<Kvlm> {
    match object::read_object(repo, oid)? {
        Object::Commit(kvlm) => Ok(kvlm),
        other => Err(crate::error::GitError::MalformedObject {
            oid: oid.to_string(),
            message: format!("expected a commit, found a {}", other.kind()),
        }),
    }
}

/// Walks the first-parent chain starting at `start_oid`, yielding one
/// record per commit.
pub fn log(repo: &Repository, start_oid: &str) -> Result<Vec<LogEntry>> {
    let head = refs::get_head(repo)?;
    let mut out = Vec::new();
    let mut current = Some(start_oid.to_string());
    while let Some(oid) = current {
        let kvlm = read_commit(repo, &oid)?;
        let message = String::from_utf8_lossy(&kvlm.message).into_owned();
        out.push(LogEntry {
            is_head: head.as_deref() == Some(oid.as_str()),
            oid: oid.clone(),
            message,
        });
        current = kvlm
            .get_one("parent")
            .map(|p| String::from_utf8_lossy(p).into_owned());
    }
    Ok(out)
}

/// `read_tree(commit.tree)` followed by `set_HEAD(oid)`.
pub fn checkout(repo: &Repository, oid: &str) -> Result<()> {
    let kvlm = read_commit(repo, oid)?;
    let tree_oid = kvlm
        .get_one("tree")
        .map(|t| String::from_utf8_lossy(t).into_owned())
        .ok_or_else(|| crate::error::GitError::MalformedObject {
            oid: oid.to_string(),
            message: "commit is missing its tree key".to_string(),
        })?;
    worktree::read_tree(repo, &tree_oid)?;
    refs::set_head(repo, oid)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn s4_first_commit_has_no_parent() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("repo");
        let repo = crate::repo::init(&root).unwrap();
        std::fs::write(root.join("hello.txt"), b"hi\n").unwrap();

        let oid = commit(&repo, "first").unwrap();
        assert_eq!(refs::get_head(&repo).unwrap(), Some(oid.clone()));

        let kvlm = read_commit(&repo, &oid).unwrap();
        assert!(kvlm.get_one("tree").is_some());
        assert!(kvlm.get_one("parent").is_none());
        assert_eq!(kvlm.message, b"first\n");
    }

    #[test]
    fn s5_second_commit_links_parent() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("repo");
        let repo = crate::repo::init(&root).unwrap();
        std::fs::write(root.join("hello.txt"), b"hi\n").unwrap();
        let first = commit(&repo, "first").unwrap();

        std::fs::write(root.join("hello.txt"), b"bye\n").unwrap();
        let second = commit(&repo, "second").unwrap();

        let kvlm = read_commit(&repo, &second).unwrap();
        assert_eq!(
            kvlm.get_one("parent")
                .map(|p| String::from_utf8_lossy(p).into_owned()),
            Some(first)
        );
    }

    #[test]
    fn s6_checkout_restores_worktree() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("repo");
        let repo = crate::repo::init(&root).unwrap();
        std::fs::write(root.join("hello.txt"), b"hi\n").unwrap();
        let first = commit(&repo, "first").unwrap();

        std::fs::write(root.join("hello.txt"), b"bye\n").unwrap();
        commit(&repo, "second").unwrap();

        checkout(&repo, &first).unwrap();

        assert_eq!(std::fs::read(root.join("hello.txt")).unwrap(), b"hi\n");
        assert_eq!(refs::get_head(&repo).unwrap(), Some(first));
    }

    #[test]
    fn log_walks_first_parent_chain() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("repo");
        let repo = crate::repo::init(&root).unwrap();
        std::fs::write(root.join("hello.txt"), b"hi\n").unwrap();
        let first = commit(&repo, "first").unwrap();
        std::fs::write(root.join("hello.txt"), b"bye\n").unwrap();
        let second = commit(&repo, "second").unwrap();

        let entries = log(&repo, &second).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].oid, second);
        assert_eq!(entries[0].message, "second\n");
        assert!(entries[0].is_head);
        assert_eq!(entries[1].oid, first);
        assert_eq!(entries[1].message, "first\n");
        assert!(!entries[1].is_head);
    }
}
