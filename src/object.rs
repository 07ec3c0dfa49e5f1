use crate::codec;
use crate::error::{GitError, Result};
use crate::hash::hex_digest;
use crate::kvlm::Kvlm;
use crate::repo::Repository;
use crate::tree::Tree;
use std::path::PathBuf;

/// The four object variants. Only Blob/Tree/Commit are produced by this
/// crate's own commands; Tag exists so `cat-file`/`hash-object -t tag`
/// satisfy the external interface without this crate ever constructing one
/// itself (lightweight tags are plain refs, not tag objects — see refs.rs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Vec<u8>),
    Tree(Tree),
    Commit(Kvlm),
    Tag(Kvlm),
}

impl Object {
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Blob(_) => "blob",
            Object::Tree(_) => "tree",
            Object::Commit(_) => "commit",
            Object::Tag(_) => "tag",
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        match self {
            Object::Blob(data) => Ok(data.clone()),
            Object::Tree(tree) => tree.serialize(),
            Object::Commit(kvlm) | Object::Tag(kvlm) => Ok(kvlm.serialize()),
        }
    }

    pub fn parse(kind: &str, payload: &[u8]) -> Result<Object> {
        match kind {
            "blob" => Ok(Object::Blob(payload.to_vec())),
            "tree" => Ok(Object::Tree(Tree::deserialize(payload)?)),
            "commit" => Ok(Object::Commit(Kvlm::parse(payload))),
            "tag" => Ok(Object::Tag(Kvlm::parse(payload))),
            other => Err(GitError::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }
}

fn shard_path(repo: &Repository, oid: &str) -> PathBuf {
    repo.path(&["objects", &oid[..2], &oid[2..]])
}

/// Computes `header = "<kind> <len>\0"`, hashes `header||payload`, and — if
/// `repo` is bound — persists the compressed bytes (idempotent: an existing
/// shard file is left untouched). Returns the oid regardless of `repo`.
pub fn write_object(repo: Option<&Repository>, object: &Object) -> Result<String> {
    let payload = object.serialize()?;
    let header = format!("{} {}\0", object.kind(), payload.len());
    let mut full = header.into_bytes();
    full.extend_from_slice(&payload);

    let oid = hex_digest(&full);

    if let Some(repo) = repo {
        let path = shard_path(repo, &oid);
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| GitError::io(parent.display().to_string(), e))?;
            }
            let compressed = codec::compress(&full).map_err(|e| GitError::io(path.display().to_string(), e))?;
            let mut tmp = tempfile::NamedTempFile::new_in(path.parent().unwrap())
                .map_err(|e| GitError::io(path.display().to_string(), e))?;
            use std::io::Write as _;
            tmp.write_all(&compressed)
                .map_err(|e| GitError::io(path.display().to_string(), e))?;
            tmp.persist(&path)
                .map_err(|e| GitError::io(path.display().to_string(), e.error))?;
            log::debug!("wrote {} object {}", object.kind(), oid);
        }
    }

    Ok(oid)
}

/// Reads and decompresses the shard file for `oid`. Returns `None` if the
/// shard file doesn't exist.
pub fn read_object_raw(repo: &Repository, oid: &str) -> Result<Option<(String, Vec<u8>)>> {
    let path = shard_path(repo, oid);
    if !path.exists() {
        return Ok(None);
    }
    let compressed = std::fs::read(&path).map_err(|e| GitError::io(path.display().to_string(), e))?;
    let full = codec::decompress(&compressed).map_err(|e| GitError::io(path.display().to_string(), e))?;

    let nul = full.iter().position(|&b| b == 0).ok_or_else(|| GitError::MalformedObject {
        oid: oid.to_string(),
        message: "missing NUL after header".into(),
    })?;
    let header = std::str::from_utf8(&full[..nul]).map_err(|_| GitError::MalformedObject {
        oid: oid.to_string(),
        message: "header is not valid UTF-8".into(),
    })?;
    let (kind, size) = header.split_once(' ').ok_or_else(|| GitError::MalformedObject {
        oid: oid.to_string(),
        message: "header is in invalid format".into(),
    })?;
    let size: usize = size.parse().map_err(|_| GitError::MalformedObject {
        oid: oid.to_string(),
        message: "object size isn't a number".into(),
    })?;
    let payload = full[nul + 1..].to_vec();
    if payload.len() != size {
        return Err(GitError::MalformedObject {
            oid: oid.to_string(),
            message: format!("expected size {size}, got {}", payload.len()),
        });
    }
    Ok(Some((kind.to_string(), payload)))
}

/// Reads and parses the object at `oid` into a typed `Object`. Fails with
/// `ObjectNotFound` if the shard file doesn't exist.
pub fn read_object(repo: &Repository, oid: &str) -> Result<Object> {
    match read_object_raw(repo, oid)? {
        Some((kind, payload)) => Object::parse(&kind, &payload),
        None => Err(GitError::ObjectNotFound {
            oid: oid.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn hash_is_deterministic_for_dry_run() {
        let object = Object::Blob(b"hello\n".to_vec());
        let oid1 = write_object(None, &object).unwrap();
        let oid2 = write_object(None, &object).unwrap();
        assert_eq!(oid1, oid2);
    }

    #[test]
    fn s1_empty_blob() {
        let object = Object::Blob(Vec::new());
        let oid = write_object(None, &object).unwrap();
        assert_eq!(oid, "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn s2_small_blob() {
        let object = Object::Blob(b"hello\n".to_vec());
        let oid = write_object(None, &object).unwrap();
        assert_eq!(oid, "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn round_trip_through_store() {
        let tmp = TempDir::new().unwrap();
        let repo = crate::repo::init(&tmp.path().join("repo")).unwrap();
        let object = Object::Blob(b"round trip\n".to_vec());
        let oid = write_object(Some(&repo), &object).unwrap();
        let read_back = read_object(&repo, &oid).unwrap();
        assert_eq!(read_back, object);
    }

    #[test]
    fn idempotent_write_leaves_one_shard() {
        let tmp = TempDir::new().unwrap();
        let repo = crate::repo::init(&tmp.path().join("repo")).unwrap();
        let object = Object::Blob(b"same bytes\n".to_vec());
        let oid1 = write_object(Some(&repo), &object).unwrap();
        let oid2 = write_object(Some(&repo), &object).unwrap();
        assert_eq!(oid1, oid2);
        let (kind, payload) = read_object_raw(&repo, &oid1).unwrap().unwrap();
        assert_eq!(kind, "blob");
        assert_eq!(payload, b"same bytes\n");
    }

    #[test]
    fn missing_object_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let repo = crate::repo::init(&tmp.path().join("repo")).unwrap();
        let err = read_object(&repo, &"0".repeat(40));
        assert!(err.is_err());
    }
}
