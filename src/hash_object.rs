use crate::object::{self, Object};
use crate::repo::Repository;
use anyhow::{Context, Result, bail};
use std::path::Path;

/// `hash-object [-t TYPE] [-w] FILE`: reads `file`, hashes it as `kind`,
/// and — if `repo` is bound — stores it. Returns the oid.
pub fn git_hash_object(repo: Option<&Repository>, kind: &str, file: &Path) -> Result<String> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let object = match kind {
        "blob" => Object::Blob(data),
        "tree" => Object::Tree(crate::tree::Tree::deserialize(&data)?),
        "commit" => Object::Commit(crate::kvlm::Kvlm::parse(&data)),
        "tag" => Object::Tag(crate::kvlm::Kvlm::parse(&data)),
        other => bail!("unknown object kind: {other}"),
    };
    Ok(object::write_object(repo, &object)?)
}
