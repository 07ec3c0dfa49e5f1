use crate::refs;
use crate::repo::Repository;
use anyhow::Result;

/// `tag NAME [OID]`: creates (or overwrites) a lightweight tag at `oid`
/// (defaulting to `@`).
pub fn git_tag(repo: &Repository, name: &str, oid: &str) -> Result<()> {
    let oid = refs::find_object(repo, oid)?;
    refs::create_tag(repo, name, &oid)?;
    Ok(())
}
