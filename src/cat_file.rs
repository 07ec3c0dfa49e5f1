use crate::object::{self, Object};
use crate::repo::Repository;
use anyhow::{Result, bail};
use std::io::{Write, stdout};

/// `cat-file TYPE OID`: reads the object, asserts its kind matches `TYPE`,
/// and writes its raw payload to stdout.
pub fn git_cat_file(repo: &Repository, kind: &str, oid: &str) -> Result<()> {
    let object = object::read_object(repo, oid)?;
    if object.kind() != kind {
        bail!("object {oid} is a {}, not a {kind}", object.kind());
    }
    let payload = match object {
        Object::Blob(data) => data,
        other => other.serialize()?,
    };
    stdout().lock().write_all(&payload)?;
    Ok(())
}
