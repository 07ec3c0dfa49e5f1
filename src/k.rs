use crate::commit;
use crate::refs;
use crate::repo::Repository;
use anyhow::Result;
use std::collections::{HashMap, HashSet};

/// Enumerates every ref (including HEAD), groups by target oid, and emits
/// a plain-text node/edge description: one `label: oid` line per ref and
/// one `oid -> parent` line per first-parent edge, each reachable commit
/// visited at most once.
pub fn git_k(repo: &Repository) -> Result<String> {
    let mut out = String::new();
    let refs = refs::iter_refs(repo)?;

    let mut by_oid: HashMap<String, Vec<String>> = HashMap::new();
    for r in &refs {
        by_oid.entry(r.oid.clone()).or_default().push(r.name.clone());
    }
    for (oid, names) in &by_oid {
        out.push_str(&format!("{}: {oid}\n", names.join(", ")));
    }

    let mut visited = HashSet::new();
    for r in &refs {
        let mut current = Some(r.oid.clone());
        while let Some(oid) = current {
            if !visited.insert(oid.clone()) {
                break;
            }
            let Ok(kvlm) = commit::read_commit(repo, &oid) else {
                break;
            };
            current = kvlm
                .get_one("parent")
                .map(|p| String::from_utf8_lossy(p).into_owned());
            if let Some(parent) = &current {
                out.push_str(&format!("{oid} -> {parent}\n"));
            }
        }
    }
    Ok(out)
}
