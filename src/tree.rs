use crate::error::{GitError, Result};

pub const MODE_TREE: &str = "40000";
pub const MODE_BLOB: &str = "100644";
pub const MODE_EXEC: &str = "100755";
pub const MODE_SYMLINK: &str = "120000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
}

/// One `(mode, name, target-oid)` triple. `oid` is the 40-hex in-memory form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    pub name: String,
    pub oid: String,
}

impl TreeEntry {
    pub fn kind(&self) -> EntryKind {
        if self.mode == MODE_TREE {
            EntryKind::Tree
        } else {
            EntryKind::Blob
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

/// Canonical sort key: directory names sort as if suffixed with `/`.
fn sort_key(entry: &TreeEntry) -> Vec<u8> {
    let mut key = entry.name.clone().into_bytes();
    if entry.kind() == EntryKind::Tree {
        key.push(b'/');
    }
    key
}

impl Tree {
    pub fn validate_names(&self) -> Result<()> {
        for entry in &self.entries {
            if entry.name.contains('/') || entry.name == "." || entry.name == ".." {
                return Err(GitError::MalformedTree {
                    message: format!("illegal entry name: {:?}", entry.name),
                });
            }
        }
        Ok(())
    }

    /// Records are emitted `mode SP name SP <20-byte-oid>` back to back, in
    /// canonical (sorted) order; no separators between records.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.validate_names()?;
        let mut sorted: Vec<&TreeEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        let mut out = Vec::new();
        for entry in sorted {
            out.extend_from_slice(entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.name.as_bytes());
            out.push(b' ');
            let raw = hex::decode(&entry.oid).map_err(|_| GitError::MalformedTree {
                message: format!("entry {:?} has a non-hex oid", entry.name),
            })?;
            if raw.len() != 20 {
                return Err(GitError::MalformedTree {
                    message: format!("entry {:?} oid is not 20 bytes", entry.name),
                });
            }
            out.extend_from_slice(&raw);
        }
        Ok(out)
    }

    pub fn deserialize(data: &[u8]) -> Result<Tree> {
        let mut entries = Vec::new();
        let mut pos = 0usize;
        while pos < data.len() {
            let mode_end = find_byte(data, pos, b' ').ok_or_else(|| GitError::MalformedTree {
                message: "missing SP after mode".into(),
            })?;
            let mode = String::from_utf8_lossy(&data[pos..mode_end]).into_owned();
            pos = mode_end + 1;

            let name_end = find_byte(data, pos, b' ').ok_or_else(|| GitError::MalformedTree {
                message: "missing SP after name".into(),
            })?;
            let name = String::from_utf8_lossy(&data[pos..name_end]).into_owned();
            pos = name_end + 1;

            if pos + 20 > data.len() {
                return Err(GitError::MalformedTree {
                    message: "truncated oid".into(),
                });
            }
            let oid = hex::encode(&data[pos..pos + 20]);
            pos += 20;

            entries.push(TreeEntry { mode, name, oid });
        }
        let tree = Tree { entries };
        tree.validate_names()?;
        Ok(tree)
    }
}

fn find_byte(data: &[u8], from: usize, needle: u8) -> Option<usize> {
    data[from..].iter().position(|&b| b == needle).map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk(mode: &str, name: &str, oid: &str) -> TreeEntry {
        TreeEntry {
            mode: mode.to_string(),
            name: name.to_string(),
            oid: oid.to_string(),
        }
    }

    #[test]
    fn serialize_is_stable_under_permutation() {
        let oid_a = "0".repeat(40);
        let oid_b = "1".repeat(40);
        let oid_c = "2".repeat(40);

        let tree1 = Tree {
            entries: vec![
                mk(MODE_BLOB, "b.txt", &oid_b),
                mk(MODE_TREE, "a", &oid_a),
                mk(MODE_BLOB, "c.txt", &oid_c),
            ],
        };
        let tree2 = Tree {
            entries: vec![
                mk(MODE_TREE, "a", &oid_a),
                mk(MODE_BLOB, "c.txt", &oid_c),
                mk(MODE_BLOB, "b.txt", &oid_b),
            ],
        };
        assert_eq!(tree1.serialize().unwrap(), tree2.serialize().unwrap());
    }

    #[test]
    fn deserialize_inverts_serialize() {
        let oid_a = "a".repeat(40);
        let oid_b = "b".repeat(40);
        let tree = Tree {
            entries: vec![mk(MODE_BLOB, "a.txt", &oid_a), mk(MODE_TREE, "sub", &oid_b)],
        };
        let bytes = tree.serialize().unwrap();
        let parsed = Tree::deserialize(&bytes).unwrap();
        let mut expected = tree.entries.clone();
        expected.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        assert_eq!(parsed.entries, expected);
    }

    #[test]
    fn directory_prefix_ordering() {
        // "ab" vs a directory named "a": the directory sorts under the key
        // "a/", and '/' (0x2F) sorts before 'b' (0x62), so "a" comes first.
        let oid = "3".repeat(40);
        let tree = Tree {
            entries: vec![mk(MODE_BLOB, "ab", &oid), mk(MODE_TREE, "a", &oid)],
        };
        let bytes = tree.serialize().unwrap();
        let parsed = Tree::deserialize(&bytes).unwrap();
        assert_eq!(parsed.entries[0].name, "a");
        assert_eq!(parsed.entries[1].name, "ab");
    }

    #[test]
    fn rejects_illegal_names() {
        let oid = "4".repeat(40);
        let tree = Tree {
            entries: vec![mk(MODE_BLOB, "a/b", &oid)],
        };
        assert!(tree.serialize().is_err());
    }
}
