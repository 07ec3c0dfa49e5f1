/// Key/value list with message (KVLM): an ordered mapping from textual keys
/// to one-or-more values, plus a terminal free-form message.
///
/// Continuation lines in a serialized value are line-folded: every internal
/// newline is followed by a single space, stripped again on parse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Kvlm {
    // (key, values) in first-seen key order; values preserve insertion order.
    entries: Vec<(String, Vec<Vec<u8>>)>,
    pub message: Vec<u8>,
}

impl Kvlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[Vec<u8>]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn get_one(&self, key: &str) -> Option<&[u8]> {
        self.get(key).and_then(|v| v.first()).map(|v| v.as_slice())
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1.push(value);
        } else {
            self.entries.push((key, vec![value]));
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn parse(data: &[u8]) -> Kvlm {
        let mut kvlm = Kvlm::new();
        let mut pos = 0usize;
        loop {
            if pos >= data.len() || data[pos] == b'\n' {
                kvlm.message = data[(pos + 1).min(data.len())..].to_vec();
                break;
            }
            let space = match data[pos..].iter().position(|&b| b == b' ') {
                Some(offset) => pos + offset,
                None => break,
            };
            let key = String::from_utf8_lossy(&data[pos..space]).into_owned();

            // Find the end of the value: scan forward line by line, a line
            // continues the value if the byte right after its newline is a
            // space.
            let mut end = space;
            loop {
                let nl = match data[end + 1..].iter().position(|&b| b == b'\n') {
                    Some(offset) => end + 1 + offset,
                    None => data.len() - 1,
                };
                if nl + 1 < data.len() && data[nl + 1] == b' ' {
                    end = nl;
                    continue;
                }
                end = nl;
                break;
            }
            let raw = &data[space + 1..end];
            let folded = unfold(raw);
            kvlm.append(key, folded);
            pos = end + 1;
        }
        kvlm
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, values) in &self.entries {
            for value in values {
                out.extend_from_slice(key.as_bytes());
                out.push(b' ');
                out.extend_from_slice(&fold(value));
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }
}

fn fold(value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for &b in value {
        out.push(b);
        if b == b'\n' {
            out.push(b' ');
        }
    }
    out
}

fn unfold(value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    let mut iter = value.iter().peekable();
    while let Some(&b) = iter.next() {
        out.push(b);
        if b == b'\n' {
            if let Some(&&b' ') = iter.peek() {
                iter.next();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_serialize_is_identity_for_simple_commit() {
        let mut kvlm = Kvlm::new();
        kvlm.append("tree", "aaaa".as_bytes());
        kvlm.append("parent", "bbbb".as_bytes());
        kvlm.message = b"first\n".to_vec();

        let bytes = kvlm.serialize();
        let parsed = Kvlm::parse(&bytes);

        assert_eq!(parsed.get_one("tree"), Some("aaaa".as_bytes()));
        assert_eq!(parsed.get_one("parent"), Some("bbbb".as_bytes()));
        assert_eq!(parsed.message, b"first\n");
        assert_eq!(parsed.serialize(), bytes);
    }

    #[test]
    fn multiple_values_for_same_key_preserve_order() {
        let mut kvlm = Kvlm::new();
        kvlm.append("tree", "aaaa".as_bytes());
        kvlm.append("parent", "p1".as_bytes());
        kvlm.append("parent", "p2".as_bytes());
        kvlm.message = b"merge\n".to_vec();

        let bytes = kvlm.serialize();
        let parsed = Kvlm::parse(&bytes);
        let parents = parsed.get("parent").unwrap();
        assert_eq!(parents[0], b"p1");
        assert_eq!(parents[1], b"p2");
    }

    #[test]
    fn folds_and_unfolds_multiline_values() {
        let mut kvlm = Kvlm::new();
        kvlm.append("gpgsig", "line one\nline two".as_bytes());
        kvlm.message = b"signed\n".to_vec();

        let bytes = kvlm.serialize();
        assert!(bytes.windows(2).any(|w| w == b"\n "));
        let parsed = Kvlm::parse(&bytes);
        assert_eq!(
            parsed.get_one("gpgsig"),
            Some("line one\nline two".as_bytes())
        );
    }

    #[test]
    fn empty_message_round_trips() {
        let mut kvlm = Kvlm::new();
        kvlm.append("tree", "aaaa".as_bytes());
        kvlm.message = Vec::new();
        let bytes = kvlm.serialize();
        let parsed = Kvlm::parse(&bytes);
        assert_eq!(parsed.message, Vec::<u8>::new());
    }
}
