use crate::error::{ParseError, ParseErrorKind, Result};
use crate::types::{Digest, FileEntry};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// How two listings differ. Every list is sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
    /// Present on both sides with different digests.
    pub differing: Vec<String>,
    /// Present on both sides with equal digests. Only filled in by
    /// [`compare_with_identical`].
    pub identical: Vec<String>,
    pub identical_count: usize,
}

impl DiffResult {
    /// True when neither side has anything the other lacks.
    pub fn is_identical(&self) -> bool {
        self.only_in_a.is_empty() && self.only_in_b.is_empty() && self.differing.is_empty()
    }

    /// The three difference sections under their headers.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DiffResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [
            ("only in A", &self.only_in_a),
            ("only in B", &self.only_in_b),
            ("differing", &self.differing),
        ];
        for (header, paths) in sections {
            writeln!(f, "{header}:")?;
            for path in paths {
                writeln!(f, "  {path}")?;
            }
        }
        Ok(())
    }
}

/// Classifies every path of `a` and `b`. No filesystem access.
///
/// A path appearing twice within one side is reported as a
/// [`ParseErrorKind::DuplicatePath`] rather than resolved either way.
pub fn compare(a: &[FileEntry], b: &[FileEntry]) -> Result<DiffResult> {
    diff(a, b, false)
}

/// Like [`compare`], also listing the paths whose digests match.
pub fn compare_with_identical(a: &[FileEntry], b: &[FileEntry]) -> Result<DiffResult> {
    diff(a, b, true)
}

fn diff(a: &[FileEntry], b: &[FileEntry], keep_identical: bool) -> Result<DiffResult> {
    let a = to_map("A", a)?;
    let mut b = to_map("B", b)?;
    let mut result = DiffResult::default();

    for (path, digest_a) in a {
        // Whatever is left in `b` afterwards exists only there.
        match b.remove(path) {
            None => result.only_in_a.push(path.to_string()),
            Some(digest_b) if digest_b != digest_a => result.differing.push(path.to_string()),
            Some(_) => {
                result.identical_count += 1;
                if keep_identical {
                    result.identical.push(path.to_string());
                }
            }
        }
    }
    result.only_in_b = b.into_keys().map(str::to_string).collect();
    Ok(result)
}

fn to_map<'a>(side: &str, entries: &'a [FileEntry]) -> Result<BTreeMap<&'a str, &'a Digest>> {
    let mut map = BTreeMap::new();
    for entry in entries {
        match map.entry(entry.path.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(&entry.digest);
            }
            Entry::Occupied(_) => {
                return Err(ParseError {
                    listing: side.to_string(),
                    line: None,
                    kind: ParseErrorKind::DuplicatePath(entry.path.clone()),
                }
                .into())
            }
        }
    }
    Ok(map)
}
