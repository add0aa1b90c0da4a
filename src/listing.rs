use crate::error::{Error, ParseError, ParseErrorKind, Result};
use crate::options::OutputMode;
use crate::types::{Digest, DirectoryDigest, FileEntry};
use camino::Utf8Path;
use std::collections::HashSet;

const DELIM: &str = "  ";
const NEWLINE: char = '\n';
const COMMENT_PREFIX: char = '#';

/// Renders `entries` as `<digest>  <path>` lines, in the order given.
pub fn render_listing(entries: &[FileEntry]) -> String {
    // 32 hex chars + delimiter + newline, plus a rough guess at the path.
    const LINE_OVERHEAD: usize = Digest::HEX_LEN + DELIM.len() + 1;
    let mut buf = String::with_capacity(entries.len() * (LINE_OVERHEAD + 32));
    for entry in entries {
        buf.push_str(&entry.digest.to_hex());
        buf.push_str(DELIM);
        buf.push_str(&entry.path);
        buf.push(NEWLINE);
    }
    buf
}

impl DirectoryDigest {
    /// The text a caller asked for: one aggregate line, or the full listing.
    pub fn render(&self, mode: OutputMode) -> String {
        match mode {
            OutputMode::Aggregate => format!("{}{NEWLINE}", self.digest),
            OutputMode::Listing => render_listing(&self.entries),
        }
    }
}

pub fn write_listing(path: impl AsRef<Utf8Path>, entries: &[FileEntry]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_listing(entries)).map_err(|e| Error::io(path, e))
}

pub fn load_listing(path: impl AsRef<Utf8Path>) -> Result<Vec<FileEntry>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_listing(path.as_str(), &text)
}

/// Parses listing text. `listing` names the source in error messages.
///
/// Lines starting with `#` are ignored. The result is sorted by path.
/// A malformed line or a path listed twice fails the whole parse.
pub fn parse_listing(listing: &str, text: &str) -> Result<Vec<FileEntry>> {
    let error = |line: usize, kind: ParseErrorKind| {
        Error::Parse(ParseError {
            listing: listing.to_string(),
            line: Some(line),
            kind,
        })
    };

    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    // `lines` also strips a trailing '\r'.
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.starts_with(COMMENT_PREFIX) {
            continue;
        }
        let (hex, path) = line
            .split_once(DELIM)
            .ok_or_else(|| error(line_no, ParseErrorKind::MissingSeparator))?;
        let digest = hex.parse::<Digest>().map_err(|kind| error(line_no, kind))?;
        if path.is_empty() {
            return Err(error(line_no, ParseErrorKind::EmptyPath));
        }
        if !seen.insert(path) {
            return Err(error(
                line_no,
                ParseErrorKind::DuplicatePath(path.to_string()),
            ));
        }
        entries.push(FileEntry::new(path, digest));
    }
    entries.sort_unstable_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const D1: &str = "0123456789abcdef0123456789abcdef";
    const D2: &str = "fedcba9876543210fedcba9876543210";

    fn entry(path: &str, hex: &str) -> FileEntry {
        FileEntry::new(path, hex.parse().unwrap())
    }

    #[test]
    fn renders_exact_format() {
        let entries = [entry("a.txt", D1), entry("dir/b c.txt", D2)];
        assert_eq!(
            render_listing(&entries),
            format!("{D1}  a.txt\n{D2}  dir/b c.txt\n")
        );
    }

    #[test]
    fn round_trip() {
        let entries = vec![
            entry("a", D1),
            entry("dir/nested/file name with  two spaces", D2),
            entry("z", D1),
        ];
        let parsed = parse_listing("mem", &render_listing(&entries)).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn empty_listing() {
        assert!(parse_listing("mem", "").unwrap().is_empty());
    }

    #[test]
    fn comments_and_crlf() {
        let text = format!("# sums of /some/dir\r\n{D2}  b\r\n{D1}  a\r\n");
        let parsed = parse_listing("mem", &text).unwrap();
        assert_eq!(parsed, vec![entry("a", D1), entry("b", D2)]);
    }

    #[rstest]
    #[case::no_separator(format!("{D1} a"), 1, ParseErrorKind::MissingSeparator)]
    #[case::blank_line(format!("{D1}  a\n\n"), 2, ParseErrorKind::MissingSeparator)]
    #[case::uppercase(
        format!("{}  a", D1.to_uppercase()),
        1,
        ParseErrorKind::InvalidDigest(D1.to_uppercase())
    )]
    #[case::short_digest("abc  a".to_string(), 1, ParseErrorKind::InvalidDigest("abc".into()))]
    #[case::empty_path(format!("{D1}  "), 1, ParseErrorKind::EmptyPath)]
    #[case::duplicate(
        format!("{D1}  a\n{D2}  b\n{D2}  a\n"),
        3,
        ParseErrorKind::DuplicatePath("a".into())
    )]
    fn rejects_malformed(#[case] text: String, #[case] line: usize, #[case] kind: ParseErrorKind) {
        let err = parse_listing("sums.md5", &text).unwrap_err();
        match err {
            Error::Parse(e) => {
                assert_eq!(e.listing, "sums.md5");
                assert_eq!(e.line, Some(line));
                assert_eq!(e.kind, kind);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn aggregate_render_is_one_line() {
        let digest = DirectoryDigest {
            dir_name: "x".into(),
            entries: vec![entry("a", D1)],
            digest: D2.parse().unwrap(),
            size: 0,
            omissions: vec![],
        };
        assert_eq!(digest.render(OutputMode::Aggregate), format!("{D2}\n"));
        assert_eq!(digest.render(OutputMode::Listing), format!("{D1}  a\n"));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("sums")).unwrap();
        let entries = vec![entry("a", D1), entry("b/c", D2)];
        write_listing(&path, &entries).unwrap();
        assert_eq!(load_listing(&path).unwrap(), entries);
    }
}
