use crate::error::ParseErrorKind;
use camino::Utf8PathBuf;
use core::ops::Deref;
use std::fmt;
use std::str::FromStr;

/// A 128-bit MD5 value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; Digest::LEN]);

impl Digest {
    pub const LEN: usize = 16;
    /// Length of the textual form.
    pub const HEX_LEN: usize = 2 * Self::LEN;

    #[inline]
    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses exactly 32 lowercase hex characters.
    ///
    /// Uppercase is rejected so that every digest has one textual form and
    /// listings compare equal byte-for-byte.
    pub fn from_hex(s: &str) -> Option<Self> {
        let well_formed = s.len() == Self::HEX_LEN
            && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !well_formed {
            return None;
        }
        let mut bytes = [0; Self::LEN];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

impl FromStr for Digest {
    type Err = ParseErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| ParseErrorKind::InvalidDigest(s.to_string()))
    }
}

/// One hashed file, addressed by its `/`-separated path relative to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub digest: Digest,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, digest: Digest) -> Self {
        Self {
            path: path.into(),
            digest,
        }
    }
}

impl Deref for FileEntry {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.path
    }
}

/// A file that was skipped because it could not be read (best-effort only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Omission {
    pub path: Utf8PathBuf,
    pub reason: String,
}

/// The fingerprint of a whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryDigest {
    pub dir_name: String,
    /// Sorted byte-wise by path.
    pub entries: Vec<FileEntry>,
    /// Aggregate over `entries`, see [`crate::hasher::aggregate`].
    pub digest: Digest,
    /// Cumulative size of all hashed files, in bytes.
    pub size: u64,
    pub omissions: Vec<Omission>,
}

impl DirectoryDigest {
    /// False when best-effort mode had to leave files out.
    pub fn is_complete(&self) -> bool {
        self.omissions.is_empty()
    }

    /// Compares aggregates only; per-file detail is ignored.
    pub fn same_content_as(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Deref for DirectoryDigest {
    type Target = [FileEntry];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}
