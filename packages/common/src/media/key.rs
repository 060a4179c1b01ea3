use std::fmt;

use sha2::{Digest, Sha256};

/// Content-addressed name of a stored image: `<sha256 hex>.<extension>`.
///
/// Two uploads with identical bytes and extension share one key and one file.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MediaKey {
    digest: [u8; 32],
    extension: String,
}

impl MediaKey {
    /// Derive the key for `data` saved under `extension` (lowercased, no dot).
    pub fn for_content(data: &[u8], extension: &str) -> Self {
        Self {
            digest: Sha256::digest(data).into(),
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Directory shard: the first two hex characters of the digest.
    pub fn shard(&self) -> String {
        hex::encode(&self.digest[..1])
    }

    /// File name inside the shard directory.
    pub fn file_name(&self) -> String {
        format!("{}.{}", hex::encode(&self.digest[1..]), self.extension)
    }

    /// Relative path below the media root, using `/` separators.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.shard(), self.file_name())
    }

    pub fn as_string(&self) -> String {
        format!("{}.{}", hex::encode(self.digest), self.extension)
    }
}

impl fmt::Debug for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaKey({})", self.as_string())
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}
