use crate::Compression;
use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Compression {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Compression::None),
            "br" | "brotli" => Ok(Compression::Brotli),
            "gz" | "gzip" => Ok(Compression::Gzip),
            "zst" | "zstd" => Ok(Compression::Zstd),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(s.to_string())),
        }
    }
}

impl Compression {
    /// Returns the short name for configuration (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Brotli => "brotli",
            Compression::Gzip => "gzip",
            Compression::Zstd => "zstd",
        }
    }

    /// Detect a compression format that announces itself with magic bytes.
    ///
    /// Brotli has no magic bytes, so it is never returned here.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&GZIP_MAGIC) {
            return Some(Compression::Gzip);
        }
        if bytes.starts_with(&ZSTD_MAGIC) {
            return Some(Compression::Zstd);
        }
        None
    }

    /// The format of a blob file: whatever the magic bytes say, else Brotli.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        Self::from_magic_bytes(bytes).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use rstest::rstest;

    #[rstest]
    #[case("none", Compression::None)]
    #[case("br", Compression::Brotli)]
    #[case("Brotli", Compression::Brotli)]
    #[case("gz", Compression::Gzip)]
    #[case("zstd", Compression::Zstd)]
    fn test_from_str(#[case] test: &str, #[case] expected: Compression) {
        assert_eq!(test.parse::<Compression>().unwrap(), expected);
        assert_eq!(expected.to_string().parse::<Compression>().unwrap(), expected);
    }

    #[rstest]
    #[case("bzip2")]
    #[case(" ")]
    fn test_from_str_invalid(#[case] test: &str) {
        assert!(test.parse::<Compression>().is_err());
    }

    #[rstest]
    #[case(b"", None)]
    #[case(b"{\"metadata\":{}}", None)]
    #[case(&[0x1F, 0x8B, 0x08, 0x00], Some(Compression::Gzip))]
    #[case(&[0x28, 0xB5, 0x2F, 0xFD, 0x00], Some(Compression::Zstd))]
    fn test_from_magic_bytes(#[case] bytes: &[u8], #[case] expected: Option<Compression>) {
        assert_eq!(Compression::from_magic_bytes(bytes), expected);
        assert_eq!(Compression::detect(bytes), expected.unwrap_or(Compression::Brotli));
    }
}
