//! Compression Operations

use crate::Compression;
use crate::error::{ErrorKind, Result};
use brotli::{CompressorWriter as BrotliEncoder, Decompressor as BrotliDecoder};
use exn::ResultExt;
use flate2::{Compression as GzCompression, read::GzDecoder, write::GzEncoder};
use std::io::{Read, Write};
use tracing::instrument;
use zstd::stream::{read::Decoder as ZstdDecoder, write::Encoder as ZstdEncoder};

const GZIP_LEVEL: GzCompression = GzCompression::best();
const ZSTD_LEVEL: i32 = 19;
const BROTLI_LEVEL: u32 = 9;
const BROTLI_BUFFER_SIZE: usize = 4096;
const BROTLI_LG_WINDOW_SIZE: u32 = 22;

impl Compression {
    /// Compress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use docset_blob::Compression;
    ///
    /// let original = br#"{"metadata":{"title":"UIView"}}"#;
    /// let compressed = Compression::Brotli.compress(original).unwrap();
    /// assert_eq!(Compression::Brotli.decompress(&compressed).unwrap(), original);
    /// ```
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        match self {
            Compression::None => output.extend_from_slice(input),
            Compression::Brotli => {
                let mut encoder =
                    BrotliEncoder::new(&mut output, BROTLI_BUFFER_SIZE, BROTLI_LEVEL, BROTLI_LG_WINDOW_SIZE);
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                // The stream is only finalised when the encoder is dropped.
                drop(encoder);
            },
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(&mut output, GZIP_LEVEL);
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
            },
            Compression::Zstd => {
                let mut encoder = ZstdEncoder::new(&mut output, ZSTD_LEVEL).or_raise(|| ErrorKind::Io)?;
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
            },
        }
        Ok(output)
    }

    /// Decompress a byte slice in memory.
    #[instrument(level = "trace", skip(input), fields(format = %self, input_size = input.len(), output_size))]
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let size = match self {
            Compression::None => {
                output.extend_from_slice(input);
                input.len()
            },
            Compression::Brotli => {
                let mut decoder = BrotliDecoder::new(input, BROTLI_BUFFER_SIZE);
                decoder.read_to_end(&mut output).or_raise(|| ErrorKind::InvalidData)?
            },
            Compression::Gzip => {
                let mut decoder = GzDecoder::new(input);
                decoder.read_to_end(&mut output).or_raise(|| ErrorKind::InvalidData)?
            },
            Compression::Zstd => {
                let mut decoder = ZstdDecoder::new(input).or_raise(|| ErrorKind::InvalidData)?;
                decoder.read_to_end(&mut output).or_raise(|| ErrorKind::InvalidData)?
            },
        };
        tracing::Span::current().record("output_size", size);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use rstest::rstest;

    const PAGE: &[u8] = br#"{"metadata":{"title":"UIView","roleHeading":"Class"},"abstract":[]}"#;

    #[rstest]
    #[case(Compression::None)]
    #[case(Compression::Brotli)]
    #[case(Compression::Gzip)]
    #[case(Compression::Zstd)]
    fn test_compressed_output_is_detected(#[case] format: Compression) {
        let compressed = format.compress(PAGE).unwrap();
        if format != Compression::None {
            assert_eq!(Compression::detect(&compressed), format);
        }
        assert_eq!(format.decompress(&compressed).unwrap(), PAGE);
    }

    #[test]
    fn test_garbage_is_invalid_data() {
        let err = Compression::Gzip.decompress(&[0x1F, 0x8B, 0xFF, 0xFF, 0xFF]).unwrap_err();
        assert_eq!(*err, crate::error::ErrorKind::InvalidData);
    }
}
