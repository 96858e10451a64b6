//! Payload sources for assets and renditions
//!
//! A source is consumed exactly once and buffered fully in memory before the
//! payload is inspected and written.

use crate::error::AssetFailure;
use crate::image::dummy_image;
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Where the binary payload of an asset or rendition comes from
pub enum PayloadSource<'a> {
    /// Bytes already in memory
    Bytes(Vec<u8>),

    /// Any reader; read to the end and dropped
    Reader(Box<dyn Read + 'a>),

    /// File relative to the builder's resource root
    Resource(PathBuf),

    /// Empty image of the given size, encoded per the target MIME type
    Dummy { width: u32, height: u32 },
}

impl<'a> PayloadSource<'a> {
    /// Wrap a reader
    #[must_use]
    pub fn reader(reader: impl Read + 'a) -> Self {
        Self::Reader(Box::new(reader))
    }

    /// Named resource file, resolved against the resource root
    #[must_use]
    pub fn resource(path: impl Into<PathBuf>) -> Self {
        Self::Resource(path.into())
    }

    /// Placeholder image
    #[must_use]
    pub fn dummy(width: u32, height: u32) -> Self {
        Self::Dummy { width, height }
    }

    /// Read the whole payload into memory
    pub(crate) fn read_all(self, mime_type: &str, resource_root: &Path) -> Result<Vec<u8>, AssetFailure> {
        match self {
            Self::Bytes(data) => Ok(data),
            Self::Reader(mut reader) => {
                let mut data = Vec::new();
                reader.read_to_end(&mut data)?;
                Ok(data)
            }
            Self::Resource(relative) => {
                let path = resource_root.join(relative);
                std::fs::read(&path).map_err(|err| match err.kind() {
                    io::ErrorKind::NotFound => AssetFailure::ResourceNotFound(path),
                    _ => AssetFailure::Io(err),
                })
            }
            Self::Dummy { width, height } => Ok(dummy_image(width, height, mime_type)?),
        }
    }
}

impl fmt::Debug for PayloadSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(data) => f.debug_tuple("Bytes").field(&data.len()).finish(),
            Self::Reader(_) => f.write_str("Reader"),
            Self::Resource(path) => f.debug_tuple("Resource").field(path).finish(),
            Self::Dummy { width, height } => f
                .debug_struct("Dummy")
                .field("width", width)
                .field("height", height)
                .finish(),
        }
    }
}

impl From<Vec<u8>> for PayloadSource<'_> {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(data)
    }
}

impl From<&[u8]> for PayloadSource<'_> {
    fn from(data: &[u8]) -> Self {
        Self::Bytes(data.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for PayloadSource<'_> {
    fn from(data: &[u8; N]) -> Self {
        Self::Bytes(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_and_reader_buffer_fully() {
        let root = Path::new(".");
        assert_eq!(PayloadSource::from(&[1u8, 2, 3]).read_all("x/y", root).unwrap(), vec![1, 2, 3]);
        let reader = io::Cursor::new(vec![4u8, 5]);
        assert_eq!(PayloadSource::reader(reader).read_all("x/y", root).unwrap(), vec![4, 5]);
    }

    #[test]
    fn missing_resource_is_reported_with_path() {
        let failure = PayloadSource::resource("does/not/exist.png")
            .read_all("image/png", Path::new("/nonexistent-root"))
            .unwrap_err();
        match failure {
            AssetFailure::ResourceNotFound(path) => {
                assert_eq!(path, Path::new("/nonexistent-root/does/not/exist.png"));
            }
            other => panic!("unexpected failure: {other}"),
        }
    }

    #[test]
    fn failing_reader_surfaces_io_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
            }
        }
        let failure = PayloadSource::reader(Broken).read_all("image/png", Path::new(".")).unwrap_err();
        assert!(matches!(failure, AssetFailure::Io(_)));
    }

    #[test]
    fn dummy_uses_target_mime_type() {
        let data = PayloadSource::dummy(3, 2).read_all("image/png", Path::new(".")).unwrap();
        assert!(data.starts_with(b"\x89PNG"));
    }
}
