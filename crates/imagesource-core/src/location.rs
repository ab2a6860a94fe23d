//! Resource locations: filesystem paths and `file://` URIs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use crate::decode::DecodeError;

/// Immutable identifier of an image resource.
///
/// A location is either a local path or a URI. Text is parsed once, when the
/// location is built: anything with a scheme of two or more letters is a URI,
/// everything else is a path. Paths given as [`Path`]/[`PathBuf`] are never
/// parsed, so names like `photo:1.png` or non-UTF-8 names stay paths.
///
/// Two locations are equal when their origins are equal; no normalization is
/// done, so `/a.jpg` and `file:///a.jpg` are different locations even though
/// they open the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    origin: Arc<Origin>,
}

#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Origin {
    Path(PathBuf),
    Uri(Url),
}

impl ResourceLocation {
    /// Parse `location` as a URI, or take it as a path when it has no scheme.
    ///
    /// Single-letter schemes are Windows drive letters, not URIs.
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        let origin = match Url::parse(&location) {
            Ok(url) if url.scheme().len() > 1 => Origin::Uri(url),
            _ => Origin::Path(PathBuf::from(location)),
        };
        Self::with_origin(origin)
    }

    /// A local path, taken as is.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_origin(Origin::Path(path.into()))
    }

    fn with_origin(origin: Origin) -> Self {
        Self {
            origin: Arc::new(origin),
        }
    }

    /// The URI, if this location is one.
    pub fn as_url(&self) -> Option<&Url> {
        match &*self.origin {
            Origin::Uri(url) => Some(url),
            Origin::Path(_) => None,
        }
    }

    /// The path, if this location was given as one.
    pub fn as_path(&self) -> Option<&Path> {
        match &*self.origin {
            Origin::Path(path) => Some(path),
            Origin::Uri(_) => None,
        }
    }

    /// Local path this location refers to.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::UnsupportedLocation` for non-`file` URIs and for
    /// `file` URIs that do not map to a local path.
    pub fn to_file_path(&self) -> Result<PathBuf, DecodeError> {
        match &*self.origin {
            Origin::Path(path) => Ok(path.clone()),
            Origin::Uri(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|_| DecodeError::UnsupportedLocation(url.to_string())),
            Origin::Uri(url) => Err(DecodeError::UnsupportedLocation(url.to_string())),
        }
    }

    /// Read the encoded payload verbatim.
    pub fn read_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        let path = self.to_file_path()?;
        Ok(std::fs::read(path)?)
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.origin {
            Origin::Path(path) => write!(f, "{}", path.display()),
            Origin::Uri(url) => f.write_str(url.as_str()),
        }
    }
}

impl From<&str> for ResourceLocation {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceLocation {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&Path> for ResourceLocation {
    fn from(value: &Path) -> Self {
        Self::from_path(value)
    }
}

impl From<PathBuf> for ResourceLocation {
    fn from(value: PathBuf) -> Self {
        Self::from_path(value)
    }
}

impl From<Url> for ResourceLocation {
    fn from(value: Url) -> Self {
        Self::with_origin(Origin::Uri(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        let location = ResourceLocation::from("/tmp/photo.jpg");
        assert!(location.as_url().is_none());
        assert_eq!(location.as_path(), Some(Path::new("/tmp/photo.jpg")));
        assert_eq!(
            location.to_file_path().unwrap(),
            PathBuf::from("/tmp/photo.jpg")
        );
    }

    #[test]
    fn test_relative_path() {
        let location = ResourceLocation::from("photos/a.png");
        assert_eq!(location.to_file_path().unwrap(), PathBuf::from("photos/a.png"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_uri_is_percent_decoded() {
        let location = ResourceLocation::from("file:///tmp/my%20photo.jpg");
        assert_eq!(
            location.to_file_path().unwrap(),
            PathBuf::from("/tmp/my photo.jpg")
        );
    }

    #[test]
    fn test_remote_uri_is_unsupported() {
        let location = ResourceLocation::from("https://example.com/a.jpg");
        assert!(matches!(
            location.to_file_path(),
            Err(DecodeError::UnsupportedLocation(_))
        ));
        assert!(location.read_bytes().is_err());
    }

    #[test]
    fn test_equality_is_textual() {
        assert_eq!(
            ResourceLocation::from("/tmp/a.jpg"),
            ResourceLocation::from(String::from("/tmp/a.jpg"))
        );
        assert_ne!(
            ResourceLocation::from("/tmp/a.jpg"),
            ResourceLocation::from("file:///tmp/a.jpg")
        );
    }

    #[test]
    fn test_from_url_round_trips_text() {
        let url = Url::parse("file:///tmp/a.jpg").unwrap();
        let location = ResourceLocation::from(url);
        assert_eq!(location.as_url().map(Url::as_str), Some("file:///tmp/a.jpg"));
        assert_eq!(location.to_string(), "file:///tmp/a.jpg");
    }

    #[test]
    fn test_read_bytes_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let location = ResourceLocation::from(dir.path().join("missing.jpg"));
        assert!(matches!(location.read_bytes(), Err(DecodeError::IoError(_))));
    }

    #[test]
    fn test_read_bytes_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, b"not an image").unwrap();

        let location = ResourceLocation::from(path);
        assert_eq!(location.read_bytes().unwrap(), b"not an image");
    }

    #[test]
    fn test_windows_drive_letter_is_a_path() {
        let location = ResourceLocation::from("C:/photos/a.jpg");
        assert!(location.as_url().is_none());
        assert_eq!(
            location.to_file_path().unwrap(),
            PathBuf::from("C:/photos/a.jpg")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_path_with_colon_is_not_a_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo:1.png");
        std::fs::write(&path, b"colon").unwrap();

        let location = ResourceLocation::from(path.clone());
        assert_eq!(location.as_path(), Some(path.as_path()));
        assert_eq!(location.read_bytes().unwrap(), b"colon");

        let relative = ResourceLocation::from(PathBuf::from("photo:1.png"));
        assert_eq!(
            relative.to_file_path().unwrap(),
            PathBuf::from("photo:1.png")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_kept_intact() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"caf\xe9.png"));
        let created = std::fs::write(&path, b"latin-1 name");
        // Some filesystems only accept UTF-8 names.
        if created.is_err() {
            return;
        }

        let location = ResourceLocation::from(path.as_path());
        assert_eq!(location.to_file_path().unwrap(), path);
        assert_eq!(location.read_bytes().unwrap(), b"latin-1 name");
    }

    #[test]
    fn test_path_and_text_forms_agree() {
        assert_eq!(
            ResourceLocation::from("/tmp/a.jpg"),
            ResourceLocation::from(Path::new("/tmp/a.jpg"))
        );
        assert_eq!(ResourceLocation::from("/tmp/a.jpg").to_string(), "/tmp/a.jpg");
    }
}
