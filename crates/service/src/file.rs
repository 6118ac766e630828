use bytes::Bytes;
use mime::Mime;

/// A candidate document to upload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentFile {
    /// File name as the user sees it, including the extension.
    pub name: String,
    /// The declared MIME type, possibly empty when the host couldn't tell.
    pub mime_type: String,
    /// Declared size in bytes.
    ///
    /// This is what validation looks at, and is normally the length of
    /// `contents`.
    pub size_bytes: u64,
    /// Raw file contents.
    pub contents: Bytes,
}

impl DocumentFile {
    /// Creates a document whose size is taken from its contents.
    #[inline]
    pub fn new<N, M, C>(name: N, mime_type: M, contents: C) -> Self
    where
        N: Into<String>,
        M: Into<String>,
        C: Into<Bytes>,
    {
        let contents = contents.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: contents.len() as u64,
            contents,
        }
    }

    /// Parses the declared MIME type, if there is a valid one.
    #[inline]
    pub fn mime(&self) -> Option<Mime> {
        self.mime_type.parse().ok()
    }

    /// Returns the lowercased extension of the file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
