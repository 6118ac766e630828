//! Upload validation and the registry of uploaded files.

use docqa_service::DocumentFile;
use mime::Mime;

/// Largest accepted upload by default, 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Shown once per batch when any file in it fails validation.
pub const REJECTED_FILES_MESSAGE: &str = "Some files were rejected. Only PDF, \
    DOCX, and TXT files up to 50 MB are supported.";

/// MIME types and extensions the service can ingest.
const SUPPORTED_TYPES: [(&str, &str); 3] = [
    ("application/pdf", "pdf"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
    ("text/plain", "txt"),
];

/// Why a file was turned away before upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Rejection {
    /// Neither the MIME type nor the extension is supported.
    #[error("unsupported file type")]
    UnsupportedType,
    /// The file is larger than the policy allows.
    #[error("file is larger than {limit} bytes")]
    TooLarge {
        /// The limit that was exceeded.
        limit: u64,
    },
}

/// Which files may be uploaded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UploadPolicy {
    max_size_bytes: u64,
}

impl Default for UploadPolicy {
    #[inline]
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Creates a policy with a custom size limit.
    #[inline]
    pub fn with_max_size(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }

    /// Returns the size limit in bytes.
    #[inline]
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Checks a single file.
    pub fn check(&self, file: &DocumentFile) -> Result<(), Rejection> {
        if !is_supported_type(file) {
            return Err(Rejection::UnsupportedType);
        }
        if file.size_bytes > self.max_size_bytes {
            return Err(Rejection::TooLarge {
                limit: self.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Splits a batch into accepted files and rejected file names, keeping
    /// the batch order on both sides.
    pub fn partition(
        &self,
        files: Vec<DocumentFile>,
    ) -> (Vec<DocumentFile>, Vec<(String, Rejection)>) {
        let mut accepted = Vec::with_capacity(files.len());
        let mut rejected = vec![];
        for file in files {
            match self.check(&file) {
                Ok(()) => accepted.push(file),
                Err(why) => rejected.push((file.name, why)),
            }
        }
        (accepted, rejected)
    }
}

fn is_supported_type(file: &DocumentFile) -> bool {
    let mime = file.mime();
    let essence = mime.as_ref().map(Mime::essence_str);
    let ext = file.extension();
    SUPPORTED_TYPES.iter().any(|(supported_mime, supported_ext)| {
        essence == Some(*supported_mime) || ext.as_deref() == Some(*supported_ext)
    })
}

/// A file the service has accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UploadedFileRecord {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Human-readable time the upload completed.
    pub uploaded_at: String,
}

impl UploadedFileRecord {
    /// Returns the size in human units, e.g. `1.5 KB`.
    #[inline]
    pub fn display_size(&self) -> String {
        format_file_size(self.size_bytes)
    }
}

/// Files uploaded during this session, in completion order.
///
/// This is the client's own record; removing an entry does not delete the
/// document from the service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileRegistry {
    records: Vec<UploadedFileRecord>,
}

impl FileRegistry {
    /// Returns the records in completion order.
    #[inline]
    pub fn records(&self) -> &[UploadedFileRecord] {
        &self.records
    }

    #[inline]
    pub(crate) fn push(&mut self, record: UploadedFileRecord) {
        self.records.push(record);
    }

    /// Removes the record at `index`, if there is one.
    #[inline]
    pub(crate) fn remove(&mut self, index: usize) -> Option<UploadedFileRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }
}

/// Formats a byte count with base-1024 units and at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_owned();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let formatted = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{formatted} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime_type: &str, size_bytes: u64) -> DocumentFile {
        DocumentFile {
            size_bytes,
            ..DocumentFile::new(name, mime_type, "")
        }
    }

    #[test]
    fn test_supported_types() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.check(&file("a.pdf", "application/pdf", 10)), Ok(()));
        assert_eq!(
            policy.check(&file(
                "b.docx",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                10
            )),
            Ok(())
        );
        assert_eq!(
            policy.check(&file("c.txt", "text/plain; charset=utf-8", 10)),
            Ok(())
        );
        // Browsers sometimes leave the type empty, the extension decides.
        assert_eq!(policy.check(&file("NOTES.TXT", "", 10)), Ok(()));
        // A supported MIME type is enough on its own.
        assert_eq!(policy.check(&file("scan", "application/pdf", 10)), Ok(()));
    }

    #[test]
    fn test_unsupported_types() {
        let policy = UploadPolicy::default();
        assert_eq!(
            policy.check(&file("photo.png", "image/png", 10)),
            Err(Rejection::UnsupportedType)
        );
        assert_eq!(
            policy.check(&file("old.doc", "application/msword", 10)),
            Err(Rejection::UnsupportedType)
        );
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let policy = UploadPolicy::default();
        let limit = DEFAULT_MAX_UPLOAD_BYTES;
        assert_eq!(policy.check(&file("a.pdf", "application/pdf", limit)), Ok(()));
        assert_eq!(
            policy.check(&file("a.pdf", "application/pdf", limit + 1)),
            Err(Rejection::TooLarge { limit })
        );
    }

    #[test]
    fn test_partition_keeps_order() {
        let policy = UploadPolicy::with_max_size(100);
        let (accepted, rejected) = policy.partition(vec![
            file("one.txt", "text/plain", 1),
            file("two.exe", "application/octet-stream", 1),
            file("three.pdf", "application/pdf", 1),
            file("four.pdf", "application/pdf", 101),
        ]);
        let accepted: Vec<_> = accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(accepted, ["one.txt", "three.pdf"]);
        assert_eq!(
            rejected,
            [
                ("two.exe".to_owned(), Rejection::UnsupportedType),
                ("four.pdf".to_owned(), Rejection::TooLarge { limit: 100 }),
            ]
        );
    }

    #[test]
    fn test_registry_remove() {
        let mut registry = FileRegistry::default();
        for name in ["a.txt", "b.txt"] {
            registry.push(UploadedFileRecord {
                name: name.to_owned(),
                size_bytes: 1,
                uploaded_at: String::new(),
            });
        }
        assert!(registry.remove(2).is_none());
        assert_eq!(registry.remove(0).unwrap().name, "a.txt");
        assert_eq!(registry.records().len(), 1);
        assert_eq!(registry.records()[0].name, "b.txt");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(DEFAULT_MAX_UPLOAD_BYTES), "50 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
    }
}
