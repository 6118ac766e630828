//! Loading local files for upload.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use docqa_service::DocumentFile;
use mime::Mime;
use tokio::task::spawn_blocking;

const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Error type for [`load_documents`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The pattern is not valid glob syntax.
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Why it is invalid.
        source: glob::PatternError,
    },
    /// Nothing matches the pattern.
    #[error("no files match `{0}`")]
    NoMatch(String),
    /// A matching file couldn't be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

/// Guesses the MIME type of a file from its extension.
///
/// Unknown extensions map to `application/octet-stream`, which the upload
/// policy then rejects unless the extension itself is supported.
pub fn guess_mime_type(path: &Path) -> Mime {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => mime::APPLICATION_PDF,
        Some("docx") => DOCX_MIME_TYPE
            .parse()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        Some("txt") => mime::TEXT_PLAIN,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Expands glob patterns into a sorted, deduplicated list of regular files.
///
/// Every pattern must match at least one file.
pub async fn expand_patterns(
    patterns: Vec<String>,
) -> Result<Vec<PathBuf>, LoadError> {
    spawn_blocking(move || {
        let mut paths = vec![];
        for pattern in patterns {
            let matches = glob::glob(&pattern).map_err(|source| {
                LoadError::Pattern {
                    pattern: pattern.clone(),
                    source,
                }
            })?;
            let before = paths.len();
            paths.extend(matches.flatten().filter(|path| path.is_file()));
            if paths.len() == before {
                return Err(LoadError::NoMatch(pattern));
            }
        }
        paths.sort();
        paths.dedup();
        Ok(paths)
    })
    .await
    .map_err(|err| LoadError::Io {
        path: PathBuf::new(),
        source: io::Error::other(err),
    })?
}

/// Reads a file into a [`DocumentFile`] named after its file name.
///
/// Files larger than `max_bytes` are not read. They come back with empty
/// contents and their real size, so the upload policy still rejects them.
pub async fn load_document(
    path: &Path,
    max_bytes: u64,
) -> Result<DocumentFile, LoadError> {
    let io_err = |source: io::Error| LoadError::Io {
        path: path.to_owned(),
        source,
    };
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = guess_mime_type(path).to_string();

    let size_bytes = tokio::fs::metadata(path).await.map_err(io_err)?.len();
    if size_bytes > max_bytes {
        debug!("skip reading {name}, {size_bytes} bytes");
        return Ok(DocumentFile {
            size_bytes,
            ..DocumentFile::new(name, mime_type, Bytes::new())
        });
    }

    let contents = tokio::fs::read(path).await.map_err(io_err)?;
    Ok(DocumentFile::new(name, mime_type, contents))
}

/// Expands the patterns and reads every matching file no larger than
/// `max_bytes`.
pub async fn load_documents(
    patterns: Vec<String>,
    max_bytes: u64,
) -> Result<Vec<DocumentFile>, LoadError> {
    let paths = expand_patterns(patterns).await?;
    debug!("loading {} file(s)", paths.len());

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(load_document(&path, max_bytes).await?);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src");

    #[test]
    fn test_guess_mime_type() {
        let guess = |path: &str| guess_mime_type(Path::new(path)).to_string();
        assert_eq!(guess("a/b.pdf"), "application/pdf");
        assert_eq!(guess("Notes.TXT"), "text/plain");
        assert_eq!(guess("report.docx"), DOCX_MIME_TYPE);
        assert_eq!(guess("archive.tar.gz"), "application/octet-stream");
        assert_eq!(guess("Makefile"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_load_documents() {
        let pattern = format!("{SRC_DIR}/*.rs");
        let files = load_documents(vec![pattern.clone(), pattern], u64::MAX)
            .await
            .unwrap();

        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"files.rs"));
        assert!(names.contains(&"lib.rs"));
        // Both patterns matched the same files.
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped);

        let this = files.iter().find(|f| f.name == "files.rs").unwrap();
        assert_eq!(this.mime_type, "application/octet-stream");
        assert_eq!(this.size_bytes, this.contents.len() as u64);
    }

    #[tokio::test]
    async fn test_oversized_file_is_not_read() {
        let path = Path::new(SRC_DIR).join("files.rs");
        let len = std::fs::metadata(&path).unwrap().len();

        let file = load_document(&path, len - 1).await.unwrap();
        assert_eq!(file.name, "files.rs");
        assert_eq!(file.size_bytes, len);
        assert!(file.contents.is_empty());

        let file = load_document(&path, len).await.unwrap();
        assert_eq!(file.contents.len() as u64, len);
    }

    #[tokio::test]
    async fn test_bad_patterns() {
        let result = expand_patterns(vec!["[".to_owned()]).await;
        assert!(matches!(result, Err(LoadError::Pattern { .. })));

        let pattern = format!("{SRC_DIR}/*.nothing");
        let result = expand_patterns(vec![pattern.clone()]).await;
        assert!(matches!(result, Err(LoadError::NoMatch(p)) if p == pattern));
    }
}
