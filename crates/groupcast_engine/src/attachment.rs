use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::FilePart;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads a file for upload. Content is passed through as-is.
pub fn load_attachment(path: &Path) -> Result<FilePart, AttachmentError> {
    let meta = fs::metadata(path).map_err(|source| AttachmentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_file() {
        return Err(AttachmentError::NotAFile(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| AttachmentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(FilePart {
        content_type: content_type_for(&file_name).to_string(),
        file_name,
        bytes,
    })
}

/// Best-effort MIME type from the extension; unknown types go as octet-stream.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "ogg" | "oga" | "opus" => "audio/ogg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "wav" => "audio/wav",
        "amr" => "audio/amr",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}
