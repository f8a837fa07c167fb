use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_PDF_BYTES: usize = 20 * 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UploadKind {
    Image,
    Pdf,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file in upload")]
    MissingFile,
    #[error("file type '{0}' is not allowed")]
    UnsupportedType(String),
    #[error("file is too large (max {0} bytes)")]
    TooLarge(usize),
    #[error("could not store file: {0}")]
    Io(#[from] std::io::Error),
}

pub fn max_bytes(kind: UploadKind) -> usize {
    match kind {
        UploadKind::Image => MAX_IMAGE_BYTES,
        UploadKind::Pdf => MAX_PDF_BYTES,
    }
}

/// Checks the original filename against the allowed extensions and hands back
/// the normalized extension to store under.
pub fn validate_filename(kind: UploadKind, filename: &str) -> Result<String, UploadError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| UploadError::UnsupportedType(filename.to_string()))?;

    match kind {
        UploadKind::Image if IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        UploadKind::Pdf if ext == "pdf" => Ok(ext),
        _ => Err(UploadError::UnsupportedType(ext)),
    }
}

pub fn check_size(kind: UploadKind, len: usize) -> Result<(), UploadError> {
    let max = max_bytes(kind);
    if len > max {
        return Err(UploadError::TooLarge(max));
    }
    if len == 0 {
        return Err(UploadError::MissingFile);
    }
    Ok(())
}

/// Writes the bytes under a fresh uuid name and returns the public path the
/// frontend stores on the record.
pub async fn store_file(
    upload_dir: &str,
    kind: UploadKind,
    original_filename: &str,
    bytes: &[u8],
) -> Result<String, UploadError> {
    let ext = validate_filename(kind, original_filename)?;
    check_size(kind, bytes.len())?;

    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = Path::new(upload_dir).join(&filename);
    tokio::fs::write(&path, bytes).await?;

    Ok(format!("/uploads/{}", filename))
}

pub fn upload_dir_from_env() -> String {
    std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string())
}

#[cfg(test)]
mod tests {
    use super::{check_size, validate_filename, UploadKind, MAX_IMAGE_BYTES, MAX_PDF_BYTES};

    #[test]
    fn image_extensions_accepted() {
        assert_eq!(validate_filename(UploadKind::Image, "foto.JPG").unwrap(), "jpg");
        assert_eq!(validate_filename(UploadKind::Image, "a.webp").unwrap(), "webp");
        assert_eq!(
            validate_filename(UploadKind::Image, "dir.name/pic.png").unwrap(),
            "png"
        );
    }

    #[test]
    fn wrong_kind_rejected() {
        assert!(validate_filename(UploadKind::Image, "malware.exe").is_err());
        assert!(validate_filename(UploadKind::Image, "doc.pdf").is_err());
        assert!(validate_filename(UploadKind::Pdf, "pic.png").is_err());
        assert!(validate_filename(UploadKind::Pdf, "flyer.pdf").is_ok());
    }

    #[test]
    fn extensionless_rejected() {
        assert!(validate_filename(UploadKind::Image, "foto").is_err());
        assert!(validate_filename(UploadKind::Image, "").is_err());
    }

    #[test]
    fn size_limits() {
        assert!(check_size(UploadKind::Image, 1).is_ok());
        assert!(check_size(UploadKind::Image, MAX_IMAGE_BYTES).is_ok());
        assert!(check_size(UploadKind::Image, MAX_IMAGE_BYTES + 1).is_err());
        assert!(check_size(UploadKind::Pdf, MAX_PDF_BYTES + 1).is_err());
        assert!(check_size(UploadKind::Image, 0).is_err());
    }
}
