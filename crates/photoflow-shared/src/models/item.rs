//! Submitted items: one image plus the metadata the remote endpoint needs.

use std::path::Path;

use bon::Builder;
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::{PhotoflowError, PhotoflowResult};

/// Media types accepted for upload, keyed by lowercase file extension
const ACCEPTED_MEDIA_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

/// One user-submitted unit of work
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct SubmittedItem {
    #[builder(default = Uuid::now_v7())]
    pub id: Uuid,
    #[builder(into)]
    pub file_name: String,
    #[builder(into)]
    pub content_type: String,
    #[builder(into)]
    pub content: Bytes,
}

impl SubmittedItem {
    /// Read an image file from disk, inferring its media type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> PhotoflowResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                PhotoflowError::ValidationError(format!(
                    "path has no file name: {}",
                    path.display()
                ))
            })?;
        let content_type = media_type_for(&file_name)?;
        let content = tokio::fs::read(path).await?;

        Ok(Self::builder()
            .file_name(file_name)
            .content_type(content_type)
            .content(content)
            .build())
    }

    /// Payload size in bytes
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// File name without its extension
    pub fn stem(&self) -> &str {
        file_stem(&self.file_name)
    }
}

/// Resolve the media type for an accepted image file name
pub fn media_type_for(file_name: &str) -> PhotoflowResult<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .ok_or_else(|| PhotoflowError::unsupported_media_type(file_name, "missing extension"))?;

    ACCEPTED_MEDIA_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media_type)| *media_type)
        .ok_or_else(|| {
            PhotoflowError::unsupported_media_type(file_name, format!("extension '{extension}'"))
        })
}

/// Portion of a file name before its last `.`
pub fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(idx) => &file_name[..idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_assigns_id_and_size() {
        let item = SubmittedItem::builder()
            .file_name("lake.png")
            .content_type("image/png")
            .content(vec![1u8, 2, 3, 4])
            .build();

        assert_eq!(item.size(), 4);
        assert_eq!(item.stem(), "lake");
        assert!(!item.id.is_nil());
    }

    #[test]
    fn test_media_type_for_accepted_extensions() {
        assert_eq!(media_type_for("a.jpg").unwrap(), "image/jpeg");
        assert_eq!(media_type_for("a.JPEG").unwrap(), "image/jpeg");
        assert_eq!(media_type_for("a.png").unwrap(), "image/png");
        assert_eq!(media_type_for("a.webp").unwrap(), "image/webp");
    }

    #[test]
    fn test_media_type_for_rejects_others() {
        assert!(matches!(
            media_type_for("notes.txt"),
            Err(PhotoflowError::UnsupportedMediaType { .. })
        ));
        assert!(media_type_for("no_extension").is_err());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("mountain_sunrise.jpg"), "mountain_sunrise");
        assert_eq!(file_stem("archive.tar.png"), "archive.tar");
        assert_eq!(file_stem("README"), "README");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[tokio::test]
    async fn test_from_path_reads_content() {
        let mut file = tempfile::Builder::new().suffix(".webp").tempfile().unwrap();
        file.write_all(b"webp-bytes").unwrap();

        let item = SubmittedItem::from_path(file.path()).await.unwrap();
        assert_eq!(item.content_type, "image/webp");
        assert_eq!(item.content.as_ref(), b"webp-bytes");
        assert_eq!(item.size(), 10);
    }

    #[tokio::test]
    async fn test_from_path_rejects_unsupported_type() {
        let file = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
        let err = SubmittedItem::from_path(file.path()).await.unwrap_err();
        assert!(matches!(err, PhotoflowError::UnsupportedMediaType { .. }));
    }
}
