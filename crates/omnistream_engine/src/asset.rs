use std::path::Path;

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("media asset is empty")]
    Empty,
    #[error("failed to read media asset: {0}")]
    Io(#[from] std::io::Error),
}

/// The binary video payload of a run. Cheap to clone and shared read-only by all jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    file_name: String,
    content_type: String,
    data: Bytes,
}

impl MediaAsset {
    /// Content type is guessed from the file name; unknown extensions are sent as `video/mp4`.
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Result<Self, AssetError> {
        let file_name = file_name.into();
        let data = data.into();
        if data.is_empty() {
            return Err(AssetError::Empty);
        }
        let content_type = mime_guess::from_path(&file_name)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| "video/mp4".to_string());
        Ok(Self {
            file_name,
            content_type,
            data,
        })
    }

    pub async fn from_path(path: &Path) -> Result<Self, AssetError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());
        Self::new(file_name, data)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size_mb(&self) -> f64 {
        self.data.len() as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        let asset = MediaAsset::new("clip.mov", vec![1u8, 2, 3]).unwrap();
        assert_eq!(asset.content_type(), "video/quicktime");
        assert_eq!(asset.len(), 3);
    }

    #[test]
    fn unknown_extension_defaults_to_mp4() {
        let asset = MediaAsset::new("clip.unknownext", vec![0u8]).unwrap();
        assert_eq!(asset.content_type(), "video/mp4");
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            MediaAsset::new("clip.mp4", Vec::<u8>::new()),
            Err(AssetError::Empty)
        ));
    }

    #[tokio::test]
    async fn reads_asset_from_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("demo.mp4");
        std::fs::write(&path, b"not really a video").unwrap();

        let asset = MediaAsset::from_path(&path).await.unwrap();
        assert_eq!(asset.file_name(), "demo.mp4");
        assert_eq!(asset.content_type(), "video/mp4");
        assert_eq!(asset.data().as_ref(), b"not really a video");
    }
}
