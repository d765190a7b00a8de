// Branding asset storage - validates and persists uploaded logo and
// favicon files, returning their public URL
use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::infrastructure::config::UploadSettings;

/// Accepted upload content types and the extension each is stored under.
const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("image/png", "png"),
    ("image/svg+xml", "svg"),
    ("image/x-icon", "ico"),
    ("image/jpeg", "jpg"),
];

#[derive(Clone)]
pub struct BrandingStore {
    settings: UploadSettings,
}

impl BrandingStore {
    pub fn new(settings: UploadSettings) -> Self {
        Self { settings }
    }

    /// Persist an uploaded branding asset. `asset_kind` distinguishes
    /// logo from favicon in the stored name; the file itself is renamed
    /// to a fresh id so uploads can never collide or traverse paths.
    pub async fn store(
        &self,
        asset_kind: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<String, ServiceError> {
        let extension = ALLOWED_TYPES
            .iter()
            .find(|(allowed, _)| *allowed == content_type)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| {
                ServiceError::validation(format!("unsupported file type '{content_type}'"))
            })?;

        if data.is_empty() {
            return Err(ServiceError::validation("uploaded file is empty"));
        }
        if data.len() as u64 > self.settings.max_bytes {
            return Err(ServiceError::validation(format!(
                "file exceeds the {} byte limit",
                self.settings.max_bytes
            )));
        }
        if !matches!(asset_kind, "logo" | "favicon") {
            return Err(ServiceError::validation(format!(
                "unknown branding asset type '{asset_kind}'"
            )));
        }

        let file_name = format!("{}-{}.{}", asset_kind, Uuid::new_v4(), extension);
        let dir = std::path::Path::new(&self.settings.dir).join("branding");
        tokio::fs::create_dir_all(&dir)
            .await
            .context("failed to create upload directory")
            .map_err(ServiceError::Backend)?;
        tokio::fs::write(dir.join(&file_name), &data)
            .await
            .context("failed to write uploaded file")
            .map_err(ServiceError::Backend)?;

        Ok(format!(
            "{}/uploads/branding/{}",
            self.settings.public_base_url.trim_end_matches('/'),
            file_name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &std::path::Path) -> BrandingStore {
        BrandingStore::new(UploadSettings {
            dir: dir.to_string_lossy().into_owned(),
            public_base_url: "http://localhost:8080".to_string(),
            max_bytes: 1024,
        })
    }

    #[tokio::test]
    async fn stores_allowed_type_and_returns_url() {
        let dir = std::env::temp_dir().join(format!("leadboard-test-{}", Uuid::new_v4()));
        let store = store(&dir);

        let url = store
            .store("logo", "image/png", Bytes::from_static(b"\x89PNG"))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:8080/uploads/branding/logo-"));
        assert!(url.ends_with(".png"));

        let file_name = url.rsplit('/').next().unwrap();
        let on_disk = dir.join("branding").join(file_name);
        assert_eq!(tokio::fs::read(on_disk).await.unwrap(), b"\x89PNG");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_disallowed_type_and_oversize() {
        let dir = std::env::temp_dir().join(format!("leadboard-test-{}", Uuid::new_v4()));
        let store = store(&dir);

        assert!(matches!(
            store
                .store("logo", "application/pdf", Bytes::from_static(b"x"))
                .await
                .unwrap_err(),
            ServiceError::Validation(_)
        ));

        let too_big = Bytes::from(vec![0u8; 2048]);
        assert!(matches!(
            store.store("logo", "image/png", too_big).await.unwrap_err(),
            ServiceError::Validation(_)
        ));

        assert!(matches!(
            store
                .store("banner", "image/png", Bytes::from_static(b"x"))
                .await
                .unwrap_err(),
            ServiceError::Validation(_)
        ));
    }
}
