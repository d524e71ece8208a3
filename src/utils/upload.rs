//! Local-disk photo store behind the same contract the Cloudinary
//! uploader exposed: bytes in, a durable URL plus a deletable id out.

use std::fs;
use std::path::{Path, PathBuf};

use actix_web::web;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredPhoto {
    /// Path the HTTP server serves the file under.
    #[schema(example = "/uploads/attendance/3f2a9c.jpg")]
    pub url: String,
    /// Identifier accepted by [`delete_photo`].
    #[schema(example = "attendance/3f2a9c.jpg")]
    pub public_id: String,
}

/// Persists an uploaded image under `<base_dir>/<folder>/` with a random
/// filename. Blocking fs work runs on the actix blocking pool.
pub async fn save_photo(
    base_dir: &str,
    folder: &str,
    bytes: Vec<u8>,
) -> Result<StoredPhoto, ApiError> {
    let dir = PathBuf::from(base_dir).join(folder);
    let file_name = format!("{}.jpg", Uuid::new_v4().simple());
    let public_id = format!("{}/{}", folder, file_name);
    let url = format!("/uploads/{}", public_id);

    let path = dir.join(&file_name);
    web::block(move || -> std::io::Result<()> {
        fs::create_dir_all(&dir)?;
        fs::write(&path, &bytes)
    })
    .await
    .map_err(|e| ApiError::UploadFailed(e.to_string()))?
    .map_err(|e| ApiError::UploadFailed(e.to_string()))?;

    Ok(StoredPhoto { url, public_id })
}

/// Best-effort removal; a missing file is not an error. The id must stay
/// inside the upload directory.
pub async fn delete_photo(base_dir: &str, public_id: &str) {
    if public_id.split('/').any(|seg| seg == "..") || public_id.starts_with('/') {
        tracing::warn!(public_id, "refusing photo delete outside upload dir");
        return;
    }

    let path = Path::new(base_dir).join(public_id);
    let result = web::block(move || match fs::remove_file(&path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    })
    .await;

    if let Ok(Err(e)) = result {
        tracing::warn!(error = %e, public_id, "failed to delete stored photo");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_base() -> String {
        std::env::temp_dir()
            .join(format!("jagakampung-test-{}", Uuid::new_v4().simple()))
            .to_string_lossy()
            .into_owned()
    }

    #[actix_web::test]
    async fn stores_and_deletes_a_photo() {
        let base = temp_base();

        let stored = save_photo(&base, "attendance", b"jpeg bytes".to_vec())
            .await
            .unwrap();
        assert!(stored.url.starts_with("/uploads/attendance/"));
        assert!(stored.public_id.starts_with("attendance/"));

        let on_disk = Path::new(&base).join(&stored.public_id);
        assert_eq!(fs::read(&on_disk).unwrap(), b"jpeg bytes");

        delete_photo(&base, &stored.public_id).await;
        assert!(!on_disk.exists());

        // Deleting again is a no-op.
        delete_photo(&base, &stored.public_id).await;

        let _ = fs::remove_dir_all(&base);
    }

    #[actix_web::test]
    async fn refuses_traversal_ids() {
        let base = temp_base();
        delete_photo(&base, "../outside.jpg").await;
        delete_photo(&base, "/etc/passwd").await;
    }
}
