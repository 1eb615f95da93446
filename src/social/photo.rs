//! 照片 HTTP API 客户端与头像 URL 缓存

use crate::social::config::MAX_PHOTO_BATCH;
use crate::social::error::{ApiError, ApiResult};
use crate::social::http::{ApiClient, FileUpload};
use crate::social::storage::{storage_url_for_legacy, StorageFolder};
use chrono::{DateTime, Utc};
use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoKind {
    Perfil,
    Portada,
    Publicacion,
}

impl PhotoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoKind::Perfil => "perfil",
            PhotoKind::Portada => "portada",
            PhotoKind::Publicacion => "publicacion",
        }
    }

    pub fn folder(&self) -> StorageFolder {
        match self {
            PhotoKind::Perfil => StorageFolder::Perfiles,
            PhotoKind::Portada => StorageFolder::Portadas,
            PhotoKind::Publicacion => StorageFolder::Publicaciones,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    #[serde(rename = "usuario_id")]
    pub user_id: i64,
    pub url: String,
    #[serde(rename = "tipo")]
    pub kind: PhotoKind,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// 批量接口返回的用户头像
#[derive(Debug, Clone, Deserialize)]
pub struct UserPhoto {
    #[serde(rename = "usuario_id")]
    pub user_id: i64,
    #[serde(rename = "foto_perfil", default)]
    pub avatar_url: Option<String>,
}

/// 头像 URL 只读快照
///
/// 合并新数据时返回新快照，不修改已交给动态管线的旧快照。
/// 值为 `None` 表示已查询过但该用户没有头像，不再重复请求。
#[derive(Debug, Clone, Default)]
pub struct PhotoUrlCache {
    urls: Arc<HashMap<i64, Option<String>>>,
}

impl PhotoUrlCache {
    pub fn get(&self, user_id: i64) -> Option<&str> {
        self.urls.get(&user_id).and_then(|url| url.as_deref())
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.urls.contains_key(&user_id)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn with_entries<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (i64, Option<String>)>,
    {
        let mut urls = (*self.urls).clone();
        urls.extend(entries);
        Self {
            urls: Arc::new(urls),
        }
    }
}

#[derive(Clone)]
pub struct PhotoApi {
    api: ApiClient,
    batch_size: usize,
}

impl PhotoApi {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            batch_size: MAX_PHOTO_BATCH,
        }
    }

    /// 分片大小，超出上限按上限处理
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_PHOTO_BATCH);
        self
    }

    pub async fn upload(&self, kind: PhotoKind, file: FileUpload) -> ApiResult<Photo> {
        if !file.mime.starts_with("image/") {
            return Err(ApiError::Validation(
                "Solo se permiten imágenes".to_string(),
            ));
        }
        let form = Form::new()
            .text("tipo", kind.as_str())
            .part("foto", file.into_part()?);
        self.api.post_multipart("/api/fotos/subir", form, "上传照片").await
    }

    pub async fn list_for_user(&self, user_id: i64) -> ApiResult<Vec<Photo>> {
        self.api
            .get(&format!("/api/fotos/usuario/{}", user_id), "用户照片")
            .await
    }

    pub async fn delete(&self, photo_id: i64) -> ApiResult<()> {
        let _: Value = self
            .api
            .delete(&format!("/api/fotos/{}", photo_id), "删除照片")
            .await?;
        Ok(())
    }

    /// 批量查询头像，去重后按分片顺序请求
    pub async fn batch(&self, user_ids: &[i64]) -> ApiResult<Vec<UserPhoto>> {
        let unique: Vec<i64> = user_ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let mut photos = Vec::with_capacity(unique.len());

        for chunk in unique.chunks(self.batch_size) {
            debug!("[PhotoAPI] 批量查询头像，本批 {} 个用户", chunk.len());
            let batch: Vec<UserPhoto> = self
                .api
                .post_json(
                    "/api/fotos/batch",
                    &serde_json::json!({ "usuarios": chunk }),
                    "批量头像",
                )
                .await?;
            photos.extend(batch);
        }

        info!("[PhotoAPI] ✅ 批量头像完成，共 {} 条", photos.len());
        Ok(photos)
    }

    /// 为缓存中缺失的用户补齐头像，返回新快照
    pub async fn refresh_cache(
        &self,
        cache: &PhotoUrlCache,
        user_ids: &[i64],
        storage_base_url: &str,
    ) -> ApiResult<PhotoUrlCache> {
        let missing: Vec<i64> = user_ids
            .iter()
            .copied()
            .filter(|id| !cache.contains(*id))
            .collect();
        if missing.is_empty() {
            return Ok(cache.clone());
        }

        let photos = self.batch(&missing).await?;
        let mut entries: HashMap<i64, Option<String>> =
            missing.iter().map(|id| (*id, None)).collect();
        for photo in photos {
            let resolved = photo.avatar_url.and_then(|url| {
                storage_url_for_legacy(&url, StorageFolder::Perfiles, storage_base_url)
            });
            entries.insert(photo.user_id, resolved);
        }
        Ok(cache.with_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    #[test]
    fn cache_snapshots_are_immutable() {
        let empty = PhotoUrlCache::default();
        let one = empty.with_entries([(1, Some("a".to_string())), (2, None)]);
        assert!(empty.is_empty());
        assert_eq!(one.get(1), Some("a"));
        assert_eq!(one.get(2), None);
        assert!(one.contains(2));
        assert_eq!(one.len(), 2);
    }

    #[tokio::test]
    async fn batch_is_chunked_at_fifty_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/fotos/batch"))
            .respond_with(|req: &Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap();
                let ids = body["usuarios"].as_array().unwrap();
                assert!(ids.len() <= MAX_PHOTO_BATCH);
                let photos: Vec<Value> = ids
                    .iter()
                    .map(|id| serde_json::json!({"usuario_id": id, "foto_perfil": format!("perfiles/{id}.jpg")}))
                    .collect();
                ResponseTemplate::new(200).set_body_json(photos)
            })
            .expect(3)
            .mount(&server)
            .await;

        let photos = PhotoApi::new(ApiClient::with_token(&server.uri(), "tok").unwrap());
        let ids: Vec<i64> = (1..=120).chain(1..=10).collect();
        let result = photos.batch(&ids).await.unwrap();
        assert_eq!(result.len(), 120);
    }

    #[tokio::test]
    async fn refresh_only_requests_missing_users() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/fotos/batch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"usuario_id": 2, "foto_perfil": "/uploads/u2.jpg"},
                {"usuario_id": 3, "foto_perfil": null}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let photos = PhotoApi::new(ApiClient::with_token(&server.uri(), "tok").unwrap());
        let cache = PhotoUrlCache::default().with_entries([(1, Some("x".to_string()))]);
        let refreshed = photos
            .refresh_cache(&cache, &[1, 2, 3], "https://bucket.example")
            .await
            .unwrap();
        assert_eq!(refreshed.get(2), Some("https://bucket.example/perfiles/u2.jpg"));
        assert_eq!(refreshed.get(3), None);
        assert!(refreshed.contains(3));
        assert_eq!(cache.get(2), None);

        // 没有头像的用户已记录，不再请求
        let again = photos
            .refresh_cache(&refreshed, &[1, 2, 3], "https://bucket.example")
            .await
            .unwrap();
        assert_eq!(again.len(), 3);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upload_rejects_non_images() {
        let photos = PhotoApi::new(ApiClient::anonymous("http://127.0.0.1:9").unwrap());
        let file = FileUpload::new("cv.pdf", vec![0], "application/pdf");
        assert!(matches!(
            photos.upload(PhotoKind::Perfil, file).await,
            Err(ApiError::Validation(_))
        ));
    }
}
