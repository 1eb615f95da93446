//! 文档（学习资料）HTTP API 客户端

use crate::social::error::{ApiError, ApiResult};
use crate::social::http::{ApiClient, FileUpload};
use chrono::{DateTime, Utc};
use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 单个文档大小上限（10 MB）
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    #[serde(rename = "usuario_id")]
    pub owner_id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    pub url: String,
    #[serde(rename = "tipo_mime", default)]
    pub mime: Option<String>,
    #[serde(rename = "tamano", default)]
    pub size_bytes: u64,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct DocumentApi {
    api: ApiClient,
}

impl DocumentApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn upload(&self, file: FileUpload, description: Option<&str>) -> ApiResult<Document> {
        if file.bytes.is_empty() {
            return Err(ApiError::Validation("El archivo está vacío".to_string()));
        }
        if file.bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(ApiError::Validation(
                "El archivo supera el tamaño máximo de 10 MB".to_string(),
            ));
        }

        let mut form = Form::new();
        if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
            form = form.text("descripcion", description.to_string());
        }
        let form = form.part("documento", file.into_part()?);
        self.api
            .post_multipart("/api/documentos/subir", form, "上传文档")
            .await
    }

    pub async fn list_mine(&self) -> ApiResult<Vec<Document>> {
        self.api
            .get("/api/documentos/mis-documentos", "我的文档")
            .await
    }

    pub async fn list_for_user(&self, user_id: i64) -> ApiResult<Vec<Document>> {
        self.api
            .get(&format!("/api/documentos/usuario/{}", user_id), "用户文档")
            .await
    }

    pub async fn delete(&self, document_id: i64) -> ApiResult<()> {
        let _: Value = self
            .api
            .delete(&format!("/api/documentos/{}", document_id), "删除文档")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn oversized_upload_is_rejected_locally() {
        let docs = DocumentApi::new(ApiClient::anonymous("http://127.0.0.1:9").unwrap());
        let file = FileUpload::new("big.pdf", vec![0; MAX_DOCUMENT_BYTES + 1], "application/pdf");
        assert!(matches!(docs.upload(file, None).await, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn list_mine_decodes_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/documentos/mis-documentos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "usuario_id": 5, "nombre": "apuntes.pdf", "url": "documentos/apuntes.pdf", "tamano": 2048}
            ])))
            .mount(&server)
            .await;

        let docs = DocumentApi::new(ApiClient::with_token(&server.uri(), "tok").unwrap());
        let list = docs.list_mine().await.unwrap();
        assert_eq!(list[0].name, "apuntes.pdf");
        assert_eq!(list[0].size_bytes, 2048);
    }
}
