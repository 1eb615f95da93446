//! HTTP 基础设施
//!
//! 所有服务共用一个 [`ApiClient`]：认证头通过 `default_headers` 统一注入，
//! 响应统一经过 [`handle_http_response`] 归类为 [`ApiError`]。

use crate::social::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 反序列化数组字段，处理 null 值
pub(crate) fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 反序列化标量字段，null 视为默认值
pub(crate) fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let opt = Option::<T>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 列表响应：先按原始 JSON 取出，再逐条解析
#[derive(Deserialize)]
struct ListBody(#[serde(deserialize_with = "deserialize_vec_or_null")] Vec<Value>);

/// 待上传的文件（图片或文档）
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mime: mime.into(),
        }
    }

    pub(crate) fn into_part(self) -> ApiResult<Part> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)?)
    }
}

/// 带认证的 REST 客户端
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    authenticated: bool,
}

impl ApiClient {
    /// 未登录状态的客户端（登录、注册、公开动态）
    pub fn anonymous(base_url: &str) -> ApiResult<Self> {
        Self::build(base_url, None)
    }

    /// 携带 `Authorization: Bearer <token>` 的客户端
    pub fn with_token(base_url: &str, token: &str) -> ApiResult<Self> {
        Self::build(base_url, Some(token))
    }

    fn build(base_url: &str, token: Option<&str>) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::Validation("token 含有非法字符".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authenticated: token.is_some(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, operation: &str) -> ApiResult<T> {
        self.send(self.client.get(self.url(path)), operation).await
    }

    /// 获取列表；单条记录解析失败只丢弃该条，不影响整个列表
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
    ) -> ApiResult<Vec<T>> {
        let ListBody(items) = self.get(path, operation).await?;
        Ok(decode_items(items, operation))
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q, operation: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.client.get(self.url(path)).query(query), operation)
            .await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B, operation: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.client.post(self.url(path)).json(body), operation)
            .await
    }

    pub async fn put_json<T, B>(&self, path: &str, body: &B, operation: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.client.put(self.url(path)).json(body), operation)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, operation: &str) -> ApiResult<T> {
        self.send(self.client.delete(self.url(path)), operation)
            .await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        operation: &str,
    ) -> ApiResult<T> {
        self.send(self.client.post(self.url(path)).multipart(form), operation)
            .await
    }

    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        operation: &str,
    ) -> ApiResult<T> {
        self.send(self.client.put(self.url(path)).multipart(form), operation)
            .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> ApiResult<T> {
        let request_id = Uuid::new_v4().to_string();
        info!("[HTTP] 📡 {}", operation);
        debug!("[HTTP]   requestID: {}", request_id);

        let response = request
            .header("X-Request-ID", &request_id)
            .send()
            .await
            .map_err(|e| {
                error!("[HTTP] {}请求失败: {}", operation, e);
                ApiError::Network(e)
            })?;

        handle_http_response(response, operation).await
    }
}

/// 通用 HTTP 响应处理：状态码归类 + 反序列化
pub async fn handle_http_response<T: DeserializeOwned>(
    response: reqwest::Response,
    operation_name: &str,
) -> ApiResult<T> {
    let status = response.status();

    // body 只能读取一次
    let body_bytes = response.bytes().await?;
    let body_str = String::from_utf8_lossy(&body_bytes);
    debug!("[HTTP] {}响应 Body: {}", operation_name, body_str);

    if !status.is_success() {
        error!(
            "[HTTP] {}请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, body_str
        );
        return Err(error_from_status(status.as_u16(), &body_bytes));
    }

    decode_body(&body_bytes).map_err(|e| {
        error!(
            "[HTTP] {}反序列化失败: {:?}\n原始响应: {}",
            operation_name, e, body_str
        );
        e
    })
}

/// 解析响应体，兼容裸 JSON 与 `{ "data": ... }` 包装两种格式；空 body 视为 null
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body)?
    };

    if let Some(data) = value.get("data").filter(|d| !d.is_null()) {
        if let Ok(decoded) = T::deserialize(data) {
            return Ok(decoded);
        }
    }
    Ok(serde_json::from_value(value)?)
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>, operation: &str) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("[HTTP] {}跳过无法解析的记录: {}", operation, e);
                None
            }
        })
        .collect();
    if decoded.len() < total {
        warn!("[HTTP] {}共丢弃 {} 条记录", operation, total - decoded.len());
    }
    decoded
}

pub(crate) fn error_from_status(status: u16, body: &[u8]) -> ApiError {
    match status {
        401 => ApiError::Unauthorized,
        400..=499 => match extract_message(body) {
            Some(message) => ApiError::Rejected { status, message },
            None => ApiError::Http {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            },
        },
        _ => ApiError::Http {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

fn extract_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "mensaje", "error", "msg"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    #[test]
    fn decode_accepts_bare_and_wrapped_bodies() {
        let bare: Vec<Item> = decode_body(br#"[{"id":1},{"id":2}]"#).unwrap();
        let wrapped: Vec<Item> = decode_body(br#"{"success":true,"data":[{"id":1},{"id":2}]}"#).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn decode_empty_body_as_null() {
        let value: Value = decode_body(b"").unwrap();
        assert!(value.is_null());
        let _unit: () = decode_body(b"  ").unwrap();
    }

    #[test]
    fn status_mapping() {
        assert!(error_from_status(401, b"{}").is_unauthorized());
        match error_from_status(409, r#"{"mensaje":"Ya reportaste esta publicación"}"#.as_bytes()) {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Ya reportaste esta publicación");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            error_from_status(500, br#"{"message":"boom"}"#),
            ApiError::Http { status: 500, .. }
        ));
        assert!(matches!(
            error_from_status(404, b"not found"),
            ApiError::Http { status: 404, .. }
        ));
    }

    #[tokio::test]
    async fn bearer_token_is_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("Authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 7})))
            .mount(&server)
            .await;

        let api = ApiClient::with_token(&server.uri(), "tok-123").unwrap();
        let item: Item = api.get("/api/auth/me", "当前用户").await.unwrap();
        assert_eq!(item, Item { id: 7 });
        assert!(api.is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_response_maps_to_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/publicaciones"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let api = ApiClient::anonymous(&server.uri()).unwrap();
        let err = api
            .get::<Vec<Item>>("/api/publicaciones", "动态")
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn list_skips_malformed_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/comentarios"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 1}, {"id": "x"}, {"id": 3}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/vacio"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let api = ApiClient::anonymous(&server.uri()).unwrap();
        let items: Vec<Item> = api.get_list("/api/comentarios", "评论").await.unwrap();
        assert_eq!(items, vec![Item { id: 1 }, Item { id: 3 }]);
        let empty: Vec<Item> = api.get_list("/api/vacio", "空列表").await.unwrap();
        assert!(empty.is_empty());
    }

    #[derive(Debug, Default, Deserialize)]
    struct Counts {
        #[serde(default, deserialize_with = "deserialize_null_default")]
        likes: u32,
        #[serde(default, deserialize_with = "deserialize_vec_or_null")]
        tags: Vec<String>,
    }

    #[test]
    fn null_fields_fall_back_to_default() {
        let counts: Counts = serde_json::from_str(r#"{"likes":null,"tags":null}"#).unwrap();
        assert_eq!(counts.likes, 0);
        assert!(counts.tags.is_empty());
        let missing: Counts = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.likes, 0);
    }
}
