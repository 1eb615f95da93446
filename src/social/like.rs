//! 点赞 HTTP API 客户端

use crate::social::error::ApiResult;
use crate::social::http::ApiClient;
use serde::Deserialize;

/// 当前用户对某条动态的点赞状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LikeState {
    #[serde(alias = "dio_like", default)]
    pub liked: bool,
    #[serde(rename = "total_likes", alias = "total", default)]
    pub total: u32,
}

#[derive(Clone)]
pub struct LikeApi {
    api: ApiClient,
}

impl LikeApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// 点赞/取消点赞，返回切换后的状态
    pub async fn toggle(&self, post_id: i64) -> ApiResult<LikeState> {
        self.api
            .post_json(
                "/api/likes/toggle",
                &serde_json::json!({ "publicacion_id": post_id }),
                "切换点赞",
            )
            .await
    }

    pub async fn state(&self, post_id: i64) -> ApiResult<LikeState> {
        self.api
            .get(&format!("/api/likes/publicacion/{}", post_id), "点赞状态")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn toggle_sends_post_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/likes/toggle"))
            .and(body_json(serde_json::json!({"publicacion_id": 12})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"liked": true, "total_likes": 4})),
            )
            .mount(&server)
            .await;

        let likes = LikeApi::new(ApiClient::with_token(&server.uri(), "tok").unwrap());
        let state = likes.toggle(12).await.unwrap();
        assert_eq!(state, LikeState { liked: true, total: 4 });
    }
}
