//! 关注关系 HTTP API 客户端

use crate::social::error::ApiResult;
use crate::social::http::ApiClient;
use crate::social::user::User;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

/// 与某个用户之间的关注状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FollowStatus {
    /// 我是否关注了对方
    #[serde(rename = "siguiendo", default)]
    pub following: bool,
    /// 对方是否关注了我
    #[serde(rename = "te_sigue", default)]
    pub follows_back: bool,
}

/// 关注相关的 HTTP API 客户端
#[derive(Clone)]
pub struct FollowApi {
    api: ApiClient,
}

impl FollowApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn follow(&self, user_id: i64) -> ApiResult<()> {
        let _: Value = self
            .api
            .post_json(
                &format!("/api/seguidores/seguir/{}", user_id),
                &serde_json::json!({}),
                "关注用户",
            )
            .await?;
        Ok(())
    }

    pub async fn unfollow(&self, user_id: i64) -> ApiResult<()> {
        let _: Value = self
            .api
            .delete(
                &format!("/api/seguidores/dejar-de-seguir/{}", user_id),
                "取消关注",
            )
            .await?;
        Ok(())
    }

    /// 用户关注的人
    pub async fn following(&self, user_id: i64) -> ApiResult<Vec<User>> {
        self.api
            .get_list(&format!("/api/seguidores/siguiendo/{}", user_id), "关注列表")
            .await
    }

    /// 用户的粉丝
    pub async fn followers(&self, user_id: i64) -> ApiResult<Vec<User>> {
        self.api
            .get_list(&format!("/api/seguidores/seguidores/{}", user_id), "粉丝列表")
            .await
    }

    /// 关注列表的用户 ID 集合（用于动态过滤）
    pub async fn following_ids(&self, user_id: i64) -> ApiResult<HashSet<i64>> {
        let ids: HashSet<i64> = self
            .following(user_id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();
        info!("[FollowAPI] ✅ 关注人数: {}", ids.len());
        Ok(ids)
    }

    pub async fn status(&self, user_id: i64) -> ApiResult<FollowStatus> {
        self.api
            .get(&format!("/api/seguidores/estado/{}", user_id), "关注状态")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn following_ids_collects_user_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/seguidores/siguiendo/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 7, "nombre_usuario": "b"},
                {"id": 8, "nombre_usuario": "c"}
            ])))
            .mount(&server)
            .await;

        let follows = FollowApi::new(ApiClient::with_token(&server.uri(), "tok").unwrap());
        let ids = follows.following_ids(5).await.unwrap();
        assert_eq!(ids, HashSet::from([7, 8]));
    }

    #[tokio::test]
    async fn status_defaults_missing_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/seguidores/estado/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"siguiendo": true})))
            .mount(&server)
            .await;

        let follows = FollowApi::new(ApiClient::with_token(&server.uri(), "tok").unwrap());
        let status = follows.status(7).await.unwrap();
        assert!(status.following);
        assert!(!status.follows_back);
    }
}
