//! 举报、隐藏与"不感兴趣" HTTP API 客户端

use crate::social::error::{ApiError, ApiResult};
use crate::social::http::ApiClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

/// 动态被服务器删除所需的累计举报数
///
/// 仅用于界面文案，是否删除以服务器返回的 `eliminada` 为准。
pub const ELIMINATION_THRESHOLD: u32 = 5;

/// 举报结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportOutcome {
    /// 本次举报后动态是否已被服务器删除
    #[serde(rename = "eliminada", alias = "eliminated", default)]
    pub eliminated: bool,
    #[serde(rename = "total_reportes", default)]
    pub report_count: u32,
    #[serde(alias = "mensaje", default)]
    pub message: Option<String>,
}

impl ReportOutcome {
    pub fn reports_until_elimination(&self) -> u32 {
        if self.eliminated {
            0
        } else {
            ELIMINATION_THRESHOLD.saturating_sub(self.report_count)
        }
    }
}

/// 我提交过的举报
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    #[serde(rename = "publicacion_id")]
    pub post_id: i64,
    #[serde(rename = "motivo")]
    pub reason: String,
    #[serde(rename = "descripcion", default)]
    pub details: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 隐藏/不感兴趣记录；旧接口只返回 `id`
#[derive(Debug, Deserialize)]
struct SuppressedPost {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    publicacion_id: Option<i64>,
}

impl SuppressedPost {
    fn post_id(&self) -> Option<i64> {
        self.publicacion_id.or(self.id)
    }
}

#[derive(Clone)]
pub struct ReportApi {
    api: ApiClient,
}

impl ReportApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// 举报动态，未选择原因时不发请求
    pub async fn create(&self, post_id: i64, reason: &str, details: Option<&str>) -> ApiResult<ReportOutcome> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ApiError::Validation(
                "Selecciona un motivo para el reporte".to_string(),
            ));
        }

        let outcome: ReportOutcome = self
            .api
            .post_json(
                "/api/reportes/crear",
                &serde_json::json!({
                    "publicacion_id": post_id,
                    "motivo": reason,
                    "descripcion": details.map(str::trim).filter(|d| !d.is_empty()),
                }),
                "举报动态",
            )
            .await?;

        info!(
            "[ReportAPI] ✅ 举报动态 {}，累计举报: {}, 已删除: {}",
            post_id, outcome.report_count, outcome.eliminated
        );
        Ok(outcome)
    }

    pub async fn my_reports(&self) -> ApiResult<Vec<Report>> {
        self.api
            .get("/api/reportes/mis-reportes", "我的举报")
            .await
    }

    /// 对自己隐藏动态
    pub async fn hide(&self, post_id: i64) -> ApiResult<()> {
        self.post_for_post("/api/reportes/ocultar", post_id, "隐藏动态")
            .await
    }

    /// 取消隐藏
    pub async fn unhide(&self, post_id: i64) -> ApiResult<()> {
        self.post_for_post("/api/reportes/mostrar", post_id, "取消隐藏")
            .await
    }

    /// 作者恢复自己被隐藏的动态
    pub async fn unhide_own(&self, post_id: i64) -> ApiResult<()> {
        self.post_for_post("/api/reportes/mostrar-propias", post_id, "恢复自己的动态")
            .await
    }

    pub async fn hidden_ids(&self) -> ApiResult<HashSet<i64>> {
        let posts: Vec<SuppressedPost> = self.api.get("/api/reportes/ocultas", "隐藏列表").await?;
        Ok(posts.iter().filter_map(SuppressedPost::post_id).collect())
    }

    pub async fn not_interested(&self, post_id: i64) -> ApiResult<()> {
        self.post_for_post("/api/reportes/no-interesa", post_id, "不感兴趣")
            .await
    }

    pub async fn not_interested_ids(&self) -> ApiResult<HashSet<i64>> {
        let posts: Vec<SuppressedPost> = self
            .api
            .get("/api/reportes/no-interesa", "不感兴趣列表")
            .await?;
        Ok(posts.iter().filter_map(SuppressedPost::post_id).collect())
    }

    async fn post_for_post(&self, path: &str, post_id: i64, operation: &str) -> ApiResult<()> {
        let _: Value = self
            .api
            .post_json(path, &serde_json::json!({ "publicacion_id": post_id }), operation)
            .await?;
        Ok(())
    }
}
