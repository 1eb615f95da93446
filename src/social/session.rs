//! 本地会话存储
//!
//! token 与用户信息保存在 SQLite 中，表结构由 `migrations/` 下的 sqlx 迁移管理。

use crate::social::user::User;
use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use tracing::{debug, info, warn};

/// 已登录会话
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// 创建 SQLite 连接池并执行所有未执行的迁移
pub async fn create_sqlite_pool_with_migration(db_url: &str) -> Result<Pool<Sqlite>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context(format!("连接SQLite数据库失败: {}", db_url))?;

    sqlx::migrate!().run(&pool).await.context("执行数据库迁移失败")?;

    Ok(pool)
}

/// 会话 DAO
#[derive(Clone)]
pub struct SessionStore {
    db: Pool<Sqlite>,
}

impl SessionStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn open(db_url: &str) -> Result<Self> {
        Ok(Self::new(create_sqlite_pool_with_migration(db_url).await?))
    }

    /// 保存会话（覆盖旧会话）
    pub async fn save(&self, session: &Session) -> Result<()> {
        let user_json = serde_json::to_string(&session.user).context("序列化用户信息失败")?;
        sqlx::query(
            r#"
            INSERT INTO local_session (id, token, user_json, saved_at)
            VALUES (1, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                token = excluded.token,
                user_json = excluded.user_json,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(&session.token)
        .bind(&user_json)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.db)
        .await
        .context("保存会话失败")?;

        info!("[SessionDAO] 💾 会话已保存，用户ID: {}", session.user.id);
        Ok(())
    }

    /// 读取会话；用户信息损坏时视为无会话
    pub async fn load(&self) -> Result<Option<Session>> {
        let row = sqlx::query("SELECT token, user_json FROM local_session WHERE id = 1")
            .fetch_optional(&self.db)
            .await
            .context("查询会话失败")?;

        let Some(row) = row else {
            debug!("[SessionDAO] 本地无会话");
            return Ok(None);
        };

        let token: String = row.get("token");
        let user_json: String = row.get("user_json");
        match serde_json::from_str::<User>(&user_json) {
            Ok(user) => Ok(Some(Session { token, user })),
            Err(e) => {
                warn!("[SessionDAO] 缓存的用户信息无法解析，忽略会话: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM local_session")
            .execute(&self.db)
            .await
            .context("清除会话失败")?;
        info!("[SessionDAO] 🗑️ 会话已清除");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(id: i64) -> User {
        serde_json::from_value(serde_json::json!({"id": id, "nombre_usuario": "ana"})).unwrap()
    }

    async fn temp_store(dir: &tempfile::TempDir) -> SessionStore {
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("session.db").display());
        SessionStore::open(&url).await.unwrap()
    }

    #[tokio::test]
    async fn save_load_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir).await;
        assert_eq!(store.load().await.unwrap(), None);

        let first = Session { token: "t1".to_string(), user: sample_user(1) };
        store.save(&first).await.unwrap();
        let second = Session { token: "t2".to_string(), user: sample_user(2) };
        store.save(&second).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(second));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
