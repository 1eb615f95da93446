//! CampusNet CLI 客户端（测试版）
//!
//! 非交互式 CLI：登录后打印组装好的首页动态，然后持续监听通知推送。

use anyhow::{Context, Result};
use campusnet_sdk_core::{user_message, CampusClient, ClientConfig, Notification, NotificationListener};
use clap::Parser;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

/// CampusNet CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "campusnet-cli")]
#[command(about = "CampusNet CLI 客户端 - 登录、查看动态、监听通知", long_about = None)]
struct Args {
    /// 登录邮箱
    #[arg(short, long)]
    email: String,

    /// 登录密码
    #[arg(short, long)]
    password: String,

    /// 运行时长（秒），0 表示持续运行
    #[arg(short, long, default_value = "0")]
    duration: u64,

    /// 日志级别（默认: info,campusnet_sdk_core=debug）
    #[arg(long, default_value = "info,campusnet_sdk_core=debug")]
    log_level: String,
}

/// 初始化日志（同时输出到 stdout 和文件）
fn init_logger(log_level: &str) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .context("无法创建日志文件 debug.log")?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    // 文件不需要颜色
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("[CLI] 📝 日志已同时输出到控制台和文件: debug.log");
    Ok(())
}

struct CliNotificationListener;

#[async_trait::async_trait]
impl NotificationListener for CliNotificationListener {
    async fn on_new_notification(&self, notification: Notification) {
        info!(
            "[CLI/Notify] 🔔 {:?}: {}",
            notification.kind, notification.message
        );
    }

    async fn on_unread_count_changed(&self, total: u32) {
        info!("[CLI/Notify] 📬 未读通知: {}", total);
    }

    async fn on_connection_status_changed(&self, connected: bool, message: String) {
        if connected {
            info!("[CLI/Notify] 🔗 已连接: {}", message);
        } else {
            warn!("[CLI/Notify] 🔗 断开连接: {}", message);
        }
    }

    async fn on_session_expired(&self) {
        error!("[CLI/Notify] ⚠️ 会话已过期，请重新登录");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level)?;

    info!("[CLI] 🚀 CampusNet CLI 客户端（测试模式）");
    info!("[CLI] 📧 邮箱: {}", args.email);
    info!("[CLI] ⏱️  运行时长: {} 秒（0=持续运行）", args.duration);

    let mut client = CampusClient::new(ClientConfig::from_env()).await?;
    client.set_notification_listener(Arc::new(CliNotificationListener));

    let user = match client.login(&args.email, &args.password).await {
        Ok(user) => user,
        Err(e) => {
            error!("[CLI] ❌ {}", user_message(&e));
            return Err(e);
        }
    };
    info!("[CLI] ✅ 登录成功！{} (ID: {})", user.display_name(), user.id);

    let feed = client.load_feed().await?;
    info!("[CLI] 📰 首页动态（共 {} 条）:", feed.posts().len());
    for post in feed.posts() {
        let preview: String = post.content.chars().take(60).collect();
        info!(
            "[CLI]   #{} {} · {} | ❤️ {} 💬 {} | {}",
            post.id,
            post.author_name,
            post.relative_time,
            post.like_count,
            post.comment_count,
            preview
        );
    }

    match client.notifications().unread_count().await {
        Ok(unread) => info!("[CLI] 📬 未读通知: {}", unread),
        Err(e) => warn!("[CLI] 未读通知数获取失败: {}", e),
    }

    info!("[CLI] 📥 开始监听通知...");
    if args.duration > 0 {
        info!("[CLI] ⏰ {} 秒后自动退出", args.duration);
        sleep(Duration::from_secs(args.duration)).await;
    } else {
        info!("[CLI] ⏰ 持续运行中，按 Ctrl+C 退出");
        tokio::signal::ctrl_c().await.context("监听 Ctrl+C 失败")?;
    }

    client.logout().await?;
    info!("[CLI] 👋 程序退出");
    Ok(())
}
