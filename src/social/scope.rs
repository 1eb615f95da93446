//! 屏幕生命周期内的任务作用域
//!
//! 同一屏幕创建的所有后台任务共享一个取消信号，屏幕销毁时一次性全部取消。

use std::future::Future;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// 取消信号的接收端，可任意克隆
#[derive(Clone, Debug)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// 等待取消；作用域被丢弃也视为取消
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

pub struct ScreenScope {
    name: String,
    tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl ScreenScope {
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            name: name.into(),
            tx,
            handles: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// 在作用域内启动任务，取消时任务在下一个等待点被丢弃
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut signal = self.signal();
        let name = self.name.clone();
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(tokio::spawn(async move {
            tokio::select! {
                _ = signal.cancelled() => {
                    debug!("[Scope] {} 任务已取消", name);
                }
                _ = task => {}
            }
        }));
    }

    pub fn active_tasks(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// 取消所有任务并等待其退出
    pub async fn shutdown(mut self) {
        self.cancel();
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.cancel();
    }
}
