//! 单条动态的隐藏/举报/不感兴趣状态机
//!
//! `Visible → Pending → RemovedLocally`。隐藏与不感兴趣是乐观更新：发起即本地移除，
//! 服务器失败也不回滚，本次会话内保持移除，下次完整加载时以服务器为准。
//! 举报只有在服务器确认删除时才本地移除，失败或未达阈值则回到 `Visible`。

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressionAction {
    Hide,
    Report,
    NotInterested,
}

impl SuppressionAction {
    /// 发起时是否立即从本地列表移除
    pub fn is_optimistic(&self) -> bool {
        !matches!(self, SuppressionAction::Report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionState {
    Visible,
    Pending(SuppressionAction),
    RemovedLocally(SuppressionAction),
}

/// 服务器调用结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded { eliminated: bool },
    Failed,
}

/// 状态转换对本地列表的影响
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// 立即从本地列表移除
    Remove,
    /// 保留在列表中
    Keep,
    /// 动作被忽略（已有进行中的动作或已移除）
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct SuppressionTracker {
    states: HashMap<i64, SuppressionState>,
}

impl SuppressionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, post_id: i64) -> SuppressionState {
        self.states
            .get(&post_id)
            .copied()
            .unwrap_or(SuppressionState::Visible)
    }

    pub fn is_removed(&self, post_id: i64) -> bool {
        matches!(self.state(post_id), SuppressionState::RemovedLocally(_))
    }

    pub fn begin(&mut self, post_id: i64, action: SuppressionAction) -> Transition {
        if self.state(post_id) != SuppressionState::Visible {
            return Transition::Ignored;
        }
        if action.is_optimistic() {
            self.states
                .insert(post_id, SuppressionState::RemovedLocally(action));
            Transition::Remove
        } else {
            self.states.insert(post_id, SuppressionState::Pending(action));
            Transition::Keep
        }
    }

    pub fn complete(&mut self, post_id: i64, outcome: ActionOutcome) -> Transition {
        match (self.state(post_id), outcome) {
            // 乐观动作已经移除，结果不影响本地状态
            (SuppressionState::RemovedLocally(_), _) => Transition::Keep,
            (SuppressionState::Pending(action), ActionOutcome::Succeeded { eliminated: true }) => {
                self.states
                    .insert(post_id, SuppressionState::RemovedLocally(action));
                Transition::Remove
            }
            (SuppressionState::Pending(_), _) => {
                self.states.remove(&post_id);
                Transition::Keep
            }
            (SuppressionState::Visible, _) => Transition::Ignored,
        }
    }
}
