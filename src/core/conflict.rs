//! 双向同步冲突检测
//!
//! 同一相对路径同时被排入两个方向的复制时视为冲突。每个动作最多只有一个冲突对端：
//! 三个及以上动作共享同一路径时，只有按顺序先配对的两个被关联，剩余的动作
//! 与后续同路径动作继续两两配对。这是已知限制，不做 N 路冲突处理。

use super::action::{CopyAction, Direction};
use super::cancel::CancelCheck;
use crate::error::{PlanError, PlanResult};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// 一对互相冲突的复制动作（下标指向复制动作列表）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictGroup {
    pub relative_path: String,
    pub first: usize,
    pub second: usize,
    /// 被默认取消选择的一方
    pub deselected: usize,
}

impl ConflictGroup {
    /// 给定组内一方，返回另一方
    pub fn partner_of(&self, index: usize) -> Option<usize> {
        if index == self.first {
            Some(self.second)
        } else if index == self.second {
            Some(self.first)
        } else {
            None
        }
    }

    /// 默认保留选择的一方
    pub fn kept(&self) -> usize {
        if self.deselected == self.first {
            self.second
        } else {
            self.first
        }
    }
}

/// 检测冲突并就地关联、取消选择
///
/// 对每个尚未关联的动作 A，取其后第一个尚未关联且相对路径相同的动作 B 配对。
/// 配对后取消选择方向为 `ToDestination` 的一方（A 优先），默认保留还原方向。
/// 每处理一个动作检查一次取消。
pub fn detect_conflicts(
    actions: &mut [CopyAction],
    cancel: &dyn CancelCheck,
    progress_interval: usize,
) -> PlanResult<Vec<ConflictGroup>> {
    // 相对路径 -> 等待配对的最早动作
    let mut pending: HashMap<&str, usize> = HashMap::new();
    let mut pairs = Vec::new();

    for (index, action) in actions.iter().enumerate() {
        if cancel.is_cancelled() {
            debug!("冲突检测在第 {} 个动作处取消", index);
            return Err(PlanError::OperationCancelled);
        }
        if progress_interval > 0 && index > 0 && index % progress_interval == 0 {
            debug!("冲突检测进度: {}/{}", index, actions.len());
        }
        if action.conflict.is_some() {
            continue;
        }

        match pending.remove(action.relative_path.as_str()) {
            Some(first) => pairs.push((first, index)),
            None => {
                pending.insert(action.relative_path.as_str(), index);
            }
        }
    }
    drop(pending);

    let mut groups = Vec::with_capacity(pairs.len());
    for (first, second) in pairs {
        actions[first].conflict = Some(second);
        actions[second].conflict = Some(first);

        let deselected = if actions[first].direction == Direction::ToDestination {
            first
        } else {
            second
        };
        actions[deselected].selected = false;

        debug!(
            "发现冲突: {} ({} <-> {}), 取消选择 {}",
            actions[first].relative_path, first, second, deselected
        );

        groups.push(ConflictGroup {
            relative_path: actions[first].relative_path.clone(),
            first,
            second,
            deselected,
        });
    }

    Ok(groups)
}
