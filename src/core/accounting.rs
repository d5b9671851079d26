//! 计划统计引擎
//!
//! 持有一批已规划的复制/删除动作，在构建时完成冲突检测和全量统计，
//! 之后界面层每次切换单个动作的选择状态时调用增量方法更新统计。
//!
//! 动作列表由调用方所有，引擎在生命周期内借用并且是 `selected`、`conflict`
//! 两个字段的唯一写入者。引擎不做内部加锁，多线程切换需要在外部对整个引擎互斥。
//! 任何增量方法执行后，统计值必须与对同一选择状态执行 [`PlanAccounting::recompute_all`]
//! 的结果完全一致。

use super::action::{CopyAction, DeleteAction, Side};
use super::cancel::CancelCheck;
use super::conflict::{detect_conflicts, ConflictGroup};
use super::space::{DiskSpace, FreeSpaceProvider};
use super::summary::PlanSummary;
use super::totals::{sub_count, sub_size, DerivedTotals, SideDerived, SideSizes, SizeTotals};
use crate::config::AccountingConfig;
use crate::error::{PlanError, PlanResult};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// 构建引擎所需的输入
pub struct PlanInput<'a> {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub corrupt_source: Vec<PathBuf>,
    pub corrupt_destination: Vec<PathBuf>,
    pub lost: Vec<PathBuf>,
    pub copy_actions: &'a mut [CopyAction],
    pub delete_actions: &'a mut [DeleteAction],
    /// 是否为还原方向的运行
    pub restore: bool,
    /// 是否双向同步
    pub bidirectional: bool,
}

impl<'a> PlanInput<'a> {
    pub fn new(
        source_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
        copy_actions: &'a mut [CopyAction],
        delete_actions: &'a mut [DeleteAction],
    ) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            corrupt_source: Vec::new(),
            corrupt_destination: Vec::new(),
            lost: Vec::new(),
            copy_actions,
            delete_actions,
            restore: false,
            bidirectional: false,
        }
    }

    pub fn restore(mut self, restore: bool) -> Self {
        self.restore = restore;
        self
    }

    pub fn bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }

    /// 设置损坏/丢失文件列表
    pub fn damaged_files(
        mut self,
        corrupt_source: Vec<PathBuf>,
        corrupt_destination: Vec<PathBuf>,
        lost: Vec<PathBuf>,
    ) -> Self {
        self.corrupt_source = corrupt_source;
        self.corrupt_destination = corrupt_destination;
        self.lost = lost;
        self
    }
}

/// 计划统计引擎
pub struct PlanAccounting<'a> {
    source_root: PathBuf,
    destination_root: PathBuf,
    copy_actions: &'a mut [CopyAction],
    delete_actions: &'a mut [DeleteAction],
    conflicts: Vec<ConflictGroup>,
    corrupt_source: Vec<PathBuf>,
    corrupt_destination: Vec<PathBuf>,
    lost: Vec<PathBuf>,
    restore: bool,
    bidirectional: bool,
    totals: SizeTotals,
    derived: DerivedTotals,
    copy_selected: usize,
    delete_selected: usize,
    free_space_source: Option<u64>,
    free_space_destination: Option<u64>,
    free_space_read_at: DateTime<Utc>,
    cancel: &'a dyn CancelCheck,
    config: AccountingConfig,
}

impl<'a> PlanAccounting<'a> {
    /// 使用本地磁盘空间和默认配置构建
    pub fn new(input: PlanInput<'a>, cancel: &'a dyn CancelCheck) -> PlanResult<Self> {
        Self::with_options(input, cancel, &DiskSpace, AccountingConfig::default())
    }

    /// 构建引擎：冲突检测（仅双向）、全量统计、读取两侧可用空间
    ///
    /// 构建过程中任何时刻检测到取消都会返回 [`PlanError::OperationCancelled`]。
    pub fn with_options(
        input: PlanInput<'a>,
        cancel: &'a dyn CancelCheck,
        space: &dyn FreeSpaceProvider,
        config: AccountingConfig,
    ) -> PlanResult<Self> {
        let start = Instant::now();
        let PlanInput {
            source_root,
            destination_root,
            corrupt_source,
            corrupt_destination,
            lost,
            copy_actions,
            delete_actions,
            restore,
            bidirectional,
        } = input;

        debug!(
            "构建同步计划统计: {} 个复制, {} 个删除, 还原={}, 双向={}",
            copy_actions.len(),
            delete_actions.len(),
            restore,
            bidirectional
        );

        let conflicts = if bidirectional {
            detect_conflicts(copy_actions, cancel, config.progress_log_interval)?
        } else {
            Vec::new()
        };

        let mut plan = Self {
            source_root,
            destination_root,
            copy_actions,
            delete_actions,
            conflicts,
            corrupt_source,
            corrupt_destination,
            lost,
            restore,
            bidirectional,
            totals: SizeTotals::default(),
            derived: DerivedTotals::default(),
            copy_selected: 0,
            delete_selected: 0,
            free_space_source: None,
            free_space_destination: None,
            free_space_read_at: Utc::now(),
            cancel,
            config,
        };

        plan.recompute_all()?;
        plan.read_free_space(space);

        info!(
            "同步计划统计完成: 选中复制 {} 个, 选中删除 {} 个, 冲突 {} 个, 总写入 {} 字节, 耗时 {:?}",
            plan.copy_selected,
            plan.delete_selected,
            plan.conflicts.len(),
            plan.derived.total_update_size,
            start.elapsed()
        );

        Ok(plan)
    }

    fn read_free_space(&mut self, space: &dyn FreeSpaceProvider) {
        let read = |root: &Path| match space.available_space(root) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("读取可用空间失败: {:?}: {}", root, e);
                None
            }
        };
        self.free_space_source = read(&self.source_root);
        self.free_space_destination = read(&self.destination_root);
        self.free_space_read_at = Utc::now();
    }

    /// 按当前选择状态重新计算全部统计
    ///
    /// 取消后返回错误，此时统计值不再有效，调用方应丢弃引擎实例。
    pub fn recompute_all(&mut self) -> PlanResult<()> {
        let mut totals = SizeTotals::default();
        let mut copy_selected = 0usize;
        let mut delete_selected = 0usize;
        let interval = self.config.progress_log_interval;

        for (index, action) in self.copy_actions.iter().enumerate() {
            if self.cancel.is_cancelled() {
                debug!("全量统计在第 {} 个复制动作处取消", index);
                return Err(PlanError::OperationCancelled);
            }
            if interval > 0 && index > 0 && index % interval == 0 {
                debug!("复制动作统计进度: {}/{}", index, self.copy_actions.len());
            }
            if !action.selected {
                continue;
            }

            copy_selected += 1;
            let sizes = totals.side_mut(action.direction.target_side());
            if action.is_new {
                sizes.new_size += action.new_size();
            } else {
                sizes.modified_size += action.new_size();
                sizes.modified_old_size += action.old_size();
            }
        }

        for (index, action) in self.delete_actions.iter().enumerate() {
            if self.cancel.is_cancelled() {
                debug!("全量统计在第 {} 个删除动作处取消", index);
                return Err(PlanError::OperationCancelled);
            }
            if interval > 0 && index > 0 && index % interval == 0 {
                debug!("删除动作统计进度: {}/{}", index, self.delete_actions.len());
            }

            let side = action.location.side();
            if action.selected {
                delete_selected += 1;
                totals.side_mut(side).delete_size += action.size();
            } else if !self.restore {
                // 跳过的删除等价于在对侧新增该文件
                copy_selected += 1;
                totals.side_mut(side.opposite()).new_size += action.size();
            }
        }

        self.totals = totals;
        self.copy_selected = copy_selected;
        self.delete_selected = delete_selected;
        self.derive_aggregates();
        Ok(())
    }

    fn derive_aggregates(&mut self) {
        self.derived = self.totals.derive();
    }

    // ============ 增量更新 ============

    /// 新增一个选中的新文件复制
    pub fn add_new_file(&mut self, side: Side, len: u64) {
        self.totals.side_mut(side).new_size += len;
        self.copy_selected += 1;
        self.derive_aggregates();
    }

    pub fn remove_new_file(&mut self, side: Side, len: u64) {
        sub_size(&mut self.totals.side_mut(side).new_size, len);
        sub_count(&mut self.copy_selected);
        self.derive_aggregates();
    }

    /// 新增一个选中的修改文件复制，`old_len` 为被覆盖文件的长度
    pub fn add_modified_file(&mut self, side: Side, len: u64, old_len: u64) {
        let sizes = self.totals.side_mut(side);
        sizes.modified_size += len;
        sizes.modified_old_size += old_len;
        self.copy_selected += 1;
        self.derive_aggregates();
    }

    pub fn remove_modified_file(&mut self, side: Side, len: u64, old_len: u64) {
        let sizes = self.totals.side_mut(side);
        sub_size(&mut sizes.modified_size, len);
        sub_size(&mut sizes.modified_old_size, old_len);
        sub_count(&mut self.copy_selected);
        self.derive_aggregates();
    }

    /// 选中一个删除
    ///
    /// 非还原运行中，未选中的删除被统计为对侧的新文件，因此选中时要同时撤销那部分。
    pub fn add_delete(&mut self, side: Side, len: u64) {
        self.totals.side_mut(side).delete_size += len;
        self.delete_selected += 1;
        if !self.restore {
            sub_size(&mut self.totals.side_mut(side.opposite()).new_size, len);
            sub_count(&mut self.copy_selected);
        }
        self.derive_aggregates();
    }

    pub fn remove_delete(&mut self, side: Side, len: u64) {
        sub_size(&mut self.totals.side_mut(side).delete_size, len);
        sub_count(&mut self.delete_selected);
        if !self.restore {
            self.totals.side_mut(side.opposite()).new_size += len;
            self.copy_selected += 1;
        }
        self.derive_aggregates();
    }

    /// 切换复制动作的选择状态，返回状态是否改变
    pub fn set_copy_selected(&mut self, index: usize, selected: bool) -> bool {
        let Some(action) = self.copy_actions.get_mut(index) else {
            warn!("复制动作下标越界: {} (共 {} 个)", index, self.copy_actions.len());
            return false;
        };
        if action.selected == selected {
            return false;
        }
        action.selected = selected;

        let side = action.direction.target_side();
        let (is_new, len, old_len) = (action.is_new, action.new_size(), action.old_size());
        match (is_new, selected) {
            (true, true) => self.add_new_file(side, len),
            (true, false) => self.remove_new_file(side, len),
            (false, true) => self.add_modified_file(side, len, old_len),
            (false, false) => self.remove_modified_file(side, len, old_len),
        }
        true
    }

    /// 切换删除动作的选择状态，返回状态是否改变
    pub fn set_delete_selected(&mut self, index: usize, selected: bool) -> bool {
        let Some(action) = self.delete_actions.get_mut(index) else {
            warn!("删除动作下标越界: {} (共 {} 个)", index, self.delete_actions.len());
            return false;
        };
        if action.selected == selected {
            return false;
        }
        action.selected = selected;

        let (side, len) = (action.location.side(), action.size());
        if selected {
            self.add_delete(side, len);
        } else {
            self.remove_delete(side, len);
        }
        true
    }

    // ============ 查询 ============

    pub fn totals(&self) -> &SizeTotals {
        &self.totals
    }

    pub fn derived(&self) -> &DerivedTotals {
        &self.derived
    }

    pub fn sizes(&self, side: Side) -> &SideSizes {
        self.totals.side(side)
    }

    pub fn side_derived(&self, side: Side) -> &SideDerived {
        self.derived.side(side)
    }

    pub fn new_size(&self, side: Side) -> u64 {
        self.sizes(side).new_size
    }

    pub fn modified_size(&self, side: Side) -> u64 {
        self.sizes(side).modified_size
    }

    pub fn modified_old_size(&self, side: Side) -> u64 {
        self.sizes(side).modified_old_size
    }

    pub fn delete_size(&self, side: Side) -> u64 {
        self.sizes(side).delete_size
    }

    pub fn modified_delta(&self, side: Side) -> i64 {
        self.side_derived(side).modified_delta
    }

    pub fn update_size(&self, side: Side) -> u64 {
        self.side_derived(side).update_size
    }

    pub fn net_sum(&self, side: Side) -> i64 {
        self.side_derived(side).net_sum
    }

    pub fn total_update_size(&self) -> u64 {
        self.derived.total_update_size
    }

    pub fn copy_actions_selected(&self) -> usize {
        self.copy_selected
    }

    pub fn delete_actions_selected(&self) -> usize {
        self.delete_selected
    }

    /// 构建时读取的可用空间，读取失败时为 `None`
    pub fn free_space(&self, side: Side) -> Option<u64> {
        match side {
            Side::Source => self.free_space_source,
            Side::Destination => self.free_space_destination,
        }
    }

    pub fn free_space_read_at(&self) -> DateTime<Utc> {
        self.free_space_read_at
    }

    /// 执行后剩余的可用空间：可用空间 - 净变化
    pub fn headroom(&self, side: Side) -> Option<i64> {
        let free = i64::try_from(self.free_space(side)?).unwrap_or(i64::MAX);
        Some(free.saturating_sub(self.net_sum(side)))
    }

    /// 两侧剩余空间是否都不低于安全余量；无法读取的一侧不参与判断
    pub fn has_enough_space(&self) -> bool {
        let margin = i64::try_from(self.config.free_space_margin()).unwrap_or(i64::MAX);
        [Side::Source, Side::Destination]
            .into_iter()
            .filter_map(|side| self.headroom(side))
            .all(|headroom| headroom >= margin)
    }

    pub fn root(&self, side: Side) -> &Path {
        match side {
            Side::Source => &self.source_root,
            Side::Destination => &self.destination_root,
        }
    }

    pub fn corrupt_files(&self, side: Side) -> &[PathBuf] {
        match side {
            Side::Source => &self.corrupt_source,
            Side::Destination => &self.corrupt_destination,
        }
    }

    pub fn lost_files(&self) -> &[PathBuf] {
        &self.lost
    }

    pub fn copy_actions(&self) -> &[CopyAction] {
        self.copy_actions
    }

    pub fn delete_actions(&self) -> &[DeleteAction] {
        self.delete_actions
    }

    pub fn conflicts(&self) -> &[ConflictGroup] {
        &self.conflicts
    }

    pub fn conflict_partner(&self, index: usize) -> Option<usize> {
        self.copy_actions.get(index)?.conflict
    }

    pub fn is_restore(&self) -> bool {
        self.restore
    }

    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    /// 是否有需要展示的内容
    pub fn has_anything(&self) -> bool {
        !self.corrupt_source.is_empty()
            || !self.corrupt_destination.is_empty()
            || !self.lost.is_empty()
            || !self.copy_actions.is_empty()
            || !self.delete_actions.is_empty()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// 是否存在损坏或丢失的文件
    pub fn has_damaged_files(&self) -> bool {
        !self.corrupt_source.is_empty()
            || !self.corrupt_destination.is_empty()
            || !self.lost.is_empty()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            source_root: self.source_root.clone(),
            destination_root: self.destination_root.clone(),
            restore: self.restore,
            bidirectional: self.bidirectional,
            totals: self.totals,
            derived: self.derived,
            copy_actions: self.copy_actions.len(),
            copy_actions_selected: self.copy_selected,
            delete_actions: self.delete_actions.len(),
            delete_actions_selected: self.delete_selected,
            conflicts: self.conflicts.len(),
            corrupt_source_files: self.corrupt_source.len(),
            corrupt_destination_files: self.corrupt_destination.len(),
            lost_files: self.lost.len(),
            has_damaged_files: self.has_damaged_files(),
            free_space_source: self.free_space_source,
            free_space_destination: self.free_space_destination,
            headroom_source: self.headroom(Side::Source),
            headroom_destination: self.headroom(Side::Destination),
            enough_space: self.has_enough_space(),
            free_space_read_at: self.free_space_read_at,
        }
    }
}
