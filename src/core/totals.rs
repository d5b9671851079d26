//! 字节统计累加器
//!
//! 八个基础累加值按侧（源/目标）和类别（新增、修改、被覆盖的旧大小、删除）划分。
//! 所有派生值只能由 [`SizeTotals::derive`] 计算，不允许单独修改。

use super::action::Side;
use serde::Serialize;

/// 单侧的基础累加值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSizes {
    pub new_size: u64,
    pub modified_size: u64,
    pub modified_old_size: u64,
    pub delete_size: u64,
}

/// 单侧的派生值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideDerived {
    /// 修改文件的大小变化：modified - modified_old
    pub modified_delta: i64,
    /// 需要写入的字节：new + modified
    pub update_size: u64,
    /// 执行后该侧的净变化：update - modified_old - delete
    pub net_sum: i64,
}

/// 整个计划的派生值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedTotals {
    pub source: SideDerived,
    pub destination: SideDerived,
    pub total_update_size: u64,
}

impl DerivedTotals {
    pub fn side(&self, side: Side) -> &SideDerived {
        match side {
            Side::Source => &self.source,
            Side::Destination => &self.destination,
        }
    }
}

/// 基础累加值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeTotals {
    pub source: SideSizes,
    pub destination: SideSizes,
}

impl SizeTotals {
    pub fn side(&self, side: Side) -> &SideSizes {
        match side {
            Side::Source => &self.source,
            Side::Destination => &self.destination,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideSizes {
        match side {
            Side::Source => &mut self.source,
            Side::Destination => &mut self.destination,
        }
    }

    /// 由基础值计算全部派生值
    pub fn derive(&self) -> DerivedTotals {
        let source = derive_side(&self.source);
        let destination = derive_side(&self.destination);
        DerivedTotals {
            total_update_size: source.update_size + destination.update_size,
            source,
            destination,
        }
    }
}

fn derive_side(sizes: &SideSizes) -> SideDerived {
    let update_size = sizes.new_size + sizes.modified_size;
    SideDerived {
        modified_delta: signed(sizes.modified_size) - signed(sizes.modified_old_size),
        update_size,
        net_sum: signed(update_size) - signed(sizes.modified_old_size) - signed(sizes.delete_size),
    }
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// 累加器的减法。没有对应的加法就调用减法属于调用方的逻辑错误。
pub(crate) fn sub_size(acc: &mut u64, len: u64) {
    debug_assert!(*acc >= len, "累加值下溢: {} - {}", acc, len);
    *acc = acc.saturating_sub(len);
}

pub(crate) fn sub_count(acc: &mut usize) {
    debug_assert!(*acc > 0, "计数下溢");
    *acc = acc.saturating_sub(1);
}
