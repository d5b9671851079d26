//! 计划摘要 - 发送给界面层的只读快照

use super::action::Side;
use super::totals::{DerivedTotals, SizeTotals};
use chrono::{DateTime, Utc};
use indicatif::HumanBytes;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// 计划统计快照
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub restore: bool,
    pub bidirectional: bool,
    pub totals: SizeTotals,
    pub derived: DerivedTotals,
    pub copy_actions: usize,
    pub copy_actions_selected: usize,
    pub delete_actions: usize,
    pub delete_actions_selected: usize,
    pub conflicts: usize,
    pub corrupt_source_files: usize,
    pub corrupt_destination_files: usize,
    pub lost_files: usize,
    pub has_damaged_files: bool,
    pub free_space_source: Option<u64>,
    pub free_space_destination: Option<u64>,
    pub headroom_source: Option<i64>,
    pub headroom_destination: Option<i64>,
    pub enough_space: bool,
    /// 可用空间的读取时间
    pub free_space_read_at: DateTime<Utc>,
}

impl PlanSummary {
    pub fn free_space(&self, side: Side) -> Option<u64> {
        match side {
            Side::Source => self.free_space_source,
            Side::Destination => self.free_space_destination,
        }
    }

    pub fn headroom(&self, side: Side) -> Option<i64> {
        match side {
            Side::Source => self.headroom_source,
            Side::Destination => self.headroom_destination,
        }
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "复制 {}/{} 个, 删除 {}/{} 个, 冲突 {} 个",
            self.copy_actions_selected,
            self.copy_actions,
            self.delete_actions_selected,
            self.delete_actions,
            self.conflicts
        )?;
        writeln!(f, "总写入: {}", format_bytes(self.derived.total_update_size))?;
        for side in [Side::Source, Side::Destination] {
            let sizes = self.totals.side(side);
            let derived = self.derived.side(side);
            let free = self
                .free_space(side)
                .map(format_bytes)
                .unwrap_or_else(|| "未知".to_string());
            writeln!(
                f,
                "{}: 新增 {}, 修改 {} ({}), 删除 {}, 净变化 {}, 可用 {}",
                side,
                format_bytes(sizes.new_size),
                format_bytes(sizes.modified_size),
                format_signed_bytes(derived.modified_delta),
                format_bytes(sizes.delete_size),
                format_signed_bytes(derived.net_sum),
                free
            )?;
        }
        if self.has_damaged_files {
            writeln!(
                f,
                "损坏文件: 源 {} 个, 目标 {} 个; 丢失文件 {} 个",
                self.corrupt_source_files, self.corrupt_destination_files, self.lost_files
            )?;
        }
        if !self.enough_space {
            writeln!(f, "警告: 可用空间不足")?;
        }
        Ok(())
    }
}

/// 格式化字节数（二进制单位）
pub fn format_bytes(bytes: u64) -> String {
    HumanBytes(bytes).to_string()
}

/// 格式化带符号的字节数（净变化）
pub fn format_signed_bytes(bytes: i64) -> String {
    if bytes < 0 {
        format!("-{}", format_bytes(bytes.unsigned_abs()))
    } else {
        format!("+{}", format_bytes(bytes as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GiB");
    }

    #[test]
    fn test_format_signed_bytes() {
        assert_eq!(format_signed_bytes(200), "+200 B");
        assert_eq!(format_signed_bytes(-2048), "-2.00 KiB");
        assert_eq!(format_signed_bytes(0), "+0 B");
    }
}
