//! 双目录文件同步的计划统计与冲突处理
//!
//! 扫描器生成复制/删除动作后，由 [`PlanAccounting`] 检测双向冲突、统计写入与删除的
//! 字节数和两侧可用空间，并在用户逐项勾选时增量更新统计。

pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use crate::config::AccountingConfig;
pub use crate::core::{
    CancelCheck, ConflictGroup, CopyAction, DeleteAction, Direction, FileEntry, Location,
    PlanAccounting, PlanInput, PlanSummary, Side,
};
pub use crate::error::{PlanError, PlanResult};
