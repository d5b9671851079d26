//! 同步动作模型
//!
//! 扫描器生成动作列表后交给统计引擎；引擎只会修改 `selected` 和 `conflict`
//! 两个字段，其余字段在创建后保持不变。

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// 同步的一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    /// 对侧
    pub fn opposite(self) -> Side {
        match self {
            Side::Source => Side::Destination,
            Side::Destination => Side::Source,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Destination => write!(f, "destination"),
        }
    }
}

/// 复制方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// 备份：源 -> 目标
    ToDestination,
    /// 还原：目标 -> 源
    ToSource,
}

impl Direction {
    /// 写入的一侧，也是统计时累加的一侧
    pub fn target_side(self) -> Side {
        match self {
            Direction::ToDestination => Side::Destination,
            Direction::ToSource => Side::Source,
        }
    }
}

/// 删除发生的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    AtSource,
    AtDestination,
}

impl Location {
    pub fn side(self) -> Side {
        match self {
            Location::AtSource => Side::Source,
            Location::AtDestination => Side::Destination,
        }
    }
}

/// 文件引用：路径和字节长度
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// 从文件系统读取当前长度；文件不存在时长度为 0
    pub fn stat(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let size = match std::fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e),
        };
        Ok(Self { path, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// 一次计划中的文件复制
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyAction {
    /// 相对路径，在两棵树中标识同一个逻辑文件
    pub relative_path: String,
    /// 读取端（复制来源）
    pub source_file: FileEntry,
    /// 写入端（复制目标），新文件时长度为 0
    pub destination_file: FileEntry,
    pub direction: Direction,
    /// 目标不存在时为 true，覆盖已有文件时为 false
    pub is_new: bool,
    pub selected: bool,
    /// 冲突对端在复制动作列表中的下标
    pub conflict: Option<usize>,
}

impl CopyAction {
    pub fn new(
        relative_path: impl Into<String>,
        source_file: FileEntry,
        destination_file: FileEntry,
        direction: Direction,
        is_new: bool,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            source_file,
            destination_file,
            direction,
            is_new,
            selected: true,
            conflict: None,
        }
    }

    /// 设置初始选择状态
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn has_conflict(&self) -> bool {
        self.conflict.is_some()
    }

    /// 复制后写入端的长度
    pub fn new_size(&self) -> u64 {
        self.source_file.size
    }

    /// 被覆盖文件的当前长度
    pub fn old_size(&self) -> u64 {
        self.destination_file.size
    }
}

/// 一次计划中的文件删除
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAction {
    pub file: FileEntry,
    pub location: Location,
    pub selected: bool,
}

impl DeleteAction {
    pub fn new(file: FileEntry, location: Location) -> Self {
        Self {
            file,
            location,
            selected: true,
        }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn size(&self) -> u64 {
        self.file.size
    }
}
