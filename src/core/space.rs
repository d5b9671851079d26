//! 可用空间读取

use std::io;
use std::path::{Path, PathBuf};

/// 可用空间提供者
pub trait FreeSpaceProvider {
    /// 返回指定根目录所在卷的可用字节数
    fn available_space(&self, root: &Path) -> io::Result<u64>;
}

/// 读取本地文件系统的可用空间
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskSpace;

impl FreeSpaceProvider for DiskSpace {
    fn available_space(&self, root: &Path) -> io::Result<u64> {
        fs2::available_space(root)
    }
}

/// 固定的可用空间，用于测试或无法读取卷信息的存储
#[derive(Debug, Clone)]
pub struct FixedSpace {
    source_root: PathBuf,
    source: u64,
    destination: u64,
}

impl FixedSpace {
    /// `source_root` 返回 `source`，其余路径返回 `destination`
    pub fn new(source_root: impl Into<PathBuf>, source: u64, destination: u64) -> Self {
        Self {
            source_root: source_root.into(),
            source,
            destination,
        }
    }
}

impl FreeSpaceProvider for FixedSpace {
    fn available_space(&self, root: &Path) -> io::Result<u64> {
        if root == self.source_root.as_path() {
            Ok(self.source)
        } else {
            Ok(self.destination)
        }
    }
}
