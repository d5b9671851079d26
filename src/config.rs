//! 应用配置模块

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub(crate) const CONFIG_FILE: &str = "config.json";

/// 计划统计配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountingConfig {
    /// 可用空间检查的安全余量（MB）
    #[serde(default = "default_free_space_margin_mb")]
    pub free_space_margin_mb: u64,
    /// 长循环每处理多少个动作输出一次进度日志，0 表示不输出
    #[serde(default = "default_progress_log_interval")]
    pub progress_log_interval: usize,
}

fn default_free_space_margin_mb() -> u64 {
    100
}

fn default_progress_log_interval() -> usize {
    10_000
}

impl Default for AccountingConfig {
    fn default() -> Self {
        Self {
            free_space_margin_mb: default_free_space_margin_mb(),
            progress_log_interval: default_progress_log_interval(),
        }
    }
}

impl AccountingConfig {
    /// 安全余量（字节）
    pub fn free_space_margin(&self) -> u64 {
        self.free_space_margin_mb.saturating_mul(1024 * 1024)
    }

    /// 从配置文件加载，缺失或损坏时使用默认值
    pub fn load(config_dir: &Path) -> Self {
        load_section(config_dir, "accounting").unwrap_or_default()
    }

    /// 保存到配置文件，保留其他配置项
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        save_section(config_dir, "accounting", self)
    }
}

/// 读取 config.json 中的一个配置项
pub(crate) fn load_section<T: DeserializeOwned>(config_dir: &Path, key: &str) -> Option<T> {
    let content = fs::read_to_string(config_dir.join(CONFIG_FILE)).ok()?;
    let config = serde_json::from_str::<serde_json::Value>(&content).ok()?;
    let section = config.get(key)?.clone();
    match serde_json::from_value(section) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("配置项 {} 无效，使用默认值: {}", key, e);
            None
        }
    }
}

/// 写入 config.json 中的一个配置项
pub(crate) fn save_section<T: Serialize>(config_dir: &Path, key: &str, value: &T) -> Result<()> {
    let config_file = config_dir.join(CONFIG_FILE);

    // 读取现有配置
    let mut config: serde_json::Value = if config_file.exists() {
        let content = fs::read_to_string(&config_file)
            .with_context(|| format!("读取配置文件失败: {:?}", config_file))?;
        serde_json::from_str(&content).unwrap_or_else(|_| serde_json::json!({}))
    } else {
        serde_json::json!({})
    };
    if !config.is_object() {
        config = serde_json::json!({});
    }

    config[key] = serde_json::to_value(value)?;

    fs::create_dir_all(config_dir)
        .with_context(|| format!("创建配置目录失败: {:?}", config_dir))?;
    fs::write(&config_file, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("写入配置文件失败: {:?}", config_file))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AccountingConfig::load(dir.path()), AccountingConfig::default());
    }

    #[test]
    fn test_save_keeps_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"data_path": "/tmp/x", "accounting": {"freeSpaceMarginMb": 1}}"#,
        )
        .unwrap();

        let mut config = AccountingConfig::load(dir.path());
        assert_eq!(config.free_space_margin_mb, 1);
        assert_eq!(config.progress_log_interval, 10_000);

        config.progress_log_interval = 0;
        config.save(dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(raw["data_path"], "/tmp/x");
        assert_eq!(raw["accounting"]["progressLogInterval"], 0);
        assert_eq!(AccountingConfig::load(dir.path()), config);
    }

    #[test]
    fn test_malformed_section_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"accounting": {"freeSpaceMarginMb": "lots"}}"#,
        )
        .unwrap();
        assert_eq!(AccountingConfig::load(dir.path()).free_space_margin(), 100 * 1024 * 1024);
    }
}
