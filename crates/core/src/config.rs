use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 是否根据外接鼠标自动切换左右手
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub auto_switch: bool,

    /// 常驻指针设备数量（如笔记本触控板），超过该数量即视为接入了外接鼠标
    #[serde(default = "default_base_device_count", deserialize_with = "lenient_count")]
    pub base_device_count: u32,
}

fn default_true() -> bool {
    true
}

fn default_base_device_count() -> u32 {
    1
}

/// 类型不对时回退到默认值，而不是让整个文件解析失败
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = toml::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or_else(default_true))
}

/// 非正数或类型不对时回退到 1
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = toml::Value::deserialize(deserializer)?;
    Ok(value
        .as_integer()
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_else(default_base_device_count))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auto_switch: default_true(),
            base_device_count: default_base_device_count(),
        }
    }
}

impl AppConfig {
    /// 获取配置文件路径
    /// - Windows: %APPDATA%/mouseflip/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("无法获取配置目录")?
            .join("mouseflip");

        Ok(config_dir.join("config.toml"))
    }

    /// 从指定文件加载，如果文件不存在则写入并返回默认配置
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        Self::read_from(path)
    }

    /// 只读加载：文件不存在时返回默认配置，不写入
    pub fn read_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| "配置文件格式错误")?;

        Ok(config)
    }

    /// 保存配置到指定文件
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("无法创建配置目录: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self)
            .context("配置序列化失败")?;

        fs::write(path, content)
            .with_context(|| format!("无法写入配置文件: {}", path.display()))?;

        log::debug!("配置已保存到: {}", path.display());
        Ok(())
    }
}
