use anyhow::{bail, Result};
use std::cell::Cell;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

/// 自动切换相关的持久化设置
///
/// 读取永不失败：缺失或损坏的值回退到默认值。
/// 写入失败以 `Err` 返回，由调用方以非致命提示的形式展示。
pub trait SettingsStore {
    /// 默认 true
    fn auto_switch_enabled(&self) -> bool;

    fn set_auto_switch_enabled(&mut self, enabled: bool) -> Result<()>;

    /// 默认 1，始终 >= 1
    fn base_device_count(&self) -> u32;

    /// 小于 1 的值直接拒绝，不做任何写入
    fn set_base_device_count(&mut self, count: i64) -> Result<()>;
}

/// 基于 TOML 配置文件的设置存储
///
/// 每次读取都重新加载文件，保证引擎拿到的是最新的持久化值。
/// 读取路径只读不写；默认配置文件只在 [`FileSettingsStore::open`] 时写入一次。
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    /// 上一次读取是否失败，连续失败只警告一次
    read_failed: Cell<bool>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_failed: Cell::new(false),
        }
    }

    /// 打开存储，文件不存在时写入默认配置。写入失败不致命，后续读取回退到默认值
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = Self::new(path);
        if let Err(e) = AppConfig::load_from(&store.path) {
            log::warn!("无法初始化配置文件，使用默认值: {:#}", e);
        }
        store
    }

    /// 使用默认配置路径
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(AppConfig::config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> AppConfig {
        match AppConfig::read_from(&self.path) {
            Ok(config) => {
                self.read_failed.set(false);
                config
            }
            Err(e) => {
                if self.read_failed.replace(true) {
                    log::debug!("读取配置仍然失败: {:#}", e);
                } else {
                    log::warn!("读取配置失败，使用默认值: {:#}", e);
                }
                AppConfig::default()
            }
        }
    }

    fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.read();
        change(&mut config);
        config.save_to(&self.path)
    }
}

impl SettingsStore for FileSettingsStore {
    fn auto_switch_enabled(&self) -> bool {
        self.read().auto_switch
    }

    fn set_auto_switch_enabled(&mut self, enabled: bool) -> Result<()> {
        self.update(|config| config.auto_switch = enabled)?;
        log::info!("自动切换: {}", enabled);
        Ok(())
    }

    fn base_device_count(&self) -> u32 {
        self.read().base_device_count
    }

    fn set_base_device_count(&mut self, count: i64) -> Result<()> {
        if count < 1 {
            bail!("基准设备数必须至少为 1（收到 {}）", count);
        }
        let count = u32::try_from(count)?;

        self.update(|config| config.base_device_count = count)?;
        log::info!("基准设备数: {}", count);
        Ok(())
    }
}
