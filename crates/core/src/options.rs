//! 选项对话框的数据与确认逻辑
//!
//! 界面层只负责展示 [`OptionsSnapshot`] 并收集 [`OptionsForm`]，
//! 校验与逐项写入都在这里完成，便于脱离界面测试。

use std::fmt;

use crate::engine::AutoSwitchEngine;
use crate::settings::SettingsStore;
use crate::{AutoStart, DeviceCounter, HandednessController, StateSink};

/// 打开对话框时展示的当前值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsSnapshot {
    pub startup_enabled: bool,
    pub auto_switch_enabled: bool,
    pub detected_devices: u32,
    pub base_device_count: u32,
}

impl OptionsSnapshot {
    pub fn capture<D, H, S, N, A>(engine: &AutoSwitchEngine<D, H, S, N>, autostart: &A) -> Self
    where
        D: DeviceCounter,
        H: HandednessController,
        S: SettingsStore,
        N: StateSink,
        A: AutoStart,
    {
        Self {
            startup_enabled: autostart.is_enabled(),
            auto_switch_enabled: engine.settings().auto_switch_enabled(),
            detected_devices: engine.detected_devices(),
            base_device_count: engine.settings().base_device_count(),
        }
    }

    /// 以快照初始化表单
    pub fn to_form(&self) -> OptionsForm {
        OptionsForm {
            startup_enabled: self.startup_enabled,
            auto_switch_enabled: self.auto_switch_enabled,
            base_device_count: self.base_device_count.to_string(),
        }
    }
}

/// 用户点击确定时提交的值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsForm {
    pub startup_enabled: bool,
    pub auto_switch_enabled: bool,
    /// 输入框原文
    pub base_device_count: String,
}

/// 校验失败：不做任何写入，对话框保持打开
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError;

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Base device count must be at least 1.")
    }
}

impl std::error::Error for ValidationError {}

/// 单项设置写入失败，非致命
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsWarning {
    Startup,
    AutoSwitch,
    BaseDeviceCount,
}

impl OptionsWarning {
    pub fn message(self) -> &'static str {
        match self {
            Self::Startup => "Failed to update startup settings. Please check your permissions.",
            Self::AutoSwitch => {
                "Failed to update auto-switch settings. Please check your permissions."
            }
            Self::BaseDeviceCount => {
                "Failed to update base mouse count. Please check your permissions."
            }
        }
    }
}

impl fmt::Display for OptionsWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl OptionsForm {
    /// 解析基准设备数，空值、非数字、超出 u32 范围或小于 1 均视为无效
    pub fn validate(&self) -> Result<u32, ValidationError> {
        match self.base_device_count.trim().parse::<u32>() {
            Ok(count) if count >= 1 => Ok(count),
            _ => Err(ValidationError),
        }
    }
}

/// 应用选项
///
/// 三项设置依次独立写入，任一项失败只产生一条警告，不影响其余项。
pub fn apply_options<D, H, S, N, A>(
    form: &OptionsForm,
    engine: &mut AutoSwitchEngine<D, H, S, N>,
    autostart: &A,
) -> Result<Vec<OptionsWarning>, ValidationError>
where
    D: DeviceCounter,
    H: HandednessController,
    S: SettingsStore,
    N: StateSink,
    A: AutoStart,
{
    let base_count = form.validate()?;
    let mut warnings = Vec::new();

    if let Err(e) = autostart.set_enabled(form.startup_enabled) {
        log::error!("设置开机自启动失败: {:#}", e);
        warnings.push(OptionsWarning::Startup);
    }

    match engine.settings_mut().set_auto_switch_enabled(form.auto_switch_enabled) {
        Ok(()) => {
            if form.auto_switch_enabled {
                engine.start();
            } else {
                engine.stop();
            }
        }
        Err(e) => {
            log::error!("保存自动切换设置失败: {:#}", e);
            warnings.push(OptionsWarning::AutoSwitch);
        }
    }

    match engine.settings_mut().set_base_device_count(i64::from(base_count)) {
        Ok(()) => {
            if form.auto_switch_enabled {
                engine.evaluate();
            }
        }
        Err(e) => {
            log::error!("保存基准设备数失败: {:#}", e);
            warnings.push(OptionsWarning::BaseDeviceCount);
        }
    }

    Ok(warnings)
}
