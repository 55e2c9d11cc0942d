pub mod config;
pub mod engine;
pub mod options;
pub mod settings;

use anyhow::Result;

/// 鼠标左右手配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    /// 右手（左键为主键，系统默认）
    RightHanded,
    /// 左手（左右键交换）
    LeftHanded,
}

impl Handedness {
    /// 由系统的“按键是否交换”标志推出左右手
    pub fn from_swapped(swapped: bool) -> Self {
        if swapped {
            Self::LeftHanded
        } else {
            Self::RightHanded
        }
    }

    /// 外接鼠标存在时用左手，否则用右手
    pub fn for_external_mouse(external: bool) -> Self {
        Self::from_swapped(external)
    }

    pub fn is_left(self) -> bool {
        self == Self::LeftHanded
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::RightHanded => Self::LeftHanded,
            Self::LeftHanded => Self::RightHanded,
        }
    }

    /// 菜单上显示的名称
    pub fn label(self) -> &'static str {
        match self {
            Self::RightHanded => "Right-handed",
            Self::LeftHanded => "Left-handed",
        }
    }
}

/// 指针设备计数
///
/// 查询失败时返回 0，不向上报错。
pub trait DeviceCounter {
    fn count(&self) -> u32;
}

/// 左右手控制器
pub trait HandednessController {
    /// 读取系统当前状态
    fn current(&self) -> Handedness;

    /// 应用左右手设置（重复应用相同值无副作用）
    fn apply(&self, handedness: Handedness);

    /// 翻转当前状态
    fn toggle(&self) {
        self.apply(self.current().toggled());
    }
}

/// 状态变化通知（托盘图标等）
pub trait StateSink {
    fn state_changed(&self, handedness: Handedness);
}

/// 开机自启动 trait
pub trait AutoStart {
    /// 是否已启用自启动
    fn is_enabled(&self) -> bool;

    /// 设置自启动状态
    fn set_enabled(&self, enabled: bool) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggled_round_trips() {
        assert_eq!(Handedness::RightHanded.toggled(), Handedness::LeftHanded);
        assert_eq!(Handedness::LeftHanded.toggled(), Handedness::RightHanded);
    }

    #[test]
    fn test_external_mouse_means_left() {
        assert_eq!(Handedness::for_external_mouse(true), Handedness::LeftHanded);
        assert_eq!(Handedness::for_external_mouse(false), Handedness::RightHanded);
        assert!(Handedness::from_swapped(true).is_left());
    }
}
