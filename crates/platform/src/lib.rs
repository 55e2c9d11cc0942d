#![allow(unexpected_cfgs)]

pub use mouseflip_core::{AutoStart, DeviceCounter, Handedness, HandednessController};

// 平台实现模块
#[cfg(target_os = "windows")]
pub mod windows;

// 平台工厂函数
#[cfg(target_os = "windows")]
pub fn create_platform() -> windows::WinPlatform {
    windows::WinPlatform::new()
}
