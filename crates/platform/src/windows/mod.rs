pub mod autostart;
pub mod buttons;
pub mod devices;

/// Windows 平台实现集合
pub struct WinPlatform {
    pub devices: devices::WinDeviceCounter,
    pub buttons: buttons::WinButtonSwap,
    pub auto_start: autostart::WinAutoStart,
}

impl Default for WinPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl WinPlatform {
    pub fn new() -> Self {
        Self {
            devices: devices::WinDeviceCounter::new(),
            buttons: buttons::WinButtonSwap::new(),
            auto_start: autostart::WinAutoStart::new(),
        }
    }
}
