use crate::DeviceCounter;

use windows::Win32::UI::Input::{GetRawInputDeviceList, RAWINPUTDEVICELIST, RIM_TYPEMOUSE};

/// Windows 指针设备计数器（基于 GetRawInputDeviceList）
pub struct WinDeviceCounter;

impl Default for WinDeviceCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl WinDeviceCounter {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceCounter for WinDeviceCounter {
    fn count(&self) -> u32 {
        let entry_size = std::mem::size_of::<RAWINPUTDEVICELIST>() as u32;
        let mut num_devices = 0u32;

        unsafe {
            // 第一次调用只取设备数量
            if GetRawInputDeviceList(None, &mut num_devices, entry_size) != 0 {
                log::debug!("获取输入设备数量失败");
                return 0;
            }
            if num_devices == 0 {
                return 0;
            }

            let mut list = vec![RAWINPUTDEVICELIST::default(); num_devices as usize];
            let written = GetRawInputDeviceList(Some(list.as_mut_ptr()), &mut num_devices, entry_size);
            if written == u32::MAX {
                // 两次调用之间设备数量发生变化等情况，按 0 处理
                log::debug!("获取输入设备列表失败");
                return 0;
            }

            list.truncate(written as usize);
            list.iter()
                .filter(|device| device.dwType == RIM_TYPEMOUSE)
                .count() as u32
        }
    }
}
