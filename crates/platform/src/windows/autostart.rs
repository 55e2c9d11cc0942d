use anyhow::{Context, Result};

use crate::AutoStart;

use windows::core::{w, HSTRING, PCWSTR};
use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
use windows::Win32::System::Registry::{
    RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY,
    HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_SAM_FLAGS, REG_SZ, REG_VALUE_TYPE,
};

const RUN_KEY: PCWSTR = w!("Software\\Microsoft\\Windows\\CurrentVersion\\Run");
const VALUE_NAME: &str = "MouseFlip";

/// Windows 自启动管理器（基于 HKCU\...\Run 注册表项）
pub struct WinAutoStart;

impl Default for WinAutoStart {
    fn default() -> Self {
        Self::new()
    }
}

impl WinAutoStart {
    pub fn new() -> Self {
        Self
    }
}

/// 打开的注册表键，离开作用域时关闭
struct RunKey(HKEY);

impl RunKey {
    fn open(access: REG_SAM_FLAGS) -> windows::core::Result<Self> {
        let mut hkey = HKEY::default();
        unsafe { RegOpenKeyExW(HKEY_CURRENT_USER, RUN_KEY, 0, access, &mut hkey).ok()? };
        Ok(Self(hkey))
    }
}

impl Drop for RunKey {
    fn drop(&mut self) {
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

impl AutoStart for WinAutoStart {
    fn is_enabled(&self) -> bool {
        let Ok(key) = RunKey::open(KEY_READ) else {
            return false;
        };

        let name = HSTRING::from(VALUE_NAME);
        let mut value_type = REG_VALUE_TYPE::default();
        let status = unsafe {
            RegQueryValueExW(key.0, &name, None, Some(&mut value_type), None, None)
        };

        status == ERROR_SUCCESS && value_type == REG_SZ
    }

    fn set_enabled(&self, enabled: bool) -> Result<()> {
        let name = HSTRING::from(VALUE_NAME);

        if enabled {
            let exe_path = std::env::current_exe()
                .context("获取当前程序路径失败")?;

            let exe_str = exe_path
                .to_str()
                .context("程序路径转换失败")?;

            // REG_SZ 需要以 NUL 结尾的 UTF-16 字节
            let bytes: Vec<u8> = exe_str
                .encode_utf16()
                .chain(std::iter::once(0))
                .flat_map(u16::to_le_bytes)
                .collect();

            let key = RunKey::open(KEY_WRITE).context("打开 Run 注册表项失败")?;
            unsafe { RegSetValueExW(key.0, &name, 0, REG_SZ, Some(bytes.as_slice())).ok() }
                .context("写入自启动注册表值失败")?;

            log::info!("已添加开机自启动: {}", exe_str);
        } else {
            let key = match RunKey::open(KEY_WRITE) {
                Ok(key) => key,
                // Run 键不存在，值自然也不存在
                Err(e) if e.code() == ERROR_FILE_NOT_FOUND.to_hresult() => return Ok(()),
                Err(e) => return Err(e).context("打开 Run 注册表项失败"),
            };

            let status = unsafe { RegDeleteValueW(key.0, &name) };
            if status != ERROR_SUCCESS && status != ERROR_FILE_NOT_FOUND {
                status.ok().context("删除自启动注册表值失败")?;
            }

            log::info!("已移除开机自启动");
        }

        Ok(())
    }
}
