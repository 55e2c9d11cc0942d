use crate::{Handedness, HandednessController};

use windows::Win32::Foundation::BOOL;
use windows::Win32::UI::Input::KeyboardAndMouse::SwapMouseButton;
use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_SWAPBUTTON};

/// Windows 鼠标按键交换（基于 SwapMouseButton）
pub struct WinButtonSwap;

impl Default for WinButtonSwap {
    fn default() -> Self {
        Self::new()
    }
}

impl WinButtonSwap {
    pub fn new() -> Self {
        Self
    }
}

impl HandednessController for WinButtonSwap {
    fn current(&self) -> Handedness {
        let swapped = unsafe { GetSystemMetrics(SM_SWAPBUTTON) != 0 };
        Handedness::from_swapped(swapped)
    }

    fn apply(&self, handedness: Handedness) {
        unsafe {
            // 返回值只表示调用前的交换状态，不代表成功与否
            let _ = SwapMouseButton(BOOL::from(handedness.is_left()));
        }
        log::debug!("已应用 {}", handedness.label());
    }
}
