use std::cell::RefCell;
use std::rc::{Rc, Weak};

use mouseflip_core::engine::{AutoSwitchEngine, TICK_INTERVAL};
use mouseflip_core::settings::FileSettingsStore;
use mouseflip_platform::windows::buttons::WinButtonSwap;
use mouseflip_platform::windows::devices::WinDeviceCounter;

use crate::tray::TraySink;

pub type Engine = AutoSwitchEngine<WinDeviceCounter, WinButtonSwap, FileSettingsStore, TraySink>;

/// 自动切换监控：引擎 + 事件循环上的 2 秒轮询计时器
///
/// 计时器与引擎运行在同一个 slint 事件循环线程，evaluate 天然串行。
pub struct AutoSwitch {
    engine: Rc<RefCell<Engine>>,
    timer: slint::Timer,
}

impl AutoSwitch {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Rc::new(RefCell::new(engine)),
            timer: slint::Timer::default(),
        }
    }

    pub fn engine(&self) -> &Rc<RefCell<Engine>> {
        &self.engine
    }

    /// 开始监控并立即同步一次
    pub fn start(&self) {
        self.engine.borrow_mut().start();
        self.sync_timer();
    }

    /// 停止监控，计时器同步取消
    pub fn stop(&self) {
        self.timer.stop();
        self.engine.borrow_mut().stop();
    }

    /// 让计时器与引擎状态保持一致（选项对话框直接修改引擎状态之后调用）
    pub fn sync_timer(&self) {
        let monitoring = self.engine.borrow().is_monitoring();

        if !monitoring {
            self.timer.stop();
            return;
        }
        if self.timer.running() {
            return;
        }

        let engine: Weak<RefCell<Engine>> = Rc::downgrade(&self.engine);
        self.timer.start(slint::TimerMode::Repeated, TICK_INTERVAL, move || {
            if let Some(engine) = engine.upgrade() {
                // 对话框回调持有借用时跳过本次，下一个周期再评估
                if let Ok(mut engine) = engine.try_borrow_mut() {
                    engine.evaluate();
                }
            }
        });
        log::debug!("轮询计时器已启动（{:?}）", TICK_INTERVAL);
    }
}

impl Drop for AutoSwitch {
    fn drop(&mut self) {
        self.timer.stop();
    }
}
