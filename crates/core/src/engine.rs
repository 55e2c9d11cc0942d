use std::time::Duration;

use crate::settings::SettingsStore;
use crate::{DeviceCounter, Handedness, HandednessController, StateSink};

/// 自动切换的轮询间隔
pub const TICK_INTERVAL: Duration = Duration::from_millis(2000);

/// 自动切换引擎
///
/// 根据指针设备数量推断外接鼠标是否存在，仅在状态真正变化时
/// 应用左右手设置并通知界面。轮询计时器由调用方在同一事件循环上驱动，
/// 引擎本身只维护 Stopped / Monitoring 两个状态。
pub struct AutoSwitchEngine<D, H, S, N> {
    devices: D,
    controller: H,
    settings: S,
    sink: N,
    /// 上一次观察到的外接鼠标状态；None 表示未在监控
    last_external: Option<bool>,
}

impl<D, H, S, N> AutoSwitchEngine<D, H, S, N>
where
    D: DeviceCounter,
    H: HandednessController,
    S: SettingsStore,
    N: StateSink,
{
    pub fn new(devices: D, controller: H, settings: S, sink: N) -> Self {
        Self {
            devices,
            controller,
            settings,
            sink,
            last_external: None,
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.last_external.is_some()
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    /// 当前检测到的指针设备数量
    pub fn detected_devices(&self) -> u32 {
        self.devices.count()
    }

    /// 设备数超过基准数即视为接入了外接鼠标（严格大于）
    pub fn detect_external(&self) -> bool {
        self.devices.count() > self.settings.base_device_count()
    }

    /// 进入监控状态并立即同步一次
    ///
    /// 首次进入时把记忆状态设为当前检测结果的反值，使随后的 evaluate
    /// 必然观察到“变化”，从而强制应用一次正确的左右手设置。
    /// 已在监控时只重新评估，不重置记忆状态。
    pub fn start(&mut self) -> Option<Handedness> {
        if self.last_external.is_none() {
            let external = self.detect_external();
            self.last_external = Some(!external);
            log::info!("自动切换监控已启动");
        }
        self.evaluate()
    }

    /// 停止监控，丢弃运行时状态
    pub fn stop(&mut self) {
        if self.last_external.take().is_some() {
            log::info!("自动切换监控已停止");
        }
    }

    /// 评估一次外接鼠标状态，发生变化时应用并返回新的左右手设置
    pub fn evaluate(&mut self) -> Option<Handedness> {
        let last = self.last_external?;

        let detected = self.devices.count();
        let base = self.settings.base_device_count();
        let external = detected > base;

        if external == last {
            log::debug!("设备数 {} / 基准 {}，状态未变化", detected, base);
            return None;
        }

        self.last_external = Some(external);
        let handedness = Handedness::for_external_mouse(external);
        log::info!(
            "外接鼠标{}（设备数 {} / 基准 {}），切换为 {}",
            if external { "已连接" } else { "已断开" },
            detected,
            base,
            handedness.label(),
        );
        self.apply_and_notify(handedness);
        Some(handedness)
    }

    /// 手动设置左右手
    ///
    /// 不修改记忆的外接鼠标状态：手动选择会一直保留到下一次真正的状态变化。
    pub fn set_handedness(&mut self, handedness: Handedness) {
        log::info!("手动切换为 {}", handedness.label());
        self.apply_and_notify(handedness);
    }

    /// 手动翻转左右手（托盘图标双击）
    pub fn toggle(&mut self) -> Handedness {
        let handedness = self.controller.current().toggled();
        self.set_handedness(handedness);
        handedness
    }

    fn apply_and_notify(&self, handedness: Handedness) {
        self.controller.apply(handedness);
        self.sink.state_changed(self.controller.current());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Default)]
    pub(crate) struct FakeDevices(pub Rc<Cell<u32>>);

    impl DeviceCounter for FakeDevices {
        fn count(&self) -> u32 {
            self.0.get()
        }
    }

    #[derive(Clone)]
    pub(crate) struct FakeController {
        pub state: Rc<Cell<Handedness>>,
        pub applied: Rc<RefCell<Vec<Handedness>>>,
    }

    impl FakeController {
        pub fn new(initial: Handedness) -> Self {
            Self {
                state: Rc::new(Cell::new(initial)),
                applied: Rc::default(),
            }
        }
    }

    impl HandednessController for FakeController {
        fn current(&self) -> Handedness {
            self.state.get()
        }

        fn apply(&self, handedness: Handedness) {
            self.state.set(handedness);
            self.applied.borrow_mut().push(handedness);
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeSink(pub Rc<RefCell<Vec<Handedness>>>);

    impl StateSink for FakeSink {
        fn state_changed(&self, handedness: Handedness) {
            self.0.borrow_mut().push(handedness);
        }
    }

    pub(crate) struct MemorySettings {
        pub auto_switch: bool,
        pub base: u32,
        pub fail_writes: bool,
    }

    impl Default for MemorySettings {
        fn default() -> Self {
            Self {
                auto_switch: true,
                base: 1,
                fail_writes: false,
            }
        }
    }

    impl SettingsStore for MemorySettings {
        fn auto_switch_enabled(&self) -> bool {
            self.auto_switch
        }

        fn set_auto_switch_enabled(&mut self, enabled: bool) -> Result<()> {
            if self.fail_writes {
                bail!("access denied");
            }
            self.auto_switch = enabled;
            Ok(())
        }

        fn base_device_count(&self) -> u32 {
            self.base
        }

        fn set_base_device_count(&mut self, count: i64) -> Result<()> {
            if count < 1 {
                bail!("base count must be at least 1");
            }
            if self.fail_writes {
                bail!("access denied");
            }
            self.base = count as u32;
            Ok(())
        }
    }

    pub(crate) type TestEngine =
        AutoSwitchEngine<FakeDevices, FakeController, MemorySettings, FakeSink>;

    pub(crate) struct Harness {
        pub devices: Rc<Cell<u32>>,
        pub controller: FakeController,
        pub sink: Rc<RefCell<Vec<Handedness>>>,
        pub engine: TestEngine,
    }

    pub(crate) fn harness(detected: u32, base: u32, initial: Handedness) -> Harness {
        let devices = FakeDevices::default();
        devices.0.set(detected);
        let controller = FakeController::new(initial);
        let sink = FakeSink::default();
        let settings = MemorySettings {
            base,
            ..MemorySettings::default()
        };
        Harness {
            devices: devices.0.clone(),
            controller: controller.clone(),
            sink: sink.0.clone(),
            engine: AutoSwitchEngine::new(devices, controller, settings, sink),
        }
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        for (detected, base, expected) in [
            (0, 1, Handedness::RightHanded),
            (1, 1, Handedness::RightHanded),
            (2, 1, Handedness::LeftHanded),
            (2, 2, Handedness::RightHanded),
            (3, 2, Handedness::LeftHanded),
            (0, 0, Handedness::RightHanded),
            (1, 0, Handedness::LeftHanded),
        ] {
            let mut h = harness(detected, base, expected.toggled());
            assert_eq!(h.engine.start(), Some(expected), "{detected}/{base}");
            assert_eq!(h.controller.current(), expected);
        }
    }

    #[test]
    fn test_start_forces_sync_even_when_already_correct() {
        let mut h = harness(0, 1, Handedness::RightHanded);
        assert_eq!(h.engine.start(), Some(Handedness::RightHanded));
        assert_eq!(*h.controller.applied.borrow(), vec![Handedness::RightHanded]);
        assert_eq!(*h.sink.borrow(), vec![Handedness::RightHanded]);
    }

    #[test]
    fn test_start_heals_stale_left_handed_state() {
        let mut h = harness(0, 1, Handedness::LeftHanded);
        h.engine.start();
        assert_eq!(h.controller.current(), Handedness::RightHanded);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let mut h = harness(3, 1, Handedness::RightHanded);
        h.engine.start();
        assert_eq!(h.engine.evaluate(), None);
        assert_eq!(h.engine.evaluate(), None);
        assert_eq!(h.controller.applied.borrow().len(), 1);
        assert_eq!(h.sink.borrow().len(), 1);
    }

    #[test]
    fn test_tick_sequence_notifies_only_on_crossings() {
        let mut h = harness(1, 1, Handedness::LeftHanded);

        // 第 1 次：启动时的强制同步
        assert_eq!(h.engine.start(), Some(Handedness::RightHanded));
        h.sink.borrow_mut().clear();

        let mut results = Vec::new();
        for detected in [1, 3, 3, 1] {
            h.devices.set(detected);
            results.push(h.engine.evaluate());
        }

        assert_eq!(
            results,
            vec![
                None,
                Some(Handedness::LeftHanded),
                None,
                Some(Handedness::RightHanded),
            ]
        );
        assert_eq!(
            *h.sink.borrow(),
            vec![Handedness::LeftHanded, Handedness::RightHanded]
        );
    }

    #[test]
    fn test_apply_and_notify_always_paired() {
        let mut h = harness(1, 1, Handedness::RightHanded);
        h.engine.start();
        for detected in [2, 2, 0, 5, 5, 1] {
            h.devices.set(detected);
            h.engine.evaluate();
        }
        assert_eq!(*h.controller.applied.borrow(), *h.sink.borrow());
    }

    #[test]
    fn test_evaluate_when_stopped_does_nothing() {
        let mut h = harness(5, 1, Handedness::RightHanded);
        assert!(!h.engine.is_monitoring());
        assert_eq!(h.engine.evaluate(), None);
        assert!(h.controller.applied.borrow().is_empty());
        assert!(h.sink.borrow().is_empty());
    }

    #[test]
    fn test_restart_forces_sync_again() {
        let mut h = harness(3, 1, Handedness::RightHanded);
        h.engine.start();
        h.engine.stop();
        assert!(!h.engine.is_monitoring());

        assert_eq!(h.engine.start(), Some(Handedness::LeftHanded));
        assert_eq!(h.controller.applied.borrow().len(), 2);
        assert_eq!(h.sink.borrow().len(), 2);
    }

    #[test]
    fn test_start_while_monitoring_keeps_memory() {
        let mut h = harness(3, 1, Handedness::RightHanded);
        h.engine.start();
        assert_eq!(h.engine.start(), None);
        assert_eq!(h.controller.applied.borrow().len(), 1);
    }

    #[test]
    fn test_base_count_change_is_picked_up() {
        let mut h = harness(2, 1, Handedness::RightHanded);
        assert_eq!(h.engine.start(), Some(Handedness::LeftHanded));

        h.engine.settings_mut().set_base_device_count(2).unwrap();
        assert_eq!(h.engine.evaluate(), Some(Handedness::RightHanded));
    }

    #[test]
    fn test_toggle_notifies_sink() {
        let mut h = harness(0, 1, Handedness::RightHanded);
        assert_eq!(h.engine.toggle(), Handedness::LeftHanded);
        assert_eq!(h.controller.current(), Handedness::LeftHanded);
        assert_eq!(*h.sink.borrow(), vec![Handedness::LeftHanded]);
    }

    // 已知行为：监控期间的手动切换不会与记忆状态对账。
    // 外接状态不变时手动选择一直保留，下一次真正的状态变化才会覆盖它。
    #[test]
    fn test_manual_override_is_not_reconciled() {
        let mut h = harness(3, 1, Handedness::RightHanded);
        h.engine.start();
        assert_eq!(h.controller.current(), Handedness::LeftHanded);

        h.engine.toggle();
        assert_eq!(h.controller.current(), Handedness::RightHanded);

        assert_eq!(h.engine.evaluate(), None);
        assert_eq!(h.controller.current(), Handedness::RightHanded);

        h.devices.set(1);
        assert_eq!(h.engine.evaluate(), Some(Handedness::RightHanded));
        h.devices.set(3);
        assert_eq!(h.engine.evaluate(), Some(Handedness::LeftHanded));
    }

    #[test]
    fn test_query_failure_reads_as_no_external_mouse() {
        // 设备查询失败时计数为 0，等同于没有外接鼠标
        let mut h = harness(0, 1, Handedness::LeftHanded);
        h.engine.start();
        assert_eq!(h.controller.current(), Handedness::RightHanded);
        assert!(!h.engine.detect_external());
    }

    #[test]
    fn test_tick_interval_is_two_seconds() {
        assert_eq!(TICK_INTERVAL, Duration::from_secs(2));
    }
}
