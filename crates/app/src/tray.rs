use anyhow::{Context, Result};
use muda::{CheckMenuItem, Menu, MenuItem, PredefinedMenuItem};
use slint::ComponentHandle;
use tray_icon::{menu::MenuEvent, Icon, TrayIcon, TrayIconBuilder, TrayIconEvent};

use mouseflip_core::options::{apply_options, OptionsForm, OptionsSnapshot};
use mouseflip_core::settings::{FileSettingsStore, SettingsStore};
use mouseflip_core::{Handedness, HandednessController, StateSink};
use mouseflip_platform::windows::autostart::WinAutoStart;

use std::rc::Rc;

use crate::engine::{AutoSwitch, Engine};
use crate::single_window::SingleWindow;
use crate::slint_ui::OptionsDialog;

/// 选项对话框同时只开一个
type OptionsWindow = SingleWindow<slint::Weak<OptionsDialog>>;

const MENU_ID_RIGHT: &str = "right_handed";
const MENU_ID_LEFT: &str = "left_handed";
const MENU_ID_OPTIONS: &str = "options";
const MENU_ID_ABOUT: &str = "about";
const MENU_ID_EXIT: &str = "exit";

const APP_NAME: &str = "MouseFlip";
const TRAY_TOOLTIP: &str = "MouseFlip - Double-click either button to flip";

const ICON_RIGHT_PNG: &[u8] = include_bytes!("../../../assets/icon-right.png");
const ICON_LEFT_PNG: &[u8] = include_bytes!("../../../assets/icon-left.png");

/// 从内嵌 png 创建托盘图标
fn load_icon(png: &[u8]) -> Result<Icon> {
    let image = image::load_from_memory(png)
        .context("无法加载托盘图标数据")?
        .into_rgba8();
    let (width, height) = image.dimensions();
    let rgba = image.into_raw();
    Icon::from_rgba(rgba, width, height).context("创建托盘图标失败")
}

/// 左右手两种状态对应的图标（解码一次，之后克隆使用）
#[derive(Clone)]
struct TrayIcons {
    right: Icon,
    left: Icon,
}

impl TrayIcons {
    fn load() -> Result<Self> {
        Ok(Self {
            right: load_icon(ICON_RIGHT_PNG)?,
            left: load_icon(ICON_LEFT_PNG)?,
        })
    }

    fn for_state(&self, handedness: Handedness) -> Icon {
        match handedness {
            Handedness::RightHanded => self.right.clone(),
            Handedness::LeftHanded => self.left.clone(),
        }
    }
}

/// 托盘图标与菜单勾选状态的刷新端
pub struct TraySink {
    tray: TrayIcon,
    icons: TrayIcons,
    right_item: CheckMenuItem,
    left_item: CheckMenuItem,
}

impl TraySink {
    fn refresh(&self, handedness: Handedness) {
        if let Err(e) = self.tray.set_icon(Some(self.icons.for_state(handedness))) {
            log::error!("更新托盘图标失败: {}", e);
        }
        self.right_item.set_checked(!handedness.is_left());
        self.left_item.set_checked(handedness.is_left());
    }
}

impl StateSink for TraySink {
    fn state_changed(&self, handedness: Handedness) {
        self.refresh(handedness);
    }
}

/// 运行托盘应用主循环
pub fn run_app() -> Result<()> {
    let platform = mouseflip_platform::create_platform();
    let settings = FileSettingsStore::open_default()?;
    log::info!("配置文件: {}", settings.path().display());

    let current = platform.buttons.current();

    // 创建菜单
    let menu = Menu::new();
    let right_item = CheckMenuItem::with_id(
        MENU_ID_RIGHT,
        Handedness::RightHanded.label(),
        true,
        !current.is_left(),
        None,
    );
    let left_item = CheckMenuItem::with_id(
        MENU_ID_LEFT,
        Handedness::LeftHanded.label(),
        true,
        current.is_left(),
        None,
    );
    let options_item = MenuItem::with_id(MENU_ID_OPTIONS, "Options...", true, None);
    let about_item = MenuItem::with_id(MENU_ID_ABOUT, "About", true, None);
    let exit_item = MenuItem::with_id(MENU_ID_EXIT, "Exit", true, None);

    menu.append(&right_item).ok();
    menu.append(&left_item).ok();
    menu.append(&PredefinedMenuItem::separator()).ok();
    menu.append(&options_item).ok();
    menu.append(&about_item).ok();
    menu.append(&PredefinedMenuItem::separator()).ok();
    menu.append(&exit_item).ok();

    // 创建托盘图标
    let icons = TrayIcons::load()?;
    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_menu_on_left_click(false)
        .with_tooltip(TRAY_TOOLTIP)
        .with_icon(icons.for_state(current))
        .build()?;

    log::info!("系统托盘图标已创建，当前为 {}", current.label());

    let sink = TraySink {
        tray,
        icons,
        right_item,
        left_item,
    };
    let engine = Engine::new(platform.devices, platform.buttons, settings, sink);
    let auto_switch = Rc::new(AutoSwitch::new(engine));
    let autostart = Rc::new(platform.auto_start);
    let options_window: Rc<OptionsWindow> = Rc::new(SingleWindow::default());

    // 启动时根据配置开启自动切换
    if auto_switch.engine().borrow().settings().auto_switch_enabled() {
        auto_switch.start();
    }

    // 定时检查托盘与菜单事件
    let events_timer = slint::Timer::default();
    {
        let auto_switch = auto_switch.clone();
        events_timer.start(
            slint::TimerMode::Repeated,
            std::time::Duration::from_millis(50),
            move || {
                while let Ok(event) = TrayIconEvent::receiver().try_recv() {
                    handle_tray_event(event, &auto_switch);
                }
                while let Ok(event) = MenuEvent::receiver().try_recv() {
                    handle_menu_event(&event.id.0, &auto_switch, &autostart, &options_window);
                }
            },
        );
    }

    slint::run_event_loop_until_quit()?;

    events_timer.stop();
    auto_switch.stop();
    log::info!("事件循环已退出");
    Ok(())
}

fn handle_tray_event(event: TrayIconEvent, auto_switch: &Rc<AutoSwitch>) {
    // 左右键双击都翻转
    if let TrayIconEvent::DoubleClick { .. } = event {
        let Ok(mut engine) = auto_switch.engine().try_borrow_mut() else {
            return;
        };
        engine.toggle();
    }
}

fn handle_menu_event(
    id: &str,
    auto_switch: &Rc<AutoSwitch>,
    autostart: &Rc<WinAutoStart>,
    options_window: &Rc<OptionsWindow>,
) {
    match id {
        MENU_ID_RIGHT | MENU_ID_LEFT => {
            let handedness = if id == MENU_ID_LEFT {
                Handedness::LeftHanded
            } else {
                Handedness::RightHanded
            };
            if let Ok(mut engine) = auto_switch.engine().try_borrow_mut() {
                engine.set_handedness(handedness);
            }
        }
        MENU_ID_OPTIONS => {
            if let Err(e) = show_options_dialog(auto_switch, autostart, options_window) {
                log::error!("打开选项对话框失败: {:#}", e);
            }
        }
        MENU_ID_ABOUT => {
            if let Err(e) = show_about_dialog() {
                log::error!("打开关于对话框失败: {:#}", e);
            }
        }
        MENU_ID_EXIT => {
            log::info!("用户请求退出");
            auto_switch.stop();
            if let Err(e) = slint::quit_event_loop() {
                log::error!("退出事件循环失败: {}", e);
                std::process::exit(0);
            }
        }
        _ => {}
    }
}

fn show_options_dialog(
    auto_switch: &Rc<AutoSwitch>,
    autostart: &Rc<WinAutoStart>,
    options_window: &Rc<OptionsWindow>,
) -> Result<()> {
    // 已经打开时只把它调到前台
    if let Some(existing) = options_window.get(|weak| weak.upgrade()) {
        existing.window().set_minimized(false);
        existing.show().context("显示选项对话框失败")?;
        return Ok(());
    }

    let snapshot = {
        let engine = auto_switch.engine().borrow();
        OptionsSnapshot::capture(&*engine, autostart.as_ref())
    };

    let dialog = OptionsDialog::new().context("创建选项对话框失败")?;
    dialog.set_startup_enabled(snapshot.startup_enabled);
    dialog.set_auto_switch_enabled(snapshot.auto_switch_enabled);
    dialog.set_detected_devices(snapshot.detected_devices.to_string().into());
    dialog.set_base_device_count(snapshot.base_device_count.to_string().into());

    let window = options_window.clone();
    dialog.window().on_close_requested(move || {
        window.clear();
        slint::CloseRequestResponse::HideWindow
    });

    let dialog_weak = dialog.as_weak();
    let window = options_window.clone();
    dialog.on_cancel(move || {
        window.clear();
        if let Some(d) = dialog_weak.upgrade() {
            let _ = d.hide();
        }
    });

    let dialog_weak = dialog.as_weak();
    let window = options_window.clone();
    let auto_switch = auto_switch.clone();
    let autostart = autostart.clone();
    dialog.on_confirm(move |startup, auto_switch_enabled, base: slint::SharedString| {
        let form = OptionsForm {
            startup_enabled: startup,
            auto_switch_enabled,
            base_device_count: base.to_string(),
        };

        let result = match auto_switch.engine().try_borrow_mut() {
            Ok(mut engine) => apply_options(&form, &mut *engine, autostart.as_ref()),
            Err(_) => return,
        };

        match result {
            Err(e) => {
                // 校验失败：不写入，对话框保持打开
                log::warn!("选项校验失败: {}", e);
                show_message("Invalid Input", &e.to_string(), MessageKind::Warning);
                return;
            }
            Ok(warnings) => {
                auto_switch.sync_timer();
                for warning in warnings {
                    show_message("Error", warning.message(), MessageKind::Error);
                }
            }
        }

        window.clear();
        if let Some(d) = dialog_weak.upgrade() {
            let _ = d.hide();
        }
    });

    dialog.show().context("显示选项对话框失败")?;
    options_window.set(dialog.as_weak());
    Ok(())
}

fn show_about_dialog() -> Result<()> {
    let dialog = crate::slint_ui::AboutDialog::new().context("创建关于对话框失败")?;
    dialog.set_message(
        format!(
            "{} v{}\n\n\
             Quickly toggle mouse button configuration\n\
             between right-handed and left-handed modes.\n\n\
             Double-click the tray icon with either button to flip.\n\
             Right-click for menu.",
            APP_NAME,
            env!("CARGO_PKG_VERSION"),
        )
        .into(),
    );

    let dialog_weak = dialog.as_weak();
    dialog.on_close(move || {
        if let Some(d) = dialog_weak.upgrade() {
            let _ = d.hide();
        }
    });

    dialog.show().context("显示关于对话框失败")?;
    Ok(())
}

enum MessageKind {
    Warning,
    Error,
}

fn show_message(title: &str, text: &str, kind: MessageKind) {
    use windows::core::{HSTRING, PCWSTR};
    use windows::Win32::UI::WindowsAndMessaging::{
        MessageBoxW, MB_ICONERROR, MB_ICONWARNING, MB_OK,
    };

    let h_text = HSTRING::from(text);
    let h_title = HSTRING::from(title);
    let icon = match kind {
        MessageKind::Warning => MB_ICONWARNING,
        MessageKind::Error => MB_ICONERROR,
    };

    unsafe {
        MessageBoxW(
            None,
            PCWSTR(h_text.as_ptr()),
            PCWSTR(h_title.as_ptr()),
            icon | MB_OK,
        );
    }
}
