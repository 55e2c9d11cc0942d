#![allow(unexpected_cfgs)]
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

#[cfg(target_os = "windows")]
mod engine;
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
mod single_window;
#[cfg(target_os = "windows")]
mod slint_ui;
#[cfg(target_os = "windows")]
mod tray;

use anyhow::Result;
use std::net::TcpListener;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 使用 TCP 端口锁实现单实例检测
fn try_lock_single_instance() -> bool {
    // 绑定一个固定的本地端口；成功则说明当前是唯一实例
    match TcpListener::bind("127.0.0.1:57833") {
        Ok(listener) => {
            // 把监听器泄露到堆上，让它在进程退出前一直持有端口
            Box::leak(Box::new(listener));
            true
        }
        Err(_) => false, // 端口被占用，说明已有实例在运行
    }
}

fn inner_main() -> Result<()> {
    // 单实例检测
    if !try_lock_single_instance() {
        log::warn!("程序已在运行中，退出");
        return Ok(());
    }

    // Windows: 托盘 + 自动切换监控 + 事件循环（阻塞）
    #[cfg(target_os = "windows")]
    tray::run_app()?;

    #[cfg(not(target_os = "windows"))]
    log::warn!("当前平台不受支持，MouseFlip 仅支持 Windows");

    log::info!("MouseFlip 已退出");
    Ok(())
}

fn main() {
    // 获取系统的临时目录
    let temp_dir = std::env::temp_dir();
    let run_log_path = temp_dir.join("mouseflip_run.log");
    let err_log_path = temp_dir.join("mouseflip_fatal_err.log");

    // 无控制台窗口，日志写入文件；文件无法创建时退回 stderr
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    match std::fs::File::create(&run_log_path) {
        Ok(log_file) => {
            builder.target(env_logger::Target::Pipe(Box::new(log_file)));
        }
        Err(e) => eprintln!("无法创建日志文件 {}: {}", run_log_path.display(), e),
    }
    builder.init();

    log::info!("MouseFlip v{} 启动中...", APP_VERSION);

    if let Err(e) = inner_main() {
        log::error!("致命错误导致应用退出: {:?}", e);
        std::fs::write(&err_log_path, format!("{:?}", e)).ok();
    }
}
