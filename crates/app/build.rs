fn main() {
    #[cfg(target_os = "windows")]
    {
        println!("cargo:rerun-if-changed=icon.rc");
        println!("cargo:rerun-if-changed=app.manifest");

        // 嵌入程序图标与清单（asInvoker，SwapMouseButton 与 HKCU 写入都不需要管理员权限）
        let rc_file = "icon.rc";
        embed_resource::compile(rc_file, embed_resource::NONE);
    }
}
