use std::cell::RefCell;

/// 同一时间只允许存在一个实例的窗口
///
/// 只保存弱引用，窗口关闭释放后自动失效。
pub struct SingleWindow<W> {
    handle: RefCell<Option<W>>,
}

impl<W> Default for SingleWindow<W> {
    fn default() -> Self {
        Self {
            handle: RefCell::new(None),
        }
    }
}

impl<W> SingleWindow<W> {
    /// 取出仍然存活的窗口；已经失效则清空
    pub fn get<T, F>(&self, upgrade: F) -> Option<T>
    where
        F: FnOnce(&W) -> Option<T>,
    {
        let mut handle = self.handle.borrow_mut();
        let window = handle.as_ref().and_then(upgrade);
        if window.is_none() {
            *handle = None;
        }
        window
    }

    pub fn set(&self, handle: W) {
        *self.handle.borrow_mut() = Some(handle);
    }

    pub fn clear(&self) {
        self.handle.borrow_mut().take();
    }
}
