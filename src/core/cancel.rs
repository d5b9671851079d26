//! 取消检查
//!
//! 引擎不关心线程或窗口，只在每次循环中询问一次是否已取消。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 协作式取消信号
pub trait CancelCheck {
    fn is_cancelled(&self) -> bool;
}

impl CancelCheck for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl CancelCheck for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

impl<T: CancelCheck + ?Sized> CancelCheck for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<T: CancelCheck + ?Sized> CancelCheck for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// 永不取消
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelCheck for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// 闭包形式的取消检查
pub struct CancelFn<F>(pub F);

impl<F: Fn() -> bool> CancelCheck for CancelFn<F> {
    fn is_cancelled(&self) -> bool {
        (self.0)()
    }
}
