//! Per-customer lock registry
//!
//! 使用 DashMap 实现无锁并发的互斥锁注册表。
//! 每个手机号持有独立的互斥锁，不同客户的操作完全并行。
//!
//! Mutation of a customer's ledger plus its cached counter must be a
//! serialized read-modify-write per phone number; this registry provides
//! the mutex for it. Pure reads never take a lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// Registry of per-phone mutexes
#[derive(Debug, Default)]
pub struct CustomerLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl CustomerLocks {
    /// 创建空的锁注册表
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// 获取指定手机号的互斥锁（不存在则创建）
    ///
    /// Callers hold the guard for the whole read-modify-write:
    ///
    /// ```ignore
    /// let lock = locks.acquire("612345678");
    /// let _guard = lock.lock().await;
    /// // read ledger, append, update counter
    /// ```
    pub fn acquire(&self, phone: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(phone.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_phone_same_lock() {
        let locks = CustomerLocks::new();
        let a = locks.acquire("111");
        let b = locks.acquire("111");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_different_phones_independent() {
        let locks = CustomerLocks::new();
        let a = locks.acquire("111");
        let b = locks.acquire("222");
        assert!(!Arc::ptr_eq(&a, &b));

        // Holding one must not block the other
        let _guard_a = a.lock().await;
        let guard_b = b.try_lock();
        assert!(guard_b.is_ok());
    }

    #[tokio::test]
    async fn test_guard_serializes_same_phone() {
        let locks = CustomerLocks::new();
        let lock = locks.acquire("111");
        let _guard = lock.lock().await;
        assert!(locks.acquire("111").try_lock().is_err());
    }
}
