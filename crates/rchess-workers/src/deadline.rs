//! ワーカーごとの締切
//!
//! ハーネスがエンジンの応答を待つ前に `set` し、受け取ったら `clear` する。
//! watchdog スレッドは `overdue` で時間切れのエンジンを検出する。
//! 各締切は自分専用の Mutex で守られ、集計用のプール全体ロックとは独立している。

use std::sync::Mutex;
use std::time::Instant;

use crate::lock_or_recover;

#[derive(Debug, Clone)]
struct Armed {
    engine_name: String,
    limit: Instant,
}

#[derive(Debug, Default)]
pub struct Deadline {
    state: Mutex<Option<Armed>>,
}

impl Deadline {
    pub fn new() -> Self {
        Self::default()
    }

    /// `engine_name` の応答期限を `limit` に設定する。既存の設定は上書き。
    pub fn set(&self, engine_name: &str, limit: Instant) {
        *lock_or_recover(&self.state) = Some(Armed {
            engine_name: engine_name.to_string(),
            limit,
        });
    }

    pub fn clear(&self) {
        *lock_or_recover(&self.state) = None;
    }

    pub fn is_set(&self) -> bool {
        lock_or_recover(&self.state).is_some()
    }

    /// 設定済みかつ `now` が期限を過ぎていれば、そのエンジン名を返す。
    pub fn overdue(&self, now: Instant) -> Option<String> {
        let guard = lock_or_recover(&self.state);
        guard.as_ref().filter(|a| now > a.limit).map(|a| a.engine_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn unset_deadline_is_never_overdue() {
        let d = Deadline::new();
        assert!(!d.is_set());
        assert_eq!(d.overdue(Instant::now() + Duration::from_secs(3600)), None);
    }

    #[test]
    fn overdue_only_after_limit() {
        let d = Deadline::new();
        let t0 = Instant::now();
        d.set("engine-a", t0 + Duration::from_millis(100));
        assert!(d.is_set());
        assert_eq!(d.overdue(t0), None);
        assert_eq!(d.overdue(t0 + Duration::from_millis(100)), None);
        assert_eq!(d.overdue(t0 + Duration::from_millis(101)), Some("engine-a".to_string()));
    }

    #[test]
    fn clear_disarms() {
        let d = Deadline::new();
        let t0 = Instant::now();
        d.set("engine-a", t0);
        d.clear();
        assert!(!d.is_set());
        assert_eq!(d.overdue(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn set_overwrites_previous_engine() {
        let d = Deadline::new();
        let t0 = Instant::now();
        d.set("engine-a", t0);
        d.set("engine-b", t0 + Duration::from_millis(10));
        assert_eq!(d.overdue(t0 + Duration::from_millis(5)), None);
        assert_eq!(d.overdue(t0 + Duration::from_millis(11)), Some("engine-b".to_string()));
    }
}
