use chrono::{DateTime, Utc};

/// 回测时钟
///
/// 维护当前模拟时间, 随事件分发推进。
#[derive(Debug, Default)]
pub struct Clock {
    now: Option<DateTime<Utc>>,
}

impl Clock {
    pub fn new() -> Self {
        Clock { now: None }
    }

    /// 当前模拟时间 (尚未分发任何事件时为 None)
    pub fn now(&self) -> Option<DateTime<Utc>> {
        self.now
    }

    /// 推进到给定时间
    pub fn update(&mut self, datetime: DateTime<Utc>) {
        self.now = Some(datetime);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clock_starts_unset() {
        let clock = Clock::new();
        assert_eq!(clock.now(), None);
    }

    #[test]
    fn test_clock_update() {
        let mut clock = Clock::new();
        let dt = Utc.with_ymd_and_hms(2020, 9, 1, 12, 30, 0).unwrap();
        clock.update(dt);
        assert_eq!(clock.now(), Some(dt));
    }
}
