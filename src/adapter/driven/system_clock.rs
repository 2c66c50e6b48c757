use crate::domain::port::Clock;
use chrono::{DateTime, Utc};

/// システム時計
/// 実時刻を供給するClockポートの実装
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_matches_now() {
        let clock = SystemClock::new();
        assert_eq!(clock.today(), clock.now().date_naive());
    }
}
