use chrono::{Local, NaiveTime, Timelike};

/// Source of the local wall-clock time of day used for store schedules.
pub trait Clock: Send + Sync {
    fn local_time(&self) -> NaiveTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_time(&self) -> NaiveTime {
        let now = Local::now().time();
        // schedules are compared at second precision
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Always reports the same time of day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl FixedClock {
    pub fn at(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }
}

impl Clock for FixedClock {
    fn local_time(&self) -> NaiveTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_drops_sub_second_precision() {
        assert_eq!(SystemClock.local_time().nanosecond(), 0);
    }

    #[test]
    fn fixed_clock_rejects_out_of_range_times() {
        assert!(FixedClock::at(24, 0).is_none());
        let clock = FixedClock::at(23, 30).expect("valid time");
        assert_eq!(clock.local_time(), NaiveTime::from_hms_opt(23, 30, 0).unwrap());
    }
}
