// crates/geonames-core/src/calendar.rs
//! Calendar, clock and location implementations.
//!
//! [`ChronoTzCalendar`] answers offset questions from the IANA database shipped
//! with `chrono-tz`. [`StaticCalendar`] is a hand-filled table of rules for
//! tests, benches and offline tooling where the real database would make
//! results depend on the date.

use crate::model::Coordinates;
use crate::traits::{Calendar, Clock, LocationProvider};
use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const SCAN_STEP_SECS: i64 = 86_400;
const SCAN_HORIZON_DAYS: i64 = 400;

/// IANA timezone resolver backed by `chrono-tz`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChronoTzCalendar;

impl ChronoTzCalendar {
    pub fn new() -> Self {
        Self
    }
}

fn tz_offset_secs(tz: &Tz, at: i64) -> Option<i32> {
    let utc = DateTime::<Utc>::from_timestamp(at, 0)?;
    Some(tz.offset_from_utc_datetime(&utc.naive_utc()).fix().local_minus_utc())
}

impl Calendar for ChronoTzCalendar {
    fn offset_at(&self, zone: &str, at: i64) -> Option<i32> {
        let tz: Tz = zone.parse().ok()?;
        tz_offset_secs(&tz, at)
    }

    /// Steps forward a day at a time until the offset differs, then bisects
    /// down to the second. Zones with no change inside the horizon have no
    /// next transition.
    fn next_transition_after(&self, zone: &str, at: i64) -> Option<i64> {
        let tz: Tz = zone.parse().ok()?;
        let start = tz_offset_secs(&tz, at)?;

        let mut lo = at;
        for _ in 0..SCAN_HORIZON_DAYS {
            let hi = lo + SCAN_STEP_SECS;
            if tz_offset_secs(&tz, hi)? != start {
                let (mut same, mut changed) = (lo, hi);
                while changed - same > 1 {
                    let mid = same + (changed - same) / 2;
                    if tz_offset_secs(&tz, mid)? == start {
                        same = mid;
                    } else {
                        changed = mid;
                    }
                }
                return Some(changed);
            }
            lo = hi;
        }
        None
    }
}

/// One zone's behaviour in a [`StaticCalendar`]: an offset, optionally
/// followed by a single transition to another offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneRule {
    pub offset_minutes: i32,
    pub transition: Option<(i64, i32)>,
}

impl ZoneRule {
    pub fn fixed(offset_minutes: i32) -> Self {
        Self {
            offset_minutes,
            transition: None,
        }
    }

    pub fn transition(offset_minutes: i32, at: i64, offset_after_minutes: i32) -> Self {
        Self {
            offset_minutes,
            transition: Some((at, offset_after_minutes)),
        }
    }
}

/// Table-driven calendar.
#[derive(Debug, Default, Clone)]
pub struct StaticCalendar {
    zones: HashMap<String, ZoneRule>,
}

impl StaticCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, name: &str, rule: ZoneRule) -> Self {
        self.insert(name, rule);
        self
    }

    pub fn insert(&mut self, name: &str, rule: ZoneRule) {
        self.zones.insert(name.to_string(), rule);
    }
}

impl Calendar for StaticCalendar {
    fn offset_at(&self, zone: &str, at: i64) -> Option<i32> {
        let rule = self.zones.get(zone)?;
        let minutes = match rule.transition {
            Some((when, after)) if at >= when => after,
            _ => rule.offset_minutes,
        };
        Some(minutes * 60)
    }

    fn next_transition_after(&self, zone: &str, at: i64) -> Option<i64> {
        match self.zones.get(zone)?.transition {
            Some((when, _)) if when > at => Some(when),
            _ => None,
        }
    }
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// The device's last known position, updatable by whoever owns location
/// services.
#[derive(Debug, Default)]
pub struct DeviceLocation {
    inner: RwLock<Coordinates>,
}

impl DeviceLocation {
    pub fn new(at: Coordinates) -> Self {
        Self {
            inner: RwLock::new(at),
        }
    }

    pub fn update(&self, at: Coordinates) {
        match self.inner.write() {
            Ok(mut guard) => *guard = at,
            Err(poisoned) => *poisoned.into_inner() = at,
        }
    }
}

impl LocationProvider for DeviceLocation {
    fn device_location(&self) -> Coordinates {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// The capabilities one store runs against.
#[derive(Clone)]
pub struct Environment {
    pub calendar: Arc<dyn Calendar>,
    pub clock: Arc<dyn Clock>,
    pub location: Arc<dyn LocationProvider>,
}

impl Environment {
    pub fn new(
        calendar: Arc<dyn Calendar>,
        clock: Arc<dyn Clock>,
        location: Arc<dyn LocationProvider>,
    ) -> Self {
        Self {
            calendar,
            clock,
            location,
        }
    }

    /// Real IANA data, wall-clock time, and a device location fixed at `at`.
    pub fn system(at: Coordinates) -> Self {
        Self::new(
            Arc::new(ChronoTzCalendar),
            Arc::new(SystemClock),
            Arc::new(DeviceLocation::new(at)),
        )
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub fn device_location(&self) -> Coordinates {
        self.location.device_location()
    }
}
