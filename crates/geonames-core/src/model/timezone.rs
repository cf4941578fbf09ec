// crates/geonames-core/src/model/timezone.rs
use crate::traits::Calendar;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Offsets are sampled this long after a transition, clear of any ambiguity
/// at the transition instant itself.
pub const POST_TRANSITION_PROBE_SECS: i64 = 2 * 3600;

/// DST shifts wider than this indicate a data or calendar problem.
pub const MAX_DST_SPAN_MINUTES: i32 = 60;

/// Cached offset summary for one unique timezone name.
///
/// `std_offset`/`dst_offset` are the (min, max) of the current offset and the
/// offset just after the next transition; both equal `current_offset` for
/// zones without an upcoming transition. All offsets are minutes east of UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneEntry {
    pub std_offset: i16,
    pub dst_offset: i16,
    pub current_offset: i16,
    /// Unix seconds of the next transition, if the zone has one.
    pub next_transition: Option<i64>,
}

impl TimezoneEntry {
    /// Derives the entry for `zone` as of `now`. `None` if the calendar does
    /// not know the zone.
    pub fn resolve(calendar: &dyn Calendar, zone: &str, now: i64) -> Option<Self> {
        let current = whole_minutes(zone, calendar.offset_at(zone, now)?);
        let next_transition = calendar.next_transition_after(zone, now);

        let (std_offset, dst_offset) = match next_transition {
            Some(at) => {
                let post = calendar
                    .offset_at(zone, at + POST_TRANSITION_PROBE_SECS)
                    .map(|secs| whole_minutes(zone, secs))
                    .unwrap_or(current);
                if (current - post).abs() > MAX_DST_SPAN_MINUTES {
                    warn!(zone, current, post, "DST transition spans more than an hour");
                }
                (current.min(post), current.max(post))
            }
            None => (current, current),
        };

        Some(Self {
            std_offset: std_offset as i16,
            dst_offset: dst_offset as i16,
            current_offset: current as i16,
            next_transition,
        })
    }

    pub fn has_dst(&self) -> bool {
        self.std_offset != self.dst_offset
    }

    /// Centre of the zone's offset range in minutes, truncated toward zero.
    pub fn center(&self) -> i16 {
        ((self.std_offset as i32 + self.dst_offset as i32) / 2) as i16
    }

    /// Full match on the offset schedule: current offset, next transition,
    /// and the std/dst pair.
    pub fn same_schedule(&self, other: &TimezoneEntry) -> bool {
        self == other
    }
}

fn whole_minutes(zone: &str, seconds: i32) -> i32 {
    if seconds % 60 != 0 {
        warn!(zone, seconds, "UTC offset is not a whole number of minutes");
    }
    seconds / 60
}

/// Why a city does or does not belong in an hour-wide world-clock slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotInclusionClass {
    /// Does not fit in this slot.
    NotIncluded,
    /// Whole-hour zone with DST: fills the slot exactly (Los Angeles).
    NormalHasDst,
    /// Whole-hour zone without DST, on the boundary with the slot to the east (Phoenix).
    NormalNoDstLeft,
    /// Whole-hour zone without DST, on the boundary with the slot to the west (Phoenix).
    NormalNoDstRight,
    /// Half-hour zone with DST, splitting the boundary to the east (Adelaide).
    HalfHasDstLeft,
    /// Half-hour zone with DST, splitting the boundary to the west (Adelaide).
    HalfHasDstRight,
    /// Half-hour zone without DST: middle of a slot (Mumbai).
    HalfNoDst,
    /// Off-centre zone with DST.
    OddHasDst,
    /// Off-centre zone without DST (Kathmandu).
    OddNoDst,
}

impl SlotInclusionClass {
    pub fn is_included(&self) -> bool {
        !matches!(self, SlotInclusionClass::NotIncluded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotInclusionClass::NotIncluded => "notIncluded",
            SlotInclusionClass::NormalHasDst => "normalHasDST",
            SlotInclusionClass::NormalNoDstLeft => "normalNoDSTLeft",
            SlotInclusionClass::NormalNoDstRight => "normalNoDSTRight",
            SlotInclusionClass::HalfHasDstLeft => "halfHasDSTLeft",
            SlotInclusionClass::HalfHasDstRight => "halfHasDSTRight",
            SlotInclusionClass::HalfNoDst => "halfNoDST",
            SlotInclusionClass::OddHasDst => "oddHasDST",
            SlotInclusionClass::OddNoDst => "oddNoDST",
        }
    }
}

impl std::fmt::Display for SlotInclusionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
