// crates/geonames-core/src/search/slots.rs
//! World-clock slot arithmetic. Slot `h` spans UTC offsets `h:00..h+1:00`;
//! everything here is in minutes on a circular 1440-minute day.

use crate::model::{SlotInclusionClass, TimezoneEntry};

const MINUTES_PER_DAY: i32 = 24 * 60;
const HALF_DAY: i32 = 12 * 60;
const SLOT_TOLERANCE_MINUTES: i32 = 30;

/// True if a zone centred at `center_minutes` belongs in slot `offset_hours`:
/// the slot's middle is at most 30 minutes away, with wraparound.
pub fn valid_tz_centered_at(center_minutes: i32, offset_hours: i32) -> bool {
    let slot_center = offset_hours * 60 + 30;
    let mut distance = slot_center - center_minutes;
    if distance > HALF_DAY {
        distance -= MINUTES_PER_DAY;
    } else if distance < -HALF_DAY {
        distance += MINUTES_PER_DAY;
    }
    distance.abs() <= SLOT_TOLERANCE_MINUTES
}

pub fn valid_entry(entry: &TimezoneEntry, offset_hours: i32) -> bool {
    valid_tz_centered_at(i32::from(entry.center()), offset_hours)
}

pub fn inclusion_class(entry: &TimezoneEntry, offset_hours: i32) -> SlotInclusionClass {
    if !valid_entry(entry, offset_hours) {
        return SlotInclusionClass::NotIncluded;
    }

    let std = i32::from(entry.std_offset).rem_euclid(MINUTES_PER_DAY);
    let dst = i32::from(entry.dst_offset).rem_euclid(MINUTES_PER_DAY);
    let slot = (offset_hours * 60).rem_euclid(MINUTES_PER_DAY);

    if std == dst {
        if std % 60 == 0 {
            if slot == std {
                SlotInclusionClass::NormalNoDstRight
            } else {
                SlotInclusionClass::NormalNoDstLeft
            }
        } else if std % 30 == 0 {
            SlotInclusionClass::HalfNoDst
        } else {
            SlotInclusionClass::OddNoDst
        }
    } else if std % 60 == 0 {
        SlotInclusionClass::NormalHasDst
    } else if std % 30 == 0 {
        if slot > std {
            SlotInclusionClass::HalfHasDstRight
        } else {
            SlotInclusionClass::HalfHasDstLeft
        }
    } else {
        SlotInclusionClass::OddHasDst
    }
}

/// Slot hours (0..24) whose window holds a zone centred at `center_minutes`,
/// scanned from 23 down to 0.
pub fn slots_for_center(center_minutes: i32) -> Vec<u8> {
    (0..24u8)
        .rev()
        .filter(|h| valid_tz_centered_at(center_minutes, i32::from(*h)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(minutes: i16) -> TimezoneEntry {
        TimezoneEntry {
            std_offset: minutes,
            dst_offset: minutes,
            current_offset: minutes,
            next_transition: None,
        }
    }

    fn with_dst(std: i16) -> TimezoneEntry {
        TimezoneEntry {
            std_offset: std,
            dst_offset: std + 60,
            current_offset: std,
            next_transition: Some(1),
        }
    }

    #[test]
    fn whole_hour_zone_without_dst_straddles_two_slots() {
        let phoenix = fixed(-420);
        assert_eq!(inclusion_class(&phoenix, -7), SlotInclusionClass::NormalNoDstRight);
        assert_eq!(inclusion_class(&phoenix, -8), SlotInclusionClass::NormalNoDstLeft);
        assert_eq!(inclusion_class(&phoenix, -5), SlotInclusionClass::NotIncluded);
        assert_eq!(inclusion_class(&phoenix, -6), SlotInclusionClass::NotIncluded);
    }

    #[test]
    fn dst_zone_fills_one_slot() {
        let los_angeles = with_dst(-480);
        assert_eq!(inclusion_class(&los_angeles, -8), SlotInclusionClass::NormalHasDst);
        assert_eq!(inclusion_class(&los_angeles, -7), SlotInclusionClass::NotIncluded);
    }

    #[test]
    fn half_and_odd_zones() {
        assert_eq!(inclusion_class(&fixed(330), 5), SlotInclusionClass::HalfNoDst);
        assert_eq!(inclusion_class(&fixed(345), 5), SlotInclusionClass::OddNoDst);
        let adelaide = with_dst(570);
        assert_eq!(inclusion_class(&adelaide, 9), SlotInclusionClass::HalfHasDstLeft);
        assert_eq!(inclusion_class(&adelaide, 10), SlotInclusionClass::HalfHasDstRight);
    }

    #[test]
    fn slots_wrap_around_the_date_line() {
        assert!(valid_tz_centered_at(-720, 12));
        assert!(valid_tz_centered_at(-720, -13));
        assert!(valid_tz_centered_at(780, 12));
        assert_eq!(slots_for_center(0), vec![23, 0]);
        assert_eq!(slots_for_center(330), vec![5]);
    }
}
