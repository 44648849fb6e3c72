//! Dayparts: fixed local-time ranges used for recommended batch sizes
//!
//! Breakfast 6-11, Lunch 11-14, Snack 14-17, Dinner 17-20, Late snack 20-24.
//! Hours 0-6 count as breakfast. Snack and late snack are the "downtime"
//! periods of the store.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Daypart {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
    LateSnack,
}

/// (daypart, start hour inclusive, end hour exclusive)
const RANGES: [(Daypart, u32, u32); 5] = [
    (Daypart::Breakfast, 6, 11),
    (Daypart::Lunch, 11, 14),
    (Daypart::Snack, 14, 17),
    (Daypart::Dinner, 17, 20),
    (Daypart::LateSnack, 20, 24),
];

impl Daypart {
    pub const ALL: [Daypart; 5] = [
        Daypart::Breakfast,
        Daypart::Lunch,
        Daypart::Snack,
        Daypart::Dinner,
        Daypart::LateSnack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Daypart::Breakfast => "breakfast",
            Daypart::Lunch => "lunch",
            Daypart::Snack => "snack",
            Daypart::Dinner => "dinner",
            Daypart::LateSnack => "late_snack",
        }
    }

    pub fn from_hour(hour: u32) -> Self {
        RANGES
            .iter()
            .find(|(_, start, end)| hour >= *start && hour < *end)
            .map(|(daypart, _, _)| *daypart)
            .unwrap_or(Daypart::Breakfast)
    }

    /// Daypart for the server's local time.
    pub fn current() -> Self {
        Self::from_hour(chrono::Local::now().hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_start_inclusive() {
        assert_eq!(Daypart::from_hour(6), Daypart::Breakfast);
        assert_eq!(Daypart::from_hour(10), Daypart::Breakfast);
        assert_eq!(Daypart::from_hour(11), Daypart::Lunch);
        assert_eq!(Daypart::from_hour(14), Daypart::Snack);
        assert_eq!(Daypart::from_hour(17), Daypart::Dinner);
        assert_eq!(Daypart::from_hour(20), Daypart::LateSnack);
        assert_eq!(Daypart::from_hour(23), Daypart::LateSnack);
    }

    #[test]
    fn early_morning_is_breakfast() {
        assert_eq!(Daypart::from_hour(0), Daypart::Breakfast);
        assert_eq!(Daypart::from_hour(5), Daypart::Breakfast);
    }
}
