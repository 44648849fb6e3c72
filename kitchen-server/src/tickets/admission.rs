//! Station admission policy
//!
//! Maximum number of concurrently started tickets per station.

use shared::models::Station;

/// Seconds added by one extend
pub const EXTEND_SECONDS: i64 = 10;

/// Concurrent timer limit of a station (fryer is effectively unlimited)
pub fn station_capacity(station: Station) -> i64 {
    match station {
        Station::Fryer => 999,
        Station::Stirfry => 2,
        Station::Sides => 1,
        Station::Grill => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_table() {
        assert_eq!(station_capacity(Station::Stirfry), 2);
        assert_eq!(station_capacity(Station::Sides), 1);
        assert_eq!(station_capacity(Station::Grill), 1);
        assert!(station_capacity(Station::Fryer) >= 999);
    }
}
