//! Stations, order sources and realtime rooms
//!
//! Both vocabularies are closed: four cooking lines and two ordering
//! channels. A [`Room`] is either one of them, so the snapshot code can
//! branch on the kind instead of comparing strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical cooking line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Station {
    Stirfry,
    Fryer,
    Sides,
    Grill,
}

impl Station {
    pub const ALL: [Station; 4] = [
        Station::Stirfry,
        Station::Fryer,
        Station::Sides,
        Station::Grill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Station::Stirfry => "stirfry",
            Station::Fryer => "fryer",
            Station::Sides => "sides",
            Station::Grill => "grill",
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Station {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Station::ALL
            .into_iter()
            .find(|station| station.as_str() == s)
            .ok_or_else(|| format!("Unknown station: {s}"))
    }
}

/// Ordering channel that created a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Source {
    /// Front-of-house counter
    Foh,
    DriveThru,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Foh, Source::DriveThru];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Foh => "foh",
            Source::DriveThru => "drive_thru",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("Unknown source: {s}"))
    }
}

/// Realtime subscription channel
///
/// Serialized as its bare name (`"stirfry"`, `"drive_thru"`, ...), which is
/// what display clients send in `join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Room {
    Station(Station),
    Source(Source),
}

impl Room {
    pub const ALL: [Room; 6] = [
        Room::Station(Station::Stirfry),
        Room::Station(Station::Fryer),
        Room::Station(Station::Sides),
        Room::Station(Station::Grill),
        Room::Source(Source::Foh),
        Room::Source(Source::DriveThru),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Room::Station(station) => station.as_str(),
            Room::Source(source) => source.as_str(),
        }
    }

    /// Parse a list of requested room names, silently dropping unknown ones.
    ///
    /// Order is preserved and duplicates are removed.
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Vec<Room> {
        let mut rooms = Vec::with_capacity(names.len());
        for name in names {
            if let Ok(room) = name.as_ref().parse::<Room>()
                && !rooms.contains(&room)
            {
                rooms.push(room);
            }
        }
        rooms
    }
}

impl From<Station> for Room {
    fn from(station: Station) -> Self {
        Room::Station(station)
    }
}

impl From<Source> for Room {
    fn from(source: Source) -> Self {
        Room::Source(source)
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Room {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(station) = s.parse::<Station>() {
            return Ok(Room::Station(station));
        }
        if let Ok(source) = s.parse::<Source>() {
            return Ok(Room::Source(source));
        }
        Err(format!("Unknown room: {s}"))
    }
}

impl TryFrom<String> for Room {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Room> for String {
    fn from(room: Room) -> Self {
        room.as_str().to_string()
    }
}
