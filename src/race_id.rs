// src/race_id.rs
//! Race identifiers: `YYYY` + track `TT` + meeting `MM` + day `DD` + race `RR`,
//! twelve digits, e.g. `202505020811` = 2025, Tokyo, 2nd meeting, 8th day, race 11.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};

use crate::config::consts::RACES_PER_DAY;
use crate::error::{Error, Result};

pub const RACE_ID_LEN: usize = 12;
pub const UNKNOWN_TRACK_CODE: &str = "00";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Track {
    Sapporo,
    Hakodate,
    Fukushima,
    Niigata,
    Tokyo,
    Nakayama,
    Chukyo,
    Kyoto,
    Hanshin,
    Kokura,
}

impl Track {
    pub const ALL: [Track; 10] = [
        Track::Sapporo, Track::Hakodate, Track::Fukushima, Track::Niigata, Track::Tokyo,
        Track::Nakayama, Track::Chukyo, Track::Kyoto, Track::Hanshin, Track::Kokura,
    ];

    /// (code, schedule name, romanized name)
    fn row(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Track::Sapporo   => ("01", "札幌", "Sapporo"),
            Track::Hakodate  => ("02", "函館", "Hakodate"),
            Track::Fukushima => ("03", "福島", "Fukushima"),
            Track::Niigata   => ("04", "新潟", "Niigata"),
            Track::Tokyo     => ("05", "東京", "Tokyo"),
            Track::Nakayama  => ("06", "中山", "Nakayama"),
            Track::Chukyo    => ("07", "中京", "Chukyo"),
            Track::Kyoto     => ("08", "京都", "Kyoto"),
            Track::Hanshin   => ("09", "阪神", "Hanshin"),
            Track::Kokura    => ("10", "小倉", "Kokura"),
        }
    }

    pub fn code(self) -> &'static str { self.row().0 }
    pub fn local_name(self) -> &'static str { self.row().1 }
    pub fn name(self) -> &'static str { self.row().2 }

    /// Accepts the schedule's name or the romanized one, any case.
    pub fn from_name(name: &str) -> Option<Track> {
        let name = name.trim();
        Track::ALL
            .into_iter()
            .find(|t| t.local_name() == name || t.name().eq_ignore_ascii_case(name))
    }
}

impl FromStr for Track {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Track::from_name(s).ok_or_else(|| Error::UnknownTrack(s.to_string()))
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Track as written in a schedule row. Legacy rows can name venues that are
/// not in the table; those still produce identifiers, with code `00`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Venue {
    Known(Track),
    Unknown(String),
}

impl Venue {
    pub fn parse(name: &str) -> Venue {
        match Track::from_name(name) {
            Some(t) => Venue::Known(t),
            None => Venue::Unknown(name.trim().to_string()),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Venue::Known(t) => t.code(),
            Venue::Unknown(_) => UNKNOWN_TRACK_CODE,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Known(t) => write!(f, "{t}"),
            Venue::Unknown(name) => f.write_str(name),
        }
    }
}

impl From<Track> for Venue {
    fn from(t: Track) -> Self { Venue::Known(t) }
}

/// One meeting day from the racing calendar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub year: u16,
    pub venue: Venue,
    pub meeting: u8,
    pub day: u8,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RaceId(String);

impl RaceId {
    pub fn as_str(&self) -> &str { &self.0 }

    pub fn race_number(&self) -> u8 {
        self.0[10..].parse().unwrap_or(0)
    }

    pub fn track_code(&self) -> &str { &self.0[4..6] }
}

impl FromStr for RaceId {
    type Err = Error;

    /// Accepts an already-built identifier (e.g. typed by a user).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != RACE_ID_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Parse(format!("not a {RACE_ID_LEN}-digit race id: {s:?}")));
        }
        let race: u8 = s[10..].parse().map_err(|_| Error::Parse(s.to_string()))?;
        if !(1..=RACES_PER_DAY).contains(&race) {
            return Err(Error::InvalidRaceNumber(race));
        }
        Ok(RaceId(s.to_string()))
    }
}

impl fmt::Display for RaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RaceId {
    fn as_ref(&self) -> &str { &self.0 }
}

/// Build the identifier for one race of a meeting day.
pub fn build_id(entry: &ScheduleEntry, race_number: u8) -> Result<RaceId> {
    if !(1..=RACES_PER_DAY).contains(&race_number) {
        return Err(Error::InvalidRaceNumber(race_number));
    }
    // Wider values would break the fixed width and with it uniqueness.
    if entry.year > 9999 || entry.meeting > 99 || entry.day > 99 {
        return Err(Error::Parse(format!(
            "schedule entry out of range: year={} meeting={} day={}",
            entry.year, entry.meeting, entry.day
        )));
    }
    if let Venue::Unknown(name) = &entry.venue {
        tracing::warn!(track = %name, "unknown track, using code {UNKNOWN_TRACK_CODE}");
    }
    Ok(RaceId(format!(
        "{:04}{}{:02}{:02}{:02}",
        entry.year,
        entry.venue.code(),
        entry.meeting,
        entry.day,
        race_number
    )))
}

/// Inclusive date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self { Self { start, end } }

    /// `past` days before `today` through `ahead` days after it.
    pub fn around(today: NaiveDate, past: i64, ahead: i64) -> Self {
        Self { start: today - Duration::days(past), end: today + Duration::days(ahead) }
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }
}

/// Every race of every meeting day in `window`: schedule order, then race 1..=12.
pub fn enumerate_ids(schedule: &[ScheduleEntry], window: DateWindow) -> Vec<RaceId> {
    let mut out = Vec::new();
    for entry in schedule.iter().filter(|e| window.contains(e.date)) {
        for race in 1..=RACES_PER_DAY {
            match build_id(entry, race) {
                Ok(id) => out.push(id),
                Err(e) => {
                    tracing::warn!(date = %entry.date, "skipping schedule entry: {e}");
                    break;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn entry(venue: Venue, meeting: u8, day: u8, date: NaiveDate) -> ScheduleEntry {
        ScheduleEntry { year: 2025, venue, meeting, day, date }
    }

    #[test]
    fn builds_fixed_width_id() {
        let e = entry(Track::Tokyo.into(), 2, 8, d(2025, 5, 25));
        let id = build_id(&e, 11).unwrap();
        assert_eq!(id.as_str(), "202505020811");
        assert_eq!(id.as_str().len(), RACE_ID_LEN);
        assert_eq!(id.race_number(), 11);
        assert_eq!(id.track_code(), "05");
    }

    #[test]
    fn race_number_bounds() {
        let e = entry(Track::Kyoto.into(), 1, 1, d(2025, 1, 5));
        assert!(matches!(build_id(&e, 0), Err(Error::InvalidRaceNumber(0))));
        assert!(matches!(build_id(&e, 13), Err(Error::InvalidRaceNumber(13))));
        assert!(build_id(&e, 1).is_ok());
        assert!(build_id(&e, 12).is_ok());
    }

    #[test]
    fn unknown_track_gets_sentinel() {
        let e = entry(Venue::parse("大井"), 3, 4, d(2025, 6, 1));
        assert_eq!(build_id(&e, 5).unwrap().as_str(), "202500030405");
        assert!(matches!("大井".parse::<Track>(), Err(Error::UnknownTrack(_))));
    }

    #[test]
    fn injective_over_valid_tuples() {
        let mut seen = HashSet::new();
        for t in Track::ALL {
            for meeting in [1u8, 2, 5, 10] {
                for day in [1u8, 2, 9, 12] {
                    let e = entry(t.into(), meeting, day, d(2025, 1, 1));
                    for race in 1..=12 {
                        let id = build_id(&e, race).unwrap();
                        assert_eq!(id.as_str().len(), 12);
                        assert!(seen.insert(id));
                    }
                }
            }
        }
    }

    #[test]
    fn enumerate_one_entry_gives_twelve_in_order() {
        let sched = vec![entry(Track::Hanshin.into(), 1, 6, d(2025, 3, 8))];
        let ids = enumerate_ids(&sched, DateWindow::new(d(2025, 3, 1), d(2025, 3, 8)));
        assert_eq!(ids.len(), 12);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(id.race_number() as usize, i + 1);
            assert!(id.as_str().starts_with("2025090106"));
        }
    }

    #[test]
    fn enumerate_filters_and_keeps_schedule_order() {
        let sched = vec![
            entry(Track::Nakayama.into(), 2, 1, d(2025, 3, 1)),
            entry(Track::Kokura.into(), 1, 1, d(2025, 2, 1)),
            entry(Track::Chukyo.into(), 1, 2, d(2025, 3, 2)),
        ];
        let w = DateWindow::new(d(2025, 3, 1), d(2025, 3, 2));
        let ids = enumerate_ids(&sched, w);
        assert_eq!(ids.len(), 24);
        assert_eq!(ids[0].track_code(), "06");
        assert_eq!(ids[12].track_code(), "07");
        assert_eq!(ids, enumerate_ids(&sched, w));
    }

    #[test]
    fn parse_existing_id() {
        assert_eq!("202505020811".parse::<RaceId>().unwrap().race_number(), 11);
        assert!("20250502081".parse::<RaceId>().is_err());
        assert!(matches!("202505020813".parse::<RaceId>(), Err(Error::InvalidRaceNumber(13))));
    }

    #[test]
    fn track_names() {
        assert_eq!(Track::from_name("tokyo"), Some(Track::Tokyo));
        assert_eq!(Track::from_name(" 阪神 "), Some(Track::Hanshin));
        assert_eq!(Track::from_name("Longchamp"), None);
    }
}
