// src/schedule.rs
//! Racing calendar loaded from a CSV export.
//!
//! Expected columns (Japanese or English headers):
//! `年/year`, `競馬場/track`, `開催回/meeting`, `日目/day`, `月日(曜日)/date`.
//! The date column is free text such as `04/05(土)`, `4月5日(土)` or
//! `2025-04-05`; only the leading date is read.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::csv::{self, Header, cell};
use crate::error::{Error, Result};
use crate::race_id::{DateWindow, ScheduleEntry, Venue};

const YEAR: &[&str] = &["年", "year"];
const TRACK: &[&str] = &["競馬場", "track", "venue"];
const MEETING: &[&str] = &["開催回", "meeting"];
const DAY: &[&str] = &["日目", "day"];
const DATE: &[&str] = &["月日(曜日)", "月日", "date"];

pub fn load(path: &Path) -> Result<Vec<ScheduleEntry>> {
    let text = std::fs::read_to_string(path)?;
    parse_csv(&text)
}

pub fn parse_csv(text: &str) -> Result<Vec<ScheduleEntry>> {
    let mut rows = csv::parse_rows(text).into_iter();
    let header = rows.next().ok_or_else(|| Error::Parse("schedule is empty".into()))?;
    let h = Header::new(&header);
    let col = |aliases: &[&str]| h.require(aliases).map_err(|e| Error::Parse(format!("schedule: {e}")));
    let (c_year, c_track, c_meet, c_day, c_date) =
        (col(YEAR)?, col(TRACK)?, col(MEETING)?, col(DAY)?, col(DATE)?);

    let mut out = Vec::new();
    for (line, row) in rows.enumerate() {
        let year: u16 = match cell(&row, c_year).trim().parse() {
            Ok(y) => y,
            Err(_) => {
                tracing::debug!(line = line + 2, "schedule row without year, skipped");
                continue;
            }
        };
        let Some(date) = parse_date(cell(&row, c_date), year) else {
            tracing::debug!(line = line + 2, raw = cell(&row, c_date), "unparsable date, skipped");
            continue;
        };
        let meeting = parse_small(cell(&row, c_meet), "meeting", line)?;
        let day = parse_small(cell(&row, c_day), "day", line)?;

        out.push(ScheduleEntry {
            year,
            venue: Venue::parse(cell(&row, c_track)),
            meeting,
            day,
            date,
        });
    }
    Ok(out)
}

fn parse_small(raw: &str, what: &str, line: usize) -> Result<u8> {
    let v: u8 = raw.trim().parse().map_err(|_| {
        Error::Parse(format!("schedule line {}: bad {what} {raw:?}", line + 2))
    })?;
    if !(1..=99).contains(&v) {
        return Err(Error::Parse(format!("schedule line {}: {what} {v} out of range", line + 2)));
    }
    Ok(v)
}

/// Leading date of a free-text field. Month/day forms take `year`.
pub fn parse_date(raw: &str, year: u16) -> Option<NaiveDate> {
    let raw = raw.trim();
    let digits_then = |s: &str| -> (Option<u32>, usize) {
        let n = s.bytes().take_while(|b| b.is_ascii_digit()).count();
        (s[..n].parse().ok(), n)
    };

    // YYYY-MM-DD or YYYY/MM/DD
    let b = raw.as_bytes();
    if b.len() >= 10 && matches!(b[4], b'-' | b'/') && b[7] == b[4] && raw.is_char_boundary(10) {
        if let Ok(d) = NaiveDate::parse_from_str(&raw[..10].replace('/', "-"), "%Y-%m-%d") {
            return Some(d);
        }
    }

    // MM/DD or M月D日
    let (month, n) = digits_then(raw);
    let rest = &raw[n..];
    let rest = rest.strip_prefix('/').or_else(|| rest.strip_prefix('月'))?;
    let (day, _) = digits_then(rest);
    NaiveDate::from_ymd_opt(year as i32, month?, day?)
}

/// Meeting days inside `window`, newest first, each with its venues in
/// schedule order.
pub fn meeting_days(schedule: &[ScheduleEntry], window: DateWindow) -> Vec<(NaiveDate, Vec<Venue>)> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Venue>> = BTreeMap::new();
    for e in schedule.iter().filter(|e| window.contains(e.date)) {
        let venues = by_date.entry(e.date).or_default();
        if !venues.contains(&e.venue) {
            venues.push(e.venue.clone());
        }
    }
    by_date.into_iter().rev().collect()
}

/// The schedule row for one venue on one date.
pub fn find_entry<'a>(
    schedule: &'a [ScheduleEntry],
    date: NaiveDate,
    venue: &Venue,
) -> Option<&'a ScheduleEntry> {
    schedule.iter().find(|e| e.date == date && &e.venue == venue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race_id::Track;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const SAMPLE: &str = "\
年,競馬場,開催回,日目,月日(曜日)
2025,東京,2,7,05/24(土)
2025,京都,3,7,05/24(土)
2025,東京,2,8,5月25日(日)
2025,新潟,1,1,未定
";

    #[test]
    fn parses_japanese_headers_and_date_forms() {
        let s = parse_csv(SAMPLE).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s[0].venue, Venue::Known(Track::Tokyo));
        assert_eq!(s[0].date, d(2025, 5, 24));
        assert_eq!(s[2].date, d(2025, 5, 25));
        assert_eq!((s[2].meeting, s[2].day), (2, 8));
    }

    #[test]
    fn english_headers_and_iso_dates() {
        let s = parse_csv("year,track,meeting,day,date\n2024,Kokura,1,2,2024-01-14\n").unwrap();
        assert_eq!(s[0].venue, Venue::Known(Track::Kokura));
        assert_eq!(s[0].date, d(2024, 1, 14));
    }

    #[test]
    fn missing_column_is_parse_error() {
        assert!(matches!(parse_csv("year,track,day,date\n"), Err(Error::Parse(_))));
    }

    #[test]
    fn meeting_days_newest_first() {
        let s = parse_csv(SAMPLE).unwrap();
        let days = meeting_days(&s, DateWindow::new(d(2025, 5, 1), d(2025, 5, 31)));
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].0, d(2025, 5, 25));
        assert_eq!(days[1].1, vec![Venue::Known(Track::Tokyo), Venue::Known(Track::Kyoto)]);
        let hit = find_entry(&s, d(2025, 5, 24), &Venue::Known(Track::Kyoto)).unwrap();
        assert_eq!(hit.meeting, 3);
    }
}
