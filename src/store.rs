// src/store.rs
//! Race-keyed result cache.
//!
//! The backing [`Table`] is a flat list of rows tagged with a race id, with
//! no uniqueness constraint of its own. [`CacheStore::replace`] keeps one
//! generation of rows per race by deleting the old rows before adding the new.
//! A malformed row in the CSV file fails reads; rewrites drop it.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::bloodline::{MatchRecord, render_matches};
use crate::config::consts::FETCH_FAILED;
use crate::csv::{self, cell};
use crate::error::{Error, Result};
use crate::race_id::RaceId;

pub const COLUMNS: [&str; 4] = ["entrant-name", "match-count", "rendered-matches", "race-identifier"];

/// One entrant's outcome for one race; the persisted unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RaceResultRow {
    pub entrant: String,
    pub match_count: usize,
    pub rendered: String,
    pub race_id: RaceId,
}

impl RaceResultRow {
    pub fn matched(race_id: &RaceId, entrant: &str, matches: &[MatchRecord]) -> Self {
        Self {
            entrant: entrant.to_string(),
            match_count: matches.len(),
            rendered: render_matches(matches),
            race_id: race_id.clone(),
        }
    }

    /// Row kept for an entrant whose pedigree could not be read.
    pub fn failed(race_id: &RaceId, entrant: &str) -> Self {
        Self {
            entrant: entrant.to_string(),
            match_count: 0,
            rendered: FETCH_FAILED.to_string(),
            race_id: race_id.clone(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.match_count == 0 && self.rendered == FETCH_FAILED
    }

    fn to_cells(&self) -> [String; 4] {
        [
            self.entrant.clone(),
            self.match_count.to_string(),
            self.rendered.clone(),
            self.race_id.to_string(),
        ]
    }

    fn from_cells(row: &[String]) -> Result<Self> {
        if row.len() != COLUMNS.len() {
            return Err(Error::Cache(format!("expected {} columns, got {}", COLUMNS.len(), row.len())));
        }
        let match_count = cell(row, 1)
            .trim()
            .parse()
            .map_err(|_| Error::Cache(format!("bad match count {:?}", cell(row, 1))))?;
        let race_id = cell(row, 3)
            .parse()
            .map_err(|e| Error::Cache(format!("bad race id: {e}")))?;
        Ok(Self {
            entrant: cell(row, 0).to_string(),
            match_count,
            rendered: cell(row, 2).to_string(),
            race_id,
        })
    }
}

/// An external table of result rows: select by race, append, delete by race.
pub trait Table {
    fn select(&self, id: &RaceId) -> Result<Vec<RaceResultRow>>;
    fn append(&mut self, rows: &[RaceResultRow]) -> Result<()>;
    /// Remove every row for `id`; returns how many went.
    fn delete(&mut self, id: &RaceId) -> Result<usize>;

    /// Swap the rows for `id`. Backends that can do this in one write
    /// should override; the default is delete then append.
    fn replace_rows(&mut self, id: &RaceId, rows: &[RaceResultRow]) -> Result<()> {
        self.delete(id)?;
        self.append(rows)
    }
}

/// In-process table.
#[derive(Clone, Debug, Default)]
pub struct MemoryTable {
    rows: Vec<RaceResultRow>,
}

impl MemoryTable {
    pub fn new() -> Self { Self::default() }
    pub fn rows(&self) -> &[RaceResultRow] { &self.rows }
}

impl Table for MemoryTable {
    fn select(&self, id: &RaceId) -> Result<Vec<RaceResultRow>> {
        Ok(self.rows.iter().filter(|r| &r.race_id == id).cloned().collect())
    }

    fn append(&mut self, rows: &[RaceResultRow]) -> Result<()> {
        self.rows.extend_from_slice(rows);
        Ok(())
    }

    fn delete(&mut self, id: &RaceId) -> Result<usize> {
        let before = self.rows.len();
        self.rows.retain(|r| &r.race_id != id);
        Ok(before - self.rows.len())
    }
}

/// One CSV file holding every race's rows under a header line.
#[derive(Clone, Debug)]
pub struct CsvTable {
    path: PathBuf,
}

impl CsvTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Raw data rows, header skipped.
    fn read_cells(&self) -> Result<Vec<Vec<String>>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Cache(format!("{}: {e}", self.path.display()))),
        };
        let mut rows = csv::parse_rows(&text);
        if rows.first().is_some_and(|r| cell(r, 0) == COLUMNS[0]) {
            rows.remove(0);
        }
        Ok(rows)
    }

    fn read_all(&self) -> Result<Vec<RaceResultRow>> {
        self.read_cells()?.iter().map(|r| RaceResultRow::from_cells(r)).collect()
    }

    /// Rows for a rewrite. Malformed rows are dropped with a warning so one
    /// bad line can't block every later write.
    fn read_for_rewrite(&self) -> Result<Vec<RaceResultRow>> {
        let cells = self.read_cells()?;
        let mut rows = Vec::with_capacity(cells.len());
        for (i, r) in cells.iter().enumerate() {
            match RaceResultRow::from_cells(r) {
                Ok(row) => rows.push(row),
                Err(e) => tracing::warn!(path = %self.path.display(), row = i + 1, error = %e, "dropping malformed cache row"),
            }
        }
        Ok(rows)
    }

    /// Write all rows to a sibling temp file, then rename over the table.
    fn write_all(&self, rows: &[RaceResultRow]) -> Result<()> {
        self.ensure_parent()?;
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut out = BufWriter::new(File::create(&tmp)?);
            csv::write_row(&mut out, &COLUMNS)?;
            for r in rows {
                csv::write_row(&mut out, &r.to_cells())?;
            }
            out.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl Table for CsvTable {
    fn select(&self, id: &RaceId) -> Result<Vec<RaceResultRow>> {
        let mut rows = self.read_all()?;
        rows.retain(|r| &r.race_id == id);
        Ok(rows)
    }

    fn append(&mut self, rows: &[RaceResultRow]) -> Result<()> {
        if rows.is_empty() { return Ok(()); }
        self.ensure_parent()?;
        let fresh = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut out = BufWriter::new(file);
        if fresh {
            csv::write_row(&mut out, &COLUMNS)?;
        }
        for r in rows {
            csv::write_row(&mut out, &r.to_cells())?;
        }
        out.flush()?;
        Ok(())
    }

    fn delete(&mut self, id: &RaceId) -> Result<usize> {
        let mut rows = self.read_for_rewrite()?;
        let before = rows.len();
        rows.retain(|r| &r.race_id != id);
        let removed = before - rows.len();
        if removed > 0 {
            self.write_all(&rows)?;
        }
        Ok(removed)
    }

    /// Single rewrite: old rows for `id` never coexist with new ones on disk.
    fn replace_rows(&mut self, id: &RaceId, new_rows: &[RaceResultRow]) -> Result<()> {
        let mut rows = self.read_for_rewrite()?;
        rows.retain(|r| &r.race_id != id);
        rows.extend_from_slice(new_rows);
        self.write_all(&rows)
    }
}

/// Cache over a [`Table`]. `replace` takes `&mut self`, so writes for a race
/// can't interleave.
pub struct CacheStore<T: Table> {
    table: T,
}

impl<T: Table> CacheStore<T> {
    pub fn new(table: T) -> Self { Self { table } }

    pub fn table(&self) -> &T { &self.table }
    pub fn into_inner(self) -> T { self.table }

    /// Rows for `id`, or `None` when nothing is cached.
    pub fn load(&self, id: &RaceId) -> Result<Option<Vec<RaceResultRow>>> {
        let rows = self.table.select(id)?;
        Ok(if rows.is_empty() { None } else { Some(rows) })
    }

    /// Drop all rows for `id` and store `rows` in their place.
    /// An empty `rows` just clears the race.
    pub fn replace(&mut self, id: &RaceId, rows: &[RaceResultRow]) -> Result<()> {
        if let Some(stray) = rows.iter().find(|r| &r.race_id != id) {
            return Err(Error::Cache(format!(
                "row for {} passed to replace({id})", stray.race_id
            )));
        }
        self.table.replace_rows(id, rows)?;
        tracing::debug!(race_id = %id, rows = rows.len(), "cache replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RaceId { s.parse().unwrap() }

    fn rows(race: &RaceId, names: &[&str]) -> Vec<RaceResultRow> {
        names.iter().map(|n| RaceResultRow::matched(race, n, &[])).collect()
    }

    #[test]
    fn replace_twice_leaves_one_generation() {
        let (a, b) = (id("202505020811"), id("202505020812"));
        let mut store = CacheStore::new(MemoryTable::new());
        store.replace(&b, &rows(&b, &["Other"])).unwrap();

        let r = rows(&a, &["Horse A", "Horse B"]);
        store.replace(&a, &r).unwrap();
        store.replace(&a, &r).unwrap();

        assert_eq!(store.load(&a).unwrap().unwrap(), r);
        assert_eq!(store.load(&b).unwrap().unwrap().len(), 1);
        assert_eq!(store.table().rows().len(), 3);
    }

    #[test]
    fn empty_replace_clears_and_load_reports_absent() {
        let a = id("202505020811");
        let mut store = CacheStore::new(MemoryTable::new());
        assert_eq!(store.load(&a).unwrap(), None);
        store.replace(&a, &[]).unwrap();
        store.replace(&a, &rows(&a, &["X1"])).unwrap();
        store.replace(&a, &[]).unwrap();
        assert_eq!(store.load(&a).unwrap(), None);
    }

    #[test]
    fn rejects_rows_for_another_race() {
        let (a, b) = (id("202505020811"), id("202505020812"));
        let mut store = CacheStore::new(MemoryTable::new());
        assert!(matches!(store.replace(&a, &rows(&b, &["X1"])), Err(Error::Cache(_))));
    }

    #[test]
    fn failed_rows_round_trip_their_marker() {
        let a = id("202505020811");
        let r = RaceResultRow::failed(&a, "Horse B");
        assert!(r.is_failed());
        assert_eq!(RaceResultRow::from_cells(&r.to_cells()).unwrap(), r);
        assert!(!RaceResultRow::matched(&a, "Horse A", &[]).is_failed());
    }

    #[test]
    fn malformed_cells_are_cache_errors() {
        let bad_count = ["n".to_string(), "two".into(), "x".into(), "202505020811".into()];
        assert!(matches!(RaceResultRow::from_cells(&bad_count), Err(Error::Cache(_))));
        let short = ["n".to_string(), "1".into()];
        assert!(matches!(RaceResultRow::from_cells(&short), Err(Error::Cache(_))));
    }
}
