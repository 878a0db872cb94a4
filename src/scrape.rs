// src/scrape.rs
//! Race runs: cache check, roster, per-entrant pedigree + match, persist.
//!
//! Everything is sequential. Requests to the site are spaced by the entrant
//! throttle. After every live race, persisted, empty or failed, the race
//! throttle holds the next roster request back for a full race interval.
//! An entrant that fails is recorded as a failed row; only a roster failure
//! ends a race.

use crate::bloodline::{MatchRecord, find_matches};
use crate::context::Context;
use crate::core::{HttpGet, Throttle};
use crate::error::{Error, Result};
use crate::progress::Progress;
use crate::race_id::RaceId;
use crate::specs::{pedigree, roster};
use crate::specs::roster::Entrant;
use crate::store::{CacheStore, RaceResultRow, Table};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceSource {
    Cached,
    Live,
}

#[derive(Clone, Debug)]
pub struct RaceReport {
    pub race_id: RaceId,
    pub source: RaceSource,
    pub rows: Vec<RaceResultRow>,
}

impl RaceReport {
    pub fn failed_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_failed()).count()
    }
}

#[derive(Clone, Debug, Default)]
pub struct BatchSummary {
    pub races_attempted: usize,
    pub races_cached: usize,
    pub races_persisted: usize,
    /// Races with no published entrants; nothing stored.
    pub races_empty: usize,
    pub races_failed: Vec<(RaceId, String)>,
}

pub struct Scraper<'c, H: HttpGet, T: Table> {
    ctx: &'c Context,
    http: H,
    store: CacheStore<T>,
    entrant_pace: Throttle,
    race_pace: Throttle,
}

impl<'c, H: HttpGet, T: Table> Scraper<'c, H, T> {
    pub fn new(ctx: &'c Context, http: H, store: CacheStore<T>) -> Self {
        let pacing = &ctx.options.pacing;
        Self {
            ctx,
            http,
            store,
            entrant_pace: Throttle::every_ms(pacing.entrant_ms),
            race_pace: Throttle::every_ms(pacing.race_ms),
        }
    }

    pub fn store(&self) -> &CacheStore<T> { &self.store }
    pub fn into_store(self) -> CacheStore<T> { self.store }

    /// Evaluate one race. With `use_cache`, cached rows are returned as-is.
    pub fn run_race(
        &mut self,
        id: &RaceId,
        use_cache: bool,
        progress: &mut dyn Progress,
    ) -> Result<RaceReport> {
        if use_cache {
            match self.store.load(id) {
                Ok(Some(rows)) => {
                    tracing::info!(race_id = %id, rows = rows.len(), "served from cache");
                    progress.log(&format!("{id}: {} rows from cache", rows.len()));
                    return Ok(RaceReport { race_id: id.clone(), source: RaceSource::Cached, rows });
                }
                Ok(None) => {}
                // A broken cache shouldn't block a live lookup
                Err(e) => tracing::warn!(race_id = %id, "cache load failed, fetching live: {e}"),
            }
        }

        self.race_pace.wait();
        let live = self.run_live(id, progress);
        self.race_pace.restart();
        live
    }

    fn run_live(&mut self, id: &RaceId, progress: &mut dyn Progress) -> Result<RaceReport> {
        self.entrant_pace.wait();
        let entrants = roster::fetch(&self.http, &self.ctx.options.net, id)?;
        tracing::info!(race_id = %id, entrants = entrants.len(), "roster fetched");
        progress.begin(id, entrants.len());

        let mut rows = Vec::with_capacity(entrants.len());
        for (i, entrant) in entrants.iter().enumerate() {
            let index = i + 1;
            self.entrant_pace.wait();
            match self.evaluate(entrant) {
                Ok(matches) => {
                    let row = RaceResultRow::matched(id, &entrant.name, &matches);
                    tracing::info!(race_id = %id, entrant = %entrant.name, matches = row.match_count, "evaluated");
                    progress.entrant_done(index, &row);
                    rows.push(row);
                }
                Err(e) if e.is_entrant_recoverable() => {
                    tracing::warn!(race_id = %id, entrant = %entrant.name, "evaluation failed: {e}");
                    progress.entrant_failed(index, &entrant.name, &e);
                    rows.push(RaceResultRow::failed(id, &entrant.name));
                }
                Err(e) => {
                    progress.finish();
                    return Err(e);
                }
            }
        }

        if rows.is_empty() {
            tracing::info!(race_id = %id, "no entrants, nothing cached");
        } else {
            self.store.replace(id, &rows).map_err(|e| match e {
                Error::Cache(_) => e,
                other => Error::Cache(other.to_string()),
            })?;
        }
        progress.finish();

        Ok(RaceReport { race_id: id.clone(), source: RaceSource::Live, rows })
    }

    /// Pedigree lookup and matching for one entrant.
    pub fn evaluate(&self, entrant: &Entrant) -> Result<Vec<MatchRecord>> {
        let ped = pedigree::fetch(
            &self.http,
            &self.ctx.options.net,
            entrant,
            self.ctx.labels,
            self.ctx.options.data.strict_layout,
        )?;
        Ok(find_matches(&ped, &self.ctx.reference))
    }

    /// Run many races back to back. A failing race is recorded and skipped.
    pub fn run_batch(
        &mut self,
        ids: &[RaceId],
        use_cache: bool,
        progress: &mut dyn Progress,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for id in ids {
            summary.races_attempted += 1;
            match self.run_race(id, use_cache, progress) {
                Ok(report) => match report.source {
                    RaceSource::Cached => summary.races_cached += 1,
                    RaceSource::Live if report.rows.is_empty() => summary.races_empty += 1,
                    RaceSource::Live => summary.races_persisted += 1,
                },
                Err(e) => {
                    tracing::error!(race_id = %id, "race failed: {e}");
                    progress.log(&format!("{id}: {e}"));
                    summary.races_failed.push((id.clone(), e.to_string()));
                }
            }
        }
        tracing::info!(
            attempted = summary.races_attempted,
            persisted = summary.races_persisted,
            cached = summary.races_cached,
            empty = summary.races_empty,
            failed = summary.races_failed.len(),
            "batch finished"
        );
        summary
    }
}
