// src/cli.rs
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, bail, eyre};

use crate::config::AppOptions;
use crate::config::consts::{DEFAULT_AHEAD_DAYS, DEFAULT_PAST_DAYS};
use crate::context::Context;
use crate::core::Client;
use crate::error::Error;
use crate::progress::Progress;
use crate::race_id::{DateWindow, RaceId, ScheduleEntry, Track, Venue, build_id, enumerate_ids};
use crate::schedule;
use crate::scrape::{RaceReport, RaceSource, Scraper};
use crate::store::{CacheStore, CsvTable, RaceResultRow};

#[derive(Debug, Parser)]
#[command(name = "pedigree_scrape", version, about = "Check race entrants' pedigrees against a reference bloodline list")]
pub struct Cli {
    /// TOML options file (default: ./pedigree_scrape.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Racing calendar CSV
    #[arg(long, global = true)]
    pub schedule: Option<PathBuf>,

    /// Reference bloodline CSV
    #[arg(long, global = true)]
    pub bloodlines: Option<PathBuf>,

    /// Directory for the cache and debug log
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// -v debug, -vv trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate every entrant of one race
    Race(RaceArgs),
    /// Refresh every race in a date window
    Batch(BatchArgs),
    /// List meeting days and tracks around today
    Dates(WindowArgs),
    /// Print the identifier for a race
    Id(RaceSelect),
}

#[derive(Debug, Args)]
pub struct RaceSelect {
    /// Twelve-digit race identifier; skips the schedule lookup
    #[arg(long, conflicts_with_all = ["date", "track", "race"])]
    pub id: Option<RaceId>,
    #[arg(long, required_unless_present = "id")]
    pub date: Option<NaiveDate>,
    /// Track name, e.g. Tokyo or 東京
    #[arg(long, required_unless_present = "id")]
    pub track: Option<String>,
    #[arg(long, required_unless_present = "id")]
    pub race: Option<u8>,
}

#[derive(Debug, Args)]
pub struct RaceArgs {
    #[command(flatten)]
    pub select: RaceSelect,
    /// Ignore cached rows and fetch again
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Debug, Args)]
pub struct WindowArgs {
    #[arg(long, default_value_t = DEFAULT_PAST_DAYS)]
    pub past: i64,
    #[arg(long, default_value_t = DEFAULT_AHEAD_DAYS)]
    pub ahead: i64,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
    #[command(flatten)]
    pub window: WindowArgs,
    /// Serve races that are already cached instead of refetching
    #[arg(long)]
    pub use_cache: bool,
}

impl Cli {
    /// File options with command-line overrides applied.
    pub fn options(&self) -> crate::error::Result<AppOptions> {
        let mut opts = AppOptions::load(self.config.as_deref())?;
        if let Some(p) = &self.schedule { opts.data.schedule = p.clone(); }
        if let Some(p) = &self.bloodlines { opts.data.bloodlines = p.clone(); }
        if let Some(p) = &self.store { opts.store.dir = p.clone(); }
        Ok(opts)
    }
}

pub fn run(cli: Cli, opts: AppOptions) -> Result<()> {
    match cli.command {
        Command::Id(select) => {
            let id = resolve_id(&select, &opts)?;
            println!("{id}");
            Ok(())
        }
        Command::Dates(w) => {
            let sched = load_schedule(&opts)?;
            let window = DateWindow::around(Local::now().date_naive(), w.past, w.ahead);
            for (date, venues) in schedule::meeting_days(&sched, window) {
                let names: Vec<String> = venues.iter().map(Venue::to_string).collect();
                println!("{date}  {}", names.join(", "));
            }
            Ok(())
        }
        Command::Race(args) => {
            let id = resolve_id(&args.select, &opts)?;
            let use_cache = opts.store.use_cache && !args.no_cache;
            let ctx = Context::load(opts).wrap_err("loading reference bloodlines")?;
            let mut scraper = live_scraper(&ctx)?;
            let report = scraper.run_race(&id, use_cache, &mut PrintProgress)?;
            print_report(&report);
            Ok(())
        }
        Command::Batch(args) => {
            let sched = load_schedule(&opts)?;
            let window = match (args.from, args.to) {
                (Some(from), Some(to)) => DateWindow::new(from, to),
                _ => DateWindow::around(Local::now().date_naive(), args.window.past, args.window.ahead),
            };
            let ids = enumerate_ids(&sched, window);
            tracing::info!(races = ids.len(), from = %window.start, to = %window.end, "batch window");

            let ctx = Context::load(opts).wrap_err("loading reference bloodlines")?;
            let mut scraper = live_scraper(&ctx)?;
            let summary = scraper.run_batch(&ids, args.use_cache, &mut PrintProgress);

            println!(
                "races: {} attempted, {} stored, {} cached, {} empty, {} failed",
                summary.races_attempted,
                summary.races_persisted,
                summary.races_cached,
                summary.races_empty,
                summary.races_failed.len()
            );
            for (id, msg) in &summary.races_failed {
                println!("  {id}: {msg}");
            }
            Ok(())
        }
    }
}

fn live_scraper(ctx: &Context) -> Result<Scraper<'_, Client, CsvTable>> {
    let http = Client::new(&ctx.options.net)?;
    let table = CsvTable::new(ctx.options.store.cache_path());
    Ok(Scraper::new(ctx, http, CacheStore::new(table)))
}

fn load_schedule(opts: &AppOptions) -> Result<Vec<ScheduleEntry>> {
    let path = &opts.data.schedule;
    schedule::load(path).wrap_err_with(|| format!("reading schedule {}", path.display()))
}

fn resolve_id(select: &RaceSelect, opts: &AppOptions) -> Result<RaceId> {
    if let Some(id) = &select.id {
        return Ok(id.clone());
    }
    let (Some(date), Some(track), Some(race)) = (select.date, &select.track, select.race) else {
        bail!("either --id or all of --date, --track and --race are required");
    };
    let venue = Venue::Known(track.parse::<Track>()?);
    let sched = load_schedule(opts)?;
    let entry = schedule::find_entry(&sched, date, &venue)
        .ok_or_else(|| eyre!("no meeting at {venue} on {date} in the schedule"))?;
    Ok(build_id(entry, race)?)
}

fn print_report(report: &RaceReport) {
    let origin = match report.source {
        RaceSource::Cached => "cached",
        RaceSource::Live => "live",
    };
    println!("{} ({origin}, {} entrants, {} failed)", report.race_id, report.rows.len(), report.failed_count());
    for row in &report.rows {
        println!("{}\t{}\t{}", row.entrant, row.match_count, row.rendered);
    }
}

/// Progress lines on stdout.
struct PrintProgress;

impl Progress for PrintProgress {
    fn begin(&mut self, race_id: &RaceId, total: usize) {
        println!("{race_id}: {total} entrants");
    }

    fn log(&mut self, msg: &str) {
        println!("{msg}");
    }

    fn entrant_done(&mut self, index: usize, row: &RaceResultRow) {
        println!("  [{index}] {} - {} match(es)", row.entrant, row.match_count);
    }

    fn entrant_failed(&mut self, index: usize, name: &str, err: &Error) {
        println!("  [{index}] {name} - failed: {err}");
    }
}
