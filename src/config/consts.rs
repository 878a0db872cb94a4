// src/config/consts.rs

// Net config
pub const RACE_HOST: &str = "https://race.netkeiba.com";
pub const DB_HOST: &str = "https://db.netkeiba.com";
pub const RACE_CARD_PATH: &str = "/race/shutuba.html?race_id={id}";
pub const PEDIGREE_PATH: &str = "/horse/ped/{id}/";
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; pedigree_scrape/0.3)";
pub const DEFAULT_CHARSET: &str = "EUC-JP";
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

// Page markers
pub const ROSTER_TABLE_CLASS: &str = "RaceTable01";
pub const PEDIGREE_TABLE_CLASS: &str = "blood_table";
pub const HORSE_HREF_MARKER: &str = "/horse/";
pub const MIN_ENTRANT_NAME_CHARS: usize = 2;

// Pacing (be polite)
pub const ENTRANT_PAUSE_MS: u64 = 1_200;
pub const RACE_PAUSE_MS: u64 = 2_000;

// Local store
pub const STORE_DIR: &str = ".store";
pub const CACHE_FILE: &str = "cache.csv";
pub const LOG_FILE: &str = "debug.log";
pub const CONFIG_FILE: &str = "pedigree_scrape.toml";
pub const SCHEDULE_FILE: &str = "schedule.csv";
pub const BLOODLINES_FILE: &str = "bloodlines.csv";

// Rendered sentinels
pub const NO_MATCH: &str = "no match";
pub const FETCH_FAILED: &str = "fetch failed";
pub const MATCH_SEPARATOR: &str = "<br>";

// Race numbering
pub const RACES_PER_DAY: u8 = 12;

// Picker window around today
pub const DEFAULT_PAST_DAYS: i64 = 31;
pub const DEFAULT_AHEAD_DAYS: i64 = 7;
