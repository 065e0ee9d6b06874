//! Highscores.
//!
//! Each won, unseeded game produces a `Record`. Records are ranked per mode
//! by `time * (2 - rating)` and the best ten are kept. The store is a
//! bincode blob holding the records and the player's options.

use crate::options::HitTolerance;
use crate::timer::format_elapsed;
use crate::{ModeConfig, Options, RecordError, MODES};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_RECORDS_KEPT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Elapsed seconds.
    pub time_val: f64,
    pub seed: u64,
    pub time_str: String,
    pub guesses: u32,
    pub hits: u32,
    pub blows: u32,
    pub opt_mouseover: bool,
    pub opt_tracker: bool,
    pub opt_allow_hits: HitTolerance,
}

impl Record {
    /// A record with no blackjack statistics and all aids off.
    pub fn new(elapsed: Duration, seed: u64) -> Self {
        Self {
            time_val: elapsed.as_secs_f64(),
            seed,
            time_str: format_elapsed(elapsed),
            guesses: 0,
            hits: 0,
            blows: 0,
            opt_mouseover: false,
            opt_tracker: false,
            opt_allow_hits: HitTolerance::Disallow,
        }
    }

    /// Quality of the run in blackjack mode; always 1.0 in standard mode.
    ///
    /// Sub-rates are not clamped, so more guesses than cards can push the
    /// rating below zero.
    pub fn rating(&self, mode: &ModeConfig) -> f64 {
        if !mode.special {
            return 1.0;
        }
        let inverted = |flag: bool| if flag { 0.0 } else { 1.0 };
        let max_blows = 3.0 * f64::from(mode.deck_multiplier() + 3);

        let weighted = [
            (1.0 - f64::from(self.guesses) / f64::from(mode.amount), 0.20),
            (1.0 - f64::from(self.hits) / 21.0, 0.20),
            (1.0 - f64::from(self.blows) / max_blows, 0.20),
            (inverted(self.opt_mouseover), 0.05),
            (inverted(self.opt_tracker), 0.05),
            (1.0 - f64::from(self.opt_allow_hits.level()) / 2.0, 0.30),
        ];
        weighted.iter().map(|(rate, weight)| rate * weight).sum()
    }

    /// Ranking key, lower is better: the time inflated by a poor rating.
    pub fn sort_key(&self, mode: &ModeConfig) -> f64 {
        2.0 * self.time_val - self.time_val * self.rating(mode)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    records: BTreeMap<String, Vec<Record>>,
    options: Option<Options>,
}

/// The persisted highscore table.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    data: StoreFile,
    max: usize,
}

impl RecordStore {
    /// `records.bin` in the platform data directory.
    pub fn default_path() -> Result<PathBuf, RecordError> {
        let dirs = ProjectDirs::from("", "", "sweeper").ok_or(RecordError::NoDataDirectory)?;
        Ok(dirs.data_dir().join("records.bin"))
    }

    /// Loads the store. A missing file yields a fresh, empty store; an
    /// unreadable one is `RecordError::Corrupted`, which callers answer
    /// with `reinitialize`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let path = path.into();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no record store found, starting empty");
                return Self::reinitialize(path);
            }
            Err(err) => return Err(err.into()),
        };
        let data: StoreFile = bincode::deserialize(&bytes).map_err(|err| {
            warn!(path = %path.display(), %err, "record store is corrupted");
            RecordError::Corrupted(err.to_string())
        })?;
        Ok(Self {
            path,
            data,
            max: DEFAULT_RECORDS_KEPT,
        })
    }

    /// Replaces whatever is at `path` with an empty store.
    pub fn reinitialize(path: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let mut store = Self {
            path: path.into(),
            data: StoreFile::default(),
            max: DEFAULT_RECORDS_KEPT,
        };
        store.clear()?;
        Ok(store)
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), RecordError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let bytes = bincode::serialize(&self.data)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Empties every mode's list.
    pub fn clear(&mut self) -> Result<(), RecordError> {
        self.data.records = MODES
            .iter()
            .map(|mode| (mode.descriptor(), Vec::new()))
            .collect();
        self.save()
    }

    /// Inserts `record`, keeps the best `max`, and saves. Returns the
    /// 0-based rank if the record made the table.
    pub fn add_record(
        &mut self,
        mode: &ModeConfig,
        record: Record,
    ) -> Result<Option<usize>, RecordError> {
        let records = self.data.records.entry(mode.descriptor()).or_default();
        let key = record.sort_key(mode);
        let index = records.partition_point(|r| r.sort_key(mode).total_cmp(&key).is_le());
        let rank = (index < self.max).then_some(index);
        if rank.is_some() {
            records.insert(index, record.clone());
            records.truncate(self.max);
        }
        info!(mode = %mode, ?rank, time = %record.time_str, "record added");
        self.save()?;
        Ok(rank)
    }

    /// Ranked records for `mode`, best first.
    pub fn records(&self, mode: &ModeConfig) -> &[Record] {
        self.data
            .records
            .get(&mode.descriptor())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Mode descriptors in the store.
    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.data.records.keys().map(String::as_str)
    }

    pub fn options(&self) -> Option<Options> {
        self.data.options
    }

    pub fn set_options(&mut self, options: Options) -> Result<(), RecordError> {
        self.data.options = Some(options);
        self.save()
    }
}
