//! Generation naming and retention selection
//!
//! Every rebuild writes into a fresh collection named `{alias}_{millis}`.
//! The numeric suffix is the only ordering key; names whose suffix is not a
//! plain unsigned integer are never treated as generations of the alias.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of generation timestamps
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// One physical collection behind an alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    alias: String,
    timestamp: u64,
}

impl Generation {
    pub fn new(alias: impl Into<String>, timestamp: u64) -> Self {
        Self {
            alias: alias.into(),
            timestamp,
        }
    }

    /// Generation for `alias` stamped with the current time of `clock`
    pub fn at(alias: impl Into<String>, clock: &dyn Clock) -> Self {
        Self::new(alias, clock.now_millis().max(0) as u64)
    }

    /// Parse a collection name back into a generation of `alias`
    pub fn parse(alias: &str, name: &str) -> Option<Self> {
        let suffix = name.strip_prefix(alias)?.strip_prefix('_')?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        suffix.parse().ok().map(|timestamp| Self::new(alias, timestamp))
    }

    /// Wildcard matching every generation of `alias`
    pub fn pattern(alias: &str) -> String {
        format!("{}_*", alias)
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.alias, self.timestamp)
    }
}

/// Pick the generations to delete so that `retention` remain
///
/// Generations are ordered newest first by timestamp. The live generation is
/// always kept and counts toward the retention.
pub fn select_for_pruning(
    alias: &str,
    collections: &[String],
    retention: usize,
    live: &str,
) -> Vec<String> {
    let mut generations: Vec<Generation> = collections
        .iter()
        .filter_map(|name| Generation::parse(alias, name))
        .collect();
    generations.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    generations.dedup();

    let mut kept = 0;
    let mut doomed = Vec::new();
    for generation in generations {
        let name = generation.name();
        if name == live {
            continue;
        }
        // The live generation occupies one retention slot.
        if kept + 1 < retention {
            kept += 1;
        } else {
            doomed.push(name);
        }
    }
    doomed
}
