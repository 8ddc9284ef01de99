use crate::error::{LeaderboardError, Result};
use std::fmt;
use std::ops::RangeInclusive;

pub const DEFAULT_TOP_N: usize = 10;

/// The entity dimension a leaderboard ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Actor,
    Director,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Actor => "actor",
            Axis::Director => "director",
        }
    }

    /// Column holding the entity name in exported frames.
    pub fn column_name(self) -> &'static str {
        match self {
            Axis::Actor => "Actor",
            Axis::Director => "Director",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of as-of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(LeaderboardError::Config(format!(
                "year range start {start} is after end {end}"
            )));
        }
        Ok(YearRange { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn years(self) -> RangeInclusive<i32> {
        self.start..=self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardConfig {
    pub axis: Axis,
    pub top_n: usize,
    /// `None` spans every release year present in the data.
    pub years: Option<YearRange>,
}

impl LeaderboardConfig {
    pub fn new(axis: Axis) -> Self {
        LeaderboardConfig {
            axis,
            top_n: DEFAULT_TOP_N,
            years: None,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_years(mut self, years: YearRange) -> Self {
        self.years = Some(years);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(LeaderboardError::Config("top_n must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        LeaderboardConfig::new(Axis::Actor)
    }
}
