use crate::config::{Axis, LeaderboardConfig};
use crate::cumulative::cumulative;
use crate::data::Movies;
use crate::error::{LeaderboardError, Result, YearFailure};
use crate::expand::Credits;
use crate::ranking::select_top;
use polars::prelude::*;
use rayon::prelude::*;
use rustc_hash::FxHashMap as HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// One entity/title row of an animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    pub entity: String,
    /// 1-based position of the entity in this frame's ranking; draw order.
    pub entity_rank: usize,
    pub title: String,
    pub movie_votes: u64,
    pub mean_rating: f64,
    pub released_year: i32,
    pub cumulative_count: usize,
    pub cumulative_votes: u64,
    pub cumulative_rating: f64,
    pub movie_order: usize,
    pub year: i32,
    /// Only on the entity's chronologically last row.
    pub summary: Option<String>,
    pub director: Option<String>,
    pub runtime: f64,
    pub genre: String,
    pub gross: f64,
    pub overview: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub year: i32,
    pub rows: Vec<FrameRow>,
}

impl Frame {
    /// Entities in draw order.
    pub fn entities(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            if out.last() != Some(&row.entity.as_str()) {
                out.push(&row.entity);
            }
        }
        out
    }
}

/// Every frame of one axis, ascending by year.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    pub axis: Axis,
    pub frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn frame(&self, year: i32) -> Option<&Frame> {
        self.frames.iter().find(|f| f.year == year)
    }

    /// All rows of all frames, concatenated in year order.
    pub fn rows(&self) -> impl Iterator<Item = &FrameRow> {
        self.frames.iter().flat_map(|f| f.rows.iter())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rows: Vec<&FrameRow> = self.rows().collect();
        let mut df = df!(
            "Entity" => rows.iter().map(|r| r.entity.as_str()).collect::<Vec<_>>(),
            "Entity_Rank" => rows.iter().map(|r| r.entity_rank as u32).collect::<Vec<_>>(),
            "Series_Title" => rows.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
            "Movie_Votes" => rows.iter().map(|r| r.movie_votes).collect::<Vec<_>>(),
            "IMDB_Rating" => rows.iter().map(|r| r.mean_rating).collect::<Vec<_>>(),
            "Released_Year" => rows.iter().map(|r| r.released_year).collect::<Vec<_>>(),
            "Cumulative_Movie_Count" => rows.iter().map(|r| r.cumulative_count as u32).collect::<Vec<_>>(),
            "Cumulative_Votes" => rows.iter().map(|r| r.cumulative_votes).collect::<Vec<_>>(),
            "Cumulative_Rating" => rows.iter().map(|r| r.cumulative_rating).collect::<Vec<_>>(),
            "Movie_Order" => rows.iter().map(|r| r.movie_order as u32).collect::<Vec<_>>(),
            "Year" => rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            "Summary" => rows.iter().map(|r| r.summary.as_deref()).collect::<Vec<_>>(),
            "Director" => rows.iter().map(|r| r.director.as_deref()).collect::<Vec<_>>(),
            "Runtime" => rows.iter().map(|r| r.runtime).collect::<Vec<_>>(),
            "Genre" => rows.iter().map(|r| r.genre.as_str()).collect::<Vec<_>>(),
            "Gross" => rows.iter().map(|r| r.gross).collect::<Vec<_>>(),
            "Overview" => rows.iter().map(|r| r.overview.as_deref()).collect::<Vec<_>>(),
        )?;
        // On the director axis the passthrough column repeats the entity.
        if self.axis == Axis::Director {
            df = df.drop("Director")?;
        }
        df.rename("Entity", self.axis.column_name().into())?;
        Ok(df)
    }
}

/// Cooperative cancellation shared with in-flight year computations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct FrameBuilder<'a> {
    movies: &'a Movies,
    credits: Credits,
    config: LeaderboardConfig,
}

impl<'a> FrameBuilder<'a> {
    pub fn new(movies: &'a Movies, config: LeaderboardConfig) -> Result<Self> {
        config.validate()?;
        let credits = Credits::expand(movies, config.axis);
        Ok(FrameBuilder {
            movies,
            credits,
            config,
        })
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    pub fn build(&self) -> Result<FrameSequence> {
        self.build_with_cancel(&CancelToken::new())
    }

    /// Computes every year on the polars thread pool. Each year is
    /// independent; results are reassembled in ascending year order and any
    /// failed years are reported together.
    pub fn build_with_cancel(&self, cancel: &CancelToken) -> Result<FrameSequence> {
        let axis = self.config.axis;
        let Some(range) = self.config.years.or_else(|| self.movies.year_span()) else {
            return Ok(FrameSequence {
                axis,
                frames: Vec::new(),
            });
        };

        let start = Instant::now();
        let years: Vec<i32> = range.years().collect();
        let outcomes: Vec<(i32, Result<Frame>)> = polars_core::POOL.install(|| {
            years
                .par_iter()
                .map(|&year| (year, self.frame(year, cancel)))
                .collect()
        });

        let mut frames = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        let mut cancelled = false;
        for (year, outcome) in outcomes {
            match outcome {
                Ok(frame) => frames.push(frame),
                Err(LeaderboardError::Cancelled) => cancelled = true,
                Err(e) => {
                    tracing::warn!(axis = %axis, year, error = %e, "frame failed");
                    failures.push(YearFailure {
                        year,
                        reason: e.to_string(),
                    });
                }
            }
        }
        if cancelled {
            return Err(LeaderboardError::Cancelled);
        }
        if !failures.is_empty() {
            return Err(LeaderboardError::YearsFailed(failures));
        }

        tracing::info!(
            axis = %axis,
            from = range.start(),
            to = range.end(),
            frames = frames.len(),
            elapsed = ?start.elapsed(),
            "built frame sequence"
        );
        Ok(FrameSequence { axis, frames })
    }

    /// The ranked, annotated frame as of `year`.
    pub fn frame(&self, year: i32, cancel: &CancelToken) -> Result<Frame> {
        if cancel.is_cancelled() {
            return Err(LeaderboardError::Cancelled);
        }
        let records = cumulative(self.movies, &self.credits, year)?;
        let mut selection = select_top(records, self.config.top_n);

        let rank: HashMap<&str, usize> = selection
            .standings
            .iter()
            .map(|s| (s.entity, s.rank))
            .collect();
        // Stable: equal (rank, year) keeps chronological first-occurrence order.
        selection
            .records
            .sort_by_key(|r| (rank[r.credit.entity], r.credit.released_year));

        let mut last_row: HashMap<&str, usize> = HashMap::default();
        for (i, record) in selection.records.iter().enumerate() {
            last_row.insert(record.credit.entity, i);
        }

        let movies = self.movies;
        let mut movie_order: HashMap<&str, usize> = HashMap::default();
        let rows: Vec<FrameRow> = selection
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let credit = &record.credit;
                let order = movie_order.entry(credit.entity).or_insert(0);
                *order += 1;
                let summary = (last_row[credit.entity] == i).then(|| {
                    summary_text(
                        record.cumulative_count,
                        record.cumulative_rating,
                        record.cumulative_votes,
                    )
                });
                FrameRow {
                    entity: credit.entity.to_string(),
                    entity_rank: rank[credit.entity],
                    title: credit.title.to_string(),
                    movie_votes: credit.movie_votes,
                    mean_rating: credit.mean_rating,
                    released_year: credit.released_year,
                    cumulative_count: record.cumulative_count,
                    cumulative_votes: record.cumulative_votes,
                    cumulative_rating: record.cumulative_rating,
                    movie_order: *order,
                    year,
                    summary,
                    director: movies.director[credit.movie].clone(),
                    runtime: movies.runtime[credit.movie],
                    genre: movies.genre[credit.movie].clone(),
                    gross: movies.gross[credit.movie],
                    overview: movies.overview[credit.movie].clone(),
                }
            })
            .collect();

        tracing::debug!(
            axis = %self.config.axis,
            year,
            entities = selection.standings.len(),
            rows = rows.len(),
            "built frame"
        );
        Ok(Frame { year, rows })
    }
}

pub fn summary_text(count: usize, rating: f64, votes: u64) -> String {
    format!(
        "{count} movies, Avg IMDb: {rating:.1}, Total Votes: {}",
        group_thousands(votes)
    )
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
