use crate::config::YearRange;
use crate::error::{LeaderboardError, Result};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2024;

pub const TITLE: &str = "Series_Title";
pub const RELEASED_YEAR: &str = "Released_Year";
pub const VOTES: &str = "No_of_Votes";
pub const RATING: &str = "IMDB_Rating";
pub const GROSS: &str = "Gross";
pub const RUNTIME: &str = "Runtime";
pub const GENRE: &str = "Genre";
pub const DIRECTOR: &str = "Director";
pub const OVERVIEW: &str = "Overview";
pub const CERTIFICATE: &str = "Certificate";
pub const STARS: [&str; 4] = ["Star1", "Star2", "Star3", "Star4"];

/// Columns the cleaner drops rows on when null.
const CLEAN_ON: [&str; 4] = [RATING, GROSS, GENRE, RELEASED_YEAR];

// imdb_top_1000.csv
//     Poster_Link text,
//     Series_Title text NOT NULL,
//     Released_Year text,          -- integer after cleaning, 1900..=2024
//     Certificate text,
//     Runtime text,                -- "142 min"
//     Genre text,                  -- "Crime, Drama"
//     IMDB_Rating real,
//     Overview text,
//     Meta_score real,
//     Director text,
//     Star1 text, Star2 text, Star3 text, Star4 text,
//     No_of_Votes integer,
//     Gross text                   -- "28,341,469"

pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Drops incomplete rows, coerces the numeric columns and orders the table
/// by release year. Row order within a year is preserved.
pub fn clean(raw: DataFrame) -> Result<DataFrame> {
    for name in CLEAN_ON.into_iter().chain([TITLE, VOTES, RUNTIME]) {
        if raw.column(name).is_err() {
            return Err(LeaderboardError::MissingColumn(name.to_string()));
        }
    }
    let before = raw.height();

    let not_null = CLEAN_ON
        .into_iter()
        .map(|name| col(name).is_not_null())
        .reduce(|acc, e| acc.and(e))
        .unwrap_or_else(|| lit(true));

    let cleaned = raw
        .lazy()
        .filter(not_null)
        .with_columns([
            col(RELEASED_YEAR)
                .cast(DataType::String)
                .cast(DataType::Int32),
            col(GROSS)
                .cast(DataType::String)
                .str()
                .replace_all(lit(r"[\$,]"), lit(""), false)
                .cast(DataType::Float64),
            col(VOTES).cast(DataType::Int64),
            col(RATING).cast(DataType::Float64),
            col(RUNTIME)
                .cast(DataType::String)
                .str()
                .extract(lit(r"(\d+)"), 1)
                .cast(DataType::Float64)
                .fill_null(lit(0.0)),
        ])
        .filter(
            col(RELEASED_YEAR)
                .gt_eq(lit(MIN_YEAR))
                .and(col(RELEASED_YEAR).lt_eq(lit(MAX_YEAR))),
        )
        .sort(
            [RELEASED_YEAR],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    tracing::info!(
        rows_before = before,
        rows_after = cleaned.height(),
        "cleaned movie table"
    );
    Ok(cleaned)
}

/// The clean movie table, one vector per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movies {
    pub title: Vec<String>,
    pub released_year: Vec<i32>,
    pub votes: Vec<u64>,
    pub rating: Vec<f64>,
    pub gross: Vec<f64>,
    pub runtime: Vec<f64>,
    pub genre: Vec<String>,
    pub primary_genre: Vec<String>,
    pub decade: Vec<i32>,
    pub director: Vec<Option<String>>,
    pub stars: [Vec<Option<String>>; 4],
    pub overview: Vec<Option<String>>,
    pub certificate: Vec<Option<String>>,
}

impl Movies {
    /// Extracts typed columns from a cleaned frame. Any null in a required
    /// column is rejected rather than skipped.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let height = df.height();

        let released_year: Vec<i32> = required_column(df, RELEASED_YEAR, &DataType::Int32)?
            .i32()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| v.ok_or_else(|| violation(RELEASED_YEAR, row)))
            .collect::<Result<_>>()?;

        let votes: Vec<u64> = required_column(df, VOTES, &DataType::Int64)?
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.and_then(|v| u64::try_from(v).ok())
                    .ok_or_else(|| violation(VOTES, row))
            })
            .collect::<Result<_>>()?;

        let rating = required_f64(df, RATING)?;
        let gross = required_f64(df, GROSS)?;
        let runtime: Vec<f64> = match df.column(RUNTIME) {
            Ok(c) => c
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect(),
            Err(_) => vec![0.0; height],
        };

        let genre = required_str(df, GENRE)?;
        let primary_genre = genre
            .iter()
            .map(|g| g.split(',').next().unwrap_or_default().trim().to_string())
            .collect();
        let decade = released_year.iter().map(|y| y.div_euclid(10) * 10).collect();

        Ok(Movies {
            title: required_str(df, TITLE)?,
            released_year,
            votes,
            rating,
            gross,
            runtime,
            genre,
            primary_genre,
            decade,
            director: optional_str(df, DIRECTOR)?,
            stars: [
                optional_str(df, STARS[0])?,
                optional_str(df, STARS[1])?,
                optional_str(df, STARS[2])?,
                optional_str(df, STARS[3])?,
            ],
            overview: optional_str(df, OVERVIEW)?,
            certificate: optional_str(df, CERTIFICATE)?,
        })
    }

    pub fn len(&self) -> usize {
        self.title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
    }

    /// Earliest and latest release year in the table.
    pub fn year_span(&self) -> Option<YearRange> {
        let min = self.released_year.iter().copied().min()?;
        let max = self.released_year.iter().copied().max()?;
        YearRange::new(min, max).ok()
    }
}

/// Reads, cleans and extracts the movie table in one go.
pub fn load(path: impl AsRef<Path>) -> Result<Movies> {
    let start = Instant::now();
    let raw = read_csv(path.as_ref())?;
    let movies = Movies::from_frame(&clean(raw)?)?;
    tracing::info!(
        path = %path.as_ref().display(),
        movies = movies.len(),
        elapsed = ?start.elapsed(),
        "loaded movie table"
    );
    Ok(movies)
}

fn violation(column: &'static str, row: usize) -> LeaderboardError {
    LeaderboardError::InputContract { column, row }
}

fn required_column(df: &DataFrame, name: &'static str, dtype: &DataType) -> Result<Column> {
    let column = df
        .column(name)
        .map_err(|_| LeaderboardError::MissingColumn(name.to_string()))?;
    Ok(column.cast(dtype)?)
}

fn required_f64(df: &DataFrame, name: &'static str) -> Result<Vec<f64>> {
    required_column(df, name, &DataType::Float64)?
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or_else(|| violation(name, row)))
        .collect()
}

fn required_str(df: &DataFrame, name: &'static str) -> Result<Vec<String>> {
    required_column(df, name, &DataType::String)?
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.map(|s| s.to_string()).ok_or_else(|| violation(name, row)))
        .collect()
}

fn optional_str(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let Ok(column) = df.column(name) else {
        return Ok(vec![None; df.height()]);
    };
    Ok(column
        .cast(&DataType::String)?
        .str()?
        .into_iter()
        .map(|opt| opt.map(|s| s.to_string()))
        .collect())
}
