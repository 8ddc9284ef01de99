use crate::data::Movies;
use crate::error::Result;
use polars::prelude::*;
use std::collections::BTreeMap;

pub const UNRATED: &str = "Unrated";

#[derive(Debug, Clone, PartialEq)]
pub struct TopTitle {
    pub year: i32,
    /// 1-based within the year.
    pub rank: usize,
    pub title: String,
    pub votes: u64,
    pub rating: f64,
    pub gross: f64,
    pub runtime: f64,
    pub primary_genre: String,
    pub overview: Option<String>,
}

/// The `n` most voted titles of every release year, years ascending.
pub fn top_titles_per_year(movies: &Movies, n: usize) -> Vec<TopTitle> {
    let mut rows: Vec<usize> = (0..movies.len()).collect();
    rows.sort_by(|&a, &b| {
        movies.released_year[a]
            .cmp(&movies.released_year[b])
            .then(movies.votes[b].cmp(&movies.votes[a]))
    });

    let mut out = Vec::new();
    let mut current: Option<(i32, usize)> = None;
    for i in rows {
        let year = movies.released_year[i];
        let rank = match current {
            Some((y, r)) if y == year => r + 1,
            _ => 1,
        };
        current = Some((year, rank));
        if rank > n {
            continue;
        }
        out.push(TopTitle {
            year,
            rank,
            title: movies.title[i].clone(),
            votes: movies.votes[i],
            rating: movies.rating[i],
            gross: movies.gross[i],
            runtime: movies.runtime[i],
            primary_genre: movies.primary_genre[i].clone(),
            overview: movies.overview[i].clone(),
        });
    }
    out
}

pub fn top_titles_frame(titles: &[TopTitle]) -> Result<DataFrame> {
    let df = df!(
        "Released_Year" => titles.iter().map(|t| t.year).collect::<Vec<_>>(),
        "Rank" => titles.iter().map(|t| t.rank as u32).collect::<Vec<_>>(),
        "Series_Title" => titles.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
        "No_of_Votes" => titles.iter().map(|t| t.votes).collect::<Vec<_>>(),
        "IMDB_Rating" => titles.iter().map(|t| t.rating).collect::<Vec<_>>(),
        "Gross" => titles.iter().map(|t| t.gross).collect::<Vec<_>>(),
        "Runtime" => titles.iter().map(|t| t.runtime).collect::<Vec<_>>(),
        "Primary_Genre" => titles.iter().map(|t| t.primary_genre.as_str()).collect::<Vec<_>>(),
        "Overview" => titles.iter().map(|t| t.overview.as_deref()).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

/// Five-number summary of gross revenue for one certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct GrossSummary {
    pub certificate: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Gross revenue distribution per certificate, certificates by name.
/// Movies without a certificate are grouped under [`UNRATED`].
pub fn gross_by_certificate(movies: &Movies) -> Vec<GrossSummary> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (certificate, gross) in movies.certificate.iter().zip(movies.gross.iter()) {
        groups
            .entry(certificate.as_deref().unwrap_or(UNRATED))
            .or_default()
            .push(*gross);
    }

    groups
        .into_iter()
        .map(|(certificate, mut values)| {
            values.sort_by(f64::total_cmp);
            GrossSummary {
                certificate: certificate.to_string(),
                count: values.len(),
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[values.len() - 1],
            }
        })
        .collect()
}

pub fn gross_summary_frame(summaries: &[GrossSummary]) -> Result<DataFrame> {
    let df = df!(
        "Certificate" => summaries.iter().map(|s| s.certificate.as_str()).collect::<Vec<_>>(),
        "Count" => summaries.iter().map(|s| s.count as u32).collect::<Vec<_>>(),
        "Min" => summaries.iter().map(|s| s.min).collect::<Vec<_>>(),
        "Q1" => summaries.iter().map(|s| s.q1).collect::<Vec<_>>(),
        "Median" => summaries.iter().map(|s| s.median).collect::<Vec<_>>(),
        "Q3" => summaries.iter().map(|s| s.q3).collect::<Vec<_>>(),
        "Max" => summaries.iter().map(|s| s.max).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

// Linear interpolation between closest ranks; `sorted` is non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}
