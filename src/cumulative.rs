use crate::data::Movies;
use crate::error::{LeaderboardError, Result};
use crate::expand::Credits;
use rustc_hash::FxHashMap as HashMap;

/// One (entity, title) pair after collapsing duplicate credits.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleCredit<'a> {
    pub entity: &'a str,
    pub title: &'a str,
    /// Votes of the distinct movie rows behind this title.
    pub movie_votes: u64,
    pub mean_rating: f64,
    pub released_year: i32,
    /// First movie row seen for this title; descriptive fields come from it.
    pub movie: usize,
}

/// A title credit with the entity's running statistics up to and including it.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeRecord<'a> {
    pub credit: TitleCredit<'a>,
    pub cumulative_count: usize,
    pub cumulative_votes: u64,
    pub cumulative_rating: f64,
}

/// Groups credits released no later than `year` by (entity, title).
///
/// A movie row counts once per entity no matter how many role slots the
/// entity holds on it. Distinct rows that share a title are summed for votes
/// and averaged for rating; the release year is the latest among them.
/// Output follows first occurrence in credit order.
pub fn title_credits<'a>(
    movies: &'a Movies,
    credits: &'a Credits,
    year: i32,
) -> Result<Vec<TitleCredit<'a>>> {
    let mut index: HashMap<(&'a str, &'a str), usize> = HashMap::default();
    let mut out: Vec<TitleCredit<'a>> = Vec::new();
    let mut seen: Vec<Vec<usize>> = Vec::new();
    let mut rating_sums: Vec<f64> = Vec::new();

    for (entity, &movie) in credits.entity.iter().zip(credits.movie.iter()) {
        let released = movies.released_year[movie];
        if released > year {
            continue;
        }
        let key = (entity.as_str(), movies.title[movie].as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            out.push(TitleCredit {
                entity: key.0,
                title: key.1,
                movie_votes: 0,
                mean_rating: 0.0,
                released_year: released,
                movie,
            });
            seen.push(Vec::new());
            rating_sums.push(0.0);
            out.len() - 1
        });

        // Same entity in several slots of one movie.
        if seen[slot].contains(&movie) {
            continue;
        }
        seen[slot].push(movie);

        let credit = &mut out[slot];
        credit.movie_votes = credit
            .movie_votes
            .checked_add(movies.votes[movie])
            .ok_or_else(|| overflow(key.0, year))?;
        credit.released_year = credit.released_year.max(released);
        rating_sums[slot] += movies.rating[movie];
    }

    for ((credit, sum), rows) in out.iter_mut().zip(&rating_sums).zip(&seen) {
        credit.mean_rating = sum / rows.len() as f64;
    }
    Ok(out)
}

/// Running count, votes and rating per entity as of `year`.
///
/// Records come back grouped by entity, entities in order of first
/// appearance, each entity's titles by release year with ties in movie
/// table order. The running rating is the plain mean of the
/// per-title means seen so far.
pub fn cumulative<'a>(
    movies: &'a Movies,
    credits: &'a Credits,
    year: i32,
) -> Result<Vec<CumulativeRecord<'a>>> {
    let title_credits = title_credits(movies, credits, year)?;
    let total = title_credits.len();

    let mut order: Vec<&'a str> = Vec::new();
    let mut by_entity: HashMap<&'a str, Vec<TitleCredit<'a>>> = HashMap::default();
    for credit in title_credits {
        let entity = credit.entity;
        by_entity
            .entry(entity)
            .or_insert_with(|| {
                order.push(entity);
                Vec::new()
            })
            .push(credit);
    }

    let mut records = Vec::with_capacity(total);
    for entity in order {
        let Some(mut titles) = by_entity.remove(entity) else {
            continue;
        };
        titles.sort_by_key(|c| (c.released_year, c.movie));

        let mut votes: u64 = 0;
        let mut rating_sum = 0.0;
        for (i, credit) in titles.into_iter().enumerate() {
            let count = i + 1;
            votes = votes
                .checked_add(credit.movie_votes)
                .ok_or_else(|| overflow(entity, year))?;
            rating_sum += credit.mean_rating;
            records.push(CumulativeRecord {
                credit,
                cumulative_count: count,
                cumulative_votes: votes,
                cumulative_rating: rating_sum / count as f64,
            });
        }
    }
    Ok(records)
}

fn overflow(entity: &str, year: i32) -> LeaderboardError {
    LeaderboardError::VoteOverflow {
        entity: entity.to_string(),
        year,
    }
}

#[cfg(test)]
mod test_cumulative {
    use super::*;
    use crate::config::Axis;
    use crate::data::fixtures::{movies, row};

    fn last_for<'r, 'a>(
        records: &'r [CumulativeRecord<'a>],
        entity: &str,
    ) -> &'r CumulativeRecord<'a> {
        records
            .iter()
            .rev()
            .find(|r| r.credit.entity == entity)
            .unwrap()
    }

    #[test]
    fn test_running_statistics() -> Result<()> {
        let movies = movies(&[
            row("First", 2000, 100, 8.0).stars(&["A"]),
            row("Second", 2001, 200, 7.0).stars(&["A"]),
            row("Third", 2001, 50, 9.0).stars(&["A"]),
        ]);
        let credits = Credits::expand(&movies, Axis::Actor);
        let records = cumulative(&movies, &credits, 2001)?;

        let titles: Vec<&str> = records.iter().map(|r| r.credit.title).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
        let votes: Vec<u64> = records.iter().map(|r| r.cumulative_votes).collect();
        assert_eq!(votes, vec![100, 300, 350]);
        let counts: Vec<usize> = records.iter().map(|r| r.cumulative_count).collect();
        assert_eq!(counts, vec![1, 2, 3]);
        assert_eq!(records[1].cumulative_rating, 7.5);

        let last = last_for(&records, "A");
        assert_eq!(last.cumulative_count, 3);
        assert_eq!(last.cumulative_votes, 350);
        assert!((last.cumulative_rating - 8.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_same_year_titles_follow_table_order() -> Result<()> {
        let movies = movies(&[
            row("P", 2000, 10, 5.0).stars(&["Z", "A"]),
            row("Q", 2000, 20, 9.0).stars(&["A"]),
        ]);
        let credits = Credits::expand(&movies, Axis::Actor);
        let records: Vec<_> = cumulative(&movies, &credits, 2000)?
            .into_iter()
            .filter(|r| r.credit.entity == "A")
            .collect();

        let titles: Vec<&str> = records.iter().map(|r| r.credit.title).collect();
        assert_eq!(titles, vec!["P", "Q"]);
        assert_eq!(records[0].cumulative_votes, 10);
        assert_eq!(records[0].cumulative_rating, 5.0);
        assert_eq!(records[1].cumulative_rating, 7.0);
        Ok(())
    }

    #[test]
    fn test_duplicate_credit_counts_once() -> Result<()> {
        let movies = movies(&[row("Twice", 2010, 1000, 7.0).stars(&["A", "A", "B"])]);
        let credits = Credits::expand(&movies, Axis::Actor);
        let records = cumulative(&movies, &credits, 2010)?;

        assert_eq!(records.len(), 2);
        let a = last_for(&records, "A");
        assert_eq!(a.credit.movie_votes, 1000);
        assert_eq!(a.cumulative_votes, 1000);
        assert_eq!(a.cumulative_count, 1);
        Ok(())
    }

    #[test]
    fn test_shared_title_rows_are_merged() -> Result<()> {
        let movies = movies(&[
            row("Remake", 1990, 300, 6.0).director("D"),
            row("Remake", 2005, 100, 8.0).director("D"),
        ]);
        let credits = Credits::expand(&movies, Axis::Director);

        let early = title_credits(&movies, &credits, 1999)?;
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].movie_votes, 300);
        assert_eq!(early[0].released_year, 1990);

        let late = title_credits(&movies, &credits, 2010)?;
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].movie_votes, 400);
        assert_eq!(late[0].mean_rating, 7.0);
        assert_eq!(late[0].released_year, 2005);
        assert_eq!(late[0].movie, 0);
        Ok(())
    }

    #[test]
    fn test_year_before_data_is_empty() -> Result<()> {
        let movies = movies(&[row("Only", 2000, 10, 5.0).director("D")]);
        let credits = Credits::expand(&movies, Axis::Director);
        assert!(cumulative(&movies, &credits, 1999)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_monotonic_across_years() -> Result<()> {
        let movies = movies(&[
            row("M1", 1995, 40, 6.0).stars(&["A", "B"]),
            row("M2", 1997, 10, 7.0).stars(&["B"]),
            row("M3", 1997, 90, 8.0).stars(&["A"]),
            row("M4", 2001, 5, 9.0).stars(&["B", "A"]),
        ]);
        let credits = Credits::expand(&movies, Axis::Actor);
        let mut previous: HashMap<&str, (usize, u64)> = HashMap::default();
        for year in 1995..=2001 {
            let records = cumulative(&movies, &credits, year)?;
            for entity in ["A", "B"] {
                let last = last_for(&records, entity);
                let now = (last.cumulative_count, last.cumulative_votes);
                if let Some(before) = previous.insert(entity, now) {
                    assert!(now.0 >= before.0 && now.1 >= before.1);
                }
            }
        }
        assert_eq!(previous["A"], (3, 135));
        assert_eq!(previous["B"], (3, 55));
        Ok(())
    }

    #[test]
    fn test_vote_overflow() {
        let movies = movies(&[
            row("Big", 2000, u64::MAX, 5.0).director("D"),
            row("Bigger", 2001, 1, 5.0).director("D"),
        ]);
        let credits = Credits::expand(&movies, Axis::Director);
        assert!(matches!(
            cumulative(&movies, &credits, 2001),
            Err(LeaderboardError::VoteOverflow { year: 2001, .. })
        ));
    }
}
