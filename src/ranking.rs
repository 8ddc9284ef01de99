use crate::cumulative::CumulativeRecord;
use ahash::{HashSet, HashSetExt};
use rustc_hash::FxHashMap as HashMap;
use std::cmp::Ordering;

/// An entity's position in one year's leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing<'a> {
    pub entity: &'a str,
    /// 1-based.
    pub rank: usize,
    pub cumulative_count: usize,
    pub cumulative_votes: u64,
}

/// The top entities of one year and the records that belong to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub standings: Vec<Standing<'a>>,
    pub records: Vec<CumulativeRecord<'a>>,
}

/// Orders every entity by cumulative votes, then cumulative movie count,
/// both descending. Exact ties fall back to entity name ascending.
pub fn rank_entities<'a>(records: &[CumulativeRecord<'a>]) -> Vec<Standing<'a>> {
    let mut index: HashMap<&'a str, usize> = HashMap::default();
    let mut standings: Vec<Standing<'a>> = Vec::new();

    for record in records {
        let entity = record.credit.entity;
        let slot = *index.entry(entity).or_insert_with(|| {
            standings.push(Standing {
                entity,
                rank: 0,
                cumulative_count: 0,
                cumulative_votes: 0,
            });
            standings.len() - 1
        });
        let standing = &mut standings[slot];
        standing.cumulative_count = standing.cumulative_count.max(record.cumulative_count);
        standing.cumulative_votes = standing.cumulative_votes.max(record.cumulative_votes);
    }

    standings.sort_by(compare_standings);
    for (i, standing) in standings.iter_mut().enumerate() {
        standing.rank = i + 1;
    }
    standings
}

fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.cumulative_votes
        .cmp(&a.cumulative_votes)
        .then(b.cumulative_count.cmp(&a.cumulative_count))
        .then_with(|| a.entity.cmp(b.entity))
}

/// Keeps the first `top_n` ranked entities and only their records. Early
/// years with fewer entities return all of them.
pub fn select_top<'a>(records: Vec<CumulativeRecord<'a>>, top_n: usize) -> Selection<'a> {
    let mut standings = rank_entities(&records);
    standings.truncate(top_n);

    let mut keep: HashSet<&str> = HashSet::with_capacity(standings.len());
    keep.extend(standings.iter().map(|s| s.entity));

    let records = records
        .into_iter()
        .filter(|r| keep.contains(r.credit.entity))
        .collect();

    Selection { standings, records }
}

#[cfg(test)]
mod test_ranking {
    use super::*;
    use crate::cumulative::TitleCredit;

    fn record(entity: &str, count: usize, votes: u64) -> CumulativeRecord<'_> {
        CumulativeRecord {
            credit: TitleCredit {
                entity,
                title: "T",
                movie_votes: votes,
                mean_rating: 7.0,
                released_year: 2000,
                movie: 0,
            },
            cumulative_count: count,
            cumulative_votes: votes,
            cumulative_rating: 7.0,
        }
    }

    fn entities<'a>(standings: &[Standing<'a>]) -> Vec<&'a str> {
        standings.iter().map(|s| s.entity).collect()
    }

    #[test]
    fn test_votes_then_count() {
        let records = vec![
            record("Low", 1, 300),
            record("Top", 1, 500),
            record("Mid", 1, 100),
            record("Mid", 2, 300),
        ];
        let selection = select_top(records, 2);
        assert_eq!(entities(&selection.standings), vec!["Top", "Mid"]);
        assert_eq!(selection.standings[1].rank, 2);
        assert_eq!(selection.standings[1].cumulative_count, 2);
        assert_eq!(selection.records.len(), 3);
        assert!(selection.records.iter().all(|r| r.credit.entity != "Low"));
    }

    #[test]
    fn test_exact_ties_by_name() {
        let records = vec![record("Zed", 1, 10), record("Abe", 1, 10), record("Kim", 1, 10)];
        let standings = rank_entities(&records);
        assert_eq!(entities(&standings), vec!["Abe", "Kim", "Zed"]);

        let reversed: Vec<_> = records.into_iter().rev().collect();
        assert_eq!(entities(&rank_entities(&reversed)), vec!["Abe", "Kim", "Zed"]);
    }

    #[test]
    fn test_fewer_than_top_n() {
        let selection = select_top(vec![record("Solo", 1, 5)], 10);
        assert_eq!(selection.standings.len(), 1);
        assert_eq!(selection.records.len(), 1);

        let empty = select_top(Vec::new(), 10);
        assert!(empty.standings.is_empty());
        assert!(empty.records.is_empty());
    }
}
