use crate::config::Axis;
use crate::data::Movies;

/// Which credited slot on a movie produced a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleSlot {
    Star1,
    Star2,
    Star3,
    Star4,
    Director,
}

impl RoleSlot {
    pub const STARS: [RoleSlot; 4] = [
        RoleSlot::Star1,
        RoleSlot::Star2,
        RoleSlot::Star3,
        RoleSlot::Star4,
    ];
}

/// One row per (movie, role-holder). Movies are referenced by row index
/// into the table the credits were expanded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credits {
    pub entity: Vec<String>,
    pub movie: Vec<usize>,
    pub slot: Vec<RoleSlot>,
}

impl Credits {
    /// Actor credits are emitted slot by slot (every Star1, then every
    /// Star2, ...), each slot in movie order. Empty slots are skipped.
    pub fn expand(movies: &Movies, axis: Axis) -> Self {
        let mut credits = Credits::default();
        match axis {
            Axis::Actor => {
                for (slot, names) in RoleSlot::STARS.into_iter().zip(movies.stars.iter()) {
                    credits.extend(slot, names);
                }
            }
            Axis::Director => credits.extend(RoleSlot::Director, &movies.director),
        }
        tracing::debug!(
            axis = %axis,
            movies = movies.len(),
            credits = credits.len(),
            "expanded credits"
        );
        credits
    }

    fn extend(&mut self, slot: RoleSlot, names: &[Option<String>]) {
        for (movie, name) in names.iter().enumerate() {
            if let Some(name) = name {
                self.entity.push(name.clone());
                self.movie.push(movie);
                self.slot.push(slot);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity.is_empty()
    }
}

#[cfg(test)]
mod test_expand {
    use super::*;
    use crate::data::fixtures::{movies, row};

    #[test]
    fn test_actor_expansion_is_slot_major() {
        let movies = movies(&[
            row("A", 2000, 10, 7.0).stars(&["X", "Y"]),
            row("B", 2001, 20, 8.0).stars(&["Y", "Z", "W", "V"]),
        ]);
        let credits = Credits::expand(&movies, Axis::Actor);
        assert_eq!(credits.entity, vec!["X", "Y", "Y", "Z", "W", "V"]);
        assert_eq!(credits.movie, vec![0, 1, 0, 1, 1, 1]);
        assert_eq!(
            credits.slot,
            vec![
                RoleSlot::Star1,
                RoleSlot::Star1,
                RoleSlot::Star2,
                RoleSlot::Star2,
                RoleSlot::Star3,
                RoleSlot::Star4,
            ]
        );
    }

    #[test]
    fn test_director_expansion_skips_missing() {
        let movies = movies(&[
            row("A", 2000, 10, 7.0).director("D"),
            row("B", 2001, 20, 8.0),
            row("C", 2002, 30, 9.0).director("E"),
        ]);
        let credits = Credits::expand(&movies, Axis::Director);
        assert_eq!(credits.entity, vec!["D", "E"]);
        assert_eq!(credits.movie, vec![0, 2]);
        assert!(credits.slot.iter().all(|s| *s == RoleSlot::Director));
    }
}
