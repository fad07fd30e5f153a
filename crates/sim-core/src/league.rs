//! League container and schedule records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::team::{Conference, Team, TeamId};

/// One scheduled regular-season game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub home: TeamId,
    pub away: TeamId,
}

/// All teams taking part in a season.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub teams: Vec<Team>,
}

impl League {
    pub fn new(teams: Vec<Team>) -> Self {
        Self { teams }
    }

    pub fn index_of(&self, id: &TeamId) -> Option<usize> {
        self.teams.iter().position(|t| &t.id == id)
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| &t.id == id)
    }

    /// Indices of the teams in `conference`, in league order.
    pub fn conference_indices(&self, conference: Conference) -> Vec<usize> {
        self.teams
            .iter()
            .enumerate()
            .filter(|(_, t)| t.conference == conference)
            .map(|(i, _)| i)
            .collect()
    }

    /// Two distinct teams borrowed mutably at once.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut Team, &mut Team)> {
        pair_mut(&mut self.teams, a, b)
    }
}

/// Mutable references to two distinct elements of a slice.
pub fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> Option<(&mut T, &mut T)> {
    if a == b || a >= items.len() || b >= items.len() {
        return None;
    }
    if a < b {
        let (left, right) = items.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = items.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_mut_orders_and_rejects() {
        let mut v = vec![1, 2, 3, 4];
        {
            let (x, y) = pair_mut(&mut v, 3, 1).unwrap();
            assert_eq!((*x, *y), (4, 2));
            *x = 40;
            *y = 20;
        }
        assert_eq!(v, vec![1, 20, 3, 40]);
        assert!(pair_mut(&mut v, 2, 2).is_none());
        assert!(pair_mut(&mut v, 0, 9).is_none());
    }
}
