//! Ready-made rosters, leagues and schedules for tests, benches and demos.

use chrono::{Days, NaiveDate};

use crate::league::{League, ScheduleEntry};
use crate::player::{Player, Position, Ratings, RotationRole};
use crate::team::{Conference, Team, TeamId};

const DEPTH_CHART: [(Position, RotationRole, u8); 12] = [
    (Position::PG, RotationRole::Starter, 80),
    (Position::SG, RotationRole::Starter, 78),
    (Position::SF, RotationRole::Starter, 78),
    (Position::PF, RotationRole::Starter, 77),
    (Position::C, RotationRole::Starter, 79),
    (Position::PG, RotationRole::Rotation, 73),
    (Position::SF, RotationRole::Rotation, 72),
    (Position::PF, RotationRole::Rotation, 72),
    (Position::C, RotationRole::Rotation, 71),
    (Position::SG, RotationRole::Reserve, 66),
    (Position::SF, RotationRole::Reserve, 65),
    (Position::C, RotationRole::Reserve, 64),
];

/// Player with default ratings apart from `overall`.
pub fn default_player(team: &TeamId, number: usize, position: Position, overall: u8) -> Player {
    let ratings = Ratings {
        overall,
        ..Ratings::default()
    };
    Player::new(format!("{team} #{number}"), position, team.clone(), ratings)
}

/// Twelve-man roster: five starters, four rotation players, three reserves.
pub fn default_team(id: &str, conference: Conference) -> Team {
    team_with_offset(id, conference, 0)
}

/// Like [`default_team`] with every rating shifted by `offset` points.
pub fn team_with_offset(id: &str, conference: Conference, offset: i8) -> Team {
    let team_id = TeamId::from(id);
    let roster = DEPTH_CHART
        .iter()
        .enumerate()
        .map(|(n, &(position, role, overall))| {
            let mut p = default_player(&team_id, n + 1, position, shift(overall, offset));
            let r = &mut p.ratings;
            for v in [
                &mut r.inside,
                &mut r.mid_range,
                &mut r.three_point,
                &mut r.interior_defense,
                &mut r.perimeter_defense,
                &mut r.offensive_rebound,
                &mut r.defensive_rebound,
            ] {
                *v = shift(*v, offset);
            }
            if position == Position::C || position == Position::PF {
                r.offensive_rebound = shift(r.offensive_rebound, 12);
                r.defensive_rebound = shift(r.defensive_rebound, 12);
                r.block = shift(r.block, 15);
                r.three_point = shift(r.three_point, -12);
            }
            if position == Position::PG {
                r.assist = shift(r.assist, 15);
                r.steal = shift(r.steal, 8);
            }
            p.role = role;
            p
        })
        .collect();
    Team::new(team_id, id, conference, roster)
}

fn shift(v: u8, by: i8) -> u8 {
    (i16::from(v) + i16::from(by)).clamp(0, 100) as u8
}

/// League with `per_conference` teams in each conference, E01.. and W01..,
/// with ratings staggered so the standings spread out.
pub fn sample_league(per_conference: usize) -> League {
    let mut teams = Vec::with_capacity(per_conference * 2);
    for (prefix, conference) in [("E", Conference::East), ("W", Conference::West)] {
        for i in 0..per_conference {
            let offset = ((i % 7) as i8 - 3) * 2;
            teams.push(team_with_offset(
                &format!("{prefix}{:02}", i + 1),
                conference,
                offset,
            ));
        }
    }
    League::new(teams)
}

/// Round-robin schedule by the circle method: every team plays once per
/// round, one round per day, home court alternating between passes.
pub fn sample_schedule(league: &League, rounds: usize) -> Vec<ScheduleEntry> {
    let mut ids: Vec<Option<&TeamId>> = league.teams.iter().map(|t| Some(&t.id)).collect();
    if ids.len() % 2 == 1 {
        ids.push(None);
    }
    let n = ids.len();
    if n < 2 {
        return Vec::new();
    }
    let start = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap_or(NaiveDate::MIN);
    let mut schedule = Vec::new();
    let mut order: Vec<usize> = (0..n).collect();
    for round in 0..rounds {
        let date = start.checked_add_days(Days::new(round as u64)).unwrap_or(start);
        let flip = (round / (n - 1)) % 2 == 1;
        for k in 0..n / 2 {
            let (a, b) = (order[k], order[n - 1 - k]);
            if let (Some(x), Some(y)) = (ids[a], ids[b]) {
                let (home, away) = if ((k + round) % 2 == 0) != flip { (x, y) } else { (y, x) };
                schedule.push(ScheduleEntry {
                    date,
                    home: home.clone(),
                    away: away.clone(),
                });
            }
        }
        // Rotate everyone but the first slot.
        let last = order.remove(n - 1);
        order.insert(1, last);
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn default_team_shape() {
        let t = default_team("T", Conference::West);
        assert_eq!(t.roster.len(), 12);
        assert_eq!(t.starters, vec![0, 1, 2, 3, 4]);
        assert!(t.roster.iter().all(|p| p.team == t.id));
    }

    #[test]
    fn schedule_gives_everyone_one_game_per_round() {
        let league = sample_league(10);
        let schedule = sample_schedule(&league, 3);
        assert_eq!(schedule.len(), 30);
        let mut per_team: BTreeMap<&TeamId, usize> = BTreeMap::new();
        for e in &schedule {
            *per_team.entry(&e.home).or_default() += 1;
            *per_team.entry(&e.away).or_default() += 1;
        }
        assert_eq!(per_team.len(), 20);
        assert!(per_team.values().all(|&g| g == 3));
    }
}
