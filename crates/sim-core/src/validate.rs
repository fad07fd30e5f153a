//! Input validation run before any simulation starts.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

use crate::league::{League, ScheduleEntry};
use crate::player::Player;
use crate::team::{Conference, Team};

/// Smallest roster that can survive foul-outs and injuries.
pub const MIN_ROSTER: usize = 8;
/// Teams per conference needed for seeds 1-10.
pub const PLAYOFF_CONFERENCE_SIZE: usize = 10;

/// Validation errors naming the offending record.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("player {player} ({team}): rating {field}={value} is outside [0, 100]")]
    RatingOutOfRange {
        team: String,
        player: String,
        field: &'static str,
        value: u8,
    },
    #[error("player {player} is listed on {listed} but rostered by {team}")]
    TeamMismatch {
        team: String,
        player: String,
        listed: String,
    },
    #[error("player name must not be empty (team {team}, row {index})")]
    EmptyPlayerName { team: String, index: usize },
    #[error("team {team} has {size} players, at least {min} required")]
    RosterTooSmall { team: String, size: usize, min: usize },
    #[error("team {team} lists player {player} more than once")]
    DuplicatePlayer { team: String, player: String },
    #[error("team {team}: starters must be five distinct roster indices")]
    InvalidStarters { team: String },
    #[error("duplicate team id: {0}")]
    DuplicateTeam(String),
    #[error("conference {conference:?} has {size} teams, {min} needed for the postseason")]
    ConferenceTooSmall {
        conference: Conference,
        size: usize,
        min: usize,
    },
    #[error("schedule row {row}: unknown team {team}")]
    UnknownTeam { row: usize, team: String },
    #[error("schedule row {row}: {team} cannot play itself")]
    SelfMatchup { row: usize, team: String },
    #[error("schedule row {row}: {home} vs {away} on {date} is listed twice")]
    DuplicateMatchup {
        row: usize,
        date: String,
        home: String,
        away: String,
    },
    #[error("schedule row {row}: {team} already plays on {date}")]
    DuplicateDate {
        row: usize,
        date: String,
        team: String,
    },
    #[error("schedule is empty")]
    EmptySchedule,
    #[error("config {field}: {reason}")]
    Config { field: String, reason: String },
}

pub fn validate_player(team: &Team, index: usize, p: &Player) -> Result<(), ValidationError> {
    if p.name.trim().is_empty() {
        return Err(ValidationError::EmptyPlayerName {
            team: team.id.0.clone(),
            index,
        });
    }
    if p.team != team.id {
        return Err(ValidationError::TeamMismatch {
            team: team.id.0.clone(),
            player: p.name.clone(),
            listed: p.team.0.clone(),
        });
    }
    for (field, value) in p.ratings.named() {
        if value > 100 {
            return Err(ValidationError::RatingOutOfRange {
                team: team.id.0.clone(),
                player: p.name.clone(),
                field,
                value,
            });
        }
    }
    Ok(())
}

pub fn validate_team(team: &Team) -> Result<(), ValidationError> {
    if team.roster.len() < MIN_ROSTER {
        return Err(ValidationError::RosterTooSmall {
            team: team.id.0.clone(),
            size: team.roster.len(),
            min: MIN_ROSTER,
        });
    }
    let mut names = BTreeSet::new();
    for (i, p) in team.roster.iter().enumerate() {
        validate_player(team, i, p)?;
        if !names.insert(p.name.as_str()) {
            return Err(ValidationError::DuplicatePlayer {
                team: team.id.0.clone(),
                player: p.name.clone(),
            });
        }
    }
    let distinct: BTreeSet<usize> = team.starters.iter().copied().collect();
    if team.starters.len() != 5
        || distinct.len() != 5
        || team.starters.iter().any(|&i| i >= team.roster.len())
    {
        return Err(ValidationError::InvalidStarters {
            team: team.id.0.clone(),
        });
    }
    Ok(())
}

/// Checks every team, id uniqueness and, when `postseason` is set, conference sizes.
pub fn validate_league(league: &League, postseason: bool) -> Result<(), ValidationError> {
    let mut ids = BTreeSet::new();
    for t in &league.teams {
        if !ids.insert(&t.id) {
            return Err(ValidationError::DuplicateTeam(t.id.0.clone()));
        }
        validate_team(t)?;
    }
    if postseason {
        for conference in Conference::ALL {
            let size = league.conference_indices(conference).len();
            if size < PLAYOFF_CONFERENCE_SIZE {
                return Err(ValidationError::ConferenceTooSmall {
                    conference,
                    size,
                    min: PLAYOFF_CONFERENCE_SIZE,
                });
            }
        }
    }
    debug!(teams = league.teams.len(), "league validated");
    Ok(())
}

/// Checks team references, self matchups, duplicated games and double-booked dates.
/// Row numbers in errors are 1-based.
pub fn validate_schedule(league: &League, schedule: &[ScheduleEntry]) -> Result<(), ValidationError> {
    if schedule.is_empty() {
        return Err(ValidationError::EmptySchedule);
    }
    let mut games = BTreeSet::new();
    let mut booked: BTreeMap<(chrono::NaiveDate, &str), usize> = BTreeMap::new();
    for (i, e) in schedule.iter().enumerate() {
        let row = i + 1;
        for id in [&e.home, &e.away] {
            if league.index_of(id).is_none() {
                return Err(ValidationError::UnknownTeam {
                    row,
                    team: id.0.clone(),
                });
            }
        }
        if e.home == e.away {
            return Err(ValidationError::SelfMatchup {
                row,
                team: e.home.0.clone(),
            });
        }
        if !games.insert((e.date, &e.home, &e.away)) {
            return Err(ValidationError::DuplicateMatchup {
                row,
                date: e.date.to_string(),
                home: e.home.0.clone(),
                away: e.away.0.clone(),
            });
        }
        for id in [&e.home, &e.away] {
            if booked.insert((e.date, id.as_str()), row).is_some() {
                return Err(ValidationError::DuplicateDate {
                    row,
                    date: e.date.to_string(),
                    team: id.0.clone(),
                });
            }
        }
    }
    debug!(games = schedule.len(), "schedule validated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{default_team, sample_league, sample_schedule};
    use crate::team::TeamId;
    use chrono::NaiveDate;

    fn entry(day: u32, home: &str, away: &str) -> ScheduleEntry {
        ScheduleEntry {
            date: NaiveDate::from_ymd_opt(2024, 10, day).unwrap(),
            home: TeamId::from(home),
            away: TeamId::from(away),
        }
    }

    #[test]
    fn sample_data_is_valid() {
        let league = sample_league(10);
        validate_league(&league, true).unwrap();
        validate_schedule(&league, &sample_schedule(&league, 2)).unwrap();
    }

    #[test]
    fn rating_out_of_range_names_the_player() {
        let mut t = default_team("Hawks", Conference::East);
        t.roster[3].ratings.steal = 140;
        let err = validate_team(&t).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RatingOutOfRange {
                team: "Hawks".into(),
                player: t.roster[3].name.clone(),
                field: "steal",
                value: 140,
            }
        );
    }

    #[test]
    fn short_roster_and_bad_starters() {
        let mut t = default_team("Hawks", Conference::East);
        t.roster.truncate(6);
        assert!(matches!(validate_team(&t), Err(ValidationError::RosterTooSmall { .. })));
        let mut t = default_team("Hawks", Conference::East);
        t.starters = vec![0, 1, 2, 3, 3];
        assert!(matches!(validate_team(&t), Err(ValidationError::InvalidStarters { .. })));
    }

    #[test]
    fn repeated_player_name_is_rejected() {
        let mut t = default_team("Hawks", Conference::East);
        t.roster[5].name = t.roster[0].name.clone();
        assert_eq!(
            validate_team(&t),
            Err(ValidationError::DuplicatePlayer {
                team: "Hawks".into(),
                player: t.roster[0].name.clone(),
            })
        );
        let mut league = sample_league(2);
        league.teams[1].roster[7].name = league.teams[1].roster[2].name.clone();
        assert!(matches!(
            validate_league(&league, false),
            Err(ValidationError::DuplicatePlayer { .. })
        ));
    }

    #[test]
    fn small_conference_fails_only_with_postseason() {
        let league = sample_league(4);
        validate_league(&league, false).unwrap();
        assert!(matches!(
            validate_league(&league, true),
            Err(ValidationError::ConferenceTooSmall { size: 4, .. })
        ));
    }

    #[test]
    fn schedule_errors_carry_row_numbers() {
        let league = sample_league(10);
        let a = league.teams[0].id.0.clone();
        let b = league.teams[1].id.0.clone();
        let c = league.teams[2].id.0.clone();

        let err = validate_schedule(&league, &[entry(1, &a, "Nope")]).unwrap_err();
        assert_eq!(err, ValidationError::UnknownTeam { row: 1, team: "Nope".into() });

        let err = validate_schedule(&league, &[entry(1, &a, &a)]).unwrap_err();
        assert!(matches!(err, ValidationError::SelfMatchup { row: 1, .. }));

        let err = validate_schedule(&league, &[entry(1, &a, &b), entry(1, &a, &b)]).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateMatchup { row: 2, .. }));

        let err = validate_schedule(&league, &[entry(1, &a, &b), entry(1, &c, &a)]).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateDate { row: 2, .. }));

        assert_eq!(validate_schedule(&league, &[]), Err(ValidationError::EmptySchedule));
    }

    #[test]
    fn duplicate_team_ids() {
        let mut league = sample_league(10);
        let dup = league.teams[0].clone();
        league.teams.push(dup);
        assert!(matches!(validate_league(&league, false), Err(ValidationError::DuplicateTeam(_))));
    }
}
