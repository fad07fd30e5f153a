#![deny(warnings)]

//! Loaders turning roster CSV and schedule text into core types.
//!
//! The simulation crates never touch the file system; everything they need
//! arrives through these functions already parsed and validated.

use chrono::NaiveDate;
use serde::Deserialize;
use sim_core::{
    validate_league, Conference, League, Player, Position, Ratings, RotationRole, ScheduleEntry,
    Team, TeamId, ValidationError,
};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },
    #[error("team {team} has no conference column")]
    MissingConference { team: String },
    #[error("invalid league json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl LoadError {
    fn parse(line: u64, message: impl Into<String>) -> Self {
        LoadError::Parse {
            line,
            message: message.into(),
        }
    }

    fn csv(source: csv::Error) -> Self {
        let line = source.position().map_or(0, |p| p.line());
        LoadError::Csv { line, source }
    }
}

/// One roster row, columns as written by the roster processing tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterRow {
    name: String,
    #[serde(default)]
    english_name: Option<String>,
    position: String,
    #[serde(default)]
    rotation_type: Option<String>,
    team: String,
    #[serde(default)]
    conference: Option<String>,
    rating: u8,
    inside_rating: u8,
    mid_rating: u8,
    three_rating: u8,
    free_throw_percent: u8,
    interior_defense: u8,
    perimeter_defense: u8,
    orb_rating: u8,
    drb_rating: u8,
    ast_rating: u8,
    stl_rating: u8,
    blk_rating: u8,
    layup_rating: u8,
    stand_dunk: u8,
    driving_dunk: u8,
    athleticism: u8,
    durability: u8,
    off_const: u8,
    def_const: u8,
    draw_foul: u8,
    #[serde(default)]
    foul_tendency: Option<u8>,
}

impl RosterRow {
    fn into_player(self, line: u64) -> Result<Player, LoadError> {
        let position = Position::parse(&self.position)
            .ok_or_else(|| LoadError::parse(line, format!("unknown position {:?}", self.position)))?;
        let role = match self.rotation_type.as_deref().map(str::trim) {
            None | Some("") => RotationRole::default(),
            Some(raw) => parse_role(raw)
                .ok_or_else(|| LoadError::parse(line, format!("unknown rotation type {raw:?}")))?,
        };
        let ratings = Ratings {
            overall: self.rating,
            inside: self.inside_rating,
            mid_range: self.mid_rating,
            three_point: self.three_rating,
            free_throw: self.free_throw_percent,
            interior_defense: self.interior_defense,
            perimeter_defense: self.perimeter_defense,
            offensive_rebound: self.orb_rating,
            defensive_rebound: self.drb_rating,
            assist: self.ast_rating,
            steal: self.stl_rating,
            block: self.blk_rating,
            layup: self.layup_rating,
            standing_dunk: self.stand_dunk,
            driving_dunk: self.driving_dunk,
            athleticism: self.athleticism,
            durability: self.durability,
            offensive_consistency: self.off_const,
            defensive_consistency: self.def_const,
            draw_foul: self.draw_foul,
            foul_tendency: self.foul_tendency.unwrap_or(Ratings::default().foul_tendency),
        };
        // Display under the English name when the tool provided one.
        let name = match self.english_name {
            Some(en) if !en.trim().is_empty() => en,
            _ => self.name,
        };
        let mut player = Player::new(name, position, TeamId::from(self.team.trim()), ratings);
        player.role = role;
        Ok(player)
    }
}

fn parse_role(raw: &str) -> Option<RotationRole> {
    match raw.to_ascii_lowercase().as_str() {
        "starter" | "start" | "s" | "1" => Some(RotationRole::Starter),
        "rotation" | "bench" | "r" | "2" => Some(RotationRole::Rotation),
        "reserve" | "deep" | "dnp" | "3" => Some(RotationRole::Reserve),
        _ => None,
    }
}

fn parse_conference(raw: &str) -> Option<Conference> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "east" | "e" | "eastern" => Some(Conference::East),
        "west" | "w" | "western" => Some(Conference::West),
        _ => None,
    }
}

fn read_rows<R: Read>(reader: R) -> Result<Vec<(u64, RosterRow)>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().map_err(LoadError::csv)?.clone();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(LoadError::csv)?;
        let line = record.position().map_or(0, |p| p.line());
        let row: RosterRow = record
            .deserialize(Some(&headers))
            .map_err(|source| LoadError::Csv { line, source })?;
        rows.push((line, row));
    }
    Ok(rows)
}

/// Players from a roster CSV, in file order. Ratings are range-checked
/// later, when the players are assembled into a team.
pub fn load_roster_csv<R: Read>(reader: R) -> Result<Vec<Player>, LoadError> {
    let players = read_rows(reader)?
        .into_iter()
        .map(|(line, row)| row.into_player(line))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(players = players.len(), "roster parsed");
    Ok(players)
}

/// Groups roster rows into teams, in order of first appearance. Every team
/// needs a `conference` value on at least one of its rows.
pub fn load_league_csv<R: Read>(reader: R) -> Result<League, LoadError> {
    let mut order: Vec<TeamId> = Vec::new();
    let mut players: BTreeMap<TeamId, Vec<Player>> = BTreeMap::new();
    let mut conferences: BTreeMap<TeamId, Conference> = BTreeMap::new();
    for (line, row) in read_rows(reader)? {
        let conference = match row.conference.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(
                parse_conference(raw)
                    .ok_or_else(|| LoadError::parse(line, format!("unknown conference {raw:?}")))?,
            ),
            _ => None,
        };
        let player = row.into_player(line)?;
        let id = player.team.clone();
        if let Some(c) = conference {
            conferences.insert(id.clone(), c);
        }
        if !players.contains_key(&id) {
            order.push(id.clone());
        }
        players.entry(id).or_default().push(player);
    }

    let mut teams = Vec::with_capacity(order.len());
    for id in order {
        let conference = *conferences
            .get(&id)
            .ok_or_else(|| LoadError::MissingConference { team: id.to_string() })?;
        let roster = players.remove(&id).unwrap_or_default();
        teams.push(Team::new(id.clone(), id.to_string(), conference, roster));
    }
    let league = League::new(teams);
    validate_league(&league, false)?;
    info!(teams = league.teams.len(), "league loaded");
    Ok(league)
}

/// Parses `YYYY-MM-DD,HOME,AWAY` lines. Blank lines and `#` comments are
/// skipped; error line numbers are 1-based.
pub fn parse_schedule(text: &str) -> Result<Vec<ScheduleEntry>, LoadError> {
    let mut schedule = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i as u64 + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        let [date, home, away] = fields.as_slice() else {
            return Err(LoadError::parse(
                line,
                format!("expected date,home,away but found {} fields", fields.len()),
            ));
        };
        let date: NaiveDate = date
            .parse()
            .map_err(|e| LoadError::parse(line, format!("bad date {date:?}: {e}")))?;
        if home.is_empty() || away.is_empty() {
            return Err(LoadError::parse(line, "team id must not be empty"));
        }
        schedule.push(ScheduleEntry {
            date,
            home: TeamId::from(*home),
            away: TeamId::from(*away),
        });
    }
    debug!(games = schedule.len(), "schedule parsed");
    Ok(schedule)
}

/// A whole league stored as JSON, e.g. one written by `--json` output.
pub fn load_league_json<R: Read>(reader: R) -> Result<League, LoadError> {
    let league: League = serde_json::from_reader(reader)?;
    validate_league(&league, false)?;
    Ok(league)
}

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Reads a league from disk; `.json` files are read as JSON, anything else as roster CSV.
pub fn load_league_file(path: &Path) -> Result<League, LoadError> {
    let file = open(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_league_json(file),
        _ => load_league_csv(file),
    }
}

pub fn load_schedule_file(path: &Path) -> Result<Vec<ScheduleEntry>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_schedule(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HEADER: &str = "name,englishName,position,playerType,rotationType,rating,insideRating,midRating,threeRating,freeThrowPercent,interiorDefense,perimeterDefense,orbRating,drbRating,astRating,stlRating,blkRating,layupRating,standDunk,drivingDunk,athleticism,durability,offConst,defConst,drawFoul,team,conference";

    fn row(name: &str, position: &str, role: &str, team: &str, conference: &str) -> String {
        format!(
            "{name},,{position},Scorer,{role},80,75,72,70,85,60,65,50,60,70,60,40,78,55,85,82,88,74,66,70,{team},{conference}"
        )
    }

    fn two_teams() -> String {
        let mut csv = vec![HEADER.to_string()];
        for (team, conf) in [("BOS", "East"), ("LAL", "west")] {
            for i in 0..9 {
                let role = if i < 5 { "starter" } else { "" };
                let pos = ["PG", "SG", "SF", "PF", "C"][i % 5];
                // Conference given once per team is enough.
                let c = if i == 0 { conf } else { "" };
                csv.push(row(&format!("{team} P{i}"), pos, role, team, c));
            }
        }
        csv.join("\n")
    }

    #[test]
    fn roster_columns_map_onto_ratings() {
        let players = load_roster_csv(two_teams().as_bytes()).unwrap();
        assert_eq!(players.len(), 18);
        let p = &players[0];
        assert_eq!(p.name, "BOS P0");
        assert_eq!(p.team.as_str(), "BOS");
        assert_eq!(p.position, Position::PG);
        assert_eq!(p.role, RotationRole::Starter);
        assert_eq!(p.ratings.overall, 80);
        assert_eq!(p.ratings.free_throw, 85);
        assert_eq!(p.ratings.driving_dunk, 85);
        assert_eq!(p.ratings.draw_foul, 70);
        assert_eq!(p.ratings.foul_tendency, Ratings::default().foul_tendency);
        assert_eq!(players[6].role, RotationRole::Rotation);
    }

    #[test]
    fn english_name_and_foul_tendency_are_used_when_present() {
        let csv = "name,englishName,position,rotationType,rating,insideRating,midRating,threeRating,freeThrowPercent,interiorDefense,perimeterDefense,orbRating,drbRating,astRating,stlRating,blkRating,layupRating,standDunk,drivingDunk,athleticism,durability,offConst,defConst,drawFoul,team,foulTendency\n\
                   Luka Doncic,Luka Dončić,G-F,reserve,90,80,85,84,78,50,60,40,70,95,60,30,80,40,60,70,80,80,60,85,DAL,72\n";
        let players = load_roster_csv(csv.as_bytes()).unwrap();
        assert_eq!(players[0].name, "Luka Dončić");
        assert_eq!(players[0].position, Position::SG);
        assert_eq!(players[0].role, RotationRole::Reserve);
        assert_eq!(players[0].ratings.foul_tendency, 72);
    }

    #[test]
    fn bad_position_reports_its_line() {
        let mut csv = two_teams();
        csv.push('\n');
        csv.push_str(&row("Ghost", "QB", "", "BOS", ""));
        match load_roster_csv(csv.as_bytes()) {
            Err(LoadError::Parse { line, message }) => {
                assert_eq!(line, 20);
                assert!(message.contains("QB"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_numeric_rating_is_a_csv_error_with_line() {
        let csv = format!("{HEADER}\n{}", row("A", "PG", "", "T", "East").replace(",80,", ",eighty,"));
        match load_roster_csv(csv.as_bytes()) {
            Err(LoadError::Csv { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn league_groups_teams_in_file_order() {
        let league = load_league_csv(two_teams().as_bytes()).unwrap();
        let ids: Vec<&str> = league.teams.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["BOS", "LAL"]);
        assert_eq!(league.teams[1].conference, Conference::West);
        assert_eq!(league.teams[0].roster.len(), 9);
        assert_eq!(league.teams[0].starters, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn team_without_conference_is_rejected() {
        let csv = two_teams().replace(",BOS,East", ",BOS,");
        assert!(matches!(
            load_league_csv(csv.as_bytes()),
            Err(LoadError::MissingConference { team }) if team == "BOS"
        ));
    }

    #[test]
    fn out_of_range_rating_fails_validation() {
        let csv = two_teams().replacen(",80,75,", ",180,75,", 1);
        assert!(matches!(
            load_league_csv(csv.as_bytes()),
            Err(LoadError::Invalid(ValidationError::RatingOutOfRange { .. }))
        ));
    }

    #[test]
    fn schedule_skips_comments_and_blank_lines() {
        let text = "# opening night\n2024-10-22,BOS,NYK\n\n  2024-10-22 , LAL , MIN  \n# end\n";
        let s = parse_schedule(text).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[1].home.as_str(), "LAL");
        assert_eq!(s[1].away.as_str(), "MIN");
        assert_eq!(s[0].date, NaiveDate::from_ymd_opt(2024, 10, 22).unwrap());
    }

    #[test]
    fn schedule_errors_carry_line_numbers() {
        let err = parse_schedule("2024-10-22,BOS,NYK\n2024-13-01,BOS,NYK\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
        let err = parse_schedule("# c\n2024-10-22,BOS\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
        let err = parse_schedule("2024-10-22,,NYK\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 1, .. }));
    }

    #[test]
    fn league_json_is_validated() {
        let league = sim_core::fixtures::sample_league(2);
        let json = serde_json::to_string(&league).unwrap();
        let back = load_league_json(json.as_bytes()).unwrap();
        assert_eq!(back.teams.len(), 4);
        let mut broken = league.clone();
        broken.teams[1].id = broken.teams[0].id.clone();
        let dup_id = broken.teams[0].id.clone();
        for p in &mut broken.teams[1].roster {
            p.team = dup_id.clone();
        }
        let json = serde_json::to_string(&broken).unwrap();
        assert!(matches!(
            load_league_json(json.as_bytes()),
            Err(LoadError::Invalid(ValidationError::DuplicateTeam(_)))
        ));
    }

    proptest! {
        #[test]
        fn schedule_parser_never_panics(text in "\\PC{0,200}") {
            let _ = parse_schedule(&text);
        }

        #[test]
        fn generated_lines_parse(days in 0u64..3000, home in "[A-Z]{3}", away in "[A-Z]{3}") {
            let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                .checked_add_days(chrono::Days::new(days)).unwrap();
            let text = format!("{date},{home},{away}\n");
            let s = parse_schedule(&text).unwrap();
            prop_assert_eq!(s.len(), 1);
            prop_assert_eq!(s[0].date, date);
        }
    }
}
