//! Plain-text rendering of game, season and prediction results.

use sim_core::{
    EventKind, FoulKind, GameEvent, GameResult, PlayerRef, ShotKind, ShotZone, Side, SubReason,
    TeamBox, TurnoverKind,
};
use sim_runtime::playoffs::{ConferenceBracket, SeriesResult};
use sim_runtime::{
    LeaderEntry, PlayoffBracketResult, PredictionResult, SeasonResult, StandingEntry,
};
use std::fmt::Write;

/// `MM:SS` game clock.
pub fn clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// `Q3`, `OT1`; games not played in quarters use `H` (halves) or `P`.
pub fn period_label(period: u8, regulation: u8) -> String {
    if period > regulation {
        return format!("OT{}", period - regulation);
    }
    match regulation {
        4 => format!("Q{period}"),
        2 => format!("H{period}"),
        _ => format!("P{period}"),
    }
}

fn name(r: &GameResult, p: PlayerRef) -> &str {
    r.box_score
        .player(p)
        .map_or("unknown player", |line| line.name.as_str())
}

fn shot_label(zone: ShotZone, shot: ShotKind) -> &'static str {
    match (zone, shot) {
        (ShotZone::Three, _) => "three-pointer",
        (_, ShotKind::Dunk) => "dunk",
        (_, ShotKind::Layup) => "layup",
        (ShotZone::Close, ShotKind::Jumper) => "floater",
        (ShotZone::Mid, ShotKind::Jumper) => "jumper",
    }
}

fn foul_label(kind: FoulKind) -> &'static str {
    match kind {
        FoulKind::Shooting => "shooting",
        FoulKind::Flagrant => "flagrant",
        FoulKind::Charging => "charging",
        FoulKind::IllegalScreen => "illegal screen",
        FoulKind::Blocking => "blocking",
        FoulKind::ReachIn => "reach-in",
    }
}

fn turnover_label(kind: TurnoverKind) -> &'static str {
    match kind {
        TurnoverKind::Stolen => "stolen",
        TurnoverKind::BadPass => "bad pass",
        TurnoverKind::Travel => "traveling",
        TurnoverKind::OutOfBounds => "out of bounds",
        TurnoverKind::OffensiveFoul => "offensive foul",
    }
}

fn reason_label(reason: SubReason) -> &'static str {
    match reason {
        SubReason::Fatigue => "fatigue",
        SubReason::FoulTrouble => "foul trouble",
        SubReason::MinutesLimit => "minutes limit",
        SubReason::StintLimit => "long stint",
        SubReason::Performance => "cold hand",
        SubReason::GarbageTime => "garbage time",
        SubReason::Injury => "injury",
        SubReason::FouledOut => "fouled out",
        SubReason::Rest => "rest",
    }
}

/// One play-by-play sentence, without clock or score.
pub fn describe(r: &GameResult, kind: &EventKind) -> String {
    let team = |side: Side| r.team(side).as_str();
    match *kind {
        EventKind::JumpBall { home, away, winner } => format!(
            "Jump ball between {} and {}, {} gains possession",
            name(r, home),
            name(r, away),
            team(winner)
        ),
        EventKind::ShotMade {
            shooter,
            zone,
            shot,
            distance,
            assist,
            fast_break,
            ..
        } => {
            let mut s = format!("{} makes a {distance}-foot {}", name(r, shooter), shot_label(zone, shot));
            if fast_break {
                s.push_str(" on the break");
            }
            if let Some(a) = assist {
                let _ = write!(s, " (assist: {})", name(r, a));
            }
            s
        }
        EventKind::ShotMissed {
            shooter,
            zone,
            shot,
            distance,
            blocked_by,
        } => match blocked_by {
            Some(b) => format!(
                "{} blocks the {distance}-foot {} by {}",
                name(r, b),
                shot_label(zone, shot),
                name(r, shooter)
            ),
            None => format!("{} misses a {distance}-foot {}", name(r, shooter), shot_label(zone, shot)),
        },
        EventKind::FreeThrow {
            shooter,
            made,
            attempt,
            of,
        } => format!(
            "{} {} free throw {attempt} of {of}",
            name(r, shooter),
            if made { "makes" } else { "misses" }
        ),
        EventKind::Rebound { player, offensive } => format!(
            "{} {} rebound",
            name(r, player),
            if offensive { "offensive" } else { "defensive" }
        ),
        EventKind::Turnover { player, kind } => {
            format!("{} turnover ({})", name(r, player), turnover_label(kind))
        }
        EventKind::Steal {
            player,
            from,
            fast_break,
        } => format!(
            "{} steals it from {}{}",
            name(r, player),
            name(r, from),
            if fast_break { " and pushes ahead" } else { "" }
        ),
        EventKind::Foul {
            player,
            on,
            kind,
            in_bonus,
        } => format!(
            "{} foul on {} (drawn by {}){}",
            foul_label(kind),
            name(r, player),
            name(r, on),
            if in_bonus { ", in the bonus" } else { "" }
        ),
        EventKind::Challenge {
            side,
            kind,
            overturned,
        } => format!(
            "{} challenge the {} call: {}",
            team(side),
            foul_label(kind),
            if overturned { "overturned" } else { "call stands" }
        ),
        EventKind::FoulOut { player } => format!("{} fouls out", name(r, player)),
        EventKind::Injury { player } => format!("{} is hurt and heads to the locker room", name(r, player)),
        EventKind::Substitution { out, into, reason } => format!(
            "{} checks in for {} ({})",
            name(r, into),
            name(r, out),
            reason_label(reason)
        ),
        EventKind::PeriodEnd { period, home, away } => format!(
            "End of {}: {} {home}, {} {away}",
            period_label(period, r.regulation_periods),
            r.home,
            r.away
        ),
        EventKind::OvertimeStart { period } => format!("{} begins", period_label(period, r.regulation_periods)),
        EventKind::FullTime { home, away, periods } => format!(
            "Final{}: {} {home}, {} {away}",
            if periods > r.regulation_periods {
                format!(" ({})", period_label(periods, r.regulation_periods))
            } else {
                String::new()
            },
            r.home,
            r.away
        ),
    }
}

/// Full play-by-play with clock and running score.
pub fn play_by_play(r: &GameResult) -> String {
    let mut out = String::new();
    for (k, GameEvent { period, seconds_remaining, kind }) in r.events.iter().enumerate() {
        let score = r.score_snapshots.get(k).copied().unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<4}{} | {:>3}-{:<3} | {}",
            period_label(*period, r.regulation_periods),
            clock(*seconds_remaining),
            score.home,
            score.away,
            describe(r, kind)
        );
    }
    out
}

fn minutes(seconds: u32) -> String {
    clock(seconds)
}

fn team_box(out: &mut String, b: &TeamBox) {
    let _ = writeln!(out, "{}", b.team);
    let _ = writeln!(
        out,
        "  {:<24} {:>3} {:>6} {:>4} {:>4} {:>4} {:>3} {:>3} {:>3} {:>3} {:>6} {:>6} {:>6} {:>4}",
        "PLAYER", "POS", "MIN", "PTS", "REB", "AST", "STL", "BLK", "TO", "PF", "FG", "3P", "FT", "+/-"
    );
    for p in b.players.iter().filter(|p| p.seconds_played > 0) {
        let s = &p.stats;
        let mut flags = String::new();
        if p.injured {
            flags.push_str(" (inj)");
        }
        if p.fouled_out {
            flags.push_str(" (fo)");
        }
        let _ = writeln!(
            out,
            "  {:<24} {:>3} {:>6} {:>4} {:>4} {:>4} {:>3} {:>3} {:>3} {:>3} {:>6} {:>6} {:>6} {:>+4}{flags}",
            p.name,
            format!("{:?}", p.position),
            minutes(p.seconds_played),
            s.points,
            s.rebounds,
            s.assists,
            s.steals,
            s.blocks,
            s.turnovers,
            s.fouls,
            format!("{}-{}", s.field_goals_made(), s.field_goals_attempted()),
            format!("{}-{}", s.three_made, s.three_attempts),
            format!("{}-{}", s.ft_made, s.ft_attempts),
            p.plus_minus,
        );
    }
    let t = &b.totals;
    let _ = writeln!(
        out,
        "  {:<24} {:>3} {:>6} {:>4} {:>4} {:>4} {:>3} {:>3} {:>3} {:>3} {:>6} {:>6} {:>6}",
        "TOTAL",
        "",
        "",
        t.points,
        t.rebounds,
        t.assists,
        t.steals,
        t.blocks,
        t.turnovers,
        t.fouls,
        format!("{}-{}", t.field_goals_made(), t.field_goals_attempted()),
        format!("{}-{}", t.three_made, t.three_attempts),
        format!("{}-{}", t.ft_made, t.ft_attempts),
    );
}

pub fn box_score(r: &GameResult) -> String {
    let mut out = String::new();
    let periods: Vec<String> = r
        .period_scores
        .iter()
        .scan((0, 0), |prev, s| {
            let line = format!("{}-{}", s.home - prev.0, s.away - prev.1);
            *prev = (s.home, s.away);
            Some(line)
        })
        .collect();
    let _ = writeln!(
        out,
        "{} {} - {} {}   [{}]",
        r.home,
        r.home_score,
        r.away_score,
        r.away,
        periods.join(", ")
    );
    team_box(&mut out, &r.box_score.home);
    team_box(&mut out, &r.box_score.away);
    out
}

pub fn standings(title: &str, table: &[StandingEntry]) -> String {
    let mut out = format!("{title}\n  {:>2} {:<8} {:>3} {:>3} {:>6} {:>5} {:>6}\n", "#", "TEAM", "W", "L", "PCT", "GB", "DIFF");
    for e in table {
        let gb = if e.games_back == 0.0 {
            "-".to_string()
        } else {
            format!("{:.1}", e.games_back)
        };
        let _ = writeln!(
            out,
            "  {:>2} {:<8} {:>3} {:>3} {:>6.3} {:>5} {:>+6}",
            e.seed, e.team, e.wins, e.losses, e.win_pct, gb, e.point_diff
        );
    }
    out
}

pub fn leaders(title: &str, rows: &[LeaderEntry]) -> String {
    let mut out = format!("{title}\n");
    for e in rows {
        let _ = writeln!(out, "  {:>2}. {:<24} {:<6} {:>6.1}", e.rank, e.name, e.team, e.value);
    }
    out
}

fn series_line(s: &SeriesResult) -> String {
    let (w, l) = if s.winner == s.higher_seed {
        (s.higher_wins, s.lower_wins)
    } else {
        (s.lower_wins, s.higher_wins)
    };
    let mvp = s
        .mvp
        .as_ref()
        .map(|m| format!(" (MVP {}, {:.1} ppg)", m.name, m.points_per_game))
        .unwrap_or_default();
    format!("{} def. {} {w}-{l}{mvp}", s.winner, s.loser())
}

fn conference(out: &mut String, b: &ConferenceBracket) {
    let _ = writeln!(out, "{:?}", b.conference);
    if let Some(p) = &b.play_in {
        let _ = writeln!(
            out,
            "  Play-in: {} is the 7 seed, {} the 8 seed",
            p.seventh_seed, p.eighth_seed
        );
    }
    for (label, round) in [("First round", &b.first_round), ("Semifinals", &b.semifinals)] {
        for s in round.iter() {
            let _ = writeln!(out, "  {label}: {}", series_line(s));
        }
    }
    let _ = writeln!(out, "  Conference finals: {}", series_line(&b.final_series));
}

pub fn bracket(p: &PlayoffBracketResult) -> String {
    let mut out = String::new();
    conference(&mut out, &p.east);
    conference(&mut out, &p.west);
    let _ = writeln!(out, "Finals: {}", series_line(&p.finals));
    let _ = write!(out, "Champion: {}", p.champion);
    if let Some(m) = &p.finals_mvp {
        let _ = write!(out, " (Finals MVP {}, {:.1} ppg)", m.name, m.points_per_game);
    }
    out.push('\n');
    out
}

pub fn season_summary(r: &SeasonResult) -> String {
    let mut out = standings("East", &r.east);
    out.push_str(&standings("West", &r.west));
    if let Some(m) = &r.mvp {
        let _ = writeln!(
            out,
            "MVP: {} ({}) {:.1} pts, {:.1} reb, {:.1} ast",
            m.name, m.team, m.points_per_game, m.rebounds_per_game, m.assists_per_game
        );
    }
    if let Some(p) = &r.playoffs {
        out.push_str(&bracket(p));
    }
    out
}

pub fn odds(p: &PredictionResult) -> String {
    let mut out = format!(
        "{} seasons from seed {} in {:.1}s\n",
        p.total_simulations,
        p.base_seed,
        p.elapsed_ms as f64 / 1000.0
    );
    for e in &p.rankings {
        let _ = writeln!(out, "  {:<8} {:>5} {:>6.1}%", e.team, e.championships, e.percentage);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::fixtures::default_team;
    use sim_core::{Conference, EngineConfig};

    fn game() -> GameResult {
        let mut h = default_team("HOM", Conference::East);
        let mut a = default_team("AWY", Conference::West);
        sim_engine::simulate_game_seeded(&mut h, &mut a, &EngineConfig::default(), 42).unwrap()
    }

    #[test]
    fn clock_and_period_labels() {
        assert_eq!(clock(720), "12:00");
        assert_eq!(clock(65), "01:05");
        assert_eq!(period_label(4, 4), "Q4");
        assert_eq!(period_label(6, 4), "OT2");
        assert_eq!(period_label(2, 2), "H2");
        assert_eq!(period_label(3, 2), "OT1");
    }

    #[test]
    fn two_half_games_render_overtime_from_the_result() {
        let mut cfg = EngineConfig::default();
        cfg.clock.regulation_periods = 2;
        cfg.clock.quarter_seconds = 1440;
        let mut h = default_team("HOM", Conference::East);
        let mut a = default_team("AWY", Conference::West);
        let r = sim_engine::simulate_game_seeded(&mut h, &mut a, &cfg, 9).unwrap();
        assert_eq!(r.regulation_periods, 2);
        let text = play_by_play(&r);
        assert!(text.contains("End of H2"));
        assert!(!text.contains("Q3"));
        let last = text.lines().last().unwrap();
        if r.final_period > 2 {
            assert!(last.contains(&format!("(OT{})", r.final_period - 2)));
        } else {
            assert!(!last.contains("OT"));
        }
    }

    #[test]
    fn every_event_renders_with_names() {
        let r = game();
        let text = play_by_play(&r);
        assert_eq!(text.lines().count(), r.events.len());
        assert!(!text.contains("unknown player"));
        assert!(text.lines().last().unwrap().contains("Final"));
        assert!(text.lines().next().unwrap().contains("Jump ball"));
    }

    #[test]
    fn box_score_lists_both_teams() {
        let r = game();
        let text = box_score(&r);
        assert!(text.starts_with(&format!("HOM {} - {} AWY", r.home_score, r.away_score)));
        assert_eq!(text.matches("TOTAL").count(), 2);
    }

    #[test]
    fn leader_has_no_games_back() {
        let table = vec![StandingEntry {
            seed: 1,
            team: "BOS".into(),
            wins: 10,
            losses: 2,
            win_pct: 10.0 / 12.0,
            games_back: 0.0,
            point_diff: 88,
        }];
        let text = standings("East", &table);
        assert!(text.contains("BOS"));
        assert!(text.contains(" - "));
        assert!(text.contains("+88"));
    }
}
