use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

use crate::types::{ArenaId, MatchNumber, TeamId};

#[derive(Error, Debug)]
pub enum KnockoutError {
    #[error("Knockouts need at least two teams, found {found}.")]
    NotEnoughTeams { found: usize },

    #[error("Knockouts need at least one arena.")]
    NoArenas,

    #[error("Teams per arena must be an even number of at least 2, got {teams_per_arena}.")]
    InvalidArenaCapacity { teams_per_arena: usize },

    #[error("Arena {0} is not configured for this event.")]
    UnknownArena(ArenaId),

    #[error("Arena {0} is listed more than once.")]
    DuplicateArena(ArenaId),

    #[error("Invalid team reference: {0:?}")]
    InvalidTeamRef(String),

    #[error("Invalid static knockout: {0}")]
    InvalidStaticBracket(String),

    #[error("Knockout period starts at {start} but ends at {period_end}.")]
    InvalidPeriod {
        start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    },

    #[error("Knockout period starts at {start} but the league runs until {league_end}.")]
    KnockoutsOverlapLeague {
        start: DateTime<Utc>,
        league_end: DateTime<Utc>,
    },

    #[error("Match {num} would end at {end}, after the knockout period ends at {period_end}.")]
    KnockoutOverrun {
        num: MatchNumber,
        end: DateTime<Utc>,
        period_end: DateTime<Utc>,
    },

    #[error("League is not finished; {} league match(es) unscored.", unscored.len())]
    LeagueIncomplete { unscored: Vec<MatchNumber> },

    #[error("Knockouts have already been added to this schedule.")]
    KnockoutsAlreadyScheduled,

    #[error("Match {0} is not a knockout match of this bracket.")]
    UnknownMatch(MatchNumber),

    #[error("Match {0} already has results.")]
    ResultsAlreadyRecorded(MatchNumber),

    #[error("Team {team} does not play in match {num}.")]
    TeamNotInMatch { num: MatchNumber, team: TeamId },

    #[error("Team {team} has no score for match {num}.")]
    MissingScore { num: MatchNumber, team: TeamId },

    #[error("Match {0} is still waiting on earlier results.")]
    MatchNotReady(MatchNumber),

    #[error("read knockout config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse knockout config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("write knockout config {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("create log directory {}: {source}", path.display())]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("open log file in {}: {source}", path.display())]
    LogAppender {
        path: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },
}

impl KnockoutError {
    /// Configuration problems are fixed by editing the event setup; the rest
    /// are caller mistakes at runtime.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            KnockoutError::NotEnoughTeams { .. }
                | KnockoutError::NoArenas
                | KnockoutError::InvalidArenaCapacity { .. }
                | KnockoutError::UnknownArena(_)
                | KnockoutError::DuplicateArena(_)
                | KnockoutError::InvalidTeamRef(_)
                | KnockoutError::InvalidStaticBracket(_)
                | KnockoutError::InvalidPeriod { .. }
                | KnockoutError::KnockoutsOverlapLeague { .. }
                | KnockoutError::KnockoutOverrun { .. }
                | KnockoutError::ConfigRead { .. }
                | KnockoutError::ConfigParse { .. }
                | KnockoutError::ConfigWrite { .. }
        )
    }
}
