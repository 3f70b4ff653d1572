use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::error::KnockoutError;

// ── Constants ──────────────────────────────────────────────────────────

/// How a pending slot is rendered wherever a team code would be shown.
pub const UNKNOWABLE_TEAM: &str = "???";

// ── Identifiers ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl TeamId {
    pub fn new(code: impl Into<String>) -> Self {
        TeamId(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(value: &str) -> Self {
        TeamId(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArenaId(pub String);

impl ArenaId {
    pub fn new(name: impl Into<String>) -> Self {
        ArenaId(name.into())
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArenaId {
    fn from(value: &str) -> Self {
        ArenaId(value.to_string())
    }
}

pub type MatchNumber = u32;

// ── Slots and results ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "team")]
pub enum TeamSlot {
    Known(TeamId),
    Pending,
}

impl TeamSlot {
    pub fn team(&self) -> Option<&TeamId> {
        match self {
            TeamSlot::Known(team) => Some(team),
            TeamSlot::Pending => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TeamSlot::Pending)
    }
}

impl fmt::Display for TeamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSlot::Known(team) => write!(f, "{team}"),
            TeamSlot::Pending => f.write_str(UNKNOWABLE_TEAM),
        }
    }
}

/// Finishing order of a match, winner first.
pub type Ranking = Vec<TeamSlot>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchType {
    League,
    Knockout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub scores: BTreeMap<TeamId, u32>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub disqualified: BTreeSet<TeamId>,
}

impl MatchResult {
    pub fn from_scores<I, T>(scores: I) -> Self
    where
        I: IntoIterator<Item = (T, u32)>,
        T: Into<TeamId>,
    {
        MatchResult {
            scores: scores.into_iter().map(|(team, score)| (team.into(), score)).collect(),
            disqualified: BTreeSet::new(),
        }
    }

    pub fn with_disqualified(mut self, team: impl Into<TeamId>) -> Self {
        self.disqualified.insert(team.into());
        self
    }
}

// ── Matches ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub num: MatchNumber,
    pub display_name: String,
    pub arena: ArenaId,
    pub kind: MatchType,
    pub teams: Vec<TeamSlot>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub results: Option<MatchResult>,
}

impl Match {
    pub fn is_scored(&self) -> bool {
        self.results.is_some()
    }

    pub fn known_teams(&self) -> impl Iterator<Item = &TeamId> {
        self.teams.iter().filter_map(TeamSlot::team)
    }

    pub fn has_team(&self, team: &TeamId) -> bool {
        self.known_teams().any(|t| t == team)
    }

    /// Write results once. Every known team needs a score and nobody outside
    /// the match may appear.
    pub fn record_results(&mut self, result: MatchResult) -> Result<(), KnockoutError> {
        if self.results.is_some() {
            return Err(KnockoutError::ResultsAlreadyRecorded(self.num));
        }
        for team in result.scores.keys().chain(result.disqualified.iter()) {
            if !self.has_team(team) {
                return Err(KnockoutError::TeamNotInMatch {
                    num: self.num,
                    team: team.clone(),
                });
            }
        }
        if let Some(team) = self.known_teams().find(|team| !result.scores.contains_key(*team)) {
            return Err(KnockoutError::MissingScore {
                num: self.num,
                team: team.clone(),
            });
        }
        self.results = Some(result);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPeriod {
    pub label: String,
    pub kind: MatchType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// League periods may slip up to here; a knockout period never does.
    pub max_end_time: DateTime<Utc>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

impl MatchPeriod {
    pub fn new(label: impl Into<String>, kind: MatchType, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        MatchPeriod {
            label: label.into(),
            kind,
            start_time,
            end_time,
            max_end_time: end_time,
            matches: Vec::new(),
        }
    }
}

// ── Schedule ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub periods: Vec<MatchPeriod>,
}

impl Schedule {
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.periods.iter().flat_map(|period| period.matches.iter())
    }

    pub fn last_match_number(&self) -> Option<MatchNumber> {
        self.matches().map(|m| m.num).max()
    }

    pub fn get_match(&self, num: MatchNumber) -> Option<&Match> {
        self.matches().find(|m| m.num == num)
    }

    pub fn get_match_mut(&mut self, num: MatchNumber) -> Option<&mut Match> {
        self.periods
            .iter_mut()
            .flat_map(|period| period.matches.iter_mut())
            .find(|m| m.num == num)
    }

    pub fn unscored_league_matches(&self) -> Vec<MatchNumber> {
        self.matches()
            .filter(|m| m.kind == MatchType::League && !m.is_scored())
            .map(|m| m.num)
            .collect()
    }

    pub fn played_all_league_matches(&self) -> bool {
        self.unscored_league_matches().is_empty()
    }

    /// When the league stage is over: the later of its periods' planned ends
    /// and its last match's actual end.
    pub fn league_end_time(&self) -> Option<DateTime<Utc>> {
        let period_ends = self
            .periods
            .iter()
            .filter(|period| period.kind == MatchType::League)
            .map(|period| period.end_time);
        let match_ends = self
            .matches()
            .filter(|m| m.kind == MatchType::League)
            .map(|m| m.end_time);
        period_ends.chain(match_ends).max()
    }

    pub fn knockout_period(&self) -> Option<&MatchPeriod> {
        self.periods.iter().find(|period| period.kind == MatchType::Knockout)
    }
}
