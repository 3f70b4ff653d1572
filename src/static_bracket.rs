use std::collections::HashSet;
use std::str::FromStr;

use tracing::debug;

use crate::bracket::{check_capacity, BracketMatch, BracketPosition, Round, SlotSource};
use crate::config::{StaticKnockoutConfig, StaticMatchConfig};
use crate::error::KnockoutError;
use crate::types::{TeamId, TeamSlot};

/// A team reference from a hand-written bracket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TeamRef {
  /// `S<n>`: the league's n-th placed team, 1-based.
  Seed(usize),
  /// `R<r>M<m>P<p>`: finishing position `p` of match `m` in round `r`, 0-based.
  Position { round: usize, index: usize, position: usize },
}

impl TeamRef {
  fn source(self) -> SlotSource {
    match self {
      TeamRef::Seed(seed) => SlotSource::Seed(seed - 1),
      TeamRef::Position { round, index, position } => SlotSource::Ranking {
        from: BracketPosition::new(round, index),
        position,
      },
    }
  }
}

impl FromStr for TeamRef {
  type Err = KnockoutError;

  fn from_str(raw: &str) -> Result<Self, Self::Err> {
    let trimmed = raw.trim();
    let invalid = || KnockoutError::InvalidTeamRef(raw.to_string());
    let upper = trimmed.to_ascii_uppercase();

    if let Some(rest) = upper.strip_prefix('S') {
      let seed = parse_number(rest).ok_or_else(invalid)?;
      if seed == 0 {
        return Err(invalid());
      }
      return Ok(TeamRef::Seed(seed));
    }

    let rest = upper.strip_prefix('R').ok_or_else(invalid)?;
    let (round, rest) = rest.split_once('M').ok_or_else(invalid)?;
    let (index, position) = rest.split_once('P').ok_or_else(invalid)?;
    Ok(TeamRef::Position {
      round: parse_number(round).ok_or_else(invalid)?,
      index: parse_number(index).ok_or_else(invalid)?,
      position: parse_number(position).ok_or_else(invalid)?,
    })
  }
}

/// Unsigned decimal digits, no sign.
fn parse_number(digits: &str) -> Option<usize> {
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  digits.parse().ok()
}

/// Build rounds from an explicit bracket description.
///
/// Every ranking reference must point at an existing match of an earlier round
/// and be used at most once, as must every seed. The last round has to be a
/// single match.
pub fn build_static_rounds(
  standings: &[TeamId],
  config: &StaticKnockoutConfig,
) -> Result<Vec<Round>, KnockoutError> {
  check_capacity(config.teams_per_arena)?;
  if standings.len() < 2 {
    return Err(KnockoutError::NotEnoughTeams { found: standings.len() });
  }
  let total_rounds = config.rounds.len();
  match config.rounds.last() {
    Some(last) if last.len() == 1 => {}
    _ => {
      return Err(KnockoutError::InvalidStaticBracket(
        "the last round must contain exactly one match".to_string(),
      ))
    }
  }

  let mut used = HashSet::new();
  let mut rounds = Vec::with_capacity(total_rounds);
  for (round_index, round_config) in config.rounds.iter().enumerate() {
    if round_config.is_empty() {
      return Err(KnockoutError::InvalidStaticBracket(format!("round {round_index} has no matches")));
    }
    let mut matches = Vec::with_capacity(round_config.len());
    for (match_index, game) in round_config.iter().enumerate() {
      if game.teams.len() > config.teams_per_arena {
        return Err(KnockoutError::InvalidStaticBracket(format!(
          "match {match_index} of round {round_index} lists {} teams for {} zones",
          game.teams.len(),
          config.teams_per_arena
        )));
      }

      let mut sources = Vec::with_capacity(config.teams_per_arena);
      for raw in &game.teams {
        let Some(raw) = raw.as_deref() else {
          sources.push(SlotSource::Empty);
          continue;
        };
        let team_ref = raw.parse::<TeamRef>()?;
        check_reference(team_ref, round_index, &config.rounds, config.teams_per_arena, raw)?;
        if !used.insert(team_ref) {
          return Err(KnockoutError::InvalidStaticBracket(format!("{raw} is used more than once")));
        }
        sources.push(team_ref.source());
      }
      sources.resize(config.teams_per_arena, SlotSource::Empty);

      let slots = sources
        .iter()
        .map(|source| match source {
          SlotSource::Seed(seed) => standings
            .get(*seed)
            .cloned()
            .map(TeamSlot::Known)
            .unwrap_or(TeamSlot::Pending),
          _ => TeamSlot::Pending,
        })
        .collect();
      matches.push(BracketMatch { slots, sources });
    }
    rounds.push(Round {
      rounds_remaining: total_rounds - 1 - round_index,
      matches,
    });
  }

  debug!(rounds = rounds.len(), "built static knockout bracket");
  Ok(rounds)
}

fn check_reference(
  team_ref: TeamRef,
  round_index: usize,
  rounds: &[Vec<StaticMatchConfig>],
  teams_per_arena: usize,
  raw: &str,
) -> Result<(), KnockoutError> {
  let TeamRef::Position { round, index, position } = team_ref else {
    return Ok(());
  };
  if round >= round_index {
    return Err(KnockoutError::InvalidStaticBracket(format!(
      "{raw} in round {round_index} refers to a match that has not been played yet"
    )));
  }
  if index >= rounds[round].len() || position >= teams_per_arena {
    return Err(KnockoutError::InvalidStaticBracket(format!("{raw} refers to a match that does not exist")));
  }
  Ok(())
}
