use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::KnockoutConfig;
use crate::error::KnockoutError;
use crate::seeding::{feeder_pairs, first_round_seeding, next_power_of_two, rounds_for};
use crate::types::{TeamId, TeamSlot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketPosition {
  pub round: usize,
  pub index: usize,
}

impl BracketPosition {
  pub fn new(round: usize, index: usize) -> Self {
    BracketPosition { round, index }
  }
}

/// Where a bracket slot gets its team from. Fixed once the bracket is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotSource {
  /// 0-based league position. Positions past the end of the standings are byes.
  Seed(usize),
  /// Finishing position of an earlier bracket match.
  Ranking { from: BracketPosition, position: usize },
  Empty,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketMatch {
  pub slots: Vec<TeamSlot>,
  pub sources: Vec<SlotSource>,
}

impl BracketMatch {
  pub fn pending_slots(&self) -> usize {
    self.slots.iter().filter(|slot| slot.is_pending()).count()
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
  /// 0 for the final, 1 for the semis, and so on.
  pub rounds_remaining: usize,
  pub matches: Vec<BracketMatch>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundBuilder {
  num_arenas: usize,
  teams_per_arena: usize,
  arity: Option<usize>,
}

impl RoundBuilder {
  pub fn new(num_arenas: usize, teams_per_arena: usize) -> Self {
    RoundBuilder {
      num_arenas,
      teams_per_arena,
      arity: None,
    }
  }

  pub fn from_config(config: &KnockoutConfig) -> Self {
    RoundBuilder::new(config.num_arenas(), config.teams_per_arena).with_arity(config.arity)
  }

  pub fn with_arity(mut self, arity: Option<usize>) -> Self {
    self.arity = arity;
    self
  }

  pub fn build(&self, standings: &[TeamId]) -> Result<Vec<Round>, KnockoutError> {
    if self.num_arenas == 0 {
      return Err(KnockoutError::NoArenas);
    }
    check_capacity(self.teams_per_arena)?;

    let field = self.arity.unwrap_or(self.num_arenas * self.teams_per_arena);
    let qualifying = field.min(standings.len());
    if qualifying < 2 {
      return Err(KnockoutError::NotEnoughTeams { found: qualifying });
    }

    let first_round_matches = next_power_of_two(qualifying.div_ceil(self.teams_per_arena));
    let total_rounds = rounds_for(first_round_matches);
    debug!(
      qualifying,
      first_round_matches,
      total_rounds,
      teams_per_arena = self.teams_per_arena,
      "building knockout bracket"
    );

    let mut rounds = Vec::with_capacity(total_rounds);
    rounds.push(Round {
      rounds_remaining: total_rounds - 1,
      matches: first_round_seeding(first_round_matches, self.teams_per_arena)
        .into_iter()
        .map(|seeds| seeded_match(&seeds, &standings[..qualifying]))
        .collect(),
    });

    let advancing = self.teams_per_arena / 2;
    while rounds.last().map_or(0, |round| round.matches.len()) > 1 {
      let round_index = rounds.len();
      let prev_count = rounds[round_index - 1].matches.len();
      let matches = feeder_pairs(prev_count)
        .into_iter()
        .map(|(top, bottom)| {
          let sources = [top, bottom]
            .into_iter()
            .flat_map(|feeder| {
              (0..advancing).map(move |position| SlotSource::Ranking {
                from: BracketPosition::new(round_index - 1, feeder),
                position,
              })
            })
            .collect::<Vec<_>>();
          BracketMatch {
            slots: vec![TeamSlot::Pending; sources.len()],
            sources,
          }
        })
        .collect();
      rounds.push(Round {
        rounds_remaining: total_rounds - 1 - round_index,
        matches,
      });
    }

    Ok(rounds)
  }
}

/// Build the whole bracket skeleton from league standings.
pub fn build_rounds(
  standings: &[TeamId],
  num_arenas: usize,
  teams_per_arena: usize,
) -> Result<Vec<Round>, KnockoutError> {
  RoundBuilder::new(num_arenas, teams_per_arena).build(standings)
}

/// Like [`build_rounds`], but admits at most `arity` league teams.
pub fn build_rounds_with_arity(
  standings: &[TeamId],
  num_arenas: usize,
  teams_per_arena: usize,
  arity: Option<usize>,
) -> Result<Vec<Round>, KnockoutError> {
  RoundBuilder::new(num_arenas, teams_per_arena)
    .with_arity(arity)
    .build(standings)
}

pub(crate) fn check_capacity(teams_per_arena: usize) -> Result<(), KnockoutError> {
  if teams_per_arena < 2 || teams_per_arena % 2 != 0 {
    return Err(KnockoutError::InvalidArenaCapacity { teams_per_arena });
  }
  Ok(())
}

fn seeded_match(seeds: &[usize], standings: &[TeamId]) -> BracketMatch {
  let slots = seeds
    .iter()
    .map(|seed| {
      standings
        .get(*seed)
        .cloned()
        .map(TeamSlot::Known)
        .unwrap_or(TeamSlot::Pending)
    })
    .collect();
  BracketMatch {
    slots,
    sources: seeds.iter().copied().map(SlotSource::Seed).collect(),
  }
}
