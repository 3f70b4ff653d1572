use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bracket::{BracketPosition, Round, RoundBuilder, SlotSource};
use crate::clock::PeriodClock;
use crate::config::{KnockoutConfig, StaticKnockoutConfig};
use crate::error::KnockoutError;
use crate::naming::match_display_name;
use crate::resolver::{LeaguePositionTiebreak, PlaceholderResolver, Tiebreak};
use crate::static_bracket::build_static_rounds;
use crate::types::{ArenaId, Match, MatchNumber, MatchPeriod, MatchResult, MatchType, Ranking, Schedule, TeamId, TeamSlot};

/// Lifecycle of a knockout match. Only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchState {
  PendingTeams,
  Ready,
  Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum SlotResolution {
  Ready(TeamId),
  Pending,
  Empty,
}

/// A downstream slot fed by one finishing position of a match.
#[derive(Clone, Copy, Debug)]
struct Dependent {
  target: BracketPosition,
  slot: usize,
  position: usize,
}

#[derive(Clone, Debug)]
struct Placement {
  position: BracketPosition,
  arena: ArenaId,
  start: DateTime<Utc>,
  end: DateTime<Utc>,
}

struct ZoneRng {
  state: u64,
}

impl ZoneRng {
  fn new(seed: u64) -> Self {
    let mut state = seed;
    if state == 0 {
      state = 0x9E37_79B9_7F4A_7C15;
    }
    ZoneRng { state }
  }

  fn next_u64(&mut self) -> u64 {
    let mut x = self.state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    self.state = x;
    x
  }

  fn below(&mut self, bound: usize) -> usize {
    (self.next_u64() % bound as u64) as usize
  }
}

/// Owns the knockout bracket of one event and keeps the schedule's knockout
/// matches in step with it.
///
/// Create one per event, call [`KnockoutScheduler::add_knockouts`] once the
/// league is fully scored, then feed results through
/// [`KnockoutScheduler::record_result`] (or score matches directly and call
/// [`KnockoutScheduler::resolve`]).
#[derive(Debug)]
pub struct KnockoutScheduler {
  resolver: PlaceholderResolver,
  custom_tiebreak: bool,
  rounds: Vec<Round>,
  numbers: HashMap<BracketPosition, MatchNumber>,
  positions: HashMap<MatchNumber, BracketPosition>,
  names: HashMap<BracketPosition, String>,
  dependents: HashMap<BracketPosition, Vec<Dependent>>,
}

impl Default for KnockoutScheduler {
  fn default() -> Self {
    KnockoutScheduler::new()
  }
}

impl KnockoutScheduler {
  /// Ties are broken by league position, taken from the standings passed to
  /// `add_knockouts`.
  pub fn new() -> Self {
    KnockoutScheduler {
      resolver: PlaceholderResolver::default(),
      custom_tiebreak: false,
      rounds: Vec::new(),
      numbers: HashMap::new(),
      positions: HashMap::new(),
      names: HashMap::new(),
      dependents: HashMap::new(),
    }
  }

  pub fn with_tiebreak(tiebreak: Box<dyn Tiebreak>) -> Self {
    let mut scheduler = KnockoutScheduler::new();
    scheduler.resolver = PlaceholderResolver::new(tiebreak);
    scheduler.custom_tiebreak = true;
    scheduler
  }

  pub fn add_knockouts(
    &mut self,
    schedule: &mut Schedule,
    standings: &[TeamId],
    config: &KnockoutConfig,
  ) -> Result<(), KnockoutError> {
    config.validate()?;
    if !self.rounds.is_empty() || schedule.knockout_period().is_some() {
      return Err(KnockoutError::KnockoutsAlreadyScheduled);
    }
    if !schedule.played_all_league_matches() {
      return Err(KnockoutError::LeagueIncomplete {
        unscored: schedule.unscored_league_matches(),
      });
    }
    if let Some(league_end) = schedule.league_end_time() {
      if config.period.start_time < league_end {
        return Err(KnockoutError::KnockoutsOverlapLeague {
          start: config.period.start_time,
          league_end,
        });
      }
    }

    let field = remaining_standings(standings, &config.dropped_out);
    let mut rounds = match &config.static_knockout {
      Some(static_knockout) => build_static_rounds(&field, static_knockout)?,
      None => RoundBuilder::from_config(config).build(&field)?,
    };
    if config.shuffle_zones {
      if let Some(first_round) = rounds.first_mut() {
        shuffle_zones(first_round, config.shuffle_seed);
      }
    }

    let first_num = schedule.last_match_number().map_or(0, |num| num + 1);
    let placements = match &config.static_knockout {
      Some(static_knockout) => static_placements(static_knockout, config, &rounds, first_num)?,
      None => auto_placements(config, &rounds, first_num)?,
    };

    let mut period = MatchPeriod::new(
      config.period.label.clone(),
      MatchType::Knockout,
      config.period.start_time,
      config.period.end_time,
    );
    let mut numbers = HashMap::new();
    let mut positions = HashMap::new();
    let mut names = HashMap::new();
    for (offset, placement) in placements.into_iter().enumerate() {
      let num = first_num + offset as MatchNumber;
      let position = placement.position;
      let round = &rounds[position.round];
      let display_name = match_display_name(round.rounds_remaining, position.index, num);
      period.matches.push(Match {
        num,
        display_name: display_name.clone(),
        arena: placement.arena,
        kind: MatchType::Knockout,
        teams: round.matches[position.index].slots.clone(),
        start_time: placement.start,
        end_time: placement.end,
        results: None,
      });
      numbers.insert(position, num);
      positions.insert(num, position);
      names.insert(position, display_name);
    }

    info!(
      teams = field.len(),
      rounds = rounds.len(),
      matches = period.matches.len(),
      first_num,
      "added knockout matches"
    );
    schedule.periods.push(period);

    if !self.custom_tiebreak {
      self.resolver.set_tiebreak(Box::new(LeaguePositionTiebreak::new(&field)));
    }
    self.dependents = collect_dependents(&rounds);
    self.rounds = rounds;
    self.numbers = numbers;
    self.positions = positions;
    self.names = names;
    Ok(())
  }

  pub fn get_ranking(&self, game: &Match) -> Ranking {
    self.resolver.resolve(game)
  }

  /// Rank match `num` and copy the teams it sends through into the matches
  /// it feeds. Slots of matches that already have results are left alone.
  pub fn resolve(&mut self, schedule: &mut Schedule, num: MatchNumber) -> Result<Ranking, KnockoutError> {
    let position = self.bracket_position(num).ok_or(KnockoutError::UnknownMatch(num))?;
    let game = schedule.get_match(num).ok_or(KnockoutError::UnknownMatch(num))?;
    let ranking = self.resolver.resolve(game);
    if !game.is_scored() {
      return Ok(ranking);
    }

    let dependents = self.dependents.get(&position).cloned().unwrap_or_default();
    for dependent in dependents {
      let Some(team) = ranking.get(dependent.position).and_then(TeamSlot::team) else {
        continue;
      };
      let Some(target_num) = self.match_number(dependent.target) else {
        continue;
      };
      let Some(target) = schedule.get_match_mut(target_num) else {
        continue;
      };
      if target.is_scored() {
        continue;
      }
      let Some(target_slot) = target.teams.get_mut(dependent.slot) else {
        continue;
      };
      let slot = TeamSlot::Known(team.clone());
      debug!(from = num, to = target_num, slot = dependent.slot, team = %team, "advanced team");
      *target_slot = slot.clone();
      self.rounds[dependent.target.round].matches[dependent.target.index].slots[dependent.slot] = slot;
    }
    Ok(ranking)
  }

  /// Resolve every knockout match in play order.
  pub fn resolve_all(&mut self, schedule: &mut Schedule) -> Result<(), KnockoutError> {
    let mut nums = self.positions.keys().copied().collect::<Vec<_>>();
    nums.sort_unstable();
    for num in nums {
      self.resolve(schedule, num)?;
    }
    Ok(())
  }

  pub fn match_state(&self, schedule: &Schedule, num: MatchNumber) -> Result<MatchState, KnockoutError> {
    let position = self.bracket_position(num).ok_or(KnockoutError::UnknownMatch(num))?;
    let game = schedule.get_match(num).ok_or(KnockoutError::UnknownMatch(num))?;
    if game.is_scored() {
      return Ok(MatchState::Complete);
    }
    let bracket_match = &self.rounds[position.round].matches[position.index];
    let waiting = bracket_match
      .sources
      .iter()
      .zip(&game.teams)
      .any(|(source, slot)| self.resolve_slot(schedule, *source, slot) == SlotResolution::Pending);
    Ok(if waiting { MatchState::PendingTeams } else { MatchState::Ready })
  }

  /// Score a knockout match that has all its teams, then advance its
  /// finishers.
  pub fn record_result(
    &mut self,
    schedule: &mut Schedule,
    num: MatchNumber,
    result: MatchResult,
  ) -> Result<Ranking, KnockoutError> {
    match self.match_state(schedule, num)? {
      MatchState::Complete => return Err(KnockoutError::ResultsAlreadyRecorded(num)),
      MatchState::PendingTeams => return Err(KnockoutError::MatchNotReady(num)),
      MatchState::Ready => {}
    }
    self.pull_teams(schedule, num);
    schedule
      .get_match_mut(num)
      .ok_or(KnockoutError::UnknownMatch(num))?
      .record_results(result)?;
    self.resolve(schedule, num)
  }

  pub fn bracket_position(&self, num: MatchNumber) -> Option<BracketPosition> {
    self.positions.get(&num).copied()
  }

  pub fn match_number(&self, position: BracketPosition) -> Option<MatchNumber> {
    self.numbers.get(&position).copied()
  }

  pub fn display_name(&self, position: BracketPosition) -> Option<&str> {
    self.names.get(&position).map(String::as_str)
  }

  pub fn rounds(&self) -> &[Round] {
    &self.rounds
  }

  pub fn final_match_number(&self) -> Option<MatchNumber> {
    let last = self.rounds.len().checked_sub(1)?;
    self.match_number(BracketPosition::new(last, 0))
  }

  fn resolve_slot(&self, schedule: &Schedule, source: SlotSource, current: &TeamSlot) -> SlotResolution {
    match source {
      SlotSource::Empty => SlotResolution::Empty,
      SlotSource::Seed(_) => match current.team() {
        Some(team) => SlotResolution::Ready(team.clone()),
        None => SlotResolution::Empty,
      },
      SlotSource::Ranking { from, position } => {
        let Some(feeder) = self.match_number(from).and_then(|num| schedule.get_match(num)) else {
          return SlotResolution::Empty;
        };
        if !feeder.is_scored() {
          return SlotResolution::Pending;
        }
        match self.resolver.resolve(feeder).get(position).and_then(TeamSlot::team) {
          Some(team) => SlotResolution::Ready(team.clone()),
          None => SlotResolution::Empty,
        }
      }
    }
  }

  /// Fill slots of `num` whose feeders were scored without going through
  /// `resolve`.
  fn pull_teams(&mut self, schedule: &mut Schedule, num: MatchNumber) {
    let Some(position) = self.bracket_position(num) else {
      return;
    };
    let Some(game) = schedule.get_match(num) else {
      return;
    };
    let sources = &self.rounds[position.round].matches[position.index].sources;
    let arrivals = sources
      .iter()
      .zip(&game.teams)
      .enumerate()
      .filter(|(_, (_, slot))| slot.is_pending())
      .filter_map(|(idx, (source, slot))| match self.resolve_slot(schedule, *source, slot) {
        SlotResolution::Ready(team) => Some((idx, team)),
        _ => None,
      })
      .collect::<Vec<_>>();
    let Some(game) = schedule.get_match_mut(num) else {
      return;
    };
    for (idx, team) in arrivals {
      game.teams[idx] = TeamSlot::Known(team.clone());
      self.rounds[position.round].matches[position.index].slots[idx] = TeamSlot::Known(team);
    }
  }
}

fn remaining_standings(standings: &[TeamId], dropped_out: &[TeamId]) -> Vec<TeamId> {
  for team in dropped_out {
    if !standings.contains(team) {
      warn!(team = %team, "dropped-out team is not in the standings");
    }
  }
  standings
    .iter()
    .filter(|team| !dropped_out.contains(*team))
    .cloned()
    .collect()
}

fn shuffle_zones(round: &mut Round, seed: u64) {
  let mut rng = ZoneRng::new(seed);
  for game in &mut round.matches {
    for idx in (1..game.slots.len()).rev() {
      let other = rng.below(idx + 1);
      game.slots.swap(idx, other);
      game.sources.swap(idx, other);
    }
  }
}

fn collect_dependents(rounds: &[Round]) -> HashMap<BracketPosition, Vec<Dependent>> {
  let mut dependents: HashMap<BracketPosition, Vec<Dependent>> = HashMap::new();
  for (round_index, round) in rounds.iter().enumerate() {
    for (index, game) in round.matches.iter().enumerate() {
      for (slot, source) in game.sources.iter().enumerate() {
        if let SlotSource::Ranking { from, position } = *source {
          dependents.entry(from).or_default().push(Dependent {
            target: BracketPosition::new(round_index, index),
            slot,
            position,
          });
        }
      }
    }
  }
  dependents
}

/// One time slot per batch of `arenas` matches, round by round. The final
/// goes to the configured final arena when there is one.
fn auto_placements(
  config: &KnockoutConfig,
  rounds: &[Round],
  first_num: MatchNumber,
) -> Result<Vec<Placement>, KnockoutError> {
  let mut clock = PeriodClock::new(
    config.period.start_time,
    config.period.end_time,
    config.match_slot_length(),
  );
  let mut placements = Vec::new();
  for (round_index, round) in rounds.iter().enumerate() {
    if round_index > 0 {
      clock.advance(config.round_spacing());
    }
    debug!(round = round_index, start = %clock.current_time(), "placing knockout round");
    let is_final = round_index + 1 == rounds.len();
    let indices = (0..round.matches.len()).collect::<Vec<_>>();
    for batch in indices.chunks(config.num_arenas()) {
      let num = first_num + placements.len() as MatchNumber;
      let (start, end) = clock.next_slot(num)?;
      for (arena_index, index) in batch.iter().enumerate() {
        let arena = match (&config.final_arena, is_final) {
          (Some(final_arena), true) => final_arena.clone(),
          _ => config.arenas[arena_index].clone(),
        };
        placements.push(Placement {
          position: BracketPosition::new(round_index, *index),
          arena,
          start,
          end,
        });
      }
    }
  }
  Ok(placements)
}

/// Hand-written placements, put in play order by start time and then arena
/// order. Matches must fit in the period, must not overlap on an arena and
/// must start after the matches feeding them have ended.
fn static_placements(
  static_knockout: &StaticKnockoutConfig,
  config: &KnockoutConfig,
  rounds: &[Round],
  first_num: MatchNumber,
) -> Result<Vec<Placement>, KnockoutError> {
  let clock = PeriodClock::new(
    config.period.start_time,
    config.period.end_time,
    config.match_slot_length(),
  );
  let arena_order = |arena: &ArenaId| config.arenas.iter().position(|a| a == arena).unwrap_or(usize::MAX);

  let mut ordered = static_knockout
    .rounds
    .iter()
    .enumerate()
    .flat_map(|(round, games)| {
      games
        .iter()
        .enumerate()
        .map(move |(index, game)| (BracketPosition::new(round, index), game))
    })
    .collect::<Vec<_>>();
  ordered.sort_by(|(pos_a, a), (pos_b, b)| {
    a.start_time
      .cmp(&b.start_time)
      .then_with(|| arena_order(&a.arena).cmp(&arena_order(&b.arena)))
      .then_with(|| pos_a.cmp(pos_b))
  });

  let mut placements = Vec::with_capacity(ordered.len());
  for (offset, (position, game)) in ordered.into_iter().enumerate() {
    let num = first_num + offset as MatchNumber;
    let end = clock.fit(num, game.start_time)?;
    placements.push(Placement {
      position,
      arena: game.arena.clone(),
      start: game.start_time,
      end,
    });
  }

  for (idx, placement) in placements.iter().enumerate() {
    if let Some(clash) = placements[idx + 1..].iter().find(|other| {
      other.arena == placement.arena && other.start < placement.end && placement.start < other.end
    }) {
      return Err(KnockoutError::InvalidStaticBracket(format!(
        "R{}M{} and R{}M{} overlap on arena {}",
        placement.position.round, placement.position.index, clash.position.round, clash.position.index, placement.arena
      )));
    }
  }

  let ends = placements
    .iter()
    .map(|placement| (placement.position, placement.end))
    .collect::<HashMap<_, _>>();
  for placement in &placements {
    let sources = &rounds[placement.position.round].matches[placement.position.index].sources;
    for source in sources {
      let SlotSource::Ranking { from, .. } = source else {
        continue;
      };
      if ends.get(from).is_some_and(|feeder_end| *feeder_end > placement.start) {
        return Err(KnockoutError::InvalidStaticBracket(format!(
          "R{}M{} starts before R{}M{} has finished",
          placement.position.round, placement.position.index, from.round, from.index
        )));
      }
    }
  }
  Ok(placements)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 14, hour, minute, 0).unwrap()
  }

  fn standings(count: usize) -> Vec<TeamId> {
    (1..=count).map(|n| TeamId::new(format!("T{n:02}"))).collect()
  }

  fn league(scored: bool) -> Schedule {
    let mut period = MatchPeriod::new("League", MatchType::League, at(10, 0), at(12, 0));
    for num in 0..3 {
      period.matches.push(Match {
        num,
        display_name: format!("Match {num}"),
        arena: ArenaId::from("A"),
        kind: MatchType::League,
        teams: vec![TeamSlot::Known(TeamId::from("T01")), TeamSlot::Known(TeamId::from("T02"))],
        start_time: at(10, 0) + Duration::minutes(5 * i64::from(num)),
        end_time: at(10, 5) + Duration::minutes(5 * i64::from(num)),
        results: scored.then(|| MatchResult::from_scores([("T01", 1), ("T02", 2)])),
      });
    }
    Schedule { periods: vec![period] }
  }

  fn config() -> KnockoutConfig {
    KnockoutConfig::new(vec![ArenaId::from("A"), ArenaId::from("B")], at(13, 0), at(14, 0))
  }

  #[test]
  fn test_numbers_follow_the_league() {
    let mut schedule = league(true);
    let mut scheduler = KnockoutScheduler::new();
    scheduler.add_knockouts(&mut schedule, &standings(8), &config()).unwrap();

    let period = schedule.knockout_period().unwrap();
    let nums = period.matches.iter().map(|m| m.num).collect::<Vec<_>>();
    assert_eq!(nums, vec![3, 4, 5]);
    assert_eq!(period.matches[2].display_name, "Final (#5)");
    assert_eq!(period.matches[0].display_name, "Semi 1 (#3)");
    assert_eq!(scheduler.final_match_number(), Some(5));
    assert_eq!(scheduler.display_name(BracketPosition::new(0, 1)), Some("Semi 2 (#4)"));
  }

  #[test]
  fn test_semis_share_a_slot_and_the_final_follows() {
    let mut schedule = league(true);
    let mut scheduler = KnockoutScheduler::new();
    let mut config = config();
    config.round_spacing_secs = 600;
    config.final_arena = Some(ArenaId::from("B"));
    scheduler.add_knockouts(&mut schedule, &standings(8), &config).unwrap();

    let matches = &schedule.knockout_period().unwrap().matches;
    assert_eq!(matches[0].start_time, at(13, 0));
    assert_eq!(matches[1].start_time, at(13, 0));
    assert_eq!(matches[0].arena, ArenaId::from("A"));
    assert_eq!(matches[1].arena, ArenaId::from("B"));
    assert_eq!(matches[2].start_time, at(13, 15));
    assert_eq!(matches[2].arena, ArenaId::from("B"));
  }

  #[test]
  fn test_league_must_be_finished() {
    let mut schedule = league(false);
    let err = KnockoutScheduler::new()
      .add_knockouts(&mut schedule, &standings(8), &config())
      .unwrap_err();
    assert!(matches!(err, KnockoutError::LeagueIncomplete { ref unscored } if unscored == &vec![0, 1, 2]));
    assert!(schedule.knockout_period().is_none());
  }

  #[test]
  fn test_knockouts_start_after_the_league() {
    let mut schedule = league(true);
    let mut config = config();
    config.period.start_time = at(11, 30);
    let err = KnockoutScheduler::new()
      .add_knockouts(&mut schedule, &standings(8), &config)
      .unwrap_err();
    assert!(matches!(err, KnockoutError::KnockoutsOverlapLeague { league_end, .. } if league_end == at(12, 0)));
    assert!(err.is_configuration());
    assert!(schedule.knockout_period().is_none());
  }

  #[test]
  fn test_late_league_match_pushes_the_league_end() {
    let mut schedule = league(true);
    let last = schedule.get_match_mut(2).unwrap();
    last.start_time = at(12, 55);
    last.end_time = at(13, 5);
    let err = KnockoutScheduler::new()
      .add_knockouts(&mut schedule, &standings(8), &config())
      .unwrap_err();
    assert!(matches!(err, KnockoutError::KnockoutsOverlapLeague { league_end, .. } if league_end == at(13, 5)));
  }

  #[test]
  fn test_knockouts_are_added_once() {
    let mut schedule = league(true);
    let mut scheduler = KnockoutScheduler::new();
    scheduler.add_knockouts(&mut schedule, &standings(8), &config()).unwrap();
    assert!(matches!(
      scheduler.add_knockouts(&mut schedule, &standings(8), &config()),
      Err(KnockoutError::KnockoutsAlreadyScheduled)
    ));
  }

  #[test]
  fn test_overrun_is_rejected() {
    let mut schedule = league(true);
    let mut config = config();
    config.period.end_time = at(13, 7);
    let err = KnockoutScheduler::new()
      .add_knockouts(&mut schedule, &standings(8), &config)
      .unwrap_err();
    assert!(matches!(err, KnockoutError::KnockoutOverrun { num: 5, .. }));
  }

  #[test]
  fn test_resolve_fills_the_final() {
    let mut schedule = league(true);
    let mut scheduler = KnockoutScheduler::new();
    scheduler.add_knockouts(&mut schedule, &standings(8), &config()).unwrap();
    assert_eq!(scheduler.match_state(&schedule, 5).unwrap(), MatchState::PendingTeams);

    scheduler
      .record_result(
        &mut schedule,
        3,
        MatchResult::from_scores([("T01", 1), ("T04", 4), ("T05", 3), ("T08", 0)]),
      )
      .unwrap();
    let final_teams = schedule.get_match(5).unwrap().teams.clone();
    assert_eq!(final_teams[0], TeamSlot::Known(TeamId::from("T04")));
    assert_eq!(final_teams[1], TeamSlot::Known(TeamId::from("T05")));
    assert!(final_teams[2].is_pending());
    assert_eq!(scheduler.match_state(&schedule, 5).unwrap(), MatchState::PendingTeams);
    assert!(matches!(
      scheduler.record_result(&mut schedule, 5, MatchResult::default()),
      Err(KnockoutError::MatchNotReady(5))
    ));
  }

  #[test]
  fn test_pull_teams_catches_direct_scoring() {
    let mut schedule = league(true);
    let mut scheduler = KnockoutScheduler::new();
    let mut config = config();
    config.teams_per_arena = 2;
    scheduler.add_knockouts(&mut schedule, &standings(4), &config).unwrap();

    // Four teams in matches of two: two semis and a final.
    for (num, winner, loser) in [(3, "T01", "T04"), (4, "T02", "T03")] {
      schedule
        .get_match_mut(num)
        .unwrap()
        .record_results(MatchResult::from_scores([(winner, 2), (loser, 0)]))
        .unwrap();
    }
    assert_eq!(scheduler.match_state(&schedule, 5).unwrap(), MatchState::Ready);
    scheduler
      .record_result(&mut schedule, 5, MatchResult::from_scores([("T01", 0), ("T02", 1)]))
      .unwrap();
    assert_eq!(scheduler.get_ranking(schedule.get_match(5).unwrap())[0], TeamSlot::Known(TeamId::from("T02")));
  }

  #[test]
  fn test_resolve_skips_slots_missing_from_a_resized_match() {
    let mut schedule = league(true);
    let mut scheduler = KnockoutScheduler::new();
    scheduler.add_knockouts(&mut schedule, &standings(8), &config()).unwrap();
    schedule.get_match_mut(5).unwrap().teams.truncate(1);

    scheduler
      .record_result(
        &mut schedule,
        3,
        MatchResult::from_scores([("T01", 4), ("T04", 3), ("T05", 2), ("T08", 1)]),
      )
      .unwrap();
    assert_eq!(schedule.get_match(5).unwrap().teams, vec![TeamSlot::Known(TeamId::from("T01"))]);
  }

  #[test]
  fn test_shuffle_is_deterministic() {
    let mut config = config();
    config.shuffle_zones = true;
    config.shuffle_seed = 7;
    let build = || {
      let mut schedule = league(true);
      KnockoutScheduler::new()
        .add_knockouts(&mut schedule, &standings(8), &config)
        .unwrap();
      schedule.knockout_period().unwrap().matches[0].teams.clone()
    };
    let first = build();
    assert_eq!(first, build());
    let mut sorted = first.iter().map(|slot| slot.to_string()).collect::<Vec<_>>();
    sorted.sort();
    assert_eq!(sorted, vec!["T01", "T04", "T05", "T08"]);
  }

  #[test]
  fn test_unknown_match() {
    let mut schedule = league(true);
    let mut scheduler = KnockoutScheduler::new();
    scheduler.add_knockouts(&mut schedule, &standings(8), &config()).unwrap();
    assert!(matches!(scheduler.resolve(&mut schedule, 1), Err(KnockoutError::UnknownMatch(1))));
    assert!(matches!(scheduler.match_state(&schedule, 99), Err(KnockoutError::UnknownMatch(99))));
  }
}
