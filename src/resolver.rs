use std::{cmp::Ordering, collections::HashMap};

use crate::types::{Match, Ranking, TeamId, TeamSlot};

/// Orders two teams that finished a match level on points and disqualification.
pub trait Tiebreak {
  fn compare(&self, a: &TeamId, b: &TeamId) -> Ordering;
}

/// The better league finisher goes through. Teams missing from the standings
/// rank below every team that has a position, then by code.
#[derive(Clone, Debug, Default)]
pub struct LeaguePositionTiebreak {
  positions: HashMap<TeamId, usize>,
}

impl LeaguePositionTiebreak {
  pub fn new(standings: &[TeamId]) -> Self {
    let positions = standings
      .iter()
      .enumerate()
      .map(|(idx, team)| (team.clone(), idx))
      .collect();
    LeaguePositionTiebreak { positions }
  }
}

impl Tiebreak for LeaguePositionTiebreak {
  fn compare(&self, a: &TeamId, b: &TeamId) -> Ordering {
    let pos_a = self.positions.get(a).copied().unwrap_or(usize::MAX);
    let pos_b = self.positions.get(b).copied().unwrap_or(usize::MAX);
    pos_a.cmp(&pos_b).then_with(|| a.cmp(b))
  }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TeamIdTiebreak;

impl Tiebreak for TeamIdTiebreak {
  fn compare(&self, a: &TeamId, b: &TeamId) -> Ordering {
    a.cmp(b)
  }
}

pub struct PlaceholderResolver {
  tiebreak: Box<dyn Tiebreak>,
}

impl PlaceholderResolver {
  pub fn new(tiebreak: Box<dyn Tiebreak>) -> Self {
    PlaceholderResolver { tiebreak }
  }

  pub fn with_league_positions(standings: &[TeamId]) -> Self {
    PlaceholderResolver::new(Box::new(LeaguePositionTiebreak::new(standings)))
  }

  pub fn set_tiebreak(&mut self, tiebreak: Box<dyn Tiebreak>) {
    self.tiebreak = tiebreak;
  }

  /// Finishing order of `game`, winner first.
  ///
  /// An unscored match ranks as all-pending so a half-played bracket can
  /// still be rendered. Otherwise disqualified teams sink to the bottom, the
  /// rest order by score and then by the tiebreak. Empty zones trail as
  /// pending so the ranking is always as long as the match.
  pub fn resolve(&self, game: &Match) -> Ranking {
    let Some(result) = game.results.as_ref() else {
      return vec![TeamSlot::Pending; game.teams.len()];
    };

    let mut teams = game.known_teams().collect::<Vec<_>>();
    teams.sort_by(|a, b| {
      let dq_a = result.disqualified.contains(*a);
      let dq_b = result.disqualified.contains(*b);
      let score_a = result.scores.get(*a).copied().unwrap_or(0);
      let score_b = result.scores.get(*b).copied().unwrap_or(0);
      dq_a
        .cmp(&dq_b)
        .then_with(|| score_b.cmp(&score_a))
        .then_with(|| self.tiebreak.compare(a, b))
    });

    let mut ranking = teams
      .into_iter()
      .cloned()
      .map(TeamSlot::Known)
      .collect::<Vec<_>>();
    ranking.resize(game.teams.len(), TeamSlot::Pending);
    ranking
  }
}

impl Default for PlaceholderResolver {
  fn default() -> Self {
    PlaceholderResolver::new(Box::new(TeamIdTiebreak))
  }
}

impl std::fmt::Debug for PlaceholderResolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PlaceholderResolver").finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{ArenaId, MatchResult, MatchType};
  use chrono::{TimeZone, Utc};

  fn game(teams: &[Option<&str>]) -> Match {
    let start = Utc.with_ymd_and_hms(2024, 4, 14, 13, 0, 0).unwrap();
    Match {
      num: 40,
      display_name: "Semi 1 (#40)".to_string(),
      arena: ArenaId::from("A"),
      kind: MatchType::Knockout,
      teams: teams
        .iter()
        .map(|team| team.map(|code| TeamSlot::Known(TeamId::from(code))).unwrap_or(TeamSlot::Pending))
        .collect(),
      start_time: start,
      end_time: start,
      results: None,
    }
  }

  fn ids(ranking: &Ranking) -> Vec<String> {
    ranking.iter().map(|slot| slot.to_string()).collect()
  }

  #[test]
  fn test_unscored_match_is_all_pending() {
    let resolver = PlaceholderResolver::default();
    let ranking = resolver.resolve(&game(&[Some("AAA"), Some("BBB"), Some("CCC"), Some("DDD")]));
    assert_eq!(ranking, vec![TeamSlot::Pending; 4]);
  }

  #[test]
  fn test_orders_by_score() {
    let resolver = PlaceholderResolver::default();
    let mut m = game(&[Some("AAA"), Some("BBB"), Some("CCC"), Some("DDD")]);
    m.record_results(MatchResult::from_scores([("AAA", 2), ("BBB", 9), ("CCC", 4), ("DDD", 0)]))
      .unwrap();
    assert_eq!(ids(&resolver.resolve(&m)), vec!["BBB", "CCC", "AAA", "DDD"]);
  }

  #[test]
  fn test_disqualified_rank_last() {
    let resolver = PlaceholderResolver::default();
    let mut m = game(&[Some("AAA"), Some("BBB"), Some("CCC"), Some("DDD")]);
    m.record_results(
      MatchResult::from_scores([("AAA", 2), ("BBB", 9), ("CCC", 4), ("DDD", 0)]).with_disqualified("BBB"),
    )
    .unwrap();
    assert_eq!(ids(&resolver.resolve(&m)), vec!["CCC", "AAA", "DDD", "BBB"]);
  }

  #[test]
  fn test_league_position_breaks_ties() {
    let standings = ["DDD", "CCC", "BBB", "AAA"].map(TeamId::from);
    let resolver = PlaceholderResolver::with_league_positions(&standings);
    let mut m = game(&[Some("AAA"), Some("BBB"), Some("CCC"), Some("DDD")]);
    m.record_results(MatchResult::from_scores([("AAA", 5), ("BBB", 5), ("CCC", 1), ("DDD", 1)]))
      .unwrap();
    assert_eq!(ids(&resolver.resolve(&m)), vec!["BBB", "AAA", "DDD", "CCC"]);
  }

  #[test]
  fn test_custom_tiebreak_policy() {
    struct ReverseCode;
    impl Tiebreak for ReverseCode {
      fn compare(&self, a: &TeamId, b: &TeamId) -> Ordering {
        b.cmp(a)
      }
    }
    let resolver = PlaceholderResolver::new(Box::new(ReverseCode));
    let mut m = game(&[Some("AAA"), Some("BBB")]);
    m.record_results(MatchResult::from_scores([("AAA", 3), ("BBB", 3)])).unwrap();
    assert_eq!(ids(&resolver.resolve(&m)), vec!["BBB", "AAA"]);
  }

  #[test]
  fn test_empty_zones_trail_as_pending() {
    let resolver = PlaceholderResolver::default();
    let mut m = game(&[Some("AAA"), None, Some("CCC"), None]);
    m.record_results(MatchResult::from_scores([("AAA", 1), ("CCC", 3)])).unwrap();
    assert_eq!(ids(&resolver.resolve(&m)), vec!["CCC", "AAA", "???", "???"]);
  }

  #[test]
  fn test_resolve_is_stable() {
    let resolver = PlaceholderResolver::default();
    let mut m = game(&[Some("AAA"), Some("BBB")]);
    m.record_results(MatchResult::from_scores([("AAA", 1), ("BBB", 3)])).unwrap();
    assert_eq!(resolver.resolve(&m), resolver.resolve(&m));
  }
}
