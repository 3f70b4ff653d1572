// Seed placement for the first knockout round and the feeder pairing between
// later rounds. Matches are always indexed by their best seed, so index 0 holds
// seed 1 in every round.

/// League positions (0-based) for each first-round match.
///
/// Seeds are dealt in snake order: the top `matches` seeds take one match each,
/// the next `matches` seeds are dealt back in reverse, and so on. With two
/// matches of four this gives `[0, 3, 4, 7]` and `[1, 2, 5, 6]`.
pub fn first_round_seeding(matches: usize, teams_per_arena: usize) -> Vec<Vec<usize>> {
  let mut out = vec![Vec::with_capacity(teams_per_arena); matches];
  for depth in 0..teams_per_arena {
    for (idx, seeds) in out.iter_mut().enumerate() {
      let offset = if depth % 2 == 0 { idx } else { matches - 1 - idx };
      seeds.push(depth * matches + offset);
    }
  }
  out
}

/// Which two matches of a round feed each match of the next one. The best
/// remaining match meets the worst, so seeds 1 and 2 only meet in the final.
pub fn feeder_pairs(matches: usize) -> Vec<(usize, usize)> {
  (0..matches / 2).map(|idx| (idx, matches - 1 - idx)).collect()
}

pub fn next_power_of_two(n: usize) -> usize {
  let value = n.max(1);
  if value.is_power_of_two() {
    return value;
  }
  value.next_power_of_two()
}

/// Rounds needed to bring `first_round_matches` down to a single final.
pub fn rounds_for(first_round_matches: usize) -> usize {
  let mut rounds = 1;
  let mut size = next_power_of_two(first_round_matches);
  while size > 1 {
    rounds += 1;
    size /= 2;
  }
  rounds
}
