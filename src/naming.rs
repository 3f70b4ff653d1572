use crate::types::MatchNumber;

pub fn match_display_name(rounds_remaining: usize, round_local_index: usize, global_match_number: MatchNumber) -> String {
  let local = round_local_index + 1;
  match rounds_remaining {
    0 => format!("Final (#{global_match_number})"),
    1 => format!("Semi {local} (#{global_match_number})"),
    2 => format!("Quarter {local} (#{global_match_number})"),
    _ => format!("Match {global_match_number}"),
  }
}
