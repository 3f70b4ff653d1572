use chrono::{DateTime, Duration, Utc};

use crate::error::KnockoutError;
use crate::types::MatchNumber;

/// Hands out back-to-back match slots inside a period whose end never moves.
#[derive(Clone, Debug)]
pub struct PeriodClock {
  current: DateTime<Utc>,
  start: DateTime<Utc>,
  end: DateTime<Utc>,
  slot_length: Duration,
}

impl PeriodClock {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, slot_length: Duration) -> Self {
    PeriodClock {
      current: start,
      start,
      end,
      slot_length,
    }
  }

  pub fn current_time(&self) -> DateTime<Utc> {
    self.current
  }

  pub fn advance(&mut self, by: Duration) {
    self.current += by;
  }

  /// Take the next slot for match `num` and move past it.
  pub fn next_slot(&mut self, num: MatchNumber) -> Result<(DateTime<Utc>, DateTime<Utc>), KnockoutError> {
    let start = self.current;
    let end = self.fit(num, start)?;
    self.current = end;
    Ok((start, end))
  }

  /// End time of a slot starting at `start`, if it lies inside the period.
  pub fn fit(&self, num: MatchNumber, start: DateTime<Utc>) -> Result<DateTime<Utc>, KnockoutError> {
    let end = start + self.slot_length;
    if start < self.start || end > self.end {
      return Err(KnockoutError::KnockoutOverrun {
        num,
        end,
        period_end: self.end,
      });
    }
    Ok(end)
  }
}
