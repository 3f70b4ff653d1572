use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};

use crate::error::KnockoutError;
use crate::types::{ArenaId, TeamId};

pub const DEFAULT_TEAMS_PER_ARENA: usize = 4;
pub const DEFAULT_MATCH_SLOT_LENGTH_SECS: u32 = 300;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutPeriodConfig {
  #[serde(default = "default_period_label")]
  pub label: String,
  pub start_time: DateTime<Utc>,
  pub end_time: DateTime<Utc>,
}

fn default_period_label() -> String {
  "Knockouts".to_string()
}

fn default_teams_per_arena() -> usize {
  DEFAULT_TEAMS_PER_ARENA
}

fn default_match_slot_length_secs() -> u32 {
  DEFAULT_MATCH_SLOT_LENGTH_SECS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticMatchConfig {
  pub arena: ArenaId,
  pub start_time: DateTime<Utc>,
  /// `S<n>` for league seed n, `R<r>M<m>P<p>` for a finishing position of an
  /// earlier knockout match, `null` for an empty zone.
  pub teams: Vec<Option<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticKnockoutConfig {
  #[serde(default = "default_teams_per_arena")]
  pub teams_per_arena: usize,
  pub rounds: Vec<Vec<StaticMatchConfig>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutConfig {
  pub arenas: Vec<ArenaId>,
  #[serde(default = "default_teams_per_arena")]
  pub teams_per_arena: usize,
  /// Caps how many league teams qualify. Defaults to filling every arena once.
  #[serde(default)]
  pub arity: Option<usize>,
  pub period: KnockoutPeriodConfig,
  #[serde(default = "default_match_slot_length_secs")]
  pub match_slot_length_secs: u32,
  #[serde(default)]
  pub round_spacing_secs: u32,
  #[serde(default)]
  pub final_arena: Option<ArenaId>,
  #[serde(default)]
  pub dropped_out: Vec<TeamId>,
  #[serde(default)]
  pub shuffle_zones: bool,
  #[serde(default)]
  pub shuffle_seed: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub static_knockout: Option<StaticKnockoutConfig>,
}

impl KnockoutConfig {
  pub fn new(arenas: Vec<ArenaId>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
    KnockoutConfig {
      arenas,
      teams_per_arena: DEFAULT_TEAMS_PER_ARENA,
      arity: None,
      period: KnockoutPeriodConfig {
        label: default_period_label(),
        start_time,
        end_time,
      },
      match_slot_length_secs: DEFAULT_MATCH_SLOT_LENGTH_SECS,
      round_spacing_secs: 0,
      final_arena: None,
      dropped_out: Vec::new(),
      shuffle_zones: false,
      shuffle_seed: 0,
      static_knockout: None,
    }
  }

  pub fn num_arenas(&self) -> usize {
    self.arenas.len()
  }

  pub fn match_slot_length(&self) -> Duration {
    Duration::seconds(i64::from(self.match_slot_length_secs))
  }

  pub fn round_spacing(&self) -> Duration {
    Duration::seconds(i64::from(self.round_spacing_secs))
  }

  pub fn has_arena(&self, arena: &ArenaId) -> bool {
    self.arenas.iter().any(|a| a == arena)
  }

  pub fn validate(&self) -> Result<(), KnockoutError> {
    if self.arenas.is_empty() {
      return Err(KnockoutError::NoArenas);
    }
    let capacity = match &self.static_knockout {
      Some(static_knockout) => static_knockout.teams_per_arena,
      None => self.teams_per_arena,
    };
    if capacity < 2 || capacity % 2 != 0 {
      return Err(KnockoutError::InvalidArenaCapacity {
        teams_per_arena: capacity,
      });
    }
    let mut seen = HashSet::new();
    for arena in &self.arenas {
      if !seen.insert(arena) {
        return Err(KnockoutError::DuplicateArena(arena.clone()));
      }
    }
    if let Some(arena) = &self.final_arena {
      if !self.has_arena(arena) {
        return Err(KnockoutError::UnknownArena(arena.clone()));
      }
    }
    if let Some(static_knockout) = &self.static_knockout {
      for game in static_knockout.rounds.iter().flatten() {
        if !self.has_arena(&game.arena) {
          return Err(KnockoutError::UnknownArena(game.arena.clone()));
        }
      }
    }
    if self.period.end_time <= self.period.start_time {
      return Err(KnockoutError::InvalidPeriod {
        start: self.period.start_time,
        period_end: self.period.end_time,
      });
    }
    Ok(())
  }
}

pub fn load_knockout_config(path: &Path) -> Result<KnockoutConfig, KnockoutError> {
  let data = fs::read_to_string(path).map_err(|source| KnockoutError::ConfigRead {
    path: path.to_path_buf(),
    source,
  })?;
  let config = serde_json::from_str::<KnockoutConfig>(&data).map_err(|source| KnockoutError::ConfigParse {
    path: path.to_path_buf(),
    source,
  })?;
  config.validate()?;
  Ok(config)
}

pub fn save_knockout_config(path: &Path, config: &KnockoutConfig) -> Result<(), KnockoutError> {
  let payload = serde_json::to_string_pretty(config).map_err(|e| KnockoutError::ConfigWrite {
    path: path.to_path_buf(),
    source: e.into(),
  })?;
  fs::write(path, payload).map_err(|source| KnockoutError::ConfigWrite {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use std::io::Write;

  fn sample_config() -> KnockoutConfig {
    KnockoutConfig::new(
      vec![ArenaId::from("A"), ArenaId::from("B")],
      Utc.with_ymd_and_hms(2024, 4, 14, 13, 0, 0).unwrap(),
      Utc.with_ymd_and_hms(2024, 4, 14, 16, 0, 0).unwrap(),
    )
  }

  #[test]
  fn test_parse_minimal_config_uses_defaults() {
    let raw = r#"{
      "arenas": ["A", "B"],
      "period": { "startTime": "2024-04-14T13:00:00Z", "endTime": "2024-04-14T16:00:00Z" }
    }"#;
    let config: KnockoutConfig = serde_json::from_str(raw).unwrap();
    assert_eq!(config.teams_per_arena, 4);
    assert_eq!(config.match_slot_length_secs, 300);
    assert_eq!(config.period.label, "Knockouts");
    assert!(config.static_knockout.is_none());
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_validate_rejects_odd_capacity() {
    let mut config = sample_config();
    config.teams_per_arena = 3;
    assert!(matches!(
      config.validate(),
      Err(KnockoutError::InvalidArenaCapacity { teams_per_arena: 3 })
    ));
  }

  #[test]
  fn test_validate_rejects_unknown_final_arena() {
    let mut config = sample_config();
    config.final_arena = Some(ArenaId::from("C"));
    assert!(matches!(config.validate(), Err(KnockoutError::UnknownArena(_))));
  }

  #[test]
  fn test_validate_rejects_backwards_period() {
    let mut config = sample_config();
    std::mem::swap(&mut config.period.start_time, &mut config.period.end_time);
    assert!(matches!(config.validate(), Err(KnockoutError::InvalidPeriod { .. })));
  }

  #[test]
  fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knockout.json");
    let mut config = sample_config();
    config.final_arena = Some(ArenaId::from("B"));
    config.dropped_out = vec![TeamId::from("XYZ")];
    save_knockout_config(&path, &config).unwrap();
    let loaded = load_knockout_config(&path).unwrap();
    assert_eq!(loaded, config);
  }

  #[test]
  fn test_load_reports_parse_errors_with_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    let err = load_knockout_config(file.path()).unwrap_err();
    assert!(matches!(err, KnockoutError::ConfigParse { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
  }

  #[test]
  fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_knockout_config(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, KnockoutError::ConfigRead { .. }));
    assert!(err.is_configuration());
  }
}
