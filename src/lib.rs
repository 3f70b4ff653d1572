//! Knockout stage scheduling on top of a finished league.
//!
//! [`KnockoutScheduler`] turns league standings into a bracket of timed
//! knockout matches, then advances finishers into later rounds as results
//! come in. Slots whose team is not yet known are [`TeamSlot::Pending`].

pub mod bracket;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod naming;
pub mod resolver;
pub mod scheduler;
pub mod seeding;
pub mod static_bracket;
pub mod types;

pub use bracket::{build_rounds, build_rounds_with_arity, BracketMatch, BracketPosition, Round, RoundBuilder, SlotSource};
pub use config::{load_knockout_config, save_knockout_config, KnockoutConfig, KnockoutPeriodConfig, StaticKnockoutConfig, StaticMatchConfig};
pub use error::KnockoutError;
pub use logging::init_tracing;
pub use naming::match_display_name;
pub use resolver::{LeaguePositionTiebreak, PlaceholderResolver, TeamIdTiebreak, Tiebreak};
pub use scheduler::{KnockoutScheduler, MatchState};
pub use static_bracket::{build_static_rounds, TeamRef};
pub use types::{
    ArenaId, Match, MatchNumber, MatchPeriod, MatchResult, MatchType, Ranking, Schedule, TeamId, TeamSlot,
    UNKNOWABLE_TEAM,
};
