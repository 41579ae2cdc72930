#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Half-It scoring engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative game state, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the game executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! everything that happened. Systems consume commands or events and respond
//! exclusively with new messages; no hidden state crosses this boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rounds in a complete Half-It match.
pub const ROUND_COUNT: usize = 15;

/// Fixed ordered round plan: eleven numbered rounds descending from 20,
/// three special-mission rounds at indices 3, 7, and 11, and the closing
/// bull round.
pub const ROUND_PLAN: [Round; ROUND_COUNT] = [
    Round::Normal {
        target: SegmentNumber::new(20),
    },
    Round::Normal {
        target: SegmentNumber::new(19),
    },
    Round::Normal {
        target: SegmentNumber::new(18),
    },
    Round::Special {
        slot: MissionSlot::First,
    },
    Round::Normal {
        target: SegmentNumber::new(17),
    },
    Round::Normal {
        target: SegmentNumber::new(16),
    },
    Round::Normal {
        target: SegmentNumber::new(15),
    },
    Round::Special {
        slot: MissionSlot::Second,
    },
    Round::Normal {
        target: SegmentNumber::new(14),
    },
    Round::Normal {
        target: SegmentNumber::new(13),
    },
    Round::Normal {
        target: SegmentNumber::new(12),
    },
    Round::Special {
        slot: MissionSlot::Third,
    },
    Round::Normal {
        target: SegmentNumber::new(11),
    },
    Round::Normal {
        target: SegmentNumber::new(10),
    },
    Round::Bull,
];

/// Label for the RNG stream that picks a mission from the filtered pool.
pub const RNG_STREAM_MISSION_PICK: &str = "mission-pick";

/// Label for the RNG stream that draws `total_score` targets.
pub const RNG_STREAM_TOTAL_SCORE: &str = "total-score";

/// Commands that express all permissible engine mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Starts a fresh match with the provided roster and difficulty.
    ConfigureMatch {
        /// Players in turn order. Must not be empty.
        players: Vec<PlayerName>,
        /// Difficulty governing the mission point ceilings.
        difficulty: Difficulty,
    },
    /// Requests three missions from the mission generation system.
    GenerateMissions {
        /// Difficulty whose ceilings filter the candidate pool.
        difficulty: Difficulty,
    },
    /// Binds generated missions to the three special-round slots.
    InstallMissions {
        /// Missions in slot order. By contract installed before the first
        /// round is played; the engine does not police the timing.
        missions: [Mission; 3],
    },
    /// Records a single throw for the active normal or bull round.
    RecordThrow {
        /// Outcome of the throw, shaped by the active round kind.
        value: ThrowValue,
    },
    /// Resolves the active special round against three completed throws.
    ResolveSpecialMission {
        /// The three fully-specified darts of the turn, in throw order.
        throws: [Throw; 3],
    },
    /// Clears players, missions, and position counters. Idempotent.
    ResetMatch,
}

/// Events broadcast by the engine after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a match was configured and play may begin.
    MatchConfigured {
        /// Number of players in the roster.
        players: u8,
        /// Difficulty selected for the match.
        difficulty: Difficulty,
    },
    /// Announces that the match needs missions for its special rounds.
    MissionsRequested {
        /// Difficulty the generation system should filter against.
        difficulty: Difficulty,
    },
    /// Reports missions drawn by the generation system.
    MissionsReady {
        /// Missions in slot order, ready to be installed.
        missions: [Mission; 3],
    },
    /// Reports that mission generation could not fill a slot.
    MissionGenerationFailed {
        /// Specific reason the draw failed.
        reason: MissionError,
    },
    /// Confirms that missions were bound to the special-round slots.
    MissionsInstalled,
    /// Confirms that a throw was scored for the active player.
    ThrowRecorded {
        /// Player who threw the dart.
        player: PlayerIndex,
        /// Points added to the player's score by this throw.
        points: u16,
        /// Where the match stands after the throw.
        signal: TransitionSignal,
    },
    /// Reports that a player's score was floored to half.
    ScoreHalved {
        /// Player whose score was halved.
        player: PlayerIndex,
        /// Score before the penalty.
        previous: i32,
        /// Score after flooring to half.
        halved: i32,
    },
    /// Reports the outcome of a special-mission turn.
    MissionResolved {
        /// Player who attempted the mission.
        player: PlayerIndex,
        /// Special-round slot the mission occupied.
        slot: MissionSlot,
        /// Whether the mission predicate was satisfied.
        success: bool,
        /// Points awarded on success; zero on failure.
        points: u16,
        /// Where the match stands after the turn.
        signal: TransitionSignal,
    },
    /// Reports that a configuration request was rejected.
    ConfigurationRejected {
        /// Specific reason the configuration failed.
        reason: ConfigureError,
    },
    /// Reports that a throw or mission command was rejected.
    ThrowRejected {
        /// Specific reason the command failed.
        reason: ThrowError,
    },
    /// Confirms that the match state returned to its initial values.
    MatchReset,
}

/// Validated, non-empty player name supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    /// Creates a player name, rejecting empty or whitespace-only input.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    /// Borrows the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Zero-based position of a player within the turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerIndex(u8);

impl PlayerIndex {
    /// Creates a new player index wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the underlying turn-order position.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Dartboard base number in the 1..=20 segment range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentNumber(u8);

impl SegmentNumber {
    /// Creates a new segment number wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the underlying base number.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Color of the segment's single bed. Odd numbers are white.
    #[must_use]
    pub const fn single_color(&self) -> SegmentColor {
        if self.0 % 2 == 1 {
            SegmentColor::White
        } else {
            SegmentColor::Black
        }
    }

    /// Color of the segment's double and triple rings, the inverse pairing
    /// of the single beds: odd numbers ring green, even numbers ring red.
    #[must_use]
    pub const fn ring_color(&self) -> SegmentColor {
        if self.0 % 2 == 1 {
            SegmentColor::Green
        } else {
            SegmentColor::Red
        }
    }
}

/// One of the four dartboard segment colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentColor {
    /// Single bed of an odd-numbered segment.
    White,
    /// Single bed of an even-numbered segment.
    Black,
    /// Double/triple ring of an odd-numbered segment, and the single bull.
    Green,
    /// Double/triple ring of an even-numbered segment, and the double bull.
    Red,
}

/// Outcome class of a dart thrown at a numbered segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplier {
    /// The dart missed the board or scored nothing.
    Miss,
    /// Single bed.
    Single,
    /// Double ring.
    Double,
    /// Triple ring.
    Triple,
}

impl Multiplier {
    /// Numeric factor applied to a round's base number.
    #[must_use]
    pub const fn factor(&self) -> u16 {
        match self {
            Self::Miss => 0,
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

/// Outcome of a dart thrown during the bull round. The hit itself carries
/// the awarded points; no multiplier semantics apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BullHit {
    /// The dart missed both bull rings.
    Miss,
    /// Single bull, worth 25 points.
    Bull,
    /// Double bull, worth 50 points.
    DoubleBull,
}

impl BullHit {
    /// Points awarded by the hit.
    #[must_use]
    pub const fn points(&self) -> u16 {
        match self {
            Self::Miss => 0,
            Self::Bull => 25,
            Self::DoubleBull => 50,
        }
    }
}

/// Throw input for normal and bull rounds, shaped by the round kind so a
/// bull score can never be mistaken for a multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThrowValue {
    /// Multiplier for the active numbered round's target.
    Normal(Multiplier),
    /// Resolved bull-round hit.
    Bull(BullHit),
}

/// A fully-specified dart used for special-mission validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Throw {
    /// The dart scored nothing.
    Miss,
    /// The dart landed in a numbered segment.
    Segment {
        /// Base number of the segment.
        number: SegmentNumber,
        /// Bed the dart landed in.
        multiplier: Multiplier,
    },
    /// Single bull, worth 25 points.
    Bull,
    /// Double bull, worth 50 points.
    DoubleBull,
}

impl Throw {
    /// Builds a segment throw, validating the base number.
    ///
    /// A [`Multiplier::Miss`] normalizes to [`Throw::Miss`] so downstream
    /// rules never see a numbered miss.
    pub fn segment(number: u8, multiplier: Multiplier) -> Result<Self, ThrowError> {
        if !(1..=20).contains(&number) {
            return Err(ThrowError::InvalidNumber { number });
        }
        if multiplier == Multiplier::Miss {
            return Ok(Self::Miss);
        }
        Ok(Self::Segment {
            number: SegmentNumber::new(number),
            multiplier,
        })
    }

    /// Absolute points scored by the dart.
    #[must_use]
    pub const fn points(&self) -> u16 {
        match self {
            Self::Miss => 0,
            Self::Segment { number, multiplier } => number.get() as u16 * multiplier.factor(),
            Self::Bull => 25,
            Self::DoubleBull => 50,
        }
    }

    /// Base number of the dart, if it hit anything. Both bull variants
    /// share the base number 25.
    #[must_use]
    pub const fn base_number(&self) -> Option<u8> {
        match self {
            Self::Miss => None,
            Self::Segment { number, .. } => Some(number.get()),
            Self::Bull | Self::DoubleBull => Some(25),
        }
    }

    /// Segment color of the bed the dart landed in, if any.
    #[must_use]
    pub const fn color(&self) -> Option<SegmentColor> {
        match self {
            Self::Miss => None,
            Self::Segment { number, multiplier } => match multiplier {
                Multiplier::Miss => None,
                Multiplier::Single => Some(number.single_color()),
                Multiplier::Double | Multiplier::Triple => Some(number.ring_color()),
            },
            Self::Bull => Some(SegmentColor::Green),
            Self::DoubleBull => Some(SegmentColor::Red),
        }
    }

    /// Reports whether the dart is a segment double.
    #[must_use]
    pub const fn is_double(&self) -> bool {
        matches!(
            self,
            Self::Segment {
                multiplier: Multiplier::Double,
                ..
            }
        )
    }

    /// Reports whether the dart is a segment triple.
    #[must_use]
    pub const fn is_triple(&self) -> bool {
        matches!(
            self,
            Self::Segment {
                multiplier: Multiplier::Triple,
                ..
            }
        )
    }
}

/// One entry in the fixed round plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Round {
    /// Numbered round scored as `target × multiplier` per throw.
    Normal {
        /// Base number every dart of the round aims for.
        target: SegmentNumber,
    },
    /// Special-mission round bound to one generated mission.
    Special {
        /// Mission slot the round resolves against.
        slot: MissionSlot,
    },
    /// Terminal bull round; the hit value is the score.
    Bull,
}

/// Position of a special mission within the three special rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MissionSlot {
    /// Mission bound to round index 3.
    First,
    /// Mission bound to round index 7.
    Second,
    /// Mission bound to round index 11.
    Third,
}

impl MissionSlot {
    /// All slots in round order.
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    /// Zero-based index of the slot.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }
}

/// A randomized special-mission challenge, one variant per mission kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mission {
    /// Every dart must hit an odd base number.
    Odd,
    /// Every dart must hit an even base number.
    Even,
    /// Each dart must score strictly more than the previous one.
    Ascending,
    /// Each dart must score strictly less than the previous one.
    Descending,
    /// At least one dart must land in the named color.
    Color {
        /// Color the darts are matched against.
        color: SegmentColor,
    },
    /// Dart *i* must land in color *i* of the sequence.
    Sequence {
        /// Required colors in throw order.
        colors: [SegmentColor; 3],
    },
    /// At least `count` darts must be segment doubles.
    Doubles {
        /// Required number of doubles, 1 to 3.
        count: u8,
    },
    /// At least `count` darts must be segment triples.
    Triples {
        /// Required number of triples, 1 to 3.
        count: u8,
    },
    /// Some dart must be the double of the named number.
    SpecificDouble {
        /// Base number whose double is required.
        number: SegmentNumber,
    },
    /// Some dart must be the triple of the named number.
    SpecificTriple {
        /// Base number whose triple is required.
        number: SegmentNumber,
    },
    /// The three darts must sum to the target exactly.
    TotalScore {
        /// Required exact total, 0 to 180.
        target: u16,
    },
}

/// Difficulty level governing the mission point ceilings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Generous ceilings for casual play.
    Easy,
    /// Default ceilings.
    Medium,
    /// Tight ceilings favoring high-value missions.
    Hard,
    /// The full candidate pool is in reach.
    Expert,
}

impl Difficulty {
    /// Per-slot mission weight ceilings, in slot order.
    #[must_use]
    pub const fn mission_ceilings(&self) -> [u16; 3] {
        match self {
            Self::Easy => [20, 18, 15],
            Self::Medium => [35, 30, 25],
            Self::Hard => [50, 42, 35],
            Self::Expert => [60, 50, 40],
        }
    }
}

/// Where the match stands after a scoring operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionSignal {
    /// The same player still has throws left in the turn.
    Continuing,
    /// The turn passed to the next player within the round.
    NextPlayer,
    /// Every player finished the round; the next round began.
    NextRound,
    /// The final round finished for every player.
    GameOver,
}

/// Deterministic seed context for mission generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MissionSeedContext {
    global_seed: u64,
    draw: u32,
}

impl MissionSeedContext {
    /// Creates a seed context from the match seed and a draw counter.
    ///
    /// Regenerating missions under the same global seed uses a fresh draw
    /// counter so the new set differs deterministically from the old one.
    #[must_use]
    pub const fn new(global_seed: u64, draw: u32) -> Self {
        Self { global_seed, draw }
    }

    /// Match-wide seed shared by every draw.
    #[must_use]
    pub const fn global_seed(&self) -> u64 {
        self.global_seed
    }

    /// Ordinal of this generation request within the match.
    #[must_use]
    pub const fn draw(&self) -> u32 {
        self.draw
    }
}

/// Reasons a configuration request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ConfigureError {
    /// The roster was empty; a match needs at least one player.
    #[error("at least one player is required")]
    NoPlayers,
}

/// Reasons a throw or mission command may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ThrowError {
    /// No match has been configured.
    #[error("no match is configured")]
    NotConfigured,
    /// The match already finished; no further throws are accepted.
    #[error("the match is already complete")]
    MatchComplete,
    /// A single throw was submitted while a special round is active.
    #[error("the active special round requires three mission throws")]
    ExpectedMissionThrows,
    /// Mission throws were submitted outside a special round.
    #[error("mission throws are only accepted during special rounds")]
    UnexpectedMissionThrows,
    /// The throw value does not fit the active round kind.
    #[error("throw value does not match the active round")]
    WrongRoundValue,
    /// A special round is active but no missions are installed.
    #[error("special missions have not been installed")]
    MissionsMissing,
    /// A segment base number outside 1..=20 was supplied.
    #[error("segment number {number} is outside the dartboard range")]
    InvalidNumber {
        /// The rejected base number.
        number: u8,
    },
}

/// Reasons mission generation may fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MissionError {
    /// The difficulty ceiling left no candidate for the slot.
    #[error("no mission candidate fits the ceiling for slot {slot:?}")]
    NoEligibleMission {
        /// Slot whose candidate pool filtered down to nothing.
        slot: MissionSlot,
    },
}
