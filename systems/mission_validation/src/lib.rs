#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure rule evaluation for Half-It special missions.
//!
//! The functions here judge a completed set of three throws against a
//! mission predicate and compute the awarded points. Applying the award or
//! the halving penalty to a player's score is the game's responsibility.

use half_it_core::{Mission, Throw};

/// Three-dart totals that no combination of dartboard scores can reach.
const UNREACHABLE_WITH_THREE: [u16; 6] = [172, 173, 175, 176, 178, 179];

/// Result of evaluating a mission against a completed turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MissionOutcome {
    /// Whether the mission predicate was satisfied.
    pub success: bool,
    /// Points awarded on success; always zero on failure.
    pub points: u16,
}

impl MissionOutcome {
    const FAILED: Self = Self {
        success: false,
        points: 0,
    };

    const fn succeeded(points: u16) -> Self {
        Self {
            success: true,
            points,
        }
    }
}

/// Evaluates a mission against the three throws of a special-round turn.
#[must_use]
pub fn validate(mission: &Mission, throws: &[Throw; 3]) -> MissionOutcome {
    match mission {
        Mission::Odd => parity_outcome(throws, 1),
        Mission::Even => parity_outcome(throws, 0),
        Mission::Color { color } => {
            let matched: u16 = throws
                .iter()
                .filter(|throw| throw.color() == Some(*color))
                .map(Throw::points)
                .sum();
            if matched > 0 {
                MissionOutcome::succeeded(matched)
            } else {
                MissionOutcome::FAILED
            }
        }
        Mission::Sequence { colors } => {
            let in_order = throws
                .iter()
                .zip(colors)
                .all(|(throw, color)| throw.color() == Some(*color));
            if in_order {
                MissionOutcome::succeeded(total_points(throws))
            } else {
                MissionOutcome::FAILED
            }
        }
        Mission::Doubles { count } => {
            count_outcome(throws, *count, throws.iter().filter(|t| t.is_double()).count())
        }
        Mission::Triples { count } => {
            count_outcome(throws, *count, throws.iter().filter(|t| t.is_triple()).count())
        }
        Mission::SpecificDouble { number } => {
            let hit = throws
                .iter()
                .any(|throw| throw.is_double() && throw.base_number() == Some(number.get()));
            all_or_nothing(throws, hit)
        }
        Mission::SpecificTriple { number } => {
            let hit = throws
                .iter()
                .any(|throw| throw.is_triple() && throw.base_number() == Some(number.get()));
            all_or_nothing(throws, hit)
        }
        Mission::TotalScore { target } => {
            if total_points(throws) == *target {
                MissionOutcome::succeeded(*target)
            } else {
                MissionOutcome::FAILED
            }
        }
        Mission::Ascending => ordered_outcome(throws, |previous, next| next > previous),
        Mission::Descending => ordered_outcome(throws, |previous, next| next < previous),
    }
}

/// Reports whether `remaining` points can still be scored with the given
/// number of darts. Adapters use this to short-circuit impossible
/// `total_score` attempts before the turn is finalized.
#[must_use]
pub fn is_possible_score(remaining: u16, throws_left: u8) -> bool {
    match throws_left {
        0 => remaining == 0,
        1 => is_single_dart_score(remaining),
        2 => (0..=60).any(|first| {
            is_single_dart_score(first)
                && remaining >= first
                && is_single_dart_score(remaining - first)
        }),
        _ => remaining <= 180 && !UNREACHABLE_WITH_THREE.contains(&remaining),
    }
}

fn total_points(throws: &[Throw; 3]) -> u16 {
    throws.iter().map(Throw::points).sum()
}

fn parity_outcome(throws: &[Throw; 3], remainder: u8) -> MissionOutcome {
    let all_match = throws.iter().all(|throw| match throw.base_number() {
        Some(number) => number % 2 == remainder,
        None => false,
    });
    all_or_nothing(throws, all_match)
}

fn count_outcome(throws: &[Throw; 3], required: u8, achieved: usize) -> MissionOutcome {
    all_or_nothing(throws, achieved >= required as usize)
}

fn ordered_outcome(throws: &[Throw; 3], in_order: fn(u16, u16) -> bool) -> MissionOutcome {
    if throws.iter().any(|throw| *throw == Throw::Miss) {
        return MissionOutcome::FAILED;
    }
    let ordered = throws
        .windows(2)
        .all(|pair| in_order(pair[0].points(), pair[1].points()));
    all_or_nothing(throws, ordered)
}

fn all_or_nothing(throws: &[Throw; 3], success: bool) -> MissionOutcome {
    if success {
        MissionOutcome::succeeded(total_points(throws))
    } else {
        MissionOutcome::FAILED
    }
}

/// Scores a single dart can produce: a miss, singles 1-20, even doubles up
/// to 40, triples in multiples of three up to 60, and the two bulls.
fn is_single_dart_score(value: u16) -> bool {
    match value {
        0 | 25 | 50 => true,
        1..=20 => true,
        21..=40 => value % 2 == 0 || value % 3 == 0,
        41..=60 => value % 3 == 0,
        _ => false,
    }
}
