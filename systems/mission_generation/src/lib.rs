#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic generation of the three special missions of a match.
//!
//! For every [`Command::GenerateMissions`] the system rebuilds the candidate
//! pool (fresh random `total_score` targets included), filters it against
//! the per-slot difficulty ceiling, and picks one mission uniformly. All
//! randomness flows from the [`MissionSeedContext`], so a seed replays the
//! exact same draw.

use half_it_core::{
    Command, Difficulty, Event, Mission, MissionError, MissionSeedContext, MissionSlot,
    SegmentColor, SegmentNumber, RNG_STREAM_MISSION_PICK, RNG_STREAM_TOTAL_SCORE,
};
use sha2::{Digest, Sha256};

/// Candidate `total_score` bands: inclusive target range and pool weight.
const TOTAL_SCORE_BANDS: [(u16, u16, u16); 4] =
    [(20, 60, 20), (60, 80, 30), (80, 100, 40), (0, 180, 55)];

/// Number of `total_score` candidates drawn per band.
const TOTAL_SCORE_PER_BAND: usize = 5;

/// Pure system that draws deterministic mission sets for special rounds.
#[derive(Debug, Default)]
pub struct MissionGeneration;

impl MissionGeneration {
    /// Consumes `GenerateMissions` commands and emits [`Event::MissionsReady`]
    /// or [`Event::MissionGenerationFailed`].
    pub fn handle(
        &mut self,
        commands: &[Command],
        seed_context: MissionSeedContext,
        out_events: &mut Vec<Event>,
    ) {
        for command in commands {
            if let Command::GenerateMissions { difficulty } = command {
                match generate_missions(*difficulty, seed_context) {
                    Ok(missions) => out_events.push(Event::MissionsReady { missions }),
                    Err(reason) => out_events.push(Event::MissionGenerationFailed { reason }),
                }
            }
        }
    }
}

fn generate_missions(
    difficulty: Difficulty,
    seed_context: MissionSeedContext,
) -> Result<[Mission; 3], MissionError> {
    let ceilings = difficulty.mission_ceilings();
    let base_seed = derive_base_seed(seed_context.global_seed(), seed_context.draw());

    let mut missions = [Mission::Odd; 3];
    for slot in MissionSlot::ALL {
        let slot_seed = derive_slot_seed(base_seed, slot);
        missions[slot.index()] = draw_for_slot(slot, ceilings[slot.index()], slot_seed)?;
    }
    Ok(missions)
}

fn draw_for_slot(slot: MissionSlot, ceiling: u16, slot_seed: u64) -> Result<Mission, MissionError> {
    let mut target_rng = SplitMix64::new(derive_labeled_seed(slot_seed, RNG_STREAM_TOTAL_SCORE));
    let mut pick_rng = SplitMix64::new(derive_labeled_seed(slot_seed, RNG_STREAM_MISSION_PICK));

    let candidates = candidate_pool(&mut target_rng);
    let eligible: Vec<Mission> = candidates
        .into_iter()
        .filter(|candidate| candidate.weight <= ceiling)
        .map(|candidate| candidate.mission)
        .collect();

    if eligible.is_empty() {
        return Err(MissionError::NoEligibleMission { slot });
    }

    let index = (pick_rng.next_u64() % eligible.len() as u64) as usize;
    Ok(eligible[index])
}

struct Candidate {
    mission: Mission,
    weight: u16,
}

impl Candidate {
    const fn new(mission: Mission, weight: u16) -> Self {
        Self { mission, weight }
    }
}

fn candidate_pool(target_rng: &mut SplitMix64) -> Vec<Candidate> {
    let mut pool = vec![
        Candidate::new(Mission::Odd, 10),
        Candidate::new(Mission::Even, 10),
        Candidate::new(Mission::Ascending, 10),
        Candidate::new(Mission::Descending, 10),
        Candidate::new(
            Mission::Color {
                color: SegmentColor::White,
            },
            10,
        ),
        Candidate::new(
            Mission::Color {
                color: SegmentColor::Black,
            },
            10,
        ),
        Candidate::new(
            Mission::Color {
                color: SegmentColor::Green,
            },
            15,
        ),
        Candidate::new(
            Mission::Color {
                color: SegmentColor::Red,
            },
            15,
        ),
        Candidate::new(Mission::Doubles { count: 1 }, 20),
        Candidate::new(Mission::Doubles { count: 2 }, 35),
        Candidate::new(Mission::Doubles { count: 3 }, 50),
        Candidate::new(Mission::Triples { count: 1 }, 25),
        Candidate::new(Mission::Triples { count: 2 }, 40),
        Candidate::new(Mission::Triples { count: 3 }, 60),
        Candidate::new(
            Mission::Sequence {
                colors: [SegmentColor::Red, SegmentColor::Green, SegmentColor::Red],
            },
            30,
        ),
        Candidate::new(
            Mission::Sequence {
                colors: [SegmentColor::Green, SegmentColor::Red, SegmentColor::Green],
            },
            30,
        ),
        Candidate::new(
            Mission::Sequence {
                colors: [SegmentColor::Red, SegmentColor::Red, SegmentColor::Red],
            },
            35,
        ),
        Candidate::new(
            Mission::Sequence {
                colors: [SegmentColor::Green, SegmentColor::Green, SegmentColor::Green],
            },
            35,
        ),
    ];

    // Every white/black three-color combination.
    for combo in 0u8..8 {
        let colors = [
            white_black_bit(combo, 2),
            white_black_bit(combo, 1),
            white_black_bit(combo, 0),
        ];
        pool.push(Candidate::new(Mission::Sequence { colors }, 18));
    }

    for number in 10..=20u8 {
        pool.push(Candidate::new(
            Mission::SpecificDouble {
                number: SegmentNumber::new(number),
            },
            u16::from(number) * 2,
        ));
        pool.push(Candidate::new(
            Mission::SpecificTriple {
                number: SegmentNumber::new(number),
            },
            u16::from(number) * 3,
        ));
    }

    for (low, high, weight) in TOTAL_SCORE_BANDS {
        for _ in 0..TOTAL_SCORE_PER_BAND {
            let target = sample_uniform_inclusive(target_rng, low, high);
            pool.push(Candidate::new(Mission::TotalScore { target }, weight));
        }
    }

    pool
}

const fn white_black_bit(combo: u8, bit: u8) -> SegmentColor {
    if combo & (1 << bit) == 0 {
        SegmentColor::White
    } else {
        SegmentColor::Black
    }
}

fn derive_base_seed(global_seed: u64, draw: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(draw.to_le_bytes());
    finalize_seed(hasher)
}

fn derive_slot_seed(base: u64, slot: MissionSlot) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update((slot.index() as u32).to_le_bytes());
    finalize_seed(hasher)
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

fn sample_uniform_inclusive(rng: &mut SplitMix64, min: u16, max: u16) -> u16 {
    if min == max {
        return min;
    }

    let range = u64::from(max - min) + 1;
    let offset = rng.next_u64() % range;
    min + offset as u16
}

#[derive(Debug)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_replays_for_identical_seed_contexts() {
        let context = MissionSeedContext::new(7_654_321, 0);
        let first = generate_missions(Difficulty::Medium, context).expect("missions");
        let second = generate_missions(Difficulty::Medium, context).expect("missions");
        assert_eq!(first, second);
    }

    #[test]
    fn every_difficulty_fills_all_three_slots() {
        for difficulty in [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Expert,
        ] {
            for draw in 0..8 {
                let context = MissionSeedContext::new(42, draw);
                let missions = generate_missions(difficulty, context).expect("missions");
                assert_eq!(missions.len(), 3);
            }
        }
    }

    #[test]
    fn easy_final_slot_only_offers_low_weight_missions() {
        // Ceiling 15 leaves parity, ordering, and color candidates only.
        for seed in 0..64u64 {
            let context = MissionSeedContext::new(seed, 0);
            let missions = generate_missions(Difficulty::Easy, context).expect("missions");
            let mission = missions[MissionSlot::Third.index()];
            assert!(
                matches!(
                    mission,
                    Mission::Odd
                        | Mission::Even
                        | Mission::Ascending
                        | Mission::Descending
                        | Mission::Color { .. }
                ),
                "mission {mission:?} exceeds the easy slot-three ceiling",
            );
        }
    }

    #[test]
    fn filtered_pool_respects_the_ceiling() {
        let mut rng = SplitMix64::new(99);
        let pool = candidate_pool(&mut rng);
        for difficulty in [
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Expert,
        ] {
            for (slot, ceiling) in MissionSlot::ALL.iter().zip(difficulty.mission_ceilings()) {
                let eligible = pool
                    .iter()
                    .filter(|candidate| candidate.weight <= ceiling)
                    .count();
                assert!(eligible > 0, "no candidate fits {difficulty:?} {slot:?}");
            }
        }
    }

    #[test]
    fn impossible_ceiling_reports_no_eligible_mission() {
        let result = draw_for_slot(MissionSlot::First, 5, 1);
        assert_eq!(
            result,
            Err(MissionError::NoEligibleMission {
                slot: MissionSlot::First
            })
        );
    }

    #[test]
    fn total_score_targets_stay_inside_their_bands() {
        let mut rng = SplitMix64::new(1_234);
        let pool = candidate_pool(&mut rng);
        let mut total_candidates = 0;
        for candidate in pool {
            if let Mission::TotalScore { target } = candidate.mission {
                total_candidates += 1;
                assert!(target <= 180);
                match candidate.weight {
                    20 => assert!((20..=60).contains(&target)),
                    30 => assert!((60..=80).contains(&target)),
                    40 => assert!((80..=100).contains(&target)),
                    55 => {}
                    weight => panic!("unexpected total_score weight {weight}"),
                }
            }
        }
        assert_eq!(total_candidates, 20);
    }

    #[test]
    fn white_black_combos_cover_all_eight_sequences() {
        let mut rng = SplitMix64::new(5);
        let pool = candidate_pool(&mut rng);
        let combos: Vec<[SegmentColor; 3]> = pool
            .iter()
            .filter_map(|candidate| match candidate.mission {
                Mission::Sequence { colors }
                    if colors
                        .iter()
                        .all(|c| matches!(c, SegmentColor::White | SegmentColor::Black)) =>
                {
                    Some(colors)
                }
                _ => None,
            })
            .collect();
        assert_eq!(combos.len(), 8);
        let mut unique = combos.clone();
        unique.sort_by_key(|colors| {
            colors
                .iter()
                .fold(0u8, |acc, c| (acc << 1) | u8::from(*c == SegmentColor::Black))
        });
        unique.dedup();
        assert_eq!(unique.len(), 8);
    }
}
