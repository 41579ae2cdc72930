#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state management for Half-It.
//!
//! The [`Game`] owns the roster, the scores, and the position within the
//! fixed round plan. All mutation flows through [`apply`], which executes
//! one [`Command`] and appends the resulting [`Event`] values; reads go
//! through the [`query`] module.

use half_it_core::{
    Command, ConfigureError, Difficulty, Event, Mission, PlayerIndex, PlayerName, Round, Throw,
    ThrowError, ThrowValue, TransitionSignal, ROUND_COUNT, ROUND_PLAN,
};
use half_it_system_mission_validation::validate;

const THROWS_PER_TURN: u8 = 3;

/// Represents the authoritative state of a Half-It match.
#[derive(Debug)]
pub struct Game {
    players: Vec<Player>,
    current_player: usize,
    current_round: usize,
    difficulty: Difficulty,
    missions: Option<[Mission; 3]>,
}

#[derive(Debug)]
struct Player {
    name: PlayerName,
    score: i32,
    throws_this_round: u8,
    scored_this_round: bool,
}

impl Player {
    fn new(name: PlayerName) -> Self {
        Self {
            name,
            score: 0,
            throws_this_round: 0,
            scored_this_round: false,
        }
    }
}

impl Game {
    /// Creates an unconfigured game. Play begins once
    /// [`Command::ConfigureMatch`] installs a roster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            current_player: 0,
            current_round: 0,
            difficulty: Difficulty::Medium,
            missions: None,
        }
    }

    fn is_configured(&self) -> bool {
        !self.players.is_empty()
    }

    fn is_complete(&self) -> bool {
        self.is_configured() && self.current_round >= ROUND_COUNT
    }

    fn active_round(&self) -> Option<Round> {
        ROUND_PLAN.get(self.current_round).copied()
    }

    fn active_player_mut(&mut self) -> Option<&mut Player> {
        self.players.get_mut(self.current_player)
    }

    /// Floors the active player's score to half, returning the old and
    /// new values.
    fn halve_active_score(&mut self) -> Option<(i32, i32)> {
        let player = self.active_player_mut()?;
        let previous = player.score;
        player.score = previous.div_euclid(2);
        Some((previous, player.score))
    }

    /// Closes the active player's turn and moves the match forward.
    fn advance_turn(&mut self) -> TransitionSignal {
        if let Some(player) = self.active_player_mut() {
            player.throws_this_round = 0;
            player.scored_this_round = false;
        }
        if self.current_player + 1 < self.players.len() {
            self.current_player += 1;
            TransitionSignal::NextPlayer
        } else {
            self.current_player = 0;
            self.current_round += 1;
            if self.current_round >= ROUND_COUNT {
                TransitionSignal::GameOver
            } else {
                TransitionSignal::NextRound
            }
        }
    }

    fn reset(&mut self) {
        self.players.clear();
        self.current_player = 0;
        self.current_round = 0;
        self.missions = None;
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the game, mutating state deterministically.
pub fn apply(game: &mut Game, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureMatch {
            players,
            difficulty,
        } => {
            if players.is_empty() {
                out_events.push(Event::ConfigurationRejected {
                    reason: ConfigureError::NoPlayers,
                });
                return;
            }
            game.reset();
            game.players = players.into_iter().map(Player::new).collect();
            game.difficulty = difficulty;
            out_events.push(Event::MatchConfigured {
                players: game.players.len() as u8,
                difficulty,
            });
            out_events.push(Event::MissionsRequested { difficulty });
        }
        // Routed to the mission generation system; the game holds no state
        // the command could touch.
        Command::GenerateMissions { .. } => {}
        Command::InstallMissions { missions } => {
            game.missions = Some(missions);
            out_events.push(Event::MissionsInstalled);
        }
        Command::RecordThrow { value } => record_throw(game, value, out_events),
        Command::ResolveSpecialMission { throws } => {
            resolve_special_mission(game, &throws, out_events)
        }
        Command::ResetMatch => {
            game.reset();
            out_events.push(Event::MatchReset);
        }
    }
}

fn record_throw(game: &mut Game, value: ThrowValue, out_events: &mut Vec<Event>) {
    if let Err(reason) = check_turn_open(game) {
        out_events.push(Event::ThrowRejected { reason });
        return;
    }

    let points = match (game.active_round(), value) {
        (Some(Round::Normal { target }), ThrowValue::Normal(multiplier)) => {
            u16::from(target.get()) * multiplier.factor()
        }
        (Some(Round::Bull), ThrowValue::Bull(hit)) => hit.points(),
        (Some(Round::Special { .. }), _) => {
            out_events.push(Event::ThrowRejected {
                reason: ThrowError::ExpectedMissionThrows,
            });
            return;
        }
        _ => {
            out_events.push(Event::ThrowRejected {
                reason: ThrowError::WrongRoundValue,
            });
            return;
        }
    };

    let player = PlayerIndex::new(game.current_player as u8);
    let (turn_finished, all_missed) = match game.active_player_mut() {
        Some(active) => {
            active.score += i32::from(points);
            if points > 0 {
                active.scored_this_round = true;
            }
            active.throws_this_round += 1;
            (
                active.throws_this_round >= THROWS_PER_TURN,
                !active.scored_this_round,
            )
        }
        None => return,
    };

    let mut halved = None;
    let signal = if turn_finished {
        if all_missed {
            halved = game.halve_active_score();
        }
        game.advance_turn()
    } else {
        TransitionSignal::Continuing
    };

    out_events.push(Event::ThrowRecorded {
        player,
        points,
        signal,
    });
    if let Some((previous, halved)) = halved {
        out_events.push(Event::ScoreHalved {
            player,
            previous,
            halved,
        });
    }
}

fn resolve_special_mission(game: &mut Game, throws: &[Throw; 3], out_events: &mut Vec<Event>) {
    if let Err(reason) = check_turn_open(game) {
        out_events.push(Event::ThrowRejected { reason });
        return;
    }

    let slot = match game.active_round() {
        Some(Round::Special { slot }) => slot,
        _ => {
            out_events.push(Event::ThrowRejected {
                reason: ThrowError::UnexpectedMissionThrows,
            });
            return;
        }
    };
    let mission = match game.missions {
        Some(missions) => missions[slot.index()],
        None => {
            out_events.push(Event::ThrowRejected {
                reason: ThrowError::MissionsMissing,
            });
            return;
        }
    };

    let outcome = validate(&mission, throws);
    let player = PlayerIndex::new(game.current_player as u8);
    let mut halved = None;
    if outcome.success {
        if let Some(active) = game.active_player_mut() {
            active.score += i32::from(outcome.points);
        }
    } else {
        halved = game.halve_active_score();
    }
    let signal = game.advance_turn();

    out_events.push(Event::MissionResolved {
        player,
        slot,
        success: outcome.success,
        points: outcome.points,
        signal,
    });
    if let Some((previous, halved)) = halved {
        out_events.push(Event::ScoreHalved {
            player,
            previous,
            halved,
        });
    }
}

fn check_turn_open(game: &Game) -> Result<(), ThrowError> {
    if !game.is_configured() {
        return Err(ThrowError::NotConfigured);
    }
    if game.is_complete() {
        return Err(ThrowError::MatchComplete);
    }
    Ok(())
}

/// Query functions that provide read-only access to the match state.
pub mod query {
    use super::Game;
    use half_it_core::{Difficulty, Mission, PlayerIndex, PlayerName, Round};

    /// Zero-based index of the active round within the round plan.
    #[must_use]
    pub fn round_index(game: &Game) -> usize {
        game.current_round
    }

    /// Active round, if the match is configured and still running.
    #[must_use]
    pub fn current_round(game: &Game) -> Option<Round> {
        if game.is_configured() && !game.is_complete() {
            game.active_round()
        } else {
            None
        }
    }

    /// Player whose turn it is, if the match is still running.
    #[must_use]
    pub fn current_player(game: &Game) -> Option<PlayerIndex> {
        if game.is_configured() && !game.is_complete() {
            Some(PlayerIndex::new(game.current_player as u8))
        } else {
            None
        }
    }

    /// Mission bound to the active special round, if one is active and
    /// missions are installed.
    #[must_use]
    pub fn current_special_mission(game: &Game) -> Option<Mission> {
        match current_round(game)? {
            Round::Special { slot } => game.missions.map(|missions| missions[slot.index()]),
            _ => None,
        }
    }

    /// Difficulty the match was configured with.
    #[must_use]
    pub fn difficulty(game: &Game) -> Difficulty {
        game.difficulty
    }

    /// Reports whether every round has been played to completion.
    #[must_use]
    pub fn is_complete(game: &Game) -> bool {
        game.is_complete()
    }

    /// Captures the roster in turn order with current scores.
    #[must_use]
    pub fn scoreboard(game: &Game) -> Vec<PlayerSnapshot> {
        game.players
            .iter()
            .map(|player| PlayerSnapshot {
                name: player.name.clone(),
                score: player.score,
                throws_this_round: player.throws_this_round,
            })
            .collect()
    }

    /// Final standings ordered by score, highest first. Players with equal
    /// scores keep their turn order.
    #[must_use]
    pub fn results(game: &Game) -> Vec<PlayerSnapshot> {
        let mut standings = scoreboard(game);
        standings.sort_by_key(|snapshot| std::cmp::Reverse(snapshot.score));
        standings
    }

    /// Immutable representation of a single player's state used for queries.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Name supplied at configuration time.
        pub name: PlayerName,
        /// Current score.
        pub score: i32,
        /// Throws already recorded in the active round.
        pub throws_this_round: u8,
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, Game};
    use half_it_core::{
        BullHit, Command, ConfigureError, Difficulty, Event, Mission, MissionSlot, Multiplier,
        PlayerIndex, PlayerName, Round, SegmentNumber, Throw, ThrowError, ThrowValue,
        TransitionSignal,
    };

    fn names(roster: &[&str]) -> Vec<PlayerName> {
        roster
            .iter()
            .map(|name| PlayerName::new(*name).expect("valid name"))
            .collect()
    }

    fn configured(roster: &[&str], difficulty: Difficulty) -> Game {
        let mut game = Game::new();
        let mut events = Vec::new();
        apply(
            &mut game,
            Command::ConfigureMatch {
                players: names(roster),
                difficulty,
            },
            &mut events,
        );
        apply(
            &mut game,
            Command::InstallMissions {
                missions: [Mission::Odd, Mission::Odd, Mission::Odd],
            },
            &mut events,
        );
        game
    }

    fn throw(game: &mut Game, multiplier: Multiplier) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            game,
            Command::RecordThrow {
                value: ThrowValue::Normal(multiplier),
            },
            &mut events,
        );
        events
    }

    fn bull(game: &mut Game, hit: BullHit) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            game,
            Command::RecordThrow {
                value: ThrowValue::Bull(hit),
            },
            &mut events,
        );
        events
    }

    fn resolve(game: &mut Game, throws: [Throw; 3]) -> Vec<Event> {
        let mut events = Vec::new();
        apply(game, Command::ResolveSpecialMission { throws }, &mut events);
        events
    }

    fn play_turn(game: &mut Game, multipliers: [Multiplier; 3]) -> Vec<Event> {
        let mut events = Vec::new();
        for multiplier in multipliers {
            events.extend(throw(game, multiplier));
        }
        events
    }

    fn failing_mission_throws() -> [Throw; 3] {
        [Throw::Miss, Throw::Miss, Throw::Miss]
    }

    #[test]
    fn configuration_rejects_an_empty_roster() {
        let mut game = Game::new();
        let mut events = Vec::new();
        apply(
            &mut game,
            Command::ConfigureMatch {
                players: Vec::new(),
                difficulty: Difficulty::Easy,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ConfigurationRejected {
                reason: ConfigureError::NoPlayers,
            }]
        );
        assert!(query::current_round(&game).is_none());
    }

    #[test]
    fn configuration_announces_the_match_and_requests_missions() {
        let mut game = Game::new();
        let mut events = Vec::new();
        apply(
            &mut game,
            Command::ConfigureMatch {
                players: names(&["Anna", "Bert"]),
                difficulty: Difficulty::Easy,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::MatchConfigured {
                    players: 2,
                    difficulty: Difficulty::Easy,
                },
                Event::MissionsRequested {
                    difficulty: Difficulty::Easy,
                },
            ]
        );
        assert_eq!(
            query::current_round(&game),
            Some(Round::Normal {
                target: SegmentNumber::new(20),
            })
        );
    }

    #[test]
    fn a_turn_scores_target_times_multiplier_per_throw() {
        let mut game = configured(&["Anna", "Bert"], Difficulty::Easy);

        let events = play_turn(
            &mut game,
            [Multiplier::Single, Multiplier::Double, Multiplier::Miss],
        );
        assert_eq!(
            events,
            vec![
                Event::ThrowRecorded {
                    player: PlayerIndex::new(0),
                    points: 20,
                    signal: TransitionSignal::Continuing,
                },
                Event::ThrowRecorded {
                    player: PlayerIndex::new(0),
                    points: 40,
                    signal: TransitionSignal::Continuing,
                },
                Event::ThrowRecorded {
                    player: PlayerIndex::new(0),
                    points: 0,
                    signal: TransitionSignal::NextPlayer,
                },
            ]
        );
        assert_eq!(query::scoreboard(&game)[0].score, 60);
    }

    #[test]
    fn an_all_miss_turn_halves_the_score() {
        let mut game = configured(&["Anna"], Difficulty::Easy);

        // Rounds at 20 and 19 build an odd score of 39.
        let _ = play_turn(
            &mut game,
            [Multiplier::Single, Multiplier::Miss, Multiplier::Miss],
        );
        let _ = play_turn(
            &mut game,
            [Multiplier::Miss, Multiplier::Single, Multiplier::Miss],
        );
        assert_eq!(query::scoreboard(&game)[0].score, 39);

        let events = play_turn(
            &mut game,
            [Multiplier::Miss, Multiplier::Miss, Multiplier::Miss],
        );
        assert_eq!(
            events.last(),
            Some(&Event::ScoreHalved {
                player: PlayerIndex::new(0),
                previous: 39,
                halved: 19,
            })
        );
        assert_eq!(query::scoreboard(&game)[0].score, 19);
    }

    #[test]
    fn turns_rotate_through_the_roster_before_the_round_advances() {
        let mut game = configured(&["Anna", "Bert", "Cleo"], Difficulty::Easy);

        let first = play_turn(
            &mut game,
            [Multiplier::Single, Multiplier::Single, Multiplier::Single],
        );
        assert!(matches!(
            first.last(),
            Some(Event::ThrowRecorded {
                signal: TransitionSignal::NextPlayer,
                ..
            })
        ));
        assert_eq!(query::current_player(&game), Some(PlayerIndex::new(1)));
        assert_eq!(query::round_index(&game), 0);

        let _ = play_turn(
            &mut game,
            [Multiplier::Single, Multiplier::Single, Multiplier::Single],
        );
        let third = play_turn(
            &mut game,
            [Multiplier::Single, Multiplier::Single, Multiplier::Single],
        );
        assert!(matches!(
            third.last(),
            Some(Event::ThrowRecorded {
                signal: TransitionSignal::NextRound,
                ..
            })
        ));
        assert_eq!(query::current_player(&game), Some(PlayerIndex::new(0)));
        assert_eq!(query::round_index(&game), 1);
    }

    #[test]
    fn special_rounds_reject_single_throws() {
        let mut game = configured(&["Anna"], Difficulty::Easy);
        for _ in 0..3 {
            let _ = play_turn(
                &mut game,
                [Multiplier::Single, Multiplier::Single, Multiplier::Single],
            );
        }
        assert_eq!(
            query::current_round(&game),
            Some(Round::Special {
                slot: MissionSlot::First,
            })
        );

        let events = throw(&mut game, Multiplier::Single);
        assert_eq!(
            events,
            vec![Event::ThrowRejected {
                reason: ThrowError::ExpectedMissionThrows,
            }]
        );
    }

    #[test]
    fn normal_rounds_reject_mission_throws() {
        let mut game = configured(&["Anna"], Difficulty::Easy);
        let events = resolve(&mut game, failing_mission_throws());
        assert_eq!(
            events,
            vec![Event::ThrowRejected {
                reason: ThrowError::UnexpectedMissionThrows,
            }]
        );
    }

    #[test]
    fn normal_rounds_reject_bull_values() {
        let mut game = configured(&["Anna"], Difficulty::Easy);
        let events = bull(&mut game, BullHit::Bull);
        assert_eq!(
            events,
            vec![Event::ThrowRejected {
                reason: ThrowError::WrongRoundValue,
            }]
        );
    }

    #[test]
    fn throws_require_a_configured_match() {
        let mut game = Game::new();
        let events = throw(&mut game, Multiplier::Single);
        assert_eq!(
            events,
            vec![Event::ThrowRejected {
                reason: ThrowError::NotConfigured,
            }]
        );
    }

    #[test]
    fn special_rounds_require_installed_missions() {
        let mut game = Game::new();
        let mut events = Vec::new();
        apply(
            &mut game,
            Command::ConfigureMatch {
                players: names(&["Anna"]),
                difficulty: Difficulty::Easy,
            },
            &mut events,
        );
        for _ in 0..3 {
            let _ = play_turn(
                &mut game,
                [Multiplier::Single, Multiplier::Single, Multiplier::Single],
            );
        }

        let events = resolve(&mut game, failing_mission_throws());
        assert_eq!(
            events,
            vec![Event::ThrowRejected {
                reason: ThrowError::MissionsMissing,
            }]
        );
    }

    #[test]
    fn failed_missions_halve_and_successful_missions_award_points() {
        let mut game = configured(&["Anna", "Bert"], Difficulty::Easy);
        for _ in 0..3 {
            for _ in 0..2 {
                let _ = play_turn(
                    &mut game,
                    [Multiplier::Single, Multiplier::Single, Multiplier::Single],
                );
            }
        }
        // Both players sit at 171 entering the first special round.
        assert_eq!(query::scoreboard(&game)[0].score, 171);
        assert_eq!(
            query::current_special_mission(&game),
            Some(Mission::Odd)
        );

        let failed = resolve(&mut game, failing_mission_throws());
        assert_eq!(
            failed,
            vec![
                Event::MissionResolved {
                    player: PlayerIndex::new(0),
                    slot: MissionSlot::First,
                    success: false,
                    points: 0,
                    signal: TransitionSignal::NextPlayer,
                },
                Event::ScoreHalved {
                    player: PlayerIndex::new(0),
                    previous: 171,
                    halved: 85,
                },
            ]
        );

        let odd_turn = [
            Throw::segment(19, Multiplier::Single).expect("segment"),
            Throw::segment(7, Multiplier::Triple).expect("segment"),
            Throw::segment(3, Multiplier::Single).expect("segment"),
        ];
        let succeeded = resolve(&mut game, odd_turn);
        assert_eq!(
            succeeded,
            vec![Event::MissionResolved {
                player: PlayerIndex::new(1),
                slot: MissionSlot::First,
                success: true,
                points: 19 + 21 + 3,
                signal: TransitionSignal::NextRound,
            }]
        );
        assert_eq!(query::scoreboard(&game)[1].score, 171 + 43);
    }

    #[test]
    fn a_full_match_ends_with_the_bull_round() {
        let mut game = configured(&["Solo"], Difficulty::Easy);

        let mut expected = 0i32;
        for index in 0..(half_it_core::ROUND_COUNT - 1) {
            match query::current_round(&game) {
                Some(Round::Normal { target }) => {
                    let _ = play_turn(
                        &mut game,
                        [Multiplier::Single, Multiplier::Miss, Multiplier::Miss],
                    );
                    expected += i32::from(target.get());
                }
                Some(Round::Special { .. }) => {
                    let _ = resolve(&mut game, failing_mission_throws());
                    expected = expected.div_euclid(2);
                }
                other => panic!("unexpected round {other:?} at index {index}"),
            }
        }
        assert_eq!(query::scoreboard(&game)[0].score, expected);
        assert_eq!(query::current_round(&game), Some(Round::Bull));

        let _ = bull(&mut game, BullHit::Bull);
        let _ = bull(&mut game, BullHit::Miss);
        let final_events = bull(&mut game, BullHit::DoubleBull);
        assert_eq!(
            final_events,
            vec![Event::ThrowRecorded {
                player: PlayerIndex::new(0),
                points: 50,
                signal: TransitionSignal::GameOver,
            }]
        );
        assert!(query::is_complete(&game));
        assert_eq!(query::scoreboard(&game)[0].score, expected + 75);

        let rejected = bull(&mut game, BullHit::Bull);
        assert_eq!(
            rejected,
            vec![Event::ThrowRejected {
                reason: ThrowError::MatchComplete,
            }]
        );
    }

    #[test]
    fn results_sort_by_score_and_preserve_turn_order_on_ties() {
        let mut game = configured(&["Anna", "Bert", "Cleo"], Difficulty::Easy);
        let _ = play_turn(
            &mut game,
            [Multiplier::Single, Multiplier::Miss, Multiplier::Miss],
        );
        let _ = play_turn(
            &mut game,
            [Multiplier::Double, Multiplier::Miss, Multiplier::Miss],
        );
        let _ = play_turn(
            &mut game,
            [Multiplier::Single, Multiplier::Miss, Multiplier::Miss],
        );

        let standings = query::results(&game);
        assert_eq!(standings[0].name.as_str(), "Bert");
        assert_eq!(standings[1].name.as_str(), "Anna");
        assert_eq!(standings[2].name.as_str(), "Cleo");
    }

    #[test]
    fn reset_returns_to_the_unconfigured_state_and_is_idempotent() {
        let mut game = configured(&["Anna"], Difficulty::Hard);
        let _ = play_turn(
            &mut game,
            [Multiplier::Single, Multiplier::Single, Multiplier::Single],
        );

        let mut events = Vec::new();
        apply(&mut game, Command::ResetMatch, &mut events);
        assert_eq!(events, vec![Event::MatchReset]);
        assert!(query::scoreboard(&game).is_empty());
        assert!(query::current_round(&game).is_none());

        let mut again = Vec::new();
        apply(&mut game, Command::ResetMatch, &mut again);
        assert_eq!(again, vec![Event::MatchReset]);
    }
}
