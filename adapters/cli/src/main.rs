#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that hosts an interactive Half-It match.
//!
//! The adapter owns the outer loop only: it reads throws from stdin, turns
//! them into commands, routes mission generation, and prints the events the
//! engine emits.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use half_it_core::{
    BullHit, Command, Difficulty, Event, Mission, MissionSeedContext, Multiplier, PlayerIndex,
    PlayerName, Round, SegmentColor, Throw, ThrowValue,
};
use half_it_system_mission_generation::MissionGeneration;
use half_it_system_mission_validation::is_possible_score;
use half_it_world::{self as world, query, Game};

/// Command-line arguments accepted by the Half-It adapter.
#[derive(Debug, Parser)]
#[command(name = "half-it", about = "Interactive scorer for the Half-It darts game")]
struct Args {
    /// Player name, in turn order. Repeat for every player.
    #[arg(long = "player", required = true)]
    players: Vec<String>,

    /// Difficulty governing the special-mission pool.
    #[arg(long, value_enum, default_value_t = DifficultyArg::Medium)]
    difficulty: DifficultyArg,

    /// Seed for deterministic mission generation; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

/// Difficulty choices exposed on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    /// Generous mission ceilings.
    Easy,
    /// Default mission ceilings.
    Medium,
    /// Tight mission ceilings.
    Hard,
    /// The full mission pool.
    Expert,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
            DifficultyArg::Expert => Self::Expert,
        }
    }
}

/// Owns the game, the generation system, and the seed bookkeeping that
/// keeps regenerated mission sets deterministic.
struct Session {
    game: Game,
    generation: MissionGeneration,
    seed: u64,
    draw: u32,
}

impl Session {
    fn new(seed: u64) -> Self {
        Self {
            game: Game::new(),
            generation: MissionGeneration::default(),
            seed,
            draw: 0,
        }
    }

    /// Applies a command and routes generation traffic until the event
    /// stream settles.
    fn dispatch(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut pending = vec![command];

        while let Some(command) = pending.pop() {
            let mut events = Vec::new();
            world::apply(&mut self.game, command, &mut events);

            let mut generate = Vec::new();
            for event in &events {
                match event {
                    Event::MissionsRequested { difficulty } => {
                        generate.push(Command::GenerateMissions {
                            difficulty: *difficulty,
                        });
                    }
                    Event::MissionsReady { missions } => {
                        pending.push(Command::InstallMissions {
                            missions: *missions,
                        });
                    }
                    _ => {}
                }
            }
            if !generate.is_empty() {
                let context = MissionSeedContext::new(self.seed, self.draw);
                self.draw += 1;
                self.generation
                    .handle(&generate, context, &mut events);
                for event in &events {
                    if let Event::MissionsReady { missions } = event {
                        pending.push(Command::InstallMissions {
                            missions: *missions,
                        });
                    }
                }
            }
            log.extend(events);
        }
        log
    }
}

/// Entry point for the Half-It command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    let players = parse_roster(&args.players)?;

    let mut session = Session::new(seed);
    let events = session.dispatch(Command::ConfigureMatch {
        players,
        difficulty: args.difficulty.into(),
    });
    for event in &events {
        if let Event::ConfigurationRejected { reason } = event {
            bail!("configuration rejected: {reason}");
        }
    }
    println!("Half-It — seed {seed}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while let Some(round) = query::current_round(&session.game) {
        print_scoreboard(&session.game);
        let events = play_round(&mut session, round, &mut lines)?;
        print_events(&session.game, &events);
    }

    println!("\nFinal standings:");
    for (place, entry) in query::results(&session.game).iter().enumerate() {
        println!("  {}. {} — {}", place + 1, entry.name.as_str(), entry.score);
    }
    Ok(())
}

fn parse_roster(names: &[String]) -> Result<Vec<PlayerName>> {
    names
        .iter()
        .map(|name| {
            PlayerName::new(name.as_str())
                .ok_or_else(|| anyhow!("player name {name:?} must not be blank"))
        })
        .collect()
}

fn play_round(
    session: &mut Session,
    round: Round,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<Vec<Event>> {
    let player = query::current_player(&session.game).unwrap_or(PlayerIndex::new(0));
    let name = player_name(&session.game, player);

    match round {
        Round::Normal { target } => {
            println!("\n{name} throws at {} (multiplier 0-3):", target.get());
            let mut events = Vec::new();
            for dart in 1..=3 {
                let multiplier = prompt(lines, &format!("  dart {dart}: "), parse_multiplier)?;
                events.extend(session.dispatch(Command::RecordThrow {
                    value: ThrowValue::Normal(multiplier),
                }));
            }
            Ok(events)
        }
        Round::Bull => {
            println!("\n{name} throws at the bull (0, 25, or 50):");
            let mut events = Vec::new();
            for dart in 1..=3 {
                let hit = prompt(lines, &format!("  dart {dart}: "), parse_bull)?;
                events.extend(session.dispatch(Command::RecordThrow {
                    value: ThrowValue::Bull(hit),
                }));
            }
            Ok(events)
        }
        Round::Special { .. } => {
            let mission = query::current_special_mission(&session.game)
                .ok_or_else(|| anyhow!("special round reached without installed missions"))?;
            println!("\n{name}, mission: {}", describe_mission(&mission));
            println!("Enter each dart as `miss`, `bull`, `dbull`, or `<number> s|d|t`.");

            let mut throws = [Throw::Miss; 3];
            for dart in 0..throws.len() {
                throws[dart] = prompt(lines, &format!("  dart {}: ", dart + 1), parse_mission_throw)?;
                warn_if_target_unreachable(&mission, &throws, dart);
            }
            Ok(session.dispatch(Command::ResolveSpecialMission { throws }))
        }
    }
}

/// Flags a `total_score` attempt the remaining darts can no longer save.
fn warn_if_target_unreachable(mission: &Mission, throws: &[Throw; 3], darts_thrown: usize) {
    if let Mission::TotalScore { target } = mission {
        let scored: u16 = throws[..=darts_thrown].iter().map(Throw::points).sum();
        let left = (2 - darts_thrown) as u8;
        let reachable = match target.checked_sub(scored) {
            Some(remaining) => is_possible_score(remaining, left),
            None => false,
        };
        if !reachable {
            println!("  (target {target} is out of reach)");
        }
    }
}

fn prompt<T>(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    label: &str,
    parse: fn(&str) -> Result<T, String>,
) -> Result<T> {
    loop {
        print!("{label}");
        io::stdout().flush().context("flushing prompt")?;
        let line = lines
            .next()
            .ok_or_else(|| anyhow!("input ended before the match finished"))?
            .context("reading throw input")?;
        match parse(&line) {
            Ok(value) => return Ok(value),
            Err(message) => println!("  {message}"),
        }
    }
}

fn parse_multiplier(input: &str) -> Result<Multiplier, String> {
    match input.trim() {
        "0" => Ok(Multiplier::Miss),
        "1" => Ok(Multiplier::Single),
        "2" => Ok(Multiplier::Double),
        "3" => Ok(Multiplier::Triple),
        other => Err(format!("expected a multiplier 0-3, got {other:?}")),
    }
}

fn parse_bull(input: &str) -> Result<BullHit, String> {
    match input.trim() {
        "0" | "miss" => Ok(BullHit::Miss),
        "25" | "bull" => Ok(BullHit::Bull),
        "50" | "dbull" => Ok(BullHit::DoubleBull),
        other => Err(format!("expected 0, 25, or 50, got {other:?}")),
    }
}

fn parse_mission_throw(input: &str) -> Result<Throw, String> {
    let token = input.trim().to_ascii_lowercase();
    match token.as_str() {
        "miss" | "0" => return Ok(Throw::Miss),
        "bull" => return Ok(Throw::Bull),
        "dbull" => return Ok(Throw::DoubleBull),
        _ => {}
    }

    let mut parts = token.split_whitespace();
    let number = parts
        .next()
        .and_then(|part| part.parse::<u8>().ok())
        .ok_or_else(|| format!("could not read a segment number from {input:?}"))?;
    let multiplier = match parts.next() {
        None | Some("s") | Some("1") => Multiplier::Single,
        Some("d") | Some("2") => Multiplier::Double,
        Some("t") | Some("3") => Multiplier::Triple,
        Some(other) => return Err(format!("unknown ring {other:?}, use s, d, or t")),
    };
    Throw::segment(number, multiplier).map_err(|error| error.to_string())
}

fn print_scoreboard(game: &Game) {
    println!("\n-- round {} --", query::round_index(game) + 1);
    for entry in query::scoreboard(game) {
        println!("  {:<12} {}", entry.name.as_str(), entry.score);
    }
}

fn print_events(game: &Game, events: &[Event]) {
    for event in events {
        match event {
            Event::ThrowRecorded { player, points, .. } => {
                println!("  {} scores {points}", player_name(game, *player));
            }
            Event::ScoreHalved {
                player,
                previous,
                halved,
            } => {
                println!(
                    "  {} is halved: {previous} -> {halved}",
                    player_name(game, *player)
                );
            }
            Event::MissionResolved {
                player,
                success,
                points,
                ..
            } => {
                let name = player_name(game, *player);
                if *success {
                    println!("  {name} completes the mission for {points}");
                } else {
                    println!("  {name} fails the mission");
                }
            }
            Event::ThrowRejected { reason } => println!("  rejected: {reason}"),
            Event::MissionGenerationFailed { reason } => println!("  {reason}"),
            _ => {}
        }
    }
}

fn player_name(game: &Game, player: PlayerIndex) -> String {
    query::scoreboard(game)
        .get(usize::from(player.get()))
        .map(|entry| entry.name.as_str().to_owned())
        .unwrap_or_else(|| format!("player {}", player.get()))
}

fn describe_mission(mission: &Mission) -> String {
    match mission {
        Mission::Odd => "hit only odd numbers".to_owned(),
        Mission::Even => "hit only even numbers".to_owned(),
        Mission::Ascending => "each dart must score higher than the last".to_owned(),
        Mission::Descending => "each dart must score lower than the last".to_owned(),
        Mission::Color { color } => format!("hit {}", color_name(*color)),
        Mission::Sequence { colors } => format!(
            "hit {}, then {}, then {}",
            color_name(colors[0]),
            color_name(colors[1]),
            color_name(colors[2])
        ),
        Mission::Doubles { count } => format!("hit at least {count} double(s)"),
        Mission::Triples { count } => format!("hit at least {count} triple(s)"),
        Mission::SpecificDouble { number } => format!("hit double {}", number.get()),
        Mission::SpecificTriple { number } => format!("hit triple {}", number.get()),
        Mission::TotalScore { target } => format!("score exactly {target}"),
    }
}

const fn color_name(color: SegmentColor) -> &'static str {
    match color {
        SegmentColor::White => "white",
        SegmentColor::Black => "black",
        SegmentColor::Green => "green",
        SegmentColor::Red => "red",
    }
}
