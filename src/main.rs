//! # Game Arcade
//!
//! Terminal front end for the three search-driven computer opponents: a
//! simplified chess variant, Connect 4 and 2048.
//!
//! ## Modes
//! - `play`: a human against the computer (2048: the human slides, `h` asks for a hint)
//! - `watch`: the computer plays every side (2048 autoplay)
//! - `pvp`: two humans share the keyboard
//!
//! Set `RUST_LOG=debug` to see search depth, scores and node counts.
//!
//! ## Usage
//! Run with `cargo run --release -- --game chess --difficulty hard`.

use arcade::ai_worker::{AIRequest, AIResponse, AIWorker};
use arcade::game_controller::{GameController, MoveResult};
use arcade::game_wrapper::{GameKind, GameWrapper, MoveWrapper};
use arcade::games::chess::{ChessState, Square};
use arcade::games::connect4::Connect4State;
use arcade::games::merge2048::Merge2048State;
use arcade::{AiConfig, ChancePolicy, Difficulty, GameStatus};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::info;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Who controls the players
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Human against the computer
    Play,
    /// Computer against itself
    Watch,
    /// Two humans
    Pvp,
}

/// Side taken by the human in `play` mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HumanSide {
    /// Moves first (White, Red)
    First,
    /// Moves second (Black, Yellow)
    Second,
}

impl HumanSide {
    fn player(self) -> i32 {
        match self {
            HumanSide::First => 1,
            HumanSide::Second => -1,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game to play
    #[arg(short, long, value_enum, default_value_t = GameKind::Chess)]
    game: GameKind,

    /// Who controls the players
    #[arg(short, long, value_enum, default_value_t = Mode::Play)]
    mode: Mode,

    /// Strength of the computer opponent
    #[arg(short, long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// Side taken by the human in `play` mode
    #[arg(long, value_enum, default_value_t = HumanSide::First)]
    human_side: HumanSide,

    /// Seed for tile insertions and randomized opponents (default: clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-clock budget for time-bounded search (milliseconds)
    #[arg(long, default_value_t = 100)]
    time_budget_ms: u64,

    /// Deepest iteration the 2048 search may start
    #[arg(long, default_value_t = 4)]
    max_depth: u32,

    /// How 2048 chance nodes combine their children
    #[arg(long, value_enum, default_value_t = ChancePolicy::Bounded)]
    chance_policy: ChancePolicy,

    /// Stop after this many moves (chance insertions included)
    #[arg(long, default_value_t = 10_000)]
    max_moves: usize,
}

impl Args {
    fn ai_config(&self) -> AiConfig {
        AiConfig {
            difficulty: self.difficulty,
            time_budget: Duration::from_millis(self.time_budget_ms),
            max_depth: self.max_depth,
            chance_policy: self.chance_policy,
        }
    }

    fn is_human(&self, player: i32) -> bool {
        match (self.mode, self.game) {
            (Mode::Watch, _) => false,
            (Mode::Pvp, _) => true,
            // The 2048 player is always the human; chance never asks
            (Mode::Play, GameKind::Merge2048) => true,
            (Mode::Play, _) => player == self.human_side.player(),
        }
    }
}

/// What the human typed
enum Command {
    Move(MoveWrapper),
    Hint,
    Quit,
}

fn main() -> io::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    info!("starting {} ({:?} mode, seed {})", args.game, args.mode, seed);

    let config = args.ai_config();
    let mut controller = GameController::new(args.game, seed);
    let (ai_tx, ai_rx, worker) = AIWorker::new(seed.wrapping_add(1)).spawn();
    let mut request_id = 0;

    let stdin = io::stdin();
    let mut input = stdin.lock();

    render(&controller);
    while !controller.is_game_over() && controller.move_count() < args.max_moves {
        let player = controller.get_current_player();

        if args.is_human(player) {
            match read_command(&mut input, &controller)? {
                Command::Quit => break,
                Command::Hint => {
                    match controller.suggest_move(&config).best_move {
                        Some(mv) => println!("Hint: {}", controller.get_render_state().notation(&mv).cyan()),
                        None => println!("No move available."),
                    }
                    continue;
                }
                Command::Move(mv) => {
                    if let MoveResult::Invalid { reason } = controller.try_make_move(mv) {
                        println!("{}", reason.to_string().red());
                        continue;
                    }
                }
            }
        } else {
            request_id += 1;
            let Some(mv) = request_ai_move(&ai_tx, &ai_rx, request_id, &controller, &config) else {
                break;
            };
            let notation = controller.get_render_state().notation(&mv);
            controller.apply_trusted_move(mv);
            println!(
                "{} plays {}",
                controller.get_render_state().player_name(player),
                notation.yellow()
            );
        }
        render(&controller);
    }

    report_result(&controller);
    println!("\n{}", controller.format_history());

    let _ = ai_tx.send(AIRequest::Stop);
    let _ = worker.join();
    Ok(())
}

/// Sends the position to the worker and waits for the matching answer
fn request_ai_move(
    tx: &Sender<AIRequest>,
    rx: &Receiver<AIResponse>,
    request_id: u64,
    controller: &GameController,
    config: &AiConfig,
) -> Option<MoveWrapper> {
    tx.send(AIRequest::Search {
        request_id,
        game_state: controller.get_state_for_search(),
        config: config.clone(),
    })
    .ok()?;

    loop {
        match rx.recv().ok()? {
            AIResponse::Thinking(id) if id == request_id => {
                print!("{}", "thinking...\r".dimmed());
                let _ = io::stdout().flush();
            }
            AIResponse::MoveReady { request_id: id, result } if id == request_id => {
                return result.best_move;
            }
            _ => {}
        }
    }
}

fn read_command(input: &mut impl BufRead, controller: &GameController) -> io::Result<Command> {
    let game = controller.get_render_state();
    let prompt = match game.kind() {
        GameKind::Chess => "move (e.g. e2e4)",
        GameKind::Connect4 => "column (0-6)",
        GameKind::Merge2048 => "direction (w/a/s/d)",
    };

    loop {
        print!(
            "{} {}, h for a hint, q to quit: ",
            game.player_name(controller.get_current_player()).bold(),
            prompt
        );
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Command::Quit);
        }
        match line.trim() {
            "" => continue,
            "q" | "quit" => return Ok(Command::Quit),
            "h" | "hint" => return Ok(Command::Hint),
            text => match game.parse_move(text) {
                Ok(mv) => return Ok(Command::Move(mv)),
                Err(err) => println!("{}", err.to_string().red()),
            },
        }
    }
}

fn report_result(controller: &GameController) {
    let game = controller.get_render_state();
    let message = match controller.get_status() {
        GameStatus::Win(player) => match game {
            GameWrapper::Merge2048(_) if player == 1 => "You reached 2048!".to_string(),
            GameWrapper::Merge2048(_) => "No moves left. Game over.".to_string(),
            _ => format!("{} wins!", game.player_name(player)),
        },
        GameStatus::Draw => "Draw.".to_string(),
        GameStatus::InProgress => "Game stopped.".to_string(),
    };
    println!("{}", message.green().bold());
    if let Some(score) = controller.score() {
        println!("Score: {}", score);
    }
}

fn render(controller: &GameController) {
    println!();
    match controller.get_render_state() {
        GameWrapper::Chess(state) => render_chess(state),
        GameWrapper::Connect4(state) => render_connect4(state),
        GameWrapper::Merge2048(state) => render_2048(state),
    }
}

fn render_chess(state: &ChessState) {
    let last = state.last_move();
    for row in 0..8 {
        print!("{} ", 8 - row);
        for col in 0..8 {
            let square = Square::new(row, col);
            let symbol = state.piece_at(square).map_or('.', |p| p.symbol()).to_string();
            let cell = match state.piece_at(square) {
                Some(piece) if piece.side.player() == 1 => symbol.white().bold(),
                Some(_) => symbol.red().bold(),
                None => symbol.dimmed(),
            };
            let highlighted = last.is_some_and(|mv| mv.from == square || mv.to == square);
            if highlighted {
                print!("{} ", cell.on_blue());
            } else {
                print!("{} ", cell);
            }
        }
        println!();
    }
    println!("  a b c d e f g h");
}

fn render_connect4(state: &Connect4State) {
    let winning = state.winning_line().unwrap_or_default();
    for row in 0..state.height() {
        for col in 0..state.width() {
            let index = row * state.width() + col;
            let cell = match state.cell(row, col) {
                1 => "X".red().bold(),
                -1 => "O".yellow().bold(),
                _ => ".".dimmed(),
            };
            if winning.contains(&index) {
                print!("{} ", cell.on_green());
            } else {
                print!("{} ", cell);
            }
        }
        println!();
    }
    let labels: Vec<String> = (0..state.width()).map(|c| c.to_string()).collect();
    println!("{}", labels.join(" "));
}

fn render_2048(state: &Merge2048State) {
    println!("Score: {}", state.score().to_string().bold());
    for row in state.tiles() {
        for &value in row {
            let text = if value == 0 {
                format!("{:>6}", ".")
            } else {
                format!("{:>6}", value)
            };
            let cell = match value {
                0 => text.dimmed(),
                2 | 4 => text.normal(),
                8..=64 => text.yellow(),
                128..=1024 => text.magenta().bold(),
                _ => text.green().bold(),
            };
            print!("{}", cell);
        }
        println!();
    }
}
