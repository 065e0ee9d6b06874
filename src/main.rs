use std::error::Error;
use std::io::{self, Write};
use sweeper::{
    timer::format_elapsed, Action, CellView, Field, GameError, GameState, ModeConfig, Position,
    RecordError, RecordStore, MODES,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(_) => println!("Thanks for playing!"),
        Err(e) => eprintln!("Game error: {}", e),
    }
}

/// Glyphs used by the board printer.
#[derive(Debug, Clone, Copy)]
struct Theme {
    concealed: &'static str,
    flag: &'static str,
    false_flag: &'static str,
    mine: &'static str,
    empty: &'static str,
}

const THEME: Theme = Theme {
    concealed: "□",
    flag: "⚑",
    false_flag: "x",
    mine: "*",
    empty: " ",
};

enum Command {
    Act(Position, Action),
    NewGame(Option<u64>),
    Quit,
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let mut store = open_store();
    let mut options = store
        .as_ref()
        .and_then(RecordStore::options)
        .unwrap_or_default();
    if let Some(mode) = args.next() {
        options.mode = mode.parse()?;
    }
    let mut seed: Option<u64> = args.next().map(|s| s.parse()).transpose()?;
    let mut previous_seed = None;

    loop {
        let mut field = match Field::from_options(seed, options) {
            Ok(field) => field,
            Err(GameError::UnknownMode(index)) => {
                println!("No mode {}. Available modes:\n{}", index, mode_list());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        println!("{}", field.mode());

        let next = loop {
            print_board(&field, &THEME);
            if field.is_over() {
                break None;
            }
            match read_command(previous_seed)? {
                Some(Command::Act(pos, action)) => {
                    if let Err(e) = field.perform_action(pos, action) {
                        println!("Error: {}", e);
                    }
                }
                Some(Command::NewGame(new_seed)) => break Some(new_seed),
                Some(Command::Quit) => return Ok(()),
                None => println!("Commands: x y [r|f [rank]|g|c], n [seed], q"),
            }
        };

        if field.is_over() {
            report(&field, store.as_mut())?;
        }
        previous_seed = field.seed();
        seed = match next {
            Some(new_seed) => new_seed,
            None if confirm("Play again?", true)? => None,
            None => return Ok(()),
        };
        if let Some(store) = store.as_mut() {
            store.set_options(options)?;
        }
    }
}

fn open_store() -> Option<RecordStore> {
    let path = match RecordStore::default_path() {
        Ok(path) => path,
        Err(e) => {
            warn!(%e, "highscores disabled");
            return None;
        }
    };
    match RecordStore::open(&path) {
        Ok(store) => Some(store),
        Err(RecordError::Corrupted(_)) => {
            let fresh = confirm(
                "Records appear to be corrupted and cannot be loaded.\nClear ALL records and start fresh?",
                false,
            )
            .unwrap_or(false);
            if fresh {
                RecordStore::reinitialize(&path).ok()
            } else {
                None
            }
        }
        Err(e) => {
            warn!(%e, "highscores disabled");
            None
        }
    }
}

fn report(field: &Field, store: Option<&mut RecordStore>) -> Result<(), Box<dyn Error>> {
    if field.state() == GameState::Lost {
        println!("Game Over!");
        return Ok(());
    }
    println!("You did it! Total time: {}", format_elapsed(field.elapsed()));
    if field.mode().special {
        println!(
            "You took {} guesses and hit {} points.",
            field.guess_count(),
            field.hit_count()
        );
    }
    let (Some(record), Some(store)) = (field.record(), store) else {
        if field.used_seed() {
            println!("(Highscore not added as seed has been used)");
        }
        return Ok(());
    };
    let mode = *field.mode();
    if let Some(rank) = store.add_record(&mode, record)? {
        println!("New highscore! Rank {}", rank + 1);
    }
    print_records(store, &mode);
    Ok(())
}

fn print_records(store: &RecordStore, mode: &ModeConfig) {
    println!("Highscores for {}", mode);
    println!("Rank  Seed                  Time      Rating");
    for (i, record) in store.records(mode).iter().enumerate() {
        println!(
            "{:<5} {:<21} {}  {:05.2}%",
            i + 1,
            record.seed,
            record.time_str,
            record.rating(mode) * 100.0
        );
    }
}

fn print_board(field: &Field, theme: &Theme) {
    let (width, height) = field.dimensions();
    let cell_width = if field.mode().special { 3 } else { 2 };

    println!(
        "Mines: {}  Hits: {}/{}  Time: {}  Seed: {}",
        field.mines_remaining(),
        field.hit_count(),
        field.hit_threshold(),
        field.tick().unwrap_or_else(|| format_elapsed(field.elapsed())),
        field
            .seed()
            .map_or_else(|| "-".to_string(), |s| s.to_string())
    );

    // Print column numbers
    print!("   ");
    for x in 0..width {
        print!("{:<w$}", x % 10, w = cell_width);
    }
    println!();

    for y in 0..height {
        print!("{:>2} ", y);
        for x in 0..width {
            let pos = Position::new(x as i32, y as i32);
            let special = field.mode().special;
            let symbol = match field.view(pos) {
                Ok(CellView::Concealed) => theme.concealed.to_string(),
                Ok(CellView::Flagged(_)) if !special => theme.flag.to_string(),
                Ok(CellView::Flagged(rank)) => format!("{}{}", theme.flag, rank % 10),
                Ok(CellView::FalseFlag(_)) => theme.false_flag.to_string(),
                Ok(CellView::Clue(0)) => theme.empty.to_string(),
                Ok(CellView::Clue(n)) => n.to_string(),
                Ok(CellView::Mine(_)) if !special => theme.mine.to_string(),
                Ok(CellView::Mine(card)) => format!("{}{}", theme.mine, card % 10),
                Err(_) => "?".to_string(),
            };
            print!("{:<w$}", symbol, w = cell_width);
        }
        println!();
    }
}

fn read_command(previous_seed: Option<u64>) -> io::Result<Option<Command>> {
    print!("Enter command (x y [r/f/g/c]): ");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(Some(Command::Quit));
    }
    let mut parts = input.split_whitespace();

    let command = match parts.next() {
        Some("q") => Some(Command::Quit),
        Some("n") => Some(Command::NewGame(parts.next().and_then(|s| s.parse().ok()))),
        Some("retry") => Some(Command::NewGame(previous_seed)),
        Some(x) => parse_action(x, &mut parts),
        None => None,
    };
    Ok(command)
}

fn parse_action<'a>(x: &str, parts: &mut impl Iterator<Item = &'a str>) -> Option<Command> {
    let x = x.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let action = match parts.next().unwrap_or("r") {
        "r" => Action::Reveal,
        "f" => Action::Flag(parts.next().and_then(|r| r.parse().ok())),
        "g" => Action::Guess,
        "c" => Action::Chord,
        _ => return None,
    };
    Some(Command::Act(Position::new(x, y), action))
}

fn confirm(question: &str, default: bool) -> io::Result<bool> {
    print!("{} [{}] ", question, if default { "Y/n" } else { "y/N" });
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(match input.trim() {
        "y" | "Y" => true,
        "n" | "N" => false,
        _ => default,
    })
}

fn mode_list() -> String {
    MODES
        .iter()
        .enumerate()
        .map(|(i, mode)| format!("  {}: {}", i, mode))
        .collect::<Vec<_>>()
        .join("\n")
}
