use std::io::{self, BufRead, Write};

use chess_rules::config::AppConfig;
use chess_rules::engine::{ChessError, Game, GameStatus, MoveOutcome, PieceKind, Square};

const HELP: &str = "commands: <from> <to> (e.g. e2 e4), moves <square>, board, new, help, quit";

fn main() -> io::Result<()> {
    // Initialize tracing (structured logging) on stderr so the board stays readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_rules=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        "chess-rules v{} (fifty-move plies: {}, repetitions: {})",
        env!("CARGO_PKG_VERSION"),
        config.rules.fifty_move_plies,
        config.rules.repetition_count,
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut out = io::stdout();
    let mut game = Game::with_rules(config.rules);

    print_board(&mut out, &game)?;
    loop {
        write!(out, "{} > ", game.side_to_move())?;
        out.flush()?;
        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.as_slice() {
            [] => continue,
            ["quit" | "exit"] => return Ok(()),
            ["help"] => writeln!(out, "{HELP}")?,
            ["board"] => print_board(&mut out, &game)?,
            ["new"] => {
                game.new_game();
                print_board(&mut out, &game)?;
            }
            ["moves", square] => match parse_square(square)
                .and_then(|sq| game.legal_destinations(sq))
            {
                Ok(dests) if dests.is_empty() => writeln!(out, "no legal moves")?,
                Ok(dests) => {
                    let names: Vec<String> = dests.iter().map(|d| d.to_algebraic()).collect();
                    writeln!(out, "{}", names.join(" "))?;
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            [from, to] => play(&mut out, &mut lines, &mut game, &config, from, to)?,
            [joined] if joined.len() == 4 => {
                let (from, to) = joined.split_at(2);
                play(&mut out, &mut lines, &mut game, &config, from, to)?;
            }
            _ => writeln!(out, "unrecognised input; {HELP}")?,
        }

        if game.is_game_over() && !offer_new_game(&mut out, &mut lines, &mut game)? {
            return Ok(());
        }
    }
}

fn parse_square(s: &str) -> Result<Square, ChessError> {
    s.parse()
}

fn play(
    out: &mut impl Write,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    game: &mut Game,
    config: &AppConfig,
    from: &str,
    to: &str,
) -> io::Result<()> {
    let result = parse_square(from)
        .and_then(|f| Ok((f, parse_square(to)?)))
        .and_then(|(f, t)| game.commit_move(f, t));

    let status = match result {
        Ok(MoveOutcome::Played { status }) => status,
        Ok(MoveOutcome::PromotionRequired { square, .. }) => {
            match promote(out, lines, game, config, square)? {
                Some(status) => status,
                None => return Ok(()),
            }
        }
        Err(e) => {
            writeln!(out, "{e}")?;
            return Ok(());
        }
    };

    print_board(out, game)?;
    match status {
        GameStatus::Checkmate { mated } => writeln!(out, "checkmate, {} wins", !mated)?,
        GameStatus::Stalemate => writeln!(out, "stalemate")?,
        GameStatus::Draw { reason } => writeln!(out, "draw ({})", reason.as_str())?,
        _ if status.is_check() => writeln!(out, "check!")?,
        _ => {}
    }
    Ok(())
}

/// Ask for a promotion piece until a valid one is given. `None` if input ends.
fn promote(
    out: &mut impl Write,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    game: &mut Game,
    config: &AppConfig,
    square: Square,
) -> io::Result<Option<GameStatus>> {
    if config.auto_queen
        && let Ok(status) = game.resolve_promotion(square, PieceKind::Queen)
    {
        return Ok(Some(status));
    }
    loop {
        write!(out, "promote on {square} to (q/r/b/n): ")?;
        out.flush()?;
        let Some(line) = lines.next().transpose()? else {
            return Ok(None);
        };
        let Some(kind) = line.trim().chars().next().and_then(PieceKind::from_char) else {
            continue;
        };
        match game.resolve_promotion(square, kind) {
            Ok(status) => return Ok(Some(status)),
            Err(e) => writeln!(out, "{e}")?,
        }
    }
}

/// Endgame prompt. Returns `false` when the player quits.
fn offer_new_game(
    out: &mut impl Write,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    game: &mut Game,
) -> io::Result<bool> {
    loop {
        write!(out, "game over: {}. new game? (y/n) ", game.status())?;
        out.flush()?;
        let Some(line) = lines.next().transpose()? else {
            return Ok(false);
        };
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "new" => {
                game.new_game();
                print_board(out, game)?;
                return Ok(true);
            }
            "n" | "no" | "quit" => return Ok(false),
            _ => {}
        }
    }
}

fn print_board(out: &mut impl Write, game: &Game) -> io::Result<()> {
    writeln!(out, "{}", game.position().board())?;
    let captured = game.captured();
    let lost: Vec<String> = captured
        .entries()
        .map(|(piece, n)| format!("{}x{n}", piece.to_char()))
        .collect();
    if !lost.is_empty() {
        writeln!(out, "captured: {}", lost.join(" "))?;
    }
    Ok(())
}
