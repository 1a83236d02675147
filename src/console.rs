//! Line-oriented front-end over a [`GameSession`].

use crate::player::PlayerOption;
use crate::search::normalize;
use crate::session::{Advance, GameSession, GuessOutcome, SessionError, SessionState};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, instrument};

/// Most matches listed for an ambiguous search.
const MAX_LISTED: usize = 10;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `search <query>`
    Search(String),
    /// `hint`
    Hint,
    /// `hints`
    Hints,
    /// `guess <id|name>`
    Guess(String),
    /// `answer`
    Answer,
    /// `next`
    Next,
    /// `score`
    Score,
    /// `help`
    Help,
    /// `quit`
    Quit,
    /// Blank line.
    Empty,
    /// Anything else.
    Unknown(String),
}

impl ConsoleCommand {
    /// Parses one input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_lowercase().as_str() {
            "" => Self::Empty,
            "search" | "s" => Self::Search(rest.to_string()),
            "hint" | "h" => Self::Hint,
            "hints" => Self::Hints,
            "guess" | "g" if !rest.is_empty() => Self::Guess(rest.to_string()),
            "answer" | "a" => Self::Answer,
            "next" | "n" => Self::Next,
            "score" => Self::Score,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// How a free-text guess resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one player.
    Found(PlayerOption),
    /// Nobody matched.
    NoMatch,
    /// Several players matched.
    Ambiguous(Vec<PlayerOption>),
}

/// Resolves `input` to a catalog player, by id or by name.
///
/// A name resolves when it matches one player, or when exactly one of
/// several matches has that exact name after folding.
pub fn resolve_guess(session: &GameSession, input: &str) -> Resolution {
    if let Ok(player_id) = input.trim().parse() {
        return session
            .find_option(player_id)
            .cloned()
            .map_or(Resolution::NoMatch, Resolution::Found);
    }

    let mut matches = session.search(input.trim());
    match matches.len() {
        0 => Resolution::NoMatch,
        1 => Resolution::Found(matches.remove(0)),
        _ => {
            let folded = normalize(input.trim());
            let exact: Vec<usize> = matches
                .iter()
                .enumerate()
                .filter(|(_, option)| normalize(&option.name) == folded)
                .map(|(i, _)| i)
                .collect();
            match exact.as_slice() {
                [only] => Resolution::Found(matches.swap_remove(*only)),
                _ => Resolution::Ambiguous(matches),
            }
        }
    }
}

/// Runs the command loop until `quit`, end of input, or the pool runs
/// out. The session must already have an active target or be `Ready`.
#[instrument(skip_all)]
pub async fn run<R, W>(session: &mut GameSession, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "Guess the player! Type 'help' for commands.")?;
    print_status(session, out)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = ConsoleCommand::parse(&line);
        debug!(?command, "Console command");

        match command {
            ConsoleCommand::Empty => continue,
            ConsoleCommand::Quit => break,
            ConsoleCommand::Help => print_help(out)?,
            ConsoleCommand::Score => writeln!(out, "Score: {}", session.score())?,
            ConsoleCommand::Search(query) => {
                let matches = session.search(&query);
                print_options(&matches, out)?;
            }
            ConsoleCommand::Hint => match session.reveal_hint() {
                Ok(hint) => writeln!(out, "Hint: {} (score {})", hint, session.score())?,
                Err(SessionError::NoHintsRemaining) => writeln!(out, "No hints left.")?,
                Err(e) => writeln!(out, "{}", e)?,
            },
            ConsoleCommand::Hints => {
                for (n, hint) in session.revealed_hints().iter().enumerate() {
                    writeln!(out, "{}. {}", n + 1, hint)?;
                }
                writeln!(out, "{} hint(s) hidden.", session.remaining_hints())?;
            }
            ConsoleCommand::Guess(text) => match resolve_guess(session, &text) {
                Resolution::NoMatch => writeln!(out, "No player matches '{}'.", text)?,
                Resolution::Ambiguous(matches) => {
                    writeln!(out, "'{}' matches several players:", text)?;
                    print_options(&matches, out)?;
                }
                Resolution::Found(option) => match session.submit_guess(&option).await {
                    Ok(GuessOutcome::Correct(next)) => {
                        writeln!(out, "Correct! It was {}.", option.name)?;
                        print_advance(&next, session, out)?;
                    }
                    Ok(GuessOutcome::Incorrect) => {
                        writeln!(out, "Not {}. Score: {}", option.name, session.score())?
                    }
                    Err(e) => writeln!(out, "{}", e)?,
                },
            },
            ConsoleCommand::Answer => match session.reveal_answer().await {
                Ok(reveal) => {
                    writeln!(
                        out,
                        "Answer: {} - {}",
                        reveal.record.name(),
                        reveal.record.current_club()
                    )?;
                    print_advance(&reveal.next, session, out)?;
                }
                Err(e) => writeln!(out, "{}", e)?,
            },
            ConsoleCommand::Next if session.state() != SessionState::Ready => writeln!(
                out,
                "A player is still in play. Guess or type 'answer' to give up."
            )?,
            ConsoleCommand::Next => match session.select_target().await {
                Ok(_) => print_status(session, out)?,
                Err(SessionError::PoolExhausted) => {}
                Err(e) => writeln!(out, "Could not load next player: {}", e)?,
            },
            ConsoleCommand::Unknown(text) => {
                writeln!(out, "Unknown command '{}'. Type 'help'.", text)?
            }
        }

        if session.state() == SessionState::Exhausted {
            writeln!(out, "Every player has been played. Final score: {}", session.score())?;
            break;
        }
    }

    Ok(())
}

fn print_advance<W: Write>(next: &Advance, session: &GameSession, out: &mut W) -> Result<()> {
    match next {
        Advance::Selected(_) => print_status(session, out)?,
        Advance::Exhausted => {}
        Advance::Failed(e) => writeln!(
            out,
            "Could not load next player: {}. Type 'next' to retry.",
            e
        )?,
    }
    Ok(())
}

fn print_status<W: Write>(session: &GameSession, out: &mut W) -> Result<()> {
    match session.state() {
        SessionState::Active => writeln!(
            out,
            "New player chosen ({} left). Score: {}",
            session.candidates_remaining(),
            session.score()
        )?,
        SessionState::Ready => writeln!(out, "No active player. Type 'next'.")?,
        SessionState::Idle | SessionState::Exhausted => {}
    }
    Ok(())
}

fn print_options<W: Write>(options: &[PlayerOption], out: &mut W) -> Result<()> {
    if options.is_empty() {
        writeln!(out, "No matches.")?;
        return Ok(());
    }
    for option in options.iter().take(MAX_LISTED) {
        writeln!(out, "  {}", option)?;
    }
    if options.len() > MAX_LISTED {
        writeln!(out, "  ... and {} more", options.len() - MAX_LISTED)?;
    }
    Ok(())
}

fn print_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  search <text>   list matching players")?;
    writeln!(out, "  hint            reveal a hint")?;
    writeln!(out, "  hints           show revealed hints")?;
    writeln!(out, "  guess <id|name> submit a guess")?;
    writeln!(out, "  answer          give up and show the answer")?;
    writeln!(out, "  next            retry loading a player")?;
    writeln!(out, "  score           show the score")?;
    writeln!(out, "  quit            leave")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse("  "), ConsoleCommand::Empty);
        assert_eq!(ConsoleCommand::parse("HINT"), ConsoleCommand::Hint);
        assert_eq!(
            ConsoleCommand::parse("guess  Arda Turan "),
            ConsoleCommand::Guess("Arda Turan".to_string())
        );
        assert_eq!(
            ConsoleCommand::parse("search"),
            ConsoleCommand::Search(String::new())
        );
        assert_eq!(
            ConsoleCommand::parse("guess"),
            ConsoleCommand::Unknown("guess".to_string())
        );
        assert_eq!(ConsoleCommand::parse("q"), ConsoleCommand::Quit);
    }
}
