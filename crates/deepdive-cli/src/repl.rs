//! Interactive session loop.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::str::FromStr;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, DefaultEditor, Editor, Helper};

use deepdive_application::DeepDiveUseCase;
use deepdive_core::persona::{self, PersonaId};
use deepdive_core::session::{DeepDiveSession, Stage};
use deepdive_core::thread::ThreadId;

use crate::render;

const COMMANDS: &[&str] = &[
    "/next", "/side", "/skip", "/ask", "/status", "/finish", "/pause", "/help",
];

/// Completion and hints for slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }
        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

/// Asks for the problem statement. `None` if the user backs out.
pub fn ask_problem() -> Result<Option<String>> {
    let mut rl = DefaultEditor::new()?;
    println!("{}", "What decision are you wrestling with?".bold());
    match rl.readline("?? ") {
        Ok(line) if !line.trim().is_empty() => Ok(Some(line.trim().to_string())),
        Ok(_) | Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Persona by number or (case-insensitive) name.
fn resolve_persona(token: &str) -> Option<PersonaId> {
    let token = token.trim();
    if let Ok(n) = token.parse::<u8>() {
        return PersonaId::new(n);
    }
    PersonaId::ALL
        .into_iter()
        .find(|p| persona::profile(*p).name.eq_ignore_ascii_case(token))
}

/// Thread by name, or the thread of the named persona.
fn resolve_thread(token: &str) -> Option<ThreadId> {
    ThreadId::from_str(&token.trim().to_lowercase())
        .ok()
        .or_else(|| resolve_persona(token).map(PersonaId::thread))
}

/// Splits `rocky: some answer` into its addressee and text.
fn addressed(line: &str) -> Option<(PersonaId, &str)> {
    let (who, text) = line.split_once(':')?;
    resolve_persona(who).map(|persona| (persona, text.trim()))
}

/// The only persona with an open question this round, if exactly one.
fn sole_open_question(session: &DeepDiveSession) -> Option<PersonaId> {
    let mut open: Vec<PersonaId> = session
        .exchanges_in_round(session.round())
        .filter(|e| e.is_open())
        .map(|e| e.persona_id)
        .collect();
    open.sort();
    open.dedup();
    match open.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

fn help() {
    println!("{}", "Answer a persona with `<name or number>: <answer>`, e.g. `rocky: I have six months saved`.".bright_black());
    println!("{}", "When only one question is open, plain text answers it.".bright_black());
    println!("{}", "  /next            move to the next round".bright_black());
    println!("{}", "  /side <thread>   side with a concern after the debate".bright_black());
    println!("{}", "  /skip            let the council decide".bright_black());
    println!("{}", "  /ask <persona>   ask a persona for another question".bright_black());
    println!("{}", "  /status          threads and profile so far".bright_black());
    println!("{}", "  /finish          close a round-4 investigation".bright_black());
    println!("{}", "  /pause           save and leave; `deepdive resume` picks up here".bright_black());
    println!();
}

fn debate_prompt() {
    println!(
        "{}",
        "Whose concern matters most? `/side <thread or persona>`, or `/skip`.".bright_yellow()
    );
}

fn waiting_on(session: &DeepDiveSession) {
    let message = match session.phase.open_stage() {
        Some(Stage::Round1) => "Answer at least one persona first.",
        Some(Stage::Round2) => "Every follow-up needs an answer before round 3.",
        Some(Stage::Round3Probe) if session.active_threads().len() < 2 => {
            "The debate needs at least two threads in play. Answer one of the new probes."
        }
        Some(Stage::Round3Probe) => "Answer the open follow-ups first.",
        Some(Stage::Round3Debate) => "The council is waiting for you to pick a side.",
        _ => "Nothing left to advance; use /finish.",
    };
    println!("{}", message.yellow());
}

async fn conclude(usecase: &DeepDiveUseCase, session: &mut DeepDiveSession) {
    println!("{}", "=== Round 4: hypotheses ===".bright_magenta().bold());
    if let Some(hypotheses) = usecase.generate_hypotheses(session).await {
        render::hypotheses(session, &hypotheses);
    }
    render::profile(&usecase.calculate_thread_profile(session));
    println!("{}", "Type /finish to file this investigation.".bright_black());
}

/// Runs the investigation until the user finishes, pauses or quits.
pub async fn run(usecase: &DeepDiveUseCase, mut session: DeepDiveSession) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Deep Dive ===".bright_magenta().bold());
    println!("{}", session.problem.bold());
    println!("{}", format!("{}. Type /help for commands.", session.phase).bright_black());
    println!();

    if session.phase.is_open(Stage::Round1) {
        usecase.generate_opening_gambit(&mut session).await;
    }
    render::exchanges(&session.exchanges);
    if session.phase.debate_in_progress() {
        debate_prompt();
    }
    if session.phase.is_open(Stage::Round4) {
        conclude(usecase, &mut session).await;
    }

    loop {
        let readline = rl.readline(&format!("round {} >> ", session.round()));
        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!(
                    "{}",
                    "CTRL-C detected. Type 'quit' to leave or /pause to save and leave.".yellow()
                );
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        if trimmed == "quit" || trimmed == "exit" {
            break;
        }

        let (command, arg) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
        match command {
            "/help" => help(),
            "/status" => render::status(&session, &usecase.calculate_thread_profile(&session)),
            "/pause" => {
                usecase.pause_session(&mut session).await;
                println!("{}", "Paused. `deepdive resume` picks up exactly here.".bright_green());
                return Ok(());
            }
            "/next" => match usecase.advance_round(&mut session).await {
                Some(produced) => {
                    println!("{}", format!("=== {} ===", session.phase).bright_magenta().bold());
                    render::exchanges(&produced);
                    if session.phase.debate_in_progress() {
                        debate_prompt();
                    }
                }
                None => waiting_on(&session),
            },
            "/side" | "/skip" => {
                let chosen = if command == "/skip" {
                    None
                } else {
                    match resolve_thread(arg) {
                        Some(thread) => Some(thread),
                        None => {
                            println!("{}", format!("Unknown thread or persona '{}'.", arg).red());
                            continue;
                        }
                    }
                };
                match usecase.resolve_debate(&mut session, chosen).await {
                    Some(thread) => {
                        let leaning = format!("The council leans toward {}.", thread.concern());
                        println!("{}", leaning.green());
                        conclude(usecase, &mut session).await;
                    }
                    None => println!("{}", "There's no debate to settle right now.".yellow()),
                }
            }
            "/ask" => match resolve_persona(arg) {
                Some(persona) => match usecase.generate_follow_up(&mut session, persona).await {
                    Some(exchange) => render::exchange(&exchange),
                    None => println!(
                        "{}",
                        "They already have a question waiting, or it's not the time.".yellow()
                    ),
                },
                None => println!("{}", format!("Unknown persona '{}'.", arg).red()),
            },
            "/finish" => {
                if usecase.complete_session(&mut session).await {
                    println!("{}", "Investigation filed. See `deepdive history`.".bright_green());
                    return Ok(());
                }
                println!("{}", "You can finish once the hypotheses are in (round 4).".yellow());
            }
            _ if command.starts_with('/') => {
                println!("{}", format!("Unknown command '{}'. Try /help.", command).bright_black());
            }
            _ => {
                let target = addressed(trimmed)
                    .or_else(|| sole_open_question(&session).map(|p| (p, trimmed)));
                let Some((persona, answer)) = target else {
                    println!("{}", "Who are you answering? Try `rocky: ...` or `2: ...`.".yellow());
                    continue;
                };
                if !session.phase.accepts_answers() {
                    println!("{}", format!("Answers aren't taken {}.", session.phase).yellow());
                    continue;
                }

                let outcome = usecase.process_answer(&mut session, persona, answer).await;
                for thread in &outcome.activated {
                    println!(
                        "{}",
                        format!(
                            "{} is now in play ({}).",
                            persona::profile(thread.persona()).name,
                            thread
                        )
                        .bright_black()
                    );
                }
                render::exchanges(&outcome.follow_ups);
                if usecase.should_advance_round(&session) {
                    println!("{}", "Type /next when you're ready to move on.".bright_black());
                }
            }
        }
    }

    if let Err(e) = usecase.save_session(&mut session).await {
        eprintln!("{}", format!("Could not save the session: {}", e).red());
    } else if !session.phase.is_complete() {
        println!("{}", "Saved. `deepdive resume` picks up here.".bright_green());
    }
    Ok(())
}
