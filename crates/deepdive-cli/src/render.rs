//! Terminal rendering of sessions, exchanges and results.

use colored::{ColoredString, Colorize};
use deepdive_core::persona::{self, PersonaId};
use deepdive_core::profile::ThreadProfile;
use deepdive_core::session::{DeepDiveSession, Exchange, ExchangeKind, Hypothesis};
use deepdive_core::thread::ThreadId;

/// Width of the profile bar at 100%.
const BAR_WIDTH: usize = 30;

fn tint(persona: PersonaId, text: &str) -> ColoredString {
    match persona.thread() {
        ThreadId::Social => text.bright_green(),
        ThreadId::Psychological => text.bright_magenta(),
        ThreadId::Analytical => text.bright_cyan(),
        ThreadId::Pragmatic => text.bright_yellow(),
    }
}

pub fn persona_label(persona: PersonaId) -> ColoredString {
    let profile = persona::profile(persona);
    tint(persona, &format!("{} ({})", profile.name, persona.get())).bold()
}

pub fn exchange(exchange: &Exchange) {
    let name = persona::profile(exchange.persona_id).name;
    match exchange.kind {
        ExchangeKind::Sulk => {
            let line = format!("  {} mutters: {}", name, exchange.content);
            println!("{}", line.bright_black().italic());
        }
        kind => {
            let tag = match kind {
                ExchangeKind::Interrupt => " !".red().bold().to_string(),
                ExchangeKind::Debate => " vs".bright_black().to_string(),
                _ => String::new(),
            };
            println!("{}{}", tint(exchange.persona_id, &format!("[{}]", name)).bold(), tag);
            for line in exchange.content.lines() {
                println!("  {}", line);
            }
        }
    }
    if let Some(answer) = exchange.user_answer.as_deref().filter(|a| !a.is_empty()) {
        println!("  {}", format!("> {}", answer).green());
    }
    println!();
}

pub fn exchanges<'a>(list: impl IntoIterator<Item = &'a Exchange>) {
    for e in list {
        exchange(e);
    }
}

pub fn unfinished(session: &DeepDiveSession) {
    println!("{}", "You already have an unfinished investigation:".yellow());
    println!("  {}", session.problem.bold());
    let started = format!("({}, started {})", session.phase, short_date(&session.created_at));
    println!("  {}", started.bright_black());
    println!(
        "{}",
        "Run `deepdive resume` to continue, or `deepdive start --discard` to begin again.".bright_black()
    );
}

pub fn profile(profile: &ThreadProfile) {
    println!("{}", "Thread profile".bold());
    for thread in ThreadId::ALL {
        let percent = profile.percent(thread);
        let filled = usize::from(percent) * BAR_WIDTH / 100;
        let bar = format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled));
        let marker = if profile.dominant == Some(thread) { " *" } else { "" };
        println!(
            "  {:<14} {} {:>3}%{}",
            thread.to_string(),
            tint(thread.persona(), &bar),
            percent,
            marker
        );
    }
    println!("  {}", profile.interpretation.italic());
    println!();
}

pub fn status(session: &DeepDiveSession, thread_profile: &ThreadProfile) {
    println!("{}", session.problem.bold());
    let summary = format!("{} · {} exchanges", session.phase, session.exchanges.len());
    println!("{}", summary.bright_black());
    println!();
    for thread in ThreadId::ALL {
        let state = session.thread(thread);
        let status = if state.active {
            format!("depth {}", state.depth).normal()
        } else {
            "dormant".bright_black()
        };
        println!("  {} {:<14} {}", persona_label(thread.persona()), thread.to_string(), status);
    }
    println!();
    profile(thread_profile);
}

pub fn hypotheses(session: &DeepDiveSession, list: &[Hypothesis]) {
    for h in list {
        let heading = if session.is_informed(h.thread_id) {
            h.title.clone()
        } else {
            format!("{} (not consulted)", h.title)
        };
        println!("{}", tint(h.persona_id, &heading).bold());
        println!("  {} {}", "Diagnosis:".bold(), h.diagnosis);
        println!("  {} {}", "Test:".bold(), h.test);
        println!("  {} {}", "If not:".bold(), h.consequence);
        println!();
    }
}

pub fn history_entry(session: &DeepDiveSession, thread_profile: &ThreadProfile) {
    let lens = thread_profile
        .dominant
        .map(|t| t.to_string())
        .unwrap_or_else(|| "no clear lens".to_string());
    println!(
        "{}  {}  {}",
        short_date(&session.updated_at).bright_black(),
        session.problem.bold(),
        lens.cyan()
    );
}

fn short_date(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}
