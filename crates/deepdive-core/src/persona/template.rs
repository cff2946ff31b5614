//! Filling probe-bank templates from what the user actually said.
//!
//! Templates are minijinja strings. Every placeholder always has a value, so a
//! template never renders with a hole even for an empty answer.

use minijinja::Environment;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::Serialize;

static ENV: Lazy<Environment<'static>> = Lazy::new(Environment::new);

static PERSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(wife|husband|partner|spouse|boss|friend|mother|father|mom|dad|sister|brother|colleague|mentor|family|kids|children)\b",
    )
    .expect("person pattern is valid")
});

static ASSUMPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:will|would|should|must|have to|need to|can't|won't)\s[^.,!?]+")
        .expect("assumption pattern is valid")
});

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+ (?:months?|years?|weeks?)|\$?\d[\d,]*(?:\.\d{2})?[kKmM]?\b")
        .expect("amount pattern is valid")
});

static PLACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(Dubai|London|Malta|New York|LA|Singapore|Hong Kong|Paris|Berlin|Tokyo|Sydney|Lisbon|Toronto|Amsterdam)\b",
    )
    .expect("place pattern is valid")
});

const TOPIC_WORDS: usize = 5;
const QUOTE_CHARS: usize = 50;
const THING_CHARS: usize = 30;

/// Values substituted into probe-bank templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholders {
    pub topic: String,
    pub quote: String,
    pub person: String,
    pub assumption: String,
    pub thing: String,
    pub amount: String,
    pub place: String,
    /// Name of the persona being addressed in a debate.
    pub other: String,
}

impl Placeholders {
    /// Extracts placeholder values from `text`, looking for a place in
    /// `problem` as well.
    pub fn extract(text: &str, problem: &str) -> Self {
        let text = text.trim();
        let source = if text.is_empty() { problem.trim() } else { text };

        Self {
            topic: or_default(leading_words(source, TOPIC_WORDS), "that"),
            quote: or_default(leading_chars(source, QUOTE_CHARS), "that"),
            person: PERSON_RE
                .captures(source)
                .map(|caps| caps[1].to_lowercase())
                .unwrap_or_else(|| "someone important".to_string()),
            assumption: ASSUMPTION_RE
                .find(source)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_else(|| "your assumption".to_string()),
            thing: or_default(leading_chars(source, THING_CHARS), "that"),
            amount: AMOUNT_RE
                .find(source)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "the amount".to_string()),
            place: PLACE_RE
                .find(source)
                .or_else(|| PLACE_RE.find(problem))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "there".to_string()),
            other: "the others".to_string(),
        }
    }

    pub fn with_other(mut self, name: impl Into<String>) -> Self {
        self.other = name.into();
        self
    }
}

/// Renders a template, returning it unrendered if the template is invalid.
pub fn render(template: &str, placeholders: &Placeholders) -> String {
    match ENV.render_str(template, placeholders) {
        Ok(rendered) => rendered,
        Err(err) => {
            tracing::warn!("Failed to render probe template: {}", err);
            template.to_string()
        }
    }
}

/// Picks one entry at random; empty banks yield an empty string.
pub fn pick(options: &[&'static str]) -> &'static str {
    options.choose(&mut rand::thread_rng()).copied().unwrap_or("")
}

fn leading_words(text: &str, count: usize) -> String {
    let joined = text.split_whitespace().take(count).collect::<Vec<_>>().join(" ");
    strip_trailing_punctuation(&joined)
}

fn leading_chars(text: &str, count: usize) -> String {
    let prefix: String = text.chars().take(count).collect();
    strip_trailing_punctuation(prefix.trim())
}

fn strip_trailing_punctuation(text: &str) -> String {
    text.trim_end_matches(['.', ',', '!', '?', ';', ':']).to_string()
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_answer() {
        let p = Placeholders::extract(
            "My wife thinks we need to save $40k first, maybe 6 months.",
            "Should I move to Lisbon?",
        );
        assert_eq!(p.topic, "My wife thinks we need");
        assert_eq!(p.person, "wife");
        assert_eq!(p.amount, "$40k");
        assert_eq!(p.place, "Lisbon");
        assert!(p.assumption.starts_with("need to save"));
    }

    #[test]
    fn test_duration_amount_wins_over_bare_number() {
        let p = Placeholders::extract("I could last 6 months", "");
        assert_eq!(p.amount, "6 months");
    }

    #[test]
    fn test_empty_answer_uses_problem_and_defaults() {
        let p = Placeholders::extract("   ", "Should I quit my job?");
        assert_eq!(p.topic, "Should I quit my job");
        assert_eq!(p.person, "someone important");
        assert_eq!(p.amount, "the amount");
        assert_eq!(p.place, "there");
    }

    #[test]
    fn test_render_fills_placeholders() {
        let p = Placeholders::extract("I'd register the LLC this week", "").with_other("Erik");
        let out = render("{{ other }} asks: you said \"{{ quote }}\"?", &p);
        assert_eq!(out, "Erik asks: you said \"I'd register the LLC this week\"?");
    }

    #[test]
    fn test_render_invalid_template_returns_source() {
        let p = Placeholders::extract("x", "y");
        assert_eq!(render("{{ unclosed", &p), "{{ unclosed");
    }

    #[test]
    fn test_pick_from_bank() {
        let bank: &[&'static str] = &["a", "b"];
        assert!(bank.contains(&pick(bank)));
        assert_eq!(pick(&[]), "");
    }
}
