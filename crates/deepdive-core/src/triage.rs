//! Problem-statement triage: is this worth a Deep Dive, and is the user safe?

use once_cell::sync::Lazy;
use regex::Regex;

const BIG_DECISION_KEYWORDS: &[&str] = &[
    "should i move",
    "should i quit",
    "should i stay",
    "should i leave",
    "major decision",
    "big decision",
    "life change",
    "career change",
    "relocate",
    "relocation",
    "marriage",
    "divorce",
    "have kids",
    "start a business",
    "leave my job",
    "break up",
    "going back to school",
    "graduate school",
    "change careers",
    "sell my",
    "buy a house",
    "move abroad",
    "move countries",
];

/// Problems longer than this are treated as big decisions.
const LONG_PROBLEM_CHARS: usize = 200;

static CRISIS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(suicide|suicidal|kill myself|end my life|harm myself|self-harm|want to die|abuse|assault|trauma)\b",
    )
    .expect("crisis pattern is valid")
});

static EITHER_OR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)should i .+ or .+").expect("either/or pattern is valid"));

/// Whether the problem reads like a major life decision.
pub fn is_big_decision(problem: &str) -> bool {
    let lower = problem.to_lowercase();
    BIG_DECISION_KEYWORDS.iter().any(|kw| lower.contains(kw))
        || problem.chars().count() > LONG_PROBLEM_CHARS
        || EITHER_OR_RE.is_match(problem)
}

/// Whether the text mentions self-harm or abuse.
///
/// Sessions over such problems get a single safety message instead of the
/// usual four opening probes.
pub fn is_crisis(text: &str) -> bool {
    CRISIS_RE.is_match(text)
}

/// The safety message shown in place of the opening probes.
pub const CRISIS_MESSAGE: &str = "I notice you're going through something really difficult. The \
    council cares about you, but we're not professionals. If you're in crisis, please reach out to \
    a mental health professional or a crisis line. You matter.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_decision_signals() {
        assert!(is_big_decision("Should I quit my job to start a business?"));
        assert!(is_big_decision("should I take the offer or wait for another round"));
        assert!(is_big_decision(&"context ".repeat(40)));
        assert!(!is_big_decision("What should I cook tonight?"));
    }

    #[test]
    fn test_crisis_detection() {
        assert!(is_crisis("Sometimes I want to die"));
        assert!(is_crisis("dealing with Trauma from my last job"));
        assert!(!is_crisis("This commute is killing my mood"));
    }
}
