//! Prompt templates for persona content.
//!
//! Every prompt asks for short, in-character output. Replies are plain text
//! except hypotheses, which use `DIAGNOSIS:` / `TEST:` / `CONSEQUENCE:` lines.

use deepdive_core::generation::{GenerationError, GenerationRequest};
use deepdive_core::persona::PersonaProfile;
use minijinja::{Environment, context};
use once_cell::sync::Lazy;

const OPENING_PROBE: &str = r#"The user is facing this decision:
"{{ problem }}"

Ask ONE sharp probing question from the {{ school }} perspective. Do not give advice or comfort.
The question must be direct, slightly uncomfortable, and at most two sentences.

Questions you might ask:
{% for example in examples %}- "{{ example }}"
{% endfor %}
Respond with ONLY the question."#;

const FOLLOW_UP: &str = r#"Original problem: "{{ problem }}"
The user just answered: "{{ answer }}"

{% if interrupt -%}
Something in that answer hit hard. Cut in and ask ONE pointed question about it.
{%- else -%}
Ask ONE follow-up question that probes deeper into what they just revealed and challenges any assumption in it.
{%- endif %}
Keep your voice: {{ voice }}. At most two sentences. Respond with ONLY the question."#;

const DEBATE_LINE: &str = r#"You are in a council debate about the user's problem.

Problem: "{{ problem }}"
What the user has said so far: "{{ context }}"
{% if previous %}
{{ target }} just said: "{{ previous }}"
{% endif %}
You believe this is fundamentally about {{ concern }}. In one or two sentences, rebut {{ target }} by name and argue your case.
Keep your voice: {{ voice }}.
Respond with ONLY your line, no name prefix."#;

const HYPOTHESIS: &str = r#"You are writing your final hypothesis for the user.

Original problem: "{{ problem }}"
User's answers during the investigation:
{% for answer in answers %}{{ loop.index }}. "{{ answer }}"
{% endfor %}
Reply in exactly this format:
DIAGNOSIS: one sentence on what is really going on, from the {{ school }} perspective, grounded in their answers
TEST: one concrete experiment they can run within one to two weeks
CONSEQUENCE: "If you don't do X, then Y" - make it sharp

Be specific to their situation, not generic."#;

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for (name, source) in [
        ("opening_probe", OPENING_PROBE),
        ("follow_up", FOLLOW_UP),
        ("debate_line", DEBATE_LINE),
        ("hypothesis", HYPOTHESIS),
    ] {
        if let Err(err) = env.add_template(name, source) {
            tracing::error!("Prompt template '{}' is invalid: {}", name, err);
        }
    }
    env
});

fn render(name: &str, ctx: minijinja::Value) -> Result<String, GenerationError> {
    ENV.get_template(name)
        .and_then(|template| template.render(ctx))
        .map_err(|err| GenerationError::Prompt(format!("{}: {}", name, err)))
}

/// Opening probe for round 1.
pub fn opening_probe(
    persona: &PersonaProfile,
    problem: &str,
    max_tokens: u32,
) -> Result<GenerationRequest, GenerationError> {
    let examples: Vec<&str> = persona.probes.opening.iter().take(2).copied().collect();
    let user_prompt = render(
        "opening_probe",
        context! { problem, school => persona.school, examples },
    )?;
    Ok(GenerationRequest::new(persona.system_prompt, user_prompt, max_tokens))
}

/// Follow-up (or interrupt) on the user's latest answer.
pub fn follow_up(
    persona: &PersonaProfile,
    problem: &str,
    answer: &str,
    interrupt: bool,
    max_tokens: u32,
) -> Result<GenerationRequest, GenerationError> {
    let user_prompt = render(
        "follow_up",
        context! { problem, answer, interrupt, voice => persona.voice },
    )?;
    Ok(GenerationRequest::new(persona.system_prompt, user_prompt, max_tokens))
}

/// One debate line from `speaker`, rebutting `target`.
pub fn debate_line(
    speaker: &PersonaProfile,
    target: &PersonaProfile,
    problem: &str,
    answers_context: &str,
    previous: Option<&str>,
    max_tokens: u32,
) -> Result<GenerationRequest, GenerationError> {
    let user_prompt = render(
        "debate_line",
        context! {
            problem,
            context => answers_context,
            previous,
            target => target.name,
            concern => speaker.thread().concern(),
            voice => speaker.voice,
        },
    )?;
    Ok(GenerationRequest::new(speaker.system_prompt, user_prompt, max_tokens))
}

/// Final hypothesis grounded in the user's answers to this persona.
pub fn hypothesis(
    persona: &PersonaProfile,
    problem: &str,
    answers: &[&str],
    max_tokens: u32,
) -> Result<GenerationRequest, GenerationError> {
    let user_prompt = render(
        "hypothesis",
        context! { problem, answers, school => persona.school },
    )?;
    Ok(GenerationRequest::new(persona.system_prompt, user_prompt, max_tokens))
}
