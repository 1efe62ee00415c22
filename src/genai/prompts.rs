//! Prompt templates for speech delivery and the humanizer

use super::tone::Tone;

/// System instruction sent with every humanizer request
pub const HUMANIZER_SYSTEM_INSTRUCTION: &str =
    "You are an elite literary editor specializing in transforming AI text into authentic, human-authored prose.";

/// Delivery style prepended to text before speech synthesis
pub const SPEECH_DELIVERY_PREFIX: &str = "Say cheerfully: ";

/// Stock phrases the humanizer is told to purge
pub const AI_CLICHES: &[&str] = &[
    "delve into",
    "in conclusion",
    "furthermore",
    "it's important to note",
    "the landscape of",
];

/// Wrap text in the fixed speech delivery instruction.
pub fn build_speech_prompt(text: &str) -> String {
    format!("{}{}", SPEECH_DELIVERY_PREFIX, text)
}

/// Build the humanizer directive for `text` in the given `tone`.
///
/// The input text is embedded verbatim between triple quotes at the end
/// of the prompt.
pub fn build_humanize_prompt(text: &str, tone: Tone) -> String {
    let cliches = AI_CLICHES
        .iter()
        .map(|phrase| format!("'{}'", phrase))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Your task is a masterful restructuring of the following text. Your goal is to make it completely indistinguishable from sophisticated, high-quality human writing.

**Core Directives:**
1. **Adopt a {tone} tone.**
2. **Vary Sentence Cadence:** Aggressively restructure sentences. Combine short, punchy sentences with longer, more complex ones to create a natural, un-robotic rhythm. Break up monotonous patterns.
3. **Eliminate AI Verbal Tics:** Purge the text of common AI phrases (e.g., {cliches}). Replace them with more original and precise language.
4. **Introduce Human Idiosyncrasy:** Avoid overly perfect, logical phrasing. Introduce the subtle transitions and slightly imperfect flow that characterize authentic human thought.

**Process:**
1. Rewrite the text following all directives.
2. **Perform a critical self-analysis.** Ask: "Does this sound even slightly like an AI? Is the phrasing too perfect or predictable?"
3. If any artificiality remains, perform another revision.
4. Provide ONLY the final, humanized text as the output. Do not include preambles or explanations.

**Original Text:**
"""
{text}
""""#,
        tone = tone.label(),
        cliches = cliches,
        text = text,
    )
}
