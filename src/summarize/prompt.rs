use crate::session::SummaryStyle;

/// Length instruction used when no word limit is set
pub const DEFAULT_LENGTH_INSTRUCTION: &str = "Ensure the summary is comprehensive but concise.";

/// Length instruction for an explicit word limit
pub fn length_instruction(word_limit: Option<u32>) -> String {
    match word_limit {
        Some(limit) => format!("The summary should be {} words or less.", limit),
        None => DEFAULT_LENGTH_INSTRUCTION.to_string(),
    }
}

/// Build the full prompt sent to the model.
///
/// The transcript is embedded verbatim with no length budget.
pub fn build_prompt(transcript: &str, style: SummaryStyle, word_limit: Option<u32>) -> String {
    let base = format!("Summarize the following YouTube transcript:\n\n{}\n\n", transcript);
    let length = length_instruction(word_limit);

    [base.trim(), style.instruction().trim(), length.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
