use clap::ValueEnum;

/// Word-limit bounds exposed by the form surface.
pub const WORD_LIMIT_MIN: u32 = 50;
pub const WORD_LIMIT_MAX: u32 = 1000;
pub const DEFAULT_WORD_LIMIT: u32 = 200;

/// Smallest word limit the summarize gate accepts.
pub const GATE_MIN_WORD_LIMIT: u32 = 21;

/// Style and focus of a generated summary
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryStyle {
    #[default]
    Balanced,
    Professional,
    Formal,
    Casual,
    Concise,
    Detailed,
}

impl SummaryStyle {
    pub const ALL: [SummaryStyle; 6] = [
        SummaryStyle::Balanced,
        SummaryStyle::Professional,
        SummaryStyle::Formal,
        SummaryStyle::Casual,
        SummaryStyle::Concise,
        SummaryStyle::Detailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStyle::Balanced => "Balanced",
            SummaryStyle::Professional => "Professional",
            SummaryStyle::Formal => "Formal",
            SummaryStyle::Casual => "Casual",
            SummaryStyle::Concise => "Concise",
            SummaryStyle::Detailed => "Detailed",
        }
    }

    /// Instruction appended to the prompt; empty for `Balanced`
    pub fn instruction(&self) -> &'static str {
        match self {
            SummaryStyle::Balanced => "",
            SummaryStyle::Professional => "The summary should be highly professional, objective, and suitable for a business context, focusing on key facts and actionable insights.",
            SummaryStyle::Formal => "The summary should maintain a formal tone, using precise language and avoiding contractions or slang.",
            SummaryStyle::Casual => "Provide a casual and easy-to-read summary, as if explaining it to a friend. Use natural language. You may include common internet slang or emojis where appropriate.",
            SummaryStyle::Concise => "Focus strictly on the absolute key points and main ideas, ensuring brevity.",
            SummaryStyle::Detailed => "Provide a comprehensive and detailed summary, covering all significant aspects and arguments presented.",
        }
    }

    /// Case-insensitive lookup by display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form and result state of one user session.
///
/// Never mutated in place by the workflow: every interaction goes through
/// [`reduce`], which returns the next state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub video_link: String,
    pub summary_text: String,
    pub show_summary_section: bool,
    pub actual_word_count: usize,
    pub selected_summary_type: SummaryStyle,
    pub use_word_limit: bool,
    pub word_limit_value: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            video_link: String::new(),
            summary_text: String::new(),
            show_summary_section: false,
            actual_word_count: 0,
            selected_summary_type: SummaryStyle::Balanced,
            use_word_limit: false,
            word_limit_value: DEFAULT_WORD_LIMIT,
        }
    }
}

impl Session {
    /// Word limit in effect, if the checkbox is ticked
    pub fn word_limit(&self) -> Option<u32> {
        self.use_word_limit.then_some(self.word_limit_value)
    }

    /// Whether the result section (and the downloads) should be rendered
    pub fn has_visible_summary(&self) -> bool {
        self.show_summary_section && !self.summary_text.is_empty()
    }
}

/// Every interaction that can change a [`Session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetLink(String),
    SelectStyle(SummaryStyle),
    SetUseWordLimit(bool),
    SetWordLimitValue(u32),
    /// The summarize gate rejected the form
    ValidationFailed,
    /// Transcript retrieval or generation failed
    SummaryFailed,
    SummaryReady(String),
    Reset,
}

/// Pure state transition
pub fn reduce(state: Session, action: Action) -> Session {
    match action {
        Action::SetLink(video_link) => Session { video_link, ..state },
        Action::SelectStyle(selected_summary_type) => Session {
            selected_summary_type,
            ..state
        },
        Action::SetUseWordLimit(use_word_limit) => Session {
            use_word_limit,
            ..state
        },
        Action::SetWordLimitValue(word_limit_value) => Session {
            word_limit_value,
            ..state
        },
        Action::ValidationFailed | Action::SummaryFailed => Session {
            show_summary_section: false,
            ..state
        },
        Action::SummaryReady(summary_text) => Session {
            actual_word_count: crate::utils::word_count(&summary_text),
            summary_text,
            show_summary_section: true,
            ..state
        },
        Action::Reset => Session::default(),
    }
}

/// Reasons the summarize gate refuses to run
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid YouTube video link.")]
    EmptyLink,

    #[error("Please enter a word limit greater than 20 for a meaningful summary.")]
    WordLimitTooSmall(u32),
}

/// Pre-flight checks run before any external call
pub fn validate(session: &Session) -> Result<(), ValidationError> {
    if session.video_link.trim().is_empty() {
        return Err(ValidationError::EmptyLink);
    }

    if let Some(limit) = session.word_limit() {
        if limit < GATE_MIN_WORD_LIMIT {
            return Err(ValidationError::WordLimitTooSmall(limit));
        }
    }

    Ok(())
}
