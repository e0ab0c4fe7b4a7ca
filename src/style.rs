//! Style derivation: questionnaire answers to system prompt.
//!
//! Everything here is pure and total. Each answer maps through its own
//! fixed lookup table to a short trait label and a guideline line; unknown
//! answers take the table's neutral default. An absent profile yields
//! [`FALLBACK_PROMPT`] verbatim.

use crate::profile::Profile;

/// System prompt used when no profile exists.
pub const FALLBACK_PROMPT: &str = "You are a helpful AI assistant.";

// ---------------------------------------------------------------------------
// Per-question style tables
// ---------------------------------------------------------------------------

/// Emotional-support style (question 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionalStyle {
    /// Listens and lets people talk it out.
    Listener,
    /// Connects through shared experience.
    Sharer,
    /// Reaches for fixes and advice.
    Adviser,
    /// Unknown answer; neutral reading.
    Balanced,
}

impl EmotionalStyle {
    /// Map a raw answer onto the table.
    pub fn from_answer(answer: &str) -> Self {
        match answer {
            "listen" => Self::Listener,
            "share" => Self::Sharer,
            "advice" => Self::Adviser,
            _ => Self::Balanced,
        }
    }

    /// Short trait label for the profile summary line.
    pub fn trait_label(self) -> &'static str {
        match self {
            Self::Listener => "empathetic listener",
            Self::Sharer => "warm connector",
            Self::Adviser => "solution-focused helper",
            Self::Balanced => "balanced supporter",
        }
    }

    /// Guideline sentence for the system prompt.
    pub fn guideline(self) -> &'static str {
        match self {
            Self::Listener => "Show genuine interest and ask thoughtful questions",
            Self::Sharer => "Connect through shared experiences and understanding",
            Self::Adviser => "Focus on practical solutions and actionable help",
            Self::Balanced => "Be supportive and understanding",
        }
    }
}

/// Decision-making style (question 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionStyle {
    /// Researches before choosing.
    Researcher,
    /// Goes with gut feel.
    Intuitive,
    /// Talks decisions through with others.
    Collaborative,
    /// Unknown answer; neutral reading.
    Balanced,
}

impl DecisionStyle {
    /// Map a raw answer onto the table.
    pub fn from_answer(answer: &str) -> Self {
        match answer {
            "research" => Self::Researcher,
            "intuition" => Self::Intuitive,
            "collaborate" => Self::Collaborative,
            _ => Self::Balanced,
        }
    }

    /// Short trait label for the profile summary line.
    pub fn trait_label(self) -> &'static str {
        match self {
            Self::Researcher => "thoughtful analyzer",
            Self::Intuitive => "intuitive decision-maker",
            Self::Collaborative => "collaborative thinker",
            Self::Balanced => "balanced decision-maker",
        }
    }

    /// Guideline sentence for the system prompt.
    pub fn guideline(self) -> &'static str {
        match self {
            Self::Researcher => "Provide thorough information and consider multiple angles",
            Self::Intuitive => "Trust gut instincts and be confident in recommendations",
            Self::Collaborative => "Consider different perspectives and validate ideas",
            Self::Balanced => "Be balanced in approach",
        }
    }
}

/// Conversational tone (question 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneStyle {
    /// Straight to the point.
    Direct,
    /// Soft and tactful.
    Gentle,
    /// Keeps things light.
    Humorous,
    /// Unknown answer; neutral reading.
    Balanced,
}

impl ToneStyle {
    /// Map a raw answer onto the table.
    pub fn from_answer(answer: &str) -> Self {
        match answer {
            "direct" => Self::Direct,
            "gentle" => Self::Gentle,
            "humor" => Self::Humorous,
            _ => Self::Balanced,
        }
    }

    /// Short trait label for the profile summary line.
    pub fn trait_label(self) -> &'static str {
        match self {
            Self::Direct => "values authenticity",
            Self::Gentle => "considerate communicator",
            Self::Humorous => "uses humor to connect",
            Self::Balanced => "clear communicator",
        }
    }

    /// Guideline sentence for the system prompt.
    pub fn guideline(self) -> &'static str {
        match self {
            Self::Direct => "Be straightforward and honest, even about difficult topics",
            Self::Gentle => "Choose words carefully and communicate with sensitivity",
            Self::Humorous => "Use light humor and keep things upbeat when appropriate",
            Self::Balanced => "Be clear and respectful",
        }
    }
}

/// Energy and social style (question 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyStyle {
    /// Recharges alone.
    Quiet,
    /// Prefers a few close people.
    Close,
    /// Energized by groups.
    Social,
    /// Unknown answer; neutral reading.
    Balanced,
}

impl EnergyStyle {
    /// Map a raw answer onto the table.
    pub fn from_answer(answer: &str) -> Self {
        match answer {
            "quiet" => Self::Quiet,
            "close" => Self::Close,
            "social" => Self::Social,
            _ => Self::Balanced,
        }
    }

    /// Short trait label for the profile summary line.
    pub fn trait_label(self) -> &'static str {
        match self {
            Self::Quiet => "enjoys peaceful moments",
            Self::Close => "values deep connections",
            Self::Social => "energized by social interaction",
            Self::Balanced => "adaptable presence",
        }
    }

    /// Guideline sentence for the system prompt.
    pub fn guideline(self) -> &'static str {
        match self {
            Self::Quiet => "Keep a calm, peaceful energy in responses",
            Self::Close => "Focus on meaningful, deeper conversations",
            Self::Social => "Bring positive energy and enthusiasm",
            Self::Balanced => "Match their energy level appropriately",
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt assembly
// ---------------------------------------------------------------------------

/// Derive the system prompt for a profile.
///
/// Deterministic and infallible: every answer lands on a table entry (the
/// default for unrecognized values), and an absent profile yields the fixed
/// fallback prompt.
pub fn derive_prompt(profile: Option<&Profile>) -> String {
    let Some(profile) = profile else {
        return FALLBACK_PROMPT.to_owned();
    };

    let emotional = EmotionalStyle::from_answer(&profile.q1);
    let decision = DecisionStyle::from_answer(&profile.q2);
    let tone = ToneStyle::from_answer(&profile.q3);
    let energy = EnergyStyle::from_answer(&profile.q4);

    let traits = [
        emotional.trait_label(),
        decision.trait_label(),
        tone.trait_label(),
        energy.trait_label(),
    ]
    .join(", ");

    format!(
        "You are Rapport, a helpful assistant that naturally adapts to match the user's \
         communication style. Based on their communication-style assessment, here's how to \
         communicate with them:\n\
         \n\
         Communication Profile:\n\
         {traits}\n\
         \n\
         COMMUNICATION GUIDELINES:\n\
         - Match their emotional intelligence style: {emotional_line}\n\
         - Adapt to their decision-making approach: {decision_line}\n\
         - Use their preferred communication tone: {tone_line}\n\
         - Respect their energy/social preferences: {energy_line}\n\
         \n\
         CRITICAL INSTRUCTIONS:\n\
         - Naturally adapt to their personality without being obvious about it\n\
         - Be genuinely helpful while communicating in a way that resonates with them\n\
         - Don't mention this profile or reference the questionnaire\n\
         - You are an AI assistant helping them, not copying their exact behavior\n\
         - Respond as if this communication style is simply how you naturally talk\n\
         \n\
         Your goal: Be a helpful AI that communicates in a way that feels natural and \
         comfortable to this specific user.",
        emotional_line = emotional.guideline(),
        decision_line = decision.guideline(),
        tone_line = tone.guideline(),
        energy_line = energy.guideline(),
    )
}
