//! The four-question communication-style questionnaire.
//!
//! Questions and option keys are fixed; the keys are what the style tables
//! in [`crate::style`] match on. Collection is tolerant: it accepts an
//! option number or key, and leaves anything else as typed. Validation is
//! the profile store's job, and unknown values fall through to the style
//! tables' neutral defaults.

use crate::profile::Profile;
use crate::ui::InteractivePrompt;

/// One questionnaire question with its keyed options.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    /// Field name in the profile record (`q1`..`q4`).
    pub key: &'static str,
    /// Question text shown to the user.
    pub text: &'static str,
    /// (answer key, option label) pairs.
    pub options: [(&'static str, &'static str); 3],
}

/// The fixed questionnaire, in presentation order.
pub const QUESTIONS: [Question; 4] = [
    Question {
        key: "q1",
        text: "When a friend comes to you with a problem, what do you usually do?",
        options: [
            ("listen", "Listen and let them talk it out"),
            ("share", "Share a similar experience of your own"),
            ("advice", "Offer advice and possible fixes"),
        ],
    },
    Question {
        key: "q2",
        text: "How do you make big decisions?",
        options: [
            ("research", "Research thoroughly before choosing"),
            ("intuition", "Go with your gut"),
            ("collaborate", "Talk it through with people you trust"),
        ],
    },
    Question {
        key: "q3",
        text: "How do you prefer hard conversations to go?",
        options: [
            ("direct", "Straight to the point"),
            ("gentle", "Softly and tactfully"),
            ("humor", "Lightened up with some humor"),
        ],
    },
    Question {
        key: "q4",
        text: "How do you recharge after a long week?",
        options: [
            ("quiet", "Quiet time alone"),
            ("close", "With one or two close friends"),
            ("social", "Out with a group"),
        ],
    },
];

/// Ask all four questions and return the raw answer record.
///
/// Answers are trimmed but not validated here; empty strings stay empty so
/// [`crate::profile::ProfileStore::save`] is the single enforcement point.
///
/// # Errors
///
/// Returns an error when the interactive prompt fails (e.g. input closed).
pub async fn collect(prompt: &dyn InteractivePrompt) -> std::io::Result<Profile> {
    let mut answers: [String; 4] = Default::default();

    for (question, slot) in QUESTIONS.iter().zip(answers.iter_mut()) {
        let rendered = render_question(question);
        let raw = prompt.ask(&rendered).await?;
        *slot = normalize_answer(question, &raw);
    }

    let [q1, q2, q3, q4] = answers;
    Ok(Profile { q1, q2, q3, q4 })
}

/// Format a question with numbered options and an input cursor.
fn render_question(question: &Question) -> String {
    let mut out = format!("\n{}\n", question.text);
    for (index, (_, label)) in question.options.iter().enumerate() {
        let number = index.saturating_add(1);
        out.push_str(&format!("  {number}. {label}\n"));
    }
    out.push_str("> ");
    out
}

/// Map "1"/"2"/"3" onto the option key; pass anything else through trimmed.
fn normalize_answer(question: &Question, raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed {
        "1" => question.options[0].0.to_owned(),
        "2" => question.options[1].0.to_owned(),
        "3" => question.options[2].0.to_owned(),
        other => other.to_owned(),
    }
}
