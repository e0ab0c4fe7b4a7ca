//! Rapport, a terminal chat assistant that adapts to you.
//!
//! Single Rust binary. Collects a short communication-style questionnaire,
//! derives a system prompt from the answers, and drives an OpenRouter-style
//! chat completion API with it. Replies render in the terminal and can
//! optionally be spoken aloud.
//!
//! See `DESIGN.md` for architecture documentation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod intake;
pub mod logging;
pub mod profile;
pub mod providers;
pub mod session;
pub mod storage;
pub mod style;
pub mod ui;
