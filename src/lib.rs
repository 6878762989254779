#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::wildcard_imports,
    clippy::too_many_lines,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown
)]

pub mod cli;
pub mod client;
pub mod cursor;
pub mod error;
pub mod events;
pub mod input;
pub mod reflow;
pub mod run;
pub mod scheduler;
pub mod search;
pub mod tui;
pub mod view;
