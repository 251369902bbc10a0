//! Library side of `tdm-tool`: subcommands and JSON conversion, kept out of
//! `main.rs` so they can be tested without spawning the binary.

pub mod commands;
pub mod json;
