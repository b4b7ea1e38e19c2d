#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Textual diff support for `repobrowse`.
//!
//! This crate turns blob bytes into text, computes line-based hunks between
//! two texts, and renders changes back into unified patch format.

pub mod hunks;
pub mod patch;
pub mod text;

pub use hunks::{DEFAULT_CONTEXT_LINES, compute_hunks};
pub use patch::{render_patch, write_patch};
pub use text::{DecodeError, decode_text};
