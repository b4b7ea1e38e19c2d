#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Object store trait abstraction for `repobrowse`.
//!
//! This crate defines the `ObjectStoreBackend` and `ObjectStore` traits that
//! abstract over repository storage implementations (git2, mock, etc.) so the
//! browsing engine never touches raw storage directly.

mod backend;

pub use backend::{ObjectStore, ObjectStoreBackend};
pub use repobrowse_object_store_models::*;
