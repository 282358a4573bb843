//! Shared test utilities for the git-mirror workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: working copies, commits and bare remotes built with `git2`
//! - [`tree`]: [`tree::TestTree`] builder and plain tree comparison

pub mod git;
pub mod tree;
