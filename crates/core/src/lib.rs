//! Core library for anytool
//!
//! This crate implements the **Functional Core** of the anytool service,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`anytool_core`** (this crate): Pure transformation functions with zero I/O
//! - **`anytool`**: HTTP calls, model calls, storage and the server (the Imperative Shell)
//!
//! Everything here can be tested with fixture data, no network or mocking required.
//!
//! # Module Organization
//!
//! - [`github`]: Repository URL parsing, tree filtering and blob decoding
//! - [`diff`]: Prompt building, diff extraction and reflection parsing
//!
//! # Example Usage
//!
//! ```rust
//! use anytool_core::diff::{extract_diff, parse_reflection};
//! use anytool_core::github::parse_github_url;
//!
//! let repo = parse_github_url("git@github.com:octo/hello.git").unwrap();
//! assert_eq!(repo.repo, "hello");
//!
//! let diff = extract_diff("```diff\ndiff --git a/x b/x\n```").into_text();
//! assert_eq!(diff, "diff --git a/x b/x");
//!
//! assert!(parse_reflection("CORRECT").is_correct());
//! ```

pub mod diff;
pub mod github;
