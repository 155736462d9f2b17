//! Core library for hnscan
//!
//! This crate implements the **Functional Core** of the hnscan application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The hnscan project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`hnscan_core`** (this crate): Pure transformation functions with zero I/O
//! - **`hnscan`**: I/O operations and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Deterministic**: Behavior is predictable and reproducible
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`hn`]: Transformations for HackerNews API data: freshness filtering,
//!   rank restoration, and output projection
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use hnscan_core::hn::{rank_index, rank_and_truncate, transform_stories};
//!
//! // Create fixture data (no HTTP required)
//! let ids = vec![5, 6, 7];
//! let index = rank_index(&ids);
//!
//! // Restore rank order and project, using pure functions
//! let ranked = rank_and_truncate(items, &index, 25);
//! let stories = transform_stories(&ranked, &index);
//! ```
//!
//! # Pattern Reference
//!
//! This architecture is based on Gary Bernhardt's Functional Core, Imperative Shell pattern.
//! The key insight: **data transformation logic should be pure and ignorant of where data
//! comes from or where it goes**.

pub mod hn;
