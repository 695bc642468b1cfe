//! # Tasknote Core Library
//!
//! Recurring task occurrences and completion tracking for the Tasknote
//! notes-and-tasks application.
//!
//! ## Features
//!
//! - **Recurrence Engine**: Deterministic day-by-day enumeration of the
//!   occurrences a recurring task produces inside any date window
//!   (daily, weekly, monthly, yearly, every N days), with exclusions,
//!   end dates, end counts and a hard per-call cap
//! - **Completion Ledger**: A plain set of occurrence keys recording which
//!   occurrences are done, merged into generated occurrences on demand
//! - **Agenda**: Expansion of a whole task collection for one window, with
//!   per-template failure isolation
//! - **Storage**: SQLite-backed task and ledger repositories with sqlx
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Task records and transfer objects
//! - [`dates`]: Calendar-date parsing and arithmetic
//! - [`occurrence`]: Occurrence identity and records
//! - [`ledger`]: In-memory completion ledger
//! - [`recurrence`]: The recurrence engine
//! - [`agenda`]: Window expansion across many tasks
//! - [`repository`]: Data access layer with Repository pattern
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tasknote_core::{
//!     ledger::CompletionLedger,
//!     models::{RecurringType, Task},
//!     recurrence::generate_occurrences,
//! };
//!
//! let template = Task {
//!     id: "t1".to_string(),
//!     title: "Morning run".to_string(),
//!     is_recurring: true,
//!     recurring_type: Some(RecurringType::Daily),
//!     due_date: NaiveDate::from_ymd_opt(2024, 1, 1),
//!     ..Default::default()
//! };
//!
//! let mut ledger = CompletionLedger::new();
//! ledger.mark_occurrence_completed("t1", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
//!
//! let occurrences = generate_occurrences(
//!     &template,
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
//!     &ledger,
//! );
//! assert_eq!(occurrences.len(), 3);
//! assert!(occurrences[1].is_completed());
//! ```

pub mod agenda;
pub mod dates;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod occurrence;
pub mod recurrence;
pub mod repository;
