//! # Spendcast Core Library
//!
//! Budget bookkeeping for incomes and unplanned expenses, built around a
//! recurrence engine that turns a record with a repeat pattern into the
//! concrete dates it falls on.
//!
//! ## Core Modules
//!
//! - [`calendar`]: Wall-clock date arithmetic in an IANA timezone
//! - [`recurrence`]: Recurrence parsing and expansion over a date window
//! - [`regeneration`]: Rebuilding the materialized occurrences of a series
//! - [`projection`]: On-the-fly budget projection over a window
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer with Repository pattern
//! - [`error`]: Error types shared by every layer
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::{TimeZone, Utc};
//! use spendcast_core::{
//!     calendar::Calendar,
//!     db,
//!     models::NewIncomeData,
//!     recurrence::RecurrenceResolver,
//!     regeneration::SeriesRegenerator,
//!     repository::{IncomeRepository, SqliteRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::establish_connection("spendcast.db").await?;
//!     let calendar = Calendar::from_name("Europe/Berlin")?;
//!     let regenerator = SeriesRegenerator::new(RecurrenceResolver::new(calendar));
//!     let repo = SqliteRepository::new(pool, regenerator);
//!
//!     // Paid on the 15th and the 30th of every month
//!     let salary = repo
//!         .add_income(NewIncomeData {
//!             source: "Salary".to_string(),
//!             amount: 2100.0,
//!             date: Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap(),
//!             recurrence: Some("semimonthly".to_string()),
//!             secondary_day: Some(30),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let children = repo.find_income_children(salary.id).await?;
//!     println!("{} occurrences materialized", children.len());
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod db;
pub mod error;
pub mod models;
pub mod projection;
pub mod recurrence;
pub mod regeneration;
pub mod repository;
