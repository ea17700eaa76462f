//! Calendar schedule expressions: parsing, membership test and set algebra.
#![deny(unsafe_code, missing_docs)]

//! This is a small crate, intended to:
//! - parse human-friendly recurring schedule expressions like `wd {Mon-Fri} hr {9am-5pm}`;
//! - check whether some instant belongs to the schedule;
//! - combine schedules with union, intersection and complement, and test them for overlapping.
//!
//! _This is not a cron jobs scheduler or runner._ It performs no I/O and has no timezone support:
//! calendar fields of the provided timestamp are used as is.
//!
//! ## Schedule expression format
//!
//! Expression is a comma-separated list of sub-expressions (periods).
//! Each period is a sequence of scale constraints `scale {ranges}`, all of them have to match.
//! A period prefixed with `!`, `not ` or `except ` is negative: it excludes instants.
//!
//! ```text
//! wd {Mon Wed Fri} hr {8am-4pm}, wd {Tue Thu} hr {9am-5pm}, not hr {3pm}
//! ```
//!
//! The table below describes scales and their valid values:
//!
//! | Scale           | Names             | Allowed values                  |
//! |-----------------|-------------------|---------------------------------|
//! | Year            | `year`, `yr`      | 2000-9999                       |
//! | Month           | `month`, `mo`     | 1-12, `jan`-`dec`, full names   |
//! | Week of month   | `week`, `wk`      | 1-5                             |
//! | Day of year     | `yday`, `yd`      | 1-366                           |
//! | Day of month    | `mday`, `md`      | 1-31                            |
//! | Day of week     | `wday`, `wd`      | 0-6, `sun`-`sat`, full names    |
//! | Hour            | `hour`, `hr`      | 0-24, `1am`-`12pm`, `1noon`-`12noon` |
//! | Minute          | `minute`, `min`   | 0-60                            |
//! | Second          | `second`, `sec`   | 0-60                            |
//!
//! Rules:
//! - scale names are case-insensitive and may have plural `s`, i.e. `hours {8}`;
//! - ranges are space separated, each one is a single value or `min-max`;
//! - hours, minutes and seconds ranges exclude their upper bound: `hr {9-17}` ends at 16:59:59,
//!   while all other scales include it: `wd {mon-fri}` includes Friday;
//! - a single value covers the whole unit: `hr {8}` is 08:00:00-08:59:59;
//! - `min` greater than `max` wraps around the scale, i.e. `hr {22-2}` is 22:00-01:59 (except years);
//! - `am`, `pm` and `noon` qualify numbers `1`-`12`, only `pm` shifts them, so `12am`, `12pm`
//!   and `12noon` are all hour 12;
//! - bare hour `0` means the end of the day, so `hr {8pm-0}` covers 20:00-23:59;
//! - months and days of the month start at `1`, there is no `0` value;
//! - scale constraints may follow each other without whitespace, trailing commas are ignored.
//! - a schedule without positive periods includes everything not excluded by negative ones.
//!
//! Week of month starts at the 1st day of the month, every following Sunday starts the next week.
//!
//! ## How to use
//!
//! The main entity of the crate is a [`Schedule`] structure:
//! - [new()](Schedule::new): constructor to parse and validate provided expression;
//! - [includes()](Schedule::includes): checks if an instant belongs to the schedule;
//! - [union()](Schedule::union), [intersection()](Schedule::intersection) and
//!   [complement()](Schedule::complement) (or `|`, `&` and `!` operators) combine schedules;
//! - [overlaps()](Schedule::overlaps) and [is_exclusive()](Schedule::is_exclusive) compare them.
//!
//! ### Example with `includes`
//! ```rust
//! use chrono::NaiveDate;
//! use schedulable::{Result, Schedule};
//!
//! fn includes() -> Result<()> {
//!     let schedule = Schedule::new("wd {Mon-Fri} hr {9am-5pm}, not hr {12pm}")?;
//!
//!     // Tuesday
//!     let time = NaiveDate::from_ymd_opt(2015, 12, 15).unwrap().and_hms_opt(10, 30, 0).unwrap();
//!     assert!(schedule.includes(&time));
//!
//!     // Lunch time
//!     assert!(!schedule.includes_str("2015-12-15 12:30:00")?);
//!
//!     Ok(())
//! }
//! # includes().unwrap();
//! ```
//!
//! ### Example with set algebra
//! ```rust
//! use schedulable::{Result, Schedule};
//!
//! fn algebra() -> Result<()> {
//!     let not_wednesday = Schedule::new("! wd {Wed}")?;
//!     let not_thursday = Schedule::new("! wd {Thu}")?;
//!     let schedule = &not_wednesday & &not_thursday;
//!
//!     assert!(!schedule.includes_str("Wed Dec 16 12:00:00 2015")?);
//!     assert!(schedule.includes_str("Fri Dec 18 12:00:00 2015")?);
//!
//!     let mornings = Schedule::new("hr {6am-12pm}")?;
//!     let evenings = Schedule::new("hr {6pm-0}")?;
//!     assert!(mornings.is_exclusive(&evenings));
//!     assert!(mornings.overlaps(&(&mornings | &evenings)));
//!
//!     Ok(())
//! }
//! # algebra().unwrap();
//! ```
//!
//! # Feature flags
//! * `clock` (default): enables [`Schedule::is_now`] which uses the local system clock.
//! * `serde`: adds [`Serialize`](https://docs.rs/serde/latest/serde/trait.Serialize.html) and [`Deserialize`](https://docs.rs/serde/latest/serde/trait.Deserialize.html) trait implementation for [`Schedule`].
//!
//! # Logging
//! Parsing and period intersection emit `debug` and `trace` events via [tracing](https://crates.io/crates/tracing).

mod calendar;
/// Crate specific Error implementation.
pub mod error;
pub mod parser;
/// Scales, ranges and periods which schedules consist of.
pub mod period;
/// Schedule with membership test and set algebra.
pub mod schedule;
mod utils;

// Re-export of public entities.
pub use error::Error;
pub use period::{Boundary, Period, Scale, ValueRange, ValueType};
pub use schedule::{intersect_periods, Schedule};

/// Convenient alias for `Result`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
