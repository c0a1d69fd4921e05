//! xlsxjobs - Spreadsheet job definitions to scheduler FOLDER/JOB XML
//!
//! This crate reads job-definition rows from a spreadsheet and compiles them into
//! the FOLDER/JOB markup document consumed by a job scheduler. Output attributes are
//! described by a declarative, mergeable JSON schema (defaults, column lookups, enum
//! translations) plus a set of user corrections for recurrence intervals, time windows
//! and failure notifications.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxjobs::{ConverterBuilder, Corrections};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The working directory holds config.json and the five override fragments
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let input = File::open("./jobs/jobs.xlsx")?;
//!
//!     // Writes ./jobs/output.xml
//!     let path = converter.convert_in_dir("./jobs", input, &Corrections::new())?;
//!     println!("{}", path.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Building the correction form
//!
//! The auxiliary keys (interval codes, time codes, notification keys) are what a user
//! corrects before compiling:
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxjobs::ConverterBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = ConverterBuilder::new().build()?;
//! let rows = converter.read_rows(File::open("jobs.xlsx")?)?;
//! let keys = converter.derive_keys(&rows);
//! println!("{}", serde_json::to_string_pretty(&keys)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Compiling with corrections
//!
//! ```rust,no_run
//! use xlsxjobs::{
//!     load_schema, ConverterBuilder, Corrections, IntervalCorrection, IntervalKind,
//!     IntervalUnit, Row,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = load_schema("./jobs")?;
//! let corrections = Corrections::new()
//!     .with_node_id("batch01")
//!     .with_interval(IntervalCorrection {
//!         interval: "5".to_string(),
//!         kind: IntervalKind::Cyclic,
//!         values: "3".to_string(),
//!         unit: IntervalUnit::Hours,
//!         ..Default::default()
//!     });
//!
//! let rows = vec![Row::new().with("A", "PAY_ROLL1").with("BD", "F1").with("Z", "5")];
//! let xml = ConverterBuilder::new()
//!     .build()?
//!     .compile(&rows, &schema, &corrections)?;
//! assert!(xml.contains("INTERVAL=\"00003H\""));
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod compiler;
mod correction;
mod error;
mod formatter;
mod normalize;
mod output;
mod parser;
mod resolver;
mod schema;
mod security;
mod types;

// 公開API
pub use api::{ColumnLayout, IntervalKind, IntervalUnit, Timezone};
pub use builder::{Converter, ConverterBuilder, DEFAULT_HEADER_ROWS, DEFAULT_OUTPUT_FILE_NAME};
pub use compiler::{sort_by_group, Compiler};
pub use correction::{Corrections, IntervalCorrection, NotificationCorrection};
pub use error::XlsxJobsError;
pub use normalize::{dedupe_key, derive_keys, notification_key, DerivedKeys, JOBNAME_PLACEHOLDER};
pub use output::{Document, Element};
pub use resolver::{interval_encoding, resolve_source, Resolution, Resolver};
pub use schema::{
    load_schema, merge_overrides, AttributeDef, AttributeRule, ColumnLookup, ElementSchema,
    EnumKey, IntervalRole, MergedSchema, NotificationField, NotificationSchema, TimeBound,
    ValueSource, BASE_SCHEMA_FILE, OVERRIDE_SECTIONS,
};
pub use types::Row;
