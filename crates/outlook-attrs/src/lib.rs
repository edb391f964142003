//! Outlook Attributes: declarative document attributes for extraction
//!
//! A single [`AttributeDefinitionSet`] is loaded once per process and drives
//! everything downstream:
//!
//! ```text
//! ┌───────────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │  attributes.json      │────►│  Definition Set  │────►│   Loose Schema   │──► model prompt
//! │  (names + enum map)   │     │  (immutable)     │     └──────────────────┘
//! └───────────────────────┘     └────────┬─────────┘
//!                                        │
//!                      model JSON ──────►▼
//!                               ┌──────────────────┐
//!                               │ Attribute Record │──► sidecar index
//!                               │ (normalized)     │
//!                               └──────────────────┘
//! ```
//!
//! Records are plain maps keyed by the declared names; there is no generated
//! type per attribute set. Enum constraints are advisory: they steer the model
//! through the schema, and [`AttributeRecord::enum_violations`] reports values
//! that ignore them, but nothing is rejected.

pub mod definition;
pub mod record;
pub mod schema;

pub use definition::{AttributeDefinitionSet, DefinitionError, DEFAULT_ATTRIBUTE_CONFIG};
pub use record::{title_from_filename, AttributeRecord, AttributeValue, EnumViolation};
pub use schema::{build_loose_schema, LooseSchema, LOOSE_SCHEMA_NAME};

/// Attribute that receives the filename backfill when the model leaves it blank.
pub const TITLE_ATTRIBUTE: &str = "title";
