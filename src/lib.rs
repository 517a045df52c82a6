//! Schema clarification.
//!
//! Narrow an abstract schema by a concrete value or by a more specific schema,
//! producing a new schema that accepts no more than the original did. Failures
//! leave the original untouched.
//!
//! ```
//! use schema_clarify::{clarify, Schema, Value};
//! use schema_clarify::schema::IntProps;
//!
//! let base = Schema::from(IntProps::default().with_min(1));
//! let narrowed = clarify(&base, &Value::Int(3)).unwrap();
//! assert_eq!(narrowed, Schema::from(IntProps::default().with_min(1).with_value(3)));
//! ```
pub mod align;
pub mod check;
pub mod clarify;
pub mod compare;
pub mod error;
pub mod schema;
pub mod value;

pub use align::{align, Pair};
pub use check::check;
pub use clarify::{clarify, Clarification};
pub use error::{SubstitutionError, Violation, ViolationKind, Violations};
pub use schema::{Item, Kind, Schema};
pub use value::{Value, WildcardMarker, BYTES_KEY, WILDCARD_TOKEN};
