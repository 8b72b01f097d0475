//! # braid_value
//!
//! Dynamic value model for the braid composition engine.
//!
//! Components contribute data fields whose types are not known until
//! composition time, so the engine stores them as [`Value`] keyed by
//! member name. Containers (`List`, `Map`) are reference-counted: a
//! shallow clone aliases the underlying storage, which is exactly the
//! sharing behavior the composition rules specify for type-level
//! fields.

mod value;

pub use value::Value;
