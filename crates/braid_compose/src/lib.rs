//! # braid_compose
//!
//! A composition engine: an entity type acquires behavior from an
//! ordered set of independent behavior units ("components") without
//! inheritance. Each component contributes callable operations and
//! plain data fields; the engine merges them, plus whatever the entity
//! itself declares, into one coherent type.
//!
//! Two phases exist. At **composition time** an [`Operator`] applies a
//! [`ComponentDef`] to a mutable [`EntityType`]: exactly one transient
//! component instance is constructed, and every member it exposes is
//! either chained (callables), conditionally copied (data), or
//! excluded (`__`-private names). At **call time** an
//! [`EntityInstance`] invokes the chains built earlier; no merge logic
//! runs.
//!
//! Merge rules, in brief:
//!
//! - Identically-named operations chain. The most recently applied
//!   component's step runs first, the entity's own declaration last,
//!   and the last step's return value is the one observed.
//! - Data fields copy only if the name is not already resolvable; the
//!   entity's own fields are never overwritten.
//! - An inherited chain joins a derived chain as one atomic final
//!   step.
//!
//! ## Usage
//!
//! ```rust
//! use braid_compose::{compose, ComponentDef, EntityType};
//! use braid_value::Value;
//!
//! # fn main() -> Result<(), braid_compose::ComposeError> {
//! let has_health = ComponentDef::builder("HasHealthPoints")
//!     .param("maxhp")
//!     .initializer(|unit, args| {
//!         let maxhp = args.get_i64("maxhp")?;
//!         unit.set("hp", maxhp);
//!         unit.set("maxhp", maxhp);
//!         Ok(())
//!     })
//!     .operation("takedamage", |me, args| {
//!         let damage = braid_compose::arg(args, 0)?.as_i64().unwrap_or(0);
//!         let hp = me.get_i64("hp")?;
//!         me.set("hp", hp - damage);
//!         Ok(Value::Null)
//!     })
//!     .build()?;
//!
//! let mut player = EntityType::new("Player");
//! compose(&mut player, &has_health.operator(vec![Value::Int(10)]))?;
//! let player = player.seal()?;
//!
//! let mut p = player.spawn()?;
//! p.call("takedamage", &[Value::Int(4)])?;
//! assert_eq!(p.get_i64("hp")?, 6);
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod component;
pub mod compose;
pub mod entity;
pub mod error;
pub mod member;

pub use chain::{arg, CallChain, ChainStep, OpFn};
pub use component::{
    ComponentDef, ComponentDefBuilder, ComponentInstance, Contract, CtorArgs, InitFn,
};
pub use compose::{compose, ComposeContext, Operator};
pub use entity::{EntityInstance, EntityType, InstanceInitFn};
pub use error::{CallError, ComposeError};
pub use member::{is_private, mangle, Disposition, Member, PRIVATE_MARKER};
