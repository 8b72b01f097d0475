//! The composition operator: one merge pass of a behavior unit onto an
//! entity type.
//!
//! An [`Operator`] is a component definition partially applied to its
//! construction arguments; it is reusable, and each application runs
//! the full pass: construct the transient component instance, resolve
//! every exposed member, chain callables, conditionally copy data,
//! exclude private names. An explicit [`ComposeContext`] threads
//! through the pass and records what happened; it lands in the entity
//! type's composition log.

use braid_value::Value;
use tracing::{debug, trace};

use crate::component::{ComponentDef, ComponentInstance, CtorArgs};
use crate::entity::EntityType;
use crate::error::ComposeError;
use crate::member::{self, Disposition, Member};

/// A component definition bound to construction arguments, ready to be
/// applied to entity types.
#[derive(Debug, Clone)]
pub struct Operator {
    def: ComponentDef,
    args: Vec<Value>,
}

impl Operator {
    /// Bind a definition to construction arguments. No checking happens
    /// here; argument mismatches surface when the operator is applied.
    #[must_use]
    pub fn new(def: &ComponentDef, args: impl Into<Vec<Value>>) -> Self {
        Self {
            def: def.clone(),
            args: args.into(),
        }
    }

    /// Name of the component this operator applies.
    #[must_use]
    pub fn component(&self) -> &str {
        self.def.name()
    }
}

impl ComponentDef {
    /// Shorthand for [`Operator::new`].
    #[must_use]
    pub fn operator(&self, args: impl Into<Vec<Value>>) -> Operator {
        Operator::new(self, args)
    }
}

/// Per-application record of one merge pass, in the order decisions
/// were made. Stored on the entity type for introspection.
#[derive(Debug, Clone, Default)]
pub struct ComposeContext {
    /// The component that was applied.
    pub component: String,
    /// Operation names merged into call chains.
    pub merged_operations: Vec<String>,
    /// Data fields copied onto the type.
    pub copied_fields: Vec<String>,
    /// Data fields skipped because the name was already resolvable.
    pub skipped_fields: Vec<String>,
    /// Private names excluded from composition (original names, not
    /// the mangled aliases).
    pub excluded: Vec<String>,
}

impl ComposeContext {
    fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            ..Self::default()
        }
    }
}

/// Apply one composition operator to an entity type.
///
/// Mutates and returns the same type identity. The transient component
/// instance constructed here is dropped before this function returns;
/// it is never retained, and never created again for later entity
/// instances.
pub fn compose<'a>(
    ty: &'a mut EntityType,
    op: &Operator,
) -> Result<&'a mut EntityType, ComposeError> {
    let def = &op.def;

    if ty.is_sealed() {
        return Err(ComposeError::Sealed(ty.name().to_string()));
    }

    // Construction arguments are checked at application time.
    if op.args.len() != def.params().len() {
        return Err(ComposeError::ConstructionArguments {
            component: def.name().to_string(),
            message: format!(
                "expected {} argument(s) ({}), got {}",
                def.params().len(),
                def.params().join(", "),
                op.args.len()
            ),
        });
    }
    let ctor = CtorArgs::new(def.name(), def.params(), op.args.clone());

    // Exactly one component instance per application: class-level
    // defaults in declaration order (shallow copies — container
    // storage is shared with the definition), then the initializer.
    // An initializer failure propagates unchanged and leaves the type
    // partially modified.
    let mut unit = ComponentInstance::default();
    for (name, value) in def.defaults() {
        unit.set(name.clone(), value.clone());
    }
    if let Some(init) = def.initializer() {
        init(&mut unit, &ctor)?;
    }

    // Single deterministic enumeration: operations in declaration
    // order, then the instance's data fields in assignment order.
    let mut members: Vec<(String, Member)> = Vec::new();
    for (name, f) in def.operations() {
        members.push((name.clone(), Member::Operation(f.clone())));
    }
    for (name, value) in unit.members() {
        members.push((name.to_string(), Member::Data(value.clone())));
    }

    let mut ctx = ComposeContext::new(def.name());
    for (name, m) in members {
        match member::resolve(&name, m) {
            Disposition::Excluded(m) => {
                trace!(component = def.name(), member = %name, "private member excluded");
                ty.record_private(member::mangle(def.name(), &name), m);
                ctx.excluded.push(name);
            }
            Disposition::Chain(f) => {
                trace!(component = def.name(), operation = %name, "operation merged");
                ty.merge_operation(&name, def.name(), f);
                ctx.merged_operations.push(name);
            }
            Disposition::Copy(value) => {
                if ty.resolves_member(&name) {
                    trace!(component = def.name(), field = %name, "field already present, skipped");
                    ctx.skipped_fields.push(name);
                } else {
                    trace!(component = def.name(), field = %name, "field copied");
                    ty.copy_field(&name, value);
                    ctx.copied_fields.push(name);
                }
            }
        }
    }

    debug!(
        component = def.name(),
        entity = ty.name(),
        merged = ctx.merged_operations.len(),
        copied = ctx.copied_fields.len(),
        skipped = ctx.skipped_fields.len(),
        excluded = ctx.excluded.len(),
        "component applied"
    );
    ty.record_application(ctx, def.requires().clone());
    Ok(ty)
}

impl EntityType {
    /// Method form of [`compose`], chainable while defining a type.
    pub fn compose(&mut self, op: &Operator) -> Result<&mut Self, ComposeError> {
        compose(self, op)
    }
}
