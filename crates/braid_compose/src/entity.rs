//! Entity types and entity instances.
//!
//! An [`EntityType`] is the accumulating target of composition: it is
//! mutable while being defined (own members declared, operators
//! applied), then sealed into an `Rc` that instances and derived types
//! share. All merge logic runs at definition time; at call time an
//! instance only resolves members through its type and parent chain.

use std::collections::HashMap;
use std::rc::Rc;

use braid_value::Value;
use tracing::{debug, trace};

use crate::chain::{CallChain, ChainStep, OpFn};
use crate::component::Contract;
use crate::compose::ComposeContext;
use crate::error::{CallError, ComposeError};
use crate::member::Member;

/// An entity's own per-instance initializer. Runs when an instance is
/// created — never at composition time, and never for a component.
pub type InstanceInitFn = Rc<dyn Fn(&mut EntityInstance) -> Result<(), ComposeError>>;

/// The composed type being built: chained operations and type-level
/// fields by name, at most one parent, plus composition bookkeeping.
pub struct EntityType {
    name: String,
    parent: Option<Rc<EntityType>>,
    chains: HashMap<String, CallChain>,
    fields: HashMap<String, Value>,
    initializer: Option<InstanceInitFn>,
    /// Names the initializer declares it will set on every instance.
    /// Used only for capability-contract verification at seal time.
    instance_fields: Vec<String>,
    /// Mangled aliases of excluded private members, for introspection.
    private: HashMap<String, Member>,
    log: Vec<ComposeContext>,
    requirements: Vec<(String, Contract)>,
    sealed: bool,
}

impl EntityType {
    /// Declare a new root entity type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            chains: HashMap::new(),
            fields: HashMap::new(),
            initializer: None,
            instance_fields: Vec::new(),
            private: HashMap::new(),
            log: Vec::new(),
            requirements: Vec::new(),
            sealed: false,
        }
    }

    /// Declare an entity type deriving from a sealed parent type.
    ///
    /// Inheritance is not unfolded: the parent's chains and fields are
    /// resolved through the link at composition and call time, and a
    /// parent chain joins a derived chain as one atomic step.
    #[must_use]
    pub fn with_parent(name: impl Into<String>, parent: &Rc<EntityType>) -> Self {
        let mut ty = Self::new(name);
        ty.parent = Some(Rc::clone(parent));
        ty
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Rc<EntityType>> {
        self.parent.as_ref()
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Declare one of the entity's own operations.
    ///
    /// The entity's own step always runs last: if components already
    /// contributed to this name, the declaration is appended to the
    /// existing chain; otherwise it becomes the chain's initial step.
    pub fn declare_operation<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut EntityInstance, &[Value]) -> Result<Value, CallError> + 'static,
    {
        let name = name.into();
        let step = ChainStep::new(self.name.clone(), Rc::new(f) as OpFn);
        match self.chains.get_mut(&name) {
            Some(chain) => chain.push(step),
            None => {
                self.chains.insert(name, CallChain::single(step));
            }
        }
        self
    }

    /// Declare one of the entity's own type-level fields. Own fields
    /// take precedence: no component may overwrite them.
    pub fn declare_field(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set the per-instance initializer.
    ///
    /// `provides` names the instance fields the initializer assigns;
    /// they satisfy component field requirements at seal time.
    pub fn initializer<F>(&mut self, provides: &[&str], f: F) -> &mut Self
    where
        F: Fn(&mut EntityInstance) -> Result<(), ComposeError> + 'static,
    {
        self.initializer = Some(Rc::new(f));
        self.instance_fields = provides.iter().map(|f| f.to_string()).collect();
        self
    }

    // -- Member resolution --

    /// Resolve the call chain for a name, falling back through the
    /// parent link.
    #[must_use]
    pub fn resolve_chain(&self, name: &str) -> Option<&CallChain> {
        match self.chains.get(name) {
            Some(chain) => Some(chain),
            None => self.parent.as_ref().and_then(|p| p.resolve_chain(name)),
        }
    }

    /// Resolve a type-level field value for a name, falling back
    /// through the parent link.
    #[must_use]
    pub fn resolve_field(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name) {
            Some(value) => Some(value),
            None => self.parent.as_ref().and_then(|p| p.resolve_field(name)),
        }
    }

    /// Whether any member — field or operation, own or inherited — is
    /// resolvable under this name. This is the "already present" test
    /// of the conditional copy rule.
    #[must_use]
    pub fn resolves_member(&self, name: &str) -> bool {
        self.resolve_field(name).is_some() || self.resolve_chain(name).is_some()
    }

    // -- Composition-side mutation (used by the operator) --

    pub(crate) fn merge_operation(&mut self, name: &str, origin: &str, f: OpFn) {
        let step = ChainStep::new(origin, f);
        if let Some(chain) = self.chains.get_mut(name) {
            // Newest application runs first.
            chain.prepend(step);
            return;
        }
        let mut chain = CallChain::single(step);
        if let Some(parent) = &self.parent
            && parent.resolve_chain(name).is_some()
        {
            // The inherited chain is the atomic final step.
            chain.push(ChainStep::inherited(parent, name));
        }
        self.chains.insert(name.to_string(), chain);
    }

    pub(crate) fn copy_field(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub(crate) fn record_private(&mut self, mangled: String, member: Member) {
        self.private.insert(mangled, member);
    }

    pub(crate) fn record_application(&mut self, ctx: ComposeContext, requires: Contract) {
        if !requires.is_empty() {
            self.requirements.push((ctx.component.clone(), requires));
        }
        self.log.push(ctx);
    }

    // -- Introspection --

    /// Per-application composition records, in application order.
    #[must_use]
    pub fn applications(&self) -> &[ComposeContext] {
        &self.log
    }

    /// Look up an excluded private member by its mangled alias.
    #[must_use]
    pub fn private_member(&self, mangled: &str) -> Option<&Member> {
        self.private.get(mangled)
    }

    /// Mangled aliases of every excluded private member.
    #[must_use]
    pub fn private_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.private.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // -- Lifecycle --

    /// The nearest initializer up the parent chain, with the instance
    /// fields it declares.
    fn resolve_initializer(&self) -> Option<(&InstanceInitFn, &[String])> {
        match &self.initializer {
            Some(init) => Some((init, &self.instance_fields)),
            None => self.parent.as_ref().and_then(|p| p.resolve_initializer()),
        }
    }

    fn instance_field_declared(&self, name: &str) -> bool {
        self.resolve_initializer()
            .is_some_and(|(_, fields)| fields.iter().any(|f| f == name))
    }

    /// Freeze the type. Verifies every applied component's capability
    /// contract against the finished member set, then yields the
    /// shared handle instances and derived types use.
    pub fn seal(self) -> Result<Rc<EntityType>, ComposeError> {
        for (component, contract) in &self.requirements {
            for field in &contract.fields {
                if self.resolve_field(field).is_none() && !self.instance_field_declared(field) {
                    return Err(ComposeError::UnsatisfiedRequirement {
                        component: component.clone(),
                        entity: self.name.clone(),
                        member: field.clone(),
                        kind: "field",
                    });
                }
            }
            for operation in &contract.operations {
                if self.resolve_chain(operation).is_none() {
                    return Err(ComposeError::UnsatisfiedRequirement {
                        component: component.clone(),
                        entity: self.name.clone(),
                        member: operation.clone(),
                        kind: "operation",
                    });
                }
            }
        }
        let mut ty = self;
        ty.sealed = true;
        debug!(
            entity = %ty.name,
            operations = ty.chains.len(),
            fields = ty.fields.len(),
            components = ty.log.len(),
            "entity type sealed"
        );
        Ok(Rc::new(ty))
    }

    /// Create an instance of a sealed type, running the resolved
    /// per-instance initializer (never a component's).
    pub fn spawn(self: &Rc<Self>) -> Result<EntityInstance, ComposeError> {
        if !self.sealed {
            return Err(ComposeError::NotSealed(self.name.clone()));
        }
        let mut instance = EntityInstance {
            ty: Rc::clone(self),
            fields: HashMap::new(),
        };
        if let Some((init, _)) = self.resolve_initializer() {
            init(&mut instance)?;
        }
        trace!(entity = %self.name, "instance created");
        Ok(instance)
    }
}

impl std::fmt::Debug for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("operations", &self.chains.keys().collect::<Vec<_>>())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("sealed", &self.sealed)
            .finish_non_exhaustive()
    }
}

/// A concrete value of a composed type.
///
/// Field resolution is instance-first: a value assigned on the
/// instance shadows the type-level value for that one instance only.
#[derive(Debug)]
pub struct EntityInstance {
    ty: Rc<EntityType>,
    fields: HashMap<String, Value>,
}

impl EntityInstance {
    #[must_use]
    pub fn entity_type(&self) -> &Rc<EntityType> {
        &self.ty
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Read a member value: instance fields first, then the type's
    /// merged fields, then inherited fields.
    ///
    /// The returned value is a shallow copy — for containers, an alias
    /// of the resolved storage.
    pub fn get(&self, name: &str) -> Result<Value, CallError> {
        if let Some(value) = self.fields.get(name) {
            return Ok(value.clone());
        }
        self.ty
            .resolve_field(name)
            .cloned()
            .ok_or_else(|| self.missing(name))
    }

    /// Typed read of an integer field.
    pub fn get_i64(&self, name: &str) -> Result<i64, CallError> {
        let value = self.get(name)?;
        value.as_i64().ok_or_else(|| CallError::TypeMismatch {
            member: name.to_string(),
            expected: "int",
            found: value.type_name(),
        })
    }

    /// Typed read of a numeric field (integers widen).
    pub fn get_f64(&self, name: &str) -> Result<f64, CallError> {
        let value = self.get(name)?;
        value.as_f64().ok_or_else(|| CallError::TypeMismatch {
            member: name.to_string(),
            expected: "float",
            found: value.type_name(),
        })
    }

    /// Typed read of a string field.
    pub fn get_str(&self, name: &str) -> Result<String, CallError> {
        let value = self.get(name)?;
        match value.as_str() {
            Some(s) => Ok(s.to_string()),
            None => Err(CallError::TypeMismatch {
                member: name.to_string(),
                expected: "string",
                found: value.type_name(),
            }),
        }
    }

    /// Assign an instance-level field, shadowing any type-level value
    /// under the same name for this instance.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Whether any member is reachable under this name.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.ty.resolves_member(name)
    }

    /// Invoke a chained operation. The chain built at composition time
    /// runs as-is; no merge logic executes here.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        let ty = Rc::clone(&self.ty);
        match ty.resolve_chain(name) {
            Some(chain) => chain.invoke(self, args),
            None if self.has(name) => Err(CallError::NotCallable {
                entity: self.ty.name().to_string(),
                member: name.to_string(),
            }),
            None => Err(self.missing(name)),
        }
    }

    fn missing(&self, name: &str) -> CallError {
        CallError::MissingMember {
            entity: self.ty.name().to_string(),
            member: name.to_string(),
        }
    }
}
