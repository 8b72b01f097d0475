//! Behavior unit (component) definitions and their transient instances.
//!
//! A [`ComponentDef`] declares callable operations, class-level data
//! defaults, an optional initializer with named construction
//! parameters, and an optional capability contract. Definitions are
//! cheap to clone and reusable: the same definition can be applied to
//! any number of entity types, each application constructing exactly
//! one short-lived [`ComponentInstance`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use braid_value::Value;

use crate::chain::OpFn;
use crate::entity::EntityInstance;
use crate::error::{CallError, ComposeError};

/// A component initializer. Runs once per operator application with
/// the transient component instance as its target — never when an
/// entity instance is created.
pub type InitFn = Rc<dyn Fn(&mut ComponentInstance, &CtorArgs) -> Result<(), ComposeError>>;

/// The members a component requires from the entity types it is
/// applied to. Verified when the target type is sealed; an empty
/// contract keeps the fully duck-typed behavior.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    /// Field names the component's operations read or write but do not
    /// themselves provide.
    pub fields: Vec<String>,
    /// Operation names the component invokes but does not provide.
    pub operations: Vec<String>,
}

impl Contract {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.operations.is_empty()
    }
}

struct DefInner {
    name: String,
    params: Vec<String>,
    operations: Vec<(String, OpFn)>,
    defaults: Vec<(String, Value)>,
    initializer: Option<InitFn>,
    requires: Contract,
}

/// A reusable behavior unit definition.
#[derive(Clone)]
pub struct ComponentDef {
    inner: Rc<DefInner>,
}

impl ComponentDef {
    /// Start declaring a component.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ComponentDefBuilder {
        ComponentDefBuilder {
            name: name.into(),
            params: Vec::new(),
            operations: Vec::new(),
            defaults: Vec::new(),
            initializer: None,
            requires: Contract::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Declared constructor parameter names, in order.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.inner.params
    }

    pub(crate) fn operations(&self) -> &[(String, OpFn)] {
        &self.inner.operations
    }

    pub(crate) fn defaults(&self) -> &[(String, Value)] {
        &self.inner.defaults
    }

    pub(crate) fn initializer(&self) -> Option<&InitFn> {
        self.inner.initializer.as_ref()
    }

    #[must_use]
    pub fn requires(&self) -> &Contract {
        &self.inner.requires
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef")
            .field("name", &self.inner.name)
            .field("params", &self.inner.params)
            .field(
                "operations",
                &self
                    .inner
                    .operations
                    .iter()
                    .map(|(n, _)| n.as_str())
                    .collect::<Vec<_>>(),
            )
            .field(
                "defaults",
                &self
                    .inner
                    .defaults
                    .iter()
                    .map(|(n, _)| n.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Chained builder for [`ComponentDef`].
pub struct ComponentDefBuilder {
    name: String,
    params: Vec<String>,
    operations: Vec<(String, OpFn)>,
    defaults: Vec<(String, Value)>,
    initializer: Option<InitFn>,
    requires: Contract,
}

impl ComponentDefBuilder {
    /// Declare a named constructor parameter. Parameters are
    /// positional; the operator's argument count must match when it is
    /// applied.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Declare a callable operation. Declaration order is the
    /// enumeration order during a merge pass.
    #[must_use]
    pub fn operation<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut EntityInstance, &[Value]) -> Result<Value, CallError> + 'static,
    {
        self.operations.push((name.into(), Rc::new(f)));
        self
    }

    /// Declare a class-level data default.
    ///
    /// The default value itself is shallow-copied onto every entity
    /// type the component is applied to, so a container default is one
    /// storage cell shared across *all* of those types. Assign the
    /// field from the initializer instead to give each application its
    /// own container.
    #[must_use]
    pub fn default_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.push((name.into(), value.into()));
        self
    }

    /// Set the initializer, run once per application (never per entity
    /// instance). Fields it assigns join the component instance's
    /// member set.
    #[must_use]
    pub fn initializer<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ComponentInstance, &CtorArgs) -> Result<(), ComposeError> + 'static,
    {
        self.initializer = Some(Rc::new(f));
        self
    }

    /// Record that this component's operations expect the entity to
    /// provide a field with this name.
    #[must_use]
    pub fn requires_field(mut self, name: impl Into<String>) -> Self {
        self.requires.fields.push(name.into());
        self
    }

    /// Record that this component's operations invoke an operation
    /// with this name that it does not itself provide.
    #[must_use]
    pub fn requires_operation(mut self, name: impl Into<String>) -> Self {
        self.requires.operations.push(name.into());
        self
    }

    /// Finish the definition. Fails if two declared members share a
    /// name.
    pub fn build(self) -> Result<ComponentDef, ComposeError> {
        let mut seen = HashSet::new();
        for name in self
            .operations
            .iter()
            .map(|(n, _)| n)
            .chain(self.defaults.iter().map(|(n, _)| n))
        {
            if !seen.insert(name.as_str()) {
                return Err(ComposeError::DuplicateMember {
                    component: self.name,
                    member: name.clone(),
                });
            }
        }
        Ok(ComponentDef {
            inner: Rc::new(DefInner {
                name: self.name,
                params: self.params,
                operations: self.operations,
                defaults: self.defaults,
                initializer: self.initializer,
                requires: self.requires,
            }),
        })
    }
}

/// Checked construction arguments, bound to parameter names when the
/// operator is applied.
#[derive(Debug, Clone)]
pub struct CtorArgs {
    component: String,
    params: Vec<String>,
    values: Vec<Value>,
}

impl CtorArgs {
    pub(crate) fn new(component: &str, params: &[String], values: Vec<Value>) -> Self {
        Self {
            component: component.to_string(),
            params: params.to_vec(),
            values,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up an argument by parameter name.
    pub fn get(&self, param: &str) -> Result<&Value, ComposeError> {
        self.params
            .iter()
            .position(|p| p == param)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| ComposeError::ConstructionArguments {
                component: self.component.clone(),
                message: format!("no parameter named '{param}'"),
            })
    }

    /// Typed fetch of an integer argument.
    pub fn get_i64(&self, param: &str) -> Result<i64, ComposeError> {
        let value = self.get(param)?;
        value
            .as_i64()
            .ok_or_else(|| self.type_error(param, "int", value))
    }

    /// Typed fetch of a float argument (integers widen).
    pub fn get_f64(&self, param: &str) -> Result<f64, ComposeError> {
        let value = self.get(param)?;
        value
            .as_f64()
            .ok_or_else(|| self.type_error(param, "float", value))
    }

    /// Typed fetch of a string argument.
    pub fn get_str(&self, param: &str) -> Result<&str, ComposeError> {
        let value = self.get(param)?;
        value
            .as_str()
            .ok_or_else(|| self.type_error(param, "string", value))
    }

    fn type_error(&self, param: &str, expected: &str, found: &Value) -> ComposeError {
        ComposeError::ConstructionArguments {
            component: self.component.clone(),
            message: format!(
                "parameter '{param}' expects {expected}, got {}",
                found.type_name()
            ),
        }
    }
}

/// The transient value created exactly once per operator application.
///
/// Holds the component's class-level defaults plus whatever fields its
/// initializer assigned, in first-assignment order. Dropped as soon as
/// the merge pass has copied its contributions onto the target type.
#[derive(Debug, Default)]
pub struct ComponentInstance {
    order: Vec<String>,
    fields: HashMap<String, Value>,
}

impl ComponentInstance {
    /// Assign a field. A reassignment keeps the name's original
    /// enumeration position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        if !self.fields.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.fields.insert(name, value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// All fields in enumeration order: declared defaults first, then
    /// initializer-assigned names in assignment order.
    pub(crate) fn members(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .filter_map(|name| self.fields.get(name).map(|v| (name.as_str(), v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_duplicate_members() {
        let result = ComponentDef::builder("Broken")
            .operation("f", |_, _| Ok(Value::Null))
            .default_field("f", 1i64)
            .build();
        assert!(matches!(
            result,
            Err(ComposeError::DuplicateMember { member, .. }) if member == "f"
        ));
    }

    #[test]
    fn test_instance_preserves_assignment_order() {
        let mut unit = ComponentInstance::default();
        unit.set("hp", 10i64);
        unit.set("maxhp", 10i64);
        unit.set("hp", 6i64); // reassignment keeps position
        let names: Vec<_> = unit.members().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["hp", "maxhp"]);
        assert_eq!(unit.get("hp"), Some(&Value::Int(6)));
    }

    #[test]
    fn test_ctor_args_lookup_by_name() {
        let params = vec!["maxhp".to_string()];
        let args = CtorArgs::new("HasHealthPoints", &params, vec![Value::Int(10)]);
        assert_eq!(args.get_i64("maxhp").unwrap(), 10);
        assert!(args.get("nothing").is_err());
    }

    #[test]
    fn test_ctor_args_type_mismatch() {
        let params = vec!["maxhp".to_string()];
        let args = CtorArgs::new("HasHealthPoints", &params, vec![Value::Str("ten".into())]);
        assert!(matches!(
            args.get_i64("maxhp"),
            Err(ComposeError::ConstructionArguments { .. })
        ));
    }
}
