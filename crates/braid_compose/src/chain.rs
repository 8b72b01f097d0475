//! Call chains: the merged form of a callable member.
//!
//! Every contribution to one operation name becomes a step in an
//! explicit ordered list. Steps run left to right and the *last* step's
//! return value is the one the caller observes; earlier return values
//! are discarded. Each application of a component prepends its step, so
//! the most recently applied component runs first and the entity's own
//! declaration (the initial step) runs last.
//!
//! A parent type's chain is never unfolded into a derived chain. It
//! enters as one atomic tail step that re-resolves and runs the parent
//! chain in its previously-fixed order.

use std::fmt;
use std::rc::Rc;

use braid_value::Value;

use crate::entity::{EntityInstance, EntityType};
use crate::error::CallError;

/// A callable operation step. The receiver is always the entity
/// instance, never the component instance, so a step may freely read
/// and write any field the entity or another component placed there.
pub type OpFn = Rc<dyn Fn(&mut EntityInstance, &[Value]) -> Result<Value, CallError>>;

/// One contribution to a chained operation, tagged with the name of the
/// component (or entity type) that contributed it.
#[derive(Clone)]
pub struct ChainStep {
    origin: String,
    func: OpFn,
}

impl ChainStep {
    pub(crate) fn new(origin: impl Into<String>, func: OpFn) -> Self {
        Self {
            origin: origin.into(),
            func,
        }
    }

    /// Build the atomic tail step representing an inherited chain.
    ///
    /// The parent type must already resolve a chain for `name`; the
    /// step closes over the sealed parent and re-enters it at call
    /// time.
    pub(crate) fn inherited(parent: &Rc<EntityType>, name: &str) -> Self {
        let parent = Rc::clone(parent);
        let member = name.to_string();
        let origin = format!("{}::{}", parent.name(), member);
        let entity = parent.name().to_string();
        Self::new(
            origin,
            Rc::new(move |receiver: &mut EntityInstance, args: &[Value]| {
                let chain = parent
                    .resolve_chain(&member)
                    .ok_or_else(|| CallError::MissingMember {
                        entity: entity.clone(),
                        member: member.clone(),
                    })?;
                chain.invoke(receiver, args)
            }),
        )
    }

    /// Name of the component or entity type this step came from.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl fmt::Debug for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainStep")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// The ordered invocation sequence resolved for one operation name.
#[derive(Clone, Debug, Default)]
pub struct CallChain {
    steps: Vec<ChainStep>,
}

impl CallChain {
    /// A chain of one step — the first contributor for a name.
    pub(crate) fn single(step: ChainStep) -> Self {
        Self { steps: vec![step] }
    }

    /// Prepend a step: the newest contribution runs first.
    pub(crate) fn prepend(&mut self, step: ChainStep) {
        self.steps.insert(0, step);
    }

    /// Append a step: runs last and its return value wins.
    pub(crate) fn push(&mut self, step: ChainStep) {
        self.steps.push(step);
    }

    /// Run every step in order with the same receiver and arguments.
    ///
    /// The returned value is the last step's return value. Any step
    /// failure propagates immediately; later steps do not run.
    pub fn invoke(
        &self,
        receiver: &mut EntityInstance,
        args: &[Value],
    ) -> Result<Value, CallError> {
        let mut last = Value::Null;
        for step in &self.steps {
            last = (step.func)(receiver, args)?;
        }
        Ok(last)
    }

    /// Number of steps in the chain (an inherited chain counts as one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The origins of each step, in execution order.
    #[must_use]
    pub fn origins(&self) -> Vec<&str> {
        self.steps.iter().map(ChainStep::origin).collect()
    }
}

/// Fetch a required positional argument from an operation's argument
/// slice.
pub fn arg(args: &[Value], index: usize) -> Result<&Value, CallError> {
    args.get(index).ok_or_else(|| {
        CallError::BadArguments(format!(
            "missing argument {index} (got {} argument(s))",
            args.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_out_of_range() {
        let args = vec![Value::Int(1)];
        assert!(arg(&args, 0).is_ok());
        assert!(matches!(arg(&args, 1), Err(CallError::BadArguments(_))));
    }

    #[test]
    fn test_origins_follow_prepend_order() {
        let noop: OpFn = Rc::new(|_, _| Ok(Value::Null));
        let mut chain = CallChain::single(ChainStep::new("Entity", noop.clone()));
        chain.prepend(ChainStep::new("First", noop.clone()));
        chain.prepend(ChainStep::new("Second", noop));
        assert_eq!(chain.origins(), vec!["Second", "First", "Entity"]);
        assert_eq!(chain.len(), 3);
    }
}
