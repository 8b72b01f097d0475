//! Member resolution: classification and the private-name convention.
//!
//! A pure layer with no state. During a merge pass every exposed member
//! of a component instance flows through [`resolve`], which decides
//! whether the member is excluded, chained as an operation, or copied
//! as a data field.

use braid_value::Value;

use crate::chain::OpFn;

/// Names beginning with this marker are library-private: invisible to
/// composition, never chained and never copied onto the entity type.
pub const PRIVATE_MARKER: &str = "__";

/// One member exposed by a component instance during a merge pass.
#[derive(Clone)]
pub enum Member {
    /// A callable operation, headed for the call chain builder.
    Operation(OpFn),
    /// A plain data field, headed for the conditional copy rule.
    Data(Value),
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Member::Operation(_) => f.write_str("Member::Operation"),
            Member::Data(v) => write!(f, "Member::Data({v})"),
        }
    }
}

/// What the composition operator should do with one member. Carries
/// the member payload so the caller never re-inspects it.
#[derive(Clone)]
pub enum Disposition {
    /// Private name: record a mangled introspection alias and skip.
    Excluded(Member),
    /// Callable: merge into the call chain for this name.
    Chain(OpFn),
    /// Data: copy onto the type if the name is not already resolvable.
    Copy(Value),
}

/// Whether a member name is private to its component.
#[must_use]
pub fn is_private(name: &str) -> bool {
    name.starts_with(PRIVATE_MARKER)
}

/// The mangled alias a private member is filed under for
/// introspection: `_Component__name`. Reachable only through the
/// entity type's private-member API, never through ordinary member
/// access, and not something client code should rely on.
#[must_use]
pub fn mangle(component: &str, name: &str) -> String {
    format!("_{component}{name}")
}

/// Classify one member. Exclusion is checked first.
#[must_use]
pub fn resolve(name: &str, member: Member) -> Disposition {
    if is_private(name) {
        return Disposition::Excluded(member);
    }
    match member {
        Member::Operation(f) => Disposition::Chain(f),
        Member::Data(v) => Disposition::Copy(v),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_private_marker_detection() {
        assert!(is_private("__fff"));
        assert!(is_private("__init"));
        assert!(!is_private("_single"));
        assert!(!is_private("hp"));
    }

    #[test]
    fn test_mangle_matches_convention() {
        assert_eq!(mangle("Component8", "__fff"), "_Component8__fff");
    }

    #[test]
    fn test_resolve_excludes_before_classifying() {
        let op = Member::Operation(Rc::new(|_, _| Ok(Value::Null)));
        assert!(matches!(
            resolve("__hidden", op.clone()),
            Disposition::Excluded(_)
        ));
        assert!(matches!(resolve("jump", op), Disposition::Chain(_)));
        assert!(matches!(
            resolve("hp", Member::Data(Value::Int(10))),
            Disposition::Copy(Value::Int(10))
        ));
        assert!(matches!(
            resolve("__secret", Member::Data(Value::Null)),
            Disposition::Excluded(Member::Data(Value::Null))
        ));
    }
}
