//! Composition-time and call-time error types.
//!
//! The engine is a thin, fail-fast layer: nothing is swallowed or
//! retried. Composition failures leave the target type in whatever
//! partially-merged state existed when the failure occurred — an
//! acceptable outcome because composition is a one-time,
//! definition-time activity.

use thiserror::Error;

/// Errors raised while a type is being defined: applying a composition
/// operator, sealing a type, or running an initializer.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Construction arguments given to an operator do not match the
    /// component's declared parameters. Detected at the moment the
    /// operator is applied, not earlier.
    #[error("construction arguments for component '{component}': {message}")]
    ConstructionArguments { component: String, message: String },

    /// A component's or entity's initializer failed. Propagated
    /// unchanged; the composition step or instance construction in
    /// progress is aborted.
    #[error("initializer for '{owner}' failed: {message}")]
    Initialization { owner: String, message: String },

    /// A component definition declared two members with the same name.
    #[error("duplicate member '{member}' in component '{component}'")]
    DuplicateMember { component: String, member: String },

    /// A component's capability contract names a member the sealed
    /// entity type does not provide.
    #[error("component '{component}' requires {kind} '{member}', which '{entity}' does not provide")]
    UnsatisfiedRequirement {
        component: String,
        entity: String,
        member: String,
        /// `"field"` or `"operation"`.
        kind: &'static str,
    },

    /// Composition is definition-time only: operators may not be
    /// applied to a type that has already been sealed.
    #[error("entity type '{0}' is sealed; no further components may be applied")]
    Sealed(String),

    /// Instances may only be created from a sealed entity type.
    #[error("entity type '{0}' must be sealed before instances are created")]
    NotSealed(String),

    /// A call made from inside an initializer failed.
    #[error(transparent)]
    Call(#[from] CallError),
}

impl ComposeError {
    /// Wrap an arbitrary failure as an initializer error for `owner`.
    pub fn initialization(owner: impl Into<String>, message: impl Into<String>) -> Self {
        ComposeError::Initialization {
            owner: owner.into(),
            message: message.into(),
        }
    }
}

/// Errors raised when an entity instance is used after composition.
#[derive(Debug, Error)]
pub enum CallError {
    /// No component, entity declaration, or inherited type ever defined
    /// a member with this name.
    #[error("entity '{entity}' has no member named '{member}'")]
    MissingMember { entity: String, member: String },

    /// The name resolves to a data field, not an operation.
    #[error("member '{member}' on entity '{entity}' is not callable")]
    NotCallable { entity: String, member: String },

    /// A typed accessor found a value of the wrong shape.
    #[error("expected {expected} for '{member}', found {found}")]
    TypeMismatch {
        member: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An operation step received arguments it cannot use.
    #[error("bad arguments: {0}")]
    BadArguments(String),
}
