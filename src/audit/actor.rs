//! Actor and clock collaborators
//!
//! Both are injected into the commit hook rather than read from ambient
//! state. A failing or silent actor resolver never blocks a commit; the
//! entry is attributed to [`ANONYMOUS_ACTOR`].

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::{AuditError, AuditResult};

/// Sentinel recorded when no identity is established
pub const ANONYMOUS_ACTOR: &str = "Anonymous";

/// Supplies the "changed by" identity
pub trait ActorResolver {
    /// The current identity, `Ok(None)` when there is none
    fn current_actor(&self) -> AuditResult<Option<String>>;
}

/// Resolve an actor, falling back to [`ANONYMOUS_ACTOR`]
///
/// Errors, `None`, and blank identities all map to the sentinel.
pub fn resolve_actor(resolver: &dyn ActorResolver) -> String {
    match resolver.current_actor() {
        Ok(Some(actor)) if !actor.trim().is_empty() => actor.trim().to_string(),
        Ok(_) => ANONYMOUS_ACTOR.to_string(),
        Err(err) => {
            warn!(error = %err, "actor resolution failed; recording as anonymous");
            ANONYMOUS_ACTOR.to_string()
        }
    }
}

/// Always anonymous
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousActor;

impl ActorResolver for AnonymousActor {
    fn current_actor(&self) -> AuditResult<Option<String>> {
        Ok(None)
    }
}

/// A fixed identity, e.g. from a `--actor` flag
#[derive(Debug, Clone)]
pub struct FixedActor(pub String);

impl FixedActor {
    pub fn new(actor: impl Into<String>) -> Self {
        Self(actor.into())
    }
}

impl ActorResolver for FixedActor {
    fn current_actor(&self) -> AuditResult<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

/// Reads the identity from an environment variable at resolution time
#[derive(Debug, Clone)]
pub struct EnvActor {
    var: String,
}

impl EnvActor {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl ActorResolver for EnvActor {
    fn current_actor(&self) -> AuditResult<Option<String>> {
        match std::env::var(&self.var) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(AuditError::Actor(format!("{}: {}", self.var, e))),
        }
    }
}

impl<F> ActorResolver for F
where
    F: Fn() -> Option<String>,
{
    fn current_actor(&self) -> AuditResult<Option<String>> {
        Ok(self())
    }
}

/// Source of audit timestamps
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A fixed instant, for reproducible output
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
