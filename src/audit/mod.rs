//! Data-change audit trail
//!
//! Records every create, modify and delete of an auditable entity type as an
//! audit log entry written in the same commit as the change itself.
//!
//! # Architecture
//!
//! - `CapabilityRegistry`: built once from static `EntityDescriptor`s, answers
//!   "is this type audited" and "is this field masked".
//! - `classify`: narrows a pending batch to the audited mutations.
//! - `diff_snapshots`: field-level old/new values with sensitive values masked.
//! - `build_entry`: assembles one `AuditLogEntry` per audited mutation.
//! - `CommitHook`: runs the above once per commit, stages the entries in the
//!   caller's `UnitOfWork`, then commits it.
//!
//! # Example
//!
//! ```rust,ignore
//! use change_audit::audit::{CommitHook, FixedActor, SystemClock};
//!
//! let hook = CommitHook::new(&registry, &FixedActor::new("alice"), &SystemClock);
//! let mut session = store.begin()?;
//! session.add(&book)?;
//! hook.commit(session)?;
//! ```

mod actor;
mod builder;
mod classifier;
mod descriptor;
mod diff;
mod entry;
mod hook;
mod registry;
mod value;

pub use actor::{
    resolve_actor, ActorResolver, AnonymousActor, Clock, EnvActor, FixedActor, FixedClock,
    SystemClock, ANONYMOUS_ACTOR,
};
pub use builder::build_entry;
pub use classifier::{classify, ClassifiedMutation, PendingMutation};
pub use descriptor::{Entity, EntityDescriptor, FieldDef};
pub use diff::{diff_snapshots, ChangeRecord, ChangeSet};
pub use entry::{Action, AuditLogEntry};
pub use hook::{CommitHook, UnitOfWork};
pub use registry::{
    Capability, CapabilityRegistry, RegistryBuilder, SensitivityPolicy, DEFAULT_REDACTION_TOKEN,
};
pub use value::{FieldSnapshot, FieldValue};
