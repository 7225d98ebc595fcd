//! Lifecycle state machine for a model session.
//!
//! A session moves strictly through
//! `Unconnected -> Connected -> Initialized -> Running -> Finalized`, with `disconnect`
//! returning it to `Unconnected`.
//! No phase can be skipped or reordered.
//!
//! [`Lifecycle`] only tracks the state; it performs no remote calls.
//! Callers [`check`](Lifecycle::check) an operation before issuing it and
//! [`advance`](Lifecycle::advance) once the remote call succeeded, so an operation issued out
//! of order is rejected before it can touch the remote model.
//!
//! ```rust
//! use bmi_core::lifecycle::{Lifecycle, LifecycleState, Operation};
//!
//! let mut lifecycle = Lifecycle::new();
//! assert!(lifecycle.check(Operation::Update).is_err());
//!
//! for op in [Operation::Connect, Operation::Initialize, Operation::Update] {
//!     lifecycle.check(op).unwrap();
//!     lifecycle.advance(op);
//! }
//! assert_eq!(lifecycle.state(), LifecycleState::Running);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{BmiError, BmiResult};

/// Phase of a model session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// No session has been established.
    Unconnected,
    /// A session exists but the model has not been configured.
    Connected,
    /// The model accepted its configuration and no step has been taken yet.
    Initialized,
    /// At least one update has been applied.
    Running,
    /// Remote resources have been released; only `disconnect` remains.
    Finalized,
}

impl LifecycleState {
    /// Whether the model may be queried, exchanged with or stepped.
    pub fn is_active(&self) -> bool {
        matches!(self, LifecycleState::Initialized | LifecycleState::Running)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Unconnected => write!(f, "Unconnected"),
            LifecycleState::Connected => write!(f, "Connected"),
            LifecycleState::Initialized => write!(f, "Initialized"),
            LifecycleState::Running => write!(f, "Running"),
            LifecycleState::Finalized => write!(f, "Finalized"),
        }
    }
}

/// Operations which are gated by the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Connect,
    Initialize,
    /// Read-only discovery and grid introspection.
    Query,
    /// `get_value` / `set_value`.
    Exchange,
    Update,
    Finalize,
    Disconnect,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Connect => write!(f, "connect"),
            Operation::Initialize => write!(f, "initialize"),
            Operation::Query => write!(f, "query"),
            Operation::Exchange => write!(f, "exchange values"),
            Operation::Update => write!(f, "update"),
            Operation::Finalize => write!(f, "finalize"),
            Operation::Disconnect => write!(f, "disconnect"),
        }
    }
}

/// Tracks the lifecycle state of a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Unconnected,
        }
    }

    /// A lifecycle for a session which is already established.
    pub fn connected() -> Self {
        Self {
            state: LifecycleState::Connected,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Checks that `operation` is allowed in the current state.
    ///
    /// The error variant depends on the operation:
    /// a misplaced update is a [`BmiError::Step`], a repeated initialize is a
    /// [`BmiError::Initialization`] and a repeated finalize is [`BmiError::AlreadyFinalized`].
    /// Everything else is reported as [`BmiError::InvalidState`].
    /// `disconnect` is always allowed.
    pub fn check(&self, operation: Operation) -> BmiResult<()> {
        use LifecycleState::*;

        let invalid = || BmiError::InvalidState {
            operation,
            state: self.state,
        };

        match (operation, self.state) {
            (Operation::Connect, Unconnected) => Ok(()),
            (Operation::Connect, _) => Err(invalid()),

            (Operation::Initialize, Connected) => Ok(()),
            (Operation::Initialize, Initialized | Running | Finalized) => {
                Err(BmiError::Initialization {
                    state: self.state,
                    reason: "model has already been initialized".to_string(),
                })
            }
            (Operation::Initialize, Unconnected) => Err(invalid()),

            (Operation::Query | Operation::Exchange, Initialized | Running) => Ok(()),
            (Operation::Query | Operation::Exchange, _) => Err(invalid()),

            (Operation::Update, Initialized | Running) => Ok(()),
            (Operation::Update, Unconnected | Connected) => Err(BmiError::Step {
                state: self.state,
                reason: "model has not been initialized".to_string(),
            }),
            (Operation::Update, Finalized) => Err(BmiError::Step {
                state: self.state,
                reason: "model has been finalized".to_string(),
            }),

            (Operation::Finalize, Initialized | Running) => Ok(()),
            (Operation::Finalize, Finalized) => Err(BmiError::AlreadyFinalized),
            (Operation::Finalize, Unconnected | Connected) => Err(invalid()),

            (Operation::Disconnect, _) => Ok(()),
        }
    }

    /// Records that `operation` completed successfully.
    ///
    /// Operations which do not change the phase leave the state untouched.
    pub fn advance(&mut self, operation: Operation) {
        self.state = match operation {
            Operation::Connect => LifecycleState::Connected,
            Operation::Initialize => LifecycleState::Initialized,
            Operation::Update => LifecycleState::Running,
            Operation::Finalize => LifecycleState::Finalized,
            Operation::Disconnect => LifecycleState::Unconnected,
            Operation::Query | Operation::Exchange => self.state,
        };
    }
}
