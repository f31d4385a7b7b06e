use std::fmt;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Building,
    AwaitingProvider,
    Redirecting,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Redirecting | Stage::Failed)
    }

    fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Idle, Building)
                | (Building, AwaitingProvider)
                | (Building, Failed)
                | (AwaitingProvider, Redirecting)
                | (AwaitingProvider, Failed)
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Building => "building",
            Stage::AwaitingProvider => "awaiting_provider",
            Stage::Redirecting => "redirecting",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("submission cannot move from {from} to {to}")]
pub struct IllegalTransition {
    pub from: Stage,
    pub to: Stage,
}

/// One checkout attempt. A failed attempt stays failed; retrying means
/// starting a new `Submission`.
#[derive(Debug)]
pub struct Submission {
    id: Uuid,
    stage: Stage,
}

impl Submission {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: Stage::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn advance(&mut self, next: Stage) -> Result<(), IllegalTransition> {
        if !self.stage.can_advance_to(next) {
            return Err(IllegalTransition {
                from: self.stage,
                to: next,
            });
        }
        debug!(submission = %self.id, from = %self.stage, to = %next, "submission stage");
        self.stage = next;
        Ok(())
    }

    /// Marks the attempt failed from whatever non-terminal stage it is in.
    pub fn fail(&mut self) {
        if !self.stage.is_terminal() {
            debug!(submission = %self.id, from = %self.stage, "submission failed");
            self.stage = Stage::Failed;
        }
    }
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}
