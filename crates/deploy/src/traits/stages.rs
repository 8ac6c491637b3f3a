//! Deployment stages for the type-state pattern.
//!
//! The deployment order is fixed: NotStarted -> FactoryResolved -> Submitted -> Confirmed -> Reported.
//! Each stage carries what the following stage needs, so a stage can only be entered
//! with the output of the one before it.

use crate::{ContractFactory, DeploymentHandle, DeploymentResult};

/// Observable state of a deployment run.
///
/// `Failed` is reachable from every non-terminal state; `Reported` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DeploymentState {
    NotStarted,
    FactoryResolved,
    Submitted,
    Confirmed,
    Reported,
    Failed,
}

impl DeploymentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentState::Reported | DeploymentState::Failed)
    }
}

/// Nothing has happened yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotStarted;

/// The contract factory has been resolved from the compiled artifacts.
#[derive(Debug, Clone)]
pub struct FactoryResolved {
    pub factory: ContractFactory,
}

/// The deployment transaction is in the network's pending pool.
#[derive(Debug)]
pub struct Submitted {
    pub handle: DeploymentHandle,
}

/// The deployment transaction is included in a final block.
#[derive(Debug, Clone)]
pub struct Confirmed {
    pub result: DeploymentResult,
}

/// The deployed address has been emitted.
#[derive(Debug, Clone)]
pub struct Reported {
    pub result: DeploymentResult,
}

/// Sealed trait for deployment stages.
mod sealed {
    pub trait Sealed {}
    impl Sealed for super::NotStarted {}
    impl Sealed for super::FactoryResolved {}
    impl Sealed for super::Submitted {}
    impl Sealed for super::Confirmed {}
    impl Sealed for super::Reported {}
}

/// Marker trait for valid deployment stages.
pub trait DeploymentStage: sealed::Sealed + Send + 'static {
    /// The run state this stage corresponds to.
    const STATE: DeploymentState;
}

impl DeploymentStage for NotStarted {
    const STATE: DeploymentState = DeploymentState::NotStarted;
}

impl DeploymentStage for FactoryResolved {
    const STATE: DeploymentState = DeploymentState::FactoryResolved;
}

impl DeploymentStage for Submitted {
    const STATE: DeploymentState = DeploymentState::Submitted;
}

impl DeploymentStage for Confirmed {
    const STATE: DeploymentState = DeploymentState::Confirmed;
}

impl DeploymentStage for Reported {
    const STATE: DeploymentState = DeploymentState::Reported;
}

/// Trait encoding valid stage transitions.
///
/// This is implemented only for valid transitions:
/// - NotStarted -> FactoryResolved
/// - FactoryResolved -> Submitted
/// - Submitted -> Confirmed
/// - Confirmed -> Reported
pub trait NextStage: DeploymentStage {
    type Next: DeploymentStage;
}

impl NextStage for NotStarted {
    type Next = FactoryResolved;
}

impl NextStage for FactoryResolved {
    type Next = Submitted;
}

impl NextStage for Submitted {
    type Next = Confirmed;
}

impl NextStage for Confirmed {
    type Next = Reported;
}

// Reported has no NextStage impl - it's terminal

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names() {
        assert_eq!(DeploymentState::NotStarted.to_string(), "not_started");
        assert_eq!(DeploymentState::FactoryResolved.to_string(), "factory_resolved");
        assert_eq!("failed".parse::<DeploymentState>().unwrap(), DeploymentState::Failed);
    }

    #[test]
    fn test_terminal_states() {
        assert!(DeploymentState::Reported.is_terminal());
        assert!(DeploymentState::Failed.is_terminal());
        assert!(!DeploymentState::Submitted.is_terminal());
        assert!(!DeploymentState::NotStarted.is_terminal());
    }

    #[test]
    fn test_stage_chain_order() {
        fn next_state<S: NextStage>() -> DeploymentState {
            <S::Next as DeploymentStage>::STATE
        }

        assert_eq!(next_state::<NotStarted>(), DeploymentState::FactoryResolved);
        assert_eq!(next_state::<FactoryResolved>(), DeploymentState::Submitted);
        assert_eq!(next_state::<Submitted>(), DeploymentState::Confirmed);
        assert_eq!(next_state::<Confirmed>(), DeploymentState::Reported);
    }
}
