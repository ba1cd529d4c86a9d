//! Phase state machine for the run pipeline.
//!
//! Extraction → Matching → Pricing, each gated by a review verdict. A
//! rejection loops the phase back with the critique as feedback until the
//! retry budget is spent, at which point the machine advances anyway
//! (forced advance). The transition function is total over
//! (phase, approved).

use serde::{Deserialize, Serialize};

/// Retries allowed per phase before a rejection stops blocking progress.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Extraction,
    Matching,
    Pricing,
}

impl Phase {
    pub fn next(self) -> Step {
        match self {
            Self::Extraction => Step::Phase(Self::Matching),
            Self::Matching => Step::Phase(Self::Pricing),
            Self::Pricing => Step::Complete,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Matching => "matching",
            Self::Pricing => "pricing",
        }
    }
}

/// Where the machine goes after a phase resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Phase(Phase),
    Complete,
}

/// Outcome of the review gate for one phase attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub approved: bool,
    pub critique: String,
}

impl Verdict {
    pub fn approved() -> Self {
        Self { approved: true, critique: String::new() }
    }

    pub fn rejected(critique: impl Into<String>) -> Self {
        Self { approved: false, critique: critique.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Re-enter the same phase carrying the critique as feedback.
    Retry { phase: Phase, retry_count: u32, feedback: String },
    /// Review approved; retry counter and feedback reset.
    Advance { next: Step },
    /// Retry budget exhausted; proceed despite the rejection. Callers
    /// must surface this distinctly from a genuine approval.
    ForceAdvance { next: Step },
}

#[derive(Clone, Copy, Debug)]
pub struct PhaseMachine {
    max_retries: u32,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES }
    }
}

impl PhaseMachine {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn decide(&self, phase: Phase, verdict: &Verdict, retry_count: u32) -> Transition {
        if verdict.approved {
            return Transition::Advance { next: phase.next() };
        }
        if retry_count + 1 <= self.max_retries {
            return Transition::Retry {
                phase,
                retry_count: retry_count + 1,
                feedback: verdict.critique.clone(),
            };
        }
        Transition::ForceAdvance { next: phase.next() }
    }
}

#[cfg(test)]
mod tests {
    use super::{Phase, PhaseMachine, Step, Transition, Verdict};

    #[test]
    fn approval_advances_through_every_phase_to_completion() {
        let machine = PhaseMachine::default();
        let approved = Verdict::approved();

        let mut step = Step::Phase(Phase::Extraction);
        let mut visited = Vec::new();
        while let Step::Phase(phase) = step {
            visited.push(phase);
            step = match machine.decide(phase, &approved, 0) {
                Transition::Advance { next } => next,
                other => panic!("approval must advance, got {other:?}"),
            };
        }

        assert_eq!(visited, vec![Phase::Extraction, Phase::Matching, Phase::Pricing]);
        assert_eq!(step, Step::Complete);
    }

    #[test]
    fn rejection_increments_retry_count_and_carries_feedback() {
        let machine = PhaseMachine::default();
        let verdict = Verdict::rejected("missing quantities");

        let mut retry_count = 0;
        for expected in 1..=3 {
            match machine.decide(Phase::Matching, &verdict, retry_count) {
                Transition::Retry { phase, retry_count: next, feedback } => {
                    assert_eq!(phase, Phase::Matching);
                    assert_eq!(next, expected);
                    assert_eq!(feedback, "missing quantities");
                    retry_count = next;
                }
                other => panic!("rejection {expected} must retry, got {other:?}"),
            }
        }
    }

    #[test]
    fn fourth_rejection_forces_advance_with_feedback_cleared() {
        let machine = PhaseMachine::default();
        let verdict = Verdict::rejected("still wrong");

        let transition = machine.decide(Phase::Extraction, &verdict, 3);
        assert_eq!(transition, Transition::ForceAdvance { next: Step::Phase(Phase::Matching) });
    }

    #[test]
    fn forced_advance_from_pricing_reaches_terminal_state() {
        let machine = PhaseMachine::new(1);
        let transition = machine.decide(Phase::Pricing, &Verdict::rejected("no"), 1);
        assert_eq!(transition, Transition::ForceAdvance { next: Step::Complete });
    }

    #[test]
    fn zero_budget_machine_never_retries() {
        let machine = PhaseMachine::new(0);
        let transition = machine.decide(Phase::Matching, &Verdict::rejected("no"), 0);
        assert_eq!(transition, Transition::ForceAdvance { next: Step::Phase(Phase::Pricing) });
    }
}
