//! Ordered multi-candidate action sequencing.
//!
//! A composite player intent ("swing at whatever is in front of me") is an
//! ordered list of candidates — try to chop, else mine, else cut at the same
//! tile. Candidates run strictly one at a time: dispatch, await, and only on
//! a non-success advance to the next. The runner is an explicit cursor state
//! machine, so call depth stays constant however long the list is.

use crate::protocol::Outcome;

/// One way a composite action might be satisfied. Pure value: builds a
/// single proposal from the aimed tile and an equipment/inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionCandidate {
    pub action_kind: u8,
    pub x: i32,
    pub y: i32,
    pub slot: u8,
}

impl ActionCandidate {
    pub fn new(action_kind: u8, x: i32, y: i32, slot: u8) -> Self {
        Self {
            action_kind,
            x,
            y,
            slot,
        }
    }
}

/// Ordered candidate list for one composite action.
#[derive(Debug, Clone, Default)]
pub struct ActionSequence {
    candidates: Vec<ActionCandidate>,
}

impl ActionSequence {
    pub fn new(candidates: Vec<ActionCandidate>) -> Self {
        Self { candidates }
    }

    /// The degenerate one-candidate form used by single-shot actions.
    pub fn single(candidate: ActionCandidate) -> Self {
        Self {
            candidates: vec![candidate],
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Why a finished sequence stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// A candidate succeeded; the rest were never tried.
    Succeeded,
    /// Every candidate was tried and none succeeded.
    Exhausted,
    /// A newer request replaced the in-flight wait; the sequence stops
    /// rather than fight the flow that replaced it.
    Abandoned,
}

/// Final report for a finished sequence. `saw_timeout` separates "the
/// server never answered" from "every rule said no" — callers log the
/// former as an infrastructure diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceReport {
    pub outcome: SequenceOutcome,
    pub attempts: u32,
    pub saw_timeout: bool,
}

impl SequenceReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == SequenceOutcome::Succeeded
    }
}

/// What the driving flow should do next.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<'a> {
    /// Dispatch this candidate and await its outcome.
    Dispatch(&'a ActionCandidate),
    /// The sequence is over.
    Finished(SequenceReport),
}

/// Cursor state machine over an [`ActionSequence`].
///
/// Usage: call [`SequenceRunner::start`], dispatch/await the returned
/// candidate, feed the outcome to [`SequenceRunner::next_step`], repeat
/// until [`Step::Finished`].
#[derive(Debug, Clone)]
pub struct SequenceRunner {
    sequence: ActionSequence,
    cursor: usize,
    attempts: u32,
    saw_timeout: bool,
    finished: bool,
}

impl SequenceRunner {
    pub fn new(sequence: ActionSequence) -> Self {
        Self {
            sequence,
            cursor: 0,
            attempts: 0,
            saw_timeout: false,
            finished: false,
        }
    }

    /// Candidate the runner is currently on, if the sequence is unfinished.
    pub fn current(&self) -> Option<&ActionCandidate> {
        if self.finished {
            None
        } else {
            self.sequence.candidates.get(self.cursor)
        }
    }

    /// First step. An empty sequence finishes immediately as exhausted.
    pub fn start(&mut self) -> Step<'_> {
        if self.finished || self.sequence.candidates.is_empty() {
            self.finished = true;
            return Step::Finished(self.report(SequenceOutcome::Exhausted));
        }
        Step::Dispatch(&self.sequence.candidates[0])
    }

    /// Advance on the outcome of the candidate at the cursor.
    pub fn next_step(&mut self, last: Outcome) -> Step<'_> {
        if self.finished {
            return Step::Finished(self.report(SequenceOutcome::Exhausted));
        }
        self.attempts += 1;
        match last {
            Outcome::Success => {
                self.finished = true;
                Step::Finished(self.report(SequenceOutcome::Succeeded))
            }
            Outcome::Superseded => {
                self.finished = true;
                Step::Finished(self.report(SequenceOutcome::Abandoned))
            }
            Outcome::Failure | Outcome::TimedOut => {
                if last == Outcome::TimedOut {
                    self.saw_timeout = true;
                }
                self.cursor += 1;
                if self.cursor < self.sequence.candidates.len() {
                    Step::Dispatch(&self.sequence.candidates[self.cursor])
                } else {
                    self.finished = true;
                    Step::Finished(self.report(SequenceOutcome::Exhausted))
                }
            }
        }
    }

    fn report(&self, outcome: SequenceOutcome) -> SequenceReport {
        SequenceReport {
            outcome,
            attempts: self.attempts,
            saw_timeout: self.saw_timeout,
        }
    }
}
