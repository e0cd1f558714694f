//! Integration tests for the full authority round trip.
//!
//! Exercises: dispatch → authority validation → targeted result delivery
//! → per-tick polling, plus multi-candidate sequencing on top — all
//! in-process with a local authority standing in for the server.
//!
//! All tests are pure logic — no SpacetimeDB, no rendering.

use homestead_logic::constants::{action_kinds, items, node_kinds, tile_states, tool_kinds};
use homestead_logic::fieldwork::{
    self, node_hardness, node_max_health, NodeView, PlotBounds, TileView,
};
use homestead_logic::ledger::{self, CreditOutcome, DebitOutcome, MAX_BALANCE};
use homestead_logic::protocol::{
    ActorId, Outcome, RequestSlot, WaitStatus, REQUEST_TIMEOUT_SECS,
};
use homestead_logic::sequence::{
    ActionCandidate, ActionSequence, SequenceOutcome, SequenceReport, SequenceRunner, Step,
};
use homestead_logic::tools::{Tool, MAX_CHARGE};

const TICK_SECS: f64 = 0.05;

// ── Local authority ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Proposal {
    Debit { amount: i64 },
    Credit { amount: i64 },
    Apply(ActionCandidate),
}

struct InFlight {
    actor_id: ActorId,
    seq: u32,
    process_at_tick: u64,
    proposal: Proposal,
}

/// Owns the treasury and field state; processes proposals in arrival
/// order and routes each verdict to the issuing actor's slot only.
struct LocalAuthority {
    balance: i64,
    bounds: PlotBounds,
    nodes: Vec<NodeView>,
    tiles: Vec<TileView>,
    inbox: Vec<InFlight>,
    /// Simulated round-trip latency, in ticks.
    latency_ticks: u64,
    /// Drop every response on the floor (dead-server simulation).
    unresponsive: bool,
    /// Every committed balance, in commit order — the broadcast channel.
    broadcasts: Vec<i64>,
    targeted_responses: u32,
}

impl LocalAuthority {
    fn new(balance: i64) -> Self {
        Self {
            balance,
            bounds: PlotBounds {
                width: 16,
                height: 16,
            },
            nodes: Vec::new(),
            tiles: Vec::new(),
            inbox: Vec::new(),
            latency_ticks: 2,
            unresponsive: false,
            broadcasts: Vec::new(),
            targeted_responses: 0,
        }
    }

    fn process(&mut self, tick: u64, slots: &mut [RequestSlot]) {
        // Strictly in arrival order; the transport guarantee lives here.
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.inbox.len() {
            if self.inbox[i].process_at_tick <= tick {
                due.push(self.inbox.remove(i));
            } else {
                i += 1;
            }
        }
        for request in due {
            let applied = self.validate(&request.proposal);
            if self.unresponsive {
                continue;
            }
            // Credits have no failure case and get no targeted response.
            if matches!(request.proposal, Proposal::Credit { .. }) {
                continue;
            }
            self.targeted_responses += 1;
            if let Some(slot) = slots.iter_mut().find(|s| s.actor_id() == request.actor_id) {
                slot.deliver(request.seq, applied);
            }
        }
    }

    fn validate(&mut self, proposal: &Proposal) -> bool {
        match proposal {
            Proposal::Debit { amount } => match ledger::try_debit(self.balance, *amount) {
                DebitOutcome::Applied { new_balance } => {
                    self.balance = new_balance;
                    self.broadcasts.push(new_balance);
                    true
                }
                DebitOutcome::Rejected { .. } => false,
            },
            Proposal::Credit { amount } => match ledger::try_credit(self.balance, *amount) {
                CreditOutcome::Applied { new_balance, .. } => {
                    self.balance = new_balance;
                    self.broadcasts.push(new_balance);
                    true
                }
                CreditOutcome::Rejected => false,
            },
            Proposal::Apply(candidate) => {
                let tool = Tool::new(slot_tool_kind(candidate.slot), 1, MAX_CHARGE);
                let outcome = match candidate.action_kind {
                    action_kinds::CHOP | action_kinds::MINE | action_kinds::CUT => {
                        fieldwork::swing(
                            candidate.action_kind,
                            candidate.x,
                            candidate.y,
                            &tool,
                            &self.nodes,
                        )
                    }
                    action_kinds::TILL => fieldwork::till(
                        candidate.x,
                        candidate.y,
                        &tool,
                        &self.bounds,
                        &self.tiles,
                        &self.nodes,
                    ),
                    _ => fieldwork::ApplyOutcome::NoTarget,
                };
                if outcome == fieldwork::ApplyOutcome::TileTilled {
                    self.tiles.push(TileView {
                        x: candidate.x,
                        y: candidate.y,
                        state: tile_states::TILLED,
                    });
                }
                self.commit(&outcome);
                outcome.applied()
            }
        }
    }

    fn commit(&mut self, outcome: &fieldwork::ApplyOutcome) {
        match *outcome {
            fieldwork::ApplyOutcome::NodeDamaged { node_id, remaining } => {
                if let Some(n) = self.nodes.iter_mut().find(|n| n.id == node_id) {
                    n.health = remaining;
                }
            }
            fieldwork::ApplyOutcome::NodeDepleted {
                node_id,
                replaced_by,
                ..
            } => {
                if let Some(n) = self.nodes.iter_mut().find(|n| n.id == node_id) {
                    match replaced_by {
                        Some(kind) => {
                            n.kind = kind;
                            n.health = node_max_health(kind);
                            n.hardness = node_hardness(kind);
                        }
                        None => n.health = 0.0,
                    }
                }
            }
            _ => {}
        }
    }
}

/// Equipment layout shared by all test actors: slot ↔ tool kind.
fn slot_tool_kind(slot: u8) -> u8 {
    match slot {
        0 => tool_kinds::AXE,
        1 => tool_kinds::PICKAXE,
        2 => tool_kinds::SCYTHE,
        3 => tool_kinds::HOE,
        _ => tool_kinds::WATERING_CAN,
    }
}

fn tree(id: u64, x: i32, y: i32) -> NodeView {
    NodeView {
        id,
        x,
        y,
        kind: node_kinds::TREE,
        health: node_max_health(node_kinds::TREE),
        hardness: node_hardness(node_kinds::TREE),
    }
}

// ── Harness: cooperative tick loop over actors + authority ─────────────

struct Harness {
    authority: LocalAuthority,
    slots: Vec<RequestSlot>,
    tick: u64,
}

impl Harness {
    fn new(authority: LocalAuthority, actor_ids: &[ActorId]) -> Self {
        Self {
            authority,
            slots: actor_ids.iter().map(|&id| RequestSlot::new(id)).collect(),
            tick: 0,
        }
    }

    fn now(&self) -> f64 {
        self.tick as f64 * TICK_SECS
    }

    fn step(&mut self) {
        self.tick += 1;
        self.authority.process(self.tick, &mut self.slots);
    }

    fn dispatch(&mut self, actor: usize, proposal: Proposal) -> u32 {
        let now = self.now();
        let ticket = self.slots[actor].begin(now, REQUEST_TIMEOUT_SECS);
        self.authority.inbox.push(InFlight {
            actor_id: self.slots[actor].actor_id(),
            seq: ticket.seq,
            process_at_tick: self.tick + self.authority.latency_ticks,
            proposal,
        });
        ticket.seq
    }

    /// Tick until the wait resolves. Panics rather than spin forever.
    fn await_outcome(&mut self, actor: usize, seq: u32) -> Outcome {
        for _ in 0..10_000 {
            self.step();
            let now = self.now();
            match self.slots[actor].poll(seq, now) {
                WaitStatus::Ready(outcome) => return outcome,
                WaitStatus::Waiting => {}
                WaitStatus::Idle => panic!("polled an idle slot"),
            }
        }
        panic!("wait never resolved");
    }

    /// Dispatch-and-await every candidate the runner asks for.
    fn run_sequence(&mut self, actor: usize, sequence: ActionSequence) -> SequenceReport {
        let mut runner = SequenceRunner::new(sequence);
        let mut candidate = match runner.start() {
            Step::Dispatch(c) => *c,
            Step::Finished(report) => return report,
        };
        loop {
            let seq = self.dispatch(actor, Proposal::Apply(candidate));
            let outcome = self.await_outcome(actor, seq);
            match runner.next_step(outcome) {
                Step::Dispatch(c) => candidate = *c,
                Step::Finished(report) => return report,
            }
        }
    }
}

// ── Ledger round trips ─────────────────────────────────────────────────

#[test]
fn debit_roundtrip_commits_and_broadcasts_once() {
    let mut h = Harness::new(LocalAuthority::new(100), &[1]);
    let seq = h.dispatch(0, Proposal::Debit { amount: 40 });
    assert_eq!(h.await_outcome(0, seq), Outcome::Success);
    assert_eq!(h.authority.balance, 60);
    assert_eq!(h.authority.broadcasts, vec![60]);
    assert_eq!(h.authority.targeted_responses, 1);
}

#[test]
fn overdraw_rejected_without_broadcast() {
    let mut h = Harness::new(LocalAuthority::new(100), &[1]);
    let seq = h.dispatch(0, Proposal::Debit { amount: 150 });
    assert_eq!(h.await_outcome(0, seq), Outcome::Failure);
    assert_eq!(h.authority.balance, 100);
    assert!(h.authority.broadcasts.is_empty());
}

#[test]
fn exact_balance_debit_empties_treasury() {
    let mut h = Harness::new(LocalAuthority::new(100), &[1]);
    let seq = h.dispatch(0, Proposal::Debit { amount: 100 });
    assert_eq!(h.await_outcome(0, seq), Outcome::Success);
    assert_eq!(h.authority.balance, 0);
    assert_eq!(h.authority.broadcasts, vec![0]);
}

#[test]
fn credit_broadcasts_but_never_responds() {
    let mut h = Harness::new(LocalAuthority::new(10), &[1]);
    // Fire-and-forget: credits have no failure case, so no wait.
    h.authority.inbox.push(InFlight {
        actor_id: 1,
        seq: 0,
        process_at_tick: 1,
        proposal: Proposal::Credit { amount: 50 },
    });
    for _ in 0..4 {
        h.step();
    }
    assert_eq!(h.authority.balance, 60);
    assert_eq!(h.authority.broadcasts, vec![60]);
    assert_eq!(h.authority.targeted_responses, 0);
}

#[test]
fn credit_near_ceiling_clamps() {
    let mut h = Harness::new(LocalAuthority::new(MAX_BALANCE - 10), &[1]);
    h.authority.inbox.push(InFlight {
        actor_id: 1,
        seq: 0,
        process_at_tick: 1,
        proposal: Proposal::Credit { amount: 50 },
    });
    for _ in 0..4 {
        h.step();
    }
    assert_eq!(h.authority.balance, MAX_BALANCE);
    assert_eq!(h.authority.broadcasts, vec![MAX_BALANCE]);
}

// ── Timeouts and stale responses ───────────────────────────────────────

#[test]
fn dead_authority_times_out() {
    let mut authority = LocalAuthority::new(100);
    authority.unresponsive = true;
    let mut h = Harness::new(authority, &[1]);
    let seq = h.dispatch(0, Proposal::Debit { amount: 10 });
    assert_eq!(h.await_outcome(0, seq), Outcome::TimedOut);
    // The debit was validated server-side; only the response vanished.
    // The client-side flow still must not treat it as success.
    assert_eq!(h.authority.balance, 90);
}

#[test]
fn response_after_deadline_is_dropped() {
    let mut authority = LocalAuthority::new(100);
    // Round trip longer than the timeout window.
    authority.latency_ticks = (REQUEST_TIMEOUT_SECS / TICK_SECS) as u64 + 50;
    let mut h = Harness::new(authority, &[1]);
    let seq = h.dispatch(0, Proposal::Debit { amount: 10 });
    assert_eq!(h.await_outcome(0, seq), Outcome::TimedOut);

    // Let the late response arrive; the resolved wait must stay resolved.
    for _ in 0..100 {
        h.step();
    }
    let now = h.now();
    assert_eq!(h.slots[0].poll(seq, now), WaitStatus::Idle);
}

// ── Targeting: results reach only the issuing actor ────────────────────

#[test]
fn results_route_only_to_issuing_actor() {
    let mut authority = LocalAuthority::new(1_000);
    authority.latency_ticks = 1;
    let mut h = Harness::new(authority, &[1, 2]);

    let seq_a = h.dispatch(0, Proposal::Debit { amount: 100 });
    // B dispatches later, so B is still waiting when A's result lands.
    h.authority.latency_ticks = 500;
    let seq_b = h.dispatch(1, Proposal::Debit { amount: 100 });

    assert_eq!(h.await_outcome(0, seq_a), Outcome::Success);
    // A's resolution must not have touched B's wait.
    let now = h.now();
    assert_eq!(h.slots[1].poll(seq_b, now), WaitStatus::Waiting);
    // Both actors observed the same broadcast stream.
    assert_eq!(h.authority.broadcasts, vec![900]);
}

// ── Multi-candidate sequences ──────────────────────────────────────────

fn swing_candidates(x: i32, y: i32) -> ActionSequence {
    ActionSequence::new(vec![
        ActionCandidate::new(action_kinds::CUT, x, y, 2),
        ActionCandidate::new(action_kinds::MINE, x, y, 1),
        ActionCandidate::new(action_kinds::CHOP, x, y, 0),
    ])
}

#[test]
fn sequence_reaches_third_candidate_in_order() {
    let mut authority = LocalAuthority::new(0);
    authority.nodes.push(tree(1, 5, 5));
    let mut h = Harness::new(authority, &[1]);

    // No bush, no rock — cut and mine fail, chop lands.
    let report = h.run_sequence(0, swing_candidates(5, 5));
    assert_eq!(report.outcome, SequenceOutcome::Succeeded);
    assert_eq!(report.attempts, 3);
    assert!(!report.saw_timeout);
    assert_eq!(h.authority.targeted_responses, 3);
    // The tree took exactly one swing of damage.
    let tree = h.authority.nodes.iter().find(|n| n.id == 1).unwrap();
    assert!(tree.health < node_max_health(node_kinds::TREE));
}

#[test]
fn all_failing_sequence_stops_after_len_roundtrips() {
    let mut h = Harness::new(LocalAuthority::new(0), &[1]);
    // Empty world: every candidate is rejected.
    let report = h.run_sequence(0, swing_candidates(5, 5));
    assert_eq!(report.outcome, SequenceOutcome::Exhausted);
    assert_eq!(report.attempts, 3);
    assert!(!report.saw_timeout);
    assert_eq!(h.authority.targeted_responses, 3);
}

#[test]
fn sequence_timeout_is_reported_distinctly() {
    let mut authority = LocalAuthority::new(0);
    authority.unresponsive = true;
    let mut h = Harness::new(authority, &[1]);
    let report = h.run_sequence(
        0,
        ActionSequence::single(ActionCandidate::new(action_kinds::CUT, 5, 5, 2)),
    );
    assert_eq!(report.outcome, SequenceOutcome::Exhausted);
    assert!(report.saw_timeout, "timeout must be flagged for diagnostics");
}

// ── Purchase flow: the degenerate one-candidate form ───────────────────

#[test]
fn purchase_grants_item_only_on_successful_debit() {
    let price = 80;
    let mut h = Harness::new(LocalAuthority::new(100), &[1]);
    let mut inventory: Vec<u16> = Vec::new();

    // Attempt 1: covered. Debit, then the dependent effect.
    let seq = h.dispatch(0, Proposal::Debit { amount: price });
    if h.await_outcome(0, seq).is_success() {
        inventory.push(items::PARSNIP_SEED);
    }
    assert_eq!(inventory, vec![items::PARSNIP_SEED]);
    assert_eq!(h.authority.balance, 20);

    // Attempt 2: short 60 coins. Nothing granted, nothing mutated.
    let seq = h.dispatch(0, Proposal::Debit { amount: price });
    if h.await_outcome(0, seq).is_success() {
        inventory.push(items::PARSNIP_SEED);
    }
    assert_eq!(inventory.len(), 1);
    assert_eq!(h.authority.balance, 20);
    assert_eq!(h.authority.broadcasts, vec![20]);
}

// ── Tile work over the wire ────────────────────────────────────────────

#[test]
fn till_roundtrip_applies_through_protocol() {
    let mut h = Harness::new(LocalAuthority::new(0), &[1]);
    let seq = h.dispatch(
        0,
        Proposal::Apply(ActionCandidate::new(action_kinds::TILL, 2, 2, 3)),
    );
    assert_eq!(h.await_outcome(0, seq), Outcome::Success);
}
