//! Homestead Headless Simulation Harness
//!
//! Validates pure game and protocol logic without SpacetimeDB.
//! Runs entirely in-process — no DB, no networking, no rendering.
//!
//! Usage:
//!   cargo run -p homestead-simtest
//!   cargo run -p homestead-simtest -- --verbose

use homestead_logic::constants::{action_kinds, crop_kinds, items, node_kinds, tool_kinds};
use homestead_logic::crops::{self, WATERED_GROWTH_FACTOR};
use homestead_logic::fieldwork::{
    self, node_hardness, node_max_health, ApplyOutcome, NodeView, PlotBounds, TileView,
};
use homestead_logic::ledger::{self, CreditOutcome, DebitOutcome, MAX_BALANCE};
use homestead_logic::protocol::{Outcome, RequestSlot, WaitStatus, REQUEST_TIMEOUT_SECS};
use homestead_logic::sequence::{
    ActionCandidate, ActionSequence, SequenceOutcome, SequenceRunner, Step,
};
use homestead_logic::shop::{self, CatalogEntry};
use homestead_logic::tools::{Tool, MAX_CHARGE};

// ── Shop catalog (same JSON the server uses) ────────────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/shop_catalog.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Homestead Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Shop catalog validation
    results.extend(validate_shop_catalog(verbose));

    // 2. Treasury rules sweep
    results.extend(validate_ledger_rules(verbose));

    // 3. Request correlation: timeouts, stale responses, supersede
    results.extend(validate_request_correlation(verbose));

    // 4. Multi-candidate sequencing
    results.extend(validate_sequence_runner(verbose));

    // 5. Fieldwork validators
    results.extend(validate_fieldwork(verbose));

    // 6. Crop growth
    results.extend(validate_crop_growth(verbose));

    // 7. Full round trip against an in-memory authority
    results.extend(validate_authority_roundtrip(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Shop Catalog ─────────────────────────────────────────────────────

fn validate_shop_catalog(_verbose: bool) -> Vec<TestResult> {
    println!("--- Shop Catalog ---");
    let mut results = Vec::new();

    let catalog: Vec<CatalogEntry> = match serde_json::from_str(CATALOG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(check(
                "catalog_parse",
                false,
                format!("JSON parse error: {}", e),
            ));
            return results;
        }
    };

    results.push(check(
        "catalog_not_empty",
        catalog.len() >= 5,
        format!("{} entries loaded", catalog.len()),
    ));

    let problems = shop::validate_catalog(&catalog);
    results.push(check(
        "catalog_clean",
        problems.is_empty(),
        if problems.is_empty() {
            "no duplicate ids, all prices positive".into()
        } else {
            problems.join("; ")
        },
    ));

    // Every seed in the catalog must grow into a known crop.
    let bad_seeds: Vec<_> = catalog
        .iter()
        .filter(|e| e.category == "seed")
        .filter(|e| {
            homestead_logic::constants::seed_to_crop(e.item_id)
                .and_then(crops::spec)
                .is_none()
        })
        .collect();
    results.push(check(
        "catalog_seeds_grow",
        bad_seeds.is_empty(),
        if bad_seeds.is_empty() {
            "every listed seed maps to a crop spec".into()
        } else {
            format!("{} seeds with no crop spec", bad_seeds.len())
        },
    ));

    // Produce must sell for more than its seed costs, or farming never pays.
    let parsnip_seed = shop::find_entry(&catalog, items::PARSNIP_SEED);
    let parsnip = shop::find_entry(&catalog, items::PARSNIP);
    let profitable = match (parsnip_seed, parsnip) {
        (Some(seed), Some(produce)) => shop::sale_value(produce, 1) > seed.price,
        _ => false,
    };
    results.push(check(
        "catalog_parsnip_economy_pays",
        profitable,
        "one grown parsnip sells for more than its seed cost".into(),
    ));

    results
}

// ── 2. Treasury rules ───────────────────────────────────────────────────

fn validate_ledger_rules(_verbose: bool) -> Vec<TestResult> {
    println!("--- Treasury Rules ---");
    let mut results = Vec::new();

    // Overdraw: rejected, balance untouched.
    let rejected = matches!(
        ledger::try_debit(100, 150),
        DebitOutcome::Rejected { shortfall: 50 }
    );
    results.push(check(
        "debit_overdraw_rejected",
        rejected,
        "debit(150) on balance 100 rejects with shortfall 50".into(),
    ));

    // Exact debit empties the purse.
    let emptied = matches!(
        ledger::try_debit(100, 100),
        DebitOutcome::Applied { new_balance: 0 }
    );
    results.push(check(
        "debit_exact_balance",
        emptied,
        "debit(100) on balance 100 leaves 0".into(),
    ));

    // Negative amounts never pass.
    let negative_blocked = !ledger::try_debit(100, -5).applied()
        && !ledger::try_credit(100, -5).applied();
    results.push(check(
        "negative_amounts_blocked",
        negative_blocked,
        "negative debit and credit both reject".into(),
    ));

    // Credit clamps at the ceiling instead of failing.
    let clamped = matches!(
        ledger::try_credit(MAX_BALANCE - 10, 50),
        CreditOutcome::Applied {
            new_balance: MAX_BALANCE,
            clamped: true
        }
    );
    results.push(check(
        "credit_clamps_at_ceiling",
        clamped,
        format!("credit near ceiling clamps to {}", MAX_BALANCE),
    ));

    // Sweep: a debit that applies always leaves a non-negative balance.
    let mut sweep_ok = true;
    for balance in [0i64, 1, 50, 100, 1_000_000] {
        for amount in [0i64, 1, 49, 50, 51, 100, 1_000_001] {
            match ledger::try_debit(balance, amount) {
                DebitOutcome::Applied { new_balance } => {
                    if new_balance < 0 || new_balance != balance - amount {
                        sweep_ok = false;
                    }
                }
                DebitOutcome::Rejected { shortfall } => {
                    if amount <= balance || shortfall != amount - balance {
                        sweep_ok = false;
                    }
                }
            }
        }
    }
    results.push(check(
        "debit_sweep_consistent",
        sweep_ok,
        "35 balance/amount pairs behave".into(),
    ));

    results
}

// ── 3. Request correlation ──────────────────────────────────────────────

fn validate_request_correlation(_verbose: bool) -> Vec<TestResult> {
    println!("--- Request Correlation ---");
    let mut results = Vec::new();

    // Happy path: dispatch, deliver, poll.
    let mut slot = RequestSlot::new(1);
    let ticket = slot.begin(0.0, REQUEST_TIMEOUT_SECS);
    slot.deliver(ticket.seq, true);
    let resolved = slot.poll(ticket.seq, 0.1) == WaitStatus::Ready(Outcome::Success);
    results.push(check(
        "correlation_success_roundtrip",
        resolved && !slot.is_waiting(),
        "delivered verdict resolves the wait".into(),
    ));

    // Timeout, then a late response that must be dropped.
    let mut slot = RequestSlot::new(1);
    let ticket = slot.begin(0.0, REQUEST_TIMEOUT_SECS);
    let timed_out =
        slot.poll(ticket.seq, REQUEST_TIMEOUT_SECS + 0.001) == WaitStatus::Ready(Outcome::TimedOut);
    let late_dropped = !slot.deliver(ticket.seq, true);
    let stays_idle = slot.poll(ticket.seq, REQUEST_TIMEOUT_SECS + 1.0) == WaitStatus::Idle;
    results.push(check(
        "correlation_timeout_then_late_response",
        timed_out && late_dropped && stays_idle,
        "late verdict cannot resurrect a timed-out wait".into(),
    ));

    // Supersede: the replaced wait is told, the new wait is clean.
    let mut slot = RequestSlot::new(1);
    let first = slot.begin(0.0, REQUEST_TIMEOUT_SECS);
    let second = slot.begin(0.5, REQUEST_TIMEOUT_SECS);
    let old_informed = slot.poll(first.seq, 0.6) == WaitStatus::Ready(Outcome::Superseded);
    let new_waiting = slot.poll(second.seq, 0.6) == WaitStatus::Waiting;
    results.push(check(
        "correlation_supersede_reported",
        second.superseded && old_informed && new_waiting,
        "second dispatch reports and isolates the replaced wait".into(),
    ));

    // A verdict for a replaced request never leaks into the new wait.
    let mut slot = RequestSlot::new(1);
    let first = slot.begin(0.0, REQUEST_TIMEOUT_SECS);
    let second = slot.begin(0.5, REQUEST_TIMEOUT_SECS);
    let stale_dropped = !slot.deliver(first.seq, true);
    let still_waiting = slot.poll(second.seq, 0.6) == WaitStatus::Waiting;
    results.push(check(
        "correlation_stale_seq_dropped",
        stale_dropped && still_waiting,
        "stale sequence numbers are ignored".into(),
    ));

    results
}

// ── 4. Sequence runner ──────────────────────────────────────────────────

fn drive_runner(outcomes: &[Outcome]) -> (usize, SequenceOutcome, bool) {
    let sequence = ActionSequence::new(
        (0..outcomes.len() as u8)
            .map(|i| ActionCandidate::new(action_kinds::CHOP, 0, 0, i))
            .collect(),
    );
    let mut runner = SequenceRunner::new(sequence);
    let mut dispatched = 0usize;
    match runner.start() {
        Step::Finished(r) => return (0, r.outcome, r.saw_timeout),
        Step::Dispatch(_) => dispatched += 1,
    }
    for outcome in outcomes {
        match runner.next_step(*outcome) {
            Step::Dispatch(_) => dispatched += 1,
            Step::Finished(r) => return (dispatched, r.outcome, r.saw_timeout),
        }
    }
    unreachable!("script exhausted before the runner finished");
}

fn validate_sequence_runner(_verbose: bool) -> Vec<TestResult> {
    println!("--- Sequence Runner ---");
    let mut results = Vec::new();

    let (n, outcome, _) = drive_runner(&[Outcome::Failure, Outcome::Failure, Outcome::Success]);
    results.push(check(
        "sequence_third_candidate_wins",
        n == 3 && outcome == SequenceOutcome::Succeeded,
        format!("{} dispatches, ended {:?}", n, outcome),
    ));

    let (n, outcome, saw_timeout) =
        drive_runner(&[Outcome::Failure, Outcome::Failure, Outcome::Failure]);
    results.push(check(
        "sequence_exhausts_without_looping",
        n == 3 && outcome == SequenceOutcome::Exhausted && !saw_timeout,
        format!("{} dispatches, ended {:?}", n, outcome),
    ));

    let (_, outcome, saw_timeout) = drive_runner(&[Outcome::TimedOut, Outcome::Failure]);
    results.push(check(
        "sequence_flags_timeouts_distinctly",
        outcome == SequenceOutcome::Exhausted && saw_timeout,
        "timeout leaves a diagnostic flag, rejection does not".into(),
    ));

    let (n, outcome, _) = drive_runner(&[Outcome::Superseded]);
    results.push(check(
        "sequence_abandons_on_supersede",
        n == 1 && outcome == SequenceOutcome::Abandoned,
        "a superseded wait stops the whole sequence".into(),
    ));

    results
}

// ── 5. Fieldwork validators ─────────────────────────────────────────────

fn node(id: u64, x: i32, y: i32, kind: u8) -> NodeView {
    NodeView {
        id,
        x,
        y,
        kind,
        health: node_max_health(kind),
        hardness: node_hardness(kind),
    }
}

fn validate_fieldwork(_verbose: bool) -> Vec<TestResult> {
    println!("--- Fieldwork Validators ---");
    let mut results = Vec::new();

    let axe = Tool::new(tool_kinds::AXE, 1, MAX_CHARGE);
    let pickaxe = Tool::new(tool_kinds::PICKAXE, 1, MAX_CHARGE);

    // Capability filter: an axe never hits a rock.
    let rock = node(1, 5, 5, node_kinds::ROCK);
    let wrong = fieldwork::swing(action_kinds::MINE, 5, 5, &axe, &[rock]);
    results.push(check(
        "swing_rejects_wrong_tool",
        wrong == ApplyOutcome::WrongTool,
        "mining with an axe is refused before targeting".into(),
    ));

    // Spatial query: adjacent target found, far target ignored.
    let tree_far = node(2, 12, 12, node_kinds::TREE);
    let miss = fieldwork::swing(action_kinds::CHOP, 5, 5, &axe, &[tree_far]);
    let tree_near = node(3, 6, 5, node_kinds::TREE);
    let hit = fieldwork::swing(action_kinds::CHOP, 5, 5, &axe, &[tree_far, tree_near]);
    results.push(check(
        "swing_spatial_query",
        miss == ApplyOutcome::NoTarget && hit.applied(),
        "only targets within reach are eligible".into(),
    ));

    // Hardness gate: a tier-1 pickaxe cannot break a boulder.
    let boulder = node(4, 5, 5, node_kinds::BOULDER);
    let too_weak = fieldwork::swing(action_kinds::MINE, 5, 5, &pickaxe, &[boulder]);
    results.push(check(
        "swing_respects_hardness",
        too_weak == ApplyOutcome::ToolTooWeak,
        "boulder needs an upgraded pickaxe".into(),
    ));

    // Depletion drops and replacement: trees leave stumps.
    let mut dying_tree = node(5, 5, 5, node_kinds::TREE);
    dying_tree.health = 1.0;
    let felled = fieldwork::swing(action_kinds::CHOP, 5, 5, &axe, &[dying_tree]);
    let felled_ok = matches!(
        felled,
        ApplyOutcome::NodeDepleted {
            drop_item: items::WOOD,
            replaced_by: Some(node_kinds::STUMP),
            ..
        }
    );
    results.push(check(
        "chop_depletion_leaves_stump",
        felled_ok,
        "felled tree drops wood and leaves a stump".into(),
    ));

    // Tile lifecycle: grass → tilled → watered, each step validated.
    let bounds = PlotBounds {
        width: 16,
        height: 16,
    };
    let hoe = Tool::new(tool_kinds::HOE, 1, MAX_CHARGE);
    let can = Tool::new(tool_kinds::WATERING_CAN, 1, MAX_CHARGE);
    let tilled_ok = fieldwork::till(2, 2, &hoe, &bounds, &[], &[]) == ApplyOutcome::TileTilled;
    let tilled_tile = TileView {
        x: 2,
        y: 2,
        state: homestead_logic::constants::tile_states::TILLED,
    };
    let water_ok = fieldwork::water(2, 2, &can, &[tilled_tile]) == ApplyOutcome::TileWatered;
    let premature_water = fieldwork::water(3, 3, &can, &[]) == ApplyOutcome::NoTarget;
    results.push(check(
        "tile_lifecycle",
        tilled_ok && water_ok && premature_water,
        "till then water in order; watering grass refused".into(),
    ));

    // Charge gate: an empty tool swings nothing.
    let drained = Tool::new(tool_kinds::AXE, 1, 0.0);
    let tree = node(6, 5, 5, node_kinds::TREE);
    let exhausted = fieldwork::swing(action_kinds::CHOP, 5, 5, &drained, &[tree]);
    results.push(check(
        "swing_requires_charge",
        exhausted == ApplyOutcome::Exhausted,
        "drained tool is refused".into(),
    ));

    results
}

// ── 6. Crop growth ──────────────────────────────────────────────────────

fn validate_crop_growth(_verbose: bool) -> Vec<TestResult> {
    println!("--- Crop Growth ---");
    let mut results = Vec::new();

    let spec = crops::spec(crop_kinds::PARSNIP).expect("parsnip spec");

    let (stage, _) = crops::advance_growth(
        crop_kinds::PARSNIP,
        0,
        0.0,
        spec.secs_per_stage * spec.mature_stage as f64,
        false,
    );
    results.push(check(
        "crop_reaches_maturity",
        crops::is_mature(crop_kinds::PARSNIP, stage),
        format!("stage {} after full growth time", stage),
    ));

    let dry = crops::advance_growth(crop_kinds::PARSNIP, 0, 0.0, 40.0, false);
    let wet = crops::advance_growth(crop_kinds::PARSNIP, 0, 0.0, 40.0, true);
    let speedup = wet.1 / dry.1;
    results.push(check(
        "crop_watered_speedup",
        (speedup - WATERED_GROWTH_FACTOR).abs() < 0.001,
        format!("watered growth factor {:.2}", speedup),
    ));

    // Blueberries regrow below maturity; parsnips are pulled out whole.
    let blueberry_regrows = crops::after_harvest(crop_kinds::BLUEBERRY)
        .is_some_and(|s| !crops::is_mature(crop_kinds::BLUEBERRY, s));
    let parsnip_removed = crops::after_harvest(crop_kinds::PARSNIP).is_none();
    results.push(check(
        "crop_regrow_rules",
        blueberry_regrows && parsnip_removed,
        "blueberry regrows, parsnip does not".into(),
    ));

    let immature = fieldwork::harvest(
        0,
        0,
        &[fieldwork::CropView {
            id: 1,
            x: 0,
            y: 0,
            kind: crop_kinds::PARSNIP,
            stage: 1,
        }],
    );
    results.push(check(
        "crop_harvest_gated_on_maturity",
        immature == ApplyOutcome::NotReady,
        "immature crop refuses harvest".into(),
    ));

    results
}

// ── 7. Authority round trip ─────────────────────────────────────────────

/// Minimal in-memory authority: treasury plus per-actor result routing,
/// with a configurable response delay measured in ticks.
struct MiniAuthority {
    balance: i64,
    pending: Vec<(u64, u32, i64, u64)>, // (actor, seq, amount, due_tick)
    broadcasts: Vec<i64>,
    respond: bool,
}

impl MiniAuthority {
    fn new(balance: i64) -> Self {
        Self {
            balance,
            pending: Vec::new(),
            broadcasts: Vec::new(),
            respond: true,
        }
    }

    fn submit(&mut self, actor: u64, seq: u32, amount: i64, due_tick: u64) {
        self.pending.push((actor, seq, amount, due_tick));
    }

    fn process(&mut self, tick: u64, slots: &mut [RequestSlot]) {
        let due: Vec<_> = self
            .pending
            .iter()
            .copied()
            .filter(|&(_, _, _, t)| t <= tick)
            .collect();
        self.pending.retain(|&(_, _, _, t)| t > tick);
        for (actor, seq, amount, _) in due {
            let applied = match ledger::try_debit(self.balance, amount) {
                DebitOutcome::Applied { new_balance } => {
                    self.balance = new_balance;
                    self.broadcasts.push(new_balance);
                    true
                }
                DebitOutcome::Rejected { .. } => false,
            };
            if self.respond {
                if let Some(slot) = slots.iter_mut().find(|s| s.actor_id() == actor) {
                    slot.deliver(seq, applied);
                }
            }
        }
    }
}

fn validate_authority_roundtrip(_verbose: bool) -> Vec<TestResult> {
    println!("--- Authority Round Trip ---");
    let mut results = Vec::new();
    const TICK_SECS: f64 = 0.05;

    // Two actors, interleaved debits: each verdict reaches only its issuer.
    let mut authority = MiniAuthority::new(1_000);
    let mut slots = vec![RequestSlot::new(1), RequestSlot::new(2)];

    let a = slots[0].begin(0.0, REQUEST_TIMEOUT_SECS);
    authority.submit(1, a.seq, 300, 2);
    let b = slots[1].begin(0.0, REQUEST_TIMEOUT_SECS);
    authority.submit(2, b.seq, 900, 4); // will reject: only 700 left by then

    let mut outcome_a = None;
    let mut outcome_b = None;
    for tick in 1..=20u64 {
        authority.process(tick, &mut slots);
        let now = tick as f64 * TICK_SECS;
        if outcome_a.is_none() {
            if let WaitStatus::Ready(o) = slots[0].poll(a.seq, now) {
                outcome_a = Some(o);
            }
        }
        if outcome_b.is_none() {
            if let WaitStatus::Ready(o) = slots[1].poll(b.seq, now) {
                outcome_b = Some(o);
            }
        }
    }
    results.push(check(
        "roundtrip_interleaved_actors",
        outcome_a == Some(Outcome::Success)
            && outcome_b == Some(Outcome::Failure)
            && authority.balance == 700
            && authority.broadcasts == vec![700],
        format!(
            "A {:?}, B {:?}, balance {}",
            outcome_a, outcome_b, authority.balance
        ),
    ));

    // Unresponsive authority: the wait times out instead of hanging.
    let mut authority = MiniAuthority::new(100);
    authority.respond = false;
    let mut slots = vec![RequestSlot::new(1)];
    let t = slots[0].begin(0.0, REQUEST_TIMEOUT_SECS);
    authority.submit(1, t.seq, 10, 2);
    let mut outcome = None;
    for tick in 1..=200u64 {
        authority.process(tick, &mut slots);
        if let WaitStatus::Ready(o) = slots[0].poll(t.seq, tick as f64 * TICK_SECS) {
            outcome = Some(o);
            break;
        }
    }
    results.push(check(
        "roundtrip_timeout_on_silence",
        outcome == Some(Outcome::TimedOut),
        format!("ended {:?}", outcome),
    ));

    // Purchase flow: item granted only when the debit lands.
    let catalog: Vec<CatalogEntry> = serde_json::from_str(CATALOG_JSON).expect("catalog parses");
    let seeds = shop::find_entry(&catalog, items::PARSNIP_SEED).expect("seeds listed");
    let cost = shop::purchase_cost(seeds, 3).expect("cost computes");

    let mut authority = MiniAuthority::new(cost); // exactly enough for one buy
    let mut slots = vec![RequestSlot::new(1)];
    let mut granted = 0u32;

    for attempt in 0u64..2 {
        let t = slots[0].begin(attempt as f64, REQUEST_TIMEOUT_SECS);
        authority.submit(1, t.seq, cost, attempt * 2 + 1);
        for tick in (attempt * 2)..(attempt * 2 + 10) {
            authority.process(tick, &mut slots);
            match slots[0].poll(t.seq, tick as f64 * TICK_SECS) {
                WaitStatus::Ready(Outcome::Success) => {
                    granted += 3;
                    break;
                }
                WaitStatus::Ready(_) => break,
                _ => {}
            }
        }
    }
    results.push(check(
        "roundtrip_purchase_grants_on_success_only",
        granted == 3 && authority.balance == 0,
        format!("{} seeds granted, balance {}", granted, authority.balance),
    ));

    results
}
