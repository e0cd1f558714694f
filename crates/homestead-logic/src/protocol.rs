//! Per-actor request correlation — dispatch, delivery, timeout.
//!
//! Every state-changing action is proposed to the authoritative server and
//! resolves asynchronously. Each actor owns exactly one [`RequestSlot`]: a
//! record of the single in-flight request, armed at dispatch and resolved by
//! either the server's targeted response or the deadline passing. Waiting is
//! cooperative — the flow that dispatched calls [`RequestSlot::poll`] once
//! per tick and everything else keeps running.
//!
//! A response is matched to its request by sequence number. A response
//! carrying any other sequence number is dropped on the floor, so a late
//! reply can never resurrect a wait that already timed out.

/// Stable per-session identifier of a requesting participant.
pub type ActorId = u64;

/// Sim-time seconds an in-flight request may wait before it resolves
/// `TimedOut`. A timeout means the server never answered — an
/// infrastructure problem, not a rule rejection.
pub const REQUEST_TIMEOUT_SECS: f64 = 5.0;

/// How a proposed action ultimately resolved for the flow that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server validated and applied the action.
    Success,
    /// The server declined the action; nothing was mutated.
    Failure,
    /// No response arrived before the deadline.
    TimedOut,
    /// A newer request from the same actor replaced this one mid-wait.
    Superseded,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

/// Handed back by [`RequestSlot::begin`]: the sequence number to wait on,
/// and whether arming the slot replaced a still-unresolved request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTicket {
    pub seq: u32,
    pub superseded: bool,
}

/// What a waiting flow observes on each poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// No request in flight for the polled sequence number.
    Idle,
    /// Still waiting — poll again next tick.
    Waiting,
    /// Resolved; the slot is disarmed and ready for the next dispatch.
    Ready(Outcome),
}

#[derive(Debug, Clone, Copy)]
struct LiveRequest {
    seq: u32,
    deadline: f64,
}

/// Per-actor record of the one in-flight request.
///
/// Latest-wins on purpose: dispatching while a request is unresolved arms
/// the slot for the new request and the old wait observes
/// [`Outcome::Superseded`] on its next poll. A newer player intent beats a
/// stale one, but the replaced flow always finds out.
#[derive(Debug, Clone)]
pub struct RequestSlot {
    actor_id: ActorId,
    next_seq: u32,
    live: Option<LiveRequest>,
    /// Single-slot mailbox the result notifier writes into: (seq, applied).
    response: Option<(u32, bool)>,
}

impl RequestSlot {
    pub fn new(actor_id: ActorId) -> Self {
        Self {
            actor_id,
            next_seq: 0,
            live: None,
            response: None,
        }
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn is_waiting(&self) -> bool {
        self.live.is_some()
    }

    /// Sequence number of the in-flight request, if any.
    pub fn current_seq(&self) -> Option<u32> {
        self.live.map(|l| l.seq)
    }

    /// Arm the slot for a new request. The caller transmits the proposal
    /// tagged with the returned sequence number, then polls with it.
    pub fn begin(&mut self, now: f64, timeout: f64) -> DispatchTicket {
        let superseded = self.live.is_some();
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.live = Some(LiveRequest {
            seq,
            deadline: now + timeout,
        });
        // Any undelivered response belonged to the replaced request.
        self.response = None;
        DispatchTicket { seq, superseded }
    }

    /// Result-notifier entry point: record the server's verdict for the
    /// request tagged `seq`. Returns whether the delivery was accepted;
    /// stale or unsolicited sequence numbers are ignored.
    pub fn deliver(&mut self, seq: u32, applied: bool) -> bool {
        match self.live {
            Some(live) if live.seq == seq => {
                self.response = Some((seq, applied));
                true
            }
            _ => false,
        }
    }

    /// One correlator tick for the flow waiting on `seq`.
    ///
    /// A delivered response wins over an expired deadline on the same tick.
    /// Once this returns [`WaitStatus::Ready`] the slot is disarmed; further
    /// polls report [`WaitStatus::Idle`].
    pub fn poll(&mut self, seq: u32, now: f64) -> WaitStatus {
        let Some(live) = self.live else {
            return WaitStatus::Idle;
        };
        if live.seq != seq {
            // A newer dispatch took the slot out from under this wait.
            return WaitStatus::Ready(Outcome::Superseded);
        }
        if let Some((resp_seq, applied)) = self.response.take() {
            if resp_seq == live.seq {
                self.live = None;
                let outcome = if applied {
                    Outcome::Success
                } else {
                    Outcome::Failure
                };
                return WaitStatus::Ready(outcome);
            }
            // deliver() filters mismatches; a stale pair here is unreachable
            // but must not resolve the wait.
        }
        if now >= live.deadline {
            self.live = None;
            return WaitStatus::Ready(Outcome::TimedOut);
        }
        WaitStatus::Waiting
    }
}
