#![forbid(unsafe_code)]

//! Move-submission lifecycle.
//!
//! At most one `/play` request may be in flight, ever — the page's buttons
//! fire faster than the network answers, and a doubled move desynchronizes
//! the client from the server's turn order. [`MoveFlow`] is the single
//! guard: events in, `(state, actions)` out. The host executes the actions
//! (disable buttons, send the request) and feeds the outcome back in.
//!
//! Every event is recorded in a bounded transition trace, drainable as
//! JSONL, so a host can see exactly which clicks were swallowed and why.

use serde::Serialize;

/// Maximum retained transitions; older entries are dropped first.
const MAX_TRACE_TRANSITIONS: usize = 256;

/// Lifecycle state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    /// No request in flight; clicks submit.
    #[default]
    Idle,
    /// A request for `col` is in flight; clicks are swallowed.
    AwaitingReply { col: u16 },
    /// The game ended; the board stays frozen until [`MoveEvent::Reset`].
    Finished,
}

/// Inputs to the lifecycle machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveEvent {
    /// The user clicked a column button.
    SubmitRequested { col: u16 },
    /// The server accepted the move; `finished` mirrors the reply's
    /// end-of-game flag.
    ReplyAccepted { finished: bool },
    /// The server rejected the move (HTTP error or undecodable reply).
    ReplyRejected,
    /// The fetch itself failed (network down, CORS, …).
    TransportFailed,
    /// Return to a playable state (new game).
    Reset,
}

/// Side effects the host must perform, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAction {
    DisableColumns,
    EnableColumns,
    SendRequest { col: u16 },
}

/// One recorded transition. Ignored events are recorded too (`to == from`,
/// no actions): a swallowed double-click is exactly what a trace is for.
#[derive(Debug, Clone, Serialize)]
pub struct MoveTransition {
    pub seq: u64,
    pub from: MoveState,
    pub event: MoveEvent,
    pub to: MoveState,
    pub actions: Vec<MoveAction>,
}

fn push_bounded<T>(queue: &mut Vec<T>, item: T, limit: usize) {
    if queue.len() >= limit {
        let overflow = queue.len() - limit + 1;
        queue.drain(..overflow);
    }
    queue.push(item);
}

/// The lifecycle machine.
#[derive(Debug, Default)]
pub struct MoveFlow {
    state: MoveState,
    next_seq: u64,
    trace: Vec<MoveTransition>,
}

impl MoveFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> MoveState {
        self.state
    }

    /// Feed one event; returns the actions the host must perform, in order.
    pub fn handle_event(&mut self, event: MoveEvent) -> Vec<MoveAction> {
        let from = self.state;
        let (to, actions) = match (from, event) {
            (MoveState::Idle, MoveEvent::SubmitRequested { col }) => (
                MoveState::AwaitingReply { col },
                vec![MoveAction::DisableColumns, MoveAction::SendRequest { col }],
            ),
            (MoveState::AwaitingReply { .. }, MoveEvent::ReplyAccepted { finished: true }) => {
                (MoveState::Finished, Vec::new())
            }
            (MoveState::AwaitingReply { .. }, MoveEvent::ReplyAccepted { finished: false }) => {
                (MoveState::Idle, vec![MoveAction::EnableColumns])
            }
            // A failed move must never wedge the board.
            (
                MoveState::AwaitingReply { .. },
                MoveEvent::ReplyRejected | MoveEvent::TransportFailed,
            ) => (MoveState::Idle, vec![MoveAction::EnableColumns]),
            (_, MoveEvent::Reset) => (MoveState::Idle, vec![MoveAction::EnableColumns]),
            // Everything else is swallowed: double-clicks while awaiting,
            // stray replies while idle, clicks after the game ended.
            (state, _) => (state, Vec::new()),
        };

        self.state = to;
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        push_bounded(
            &mut self.trace,
            MoveTransition {
                seq,
                from,
                event,
                to,
                actions: actions.clone(),
            },
            MAX_TRACE_TRANSITIONS,
        );
        actions
    }

    /// Drain the transition trace as JSONL (one transition per line).
    pub fn drain_trace_jsonl(&mut self) -> String {
        let lines: Vec<String> = self
            .trace
            .drain(..)
            .filter_map(|t| serde_json::to_string(&t).ok())
            .collect();
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn submit_disables_then_sends() {
        let mut flow = MoveFlow::new();
        let actions = flow.handle_event(MoveEvent::SubmitRequested { col: 3 });
        assert_eq!(
            actions,
            vec![MoveAction::DisableColumns, MoveAction::SendRequest { col: 3 }]
        );
        assert_eq!(flow.state(), MoveState::AwaitingReply { col: 3 });
    }

    #[test]
    fn double_click_is_swallowed() {
        let mut flow = MoveFlow::new();
        flow.handle_event(MoveEvent::SubmitRequested { col: 3 });
        let actions = flow.handle_event(MoveEvent::SubmitRequested { col: 4 });
        assert_eq!(actions, Vec::new());
        assert_eq!(flow.state(), MoveState::AwaitingReply { col: 3 });
    }

    #[test]
    fn rejection_reenables() {
        let mut flow = MoveFlow::new();
        flow.handle_event(MoveEvent::SubmitRequested { col: 0 });
        let actions = flow.handle_event(MoveEvent::ReplyRejected);
        assert_eq!(actions, vec![MoveAction::EnableColumns]);
        assert_eq!(flow.state(), MoveState::Idle);
    }

    #[test]
    fn transport_failure_reenables() {
        let mut flow = MoveFlow::new();
        flow.handle_event(MoveEvent::SubmitRequested { col: 0 });
        let actions = flow.handle_event(MoveEvent::TransportFailed);
        assert_eq!(actions, vec![MoveAction::EnableColumns]);
        assert_eq!(flow.state(), MoveState::Idle);
    }

    #[test]
    fn finished_game_freezes_the_board() {
        let mut flow = MoveFlow::new();
        flow.handle_event(MoveEvent::SubmitRequested { col: 6 });
        let actions = flow.handle_event(MoveEvent::ReplyAccepted { finished: true });
        assert_eq!(actions, Vec::new());
        assert_eq!(flow.state(), MoveState::Finished);

        // Clicks after the end do nothing.
        let actions = flow.handle_event(MoveEvent::SubmitRequested { col: 0 });
        assert_eq!(actions, Vec::new());
        assert_eq!(flow.state(), MoveState::Finished);
    }

    #[test]
    fn reset_restores_play_from_any_state() {
        let mut flow = MoveFlow::new();
        flow.handle_event(MoveEvent::SubmitRequested { col: 1 });
        flow.handle_event(MoveEvent::ReplyAccepted { finished: true });
        let actions = flow.handle_event(MoveEvent::Reset);
        assert_eq!(actions, vec![MoveAction::EnableColumns]);
        assert_eq!(flow.state(), MoveState::Idle);
    }

    #[test]
    fn ignored_events_are_traced() {
        let mut flow = MoveFlow::new();
        flow.handle_event(MoveEvent::SubmitRequested { col: 2 });
        flow.handle_event(MoveEvent::SubmitRequested { col: 2 });
        let jsonl = flow.drain_trace_jsonl();
        assert_eq!(jsonl.lines().count(), 2);
        assert!(jsonl.lines().nth(1).expect("second line").contains("\"actions\":[]"));

        // Draining empties the trace.
        assert_eq!(flow.drain_trace_jsonl(), "");
    }

    proptest! {
        #[test]
        fn at_most_one_request_in_flight(events in prop::collection::vec(0_u8..5, 0..400)) {
            let mut flow = MoveFlow::new();
            let mut in_flight = 0_i32;
            for raw in events {
                let event = match raw {
                    0 => MoveEvent::SubmitRequested { col: 1 },
                    1 => MoveEvent::ReplyAccepted { finished: false },
                    2 => MoveEvent::ReplyRejected,
                    3 => MoveEvent::TransportFailed,
                    _ => MoveEvent::Reset,
                };
                let actions = flow.handle_event(event);
                for action in actions {
                    if matches!(action, MoveAction::SendRequest { .. }) {
                        in_flight += 1;
                    }
                }
                if !matches!(flow.state(), MoveState::AwaitingReply { .. }) {
                    in_flight -= in_flight.min(1);
                }
                prop_assert!(in_flight <= 1);
            }
        }

        #[test]
        fn trace_stays_bounded(count in 0_usize..1000) {
            let mut flow = MoveFlow::new();
            for _ in 0..count {
                flow.handle_event(MoveEvent::Reset);
            }
            let jsonl = flow.drain_trace_jsonl();
            prop_assert!(jsonl.lines().count() <= MAX_TRACE_TRANSITIONS);
        }
    }
}
