//! Message scheduler
//!
//! Holds delayed messages and hands the due ones to a single callback each
//! time the host ticks. Callbacks usually reschedule themselves, which is how
//! a frame loop keeps going; the loop ends once nothing is pending.

use std::fmt::Debug;
use std::time::Instant;

use inertia_core::{millis, Clock, SystemClock};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    pub struct MsgId;
}

/// A scheduled message. Immutable once scheduled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Msg<A> {
    pub action: A,
    pub data1: f64,
    pub data2: f64,
    /// Absolute time the message becomes eligible for dispatch
    pub due_at: Instant,
}

struct Pending<A> {
    msg: Msg<A>,
    /// Scheduling order, used for FIFO dispatch within a tick
    seq: u64,
}

/// Pending messages plus the running flag of the dispatch loop
pub struct MsgHandler<A, C = SystemClock> {
    pending: SlotMap<MsgId, Pending<A>>,
    next_seq: u64,
    running: bool,
    clock: C,
}

impl<A: Copy + PartialEq + Debug> MsgHandler<A, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<A: Copy + PartialEq + Debug> Default for MsgHandler<A, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Copy + PartialEq + Debug, C: Clock> MsgHandler<A, C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            pending: SlotMap::with_key(),
            next_seq: 0,
            running: false,
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Schedule `action` to fire `delay_ms` from now
    ///
    /// A zero (or invalid) delay makes the message due on the next tick.
    pub fn schedule(&mut self, action: A, delay_ms: f64, data1: f64, data2: f64) -> MsgId {
        let delay = millis(delay_ms);
        let seq = self.next_seq;
        self.next_seq += 1;

        let msg = Msg {
            action,
            data1,
            data2,
            due_at: self.clock.now() + delay,
        };
        tracing::trace!("schedule {:?} in {:.2}ms (seq {})", action, delay_ms, seq);
        self.pending.insert(Pending { msg, seq })
    }

    /// Remove pending messages without dispatching them
    ///
    /// `None` clears everything. Returns how many messages were dropped.
    pub fn clear(&mut self, action: Option<A>) -> usize {
        let before = self.pending.len();
        match action {
            None => self.pending.clear(),
            Some(action) => self.pending.retain(|_, p| p.msg.action != action),
        }
        before - self.pending.len()
    }

    /// Allow the dispatch loop to run
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Halt the dispatch loop. Pending messages are kept.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether any message with `action` is waiting
    pub fn has_pending(&self, action: A) -> bool {
        self.pending.values().any(|p| p.msg.action == action)
    }

    /// Earliest due time among pending messages
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.msg.due_at).min()
    }

    /// Snapshot of the messages due now, in scheduling order
    ///
    /// Messages scheduled after the snapshot is taken are not part of it, so
    /// a callback that reschedules itself cannot fire twice in one tick.
    /// Returns nothing while the loop is stopped.
    pub fn due(&self) -> SmallVec<[MsgId; 4]> {
        if !self.running {
            return SmallVec::new();
        }
        let now = self.clock.now();
        let mut due: SmallVec<[(u64, MsgId); 4]> = self
            .pending
            .iter()
            .filter(|(_, p)| p.msg.due_at <= now)
            .map(|(id, p)| (p.seq, id))
            .collect();
        due.sort_unstable_by_key(|(seq, _)| *seq);
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Remove a message for dispatch
    ///
    /// Returns `None` if it was cleared after the snapshot was taken.
    pub fn take(&mut self, id: MsgId) -> Option<Msg<A>> {
        self.pending.remove(id).map(|p| p.msg)
    }

    /// Whether the host should keep ticking
    pub fn should_continue(&self) -> bool {
        self.running && !self.pending.is_empty()
    }

    /// Run one tick, handing each due message to `callback`
    ///
    /// The callback receives the handler so it can schedule or clear
    /// messages. Returns [`Self::should_continue`] after dispatch.
    pub fn dispatch<F>(&mut self, mut callback: F) -> bool
    where
        F: FnMut(&mut Self, Msg<A>),
    {
        for id in self.due() {
            if let Some(msg) = self.take(id) {
                callback(self, msg);
            }
        }
        self.should_continue()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inertia_core::ManualClock;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Action {
        Ping,
        Pong,
    }

    fn handler() -> (MsgHandler<Action, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let mut msgs = MsgHandler::with_clock(clock.clone());
        msgs.start();
        (msgs, clock)
    }

    #[test]
    fn test_dispatch_waits_for_due_time() {
        let (mut msgs, clock) = handler();
        msgs.schedule(Action::Ping, 20.0, 1.0, 2.0);

        let mut fired = Vec::new();
        msgs.dispatch(|_, m| fired.push((m.action, m.data1, m.data2)));
        assert!(fired.is_empty());

        clock.advance(Duration::from_millis(19));
        msgs.dispatch(|_, m| fired.push((m.action, m.data1, m.data2)));
        assert!(fired.is_empty());

        clock.advance(Duration::from_millis(1));
        msgs.dispatch(|_, m| fired.push((m.action, m.data1, m.data2)));
        assert_eq!(fired, vec![(Action::Ping, 1.0, 2.0)]);
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_dispatch_fifo_and_payload() {
        let (mut msgs, _clock) = handler();
        msgs.schedule(Action::Pong, 0.0, 2.0, 0.0);
        msgs.schedule(Action::Ping, 0.0, 1.0, 0.0);
        msgs.schedule(Action::Pong, 0.0, 3.0, 0.0);

        let mut fired = Vec::new();
        let more = msgs.dispatch(|_, m| fired.push((m.action, m.data1)));

        assert_eq!(
            fired,
            vec![(Action::Pong, 2.0), (Action::Ping, 1.0), (Action::Pong, 3.0)]
        );
        assert!(!more);
    }

    #[test]
    fn test_self_reschedule_does_not_fire_twice_per_tick() {
        let (mut msgs, clock) = handler();
        msgs.schedule(Action::Ping, 0.0, 0.0, 0.0);

        let mut count = 0;
        let more = msgs.dispatch(|h, m| {
            count += 1;
            h.schedule(m.action, 0.0, m.data1 + 1.0, 0.0);
        });
        assert_eq!(count, 1);
        assert!(more);

        clock.advance(Duration::from_millis(1));
        msgs.dispatch(|_, m| {
            count += 1;
            assert_eq!(m.data1, 1.0);
        });
        assert_eq!(count, 2);
    }

    #[test]
    fn test_clear_during_dispatch_cancels_snapshot() {
        let (mut msgs, _clock) = handler();
        msgs.schedule(Action::Ping, 0.0, 0.0, 0.0);
        msgs.schedule(Action::Pong, 0.0, 0.0, 0.0);

        let mut fired = Vec::new();
        msgs.dispatch(|h, m| {
            fired.push(m.action);
            h.clear(Some(Action::Pong));
        });

        assert_eq!(fired, vec![Action::Ping]);
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_clear_by_action_and_all() {
        let (mut msgs, _clock) = handler();
        msgs.schedule(Action::Ping, 10.0, 0.0, 0.0);
        msgs.schedule(Action::Pong, 10.0, 0.0, 0.0);
        msgs.schedule(Action::Pong, 20.0, 0.0, 0.0);

        assert_eq!(msgs.clear(Some(Action::Pong)), 2);
        assert!(msgs.has_pending(Action::Ping));
        assert!(!msgs.has_pending(Action::Pong));

        assert_eq!(msgs.clear(None), 1);
        assert!(msgs.is_empty());
    }

    #[test]
    fn test_stop_keeps_pending_and_blocks_dispatch() {
        let (mut msgs, clock) = handler();
        msgs.schedule(Action::Ping, 0.0, 0.0, 0.0);
        msgs.stop();

        let mut fired = 0;
        assert!(!msgs.dispatch(|_, _| fired += 1));
        assert_eq!(fired, 0);
        assert_eq!(msgs.len(), 1);

        msgs.start();
        clock.advance(Duration::from_millis(1));
        msgs.dispatch(|_, _| fired += 1);
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_next_due_tracks_earliest() {
        let (mut msgs, clock) = handler();
        assert_eq!(msgs.next_due(), None);

        let start = clock.now();
        msgs.schedule(Action::Ping, 30.0, 0.0, 0.0);
        msgs.schedule(Action::Pong, 10.0, 0.0, 0.0);

        assert_eq!(msgs.next_due(), Some(start + Duration::from_millis(10)));
    }

    #[test]
    fn test_invalid_delay_is_immediate() {
        let (mut msgs, _clock) = handler();
        msgs.schedule(Action::Ping, f64::NAN, 0.0, 0.0);
        msgs.schedule(Action::Pong, -4.0, 0.0, 0.0);
        assert_eq!(msgs.due().len(), 2);
    }
}
