//! Timed sequencer.
//!
//! A sequence is a group of effects registered at offsets from the moment
//! the sequence starts running. Sequences are canceled as a unit, and the
//! cancellation flag is checked when an action comes due rather than when
//! it is queued, so nothing fires after `cancel` even if it was already
//! sitting in the queue.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::trace;

/// Milliseconds of presentation time.
pub type Millis = u64;

/// Handle of one sequence within a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(u64);

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq#{}", self.0)
    }
}

/// An action that came due, handed back to the host for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<E> {
    /// The sequence the action belonged to.
    pub sequence: SequenceId,
    /// Presentation time at which it fired.
    pub at: Millis,
    /// The effect to execute.
    pub effect: E,
}

/// Queue key: fire time first, registration order second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Slot {
    at: Millis,
    order: u64,
}

#[derive(Debug)]
struct TimedAction<E> {
    sequence: SequenceId,
    effect: E,
}

#[derive(Debug)]
struct Staged<E> {
    offset: Millis,
    order: u64,
    effect: E,
}

#[derive(Debug)]
struct SequenceState<E> {
    started_at: Option<Millis>,
    canceled: bool,
    /// Actions registered before `run`, still relative to the start.
    staged: Vec<Staged<E>>,
    /// Actions of this sequence currently in the queue.
    queued: usize,
}

impl<E> SequenceState<E> {
    fn new() -> Self {
        Self {
            started_at: None,
            canceled: false,
            staged: Vec::new(),
            queued: 0,
        }
    }
}

/// Virtual-clock scheduler of cancelable sequences.
///
/// The clock only moves when the host calls [`Scheduler::pop_due`]. Actions
/// are returned one at a time in `(fire time, registration order)` order,
/// which gives offset ordering within a sequence and a stable tie-break
/// for equal offsets.
#[derive(Debug)]
pub struct Scheduler<E> {
    now: Millis,
    next_sequence: u64,
    next_order: u64,
    sequences: HashMap<SequenceId, SequenceState<E>>,
    queue: BTreeMap<Slot, TimedAction<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    /// Creates an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: 0,
            next_sequence: 0,
            next_order: 0,
            sequences: HashMap::new(),
            queue: BTreeMap::new(),
        }
    }

    /// Current presentation time.
    #[must_use]
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Registers a new, not yet running sequence.
    pub fn create_sequence(&mut self) -> SequenceId {
        let id = SequenceId(self.next_sequence);
        self.next_sequence += 1;
        self.sequences.insert(id, SequenceState::new());
        id
    }

    /// Creates a sequence from `(offset, effect)` pairs and starts it now.
    pub fn spawn<I>(&mut self, actions: I) -> SequenceId
    where
        I: IntoIterator<Item = (Millis, E)>,
    {
        let sequence = self.create_sequence();
        for (offset, effect) in actions {
            self.schedule(sequence, offset, effect);
        }
        self.run(sequence);
        sequence
    }

    /// Registers `effect` at `offset` ms from the sequence's start.
    ///
    /// On a running sequence the action lands at `start + offset`. Actions
    /// for canceled or unknown sequences are dropped.
    pub fn schedule(&mut self, sequence: SequenceId, offset: Millis, effect: E) {
        let order = self.next_order;
        self.next_order += 1;

        let Some(state) = self.sequences.get_mut(&sequence) else {
            trace!(%sequence, offset, "dropping action for unknown sequence");
            return;
        };
        if state.canceled {
            trace!(%sequence, offset, "dropping action for canceled sequence");
            return;
        }
        match state.started_at {
            None => state.staged.push(Staged {
                offset,
                order,
                effect,
            }),
            Some(start) => {
                state.queued += 1;
                self.queue.insert(
                    Slot {
                        at: start.saturating_add(offset),
                        order,
                    },
                    TimedAction { sequence, effect },
                );
            }
        }
    }

    /// Registers `effect` to fire `delay` ms from now.
    pub fn schedule_after(&mut self, sequence: SequenceId, delay: Millis, effect: E) {
        let offset = match self.sequences.get(&sequence).and_then(|s| s.started_at) {
            Some(start) => self.now.saturating_sub(start).saturating_add(delay),
            None => delay,
        };
        self.schedule(sequence, offset, effect);
    }

    /// Starts the sequence's clock at the current time.
    ///
    /// Running an already running or canceled sequence does nothing.
    pub fn run(&mut self, sequence: SequenceId) {
        let now = self.now;
        let Some(state) = self.sequences.get_mut(&sequence) else {
            return;
        };
        if state.canceled || state.started_at.is_some() {
            return;
        }
        state.started_at = Some(now);
        for staged in state.staged.drain(..) {
            state.queued += 1;
            self.queue.insert(
                Slot {
                    at: now.saturating_add(staged.offset),
                    order: staged.order,
                },
                TimedAction {
                    sequence,
                    effect: staged.effect,
                },
            );
        }
    }

    /// Suppresses every action of the sequence that has not fired yet.
    ///
    /// Returns `true` if the sequence was live before the call.
    pub fn cancel(&mut self, sequence: SequenceId) -> bool {
        let Some(state) = self.sequences.get_mut(&sequence) else {
            return false;
        };
        if state.canceled {
            return false;
        }
        state.canceled = true;
        state.staged.clear();
        trace!(%sequence, queued = state.queued, "canceled sequence");
        if state.queued == 0 {
            self.sequences.remove(&sequence);
        }
        true
    }

    /// Whether the sequence exists and has not been canceled.
    #[must_use]
    pub fn is_live(&self, sequence: SequenceId) -> bool {
        self.sequences.get(&sequence).is_some_and(|s| !s.canceled)
    }

    /// Returns the next live action due at or before `until`.
    ///
    /// Actions of canceled sequences are discarded on the way. Once nothing
    /// else is due the clock settles at `until`. The clock never moves
    /// backwards.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired<E>> {
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().at > until {
                break;
            }
            let (slot, action) = entry.remove_entry();
            self.now = self.now.max(slot.at);

            let live = match self.sequences.get_mut(&action.sequence) {
                Some(state) => {
                    state.queued -= 1;
                    if state.canceled && state.queued == 0 {
                        self.sequences.remove(&action.sequence);
                        false
                    } else {
                        !state.canceled
                    }
                }
                None => false,
            };

            if live {
                return Some(Fired {
                    sequence: action.sequence,
                    at: self.now,
                    effect: action.effect,
                });
            }
            trace!(sequence = %action.sequence, at = slot.at, "suppressed action of canceled sequence");
        }
        self.now = self.now.max(until);
        None
    }

    /// Fire time of the earliest live action, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.queue
            .iter()
            .find(|(_, action)| self.is_live(action.sequence))
            .map(|(slot, _)| slot.at.max(self.now))
    }

    /// Number of queued actions that can still fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue
            .values()
            .filter(|action| self.is_live(action.sequence))
            .count()
    }

    /// Discards every sequence and queued action.
    ///
    /// The clock and the id counters keep running, so handles from before
    /// the reset never alias new sequences.
    pub fn reset(&mut self) {
        self.sequences.clear();
        self.queue.clear();
    }
}
