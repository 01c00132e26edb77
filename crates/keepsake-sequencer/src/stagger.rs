//! Staggered reveal list.
//!
//! Item `i` of a run renders at `base + i * step`; the follow-up effect
//! fires `settle` ms after the last item. Each run starts by clearing its
//! target, so a replay never shows items from the previous run. An empty
//! list fires the follow-up immediately.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use keepsake_core::error::DomainError;
use tracing::debug;

use crate::scheduler::{Millis, Scheduler, SequenceId};

/// Timing of a staggered run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaggerTiming {
    /// Delay before the first item.
    pub base_delay_ms: Millis,
    /// Delay between consecutive items.
    pub step_delay_ms: Millis,
    /// Pause between the last item and the follow-up.
    pub settle_ms: Millis,
}

impl StaggerTiming {
    /// Checks that items render at strictly increasing times.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfig` if the step delay is zero.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.step_delay_ms == 0 {
            return Err(DomainError::InvalidConfig(
                "stagger step delay must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    /// Offset of item `index` from the start of the run.
    #[must_use]
    pub fn item_offset(&self, index: usize) -> Millis {
        let index = Millis::try_from(index).unwrap_or(Millis::MAX);
        self.base_delay_ms
            .saturating_add(self.step_delay_ms.saturating_mul(index))
    }

    /// Offset of the follow-up for a run of `count` items.
    #[must_use]
    pub fn finish_offset(&self, count: usize) -> Millis {
        match count.checked_sub(1) {
            None => 0,
            Some(last) => self.item_offset(last).saturating_add(self.settle_ms),
        }
    }
}

/// Scheduler payload produced by a staggered run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealTick<K> {
    /// Remove everything a previous run rendered.
    Clear {
        /// Target surface.
        target: K,
        /// Run the tick belongs to.
        sequence: SequenceId,
    },
    /// Render one item.
    Item {
        /// Target surface.
        target: K,
        /// Run the tick belongs to.
        sequence: SequenceId,
        /// Zero-based item index.
        index: usize,
    },
    /// The last item has been on screen for the settle pause.
    Finished {
        /// Target surface.
        target: K,
        /// Run the tick belongs to.
        sequence: SequenceId,
    },
}

impl<K: Copy> RevealTick<K> {
    /// The surface the tick renders into.
    pub fn target(&self) -> K {
        match self {
            Self::Clear { target, .. } | Self::Item { target, .. } | Self::Finished { target, .. } => {
                *target
            }
        }
    }
}

/// What the host does in response to a [`RevealTick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealStep<E> {
    /// Clear the target.
    Clear,
    /// Render item `n`.
    Render(usize),
    /// Execute the follow-up effect.
    Finished(E),
    /// The tick belongs to a superseded run.
    Stale,
}

#[derive(Debug)]
struct RevealRun<E> {
    sequence: SequenceId,
    count: usize,
    next_index: usize,
    on_last: Option<E>,
}

/// Staggered runs, at most one per target.
#[derive(Debug)]
pub struct StaggeredReveal<K, E> {
    runs: HashMap<K, RevealRun<E>>,
}

impl<K, E> Default for StaggeredReveal<K, E>
where
    K: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E> StaggeredReveal<K, E>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Creates an idle reveal list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            runs: HashMap::new(),
        }
    }

    /// Schedules `count` items into `target`, replacing any earlier run.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfig` if `timing` is invalid.
    pub fn reveal_all<A>(
        &mut self,
        scheduler: &mut Scheduler<A>,
        target: K,
        count: usize,
        timing: StaggerTiming,
        on_last: E,
    ) -> Result<SequenceId, DomainError>
    where
        A: From<RevealTick<K>>,
    {
        timing.validate()?;
        if let Some(previous) = self.runs.remove(&target) {
            if scheduler.cancel(previous.sequence) {
                debug!(?target, sequence = %previous.sequence, "replaced running reveal");
            }
        }

        let sequence = scheduler.create_sequence();
        scheduler.schedule(sequence, 0, RevealTick::Clear { target, sequence }.into());
        for index in 0..count {
            scheduler.schedule(
                sequence,
                timing.item_offset(index),
                RevealTick::Item {
                    target,
                    sequence,
                    index,
                }
                .into(),
            );
        }
        scheduler.schedule(
            sequence,
            timing.finish_offset(count),
            RevealTick::Finished { target, sequence }.into(),
        );
        scheduler.run(sequence);

        self.runs.insert(
            target,
            RevealRun {
                sequence,
                count,
                next_index: 0,
                on_last: Some(on_last),
            },
        );
        Ok(sequence)
    }

    /// Advances the run a tick belongs to.
    pub fn apply(&mut self, tick: RevealTick<K>) -> RevealStep<E> {
        match tick {
            RevealTick::Clear { target, sequence } => match self.run_mut(target, sequence) {
                Some(_) => RevealStep::Clear,
                None => RevealStep::Stale,
            },
            RevealTick::Item {
                target,
                sequence,
                index,
            } => {
                let Some(run) = self.run_mut(target, sequence) else {
                    return RevealStep::Stale;
                };
                if index != run.next_index || index >= run.count {
                    return RevealStep::Stale;
                }
                run.next_index += 1;
                RevealStep::Render(index)
            }
            RevealTick::Finished { target, sequence } => {
                let Some(run) = self.run_mut(target, sequence) else {
                    return RevealStep::Stale;
                };
                if run.next_index < run.count {
                    return RevealStep::Stale;
                }
                run.on_last
                    .take()
                    .map_or(RevealStep::Stale, RevealStep::Finished)
            }
        }
    }

    /// Number of items rendered so far by the current run on `target`.
    #[must_use]
    pub fn rendered(&self, target: K) -> usize {
        self.runs.get(&target).map_or(0, |run| run.next_index)
    }

    /// Cancels every run and forgets it.
    pub fn cancel_all<A>(&mut self, scheduler: &mut Scheduler<A>) {
        for (_, run) in self.runs.drain() {
            scheduler.cancel(run.sequence);
        }
    }

    fn run_mut(&mut self, target: K, sequence: SequenceId) -> Option<&mut RevealRun<E>> {
        self.runs
            .get_mut(&target)
            .filter(|run| run.sequence == sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Tick = RevealTick<&'static str>;

    const CHAT: StaggerTiming = StaggerTiming {
        base_delay_ms: 500,
        step_delay_ms: 2_500,
        settle_ms: 1_000,
    };

    #[derive(Debug, PartialEq)]
    enum Seen {
        Clear(Millis),
        Render(Millis, usize),
        Done(Millis, &'static str),
    }

    fn run_until(
        scheduler: &mut Scheduler<Tick>,
        reveal: &mut StaggeredReveal<&'static str, &'static str>,
        until: Millis,
    ) -> Vec<Seen> {
        let mut seen = Vec::new();
        while let Some(fired) = scheduler.pop_due(until) {
            match reveal.apply(fired.effect) {
                RevealStep::Clear => seen.push(Seen::Clear(fired.at)),
                RevealStep::Render(index) => seen.push(Seen::Render(fired.at, index)),
                RevealStep::Finished(tag) => seen.push(Seen::Done(fired.at, tag)),
                RevealStep::Stale => {}
            }
        }
        seen
    }

    #[test]
    fn test_items_render_at_staggered_offsets_then_follow_up_fires() {
        // Arrange
        let mut scheduler = Scheduler::new();
        let mut reveal = StaggeredReveal::new();

        // Act
        reveal
            .reveal_all(&mut scheduler, "chat", 3, CHAT, "continue")
            .unwrap();
        let seen = run_until(&mut scheduler, &mut reveal, 60_000);

        // Assert
        assert_eq!(
            seen,
            vec![
                Seen::Clear(0),
                Seen::Render(500, 0),
                Seen::Render(3_000, 1),
                Seen::Render(5_500, 2),
                Seen::Done(6_500, "continue"),
            ]
        );
        assert_eq!(reveal.rendered("chat"), 3);
    }

    #[test]
    fn test_follow_up_fires_once_strictly_after_last_item() {
        for count in 1..=5 {
            let mut scheduler = Scheduler::new();
            let mut reveal = StaggeredReveal::new();
            let timing = StaggerTiming {
                base_delay_ms: 0,
                step_delay_ms: 10,
                settle_ms: 1,
            };
            reveal
                .reveal_all(&mut scheduler, "list", count, timing, "done")
                .unwrap();

            let seen = run_until(&mut scheduler, &mut reveal, u64::MAX);

            let last_render = seen
                .iter()
                .filter_map(|s| match s {
                    Seen::Render(at, _) => Some(*at),
                    _ => None,
                })
                .max()
                .unwrap();
            let done: Vec<Millis> = seen
                .iter()
                .filter_map(|s| match s {
                    Seen::Done(at, _) => Some(*at),
                    _ => None,
                })
                .collect();
            assert_eq!(done.len(), 1, "count {count}");
            assert!(done[0] > last_render, "count {count}");
        }
    }

    #[test]
    fn test_empty_list_fires_follow_up_immediately() {
        let mut scheduler = Scheduler::new();
        let mut reveal = StaggeredReveal::new();

        reveal
            .reveal_all(&mut scheduler, "chat", 0, CHAT, "continue")
            .unwrap();
        let seen = run_until(&mut scheduler, &mut reveal, 0);

        assert_eq!(seen, vec![Seen::Clear(0), Seen::Done(0, "continue")]);
    }

    #[test]
    fn test_replay_clears_and_cancels_previous_run() {
        // Arrange
        let mut scheduler = Scheduler::new();
        let mut reveal = StaggeredReveal::new();
        reveal
            .reveal_all(&mut scheduler, "chat", 3, CHAT, "first")
            .unwrap();
        let _ = run_until(&mut scheduler, &mut reveal, 3_000);

        // Act
        reveal
            .reveal_all(&mut scheduler, "chat", 2, CHAT, "second")
            .unwrap();
        let seen = run_until(&mut scheduler, &mut reveal, 60_000);

        // Assert
        assert_eq!(
            seen,
            vec![
                Seen::Clear(3_000),
                Seen::Render(3_500, 0),
                Seen::Render(6_000, 1),
                Seen::Done(7_000, "second"),
            ]
        );
    }

    #[test]
    fn test_zero_step_delay_is_invalid_config() {
        let mut scheduler: Scheduler<Tick> = Scheduler::new();
        let mut reveal: StaggeredReveal<&'static str, &'static str> = StaggeredReveal::new();
        let timing = StaggerTiming {
            step_delay_ms: 0,
            ..CHAT
        };

        let result = reveal.reveal_all(&mut scheduler, "chat", 3, timing, "done");

        assert!(matches!(result, Err(DomainError::InvalidConfig(_))));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_out_of_order_item_is_stale() {
        let mut scheduler: Scheduler<Tick> = Scheduler::new();
        let mut reveal = StaggeredReveal::new();
        let sequence = reveal
            .reveal_all(&mut scheduler, "chat", 3, CHAT, "done")
            .unwrap();

        let skipped = reveal.apply(RevealTick::Item {
            target: "chat",
            sequence,
            index: 1,
        });
        let early_finish = reveal.apply(RevealTick::Finished {
            target: "chat",
            sequence,
        });

        assert_eq!(skipped, RevealStep::Stale);
        assert_eq!(early_finish, RevealStep::Stale);
        assert_eq!(reveal.rendered("chat"), 0);
    }
}
