//! Typing effect.
//!
//! A typing session clears its sink, then reveals one more character per
//! cadence tick (the first one immediately) and finally hands back its
//! completion effect, one cadence after the last character. One sink holds
//! at most one session: starting another cancels the old one's remaining
//! ticks so characters never interleave.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use keepsake_core::error::DomainError;
use tracing::debug;

use crate::scheduler::{Millis, Scheduler, SequenceId};

/// Scheduler payload produced by a typing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingTick<K> {
    /// Show the first `cursor` characters; zero clears the sink.
    Reveal {
        /// Output sink.
        sink: K,
        /// Session the tick belongs to.
        sequence: SequenceId,
        /// Number of characters visible after this tick.
        cursor: usize,
    },
    /// Every character is visible.
    Complete {
        /// Output sink.
        sink: K,
        /// Session the tick belongs to.
        sequence: SequenceId,
    },
}

impl<K: Copy> TypingTick<K> {
    /// The sink the tick writes to.
    pub fn sink(&self) -> K {
        match self {
            Self::Reveal { sink, .. } | Self::Complete { sink, .. } => *sink,
        }
    }
}

/// What the host does in response to a [`TypingTick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingStep<E> {
    /// Replace the sink's text with this prefix.
    Show(String),
    /// The session finished; execute its completion effect.
    Completed(E),
    /// The tick belongs to a session that was replaced or canceled.
    Stale,
}

#[derive(Debug)]
struct TypingSession<E> {
    text: Vec<char>,
    cursor: usize,
    sequence: SequenceId,
    on_complete: Option<E>,
}

/// Typing sessions, at most one per sink.
#[derive(Debug)]
pub struct Typewriter<K, E> {
    sessions: HashMap<K, TypingSession<E>>,
}

impl<K, E> Default for Typewriter<K, E>
where
    K: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E> Typewriter<K, E>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Creates a typewriter with no sessions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Starts typing `text` into `sink`, one character every `cadence_ms`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfig` if `cadence_ms` is zero.
    pub fn start<A>(
        &mut self,
        scheduler: &mut Scheduler<A>,
        sink: K,
        text: &str,
        cadence_ms: Millis,
        on_complete: E,
    ) -> Result<SequenceId, DomainError>
    where
        A: From<TypingTick<K>>,
    {
        if cadence_ms == 0 {
            return Err(DomainError::InvalidConfig(
                "typing cadence must be positive".to_owned(),
            ));
        }
        if let Some(previous) = self.sessions.remove(&sink) {
            if scheduler.cancel(previous.sequence) {
                debug!(?sink, sequence = %previous.sequence, "replaced running typing session");
            }
        }

        let text: Vec<char> = text.chars().collect();
        let sequence = scheduler.create_sequence();
        scheduler.schedule(
            sequence,
            0,
            TypingTick::Reveal {
                sink,
                sequence,
                cursor: 0,
            }
            .into(),
        );
        let mut offset: Millis = 0;
        for cursor in 1..=text.len() {
            scheduler.schedule(
                sequence,
                offset,
                TypingTick::Reveal {
                    sink,
                    sequence,
                    cursor,
                }
                .into(),
            );
            offset = offset.saturating_add(cadence_ms);
        }
        scheduler.schedule(sequence, offset, TypingTick::Complete { sink, sequence }.into());
        scheduler.run(sequence);

        self.sessions.insert(
            sink,
            TypingSession {
                text,
                cursor: 0,
                sequence,
                on_complete: Some(on_complete),
            },
        );
        Ok(sequence)
    }

    /// Advances the session a tick belongs to.
    pub fn apply(&mut self, tick: TypingTick<K>) -> TypingStep<E> {
        match tick {
            TypingTick::Reveal {
                sink,
                sequence,
                cursor,
            } => {
                let Some(session) = self.session_mut(sink, sequence) else {
                    return TypingStep::Stale;
                };
                if cursor < session.cursor {
                    return TypingStep::Stale;
                }
                session.cursor = cursor.min(session.text.len());
                TypingStep::Show(session.text[..session.cursor].iter().collect())
            }
            TypingTick::Complete { sink, sequence } => {
                let Some(session) = self.session_mut(sink, sequence) else {
                    return TypingStep::Stale;
                };
                session.cursor = session.text.len();
                session
                    .on_complete
                    .take()
                    .map_or(TypingStep::Stale, TypingStep::Completed)
            }
        }
    }

    /// Whether `sink` has a session that has not completed yet.
    #[must_use]
    pub fn is_typing(&self, sink: K) -> bool {
        self.sessions
            .get(&sink)
            .is_some_and(|s| s.on_complete.is_some())
    }

    /// Number of characters currently visible in `sink`.
    #[must_use]
    pub fn cursor(&self, sink: K) -> Option<usize> {
        self.sessions.get(&sink).map(|s| s.cursor)
    }

    /// Cancels every session and forgets it.
    pub fn cancel_all<A>(&mut self, scheduler: &mut Scheduler<A>) {
        for (_, session) in self.sessions.drain() {
            scheduler.cancel(session.sequence);
        }
    }

    fn session_mut(&mut self, sink: K, sequence: SequenceId) -> Option<&mut TypingSession<E>> {
        self.sessions
            .get_mut(&sink)
            .filter(|session| session.sequence == sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Tick = TypingTick<&'static str>;

    #[derive(Debug, PartialEq)]
    enum Seen {
        Text(Millis, &'static str, String),
        Done(Millis, &'static str),
    }

    fn run_until(
        scheduler: &mut Scheduler<Tick>,
        typewriter: &mut Typewriter<&'static str, &'static str>,
        until: Millis,
    ) -> Vec<Seen> {
        let mut seen = Vec::new();
        while let Some(fired) = scheduler.pop_due(until) {
            let sink = fired.effect.sink();
            match typewriter.apply(fired.effect) {
                TypingStep::Show(text) => seen.push(Seen::Text(fired.at, sink, text)),
                TypingStep::Completed(tag) => seen.push(Seen::Done(fired.at, tag)),
                TypingStep::Stale => {}
            }
        }
        seen
    }

    #[test]
    fn test_reveals_one_character_per_tick_then_completes_once() {
        // Arrange
        let mut scheduler = Scheduler::new();
        let mut typewriter = Typewriter::new();

        // Act
        typewriter
            .start(&mut scheduler, "line", "abc", 50, "done")
            .unwrap();
        let seen = run_until(&mut scheduler, &mut typewriter, 10_000);

        // Assert
        assert_eq!(
            seen,
            vec![
                Seen::Text(0, "line", String::new()),
                Seen::Text(0, "line", "a".to_owned()),
                Seen::Text(50, "line", "ab".to_owned()),
                Seen::Text(100, "line", "abc".to_owned()),
                Seen::Done(150, "done"),
            ]
        );
        assert!(!typewriter.is_typing("line"));
        assert_eq!(typewriter.cursor("line"), Some(3));
    }

    #[test]
    fn test_reveal_count_matches_text_length() {
        for text in ["x", "hello", "Every story starts with a moment..."] {
            let mut scheduler = Scheduler::new();
            let mut typewriter = Typewriter::new();
            typewriter.start(&mut scheduler, "line", text, 10, "done").unwrap();

            let seen = run_until(&mut scheduler, &mut typewriter, u64::MAX);

            let reveals = seen
                .iter()
                .filter(|s| matches!(s, Seen::Text(_, _, t) if !t.is_empty()))
                .count();
            let completions = seen.iter().filter(|s| matches!(s, Seen::Done(..))).count();
            assert_eq!(reveals, text.chars().count());
            assert_eq!(completions, 1);
            assert!(matches!(seen.last(), Some(Seen::Done(..))));
        }
    }

    #[test]
    fn test_empty_text_completes_immediately() {
        let mut scheduler = Scheduler::new();
        let mut typewriter = Typewriter::new();

        typewriter.start(&mut scheduler, "line", "", 50, "done").unwrap();
        let seen = run_until(&mut scheduler, &mut typewriter, 0);

        assert_eq!(
            seen,
            vec![Seen::Text(0, "line", String::new()), Seen::Done(0, "done")]
        );
    }

    #[test]
    fn test_zero_cadence_is_invalid_config() {
        let mut scheduler: Scheduler<Tick> = Scheduler::new();
        let mut typewriter: Typewriter<&'static str, &'static str> = Typewriter::new();

        let result = typewriter.start(&mut scheduler, "line", "abc", 0, "done");

        assert!(matches!(result, Err(DomainError::InvalidConfig(_))));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_new_session_on_same_sink_cancels_previous_ticks() {
        // Arrange
        let mut scheduler = Scheduler::new();
        let mut typewriter = Typewriter::new();
        typewriter
            .start(&mut scheduler, "line", "hello", 50, "first")
            .unwrap();
        let _ = run_until(&mut scheduler, &mut typewriter, 60);

        // Act
        typewriter.start(&mut scheduler, "line", "ok", 50, "second").unwrap();
        let seen = run_until(&mut scheduler, &mut typewriter, 10_000);

        // Assert
        assert_eq!(
            seen,
            vec![
                Seen::Text(60, "line", String::new()),
                Seen::Text(60, "line", "o".to_owned()),
                Seen::Text(110, "line", "ok".to_owned()),
                Seen::Done(160, "second"),
            ]
        );
    }

    #[test]
    fn test_sessions_on_different_sinks_run_side_by_side() {
        let mut scheduler = Scheduler::new();
        let mut typewriter = Typewriter::new();
        typewriter.start(&mut scheduler, "a", "12", 100, "a-done").unwrap();
        typewriter.start(&mut scheduler, "b", "xy", 30, "b-done").unwrap();

        let seen = run_until(&mut scheduler, &mut typewriter, 10_000);

        let done: Vec<&Seen> = seen.iter().filter(|s| matches!(s, Seen::Done(..))).collect();
        assert_eq!(done, vec![&Seen::Done(60, "b-done"), &Seen::Done(200, "a-done")]);
    }

    #[test]
    fn test_ticks_from_replaced_session_are_stale() {
        let mut scheduler: Scheduler<Tick> = Scheduler::new();
        let mut typewriter = Typewriter::new();
        let old = typewriter
            .start(&mut scheduler, "line", "abc", 50, "old")
            .unwrap();
        typewriter.start(&mut scheduler, "line", "xyz", 50, "new").unwrap();

        let step = typewriter.apply(TypingTick::Complete {
            sink: "line",
            sequence: old,
        });

        assert_eq!(step, TypingStep::Stale);
        assert!(typewriter.is_typing("line"));
    }

    #[test]
    fn test_cancel_all_silences_every_sink() {
        let mut scheduler = Scheduler::new();
        let mut typewriter = Typewriter::new();
        typewriter.start(&mut scheduler, "a", "abc", 50, "a").unwrap();
        typewriter.start(&mut scheduler, "b", "abc", 50, "b").unwrap();

        typewriter.cancel_all(&mut scheduler);

        assert!(run_until(&mut scheduler, &mut typewriter, 10_000).is_empty());
    }
}
