//! Generation guard for deferred work.
//!
//! Every moment load advances the generation. Timers scheduled by a moment
//! capture the generation that was current when they were issued and must
//! check it again before touching shared state; a mismatch means the moment
//! has been torn down and the work is dropped.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A captured generation number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The raw counter value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Shared, cheaply cloneable generation counter.
#[derive(Debug, Clone, Default)]
pub struct GenerationGuard {
    current: Arc<AtomicU64>,
}

impl GenerationGuard {
    /// Creates a guard at generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to the next generation and returns it.
    pub fn advance(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Returns the generation that is live right now.
    #[must_use]
    pub fn current(&self) -> Generation {
        Generation(self.current.load(Ordering::Acquire))
    }

    /// Whether work captured at `generation` may still run.
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }

    /// Captures the live generation for deferred work.
    #[must_use]
    pub fn ticket(&self) -> GenerationTicket {
        GenerationTicket {
            guard: self.clone(),
            generation: self.current(),
        }
    }
}

/// A generation captured by deferred work, together with the guard to check
/// it against.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    guard: GenerationGuard,
    generation: Generation,
}

impl GenerationTicket {
    /// A ticket that never expires, for work not tied to any moment.
    #[must_use]
    pub fn detached() -> Self {
        GenerationGuard::new().ticket()
    }

    /// The generation this ticket was issued for.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether the issuing generation is still live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.guard.is_current(self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_invalidates_captured_generation() {
        let guard = GenerationGuard::new();
        let first = guard.advance();
        assert!(guard.is_current(first));

        let second = guard.advance();

        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn test_clones_share_the_counter() {
        let guard = GenerationGuard::new();
        let shared = guard.clone();

        let generation = shared.advance();

        assert_eq!(guard.current(), generation);
        assert_eq!(generation.to_string(), "gen-1");
    }

    #[test]
    fn test_ticket_expires_when_generation_advances() {
        let guard = GenerationGuard::new();
        guard.advance();
        let ticket = guard.ticket();
        assert!(ticket.is_live());

        guard.advance();

        assert!(!ticket.is_live());
        assert_eq!(ticket.generation().value(), 1);
    }

    #[test]
    fn test_detached_ticket_stays_live() {
        let ticket = GenerationTicket::detached();
        assert!(ticket.is_live());
    }
}
