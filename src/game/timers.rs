//! One-shot timers with a single outstanding handle per purpose.
//!
//! Scheduling a kind that is already pending replaces it, so a superseded
//! deadline can never fire. Handles carry a generation; cancelling through a
//! stale handle does nothing.

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Unconsumed bomb disappears
    BombExpiry,
    /// Unconsumed heart disappears
    HeartExpiry,
    /// Slow motion from special food ends
    SlowMotion,
    /// Death animation is over
    GameOver,
}

impl TimerKind {
    const COUNT: usize = 4;

    fn slot(&self) -> usize {
        match self {
            TimerKind::BombExpiry => 0,
            TimerKind::HeartExpiry => 1,
            TimerKind::SlowMotion => 2,
            TimerKind::GameOver => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    pub kind: TimerKind,
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    kind: TimerKind,
    generation: u64,
    deadline: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct TimerTable {
    slots: [Option<Pending>; TimerKind::COUNT],
    next_generation: u64,
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind` for `deadline`, dropping whatever was pending for it
    pub fn schedule(&mut self, kind: TimerKind, deadline: Instant) -> TimerHandle {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.slots[kind.slot()] = Some(Pending {
            kind,
            generation,
            deadline,
        });
        TimerHandle { kind, generation }
    }

    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].take().is_some()
    }

    /// Cancel only if `handle` is still the outstanding timer of its kind
    pub fn cancel_handle(&mut self, handle: TimerHandle) -> bool {
        let slot = &mut self.slots[handle.kind.slot()];
        match slot {
            Some(p) if p.generation == handle.generation => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Instant> {
        self.slots[kind.slot()].map(|p| p.deadline)
    }

    pub fn clear(&mut self) {
        self.slots = [None; TimerKind::COUNT];
    }

    /// Remove and return every timer due at `now`, earliest first
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due: Vec<Pending> = self
            .slots
            .iter_mut()
            .filter(|slot| slot.is_some_and(|p| p.deadline <= now))
            .filter_map(Option::take)
            .collect();
        due.sort_by_key(|p| (p.deadline, p.generation));
        due.into_iter().map(|p| p.kind).collect()
    }
}
