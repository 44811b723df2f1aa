//! Collect/Drain Duty Cycle
//!
//! Raydium account-change notifications arrive in bursts far faster than the
//! market-data provider can index new pools. The watcher therefore alternates
//! between a short collect phase (queue pool addresses, deduplicated) and a
//! drain phase (forward the batch). Notifications that land during a drain
//! are dropped, not queued: intentional load shedding at the cost of pools
//! created exactly inside a drain window.

use std::collections::{HashSet, VecDeque};

/// Current phase of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Collecting,
    Draining,
}

/// Outcome of offering an address to the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Queued for the next drain
    Queued,
    /// Already in the queue
    DuplicateDropped,
    /// Arrived during a drain phase
    DrainingDropped,
    /// Queue is full
    CapacityDropped,
}

/// Two-phase batching state machine, pure and timer-free; the watcher owns
/// the clock.
#[derive(Debug)]
pub struct DutyCycle {
    phase: Phase,
    queue: VecDeque<String>,
    queued: HashSet<String>,
    capacity: usize,
}

impl DutyCycle {
    pub fn new(capacity: usize) -> Self {
        Self {
            phase: Phase::Collecting,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            capacity,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Offer a raw pool address to the current collect window.
    pub fn offer(&mut self, address: &str) -> Offer {
        if self.phase == Phase::Draining {
            return Offer::DrainingDropped;
        }
        if self.queued.contains(address) {
            return Offer::DuplicateDropped;
        }
        if self.queue.len() >= self.capacity {
            return Offer::CapacityDropped;
        }
        self.queued.insert(address.to_string());
        self.queue.push_back(address.to_string());
        Offer::Queued
    }

    /// Switch to the drain phase and take the collected batch.
    pub fn begin_drain(&mut self) -> Vec<String> {
        self.phase = Phase::Draining;
        self.queued.clear();
        self.queue.drain(..).collect()
    }

    /// Switch back to collecting.
    pub fn begin_collect(&mut self) {
        self.phase = Phase::Collecting;
    }
}
