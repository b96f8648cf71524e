//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware collaborator contracts and value types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Pulse counter fed from an edge interrupt.
///
/// Clones share the same count: the interrupt side keeps one handle and calls
/// [`PulseCounter::increment`], the plant keeps another and only ever resets it.
#[derive(Debug, Clone, Default)]
pub struct PulseCounter {
    pin: u8,
    pulses: Arc<AtomicU64>,
}

impl PulseCounter {
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            pulses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Record one edge. Safe to call from interrupt context.
    pub fn increment(&self) {
        self.pulses.fetch_add(1, Ordering::Relaxed);
    }

    /// Zero the counter, returning the pulses seen since the previous reset.
    pub fn reset(&self) -> u64 {
        self.pulses.swap(0, Ordering::AcqRel)
    }

    pub fn count(&self) -> u64 {
        self.pulses.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_count() {
        let counter = PulseCounter::new(26);
        let isr = counter.clone();
        isr.increment();
        isr.increment();
        assert_eq!(counter.count(), 2);
        assert_eq!(counter.reset(), 2);
        assert_eq!(isr.count(), 0);
        assert_eq!(counter.reset(), 0);
    }

    #[test]
    fn no_pulse_is_lost_across_threads() {
        let counter = PulseCounter::new(27);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let isr = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        isr.increment();
                    }
                })
            })
            .collect();
        let mut drained = 0;
        for handle in handles {
            drained += counter.reset();
            handle.join().unwrap();
        }
        drained += counter.reset();
        assert_eq!(drained, 4_000);
    }
}
