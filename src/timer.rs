//! Deadline timers polled by the single-threaded event loop.
//!
//! Nothing here spawns threads or sleeps: the owner stores the deadline and
//! the loop calls `fire`/`poll` with the current instant on every tick.

use std::time::{Duration, Instant};

/// A cancellable one-shot timer. Scheduling replaces any pending deadline,
/// so at most one dismissal is ever outstanding.
#[derive(Debug, Default, Clone)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A deferred job guarded by a generation counter.
///
/// `defuse` bumps the generation; a job queued under an older generation is
/// dropped instead of running against state that no longer exists.
#[derive(Debug)]
pub struct Deferred<T> {
    generation: u64,
    pending: Option<(u64, Instant, T)>,
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            pending: None,
        }
    }
}

impl<T> Deferred<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `job` to run after `delay`, replacing anything already queued.
    pub fn defer(&mut self, now: Instant, delay: Duration, job: T) {
        self.pending = Some((self.generation, now + delay, job));
    }

    pub fn defuse(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the job if it is due and still belongs to the current generation.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = matches!(&self.pending, Some((_, at, _)) if now >= *at);
        if !due {
            return None;
        }
        let (generation, _, job) = self.pending.take()?;
        (generation == self.generation).then_some(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_timer_fires_once_after_deadline() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(t0, 300 * MS);
        assert!(!timer.fire(t0 + 299 * MS));
        assert!(timer.fire(t0 + 300 * MS));
        assert!(!timer.fire(t0 + 400 * MS));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_timer_reschedule_replaces_deadline() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(t0, 300 * MS);
        timer.schedule(t0 + 200 * MS, 300 * MS);
        assert!(!timer.fire(t0 + 350 * MS));
        assert!(timer.fire(t0 + 500 * MS));
    }

    #[test]
    fn test_timer_cancel() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(t0, 200 * MS);
        timer.cancel();
        assert!(!timer.fire(t0 + 1000 * MS));
    }

    #[test]
    fn test_deferred_runs_when_due() {
        let t0 = Instant::now();
        let mut job = Deferred::new();
        job.defer(t0, 500 * MS, "generate");
        assert_eq!(job.poll(t0 + 100 * MS), None);
        assert!(job.is_pending());
        assert_eq!(job.poll(t0 + 500 * MS), Some("generate"));
        assert!(!job.is_pending());
    }

    #[test]
    fn test_deferred_defuse_drops_stale_job() {
        let t0 = Instant::now();
        let mut job = Deferred::new();
        job.defer(t0, 300 * MS, 1);
        job.defuse();
        assert_eq!(job.poll(t0 + 1000 * MS), None);
        job.defer(t0, 300 * MS, 2);
        assert_eq!(job.poll(t0 + 300 * MS), Some(2));
    }
}
