use serde::{Deserialize, Serialize};

use crate::game::team::TeamId;

/// A transition the engine runs after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Kickoff reset after a goal; `kicking` is the team that conceded
    ResumeAfterGoal { kicking: TeamId },
    StartSecondHalf,
}

/// A scheduled transition tagged with the engine epoch that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredTask {
    pub epoch: u64,
    pub transition: Transition,
}

/// Clock the engine hands delayed work to
///
/// Implementations decide what "elapsed" means. The engine only calls
/// `take_due` at tick boundaries, so tasks never run mid-tick.
pub trait Scheduler: Send {
    fn schedule_after(&mut self, delay: f32, task: DeferredTask);
    /// Advance the clock and return every task now due, oldest first
    fn take_due(&mut self, elapsed: f32) -> Vec<DeferredTask>;
    fn cancel_all(&mut self);
    fn pending(&self) -> usize;
    /// Seconds until the next task, if any
    fn next_due_in(&self) -> Option<f32>;
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    /// Counts down from the requested delay so float rounding depends only
    /// on the elapsed steps since scheduling
    remaining: f32,
    seq: u64,
    task: DeferredTask,
}

/// Virtual-clock scheduler driven by the caller's elapsed time
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: f32,
    seq: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f32 {
        self.now
    }
}

impl Scheduler for TimerQueue {
    fn schedule_after(&mut self, delay: f32, task: DeferredTask) {
        self.seq += 1;
        self.timers.push(Timer {
            remaining: delay.max(0.0),
            seq: self.seq,
            task,
        });
    }

    fn take_due(&mut self, elapsed: f32) -> Vec<DeferredTask> {
        let elapsed = elapsed.max(0.0);
        self.now += elapsed;

        for timer in &mut self.timers {
            timer.remaining -= elapsed;
        }
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) = self.timers.drain(..).partition(|t| t.remaining <= 0.0);
        self.timers = pending;

        due.sort_by(|a, b| a.remaining.total_cmp(&b.remaining).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|t| t.task).collect()
    }

    fn cancel_all(&mut self) {
        self.timers.clear();
    }

    fn pending(&self) -> usize {
        self.timers.len()
    }

    fn next_due_in(&self) -> Option<f32> {
        self.timers
            .iter()
            .map(|t| t.remaining)
            .min_by(f32::total_cmp)
            .map(|remaining| remaining.max(0.0))
    }
}
