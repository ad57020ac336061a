use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

pub trait StepObserver {
    fn on_step_start(&mut self, _step: u64, _length: usize) {}
    fn on_match_complete(&mut self, _step: u64, _rewritten: usize) {}
    fn on_step_complete(&mut self, _step: u64, _length: usize) {}
}

impl StepObserver for () {}

pub struct ConsoleStepObserver;

impl StepObserver for ConsoleStepObserver {
    fn on_step_start(&mut self, step: u64, length: usize) {
        println!("Step {} starting from {} symbols...", step + 1, length);
    }

    fn on_step_complete(&mut self, step: u64, length: usize) {
        println!("Step {} complete. {} symbols", step + 1, length);
    }
}

pub enum StepMessage {
    StepStart { step: u64, length: usize },
    MatchComplete { step: u64, rewritten: usize },
    StepComplete { step: u64, length: usize },
}

/// Forwards step events over a channel.
pub struct ChannelStepObserver {
    sender: Sender<StepMessage>,
}

impl ChannelStepObserver {
    pub fn new(sender: Sender<StepMessage>) -> Self {
        Self { sender }
    }
}

impl StepObserver for ChannelStepObserver {
    fn on_step_start(&mut self, step: u64, length: usize) {
        let _ = self.sender.send(StepMessage::StepStart { step, length });
    }

    fn on_match_complete(&mut self, step: u64, rewritten: usize) {
        let _ = self.sender.send(StepMessage::MatchComplete { step, rewritten });
    }

    fn on_step_complete(&mut self, step: u64, length: usize) {
        let _ = self.sender.send(StepMessage::StepComplete { step, length });
    }
}

/// Cooperative cancellation, checked between step phases.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
