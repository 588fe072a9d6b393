use crate::system::error::{BrewError, TransitionError};
use crate::system::events::{push_output, EventKind, ListenerId, Listeners};
use crate::types::PourStep;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const POUR_OUTPUT_CAPACITY: usize = 2;

pub type PourOutputs = heapless::Vec<PourEvent, POUR_OUTPUT_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PourEvent {
    Start,
    PourReady { index: usize, amount_g: f64 },
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PourEventKind {
    Start,
    PourReady,
    Complete,
}

impl EventKind for PourEvent {
    type Kind = PourEventKind;

    fn kind(&self) -> PourEventKind {
        match self {
            PourEvent::Start => PourEventKind::Start,
            PourEvent::PourReady { .. } => PourEventKind::PourReady,
            PourEvent::Complete => PourEventKind::Complete,
        }
    }
}

/// Walks an ordered, fixed list of pours. Advances only on `next_pour`.
pub struct PourSequencer {
    steps: Vec<PourStep>,
    index: usize,
    started: bool,
    completed: bool,
    listeners: Listeners<PourEvent>,
}

impl PourSequencer {
    pub fn new(steps: Vec<PourStep>) -> Result<Self, BrewError> {
        if steps.is_empty() {
            return Err(BrewError::EmptyInput);
        }

        Ok(Self {
            steps,
            index: 0,
            started: false,
            completed: false,
            listeners: Listeners::new(),
        })
    }

    /// Emits START then the first POUR_READY. Can only happen once.
    pub fn start(&mut self) -> Result<PourOutputs, BrewError> {
        if self.started {
            return Err(TransitionError::AlreadyStarted.into());
        }

        self.started = true;
        self.index = 0;
        info!("Pour sequence started: {} pours", self.steps.len());

        let mut outputs = PourOutputs::new();
        push_output(&mut outputs, PourEvent::Start);
        push_output(&mut outputs, self.pour_ready());
        self.dispatch(outputs)
    }

    pub fn next_pour(&mut self) -> Result<PourOutputs, BrewError> {
        if self.completed {
            return Err(TransitionError::AlreadyCompleted.into());
        }

        self.index += 1;

        let mut outputs = PourOutputs::new();
        if self.index >= self.steps.len() {
            self.completed = true;
            info!("All {} pours done", self.steps.len());
            push_output(&mut outputs, PourEvent::Complete);
        } else {
            debug!("Advancing to pour {}/{}", self.index + 1, self.steps.len());
            push_output(&mut outputs, self.pour_ready());
        }
        self.dispatch(outputs)
    }

    /// The active pour, or `None` once every pour is done.
    pub fn current_pour(&self) -> Option<&PourStep> {
        if self.completed {
            return None;
        }
        self.steps.get(self.index)
    }

    /// Share of pours consumed before the current one, 0..=100.
    ///
    /// Right after `start()` this is 0 even though the first pour is active.
    pub fn progress(&self) -> u8 {
        if self.completed {
            return 100;
        }
        ((self.index as f64 / self.steps.len() as f64) * 100.0).round() as u8
    }

    pub fn is_finished(&self) -> bool {
        self.completed
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn total_pours(&self) -> usize {
        self.steps.len()
    }

    pub fn on<F>(&mut self, kind: PourEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&PourEvent) + 'static,
    {
        self.listeners.on(kind, listener)
    }

    pub fn on_any<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&PourEvent) + 'static,
    {
        self.listeners.on_any(listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.off(id)
    }

    fn pour_ready(&self) -> PourEvent {
        PourEvent::PourReady {
            index: self.index,
            amount_g: self.steps[self.index].amount_g,
        }
    }

    fn dispatch(&mut self, outputs: PourOutputs) -> Result<PourOutputs, BrewError> {
        self.listeners.emit_all(outputs.iter());
        Ok(outputs)
    }
}
