//! Brewing session orchestration
//!
//! Owns one countdown and one pour sequencer for a single session. A
//! completed countdown advances the sequencer, and the countdown is re-armed
//! for every pour except the last, so an uninterrupted session consumes
//! `(pours - 1) * interval` ticks.

use super::countdown::{CountdownTimer, TimerEvent, TimerEventKind, TimerState};
use super::pours::{PourEvent, PourEventKind, PourSequencer};
use crate::system::error::{BrewError, TransitionError};
use crate::system::events::{push_output, EventKind, ListenerId, Listeners};
use crate::types::{PourStep, Recipe};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const SESSION_OUTPUT_CAPACITY: usize = 8;

pub type SessionOutputs = heapless::Vec<SessionEvent, SESSION_OUTPUT_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    Countdown(TimerEvent),
    Pour(PourEvent),
    /// Session ended by `stop_session`, not by finishing the last pour
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    Countdown(TimerEventKind),
    Pour(PourEventKind),
    Stopped,
}

impl EventKind for SessionEvent {
    type Kind = SessionEventKind;

    fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::Countdown(e) => SessionEventKind::Countdown(e.kind()),
            SessionEvent::Pour(e) => SessionEventKind::Pour(e.kind()),
            SessionEvent::Stopped => SessionEventKind::Stopped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Ready,
    Brewing,
    Paused,
    Finished,
    Stopped,
}

/// What a presentation layer needs to render the current instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// 1-based, `None` when no pour is active
    pub pour_number: Option<usize>,
    pub total_pours: usize,
    pub pour_amount_g: Option<f64>,
    pub remaining_secs: u32,
    pub progress_percent: u8,
    pub elapsed_secs: u32,
}

struct SessionMachines {
    timer: CountdownTimer,
    sequencer: PourSequencer,
}

pub struct BrewSession {
    steps: Vec<PourStep>,
    interval_secs: u32,
    machines: Option<SessionMachines>,
    stopped: bool,
    elapsed_secs: u32,
    listeners: Listeners<SessionEvent>,
}

impl BrewSession {
    /// Session over the recipe's pours, spaced by the recipe's interval.
    pub fn new(recipe: &Recipe) -> Result<Self, BrewError> {
        Self::with_interval(recipe.pour_steps(), recipe.interval_secs())
    }

    pub fn with_interval(steps: Vec<PourStep>, interval_secs: u32) -> Result<Self, BrewError> {
        if steps.is_empty() {
            return Err(BrewError::EmptyInput);
        }
        if interval_secs == 0 {
            return Err(BrewError::InvalidArgument(
                "pour interval must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            steps,
            interval_secs,
            machines: None,
            stopped: false,
            elapsed_secs: 0,
            listeners: Listeners::new(),
        })
    }

    /// Show the first pour and arm the countdown to the second.
    ///
    /// Fails with `AlreadyStarted` if this session already ran and was not stopped.
    pub fn start_session(&mut self) -> Result<SessionOutputs, BrewError> {
        if self.machines.is_none() {
            self.machines = Some(SessionMachines {
                timer: CountdownTimer::new(),
                sequencer: PourSequencer::new(self.steps.clone())?,
            });
            self.stopped = false;
            self.elapsed_secs = 0;
        }

        let interval_secs = self.interval_secs;
        let machines = self.machines.as_mut().ok_or(TransitionError::NoActiveSession)?;
        let mut outputs = SessionOutputs::new();

        for event in machines.sequencer.start()? {
            push_output(&mut outputs, SessionEvent::Pour(event));
        }
        Self::arm_or_finish(machines, interval_secs, &mut outputs)?;

        info!(
            "Brewing session started: {} pours, {}s apart",
            self.steps.len(),
            interval_secs
        );
        Ok(self.dispatch(outputs))
    }

    /// Advance one logical second. No-op without an active countdown.
    pub fn tick(&mut self) -> Result<SessionOutputs, BrewError> {
        let interval_secs = self.interval_secs;
        let Some(machines) = self.machines.as_mut() else {
            return Ok(SessionOutputs::new());
        };

        let mut outputs = SessionOutputs::new();
        let mut countdown_complete = false;

        for event in machines.timer.tick() {
            match event {
                TimerEvent::Tick { .. } => self.elapsed_secs += 1,
                TimerEvent::Complete => countdown_complete = true,
                _ => {}
            }
            push_output(&mut outputs, SessionEvent::Countdown(event));
        }

        if countdown_complete && !machines.sequencer.is_finished() {
            for event in machines.sequencer.next_pour()? {
                push_output(&mut outputs, SessionEvent::Pour(event));
            }
            Self::arm_or_finish(machines, interval_secs, &mut outputs)?;

            if machines.sequencer.is_finished() {
                info!("Brewing finished after {}s", self.elapsed_secs);
            }
        }

        Ok(self.dispatch(outputs))
    }

    pub fn pause(&mut self) -> Result<SessionOutputs, BrewError> {
        let machines = self.machines.as_mut().ok_or(TransitionError::NoActiveSession)?;
        let mut outputs = SessionOutputs::new();
        for event in machines.timer.pause()? {
            push_output(&mut outputs, SessionEvent::Countdown(event));
        }
        info!("Brewing paused with {}s to next pour", machines.timer.remaining_secs());
        Ok(self.dispatch(outputs))
    }

    pub fn resume(&mut self) -> Result<SessionOutputs, BrewError> {
        let machines = self.machines.as_mut().ok_or(TransitionError::NoActiveSession)?;
        let mut outputs = SessionOutputs::new();
        for event in machines.timer.resume()? {
            push_output(&mut outputs, SessionEvent::Countdown(event));
        }
        info!("Brewing resumed");
        Ok(self.dispatch(outputs))
    }

    /// Abandon the session. Both machines are discarded; a later
    /// `start_session` begins again from the first pour.
    ///
    /// A session that already finished is left as it is.
    pub fn stop_session(&mut self) -> SessionOutputs {
        if self.is_finished() {
            debug!("Ignoring stop, session already finished");
            return SessionOutputs::new();
        }
        let Some(mut machines) = self.machines.take() else {
            return SessionOutputs::new();
        };

        let mut outputs = SessionOutputs::new();
        for event in machines.timer.stop() {
            push_output(&mut outputs, SessionEvent::Countdown(event));
        }
        push_output(&mut outputs, SessionEvent::Stopped);
        self.stopped = true;

        info!(
            "Brewing stopped at pour {}/{} after {}s",
            (machines.sequencer.current_index() + 1).min(machines.sequencer.total_pours()),
            machines.sequencer.total_pours(),
            self.elapsed_secs
        );
        self.dispatch(outputs)
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.machines {
            None if self.stopped => SessionPhase::Stopped,
            None => SessionPhase::Ready,
            Some(m) if m.sequencer.is_finished() => SessionPhase::Finished,
            Some(m) if !m.sequencer.is_started() => SessionPhase::Ready,
            Some(m) if m.timer.state() == TimerState::Paused => SessionPhase::Paused,
            Some(_) => SessionPhase::Brewing,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase(), SessionPhase::Brewing | SessionPhase::Paused)
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == SessionPhase::Finished
    }

    pub fn current_pour(&self) -> Option<(usize, &PourStep)> {
        let machines = self.machines.as_ref()?;
        if !machines.sequencer.is_started() {
            return None;
        }
        machines
            .sequencer
            .current_pour()
            .map(|step| (machines.sequencer.current_index(), step))
    }

    pub fn remaining_secs(&self) -> u32 {
        self.machines
            .as_ref()
            .map_or(0, |m| m.timer.remaining_secs())
    }

    pub fn progress(&self) -> u8 {
        self.machines.as_ref().map_or(0, |m| m.sequencer.progress())
    }

    /// Ticks consumed by the countdown since the session started.
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    pub fn total_pours(&self) -> usize {
        self.steps.len()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let current = self.current_pour();
        SessionSnapshot {
            phase: self.phase(),
            pour_number: current.map(|(index, _)| index + 1),
            total_pours: self.total_pours(),
            pour_amount_g: current.map(|(_, step)| step.amount_g),
            remaining_secs: self.remaining_secs(),
            progress_percent: self.progress(),
            elapsed_secs: self.elapsed_secs,
        }
    }

    pub fn on<F>(&mut self, kind: SessionEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.listeners.on(kind, listener)
    }

    pub fn on_any<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.listeners.on_any(listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.off(id)
    }

    /// Re-arm the countdown for the next gap, or close the sequence once the
    /// final pour is showing since nothing is timed after it.
    fn arm_or_finish(
        machines: &mut SessionMachines,
        interval_secs: u32,
        outputs: &mut SessionOutputs,
    ) -> Result<(), BrewError> {
        let sequencer = &mut machines.sequencer;
        if sequencer.is_finished() {
            return Ok(());
        }

        if sequencer.current_index() + 1 >= sequencer.total_pours() {
            for event in sequencer.next_pour()? {
                push_output(outputs, SessionEvent::Pour(event));
            }
        } else {
            debug!(
                "Pour {}/{} ready, arming {}s countdown",
                sequencer.current_index() + 1,
                sequencer.total_pours(),
                interval_secs
            );
            for event in machines.timer.start(interval_secs)? {
                push_output(outputs, SessionEvent::Countdown(event));
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, outputs: SessionOutputs) -> SessionOutputs {
        self.listeners.emit_all(outputs.iter());
        outputs
    }
}
