//! Single-pour countdown state machine
//! States: Idle, Running, Paused, Completed
//!
//! Advances only when `tick()` is called; an outside driver is expected to
//! call it roughly once per second while the timer is running.

use crate::system::error::{BrewError, TransitionError};
use crate::system::events::{push_output, EventKind, ListenerId, Listeners};
use log::debug;
use serde::{Deserialize, Serialize};
use statig::prelude::*;

/// Most events a single countdown input can produce (TICK + COMPLETE).
pub const COUNTDOWN_OUTPUT_CAPACITY: usize = 4;

pub type CountdownOutputs = heapless::Vec<TimerEvent, COUNTDOWN_OUTPUT_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

// Input events to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownInput {
    Start(u32),
    Pause,
    Resume,
    Stop,
    Tick,
}

// Output events from the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    Tick { remaining_secs: u32 },
    Start { duration_secs: u32 },
    Pause,
    Resume,
    Stop,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEventKind {
    Tick,
    Start,
    Pause,
    Resume,
    Stop,
    Complete,
}

impl EventKind for TimerEvent {
    type Kind = TimerEventKind;

    fn kind(&self) -> TimerEventKind {
        match self {
            TimerEvent::Tick { .. } => TimerEventKind::Tick,
            TimerEvent::Start { .. } => TimerEventKind::Start,
            TimerEvent::Pause => TimerEventKind::Pause,
            TimerEvent::Resume => TimerEventKind::Resume,
            TimerEvent::Stop => TimerEventKind::Stop,
            TimerEvent::Complete => TimerEventKind::Complete,
        }
    }
}

// Shared context for the state machine
#[derive(Debug, Default)]
pub struct CountdownContext {
    remaining_secs: u32,
    rejected: Option<TransitionError>,
    outputs: CountdownOutputs,
}

impl CountdownContext {
    fn emit(&mut self, event: TimerEvent) {
        push_output(&mut self.outputs, event);
    }

    fn reject(&mut self, error: TransitionError) -> Response<State> {
        self.rejected = Some(error);
        Response::Handled
    }

    fn arm(&mut self, duration_secs: u32) -> Response<State> {
        self.remaining_secs = duration_secs;
        self.emit(TimerEvent::Start { duration_secs });
        Response::Transition(State::running())
    }

    fn disarm(&mut self) -> Response<State> {
        self.remaining_secs = 0;
        self.emit(TimerEvent::Stop);
        Response::Transition(State::idle())
    }
}

#[derive(Debug, Default)]
pub struct Countdown;

#[state_machine(
    initial = "State::idle()",
    state(derive(Debug)),
    on_transition = "Self::on_transition"
)]
impl Countdown {
    #[state]
    fn idle(context: &mut CountdownContext, event: &CountdownInput) -> Response<State> {
        match event {
            CountdownInput::Start(duration) => context.arm(*duration),
            CountdownInput::Pause => context.reject(TransitionError::NotRunning),
            CountdownInput::Resume => context.reject(TransitionError::NotPaused),
            // Stopping an idle timer is a no-op; ticks are ignored
            CountdownInput::Stop | CountdownInput::Tick => Response::Handled,
        }
    }

    #[state]
    fn running(context: &mut CountdownContext, event: &CountdownInput) -> Response<State> {
        match event {
            CountdownInput::Start(_) => context.reject(TransitionError::AlreadyRunning),
            CountdownInput::Pause => {
                context.emit(TimerEvent::Pause);
                Response::Transition(State::paused())
            }
            CountdownInput::Resume => context.reject(TransitionError::NotPaused),
            CountdownInput::Stop => context.disarm(),
            CountdownInput::Tick => {
                context.remaining_secs = context.remaining_secs.saturating_sub(1);
                context.emit(TimerEvent::Tick {
                    remaining_secs: context.remaining_secs,
                });

                if context.remaining_secs == 0 {
                    context.emit(TimerEvent::Complete);
                    Response::Transition(State::completed())
                } else {
                    Response::Handled
                }
            }
        }
    }

    #[state]
    fn paused(context: &mut CountdownContext, event: &CountdownInput) -> Response<State> {
        match event {
            CountdownInput::Start(duration) => context.arm(*duration),
            CountdownInput::Pause => context.reject(TransitionError::NotRunning),
            CountdownInput::Resume => {
                context.emit(TimerEvent::Resume);
                Response::Transition(State::running())
            }
            CountdownInput::Stop => context.disarm(),
            CountdownInput::Tick => Response::Handled,
        }
    }

    #[state]
    fn completed(context: &mut CountdownContext, event: &CountdownInput) -> Response<State> {
        match event {
            CountdownInput::Start(duration) => context.arm(*duration),
            CountdownInput::Pause => context.reject(TransitionError::NotRunning),
            CountdownInput::Resume => context.reject(TransitionError::NotPaused),
            CountdownInput::Stop => context.disarm(),
            CountdownInput::Tick => Response::Handled,
        }
    }

    fn on_transition(&mut self, source: &State, target: &State) {
        debug!(
            "Countdown transition: {:?} -> {:?}",
            Self::state_to_timer_state(source),
            Self::state_to_timer_state(target)
        );
    }

    fn state_to_timer_state(state: &State) -> TimerState {
        match state {
            State::Idle {} => TimerState::Idle,
            State::Running {} => TimerState::Running,
            State::Paused {} => TimerState::Paused,
            State::Completed {} => TimerState::Completed,
        }
    }
}

/// Countdown for the gap between two pours.
///
/// Every operation returns the events it emitted, in order, after handing
/// them to subscribed listeners.
pub struct CountdownTimer {
    machine: StateMachine<Countdown>,
    context: CountdownContext,
    listeners: Listeners<TimerEvent>,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self {
            machine: Countdown::default().state_machine(),
            context: CountdownContext::default(),
            listeners: Listeners::new(),
        }
    }

    /// Arm for `duration_secs`. Fails with `AlreadyRunning` while running.
    pub fn start(&mut self, duration_secs: u32) -> Result<CountdownOutputs, BrewError> {
        self.handle_input(CountdownInput::Start(duration_secs))
    }

    pub fn pause(&mut self) -> Result<CountdownOutputs, BrewError> {
        self.handle_input(CountdownInput::Pause)
    }

    pub fn resume(&mut self) -> Result<CountdownOutputs, BrewError> {
        self.handle_input(CountdownInput::Resume)
    }

    /// Reset to idle. No-op when already idle.
    pub fn stop(&mut self) -> CountdownOutputs {
        // stop is legal from every state
        self.handle_input(CountdownInput::Stop).unwrap_or_default()
    }

    /// Count down one second. Ignored unless running.
    pub fn tick(&mut self) -> CountdownOutputs {
        self.handle_input(CountdownInput::Tick).unwrap_or_default()
    }

    pub fn state(&self) -> TimerState {
        Countdown::state_to_timer_state(self.machine.state())
    }

    pub fn remaining_secs(&self) -> u32 {
        self.context.remaining_secs
    }

    pub fn on<F>(&mut self, kind: TimerEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&TimerEvent) + 'static,
    {
        self.listeners.on(kind, listener)
    }

    pub fn on_any<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TimerEvent) + 'static,
    {
        self.listeners.on_any(listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.off(id)
    }

    fn handle_input(&mut self, input: CountdownInput) -> Result<CountdownOutputs, BrewError> {
        self.context.outputs.clear();
        self.context.rejected = None;

        let _ = self.machine.handle_with_context(&input, &mut self.context);

        if let Some(error) = self.context.rejected.take() {
            debug!("Countdown rejected {:?} in {:?}: {}", input, self.state(), error);
            return Err(error.into());
        }

        let outputs = std::mem::take(&mut self.context.outputs);
        self.listeners.emit_all(outputs.iter());
        Ok(outputs)
    }
}
