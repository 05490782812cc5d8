use crate::state::{PlayState, Transition};
use rigplay_common::{BodyId, Contact, PlayMode};
use rigplay_control::{ControlError, Controller};
use rigplay_history::{History, HistoryError, PlaybackCursor};
use rigplay_input::Command;
use rigplay_kernel::{World, WorldError};
use serde::Serialize;
use std::time::Duration;

/// Errors that end a session. Commands and ticks only fail when a
/// collaborator breaks its contract or history cannot grow.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("world: {0}")]
    World(#[from] WorldError),
    #[error("controller: {0}")]
    Control(#[from] ControlError),
    #[error("history: {0}")]
    History(#[from] HistoryError),
}

/// Session settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Wall-clock period between ticks.
    pub tick_period: Duration,
    /// Body whose pose and velocity feed the controller and which receives its torques.
    pub controlled_body: BodyId,
    /// Initial visibility of contact markers.
    pub show_markers: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(30),
            controlled_body: BodyId(0),
            show_markers: false,
        }
    }
}

/// Physics steps that fit in one tick: `floor(period / timestep)`.
///
/// A small tolerance keeps exact ratios such as 30 ms / 1 ms from rounding
/// down to 29.
pub fn steps_for_period(period: Duration, timestep: f64) -> usize {
    if !(timestep.is_finite() && timestep > 0.0) {
        return 0;
    }
    let ratio = period.as_secs_f64() / timestep;
    (ratio + 1e-9).floor() as usize
}

/// Why a command did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// Nothing has been baked yet.
    EmptyHistory,
    /// Frame stepping outside playback.
    NotInPlayback,
}

/// Effect of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    ModeChanged(Transition),
    /// A baked frame was restored into the world.
    Restored { frame: usize },
    Ignored(Ignored),
    MarkersToggled(bool),
    Quit,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub mode: PlayMode,
    /// Physics steps executed.
    pub steps: usize,
    /// Frame baked this tick.
    pub baked: Option<usize>,
    /// Frame restored this tick.
    pub restored: Option<usize>,
    /// Whether the driver should run again after one period.
    pub reschedule: bool,
}

/// Read-only view of the session for renderers, handed out after each tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub mode: PlayMode,
    pub sim_frame: u64,
    pub play_frame: usize,
    pub history_len: usize,
    pub sim_time: f64,
    pub show_markers: bool,
    /// Contacts from the last physics step. Only filled while simulating.
    pub contacts: Vec<Contact>,
}

/// One simulate/playback session over an owned world.
///
/// The session is the only writer of the world. Hosts forward commands with
/// [`Session::apply`] and call [`Session::tick`] once per period while
/// [`Session::is_driver_armed`] holds; both run on the same thread.
#[derive(Debug)]
pub struct Session<W, C> {
    world: W,
    controller: C,
    config: SessionConfig,
    history: History,
    state: PlayState,
    cursor: PlaybackCursor,
    sim_frame: u64,
    steps_per_tick: usize,
    driver_armed: bool,
    redraw_pending: bool,
    show_markers: bool,
    quit: bool,
}

impl<W: World, C: Controller> Session<W, C> {
    /// New session: empty history, paused, driver stopped.
    pub fn new(world: W, controller: C, config: SessionConfig) -> Result<Self, SessionError> {
        world.pose(config.controlled_body)?;
        let steps_per_tick = steps_for_period(config.tick_period, world.timestep());
        if steps_per_tick == 0 {
            tracing::warn!(
                period = ?config.tick_period,
                timestep = world.timestep(),
                "tick period shorter than the physics timestep; ticks will bake without stepping"
            );
        }
        tracing::info!(
            dofs = world.layout().total(),
            bodies = world.layout().body_count(),
            steps_per_tick,
            "session created"
        );
        Ok(Self {
            history: History::for_world(&world),
            world,
            controller,
            config,
            state: PlayState::new(),
            cursor: PlaybackCursor::new(),
            sim_frame: 0,
            steps_per_tick,
            driver_armed: false,
            redraw_pending: false,
            show_markers: config.show_markers,
            quit: false,
        })
    }

    pub fn mode(&self) -> PlayMode {
        self.state.current()
    }

    /// Physics steps executed so far.
    pub fn sim_frame(&self) -> u64 {
        self.sim_frame
    }

    /// Playback cursor position.
    pub fn play_frame(&self) -> usize {
        self.cursor.position()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn steps_per_tick(&self) -> usize {
        self.steps_per_tick
    }

    /// Whether a tick is scheduled.
    pub fn is_driver_armed(&self) -> bool {
        self.driver_armed
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Whether a redraw was requested since the last call. Clears the request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_pending)
    }

    /// Apply one command. Mode changes never fail.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome, SessionError> {
        let outcome = match command {
            Command::TogglePause => self.transition(PlayState::toggle_pause),
            Command::EnterSimulate => self.transition(PlayState::enter_simulate),
            Command::EnterPlayback => self.transition(PlayState::enter_playback),
            Command::StepForward | Command::StepBackward if !self.state.playback_selected() => {
                tracing::debug!(%command, "frame stepping only works in playback");
                CommandOutcome::Ignored(Ignored::NotInPlayback)
            }
            Command::StepForward => {
                let frame = self.cursor.step_forward(self.history.len());
                self.seek(command, frame)?
            }
            Command::StepBackward => {
                let frame = self.cursor.step_backward(self.history.len());
                self.seek(command, frame)?
            }
            Command::SeekStart => {
                let frame = self.cursor.seek_start(self.history.len());
                self.seek(command, frame)?
            }
            Command::SeekEnd => {
                let frame = self.cursor.seek_end(self.history.len());
                self.seek(command, frame)?
            }
            Command::ToggleMarkers => {
                self.show_markers = !self.show_markers;
                CommandOutcome::MarkersToggled(self.show_markers)
            }
            Command::Quit => {
                self.quit = true;
                self.driver_armed = false;
                CommandOutcome::Quit
            }
        };
        self.redraw_pending = true;
        Ok(outcome)
    }

    fn transition(&mut self, change: fn(&mut PlayState) -> Transition) -> CommandOutcome {
        let transition = change(&mut self.state);
        if transition.start_driver {
            self.driver_armed = true;
        }
        tracing::info!(
            from = %transition.from,
            to = %transition.to,
            start_driver = transition.start_driver,
            "mode changed"
        );
        CommandOutcome::ModeChanged(transition)
    }

    fn seek(
        &mut self,
        command: Command,
        frame: Option<usize>,
    ) -> Result<CommandOutcome, SessionError> {
        let Some(frame) = frame else {
            tracing::warn!(%command, "nothing baked yet");
            return Ok(CommandOutcome::Ignored(Ignored::EmptyHistory));
        };
        self.history.restore_into(frame, &mut self.world)?;
        tracing::debug!(%command, frame, "restored baked frame");
        Ok(CommandOutcome::Restored { frame })
    }

    /// Run one tick of the driver in the current mode.
    pub fn tick(&mut self) -> Result<TickReport, SessionError> {
        let mode = self.state.current();
        let _span = tracing::debug_span!("tick", %mode).entered();
        match mode {
            PlayMode::Paused => {
                self.driver_armed = false;
                Ok(TickReport {
                    mode,
                    steps: 0,
                    baked: None,
                    restored: None,
                    reschedule: false,
                })
            }
            PlayMode::Simulating => self.simulate_tick(),
            PlayMode::PlayingBack => self.playback_tick(),
        }
    }

    fn simulate_tick(&mut self) -> Result<TickReport, SessionError> {
        let body = self.config.controlled_body;
        let steps = self.steps_per_tick;
        for _ in 0..steps {
            let torques = self.controller.torques(
                self.world.pose(body)?,
                self.world.velocity(body)?,
                self.world.time(),
            )?;
            self.world.set_internal_forces(body, &torques)?;
            self.world.step_once();
        }
        self.sim_frame += steps as u64;
        self.redraw_pending = true;

        // Bake once per tick, after the step loop, even when no step ran.
        let frame = self.history.bake(&self.world)?;
        tracing::debug!(steps, frame, sim_frame = self.sim_frame, "simulated");

        Ok(TickReport {
            mode: PlayMode::Simulating,
            steps,
            baked: Some(frame),
            restored: None,
            reschedule: true,
        })
    }

    fn playback_tick(&mut self) -> Result<TickReport, SessionError> {
        let restored = match self.cursor.next_for_tick(self.history.len()) {
            Some(frame) => {
                self.history.restore_into(frame, &mut self.world)?;
                self.redraw_pending = true;
                tracing::trace!(frame, "played back");
                Some(frame)
            }
            None => {
                tracing::debug!("playback with empty history");
                None
            }
        };
        Ok(TickReport {
            mode: PlayMode::PlayingBack,
            steps: 0,
            baked: None,
            restored,
            reschedule: true,
        })
    }

    /// Run up to `max` ticks, stopping early once the driver disarms.
    /// Returns the number of ticks that ran.
    pub fn run_ticks(&mut self, max: usize) -> Result<usize, SessionError> {
        let mut ran = 0;
        while ran < max && self.driver_armed {
            let report = self.tick()?;
            ran += 1;
            if !report.reschedule {
                break;
            }
        }
        Ok(ran)
    }

    /// Snapshot of everything a renderer shows.
    pub fn display_state(&self) -> DisplayState {
        let mode = self.state.current();
        DisplayState {
            mode,
            sim_frame: self.sim_frame,
            play_frame: self.cursor.position(),
            history_len: self.history.len(),
            sim_time: self.world.time(),
            show_markers: self.show_markers,
            contacts: if mode == PlayMode::Simulating {
                self.world.contacts().to_vec()
            } else {
                Vec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigplay_control::PdController;
    use rigplay_kernel::{ArticulatedWorld, BodySpec, WorldParams};

    fn session_6_33(period_ms: u64) -> Session<ArticulatedWorld, PdController> {
        let bodies = vec![BodySpec::new("box", 6), BodySpec::new("robot", 33)];
        let world = ArticulatedWorld::new(WorldParams::default(), bodies).unwrap();
        let controller =
            PdController::new(vec![0.1; 33], (6..33).collect(), vec![50.0; 33], vec![5.0; 33])
                .unwrap();
        let config = SessionConfig {
            tick_period: Duration::from_millis(period_ms),
            controlled_body: BodyId(1),
            ..SessionConfig::default()
        };
        Session::new(world, controller, config).unwrap()
    }

    #[test]
    fn steps_per_period() {
        assert_eq!(steps_for_period(Duration::from_millis(30), 0.001), 30);
        assert_eq!(steps_for_period(Duration::from_millis(10), 0.001), 10);
        assert_eq!(steps_for_period(Duration::from_micros(500), 0.001), 0);
        assert_eq!(steps_for_period(Duration::from_millis(10), 0.003), 3);
        assert_eq!(steps_for_period(Duration::from_millis(10), 0.0), 0);
    }

    #[test]
    fn new_session_is_paused_and_empty() {
        let session = session_6_33(10);
        assert_eq!(session.mode(), PlayMode::Paused);
        assert!(session.history().is_empty());
        assert_eq!(session.sim_frame(), 0);
        assert!(!session.is_driver_armed());
    }

    #[test]
    fn three_simulating_ticks_of_ten_steps() {
        let mut session = session_6_33(10);
        assert_eq!(session.steps_per_tick(), 10);
        session.apply(Command::EnterSimulate).unwrap();
        for _ in 0..3 {
            let report = session.tick().unwrap();
            assert_eq!(report.steps, 10);
            assert!(report.reschedule);
        }
        assert_eq!(session.sim_frame(), 30);
        assert_eq!(session.history().len(), 3);
        assert!(session.history().iter().all(|s| s.len() == 39));
    }

    #[test]
    fn zero_step_tick_still_bakes() {
        let mut session = session_6_33(0);
        assert_eq!(session.steps_per_tick(), 0);
        session.apply(Command::EnterSimulate).unwrap();
        let report = session.tick().unwrap();
        assert_eq!(report.steps, 0);
        assert_eq!(report.baked, Some(0));
        assert_eq!(session.sim_frame(), 0);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn pause_twice_resumes_without_phantom_ticks() {
        let mut session = session_6_33(10);
        session.apply(Command::EnterSimulate).unwrap();
        session.tick().unwrap();
        let frames = session.sim_frame();

        session.apply(Command::TogglePause).unwrap();
        assert_eq!(session.mode(), PlayMode::Paused);
        let report = session.tick().unwrap();
        assert!(!report.reschedule);
        assert_eq!(session.sim_frame(), frames);

        session.apply(Command::TogglePause).unwrap();
        assert_eq!(session.mode(), PlayMode::Simulating);
        assert!(session.is_driver_armed());
        assert_eq!(session.sim_frame(), frames);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn empty_playback_step_is_ignored() {
        let mut session = session_6_33(10);
        let before = session.world().positions().to_vec();
        session.apply(Command::EnterPlayback).unwrap();
        assert_eq!(
            session.apply(Command::StepForward).unwrap(),
            CommandOutcome::Ignored(Ignored::EmptyHistory)
        );
        let report = session.tick().unwrap();
        assert_eq!(report.restored, None);
        assert_eq!(session.world().positions(), before.as_slice());
    }

    #[test]
    fn stepping_outside_playback_is_ignored() {
        let mut session = session_6_33(10);
        session.apply(Command::EnterSimulate).unwrap();
        session.tick().unwrap();
        assert_eq!(
            session.apply(Command::StepBackward).unwrap(),
            CommandOutcome::Ignored(Ignored::NotInPlayback)
        );
        assert_eq!(session.play_frame(), 0);
    }

    #[test]
    fn playback_restores_baked_frames_in_order() {
        let mut session = session_6_33(10);
        session.apply(Command::EnterSimulate).unwrap();
        session.run_ticks(4).unwrap();
        let baked: Vec<Vec<f64>> = session
            .history()
            .iter()
            .map(|s| s.coords().to_vec())
            .collect();

        session.apply(Command::EnterPlayback).unwrap();
        for expected in [0, 1, 2, 3, 0] {
            let report = session.tick().unwrap();
            assert_eq!(report.restored, Some(expected));
            assert_eq!(session.world().positions(), baked[expected].as_slice());
        }
        assert_eq!(session.sim_frame(), 40);
        assert_eq!(session.history().len(), 4);
    }

    #[test]
    fn seek_and_step_wrap() {
        let mut session = session_6_33(10);
        session.apply(Command::EnterSimulate).unwrap();
        session.run_ticks(3).unwrap();
        session.apply(Command::EnterPlayback).unwrap();
        session.apply(Command::TogglePause).unwrap();

        assert_eq!(
            session.apply(Command::SeekEnd).unwrap(),
            CommandOutcome::Restored { frame: 2 }
        );
        assert_eq!(
            session.apply(Command::StepForward).unwrap(),
            CommandOutcome::Restored { frame: 0 }
        );
        assert_eq!(
            session.apply(Command::StepBackward).unwrap(),
            CommandOutcome::Restored { frame: 2 }
        );
        assert_eq!(
            session.apply(Command::SeekStart).unwrap(),
            CommandOutcome::Restored { frame: 0 }
        );
        assert_eq!(session.mode(), PlayMode::Paused);
    }

    #[test]
    fn run_ticks_stops_when_paused() {
        let mut session = session_6_33(10);
        assert_eq!(session.run_ticks(5).unwrap(), 0);
        session.apply(Command::EnterSimulate).unwrap();
        assert_eq!(session.run_ticks(5).unwrap(), 5);
        session.apply(Command::TogglePause).unwrap();
        // The pending tick sees Paused and stops the driver.
        assert_eq!(session.run_ticks(5).unwrap(), 1);
        assert!(!session.is_driver_armed());
        assert_eq!(session.history().len(), 5);
    }

    #[test]
    fn display_state_tracks_session() {
        let mut session = session_6_33(10);
        session.apply(Command::ToggleMarkers).unwrap();
        session.apply(Command::EnterSimulate).unwrap();
        session.tick().unwrap();
        let display = session.display_state();
        assert_eq!(display.mode, PlayMode::Simulating);
        assert_eq!(display.sim_frame, 10);
        assert_eq!(display.history_len, 1);
        assert!(display.show_markers);
        assert!((display.sim_time - 0.01).abs() < 1e-12);
    }

    #[test]
    fn quit_stops_driver() {
        let mut session = session_6_33(10);
        session.apply(Command::EnterSimulate).unwrap();
        assert_eq!(session.apply(Command::Quit).unwrap(), CommandOutcome::Quit);
        assert!(session.should_quit());
        assert!(!session.is_driver_armed());
    }

    #[test]
    fn redraw_requested_by_ticks() {
        let mut session = session_6_33(10);
        session.apply(Command::EnterSimulate).unwrap();
        assert!(session.take_redraw());
        assert!(!session.take_redraw());
        session.tick().unwrap();
        assert!(session.take_redraw());
    }
}
