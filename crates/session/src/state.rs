use rigplay_common::PlayMode;

/// Result of a mode command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PlayMode,
    pub to: PlayMode,
    /// The tick driver must be (re)started because the session left Paused.
    pub start_driver: bool,
}

/// Current mode plus the last non-paused mode, for resume-on-unpause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayState {
    current: PlayMode,
    last_active: Option<PlayMode>,
}

impl PlayState {
    /// Paused, with nothing to resume.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PlayMode {
        self.current
    }

    /// Mode that was running before the last pause, if any.
    pub fn last_active(&self) -> Option<PlayMode> {
        self.last_active
    }

    /// Stepping through frames is allowed while playing back, or while
    /// paused out of playback.
    pub fn playback_selected(&self) -> bool {
        self.current == PlayMode::PlayingBack || self.last_active == Some(PlayMode::PlayingBack)
    }

    /// Pause whatever is running, or resume what ran last (simulate if nothing has).
    pub fn toggle_pause(&mut self) -> Transition {
        let from = self.current;
        if from == PlayMode::Paused {
            self.current = self.last_active.unwrap_or(PlayMode::Simulating);
            Transition {
                from,
                to: self.current,
                start_driver: true,
            }
        } else {
            self.last_active = Some(from);
            self.current = PlayMode::Paused;
            Transition {
                from,
                to: PlayMode::Paused,
                start_driver: false,
            }
        }
    }

    /// Simulate, or pause if already simulating.
    pub fn enter_simulate(&mut self) -> Transition {
        self.enter(PlayMode::Simulating)
    }

    /// Play back, or pause if already playing back.
    pub fn enter_playback(&mut self) -> Transition {
        self.enter(PlayMode::PlayingBack)
    }

    fn enter(&mut self, target: PlayMode) -> Transition {
        let from = self.current;
        if from == target {
            self.current = PlayMode::Paused;
            return Transition {
                from,
                to: PlayMode::Paused,
                start_driver: false,
            };
        }
        self.current = target;
        self.last_active = Some(target);
        Transition {
            from,
            to: target,
            start_driver: from == PlayMode::Paused,
        }
    }
}
