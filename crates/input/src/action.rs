use std::fmt;

/// A discrete command the host forwards to the session.
///
/// Hosts translate their own input events into commands; the session never
/// sees raw keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Pause whatever is running, or resume what was running before.
    TogglePause,
    /// Start or continue simulating; pauses if already simulating.
    EnterSimulate,
    /// Start or continue playback; pauses if already playing back.
    EnterPlayback,
    /// Restore the next baked frame.
    StepForward,
    /// Restore the previous baked frame.
    StepBackward,
    /// Restore the first baked frame.
    SeekStart,
    /// Restore the newest baked frame.
    SeekEnd,
    /// Show or hide contact markers.
    ToggleMarkers,
    /// Leave the viewer.
    Quit,
}

impl Command {
    pub const ALL: [Command; 9] = [
        Command::TogglePause,
        Command::EnterSimulate,
        Command::EnterPlayback,
        Command::StepForward,
        Command::StepBackward,
        Command::SeekStart,
        Command::SeekEnd,
        Command::ToggleMarkers,
        Command::Quit,
    ];

    /// One-line description for key help.
    pub fn describe(self) -> &'static str {
        match self {
            Self::TogglePause => "pause/unpause whatever is happening",
            Self::EnterSimulate => "start or continue simulating",
            Self::EnterPlayback => "start or continue playback",
            Self::StepForward => "step playback forward one frame",
            Self::StepBackward => "step playback back one frame",
            Self::SeekStart => "move to start of playback",
            Self::SeekEnd => "move to end of playback",
            Self::ToggleMarkers => "show or hide contact markers",
            Self::Quit => "quit",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TogglePause => "toggle-pause",
            Self::EnterSimulate => "enter-simulate",
            Self::EnterPlayback => "enter-playback",
            Self::StepForward => "step-forward",
            Self::StepBackward => "step-backward",
            Self::SeekStart => "seek-start",
            Self::SeekEnd => "seek-end",
            Self::ToggleMarkers => "toggle-markers",
            Self::Quit => "quit",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_lists_each_command_once() {
        let set: HashSet<Command> = Command::ALL.into_iter().collect();
        assert_eq!(set.len(), Command::ALL.len());
    }

    #[test]
    fn display_uses_kebab_case() {
        assert_eq!(Command::TogglePause.to_string(), "toggle-pause");
        assert_eq!(Command::SeekEnd.to_string(), "seek-end");
    }

    #[test]
    fn every_command_is_described() {
        assert!(Command::ALL.iter().all(|c| !c.describe().is_empty()));
    }
}
