/// Read position inside a [`History`](crate::History) that wraps at both ends.
///
/// The cursor never extends history. Every move takes the current history
/// length and returns the frame to restore, or `None` when history is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    position: usize,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position. After a playback tick this is one past the frame
    /// that was just restored.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Playback tick: wrap to 0 if past the end, yield that frame, advance by one.
    pub fn next_for_tick(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        if self.position >= len {
            self.position = 0;
        }
        let frame = self.position;
        self.position += 1;
        Some(frame)
    }

    /// Move forward one frame, wrapping from the last frame to 0.
    pub fn step_forward(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        self.position = if self.position + 1 >= len {
            0
        } else {
            self.position + 1
        };
        Some(self.position)
    }

    /// Move back one frame, wrapping from 0 to the last frame.
    pub fn step_backward(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        self.position = match self.position {
            0 => len - 1,
            p => (p - 1).min(len - 1),
        };
        Some(self.position)
    }

    /// Jump to frame 0.
    pub fn seek_start(&mut self, len: usize) -> Option<usize> {
        self.position = 0;
        (len > 0).then_some(0)
    }

    /// Jump to the newest frame.
    pub fn seek_end(&mut self, len: usize) -> Option<usize> {
        let last = len.checked_sub(1)?;
        self.position = last;
        Some(last)
    }
}
