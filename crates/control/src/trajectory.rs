use crate::controller::ControlError;

/// Trapezoidal velocity profile over a unit-length path parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Profile {
    accel: f64,
    peak_speed: f64,
    accel_time: f64,
    cruise_time: f64,
}

impl Profile {
    fn new(max_speed: f64, max_accel: f64) -> Self {
        if max_speed * max_speed / max_accel >= 1.0 {
            // Triangular: peak speed is never reached.
            let accel_time = (1.0 / max_accel).sqrt();
            Self {
                accel: max_accel,
                peak_speed: max_accel * accel_time,
                accel_time,
                cruise_time: 0.0,
            }
        } else {
            let accel_time = max_speed / max_accel;
            let accel_dist = 0.5 * max_accel * accel_time * accel_time;
            Self {
                accel: max_accel,
                peak_speed: max_speed,
                accel_time,
                cruise_time: (1.0 - 2.0 * accel_dist) / max_speed,
            }
        }
    }

    fn duration(&self) -> f64 {
        2.0 * self.accel_time + self.cruise_time
    }

    /// Path parameter and its rate at `t`, clamped to the profile.
    fn sample(&self, t: f64) -> (f64, f64) {
        let t = t.clamp(0.0, self.duration());
        let accel_dist = 0.5 * self.accel * self.accel_time * self.accel_time;
        if t < self.accel_time {
            (0.5 * self.accel * t * t, self.accel * t)
        } else if t < self.accel_time + self.cruise_time {
            (
                accel_dist + self.peak_speed * (t - self.accel_time),
                self.peak_speed,
            )
        } else {
            let left = self.duration() - t;
            (1.0 - 0.5 * self.accel * left * left, self.accel * left)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    start_time: f64,
    from: Vec<f64>,
    delta: Vec<f64>,
    profile: Profile,
}

/// Time-parameterized path through joint-space waypoints.
///
/// Each straight segment between waypoints follows a trapezoidal velocity
/// profile. All coordinates of a segment start and stop together; the
/// segment is as fast as the tightest per-coordinate velocity and
/// acceleration limit allows.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    waypoints: Vec<Vec<f64>>,
    segments: Vec<Segment>,
    duration: f64,
}

impl Trajectory {
    pub fn new(
        waypoints: Vec<Vec<f64>>,
        max_velocity: &[f64],
        max_acceleration: &[f64],
    ) -> Result<Self, ControlError> {
        let Some(first) = waypoints.first() else {
            return Err(ControlError::EmptyPath);
        };
        let dofs = first.len();
        for (what, len) in [
            ("max velocity", max_velocity.len()),
            ("max acceleration", max_acceleration.len()),
        ]
        .into_iter()
        .chain(waypoints.iter().map(|w| ("waypoint", w.len())))
        {
            if len != dofs {
                return Err(ControlError::DimensionMismatch {
                    what,
                    expected: dofs,
                    actual: len,
                });
            }
        }
        for (index, &limit) in max_velocity.iter().chain(max_acceleration).enumerate() {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(ControlError::NonPositiveLimit {
                    index: index % dofs,
                    value: limit,
                });
            }
        }

        let mut segments = Vec::new();
        let mut clock = 0.0;
        for pair in waypoints.windows(2) {
            let delta: Vec<f64> = pair[1].iter().zip(&pair[0]).map(|(b, a)| b - a).collect();
            let mut speed = f64::INFINITY;
            let mut accel = f64::INFINITY;
            for (j, d) in delta.iter().enumerate() {
                let d = d.abs();
                if d > 0.0 {
                    speed = speed.min(max_velocity[j] / d);
                    accel = accel.min(max_acceleration[j] / d);
                }
            }
            if !speed.is_finite() {
                // Repeated waypoint.
                continue;
            }
            let profile = Profile::new(speed, accel);
            segments.push(Segment {
                start_time: clock,
                from: pair[0].clone(),
                delta,
                profile,
            });
            clock += profile.duration();
        }

        Ok(Self {
            waypoints,
            segments,
            duration: clock,
        })
    }

    /// Number of coordinates per waypoint.
    pub fn dof_count(&self) -> usize {
        self.waypoints[0].len()
    }

    /// Total time from the first to the last waypoint.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    fn segment_at(&self, t: f64) -> Option<&Segment> {
        self.segments
            .iter()
            .rev()
            .find(|s| t >= s.start_time)
            .or(self.segments.first())
    }

    /// Position at `t`; holds the first waypoint before 0 and the last after the end.
    pub fn position(&self, t: f64) -> Vec<f64> {
        if t >= self.duration {
            return self.waypoints[self.waypoints.len() - 1].clone();
        }
        match self.segment_at(t) {
            Some(seg) => {
                let (s, _) = seg.profile.sample(t - seg.start_time);
                seg.from
                    .iter()
                    .zip(&seg.delta)
                    .map(|(a, d)| a + s * d)
                    .collect()
            }
            None => self.waypoints[0].clone(),
        }
    }

    /// Velocity at `t`; zero outside `[0, duration]`.
    pub fn velocity(&self, t: f64) -> Vec<f64> {
        if t < 0.0 || t >= self.duration {
            return vec![0.0; self.dof_count()];
        }
        match self.segment_at(t) {
            Some(seg) => {
                let (_, rate) = seg.profile.sample(t - seg.start_time);
                seg.delta.iter().map(|d| rate * d).collect()
            }
            None => vec![0.0; self.dof_count()],
        }
    }
}
