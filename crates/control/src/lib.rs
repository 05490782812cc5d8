//! Control: the torque contract the session calls every physics step, a PD
//! trajectory-tracking controller, trapezoidal trajectories and the planner
//! contract used to build them.
//!
//! # Invariants
//! - Torque vectors have the controlled body's DOF count.
//! - Unactuated coordinates always receive zero torque.

pub mod controller;
pub mod planner;
pub mod trajectory;

pub use controller::{ControlError, Controller, PdController};
pub use planner::{Planner, PlannerError, StraightLinePlanner};
pub use trajectory::Trajectory;
