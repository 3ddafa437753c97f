#![warn(missing_docs)]

//! Wheel kinematics for a four wheeled robot base.
//!
//! Turns a commanded body velocity (longitudinal, transversal, angular) into per-wheel linear
//! velocities, wheel spin and steering transforms, and applies them to the wheel meshes of the
//! base each simulation tick. The wheel meshes are provided by the host through the
//! [wheels::wheel_mesh::WheelMesh] trait.
//!
//! The base frame is right handed with X forward, Y left and Z up. Lengths are in centimeters,
//! angles in radians and time in seconds.

use thiserror::Error;

use wheels::wheel_set::WheelPosition;

/// Defines the periodic angle space used for wheel spin and steering angles
pub mod angle_space;

/// Defines the configuration for the wheel handler and the base controller
pub mod config;

/// Provides the controller component that owns the wheels of a robot base
pub mod controller;

/// Provides the geometry derivation and the wheel handler that computes the wheel motion
pub mod kinematics;

/// Provides the wheel mesh abstraction, the wheel set and the per-wheel state
pub mod wheels;

/// Defines the different errors for the base kinematics crate.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Returned when a configuration value is outside of its allowed range.
    #[error("The configuration value {name} is invalid: {value}")]
    InvalidConfiguration {
        /// The name of the configuration value
        name: String,
        /// The rejected value
        value: f64,
    },

    /// Returned when no usable diameter can be derived from the size of a wheel mesh.
    #[error("The wheel {wheel} has a degenerate size")]
    DegenerateWheelSize {
        /// The position of the wheel
        wheel: WheelPosition,
    },

    /// Returned when a commanded velocity contains a NaN or infinite component.
    #[error("The commanded velocity contains a non-finite component")]
    NonFiniteVelocity,

    /// Returned when the length of a tick is negative or not finite.
    #[error("The time step {delta_seconds} is not a finite, non-negative number")]
    InvalidTimeStep {
        /// The rejected time step in seconds
        delta_seconds: f64,
    },
}
