extern crate nalgebra as na;

use na::{UnitQuaternion, Vector3};

use crate::angle_space::PeriodicAngleSpace;

#[cfg(test)]
#[path = "wheel_state_tests.rs"]
mod wheel_state_tests;

/// Stores the kinematic state of a single wheel between ticks.
///
/// A wheel has two rotational degrees of freedom relative to the base: the steering rotation
/// around the Z-axis of the base and the spin around the axle. The spin angle is kept in
/// `[0, 2 PI)` and the steering angle in `[-PI, PI)`.
#[derive(Clone, Debug, PartialEq)]
pub struct WheelState {
    /// The rotation of the mesh when the wheel is neither steered nor spun.
    rest_rotation: UnitQuaternion<f64>,

    /// The steering angle of the wheel around the Z-axis of the base.
    steer_angle: f64,

    /// The accumulated rotation of the wheel around its axle.
    spin_angle: f64,

    /// The angular velocity of the wheel around its axle.
    spin_velocity: f64,

    /// The linear velocity of the wheel center in the base frame.
    linear_velocity: Vector3<f64>,
}

impl WheelState {
    /// Returns the angular velocity vector of the wheel, i.e. the spin velocity around the
    /// steered axle.
    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.steer_rotation() * Vector3::new(0.0, self.spin_velocity, 0.0)
    }

    /// Returns the linear velocity of the wheel center in the base frame.
    pub fn linear_velocity(&self) -> &Vector3<f64> {
        &self.linear_velocity
    }

    /// Creates a new [WheelState] for a wheel that is at rest.
    ///
    /// ## Parameters
    ///
    /// * 'rest_rotation' - The rotation of the wheel mesh when it is neither steered nor spun
    pub fn new(rest_rotation: UnitQuaternion<f64>) -> Self {
        Self {
            rest_rotation,
            steer_angle: 0.0,
            spin_angle: 0.0,
            spin_velocity: 0.0,
            linear_velocity: Vector3::zeros(),
        }
    }

    /// Returns the rotation of the wheel mesh when it is neither steered nor spun.
    pub fn rest_rotation(&self) -> &UnitQuaternion<f64> {
        &self.rest_rotation
    }

    /// Returns the rotation of the wheel mesh for the current steering and spin angles.
    ///
    /// The rest rotation is applied first, then the spin around the Y-axis of the base and
    /// finally the steering around the Z-axis of the base.
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        let spin = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.spin_angle);
        self.steer_rotation() * spin * self.rest_rotation
    }

    /// Stores the velocities computed for the current tick.
    pub(crate) fn set_velocities(&mut self, linear_velocity: Vector3<f64>, spin_velocity: f64) {
        self.linear_velocity = linear_velocity;
        self.spin_velocity = spin_velocity;
    }

    /// Stores the steering angle, normalized to `[-PI, PI)`.
    pub(crate) fn set_steer_angle(&mut self, steer_angle: f64) {
        self.steer_angle = PeriodicAngleSpace::centered().normalize_value(steer_angle);
    }

    /// Advances the spin angle by the spin velocity over the given time step.
    pub(crate) fn advance_spin(&mut self, delta_seconds: f64) {
        self.spin_angle = PeriodicAngleSpace::positive()
            .normalize_value(self.spin_angle + self.spin_velocity * delta_seconds);
    }

    /// Returns the accumulated rotation of the wheel around its axle, in `[0, 2 PI)`.
    pub fn spin_angle(&self) -> f64 {
        self.spin_angle
    }

    /// Returns the angular velocity of the wheel around its axle.
    pub fn spin_velocity(&self) -> f64 {
        self.spin_velocity
    }

    /// Returns the steering angle of the wheel around the Z-axis of the base, in `[-PI, PI)`.
    pub fn steer_angle(&self) -> f64 {
        self.steer_angle
    }

    fn steer_rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.steer_angle)
    }
}
