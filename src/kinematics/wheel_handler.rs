//! Provides the [WheelHandler] that turns a commanded base velocity into wheel motion.
//!
//! The commanded velocity is split into a longitudinal, a transversal and an angular part. The
//! contribution of each part to the velocity of a wheel is computed independently and summed.
//! The velocity of a wheel therefore only depends on the commanded velocity and the static
//! offset of that wheel from the center of the base.

extern crate nalgebra as na;

use na::Vector3;
use tracing::{debug, info, trace};

use crate::{
    angle_space::PeriodicAngleSpace,
    config::{DriveModel, WheelHandlerConfig},
    wheels::{
        wheel_mesh::WheelMesh,
        wheel_set::{WheelPosition, WheelSet},
        wheel_state::WheelState,
    },
    Error,
};

use super::geometry::{self, GeometryConstants};

#[cfg(test)]
#[path = "wheel_handler_tests.rs"]
mod wheel_handler_tests;

/// Below this speed, in cm/s, a steered wheel keeps its current steering angle.
const MINIMUM_STEERING_SPEED: f64 = 1e-9;

/// Computes and applies the motion of the four wheels of a robot base.
///
/// The handler does not own the wheels. The owner passes the [WheelSet] to each operation.
/// The geometry constants are derived when the handler is created and are only updated when
/// [WheelHandler::refresh_geometry] is called.
///
/// ## Notes
///
/// * The geometry is not validated on creation. Use [WheelHandler::is_distance_between_wheels_valid]
///   and [WheelHandler::are_wheel_diameters_uniform] to decide if the results can be trusted.
pub struct WheelHandler {
    /// The configuration of the handler.
    config: WheelHandlerConfig,

    /// The cached geometry constants of the base.
    geometry: GeometryConstants,

    /// The kinematic state of the wheels, in the order of [WheelPosition::ALL].
    states: [WheelState; 4],
}

impl WheelHandler {
    /// Returns (half of front left to front right, half of front left to rear left) for the
    /// current wheel locations.
    ///
    /// The result is only meaningful if the wheels form a rectangle, see
    /// [WheelHandler::is_distance_between_wheels_valid].
    pub fn calc_distance_between_wheels<W: WheelMesh>(&self, wheels: &WheelSet<W>) -> (f64, f64) {
        geometry::distance_between_wheels(wheels)
    }

    /// Returns the mean wheel diameter in centimeters for the current wheel meshes.
    ///
    /// A warning is logged if the wheel diameters deviate from each other by more than the
    /// configured tolerance.
    pub fn calc_wheel_diameter_in_centimeter<W: WheelMesh>(&self, wheels: &WheelSet<W>) -> f64 {
        geometry::mean_wheel_diameter(wheels, self.config.margin())
    }

    /// Returns a value indicating whether all wheels have the same diameter within the configured
    /// tolerance.
    pub fn are_wheel_diameters_uniform<W: WheelMesh>(&self, wheels: &WheelSet<W>) -> bool {
        geometry::are_wheel_diameters_uniform(wheels, self.config.margin())
    }

    /// Returns the configuration of the handler.
    pub fn config(&self) -> &WheelHandlerConfig {
        &self.config
    }

    /// Returns the part of the commanded velocity that the drive model can produce. A skid steer
    /// base has no transversal velocity.
    pub fn driven_velocity(&self, velocity: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            self.calc_longitudinal(velocity.x).x,
            self.calc_transversal(velocity.y).y,
            velocity.z,
        )
    }

    /// Returns the cached geometry constants.
    pub fn geometry(&self) -> &GeometryConstants {
        &self.geometry
    }

    /// Returns a value indicating whether the current wheel locations form a symmetric rectangle
    /// within the configured tolerance.
    pub fn is_distance_between_wheels_valid<W: WheelMesh>(&self, wheels: &WheelSet<W>) -> bool {
        geometry::is_distance_between_wheels_valid(wheels, self.config.margin())
    }

    /// Returns a value indicating whether both the wheel distances and the wheel diameters are
    /// valid.
    pub fn is_geometry_valid<W: WheelMesh>(&self, wheels: &WheelSet<W>) -> bool {
        self.is_distance_between_wheels_valid(wheels) && self.are_wheel_diameters_uniform(wheels)
    }

    /// Creates a new [WheelHandler] for the given wheels.
    ///
    /// ## Parameters
    ///
    /// * 'wheels' - The wheels of the base. The current rotation of each mesh is used as its rest
    ///   rotation.
    /// * 'config' - The configuration for the handler.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when the configuration is not valid.
    /// * [Error::DegenerateWheelSize] - Returned when no diameter can be derived for a wheel.
    pub fn new<W: WheelMesh>(
        wheels: &WheelSet<W>,
        config: WheelHandlerConfig,
    ) -> Result<Self, Error> {
        config.validate()?;

        let geometry = GeometryConstants::from_wheels(wheels, config.margin())?;
        let states = WheelPosition::ALL.map(|p| WheelState::new(wheels.get(p).rotation()));

        info!(
            "Created {:?} wheel handler. Half track width: {} cm, half wheel base: {} cm, wheel diameter: {} cm",
            config.drive_model,
            geometry.half_track_width(),
            geometry.half_wheel_base(),
            geometry.wheel_diameter()
        );

        Ok(Self {
            config,
            geometry,
            states,
        })
    }

    /// Derives the geometry constants again from the current wheel meshes.
    ///
    /// ## Errors
    ///
    /// * [Error::DegenerateWheelSize] - Returned when no diameter can be derived for a wheel. The
    ///   previous geometry constants are kept in that case.
    pub fn refresh_geometry<W: WheelMesh>(&mut self, wheels: &WheelSet<W>) -> Result<(), Error> {
        self.geometry = GeometryConstants::from_wheels(wheels, self.config.margin())?;
        Ok(())
    }

    /// Computes the motion of the wheels for the commanded velocity and applies it to the wheel
    /// meshes.
    ///
    /// ## Parameters
    ///
    /// * 'wheels' - The wheels of the base
    /// * 'velocity' - The commanded velocity of the base: longitudinal (cm/s), transversal
    ///   (cm/s) and angular (rad/s)
    /// * 'delta_seconds' - The length of the current tick, used to advance the wheel spin
    ///
    /// ## Errors
    ///
    /// * [Error::NonFiniteVelocity] - Returned when the velocity contains a NaN or an infinite
    ///   component. The wheels are not changed.
    /// * [Error::InvalidTimeStep] - Returned when the time step is negative or not finite. The
    ///   wheels are not changed.
    pub fn setup_wheels_movement<W: WheelMesh>(
        &mut self,
        wheels: &mut WheelSet<W>,
        velocity: Vector3<f64>,
        delta_seconds: f64,
    ) -> Result<(), Error> {
        if !velocity.iter().all(|v| v.is_finite()) {
            return Err(Error::NonFiniteVelocity);
        }

        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return Err(Error::InvalidTimeStep { delta_seconds });
        }

        if self.config.drive_model == DriveModel::SkidSteer && velocity.y != 0.0 {
            debug!(
                "Dropping transversal velocity {} cm/s, a skid steer base cannot move sideways",
                velocity.y
            );
        }

        let linear_velocities = WheelPosition::ALL.map(|position| {
            self.calc_longitudinal(velocity.x)
                + self.calc_transversal(velocity.y)
                + self.calc_angular(velocity.z, position)
        });

        self.shift_wheels_for_angular_movement(&linear_velocities);
        self.calc_wheels_angular_velocity(&linear_velocities);
        self.set_wheels_movement_velocities(wheels);
        self.rotate_wheels(wheels, delta_seconds);

        Ok(())
    }

    /// Returns the state of the wheel at the given position.
    pub fn wheel_state(&self, position: WheelPosition) -> &WheelState {
        &self.states[position.index()]
    }

    /// Returns the contribution of the angular velocity to the velocity of a wheel, i.e. the
    /// tangential velocity at the wheel offset.
    fn calc_angular(&self, angular_velocity: f64, position: WheelPosition) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, angular_velocity).cross(&self.geometry.offset(position))
    }

    /// Returns the contribution of the longitudinal velocity to the velocity of a wheel.
    fn calc_longitudinal(&self, longitudinal_velocity: f64) -> Vector3<f64> {
        Vector3::new(longitudinal_velocity, 0.0, 0.0)
    }

    /// Returns the contribution of the transversal velocity to the velocity of a wheel.
    fn calc_transversal(&self, transversal_velocity: f64) -> Vector3<f64> {
        match self.config.drive_model {
            DriveModel::SkidSteer => Vector3::zeros(),
            DriveModel::Mecanum | DriveModel::FourWheelSteer => {
                Vector3::new(0.0, transversal_velocity, 0.0)
            }
        }
    }

    /// Computes the spin of each wheel around its axle from the wheel velocity.
    fn calc_wheels_angular_velocity(&mut self, linear_velocities: &[Vector3<f64>; 4]) {
        let radius = self.geometry.wheel_radius();
        let drive_model = self.config.drive_model;

        for position in WheelPosition::ALL {
            let velocity = linear_velocities[position.index()];
            let state = &mut self.states[position.index()];

            let rolling_speed = match drive_model {
                // Rollers at 45 degrees: the front left and rear right wheels convert a move to
                // the left into a backwards spin, the other two into a forwards spin.
                DriveModel::Mecanum => {
                    let roller_sign = match position {
                        WheelPosition::FrontLeft | WheelPosition::RearRight => -1.0,
                        WheelPosition::FrontRight | WheelPosition::RearLeft => 1.0,
                    };
                    velocity.x + roller_sign * velocity.y
                }
                DriveModel::SkidSteer => velocity.x,
                DriveModel::FourWheelSteer => {
                    let (sin, cos) = state.steer_angle().sin_cos();
                    velocity.x * cos + velocity.y * sin
                }
            };

            state.set_velocities(velocity, rolling_speed / radius);
        }
    }

    /// Writes the spin and steering of the wheels to the meshes.
    fn rotate_wheels<W: WheelMesh>(&mut self, wheels: &mut WheelSet<W>, delta_seconds: f64) {
        for (position, wheel) in wheels.iter_mut() {
            let state = &mut self.states[position.index()];
            state.advance_spin(delta_seconds);
            wheel.set_rotation(state.rotation());
        }
    }

    /// Writes the linear and angular velocities of the wheels to the meshes.
    fn set_wheels_movement_velocities<W: WheelMesh>(&self, wheels: &mut WheelSet<W>) {
        for (position, wheel) in wheels.iter_mut() {
            let state = &self.states[position.index()];
            log_wheel_motion(position, state);

            wheel.set_linear_velocity(*state.linear_velocity());
            wheel.set_angular_velocity(state.angular_velocity());
        }
    }

    /// Steers the wheels so that they roll along their velocity.
    ///
    /// Only wheels of a [DriveModel::FourWheelSteer] base are steered. Of the two steering angles
    /// that align a wheel with its velocity, forwards and backwards, the one closest to the
    /// current steering angle is used. A wheel that does not move keeps its steering angle.
    fn shift_wheels_for_angular_movement(&mut self, linear_velocities: &[Vector3<f64>; 4]) {
        if self.config.drive_model != DriveModel::FourWheelSteer {
            return;
        }

        let space = PeriodicAngleSpace::centered();
        for position in WheelPosition::ALL {
            let velocity = linear_velocities[position.index()];
            if velocity.xy().norm() <= MINIMUM_STEERING_SPEED {
                continue;
            }

            let state = &mut self.states[position.index()];
            let current = state.steer_angle();
            let forwards = velocity.y.atan2(velocity.x);

            let to_forwards = space.smallest_distance_between_values(current, forwards);
            let to_backwards =
                space.smallest_distance_between_values(current, forwards + std::f64::consts::PI);

            let change = if to_backwards.abs() < to_forwards.abs() {
                to_backwards
            } else {
                to_forwards
            };

            state.set_steer_angle(current + change);
        }
    }
}

#[cfg_attr(test, mutants::skip)] // Logging only
fn log_wheel_motion(position: WheelPosition, state: &WheelState) {
    trace!(
        "Wheel {}: linear velocity {:?} cm/s, spin {} rad/s, steer {} rad",
        position,
        state.linear_velocity(),
        state.spin_velocity(),
        state.steer_angle()
    );
}
