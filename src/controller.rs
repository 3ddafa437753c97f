//! Provides the [BaseController], the component that owns the wheels of a robot base and drives
//! the [WheelHandler] once per tick.

extern crate nalgebra as na;

use crossbeam_channel::{Receiver, Sender};
use na::{Isometry2, Vector2, Vector3};
use tracing::{info, warn};

use crate::{
    config::{BaseControllerConfig, InvalidGeometryPolicy},
    kinematics::wheel_handler::WheelHandler,
    wheels::{wheel_mesh::WheelMesh, wheel_set::WheelSet},
    Error,
};

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;

/// Owns the wheels of a robot base and moves them according to the commanded velocity.
///
/// Velocity commands can be set directly or sent from other threads through the channel
/// returned by [BaseController::command_sender]. The commands are picked up at the start of
/// the next tick, the last one wins.
///
/// The controller also integrates the planar pose of the base in the world from the velocity
/// it drives.
pub struct BaseController<W: WheelMesh> {
    /// The configuration of the controller.
    config: BaseControllerConfig,

    /// The wheels of the base.
    wheels: WheelSet<W>,

    /// The handler that computes the wheel motion.
    handler: WheelHandler,

    /// The last commanded velocity (longitudinal, transversal, angular).
    commanded_velocity: Vector3<f64>,

    /// The template of the channel sender that is handed out to command sources.
    command_sender: Sender<Vector3<f64>>,

    /// The receiving end of the command channel, drained every tick.
    command_receiver: Receiver<Vector3<f64>>,

    /// A flag indicating whether the wheel geometry was valid when it was last checked.
    geometry_valid: bool,

    /// The pose of the base in the world.
    pose: Isometry2<f64>,
}

impl<W: WheelMesh> BaseController<W> {
    /// Returns a [Sender] that can be used to send velocity commands to the controller.
    pub fn command_sender(&self) -> Sender<Vector3<f64>> {
        self.command_sender.clone()
    }

    /// Returns the velocity that is currently commanded.
    pub fn commanded_velocity(&self) -> &Vector3<f64> {
        &self.commanded_velocity
    }

    /// Returns the configuration of the controller.
    pub fn config(&self) -> &BaseControllerConfig {
        &self.config
    }

    /// Returns the wheel handler.
    pub fn handler(&self) -> &WheelHandler {
        &self.handler
    }

    /// Returns a value indicating whether the wheel geometry was valid when it was last checked.
    pub fn is_geometry_valid(&self) -> bool {
        self.geometry_valid
    }

    /// Creates a new [BaseController] that owns the given wheels.
    ///
    /// ## Parameters
    ///
    /// * 'wheels' - The wheels of the base
    /// * 'config' - The configuration of the controller
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when the configuration is not valid.
    /// * [Error::DegenerateWheelSize] - Returned when no diameter can be derived for a wheel.
    pub fn new(wheels: WheelSet<W>, config: BaseControllerConfig) -> Result<Self, Error> {
        let handler = WheelHandler::new(&wheels, config.wheel_handler)?;
        let geometry_valid = handler.is_geometry_valid(&wheels);
        if geometry_valid {
            info!("Wheel geometry is valid");
        } else {
            warn!(
                "Wheel geometry is invalid, policy is {:?}",
                config.invalid_geometry_policy
            );
        }

        let (command_sender, command_receiver) = crossbeam_channel::unbounded();

        Ok(Self {
            config,
            wheels,
            handler,
            commanded_velocity: Vector3::zeros(),
            command_sender,
            command_receiver,
            geometry_valid,
            pose: Isometry2::identity(),
        })
    }

    /// Returns the pose of the base in the world.
    pub fn pose(&self) -> &Isometry2<f64> {
        &self.pose
    }

    /// Derives the geometry constants again and checks the geometry. Should be called after the
    /// wheel meshes have been changed.
    ///
    /// Returns a value indicating whether the geometry is valid.
    ///
    /// ## Errors
    ///
    /// * [Error::DegenerateWheelSize] - Returned when no diameter can be derived for a wheel.
    pub fn revalidate_geometry(&mut self) -> Result<bool, Error> {
        self.handler.refresh_geometry(&self.wheels)?;
        self.geometry_valid = self.handler.is_geometry_valid(&self.wheels);
        if !self.geometry_valid {
            warn!("Wheel geometry is invalid after revalidation");
        }

        Ok(self.geometry_valid)
    }

    /// Sets the velocity that is driven from the next tick on.
    pub fn set_velocity(&mut self, velocity: Vector3<f64>) {
        self.commanded_velocity = velocity;
    }

    /// Moves the wheels and the base for a single tick.
    ///
    /// ## Parameters
    ///
    /// * 'delta_seconds' - The length of the tick in seconds
    ///
    /// ## Errors
    ///
    /// * [Error::NonFiniteVelocity] - Returned when the commanded velocity is not finite. The
    ///   command is cleared and the wheels are stopped.
    /// * [Error::InvalidTimeStep] - Returned when the time step is negative or not finite.
    pub fn tick(&mut self, delta_seconds: f64) -> Result<(), Error> {
        if let Some(velocity) = self.command_receiver.try_iter().last() {
            self.commanded_velocity = velocity;
        }

        let velocity = if !self.geometry_valid
            && self.config.invalid_geometry_policy == InvalidGeometryPolicy::Halt
        {
            Vector3::zeros()
        } else {
            self.commanded_velocity
        };

        match self
            .handler
            .setup_wheels_movement(&mut self.wheels, velocity, delta_seconds)
        {
            Ok(()) => {}
            Err(Error::NonFiniteVelocity) => {
                warn!(
                    "Rejected velocity command {:?}, stopping the wheels",
                    velocity
                );
                self.commanded_velocity = Vector3::zeros();
                self.handler
                    .setup_wheels_movement(&mut self.wheels, Vector3::zeros(), 0.0)?;
                return Err(Error::NonFiniteVelocity);
            }
            Err(e) => return Err(e),
        }

        let driven_velocity = self.handler.driven_velocity(&velocity);
        self.integrate_pose(&driven_velocity, delta_seconds);
        Ok(())
    }

    /// Returns the wheels of the base.
    pub fn wheels(&self) -> &WheelSet<W> {
        &self.wheels
    }

    /// Returns the wheels of the base for modification. Call [BaseController::revalidate_geometry]
    /// after changing the wheel locations or sizes.
    pub fn wheels_mut(&mut self) -> &mut WheelSet<W> {
        &mut self.wheels
    }

    /// Advances the pose of the base using the heading at the middle of the tick.
    fn integrate_pose(&mut self, velocity: &Vector3<f64>, delta_seconds: f64) {
        let heading = self.pose.rotation.angle();
        let mid_heading = heading + 0.5 * velocity.z * delta_seconds;

        let (sin, cos) = mid_heading.sin_cos();
        let displacement = Vector2::new(
            velocity.x * cos - velocity.y * sin,
            velocity.x * sin + velocity.y * cos,
        ) * delta_seconds;

        self.pose = Isometry2::new(
            self.pose.translation.vector + displacement,
            heading + velocity.z * delta_seconds,
        );
    }
}
