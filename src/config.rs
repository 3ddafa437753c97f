//! Defines the configuration for the [WheelHandler](crate::kinematics::wheel_handler::WheelHandler)
//! and the [BaseController](crate::controller::BaseController).

use float_cmp::F64Margin;

use crate::Error;

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

/// The default tolerance, in centimeters, for the wheel geometry comparisons.
pub const DEFAULT_TOLERANCE_IN_CENTIMETER: f64 = 0.1;

/// The default number of units-in-the-last-place used for the wheel geometry comparisons.
pub const DEFAULT_ULPS: i64 = 4;

/// Defines the kinematic model that is used to turn the wheel velocities into wheel spin and
/// steering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DriveModel {
    /// Four mecanum wheels with the rollers in the X configuration. The base can move in
    /// any direction without steering the wheels.
    #[default]
    Mecanum,

    /// Four fixed wheels that turn the base by skidding. Transversal commands cannot be
    /// executed and are dropped.
    SkidSteer,

    /// Four independently steered wheels. Each wheel steers towards its own velocity direction.
    FourWheelSteer,
}

/// Defines what the [BaseController](crate::controller::BaseController) does when the wheel
/// geometry is not valid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidGeometryPolicy {
    /// Keep the wheels stopped until the geometry has been fixed.
    #[default]
    Halt,

    /// Drive the wheels even though the results of the kinematics may be off.
    Proceed,
}

/// Configuration for the [WheelHandler](crate::kinematics::wheel_handler::WheelHandler).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WheelHandlerConfig {
    /// The maximum difference, in centimeters, between two wheel distances or two wheel
    /// diameters that are expected to be equal.
    pub tolerance_in_centimeter: f64,

    /// The maximum difference, in units-in-the-last-place, between two wheel distances or two
    /// wheel diameters that are expected to be equal.
    pub ulps: i64,

    /// The kinematic model of the wheels.
    pub drive_model: DriveModel,
}

impl WheelHandlerConfig {
    /// Returns the comparison margin for the geometry checks.
    pub fn margin(&self) -> F64Margin {
        F64Margin {
            epsilon: self.tolerance_in_centimeter,
            ulps: self.ulps,
        }
    }

    /// Checks that the configuration values are usable.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when the tolerance is not a finite, positive
    ///   number or when the ulps are negative.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.tolerance_in_centimeter.is_finite() || self.tolerance_in_centimeter <= 0.0 {
            return Err(Error::InvalidConfiguration {
                name: "tolerance_in_centimeter".to_string(),
                value: self.tolerance_in_centimeter,
            });
        }

        if self.ulps < 0 {
            return Err(Error::InvalidConfiguration {
                name: "ulps".to_string(),
                value: self.ulps as f64,
            });
        }

        Ok(())
    }
}

impl Default for WheelHandlerConfig {
    fn default() -> Self {
        Self {
            tolerance_in_centimeter: DEFAULT_TOLERANCE_IN_CENTIMETER,
            ulps: DEFAULT_ULPS,
            drive_model: DriveModel::default(),
        }
    }
}

/// Configuration for the [BaseController](crate::controller::BaseController).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BaseControllerConfig {
    /// The configuration of the wheel handler owned by the controller.
    pub wheel_handler: WheelHandlerConfig,

    /// What to do when the wheel geometry is invalid.
    pub invalid_geometry_policy: InvalidGeometryPolicy,
}
