//! Derives the geometry constants of a rectangular four wheel base from the wheel meshes.
//!
//! The kinematics assume that the wheels form a rectangle that is symmetric around both the
//! longitudinal and the transversal axis of the base. The functions in this module compute the
//! distances between the wheels and the wheel diameter from the current mesh data and check
//! that assumption within a tolerance.

extern crate nalgebra as na;

use float_cmp::{ApproxEq, F64Margin};
use na::Vector3;
use tracing::{debug, warn};

use crate::{
    wheels::{
        wheel_mesh::WheelMesh,
        wheel_set::{WheelPosition, WheelSet},
    },
    Error,
};

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod geometry_tests;

/// The geometry constants of a rectangular four wheel base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryConstants {
    /// Half of the distance between the front left and the front right wheel.
    half_track_width: f64,

    /// Half of the distance between the front left and the rear left wheel.
    half_wheel_base: f64,

    /// The diameter of the wheels in centimeters.
    wheel_diameter: f64,
}

impl GeometryConstants {
    /// Derives the geometry constants from the current state of the wheel meshes.
    ///
    /// ## Errors
    ///
    /// * [Error::DegenerateWheelSize] - Returned when one of the wheels has a diameter that is
    ///   not a finite, positive number.
    pub fn from_wheels<W: WheelMesh>(
        wheels: &WheelSet<W>,
        margin: F64Margin,
    ) -> Result<Self, Error> {
        for (position, wheel) in wheels.iter() {
            let diameter = wheel_diameter(wheel);
            if !diameter.is_finite() || diameter <= 0.0 {
                return Err(Error::DegenerateWheelSize { wheel: position });
            }
        }

        let (half_track_width, half_wheel_base) = distance_between_wheels(wheels);
        let wheel_diameter = mean_wheel_diameter(wheels, margin);

        Ok(Self::new(half_track_width, half_wheel_base, wheel_diameter))
    }

    /// Returns half of the distance between the front left and the front right wheel.
    pub fn half_track_width(&self) -> f64 {
        self.half_track_width
    }

    /// Returns half of the distance between the front left and the rear left wheel.
    pub fn half_wheel_base(&self) -> f64 {
        self.half_wheel_base
    }

    /// Creates a new [GeometryConstants] instance.
    ///
    /// ## Parameters
    ///
    /// * 'half_track_width' - Half of the distance between the left and right wheels
    /// * 'half_wheel_base' - Half of the distance between the front and rear wheels
    /// * 'wheel_diameter' - The diameter of the wheels in centimeters
    pub fn new(half_track_width: f64, half_wheel_base: f64, wheel_diameter: f64) -> Self {
        Self {
            half_track_width,
            half_wheel_base,
            wheel_diameter,
        }
    }

    /// Returns the offset of the given wheel from the center of the base in the idealized
    /// rectangular layout.
    pub fn offset(&self, position: WheelPosition) -> Vector3<f64> {
        Vector3::new(
            position.longitudinal_sign() * self.half_wheel_base,
            position.transversal_sign() * self.half_track_width,
            0.0,
        )
    }

    /// Returns the diameter of the wheels in centimeters.
    pub fn wheel_diameter(&self) -> f64 {
        self.wheel_diameter
    }

    /// Returns the radius of the wheels in centimeters.
    pub fn wheel_radius(&self) -> f64 {
        0.5 * self.wheel_diameter
    }
}

/// Returns the diameter of a single wheel, the largest extent of its bounding box perpendicular
/// to the axle.
pub fn wheel_diameter<W: WheelMesh>(wheel: &W) -> f64 {
    let size = wheel.bounds_size();
    size.x.max(size.z)
}

/// Returns (half of front left to front right, half of front left to rear left).
pub fn distance_between_wheels<W: WheelMesh>(wheels: &WheelSet<W>) -> (f64, f64) {
    let front_left = wheels.get(WheelPosition::FrontLeft).location();
    let front_right = wheels.get(WheelPosition::FrontRight).location();
    let rear_left = wheels.get(WheelPosition::RearLeft).location();

    (
        0.5 * (front_left - front_right).norm(),
        0.5 * (front_left - rear_left).norm(),
    )
}

/// Returns a value indicating whether the wheels form a symmetric rectangle within the margin.
pub fn is_distance_between_wheels_valid<W: WheelMesh>(
    wheels: &WheelSet<W>,
    margin: F64Margin,
) -> bool {
    let front_left = wheels.get(WheelPosition::FrontLeft).location();
    let front_right = wheels.get(WheelPosition::FrontRight).location();
    let rear_left = wheels.get(WheelPosition::RearLeft).location();
    let rear_right = wheels.get(WheelPosition::RearRight).location();

    let front_track = (front_left - front_right).norm();
    let rear_track = (rear_left - rear_right).norm();
    let left_base = (front_left - rear_left).norm();
    let right_base = (front_right - rear_right).norm();
    let diagonal = (front_left - rear_right).norm();
    let other_diagonal = (front_right - rear_left).norm();

    if front_track <= margin.epsilon || left_base <= margin.epsilon {
        debug!(
            "Wheels are too close together. Track: {}, wheel base: {}",
            front_track, left_base
        );
        return false;
    }

    if !front_track.approx_eq(rear_track, margin) {
        debug!(
            "Front track {} differs from rear track {}",
            front_track, rear_track
        );
        return false;
    }

    if !left_base.approx_eq(right_base, margin) {
        debug!(
            "Left wheel base {} differs from right wheel base {}",
            left_base, right_base
        );
        return false;
    }

    if !diagonal.approx_eq(other_diagonal, margin) {
        debug!(
            "Wheels do not form a rectangle. Diagonals: {} and {}",
            diagonal, other_diagonal
        );
        return false;
    }

    // Both diagonals share their midpoint, which also catches a wheel moved out of the plane of
    // the other three. The difference equals the displacement of a single misplaced wheel.
    let midpoint_difference = (front_left + rear_right) - (front_right + rear_left);
    if !midpoint_difference
        .iter()
        .all(|&d| d.approx_eq(0.0, margin))
    {
        debug!(
            "Diagonals of the wheels do not cross at their midpoints. Difference: {:?}",
            midpoint_difference
        );
        return false;
    }

    let front_is_ahead = front_left.x > rear_left.x && front_right.x > rear_right.x;
    let left_is_left = front_left.y > front_right.y && rear_left.y > rear_right.y;
    if !front_is_ahead || !left_is_left {
        debug!("Wheels are not on the side of the base they are named for");
        return false;
    }

    true
}

/// Returns a value indicating whether all wheels have the same diameter within the margin.
pub fn are_wheel_diameters_uniform<W: WheelMesh>(
    wheels: &WheelSet<W>,
    margin: F64Margin,
) -> bool {
    let diameters = WheelPosition::ALL.map(|p| wheel_diameter(wheels.get(p)));
    diameters
        .iter()
        .enumerate()
        .all(|(i, &d)| diameters[i + 1..].iter().all(|&o| d.approx_eq(o, margin)))
}

/// Returns the mean diameter of the wheels.
///
/// Logs a warning when the wheel diameters deviate from each other by more than the margin. The
/// mean is returned in that case as well.
pub fn mean_wheel_diameter<W: WheelMesh>(wheels: &WheelSet<W>, margin: F64Margin) -> f64 {
    if !are_wheel_diameters_uniform(wheels, margin) {
        for (position, wheel) in wheels.iter() {
            warn!(
                "Wheel diameters deviate. The {} wheel ({}) has a diameter of {} cm",
                position,
                wheel.name(),
                wheel_diameter(wheel)
            );
        }
    }

    let total: f64 = wheels.iter().map(|(_, w)| wheel_diameter(w)).sum();
    total / WheelPosition::ALL.len() as f64
}
