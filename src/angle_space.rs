//! Defines a periodic number space for angles.
//!
//! Angles wrap around, i.e. in order to go from the lower boundary to the upper boundary of the
//! space you can either pass through all the values in between, or go backwards from the lower
//! boundary and end up directly at the upper boundary. Wheel spin angles and steering angles both
//! live in such a space.
//!
//! The space is always 2 * [Pi](core::f64::consts::PI) in size and starts at a configurable angle.

use std::f64::consts::PI;

#[cfg(test)]
#[path = "angle_space_tests.rs"]
mod angle_space_tests;

/// Defines a periodic number space that wraps around every 2 * PI radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicAngleSpace {
    range_start_in_radians: f64,
    range_size: f64,
}

impl PeriodicAngleSpace {
    /// Creates a new [PeriodicAngleSpace] covering `[start_angle_in_radians, start_angle_in_radians + 2 PI)`.
    pub fn new_with_two_pi_range(start_angle_in_radians: f64) -> Self {
        Self {
            range_start_in_radians: start_angle_in_radians,
            range_size: 2.0 * PI,
        }
    }

    /// Returns the space `[-PI, PI)`, used for steering angles.
    pub fn centered() -> Self {
        Self::new_with_two_pi_range(-PI)
    }

    /// Returns the space `[0, 2 PI)`, used for accumulated wheel spin.
    pub fn positive() -> Self {
        Self::new_with_two_pi_range(0.0)
    }

    /// Returns the value in the space that is equivalent to the given angle.
    ///
    /// ## Example
    ///
    /// ```
    /// use core::f64::consts::PI;
    /// use mecanum_base_kinematics::angle_space::PeriodicAngleSpace;
    ///
    /// let space = PeriodicAngleSpace::positive();
    /// assert!((space.normalize_value(5.0 * PI) - PI).abs() < 1e-12);
    /// assert_eq!(0.5, space.normalize_value(0.5));
    /// ```
    pub fn normalize_value(&self, value: f64) -> f64 {
        let offset = (value - self.range_start_in_radians).rem_euclid(self.range_size);

        // rem_euclid may round up to the range size for tiny negative offsets
        if offset >= self.range_size {
            self.range_start_in_radians
        } else {
            self.range_start_in_radians + offset
        }
    }

    /// Returns the signed smallest rotation that takes `start` to `end`.
    ///
    /// The result is in `[-PI, PI)`, so crossing the boundary of the space is preferred over
    /// taking the long way around.
    ///
    /// ## Example
    ///
    /// ```
    /// use core::f64::consts::PI;
    /// use mecanum_base_kinematics::angle_space::PeriodicAngleSpace;
    ///
    /// let space = PeriodicAngleSpace::positive();
    /// let value = space.smallest_distance_between_values(0.0, 1.5 * PI);
    /// assert!((value + 0.5 * PI).abs() < 1e-12);
    /// ```
    pub fn smallest_distance_between_values(&self, start: f64, end: f64) -> f64 {
        let diff = (end - start).rem_euclid(self.range_size);
        if diff >= 0.5 * self.range_size {
            diff - self.range_size
        } else {
            diff
        }
    }
}

impl Default for PeriodicAngleSpace {
    fn default() -> Self {
        Self::centered()
    }
}
