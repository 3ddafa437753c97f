extern crate nalgebra as na;

use std::fmt::Display;

use na::Vector3;

use super::wheel_mesh::{StaticWheelMesh, WheelMesh};

#[cfg(test)]
#[path = "wheel_set_tests.rs"]
mod wheel_set_tests;

/// Identifies one of the four wheels of the base.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum WheelPosition {
    /// The wheel at the front on the left side.
    FrontLeft,
    /// The wheel at the front on the right side.
    FrontRight,
    /// The wheel at the rear on the left side.
    RearLeft,
    /// The wheel at the rear on the right side.
    RearRight,
}

impl WheelPosition {
    /// All wheel positions, in the order used by [WheelSet::iter].
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::FrontLeft,
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ];

    /// Returns the index of the position in [WheelPosition::ALL].
    pub fn index(&self) -> usize {
        match self {
            WheelPosition::FrontLeft => 0,
            WheelPosition::FrontRight => 1,
            WheelPosition::RearLeft => 2,
            WheelPosition::RearRight => 3,
        }
    }

    /// Returns a value indicating whether the wheel is on the front axle.
    pub fn is_front(&self) -> bool {
        matches!(self, WheelPosition::FrontLeft | WheelPosition::FrontRight)
    }

    /// Returns a value indicating whether the wheel is on the left side of the base.
    pub fn is_left(&self) -> bool {
        matches!(self, WheelPosition::FrontLeft | WheelPosition::RearLeft)
    }

    /// Returns the sign of the X-coordinate of the wheel relative to the base center.
    pub fn longitudinal_sign(&self) -> f64 {
        if self.is_front() {
            1.0
        } else {
            -1.0
        }
    }

    /// Returns the sign of the Y-coordinate of the wheel relative to the base center.
    pub fn transversal_sign(&self) -> f64 {
        if self.is_left() {
            1.0
        } else {
            -1.0
        }
    }
}

impl Display for WheelPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WheelPosition::FrontLeft => "front left",
            WheelPosition::FrontRight => "front right",
            WheelPosition::RearLeft => "rear left",
            WheelPosition::RearRight => "rear right",
        };
        write!(f, "{}", name)
    }
}

/// The four wheels of a robot base, addressed by their [WheelPosition].
///
/// The wheels are laid out in a rectangle, the geometry of which is checked by the
/// [WheelHandler](crate::kinematics::wheel_handler::WheelHandler).
#[derive(Clone, Debug, PartialEq)]
pub struct WheelSet<W> {
    /// The wheels, stored in the order of [WheelPosition::ALL].
    wheels: [W; 4],
}

impl<W: WheelMesh> WheelSet<W> {
    /// Returns the wheel at the given position.
    pub fn get(&self, position: WheelPosition) -> &W {
        &self.wheels[position.index()]
    }

    /// Returns the wheel at the given position for modification.
    pub fn get_mut(&mut self, position: WheelPosition) -> &mut W {
        &mut self.wheels[position.index()]
    }

    /// Returns an iterator over the positions and the wheels.
    pub fn iter(&self) -> impl Iterator<Item = (WheelPosition, &W)> {
        WheelPosition::ALL.into_iter().zip(self.wheels.iter())
    }

    /// Returns an iterator over the positions and the wheels that allows modifying the wheels.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (WheelPosition, &mut W)> {
        WheelPosition::ALL.into_iter().zip(self.wheels.iter_mut())
    }

    /// Creates a new [WheelSet].
    ///
    /// ## Parameters
    ///
    /// * 'front_left' - The front left wheel
    /// * 'front_right' - The front right wheel
    /// * 'rear_left' - The rear left wheel
    /// * 'rear_right' - The rear right wheel
    pub fn new(front_left: W, front_right: W, rear_left: W, rear_right: W) -> Self {
        Self {
            wheels: [front_left, front_right, rear_left, rear_right],
        }
    }
}

impl WheelSet<StaticWheelMesh> {
    /// Creates a set of cylindrical [StaticWheelMesh] wheels laid out in a rectangle centered
    /// on the base origin.
    ///
    /// ## Parameters
    ///
    /// * 'half_wheel_base' - Half of the distance between the front and rear axles
    /// * 'half_track_width' - Half of the distance between the left and right wheels
    /// * 'diameter' - The diameter of the wheels
    /// * 'width' - The width of the wheels
    pub fn rectangle(
        half_wheel_base: f64,
        half_track_width: f64,
        diameter: f64,
        width: f64,
    ) -> Self {
        let wheels = WheelPosition::ALL.map(|position| {
            StaticWheelMesh::cylinder(
                position.to_string(),
                Vector3::new(
                    position.longitudinal_sign() * half_wheel_base,
                    position.transversal_sign() * half_track_width,
                    0.0,
                ),
                diameter,
                width,
            )
        });

        Self { wheels }
    }
}
