extern crate nalgebra as na;

use na::{UnitQuaternion, Vector3};

#[cfg(test)]
#[path = "wheel_mesh_tests.rs"]
mod wheel_mesh_tests;

/// Defines the interface for a mesh that represents a single wheel of the base.
///
/// The mesh is owned by the host. The kinematics only read the location and size of the mesh
/// and write the rotation and the velocities.
///
/// All vectors are expressed in the base frame (X forward, Y left, Z up) and all lengths are in
/// centimeters.
pub trait WheelMesh {
    /// Returns the human readable name of the wheel.
    fn name(&self) -> &str;

    /// Returns the location of the wheel center relative to the origin of the base.
    fn location(&self) -> Vector3<f64>;

    /// Returns the full size of the axis aligned bounding box of the mesh in its own, unrotated,
    /// frame. The axle of the wheel is along the Y-axis of that frame.
    fn bounds_size(&self) -> Vector3<f64>;

    /// Returns the current rotation of the mesh relative to the base.
    fn rotation(&self) -> UnitQuaternion<f64>;

    /// Sets the rotation of the mesh relative to the base.
    fn set_rotation(&mut self, rotation: UnitQuaternion<f64>);

    /// Sets the linear velocity, in cm/s, of the wheel center.
    fn set_linear_velocity(&mut self, velocity: Vector3<f64>);

    /// Sets the angular velocity, in rad/s, of the wheel.
    fn set_angular_velocity(&mut self, velocity: Vector3<f64>);
}

/// A [WheelMesh] that only stores the values written to it.
///
/// Used when the kinematics run without a host, e.g. for simulations and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticWheelMesh {
    name: String,
    location: Vector3<f64>,
    bounds_size: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
    linear_velocity: Vector3<f64>,
    angular_velocity: Vector3<f64>,
}

impl StaticWheelMesh {
    /// Returns the angular velocity that was last written to the mesh.
    pub fn angular_velocity(&self) -> &Vector3<f64> {
        &self.angular_velocity
    }

    /// Returns the linear velocity that was last written to the mesh.
    pub fn linear_velocity(&self) -> &Vector3<f64> {
        &self.linear_velocity
    }

    /// Creates a new [StaticWheelMesh] with an identity rotation and zero velocities.
    ///
    /// ## Parameters
    ///
    /// * 'name' - The name of the wheel
    /// * 'location' - The location of the wheel center relative to the base origin
    /// * 'bounds_size' - The full size of the bounding box of the wheel
    pub fn new(name: String, location: Vector3<f64>, bounds_size: Vector3<f64>) -> Self {
        Self {
            name,
            location,
            bounds_size,
            rotation: UnitQuaternion::identity(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }

    /// Creates a new cylindrical wheel with the given diameter and width.
    pub fn cylinder(name: String, location: Vector3<f64>, diameter: f64, width: f64) -> Self {
        Self::new(name, location, Vector3::new(diameter, width, diameter))
    }

    /// Moves the wheel to a new location.
    pub fn set_location(&mut self, location: Vector3<f64>) {
        self.location = location;
    }

    /// Changes the size of the bounding box of the wheel.
    pub fn set_bounds_size(&mut self, bounds_size: Vector3<f64>) {
        self.bounds_size = bounds_size;
    }
}

impl WheelMesh for StaticWheelMesh {
    fn name(&self) -> &str {
        self.name.as_ref()
    }

    fn location(&self) -> Vector3<f64> {
        self.location
    }

    fn bounds_size(&self) -> Vector3<f64> {
        self.bounds_size
    }

    fn rotation(&self) -> UnitQuaternion<f64> {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: UnitQuaternion<f64>) {
        self.rotation = rotation;
    }

    fn set_linear_velocity(&mut self, velocity: Vector3<f64>) {
        self.linear_velocity = velocity;
    }

    fn set_angular_velocity(&mut self, velocity: Vector3<f64>) {
        self.angular_velocity = velocity;
    }
}
