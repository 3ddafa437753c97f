/// Defines the interface to the wheel meshes of the host and an in-memory implementation
pub mod wheel_mesh;

/// Defines the set of four wheels that belong to a robot base
pub mod wheel_set;

/// Provides the structure that stores the kinematic state of a wheel
pub mod wheel_state;
