/// Derives the geometry constants of the base from the wheel meshes
pub mod geometry;

/// Provides the handler that turns a commanded base velocity into wheel motion
pub mod wheel_handler;
