use std::{f64::consts::PI, thread};

use float_cmp::{ApproxEq, F64Margin};
use nalgebra::Vector3;

use crate::{
    config::{BaseControllerConfig, DriveModel, InvalidGeometryPolicy, WheelHandlerConfig},
    wheels::{
        wheel_mesh::StaticWheelMesh,
        wheel_set::{WheelPosition, WheelSet},
    },
    Error,
};

use super::BaseController;

fn margin() -> F64Margin {
    F64Margin {
        epsilon: 1e-9,
        ulps: 4,
    }
}

fn create_wheels() -> WheelSet<StaticWheelMesh> {
    WheelSet::rectangle(25.0, 20.0, 10.0, 4.0)
}

fn create_asymmetric_wheels() -> WheelSet<StaticWheelMesh> {
    let mut wheels = create_wheels();
    wheels
        .get_mut(WheelPosition::RearRight)
        .set_location(Vector3::new(-25.0, -23.0, 0.0));
    wheels
}

fn create_config(policy: InvalidGeometryPolicy) -> BaseControllerConfig {
    BaseControllerConfig {
        wheel_handler: WheelHandlerConfig::default(),
        invalid_geometry_policy: policy,
    }
}

#[test]
fn when_creating_controller_should_be_at_rest() {
    let controller = BaseController::new(create_wheels(), BaseControllerConfig::default()).unwrap();

    assert!(controller.is_geometry_valid());
    assert_eq!(&Vector3::zeros(), controller.commanded_velocity());
    assert_eq!(0.0, controller.pose().translation.vector.norm());
    assert_eq!(0.0, controller.pose().rotation.angle());
    assert_eq!(
        DriveModel::Mecanum,
        controller.handler().config().drive_model
    );
    assert_eq!(
        InvalidGeometryPolicy::Halt,
        controller.config().invalid_geometry_policy
    );
}

#[test]
fn when_creating_controller_with_flat_wheel_should_fail() {
    let mut wheels = create_wheels();
    wheels
        .get_mut(WheelPosition::FrontRight)
        .set_bounds_size(Vector3::new(0.0, 4.0, 0.0));

    match BaseController::new(wheels, BaseControllerConfig::default()) {
        Err(Error::DegenerateWheelSize { wheel }) => assert_eq!(WheelPosition::FrontRight, wheel),
        Err(e) => panic!("Expected a degenerate wheel error, got {}", e),
        Ok(_) => panic!("Expected a degenerate wheel error"),
    }
}

#[test]
fn when_ticking_should_drive_commanded_velocity() {
    let mut controller =
        BaseController::new(create_wheels(), BaseControllerConfig::default()).unwrap();

    controller.set_velocity(Vector3::new(10.0, 0.0, 0.0));
    controller.tick(0.5).unwrap();

    for (_, wheel) in controller.wheels().iter() {
        assert_eq!(&Vector3::new(10.0, 0.0, 0.0), wheel.linear_velocity());
        assert_eq!(&Vector3::new(0.0, 2.0, 0.0), wheel.angular_velocity());
    }

    assert!(controller.pose().translation.vector.x.approx_eq(5.0, margin()));
    assert!(controller.pose().translation.vector.y.approx_eq(0.0, margin()));
}

#[test]
fn when_commands_are_queued_last_command_should_win() {
    let mut controller =
        BaseController::new(create_wheels(), BaseControllerConfig::default()).unwrap();
    let sender = controller.command_sender();

    let handle = thread::spawn(move || {
        sender.send(Vector3::new(1.0, 0.0, 0.0)).unwrap();
        sender.send(Vector3::new(2.0, 0.0, 0.0)).unwrap();
        sender.send(Vector3::new(0.0, 3.0, 0.0)).unwrap();
    });
    handle.join().unwrap();

    controller.tick(0.1).unwrap();

    assert_eq!(&Vector3::new(0.0, 3.0, 0.0), controller.commanded_velocity());
    for (_, wheel) in controller.wheels().iter() {
        assert_eq!(&Vector3::new(0.0, 3.0, 0.0), wheel.linear_velocity());
    }

    // Without new commands the last one is kept
    controller.tick(0.1).unwrap();
    assert_eq!(&Vector3::new(0.0, 3.0, 0.0), controller.commanded_velocity());
}

#[test]
fn when_geometry_is_invalid_and_policy_is_halt_wheels_should_not_move() {
    let mut controller =
        BaseController::new(create_asymmetric_wheels(), create_config(InvalidGeometryPolicy::Halt))
            .unwrap();
    assert!(!controller.is_geometry_valid());

    controller.set_velocity(Vector3::new(10.0, 5.0, 0.3));
    controller.tick(1.0).unwrap();

    for (_, wheel) in controller.wheels().iter() {
        assert_eq!(&Vector3::zeros(), wheel.linear_velocity());
        assert_eq!(&Vector3::zeros(), wheel.angular_velocity());
    }
    assert_eq!(0.0, controller.pose().translation.vector.norm());

    // The command is kept for when the geometry is fixed
    assert_eq!(&Vector3::new(10.0, 5.0, 0.3), controller.commanded_velocity());
}

#[test]
fn when_geometry_is_invalid_and_policy_is_proceed_wheels_should_move() {
    let mut controller = BaseController::new(
        create_asymmetric_wheels(),
        create_config(InvalidGeometryPolicy::Proceed),
    )
    .unwrap();
    assert!(!controller.is_geometry_valid());

    controller.set_velocity(Vector3::new(10.0, 0.0, 0.0));
    controller.tick(1.0).unwrap();

    for (_, wheel) in controller.wheels().iter() {
        assert_eq!(&Vector3::new(10.0, 0.0, 0.0), wheel.linear_velocity());
    }
}

#[test]
fn when_geometry_is_fixed_revalidation_should_resume_motion() {
    let mut controller =
        BaseController::new(create_asymmetric_wheels(), create_config(InvalidGeometryPolicy::Halt))
            .unwrap();
    controller.set_velocity(Vector3::new(10.0, 0.0, 0.0));

    controller
        .wheels_mut()
        .get_mut(WheelPosition::RearRight)
        .set_location(Vector3::new(-25.0, -20.0, 0.0));
    assert_eq!(Ok(true), controller.revalidate_geometry());

    controller.tick(1.0).unwrap();

    for (_, wheel) in controller.wheels().iter() {
        assert_eq!(&Vector3::new(10.0, 0.0, 0.0), wheel.linear_velocity());
    }
}

#[test]
fn when_geometry_breaks_revalidation_should_report_invalid() {
    let mut controller =
        BaseController::new(create_wheels(), BaseControllerConfig::default()).unwrap();

    controller
        .wheels_mut()
        .get_mut(WheelPosition::FrontLeft)
        .set_location(Vector3::new(40.0, 20.0, 0.0));

    assert_eq!(Ok(false), controller.revalidate_geometry());
    assert!(!controller.is_geometry_valid());
}

#[test]
fn when_command_is_not_finite_should_stop_and_clear_command() {
    let mut controller =
        BaseController::new(create_wheels(), BaseControllerConfig::default()).unwrap();
    controller.set_velocity(Vector3::new(10.0, 0.0, 0.0));
    controller.tick(0.1).unwrap();

    controller.set_velocity(Vector3::new(10.0, f64::INFINITY, 0.0));
    assert_eq!(Err(Error::NonFiniteVelocity), controller.tick(0.1));

    assert_eq!(&Vector3::zeros(), controller.commanded_velocity());
    for (_, wheel) in controller.wheels().iter() {
        assert_eq!(&Vector3::zeros(), wheel.linear_velocity());
    }
}

#[test]
fn when_time_step_is_invalid_should_fail_without_moving_pose() {
    let mut controller =
        BaseController::new(create_wheels(), BaseControllerConfig::default()).unwrap();
    controller.set_velocity(Vector3::new(10.0, 0.0, 0.0));

    assert_eq!(
        Err(Error::InvalidTimeStep {
            delta_seconds: -1.0
        }),
        controller.tick(-1.0)
    );
    assert_eq!(0.0, controller.pose().translation.vector.norm());
}

#[test]
fn when_turning_in_place_pose_should_only_rotate() {
    let mut controller =
        BaseController::new(create_wheels(), BaseControllerConfig::default()).unwrap();
    controller.set_velocity(Vector3::new(0.0, 0.0, 0.25 * PI));

    for _ in 0..4 {
        controller.tick(0.5).unwrap();
    }

    assert!(controller.pose().rotation.angle().approx_eq(0.5 * PI, margin()));
    assert!(controller.pose().translation.vector.norm().approx_eq(0.0, margin()));
}

#[test]
fn when_driving_a_circle_pose_should_return_to_start() {
    let mut controller =
        BaseController::new(create_wheels(), BaseControllerConfig::default()).unwrap();

    // Radius of 100 cm, one full turn in 20 seconds
    let angular_velocity = 2.0 * PI / 20.0;
    controller.set_velocity(Vector3::new(100.0 * angular_velocity, 0.0, angular_velocity));

    for _ in 0..200 {
        controller.tick(0.1).unwrap();
    }

    let pose = controller.pose();
    assert!(pose.translation.vector.norm() < 1e-6);
    assert!(pose.rotation.angle().abs() < 1e-6);
}

#[test]
fn when_driving_sideways_after_turning_pose_should_move_in_world_frame() {
    let mut controller =
        BaseController::new(create_wheels(), BaseControllerConfig::default()).unwrap();

    controller.set_velocity(Vector3::new(0.0, 0.0, 0.5 * PI));
    controller.tick(1.0).unwrap();

    // Facing along the world Y-axis, moving to the left of the base moves along negative X
    controller.set_velocity(Vector3::new(0.0, 10.0, 0.0));
    controller.tick(1.0).unwrap();

    let translation = controller.pose().translation.vector;
    assert!(translation.x.approx_eq(-10.0, margin()));
    assert!(translation.y.approx_eq(0.0, margin()));
}

#[test]
fn when_base_is_skid_steer_transversal_command_should_not_move_pose() {
    let config = BaseControllerConfig {
        wheel_handler: WheelHandlerConfig {
            drive_model: DriveModel::SkidSteer,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut controller = BaseController::new(create_wheels(), config).unwrap();

    controller.set_velocity(Vector3::new(0.0, 10.0, 0.0));
    controller.tick(1.0).unwrap();

    for (_, wheel) in controller.wheels().iter() {
        assert_eq!(&Vector3::zeros(), wheel.linear_velocity());
    }
    assert_eq!(0.0, controller.pose().translation.vector.norm());
}

#[test]
fn when_base_is_skid_steer_pose_should_follow_longitudinal_and_angular_command() {
    let config = BaseControllerConfig {
        wheel_handler: WheelHandlerConfig {
            drive_model: DriveModel::SkidSteer,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut controller = BaseController::new(create_wheels(), config).unwrap();

    controller.set_velocity(Vector3::new(10.0, 5.0, 0.5 * PI));
    controller.tick(1.0).unwrap();

    // Only the forward motion along the midpoint heading of a quarter turn remains
    let translation = controller.pose().translation.vector;
    let mid_heading = 0.25 * PI;
    assert!(translation.x.approx_eq(10.0 * mid_heading.cos(), margin()));
    assert!(translation.y.approx_eq(10.0 * mid_heading.sin(), margin()));
    assert!(controller.pose().rotation.angle().approx_eq(0.5 * PI, margin()));
}
