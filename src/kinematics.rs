use crate::data_structure::{ArmGeometry, EndEffectorPosition, JointSample};

/// Forward kinematics of the 2-link planar arm.
///
/// Angles are radians. The configured offsets are subtracted from the raw
/// joint angles before use:
///
/// ```text
/// theta_i = angle_i - offset_i
/// x = l1 * cos(theta1) + l2 * cos(theta1 + theta2)
/// y = l1 * sin(theta1) + l2 * sin(theta1 + theta2)
/// ```
pub fn compute_end_effector(
    angle1: f64,
    angle2: f64,
    geometry: &ArmGeometry,
) -> EndEffectorPosition {
    let theta1 = angle1 - geometry.angle_offset1;
    let theta2 = angle2 - geometry.angle_offset2;

    let l1 = geometry.link_length1;
    let l2 = geometry.link_length2;

    // upper arm ends at the elbow, forearm direction is the summed angle
    let elbow_x = l1 * theta1.cos();
    let elbow_y = l1 * theta1.sin();

    EndEffectorPosition {
        x: elbow_x + l2 * (theta1 + theta2).cos(),
        y: elbow_y + l2 * (theta1 + theta2).sin(),
    }
}

pub fn compute_for_sample(sample: JointSample, geometry: &ArmGeometry) -> EndEffectorPosition {
    compute_end_effector(sample.angle1, sample.angle2, geometry)
}
