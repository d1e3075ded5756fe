use crate::data_structure::{Header, JointStateMessage};
use crate::now_micros;
use rand::Rng;

pub const JOINT_NAMES: [&str; 2] = ["joint1", "joint2"];

/// Generates one joint-state message with both angles drawn uniformly
/// from `0..max_angle_centi` hundredths of a radian.
pub fn random_joint_state<R: Rng + ?Sized>(rng: &mut R, max_angle_centi: u32) -> JointStateMessage {
    let upper = max_angle_centi.max(1);
    let joint1_pos = rng.random_range(0..upper) as f64 / 100.0;
    let joint2_pos = rng.random_range(0..upper) as f64 / 100.0;

    JointStateMessage {
        header: Header {
            stamp_us: now_micros(),
            frame_id: String::new(),
        },
        name: JOINT_NAMES.iter().map(|n| n.to_string()).collect(),
        position: vec![joint1_pos, joint2_pos],
        velocity: Vec::new(),
        effort: Vec::new(),
    }
}
