use serde::{Deserialize, Serialize};

/// One pair of joint angles as received from the joint-state stream.
///
/// Both angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointSample {
    pub angle1: f64,
    pub angle2: f64,
}

impl JointSample {
    pub fn new(angle1: f64, angle2: f64) -> Self {
        Self { angle1, angle2 }
    }
}

/// Cartesian position of the arm tip in the plane of the base joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndEffectorPosition {
    pub x: f64,
    pub y: f64,
}

/// Link lengths and zero offsets of the arm, fixed for a whole session.
///
/// Offsets are stored in radians; see [`ArmGeometry::from_degree_offsets`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmGeometry {
    pub link_length1: f64,
    pub link_length2: f64,
    pub angle_offset1: f64,
    pub angle_offset2: f64,
}

impl ArmGeometry {
    /// Builds a geometry from offsets given in degrees, the unit used by the
    /// `Theta1_offset` / `Theta2_offset` parameters.
    pub fn from_degree_offsets(
        link_length1: f64,
        link_length2: f64,
        offset1_deg: f64,
        offset2_deg: f64,
    ) -> Self {
        Self {
            link_length1,
            link_length2,
            angle_offset1: offset1_deg.to_radians(),
            angle_offset2: offset2_deg.to_radians(),
        }
    }
}

/// A single entry of the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Raw received angles, before the offsets are applied.
    #[serde(rename = "joint angles")]
    pub joint_angles: [f64; 2],
    #[serde(rename = "end effector position")]
    pub end_effector_position: [f64; 2],
}

impl OutputRecord {
    pub fn new(sample: JointSample, position: EndEffectorPosition) -> Self {
        Self {
            joint_angles: [sample.angle1, sample.angle2],
            end_effector_position: [position.x, position.y],
        }
    }

    /// Renders the record as a one-element YAML sequence with both pairs in
    /// flow style:
    ///
    /// ```text
    /// - joint angles: [0.5, 1.0]
    ///   end effector position: [0.1, 1.9]
    /// ```
    ///
    /// Concatenated entries form a valid `Vec<OutputRecord>` document.
    pub fn to_yaml_entry(&self) -> Result<String, serde_yaml::Error> {
        Ok(format!(
            "- joint angles: {}\n  end effector position: {}\n",
            flow_pair(&self.joint_angles)?,
            flow_pair(&self.end_effector_position)?,
        ))
    }

    /// Parses a whole output file back into its records.
    pub fn parse_document(text: &str) -> Result<Vec<OutputRecord>, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yaml::from_str(text)
    }
}

// scalars go through serde_yaml so NaN and infinities keep their YAML spelling
fn flow_pair(pair: &[f64; 2]) -> Result<String, serde_yaml::Error> {
    let first = serde_yaml::to_string(&pair[0])?;
    let second = serde_yaml::to_string(&pair[1])?;
    Ok(format!("[{}, {}]", first.trim_end(), second.trim_end()))
}

/// Header of a joint-state message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Microseconds since the Unix epoch at publish time.
    pub stamp_us: u128,
    #[serde(default)]
    pub frame_id: String,
}

/// Joint-state message exchanged over the broker, JSON encoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointStateMessage {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub position: Vec<f64>,
    #[serde(default)]
    pub velocity: Vec<f64>,
    #[serde(default)]
    pub effort: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_entry_uses_external_key_names() {
        let record = OutputRecord::new(
            JointSample::new(0.5, 1.0),
            EndEffectorPosition { x: 2.0, y: 0.0 },
        );
        let entry = record.to_yaml_entry().unwrap();

        assert!(entry.starts_with("- "), "entry: {entry}");
        assert!(entry.contains("joint angles:"), "entry: {entry}");
        assert!(entry.contains("end effector position:"), "entry: {entry}");
    }

    #[test]
    fn pairs_are_written_in_flow_style() {
        let record = OutputRecord::new(
            JointSample::new(0.5, 1.0),
            EndEffectorPosition { x: 2.0, y: -0.25 },
        );
        assert_eq!(
            record.to_yaml_entry().unwrap(),
            "- joint angles: [0.5, 1.0]\n  end effector position: [2.0, -0.25]\n"
        );
    }

    #[test]
    fn non_finite_values_survive_parsing() {
        let record = OutputRecord::new(
            JointSample::new(f64::INFINITY, 0.0),
            EndEffectorPosition { x: f64::NAN, y: 0.0 },
        );
        let parsed = OutputRecord::parse_document(&record.to_yaml_entry().unwrap()).unwrap();
        assert_eq!(parsed[0].joint_angles[0], f64::INFINITY);
        assert!(parsed[0].end_effector_position[0].is_nan());
    }

    #[test]
    fn concatenated_entries_parse_in_order() {
        let first = OutputRecord::new(
            JointSample::new(0.0, 0.0),
            EndEffectorPosition { x: 2.0, y: 0.0 },
        );
        let second = OutputRecord::new(
            JointSample::new(1.25, -0.5),
            EndEffectorPosition { x: 0.1, y: 1.9 },
        );
        let mut document = first.to_yaml_entry().unwrap();
        document.push_str(&second.to_yaml_entry().unwrap());

        let parsed = OutputRecord::parse_document(&document).unwrap();
        assert_eq!(parsed, vec![first, second]);
    }

    #[test]
    fn empty_document_has_no_records() {
        assert!(OutputRecord::parse_document("").unwrap().is_empty());
        assert!(OutputRecord::parse_document("\n").unwrap().is_empty());
    }

    #[test]
    fn degree_offsets_are_stored_in_radians() {
        let geometry = ArmGeometry::from_degree_offsets(1.0, 2.0, 90.0, 180.0);
        assert!((geometry.angle_offset1 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((geometry.angle_offset2 - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn joint_state_tolerates_missing_optional_fields() {
        let msg: JointStateMessage =
            serde_json::from_str(r#"{"header":{"stamp_us":7},"position":[0.1,0.2]}"#).unwrap();
        assert_eq!(msg.header.stamp_us, 7);
        assert_eq!(msg.position, vec![0.1, 0.2]);
        assert!(msg.name.is_empty());
        assert!(msg.velocity.is_empty());
    }
}
