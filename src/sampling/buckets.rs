// Trajectory bucketing
// Discretizes camera-trajectory magnitudes into the buckets used for dynamics balancing.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::config::DynamicsConfig;
use crate::constants::TRAJ_TURNS_MAX_BUCKET;
use crate::manifest::ClipRecord;

/// Magnitude bucket for moveDist / rotAngle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeBucket {
    S,
    M,
    L,
    XL,
}

impl SizeBucket {
    /// Bucket a value against three exclusive upper edges
    pub fn from_value(value: f64, edges: &[f64; 3]) -> Self {
        if value < edges[0] {
            SizeBucket::S
        } else if value < edges[1] {
            SizeBucket::M
        } else if value < edges[2] {
            SizeBucket::L
        } else {
            SizeBucket::XL
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeBucket::S => "S",
            SizeBucket::M => "M",
            SizeBucket::L => "L",
            SizeBucket::XL => "XL",
        }
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn-count bucket: exact counts up to 2, then "3+"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurnBucket(i64);

impl TurnBucket {
    pub fn from_turns(turns: i64) -> Self {
        TurnBucket(turns.clamp(0, TRAJ_TURNS_MAX_BUCKET))
    }

    pub fn label(&self) -> String {
        if self.0 >= TRAJ_TURNS_MAX_BUCKET {
            format!("{}+", TRAJ_TURNS_MAX_BUCKET)
        } else {
            self.0.to_string()
        }
    }
}

impl fmt::Display for TurnBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// The three trajectory buckets for one clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrajectoryBins {
    pub move_bin: SizeBucket,
    pub rot_bin: SizeBucket,
    pub turn_bin: TurnBucket,
}

impl TrajectoryBins {
    pub fn for_record(record: &ClipRecord, config: &DynamicsConfig) -> Self {
        Self {
            move_bin: SizeBucket::from_value(record.move_dist, &config.move_dist_edges),
            rot_bin: SizeBucket::from_value(record.rot_angle, &config.rot_angle_edges),
            turn_bin: TurnBucket::from_turns(record.traj_turns),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MOVE_DIST_EDGES, ROT_ANGLE_EDGES};

    #[test]
    fn test_move_dist_edges() {
        assert_eq!(SizeBucket::from_value(0.0, &MOVE_DIST_EDGES), SizeBucket::S);
        assert_eq!(SizeBucket::from_value(0.49, &MOVE_DIST_EDGES), SizeBucket::S);
        assert_eq!(SizeBucket::from_value(0.5, &MOVE_DIST_EDGES), SizeBucket::M);
        assert_eq!(SizeBucket::from_value(2.99, &MOVE_DIST_EDGES), SizeBucket::M);
        assert_eq!(SizeBucket::from_value(3.0, &MOVE_DIST_EDGES), SizeBucket::L);
        assert_eq!(SizeBucket::from_value(8.0, &MOVE_DIST_EDGES), SizeBucket::XL);
        assert_eq!(SizeBucket::from_value(120.0, &MOVE_DIST_EDGES), SizeBucket::XL);
    }

    #[test]
    fn test_rot_angle_edges() {
        assert_eq!(SizeBucket::from_value(0.3, &ROT_ANGLE_EDGES), SizeBucket::S);
        assert_eq!(SizeBucket::from_value(1.0, &ROT_ANGLE_EDGES), SizeBucket::M);
        assert_eq!(SizeBucket::from_value(1.5, &ROT_ANGLE_EDGES), SizeBucket::L);
        assert_eq!(SizeBucket::from_value(3.0, &ROT_ANGLE_EDGES), SizeBucket::XL);
    }

    #[test]
    fn test_turn_buckets_collapse_above_two() {
        assert_eq!(TurnBucket::from_turns(0).label(), "0");
        assert_eq!(TurnBucket::from_turns(2).label(), "2");
        assert_eq!(TurnBucket::from_turns(3).label(), "3+");
        assert_eq!(TurnBucket::from_turns(7), TurnBucket::from_turns(3));
        assert_eq!(TurnBucket::from_turns(-1).label(), "0");
    }
}
