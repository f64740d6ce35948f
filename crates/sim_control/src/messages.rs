//! Protobuf messages understood by the simulator.

use specs::Pose as ListingPose;

#[derive(Clone, PartialEq, prost::Message)]
pub struct Point {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub z: f64,
}

/// Orientation. The simulator is planar and reads the heading from `z`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Quaternion {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub z: f64,
    #[prost(double, tag = "4")]
    pub w: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Pose {
    #[prost(message, optional, tag = "1")]
    pub position: Option<Point>,
    #[prost(message, optional, tag = "2")]
    pub orientation: Option<Quaternion>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Header {
    #[prost(int64, tag = "1")]
    pub timestamp_ms: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PoseStamped {
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    #[prost(message, optional, tag = "2")]
    pub pose: Option<Pose>,
}

impl PoseStamped {
    /// Stamps a listing pose with the current wall-clock time.
    pub fn now(pose: &ListingPose) -> Self {
        Self {
            header: Some(Header {
                timestamp_ms: chrono::Utc::now().timestamp_millis(),
            }),
            pose: Some(Pose::from(pose)),
        }
    }
}

impl From<&ListingPose> for Pose {
    fn from(pose: &ListingPose) -> Self {
        Self {
            position: Some(Point {
                x: pose.x,
                y: pose.y,
                z: 0.0,
            }),
            orientation: Some(Quaternion {
                x: 0.0,
                y: 0.0,
                z: pose.theta,
                w: 0.0,
            }),
        }
    }
}
