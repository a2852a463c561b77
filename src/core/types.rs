//! Core type definitions used throughout the codebase

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Simulation step counter
pub type Tick = u64;

/// Drop the vertical component
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Horizontal distance between two points
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    horizontal(a - b).length()
}

/// Unit vector on the XZ plane for a heading angle (radians)
#[inline]
pub fn heading_vector(angle: f32) -> Vec3 {
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// Yaw that faces along `dir`, or `None` when the horizontal part is too short
///
/// Zero-length directions have no defined heading.
pub fn facing_of(dir: Vec3, min_length: f32) -> Option<f32> {
    let flat = horizontal(dir);
    if flat.length() < min_length {
        return None;
    }
    Some(flat.x.atan2(flat.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_ids_are_unique() {
        let a = AgentId::new();
        let b = AgentId::new();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = Vec3::new(0.0, 100.0, 0.0);
        let b = Vec3::new(3.0, -50.0, 4.0);
        assert!((horizontal_distance(a, b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_heading_vector_is_unit() {
        for i in 0..16 {
            let v = heading_vector(i as f32 * 0.4);
            assert!((v.length() - 1.0).abs() < 1e-5);
            assert_eq!(v.y, 0.0);
        }
    }

    #[test]
    fn test_facing_of_zero_vector_is_none() {
        assert_eq!(facing_of(Vec3::ZERO, 1e-4), None);
        assert_eq!(facing_of(Vec3::new(0.0, 5.0, 0.0), 1e-4), None);
    }

    #[test]
    fn test_facing_of_axis_directions() {
        let north = facing_of(Vec3::new(0.0, 0.0, 1.0), 1e-4).unwrap();
        assert!(north.abs() < 1e-6);
        let east = facing_of(Vec3::new(1.0, 0.0, 0.0), 1e-4).unwrap();
        assert!((east - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
