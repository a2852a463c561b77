//! Voxel Agents - NPC simulation kernel for a voxel sandbox
//!
//! Archetype-driven agents (pursuers, aquatic predators, passive wanderers)
//! with voxel collision, a small AI state machine and per-archetype
//! population managers.

pub mod core;
pub mod entity;
pub mod simulation;
pub mod world;
