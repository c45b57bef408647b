//! # clinicdesk-entity
//!
//! Domain entity models for ClinicDesk. Structs here are either rows of a
//! backend table (decoded from JSON) or domain value objects. All entities
//! derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod audit;
pub mod theme;
pub mod user;
