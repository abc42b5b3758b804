//! # tally-core
//!
//! Core types and pure logic for Tally's mutation, audit and analytics core.
//!
//! This crate has no I/O. It provides:
//! - Entity structs for objectives, key results and audit events
//! - Status/priority/audit enums with their SQL string forms
//! - The field model (`Field`, `FieldName`, `FieldValue`) shared by diffing,
//!   persistence and audit rendering
//! - The field-diff engine and audit batch construction
//! - Analytics result types
//! - Cross-cutting error types

pub mod analytics;
pub mod audit;
pub mod diff;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod field;
pub mod identity;
pub mod proposed;
pub mod value;
