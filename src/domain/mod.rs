//! # Domain Layer
//!
//! Pure value types describing accounts, amounts, and transfers.

pub mod entities;
pub mod value_objects;
