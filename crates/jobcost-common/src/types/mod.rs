//! Core jobcost types

pub mod cost;
pub mod price;
pub mod tags;
pub mod usage;
