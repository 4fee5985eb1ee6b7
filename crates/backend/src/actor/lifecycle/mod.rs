//! Host lifecycle signals the supervisor reacts to.

pub mod visibility;
