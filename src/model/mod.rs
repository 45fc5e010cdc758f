pub mod audit;
pub mod client;
pub mod common;
pub mod edge;
pub mod entity;
pub mod scene;

pub use audit::*;
pub use client::*;
pub use common::*;
pub use edge::*;
pub use entity::*;
pub use scene::*;
