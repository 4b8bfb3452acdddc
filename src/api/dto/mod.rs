//! Data Transfer Objects for REST request/response serialization.

pub mod emit_dto;
pub mod presence_dto;

pub use emit_dto::*;
pub use presence_dto::*;
