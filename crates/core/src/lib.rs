//! Core business logic for quill.

pub mod pagination;
pub mod services;

pub use pagination::Page;
pub use services::*;
