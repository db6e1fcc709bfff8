//! Core value types for primgen: the load-state lattice and the type
//! descriptors that configuration keys are built from.

#![deny(unsafe_code)]

pub mod error;
pub mod state;
pub mod types;

pub use error::{ModelError, Result};
pub use state::LoadState;
pub use types::{Instantiation, PRIMITIVE_PATHS, TypeDescriptor, TypeId, TypeRegistry};
