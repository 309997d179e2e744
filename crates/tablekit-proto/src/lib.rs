//! tablekit protocol types.
//!
//! This crate defines the client-facing types shared by the engine and its
//! callers. Everything here serializes with serde; JSON is the client format.
//!
//! # Modules
//!
//! - [`value`] - Runtime values for field maps and result rows
//! - [`request`] - List/get request parameters
//! - [`metadata`] - Client-safe schema description
//! - [`result`] - Rows and list/get envelopes
//! - [`error`] - Input decoding errors

pub mod error;
pub mod metadata;
pub mod request;
pub mod result;
pub mod value;

pub use error::Error;

// Re-export commonly used types at crate root
pub use metadata::{EnumValue, PropertyName, PublicMetadata, PublicProperty, PublicRelation, Purpose};
pub use request::RequestParams;
pub use result::{FieldValues, InstanceList, InstanceView, Row};
pub use value::Value;
