//! Dynamic HTML configuration form served over a raw socket.
//!
//! The application describes its fields in a callback; a browser gets the
//! rendered page, posts the values back to `/ajax_inputs`, and each value is
//! handed to a second callback by its position in the form.

pub mod codec;
pub mod config;
pub mod form;
pub mod portal;

pub use config::{PortalConfig, SegmentPolicy};
pub use form::{compute_field_ids, FieldId, Form};
pub use portal::{FormSession, Outcome};
