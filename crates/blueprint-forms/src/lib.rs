//! Form surfaces over resolved schemas.
//!
//! [`render`] produces server-side markup and the config consumed by the
//! vanilla [`FormController`]. [`DynamicForm`] drives the same rules from a
//! schema fetched over HTTP, with [`aux`] fields loading their own data.
//! All network access goes through the [`Transport`] seam.

mod api;
pub mod aux;
mod controller;
mod dynamic;
mod error;
pub mod render;
mod surface;
mod transport;

pub use api::{ApiClient, DEFAULT_NONCE_HEADER, data, with_query};
pub use aux::{AuxField, AuxState, ChildList, RelationOptions, RequestTokens, SearchPicker};
pub use controller::{ConfigUpdate, FAILED_TO_SAVE, FormController, SubmitOutcome, TRANSPORT_FAILURE, coerce};
pub use dynamic::{Component, DynamicForm, FormState, component_for};
pub use error::{ApiError, TransportError};
pub use render::{ControllerConfig, ControllerOptions, FormMode, mount_point, render_form, render_form_page};
pub use surface::{Control, ERROR_EVENT, FormEvent, FormSurface, MemorySurface, MessageKind, SUCCESS_EVENT};
pub use transport::{Transport, UreqTransport};
