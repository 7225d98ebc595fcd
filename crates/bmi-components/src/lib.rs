//! Concrete collaborators for the orchestration core: an in-process connector and a
//! configurable reference model.

pub mod local;
pub mod reference;

pub use local::{LocalConnector, LocalSession};
pub use reference::ReferenceModel;
