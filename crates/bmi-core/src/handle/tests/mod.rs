//! Tests for the model handle.
//!
//! All tests drive an in-memory example session whose call log shows exactly which calls
//! reached the model.


use crate::config::ConfigSource;
use crate::example_session::{CallLog, ExampleSession};
use crate::handle::ModelHandle;

fn config() -> ConfigSource {
    ConfigSource::Inline("name = 'example'".to_string())
}

/// A handle on a fresh example session, with its call log.
fn connected() -> (ModelHandle<ExampleSession>, CallLog) {
    let session = ExampleSession::new();
    let log = session.log.clone();
    (ModelHandle::from_session(session, "example://test"), log)
}

/// An initialized handle whose call log has been cleared.
fn initialized() -> (ModelHandle<ExampleSession>, CallLog) {
    let (mut handle, log) = connected();
    handle.initialize(&config()).unwrap();
    log.clear();
    (handle, log)
}
