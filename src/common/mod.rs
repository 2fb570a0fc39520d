//! Common traits and helpers used across the webecho library
//!
//! This module contains the traits that sit between the transport and the
//! responders, plus helpers shared by unit and integration tests.

pub mod test_utils;
pub mod traits;

pub use test_utils::{RawResponse, read_response, send_raw_request, spawn_test_server};
pub use traits::{Responder, ServerTrait};
