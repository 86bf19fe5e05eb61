// Library root
// -----------
// This crate exposes the pieces of the interactive activation client. The
// binary (`main.rs`) wires them together and hands control to the session.
//
// Module responsibilities:
// - `api`: one GET per action against the handler endpoint and decoding of
//   the three reply shapes (delimited text, flat object, envelope).
// - `types`: catalog and purchase entities produced by the decoders.
// - `format`: pure rendering of decoded replies into display lines.
// - `nav`: the menu state machine and its transition table.
// - `store`: append-only `KEY=value` persistence of the credential and the
//   active email id, loaded last-write-wins.
// - `session`: the controller running the read-eval loop.
// - `ui`: the terminal boundary (prompts, colours, spinner).
// - `identity`: random names for sign-up forms.
pub mod api;
pub mod error;
pub mod format;
pub mod identity;
pub mod nav;
pub mod session;
pub mod settings;
pub mod store;
pub mod types;
pub mod ui;

pub use api::ApiClient;
pub use error::{Error, Result};
pub use session::Session;
pub use settings::Settings;
