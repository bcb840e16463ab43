use crate::provider::Console;
use crate::view::Renderer;

pub mod encoding;
pub mod response;
pub mod server;

/// Shared by every request handler.
#[derive(Debug)]
pub struct Context {
    pub console: Console,
    pub renderer: Renderer,
}
