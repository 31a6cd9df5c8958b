pub mod cli;
pub mod configure;
pub mod editor;
pub mod error;
pub mod hash;
pub mod idp;
pub mod locator;
pub mod profile;
pub mod render;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
