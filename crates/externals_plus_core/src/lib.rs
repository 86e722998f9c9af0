mod options;
pub use options::*;
mod asset_rules;
pub use asset_rules::*;
mod error;
pub use error::*;
mod classifier;
pub use classifier::*;
mod external_module;
pub use external_module::*;
mod registry;
pub use registry::*;
mod identity;
pub use identity::*;
mod template;
pub use template::*;
mod runner;
pub use runner::*;
mod command_compiler;
pub use command_compiler::*;
mod html;
pub use html::*;
mod session;
pub use session::*;
pub mod log;

pub const VENDOR_EXT: &str = "js";
pub const TEMPLATE_EXT: &str = "template.js";
