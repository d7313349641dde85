//! Code emitters: turn the abstract declaration list into output text.

mod json;
mod outline;

pub use json::JsonEmitter;
pub use outline::OutlineEmitter;

use crate::codegen::decl::Declaration;
use crate::diagnostic::CompilerError;

/// Trait for code emitters.
pub trait CodeEmitter {
    /// Returns the emitter name (e.g., "outline").
    fn name(&self) -> &str;

    /// Renders `declarations` in order, preceded by `header`.
    fn emit(&self, header: &str, declarations: &[Declaration]) -> Result<String, CompilerError>;
}

/// Creates an emitter by name.
pub fn create_emitter(name: &str) -> Result<Box<dyn CodeEmitter>, CompilerError> {
    match name {
        "outline" => Ok(Box::new(OutlineEmitter::new())),
        "json" => Ok(Box::new(JsonEmitter::new())),
        _ => Err(CompilerError::UnsupportedFormat {
            kind: "emit",
            format: name.to_string(),
        }),
    }
}
