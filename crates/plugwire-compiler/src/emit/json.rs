use serde::Serialize;

use super::CodeEmitter;
use crate::codegen::decl::Declaration;
use crate::diagnostic::CompilerError;

/// Serializes declarations for an out-of-process renderer.
#[derive(Debug, Default)]
pub struct JsonEmitter;

impl JsonEmitter {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct Document<'a> {
    header: &'a str,
    declarations: &'a [Declaration],
}

impl CodeEmitter for JsonEmitter {
    fn name(&self) -> &str {
        "json"
    }

    fn emit(&self, header: &str, declarations: &[Declaration]) -> Result<String, CompilerError> {
        let mut output = serde_json::to_string_pretty(&Document {
            header,
            declarations,
        })
        .map_err(|e| CompilerError::EmitFailed {
            message: e.to_string(),
        })?;
        output.push('\n');
        Ok(output)
    }
}
