//! Non-fatal analysis diagnostics.

use std::fmt;

use serde::Serialize;

/// Position of a value inside a method signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Slot {
    Param(usize),
    Result(usize),
}

impl Slot {
    fn noun(self) -> &'static str {
        match self {
            Slot::Param(_) => "parameter",
            Slot::Result(_) => "result",
        }
    }
}

/// Why a slot may not behave across the wire the way it does in-process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Empty interface: the concrete payload must be known to the wire codec.
    AnySlot,
    /// Error-like value passed raw instead of through the message carrier.
    RawErrorSlot,
    /// Pointer, map or channel parameter; in-place writes stay on the callee's side.
    PointerLikeParam,
}

/// A compatibility warning raised while analyzing a contract graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Structural signature of the contract owning the method.
    pub contract: String,
    pub method: String,
    pub slot: Slot,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Warning { contract, method, slot, .. } = self;
        match self.kind {
            WarningKind::AnySlot => write!(
                f,
                "empty interface {} in {contract}.{method} may not be compatible",
                slot.noun()
            ),
            WarningKind::RawErrorSlot => write!(
                f,
                "error interface {} in {contract}.{method} may not be compatible",
                slot.noun()
            ),
            WarningKind::PointerLikeParam => write!(
                f,
                "pointer-like {} in {contract}.{method}, writes made in a plugin will not propagate",
                slot.noun()
            ),
        }
    }
}
