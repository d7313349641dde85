//! Handshake fingerprinting.
//!
//! The fingerprint binds a generated client and server to one exact contract
//! graph: both sides present it when the connection is established and refuse
//! a peer whose value differs.

use std::collections::BTreeSet;
use std::fmt;

use xxhash_rust::xxh3::Xxh3;

use super::decl::{init, Declaration, Expr, FunctionDecl, Stmt, VariableDecl};
use super::runtime;
use crate::encode::{Encoder, SignatureShape};
use crate::ir::InterfaceContract;

pub const PROTOCOL_VERSION: i64 = 1;
pub const MAGIC_COOKIE_KEY: &str = "PLUGWIRE_MAGIC_COOKIE_KEY";
pub const HANDSHAKE_VAR: &str = "PluginHandshake";
pub const REGISTRATION_FN: &str = "init";

/// A 128-bit handshake digest, rendered as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u128);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Streams contracts, in graph order, into the handshake digest.
pub struct HandshakeFingerprinter<'u> {
    encoder: Encoder<'u>,
    hasher: Xxh3,
    modules: BTreeSet<String>,
}

impl<'u> HandshakeFingerprinter<'u> {
    pub fn new(encoder: Encoder<'u>) -> Self {
        Self {
            encoder,
            hasher: Xxh3::new(),
            modules: BTreeSet::new(),
        }
    }

    /// Feeds the contract's structural definition and records the external
    /// modules it references.
    pub fn add(&mut self, contract: &InterfaceContract) {
        let shape = self.encoder.encode_underlying(contract.typ);
        shape.collect_modules(&mut self.modules);
        self.hasher.update(shape.to_string().as_bytes());
        self.hasher.update(b"\n");
    }

    /// Feeds the sorted module set and returns the digest.
    pub fn finish(mut self) -> Fingerprint {
        for module in &self.modules {
            self.hasher.update(module.as_bytes());
            self.hasher.update(b"\n");
        }
        Fingerprint(self.hasher.digest128())
    }
}

/// `var PluginHandshake = HandshakeConfig{...}`
pub fn handshake_declaration(fingerprint: Fingerprint) -> Declaration {
    Declaration::Variable(VariableDecl {
        name: HANDSHAKE_VAR.to_string(),
        doc: vec![format!(
            "{HANDSHAKE_VAR} is a plugin handshake generated from the input interfaces."
        )],
        typ: None,
        value: Expr::Construct {
            typ: runtime::handshake_config(),
            fields: vec![
                init("ProtocolVersion", Expr::Int { value: PROTOCOL_VERSION }),
                init("MagicCookieKey", Expr::str(MAGIC_COOKIE_KEY)),
                init("MagicCookieValue", Expr::str(fingerprint.to_string())),
            ],
            by_ref: false,
        },
    })
}

/// Registers the error carrier with the wire codec at load time.
pub fn registration_declaration() -> Declaration {
    Declaration::Function(FunctionDecl {
        name: REGISTRATION_FN.to_string(),
        doc: Vec::new(),
        receiver: None,
        signature: SignatureShape::default(),
        body: vec![Stmt::RegisterWireType {
            typ: runtime::error_carrier(),
        }],
    })
}
