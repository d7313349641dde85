//! Names exported by the plugin runtime the generated code links against.

use crate::encode::TypeShape;

/// Plugin host runtime: broker, handshake config, error carrier.
pub const PLUGIN_MODULE: &str = "github.com/hashicorp/go-plugin";
/// Synchronous RPC transport.
pub const RPC_MODULE: &str = "net/rpc";
/// Wire codec used by the transport.
pub const CODEC_MODULE: &str = "encoding/gob";
pub const LOG_MODULE: &str = "log";

pub const BROKER: &str = "MuxBroker";
pub const RPC_CLIENT: &str = "Client";
pub const PLUGIN_INTERFACE: &str = "Plugin";
pub const HANDSHAKE_CONFIG: &str = "HandshakeConfig";
pub const ERROR_CARRIER: &str = "BasicError";

/// `*MuxBroker`
pub fn broker() -> TypeShape {
    TypeShape::Pointer {
        elem: Box::new(TypeShape::qualified(Some(PLUGIN_MODULE), BROKER)),
    }
}

/// `*rpc.Client`
pub fn rpc_client() -> TypeShape {
    TypeShape::Pointer {
        elem: Box::new(TypeShape::qualified(Some(RPC_MODULE), RPC_CLIENT)),
    }
}

pub fn plugin_interface() -> TypeShape {
    TypeShape::qualified(Some(PLUGIN_MODULE), PLUGIN_INTERFACE)
}

pub fn handshake_config() -> TypeShape {
    TypeShape::qualified(Some(PLUGIN_MODULE), HANDSHAKE_CONFIG)
}

pub fn error_carrier() -> TypeShape {
    TypeShape::qualified(Some(PLUGIN_MODULE), ERROR_CARRIER)
}

/// The builtin error type.
pub fn error() -> TypeShape {
    TypeShape::qualified(None, "error")
}
