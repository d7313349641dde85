//! Plugin adapter: wraps one implementation and builds the server dispatcher
//! or client proxy on demand.

use super::decl::{init, Declaration, Expr, FunctionDecl, Receiver, Stmt, TypeDecl, VariableDecl};
use super::runtime;
use super::Context;
use crate::encode::{FieldShape, ParamShape, SignatureShape, TypeShape};
use crate::ir::InterfaceContract;

const IMPL_FIELD: &str = "impl";

pub fn generate_plugin(cx: &Context<'_>, contract: &InterfaceContract) -> Vec<Declaration> {
    let id = contract.id;
    let interface = cx.names.interface(id);
    let plugin = cx.names.plugin(id);
    let contract_type = cx.contract_type(id);

    let type_decl = Declaration::Type(TypeDecl {
        name: plugin.clone(),
        doc: vec![format!(
            "{plugin} implements the {} interface for {interface}.",
            runtime::PLUGIN_INTERFACE
        )],
        shape: TypeShape::Struct {
            fields: vec![FieldShape::named(IMPL_FIELD, contract_type.clone())],
        },
    });

    let constructor = Declaration::Function(FunctionDecl {
        name: format!("New{plugin}"),
        doc: Vec::new(),
        receiver: None,
        signature: SignatureShape {
            params: vec![ParamShape::named(IMPL_FIELD, contract_type)],
            results: vec![ParamShape::unnamed(TypeShape::Pointer {
                elem: Box::new(TypeShape::local(&plugin)),
            })],
        },
        body: vec![Stmt::Return {
            values: vec![Expr::Construct {
                typ: TypeShape::local(&plugin),
                fields: vec![init(IMPL_FIELD, Expr::ident(IMPL_FIELD))],
                by_ref: true,
            }],
        }],
    });

    let conformance = Declaration::Variable(VariableDecl {
        name: "_".to_string(),
        doc: vec![format!(
            "Compile-time check that {plugin} is a {}.",
            runtime::PLUGIN_INTERFACE
        )],
        typ: Some(runtime::plugin_interface()),
        value: Expr::TypedNil {
            typ: TypeShape::Pointer {
                elem: Box::new(TypeShape::local(&plugin)),
            },
        },
    });

    let receiver = Receiver::new("p", &plugin);
    let factory_results = vec![
        ParamShape::unnamed(TypeShape::any()),
        ParamShape::unnamed(runtime::error()),
    ];

    let server = Declaration::Function(FunctionDecl {
        name: "Server".to_string(),
        doc: vec![format!(
            "Server implements the Server method for the {} interface.",
            runtime::PLUGIN_INTERFACE
        )],
        receiver: Some(receiver.clone()),
        signature: SignatureShape {
            params: vec![ParamShape::named("b", runtime::broker())],
            results: factory_results.clone(),
        },
        body: vec![Stmt::Return {
            values: vec![
                Expr::ident(&format!("New{}", cx.names.server(id)))
                    .call(vec![Expr::ident("b"), receiver.ident().field(IMPL_FIELD)]),
                Expr::Nil,
            ],
        }],
    });

    let client = Declaration::Function(FunctionDecl {
        name: "Client".to_string(),
        doc: vec![format!(
            "Client implements the Client method for the {} interface.",
            runtime::PLUGIN_INTERFACE
        )],
        receiver: Some(receiver),
        signature: SignatureShape {
            params: vec![
                ParamShape::named("b", runtime::broker()),
                ParamShape::named("c", runtime::rpc_client()),
            ],
            results: factory_results,
        },
        body: vec![Stmt::Return {
            values: vec![
                Expr::ident(&format!("New{}", cx.names.client(id)))
                    .call(vec![Expr::ident("b"), Expr::ident("c")]),
                Expr::Nil,
            ],
        }],
    });

    vec![type_decl, constructor, conformance, server, client]
}
