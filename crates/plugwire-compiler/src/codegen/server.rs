//! Server dispatcher: receives RPC calls and invokes the local implementation.

use super::decl::{init, Declaration, Expr, FunctionDecl, Receiver, Stmt, TypeDecl};
use super::naming::{
    param_field, param_id_field, param_local, param_rpc_local, result_field, result_local,
};
use super::runtime;
use super::Context;
use crate::encode::{FieldShape, ParamShape, SignatureShape, TypeShape};
use crate::ir::{InterfaceContract, Method};

const BROKER_FIELD: &str = "broker";
const IMPL_FIELD: &str = "impl";
const PARAMS_ARG: &str = "params";
const RESULTS_ARG: &str = "results";

/// The dispatcher type and its constructor.
pub fn generate_server_type(cx: &Context<'_>, contract: &InterfaceContract) -> Vec<Declaration> {
    let server = cx.names.server(contract.id);
    let interface = cx.names.interface(contract.id);
    let contract_type = cx.contract_type(contract.id);

    let type_decl = Declaration::Type(TypeDecl {
        name: server.clone(),
        doc: vec![format!("{server} implements the RPC server for {interface}.")],
        shape: TypeShape::Struct {
            fields: vec![
                FieldShape::named(BROKER_FIELD, runtime::broker()),
                FieldShape::named(IMPL_FIELD, contract_type.clone()),
            ],
        },
    });

    let constructor = Declaration::Function(FunctionDecl {
        name: format!("New{server}"),
        doc: Vec::new(),
        receiver: None,
        signature: SignatureShape {
            params: vec![
                ParamShape::named("b", runtime::broker()),
                ParamShape::named(IMPL_FIELD, contract_type),
            ],
            results: vec![ParamShape::unnamed(TypeShape::Pointer {
                elem: Box::new(TypeShape::local(&server)),
            })],
        },
        body: vec![Stmt::Return {
            values: vec![Expr::Construct {
                typ: TypeShape::local(&server),
                fields: vec![
                    init(BROKER_FIELD, Expr::ident("b")),
                    init(IMPL_FIELD, Expr::ident(IMPL_FIELD)),
                ],
                by_ref: true,
            }],
        }],
    });

    vec![type_decl, constructor]
}

/// One dispatch method.
///
/// Callback arguments arrive as sub-channel ids. Each is dialed and wrapped
/// in a client proxy for the nested contract; the implementation only ever
/// sees the proxy.
pub fn generate_server_method(
    cx: &Context<'_>,
    contract: &InterfaceContract,
    method: &Method,
) -> Declaration {
    let id = contract.id;
    let receiver = Receiver::new("s", &cx.names.server(id));
    let broker = receiver.ident().field(BROKER_FIELD);
    let params = Expr::ident(PARAMS_ARG);
    let results = Expr::ident(RESULTS_ARG);
    let mut body = Vec::new();

    for (i, param) in method.params.iter().enumerate() {
        let Some(nested) = param.contract else {
            continue;
        };
        let conn = format!("{}conn", param_local(i));
        let rpc = param_rpc_local(i);

        body.push(Stmt::LetChecked {
            names: vec![conn.clone()],
            value: broker
                .clone()
                .field("Dial")
                .call(vec![params.clone().field(&param_id_field(i))]),
        });
        body.push(Stmt::Let {
            names: vec![rpc.clone()],
            value: Expr::qualified(runtime::RPC_MODULE, "NewClient").call(vec![Expr::ident(&conn)]),
        });
        body.push(Stmt::Defer {
            call: Expr::ident(&rpc).field("Close").call(Vec::new()),
        });
        body.push(Stmt::Let {
            names: vec![param_local(i)],
            value: Expr::ident(&format!("New{}", cx.names.client(nested)))
                .call(vec![broker.clone(), Expr::ident(&rpc)]),
        });
    }

    let spread = method.variadic_param().map(|_| method.params.len() - 1);
    let args = method
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            if param.contract.is_some() {
                Expr::ident(&param_local(i))
            } else if Some(i) == spread {
                params.clone().field(&param_field(i)).spread()
            } else {
                params.clone().field(&param_field(i))
            }
        })
        .collect();
    let call = receiver.ident().field(IMPL_FIELD).field(&method.name).call(args);

    if method.results.is_empty() {
        body.push(Stmt::Eval { expr: call });
    } else {
        body.push(Stmt::Let {
            names: (0..method.results.len()).map(result_local).collect(),
            value: call,
        });
        for (i, result) in method.results.iter().enumerate() {
            let local = Expr::ident(&result_local(i));
            body.push(Stmt::Assign {
                target: results.clone().field(&result_field(i)),
                value: if cx.wraps_error(result) {
                    local.wrap_error()
                } else {
                    local
                },
            });
        }
    }

    body.push(Stmt::Return {
        values: vec![Expr::Nil],
    });

    let params_param = if method.params.is_empty() {
        ParamShape::named("_", TypeShape::any())
    } else {
        ParamShape::named(
            PARAMS_ARG,
            TypeShape::Pointer {
                elem: Box::new(TypeShape::local(cx.names.params_record(id, &method.name))),
            },
        )
    };
    let results_param = if method.results.is_empty() {
        ParamShape::named(
            "_",
            TypeShape::Pointer {
                elem: Box::new(TypeShape::any()),
            },
        )
    } else {
        ParamShape::named(
            RESULTS_ARG,
            TypeShape::Pointer {
                elem: Box::new(TypeShape::local(cx.names.results_record(id, &method.name))),
            },
        )
    };

    Declaration::Function(FunctionDecl {
        name: method.name.clone(),
        doc: vec![format!(
            "{} implements the server side of RPC calls to {}.",
            method.name, method.name
        )],
        receiver: Some(receiver),
        signature: SignatureShape {
            params: vec![params_param, results_param],
            results: vec![ParamShape::unnamed(runtime::error())],
        },
        body,
    })
}
