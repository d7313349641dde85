//! Client proxy: implements the contract by forwarding every call over RPC.

use super::decl::{init, Declaration, Expr, FunctionDecl, Receiver, Stmt, TypeDecl, VariableDecl};
use super::naming::{param_field, param_id_field, param_id_local, param_local, result_field};
use super::runtime;
use super::Context;
use crate::encode::{FieldShape, ParamShape, SignatureShape, TypeShape};
use crate::ir::{InterfaceContract, Method};

const BROKER_FIELD: &str = "broker";
const CLIENT_FIELD: &str = "client";
const PARAMS_LOCAL: &str = "params";
const RESULTS_LOCAL: &str = "results";

/// The proxy type, its constructor and the check that it satisfies the
/// contract.
pub fn generate_client_type(cx: &Context<'_>, contract: &InterfaceContract) -> Vec<Declaration> {
    let client = cx.names.client(contract.id);
    let interface = cx.names.interface(contract.id);

    let type_decl = Declaration::Type(TypeDecl {
        name: client.clone(),
        doc: vec![format!("{client} implements {interface} via RPC.")],
        shape: TypeShape::Struct {
            fields: vec![
                FieldShape::named(BROKER_FIELD, runtime::broker()),
                FieldShape::named(CLIENT_FIELD, runtime::rpc_client()),
            ],
        },
    });

    let constructor = Declaration::Function(FunctionDecl {
        name: format!("New{client}"),
        doc: Vec::new(),
        receiver: None,
        signature: SignatureShape {
            params: vec![
                ParamShape::named("b", runtime::broker()),
                ParamShape::named("c", runtime::rpc_client()),
            ],
            results: vec![ParamShape::unnamed(TypeShape::Pointer {
                elem: Box::new(TypeShape::local(&client)),
            })],
        },
        body: vec![Stmt::Return {
            values: vec![Expr::Construct {
                typ: TypeShape::local(&client),
                fields: vec![
                    init(BROKER_FIELD, Expr::ident("b")),
                    init(CLIENT_FIELD, Expr::ident("c")),
                ],
                by_ref: true,
            }],
        }],
    });

    let conformance = Declaration::Variable(VariableDecl {
        name: "_".to_string(),
        doc: Vec::new(),
        typ: Some(cx.contract_type(contract.id)),
        value: Expr::TypedNil {
            typ: TypeShape::Pointer {
                elem: Box::new(TypeShape::local(&client)),
            },
        },
    });

    vec![type_decl, constructor, conformance]
}

/// One proxy method.
///
/// Callback arguments get a fresh sub-channel each; the accept loop serving
/// it is spawned before the call goes out, so the peer can dial it at any
/// point during the call.
pub fn generate_client_method(
    cx: &Context<'_>,
    contract: &InterfaceContract,
    method: &Method,
) -> Declaration {
    let id = contract.id;
    let receiver = Receiver::new("c", &cx.names.client(id));
    let broker = receiver.ident().field(BROKER_FIELD);
    let mut body = Vec::new();

    // Sub-channels for callback arguments.
    for (i, param) in method.params.iter().enumerate() {
        let Some(nested) = param.contract else {
            continue;
        };
        let id_local = param_id_local(i);
        body.push(Stmt::Let {
            names: vec![id_local.clone()],
            value: broker.clone().field("NextId").call(Vec::new()),
        });
        body.push(Stmt::Spawn {
            call: broker.clone().field("AcceptAndServe").call(vec![
                Expr::ident(&id_local),
                Expr::ident(&format!("New{}", cx.names.server(nested)))
                    .call(vec![broker.clone(), Expr::ident(&param_local(i))]),
            ]),
        });
    }

    let params = if method.params.is_empty() {
        Expr::Zero {
            typ: TypeShape::any(),
        }
    } else {
        let fields = method
            .params
            .iter()
            .enumerate()
            .filter(|(_, param)| !cx.wraps_error(param))
            .map(|(i, param)| {
                if param.contract.is_some() {
                    init(&param_id_field(i), Expr::ident(&param_id_local(i)))
                } else {
                    init(&param_field(i), Expr::ident(&param_local(i)))
                }
            })
            .collect();
        Expr::Construct {
            typ: TypeShape::local(cx.names.params_record(id, &method.name)),
            fields,
            by_ref: true,
        }
    };
    body.push(Stmt::Let {
        names: vec![PARAMS_LOCAL.to_string()],
        value: params,
    });

    // Error-like arguments go in the carrier, set after construction so a
    // nil argument stays nil.
    for (i, param) in method.params.iter().enumerate() {
        if cx.wraps_error(param) {
            body.push(Stmt::Assign {
                target: Expr::ident(PARAMS_LOCAL).field(&param_field(i)),
                value: Expr::ident(&param_local(i)).wrap_error(),
            });
        }
    }

    let results_type = if method.results.is_empty() {
        TypeShape::any()
    } else {
        TypeShape::local(cx.names.results_record(id, &method.name))
    };
    body.push(Stmt::Let {
        names: vec![RESULTS_LOCAL.to_string()],
        value: Expr::Zero { typ: results_type },
    });

    let remote = cx.names.remote_method(id, &method.name);
    body.push(Stmt::RemoteCall {
        client: receiver.ident().field(CLIENT_FIELD),
        message: format!("remote call to {remote} failed"),
        method: remote,
        params: Expr::ident(PARAMS_LOCAL),
        results: Expr::ident(RESULTS_LOCAL),
        on_failure: cx.failure_policy(),
    });

    if !method.results.is_empty() {
        body.push(Stmt::Return {
            values: (0..method.results.len())
                .map(|i| Expr::ident(RESULTS_LOCAL).field(&result_field(i)))
                .collect(),
        });
    }

    Declaration::Function(FunctionDecl {
        name: method.name.clone(),
        doc: vec![format!(
            "{} implements {} for the {} interface.",
            method.name,
            method.name,
            cx.names.interface(id)
        )],
        receiver: Some(receiver),
        signature: SignatureShape {
            params: (0..method.params.len())
                .map(|i| cx.method_param(method, i, param_local(i)))
                .collect(),
            results: method
                .results
                .iter()
                .map(|result| ParamShape::unnamed(cx.var_type(result)))
                .collect(),
        },
        body,
    })
}
