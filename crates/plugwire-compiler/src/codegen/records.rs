//! Params/Results wire records.

use super::decl::{Declaration, TypeDecl};
use super::naming::{param_field, param_id_field, result_field};
use super::Context;
use crate::encode::{FieldShape, TypeShape};
use crate::ir::{InterfaceContract, Method};

/// The Params and Results records of one method. A record is omitted when
/// its side of the call is empty.
pub fn generate_records(
    cx: &Context<'_>,
    contract: &InterfaceContract,
    method: &Method,
) -> Vec<Declaration> {
    let mut declarations = Vec::new();

    if !method.params.is_empty() {
        let name = cx.names.params_record(contract.id, &method.name);
        let fields = method
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| match param.contract {
                Some(_) => FieldShape::named(param_id_field(i), TypeShape::SubchannelId),
                None => FieldShape::named(param_field(i), cx.var_type(param)),
            })
            .collect();
        declarations.push(record(name, "parameters", &method.name, fields));
    }

    if !method.results.is_empty() {
        let name = cx.names.results_record(contract.id, &method.name);
        let fields = method
            .results
            .iter()
            .enumerate()
            .map(|(i, result)| FieldShape::named(result_field(i), cx.var_type(result)))
            .collect();
        declarations.push(record(name, "results", &method.name, fields));
    }

    declarations
}

fn record(name: String, side: &str, method: &str, fields: Vec<FieldShape>) -> Declaration {
    Declaration::Type(TypeDecl {
        doc: vec![
            format!("{name} contains {side} for the {method} function."),
            "It is a wire payload and should not be used directly.".to_string(),
        ],
        name,
        shape: TypeShape::Struct { fields },
    })
}
