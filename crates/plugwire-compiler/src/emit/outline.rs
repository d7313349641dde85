//! Human-readable rendering of the declaration list, for review and
//! debugging. The syntax is Go-like; external names keep their full module
//! path.

use super::CodeEmitter;
use crate::codegen::decl::{Declaration, Expr, FailurePolicy, FunctionDecl, Stmt, TypeDecl, VariableDecl};
use crate::codegen::runtime;
use crate::diagnostic::CompilerError;
use crate::encode::{ParamShape, SignatureShape, Spread, TypeShape};

/// Renders declarations as an indented outline.
#[derive(Debug, Default)]
pub struct OutlineEmitter;

impl OutlineEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl CodeEmitter for OutlineEmitter {
    fn name(&self) -> &str {
        "outline"
    }

    fn emit(&self, header: &str, declarations: &[Declaration]) -> Result<String, CompilerError> {
        let mut output = String::new();
        output.push_str(&format!("// {}\n", header));

        for decl in declarations {
            output.push('\n');
            for line in decl.doc() {
                output.push_str(&format!("// {}\n", line));
            }
            match decl {
                Declaration::Type(decl) => render_type_decl(&mut output, decl),
                Declaration::Function(decl) => render_function(&mut output, decl),
                Declaration::Variable(decl) => render_variable(&mut output, decl),
            }
        }

        Ok(output)
    }
}

fn render_type_decl(output: &mut String, decl: &TypeDecl) {
    match &decl.shape {
        TypeShape::Struct { fields } if !fields.is_empty() => {
            output.push_str(&format!("type {} struct {{\n", decl.name));
            for field in fields {
                match &field.name {
                    Some(name) => output.push_str(&format!("\t{} {}\n", name, field.typ)),
                    None => output.push_str(&format!("\t{}\n", field.typ)),
                }
            }
            output.push_str("}\n");
        }
        shape => output.push_str(&format!("type {} {}\n", decl.name, shape)),
    }
}

fn render_function(output: &mut String, decl: &FunctionDecl) {
    output.push_str("func ");
    if let Some(receiver) = &decl.receiver {
        output.push_str(&format!("({} *{}) ", receiver.name, receiver.type_name));
    }
    output.push_str(&decl.name);
    output.push_str(&render_signature(&decl.signature));
    output.push_str(" {\n");
    render_block(output, &decl.body, 1);
    output.push_str("}\n");
}

fn render_variable(output: &mut String, decl: &VariableDecl) {
    match &decl.typ {
        Some(typ) => output.push_str(&format!(
            "var {} {} = {}\n",
            decl.name,
            typ,
            render_expr(&decl.value)
        )),
        None => output.push_str(&format!("var {} = {}\n", decl.name, render_expr(&decl.value))),
    }
}

/// A signature with parameter names.
fn render_signature(signature: &SignatureShape) -> String {
    let params: Vec<_> = signature.params.iter().map(render_param).collect();
    let mut out = format!("({})", params.join(", "));
    match signature.results.as_slice() {
        [] => {}
        [single] if single.name.is_none() => out.push_str(&format!(" {}", single.typ)),
        results => {
            let results: Vec<_> = results.iter().map(render_param).collect();
            out.push_str(&format!(" ({})", results.join(", ")));
        }
    }
    out
}

fn render_param(param: &ParamShape) -> String {
    let typ = match param.spread {
        Spread::None => param.typ.to_string(),
        Spread::Slice => format!("...{}", param.typ),
        Spread::String => format!("{}...", param.typ),
    };
    match &param.name {
        Some(name) => format!("{} {}", name, typ),
        None => typ,
    }
}

fn render_block(output: &mut String, body: &[Stmt], depth: usize) {
    let indent = "\t".repeat(depth);
    for stmt in body {
        match stmt {
            Stmt::Let { names, value } => {
                output.push_str(&format!("{}{} := {}\n", indent, names.join(", "), render_expr(value)));
            }
            Stmt::LetChecked { names, value } => {
                output.push_str(&format!(
                    "{}{}, err := {}\n",
                    indent,
                    names.join(", "),
                    render_expr(value)
                ));
                output.push_str(&format!("{}if err != nil {{\n", indent));
                output.push_str(&format!("{}\treturn err\n", indent));
                output.push_str(&format!("{}}}\n", indent));
            }
            Stmt::Assign {
                target,
                value: Expr::WrapError { value },
            } => {
                let target = render_expr(target);
                let source = render_expr(value);
                output.push_str(&format!("{}if {} == nil {{\n", indent, source));
                output.push_str(&format!("{}\t{} = nil\n", indent, target));
                output.push_str(&format!("{}}} else {{\n", indent));
                output.push_str(&format!(
                    "{}\t{} = {}.NewBasicError({})\n",
                    indent,
                    target,
                    runtime::PLUGIN_MODULE,
                    source
                ));
                output.push_str(&format!("{}}}\n", indent));
            }
            Stmt::Assign { target, value } => {
                output.push_str(&format!("{}{} = {}\n", indent, render_expr(target), render_expr(value)));
            }
            Stmt::Eval { expr } => output.push_str(&format!("{}{}\n", indent, render_expr(expr))),
            Stmt::Spawn { call } => output.push_str(&format!("{}go {}\n", indent, render_expr(call))),
            Stmt::Defer { call } => output.push_str(&format!("{}defer {}\n", indent, render_expr(call))),
            Stmt::RemoteCall {
                client,
                method,
                params,
                results,
                on_failure,
                message,
            } => {
                output.push_str(&format!(
                    "{}if err := {}.Call({:?}, {}, {}); err != nil {{\n",
                    indent,
                    render_expr(client),
                    method,
                    render_expr(params),
                    render_expr(results)
                ));
                let report = match on_failure {
                    FailurePolicy::Log => "Println",
                    FailurePolicy::Abort => "Fatalln",
                };
                let label = format!("{message}:");
                output.push_str(&format!(
                    "{}\t{}.{}({:?}, err)\n",
                    indent,
                    runtime::LOG_MODULE,
                    report,
                    label
                ));
                output.push_str(&format!("{}}}\n", indent));
            }
            Stmt::RegisterWireType { typ } => {
                output.push_str(&format!("{}{}.Register(&{}{{}})\n", indent, runtime::CODEC_MODULE, typ));
            }
            Stmt::Return { values } => {
                if values.is_empty() {
                    output.push_str(&format!("{}return\n", indent));
                } else {
                    let values: Vec<_> = values.iter().map(render_expr).collect();
                    output.push_str(&format!("{}return {}\n", indent, values.join(", ")));
                }
            }
        }
    }
}

fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Ident { name } => name.clone(),
        Expr::Qualified { module, name } => format!("{}.{}", module, name),
        Expr::Field { base, name } => format!("{}.{}", render_expr(base), name),
        Expr::Call { func, args } => {
            let args: Vec<_> = args.iter().map(render_expr).collect();
            format!("{}({})", render_expr(func), args.join(", "))
        }
        Expr::Construct { typ, fields, by_ref } => {
            let fields: Vec<_> = fields
                .iter()
                .map(|f| format!("{}: {}", f.name, render_expr(&f.value)))
                .collect();
            let amp = if *by_ref { "&" } else { "" };
            format!("{}{}{{{}}}", amp, typ, fields.join(", "))
        }
        Expr::Str { value } => format!("{:?}", value),
        Expr::Int { value } => value.to_string(),
        Expr::Nil => "nil".to_string(),
        Expr::TypedNil { typ } => format!("({})(nil)", typ),
        Expr::Zero { typ } => format!("new({})", typ),
        Expr::WrapError { value } => format!(
            "{}.NewBasicError({})",
            runtime::PLUGIN_MODULE,
            render_expr(value)
        ),
        Expr::Spread { value } => format!("{}...", render_expr(value)),
    }
}
