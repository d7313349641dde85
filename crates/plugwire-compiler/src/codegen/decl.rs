//! Abstract declarations handed to a [`CodeEmitter`](crate::emit::CodeEmitter).
//!
//! The generator never produces source text. It builds these nodes and leaves
//! their spelling to the emitter.

use serde::Serialize;

use crate::encode::{SignatureShape, TypeShape};

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decl", rename_all = "snake_case")]
pub enum Declaration {
    Type(TypeDecl),
    Function(FunctionDecl),
    Variable(VariableDecl),
}

impl Declaration {
    /// The declared identifier. Methods are named `Receiver.Method`.
    pub fn name(&self) -> String {
        match self {
            Declaration::Type(decl) => decl.name.clone(),
            Declaration::Function(decl) => match &decl.receiver {
                Some(receiver) => format!("{}.{}", receiver.type_name, decl.name),
                None => decl.name.clone(),
            },
            Declaration::Variable(decl) => decl.name.clone(),
        }
    }

    pub fn doc(&self) -> &[String] {
        match self {
            Declaration::Type(decl) => &decl.doc,
            Declaration::Function(decl) => &decl.doc,
            Declaration::Variable(decl) => &decl.doc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDecl {
    pub name: String,
    pub doc: Vec<String>,
    pub shape: TypeShape,
}

/// The receiver of a method declaration. Always a pointer to a local type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receiver {
    pub name: String,
    pub type_name: String,
}

impl Receiver {
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
        }
    }

    pub fn ident(&self) -> Expr {
        Expr::ident(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub doc: Vec<String>,
    pub receiver: Option<Receiver>,
    pub signature: SignatureShape,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDecl {
    pub name: String,
    pub doc: Vec<String>,
    pub typ: Option<TypeShape>,
    pub value: Expr,
}

/// What a client does when a remote call fails at the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure and fall through with zero-valued results.
    Log,
    /// Terminate the process.
    Abort,
}

/// A statement inside a function body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    /// Binds `names` to the value(s) of `value`.
    Let { names: Vec<String>, value: Expr },
    /// Binds `names` plus a trailing error; a non-nil error is returned from
    /// the enclosing function.
    LetChecked { names: Vec<String>, value: Expr },
    /// Stores `value` into `target`. A [`Expr::WrapError`] value is only
    /// wrapped when non-nil; a nil source stores nil.
    Assign { target: Expr, value: Expr },
    /// Evaluates `expr` for its effect.
    Eval { expr: Expr },
    /// Runs `call` concurrently without waiting for it.
    Spawn { call: Expr },
    /// Runs `call` when the enclosing function returns.
    Defer { call: Expr },
    /// One synchronous remote invocation.
    RemoteCall {
        client: Expr,
        method: String,
        params: Expr,
        results: Expr,
        on_failure: FailurePolicy,
        message: String,
    },
    /// Registers a concrete type with the wire codec.
    RegisterWireType { typ: TypeShape },
    Return { values: Vec<Expr> },
}

/// A field initializer inside [`Expr::Construct`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    Ident { name: String },
    /// A function or value exported by an external module.
    Qualified { module: String, name: String },
    Field { base: Box<Expr>, name: String },
    Call { func: Box<Expr>, args: Vec<Expr> },
    /// A composite value; `by_ref` yields a pointer to it.
    Construct { typ: TypeShape, fields: Vec<FieldInit>, by_ref: bool },
    Str { value: String },
    Int { value: i64 },
    Nil,
    /// `nil` converted to `typ`.
    TypedNil { typ: TypeShape },
    /// A fresh zero value of `typ`, by pointer.
    Zero { typ: TypeShape },
    /// An error-like value wrapped in the message-only carrier. Only valid as
    /// the value of [`Stmt::Assign`], which keeps nil as nil.
    WrapError { value: Box<Expr> },
    /// A packed sequence spread into a variadic call.
    Spread { value: Box<Expr> },
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Ident {
            name: name.to_string(),
        }
    }

    pub fn qualified(module: &str, name: &str) -> Self {
        Expr::Qualified {
            module: module.to_string(),
            name: name.to_string(),
        }
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Str {
            value: value.into(),
        }
    }

    pub fn field(self, name: &str) -> Self {
        Expr::Field {
            base: Box::new(self),
            name: name.to_string(),
        }
    }

    pub fn call(self, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: Box::new(self),
            args,
        }
    }

    pub fn wrap_error(self) -> Self {
        Expr::WrapError {
            value: Box::new(self),
        }
    }

    pub fn spread(self) -> Self {
        Expr::Spread {
            value: Box::new(self),
        }
    }
}

/// Shorthand for a field initializer.
pub fn init(name: &str, value: Expr) -> FieldInit {
    FieldInit {
        name: name.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_declaration_name() {
        let decl = Declaration::Function(FunctionDecl {
            name: "Sum".to_string(),
            doc: Vec::new(),
            receiver: Some(Receiver::new("c", "ThingerRPCClient")),
            signature: SignatureShape::default(),
            body: Vec::new(),
        });
        assert_eq!(decl.name(), "ThingerRPCClient.Sum");
    }

    #[test]
    fn test_expr_builders() {
        let expr = Expr::ident("c").field("broker").field("NextId").call(Vec::new());
        let Expr::Call { func, args } = expr else {
            panic!("expected call");
        };
        assert!(args.is_empty());
        assert_eq!(
            *func,
            Expr::Field {
                base: Box::new(Expr::ident("c").field("broker")),
                name: "NextId".to_string(),
            }
        );
    }

    #[test]
    fn test_statement_serializes_with_tag() {
        let stmt = Stmt::Spawn {
            call: Expr::ident("serve").call(vec![Expr::Int { value: 1 }]),
        };
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(json["stmt"], "spawn");
        assert_eq!(json["call"]["expr"], "call");
        assert_eq!(json["call"]["args"][0]["value"], 1);
    }
}
