use plugwire_compiler::codegen::decl::{init, Declaration, Expr, FunctionDecl, Stmt, TypeDecl};
use plugwire_compiler::diagnostic::WarningKind;
use plugwire_compiler::encode::TypeShape;
use plugwire_compiler::frontend::{create_loader, ContractSet};
use plugwire_compiler::{generate, CompilerError, Generation, GeneratorOptions};

fn load(dir: &tempfile::TempDir, json: &str) -> ContractSet {
    let path = dir.path().join("contracts.json");
    std::fs::write(&path, json).unwrap();
    create_loader("json").unwrap().load(&path).unwrap()
}

fn run(set: &ContractSet, roots: &[&str]) -> Result<Generation, CompilerError> {
    let roots: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
    let roots = set.lookup_roots(&roots)?;
    generate(&set.universe, &roots, GeneratorOptions::default())
}

fn find_type<'a>(generation: &'a Generation, name: &str) -> &'a TypeDecl {
    generation
        .stubs
        .declarations
        .iter()
        .find_map(|d| match d {
            Declaration::Type(t) if t.name == name => Some(t),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no type {name}"))
}

fn find_method<'a>(generation: &'a Generation, receiver: &str, name: &str) -> &'a FunctionDecl {
    generation
        .stubs
        .declarations
        .iter()
        .find_map(|d| match d {
            Declaration::Function(f)
                if f.name == name
                    && f.receiver.as_ref().map(|r| r.type_name.as_str()) == Some(receiver) =>
            {
                Some(f)
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no method {receiver}.{name}"))
}

fn params_construct(decl: &FunctionDecl) -> &Expr {
    decl.body
        .iter()
        .find_map(|s| match s {
            Stmt::Let { names, value } if names.len() == 1 && names[0] == "params" => Some(value),
            _ => None,
        })
        .unwrap_or_else(|| panic!("{} builds no params", decl.name))
}

fn record_fields(decl: &TypeDecl) -> Vec<(String, TypeShape)> {
    let TypeShape::Struct { fields } = &decl.shape else {
        panic!("{} is not a struct", decl.name);
    };
    fields
        .iter()
        .map(|f| (f.name.clone().unwrap_or_default(), f.typ.clone()))
        .collect()
}

const SUM_IDENTITY: &str = r#"{
    "module": "example.com/thinger",
    "types": {
        "Thinger": { "kind": "interface", "methods": [
            { "name": "Sum",
              "params": [ { "name": "xs", "type": { "kind": "slice", "elem": "int" } } ],
              "results": [ { "type": "int" } ],
              "variadic": true },
            { "name": "Identity",
              "params": [ { "type": "any" } ],
              "results": [ { "type": "any" } ] }
        ] }
    }
}"#;

const REPLACE_CALLBACK: &str = r#"{
    "module": "example.com/thinger",
    "types": {
        "Callback": { "kind": "interface", "methods": [
            { "name": "Replace", "params": [ { "type": "string" } ], "results": [ { "type": "string" } ] } ] },
        "Thinger": { "kind": "interface", "methods": [
            { "name": "Replace",
              "params": [ { "name": "s", "type": "string" }, { "name": "cb", "type": "Callback" } ],
              "results": [ { "type": "string" } ] }
        ] }
    }
}"#;

#[test]
fn sum_and_identity_need_no_subchannels() {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(&dir, SUM_IDENTITY);
    let generation = run(&set, &["Thinger"]).unwrap();

    assert_eq!(generation.analysis.contracts.len(), 1);

    let sum_params = record_fields(find_type(&generation, "Thinger_SumParams"));
    assert_eq!(
        sum_params,
        vec![(
            "P0".to_string(),
            TypeShape::Slice {
                elem: Box::new(TypeShape::primitive("int"))
            }
        )]
    );
    let sum_results = record_fields(find_type(&generation, "Thinger_SumResults"));
    assert_eq!(sum_results, vec![("R0".to_string(), TypeShape::primitive("int"))]);

    let sum = find_method(&generation, "ThingerRPCClient", "Sum");
    assert!(!sum.body.iter().any(|s| matches!(s, Stmt::Spawn { .. })));
    assert_eq!(sum.signature.to_string(), "(...int) int");

    // Identity: two warnings, no sub-channel field.
    let warnings: Vec<_> = generation
        .analysis
        .warnings
        .iter()
        .filter(|w| w.method == "Identity")
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w.kind == WarningKind::AnySlot));
    let identity_params = record_fields(find_type(&generation, "Thinger_IdentityParams"));
    assert_eq!(identity_params, vec![("P0".to_string(), TypeShape::any())]);

    // The server spreads the packed sequence back into the call.
    let server_sum = find_method(&generation, "ThingerRPCServer", "Sum");
    let Some(Stmt::Let { value: Expr::Call { args, .. }, .. }) = server_sum.body.first() else {
        panic!("expected implementation call first");
    };
    assert!(matches!(&args[0], Expr::Spread { .. }));
}

#[test]
fn callback_parameter_is_wired_through_a_subchannel() {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(&dir, REPLACE_CALLBACK);
    let generation = run(&set, &["Thinger"]).unwrap();

    let graph = &generation.analysis.contracts;
    assert_eq!(graph.len(), 2);
    let thinger = graph.find_named("Thinger").unwrap();
    let callback = graph.find_named("Callback").unwrap();
    assert_eq!(thinger.method("Replace").unwrap().params[1].contract, Some(callback.id));

    // Only the id crosses the wire.
    let params = record_fields(find_type(&generation, "Thinger_ReplaceParams"));
    assert_eq!(
        params,
        vec![
            ("P0".to_string(), TypeShape::primitive("string")),
            ("P1ID".to_string(), TypeShape::SubchannelId),
        ]
    );

    // Client: allocate, spawn the accept loop, then call.
    let client = find_method(&generation, "ThingerRPCClient", "Replace");
    let position = |pred: &dyn Fn(&Stmt) -> bool| client.body.iter().position(pred).unwrap();
    let alloc = position(&|s| matches!(s, Stmt::Let { names, .. } if names == &["p1id"]));
    let spawn = position(&|s| matches!(s, Stmt::Spawn { .. }));
    let call = position(&|s| matches!(s, Stmt::RemoteCall { .. }));
    assert!(alloc < spawn && spawn < call);

    let Stmt::Spawn { call: Expr::Call { args, .. } } = &client.body[spawn] else {
        panic!("expected spawned call");
    };
    assert_eq!(args[0], Expr::ident("p1id"));
    let Expr::Call { func, .. } = &args[1] else {
        panic!("expected server constructor");
    };
    assert_eq!(**func, Expr::ident("NewCallbackRPCServer"));

    let Stmt::RemoteCall { method, .. } = &client.body[call] else {
        unreachable!();
    };
    assert_eq!(method, "Thinger.Replace");

    // Server: dial the id and hand the implementation a proxy.
    let server = find_method(&generation, "ThingerRPCServer", "Replace");
    assert!(matches!(
        &server.body[0],
        Stmt::LetChecked { names, value: Expr::Call { args, .. } }
            if names == &["p1conn"] && args[0] == Expr::ident("params").field("P1ID")
    ));
    assert!(server
        .body
        .iter()
        .any(|s| matches!(s, Stmt::Defer { .. })));
    let proxy = server
        .body
        .iter()
        .find_map(|s| match s {
            Stmt::Let { names, value } if names == &["p1"] => Some(value),
            _ => None,
        })
        .unwrap();
    let Expr::Call { func, .. } = proxy else {
        panic!("expected client constructor");
    };
    assert_eq!(**func, Expr::ident("NewCallbackRPCClient"));

    let invoke = server
        .body
        .iter()
        .find_map(|s| match s {
            Stmt::Let { names, value: Expr::Call { args, .. } } if names == &["r0"] => Some(args),
            _ => None,
        })
        .unwrap();
    assert_eq!(invoke[0], Expr::ident("params").field("P0"));
    assert_eq!(invoke[1], Expr::ident("p1"));
}

#[test]
fn shape_identical_contracts_collapse() {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(
        &dir,
        r#"{
            "module": "example.com/jobs",
            "types": {
                "A": { "kind": "interface", "methods": [
                    { "name": "Run", "params": [ { "type": { "kind": "interface", "methods": [
                        { "name": "Done", "params": [ { "name": "ok", "type": "bool" } ] } ] } } ] } ] },
                "B": { "kind": "interface", "methods": [
                    { "name": "Start", "params": [ { "type": { "kind": "interface", "methods": [
                        { "name": "Done", "params": [ { "name": "success", "type": "bool" } ] } ] } } ] } ] }
            }
        }"#,
    );
    let generation = run(&set, &["A", "B"]).unwrap();

    let graph = &generation.analysis.contracts;
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.iter().filter(|c| c.is_anonymous()).count(), 1);
    let anonymous = graph.iter().find(|c| c.is_anonymous()).unwrap();
    assert_eq!(anonymous.signature, "interface{Done(bool)}");

    let a = graph.find_named("A").unwrap();
    let b = graph.find_named("B").unwrap();
    assert_eq!(a.methods[0].params[0].contract, Some(anonymous.id));
    assert_eq!(b.methods[0].params[0].contract, Some(anonymous.id));

    let anonymous_decls = generation
        .stubs
        .declarations
        .iter()
        .filter(|d| d.name() == "AnonymousInterface0")
        .count();
    assert_eq!(anonymous_decls, 1);
}

#[test]
fn embedding_order_does_not_split_contracts() {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(
        &dir,
        r#"{
            "module": "example.com/io",
            "types": {
                "R": { "kind": "interface", "methods": [ { "name": "Read" } ] },
                "W": { "kind": "interface", "methods": [ { "name": "Write" } ] },
                "Root": { "kind": "interface", "methods": [
                    { "name": "Use", "params": [
                        { "name": "a", "type": { "kind": "interface", "embeds": [ "R", "W" ] } },
                        { "name": "b", "type": { "kind": "interface", "embeds": [ "W", "R" ] } } ] } ] }
            }
        }"#,
    );
    let generation = run(&set, &["Root"]).unwrap();

    let graph = &generation.analysis.contracts;
    assert_eq!(graph.len(), 2);
    let anonymous = graph.iter().find(|c| c.is_anonymous()).unwrap();
    assert_eq!(anonymous.signature, "interface{example.com/io.R; example.com/io.W}");
    let root = graph.find_named("Root").unwrap();
    assert_eq!(root.methods[0].params[0].contract, Some(anonymous.id));
    assert_eq!(root.methods[0].params[1].contract, Some(anonymous.id));
}

#[test]
fn transitive_self_reference_terminates() {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(
        &dir,
        r#"{
            "module": "example.com/ping",
            "types": {
                "Ping": { "kind": "interface", "methods": [
                    { "name": "Ping", "params": [ { "type": "Pong" } ] } ] },
                "Pong": { "kind": "interface", "methods": [
                    { "name": "Pong", "params": [ { "type": "Ping" } ] } ] }
            }
        }"#,
    );
    let generation = run(&set, &["Ping"]).unwrap();

    let graph = &generation.analysis.contracts;
    let ping = graph.find_named("Ping").unwrap();
    let pong = graph.find_named("Pong").unwrap();
    assert_eq!(ping.methods[0].params[0].contract, Some(pong.id));
    assert_eq!(pong.methods[0].params[0].contract, Some(ping.id));
}

#[test]
fn variadic_callback_aborts() {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(
        &dir,
        r#"{
            "module": "example.com/each",
            "types": {
                "Visitor": { "kind": "interface", "methods": [ { "name": "Visit" } ] },
                "Walker": { "kind": "interface", "methods": [
                    { "name": "Walk",
                      "params": [ { "type": { "kind": "slice", "elem": "Visitor" } } ],
                      "variadic": true } ] }
            }
        }"#,
    );
    let err = run(&set, &["Walker"]).unwrap_err();
    assert!(matches!(
        err,
        CompilerError::VariadicCallback { ref method, .. } if method == "Walk"
    ));
    assert!(err.is_analysis_error());
}

#[test]
fn pluggable_result_aborts() {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(
        &dir,
        r#"{
            "module": "example.com/factory",
            "types": {
                "Widget": { "kind": "interface", "methods": [ { "name": "Spin" } ] },
                "Factory": { "kind": "interface", "methods": [
                    { "name": "Make", "results": [ { "type": "Widget" } ] } ] }
            }
        }"#,
    );
    let err = run(&set, &["Factory"]).unwrap_err();
    assert!(matches!(err, CompilerError::PluggableResult { .. }));
}

#[test]
fn error_results_are_wrapped_unless_raw() {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(
        &dir,
        r#"{
            "module": "example.com/check",
            "types": {
                "Checker": { "kind": "interface", "methods": [
                    { "name": "Check", "params": [ { "type": "error" } ], "results": [ { "type": "error" } ] } ] }
            }
        }"#,
    );
    let roots = set.lookup_roots(&["Checker".to_string()]).unwrap();

    let wrapped = generate(&set.universe, &roots, GeneratorOptions::default()).unwrap();
    let server = find_method(&wrapped, "CheckerRPCServer", "Check");
    assert!(server.body.iter().any(|s| matches!(
        s,
        Stmt::Assign { value: Expr::WrapError { .. }, .. }
    )));
    assert_eq!(wrapped.stubs.declarations.last().map(Declaration::name).as_deref(), Some("init"));
    assert!(wrapped.analysis.warnings.is_empty());

    let client = find_method(&wrapped, "CheckerRPCClient", "Check");
    let Expr::Construct { fields, .. } = params_construct(client) else {
        panic!("params is not a record");
    };
    assert!(fields.is_empty());
    assert!(client.body.iter().any(|s| match s {
        Stmt::Assign { target, value: Expr::WrapError { value } } => {
            *target == Expr::ident("params").field("P0") && **value == Expr::ident("p0")
        }
        _ => false,
    }));

    let options = GeneratorOptions {
        allow_raw_error_passthrough: true,
        ..GeneratorOptions::default()
    };
    let raw = generate(&set.universe, &roots, options).unwrap();
    let server = find_method(&raw, "CheckerRPCServer", "Check");
    assert!(!server.body.iter().any(|s| matches!(
        s,
        Stmt::Assign { value: Expr::WrapError { .. }, .. }
    )));
    let client = find_method(&raw, "CheckerRPCClient", "Check");
    let Expr::Construct { fields, .. } = params_construct(client) else {
        panic!("params is not a record");
    };
    assert_eq!(fields, &vec![init("P0", Expr::ident("p0"))]);
    assert!(!client.body.iter().any(|s| matches!(s, Stmt::Assign { .. })));
    assert_eq!(raw.analysis.warnings.len(), 2);
    assert!(raw
        .analysis
        .warnings
        .iter()
        .all(|w| w.kind == WarningKind::RawErrorSlot));
}

#[test]
fn analysis_is_idempotent() {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(&dir, REPLACE_CALLBACK);
    let first = run(&set, &["Thinger"]).unwrap();
    let second = run(&set, &["Thinger"]).unwrap();
    assert_eq!(first.analysis.contracts, second.analysis.contracts);
    assert_eq!(first.stubs.declarations, second.stubs.declarations);
    assert_eq!(first.stubs.fingerprint, second.stubs.fingerprint);

    // Root order does not change the graph.
    let reordered = run(&set, &["Callback", "Thinger"]).unwrap();
    assert_eq!(first.analysis.contracts, reordered.analysis.contracts);
}

fn fingerprint_of(json: &str) -> String {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(&dir, json);
    run(&set, &["Thinger"]).unwrap().stubs.fingerprint.to_string()
}

#[test]
fn fingerprint_tracks_contract_changes() {
    let base = fingerprint_of(SUM_IDENTITY);
    assert_eq!(base, fingerprint_of(SUM_IDENTITY));
    assert_eq!(base.len(), 32);

    let added_method = SUM_IDENTITY.replace(
        r#"{ "name": "Identity","#,
        r#"{ "name": "Reset" }, { "name": "Identity","#,
    );
    assert_ne!(base, fingerprint_of(&added_method));

    let changed_param = SUM_IDENTITY.replace(r#""elem": "int""#, r#""elem": "int64""#);
    assert_ne!(base, fingerprint_of(&changed_param));

    let new_module = SUM_IDENTITY.replace(
        r#""params": [ { "type": "any" } ]"#,
        r#""params": [ { "type": "io.Writer" } ]"#,
    );
    assert_ne!(base, fingerprint_of(&new_module));

    // Parameter names are not part of the wire shape.
    let renamed = SUM_IDENTITY.replace(r#""name": "xs""#, r#""name": "values""#);
    assert_eq!(base, fingerprint_of(&renamed));
}

#[test]
fn vendored_externals_share_a_name() {
    let vendored = r#"{
        "module": "example.com/app",
        "types": {
            "Thinger": { "kind": "interface", "methods": [
                { "name": "Use", "params": [ { "type": "example.com/app/vendor/github.com/x/y.Thing" } ] } ] }
        }
    }"#;
    let direct = vendored.replace("example.com/app/vendor/github.com/x/y", "github.com/x/y");
    assert_eq!(fingerprint_of(vendored), fingerprint_of(&direct));
}

#[test]
fn missing_root_is_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    let set = load(&dir, SUM_IDENTITY);
    let err = run(&set, &["Missing"]).unwrap_err();
    assert_eq!(err.to_string(), "example.com/thinger.Missing not found");
}
