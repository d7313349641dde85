//! Serde model of a JSON contract file.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One contract file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractFile {
    /// Module path the declared types belong to.
    pub module: String,

    /// Types declared by the module, by local name.
    #[serde(default)]
    pub types: BTreeMap<String, TypeExpr>,

    /// Shapes of external types, by qualified name (`path/to/module.Name`).
    #[serde(default)]
    pub externals: BTreeMap<String, TypeExpr>,
}

/// A type reference: a name, or an inline composite type.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeExpr {
    Name(String),
    Composite(CompositeType),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompositeType {
    Slice {
        elem: Box<TypeExpr>,
    },
    Array {
        len: u64,
        elem: Box<TypeExpr>,
    },
    Pointer {
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        #[serde(default)]
        dir: ChanDirExpr,
        elem: Box<TypeExpr>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<FieldExpr>,
    },
    Func {
        #[serde(default)]
        params: Vec<ParamExpr>,
        #[serde(default)]
        results: Vec<ParamExpr>,
        #[serde(default)]
        variadic: bool,
    },
    Interface {
        #[serde(default)]
        methods: Vec<MethodExpr>,
        #[serde(default)]
        embeds: Vec<TypeExpr>,
    },
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanDirExpr {
    #[default]
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldExpr {
    /// Required unless `embedded`; an embedded field takes its type's name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub typ: TypeExpr,
    #[serde(default)]
    pub embedded: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamExpr {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub typ: TypeExpr,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodExpr {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamExpr>,
    #[serde(default)]
    pub results: Vec<ParamExpr>,
    #[serde(default)]
    pub variadic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_types() {
        let file: ContractFile = serde_json::from_str(
            r#"{
                "module": "example.com/thinger",
                "types": {
                    "Thinger": {
                        "kind": "interface",
                        "methods": [
                            { "name": "Sum",
                              "params": [ { "name": "xs", "type": { "kind": "slice", "elem": "int" } } ],
                              "results": [ { "type": "int" } ],
                              "variadic": true }
                        ],
                        "embeds": [ "fmt.Stringer" ]
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(file.module, "example.com/thinger");
        assert!(file.externals.is_empty());
        let TypeExpr::Composite(CompositeType::Interface { methods, embeds }) = &file.types["Thinger"]
        else {
            panic!("expected interface");
        };
        assert_eq!(methods[0].name, "Sum");
        assert!(methods[0].variadic);
        assert_eq!(methods[0].params[0].name.as_deref(), Some("xs"));
        assert!(matches!(&embeds[0], TypeExpr::Name(n) if n == "fmt.Stringer"));
    }

    #[test]
    fn test_chan_direction_defaults_to_both() {
        let expr: TypeExpr = serde_json::from_str(r#"{ "kind": "chan", "elem": "int" }"#).unwrap();
        assert!(matches!(
            expr,
            TypeExpr::Composite(CompositeType::Chan {
                dir: ChanDirExpr::Both,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(serde_json::from_str::<TypeExpr>(r#"{ "kind": "tuple" }"#).is_err());
    }
}
