use serde_json::{Map, Value};

use unproto_descriptor::{EnumDef, Field, MapField, Message, Namespace, Node, OneOf, Root, Rule};

use crate::error::UnprotoError;
use crate::utils::quote;

/// Parse a JSON descriptor document into the node tree.
///
/// Nested declarations are classified by shape: `fields` (or `group`) marks
/// a message, `values` an enum, `id` a field, anything else a namespace.
/// Declaration order is preserved throughout, and fully-qualified names are
/// assigned while walking down.
pub fn load_descriptor(text: &str) -> Result<Root, UnprotoError> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| UnprotoError::DecodeError(format!("Invalid descriptor document: {}", e)))?;
    let obj = doc.as_object().ok_or_else(|| {
        UnprotoError::DecodeError("Descriptor document must be a JSON object".to_string())
    })?;

    let mut root = Root {
        options: read_options(obj)?,
        nested: read_nested(obj, "")?,
    };
    resolve_extensions(&mut root);
    Ok(root)
}

fn read_options(obj: &Map<String, Value>) -> Result<Vec<(String, Value)>, UnprotoError> {
    let Some(options) = obj.get("options") else {
        return Ok(Vec::new());
    };
    let entries = options
        .as_object()
        .ok_or_else(|| UnprotoError::DecodeError("\"options\" must be an object".to_string()))?;
    Ok(entries
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect())
}

fn read_nested(obj: &Map<String, Value>, scope: &str) -> Result<Vec<Node>, UnprotoError> {
    let Some(nested) = obj.get("nested") else {
        return Ok(Vec::new());
    };
    let entries = nested.as_object().ok_or_else(|| {
        UnprotoError::DecodeError(format!("\"nested\" in {} must be an object", scope_label(scope)))
    })?;
    entries
        .iter()
        .map(|(name, value)| build_node(name, value, scope))
        .collect()
}

fn scope_label(scope: &str) -> String {
    if scope.is_empty() {
        "the document root".to_string()
    } else {
        quote(scope)
    }
}

fn build_node(name: &str, value: &Value, scope: &str) -> Result<Node, UnprotoError> {
    let obj = value.as_object().ok_or_else(|| {
        UnprotoError::DecodeError(format!("Declaration {} must be an object", quote(name)))
    })?;
    let full_name = format!("{}.{}", scope, name);

    if obj.contains_key("fields") || obj.contains_key("group") {
        build_message(name, obj, &full_name)
    } else if obj.contains_key("values") {
        build_enum(name, obj, &full_name)
    } else if obj.contains_key("id") {
        build_field(name, obj)
    } else if obj.contains_key("methods") {
        Err(UnprotoError::DecodeError(format!(
            "Service declarations are not supported ({})",
            quote(name)
        )))
    } else {
        Ok(Node::Namespace(Namespace {
            name: name.to_string(),
            full_name: full_name.clone(),
            nested: read_nested(obj, &full_name)?,
        }))
    }
}

fn build_message(
    name: &str,
    obj: &Map<String, Value>,
    full_name: &str,
) -> Result<Node, UnprotoError> {
    let mut fields = Vec::new();
    if let Some(declared) = obj.get("fields") {
        let entries = declared.as_object().ok_or_else(|| {
            UnprotoError::DecodeError(format!("\"fields\" of {} must be an object", quote(name)))
        })?;
        for (field_name, field_value) in entries {
            let field_obj = field_value.as_object().ok_or_else(|| {
                UnprotoError::DecodeError(format!("Field {} must be an object", quote(field_name)))
            })?;
            fields.push(build_field(field_name, field_obj)?);
        }
    }

    let mut oneofs = Vec::new();
    if let Some(declared) = obj.get("oneofs") {
        let entries = declared.as_object().ok_or_else(|| {
            UnprotoError::DecodeError(format!("\"oneofs\" of {} must be an object", quote(name)))
        })?;
        for (oneof_name, oneof_value) in entries {
            oneofs.push(build_oneof(oneof_name, oneof_value)?);
        }
    }

    Ok(Node::Message(Message {
        name: name.to_string(),
        full_name: full_name.to_string(),
        nested: read_nested(obj, full_name)?,
        fields,
        oneofs,
        extensions: read_extensions(name, obj)?,
        group: obj.get("group").and_then(Value::as_bool).unwrap_or(false),
    }))
}

fn build_field(name: &str, obj: &Map<String, Value>) -> Result<Node, UnprotoError> {
    let id = obj.get("id").and_then(Value::as_u64).ok_or_else(|| {
        UnprotoError::DecodeError(format!("Field {} is missing a numeric id", quote(name)))
    })? as u32;
    let type_name = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            UnprotoError::DecodeError(format!("Field {} is missing a type", quote(name)))
        })?
        .to_string();

    // A declared `optional` keyword carries no information beyond the flag.
    let rule = match obj.get("rule").and_then(Value::as_str) {
        Some("required") => Some(Rule::Required),
        Some("repeated") => Some(Rule::Repeated),
        _ => None,
    };
    let optional = !matches!(rule, Some(Rule::Required));

    let default = obj
        .get("options")
        .and_then(Value::as_object)
        .and_then(|options| options.get("default"))
        .cloned();
    let extend = obj.get("extend").and_then(Value::as_str).map(str::to_string);

    let field = Field {
        name: name.to_string(),
        id,
        type_name,
        rule,
        optional,
        default,
        extend,
        declaring_extend: None,
    };
    Ok(match obj.get("keyType").and_then(Value::as_str) {
        Some(key_type) => Node::MapField(MapField {
            field,
            key_type: key_type.to_string(),
        }),
        None => Node::Field(field),
    })
}

fn build_enum(name: &str, obj: &Map<String, Value>, full_name: &str) -> Result<Node, UnprotoError> {
    let declared = obj.get("values").and_then(Value::as_object).ok_or_else(|| {
        UnprotoError::DecodeError(format!("\"values\" of {} must be an object", quote(name)))
    })?;
    let mut values = Vec::with_capacity(declared.len());
    for (symbol, value) in declared {
        let number = value.as_i64().ok_or_else(|| {
            UnprotoError::DecodeError(format!(
                "Enum value {} of {} must be an integer",
                quote(symbol),
                quote(name)
            ))
        })?;
        values.push((symbol.clone(), number as i32));
    }
    Ok(Node::Enum(EnumDef {
        name: name.to_string(),
        full_name: full_name.to_string(),
        values,
    }))
}

fn build_oneof(name: &str, value: &Value) -> Result<OneOf, UnprotoError> {
    let members = value
        .as_object()
        .and_then(|obj| obj.get("oneof"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            UnprotoError::DecodeError(format!(
                "Oneof {} must list its member fields",
                quote(name)
            ))
        })?
        .iter()
        .map(|member| {
            member.as_str().map(str::to_string).ok_or_else(|| {
                UnprotoError::DecodeError(format!(
                    "Oneof {} member names must be strings",
                    quote(name)
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(OneOf {
        name: name.to_string(),
        members,
    })
}

/// Only the first declared range is retained.
fn read_extensions(
    name: &str,
    obj: &Map<String, Value>,
) -> Result<Option<(u32, u32)>, UnprotoError> {
    let Some(declared) = obj.get("extensions") else {
        return Ok(None);
    };
    let ranges = declared.as_array().ok_or_else(|| {
        UnprotoError::DecodeError(format!("\"extensions\" of {} must be an array", quote(name)))
    })?;
    let Some(first) = ranges.first() else {
        return Ok(None);
    };
    let bounds = first
        .as_array()
        .filter(|bounds| bounds.len() == 2)
        .ok_or_else(|| {
            UnprotoError::DecodeError(format!(
                "Extension range of {} must be a [low, high] pair",
                quote(name)
            ))
        })?;
    let low = bounds[0].as_u64().ok_or_else(|| range_error(name))?;
    let high = bounds[1].as_u64().ok_or_else(|| range_error(name))?;
    Ok(Some((low as u32, high as u32)))
}

fn range_error(name: &str) -> UnprotoError {
    UnprotoError::DecodeError(format!(
        "Extension range bounds of {} must be integers",
        quote(name)
    ))
}

/// Mirror every extension declaration into its target message, carrying the
/// declaring extend target so the renderer can tell the mirror apart from an
/// ordinary field. Targets that do not resolve to a message are skipped.
fn resolve_extensions(root: &mut Root) {
    let mut mirrors: Vec<(String, Field)> = Vec::new();
    collect_mirrors(root, &root.nested, "", &mut mirrors);
    if mirrors.is_empty() {
        return;
    }
    inject_mirrors(&mut root.nested, &mirrors);
}

fn collect_mirrors(root: &Root, nested: &[Node], scope: &str, mirrors: &mut Vec<(String, Field)>) {
    for node in nested {
        match node {
            Node::Namespace(namespace) => {
                collect_mirrors(root, &namespace.nested, &namespace.full_name, mirrors);
            }
            Node::Message(message) => {
                collect_mirrors(root, &message.nested, &message.full_name, mirrors);
            }
            _ => {
                let Some(field) = node.as_field() else {
                    continue;
                };
                let Some(target) = &field.extend else {
                    continue;
                };
                if let Some(Node::Message(target_message)) = root.lookup(target) {
                    mirrors.push((
                        target_message.full_name.clone(),
                        Field {
                            name: format!("{}.{}", scope, field.name),
                            id: field.id,
                            type_name: field.type_name.clone(),
                            rule: field.rule.clone(),
                            optional: field.optional,
                            default: field.default.clone(),
                            extend: None,
                            declaring_extend: Some(target.clone()),
                        },
                    ));
                }
            }
        }
    }
}

fn inject_mirrors(nested: &mut [Node], mirrors: &[(String, Field)]) {
    for node in nested {
        match node {
            Node::Namespace(namespace) => inject_mirrors(&mut namespace.nested, mirrors),
            Node::Message(message) => {
                for (target, mirror) in mirrors {
                    if *target == message.full_name {
                        message.fields.push(Node::Field(mirror.clone()));
                    }
                }
                inject_mirrors(&mut message.nested, mirrors);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_simple_document() {
        let root = load_descriptor(
            r#"{
                "options": {"java_package": "com.example", "cc_enable_arenas": true},
                "nested": {
                    "pkg": {
                        "nested": {
                            "Example": {
                                "fields": {
                                    "clientId": {"type": "uint32", "id": 1},
                                    "kinds": {"rule": "repeated", "type": "Kind", "id": 2}
                                }
                            },
                            "Kind": {"values": {"A": 0, "B": 1}}
                        }
                    }
                }
            }"#,
        )
        .expect("load_descriptor failed");

        assert_eq!(root.options.len(), 2);
        assert_eq!(root.options[0].0, "java_package");
        assert_eq!(root.options[1].0, "cc_enable_arenas");

        let Node::Namespace(pkg) = &root.nested[0] else {
            panic!("expected a namespace");
        };
        assert_eq!(pkg.full_name, ".pkg");
        assert_eq!(pkg.nested.len(), 2);

        let Node::Message(example) = &pkg.nested[0] else {
            panic!("expected a message");
        };
        assert_eq!(example.full_name, ".pkg.Example");
        assert_eq!(example.fields.len(), 2);

        let first = example.fields[0].as_field().expect("not a field");
        assert_eq!(first.name, "clientId");
        assert_eq!(first.id, 1);
        assert_eq!(first.rule, None);
        assert!(first.optional);

        let second = example.fields[1].as_field().expect("not a field");
        assert_eq!(second.rule, Some(Rule::Repeated));
        assert!(second.optional);

        let Node::Enum(kind) = &pkg.nested[1] else {
            panic!("expected an enum");
        };
        assert_eq!(kind.values, vec![("A".to_string(), 0), ("B".to_string(), 1)]);
    }

    #[test]
    fn test_optional_rule_folded_into_flag() {
        let root = load_descriptor(
            r#"{"nested": {"M": {"fields": {"f": {"rule": "optional", "type": "int32", "id": 1}}}}}"#,
        )
        .expect("load_descriptor failed");
        let Node::Message(message) = &root.nested[0] else {
            panic!("expected a message");
        };
        let field = message.fields[0].as_field().expect("not a field");
        assert_eq!(field.rule, None);
        assert!(field.optional);
    }

    #[test]
    fn test_required_field_not_optional() {
        let root = load_descriptor(
            r#"{"nested": {"M": {"fields": {"f": {"rule": "required", "type": "int32", "id": 1}}}}}"#,
        )
        .expect("load_descriptor failed");
        let Node::Message(message) = &root.nested[0] else {
            panic!("expected a message");
        };
        let field = message.fields[0].as_field().expect("not a field");
        assert_eq!(field.rule, Some(Rule::Required));
        assert!(!field.optional);
    }

    #[test]
    fn test_map_field_and_default() {
        let root = load_descriptor(
            r#"{"nested": {"M": {"fields": {
                "scores": {"keyType": "string", "type": "int32", "id": 1},
                "count": {"type": "int32", "id": 2, "options": {"default": 5}}
            }}}}"#,
        )
        .expect("load_descriptor failed");
        let Node::Message(message) = &root.nested[0] else {
            panic!("expected a message");
        };
        let Node::MapField(map) = &message.fields[0] else {
            panic!("expected a map field");
        };
        assert_eq!(map.key_type, "string");
        assert_eq!(map.field.type_name, "int32");

        let count = message.fields[1].as_field().expect("not a field");
        assert_eq!(count.default, Some(json!(5)));
    }

    #[test]
    fn test_first_extension_range_kept() {
        let root = load_descriptor(
            r#"{"nested": {"M": {"fields": {}, "extensions": [[100, 200], [300, 400]]}}}"#,
        )
        .expect("load_descriptor failed");
        let Node::Message(message) = &root.nested[0] else {
            panic!("expected a message");
        };
        assert_eq!(message.extensions, Some((100, 200)));
    }

    #[test]
    fn test_group_flag() {
        let root = load_descriptor(r#"{"nested": {"G": {"group": true, "fields": {}}}}"#)
            .expect("load_descriptor failed");
        let Node::Message(message) = &root.nested[0] else {
            panic!("expected a message");
        };
        assert!(message.group);
    }

    #[test]
    fn test_extension_mirror_injected_into_target() {
        let root = load_descriptor(
            r#"{"nested": {
                "Target": {"fields": {}},
                "Source": {
                    "fields": {},
                    "nested": {"extra": {"type": "int32", "id": 100, "extend": ".Target"}}
                }
            }}"#,
        )
        .expect("load_descriptor failed");
        let Node::Message(target) = &root.nested[0] else {
            panic!("expected a message");
        };
        assert_eq!(target.fields.len(), 1);
        let mirror = target.fields[0].as_field().expect("not a field");
        assert_eq!(mirror.name, ".Source.extra");
        assert_eq!(mirror.id, 100);
        assert_eq!(mirror.extend, None);
        assert_eq!(mirror.declaring_extend, Some(".Target".to_string()));
    }

    #[test]
    fn test_unresolved_extension_target_skipped() {
        let root = load_descriptor(
            r#"{"nested": {
                "Target": {"fields": {}},
                "Source": {
                    "fields": {},
                    "nested": {"extra": {"type": "int32", "id": 100, "extend": ".Nowhere"}}
                }
            }}"#,
        )
        .expect("load_descriptor failed");
        let Node::Message(target) = &root.nested[0] else {
            panic!("expected a message");
        };
        assert!(target.fields.is_empty());
    }

    #[test]
    fn test_service_rejected() {
        let err = load_descriptor(r#"{"nested": {"Svc": {"methods": {}}}}"#).unwrap_err();
        assert!(
            matches!(err, UnprotoError::DecodeError(_)),
            "expected a DecodeError but got {:?}",
            err
        );
    }

    #[test]
    fn test_malformed_documents_rejected() {
        assert!(matches!(
            load_descriptor("[]").unwrap_err(),
            UnprotoError::DecodeError(_)
        ));
        assert!(matches!(
            load_descriptor("not json").unwrap_err(),
            UnprotoError::DecodeError(_)
        ));
        // A field entry with an id but no type is rejected.
        assert!(matches!(
            load_descriptor(r#"{"nested": {"M": {"fields": {"f": {"id": 1}}}}}"#).unwrap_err(),
            UnprotoError::DecodeError(_)
        ));
    }

    #[test]
    fn test_document_without_options_loads() {
        let root = load_descriptor(r#"{"nested": {}}"#).expect("load_descriptor failed");
        assert!(root.options.is_empty());
        assert!(root.nested.is_empty());
    }
}
