use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Largest assignable field number (2^29 - 1). A reserved extension range
/// ending here prints the keyword `max` instead of the number.
pub const MAX_FIELD_ID: u32 = 536_870_911;

/// Fully-qualified name of the builtin namespace, which is never emitted.
pub const BUILTIN_NAMESPACE: &str = ".google.protobuf";

/// One node of the descriptor tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Root(Root),
    Namespace(Namespace),
    Message(Message),
    Field(Field),
    MapField(MapField),
    Enum(EnumDef),
    OneOf(OneOf),
}

impl Node {
    /// Simple (unqualified) name of the declaration, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Root(_) => None,
            Node::Namespace(namespace) => Some(&namespace.name),
            Node::Message(message) => Some(&message.name),
            Node::Field(field) => Some(&field.name),
            Node::MapField(map) => Some(&map.field.name),
            Node::Enum(decl) => Some(&decl.name),
            Node::OneOf(oneof) => Some(&oneof.name),
        }
    }

    /// Nested declarations, for the variants that contain any.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Root(root) => Some(&root.nested),
            Node::Namespace(namespace) => Some(&namespace.nested),
            Node::Message(message) => Some(&message.nested),
            _ => None,
        }
    }

    /// Field data shared by `Field` and `MapField` nodes.
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Node::Field(field) => Some(field),
            Node::MapField(map) => Some(&map.field),
            _ => None,
        }
    }
}

/// Top of the tree: process-wide options plus the top-level declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Root {
    /// Declared options in declaration order, name to literal value.
    pub options: Vec<(String, Value)>,
    pub nested: Vec<Node>,
}

/// A package. The builtin namespace ([`BUILTIN_NAMESPACE`]) is special-cased
/// by the renderer and produces no output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Namespace {
    pub name: String,
    /// Dot-prefixed fully-qualified name, e.g. `.google.protobuf`.
    pub full_name: String,
    pub nested: Vec<Node>,
}

/// A message, or a legacy synthetic group when `group` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    pub name: String,
    pub full_name: String,
    /// Sub-messages, enums and extension field declarations, in order.
    pub nested: Vec<Node>,
    /// Declared fields in order; holds only `Field` and `MapField` variants.
    pub fields: Vec<Node>,
    pub oneofs: Vec<OneOf>,
    /// Reserved extension number range `[low, high]`, first declared range.
    pub extensions: Option<(u32, u32)>,
    /// A synthetic group is paired with exactly one field of its parent
    /// message whose declared type matches this message's name.
    pub group: bool,
}

/// Explicit repetition keyword. A declared `optional` label carries no
/// information beyond the [`Field::optional`] flag and is folded into it by
/// the loader, so it has no variant here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Rule {
    Required,
    Repeated,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "required"),
            Rule::Repeated => write!(f, "repeated"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub id: u32,
    pub type_name: String,
    pub rule: Option<Rule>,
    /// True unless the field is required.
    pub optional: bool,
    /// Declared default value, kept in its document literal form.
    pub default: Option<Value>,
    /// Fully-qualified name of the message whose number space this field
    /// extends, when the field is an extension declaration.
    pub extend: Option<String>,
    /// Extend target of the declaration this field mirrors. Set only on
    /// fields materialized into an extension's target message; such fields
    /// never render on their own.
    pub declaring_extend: Option<String>,
}

/// A field with an additional key type; renders as `map<key, value>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapField {
    pub field: Field,
    pub key_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub full_name: String,
    /// Symbolic name to integer value, in declaration order.
    pub values: Vec<(String, i32)>,
}

/// A oneof group. Members name fields of the enclosing message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OneOf {
    pub name: String,
    pub members: Vec<String>,
}
