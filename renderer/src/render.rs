use std::collections::HashSet;

use serde_json::Value;

use unproto_descriptor::{
    EnumDef, Field, Message, Namespace, Node, OneOf, Root, BUILTIN_NAMESPACE, MAX_FIELD_ID,
};

use crate::error::UnprotoError;
use crate::utils::{camel_to_snake, json_literal, quote};

/// Renders descriptor nodes back into schema source lines.
///
/// Rendering is a pure walk over the immutable tree; the root is kept so
/// field type names can be resolved when formatting default values. A node
/// that produces no output yields an empty vector, never placeholder lines,
/// so results concatenate and join without filtering.
pub struct Renderer<'a> {
    root: &'a Root,
}

impl<'a> Renderer<'a> {
    pub fn new(root: &'a Root) -> Self {
        Renderer { root }
    }

    /// Render the whole document: root options first, then every top-level
    /// declaration in order.
    pub fn render_root(&self) -> Result<Vec<String>, UnprotoError> {
        self.render_document(self.root)
    }

    /// Render a single node. `in_extend` marks rendering inside an `extend`
    /// block; `no_label` suppresses the implied `optional` keyword, which is
    /// how oneof members render without one.
    pub fn render(
        &self,
        node: &Node,
        in_extend: bool,
        no_label: bool,
    ) -> Result<Vec<String>, UnprotoError> {
        self.render_node(node, None, in_extend, no_label)
    }

    fn render_node(
        &self,
        node: &Node,
        parent: Option<&Message>,
        in_extend: bool,
        no_label: bool,
    ) -> Result<Vec<String>, UnprotoError> {
        match node {
            Node::Root(root) => self.render_document(root),
            Node::Namespace(namespace) => self.render_namespace(namespace),
            Node::Message(message) => self.render_message(message, parent),
            Node::Field(field) => self.render_field(field, None, in_extend, no_label),
            Node::MapField(map) => {
                self.render_field(&map.field, Some(&map.key_type), in_extend, no_label)
            }
            Node::Enum(decl) => Ok(render_enum(decl)),
            Node::OneOf(oneof) => {
                let parent = parent.ok_or_else(|| {
                    UnprotoError::StructuralError(format!(
                        "Oneof {} has no enclosing message",
                        quote(&oneof.name)
                    ))
                })?;
                self.render_oneof(oneof, parent)
            }
        }
    }

    fn render_document(&self, root: &Root) -> Result<Vec<String>, UnprotoError> {
        let mut lines = Vec::new();
        for (name, value) in &root.options {
            lines.push(format!("option {} = {};", name, json_literal(value)));
        }
        for node in &root.nested {
            lines.extend(self.render_node(node, None, false, false)?);
        }
        Ok(lines)
    }

    /// The builtin namespace is never emitted, and a package whose body
    /// renders empty is elided rather than printed as an empty block.
    fn render_namespace(&self, namespace: &Namespace) -> Result<Vec<String>, UnprotoError> {
        if namespace.full_name == BUILTIN_NAMESPACE {
            return Ok(Vec::new());
        }
        let mut body = Vec::new();
        for node in &namespace.nested {
            body.extend(self.render_node(node, None, false, false)?);
        }
        if body.is_empty() {
            return Ok(Vec::new());
        }
        let mut lines = vec![format!("package {} {{", namespace.name)];
        lines.extend(indent(body));
        lines.push("}".to_string());
        Ok(lines)
    }

    fn render_field(
        &self,
        field: &Field,
        key_type: Option<&str>,
        in_extend: bool,
        no_label: bool,
    ) -> Result<Vec<String>, UnprotoError> {
        // Extension fields appear only inside extend blocks, and mirrors
        // injected into an extend target never render at all.
        if !in_extend && field.extend.is_some() {
            return Ok(Vec::new());
        }
        if field.declaring_extend.is_some() {
            return Ok(Vec::new());
        }

        let type_text = match key_type {
            Some(key_type) => format!("map<{}, {}>", key_type, field.type_name),
            None => field.type_name.clone(),
        };
        let default = match &field.default {
            Some(value) => format!(" [default={}]", self.default_literal(field, value)),
            None => String::new(),
        };
        Ok(vec![format!(
            "{}{} {} = {}{};",
            field_label(field, no_label),
            type_text,
            camel_to_snake(&field.name),
            field.id,
            default,
        )])
    }

    /// Enum defaults are symbolic constants and print bare; everything else
    /// prints in its native literal form.
    fn default_literal(&self, field: &Field, value: &Value) -> String {
        if matches!(self.root.lookup(&field.type_name), Some(Node::Enum(_))) {
            match value {
                Value::String(symbol) => symbol.clone(),
                other => json_literal(other),
            }
        } else {
            json_literal(value)
        }
    }

    fn render_oneof(&self, oneof: &OneOf, parent: &Message) -> Result<Vec<String>, UnprotoError> {
        let mut body = Vec::new();
        for member in &oneof.members {
            let field = find_field(parent, member).ok_or_else(|| {
                UnprotoError::StructuralError(format!(
                    "Oneof {} names {} which is not a field of {}",
                    quote(&oneof.name),
                    quote(member),
                    quote(&parent.name)
                ))
            })?;
            body.extend(self.render_node(field, Some(parent), false, true)?);
        }
        let mut lines = vec![format!("oneof {} {{", camel_to_snake(&oneof.name))];
        lines.extend(indent(body));
        lines.push("}".to_string());
        Ok(lines)
    }

    /// Message bodies keep a fixed category order: nested declarations,
    /// extend blocks, oneofs, remaining fields, then the reserved extension
    /// range. Fields consumed as oneof members or as a synthetic group's
    /// companion stay out of the plain-field section.
    fn render_message(
        &self,
        message: &Message,
        parent: Option<&Message>,
    ) -> Result<Vec<String>, UnprotoError> {
        let header = if message.group {
            let parent = parent.ok_or_else(|| {
                UnprotoError::StructuralError(format!(
                    "Group {} has no enclosing message",
                    quote(&message.name)
                ))
            })?;
            let companion = find_companion(parent, &message.name)?;
            format!(
                "{}group {} = {} {{",
                field_label(companion, false),
                message.name,
                companion.id
            )
        } else {
            format!("message {} {{", message.name)
        };

        let mut used: HashSet<&str> = HashSet::new();
        let mut extend_blocks: Vec<(&str, Vec<&Node>)> = Vec::new();
        for node in &message.nested {
            if let Node::Message(nested) = node {
                if nested.group {
                    used.insert(find_companion(message, &nested.name)?.name.as_str());
                }
            }
            if let Some(target) = node.as_field().and_then(|field| field.extend.as_deref()) {
                match extend_blocks.iter_mut().find(|(name, _)| *name == target) {
                    Some((_, members)) => members.push(node),
                    None => extend_blocks.push((target, vec![node])),
                }
            }
        }

        let mut body = Vec::new();
        for node in &message.nested {
            body.extend(self.render_node(node, Some(message), false, false)?);
        }
        for (target, members) in extend_blocks {
            body.push(format!("extend {} {{", target));
            let mut block = Vec::new();
            for member in members {
                block.extend(self.render_node(member, Some(message), true, false)?);
            }
            body.extend(indent(block));
            body.push("}".to_string());
        }
        for oneof in &message.oneofs {
            body.extend(self.render_oneof(oneof, message)?);
            for member in &oneof.members {
                used.insert(member.as_str());
            }
        }
        for node in &message.fields {
            if let Some(field) = node.as_field() {
                if used.contains(field.name.as_str()) {
                    continue;
                }
            }
            body.extend(self.render_node(node, Some(message), false, false)?);
        }
        if let Some((low, high)) = message.extensions {
            let high = if high == MAX_FIELD_ID {
                "max".to_string()
            } else {
                high.to_string()
            };
            body.push(format!("extensions {} to {};", low, high));
        }

        let mut lines = vec![header];
        lines.extend(indent(body));
        lines.push("}".to_string());
        Ok(lines)
    }
}

fn field_label(field: &Field, no_label: bool) -> String {
    match &field.rule {
        Some(rule) => format!("{} ", rule),
        None if field.optional && !no_label => "optional ".to_string(),
        None => String::new(),
    }
}

fn find_field<'a>(message: &'a Message, name: &str) -> Option<&'a Node> {
    message
        .fields
        .iter()
        .find(|node| node.as_field().map(|field| field.name.as_str()) == Some(name))
}

/// The one field of `parent` whose declared type names the synthetic group.
fn find_companion<'a>(parent: &'a Message, group_name: &str) -> Result<&'a Field, UnprotoError> {
    parent
        .fields
        .iter()
        .filter_map(Node::as_field)
        .find(|field| field.type_name == group_name)
        .ok_or_else(|| {
            UnprotoError::StructuralError(format!(
                "Group {} has no companion field in {}",
                quote(group_name),
                quote(&parent.name)
            ))
        })
}

fn render_enum(decl: &EnumDef) -> Vec<String> {
    let mut lines = vec![format!("enum {} {{", decl.name)];
    for (symbol, value) in &decl.values {
        lines.push(format!("\t{} = {};", symbol, value));
    }
    lines.push("}".to_string());
    lines
}

fn indent(lines: Vec<String>) -> Vec<String> {
    lines.into_iter().map(|line| format!("\t{}", line)).collect()
}
