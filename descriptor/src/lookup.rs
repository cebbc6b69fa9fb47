use crate::tree::{Node, Root};

impl Root {
    /// Resolve a possibly dot-qualified type name to its declaration.
    ///
    /// A leading dot anchors the path at the root; otherwise the first match
    /// in a depth-first walk wins: a direct child matching the first path
    /// segment is preferred, then nested containers are searched in
    /// declaration order.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let trimmed = path.strip_prefix('.').unwrap_or(path);
        let segments: Vec<&str> = trimmed.split('.').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return None;
        }
        lookup_in(&self.nested, &segments)
    }
}

fn lookup_in<'a>(nested: &'a [Node], path: &[&str]) -> Option<&'a Node> {
    for node in nested {
        if node.name() == Some(path[0]) {
            if path.len() == 1 {
                return Some(node);
            }
            if let Some(children) = node.children() {
                if let Some(found) = lookup_in(children, &path[1..]) {
                    return Some(found);
                }
            }
        }
    }
    for node in nested {
        if let Some(children) = node.children() {
            if let Some(found) = lookup_in(children, path) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::tree::{EnumDef, Message, Namespace, Node, Root};

    fn sample_root() -> Root {
        Root {
            options: Vec::new(),
            nested: vec![Node::Namespace(Namespace {
                name: "pkg".to_string(),
                full_name: ".pkg".to_string(),
                nested: vec![
                    Node::Enum(EnumDef {
                        name: "Kind".to_string(),
                        full_name: ".pkg.Kind".to_string(),
                        values: vec![("A".to_string(), 0)],
                    }),
                    Node::Message(Message {
                        name: "Outer".to_string(),
                        full_name: ".pkg.Outer".to_string(),
                        nested: vec![Node::Message(Message {
                            name: "Inner".to_string(),
                            full_name: ".pkg.Outer.Inner".to_string(),
                            ..Message::default()
                        })],
                        ..Message::default()
                    }),
                ],
            })],
        }
    }

    #[test]
    fn test_lookup_simple_name_deep() {
        let root = sample_root();
        assert!(matches!(root.lookup("Kind"), Some(Node::Enum(_))));
        assert!(matches!(root.lookup("Inner"), Some(Node::Message(_))));
    }

    #[test]
    fn test_lookup_absolute_path() {
        let root = sample_root();
        let found = root.lookup(".pkg.Outer.Inner").expect("lookup failed");
        assert_eq!(found.name(), Some("Inner"));
    }

    #[test]
    fn test_lookup_relative_path() {
        let root = sample_root();
        let found = root.lookup("Outer.Inner").expect("lookup failed");
        assert_eq!(found.name(), Some("Inner"));
    }

    #[test]
    fn test_lookup_missing() {
        let root = sample_root();
        assert!(root.lookup("Nope").is_none());
        assert!(root.lookup(".pkg.Outer.Nope").is_none());
        assert!(root.lookup("").is_none());
    }
}
