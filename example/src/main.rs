use serde_json::json;

use unproto::{Renderer, UnprotoError};
use unproto::descriptor::{EnumDef, Field, Message, Node, OneOf, Root, Rule};

fn main() -> Result<(), UnprotoError> {
    // Build the descriptor tree for a small schema by hand.
    let palette = Node::Enum(EnumDef {
        name: "Palette".to_string(),
        full_name: ".Palette".to_string(),
        values: vec![("GRAY".to_string(), 0), ("COLOR".to_string(), 1)],
    });

    let sprite = Node::Message(Message {
        name: "Sprite".to_string(),
        full_name: ".Sprite".to_string(),
        fields: vec![
            Node::Field(Field {
                name: "displayName".to_string(),
                id: 1,
                type_name: "string".to_string(),
                rule: Some(Rule::Required),
                ..Field::default()
            }),
            Node::Field(Field {
                name: "palette".to_string(),
                id: 2,
                type_name: "Palette".to_string(),
                optional: true,
                default: Some(json!("GRAY")),
                ..Field::default()
            }),
            Node::Field(Field {
                name: "width".to_string(),
                id: 3,
                type_name: "int32".to_string(),
                optional: true,
                ..Field::default()
            }),
            Node::Field(Field {
                name: "height".to_string(),
                id: 4,
                type_name: "int32".to_string(),
                optional: true,
                ..Field::default()
            }),
        ],
        oneofs: vec![OneOf {
            name: "dimension".to_string(),
            members: vec!["width".to_string(), "height".to_string()],
        }],
        extensions: Some((100, 536_870_911)),
        ..Message::default()
    });

    let root = Root {
        options: vec![("optimize_for".to_string(), json!("SPEED"))],
        nested: vec![palette, sprite],
    };

    let lines = Renderer::new(&root).render_root()?;
    println!("{}", lines.join("\n"));
    Ok(())
}
