// src/syntax.rs

//! Java syntax model extraction.
//!
//! Parses one file revision with tree-sitter and summarizes its top-level
//! classes: methods (visibility, static modifier, shallow decision-point
//! count) and fields. No symbol resolution crosses file boundaries.

use crate::error::{MinerError, Result};
use crate::model::{ClassSummary, FieldSummary, MethodBody, MethodSummary, SyntaxSummary, Visibility};
use tree_sitter::{Node, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    If,
    For,
    While,
    Switch,
}

/// The node kinds the extractor cares about
enum JavaNode<'t> {
    Class(Node<'t>),
    Method(Node<'t>),
    Field(Node<'t>),
    Decision(DecisionKind),
    Other,
}

impl<'t> JavaNode<'t> {
    fn classify(node: Node<'t>) -> Self {
        match node.kind() {
            "class_declaration" => Self::Class(node),
            "method_declaration" => Self::Method(node),
            "field_declaration" => Self::Field(node),
            "if_statement" => Self::Decision(DecisionKind::If),
            "for_statement" | "enhanced_for_statement" => Self::Decision(DecisionKind::For),
            "while_statement" => Self::Decision(DecisionKind::While),
            // the grammar uses one node for switch statements and expressions
            "switch_expression" | "switch_statement" => Self::Decision(DecisionKind::Switch),
            _ => Self::Other,
        }
    }
}

/// Reusable Java parser. Not shareable across threads; each worker owns one.
pub struct JavaExtractor {
    parser: Parser,
}

impl JavaExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| MinerError::parse("<grammar>", format!("failed to load Java grammar: {e}")))?;
        Ok(Self { parser })
    }

    pub fn extract(&mut self, path: &str, source: &str) -> Result<SyntaxSummary> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| MinerError::parse(path, "parser produced no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(root) {
                Some(node) => format!(
                    "syntax error at line {}, column {}",
                    node.start_position().row + 1,
                    node.start_position().column + 1
                ),
                None => "syntax error".to_string(),
            };
            return Err(MinerError::parse(path, message));
        }

        let bytes = source.as_bytes();
        let mut cursor = root.walk();
        let classes = root
            .named_children(&mut cursor)
            .filter_map(|node| match JavaNode::classify(node) {
                JavaNode::Class(class) => Some(class_summary(class, bytes)),
                JavaNode::Method(_) | JavaNode::Field(_) | JavaNode::Decision(_) | JavaNode::Other => None,
            })
            .collect();

        Ok(SyntaxSummary { classes })
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

fn class_summary(class: Node<'_>, bytes: &[u8]) -> ClassSummary {
    let name = class
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(bytes).ok())
        .unwrap_or_default()
        .to_string();

    let mut summary = ClassSummary {
        name,
        ..ClassSummary::default()
    };

    let Some(body) = class.child_by_field_name("body") else {
        return summary;
    };

    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match JavaNode::classify(member) {
            JavaNode::Method(method) => summary.methods.push(method_summary(method, bytes)),
            JavaNode::Field(field) => {
                let modifiers = modifier_keywords(field);
                summary.fields.push(FieldSummary {
                    visibility: visibility(&modifiers),
                    is_static: modifiers.contains(&"static"),
                });
            }
            // nested classes are reported on their own, not folded into the outer shape
            JavaNode::Class(_) | JavaNode::Decision(_) | JavaNode::Other => {}
        }
    }

    summary
}

fn method_summary(method: Node<'_>, bytes: &[u8]) -> MethodSummary {
    let modifiers = modifier_keywords(method);
    let body = method.child_by_field_name("body").map(|block| {
        let mut cursor = block.walk();
        let mut statements = 0;
        let mut decision_points = 0;
        for statement in block.named_children(&mut cursor).filter(|node| !node.is_extra()) {
            statements += 1;
            match JavaNode::classify(statement) {
                JavaNode::Decision(_) => decision_points += 1,
                JavaNode::Class(_) | JavaNode::Method(_) | JavaNode::Field(_) | JavaNode::Other => {}
            }
        }
        MethodBody {
            statements,
            decision_points,
        }
    });

    MethodSummary {
        name: method
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(bytes).ok())
            .unwrap_or_default()
            .to_string(),
        visibility: visibility(&modifiers),
        is_static: modifiers.contains(&"static"),
        body,
    }
}

/// Keyword modifiers of a declaration; annotations are skipped
fn modifier_keywords(declaration: Node<'_>) -> Vec<&'static str> {
    let mut cursor = declaration.walk();
    let Some(modifiers) = declaration
        .children(&mut cursor)
        .find(|child| child.kind() == "modifiers")
    else {
        return Vec::new();
    };

    let mut cursor = modifiers.walk();
    let keywords: Vec<&'static str> = modifiers
        .children(&mut cursor)
        .filter(|child| !child.is_named())
        .map(|child| child.kind())
        .collect();
    keywords
}

fn visibility(modifiers: &[&str]) -> Visibility {
    if modifiers.contains(&"public") {
        Visibility::Public
    } else if modifiers.contains(&"protected") {
        Visibility::Protected
    } else if modifiers.contains(&"private") {
        Visibility::Private
    } else {
        Visibility::Package
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn extract(source: &str) -> Result<SyntaxSummary> {
        JavaExtractor::new()?.extract("Sample.java", source)
    }

    #[test]
    fn collects_methods_and_fields_with_modifiers() {
        let summary = extract(indoc! {r#"
            package demo;

            public class Account {
                public static final int LIMIT = 10;
                public String owner;
                public int balance;

                public void deposit(int amount) {
                    if (amount > LIMIT) {
                        balance += amount;
                    }
                    for (int i = 0; i < amount; i++) {
                        while (false) {}
                    }
                }

                private static int fee() {
                    return 1;
                }
            }
        "#})
        .unwrap();

        assert_eq!(summary.classes.len(), 1);
        let class = &summary.classes[0];
        assert_eq!(class.name, "Account");
        assert_eq!(class.fields.len(), 3);
        assert_eq!(class.fields.iter().filter(|f| f.is_static).count(), 1);
        assert_eq!(class.fields.iter().filter(|f| f.visibility == Visibility::Public).count(), 3);

        let deposit = &class.methods[0];
        assert_eq!(deposit.name, "deposit");
        assert_eq!(deposit.visibility, Visibility::Public);
        // the nested while is not a direct statement of the body
        assert_eq!(
            deposit.body,
            Some(MethodBody {
                statements: 2,
                decision_points: 2
            })
        );

        let fee = &class.methods[1];
        assert_eq!(fee.visibility, Visibility::Private);
        assert!(fee.is_static);
    }

    #[test]
    fn counts_every_decision_kind() {
        let summary = extract(indoc! {r#"
            class Flow {
                int run(int[] xs, int k) {
                    if (k > 0) { k--; }
                    for (int x : xs) { k += x; }
                    while (k > 100) { k /= 2; }
                    switch (k) { case 1: return 1; default: break; }
                    do { k++; } while (k < 0);
                    return k;
                }
            }
        "#})
        .unwrap();

        let run = &summary.classes[0].methods[0];
        assert_eq!(run.body.map(|b| b.decision_points), Some(4));
    }

    #[test]
    fn abstract_methods_have_no_body() {
        let summary = extract(indoc! {r#"
            @Entity
            public abstract class Shape {
                @Override
                public abstract double area();
                protected int sides;
            }
        "#})
        .unwrap();

        let class = &summary.classes[0];
        assert_eq!(class.methods[0].body, None);
        assert_eq!(class.methods[0].visibility, Visibility::Public);
        assert_eq!(class.fields[0].visibility, Visibility::Protected);
    }

    #[test]
    fn only_top_level_classes_are_summarized() {
        let summary = extract(indoc! {r#"
            interface Greeter { void greet(); }

            class Outer {
                class Inner { void a() {} void b() {} }
                void c() {}
            }

            class Second {}
        "#})
        .unwrap();

        let names: Vec<&str> = summary.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Outer", "Second"]);
        assert_eq!(summary.classes[0].methods.len(), 1);
    }

    #[test]
    fn comments_are_not_statements() {
        let summary = extract(indoc! {r#"
            class Quiet {
                void a() { /* nothing yet */ }
                void b() {
                    // nothing either
                }
                void c() {}
                void d() {
                    // guard
                    if (true) { return; }
                }
            }
        "#})
        .unwrap();

        let bodies: Vec<Option<MethodBody>> = summary.classes[0].methods.iter().map(|m| m.body).collect();
        let empty = Some(MethodBody {
            statements: 0,
            decision_points: 0,
        });
        assert_eq!(bodies[..3], [empty, empty, empty]);
        assert_eq!(
            bodies[3],
            Some(MethodBody {
                statements: 1,
                decision_points: 1
            })
        );
        assert_eq!(crate::structural::structural_metrics(&summary, "").wmc, 2);
    }

    #[test]
    fn rejects_invalid_source() {
        let err = extract("public class Broken { void m( { }").unwrap_err();
        assert!(matches!(err, MinerError::Parse { ref path, .. } if path == "Sample.java"));
    }
}
