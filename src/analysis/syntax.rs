//! Tree-sitter backed extraction.
//!
//! The tree is walked once. Each node's grammar kind is classified into a
//! [`NodeKind`] and handled by an explicit match arm; unrecognized kinds are
//! a no-op apart from descending into their children.

use std::time::Duration;

use tree_sitter::{Node, Parser};

use super::extract::{ExtractError, Extraction, SyntaxExtractor};
use crate::lang::Lang;

pub struct TreeSitterExtractor {
    timeout: Duration,
}

impl TreeSitterExtractor {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl SyntaxExtractor for TreeSitterExtractor {
    fn supports(&self, lang: Lang) -> bool {
        lang.grammar().is_some()
    }

    fn extract(&self, source: &str, lang: Lang) -> Result<Extraction, ExtractError> {
        let grammar = lang.grammar().ok_or(ExtractError::Unsupported(lang.name()))?;
        let mut parser = Parser::new();
        parser
            .set_language(grammar)
            .map_err(|e| ExtractError::Grammar(e.to_string()))?;
        let micros = u64::try_from(self.timeout.as_micros()).unwrap_or(u64::MAX);
        parser.set_timeout_micros(micros);

        let tree = parser.parse(source, None).ok_or(ExtractError::Timeout)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ExtractError::Syntax);
        }

        let mut visitor = Visitor {
            source: source.as_bytes(),
            lang,
            out: Extraction::default(),
        };
        visitor.visit(root, 0);
        Ok(visitor.out)
    }
}

/// Import, export and declaration forms the visitor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    RustUse,
    RustMod,
    RustItem,
    PyImport,
    PyImportFrom,
    PyDefinition,
    PyDecorated,
    JsImport,
    JsExport,
    JsCall,
    Other,
}

fn classify(lang: Lang, kind: &str) -> NodeKind {
    match (lang, kind) {
        (Lang::Rust, "use_declaration") => NodeKind::RustUse,
        (Lang::Rust, "mod_item") => NodeKind::RustMod,
        (
            Lang::Rust,
            "function_item" | "struct_item" | "enum_item" | "trait_item" | "type_item"
            | "const_item" | "static_item" | "union_item",
        ) => NodeKind::RustItem,
        (Lang::Python, "import_statement") => NodeKind::PyImport,
        (Lang::Python, "import_from_statement") => NodeKind::PyImportFrom,
        (Lang::Python, "function_definition" | "class_definition") => NodeKind::PyDefinition,
        (Lang::Python, "decorated_definition") => NodeKind::PyDecorated,
        (Lang::TypeScript | Lang::Tsx | Lang::JavaScript, "import_statement") => {
            NodeKind::JsImport
        }
        (Lang::TypeScript | Lang::Tsx | Lang::JavaScript, "export_statement") => {
            NodeKind::JsExport
        }
        (Lang::TypeScript | Lang::Tsx | Lang::JavaScript, "call_expression") => NodeKind::JsCall,
        _ => NodeKind::Other,
    }
}

struct Visitor<'a> {
    source: &'a [u8],
    lang: Lang,
    out: Extraction,
}

impl<'a> Visitor<'a> {
    fn visit(&mut self, node: Node<'_>, depth: usize) {
        let top_level = depth == 1;
        match classify(self.lang, node.kind()) {
            NodeKind::RustUse => self.rust_use(node),
            NodeKind::RustMod => self.rust_mod(node, top_level),
            NodeKind::RustItem => {
                if top_level && has_visibility(node) {
                    self.push_field_symbol(node, "name");
                }
            }
            NodeKind::PyImport => self.py_import(node),
            NodeKind::PyImportFrom => {
                if let Some(module) = node.child_by_field_name("module_name") {
                    self.push_import(module);
                }
            }
            NodeKind::PyDefinition => {
                if top_level {
                    self.push_field_symbol(node, "name");
                }
            }
            NodeKind::PyDecorated => {
                if top_level {
                    if let Some(def) = node.child_by_field_name("definition") {
                        self.push_field_symbol(def, "name");
                    }
                }
            }
            NodeKind::JsImport => {
                if let Some(src) = node.child_by_field_name("source") {
                    self.push_import(src);
                }
            }
            NodeKind::JsExport => self.js_export(node),
            NodeKind::JsCall => self.js_call(node),
            NodeKind::Other => {}
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child, depth + 1);
        }
    }

    fn text(&self, node: Node<'_>) -> Option<&'a str> {
        node.utf8_text(self.source).ok()
    }

    fn push_import(&mut self, node: Node<'_>) {
        if let Some(t) = self.text(node) {
            self.out.imports.push(t.to_string());
        }
    }

    fn push_field_symbol(&mut self, node: Node<'_>, field: &str) {
        if let Some(name) = node.child_by_field_name(field).and_then(|n| self.text(n)) {
            self.out.symbols.push(name.to_string());
        }
    }

    fn rust_use(&mut self, node: Node<'_>) {
        let Some(arg) = node.child_by_field_name("argument").and_then(|n| self.text(n)) else {
            return;
        };
        // `a::b::{C, D}` keeps the module prefix.
        let path = arg.split("::{").next().unwrap_or(arg);
        let path = path.split(" as ").next().unwrap_or(path).trim();
        self.out.imports.push(path.to_string());
    }

    fn rust_mod(&mut self, node: Node<'_>, top_level: bool) {
        let Some(name) = node.child_by_field_name("name").and_then(|n| self.text(n)) else {
            return;
        };
        // Only `mod x;` refers to another file; inline modules have a body.
        if node.child_by_field_name("body").is_none() {
            self.out.imports.push(format!("./{name}"));
        }
        if top_level && has_visibility(node) {
            self.out.symbols.push(name.to_string());
        }
    }

    fn py_import(&mut self, node: Node<'_>) {
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            let target = if name.kind() == "aliased_import" {
                name.child_by_field_name("name")
            } else {
                Some(name)
            };
            if let Some(t) = target {
                self.push_import(t);
            }
        }
    }

    fn js_export(&mut self, node: Node<'_>) {
        if let Some(src) = node.child_by_field_name("source") {
            self.push_import(src);
        }
        let Some(decl) = node.child_by_field_name("declaration") else {
            if let Some(value) = node.child_by_field_name("value") {
                if value.kind() == "identifier" {
                    self.push_text_symbol(value);
                }
            }
            return;
        };
        match decl.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = decl.walk();
                for declarator in decl.named_children(&mut cursor) {
                    if declarator.kind() == "variable_declarator" {
                        self.push_field_symbol(declarator, "name");
                    }
                }
            }
            _ => self.push_field_symbol(decl, "name"),
        }
    }

    fn push_text_symbol(&mut self, node: Node<'_>) {
        if let Some(t) = self.text(node) {
            self.out.symbols.push(t.to_string());
        }
    }

    fn js_call(&mut self, node: Node<'_>) {
        let Some(func) = node.child_by_field_name("function") else {
            return;
        };
        let is_loader = match func.kind() {
            "import" => true,
            "identifier" => self.text(func) == Some("require"),
            _ => false,
        };
        if !is_loader {
            return;
        }
        let Some(args) = node.child_by_field_name("arguments") else {
            return;
        };
        let mut cursor = args.walk();
        let first = args.named_children(&mut cursor).next();
        if let Some(arg) = first.filter(|a| a.kind() == "string") {
            self.push_import(arg);
        }
    }
}

fn has_visibility(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| c.kind() == "visibility_modifier");
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, lang: Lang) -> Extraction {
        TreeSitterExtractor::new(Duration::from_secs(2))
            .extract(source, lang)
            .unwrap()
            .finish(lang)
    }

    #[test]
    fn rust_uses_mods_and_pub_items() {
        let e = run(
            r"
use std::collections::{HashMap, HashSet};
use crate::config::Config;
mod graph;
pub mod manifest;
mod inline { fn hidden() {} }
pub fn run() {}
fn private() {}
pub struct Engine;
",
            Lang::Rust,
        );
        assert!(e.imports.contains(&"std::collections".to_string()));
        assert!(e.imports.contains(&"crate::config::Config".to_string()));
        assert!(e.imports.contains(&"./graph".to_string()));
        assert!(e.imports.contains(&"./manifest".to_string()));
        assert!(!e.imports.contains(&"./inline".to_string()));
        assert_eq!(e.symbols, vec!["Engine", "manifest", "run"]);
    }

    #[test]
    fn python_imports_and_top_level_defs() {
        let e = run(
            r#"
"""Main server module"""
import os, json as j
from .routes import get_routes
from ..core.db import Database

@app.route("/")
def create_app():
    def inner():
        pass
    return 1

class Server:
    def method(self):
        pass
"#,
            Lang::Python,
        );
        assert_eq!(e.imports, vec!["../core/db", "./routes", "json", "os"]);
        assert_eq!(e.symbols, vec!["Server", "create_app"]);
    }

    #[test]
    fn typescript_imports_requires_and_exports() {
        let e = run(
            r#"
import { Foo } from "./components";
import "./side-effect";
export * from "./utils";
const fs = require('fs');
const lazy = () => import("./lazy");
export function render() {}
export const a = 1, b = 2;
export class Widget {}
export interface Props {}
"#,
            Lang::TypeScript,
        );
        assert_eq!(
            e.imports,
            vec!["./components", "./lazy", "./side-effect", "./utils", "fs"]
        );
        assert_eq!(e.symbols, vec!["Props", "Widget", "a", "b", "render"]);
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = TreeSitterExtractor::new(Duration::from_secs(2))
            .extract("def broken(:\n", Lang::Python)
            .unwrap_err();
        assert_eq!(err, ExtractError::Syntax);
    }

    #[test]
    fn unsupported_language() {
        let ex = TreeSitterExtractor::new(Duration::from_secs(2));
        assert!(!ex.supports(Lang::Go));
        assert!(matches!(
            ex.extract("package main", Lang::Go),
            Err(ExtractError::Unsupported("go"))
        ));
    }
}
