// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Pretty-printing a SYN forest back to source text (§8 round-trip law:
//! "Parsing then pretty-printing SYN then reparsing yields a SYN tree
//! structurally equal to the first, modulo whitespace"). Grounded on the
//! same "walk the tree, write one construct at a time" shape as
//! `lamina_export::scad::PrettyScadWriter`, one stage earlier in the
//! pipeline: this one re-emits the untyped call tree, not the typed one.

use crate::syn::{Arg, Call, Modifier, SynNode, Value, ValueKind};
use std::fmt::Write as _;

/// Pretty-print a whole SYN forest, two-space indented.
pub fn print_forest(forest: &[SynNode]) -> String {
    let mut out = String::new();
    for node in forest {
        print_node(&mut out, node, 0);
    }
    out
}

fn print_node(out: &mut String, node: &SynNode, indent: usize) {
    let pad = "  ".repeat(indent);
    match node {
        SynNode::Call(call) => print_call(out, call, indent, &pad),
        SynNode::Value(v) => {
            let _ = writeln!(out, "{pad}{};", print_value(v));
        }
    }
}

fn print_call(out: &mut String, call: &Call, indent: usize, pad: &str) {
    let modifiers: String = call
        .modifiers
        .iter()
        .map(|m| match m {
            Modifier::Disable => '*',
            Modifier::Background => '%',
            Modifier::Root => '!',
            Modifier::Highlight => '#',
        })
        .collect();
    let args = call
        .args
        .iter()
        .map(print_arg)
        .collect::<Vec<_>>()
        .join(", ");
    if call.body.is_empty() {
        let _ = writeln!(out, "{pad}{modifiers}{}({args});", call.name);
    } else {
        let _ = writeln!(out, "{pad}{modifiers}{}({args}) {{", call.name);
        for child in &call.body {
            print_node(out, child, indent + 1);
        }
        let _ = writeln!(out, "{pad}}}");
    }
}

fn print_arg(arg: &Arg) -> String {
    match &arg.name {
        Some(name) => format!("{name} = {}", print_value(&arg.value)),
        None => print_value(&arg.value),
    }
}

fn print_value(value: &Value) -> String {
    match &value.kind {
        ValueKind::Integer(i) => i.to_string(),
        ValueKind::Number(n) => n.to_string(),
        ValueKind::Str(s) => format!("{s:?}"),
        ValueKind::Ident(id) => id.clone(),
        ValueKind::Range { start, step, end } => match step {
            Some(step) => format!("[{}:{}:{}]", print_value(start), print_value(step), print_value(end)),
            None => format!("[{}:{}]", print_value(start), print_value(end)),
        },
        ValueKind::Array(items) => {
            let inner = items.iter().map(print_value).collect::<Vec<_>>().join(", ");
            format!("[{inner}]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::src_ref::SourceBuffer;
    use crate::syn::parse_source;

    fn parse(src: &str) -> Vec<SynNode> {
        let buf = SourceBuffer::new(src);
        parse_source(&buf).expect("parse")
    }

    fn same_shape(a: &[SynNode], b: &[SynNode]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_node(x, y))
    }

    fn same_node(a: &SynNode, b: &SynNode) -> bool {
        match (a, b) {
            (SynNode::Call(x), SynNode::Call(y)) => {
                x.name == y.name
                    && x.modifiers == y.modifiers
                    && x.args.len() == y.args.len()
                    && x.args
                        .iter()
                        .zip(&y.args)
                        .all(|(p, q)| p.name == q.name && p.value.kind == q.value.kind)
                    && same_shape(&x.body, &y.body)
            }
            (SynNode::Value(x), SynNode::Value(y)) => x.kind == y.kind,
            _ => false,
        }
    }

    #[test]
    fn round_trips_a_simple_call() {
        let forest = parse("cube([10, 10, 10], center=true);");
        let printed = print_forest(&forest);
        let reparsed = parse(&printed);
        assert!(same_shape(&forest, &reparsed));
    }

    #[test]
    fn round_trips_nested_bodies_and_modifiers() {
        let forest = parse("difference() { cube(10); %translate([5,0,0]) cube(10); }");
        let printed = print_forest(&forest);
        let reparsed = parse(&printed);
        assert!(same_shape(&forest, &reparsed));
    }

    #[test]
    fn round_trips_ranges_and_arrays() {
        let forest = parse("intersection_for(n=[1:2:10]) cube([1, 2, 3]);");
        let printed = print_forest(&forest);
        let reparsed = parse(&printed);
        assert!(same_shape(&forest, &reparsed));
    }
}
