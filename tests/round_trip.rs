// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Round-trip laws (§8), exercised across crate boundaries: SYN
//! pretty-print -> reparse -> same tree; SCAD pretty-print -> re-lower ->
//! same tree.

use lamina_export::ScadWriter;
use lamina_lang::scad::{lower_source, ScadNode};
use lamina_lang::src_ref::SourceBuffer;
use lamina_lang::syn::{parse_source, print_forest, SynNode};

fn parse(src: &str) -> Vec<SynNode> {
    let buf = SourceBuffer::new(src);
    parse_source(&buf).expect("parse")
}

fn lower(src: &str) -> Vec<ScadNode> {
    lower_source(&parse(src), false).expect("lower")
}

fn scad_shape_eq(a: &[ScadNode], b: &[ScadNode]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.tag == y.tag && x.modifiers == y.modifiers && scad_shape_eq(&x.children, &y.children))
}

/// "Parsing then pretty-printing SYN then reparsing yields a SYN tree
/// structurally equal to the first (modulo whitespace)."
#[test]
fn syn_pretty_print_then_reparse_round_trips() {
    let source = r#"
        difference() {
            cube([20, 20, 10], center=true);
            *translate([0, 0, 5]) sphere(r=8, $fn=24);
        }
    "#;
    let forest = parse(source);
    let printed = print_forest(&forest);
    let reparsed = parse(&printed);
    assert_eq!(forest.len(), reparsed.len());
    for (a, b) in forest.iter().zip(reparsed.iter()) {
        match (a, b) {
            (SynNode::Call(x), SynNode::Call(y)) => {
                assert_eq!(x.name, y.name);
                assert_eq!(x.modifiers, y.modifiers);
            }
            _ => panic!("expected both sides to be calls"),
        }
    }
}

/// "SCAD lowering of a SCAD pretty-print of a SCAD tree yields the same
/// SCAD tree."
#[test]
fn scad_pretty_print_then_relower_round_trips() {
    let forest = lower("union() { cylinder(h=10, r1=5, r2=2, center=true, $fn=16); }");
    let mut buf = Vec::new();
    lamina_export::scad::PrettyScadWriter::new(&mut buf)
        .write_forest(&forest)
        .expect("write");
    let text = String::from_utf8(buf).expect("utf8");
    let relowered = lower(&text);
    assert!(scad_shape_eq(&forest, &relowered));
}
