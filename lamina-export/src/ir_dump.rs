// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! IR dump export (§6: "the intermediate SYN, SCAD, CSG3, CSG2 trees as
//! serialisable IR — for dump/debug outputs"), grounded on the teacher's
//! `export/tree_dump.rs`: both are "hand a tree to a writer, it prints a
//! debug rendering" exporters with no claim to a stable machine-readable
//! schema. Each pipeline stage already reachable on [`PipelineOutput`] is
//! printed as its own labelled section; stages past `stop_after` are
//! simply absent.

use lamina_csg::PipelineOutput;

/// Dumps whichever IR stages a [`PipelineOutput`] reached.
pub trait IrDumpWriter {
    /// Write every populated stage of `output`, one labelled section each.
    fn write_dump(&mut self, output: &PipelineOutput) -> std::io::Result<()>;
}

/// Plain-text `Debug`-rendering dump writer.
pub struct TextIrDumpWriter<'a> {
    writer: &'a mut dyn std::io::Write,
}

impl<'a> TextIrDumpWriter<'a> {
    /// Wrap a sink.
    pub fn new(w: &'a mut dyn std::io::Write) -> Self {
        Self { writer: w }
    }

    fn section(&mut self, title: &str, body: impl std::fmt::Debug) -> std::io::Result<()> {
        writeln!(self.writer, "== {title} ==")?;
        writeln!(self.writer, "{body:#?}")
    }
}

impl IrDumpWriter for TextIrDumpWriter<'_> {
    fn write_dump(&mut self, output: &PipelineOutput) -> std::io::Result<()> {
        if let Some(syn) = &output.syn {
            self.section("SYN", syn)?;
        }
        if let Some(scad) = &output.scad {
            self.section("SCAD", scad)?;
        }
        if let Some(csg3) = &output.csg3 {
            self.section("CSG3", csg3)?;
        }
        if let Some(range) = &output.range {
            self.section("RANGE", range)?;
        }
        if !output.layers.is_empty() {
            self.section("LAYERS", &output.layers)?;
        }
        if !output.diags.is_empty() {
            self.section("DIAGS", &*output.diags)?;
        }
        Ok(())
    }
}
