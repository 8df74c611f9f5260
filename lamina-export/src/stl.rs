// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! ASCII STL export, grounded on the teacher's `export/stl/writer.rs`:
//! the same "write a header, write one facet at a time, write the footer
//! on drop" shape, specialized here to emit the top and bottom cap of
//! each layer's triangulation rather than a full 3D mesh renderer's
//! output — good enough to round-trip the boundary scenarios (§8)
//! without claiming fidelity to a real slicer's watertight STL (§1).

use lamina_core::Scalar;
use lamina_csg::Layer;

/// Low-level ASCII STL facet writer.
pub trait StlWriter {
    /// Write a single facet with an explicit outward normal.
    fn write_facet(
        &mut self,
        normal: (Scalar, Scalar, Scalar),
        a: (Scalar, Scalar, Scalar),
        b: (Scalar, Scalar, Scalar),
        c: (Scalar, Scalar, Scalar),
    ) -> std::io::Result<()>;
}

/// Writes `solid`/`facet`/`endsolid` ASCII STL to an arbitrary sink.
pub struct AsciiStlWriter<'a> {
    writer: &'a mut dyn std::io::Write,
}

impl<'a> AsciiStlWriter<'a> {
    /// Start a new solid, writing the header immediately.
    pub fn new(w: &'a mut dyn std::io::Write) -> std::io::Result<Self> {
        writeln!(w, "solid lamina")?;
        Ok(Self { writer: w })
    }
}

impl StlWriter for AsciiStlWriter<'_> {
    fn write_facet(
        &mut self,
        n: (Scalar, Scalar, Scalar),
        a: (Scalar, Scalar, Scalar),
        b: (Scalar, Scalar, Scalar),
        c: (Scalar, Scalar, Scalar),
    ) -> std::io::Result<()> {
        writeln!(self.writer, "facet normal {} {} {}", n.0, n.1, n.2)?;
        writeln!(self.writer, "\touter loop")?;
        writeln!(self.writer, "\t\tvertex {} {} {}", a.0, a.1, a.2)?;
        writeln!(self.writer, "\t\tvertex {} {} {}", b.0, b.1, b.2)?;
        writeln!(self.writer, "\t\tvertex {} {} {}", c.0, c.1, c.2)?;
        writeln!(self.writer, "\tendloop")?;
        writeln!(self.writer, "endfacet")
    }
}

impl Drop for AsciiStlWriter<'_> {
    fn drop(&mut self) {
        writeln!(self.writer, "endsolid lamina").expect("stl writer sink failed on close");
    }
}

/// Write every layer's triangulation as a pair of z-offset caps, `layer_gap`
/// apart (§9 open question: callers pass `cfg.layer_gap_for_stl()`, the
/// `-1 -> 0.01` special case). Layers without a triangulation are skipped.
pub fn write_layers(writer: &mut impl StlWriter, layers: &[Layer], layer_gap: Scalar) -> std::io::Result<()> {
    for layer in layers {
        let Some(triangles) = &layer.triangles else {
            continue;
        };
        let z_bottom = layer.z - layer_gap / 2.0;
        let z_top = layer.z + layer_gap / 2.0;
        for [ia, ib, ic] in &triangles.triangles {
            let (ax, ay) = triangles.vertices[*ia];
            let (bx, by) = triangles.vertices[*ib];
            let (cx, cy) = triangles.vertices[*ic];

            // Bottom cap faces down; reverse the winding so the normal
            // points -z without recomputing it per facet.
            writer.write_facet(
                (0.0, 0.0, -1.0),
                (ax, ay, z_bottom),
                (cx, cy, z_bottom),
                (bx, by, z_bottom),
            )?;
            writer.write_facet(
                (0.0, 0.0, 1.0),
                (ax, ay, z_top),
                (bx, by, z_top),
                (cx, cy, z_top),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_triangle_layer_emits_four_facets() {
        let layer = Layer {
            z: 5.0,
            polygons: None,
            triangles: Some(lamina_csg::Triangles {
                vertices: vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
                triangles: vec![[0, 1, 2], [0, 2, 3]],
            }),
            diff: None,
        };
        let mut buf = Vec::new();
        {
            let mut writer = AsciiStlWriter::new(&mut buf).expect("header writes");
            write_layers(&mut writer, std::slice::from_ref(&layer), 0.2).expect("facets write");
        }
        let text = String::from_utf8(buf).expect("valid utf8");
        assert_eq!(text.matches("facet normal").count(), 4);
        assert!(text.starts_with("solid lamina"));
        assert!(text.trim_end().ends_with("endsolid lamina"));
    }
}
