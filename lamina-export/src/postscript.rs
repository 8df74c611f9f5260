// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! PostScript export, grounded on the teacher's `export/svg/writer.rs`
//! (a vector writer that turns `geo2d` rings into path commands) with the
//! tag-based markup swapped for PostScript's `moveto`/`lineto`/`stroke`
//! operator stream — the same "one polygon/ring in, one drawing command
//! sequence out" shape, retargeted at the one other vector format §6
//! names (STL/SCAD/WebGL being the other three).

use lamina_core::geo2d::Geometries2D;
use lamina_core::Scalar;
use lamina_csg::Layer;

/// Low-level PostScript path writer.
pub trait PostscriptWriter {
    /// Stroke one polygon's exterior ring and holes as a closed path.
    fn write_polygon(&mut self, polygon: &geo::Polygon<Scalar>) -> std::io::Result<()>;
}

/// Writes one page of PostScript per call to [`write_layers`]: a polygon
/// per path, sharing a single page (layer ordering is flattened, since the
/// committed PostScript output per §6 is a 2D vector drawing, not a
/// paginated stack).
pub struct MinimalPostscriptWriter<'a> {
    writer: &'a mut dyn std::io::Write,
}

impl<'a> MinimalPostscriptWriter<'a> {
    /// Start a new document with the given bounding box, in points.
    pub fn new(w: &'a mut dyn std::io::Write, bounds: geo::Rect<Scalar>) -> std::io::Result<Self> {
        writeln!(w, "%!PS-Adobe-3.0")?;
        writeln!(
            w,
            "%%BoundingBox: {} {} {} {}",
            bounds.min().x,
            bounds.min().y,
            bounds.max().x,
            bounds.max().y
        )?;
        writeln!(w, "0.1 setlinewidth")?;
        Ok(Self { writer: w })
    }

    fn write_ring(&mut self, ring: &geo::LineString<Scalar>) -> std::io::Result<()> {
        let mut coords = ring.coords();
        let Some(first) = coords.next() else {
            return Ok(());
        };
        writeln!(self.writer, "{} {} moveto", first.x, first.y)?;
        for c in coords {
            writeln!(self.writer, "{} {} lineto", c.x, c.y)?;
        }
        writeln!(self.writer, "closepath stroke")
    }
}

impl PostscriptWriter for MinimalPostscriptWriter<'_> {
    fn write_polygon(&mut self, polygon: &geo::Polygon<Scalar>) -> std::io::Result<()> {
        self.write_ring(polygon.exterior())?;
        for interior in polygon.interiors() {
            self.write_ring(interior)?;
        }
        Ok(())
    }
}

impl Drop for MinimalPostscriptWriter<'_> {
    fn drop(&mut self) {
        writeln!(self.writer, "showpage").expect("postscript writer sink failed on close");
    }
}

/// Write every layer's evaluated polygon set. Layers without evaluated
/// polygons (`stop_after < Stage::Evaluated`) are skipped.
pub fn write_layers(writer: &mut impl PostscriptWriter, layers: &[Layer]) -> std::io::Result<()> {
    for layer in layers {
        if let Some(polygons) = &layer.polygons {
            write_geometries(writer, polygons)?;
        }
    }
    Ok(())
}

fn write_geometries(writer: &mut impl PostscriptWriter, geoms: &Geometries2D) -> std::io::Result<()> {
    for polygon in geoms.0.iter() {
        writer.write_polygon(polygon)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    #[test]
    fn square_layer_emits_one_closed_path() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ];
        let layer = Layer {
            z: 0.0,
            polygons: Some(Geometries2D(MultiPolygon::new(vec![square]))),
            triangles: None,
            diff: None,
        };
        let mut buf = Vec::new();
        {
            let bounds = geo::Rect::new(geo::Coord { x: 0.0, y: 0.0 }, geo::Coord { x: 10.0, y: 10.0 });
            let mut writer = MinimalPostscriptWriter::new(&mut buf, bounds).expect("header");
            write_layers(&mut writer, std::slice::from_ref(&layer)).expect("body");
        }
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("%!PS-Adobe-3.0"));
        assert_eq!(text.matches("moveto").count(), 1);
        assert_eq!(text.matches("closepath stroke").count(), 1);
        assert!(text.trim_end().ends_with("showpage"));
    }
}
