// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A JavaScript/WebGL viewer format (§6): one JS source file defining a
//! `LAMINA_LAYERS` array literal, one entry per layer, each carrying its
//! triangulation and a display color — enough for a small WebGL viewer to
//! walk and render, without attempting a real glTF/OBJ export (§1). Shaped
//! after the teacher's `export/svg/writer.rs` "header, one write call per
//! element, footer on drop" pattern, retargeted at a JS array literal
//! instead of an XML tag tree.

use lamina_core::Scalar;
use lamina_csg::Layer;

/// Low-level per-layer JS object-literal writer.
pub trait WebglWriter {
    /// Write one layer's entry: its z-plane, triangulation, the
    /// layer-difference outline if present (§4.8, WebGL-only per §6), and
    /// its display color.
    fn write_layer(&mut self, layer: &Layer, color: (Scalar, Scalar, Scalar)) -> std::io::Result<()>;
}

/// Writes `const LAMINA_LAYERS = [ ... ];` to an arbitrary sink.
pub struct JsWebglWriter<'a> {
    writer: &'a mut dyn std::io::Write,
    first: bool,
}

impl<'a> JsWebglWriter<'a> {
    /// Start a new array literal, writing the `const` header immediately.
    pub fn new(w: &'a mut dyn std::io::Write) -> std::io::Result<Self> {
        writeln!(w, "const LAMINA_LAYERS = [")?;
        Ok(Self { writer: w, first: true })
    }
}

impl WebglWriter for JsWebglWriter<'_> {
    fn write_layer(&mut self, layer: &Layer, color: (Scalar, Scalar, Scalar)) -> std::io::Result<()> {
        if !self.first {
            writeln!(self.writer, ",")?;
        }
        self.first = false;

        let vertices = layer
            .triangles
            .as_ref()
            .map(|t| {
                t.vertices
                    .iter()
                    .map(|(x, y)| format!("[{x},{y}]"))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();
        let triangles = layer
            .triangles
            .as_ref()
            .map(|t| {
                t.triangles
                    .iter()
                    .map(|[a, b, c]| format!("[{a},{b},{c}]"))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();
        let has_diff = layer.diff.as_ref().map(|d| !d.is_empty()).unwrap_or(false);

        write!(
            self.writer,
            "  {{ z: {z}, vertices: [{vertices}], triangles: [{triangles}], diffOnly: {has_diff}, color: [{r}, {g}, {b}] }}",
            z = layer.z,
            r = color.0,
            g = color.1,
            b = color.2,
        )
    }
}

impl Drop for JsWebglWriter<'_> {
    fn drop(&mut self) {
        writeln!(self.writer, "\n];").expect("webgl writer sink failed on close");
    }
}

/// Write every layer, colored by [`layer_color`] unless `color_rand` is
/// false, in which case every layer shares a single neutral gray.
pub fn write_layers(writer: &mut impl WebglWriter, layers: &[Layer], color_rand: bool) -> std::io::Result<()> {
    for (i, layer) in layers.iter().enumerate() {
        let color = if color_rand {
            layer_color(i)
        } else {
            (0.7, 0.7, 0.7)
        };
        writer.write_layer(layer, color)?;
    }
    Ok(())
}

/// A deterministic, well-spread per-layer color (golden-angle hue stepping,
/// no external RNG dependency needed for a display-only hint).
fn layer_color(index: usize) -> (Scalar, Scalar, Scalar) {
    let hue = ((index as Scalar) * 137.508) % 360.0;
    hsv_to_rgb(hue, 0.6, 0.9)
}

fn hsv_to_rgb(h: Scalar, s: Scalar, v: Scalar) -> (Scalar, Scalar, Scalar) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_csg::Triangles;

    #[test]
    fn writes_one_entry_per_layer() {
        let layers = vec![
            Layer { z: 0.0, polygons: None, triangles: Some(Triangles::default()), diff: None },
            Layer { z: 1.0, polygons: None, triangles: Some(Triangles::default()), diff: None },
        ];
        let mut buf = Vec::new();
        {
            let mut writer = JsWebglWriter::new(&mut buf).expect("header");
            write_layers(&mut writer, &layers, true).expect("body");
        }
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("const LAMINA_LAYERS = ["));
        assert_eq!(text.matches("z:").count(), 2);
        assert!(text.trim_end().ends_with("];"));
    }

    #[test]
    fn distinct_layers_get_distinct_colors_when_randomized() {
        assert_ne!(layer_color(0), layer_color(1));
    }
}
