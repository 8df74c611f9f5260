// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Axis-aligned 3D bounds, used by the range scheduler (§4.4) to pick
//! `z_min`/`z_max` from the CSG3 tree.

use crate::{Scalar, Vec3};

/// An axis-aligned bounding box in 3D, or "empty" if nothing has been
/// merged into it yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    /// Lower corner, if non-empty.
    pub min: Option<Vec3>,
    /// Upper corner, if non-empty.
    pub max: Option<Vec3>,
}

impl Bounds3 {
    /// An empty bounds.
    pub fn empty() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Bounds around a single point.
    pub fn point(p: Vec3) -> Self {
        Self {
            min: Some(p),
            max: Some(p),
        }
    }

    /// True if no point has been merged in yet.
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Merge a point into these bounds.
    pub fn extend_point(&mut self, p: Vec3) {
        self.min = Some(match self.min {
            Some(m) => Vec3::new(m.x.min(p.x), m.y.min(p.y), m.z.min(p.z)),
            None => p,
        });
        self.max = Some(match self.max {
            Some(m) => Vec3::new(m.x.max(p.x), m.y.max(p.y), m.z.max(p.z)),
            None => p,
        });
    }

    /// Merge another bounds into this one.
    pub fn extend(&mut self, other: Bounds3) {
        if let Some(min) = other.min {
            self.extend_point(min);
        }
        if let Some(max) = other.max {
            self.extend_point(max);
        }
    }

    /// Lowest z, or `None` if empty.
    pub fn z_min(&self) -> Option<Scalar> {
        self.min.map(|m| m.z)
    }

    /// Highest z, or `None` if empty.
    pub fn z_max(&self) -> Option<Scalar> {
        self.max.map(|m| m.z)
    }
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::empty()
    }
}
