//! Region shapes and point containment.

use serde::{Deserialize, Serialize};

use crate::world_state::BlockPos;

/// Spatial extent of a region. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionShape {
    /// Axis-aligned box.
    Cuboid { min: [i32; 3], max: [i32; 3] },
    /// Vertical prism over a 2D polygon of (x, z) points.
    Polygon {
        points: Vec<[i32; 2]>,
        min_y: i32,
        max_y: i32,
    },
    /// Covers the whole world.
    Global,
}

impl RegionShape {
    /// Create a cuboid from any two opposite corners.
    pub fn cuboid(a: [i32; 3], b: [i32; 3]) -> Self {
        Self::Cuboid {
            min: [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])],
            max: [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
        }
    }

    /// Create a polygonal prism.
    pub fn polygon(points: Vec<[i32; 2]>, min_y: i32, max_y: i32) -> Self {
        Self::Polygon {
            points,
            min_y: min_y.min(max_y),
            max_y: min_y.max(max_y),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    /// Check whether a block lies inside this shape. The world of `pos` is ignored.
    pub fn contains(&self, pos: BlockPos) -> bool {
        match self {
            Self::Cuboid { min, max } => {
                pos.x >= min[0]
                    && pos.x <= max[0]
                    && pos.y >= min[1]
                    && pos.y <= max[1]
                    && pos.z >= min[2]
                    && pos.z <= max[2]
            }
            Self::Polygon {
                points,
                min_y,
                max_y,
            } => {
                if pos.y < *min_y || pos.y > *max_y {
                    return false;
                }
                polygon_contains(points, pos.x, pos.z)
            }
            Self::Global => true,
        }
    }

    /// Horizontal bounding box as `([min_x, min_z], [max_x, max_z])`, `None` for global shapes.
    pub fn horizontal_bounds(&self) -> Option<([i32; 2], [i32; 2])> {
        match self {
            Self::Cuboid { min, max } => Some(([min[0], min[2]], [max[0], max[2]])),
            Self::Polygon { points, .. } => {
                let first = points.first()?;
                let mut lo = *first;
                let mut hi = *first;
                for p in points {
                    lo = [lo[0].min(p[0]), lo[1].min(p[1])];
                    hi = [hi[0].max(p[0]), hi[1].max(p[1])];
                }
                Some((lo, hi))
            }
            Self::Global => None,
        }
    }

    /// Whether the shape is well-formed.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Polygon { points, .. } => points.len() >= 3,
            _ => true,
        }
    }
}

/// Even-odd containment test that also accepts points on the boundary.
fn polygon_contains(points: &[[i32; 2]], x: i32, z: i32) -> bool {
    if points.len() < 3 {
        return false;
    }

    let (x, z) = (i64::from(x), i64::from(z));
    let mut inside = false;
    let mut prev = points[points.len() - 1];

    for &cur in points {
        let (x1, z1) = (i64::from(prev[0]), i64::from(prev[1]));
        let (x2, z2) = (i64::from(cur[0]), i64::from(cur[1]));

        if on_segment(x, z, x1, z1, x2, z2) {
            return true;
        }

        if (z1 > z) != (z2 > z) {
            // x coordinate of the edge at height z, compared without division
            let lhs = (x - x1) * (z2 - z1);
            let rhs = (x2 - x1) * (z - z1);
            if (z2 > z1 && lhs < rhs) || (z2 < z1 && lhs > rhs) {
                inside = !inside;
            }
        }

        prev = cur;
    }

    inside
}

fn on_segment(x: i64, z: i64, x1: i64, z1: i64, x2: i64, z2: i64) -> bool {
    let cross = (x2 - x1) * (z - z1) - (z2 - z1) * (x - x1);
    cross == 0 && x >= x1.min(x2) && x <= x1.max(x2) && z >= z1.min(z2) && z <= z1.max(z2)
}
