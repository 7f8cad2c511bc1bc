//! Polygon triangulation and convex decomposition
//!
//! Clip polygons may be concave, but Sutherland–Hodgman clipping needs
//! convex clip windows. The triangulator ear-clips a counter-clockwise
//! polygon and then merges fans of triangles back into convex pieces.

use crate::foundation::math::utils::cross;

/// Reusable scratch state for triangulating polygons
#[derive(Debug, Default)]
pub struct Triangulator {
    remaining: Vec<usize>,
    triangles: Vec<[usize; 3]>,
    fan: Vec<usize>,
}

fn point(polygon: &[f32], index: usize) -> (f32, f32) {
    (polygon[index * 2], polygon[index * 2 + 1])
}

fn corner_cross(polygon: &[f32], a: usize, b: usize, c: usize) -> f32 {
    let (ax, ay) = point(polygon, a);
    let (bx, by) = point(polygon, b);
    let (cx, cy) = point(polygon, c);
    cross(ax, ay, bx, by, cx, cy)
}

fn contains(polygon: &[f32], triangle: [usize; 3], p: usize) -> bool {
    let [a, b, c] = triangle;
    corner_cross(polygon, a, b, p) >= 0.0
        && corner_cross(polygon, b, c, p) >= 0.0
        && corner_cross(polygon, c, a, p) >= 0.0
}

/// Signed area of a polygon given as `x, y` pairs; positive when counter-clockwise
pub fn signed_area(polygon: &[f32]) -> f32 {
    let n = polygon.len() / 2;
    let mut area = 0.0;
    for i in 0..n {
        let (x1, y1) = point(polygon, i);
        let (x2, y2) = point(polygon, (i + 1) % n);
        area += x1 * y2 - x2 * y1;
    }
    area * 0.5
}

/// Reverse the vertex order of a clockwise polygon in place
pub fn make_counter_clockwise(polygon: &mut [f32]) {
    if signed_area(polygon) >= 0.0 {
        return;
    }
    let n = polygon.len() / 2;
    for i in 0..n / 2 {
        let j = n - 1 - i;
        polygon.swap(i * 2, j * 2);
        polygon.swap(i * 2 + 1, j * 2 + 1);
    }
}

/// Whether a counter-clockwise polygon has no reflex corners
pub fn is_convex(polygon: &[f32]) -> bool {
    let n = polygon.len() / 2;
    (0..n).all(|i| corner_cross(polygon, i, (i + 1) % n, (i + 2) % n) >= 0.0)
}

impl Triangulator {
    /// Create a triangulator with empty scratch buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Ear-clip a counter-clockwise polygon into triangles of vertex indices
    pub fn triangulate(&mut self, polygon: &[f32]) -> &[[usize; 3]] {
        let n = polygon.len() / 2;
        self.triangles.clear();
        self.remaining.clear();
        self.remaining.extend(0..n);
        if n < 3 {
            return &self.triangles;
        }

        while self.remaining.len() > 3 {
            let m = self.remaining.len();
            let remaining = &self.remaining;
            let ear = (0..m).find(|&i| {
                let triangle = [remaining[(i + m - 1) % m], remaining[i], remaining[(i + 1) % m]];
                if corner_cross(polygon, triangle[0], triangle[1], triangle[2]) <= 0.0 {
                    return false;
                }
                !remaining
                    .iter()
                    .copied()
                    .filter(|p| !triangle.contains(p))
                    .any(|p| contains(polygon, triangle, p))
            });
            // Degenerate input has no proper ear; clip the first corner to make progress
            let i = ear.unwrap_or(0);
            self.triangles
                .push([self.remaining[(i + m - 1) % m], self.remaining[i], self.remaining[(i + 1) % m]]);
            self.remaining.remove(i);
        }
        // Same corner order as the ears above so the last triangle can join a fan
        self.triangles.push([self.remaining[2], self.remaining[0], self.remaining[1]]);
        &self.triangles
    }

    /// Split a counter-clockwise polygon into convex counter-clockwise pieces
    ///
    /// Piece coordinates are appended to `vertices`; each piece's float
    /// range is appended to `spans`. Zero-area pieces are dropped.
    pub fn decompose(
        &mut self,
        polygon: &[f32],
        vertices: &mut Vec<f32>,
        spans: &mut Vec<(usize, usize)>,
    ) {
        self.triangulate(polygon);
        self.fan.clear();

        for t in 0..self.triangles.len() {
            let [t1, t2, t3] = self.triangles[t];
            let fan = &self.fan;
            let extends_fan = fan.len() >= 3
                && fan[0] == t1
                && fan[fan.len() - 1] == t2
                && corner_cross(polygon, fan[fan.len() - 2], t2, t3) > 0.0
                && corner_cross(polygon, t3, fan[0], fan[1]) > 0.0;

            if extends_fan {
                self.fan.push(t3);
            } else {
                Self::flush_fan(&self.fan, polygon, vertices, spans);
                self.fan.clear();
                self.fan.extend_from_slice(&[t1, t2, t3]);
            }
        }
        Self::flush_fan(&self.fan, polygon, vertices, spans);
        self.fan.clear();
    }

    fn flush_fan(fan: &[usize], polygon: &[f32], vertices: &mut Vec<f32>, spans: &mut Vec<(usize, usize)>) {
        if fan.len() < 3 {
            return;
        }
        let start = vertices.len();
        for &index in fan {
            let (x, y) = point(polygon, index);
            vertices.extend_from_slice(&[x, y]);
        }
        if signed_area(&vertices[start..]).abs() <= f32::EPSILON {
            vertices.truncate(start);
            return;
        }
        spans.push((start, vertices.len()));
    }
}
