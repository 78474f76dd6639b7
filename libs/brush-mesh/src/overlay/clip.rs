//! Clipping overlay faces against the borders of the decal quad.

use glam::{DMat3, DVec2, DVec3};

use crate::geometry::VertexWelder;

/// One edge of the decal quad in the overlay's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    start: DVec2,
    /// Unit normal pointing away from the quad for clockwise corners.
    normal: DVec2,
}

impl Border {
    /// Border through `a` and `b`, with normal `Z × (b - a)`. `None` when
    /// the corners coincide.
    pub fn new(a: DVec3, b: DVec3) -> Option<Self> {
        let normal = DVec3::Z.cross(b - a).truncate().try_normalize()?;
        Some(Self {
            start: a.truncate(),
            normal,
        })
    }

    /// The four borders of a quad, edge `k` running from corner `k` to
    /// corner `k + 1`.
    pub fn quad(corners: &[DVec3; 4]) -> Option<[Border; 4]> {
        Some([
            Self::new(corners[0], corners[1])?,
            Self::new(corners[1], corners[2])?,
            Self::new(corners[2], corners[3])?,
            Self::new(corners[3], corners[0])?,
        ])
    }

    /// Signed distance in the local xy plane; positive is outside.
    #[inline]
    pub fn distance(&self, local: DVec3) -> f64 {
        self.normal.dot(local.truncate() - self.start)
    }
}

/// Overlay faces being clipped, with every vertex known both in world space
/// and in the overlay frame.
#[derive(Debug)]
pub struct ClipMesh {
    /// World positions; new border points are welded against them.
    world: VertexWelder,
    local: Vec<DVec3>,
    removed: Vec<bool>,
    faces: Vec<Vec<usize>>,
    face_normals: Vec<DVec3>,
    origin: DVec3,
    frame: DMat3,
}

/// Result of clipping: surviving vertices and faces, reindexed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedFaces {
    /// World positions.
    pub world: Vec<DVec3>,
    /// Positions in the overlay frame.
    pub local: Vec<DVec3>,
    /// Polygons as indices into both vertex lists.
    pub faces: Vec<Vec<usize>>,
    /// Normal of the side each face came from.
    pub face_normals: Vec<DVec3>,
}

impl ClipMesh {
    /// Starts clipping. `world` must already hold every vertex, in index
    /// order; `frame` takes overlay-local coordinates to world directions.
    pub fn new(
        world: VertexWelder,
        faces: Vec<Vec<usize>>,
        face_normals: Vec<DVec3>,
        origin: DVec3,
        frame: DMat3,
    ) -> Self {
        let to_local = frame.inverse();
        let local: Vec<DVec3> = world
            .points()
            .iter()
            .map(|&point| to_local * (point - origin))
            .collect();
        let removed = vec![false; local.len()];
        Self {
            world,
            local,
            removed,
            faces,
            face_normals,
            origin,
            frame,
        }
    }

    /// Cuts every face straddling `border` and marks the vertices outside
    /// it for removal.
    pub fn clip(&mut self, border: &Border) {
        let outside: Vec<bool> = self
            .local
            .iter()
            .map(|&point| border.distance(point) > 0.0)
            .collect();
        if !outside.iter().any(|&out| out) {
            return;
        }
        for (removed, &out) in self.removed.iter_mut().zip(&outside) {
            *removed |= out;
        }

        for face_index in 0..self.faces.len() {
            let mut face = std::mem::take(&mut self.faces[face_index]);
            let Some(inside) = face.iter().position(|&v| !outside[v]) else {
                self.faces[face_index] = face;
                continue;
            };
            if face.iter().all(|&v| !outside[v]) {
                self.faces[face_index] = face;
                continue;
            }

            face.rotate_left(inside);
            let len = face.len();
            let first_out = face.iter().position(|&v| outside[v]).unwrap_or(0);
            let last_out = face.iter().rposition(|&v| outside[v]).unwrap_or(0);

            let enter = self.split(face[first_out - 1], face[first_out], border);
            let leave = self.split(face[(last_out + 1) % len], face[last_out], border);

            let replacement = if enter == leave {
                vec![enter]
            } else {
                vec![enter, leave]
            };
            face.splice(first_out..=last_out, replacement);
            face.dedup();
            if face.len() > 1 && face.first() == face.last() {
                face.pop();
            }
            self.faces[face_index] = face;
        }
    }

    /// Point where the edge from `inside` to `outside` crosses `border`,
    /// welded to an existing vertex when one is close enough.
    fn split(&mut self, inside: usize, outside: usize, border: &Border) -> usize {
        let a = self.local[inside];
        let b = self.local[outside];
        let da = border.distance(a);
        let db = border.distance(b);
        let t = if (da - db).abs() > f64::EPSILON {
            da / (da - db)
        } else {
            0.0
        };
        let local = a.lerp(b, t);
        let world = self.origin + self.frame * local;

        match self.world.find(world) {
            Some(index) if !self.removed[index] => index,
            _ => {
                let index = self.world.insert(world);
                self.local.push(local);
                self.removed.push(false);
                index
            }
        }
    }

    /// Marks every vertex more than `epsilon` outside any border.
    pub fn recheck(&mut self, borders: &[Border], epsilon: f64) {
        for (point, removed) in self.local.iter().zip(self.removed.iter_mut()) {
            if borders.iter().any(|border| border.distance(*point) > epsilon) {
                *removed = true;
            }
        }
    }

    /// Drops faces touching a removed vertex (and degenerate ones), then
    /// keeps only the vertices still referenced.
    pub fn finish(self) -> ClippedFaces {
        let world = self.world.into_points();
        let mut remap: Vec<Option<usize>> = vec![None; world.len()];
        let mut result = ClippedFaces {
            world: Vec::new(),
            local: Vec::new(),
            faces: Vec::new(),
            face_normals: Vec::new(),
        };

        for (face, normal) in self.faces.into_iter().zip(self.face_normals) {
            if face.len() < 3 || face.iter().any(|&v| self.removed[v]) {
                continue;
            }
            let face = face
                .into_iter()
                .map(|v| {
                    *remap[v].get_or_insert_with(|| {
                        result.world.push(world[v]);
                        result.local.push(self.local[v]);
                        result.world.len() - 1
                    })
                })
                .collect();
            result.faces.push(face);
            result.face_normals.push(normal);
        }

        result
    }
}
