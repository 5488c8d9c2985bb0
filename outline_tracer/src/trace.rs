use crate::{Mask, OutlineError};

/// A vertex on the pixel grid. Pixel `(x, y)` covers the unit square between grid points
/// `(x, y)` and `(x + 1, y + 1)`; `y` grows downward, as in the source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPoint {
    pub x: u32,
    pub y: u32,
}

impl GridPoint {
    pub const fn new(x: u32, y: u32) -> GridPoint {
        GridPoint { x, y }
    }
}

/// Rotational direction of a contour, as seen in mask coordinates (`y` pointing down).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Outer boundaries of foreground regions.
    Clockwise,

    /// Boundaries of holes.
    CounterClockwise,
}

/// How overlapping contours combine when filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

/// A closed, axis-aligned polygon. The edge from the last point back to the first is implicit.
///
/// Only corners are stored; collinear points along a straight run are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    points: Vec<GridPoint>,
}

impl Contour {
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The enclosed area in px² using the shoelace formula. Positive for clockwise contours
    /// (outer boundaries), negative for counter-clockwise ones (holes).
    pub fn signed_area(&self) -> i64 {
        let n = self.points.len();
        let twice_area: i64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y)
            })
            .sum();

        // Axis-aligned polygons on an integer grid always have an integral area
        twice_area / 2
    }

    pub fn orientation(&self) -> Orientation {
        if self.signed_area() >= 0 {
            Orientation::Clockwise
        } else {
            Orientation::CounterClockwise
        }
    }

    pub fn is_hole(&self) -> bool {
        self.orientation() == Orientation::CounterClockwise
    }

    /// Iterates over the vertical edges of the contour as `(x, from_y, to_y)`.
    fn vertical_edges(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let n = self.points.len();
        (0..n).filter_map(move |i| {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            (a.x == b.x).then_some((a.x, a.y, b.y))
        })
    }
}

/// Every contour traced from one glyph mask. The order of contours carries no meaning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContourSet {
    contours: Vec<Contour>,
}

impl ContourSet {
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contour> {
        self.contours.iter()
    }

    /// Rasterises the contours back onto a `width` x `height` grid by sampling the winding
    /// number at every pixel centre. Returns row-major foreground flags.
    pub fn fill(&self, width: usize, height: usize, rule: FillRule) -> Vec<bool> {
        // Winding at a pixel centre is the signed count of vertical edges to its right.
        // A downward edge at column `x` therefore adds its sign to pixels `0..x` of every
        // row it spans, which we accumulate as a per-row difference array.
        let stride = width + 1;
        let mut winding = vec![0i32; stride * height];

        for contour in &self.contours {
            for (x, from_y, to_y) in contour.vertical_edges() {
                let (sign, top, bottom) = if to_y > from_y {
                    (1, from_y, to_y)
                } else {
                    (-1, to_y, from_y)
                };
                let x = (x as usize).min(width);
                for row in (top as usize)..(bottom as usize).min(height) {
                    winding[row * stride] += sign;
                    winding[row * stride + x] -= sign;
                }
            }
        }

        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            let mut acc = 0;
            for col in 0..width {
                acc += winding[row * stride + col];
                pixels.push(match rule {
                    FillRule::NonZero => acc != 0,
                    FillRule::EvenOdd => acc % 2 != 0,
                });
            }
        }

        pixels
    }
}

impl<'a> IntoIterator for &'a ContourSet {
    type Item = &'a Contour;
    type IntoIter = std::slice::Iter<'a, Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.iter()
    }
}

impl IntoIterator for ContourSet {
    type Item = Contour;
    type IntoIter = std::vec::IntoIter<Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.into_iter()
    }
}

/// Direction of a boundary edge. The foreground pixel is always on the right-hand side
/// (in mask coordinates), which makes outer boundaries clockwise and holes counter-clockwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    East,
    South,
    West,
    North,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    fn bit(self) -> u8 {
        match self {
            Direction::East => 0b0001,
            Direction::South => 0b0010,
            Direction::West => 0b0100,
            Direction::North => 0b1000,
        }
    }

    fn turn_right(self) -> Direction {
        match self {
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            Direction::North => Direction::East,
        }
    }

    fn turn_left(self) -> Direction {
        match self {
            Direction::East => Direction::North,
            Direction::South => Direction::East,
            Direction::West => Direction::South,
            Direction::North => Direction::West,
        }
    }

    /// Moves one unit along this direction. Callers only step along existing edges, which
    /// never leave the vertex grid.
    fn step(self, x: usize, y: usize) -> (usize, usize) {
        match self {
            Direction::East => (x + 1, y),
            Direction::South => (x, y + 1),
            Direction::West => (x - 1, y),
            Direction::North => (x, y - 1),
        }
    }
}

/// The directed boundary edges of a mask, stored as a bitset of outgoing directions per
/// grid vertex.
struct EdgeGrid {
    /// Number of vertices per row (`mask width + 1`).
    stride: usize,

    /// Outgoing edges of every vertex; never modified after construction.
    edges: Vec<u8>,

    /// Edges that have not been assigned to a contour yet.
    remaining: Vec<u8>,
}

impl EdgeGrid {
    fn from_mask(mask: &Mask) -> EdgeGrid {
        let stride = mask.width() + 1;
        let mut edges = vec![0u8; stride * (mask.height() + 1)];

        for y in 0..mask.height() {
            for x in 0..mask.width() {
                if !mask.is_foreground(x, y) {
                    continue;
                }

                let (sx, sy) = (x as i64, y as i64);
                if !mask.is_foreground_signed(sx, sy - 1) {
                    edges[y * stride + x] |= Direction::East.bit();
                }
                if !mask.is_foreground_signed(sx + 1, sy) {
                    edges[y * stride + x + 1] |= Direction::South.bit();
                }
                if !mask.is_foreground_signed(sx, sy + 1) {
                    edges[(y + 1) * stride + x + 1] |= Direction::West.bit();
                }
                if !mask.is_foreground_signed(sx - 1, sy) {
                    edges[(y + 1) * stride + x] |= Direction::North.bit();
                }
            }
        }

        EdgeGrid {
            stride,
            remaining: edges.clone(),
            edges,
        }
    }

    fn has_edge(&self, vertex: usize, direction: Direction) -> bool {
        self.edges[vertex] & direction.bit() != 0
    }

    /// The edge that continues a walk arriving at `vertex` while heading `incoming`.
    ///
    /// Only a saddle vertex (two foreground pixels touching diagonally) has more than one
    /// candidate. Preferring the right turn keeps the walk hugging the pixel it came from,
    /// so diagonal neighbours end up on separate contours (4-connected foreground).
    fn successor(&self, vertex: usize, incoming: Direction) -> Option<Direction> {
        [incoming.turn_right(), incoming, incoming.turn_left()]
            .into_iter()
            .find(|&direction| self.has_edge(vertex, direction))
    }

    fn first_remaining(&self, vertex: usize) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.remaining[vertex] & direction.bit() != 0)
    }

    fn take(&mut self, vertex: usize, direction: Direction) -> bool {
        let present = self.remaining[vertex] & direction.bit() != 0;
        self.remaining[vertex] &= !direction.bit();
        present
    }

    /// Follows boundary edges from `(x, y)` heading `direction` until the loop closes.
    fn walk(&mut self, x: usize, y: usize, direction: Direction) -> Result<Contour, OutlineError> {
        let start = (x, y, direction);
        let (mut x, mut y, mut direction) = start;
        let mut visited: Vec<(GridPoint, Direction)> = Vec::new();

        loop {
            let vertex = y * self.stride + x;
            if !self.take(vertex, direction) {
                return Err(OutlineError::TracingInconsistency(format!(
                    "boundary walk from ({}, {}) revisited the edge leaving ({x}, {y})",
                    start.0, start.1
                )));
            }
            visited.push((GridPoint::new(x as u32, y as u32), direction));

            (x, y) = direction.step(x, y);
            let next = self
                .successor(y * self.stride + x, direction)
                .ok_or_else(|| {
                    OutlineError::TracingInconsistency(format!(
                        "boundary walk from ({}, {}) stopped at ({x}, {y}) without a continuing edge",
                        start.0, start.1
                    ))
                })?;

            if (x, y, next) == start {
                break;
            }
            direction = next;
        }

        // Keep only the vertices where the walk changes direction
        let n = visited.len();
        let points: Vec<GridPoint> = (0..n)
            .filter(|&i| visited[i].1 != visited[(i + n - 1) % n].1)
            .map(|i| visited[i].0)
            .collect();

        if points.len() < 4 {
            return Err(OutlineError::TracingInconsistency(format!(
                "boundary walk from ({}, {}) produced a degenerate contour with {} corner(s)",
                start.0,
                start.1,
                points.len()
            )));
        }

        Ok(Contour { points })
    }
}

/// Traces the boundaries between foreground and background pixels of `mask`.
///
/// The result contains one clockwise contour for the outer boundary of every 4-connected
/// foreground region and one counter-clockwise contour for every hole, so filling it with
/// either [`FillRule`] reproduces the mask exactly. Pixels that touch only at a corner
/// belong to separate contours; such contours share that single vertex but never cross.
///
/// Tracing is deterministic: contours are started at the first unvisited boundary edge in
/// row-major vertex order, which is always the top-left corner of the contour.
pub fn trace(mask: &Mask) -> Result<ContourSet, OutlineError> {
    let mut grid = EdgeGrid::from_mask(mask);
    let mut contours = Vec::new();

    for y in 0..=mask.height() {
        for x in 0..=mask.width() {
            let vertex = y * grid.stride + x;
            while let Some(direction) = grid.first_remaining(vertex) {
                contours.push(grid.walk(x, y, direction)?);
            }
        }
    }

    let set = ContourSet { contours };

    if set.fill(mask.width(), mask.height(), FillRule::NonZero) != mask.pixels() {
        return Err(OutlineError::TracingInconsistency(String::from(
            "filled contours do not reproduce the mask",
        )));
    }

    log::trace!(
        "Traced {} contour(s) from a {}x{} mask",
        set.len(),
        mask.width(),
        mask.height()
    );

    Ok(set)
}
