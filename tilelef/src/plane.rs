//!
//! # Tiles and Tile Databases
//!
//! Layout geometry is stored as [Tile]s: axis-aligned rectangles tagged with an internal layer type.
//! Non-Manhattan geometry appears as *split* tiles, rectangles cut along one diagonal
//! into two triangular halves, each carrying its own type. Each half is stored as its own [Tile].
//!
//! The [TileDatabase] trait is the seam between the exporter and the geometry store:
//! area searches, connectivity selection, and claimed-region subtraction.
//! [TilePlane] is its in-memory implementation.
//!

// Std-Lib
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::iter::FromIterator;

// Local imports
use crate::geom::{Int, Point, Rect, Transform};
use crate::tech::{LayerId, Technology};

/// # Split-Tile Half
/// Which side of the diagonal a [Tile] covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// # Split-Tile Diagonal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagonal {
    /// Top-left to bottom-right
    Falling,
    /// Bottom-left to top-right
    Rising,
}
impl Diagonal {
    /// The opposite diagonal, as produced by a vertical reflection
    pub fn flipped(&self) -> Self {
        match self {
            Self::Falling => Self::Rising,
            Self::Rising => Self::Falling,
        }
    }
}

/// # Split-Tile Attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Split {
    pub side: Side,
    pub diagonal: Diagonal,
}
impl Split {
    /// The three vertices of this half of `rect`, in clockwise order.
    pub fn triangle(&self, rect: &Rect) -> [Point; 3] {
        let (l, b, r, t) = (rect.left(), rect.bottom(), rect.right(), rect.top());
        match (self.side, self.diagonal) {
            (Side::Right, Diagonal::Falling) => [Point::new(l, t), Point::new(r, t), Point::new(r, b)],
            (Side::Right, Diagonal::Rising) => [Point::new(r, t), Point::new(r, b), Point::new(l, b)],
            (Side::Left, Diagonal::Falling) => [Point::new(l, t), Point::new(r, b), Point::new(l, b)],
            (Side::Left, Diagonal::Rising) => [Point::new(l, t), Point::new(r, t), Point::new(l, b)],
        }
    }
    /// The other half of the same rectangle
    pub fn complement(&self) -> Self {
        let side = match self.side {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        Self { side, ..*self }
    }
    /// Signed position of point `(x, y)` relative to the diagonal of `rect`:
    /// positive inside this half, negative inside the other, zero on the diagonal.
    fn side_of(&self, rect: &Rect, x: Int, y: Int) -> i128 {
        let (l, b, r, t) = (
            rect.left() as i128,
            rect.bottom() as i128,
            rect.right() as i128,
            rect.top() as i128,
        );
        // The diagonal, directed upward. Its left-hand side holds the rectangle's left edge.
        let (x0, y0, x1, y1) = match self.diagonal {
            Diagonal::Rising => (l, b, r, t),
            Diagonal::Falling => (r, b, l, t),
        };
        let cross = (x1 - x0) * (y as i128 - y0) - (y1 - y0) * (x as i128 - x0);
        match self.side {
            Side::Left => cross,
            Side::Right => -cross,
        }
    }
    fn corner_sides(&self, rect: &Rect, piece: &Rect) -> [i128; 4] {
        [
            self.side_of(rect, piece.left(), piece.bottom()),
            self.side_of(rect, piece.left(), piece.top()),
            self.side_of(rect, piece.right(), piece.bottom()),
            self.side_of(rect, piece.right(), piece.top()),
        ]
    }
    /// Bounding box of the part of `rect`'s diagonal inside `piece`, a sub-rectangle of `rect`.
    /// Returns `None` unless both its ends fall on integer coordinates.
    fn span(&self, rect: &Rect, piece: &Rect) -> Option<Rect> {
        let (l, b, t) = (rect.left() as i128, rect.bottom() as i128, rect.top() as i128);
        let (w, h) = (rect.width() as i128, rect.height() as i128);
        // Horizontal positions along the diagonal, scaled by `h`
        let x_at = |y: Int| match self.diagonal {
            Diagonal::Rising => l * h + w * (y as i128 - b),
            Diagonal::Falling => l * h + w * (t - y as i128),
        };
        let (xa, xb) = (x_at(piece.bottom()), x_at(piece.top()));
        let x0 = xa.min(xb).max(piece.left() as i128 * h);
        let x1 = xa.max(xb).min(piece.right() as i128 * h);
        if x0 % h != 0 || x1 % h != 0 {
            return None;
        }
        let (x0, x1) = (x0 / h, x1 / h);
        // Vertical positions, scaled by `w`
        let y_at = |x: i128| match self.diagonal {
            Diagonal::Rising => b * w + h * (x - l),
            Diagonal::Falling => t * w - h * (x - l),
        };
        let (y0, y1) = (y_at(x0), y_at(x1));
        if y0 % w != 0 || y1 % w != 0 {
            return None;
        }
        Some(Rect::new(x0 as Int, (y0 / w) as Int, x1 as Int, (y1 / w) as Int))
    }
    /// The part of `piece` inside this half of `rect`, as tiles of type `layer`.
    /// `piece` must lie within `rect`.
    /// Returns `None` if that part has corners off the integer grid.
    fn clip(&self, rect: &Rect, piece: &Rect, layer: LayerId) -> Option<Vec<Tile>> {
        let sides = self.corner_sides(rect, piece);
        if sides.iter().all(|s| *s >= 0) {
            return Some(vec![Tile::new(*piece, layer)]);
        }
        if sides.iter().all(|s| *s <= 0) {
            return Some(Vec::new());
        }
        // The diagonal crosses `piece`. Its crossing is split the same way,
        // and everything around it lies wholly on one side.
        let span = self.span(rect, piece)?;
        let mut tiles = vec![Tile {
            rect: span,
            layer,
            split: Some(*self),
        }];
        for rest in piece.minus(&span) {
            if self.corner_sides(rect, &rest).iter().all(|s| *s >= 0) {
                tiles.push(Tile::new(rest, layer));
            }
        }
        Some(tiles)
    }
    /// Boolean indication of whether this half runs along the full length of `edge`
    pub fn covers(&self, edge: Edge) -> bool {
        use Diagonal::*;
        use Edge::*;
        match (self.side, self.diagonal) {
            (Side::Left, Falling) => matches!(edge, Left | Bottom),
            (Side::Left, Rising) => matches!(edge, Left | Top),
            (Side::Right, Falling) => matches!(edge, Right | Top),
            (Side::Right, Rising) => matches!(edge, Right | Bottom),
        }
    }
}

/// # Rectangle Edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

///
/// # Tile
///
/// A rectangle of a single internal layer type,
/// or one half of a split rectangle.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub rect: Rect,
    pub layer: LayerId,
    pub split: Option<Split>,
}
impl Tile {
    /// Create a new, unsplit [Tile]
    pub fn new(rect: Rect, layer: LayerId) -> Self {
        Self {
            rect,
            layer,
            split: None,
        }
    }
    /// Create a new split-tile half
    pub fn split(rect: Rect, layer: LayerId, side: Side, diagonal: Diagonal) -> Self {
        Self {
            rect,
            layer,
            split: Some(Split { side, diagonal }),
        }
    }
    /// Copy of this tile on layer `layer`
    pub fn with_layer(&self, layer: LayerId) -> Self {
        Self { layer, ..*self }
    }
    /// Boolean indication of whether the tile runs along the full length of `edge`
    pub fn covers(&self, edge: Edge) -> bool {
        match self.split {
            None => true,
            Some(split) => split.covers(edge),
        }
    }
    /// The parts of this tile outside `cut`, as tiles of this tile's type.
    ///
    /// Returns `None` if they cannot be cut into tiles with integer corners,
    /// or if both tiles are split and do not share a rectangle and diagonal.
    pub fn carve(&self, cut: &Tile) -> Option<Vec<Tile>> {
        let inner = match self.rect.intersection(&cut.rect) {
            Some(inner) if !inner.is_empty() => inner,
            _ => return Some(vec![*self]),
        };
        let mut tiles = Vec::new();
        for piece in self.rect.minus(&cut.rect) {
            match self.split {
                None => tiles.push(Tile::new(piece, self.layer)),
                Some(split) => tiles.extend(split.clip(&self.rect, &piece, self.layer)?),
            }
        }
        match (self.split, cut.split) {
            (_, None) => (),
            (None, Some(c)) => tiles.extend(c.complement().clip(&cut.rect, &inner, self.layer)?),
            (Some(s), Some(c)) if self.rect == cut.rect && s.diagonal == c.diagonal => {
                if s.side != c.side {
                    return Some(vec![*self]);
                }
            }
            (Some(_), Some(_)) => return None,
        }
        Some(tiles)
    }
    /// Twice the tile's area. Kept doubled so that split halves stay integral.
    pub fn area2(&self) -> i128 {
        match self.split {
            None => 2 * self.rect.area(),
            Some(_) => self.rect.area(),
        }
    }
    /// Apply the transformation `trans`.
    /// Vertical reflection swaps the diagonal of split tiles, and keeps their side.
    pub fn transform(&self, trans: &Transform) -> Self {
        let split = self.split.map(|s| match trans.reflect_vert {
            true => Split {
                side: s.side,
                diagonal: s.diagonal.flipped(),
            },
            false => s,
        });
        Self {
            rect: self.rect.transform(trans),
            layer: self.layer,
            split,
        }
    }
}

/// # Layer-Type Mask
/// Set of internal layer types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerMask(BTreeSet<LayerId>);
impl LayerMask {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, id: LayerId) {
        self.0.insert(id);
    }
    pub fn contains(&self, id: LayerId) -> bool {
        self.0.contains(&id)
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.0.iter().copied()
    }
}
impl FromIterator<LayerId> for LayerMask {
    fn from_iter<I: IntoIterator<Item = LayerId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// # Search Flow-Control
/// Returned by search callbacks to continue or abort a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFlow {
    Continue,
    Stop,
}

///
/// # Tile Database Trait
///
/// Geometry store for one flattened cell, or any scratch copy thereof.
///
pub trait TileDatabase: Default {
    /// Add `tile`, painting over whatever shares area with it on its plane.
    /// Contacts are not painted over by their own residues. Zero-area tiles are ignored.
    fn paint(&mut self, tech: &Technology, tile: Tile);
    /// Call `f` on each tile of a type in `mask` sharing area with `area`,
    /// in scan order: top-to-bottom, then left-to-right.
    /// Returns [SearchFlow::Stop] if `f` aborted the search.
    fn search_area<F>(&self, area: &Rect, mask: &LayerMask, f: F) -> SearchFlow
    where
        F: FnMut(&Tile) -> SearchFlow;
    /// Select the electrically-connected net of layer-type `layer` overlapping `seed`.
    /// Returns the selected tiles as a new database.
    fn select_net(&self, tech: &Technology, seed: &Rect, layer: LayerId) -> Self;
    /// Remove every tile of `claimed`
    fn subtract(&mut self, claimed: &Self);
    /// Remove all tiles
    fn clear(&mut self);
    /// Bounding box of all tiles, or `None` if empty
    fn bbox(&self) -> Option<Rect>;
    /// Boolean indication of whether there are no tiles
    fn is_empty(&self) -> bool;
}

///
/// # Tile Plane
///
/// Flat list of tiles. Painting fractures existing tiles of the same plane around new paint,
/// so that tiles of one plane never share area. Tiles are never merged.
///
/// Where new paint would cut a split tile off the integer grid, the split tile is kept whole,
/// and the new paint gives way around it if it can.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilePlane {
    tiles: Vec<Tile>,
}
impl TilePlane {
    pub fn new() -> Self {
        Self::default()
    }
    /// All tiles, in paint order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
    pub fn len(&self) -> usize {
        self.tiles.len()
    }
    /// Boolean indication of whether tiles `a` and `b` are geometrically joined:
    /// either sharing area, or abutting along an edge segment of positive length
    /// which both fully run along.
    fn joined(a: &Tile, b: &Tile) -> bool {
        let (ar, br) = (&a.rect, &b.rect);
        if ar.overlaps(br) {
            return true;
        }
        let vert = ar.bottom().max(br.bottom()) < ar.top().min(br.top());
        let horiz = ar.left().max(br.left()) < ar.right().min(br.right());
        (vert && ar.right() == br.left() && a.covers(Edge::Right) && b.covers(Edge::Left))
            || (vert && br.right() == ar.left() && b.covers(Edge::Right) && a.covers(Edge::Left))
            || (horiz && ar.top() == br.bottom() && a.covers(Edge::Top) && b.covers(Edge::Bottom))
            || (horiz && br.top() == ar.bottom() && b.covers(Edge::Top) && a.covers(Edge::Bottom))
    }
}
/// Carve each of `cuts` out of `tiles` in turn
fn carve_all(tiles: &[Tile], cuts: &[Tile]) -> Option<Vec<Tile>> {
    let mut pieces = tiles.to_vec();
    for cut in cuts.iter() {
        let mut next = Vec::with_capacity(pieces.len());
        for piece in pieces.iter() {
            next.extend(piece.carve(cut)?);
        }
        pieces = next;
    }
    Some(pieces)
}
impl TileDatabase for TilePlane {
    fn paint(&mut self, tech: &Technology, tile: Tile) {
        if tile.rect.is_empty() {
            return;
        }
        let plane = match tech.plane(tile.layer) {
            Some(plane) => plane,
            None => {
                self.tiles.push(tile);
                return;
            }
        };
        let mut fresh = vec![tile];
        let mut tiles = Vec::with_capacity(self.tiles.len() + 1);
        for old in std::mem::take(&mut self.tiles) {
            if tech.plane(old.layer) != Some(plane) || !fresh.iter().any(|t| t.rect.overlaps(&old.rect)) {
                tiles.push(old);
                continue;
            }
            let carved = match tech.residues(old.layer).contains(&tile.layer) {
                true => None,
                false => carve_all(&[old], &fresh),
            };
            match carved {
                Some(rest) => tiles.extend(rest),
                None => {
                    if let Some(rest) = carve_all(&fresh, &[old]) {
                        fresh = rest;
                    }
                    tiles.push(old);
                }
            }
        }
        tiles.extend(fresh);
        self.tiles = tiles;
    }
    fn search_area<F>(&self, area: &Rect, mask: &LayerMask, mut f: F) -> SearchFlow
    where
        F: FnMut(&Tile) -> SearchFlow,
    {
        let mut hits: Vec<&Tile> = self
            .tiles
            .iter()
            .filter(|t| mask.contains(t.layer) && t.rect.overlaps(area))
            .collect();
        // Stable sort, so that the two halves of a split tile keep paint order
        hits.sort_by_key(|t| (std::cmp::Reverse(t.rect.top()), t.rect.left()));
        for tile in hits {
            if f(tile) == SearchFlow::Stop {
                return SearchFlow::Stop;
            }
        }
        SearchFlow::Continue
    }
    fn select_net(&self, tech: &Technology, seed: &Rect, layer: LayerId) -> Self {
        let mut selected = vec![false; self.tiles.len()];
        let mut queue = VecDeque::new();
        for (idx, tile) in self.tiles.iter().enumerate() {
            if tile.rect.overlaps(seed) && tech.connects(tile.layer, layer) {
                selected[idx] = true;
                queue.push_back(idx);
            }
        }
        while let Some(idx) = queue.pop_front() {
            let tile = &self.tiles[idx];
            for (other_idx, other) in self.tiles.iter().enumerate() {
                if selected[other_idx] || !tech.connects(tile.layer, other.layer) {
                    continue;
                }
                // Tiles on different planes only join through shared area
                let joined = match tech.plane(tile.layer) == tech.plane(other.layer) {
                    true => Self::joined(tile, other),
                    false => tile.rect.overlaps(&other.rect),
                };
                if joined {
                    selected[other_idx] = true;
                    queue.push_back(other_idx);
                }
            }
        }
        let tiles = self
            .tiles
            .iter()
            .zip(selected)
            .filter(|(_, sel)| *sel)
            .map(|(t, _)| *t)
            .collect();
        Self { tiles }
    }
    fn subtract(&mut self, claimed: &Self) {
        let claimed: HashSet<&Tile> = claimed.tiles.iter().collect();
        self.tiles.retain(|t| !claimed.contains(t));
    }
    fn clear(&mut self) {
        self.tiles.clear();
    }
    fn bbox(&self) -> Option<Rect> {
        let mut tiles = self.tiles.iter();
        let first = tiles.next()?.rect;
        Some(tiles.fold(first, |bbox, t| bbox.union(&t.rect)))
    }
    fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
