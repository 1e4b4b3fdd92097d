use ndarray::Array2;

/// Single board axis, used both for sizes and positions.
pub type Coord = u8;

/// Cell totals: board area, mine counts, revealed and flagged counters.
pub type CellCount = u16;

/// Board position as `(x, y)`, that is `(col, row)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    (a as CellCount).saturating_mul(b as CellCount)
}

/// Whether `a` and `b` are the same cell or touch each other, diagonals included.
pub const fn is_adjacent_or_same(a: Coord2, b: Coord2) -> bool {
    a.0.abs_diff(b.0) <= 1 && a.1.abs_diff(b.1) <= 1
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, center: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, center: Coord2) -> NeighborIter {
        let (x_len, y_len) = self.dim();
        let bounds = (
            Coord::try_from(x_len).unwrap_or(Coord::MAX),
            Coord::try_from(y_len).unwrap_or(Coord::MAX),
        );
        NeighborIter::new(center, bounds)
    }
}

/// Iterates the up to 8 in-bounds cells around `center`, row by row, never `center` itself.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    step: u8,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            step: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        // 3x3 window scanned as steps 0..9, step 4 is the center
        while self.step < 9 {
            let step = self.step;
            self.step += 1;
            if step == 4 {
                continue;
            }

            let nx = i16::from(self.center.0) + i16::from(step % 3) - 1;
            let ny = i16::from(self.center.1) + i16::from(step / 3) - 1;
            if (0..i16::from(self.bounds.0)).contains(&nx) && (0..i16::from(self.bounds.1)).contains(&ny)
            {
                return Some((nx as Coord, ny as Coord));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn corner_has_three_neighbors() {
        let neighbors: Vec<_> = NeighborIter::new((0, 0), (9, 9)).collect();
        assert_eq!(neighbors, [(1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn inner_cell_has_eight_neighbors_and_excludes_itself() {
        let neighbors: Vec<_> = NeighborIter::new((4, 4), (9, 9)).collect();
        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&(4, 4)));
        assert!(neighbors.iter().all(|&pos| is_adjacent_or_same(pos, (4, 4))));
    }

    #[test]
    fn far_edge_is_clipped_by_bounds() {
        let neighbors: Vec<_> = NeighborIter::new((29, 15), (30, 16)).collect();
        assert_eq!(neighbors, [(28, 14), (29, 14), (28, 15)]);
    }
}
