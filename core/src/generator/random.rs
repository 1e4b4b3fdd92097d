use alloc::vec::Vec;

use super::*;

/// Uniformly random placement that keeps the first opened cell and its neighbors free of mines, so the first reveal
/// always opens an area.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
    start: Coord2,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64, start: Coord2) -> Self {
        Self { seed, start }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use rand::prelude::*;

        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());
        let start = self.start;

        let mut candidates: Vec<Coord2> = mines
            .indexed_iter()
            .map(|((x, y), _)| (x as Coord, y as Coord))
            .filter(|&pos| !is_adjacent_or_same(pos, start))
            .collect();

        let requested = usize::from(config.mines);
        let placed = if requested > candidates.len() {
            log::warn!(
                "Not enough room around the start cell, requested {} mines but only {} fit",
                requested,
                candidates.len()
            );
            candidates.len()
        } else {
            requested
        };

        // partial Fisher-Yates, the first `placed` candidates end up as a uniform sample
        let mut rng = SmallRng::seed_from_u64(self.seed);
        for i in 0..placed {
            let j = rng.random_range(i..candidates.len());
            candidates.swap(i, j);
            mines[candidates[i].to_nd_index()] = true;
        }

        log::debug!(
            "Generated {} mines on a {}x{} board, start at {:?}",
            placed,
            config.size.0,
            config.size.1,
            start
        );
        MineLayout::from_mine_mask(mines)
    }
}
