use crate::*;
pub use random::*;

mod random;

/// Places mines for a new board once the first cell to open is known.
pub trait LayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout;
}
