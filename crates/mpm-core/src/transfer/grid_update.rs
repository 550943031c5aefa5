use super::DispatchSize;
use crate::grid::GridStore;

/// Grid update: momentum / mass into the resolved velocity buffer, with the
/// boundary bands zeroed per axis. Empty cells stay at zero.
pub fn update_grid(grid: &mut GridStore, dispatch: &DispatchSize) {
    debug_assert_eq!(dispatch.cells, grid.cell_count());
    grid.resolve_all();
}
