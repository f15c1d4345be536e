use model::{traversal::CellTraversal, Board, Cell, SlideDirection};
use proptest::prelude::*;

fn direction() -> impl Strategy<Value = SlideDirection> {
    prop_oneof![
        Just(SlideDirection::Up),
        Just(SlideDirection::Down),
        Just(SlideDirection::Left),
        Just(SlideDirection::Right),
    ]
}

proptest! {
    #[test]
    fn single_tile_slides_to_the_edge(
        rows in 1usize..6,
        cols in 1usize..6,
        seed in any::<u64>(),
        direction in direction(),
    ) {
        let mut board = Board::with_seed(rows, cols, seed);
        let cell = board.try_get_open_cell().unwrap();
        let (row, col) = (cell.row as usize, cell.col as usize);
        board.add_tile(row, col);
        board.try_slide(direction);

        let (expected_row, expected_col) = match direction {
            SlideDirection::Up => (0, col),
            SlideDirection::Down => (rows - 1, col),
            SlideDirection::Left => (row, 0),
            SlideDirection::Right => (row, cols - 1),
        };
        let tiles: Vec<_> = board.tiles().map(|t| (t.row(), t.column(), t.value())).collect();
        prop_assert_eq!(tiles, vec![(expected_row, expected_col, 2)]);
    }

    #[test]
    fn slide_keeps_the_sum_of_values(
        values in proptest::collection::vec(prop_oneof![Just(0u32), Just(2), Just(4), Just(8)], 16),
        direction in direction(),
    ) {
        let array = ndarray::Array2::from_shape_vec((4, 4), values).unwrap();
        let total: u32 = array.sum();
        let mut board = Board::from_array(array);
        board.try_slide(direction);
        prop_assert_eq!(board.to_array().sum(), total);
        // A second slide in the same direction never has anything left to do.
        prop_assert!(!board.try_slide(direction));
    }

    #[test]
    fn open_cell_is_always_empty(
        rows in 1usize..5,
        cols in 1usize..5,
        filled in 0usize..25,
        seed in any::<u64>(),
    ) {
        let mut board = Board::with_seed(rows, cols, seed);
        for _ in 0..filled.min(rows * cols) {
            let cell = board.try_get_open_cell().unwrap();
            board.add_tile(cell.row as usize, cell.col as usize);
        }
        match board.try_get_open_cell() {
            Some(cell) => {
                prop_assert!(board.is_valid_cell(cell));
                prop_assert!(board.can_add_tile(cell.row as usize, cell.col as usize));
            }
            None => prop_assert_eq!(board.tiles().count(), rows * cols),
        }
    }

    #[test]
    fn traversal_visits_every_non_edge_cell_once(
        rows in 1usize..7,
        cols in 1usize..7,
        direction in direction(),
    ) {
        let pairs: Vec<(Cell, Cell)> = CellTraversal::new(direction, rows, cols).collect();
        let expected = match direction {
            SlideDirection::Up | SlideDirection::Down => (rows - 1) * cols,
            SlideDirection::Left | SlideDirection::Right => rows * (cols - 1),
        };
        prop_assert_eq!(pairs.len(), expected);
        for (source, target) in pairs {
            prop_assert!(source.is_within(rows, cols));
            prop_assert!(target.is_within(rows, cols));
            prop_assert_eq!(source.neighbour(direction), target);
        }
    }
}
