/// Number of columns and rows on each board.
pub const BOARD_SIZE: usize = 10;

/// Column labels in board order; column `i` is written as `COLUMN_LABELS[i]`.
pub const COLUMN_LABELS: [char; BOARD_SIZE] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];
