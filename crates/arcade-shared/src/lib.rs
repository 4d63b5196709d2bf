#![no_std]

//! Grid line scanning for N-in-a-row style games.
//!
//! Boards are flat row-major slices of `i32` where `0` is an empty cell and
//! any other value identifies the owning player.

/// Scan directions as `(row delta, column delta)`: horizontal, vertical,
/// down-right diagonal and down-left diagonal.
pub const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Iterator over every straight run of `N` cells that fits inside a grid.
///
/// Runs are produced by start cell in row-major order, and for each start
/// cell in [`DIRECTIONS`] order. Each item holds the flat indices of the run,
/// starting with the start cell.
#[derive(Debug, Clone)]
pub struct Windows<const N: usize> {
    width: i32,
    height: i32,
    cell: i32,
    dir: usize,
}

impl<const N: usize> Iterator for Windows<N> {
    type Item = [usize; N];

    fn next(&mut self) -> Option<[usize; N]> {
        if N == 0 {
            return None;
        }
        let span = N as i32 - 1;
        while self.cell < self.width * self.height {
            let (r, c) = (self.cell / self.width, self.cell % self.width);
            while self.dir < DIRECTIONS.len() {
                let (dr, dc) = DIRECTIONS[self.dir];
                self.dir += 1;
                let (end_r, end_c) = (r + dr * span, c + dc * span);
                if end_r < 0 || end_r >= self.height || end_c < 0 || end_c >= self.width {
                    continue;
                }
                let mut window = [0usize; N];
                for (k, slot) in window.iter_mut().enumerate() {
                    let k = k as i32;
                    *slot = ((r + dr * k) * self.width + (c + dc * k)) as usize;
                }
                return Some(window);
            }
            self.dir = 0;
            self.cell += 1;
        }
        None
    }
}

/// Returns every run of `N` cells inside a `width` x `height` grid.
pub fn windows<const N: usize>(width: usize, height: usize) -> Windows<N> {
    Windows {
        width: width as i32,
        height: height as i32,
        cell: 0,
        dir: 0,
    }
}

/// Finds the first run of `N` cells all owned by `player`.
///
/// # Arguments
/// * `board` - The board data as a flat slice
/// * `width` - Board width
/// * `height` - Board height
/// * `player` - The player ID to check for (e.g., 1 or -1)
pub fn find_line<const N: usize>(
    board: &[i32],
    width: usize,
    height: usize,
    player: i32,
) -> Option<[usize; N]> {
    if player == 0 {
        return None;
    }
    windows::<N>(width, height).find(|window| window.iter().all(|&idx| board.get(idx) == Some(&player)))
}

/// Checks for a win of exactly `N` in a row by `player`.
pub fn check_line_win<const N: usize>(board: &[i32], width: usize, height: usize, player: i32) -> bool {
    find_line::<N>(board, width, height, player).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_count_standard_board() {
        // 24 horizontal, 21 vertical, 12 per diagonal
        assert_eq!(windows::<4>(7, 6).count(), 69);
    }

    #[test]
    fn test_windows_too_small_board() {
        assert_eq!(windows::<4>(3, 3).count(), 0);
    }

    #[test]
    fn test_first_window_is_horizontal_from_origin() {
        let first = windows::<4>(7, 6).next();
        assert_eq!(first, Some([0, 1, 2, 3]));
    }

    #[test]
    fn test_find_line_anti_diagonal() {
        let mut board = [0i32; 42];
        for &(r, c) in &[(2usize, 3usize), (3, 2), (4, 1), (5, 0)] {
            board[r * 7 + c] = -1;
        }
        assert_eq!(find_line::<4>(&board, 7, 6, -1), Some([17, 23, 29, 35]));
        assert!(!check_line_win::<4>(&board, 7, 6, 1));
    }

    #[test]
    fn test_empty_player_never_wins() {
        let board = [0i32; 42];
        assert_eq!(find_line::<4>(&board, 7, 6, 0), None);
    }
}
