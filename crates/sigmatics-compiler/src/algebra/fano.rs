//! Fano-plane cross product on the seven imaginary generators
//!
//! Each line `(a, b, c)` reads cyclically: `a×b = c`, `b×c = a`, `c×a = b`,
//! and reversing the order flips the sign.

use crate::error::AlgebraError;

/// The seven oriented lines of the Fano plane
pub const FANO_LINES: [[u8; 3]; 7] = [
    [1, 2, 4],
    [2, 3, 5],
    [3, 4, 6],
    [4, 5, 7],
    [5, 6, 1],
    [6, 7, 2],
    [7, 1, 3],
];

/// Cross product of generators `i × j` as `(k, sign)`
///
/// `cross(i, i)` is the null result `(0, 0)`. Indices outside 1..7 fail.
pub fn cross(i: u8, j: u8) -> Result<(u8, i8), AlgebraError> {
    for index in [i, j] {
        if !(1..=7).contains(&index) {
            return Err(AlgebraError::InvalidGenerator(index as i64));
        }
    }

    if i == j {
        return Ok((0, 0));
    }

    for [a, b, c] in FANO_LINES {
        for (x, y, z) in [(a, b, c), (b, c, a), (c, a, b)] {
            if (i, j) == (x, y) {
                return Ok((z, 1));
            }
            if (i, j) == (y, x) {
                return Ok((z, -1));
            }
        }
    }

    // every pair of distinct points lies on exactly one line
    Err(AlgebraError::InvalidGenerator(j as i64))
}
