//! Robert–Asselin style filter for the leapfrog computational mode.
//!
//! Leapfrog couples even and odd steps only weakly, so the two
//! sub-sequences drift apart (the computational mode). Every `navg` steps
//! the levels are averaged:
//!
//! ```text
//! next ← (next + cur) / 2
//! cur  ← (prev + cur) / 2
//! ```

use crate::solver::LevelsMut;

/// Average the three levels in place over cells flagged in `sea`.
///
/// `next` is averaged with the unfiltered current level before `cur`
/// itself is replaced.
///
/// # Example
///
/// ```
/// use npzb_rs::solver::LevelsMut;
/// use npzb_rs::time::mode_filter;
///
/// let (mut prev, mut cur, mut next) = ([1.0], [2.0], [3.0]);
/// mode_filter(
///     LevelsMut { prev: &mut prev, cur: &mut cur, next: &mut next },
///     &[true],
/// );
/// assert_eq!(next, [2.5]);
/// assert_eq!(cur, [1.5]);
/// ```
pub fn mode_filter(levels: LevelsMut<'_>, sea: &[bool]) {
    let LevelsMut { prev, cur, next } = levels;
    for (k, &is_sea) in sea.iter().enumerate() {
        if is_sea {
            next[k] = 0.5 * (next[k] + cur[k]);
            cur[k] = 0.5 * (prev[k] + cur[k]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        let mut prev = vec![1.0, 1.0];
        let mut cur = vec![2.0, 2.0];
        let mut next = vec![3.0, 3.0];
        mode_filter(
            LevelsMut {
                prev: &mut prev,
                cur: &mut cur,
                next: &mut next,
            },
            &[true, false],
        );
        assert_eq!(next, vec![2.5, 3.0]);
        assert_eq!(cur, vec![1.5, 2.0]);
        assert_eq!(prev, vec![1.0, 1.0]);
    }

    #[test]
    fn test_steady_state_unchanged() {
        let mut prev = vec![0.7; 4];
        let mut cur = vec![0.7; 4];
        let mut next = vec![0.7; 4];
        mode_filter(
            LevelsMut {
                prev: &mut prev,
                cur: &mut cur,
                next: &mut next,
            },
            &[true; 4],
        );
        assert_eq!(cur, vec![0.7; 4]);
        assert_eq!(next, vec![0.7; 4]);
    }
}
