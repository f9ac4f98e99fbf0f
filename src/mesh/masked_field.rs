//! Gridded values with an explicit per-cell validity flag.
//!
//! Forcing velocities arrive with missing entries: land cells, fill values,
//! and samples above a sentinel threshold. Instead of encoding these as NaN,
//! each cell carries a validity flag and readers ask for either an
//! `Option<f64>` or a value with an explicit fallback.

use crate::error::{NpzbError, Result};
use crate::mesh::SeaMask;
use crate::types::{CellIndex, GridShape};

/// Fill value for missing data (CF-conventions standard).
pub const FILL_VALUE_F64: f64 = 9.96920996838687e+36;

/// Velocity magnitude (m/s) at or above which a forcing sample is treated as missing.
pub const VELOCITY_SENTINEL: f64 = 1.0e3;

/// Check if a value is valid (not a fill value).
#[inline]
pub fn is_valid_f64(v: f64) -> bool {
    v.is_finite() && v.abs() < 1.0e+30
}

/// A 2D field of `f64` values with per-cell validity.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskedField {
    shape: GridShape,
    values: Vec<f64>,
    valid: Vec<bool>,
}

impl MaskedField {
    /// Create a field where every cell is missing.
    pub fn missing(shape: GridShape) -> Self {
        Self {
            shape,
            values: vec![0.0; shape.n_cells()],
            valid: vec![false; shape.n_cells()],
        }
    }

    /// Create a field with the same value in every cell, all valid.
    pub fn constant(shape: GridShape, value: f64) -> Self {
        Self {
            shape,
            values: vec![value; shape.n_cells()],
            valid: vec![true; shape.n_cells()],
        }
    }

    /// Create a field from values; a cell is valid when its value is finite.
    pub fn from_values(shape: GridShape, values: Vec<f64>) -> Result<Self> {
        check_len("field values", shape, values.len())?;
        let valid = values.iter().map(|v| v.is_finite()).collect();
        Ok(Self {
            shape,
            values,
            valid,
        })
    }

    /// Create a field from raw sampled values, masking land and sentinel entries.
    ///
    /// A cell is valid when it is sea, its value is a valid number (not a
    /// fill value) and `|value| < sentinel`. Invalid cells store 0.0 and are
    /// never read as numbers.
    pub fn from_raw(values: &[f64], mask: &SeaMask, sentinel: f64) -> Result<Self> {
        let shape = mask.shape();
        check_len("raw field values", shape, values.len())?;
        let mut out = Self::missing(shape);
        for (k, &v) in values.iter().enumerate() {
            if mask.flags()[k] && is_valid_f64(v) && v.abs() < sentinel {
                out.values[k] = v;
                out.valid[k] = true;
            }
        }
        Ok(out)
    }

    /// Copy model values, marking land cells missing.
    pub fn from_sea_values(values: &[f64], mask: &SeaMask) -> Result<Self> {
        let shape = mask.shape();
        check_len("sea values", shape, values.len())?;
        let valid: Vec<bool> = mask.flags().to_vec();
        let values = values
            .iter()
            .zip(valid.iter())
            .map(|(&v, &sea)| if sea { v } else { 0.0 })
            .collect();
        Ok(Self {
            shape,
            values,
            valid,
        })
    }

    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Value at (j, i), or `None` if missing.
    #[inline]
    pub fn get(&self, j: usize, i: usize) -> Option<f64> {
        let k = j * self.shape.nx() + i;
        if self.valid[k] {
            Some(self.values[k])
        } else {
            None
        }
    }

    /// Value at (j, i), substituting `fallback` if missing.
    #[inline]
    pub fn value_or(&self, j: usize, i: usize, fallback: f64) -> f64 {
        let k = j * self.shape.nx() + i;
        if self.valid[k] { self.values[k] } else { fallback }
    }

    /// Value at a flat cell index, or `None` if missing.
    #[inline]
    pub fn get_cell(&self, cell: CellIndex) -> Option<f64> {
        if self.valid[cell] {
            Some(self.values[cell])
        } else {
            None
        }
    }

    /// Whether (j, i) holds a valid value.
    #[inline]
    pub fn is_valid(&self, j: usize, i: usize) -> bool {
        self.valid[j * self.shape.nx() + i]
    }

    /// Set a valid value at (j, i).
    pub fn set(&mut self, j: usize, i: usize, value: f64) {
        let k = j * self.shape.nx() + i;
        self.values[k] = value;
        self.valid[k] = true;
    }

    /// Mark (j, i) as missing.
    pub fn set_missing(&mut self, j: usize, i: usize) {
        let k = j * self.shape.nx() + i;
        self.values[k] = 0.0;
        self.valid[k] = false;
    }

    /// Number of valid cells.
    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    /// Arithmetic mean over valid cells, `None` if there are none.
    pub fn mean_valid(&self) -> Option<f64> {
        let (sum, n) = self
            .values
            .iter()
            .zip(self.valid.iter())
            .filter(|(_, ok)| **ok)
            .fold((0.0, 0usize), |(s, n), (v, _)| (s + v, n + 1));
        if n > 0 { Some(sum / n as f64) } else { None }
    }

    /// Linear blend `(1 - frac) * a + frac * b` written into `self`.
    ///
    /// A cell is valid only when it is valid in both inputs. With
    /// `frac == 0` the result is an exact copy of `a`.
    pub fn assign_lerp(&mut self, a: &MaskedField, b: &MaskedField, frac: f64) {
        debug_assert_eq!(a.shape, b.shape);
        self.shape = a.shape;
        if frac == 0.0 {
            self.values.clone_from(&a.values);
            self.valid.clone_from(&a.valid);
            return;
        }
        self.values.resize(a.values.len(), 0.0);
        self.valid.resize(a.valid.len(), false);
        for k in 0..a.values.len() {
            if a.valid[k] && b.valid[k] {
                self.values[k] = (1.0 - frac) * a.values[k] + frac * b.values[k];
                self.valid[k] = true;
            } else {
                self.values[k] = 0.0;
                self.valid[k] = false;
            }
        }
    }

    /// Raw value buffer; entries of missing cells are meaningless.
    #[inline]
    pub fn raw_values(&self) -> &[f64] {
        &self.values
    }

    /// Values with missing cells replaced by `fill`.
    pub fn to_filled(&self, fill: f64) -> Vec<f64> {
        self.values
            .iter()
            .zip(self.valid.iter())
            .map(|(&v, &ok)| if ok { v } else { fill })
            .collect()
    }
}

fn check_len(what: &'static str, shape: GridShape, found: usize) -> Result<()> {
    if found != shape.n_cells() {
        return Err(NpzbError::LengthMismatch {
            what,
            expected: shape.n_cells(),
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_value_check() {
        assert!(is_valid_f64(10.0));
        assert!(is_valid_f64(-5.0));
        assert!(!is_valid_f64(f64::NAN));
        assert!(!is_valid_f64(f64::INFINITY));
        assert!(!is_valid_f64(FILL_VALUE_F64));
    }

    #[test]
    fn test_from_raw_masks_land_and_sentinels() {
        let shape = GridShape::new(2, 3);
        let mut mask = SeaMask::all_sea(shape);
        mask.set_sea(0, 0, false);
        let raw = [0.1, 0.2, 1.0e4, f64::NAN, -0.3, 0.4];
        let f = MaskedField::from_raw(&raw, &mask, VELOCITY_SENTINEL).unwrap();

        assert_eq!(f.get(0, 0), None); // land
        assert_eq!(f.get(0, 1), Some(0.2));
        assert_eq!(f.get(0, 2), None); // sentinel
        assert_eq!(f.get(1, 0), None); // NaN
        assert_eq!(f.get(1, 1), Some(-0.3));
        assert_eq!(f.valid_count(), 3);
    }

    #[test]
    fn test_value_or_substitutes_fallback() {
        let mut f = MaskedField::constant(GridShape::new(2, 2), 1.5);
        f.set_missing(1, 0);
        assert_eq!(f.value_or(0, 0, -9.0), 1.5);
        assert_eq!(f.value_or(1, 0, -9.0), -9.0);
    }

    #[test]
    fn test_mean_valid() {
        let mut f = MaskedField::constant(GridShape::new(1, 4), 2.0);
        f.set(0, 1, 4.0);
        f.set_missing(0, 3);
        assert_eq!(f.mean_valid(), Some(8.0 / 3.0));
        assert_eq!(MaskedField::missing(GridShape::new(2, 2)).mean_valid(), None);
    }

    #[test]
    fn test_lerp_validity_requires_both() {
        let shape = GridShape::new(1, 2);
        let a = MaskedField::constant(shape, 1.0);
        let mut b = MaskedField::constant(shape, 3.0);
        b.set_missing(0, 1);

        let mut out = MaskedField::missing(shape);
        out.assign_lerp(&a, &b, 0.5);
        assert_eq!(out.get(0, 0), Some(2.0));
        assert_eq!(out.get(0, 1), None);

        // frac = 0 is an exact copy of the first sample
        out.assign_lerp(&a, &b, 0.0);
        assert_eq!(out, a);
    }

    #[test]
    fn test_to_filled() {
        let mut f = MaskedField::constant(GridShape::new(1, 2), 0.5);
        f.set_missing(0, 0);
        assert_eq!(f.to_filled(FILL_VALUE_F64), vec![FILL_VALUE_F64, 0.5]);
    }
}
