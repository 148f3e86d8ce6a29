//! Column storage with a private "not provided" encoding.
//!
//! A [`Column`] holds one field of a component table, row-major with `phases`
//! values per row. Missing entries are stored as the dtype sentinel (NaN,
//! `i32::MIN`, `i8::MIN`) but every read goes through `Option`, so rule code
//! never compares against a sentinel directly.

use crate::schema::Dtype;

const MISSING_I32: i32 = i32::MIN;
const MISSING_I8: i8 = i8::MIN;

#[derive(Debug, Clone)]
enum ColumnData {
    Float64(Vec<f64>),
    Int32(Vec<i32>),
    Int8(Vec<i8>),
}

/// One field's values for every row of a table.
#[derive(Debug, Clone)]
pub struct Column {
    data: ColumnData,
    phases: usize,
}

impl Column {
    /// Column of `n_rows` rows with every entry missing.
    pub fn missing(dtype: Dtype, n_rows: usize, phases: usize) -> Self {
        let len = n_rows * phases;
        let data = match dtype {
            Dtype::Float64 => ColumnData::Float64(vec![f64::NAN; len]),
            Dtype::Int32 => ColumnData::Int32(vec![MISSING_I32; len]),
            Dtype::Int8 => ColumnData::Int8(vec![MISSING_I8; len]),
        };
        Self { data, phases }
    }

    pub(crate) fn from_f64(values: Vec<f64>, phases: usize) -> Self {
        Self {
            data: ColumnData::Float64(values),
            phases,
        }
    }

    pub(crate) fn from_i32(values: impl IntoIterator<Item = Option<i32>>) -> Self {
        Self {
            data: ColumnData::Int32(
                values
                    .into_iter()
                    .map(|v| v.unwrap_or(MISSING_I32))
                    .collect(),
            ),
            phases: 1,
        }
    }

    pub(crate) fn from_i8(values: impl IntoIterator<Item = Option<i8>>) -> Self {
        Self {
            data: ColumnData::Int8(values.into_iter().map(|v| v.unwrap_or(MISSING_I8)).collect()),
            phases: 1,
        }
    }

    pub fn dtype(&self) -> Dtype {
        match self.data {
            ColumnData::Float64(_) => Dtype::Float64,
            ColumnData::Int32(_) => Dtype::Int32,
            ColumnData::Int8(_) => Dtype::Int8,
        }
    }

    pub fn phases(&self) -> usize {
        self.phases
    }

    /// Number of stored entries (rows times phases).
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Float64(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_rows(&self) -> usize {
        if self.phases == 0 {
            0
        } else {
            self.len() / self.phases
        }
    }

    #[inline]
    fn index(&self, row: usize, phase: usize) -> usize {
        row * self.phases + phase
    }

    /// Value at `(row, phase)`; `None` when not provided.
    ///
    /// Infinite floats are returned as `Some`; use [`Column::is_infinite`] to
    /// single them out.
    pub fn value(&self, row: usize, phase: usize) -> Option<f64> {
        let i = self.index(row, phase);
        match &self.data {
            ColumnData::Float64(v) => v.get(i).copied().filter(|x| !x.is_nan()),
            ColumnData::Int32(v) => v
                .get(i)
                .copied()
                .filter(|x| *x != MISSING_I32)
                .map(f64::from),
            ColumnData::Int8(v) => v
                .get(i)
                .copied()
                .filter(|x| *x != MISSING_I8)
                .map(f64::from),
        }
    }

    /// Integer value of the first phase of `row`.
    ///
    /// Float columns yield the truncated value when it is finite.
    pub fn int(&self, row: usize) -> Option<i64> {
        match &self.data {
            ColumnData::Float64(v) => v
                .get(self.index(row, 0))
                .copied()
                .filter(|x| x.is_finite())
                .map(|x| x as i64),
            ColumnData::Int32(v) => v
                .get(self.index(row, 0))
                .copied()
                .filter(|x| *x != MISSING_I32)
                .map(i64::from),
            ColumnData::Int8(v) => v
                .get(self.index(row, 0))
                .copied()
                .filter(|x| *x != MISSING_I8)
                .map(i64::from),
        }
    }

    /// All phases of `row`.
    pub fn row_values(&self, row: usize) -> Vec<Option<f64>> {
        (0..self.phases).map(|p| self.value(row, p)).collect()
    }

    pub fn is_missing(&self, row: usize, phase: usize) -> bool {
        self.value(row, phase).is_none()
    }

    /// Whether any phase of `row` is missing.
    pub fn row_has_missing(&self, row: usize) -> bool {
        (0..self.phases).any(|p| self.is_missing(row, p))
    }

    pub fn is_infinite(&self, row: usize, phase: usize) -> bool {
        match &self.data {
            ColumnData::Float64(v) => v
                .get(self.index(row, phase))
                .is_some_and(|x| x.is_infinite()),
            ColumnData::Int32(_) | ColumnData::Int8(_) => false,
        }
    }

    /// Raw stored entry, sentinel included, as `f64`.
    ///
    /// Used by rules that compare values as stored (a missing entry differs
    /// from every value, itself included for floats).
    pub fn raw(&self, row: usize, phase: usize) -> f64 {
        let i = self.index(row, phase);
        match &self.data {
            ColumnData::Float64(v) => v.get(i).copied().unwrap_or(f64::NAN),
            ColumnData::Int32(v) => v.get(i).map_or(f64::NAN, |x| f64::from(*x)),
            ColumnData::Int8(v) => v.get(i).map_or(f64::NAN, |x| f64::from(*x)),
        }
    }

    /// Store `value` at `(row, phase)`; `None` writes the sentinel.
    ///
    /// Values are converted to the column dtype. Out-of-range rows are ignored.
    pub fn set(&mut self, row: usize, phase: usize, value: Option<f64>) {
        let i = self.index(row, phase);
        match &mut self.data {
            ColumnData::Float64(v) => {
                if let Some(slot) = v.get_mut(i) {
                    *slot = value.unwrap_or(f64::NAN);
                }
            }
            ColumnData::Int32(v) => {
                if let Some(slot) = v.get_mut(i) {
                    *slot = value.map_or(MISSING_I32, |x| x as i32);
                }
            }
            ColumnData::Int8(v) => {
                if let Some(slot) = v.get_mut(i) {
                    *slot = value.map_or(MISSING_I8, |x| x as i8);
                }
            }
        }
    }

    /// Replace missing entries with the matching entry of `source`.
    pub fn fill_missing_from(&mut self, source: &Column) {
        for row in 0..self.n_rows() {
            for phase in 0..self.phases {
                if self.is_missing(row, phase) {
                    let phase_src = phase.min(source.phases.saturating_sub(1));
                    self.set(row, phase, source.value(row, phase_src));
                }
            }
        }
    }

    /// Replace missing entries with a constant.
    pub fn fill_missing(&mut self, value: f64) {
        for row in 0..self.n_rows() {
            for phase in 0..self.phases {
                if self.is_missing(row, phase) {
                    self.set(row, phase, Some(value));
                }
            }
        }
    }

    /// Copy the provided entries of `source[src_row]` onto `self[dst_row]`.
    pub fn overlay_row(&mut self, dst_row: usize, source: &Column, src_row: usize) {
        for phase in 0..self.phases.min(source.phases) {
            if let Some(value) = source.value(src_row, phase) {
                self.set(dst_row, phase, Some(value));
            }
        }
    }

    /// New column made of the given rows, in order.
    pub fn select_rows(&self, rows: &[usize]) -> Column {
        let phases = self.phases;
        let pick = |row: &usize| (row * phases)..((row + 1) * phases);
        let data = match &self.data {
            ColumnData::Float64(v) => {
                ColumnData::Float64(rows.iter().flat_map(pick).map(|i| v[i]).collect())
            }
            ColumnData::Int32(v) => {
                ColumnData::Int32(rows.iter().flat_map(pick).map(|i| v[i]).collect())
            }
            ColumnData::Int8(v) => {
                ColumnData::Int8(rows.iter().flat_map(pick).map(|i| v[i]).collect())
            }
        };
        Column { data, phases }
    }

    /// Append the rows of `other`. Dtypes must match; callers check this.
    pub(crate) fn extend_from(&mut self, other: &Column) {
        match (&mut self.data, &other.data) {
            (ColumnData::Float64(a), ColumnData::Float64(b)) => a.extend_from_slice(b),
            (ColumnData::Int32(a), ColumnData::Int32(b)) => a.extend_from_slice(b),
            (ColumnData::Int8(a), ColumnData::Int8(b)) => a.extend_from_slice(b),
            _ => {}
        }
    }
}

/// Entry-wise equality where two missing entries compare equal.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        if self.phases != other.phases {
            return false;
        }
        match (&self.data, &other.data) {
            (ColumnData::Float64(a), ColumnData::Float64(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
            }
            (ColumnData::Int32(a), ColumnData::Int32(b)) => a == b,
            (ColumnData::Int8(a), ColumnData::Int8(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_reads_none() {
        let col = Column::missing(Dtype::Int8, 3, 1);
        assert_eq!(col.n_rows(), 3);
        assert!((0..3).all(|r| col.value(r, 0).is_none()));
        assert_eq!(col.int(1), None);
    }

    #[test]
    fn test_infinity_is_present_but_flagged() {
        let col = Column::from_f64(vec![1.0, f64::INFINITY, f64::NAN], 1);
        assert_eq!(col.value(1, 0), Some(f64::INFINITY));
        assert!(col.is_infinite(1, 0));
        assert!(!col.is_infinite(2, 0));
        assert!(col.is_missing(2, 0));
    }

    #[test]
    fn test_set_converts_to_dtype() {
        let mut col = Column::missing(Dtype::Int32, 2, 1);
        col.set(0, 0, Some(7.0));
        assert_eq!(col.int(0), Some(7));
        col.set(0, 0, None);
        assert_eq!(col.int(0), None);
    }

    #[test]
    fn test_fill_missing_keeps_present_values() {
        let mut col = Column::from_f64(vec![0.5, f64::NAN], 1);
        col.fill_missing(1.0);
        assert_eq!(col.value(0, 0), Some(0.5));
        assert_eq!(col.value(1, 0), Some(1.0));
    }

    #[test]
    fn test_overlay_skips_missing_phases() {
        let mut dst = Column::from_f64(vec![1.0, 2.0, 3.0], 3);
        let src = Column::from_f64(vec![f64::NAN, 20.0, f64::NAN], 3);
        dst.overlay_row(0, &src, 0);
        assert_eq!(dst.row_values(0), vec![Some(1.0), Some(20.0), Some(3.0)]);
    }

    #[test]
    fn test_select_and_extend_rows() {
        let col = Column::from_i8([Some(1), None, Some(3)]);
        let mut picked = col.select_rows(&[2, 0]);
        assert_eq!(picked.int(0), Some(3));
        assert_eq!(picked.int(1), Some(1));
        picked.extend_from(&col.select_rows(&[1]));
        assert_eq!(picked.n_rows(), 3);
        assert!(picked.is_missing(2, 0));
    }

    #[test]
    fn test_equality_treats_missing_as_equal() {
        let a = Column::from_f64(vec![f64::NAN, 1.0], 1);
        let b = Column::from_f64(vec![f64::NAN, 1.0], 1);
        assert_eq!(a, b);
        assert_ne!(a, Column::from_f64(vec![0.0, 1.0], 1));
    }
}
