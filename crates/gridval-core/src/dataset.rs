//! Component tables and datasets.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::column::Column;
use crate::component::{ComponentType, DatasetKind};
use crate::error::{GridError, GridResult};
use crate::schema::{self, Dtype, FieldSpec};

/// All rows of one component type, one column per schema field.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTable {
    component: ComponentType,
    kind: DatasetKind,
    n_rows: usize,
    columns: Vec<Column>,
}

impl ComponentTable {
    /// Table of `n_rows` rows where every field is "not provided".
    pub fn initialize(
        component: ComponentType,
        kind: DatasetKind,
        n_rows: usize,
    ) -> GridResult<Self> {
        let columns = schema::fields(kind, component)?
            .iter()
            .map(|spec| Column::missing(spec.dtype, n_rows, spec.phases))
            .collect();
        Ok(Self {
            component,
            kind,
            n_rows,
            columns,
        })
    }

    pub fn component(&self) -> ComponentType {
        self.component
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn schema(&self) -> &'static [FieldSpec] {
        schema::fields(self.kind, self.component).unwrap_or(&[])
    }

    fn position(&self, field: &str) -> GridResult<usize> {
        self.schema()
            .iter()
            .position(|spec| spec.name == field)
            .ok_or_else(|| GridError::UnknownField {
                component: self.component,
                kind: self.kind,
                field: field.to_string(),
            })
    }

    /// Whether the schema of this table has `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.position(field).is_ok()
    }

    pub fn column(&self, field: &str) -> GridResult<&Column> {
        let i = self.position(field)?;
        Ok(&self.columns[i])
    }

    pub fn column_mut(&mut self, field: &str) -> GridResult<&mut Column> {
        let i = self.position(field)?;
        Ok(&mut self.columns[i])
    }

    /// Fields paired with their columns, in schema order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static FieldSpec, &Column)> {
        self.schema().iter().zip(self.columns.iter())
    }

    /// Object ids in row order; `None` where the id is not provided.
    pub fn ids(&self) -> Vec<Option<i32>> {
        match self.column("id") {
            Ok(col) => (0..self.n_rows)
                .map(|row| col.int(row).map(|id| id as i32))
                .collect(),
            Err(_) => vec![None; self.n_rows],
        }
    }

    fn check_column(&self, field: &str, dtype: Dtype, phases: usize, len: usize) -> GridResult<usize> {
        let i = self.position(field)?;
        let spec = &self.schema()[i];
        if spec.dtype != dtype {
            return Err(GridError::DtypeMismatch {
                component: self.component,
                field: field.to_string(),
                expected: spec.dtype,
                actual: dtype,
            });
        }
        if spec.phases != phases {
            return Err(GridError::ShapeMismatch {
                component: self.component,
                field: field.to_string(),
                reason: format!("expected {} phase(s), got {}", spec.phases, phases),
            });
        }
        if len != self.n_rows {
            return Err(GridError::ShapeMismatch {
                component: self.component,
                field: field.to_string(),
                reason: format!("expected {} rows, got {}", self.n_rows, len),
            });
        }
        Ok(i)
    }

    /// Set a scalar float field. NaN means "not provided".
    pub fn set_f64(&mut self, field: &str, values: &[f64]) -> GridResult<()> {
        let i = self.check_column(field, Dtype::Float64, 1, values.len())?;
        self.columns[i] = Column::from_f64(values.to_vec(), 1);
        Ok(())
    }

    /// Set a three-phase float field.
    pub fn set_f64_phases(&mut self, field: &str, values: &[[f64; 3]]) -> GridResult<()> {
        let i = self.check_column(field, Dtype::Float64, 3, values.len())?;
        self.columns[i] = Column::from_f64(values.iter().flatten().copied().collect(), 3);
        Ok(())
    }

    pub fn set_i32(&mut self, field: &str, values: &[Option<i32>]) -> GridResult<()> {
        let i = self.check_column(field, Dtype::Int32, 1, values.len())?;
        self.columns[i] = Column::from_i32(values.iter().copied());
        Ok(())
    }

    pub fn set_i8(&mut self, field: &str, values: &[Option<i8>]) -> GridResult<()> {
        let i = self.check_column(field, Dtype::Int8, 1, values.len())?;
        self.columns[i] = Column::from_i8(values.iter().copied());
        Ok(())
    }

    /// Builder form of [`ComponentTable::set_f64`].
    pub fn with_f64(mut self, field: &str, values: &[f64]) -> GridResult<Self> {
        self.set_f64(field, values)?;
        Ok(self)
    }

    pub fn with_f64_phases(mut self, field: &str, values: &[[f64; 3]]) -> GridResult<Self> {
        self.set_f64_phases(field, values)?;
        Ok(self)
    }

    pub fn with_i32(mut self, field: &str, values: &[i32]) -> GridResult<Self> {
        let values: Vec<_> = values.iter().copied().map(Some).collect();
        self.set_i32(field, &values)?;
        Ok(self)
    }

    pub fn with_i8(mut self, field: &str, values: &[i8]) -> GridResult<Self> {
        let values: Vec<_> = values.iter().copied().map(Some).collect();
        self.set_i8(field, &values)?;
        Ok(self)
    }

    pub fn with_optional_i32(mut self, field: &str, values: &[Option<i32>]) -> GridResult<Self> {
        self.set_i32(field, values)?;
        Ok(self)
    }

    pub fn with_optional_i8(mut self, field: &str, values: &[Option<i8>]) -> GridResult<Self> {
        self.set_i8(field, values)?;
        Ok(self)
    }

    /// New table made of the given rows, in order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            component: self.component,
            kind: self.kind,
            n_rows: rows.len(),
            columns: self.columns.iter().map(|c| c.select_rows(rows)).collect(),
        }
    }

    /// Contiguous row range `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let rows: Vec<usize> = (start..end).collect();
        self.select_rows(&rows)
    }

    /// Stack tables of the same component and kind vertically.
    pub fn concat(
        component: ComponentType,
        kind: DatasetKind,
        tables: &[&ComponentTable],
    ) -> GridResult<Self> {
        let mut out = Self::initialize(component, kind, 0)?;
        for table in tables {
            if table.kind != kind {
                return Err(GridError::DatasetKindMismatch {
                    expected: kind,
                    actual: table.kind,
                });
            }
            if table.component != component {
                return Err(GridError::UnknownComponent(table.component.to_string()));
            }
            for (dst, src) in out.columns.iter_mut().zip(&table.columns) {
                dst.extend_from(src);
            }
            out.n_rows += table.n_rows;
        }
        Ok(out)
    }

    /// Verify every column against the schema.
    pub fn check_structure(&self) -> GridResult<()> {
        let schema = schema::fields(self.kind, self.component)?;
        if schema.len() != self.columns.len() {
            return Err(GridError::ShapeMismatch {
                component: self.component,
                field: String::from("*"),
                reason: format!(
                    "expected {} columns, got {}",
                    schema.len(),
                    self.columns.len()
                ),
            });
        }
        for (spec, column) in schema.iter().zip(&self.columns) {
            if column.dtype() != spec.dtype {
                return Err(GridError::DtypeMismatch {
                    component: self.component,
                    field: spec.name.to_string(),
                    expected: spec.dtype,
                    actual: column.dtype(),
                });
            }
            if column.phases() != spec.phases || column.len() != self.n_rows * spec.phases {
                return Err(GridError::ShapeMismatch {
                    component: self.component,
                    field: spec.name.to_string(),
                    reason: format!(
                        "expected {} rows of {} phase(s), got {} entries",
                        self.n_rows,
                        spec.phases,
                        column.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Summary counts, handy for logging.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetStats {
    pub components: usize,
    pub rows: usize,
}

/// A set of component tables following one schema kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    kind: DatasetKind,
    tables: BTreeMap<ComponentType, ComponentTable>,
}

impl Dataset {
    pub fn new(kind: DatasetKind) -> Self {
        Self {
            kind,
            tables: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Add or replace the table of its component type.
    pub fn insert(&mut self, table: ComponentTable) -> GridResult<()> {
        if table.kind() != self.kind {
            return Err(GridError::DatasetKindMismatch {
                expected: self.kind,
                actual: table.kind(),
            });
        }
        self.tables.insert(table.component(), table);
        Ok(())
    }

    pub fn with_table(mut self, table: ComponentTable) -> GridResult<Self> {
        self.insert(table)?;
        Ok(self)
    }

    pub fn get(&self, component: ComponentType) -> Option<&ComponentTable> {
        self.tables.get(&component)
    }

    pub fn get_mut(&mut self, component: ComponentType) -> Option<&mut ComponentTable> {
        self.tables.get_mut(&component)
    }

    pub fn contains(&self, component: ComponentType) -> bool {
        self.tables.contains_key(&component)
    }

    /// Number of rows of `component`, zero when absent.
    pub fn n_rows(&self, component: ComponentType) -> usize {
        self.tables.get(&component).map_or(0, ComponentTable::n_rows)
    }

    pub fn components(&self) -> impl Iterator<Item = ComponentType> + '_ {
        self.tables.keys().copied()
    }

    pub fn tables(&self) -> impl Iterator<Item = &ComponentTable> {
        self.tables.values()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            components: self.tables.len(),
            rows: self.tables.values().map(ComponentTable::n_rows).sum(),
        }
    }

    /// Verify the dataset kind and every table against the schema registry.
    pub fn check_structure(&self, expected: DatasetKind) -> GridResult<()> {
        if self.kind != expected {
            return Err(GridError::DatasetKindMismatch {
                expected,
                actual: self.kind,
            });
        }
        for (component, table) in &self.tables {
            if table.kind() != self.kind {
                return Err(GridError::DatasetKindMismatch {
                    expected: self.kind,
                    actual: table.kind(),
                });
            }
            if table.component() != *component {
                return Err(GridError::UnknownComponent(table.component().to_string()));
            }
            table.check_structure()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> ComponentTable {
        ComponentTable::initialize(ComponentType::Line, DatasetKind::Input, 2)
            .unwrap()
            .with_i32("id", &[10, 11])
            .unwrap()
            .with_f64("r1", &[0.1, f64::NAN])
            .unwrap()
    }

    #[test]
    fn test_initialize_fills_sentinels() {
        let table = ComponentTable::initialize(ComponentType::Node, DatasetKind::Input, 3).unwrap();
        assert_eq!(table.ids(), vec![None, None, None]);
        assert!(table.column("u_rated").unwrap().is_missing(0, 0));
    }

    #[test]
    fn test_setters_check_schema() {
        let table = ComponentTable::initialize(ComponentType::Line, DatasetKind::Input, 2).unwrap();
        let err = table.clone().with_f64("u_rated", &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, GridError::UnknownField { .. }));
        let err = table.clone().with_i32("r1", &[1, 2]).unwrap_err();
        assert!(matches!(err, GridError::DtypeMismatch { .. }));
        let err = table.with_f64("r1", &[1.0]).unwrap_err();
        assert!(matches!(err, GridError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_phased_setter_rejects_scalar_field() {
        let table =
            ComponentTable::initialize(ComponentType::SymLoad, DatasetKind::Input, 1).unwrap();
        let err = table
            .with_f64_phases("p_specified", &[[1.0, 2.0, 3.0]])
            .unwrap_err();
        assert!(matches!(err, GridError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_concat_and_slice() {
        let table = lines();
        let both = ComponentTable::concat(
            ComponentType::Line,
            DatasetKind::Input,
            &[&table, &table.slice(1, 2)],
        )
        .unwrap();
        assert_eq!(both.n_rows(), 3);
        assert_eq!(both.ids(), vec![Some(10), Some(11), Some(11)]);
        assert!(both.check_structure().is_ok());
    }

    #[test]
    fn test_dataset_rejects_wrong_kind() {
        let update = ComponentTable::initialize(ComponentType::Line, DatasetKind::Update, 1).unwrap();
        let mut data = Dataset::new(DatasetKind::Input);
        assert!(matches!(
            data.insert(update),
            Err(GridError::DatasetKindMismatch { .. })
        ));
        data.insert(lines()).unwrap();
        assert!(data.check_structure(DatasetKind::Input).is_ok());
        assert!(data.check_structure(DatasetKind::Update).is_err());
        assert_eq!(data.n_rows(ComponentType::Line), 2);
        assert_eq!(data.n_rows(ComponentType::Node), 0);
    }
}
