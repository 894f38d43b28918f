//! Typed-table projection of data sets.
//!
//! Decoded data set cells are widened native values. Projection narrows each column back to the storage width implied
//! by its declared type, so an `Int16` column becomes a column of `i16`. A cell that does not fit fails the projection
//! instead of being truncated.

use crate::{
    catalog::{self, DataType},
    dataset::DataSet,
    error::{CodecError, ColumnCastFailed, UnsupportedColumnType},
    value::Value,
};

/// Storage type of a table column.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ColumnarType {
    /// Signed 8-bit integers.
    Int8,
    /// Signed 16-bit integers.
    Int16,
    /// Signed 32-bit integers.
    Int32,
    /// Signed 64-bit integers.
    Int64,
    /// Unsigned 8-bit integers.
    UInt8,
    /// Unsigned 16-bit integers.
    UInt16,
    /// Unsigned 32-bit integers.
    UInt32,
    /// Unsigned 64-bit integers.
    UInt64,
    /// Single precision floats.
    Float32,
    /// Double precision floats.
    Float64,
    /// Booleans.
    Boolean,
    /// UTF-8 strings.
    Utf8,
    /// Milliseconds since the Unix epoch.
    Timestamp,
    /// Byte sequences.
    Binary,
}

/// Values of a single column. Every cell is nullable.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    /// Signed 8-bit integers.
    Int8(Vec<Option<i8>>),
    /// Signed 16-bit integers.
    Int16(Vec<Option<i16>>),
    /// Signed 32-bit integers.
    Int32(Vec<Option<i32>>),
    /// Signed 64-bit integers.
    Int64(Vec<Option<i64>>),
    /// Unsigned 8-bit integers.
    UInt8(Vec<Option<u8>>),
    /// Unsigned 16-bit integers.
    UInt16(Vec<Option<u16>>),
    /// Unsigned 32-bit integers.
    UInt32(Vec<Option<u32>>),
    /// Unsigned 64-bit integers.
    UInt64(Vec<Option<u64>>),
    /// Single precision floats.
    Float32(Vec<Option<f32>>),
    /// Double precision floats.
    Float64(Vec<Option<f64>>),
    /// Booleans.
    Boolean(Vec<Option<bool>>),
    /// UTF-8 strings.
    Utf8(Vec<Option<String>>),
    /// Milliseconds since the Unix epoch.
    Timestamp(Vec<Option<u64>>),
    /// Byte sequences.
    Binary(Vec<Option<Vec<u8>>>),
}

impl ColumnData {
    /// Returns the storage type of the column.
    pub fn columnar_type(&self) -> ColumnarType {
        match self {
            Self::Int8(_) => ColumnarType::Int8,
            Self::Int16(_) => ColumnarType::Int16,
            Self::Int32(_) => ColumnarType::Int32,
            Self::Int64(_) => ColumnarType::Int64,
            Self::UInt8(_) => ColumnarType::UInt8,
            Self::UInt16(_) => ColumnarType::UInt16,
            Self::UInt32(_) => ColumnarType::UInt32,
            Self::UInt64(_) => ColumnarType::UInt64,
            Self::Float32(_) => ColumnarType::Float32,
            Self::Float64(_) => ColumnarType::Float64,
            Self::Boolean(_) => ColumnarType::Boolean,
            Self::Utf8(_) => ColumnarType::Utf8,
            Self::Timestamp(_) => ColumnarType::Timestamp,
            Self::Binary(_) => ColumnarType::Binary,
        }
    }

    /// Returns the number of cells in the column.
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Utf8(v) => v.len(),
            Self::Timestamp(v) => v.len(),
            Self::Binary(v) => v.len(),
        }
    }

    /// Returns `true` if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named, typed column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    datatype: DataType,
    data: ColumnData,
}

impl Column {
    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared Sparkplug type of the column.
    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    /// Returns the column values.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }
}

/// A columnar table projected from a data set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Projects a data set into a typed table.
    ///
    /// # Errors
    ///
    /// If a cell does not fit the storage width of its column, [`CodecError::ColumnCastFailed`] is returned.
    pub fn from_dataset(dataset: &DataSet) -> Result<Self, CodecError> {
        let mut columns = Vec::with_capacity(dataset.num_columns());
        for (index, (name, datatype)) in dataset.columns().iter().zip(dataset.types()).enumerate() {
            let entry = catalog::resolve(*datatype)?;
            let Some(columnar) = entry.columnar else {
                return UnsupportedColumnType {
                    column: index,
                    datatype: *datatype,
                }
                .fail();
            };

            let cells = dataset.rows().iter().map(|row| &row[index]);
            let data = project(columnar, cells).map_err(|reason| {
                ColumnCastFailed {
                    column: name.clone(),
                    requested: columnar,
                    reason,
                }
                .build()
            })?;
            columns.push(Column {
                name: name.clone(),
                datatype: *datatype,
                data,
            });
        }

        Ok(Self {
            columns,
            num_rows: dataset.num_rows(),
        })
    }

    /// Returns the columns, in data set order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column with the given name, if any.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Returns the column names, in data set order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

fn cast_column<'a, T, I, F>(cells: I, mut cast: F) -> Result<Vec<Option<T>>, String>
where
    I: Iterator<Item = &'a Value>,
    F: FnMut(&'a Value) -> Option<T>,
{
    cells
        .enumerate()
        .map(|(row, cell)| match cell {
            Value::Null => Ok(None),
            cell => cast(cell)
                .map(Some)
                .ok_or_else(|| format!("row {} holds {:?}, which does not fit", row, cell)),
        })
        .collect()
}

fn integer<T: TryFrom<i128>>(cell: &Value) -> Option<T> {
    cell.as_integer().and_then(|n| T::try_from(n).ok())
}

fn project<'a, I>(columnar: ColumnarType, cells: I) -> Result<ColumnData, String>
where
    I: Iterator<Item = &'a Value>,
{
    Ok(match columnar {
        ColumnarType::Int8 => ColumnData::Int8(cast_column(cells, integer)?),
        ColumnarType::Int16 => ColumnData::Int16(cast_column(cells, integer)?),
        ColumnarType::Int32 => ColumnData::Int32(cast_column(cells, integer)?),
        ColumnarType::Int64 => ColumnData::Int64(cast_column(cells, integer)?),
        ColumnarType::UInt8 => ColumnData::UInt8(cast_column(cells, integer)?),
        ColumnarType::UInt16 => ColumnData::UInt16(cast_column(cells, integer)?),
        ColumnarType::UInt32 => ColumnData::UInt32(cast_column(cells, integer)?),
        ColumnarType::UInt64 => ColumnData::UInt64(cast_column(cells, integer)?),
        ColumnarType::Timestamp => ColumnData::Timestamp(cast_column(cells, integer)?),
        ColumnarType::Float32 => ColumnData::Float32(cast_column(cells, |cell| match cell {
            Value::Float(f) => Some(*f),
            // Only exactly representable doubles narrow.
            Value::Double(d) if f64::from(*d as f32) == *d || d.is_nan() => Some(*d as f32),
            _ => None,
        })?),
        ColumnarType::Float64 => ColumnData::Float64(cast_column(cells, Value::as_f64)?),
        ColumnarType::Boolean => ColumnData::Boolean(cast_column(cells, Value::as_bool)?),
        ColumnarType::Utf8 => ColumnData::Utf8(cast_column(cells, |cell| cell.as_str().map(str::to_string))?),
        ColumnarType::Binary => ColumnData::Binary(cast_column(cells, |cell| cell.as_bytes().map(<[u8]>::to_vec))?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataSetBuilder;

    #[test]
    fn narrows_to_declared_widths() {
        let dataset = DataSetBuilder::new(
            ["idx", "level", "ok", "label", "at"],
            [
                DataType::Int32,
                DataType::Float,
                DataType::Boolean,
                DataType::String,
                DataType::DateTime,
            ],
        )
        .unwrap()
        .with_row(vec![Value::Int(0), Value::Float(0.5), Value::Boolean(true), "a".into(), Value::UInt(10)])
        .unwrap()
        .with_row(vec![Value::Int(1), Value::Null, Value::Boolean(false), Value::Null, Value::UInt(20)])
        .unwrap()
        .build();

        let table = Table::from_dataset(&dataset).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["idx", "level", "ok", "label", "at"]);
        assert_eq!(table.columns()[0].data(), &ColumnData::Int32(vec![Some(0), Some(1)]));
        assert_eq!(table.column("level").unwrap().data(), &ColumnData::Float32(vec![Some(0.5), None]));
        assert_eq!(table.column("ok").unwrap().data(), &ColumnData::Boolean(vec![Some(true), Some(false)]));
        assert_eq!(
            table.column("label").unwrap().data(),
            &ColumnData::Utf8(vec![Some("a".to_string()), None])
        );
        assert_eq!(table.column("at").unwrap().data(), &ColumnData::Timestamp(vec![Some(10), Some(20)]));
        assert_eq!(table.column("at").unwrap().datatype(), DataType::DateTime);
    }

    #[test]
    fn values_that_do_not_fit_fail_the_cast() {
        // Decoding does not range check narrow integers, so a decoded data set can hold them.
        let dataset = DataSet::from_parts(
            vec!["small".to_string()],
            vec![DataType::Int8],
            vec![vec![Value::Int(1)], vec![Value::Int(300)]],
        );

        match Table::from_dataset(&dataset) {
            Err(CodecError::ColumnCastFailed {
                column,
                requested,
                reason,
                ..
            }) => {
                assert_eq!(column, "small");
                assert_eq!(requested, ColumnarType::Int8);
                assert!(reason.contains("row 1"), "{}", reason);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn lossy_float_narrowing_fails() {
        let dataset = DataSet::from_parts(
            vec!["f".to_string()],
            vec![DataType::Float],
            vec![vec![Value::Double(0.5)], vec![Value::Double(0.1)]],
        );
        assert!(matches!(
            Table::from_dataset(&dataset),
            Err(CodecError::ColumnCastFailed { .. })
        ));
    }

    #[test]
    fn binary_columns() {
        let dataset = DataSetBuilder::new(["blob"], [DataType::Bytes])
            .unwrap()
            .with_row(vec![Value::Bytes(vec![1, 2, 3])])
            .unwrap()
            .build();

        let table = Table::from_dataset(&dataset).unwrap();
        assert_eq!(table.columns()[0].data(), &ColumnData::Binary(vec![Some(vec![1, 2, 3])]));
        assert_eq!(table.columns()[0].data().columnar_type(), ColumnarType::Binary);
        assert_eq!(table.columns()[0].data().len(), 1);
    }
}
