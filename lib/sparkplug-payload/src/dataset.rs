//! Data set codec.

use snafu::ensure;
use sparkplug_protos::{self as proto, data_set};

use crate::{
    catalog::{self, CatalogEntry, DataType},
    error::{CodecError, ShapeMismatch, UnsupportedColumnType},
    resolver::{self, Resolver, SlotRef},
    table::Table,
    value::Value,
};

/// A columnar table embedded in a metric.
///
/// Every row holds exactly one cell per column, and every cell either is null or matches its column's type. Cells
/// carry no type of their own.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSet {
    columns: Vec<String>,
    types: Vec<DataType>,
    rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Creates a new `DataSet` from column names, column types, and rows.
    ///
    /// # Errors
    ///
    /// If the column names and types differ in length, a column type cannot be held by cells, a row has the wrong
    /// number of cells, or a cell does not match its column's type, an error is returned.
    pub fn new<C, S, T, R>(columns: C, types: T, rows: R) -> Result<Self, CodecError>
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
        T: IntoIterator<Item = DataType>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        let mut builder = DataSetBuilder::new(columns, types)?;
        for row in rows {
            builder.add_row(row)?;
        }
        Ok(builder.build())
    }

    /// Creates a `DataSet` without checking its shape.
    pub(crate) fn from_parts(columns: Vec<String>, types: Vec<DataType>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, types, rows }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the column types.
    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the position of the column with the given name, if any.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns an iterator over the cells of the column with the given name, if any.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Projects the data set into a typed table.
    ///
    /// # Errors
    ///
    /// If a cell does not fit the storage width of its column, an error is returned.
    pub fn to_table(&self) -> Result<Table, CodecError> {
        Table::from_dataset(self)
    }
}

/// Builds a [`DataSet`] row by row.
///
/// Rows are checked against the column types as they are added, so a builder always holds a well-formed data set.
#[derive(Clone, Debug)]
pub struct DataSetBuilder {
    columns: Vec<String>,
    types: Vec<DataType>,
    entries: Vec<&'static CatalogEntry>,
    rows: Vec<Vec<Value>>,
}

impl DataSetBuilder {
    /// Creates a new `DataSetBuilder` with the given column names and types.
    ///
    /// # Errors
    ///
    /// If the column names and types differ in length, or a column type cannot be held by cells, an error is
    /// returned.
    pub fn new<C, S, T>(columns: C, types: T) -> Result<Self, CodecError>
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
        T: IntoIterator<Item = DataType>,
    {
        let columns = columns.into_iter().map(Into::into).collect::<Vec<String>>();
        let types = types.into_iter().collect::<Vec<_>>();
        ensure!(
            columns.len() == types.len(),
            ShapeMismatch {
                reason: format!("{} columns but {} column types", columns.len(), types.len()),
            }
        );

        let entries = types
            .iter()
            .enumerate()
            .map(|(index, datatype)| column_entry(index, *datatype))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            columns,
            types,
            entries,
            rows: Vec::new(),
        })
    }

    /// Appends a row.
    ///
    /// # Errors
    ///
    /// If the row has the wrong number of cells, or a cell does not match its column's type, an error is returned and
    /// the row is not added.
    pub fn add_row<I, V>(&mut self, row: I) -> Result<&mut Self, CodecError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let index = self.rows.len();
        let row = row.into_iter().map(Into::into).collect::<Vec<Value>>();
        check_row(&self.entries, &row).map_err(|e| e.at_index("rows", index))?;
        self.rows.push(row);
        Ok(self)
    }

    /// Appends a row, consuming and returning the builder.
    ///
    /// # Errors
    ///
    /// If the row has the wrong number of cells, or a cell does not match its column's type, an error is returned.
    pub fn with_row<I, V>(mut self, row: I) -> Result<Self, CodecError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add_row(row)?;
        Ok(self)
    }

    /// Returns the number of rows added so far.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Builds the data set.
    pub fn build(self) -> DataSet {
        DataSet::from_parts(self.columns, self.types, self.rows)
    }
}

fn column_entry(index: usize, datatype: DataType) -> Result<&'static CatalogEntry, CodecError> {
    let entry = catalog::resolve(datatype).map_err(|e| e.at_index("types", index))?;
    ensure!(
        entry.kind.is_columnar(),
        UnsupportedColumnType {
            column: index,
            datatype,
        }
    );
    Ok(entry)
}

fn check_row(entries: &[&CatalogEntry], row: &[Value]) -> Result<(), CodecError> {
    ensure!(
        row.len() == entries.len(),
        ShapeMismatch {
            reason: format!("row has {} cells but the data set has {} columns", row.len(), entries.len()),
        }
    );
    for (index, (entry, cell)) in entries.iter().zip(row).enumerate() {
        resolver::check_entry(entry, cell).map_err(|e| e.at(index))?;
    }
    Ok(())
}

impl Resolver<'_> {
    /// Decodes a data set.
    ///
    /// Column types are resolved once up front, then every row is resolved against them in a single pass. An empty
    /// cell decodes to null.
    ///
    /// # Errors
    ///
    /// If the column names, column types, declared column count, and row lengths disagree, a column type cannot be
    /// held by cells, or a cell does not match its column's type, an error is returned.
    pub fn decode_dataset(&self, dataset: &proto::DataSet) -> Result<DataSet, CodecError> {
        check_shape(dataset)?;

        let mut types = Vec::with_capacity(dataset.types.len());
        let mut entries = Vec::with_capacity(dataset.types.len());
        for (index, code) in dataset.types.iter().enumerate() {
            let datatype = DataType::try_from(*code).map_err(|e| e.at_index("types", index))?;
            entries.push(column_entry(index, datatype)?);
            types.push(datatype);
        }

        let mut rows = Vec::with_capacity(dataset.rows.len());
        for (row_index, row) in dataset.rows.iter().enumerate() {
            let cells = row
                .elements
                .iter()
                .zip(&entries)
                .enumerate()
                .map(|(index, (cell, entry))| match &cell.value {
                    None => Ok(Value::Null),
                    Some(value) => self
                        .decode_entry(entry, Some(SlotRef::from(value)))
                        .map_err(|e| e.at(index)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.at_index("rows", row_index))?;
            rows.push(cells);
        }

        Ok(DataSet::from_parts(dataset.columns.clone(), types, rows))
    }

    /// Encodes a data set.
    ///
    /// # Errors
    ///
    /// If a cell cannot be carried by a data set value, such as a non-null `Bytes` cell, an error is returned.
    pub fn encode_dataset(&self, dataset: &DataSet) -> Result<proto::DataSet, CodecError> {
        let entries = dataset
            .types
            .iter()
            .enumerate()
            .map(|(index, datatype)| column_entry(index, *datatype))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(dataset.rows.len());
        for (row_index, row) in dataset.rows.iter().enumerate() {
            check_row(&entries, row).map_err(|e| e.at_index("rows", row_index))?;

            let mut elements = Vec::with_capacity(row.len());
            for (index, (entry, cell)) in entries.iter().zip(row).enumerate() {
                let value = match self.encode_entry(entry, cell) {
                    Ok(None) => None,
                    Ok(Some(slot)) => match slot.into_dataset_value() {
                        Some(value) => Some(value),
                        None => {
                            let error = UnsupportedColumnType {
                                column: index,
                                datatype: entry.datatype,
                            }
                            .build();
                            return Err(error.at(index).at_index("rows", row_index));
                        }
                    },
                    Err(e) => return Err(e.at(index).at_index("rows", row_index)),
                };
                elements.push(data_set::DataSetValue { value });
            }
            rows.push(data_set::Row { elements });
        }

        Ok(proto::DataSet {
            num_of_columns: Some(dataset.columns.len() as u64),
            columns: dataset.columns.clone(),
            types: dataset.types.iter().map(|datatype| datatype.code()).collect(),
            rows,
        })
    }
}

/// Checks the column, type, and row-length parity of a data set message.
pub(crate) fn check_shape(dataset: &proto::DataSet) -> Result<(), CodecError> {
    let width = dataset.columns.len();
    ensure!(
        dataset.types.len() == width,
        ShapeMismatch {
            reason: format!("{} columns but {} column types", width, dataset.types.len()),
        }
    );
    if let Some(declared) = dataset.num_of_columns {
        ensure!(
            declared == width as u64,
            ShapeMismatch {
                reason: format!("{} columns declared but {} present", declared, width),
            }
        );
    }
    for (index, row) in dataset.rows.iter().enumerate() {
        if row.elements.len() != width {
            let error = ShapeMismatch {
                reason: format!("row has {} cells but the data set has {} columns", row.elements.len(), width),
            }
            .build();
            return Err(error.at_index("rows", index));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use data_set::data_set_value::Value as Cell;

    use super::*;
    use crate::config::CodecConfiguration;

    fn int_row(values: &[u32]) -> data_set::Row {
        data_set::Row {
            elements: values
                .iter()
                .map(|v| data_set::DataSetValue {
                    value: Some(Cell::IntValue(*v)),
                })
                .collect(),
        }
    }

    fn channels() -> proto::DataSet {
        proto::DataSet {
            num_of_columns: Some(5),
            columns: ["idx", "ch1", "ch2", "ch3", "ch4"].iter().map(|c| c.to_string()).collect(),
            types: vec![3, 2, 2, 2, 2],
            rows: vec![int_row(&[0, 1, 2, 3, 4]), int_row(&[1, 2, 3, 4, 5]), int_row(&[2, 3, 4, 5, 6])],
        }
    }

    fn decode(dataset: &proto::DataSet) -> Result<DataSet, CodecError> {
        let config = CodecConfiguration::default();
        Resolver::new(&config).decode_dataset(dataset)
    }

    #[test]
    fn decodes_rows_by_column_type() {
        let dataset = decode(&channels()).unwrap();

        assert_eq!(dataset.columns(), ["idx", "ch1", "ch2", "ch3", "ch4"]);
        assert_eq!(dataset.types()[0], DataType::Int32);
        assert_eq!(dataset.num_rows(), 3);
        assert_eq!(dataset.rows()[2], (2..7).map(Value::Int).collect::<Vec<_>>());
        assert_eq!(
            dataset.column("ch4").unwrap().cloned().collect::<Vec<_>>(),
            vec![Value::Int(4), Value::Int(5), Value::Int(6)]
        );
    }

    #[test]
    fn encodes_back_to_the_same_message() {
        let config = CodecConfiguration::default();
        let resolver = Resolver::new(&config);
        let dataset = resolver.decode_dataset(&channels()).unwrap();
        assert_eq!(resolver.encode_dataset(&dataset).unwrap(), channels());
    }

    #[test]
    fn column_and_type_counts_must_agree() {
        let mut message = channels();
        message.types.pop();
        assert!(matches!(decode(&message), Err(CodecError::ShapeMismatch { .. })));

        let mut message = channels();
        message.num_of_columns = Some(4);
        assert!(matches!(decode(&message), Err(CodecError::ShapeMismatch { .. })));
    }

    #[test]
    fn short_rows_are_rejected_with_their_index() {
        let mut message = channels();
        message.rows[1].elements.pop();

        let error = decode(&message).unwrap_err();
        assert!(matches!(error, CodecError::ShapeMismatch { .. }));
        assert_eq!(error.path().unwrap().to_string(), "rows[1]");
    }

    #[test]
    fn non_primitive_columns_are_unsupported() {
        let mut message = channels();
        message.types[2] = DataType::PropertySet.code();

        match decode(&message) {
            Err(CodecError::UnsupportedColumnType { column, datatype, .. }) => {
                assert_eq!(column, 2);
                assert_eq!(datatype, DataType::PropertySet);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn mistyped_cells_name_row_and_column() {
        let mut message = channels();
        message.rows[2].elements[3].value = Some(Cell::StringValue("three".into()));

        let error = decode(&message).unwrap_err();
        assert!(matches!(error, CodecError::TypeMismatch { .. }));
        assert_eq!(error.path().unwrap().to_string(), "rows[2][3]");
    }

    #[test]
    fn empty_cells_are_null() {
        let mut message = channels();
        message.rows[0].elements[1].value = None;

        let dataset = decode(&message).unwrap();
        assert_eq!(dataset.rows()[0][1], Value::Null);
    }

    #[test]
    fn builder_checks_rows_as_they_are_added() {
        let mut builder = DataSetBuilder::new(["idx", "temp"], [DataType::UInt8, DataType::Double]).unwrap();
        builder.add_row(vec![Value::UInt(1), Value::Double(20.5)]).unwrap();

        let error = builder.add_row(vec![Value::UInt(2)]).unwrap_err();
        assert!(matches!(error, CodecError::ShapeMismatch { .. }));

        let error = builder.add_row(vec![Value::UInt(256), Value::Double(1.0)]).unwrap_err();
        assert!(matches!(error, CodecError::ValueOutOfRange { .. }));
        assert_eq!(error.path().unwrap().to_string(), "rows[1][0]");

        assert_eq!(builder.num_rows(), 1);
        assert_eq!(builder.build().rows(), [vec![Value::UInt(1), Value::Double(20.5)]]);
    }

    #[test]
    fn builder_rejects_bad_columns() {
        assert!(matches!(
            DataSetBuilder::new(["a", "b"], [DataType::Int8]),
            Err(CodecError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            DataSetBuilder::new(["a"], [DataType::Template]),
            Err(CodecError::UnsupportedColumnType { .. })
        ));
        assert!(matches!(
            DataSetBuilder::new(["a"], [DataType::Unknown]),
            Err(CodecError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn bytes_cells_cannot_be_encoded() {
        let config = CodecConfiguration::default();
        let dataset = DataSet::new(["blob"], [DataType::Bytes], [vec![Value::Bytes(vec![1])]]).unwrap();

        let error = Resolver::new(&config).encode_dataset(&dataset).unwrap_err();
        assert!(matches!(error, CodecError::UnsupportedColumnType { column: 0, .. }));

        let empty = DataSet::new(["blob"], [DataType::Bytes], [vec![Value::Null]]).unwrap();
        assert!(Resolver::new(&config).encode_dataset(&empty).is_ok());
    }
}
