// In-memory typed column store backing each archetype.
//
// Rows are addressed by string keys and stored densely; every column holds one
// cell per row at the same index. Removal swap-removes to keep columns packed.

use super::state::Vec2;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    F32,
    U64,
    Vec2,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    F32(f32),
    U64(u64),
    Vec2(Vec2),
    Text(String),
}

impl ColumnType {
    fn default_value(self) -> Value {
        match self {
            ColumnType::F32 => Value::F32(0.0),
            ColumnType::U64 => Value::U64(0),
            ColumnType::Vec2 => Value::Vec2(Vec2::ZERO),
            ColumnType::Text => Value::Text(String::new()),
        }
    }
}

/// Rust types that can be read from and written to a column.
pub trait Field: Sized {
    const TYPE: ColumnType;

    fn from_value(value: &Value) -> Option<Self>;
    fn into_value(self) -> Value;
}

impl Field for f32 {
    const TYPE: ColumnType = ColumnType::F32;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::F32(self)
    }
}

impl Field for u64 {
    const TYPE: ColumnType = ColumnType::U64;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::U64(self)
    }
}

impl Field for Vec2 {
    const TYPE: ColumnType = ColumnType::Vec2;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Vec2(self)
    }
}

impl Field for String {
    const TYPE: ColumnType = ColumnType::Text;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

/// Errors returned by column store access.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    UnknownRow(String),
    DuplicateRow(String),
    UnknownField(String),
    TypeMismatch {
        field: String,
        expected: ColumnType,
        found: ColumnType,
    },
}

#[derive(Debug, Clone)]
struct Column {
    ty: ColumnType,
    cells: Vec<Value>,
}

type Columns = HashMap<&'static str, Column>;

#[derive(Debug, Clone, Default)]
pub struct ColumnStore {
    columns: Columns,
    row_keys: Vec<String>,
    row_index: HashMap<String, usize>,
}

impl ColumnStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, back-filling existing rows with the type's default.
    /// Re-adding a column with the same name is a no-op.
    pub fn add_column(&mut self, name: &'static str, ty: ColumnType) {
        let rows = self.row_keys.len();
        self.columns.entry(name).or_insert_with(|| Column {
            ty,
            cells: vec![ty.default_value(); rows],
        });
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).map(|c| c.ty)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.row_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty()
    }

    pub fn contains_row(&self, key: &str) -> bool {
        self.row_index.contains_key(key)
    }

    /// Inserts a row with default cells and returns a writer for it.
    pub fn insert_row(&mut self, key: impl Into<String>) -> Result<RowMut<'_>, StoreError> {
        let key = key.into();
        if self.row_index.contains_key(&key) {
            return Err(StoreError::DuplicateRow(key));
        }

        let index = self.row_keys.len();
        for column in self.columns.values_mut() {
            column.cells.push(column.ty.default_value());
        }
        self.row_index.insert(key.clone(), index);
        self.row_keys.push(key);

        Ok(RowMut {
            columns: &mut self.columns,
            key: &self.row_keys[index],
            index,
        })
    }

    /// Removes a row. Returns false if it was not present.
    pub fn remove_row(&mut self, key: &str) -> bool {
        let Some(index) = self.row_index.remove(key) else {
            return false;
        };

        for column in self.columns.values_mut() {
            column.cells.swap_remove(index);
        }
        self.row_keys.swap_remove(index);
        if let Some(moved) = self.row_keys.get(index) {
            self.row_index.insert(moved.clone(), index);
        }
        true
    }

    pub fn get<T: Field>(&self, key: &str, field: &str) -> Result<T, StoreError> {
        let index = self.index_of(key)?;
        read_cell(&self.columns, index, field)
    }

    pub fn set<T: Field>(&mut self, key: &str, field: &str, value: T) -> Result<(), StoreError> {
        let index = self.index_of(key)?;
        write_cell(&mut self.columns, index, field, value)
    }

    /// Read-only scan over every row.
    pub fn scan<F>(&self, mut f: F)
    where
        F: FnMut(RowRef<'_>),
    {
        for (index, key) in self.row_keys.iter().enumerate() {
            f(RowRef {
                columns: &self.columns,
                key,
                index,
            });
        }
    }

    /// Transactional scan: writes are staged and only committed if every row succeeds.
    pub fn update<F>(&mut self, mut f: F) -> Result<(), StoreError>
    where
        F: FnMut(&mut RowMut<'_>) -> Result<(), StoreError>,
    {
        let mut staged = self.columns.clone();
        for (index, key) in self.row_keys.iter().enumerate() {
            let mut row = RowMut {
                columns: &mut staged,
                key,
                index,
            };
            f(&mut row)?;
        }
        self.columns = staged;
        Ok(())
    }

    fn index_of(&self, key: &str) -> Result<usize, StoreError> {
        self.row_index
            .get(key)
            .copied()
            .ok_or_else(|| StoreError::UnknownRow(key.to_string()))
    }
}

fn column<'a>(
    columns: &'a Columns,
    field: &str,
    want: ColumnType,
) -> Result<&'a Column, StoreError> {
    let column = columns
        .get(field)
        .ok_or_else(|| StoreError::UnknownField(field.to_string()))?;
    if column.ty != want {
        return Err(StoreError::TypeMismatch {
            field: field.to_string(),
            expected: column.ty,
            found: want,
        });
    }
    Ok(column)
}

fn read_cell<T: Field>(columns: &Columns, index: usize, field: &str) -> Result<T, StoreError> {
    let column = column(columns, field, T::TYPE)?;
    column
        .cells
        .get(index)
        .and_then(T::from_value)
        .ok_or_else(|| StoreError::UnknownField(field.to_string()))
}

fn write_cell<T: Field>(
    columns: &mut Columns,
    index: usize,
    field: &str,
    value: T,
) -> Result<(), StoreError> {
    column(columns, field, T::TYPE)?;
    let cell = columns
        .get_mut(field)
        .and_then(|c| c.cells.get_mut(index))
        .ok_or_else(|| StoreError::UnknownField(field.to_string()))?;
    *cell = value.into_value();
    Ok(())
}

/// Read view of one row during a scan.
pub struct RowRef<'a> {
    columns: &'a Columns,
    key: &'a str,
    index: usize,
}

impl RowRef<'_> {
    pub fn key(&self) -> &str {
        self.key
    }

    pub fn get<T: Field>(&self, field: &str) -> Result<T, StoreError> {
        read_cell(self.columns, self.index, field)
    }
}

/// Write access to one row, used by entity insertion and transactional scans.
pub struct RowMut<'a> {
    columns: &'a mut Columns,
    key: &'a str,
    index: usize,
}

impl RowMut<'_> {
    pub fn key(&self) -> &str {
        self.key
    }

    pub fn get<T: Field>(&self, field: &str) -> Result<T, StoreError> {
        read_cell(&*self.columns, self.index, field)
    }

    pub fn set<T: Field>(&mut self, field: &str, value: T) -> Result<(), StoreError> {
        write_cell(&mut *self.columns, self.index, field, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ColumnStore {
        let mut store = ColumnStore::new();
        store.add_column("position", ColumnType::Vec2);
        store.add_column("name", ColumnType::Text);
        store
    }

    #[test]
    fn when_row_inserted_then_cells_start_at_defaults() {
        let mut store = store();
        store.insert_row("1").expect("insert should succeed");

        assert_eq!(store.get::<Vec2>("1", "position"), Ok(Vec2::ZERO));
        assert_eq!(store.get::<String>("1", "name"), Ok(String::new()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn when_row_key_reused_then_returns_duplicate_row() {
        let mut store = store();
        store.insert_row("1").expect("insert should succeed");

        let err = store.insert_row("1").err();

        assert_eq!(err, Some(StoreError::DuplicateRow("1".to_string())));
    }

    #[test]
    fn when_field_type_differs_then_returns_type_mismatch() {
        let mut store = store();
        store.insert_row("1").expect("insert should succeed");

        let err = store.set("1", "position", 3.0_f32);

        assert!(matches!(err, Err(StoreError::TypeMismatch { .. })));
        assert_eq!(
            store.get::<f32>("1", "missing"),
            Err(StoreError::UnknownField("missing".to_string()))
        );
    }

    #[test]
    fn when_middle_row_removed_then_remaining_rows_keep_their_values() {
        let mut store = store();
        for key in ["a", "b", "c"] {
            let mut row = store.insert_row(key).expect("insert should succeed");
            row.set("name", key.to_string()).expect("set should succeed");
        }

        assert!(store.remove_row("a"));
        assert!(!store.remove_row("a"));

        assert_eq!(store.len(), 2);
        assert!(!store.contains_row("a"));
        assert_eq!(store.get::<String>("c", "name"), Ok("c".to_string()));
        assert_eq!(store.get::<String>("b", "name"), Ok("b".to_string()));
    }

    #[test]
    fn when_update_succeeds_then_every_row_is_committed() {
        let mut store = store();
        store.insert_row("a").expect("insert should succeed");
        store.insert_row("b").expect("insert should succeed");

        store
            .update(|row| row.set("position", Vec2::new(1.0, 2.0)))
            .expect("update should succeed");

        let mut seen = Vec::new();
        store.scan(|row| {
            seen.push((row.key().to_string(), row.get::<Vec2>("position")));
        });
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(_, p)| *p == Ok(Vec2::new(1.0, 2.0))));
    }

    #[test]
    fn when_update_fails_midway_then_no_row_is_changed() {
        let mut store = store();
        store.insert_row("a").expect("insert should succeed");
        store.insert_row("b").expect("insert should succeed");

        let result = store.update(|row| {
            row.set("position", Vec2::new(5.0, 5.0))?;
            if row.key() == "b" {
                return Err(StoreError::UnknownRow("b".to_string()));
            }
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(store.get::<Vec2>("a", "position"), Ok(Vec2::ZERO));
        assert_eq!(store.get::<Vec2>("b", "position"), Ok(Vec2::ZERO));
    }

    #[test]
    fn when_column_added_after_rows_then_rows_are_backfilled() {
        let mut store = store();
        store.insert_row("a").expect("insert should succeed");

        store.add_column("rotation", ColumnType::F32);

        assert_eq!(store.get::<f32>("a", "rotation"), Ok(0.0));
        assert_eq!(store.column_type("rotation"), Some(ColumnType::F32));
    }
}
