use crate::error::FalseDbError;
use crate::spi::{ExecResult, Rows, RowsColumnTypes};
use crate::types::{Value, ValueKind};

/// Cursor that is exhausted before it starts.
#[derive(Debug, Default)]
pub struct FalseRows {
    closed: bool,
}

impl FalseRows {
    #[must_use]
    pub fn new() -> Self {
        Self { closed: false }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Rows for FalseRows {
    fn columns(&self) -> Vec<String> {
        Vec::new()
    }

    fn close(&mut self) -> Result<(), FalseDbError> {
        self.closed = true;
        Ok(())
    }

    // `dest` is left untouched, closed or not.
    fn next(&mut self, _dest: &mut [Value]) -> Result<bool, FalseDbError> {
        Ok(false)
    }

    fn as_column_types(&self) -> Option<&dyn RowsColumnTypes> {
        Some(self)
    }
}

/// There are no columns, so every answer is a constant.
impl RowsColumnTypes for FalseRows {
    fn scan_type(&self, _index: usize) -> Option<ValueKind> {
        None
    }

    fn database_type_name(&self, _index: usize) -> &str {
        "NULL"
    }

    fn nullable(&self, _index: usize) -> Option<bool> {
        Some(true)
    }

    fn precision_scale(&self, _index: usize) -> Option<(i64, i64)> {
        Some((0, 0))
    }

    fn length(&self, _index: usize) -> Option<i64> {
        Some(0)
    }
}

/// Outcome of every exec: nothing affected, nothing generated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FalseResult;

impl ExecResult for FalseResult {
    fn last_insert_id(&self) -> Result<i64, FalseDbError> {
        Ok(0)
    }

    fn rows_affected(&self) -> Result<i64, FalseDbError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::Capability;

    #[test]
    fn next_always_signals_end_of_data() {
        let mut rows = FalseRows::new();
        let mut dest = vec![Value::Int(7)];
        for _ in 0..3 {
            assert_eq!(rows.next(&mut dest), Ok(false));
        }
        assert_eq!(dest, vec![Value::Int(7)]);
        assert!(rows.columns().is_empty());
    }

    #[test]
    fn close_sets_flag_and_is_idempotent() {
        let mut rows = FalseRows::new();
        assert!(!rows.is_closed());
        assert!(rows.close().is_ok());
        assert!(rows.close().is_ok());
        assert!(rows.is_closed());
        assert_eq!(rows.next(&mut []), Ok(false));
    }

    #[test]
    fn column_types_are_constant() {
        let rows = FalseRows::new();
        assert!(rows.supports(Capability::RowsColumnTypes));
        let types = rows.as_column_types().unwrap();
        assert_eq!(types.scan_type(0), None);
        assert_eq!(types.database_type_name(3), "NULL");
        assert_eq!(types.nullable(0), Some(true));
        assert_eq!(types.precision_scale(0), Some((0, 0)));
        assert_eq!(types.length(0), Some(0));
    }
}
