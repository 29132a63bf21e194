//! User selection: raw slider value and chosen column.
//!
//! The slider value is kept exactly as the control reported it.  Its valid
//! range depends on a forecast set that may not have arrived yet, so
//! clamping is left to whoever reads it against a concrete set.

use super::error::SelectionError;
use super::forecast::Column;

#[derive(Debug, Clone)]
pub struct SelectionState {
    index: i64,
    column: Column,
}

impl SelectionState {
    pub fn new(initial_column: Column) -> Self {
        Self {
            index: 0,
            column: initial_column,
        }
    }

    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Store the slider value verbatim.  Returns `true` if it changed.
    pub fn set_index(&mut self, raw: i64) -> bool {
        let changed = self.index != raw;
        self.index = raw;
        changed
    }

    /// Select `name`.
    ///
    /// While `known` is empty (column list not loaded yet) any name is
    /// accepted.  Once the list is known, names outside it are rejected and
    /// the current selection stays.  Returns `Ok(true)` if the selection
    /// changed.
    pub fn set_column(&mut self, name: Column, known: &[Column]) -> Result<bool, SelectionError> {
        if !known.is_empty() && !known.contains(&name) {
            return Err(SelectionError::UnknownColumn(name.to_string()));
        }
        if self.column == name {
            return Ok(false);
        }
        self.column = name;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_stored_verbatim() {
        let mut sel = SelectionState::new("Space economy".into());
        assert!(sel.set_index(12));
        assert_eq!(sel.index(), 12);
        assert!(sel.set_index(-4));
        assert_eq!(sel.index(), -4);
        assert!(!sel.set_index(-4));
    }

    #[test]
    fn defaults_to_initial_column() {
        let sel = SelectionState::new("Space economy".into());
        assert_eq!(sel.column().as_str(), "Space economy");
        assert_eq!(sel.index(), 0);
    }

    #[test]
    fn any_column_accepted_before_list_loads() {
        let mut sel = SelectionState::new("Space economy".into());
        assert_eq!(sel.set_column("Whatever".into(), &[]), Ok(true));
        assert_eq!(sel.column().as_str(), "Whatever");
    }

    #[test]
    fn unknown_column_rejected_once_list_known() {
        let mut sel = SelectionState::new("Space economy".into());
        let known = vec![Column::from("Space economy"), Column::from("Farms")];
        let err = sel.set_column("Mining".into(), &known).unwrap_err();
        assert_eq!(err, SelectionError::UnknownColumn("Mining".into()));
        assert_eq!(sel.column().as_str(), "Space economy");

        assert_eq!(sel.set_column("Farms".into(), &known), Ok(true));
        assert_eq!(sel.set_column("Farms".into(), &known), Ok(false));
    }
}
