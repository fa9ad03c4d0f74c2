use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};

/// How the members of a [`LogicalList`] combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    #[default]
    Or,
    And,
}

/// A list of filter values tagged with AND or OR semantics
///
/// The textual form separates values with `,` for OR and `;` for AND.
/// Mixing both separators in one value is rejected. An empty list means
/// no filter at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalList<T> {
    values: Vec<T>,
    logic: Logic,
}

impl<T> Default for LogicalList<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            logic: Logic::Or,
        }
    }
}

impl<T> LogicalList<T> {
    pub fn any_of(values: Vec<T>) -> Self {
        Self {
            values,
            logic: Logic::Or,
        }
    }

    pub fn all_of(values: Vec<T>) -> Self {
        Self {
            values,
            logic: Logic::And,
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn logic(&self) -> Logic {
        self.logic
    }

    pub fn is_and(&self) -> bool {
        self.logic == Logic::And
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Convert every member, keeping the combining logic
    pub fn try_map<U, E>(
        &self,
        f: impl FnMut(&T) -> std::result::Result<U, E>,
    ) -> std::result::Result<LogicalList<U>, E> {
        Ok(LogicalList {
            values: self.values.iter().map(f).collect::<std::result::Result<_, _>>()?,
            logic: self.logic,
        })
    }
}

impl LogicalList<String> {
    pub fn parse(input: &str) -> Result<Self> {
        let has_or = input.contains(',');
        let has_and = input.contains(';');
        if has_or && has_and {
            return Err(CommonError::invalid_list(
                input,
                "cannot mix ',' (OR) and ';' (AND) in one value",
            ));
        }

        let (separator, logic) = if has_and { (';', Logic::And) } else { (',', Logic::Or) };
        let values = input
            .split(separator)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self { values, logic })
    }
}

impl<T> From<Vec<T>> for LogicalList<T> {
    fn from(values: Vec<T>) -> Self {
        Self::any_of(values)
    }
}

impl<'a, T> IntoIterator for &'a LogicalList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
