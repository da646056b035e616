//! Table include/exclude filters.

/// A list of table names accepted by `include_tables` / `exclude_tables`.
///
/// Converts from a string of names separated by `", "` or whitespace, or
/// from any list of names. Names from a list are kept whole, so a table
/// whose name contains a space must be passed as a list. Empty names are
/// dropped.
///
/// # Example
/// ```rust
/// use dbdumper_core::config::TableList;
///
/// let from_str = TableList::from("users, orders");
/// let from_vec = TableList::from(vec!["users", "orders"]);
/// assert_eq!(from_str, from_vec);
/// assert_eq!(from_str.names(), ["users", "orders"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableList(Vec<String>);

impl TableList {
    fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .map(Into::into)
                .filter(|name: &String| !name.is_empty())
                .collect(),
        )
    }

    /// The table names in input order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// True when no names were given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for TableList {
    fn from(value: &str) -> Self {
        Self::from_names(value.split(", ").flat_map(str::split_whitespace))
    }
}

impl From<String> for TableList {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&String> for TableList {
    fn from(value: &String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Vec<String>> for TableList {
    fn from(value: Vec<String>) -> Self {
        Self::from_names(value)
    }
}

impl From<Vec<&str>> for TableList {
    fn from(value: Vec<&str>) -> Self {
        Self::from_names(value)
    }
}

impl From<&[&str]> for TableList {
    fn from(value: &[&str]) -> Self {
        Self::from_names(value.iter().copied())
    }
}

impl From<&[String]> for TableList {
    fn from(value: &[String]) -> Self {
        Self::from_names(value.iter().cloned())
    }
}

impl<const N: usize> From<[&str; N]> for TableList {
    fn from(value: [&str; N]) -> Self {
        Self::from_names(value)
    }
}

/// Which tables a dump covers. Include and exclude lists cannot coexist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TableFilter {
    /// Every table
    #[default]
    All,
    /// Only the listed tables
    Include(Vec<String>),
    /// Every table except the listed ones
    Exclude(Vec<String>),
}

impl TableFilter {
    /// Tables explicitly included, empty unless `Include`.
    pub fn included(&self) -> &[String] {
        match self {
            Self::Include(tables) => tables,
            _ => &[],
        }
    }

    /// Tables explicitly excluded, empty unless `Exclude`.
    pub fn excluded(&self) -> &[String] {
        match self {
            Self::Exclude(tables) => tables,
            _ => &[],
        }
    }
}
