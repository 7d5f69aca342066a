//! Column configuration: a two level tree of groups and leaf columns.
//!
//! The tree is validated once in [`TableSchema::new`]. Afterwards the render
//! and sort code only deals with resolved [`Field`]s.

use tracing::debug;

use crate::domain::TVError;
use crate::person::{Field, Person, Value, total_visits};

#[derive(Debug, Clone, PartialEq)]
pub enum Footer {
    None,
    Text(String),
    /// Sum of the column over the whole record set.
    Total,
}

#[derive(Debug, Clone)]
pub struct LeafColumn {
    pub header: String,
    pub accessor: String,
    pub footer: Footer,
}

#[derive(Debug, Clone)]
pub enum Column {
    Leaf(LeafColumn),
    Group {
        header: String,
        footer: Footer,
        children: Vec<LeafColumn>,
    },
}

impl Column {
    pub fn leaf(header: &str, accessor: &str) -> LeafColumn {
        LeafColumn {
            header: header.to_string(),
            accessor: accessor.to_string(),
            footer: Footer::Text(header.to_string()),
        }
    }

    pub fn group(header: &str, children: Vec<LeafColumn>) -> Column {
        Column::Group {
            header: header.to_string(),
            footer: Footer::Text(header.to_string()),
            children,
        }
    }
}

impl LeafColumn {
    pub fn with_footer(mut self, footer: Footer) -> Self {
        self.footer = footer;
        self
    }
}

/// The Name / Info layout of the people table.
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::group(
            "Name",
            vec![
                Column::leaf("First Name", "firstName"),
                Column::leaf("Last Name", "lastName"),
            ],
        ),
        Column::group(
            "Info",
            vec![
                Column::leaf("Age", "age"),
                Column::leaf("Visits", "visits").with_footer(Footer::Total),
                Column::leaf("Status", "status"),
                Column::leaf("Profile Progress", "progress"),
            ],
        ),
    ]
}

/// A leaf column with its accessor resolved.
#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    pub header: String,
    pub field: Field,
    pub footer: Footer,
}

/// A cell of a header or footer row. `span` counts leaf columns.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub label: String,
    pub first_leaf: usize,
    pub span: usize,
    pub placeholder: bool,
    /// Only set for cells in the leaf row.
    pub leaf: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    leaves: Vec<ResolvedColumn>,
    header_groups: Vec<Vec<HeaderCell>>,
    group_footers: Vec<HeaderCell>,
}

impl TableSchema {
    pub fn new(columns: Vec<Column>) -> Result<Self, TVError> {
        let mut leaves = Vec::new();
        let mut group_row = Vec::new();
        let mut group_footers = Vec::new();
        let mut has_groups = false;

        for column in columns {
            let first_leaf = leaves.len();
            match column {
                Column::Leaf(leaf) => {
                    let label = leaf.header.clone();
                    leaves.push(Self::resolve(leaf)?);
                    group_row.push(HeaderCell::placeholder(first_leaf));
                    group_footers.push(HeaderCell::placeholder(first_leaf));
                    debug!("Top level column {label} at {first_leaf}");
                }
                Column::Group {
                    header,
                    footer,
                    children,
                } => {
                    if children.is_empty() {
                        return Err(TVError::EmptyGroup(header));
                    }
                    has_groups = true;
                    let span = children.len();
                    for child in children {
                        leaves.push(Self::resolve(child)?);
                    }
                    // Group footers are labels only, there is no field to total.
                    let footer_label = match footer {
                        Footer::Text(s) => s,
                        Footer::None | Footer::Total => String::new(),
                    };
                    group_row.push(HeaderCell {
                        label: header,
                        first_leaf,
                        span,
                        placeholder: false,
                        leaf: None,
                    });
                    group_footers.push(HeaderCell {
                        label: footer_label,
                        first_leaf,
                        span,
                        placeholder: false,
                        leaf: None,
                    });
                }
            }
        }

        let leaf_row = leaves
            .iter()
            .enumerate()
            .map(|(idx, leaf)| HeaderCell {
                label: leaf.header.clone(),
                first_leaf: idx,
                span: 1,
                placeholder: false,
                leaf: Some(idx),
            })
            .collect();

        let mut header_groups = Vec::new();
        if has_groups {
            header_groups.push(group_row);
        } else {
            group_footers.clear();
        }
        header_groups.push(leaf_row);

        debug!(
            "Table schema with {} columns and {} header rows",
            leaves.len(),
            header_groups.len()
        );
        Ok(Self {
            leaves,
            header_groups,
            group_footers,
        })
    }

    fn resolve(leaf: LeafColumn) -> Result<ResolvedColumn, TVError> {
        let field = Field::from_accessor(&leaf.accessor)?;
        if leaf.footer == Footer::Total && !field.is_numeric() {
            return Err(TVError::InvalidFooter {
                accessor: leaf.accessor,
            });
        }
        Ok(ResolvedColumn {
            header: leaf.header,
            field,
            footer: leaf.footer,
        })
    }

    pub fn leaves(&self) -> &[ResolvedColumn] {
        &self.leaves
    }

    pub fn leaf(&self, idx: usize) -> Option<&ResolvedColumn> {
        self.leaves.get(idx)
    }

    /// Header rows top-down: the group row (if any), then the leaf row.
    pub fn header_groups(&self) -> &[Vec<HeaderCell>] {
        &self.header_groups
    }

    /// Footer rows top-down: leaf footers first, then group footers.
    pub fn footer_groups(&self, people: &[Person]) -> Vec<Vec<HeaderCell>> {
        let leaf_row = self
            .leaves
            .iter()
            .enumerate()
            .map(|(idx, leaf)| HeaderCell {
                label: Self::footer_label(leaf, people),
                first_leaf: idx,
                span: 1,
                placeholder: false,
                leaf: Some(idx),
            })
            .collect();
        let mut rows = vec![leaf_row];
        if !self.group_footers.is_empty() {
            rows.push(self.group_footers.clone());
        }
        rows
    }

    fn footer_label(leaf: &ResolvedColumn, people: &[Person]) -> String {
        match &leaf.footer {
            Footer::None => String::new(),
            Footer::Text(s) => s.clone(),
            Footer::Total => {
                let total: u64 = match leaf.field {
                    Field::Visits => total_visits(people),
                    field => people
                        .iter()
                        .map(|p| match field.value(p) {
                            Value::Number(n) => n as u64,
                            Value::Text(_) => 0,
                        })
                        .sum(),
                };
                format!("Total: {total}")
            }
        }
    }
}

impl HeaderCell {
    fn placeholder(first_leaf: usize) -> Self {
        HeaderCell {
            label: String::new(),
            first_leaf,
            span: 1,
            placeholder: true,
            leaf: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::RelationshipStatus;

    fn people(visits: &[u32]) -> Vec<Person> {
        visits
            .iter()
            .enumerate()
            .map(|(i, &v)| Person {
                first_name: format!("P{i}"),
                last_name: "X".to_string(),
                age: i as u32,
                visits: v,
                progress: 1,
                status: RelationshipStatus::Complicated,
            })
            .collect()
    }

    #[test]
    fn default_layout_has_two_header_rows() {
        let schema = TableSchema::new(default_columns()).unwrap();
        let groups = schema.header_groups();
        assert_eq!(groups.len(), 2);

        let labels: Vec<(&str, usize)> = groups[0]
            .iter()
            .map(|c| (c.label.as_str(), c.span))
            .collect();
        assert_eq!(labels, vec![("Name", 2), ("Info", 4)]);

        let leaves: Vec<&str> = groups[1].iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            leaves,
            vec!["First Name", "Last Name", "Age", "Visits", "Status", "Profile Progress"]
        );
        assert_eq!(schema.leaf(3).map(|l| l.field), Some(Field::Visits));
    }

    #[test]
    fn unknown_accessor_fails_construction() {
        let columns = vec![Column::group("Info", vec![Column::leaf("Mail", "email")])];
        assert!(matches!(
            TableSchema::new(columns),
            Err(TVError::UnknownAccessor(a)) if a == "email"
        ));
    }

    #[test]
    fn total_footer_needs_numeric_field() {
        let columns = vec![Column::Leaf(
            Column::leaf("Status", "status").with_footer(Footer::Total),
        )];
        assert!(matches!(
            TableSchema::new(columns),
            Err(TVError::InvalidFooter { .. })
        ));
    }

    #[test]
    fn empty_group_is_rejected() {
        let columns = vec![Column::group("Nothing", vec![])];
        assert!(matches!(
            TableSchema::new(columns),
            Err(TVError::EmptyGroup(h)) if h == "Nothing"
        ));
    }

    #[test]
    fn top_level_leaf_gets_placeholder_in_group_row() {
        let columns = vec![
            Column::Leaf(Column::leaf("Age", "age")),
            Column::group("Name", vec![Column::leaf("First Name", "firstName")]),
        ];
        let schema = TableSchema::new(columns).unwrap();
        let group_row = &schema.header_groups()[0];
        assert!(group_row[0].placeholder);
        assert_eq!(group_row[1].label, "Name");
        assert_eq!(group_row[1].first_leaf, 1);
    }

    #[test]
    fn flat_layout_has_single_header_and_footer_row() {
        let columns = vec![
            Column::Leaf(Column::leaf("Age", "age")),
            Column::Leaf(Column::leaf("Visits", "visits").with_footer(Footer::Total)),
        ];
        let schema = TableSchema::new(columns).unwrap();
        assert_eq!(schema.header_groups().len(), 1);
        let footers = schema.footer_groups(&people(&[1, 2]));
        assert_eq!(footers.len(), 1);
        assert_eq!(footers[0][1].label, "Total: 3");
    }

    #[test]
    fn footer_totals_cover_every_record() {
        let schema = TableSchema::new(default_columns()).unwrap();
        // 25 records summing to 1000
        let footers = schema.footer_groups(&people(&[40; 25]));
        assert_eq!(footers.len(), 2);
        assert_eq!(footers[0][3].label, "Total: 1000");
        assert_eq!(footers[0][0].label, "First Name");
        assert_eq!(footers[1][0].label, "Name");
        assert_eq!(footers[1][1].label, "Info");
    }
}
