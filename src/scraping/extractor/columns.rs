//! Mapping table columns to their meaning
//!
//! Columns are identified by header label, so a reordered table still reads
//! correctly. Positions are only assumed when the table has no header.

use super::cursor::{NodeCursor, Role};

/// Meaning of a status table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    /// Completion bar; carries a percentage, not a count
    Status,
    Translated,
    Untranslated,
    NeedReview,
    Changed,
    Total,
    LastEdited,
    LastEditor,
}

impl Column {
    /// Classify a header label
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        let column = match label.as_str() {
            "template" | "templates" | "name" | "package" | "source package" => Column::Name,
            "status" => Column::Status,
            "translated" => Column::Translated,
            "total" | "strings" => Column::Total,
            "by" | "last editor" | "editor" => Column::LastEditor,
            _ if label.contains("untranslated") => Column::Untranslated,
            _ if label.contains("review") || label.contains("fuzzy") => Column::NeedReview,
            _ if label.contains("changed") => Column::Changed,
            _ if label.contains("edited") => Column::LastEdited,
            _ if label.contains("template") => Column::Name,
            _ => return None,
        };
        Some(column)
    }
}

/// Launchpad's column order, used when the table has no header row
const DEFAULT_LAYOUT: [Column; 8] = [
    Column::Name,
    Column::Status,
    Column::Untranslated,
    Column::NeedReview,
    Column::Changed,
    Column::Total,
    Column::LastEdited,
    Column::LastEditor,
];

/// Cell index of each known column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: Option<usize>,
    pub translated: Option<usize>,
    pub untranslated: Option<usize>,
    pub need_review: Option<usize>,
    pub changed: Option<usize>,
    pub total: Option<usize>,
    pub last_edited: Option<usize>,
    pub last_editor: Option<usize>,
}

impl ColumnMap {
    pub fn default_layout() -> Self {
        Self::from_columns(DEFAULT_LAYOUT.iter().copied().map(Some))
    }

    /// Resolve columns from the header cells of `table`.
    ///
    /// Falls back to [`ColumnMap::default_layout`] when there is no header or
    /// the header lacks a column the extractor needs.
    pub fn resolve(table: &NodeCursor<'_>) -> Self {
        let mut columns = Vec::new();
        for header in table.find_by_role(Role::HeaderCell) {
            let span = header
                .attr("colspan")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(1)
                .max(1);
            let column = Column::from_label(&header.text());
            columns.push(column);
            // Only the first cell under a spanning header carries the value
            columns.extend(std::iter::repeat(None).take(span - 1));
        }

        if columns.is_empty() {
            return Self::default_layout();
        }

        let map = Self::from_columns(columns);
        if map.is_complete() {
            map
        } else {
            tracing::debug!("Unrecognised status table header {:?}, using default layout", map);
            Self::default_layout()
        }
    }

    fn from_columns(columns: impl IntoIterator<Item = Option<Column>>) -> Self {
        let mut map = ColumnMap::default();
        for (index, column) in columns.into_iter().enumerate() {
            let slot = match column {
                Some(Column::Name) => &mut map.name,
                Some(Column::Translated) => &mut map.translated,
                Some(Column::Untranslated) => &mut map.untranslated,
                Some(Column::NeedReview) => &mut map.need_review,
                Some(Column::Changed) => &mut map.changed,
                Some(Column::Total) => &mut map.total,
                Some(Column::LastEdited) => &mut map.last_edited,
                Some(Column::LastEditor) => &mut map.last_editor,
                Some(Column::Status) | None => continue,
            };
            slot.get_or_insert(index);
        }
        map
    }

    /// Name, untranslated, need review and a way to get the translated count
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.untranslated.is_some()
            && self.need_review.is_some()
            && (self.translated.is_some() || self.total.is_some())
    }
}
