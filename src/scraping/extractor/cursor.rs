//! Tolerant tree access over a parsed HTML document
//!
//! All CSS selectors the extractor depends on live in [`Role`]. The rest of
//! the extractor only asks for nodes by role or by text, so a markup change on
//! Launchpad is fixed here and in the column mapping, not in the aggregation
//! code.

use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Structural roles on a Launchpad translation status page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The per-template statistics table
    StatsTable,
    Table,
    HeaderCell,
    /// Template rows carry an id on Launchpad
    DataRow,
    /// Used when no row has an id
    BodyRow,
    Cell,
    Link,
    /// Hidden sortable value inside a count cell
    SortKey,
    Time,
    BatchNavigation,
}

const STATS_TABLE: &str = "table.translation-stats";
const TABLE: &str = "table";
const HEADER_CELL: &str = "th";
const DATA_ROW: &str = "tr[id]";
const BODY_ROW: &str = "tbody tr";
const CELL: &str = "td";
const LINK: &str = "a[href]";
const SORT_KEY: &str = "span.sortkey";
const TIME: &str = "time";
const BATCH_NAVIGATION: &str = ".batch-navigation-index";

struct Selectors {
    stats_table: Selector,
    table: Selector,
    header_cell: Selector,
    data_row: Selector,
    body_row: Selector,
    cell: Selector,
    link: Selector,
    sort_key: Selector,
    time: Selector,
    batch_navigation: Selector,
}

fn compile(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        stats_table: compile(STATS_TABLE),
        table: compile(TABLE),
        header_cell: compile(HEADER_CELL),
        data_row: compile(DATA_ROW),
        body_row: compile(BODY_ROW),
        cell: compile(CELL),
        link: compile(LINK),
        sort_key: compile(SORT_KEY),
        time: compile(TIME),
        batch_navigation: compile(BATCH_NAVIGATION),
    })
}

impl Role {
    fn selector(self) -> &'static Selector {
        let s = selectors();
        match self {
            Role::StatsTable => &s.stats_table,
            Role::Table => &s.table,
            Role::HeaderCell => &s.header_cell,
            Role::DataRow => &s.data_row,
            Role::BodyRow => &s.body_row,
            Role::Cell => &s.cell,
            Role::Link => &s.link,
            Role::SortKey => &s.sort_key,
            Role::Time => &s.time,
            Role::BatchNavigation => &s.batch_navigation,
        }
    }

    fn tag(self) -> Option<&'static str> {
        match self {
            Role::StatsTable | Role::Table => Some("table"),
            Role::DataRow | Role::BodyRow => Some("tr"),
            Role::Cell => Some("td"),
            Role::HeaderCell => Some("th"),
            _ => None,
        }
    }
}

/// Parsed document
pub struct DocumentCursor {
    html: Html,
}

impl DocumentCursor {
    pub fn parse(raw_html: &str) -> Self {
        Self {
            html: Html::parse_document(raw_html),
        }
    }

    pub fn root(&self) -> NodeCursor<'_> {
        NodeCursor {
            element: self.html.root_element(),
        }
    }

    pub fn find_by_role(&self, role: Role) -> impl Iterator<Item = NodeCursor<'_>> {
        self.html
            .select(role.selector())
            .map(|element| NodeCursor { element })
    }

    /// First node with `role` whose text contains `needle`, ignoring case
    pub fn find_by_text(&self, role: Role, needle: &str) -> Option<NodeCursor<'_>> {
        self.root().find_by_text(role, needle)
    }
}

/// A position inside a [`DocumentCursor`]
#[derive(Clone, Copy)]
pub struct NodeCursor<'a> {
    element: ElementRef<'a>,
}

impl<'a> NodeCursor<'a> {
    pub fn find_by_role(&self, role: Role) -> impl Iterator<Item = NodeCursor<'a>> + 'a {
        self.element
            .select(role.selector())
            .map(|element| NodeCursor { element })
    }

    pub fn first_by_role(&self, role: Role) -> Option<NodeCursor<'a>> {
        self.find_by_role(role).next()
    }

    pub fn find_by_text(&self, role: Role, needle: &str) -> Option<NodeCursor<'a>> {
        let needle = needle.to_lowercase();
        self.find_by_role(role)
            .find(|node| node.text().to_lowercase().contains(&needle))
    }

    /// Nearest ancestor with the tag of `role`
    pub fn closest(&self, role: Role) -> Option<NodeCursor<'a>> {
        let tag = role.tag()?;
        self.element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == tag)
            .map(|element| NodeCursor { element })
    }

    /// Text content with entities decoded and whitespace collapsed
    pub fn text(&self) -> String {
        let raw: String = self.element.text().collect();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.element.value().classes().any(|c| c == class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <table class="layout"><tr><td>
            <table id="stats">
              <thead><tr><th>Template</th><th>Untranslated &amp; more</th></tr></thead>
              <tbody>
                <tr id="a"><td><a href="/x">  gedit </a></td><td><span class="sortkey">4</span><b>4</b></td></tr>
              </tbody>
            </table>
          </td></tr></table>
        </body></html>
    "#;

    const ROLES: [Role; 10] = [
        Role::StatsTable,
        Role::Table,
        Role::HeaderCell,
        Role::DataRow,
        Role::BodyRow,
        Role::Cell,
        Role::Link,
        Role::SortKey,
        Role::Time,
        Role::BatchNavigation,
    ];

    #[test]
    fn test_every_role_selector_compiles() {
        for css in [
            STATS_TABLE,
            TABLE,
            HEADER_CELL,
            DATA_ROW,
            BODY_ROW,
            CELL,
            LINK,
            SORT_KEY,
            TIME,
            BATCH_NAVIGATION,
        ] {
            assert!(Selector::parse(css).is_ok(), "{css:?} does not parse");
        }

        let doc = DocumentCursor::parse(PAGE);
        for role in ROLES {
            let _ = role.selector();
            if let Some(tag) = role.tag() {
                for node in doc.find_by_role(role) {
                    assert_eq!(node.element.value().name(), tag, "{role:?}");
                }
            }
        }
    }

    #[test]
    fn test_find_by_text_and_closest() {
        let doc = DocumentCursor::parse(PAGE);
        let header = doc.find_by_text(Role::HeaderCell, "UNTRANSLATED").unwrap();
        assert_eq!(header.text(), "Untranslated & more");

        let table = header.closest(Role::Table).unwrap();
        assert_eq!(table.attr("id"), Some("stats"));
    }

    #[test]
    fn test_nested_lookup_and_text() {
        let doc = DocumentCursor::parse(PAGE);
        let row = doc.find_by_role(Role::DataRow).next().unwrap();
        let cells: Vec<_> = row.find_by_role(Role::Cell).collect();
        assert_eq!(cells.len(), 2);

        let link = cells[0].first_by_role(Role::Link).unwrap();
        assert_eq!(link.text(), "gedit");
        assert_eq!(link.attr("href"), Some("/x"));

        let sortkey = cells[1].first_by_role(Role::SortKey).unwrap();
        assert!(sortkey.has_class("sortkey"));
        assert_eq!(sortkey.text(), "4");
        assert_eq!(cells[1].text(), "44");
    }

    #[test]
    fn test_stats_table_role() {
        let doc = DocumentCursor::parse(r#"<table class="listing translation-stats"></table>"#);
        assert!(doc.find_by_role(Role::StatsTable).next().is_some());
        assert!(doc.find_by_role(Role::BatchNavigation).next().is_none());
    }
}
