/// Row-oriented table of raw cells, as read from a delimited export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows: Vec::new(),
            skipped_rows: 0,
        }
    }

    /// Appends a row; rows whose width differs from the header are counted and dropped.
    pub fn push_row(&mut self, cells: Vec<String>) -> bool {
        if cells.len() != self.headers.len() {
            self.skipped_rows += 1;
            return false;
        }
        self.rows.push(cells);
        true
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First header matching any alias (case-insensitive), in alias order.
    pub fn find_column(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            self.headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(alias))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(move |cells| RawRow {
            headers: &self.headers,
            cells,
        })
    }
}

impl<'a> RawRow<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.cell(idx)
    }

    pub fn cell(&self, idx: usize) -> Option<&'a str> {
        self.cells.get(idx).map(|c| c.as_str())
    }
}
