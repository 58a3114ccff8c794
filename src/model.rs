use serde::Deserialize;

/// Marker separating forced lines inside a cell value. `\r\n` is tolerated.
pub const HARD_BREAK: char = '\n';

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Row {
    pub label: String,
    #[serde(default)]
    pub value: String,
}

impl Row {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Table {
    pub header: [String; 2],
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(header: [&str; 2], rows: Vec<Row>) -> Self {
        Self {
            header: header.map(str::to_string),
            rows,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Section {
    pub title: String,
    pub table: Table,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub title: String,
    pub sections: Vec<Section>,
}

impl Document {
    /// Output artifact name: `<title>.pdf`, with path-hostile characters replaced.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .title
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        if stem.is_empty() {
            "report.pdf".to_string()
        } else {
            format!("{stem}.pdf")
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Item {
    pub term: String,
    #[serde(default)]
    pub definition: String,
}

/// Term/definition list shape produced by the list screens.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlatReport {
    pub title: String,
    pub total_items: usize,
    #[serde(default)]
    pub summary: Option<String>,
    pub items: Vec<Item>,
}

impl From<FlatReport> for Document {
    fn from(flat: FlatReport) -> Self {
        let mut overview = vec![Row::new("Total items", flat.total_items.to_string())];
        if let Some(summary) = flat.summary.filter(|s| !s.trim().is_empty()) {
            overview.push(Row::new("Summary", summary));
        }
        let items = flat
            .items
            .into_iter()
            .map(|item| Row::new(item.term, item.definition))
            .collect();
        Document {
            title: flat.title,
            sections: vec![
                Section {
                    title: "Overview".to_string(),
                    table: Table::new(["Field", "Value"], overview),
                },
                Section {
                    title: "Items".to_string(),
                    table: Table::new(["Term", "Definition"], items),
                },
            ],
        }
    }
}

/// Either accepted input shape. Both end up as a [`Document`].
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ReportInput {
    Sections(Document),
    Flat(FlatReport),
}

impl From<ReportInput> for Document {
    fn from(input: ReportInput) -> Self {
        match input {
            ReportInput::Sections(doc) => doc,
            ReportInput::Flat(flat) => flat.into(),
        }
    }
}

pub fn parse_report(bytes: &[u8]) -> crate::Result<Document> {
    let input: ReportInput = serde_json::from_slice(bytes)?;
    Ok(input.into())
}
