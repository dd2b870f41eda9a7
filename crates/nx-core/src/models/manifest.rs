use serde::Serialize;

/// One `include:` item of the root manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Manifest path exactly as written in the root manifest.
    pub path: String,
    pub env_files: Vec<String>,
    /// Comment and blank lines directly above the item.
    #[serde(skip)]
    pub leading: Vec<String>,
    /// Original item lines; `None` for entries created in this run.
    #[serde(skip)]
    pub raw: Option<Vec<String>>,
}

impl ManifestEntry {
    pub fn new(path: impl Into<String>, env_files: Vec<String>) -> Self {
        Self {
            path: path.into(),
            env_files,
            leading: Vec::new(),
            raw: None,
        }
    }
}

/// The root include-manifest, split around its top-level `include:` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootManifest {
    /// Lines before `include:`.
    pub preamble: Vec<String>,
    /// The `include:` key line as written, if the file has one.
    pub include_line: Option<String>,
    pub entries: Vec<ManifestEntry>,
    /// Lines after the include block, including comments that trail it.
    pub trailer: Vec<String>,
    pub trailing_newline: bool,
    /// `"\r\n"` when the file uses CRLF line endings, else `"\n"`.
    pub line_ending: &'static str,
    /// Column of the `-` marker for include items.
    pub item_indent: usize,
}

impl Default for RootManifest {
    fn default() -> Self {
        Self {
            preamble: Vec::new(),
            include_line: None,
            entries: Vec::new(),
            trailer: Vec::new(),
            trailing_newline: true,
            line_ending: "\n",
            item_indent: 2,
        }
    }
}
