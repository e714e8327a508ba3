//! Data model for extracted documentation: format-agnostic.
//!
//! Records flow through the pipeline in this order:
//! `SourceFile` → `RawComment` → `ProcessedComment` (+ `Registries`) → `ElementGroup`.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use uuid::Uuid;

/// Join key shared by raw comments, processed comments and registry entries.
pub type CommentId = Uuid;

// -- Input --------------------------------------------------------------------

/// One file handed over by the enumerator, already read from disk.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl SourceFile {
    /// Source without filesystem metadata (stdin, tests). Both timestamps are "now".
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            path: path.into(),
            content: content.into(),
            created: now,
            modified: now,
        }
    }
}

// -- Tags ---------------------------------------------------------------------

/// A single `@tag description` line inside a comment block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagOccurrence {
    /// Matched text, starting at the `@`.
    pub line: String,
    pub tag_name: String,
    pub description: String,
}

/// Tag name → occurrences in source order. Keys are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagTable {
    tags: BTreeMap<String, Vec<TagOccurrence>>,
}

impl TagTable {
    pub fn push(&mut self, occurrence: TagOccurrence) {
        self.tags
            .entry(occurrence.tag_name.clone())
            .or_default()
            .push(occurrence);
    }

    /// All occurrences of `name`, empty when the tag is absent.
    pub fn get(&self, name: &str) -> &[TagOccurrence] {
        self.tags.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Description of the first occurrence of `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).first().map(|t| t.description.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }
}

// -- Raw comments -------------------------------------------------------------

/// One `/** ... */` block as found in a file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    pub id: CommentId,
    pub file_name: String,
    pub file_path: String,
    pub tags: TagTable,
    /// Free text from lines without a tag.
    pub body: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

// -- Processed comments -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeInfo {
    pub kind: String,
    pub description: String,
}

/// Parsed `@param` / `@argument` / `@returns` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamEntry {
    pub id: CommentId,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub optional: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequireKind {
    /// Links into the Node.js API docs.
    NodeModule,
    /// `module:Name` reference to a documented module.
    Module,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub id: CommentId,
    pub kind: RequireKind,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// `@memberof kind:description`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberOf {
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Association {
    Namespace,
    Module,
    File,
}

/// Parent or child edge between a comment and a registry declarer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: CommentId,
    /// `type.kind` of the member comment, when it has one.
    pub kind: Option<String>,
    pub association: Association,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetails {
    pub file_name: String,
    pub file_path: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// Normalized, queryable form of a `RawComment`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedComment {
    pub id: CommentId,
    pub is_root_item: bool,
    #[serde(rename = "type")]
    pub type_info: Option<TypeInfo>,
    pub access: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub since: Option<String>,
    pub license: Option<String>,
    pub body: Option<String>,
    pub props: Vec<ParamEntry>,
    pub arguments: Vec<ParamEntry>,
    pub returns: Vec<ParamEntry>,
    pub requires: Vec<Requirement>,
    pub changelog: Vec<String>,
    pub todo: Vec<String>,
    pub bug: Vec<String>,
    pub example: Vec<String>,
    pub namespaces: Vec<String>,
    pub modules: Vec<String>,
    pub member_of: Vec<MemberOf>,
    pub parent: Vec<Edge>,
    pub children: Vec<Edge>,
    pub file_details: FileDetails,
}

impl ProcessedComment {
    pub fn kind(&self) -> Option<&str> {
        self.type_info.as_ref().map(|t| t.kind.as_str())
    }

    /// Human-readable title: type description, summary, module, namespace.
    pub fn label(&self) -> String {
        self.type_info
            .as_ref()
            .map(|t| t.description.as_str())
            .filter(|d| !d.is_empty())
            .or(self.summary.as_deref())
            .or(self.modules.first().map(String::as_str))
            .or(self.namespaces.first().map(String::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("comment {}", self.id))
    }
}

// -- Registries ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Namespace {
    pub id: CommentId,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub id: CommentId,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: CommentId,
    pub description: String,
    pub file_path: String,
}

/// Common view over registry entries.
pub trait RegistryEntry {
    fn id(&self) -> CommentId;
    fn description(&self) -> &str;
}

impl RegistryEntry for Namespace {
    fn id(&self) -> CommentId {
        self.id
    }
    fn description(&self) -> &str {
        &self.description
    }
}

impl RegistryEntry for Module {
    fn id(&self) -> CommentId {
        self.id
    }
    fn description(&self) -> &str {
        &self.description
    }
}

impl RegistryEntry for FileRecord {
    fn id(&self) -> CommentId {
        self.id
    }
    fn description(&self) -> &str {
        &self.description
    }
}

/// First-seen-wins lookup table keyed by an exact, case-sensitive string.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    /// Insert `entry` under `key` unless the key is already taken.
    /// Returns whether the entry was inserted.
    pub fn register(&mut self, key: impl Into<String>, entry: T) -> bool {
        let key = key.into();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Serialize> Serialize for Registry<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

/// Per-run registries. Namespaces and modules are keyed by description,
/// files by the path of the declaring comment.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registries {
    pub namespaces: Registry<Namespace>,
    pub modules: Registry<Module>,
    pub files: Registry<FileRecord>,
}

// -- Elements -----------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    NavLink,
    Container,
    TabStrip,
    Content,
    Heading,
    Text,
    List,
    ListItem,
    Placeholder,
}

impl ElementKind {
    /// HTML tag used when the element is rendered.
    pub fn tag_name(self) -> &'static str {
        match self {
            ElementKind::NavLink | ElementKind::ListItem => "li",
            ElementKind::Container | ElementKind::Placeholder => "div",
            ElementKind::TabStrip => "nav",
            ElementKind::Content => "section",
            ElementKind::Heading => "h3",
            ElementKind::Text => "p",
            ElementKind::List => "ul",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    pub value: Option<String>,
    pub role: String,
    pub group: Option<String>,
    pub sub_group: Option<String>,
    pub dom_id: Option<String>,
}

/// Renderer-agnostic UI node with fully resolved children.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub id: Uuid,
    pub parent_id: Option<String>,
    pub kind: ElementKind,
    pub attributes: Attributes,
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ElementNode::count).sum::<usize>()
    }
}

/// Elements generated for one root item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementGroup {
    /// Id of the root comment the nodes render.
    pub id: CommentId,
    pub nodes: Vec<ElementNode>,
}
