//! Element tree builder: turns the linked comment graph into UI nodes.
//!
//! Phase 1 creates a fixed skeleton per root item (a header nav link and a
//! container). Each skeleton records *what* its children are as a
//! `ChildPlan` descriptor instead of computing them. Phase 2 walks every
//! skeleton, resolves its descriptor into child skeletons and recurses, so
//! the returned tree only holds concrete `ElementNode`s.
//!
//! DOM ids are `--`-joined segments: `<root>--container`,
//! `<root>--<child>--tab`, `<owner>--<root>--nav` and so on. Root stems are
//! unique per run and child stems unique per root; `dom_id` never emits
//! `--`, so every id is distinct.

use crate::error::BuildError;
use crate::model::*;
use crate::slug::dom_id;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

/// Parent id of the header navigation links.
pub const NAV_HEADER: &str = "nav-header";
/// Parent id of the per-root containers.
pub const MAIN: &str = "main";

/// Declarative description of a node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChildPlan {
    Leaf,
    /// One tab-strip link per root item in the whole set.
    RootNavLinks { owner: usize },
    /// Tab strip followed by the content wrapper of `root`.
    ContainerSections { root: usize },
    /// Overview tab plus one tab per child edge of `root`.
    TabEntries { root: usize },
    /// Overview panel plus one panel per child edge of `root`.
    ContentPanels { root: usize },
    /// Heading, text and lists describing one comment.
    Details { comment: CommentId },
    /// One list item per string.
    Items(Vec<String>),
}

/// Node whose children are still described by a `ChildPlan`.
#[derive(Debug)]
struct Skeleton {
    id: Uuid,
    parent_id: Option<String>,
    kind: ElementKind,
    attributes: Attributes,
    plan: ChildPlan,
}

impl Skeleton {
    fn new(parent_id: impl Into<String>, kind: ElementKind, attributes: Attributes, plan: ChildPlan) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: Some(parent_id.into()),
            kind,
            attributes,
            plan,
        }
    }
}

/// Build one `ElementGroup` per root item of `processed`.
///
/// Fails when a registry entry points at a comment that is not in
/// `processed`; single-node failures are replaced with placeholders.
pub fn build(processed: &[ProcessedComment], registries: &Registries) -> Result<Vec<ElementGroup>, BuildError> {
    let builder = TreeBuilder::new(processed, registries)?;

    let groups: Vec<ElementGroup> = builder
        .roots
        .iter()
        .map(|&root| ElementGroup {
            id: processed[root].id,
            nodes: builder
                .skeleton(root)
                .into_iter()
                .map(|s| builder.materialize(s))
                .collect(),
        })
        .collect();

    debug!(
        roots = groups.len(),
        nodes = groups
            .iter()
            .flat_map(|g| &g.nodes)
            .map(ElementNode::count)
            .sum::<usize>(),
        "built element tree"
    );
    Ok(groups)
}

struct TreeBuilder<'a> {
    processed: &'a [ProcessedComment],
    index: HashMap<CommentId, usize>,
    roots: Vec<usize>,
    /// DOM id stem per root index.
    stems: HashMap<usize, String>,
}

impl<'a> TreeBuilder<'a> {
    fn new(processed: &'a [ProcessedComment], registries: &Registries) -> Result<Self, BuildError> {
        let index: HashMap<CommentId, usize> = processed
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        check_registry("namespace", registries.namespaces.iter(), &index)?;
        check_registry("module", registries.modules.iter(), &index)?;
        check_registry("file", registries.files.iter(), &index)?;

        let roots: Vec<usize> = processed
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_root_item)
            .map(|(i, _)| i)
            .collect();

        let mut taken = HashSet::new();
        let stems = roots
            .iter()
            .map(|&root| {
                let item = &processed[root];
                let base = item
                    .namespaces
                    .first()
                    .map(|n| dom_id(n))
                    .unwrap_or_else(|| item.id.to_string());
                (root, unique_stem(base, &mut taken))
            })
            .collect();

        Ok(Self {
            processed,
            index,
            roots,
            stems,
        })
    }

    // -- Phase 1 --------------------------------------------------------------

    fn skeleton(&self, root: usize) -> Vec<Skeleton> {
        let item = &self.processed[root];
        let group = first(&item.namespaces);
        let module = first(&item.modules);

        let nav = Skeleton::new(
            NAV_HEADER,
            ElementKind::NavLink,
            Attributes {
                value: group.clone(),
                role: "nav-header-link".into(),
                group: group.clone(),
                sub_group: module.clone(),
                dom_id: Some(format!("{}--nav", self.group_id(root))),
            },
            ChildPlan::RootNavLinks { owner: root },
        );

        let container = Skeleton::new(
            MAIN,
            ElementKind::Container,
            Attributes {
                value: None,
                role: "container".into(),
                group: group.clone(),
                sub_group: None,
                dom_id: Some(format!("{}--container", self.group_id(root))),
            },
            ChildPlan::ContainerSections { root },
        );

        vec![nav, container]
    }

    // -- Phase 2 --------------------------------------------------------------

    /// Resolve the skeleton's descriptor and recurse into the result.
    /// A failing node is replaced with a placeholder; its siblings are kept.
    fn materialize(&self, skeleton: Skeleton) -> ElementNode {
        match self.resolve(&skeleton) {
            Ok(children) => ElementNode {
                id: skeleton.id,
                parent_id: skeleton.parent_id,
                kind: skeleton.kind,
                attributes: skeleton.attributes,
                children: children.into_iter().map(|c| self.materialize(c)).collect(),
            },
            Err(err) => {
                warn!(element = %skeleton.id, role = %skeleton.attributes.role, "{}", err);
                ElementNode {
                    id: skeleton.id,
                    parent_id: skeleton.parent_id,
                    kind: ElementKind::Placeholder,
                    attributes: Attributes {
                        value: Some(format!("Unable to render element: {}", err)),
                        role: "error".into(),
                        group: skeleton.attributes.group,
                        sub_group: None,
                        dom_id: None,
                    },
                    children: Vec::new(),
                }
            }
        }
    }

    fn resolve(&self, skeleton: &Skeleton) -> Result<Vec<Skeleton>, BuildError> {
        let parent = skeleton.id.to_string();
        match &skeleton.plan {
            ChildPlan::Leaf => Ok(Vec::new()),
            ChildPlan::RootNavLinks { owner } => Ok(self.root_nav_links(*owner, &parent)),
            ChildPlan::ContainerSections { root } => Ok(self.container_sections(*root, &parent)),
            ChildPlan::TabEntries { root } => Ok(self.tab_entries(*root, &parent)),
            ChildPlan::ContentPanels { root } => Ok(self.content_panels(*root, &parent)),
            ChildPlan::Details { comment } => self.details(*comment, &parent),
            ChildPlan::Items(items) => Ok(items
                .iter()
                .map(|item| {
                    Skeleton::new(
                        parent.clone(),
                        ElementKind::ListItem,
                        Attributes {
                            value: Some(item.clone()),
                            role: "list-item".into(),
                            ..Default::default()
                        },
                        ChildPlan::Leaf,
                    )
                })
                .collect()),
        }
    }

    fn root_nav_links(&self, owner: usize, parent: &str) -> Vec<Skeleton> {
        let owner = self.group_id(owner);
        self.roots
            .iter()
            .map(|&root| {
                let item = &self.processed[root];
                let group = first(&item.namespaces);
                let module = first(&item.modules);
                Skeleton::new(
                    parent,
                    ElementKind::NavLink,
                    Attributes {
                        value: module.clone().or_else(|| group.clone()),
                        role: "tab-strip-nav-link".into(),
                        group,
                        sub_group: module,
                        dom_id: Some(format!("{}--{}--nav", owner, self.group_id(root))),
                    },
                    ChildPlan::Leaf,
                )
            })
            .collect()
    }

    fn container_sections(&self, root: usize, parent: &str) -> Vec<Skeleton> {
        let group = first(&self.processed[root].namespaces);
        let id = self.group_id(root);

        let tab_strip = Skeleton::new(
            parent,
            ElementKind::TabStrip,
            Attributes {
                value: None,
                role: "tab-strip-nav".into(),
                group: group.clone(),
                sub_group: None,
                dom_id: Some(format!("{}--tab-strip", id)),
            },
            ChildPlan::TabEntries { root },
        );

        let content = Skeleton::new(
            parent,
            ElementKind::Container,
            Attributes {
                value: None,
                role: "content-wrapper".into(),
                group,
                sub_group: None,
                dom_id: Some(format!("{}--content", id)),
            },
            ChildPlan::ContentPanels { root },
        );

        vec![tab_strip, content]
    }

    fn tab_entries(&self, root: usize, parent: &str) -> Vec<Skeleton> {
        let item = &self.processed[root];
        let group = first(&item.namespaces);
        let module = first(&item.modules);
        let id = self.group_id(root);

        let tab = |value: String, dom: String| {
            Skeleton::new(
                parent,
                ElementKind::NavLink,
                Attributes {
                    value: Some(value),
                    role: "tab-strip-nav-link".into(),
                    group: group.clone(),
                    sub_group: module.clone(),
                    dom_id: Some(dom),
                },
                ChildPlan::Leaf,
            )
        };

        let mut tabs = vec![tab("Overview".into(), format!("{}--overview--tab", id))];
        for (edge, stem) in item.children.iter().zip(self.child_stems(root)) {
            tabs.push(tab(self.edge_label(edge), format!("{}--{}--tab", id, stem)));
        }
        tabs
    }

    fn content_panels(&self, root: usize, parent: &str) -> Vec<Skeleton> {
        let item = &self.processed[root];
        let group = first(&item.namespaces);
        let id = self.group_id(root);

        let panel = |dom: String, comment: CommentId| {
            Skeleton::new(
                parent,
                ElementKind::Content,
                Attributes {
                    value: None,
                    role: "content".into(),
                    group: group.clone(),
                    sub_group: None,
                    dom_id: Some(dom),
                },
                ChildPlan::Details { comment },
            )
        };

        let mut panels = vec![panel(format!("{}--overview--content", id), item.id)];
        for (edge, stem) in item.children.iter().zip(self.child_stems(root)) {
            panels.push(panel(format!("{}--{}--content", id, stem), edge.id));
        }
        panels
    }

    fn details(&self, comment: CommentId, parent: &str) -> Result<Vec<Skeleton>, BuildError> {
        let &i = self
            .index
            .get(&comment)
            .ok_or(BuildError::UnknownComment(comment))?;
        let c = &self.processed[i];

        let leaf = |kind: ElementKind, role: &str, value: String| {
            Skeleton::new(
                parent,
                kind,
                Attributes {
                    value: Some(value),
                    role: role.into(),
                    ..Default::default()
                },
                ChildPlan::Leaf,
            )
        };
        let list = |role: &str, items: Vec<String>| {
            Skeleton::new(
                parent,
                ElementKind::List,
                Attributes {
                    role: role.into(),
                    ..Default::default()
                },
                ChildPlan::Items(items),
            )
        };

        let mut nodes = vec![leaf(ElementKind::Heading, "title", c.label())];
        if let Some(kind) = c.kind() {
            nodes.push(leaf(ElementKind::Text, "kind", kind.to_string()));
        }
        for (role, text) in [
            ("summary", &c.summary),
            ("description", &c.description),
            ("body", &c.body),
        ] {
            if let Some(text) = text {
                nodes.push(leaf(ElementKind::Text, role, text.clone()));
            }
        }

        let meta: Vec<String> = [
            ("access", &c.access),
            ("version", &c.version),
            ("since", &c.since),
            ("author", &c.author),
            ("license", &c.license),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
        .collect();

        let sections = [
            ("meta", meta),
            ("params", c.props.iter().map(describe_param).collect()),
            ("arguments", c.arguments.iter().map(describe_param).collect()),
            ("returns", c.returns.iter().map(describe_param).collect()),
            ("requires", c.requires.iter().map(describe_requirement).collect()),
            ("examples", c.example.clone()),
            ("changelog", c.changelog.clone()),
        ];
        for (role, items) in sections {
            if !items.is_empty() {
                nodes.push(list(role, items));
            }
        }
        Ok(nodes)
    }

    // -- Helpers --------------------------------------------------------------

    fn edge_label(&self, edge: &Edge) -> String {
        self.index
            .get(&edge.id)
            .map(|&i| self.processed[i].label())
            .or_else(|| edge.description.clone())
            .unwrap_or_else(|| edge.id.to_string())
    }

    /// DOM id stem for a root item: its first namespace, suffixed when
    /// another root already took it.
    fn group_id(&self, root: usize) -> String {
        self.stems
            .get(&root)
            .cloned()
            .unwrap_or_else(|| self.processed[root].id.to_string())
    }

    /// DOM id stems for the child edges of `root`, in edge order.
    fn child_stems(&self, root: usize) -> Vec<String> {
        let mut taken = HashSet::from(["overview".to_string()]);
        self.processed[root]
            .children
            .iter()
            .map(|edge| unique_stem(dom_id(&self.edge_label(edge)), &mut taken))
            .collect()
    }
}

/// `base`, or `base-2`, `base-3`, ... when already taken.
fn unique_stem(base: String, taken: &mut HashSet<String>) -> String {
    let mut stem = base.clone();
    let mut n = 2;
    while !taken.insert(stem.clone()) {
        stem = format!("{}-{}", base, n);
        n += 1;
    }
    stem
}

fn check_registry<'r, T: RegistryEntry + 'r>(
    registry: &'static str,
    entries: impl Iterator<Item = &'r T>,
    index: &HashMap<CommentId, usize>,
) -> Result<(), BuildError> {
    for entry in entries {
        if !index.contains_key(&entry.id()) {
            return Err(BuildError::DanglingRegistryEntry {
                registry,
                description: entry.description().to_string(),
                id: entry.id(),
            });
        }
    }
    Ok(())
}

fn first(values: &[String]) -> Option<String> {
    values.first().cloned()
}

pub(crate) fn describe_param(p: &ParamEntry) -> String {
    let mut out = p.name.clone().unwrap_or_else(|| "(unnamed)".into());
    if p.optional {
        out.push('?');
    }
    if let Some(ty) = &p.type_name {
        out.push_str(&format!(": {}", ty));
    }
    if let Some(default) = &p.default {
        out.push_str(&format!(" = {}", default));
    }
    if let Some(desc) = &p.description {
        out.push_str(&format!(" - {}", desc));
    }
    out
}

pub(crate) fn describe_requirement(r: &Requirement) -> String {
    match (&r.name, &r.description) {
        (Some(name), Some(desc)) if name != desc => format!("{} ({})", name, desc),
        (Some(name), _) => name.clone(),
        (None, Some(desc)) => desc.clone(),
        (None, None) => "unknown".into(),
    }
}
