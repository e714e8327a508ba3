//! Comment linker: normalizes raw comments and connects them.
//!
//! Pass 1 turns every `RawComment` into a `ProcessedComment` and registers
//! namespaces, modules and files (first seen wins). Pass 2 resolves
//! `@memberof` references and file membership into parent/child edges.
//! Pass 2 only starts once every registration from pass 1 is in place.

use crate::error::LinkError;
use crate::model::*;
use crate::parser::tokens;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Output of `link`: the processed set plus the registries it built.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Linked {
    pub processed: Vec<ProcessedComment>,
    pub registries: Registries,
}

impl Linked {
    pub fn get(&self, id: CommentId) -> Option<&ProcessedComment> {
        self.processed.iter().find(|c| c.id == id)
    }

    pub fn root_items(&self) -> impl Iterator<Item = &ProcessedComment> {
        self.processed.iter().filter(|c| c.is_root_item)
    }
}

/// Normalize and link `raw` in input order.
pub fn link(raw: Vec<RawComment>) -> Result<Linked, LinkError> {
    let mut registries = Registries::default();
    let mut seen = HashSet::with_capacity(raw.len());
    let mut processed = Vec::with_capacity(raw.len());

    for comment in raw {
        if !seen.insert(comment.id) {
            return Err(LinkError::DuplicateId(comment.id));
        }
        processed.push(normalize(comment, &mut registries));
    }

    connect(&mut processed, &registries);

    debug!(
        comments = processed.len(),
        namespaces = registries.namespaces.len(),
        modules = registries.modules.len(),
        files = registries.files.len(),
        "linked comments"
    );

    Ok(Linked {
        processed,
        registries,
    })
}

// -- Pass 1 -------------------------------------------------------------------

fn normalize(raw: RawComment, registries: &mut Registries) -> ProcessedComment {
    let id = raw.id;
    let tags = &raw.tags;

    let type_info = tags.first("type").map(parse_type).or_else(|| {
        tags.first("file").map(|file| TypeInfo {
            kind: "file".to_string(),
            description: file.to_string(),
        })
    });

    let namespaces: Vec<String> = tags
        .get("namespace")
        .iter()
        .map(|t| strip_braces(&t.description))
        .filter(|name| !name.is_empty())
        .map(|name| {
            registries.namespaces.register(
                name.clone(),
                Namespace {
                    id,
                    description: name.clone(),
                },
            );
            name
        })
        .collect();

    let modules: Vec<String> = tags
        .get("module")
        .iter()
        .map(|t| t.description.clone())
        .filter(|name| !name.is_empty())
        .map(|name| {
            registries.modules.register(
                name.clone(),
                Module {
                    id,
                    description: name.clone(),
                },
            );
            name
        })
        .collect();

    if let Some(info) = type_info.as_ref() {
        if info.kind == "file" && !info.description.is_empty() {
            registries.files.register(
                raw.file_path.clone(),
                FileRecord {
                    id,
                    description: info.description.clone(),
                    file_path: raw.file_path.clone(),
                },
            );
        }
    }

    let params = |name: &str| -> Vec<ParamEntry> {
        tags.get(name)
            .iter()
            .map(|t| param_entry(id, &t.description))
            .collect()
    };
    let mut returns = params("returns");
    returns.extend(params("return"));

    let list = |name: &str| -> Vec<String> {
        tags.get(name).iter().map(|t| t.description.clone()).collect()
    };
    let scalar = |name: &str| {
        tags.first(name)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    ProcessedComment {
        id,
        is_root_item: tags.contains("namespace"),
        type_info,
        access: scalar("access"),
        summary: scalar("summary"),
        description: scalar("description"),
        version: scalar("version"),
        author: scalar("author"),
        since: scalar("since"),
        license: scalar("license"),
        body: (!raw.body.is_empty()).then(|| raw.body.clone()),
        props: params("param"),
        arguments: params("argument"),
        returns,
        requires: tags
            .get("requires")
            .iter()
            .map(|t| {
                let (kind, name, description) = tokens::classify_requirement(&t.description);
                Requirement {
                    id,
                    kind,
                    name,
                    description,
                }
            })
            .collect(),
        changelog: list("changelog"),
        todo: list("todo"),
        bug: list("bug"),
        example: list("example"),
        namespaces,
        modules,
        member_of: tags
            .get("memberof")
            .iter()
            .map(|t| parse_member_of(&t.description))
            .collect(),
        parent: Vec::new(),
        children: Vec::new(),
        file_details: FileDetails {
            file_name: raw.file_name.clone(),
            file_path: raw.file_path.clone(),
            created_date: raw.created_date,
            modified_date: raw.modified_date,
        },
    }
}

/// `{kind} description` → kind / description, split on the first `}`.
fn parse_type(value: &str) -> TypeInfo {
    match value.split_once('}') {
        Some((kind, description)) => TypeInfo {
            kind: kind.replacen('{', "", 1).trim().to_string(),
            description: description.trim().to_string(),
        },
        None => TypeInfo {
            kind: value.replacen('{', "", 1).trim().to_string(),
            description: String::new(),
        },
    }
}

/// `namespace:build-docs.GetDocs` → kind `namespace`, description `build-docs.GetDocs`.
fn parse_member_of(value: &str) -> MemberOf {
    match value.split_once(':') {
        Some((kind, description)) => MemberOf {
            kind: kind.trim().to_string(),
            description: description.trim().to_string(),
        },
        None => MemberOf {
            kind: value.trim().to_string(),
            description: String::new(),
        },
    }
}

fn strip_braces(value: &str) -> String {
    value
        .replacen('{', "", 1)
        .replacen('}', "", 1)
        .trim()
        .to_string()
}

fn param_entry(id: CommentId, value: &str) -> ParamEntry {
    let t = tokens::tokenize(value);
    ParamEntry {
        id,
        type_name: t.type_name,
        name: t.name,
        description: t.description,
        optional: t.optional,
        default: t.default,
    }
}

// -- Pass 2 -------------------------------------------------------------------

/// Planned edge: `member` belongs to the registry entry declared by `target`.
struct PlannedEdge {
    member: usize,
    target: CommentId,
    association: Association,
    description: String,
}

fn connect(processed: &mut [ProcessedComment], registries: &Registries) {
    let index: HashMap<CommentId, usize> = processed
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    let mut plan = Vec::new();
    for (member, comment) in processed.iter().enumerate() {
        for entry in &comment.member_of {
            let target = match entry.kind.as_str() {
                "namespace" => registries
                    .namespaces
                    .get(&entry.description)
                    .map(|n| (n.id, Association::Namespace, n.description.clone())),
                "module" => registries
                    .modules
                    .get(&entry.description)
                    .map(|m| (m.id, Association::Module, m.description.clone())),
                _ => None,
            };
            match target {
                Some((target, association, description)) => plan.push(PlannedEdge {
                    member,
                    target,
                    association,
                    description,
                }),
                None => debug!(
                    comment = %comment.id,
                    kind = %entry.kind,
                    name = %entry.description,
                    "memberof reference has no declaration"
                ),
            }
        }

        if !comment.is_root_item {
            if let Some(file) = registries.files.get(&comment.file_details.file_path) {
                plan.push(PlannedEdge {
                    member,
                    target: file.id,
                    association: Association::File,
                    description: file.description.clone(),
                });
            }
        }
    }

    for edge in plan {
        let member_id = processed[edge.member].id;
        if edge.target == member_id {
            continue;
        }
        let kind = processed[edge.member].kind().map(str::to_string);

        push_unique(
            &mut processed[edge.member].parent,
            Edge {
                id: edge.target,
                kind: kind.clone(),
                association: edge.association,
                description: Some(edge.description.clone()),
            },
        );

        match index.get(&edge.target) {
            Some(&declarer) => push_unique(
                &mut processed[declarer].children,
                Edge {
                    id: member_id,
                    kind,
                    association: edge.association,
                    description: Some(edge.description),
                },
            ),
            None => debug!(declarer = %edge.target, "declaring comment missing from set"),
        }
    }
}

fn push_unique(edges: &mut Vec<Edge>, edge: Edge) {
    if !edges
        .iter()
        .any(|e| e.id == edge.id && e.association == edge.association)
    {
        edges.push(edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Extractor;

    fn raw(path: &str, content: &str) -> Vec<RawComment> {
        Extractor::default().extract(&SourceFile::new(path, content))
    }

    fn linked(files: &[(&str, &str)]) -> Linked {
        let all = files.iter().flat_map(|(p, c)| raw(p, c)).collect();
        link(all).unwrap()
    }

    #[test]
    fn end_to_end_two_files() {
        let result = linked(&[
            ("a.ts", "/**\n * @namespace {Lib}\n * @module Lib.Core\n */"),
            (
                "b.ts",
                "/**\n * @memberof module:Lib.Core\n * @param {string} name - the name\n */",
            ),
        ]);

        assert_eq!(result.registries.namespaces.len(), 1);
        assert_eq!(
            result.registries.namespaces.get("Lib").map(|n| n.description.as_str()),
            Some("Lib")
        );
        assert_eq!(result.registries.modules.len(), 1);
        assert!(result.registries.modules.get("Lib.Core").is_some());
        assert_eq!(result.processed.len(), 2);

        let (a, b) = (&result.processed[0], &result.processed[1]);
        assert!(a.is_root_item);
        assert!(!b.is_root_item);
        assert!(a.children.iter().any(|c| c.id == b.id));
        assert_eq!(b.props.len(), 1);
        assert_eq!(b.props[0].type_name.as_deref(), Some("string"));
        assert_eq!(b.props[0].name.as_deref(), Some("name"));
        assert_eq!(b.props[0].description.as_deref(), Some("the name"));
        assert_eq!(b.props[0].id, b.id);
    }

    #[test]
    fn namespace_registered_once() {
        let result = linked(&[
            ("a.ts", "/** @namespace {Foo} */"),
            ("b.ts", "/** @namespace {Foo} */"),
        ]);
        assert_eq!(result.registries.namespaces.len(), 1);
        let first = result.processed[0].id;
        assert_eq!(result.registries.namespaces.get("Foo").map(|n| n.id), Some(first));
        for comment in &result.processed {
            assert_eq!(comment.namespaces, vec!["Foo".to_string()]);
        }
    }

    #[test]
    fn module_child_mirroring() {
        let result = linked(&[(
            "x.ts",
            "/**\n * @namespace {App}\n * @module X\n */\n/**\n * @memberof module:X\n */",
        )]);
        let (a, b) = (&result.processed[0], &result.processed[1]);
        assert!(a.children.iter().any(|c| c.id == b.id));
        let parent = b
            .parent
            .iter()
            .find(|p| p.association == Association::Module)
            .unwrap();
        assert_eq!(parent.id, a.id);
        assert_eq!(parent.description.as_deref(), Some("X"));
    }

    #[test]
    fn namespace_membership_is_mirrored() {
        let result = linked(&[
            ("a.ts", "/** @namespace {Core} */"),
            ("b.ts", "/**\n * @type {class} Widget\n * @memberof namespace:Core\n */"),
        ]);
        let (a, b) = (&result.processed[0], &result.processed[1]);
        assert_eq!(b.parent.len(), 1);
        assert_eq!(b.parent[0].id, a.id);
        assert_eq!(b.parent[0].association, Association::Namespace);
        assert_eq!(b.parent[0].kind.as_deref(), Some("class"));
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].id, b.id);
    }

    #[test]
    fn unknown_member_of_is_not_an_error() {
        let result = linked(&[("a.ts", "/** @memberof module:Nonexistent */")]);
        assert!(result.processed[0].parent.is_empty());
        assert!(result.processed[0].children.is_empty());
    }

    #[test]
    fn member_of_is_case_sensitive() {
        let result = linked(&[
            ("a.ts", "/** @module Parser */"),
            ("b.ts", "/** @memberof module:parser */"),
        ]);
        assert!(result.processed[1].parent.is_empty());
    }

    #[test]
    fn file_membership() {
        let result = linked(&[(
            "src/util.ts",
            "/**\n * @file src/util.ts\n * @summary Utilities\n */\n/**\n * @summary helper\n */",
        )]);
        let (file, helper) = (&result.processed[0], &result.processed[1]);
        assert_eq!(file.type_info.as_ref().map(|t| t.kind.as_str()), Some("file"));
        assert_eq!(result.registries.files.len(), 1);
        assert_eq!(helper.parent.len(), 1);
        assert_eq!(helper.parent[0].id, file.id);
        assert_eq!(helper.parent[0].association, Association::File);
        // The declaring comment is not its own parent.
        assert!(file.parent.is_empty());
        assert_eq!(file.children.len(), 1);
        assert_eq!(file.children[0].id, helper.id);
    }

    #[test]
    fn root_items_skip_file_parent() {
        let result = linked(&[(
            "lib.ts",
            "/** @file lib.ts */\n/**\n * @namespace {Lib}\n */",
        )]);
        assert!(result.processed[1].is_root_item);
        assert!(result.processed[1].parent.is_empty());
    }

    #[test]
    fn self_membership_is_ignored() {
        let result = linked(&[(
            "a.ts",
            "/**\n * @namespace {Self}\n * @memberof namespace:Self\n */",
        )]);
        assert!(result.processed[0].parent.is_empty());
        assert!(result.processed[0].children.is_empty());
    }

    #[test]
    fn duplicate_membership_adds_one_edge() {
        let result = linked(&[
            ("a.ts", "/** @module M */"),
            ("b.ts", "/**\n * @memberof module:M\n * @memberof module:M\n */"),
        ]);
        assert_eq!(result.processed[1].parent.len(), 1);
        assert_eq!(result.processed[0].children.len(), 1);
    }

    #[test]
    fn scalar_and_list_fields() {
        let result = linked(&[(
            "a.ts",
            r#"/**
 * Longer free text.
 * @type {class} Parser
 * @access private
 * @summary Parses things.
 * @description Detailed.
 * @version 0.2.2
 * @since 0.0.1
 * @author Jane Doe
 * @license MIT
 * @changelog 0.1.0 - first
 * @changelog 0.2.0 - second
 * @todo more tests
 * @returns {boolean} - success
 * @argument {string} input - raw text
 * @requires module:Tokens
 */"#,
        )]);
        let c = &result.processed[0];
        assert_eq!(
            c.type_info,
            Some(TypeInfo {
                kind: "class".into(),
                description: "Parser".into()
            })
        );
        assert_eq!(c.access.as_deref(), Some("private"));
        assert_eq!(c.summary.as_deref(), Some("Parses things."));
        assert_eq!(c.description.as_deref(), Some("Detailed."));
        assert_eq!(c.version.as_deref(), Some("0.2.2"));
        assert_eq!(c.since.as_deref(), Some("0.0.1"));
        assert_eq!(c.author.as_deref(), Some("Jane Doe"));
        assert_eq!(c.license.as_deref(), Some("MIT"));
        assert_eq!(c.body.as_deref(), Some("Longer free text."));
        assert_eq!(c.changelog.len(), 2);
        assert_eq!(c.todo, vec!["more tests".to_string()]);
        assert_eq!(c.returns[0].type_name.as_deref(), Some("boolean"));
        assert_eq!(c.returns[0].description.as_deref(), Some("success"));
        assert_eq!(c.arguments[0].name.as_deref(), Some("input"));
        assert_eq!(c.requires[0].kind, RequireKind::Module);
        assert_eq!(c.requires[0].name.as_deref(), Some("Tokens"));
        assert!(c.version.is_some() && c.example.is_empty() && c.bug.is_empty());
    }

    #[test]
    fn absent_tags_are_none() {
        let result = linked(&[("a.ts", "/** @summary only */")]);
        let c = &result.processed[0];
        assert!(c.type_info.is_none());
        assert!(c.access.is_none() && c.author.is_none() && c.body.is_none());
        assert!(c.props.is_empty() && c.namespaces.is_empty() && c.member_of.is_empty());
    }

    #[test]
    fn single_line_body_is_clean() {
        let result = linked(&[("a.ts", "/** Returns the answer. */")]);
        assert_eq!(result.processed[0].body.as_deref(), Some("Returns the answer."));
    }

    #[test]
    fn blank_tag_values_are_none() {
        let result = linked(&[(
            "a.ts",
            "/**\n * @namespace  \n * @module  \n * @summary  \n * @version 1.0\n */",
        )]);
        let c = &result.processed[0];
        assert!(c.summary.is_none());
        assert_eq!(c.version.as_deref(), Some("1.0"));
        assert!(c.namespaces.is_empty() && c.modules.is_empty());
        assert!(result.registries.namespaces.is_empty());
        assert!(result.registries.modules.is_empty());
        assert!(result.registries.namespaces.get("").is_none());
    }

    #[test]
    fn member_of_parsing() {
        assert_eq!(
            parse_member_of("namespace:build-docs.GetDocs"),
            MemberOf {
                kind: "namespace".into(),
                description: "build-docs.GetDocs".into()
            }
        );
        assert_eq!(parse_member_of("Widgets").description, "");
    }

    #[test]
    fn duplicate_ids_are_fatal() {
        let mut comments = raw("a.ts", "/** @summary one */");
        comments.push(comments[0].clone());
        let id = comments[0].id;
        assert_eq!(link(comments).unwrap_err(), LinkError::DuplicateId(id));
    }

    #[test]
    fn empty_input_links() {
        let result = link(Vec::new()).unwrap();
        assert!(result.processed.is_empty());
        assert!(result.registries.namespaces.is_empty());
    }
}
