//! Declaration binder — pairs a comment block with its declaration.
//!
//! Binding is pure: it sees one item and the open class scope and returns
//! a [`Binding`] for the builder to fold into the model. Nothing here
//! looks at the model, so owner paths that need the model (classes from
//! other files, classes declared later) are left for the builder.

use crate::diagnostics::{Code, Diagnostic};
use crate::model::{
    AliasEntity, ClassEntity, EnumEntity, EnumMember, FieldEntity, FunctionEntity,
    FunctionSignature, GlobalEntity, Location, Param, Return,
};
use crate::parser::lua::{Declaration, DeclarationKind, TableEntry};
use crate::parser::tags::{join_paragraphs, CommentBlock, Position, Tag, TagKind};
use crate::types::{generic_names, infer_literal, parse_fun};
use std::collections::HashSet;
use tracing::debug;

/// The class most recently opened and the table path bound to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    open: Option<OpenClass>,
}

#[derive(Debug, Clone, PartialEq)]
struct OpenClass {
    class: String,
    table: Option<String>,
}

impl Scope {
    pub fn open(class: impl Into<String>, table: Option<String>) -> Self {
        Self {
            open: Some(OpenClass {
                class: class.into(),
                table,
            }),
        }
    }

    pub fn class(&self) -> Option<&str> {
        self.open.as_ref().map(|o| o.class.as_str())
    }

    /// Class name for a table path bound by the open class.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        let open = self.open.as_ref()?;
        (open.table.as_deref() == Some(path)).then_some(open.class.as_str())
    }
}

/// What one comment block documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// `@class`, with the table path that now refers to it
    Class {
        class: ClassEntity,
        table: Option<String>,
    },
    /// A non-local table without `@class`
    Table {
        path: String,
        global: GlobalEntity,
        fields: Vec<FieldEntity>,
    },
    Function {
        /// Owner path as written, `None` for plain functions
        path: Option<String>,
        method: bool,
        function: FunctionEntity,
    },
    /// A value assigned to a dotted path
    Assignment {
        owner: String,
        field: FieldEntity,
        deprecated: bool,
    },
    Global(GlobalEntity),
    Alias(AliasEntity),
    Enum(EnumEntity),
    Meta,
    Nothing,
}

impl Binding {
    /// Name of the documented entity, used to attach unknown tags.
    pub fn entity_name(&self) -> Option<String> {
        match self {
            Binding::Class { class, .. } => Some(class.name.clone()),
            Binding::Table { path, .. } => Some(path.clone()),
            Binding::Function { path, function, .. } => Some(match function.owner.as_ref().or(path.as_ref()) {
                Some(owner) => format!("{}.{}", owner, function.name),
                None => function.name.clone(),
            }),
            Binding::Assignment { owner, field, .. } => Some(format!("{}.{}", owner, field.name)),
            Binding::Global(g) => Some(g.name.clone()),
            Binding::Alias(a) => Some(a.name.clone()),
            Binding::Enum(e) => Some(e.name.clone()),
            Binding::Meta | Binding::Nothing => None,
        }
    }
}

/// Result of binding one item.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub binding: Binding,
    /// Loose `@field` tags, owner set to a class name or table path
    pub fields: Vec<FieldEntity>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-item binding context.
struct Binder<'a> {
    block: &'a CommentBlock,
    declaration: Option<&'a Declaration>,
    scope: &'a Scope,
    file: &'a str,
    diagnostics: Vec<Diagnostic>,
}

/// Bind one comment block (and its declaration) under the open scope.
pub fn bind(
    block: &CommentBlock,
    declaration: Option<&Declaration>,
    scope: &Scope,
    file: &str,
) -> Bound {
    let mut binder = Binder {
        block,
        declaration,
        scope,
        file,
        diagnostics: Vec::new(),
    };
    let binding = binder.binding();
    let fields = match binding {
        Binding::Class { .. } | Binding::Meta => Vec::new(),
        _ => binder.loose_fields(),
    };
    // Tags over local helpers are accepted and left out of the model
    let local = declaration.is_some_and(Declaration::is_local);
    if !local && !matches!(binding, Binding::Function { .. }) {
        binder.orphan_signature_tags();
    }
    if !local
        && !matches!(
            binding,
            Binding::Global(_) | Binding::Assignment { .. } | Binding::Table { .. } | Binding::Function { .. }
        )
    {
        binder.orphan_tags(TagKind::Type, "no variable to type");
    }

    debug!(file, line = block.line, binding = ?binding.entity_name(), "bound block");
    Bound {
        binding,
        fields,
        diagnostics: binder.diagnostics,
    }
}

impl<'a> Binder<'a> {
    fn location(&self, line: usize) -> Option<Location> {
        Some(Location::new(self.file, line))
    }

    fn declaration_line(&self) -> usize {
        self.declaration.map_or(self.block.line, |d| d.line)
    }

    fn tags(&self, kind: TagKind) -> impl Iterator<Item = &'a Tag> {
        self.block.tags.iter().filter(move |t| t.kind == kind)
    }

    fn has(&self, kind: TagKind) -> bool {
        self.block.has(kind)
    }

    /// Block description merged with a tag's own description.
    fn description(&self, tag: Option<&Tag>) -> Option<String> {
        join_paragraphs(
            self.block.description.clone(),
            tag.and_then(|t| t.description.clone()),
        )
    }

    fn binding(&mut self) -> Binding {
        if let Some(tag) = self.block.find(TagKind::Class) {
            return self.class(tag);
        }
        if let Some(tag) = self.block.find(TagKind::Enum) {
            return self.enumeration(tag);
        }
        if let Some(tag) = self.block.find(TagKind::Alias) {
            return self.alias(tag);
        }
        if self.has(TagKind::Meta) {
            return Binding::Meta;
        }

        let Some(declaration) = self.declaration else {
            return Binding::Nothing;
        };
        let documented = !self.block.is_empty();
        match &declaration.kind {
            DeclarationKind::FunctionDef { local: true, .. } => Binding::Nothing,
            DeclarationKind::FunctionDef {
                owner,
                name,
                method,
                params,
                ..
            } => self.function(owner.as_deref(), name, *method, params),
            DeclarationKind::ModuleTable {
                path,
                local: false,
                entries,
            } => self.table(path, entries),
            DeclarationKind::ModuleTable { local: true, .. } | DeclarationKind::LocalVar { .. } => {
                Binding::Nothing
            }
            DeclarationKind::FieldAssignment { owner, name, value } => {
                if !documented && infer_literal(value).is_none() {
                    return Binding::Nothing;
                }
                self.assignment(owner, name, value)
            }
            DeclarationKind::GlobalVar { name, value } => {
                if !documented && infer_literal(value).is_none() {
                    return Binding::Nothing;
                }
                Binding::Global(self.global(name, Some(value)))
            }
        }
    }

    fn class(&self, tag: &Tag) -> Binding {
        let name = tag.name.clone().unwrap_or_default();
        let mut fields: Vec<FieldEntity> = self
            .tags(TagKind::Field)
            .map(|t| self.field_from_tag(t, &name))
            .collect();

        let table = match self.declaration.map(|d| &d.kind) {
            Some(DeclarationKind::ModuleTable { path, entries, .. }) => {
                let named: HashSet<String> = fields.iter().map(|f| f.name.clone()).collect();
                let from_entries: Vec<FieldEntity> = entries
                    .iter()
                    .filter(|e| !named.contains(&e.key))
                    .map(|e| self.field_from_entry(e, &name))
                    .collect();
                fields.extend(from_entries);
                Some(path.clone())
            }
            Some(DeclarationKind::FunctionDef { .. }) | None => None,
            Some(_) => self.declaration.map(Declaration::path),
        };

        let class = ClassEntity {
            name: name.clone(),
            description: self.description(Some(tag)),
            parents: tag
                .ty
                .as_deref()
                .map(|p| p.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            generics: tag.generics.clone(),
            deprecated: self.has(TagKind::Deprecated),
            fields,
            methods: Vec::new(),
            location: self.location(self.declaration_line()),
        };
        Binding::Class { class, table }
    }

    fn enumeration(&mut self, tag: &Tag) -> Binding {
        let name = tag.name.clone().unwrap_or_default();
        let members = match self.declaration.map(|d| &d.kind) {
            Some(DeclarationKind::ModuleTable { entries, .. }) => entries
                .iter()
                .map(|e| EnumMember {
                    name: e.key.clone(),
                    value: e.value.clone(),
                    description: e.description.clone(),
                })
                .collect(),
            _ => {
                self.diagnostics.push(
                    Diagnostic::warning(
                        Code::EnumWithoutTable,
                        format!("@enum {} is not followed by a table literal", name),
                    )
                    .at(self.location(self.block.tag_line(tag)))
                    .on(name.clone()),
                );
                Vec::new()
            }
        };
        Binding::Enum(EnumEntity {
            name,
            description: self.description(Some(tag)),
            members,
            location: self.location(self.declaration_line()),
        })
    }

    fn alias(&self, tag: &Tag) -> Binding {
        let ty = match (&tag.ty, tag.variants.is_empty()) {
            (Some(ty), _) => ty.clone(),
            (None, false) => tag
                .variants
                .iter()
                .map(|v| v.value.as_str())
                .collect::<Vec<_>>()
                .join(" | "),
            (None, true) => "any".to_string(),
        };
        Binding::Alias(AliasEntity {
            name: tag.name.clone().unwrap_or_default(),
            ty,
            description: self.description(Some(tag)),
            variants: tag.variants.clone(),
            location: self.location(self.block.tag_line(tag)),
        })
    }

    fn table(&self, path: &str, entries: &[TableEntry]) -> Binding {
        let owner = self.scope.resolve(path).unwrap_or(path);
        let fields = entries
            .iter()
            .map(|e| self.field_from_entry(e, owner))
            .collect();
        let type_tag = self.block.find(TagKind::Type);
        Binding::Table {
            path: path.to_string(),
            global: GlobalEntity {
                name: path.to_string(),
                ty: type_tag
                    .and_then(|t| t.ty.clone())
                    .unwrap_or_else(|| "table".to_string()),
                value: None,
                description: self.description(type_tag),
                deprecated: self.has(TagKind::Deprecated),
                location: self.location(self.declaration_line()),
            },
            fields,
        }
    }

    fn assignment(&self, owner: &str, name: &str, value: &str) -> Binding {
        let resolved = self.scope.resolve(owner).unwrap_or(owner);
        let type_tag = self.block.find(TagKind::Type);
        let literal = infer_literal(value);
        let field = FieldEntity {
            owner: resolved.to_string(),
            name: name.to_string(),
            ty: type_tag
                .and_then(|t| t.ty.clone())
                .or_else(|| literal.as_ref().map(|(ty, _)| ty.to_string()))
                .unwrap_or_else(|| "any".to_string()),
            value: literal.map(|(_, lit)| lit),
            description: self.description(type_tag),
            visibility: None,
            location: self.location(self.declaration_line()),
        };
        Binding::Assignment {
            owner: resolved.to_string(),
            field,
            deprecated: self.has(TagKind::Deprecated),
        }
    }

    fn global(&self, name: &str, value: Option<&str>) -> GlobalEntity {
        let type_tag = self.block.find(TagKind::Type);
        let literal = value.and_then(infer_literal);
        GlobalEntity {
            name: name.to_string(),
            ty: type_tag
                .and_then(|t| t.ty.clone())
                .or_else(|| literal.as_ref().map(|(ty, _)| ty.to_string()))
                .unwrap_or_else(|| "any".to_string()),
            value: literal.map(|(_, lit)| lit),
            description: self.description(type_tag),
            deprecated: self.has(TagKind::Deprecated),
            location: self.location(self.declaration_line()),
        }
    }

    fn function(
        &mut self,
        owner: Option<&str>,
        name: &str,
        method: bool,
        code_params: &[String],
    ) -> Binding {
        let groups = signature_groups(&self.block.tags);
        let (canonical, earlier) = match groups.split_last() {
            Some((last, rest)) => (Some(last), rest),
            None => (None, &[][..]),
        };

        let documented: Vec<&Tag> = canonical.map(|g| g.params.clone()).unwrap_or_default();
        let params = code_params
            .iter()
            .map(|code| match documented.iter().find(|t| t.name.as_deref() == Some(code.as_str())) {
                Some(tag) => param_from_tag(tag),
                None => Param {
                    name: code.clone(),
                    ty: "any".to_string(),
                    optional: false,
                    description: None,
                },
            })
            .collect();

        let qualified = match owner {
            Some(owner) => format!("{}{}{}", owner, if method { ":" } else { "." }, name),
            None => name.to_string(),
        };
        for tag in documented
            .iter()
            .filter(|t| !code_params.iter().any(|c| t.name.as_deref() == Some(c.as_str())))
        {
            self.diagnostics.push(
                Diagnostic::warning(
                    Code::UnknownParam,
                    format!(
                        "@param {} does not match any parameter of {}",
                        tag.name.as_deref().unwrap_or_default(),
                        qualified
                    ),
                )
                .at(self.location(self.block.tag_line(tag)))
                .on(qualified.clone()),
            );
        }

        let mut overloads: Vec<(Position, FunctionSignature)> = earlier
            .iter()
            .map(|g| (g.position, g.signature()))
            .collect();
        overloads.extend(
            self.tags(TagKind::Overload)
                .filter_map(|t| Some((t.position, parse_fun(t.ty.as_deref()?)?))),
        );
        overloads.sort_by_key(|(position, _)| *position);

        let function = FunctionEntity {
            owner: owner.and_then(|o| self.scope.resolve(o)).map(str::to_string),
            name: name.to_string(),
            description: self.block.description.clone(),
            params,
            returns: canonical
                .map(|g| g.returns.iter().map(|t| return_from_tag(t)).collect())
                .unwrap_or_default(),
            overloads: overloads.into_iter().map(|(_, sig)| sig).collect(),
            generics: self
                .tags(TagKind::Generic)
                .flat_map(|t| generic_names(t.ty.as_deref().unwrap_or_default()))
                .collect(),
            nodiscard: self.has(TagKind::Nodiscard),
            deprecated: self.has(TagKind::Deprecated),
            is_async: self.has(TagKind::Async),
            see: self
                .tags(TagKind::See)
                .filter_map(|t| t.description.clone())
                .collect(),
            location: self.location(self.declaration_line()),
        };

        Binding::Function {
            path: owner.map(str::to_string),
            method,
            function,
        }
    }

    fn field_from_tag(&self, tag: &Tag, owner: &str) -> FieldEntity {
        FieldEntity {
            owner: owner.to_string(),
            name: tag.name.clone().unwrap_or_default(),
            ty: field_type(tag),
            value: None,
            description: tag.description.clone(),
            visibility: tag.modifier.clone(),
            location: self.location(self.block.tag_line(tag)),
        }
    }

    fn field_from_entry(&self, entry: &TableEntry, owner: &str) -> FieldEntity {
        let literal = infer_literal(&entry.value);
        FieldEntity {
            owner: owner.to_string(),
            name: entry.key.clone(),
            ty: literal
                .as_ref()
                .map_or_else(|| "any".to_string(), |(ty, _)| ty.to_string()),
            value: literal.map(|(_, lit)| lit),
            description: entry.description.clone(),
            visibility: None,
            location: self.location(entry.line),
        }
    }

    /// `@field` tags outside a `@class` block.
    fn loose_fields(&mut self) -> Vec<FieldEntity> {
        let table = match self.declaration.map(|d| &d.kind) {
            Some(DeclarationKind::ModuleTable { path, .. }) => Some(path.as_str()),
            _ => None,
        };
        let owner = match table {
            Some(path) => Some(self.scope.resolve(path).unwrap_or(path)),
            None => self.scope.class(),
        };

        let tags: Vec<&Tag> = self.tags(TagKind::Field).collect();
        match owner.map(str::to_string) {
            Some(owner) => tags.iter().map(|t| self.field_from_tag(t, &owner)).collect(),
            None => {
                for tag in tags {
                    self.orphan(tag, "no class to attach to");
                }
                Vec::new()
            }
        }
    }

    fn orphan_signature_tags(&mut self) {
        let tags: Vec<&Tag> = self
            .block
            .tags
            .iter()
            .filter(|t| t.kind.is_signature())
            .collect();
        for tag in tags {
            self.orphan(tag, "no function to attach to");
        }
    }

    fn orphan_tags(&mut self, kind: TagKind, reason: &str) {
        let tags: Vec<&Tag> = self.tags(kind).collect();
        for tag in tags {
            self.orphan(tag, reason);
        }
    }

    fn orphan(&mut self, tag: &Tag, reason: &str) {
        self.diagnostics.push(
            Diagnostic::warning(Code::OrphanTag, format!("@{} has {}", tag.word, reason))
                .at(self.location(self.block.tag_line(tag))),
        );
    }
}

/// `---@field name? type` reads as `type|nil`.
fn field_type(tag: &Tag) -> String {
    let ty = tag.ty.clone().unwrap_or_else(|| "any".to_string());
    if tag.optional {
        format!("{}|nil", ty)
    } else {
        ty
    }
}

fn param_from_tag(tag: &Tag) -> Param {
    Param {
        name: tag.name.clone().unwrap_or_default(),
        ty: tag.ty.clone().unwrap_or_else(|| "any".to_string()),
        optional: tag.optional,
        description: tag.description.clone(),
    }
}

fn return_from_tag(tag: &Tag) -> Return {
    Return {
        ty: tag.ty.clone().unwrap_or_else(|| "any".to_string()),
        name: tag.name.clone(),
        description: tag.description.clone(),
    }
}

/// One `@param`/`@return` run.
struct Group<'a> {
    position: Position,
    params: Vec<&'a Tag>,
    returns: Vec<&'a Tag>,
}

impl Group<'_> {
    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            params: self.params.iter().map(|t| param_from_tag(t)).collect(),
            returns: self.returns.iter().map(|t| return_from_tag(t)).collect(),
        }
    }
}

/// Split `@param`/`@vararg`/`@return` tags into signature groups.
///
/// A parameter after a return, or a repeated parameter name, starts a
/// new group.
fn signature_groups(tags: &[Tag]) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    for tag in tags {
        match tag.kind {
            TagKind::Param | TagKind::Vararg => {
                let fresh = match groups.last() {
                    None => true,
                    Some(g) => {
                        !g.returns.is_empty() || g.params.iter().any(|p| p.name == tag.name)
                    }
                };
                if fresh {
                    groups.push(Group {
                        position: tag.position,
                        params: Vec::new(),
                        returns: Vec::new(),
                    });
                }
                if let Some(group) = groups.last_mut() {
                    group.params.push(tag);
                }
            }
            TagKind::Return => {
                if groups.is_empty() {
                    groups.push(Group {
                        position: tag.position,
                        params: Vec::new(),
                        returns: Vec::new(),
                    });
                }
                if let Some(group) = groups.last_mut() {
                    group.returns.push(tag);
                }
            }
            _ => {}
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lua::scan;

    fn bind_source(src: &str, scope: &Scope) -> Vec<Bound> {
        scan(src, "---")
            .iter()
            .map(|item| bind(&item.block, item.declaration.as_ref(), scope, "test.lua"))
            .collect()
    }

    fn bind_one(src: &str) -> Bound {
        bind_source(src, &Scope::default()).remove(0)
    }

    fn codes(bound: &Bound) -> Vec<Code> {
        bound.diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn class_over_local_table_opens_scope() {
        let bound = bind_one("---@class Foo\n---@field x integer\nlocal M = { y = 2 }\n");
        let Binding::Class { class, table } = bound.binding else {
            panic!("expected class");
        };
        assert_eq!(table.as_deref(), Some("M"));
        let names: Vec<_> = class.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(class.fields[1].ty, "integer");
    }

    #[test]
    fn method_on_open_table_resolves_class() {
        let scope = Scope::open("Foo", Some("M".to_string()));
        let bound = bind_source("---@param n integer\nfunction M:grow(n) end\n", &scope).remove(0);
        let Binding::Function { function, method, .. } = bound.binding else {
            panic!("expected function");
        };
        assert!(method);
        assert_eq!(function.owner.as_deref(), Some("Foo"));
        assert_eq!(function.params[0].ty, "integer");
    }

    #[test]
    fn params_follow_code_order() {
        let bound = bind_one(
            "---@param b string\n---@param a integer\n---@param ghost boolean\nfunction f(a, b, c) end\n",
        );
        let Binding::Function { function, .. } = bound.binding else {
            panic!("expected function");
        };
        let params: Vec<_> = function
            .params
            .iter()
            .map(|p| (p.name.as_str(), p.ty.as_str()))
            .collect();
        assert_eq!(params, vec![("a", "integer"), ("b", "string"), ("c", "any")]);
        assert_eq!(bound.diagnostics.len(), 1);
        assert_eq!(bound.diagnostics[0].code, Code::UnknownParam);
    }

    #[test]
    fn last_group_is_canonical() {
        let bound = bind_one(
            "\
---@overload fun(): string
---@param name string
---@return renoise.Track
---@param index integer
---@return renoise.Track
function get(index) end
",
        );
        let Binding::Function { function, .. } = bound.binding else {
            panic!("expected function");
        };
        assert_eq!(function.params[0].name, "index");
        assert_eq!(function.params[0].ty, "integer");
        assert_eq!(function.overloads.len(), 2);
        assert!(function.overloads[0].params.is_empty());
        assert_eq!(function.overloads[0].returns[0].ty, "string");
        assert_eq!(function.overloads[1].params[0].name, "name");
        assert!(bound.diagnostics.is_empty());
    }

    #[test]
    fn enum_members_in_order() {
        let bound = bind_one("---@enum colors\ncolors = {black=0, red=2, green=4}\n");
        let Binding::Enum(e) = bound.binding else {
            panic!("expected enum");
        };
        let members: Vec<_> = e
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.value.as_str()))
            .collect();
        assert_eq!(members, vec![("black", "0"), ("red", "2"), ("green", "4")]);
    }

    #[test]
    fn enum_without_table_warns() {
        let bound = bind_one("---@enum Mode\nMode = 3\n");
        assert!(matches!(bound.binding, Binding::Enum(_)));
        assert_eq!(bound.diagnostics[0].code, Code::EnumWithoutTable);
    }

    #[test]
    fn typed_global_keeps_literal() {
        let bound = bind_one("---@type number\nrenoise.API_VERSION = 6.1\n");
        let Binding::Assignment { owner, field, .. } = bound.binding else {
            panic!("expected assignment");
        };
        assert_eq!(owner, "renoise");
        assert_eq!(field.ty, "number");
        assert_eq!(field.value.unwrap().as_str(), "6.1");
    }

    #[test]
    fn orphan_signature_tags_warn() {
        let bound = bind_one("---@param x integer\nVERSION = 3\n");
        assert!(matches!(bound.binding, Binding::Global(_)));
        assert_eq!(codes(&bound), vec![Code::OrphanTag]);
    }

    #[test]
    fn documented_locals_are_quiet() {
        let bounds = bind_source(
            "\
---@param x integer
---@return integer
local function helper(x) end

---@type integer
local count = 3

---@type fun(): integer
local next_id = function() end
",
            &Scope::default(),
        );
        assert_eq!(bounds.len(), 3);
        for bound in &bounds {
            assert_eq!(bound.binding, Binding::Nothing);
            assert!(bound.diagnostics.is_empty(), "{:?}", bound.diagnostics);
        }
    }

    #[test]
    fn loose_field_without_owner_is_orphan() {
        let bound = bind_one("---@field x integer\n");
        assert!(bound.fields.is_empty());
        assert_eq!(bound.diagnostics[0].code, Code::OrphanTag);
    }

    #[test]
    fn loose_field_on_table_path() {
        let bound = bind_one("---@field volume number\nmixer = {}\n");
        assert_eq!(bound.fields.len(), 1);
        assert_eq!(bound.fields[0].owner, "mixer");
    }

    #[test]
    fn undocumented_non_literal_global_is_dropped() {
        let bounds = bind_source("helper = require(\"x\")\nVERSION = 2\n", &Scope::default());
        assert_eq!(bounds[0].binding, Binding::Nothing);
        assert!(matches!(bounds[1].binding, Binding::Global(_)));
    }
}
