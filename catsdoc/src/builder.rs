//! Documentation model builder — one left-to-right fold over all items.
//!
//! The state threaded through the fold is the model under construction
//! and the open class [`Scope`]. The scope resets at every file start and
//! at `@meta`. Members whose owner is not a class yet wait in a pending
//! list until the fold ends.

use crate::binder::{bind, Binding, Scope};
use crate::diagnostics::Diagnostic;
use crate::model::{DocModel, Entity, FieldEntity, GlobalEntity, Location, Member, UnknownTag};
use crate::parser::tags::{CommentBlock, TagKind};
use crate::parser::{Item, ParsedFile};
use tracing::debug;

#[derive(Default)]
struct Builder {
    model: DocModel,
    pending: Vec<Member>,
    diagnostics: Vec<Diagnostic>,
}

/// Fold parsed files, in the order given, into a documentation model.
pub fn build(files: &[ParsedFile]) -> (DocModel, Vec<Diagnostic>) {
    let mut builder = Builder::default();
    for file in files {
        debug!(file = %file.path, items = file.items.len(), "building");
        let mut scope = Scope::default();
        for item in &file.items {
            scope = builder.step(&file.path, item, scope);
        }
    }
    builder.finish()
}

impl Builder {
    fn step(&mut self, file: &str, item: &Item, scope: Scope) -> Scope {
        let scope = if item.block.has(TagKind::Meta) {
            Scope::default()
        } else {
            scope
        };
        let bound = bind(&item.block, item.declaration.as_ref(), &scope, file);
        self.diagnostics.extend(bound.diagnostics);
        self.record_unknown_tags(file, &item.block, bound.binding.entity_name());
        for field in bound.fields {
            self.attach(Member::Field(field));
        }

        match bound.binding {
            Binding::Meta => Scope::default(),
            Binding::Class { class, table } => {
                let name = class.name.clone();
                self.model.upsert_class(class);
                Scope::open(name, table)
            }
            Binding::Table { path, global, fields } => self.table(path, global, fields, scope),
            Binding::Function {
                path,
                method,
                mut function,
            } => {
                if function.owner.is_some() {
                    self.attach(Member::Method(function));
                } else if let Some(path) = path {
                    if method || self.model.is_class(&path) {
                        function.owner = Some(path);
                        self.attach(Member::Method(function));
                    } else {
                        function.name = format!("{}.{}", path, function.name);
                        self.model.insert(Entity::Function(function));
                    }
                } else {
                    self.model.insert(Entity::Function(function));
                }
                scope
            }
            Binding::Assignment {
                owner,
                field,
                deprecated,
            } => {
                if self.model.is_class(&owner) {
                    self.attach(Member::Field(field));
                } else {
                    self.model.insert(Entity::Global(global_from_field(&owner, field, deprecated)));
                }
                scope
            }
            Binding::Global(global) => {
                self.model.insert(Entity::Global(global));
                scope
            }
            Binding::Alias(alias) => {
                self.model.insert(Entity::Alias(alias));
                scope
            }
            Binding::Enum(enumeration) => {
                self.model.insert(Entity::Enum(enumeration));
                scope
            }
            Binding::Nothing => scope,
        }
    }

    /// A bare table assignment: re-opens a class, repeats a namespace, or
    /// declares a new global table.
    fn table(
        &mut self,
        path: String,
        global: GlobalEntity,
        fields: Vec<FieldEntity>,
        scope: Scope,
    ) -> Scope {
        if let Some(class) = scope.resolve(&path).map(str::to_string) {
            self.add_fields(&class, fields);
            return scope;
        }
        if self.model.is_class(&path) {
            debug!(class = %path, "re-opening class");
            self.add_fields(&path, fields);
            return Scope::open(path.clone(), Some(path));
        }
        if !self.model.is_namespace_table(&path) || global.ty != "table" {
            self.model.insert(Entity::Global(global));
        }
        scope
    }

    fn add_fields(&mut self, class: &str, fields: Vec<FieldEntity>) {
        for mut field in fields {
            field.owner = class.to_string();
            self.attach(Member::Field(field));
        }
    }

    /// Attach a member now, or park it until the fold ends.
    fn attach(&mut self, member: Member) {
        if let Err(member) = self.model.add_member(member) {
            debug!(owner = member.owner(), member = member.name(), "owner not declared yet");
            self.pending.push(member);
        }
    }

    fn record_unknown_tags(&mut self, file: &str, block: &CommentBlock, attached: Option<String>) {
        for tag in block.tags.iter().filter(|t| t.kind == TagKind::Unknown) {
            self.model.unknown_tags.push(UnknownTag {
                word: tag.word.clone(),
                raw: tag.raw.clone(),
                malformed: TagKind::from_word(&tag.word).is_some(),
                location: Location::new(file, block.tag_line(tag)),
                attached: attached.clone(),
            });
        }
    }

    fn finish(mut self) -> (DocModel, Vec<Diagnostic>) {
        for member in std::mem::take(&mut self.pending) {
            if let Err(member) = self.model.add_member(member) {
                self.model.unresolved.push(member);
            }
        }
        (self.model, self.diagnostics)
    }
}

fn global_from_field(owner: &str, field: FieldEntity, deprecated: bool) -> GlobalEntity {
    GlobalEntity {
        name: format!("{}.{}", owner, field.name),
        ty: field.ty,
        value: field.value,
        description: field.description,
        deprecated,
        location: field.location,
    }
}
