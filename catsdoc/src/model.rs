//! Data model for the documentation graph — format-agnostic.
//!
//! Entities are created once by the builder and never mutated after
//! validation. Serialization details live in `render::json`.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Where an entity was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    /// 1-based line number
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// Literal text of a value as written in source (`6.1`, `"abc"`, `true`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal(pub String);

impl Literal {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One documented unit in the output graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Class(ClassEntity),
    Function(FunctionEntity),
    Alias(AliasEntity),
    Enum(EnumEntity),
    Global(GlobalEntity),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Class(c) => &c.name,
            Entity::Function(f) => &f.name,
            Entity::Alias(a) => &a.name,
            Entity::Enum(e) => &e.name,
            Entity::Global(g) => &g.name,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::Class(_) => "class",
            Entity::Function(_) => "function",
            Entity::Alias(_) => "alias",
            Entity::Enum(_) => "enum",
            Entity::Global(_) => "global",
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Entity::Class(c) => c.location.as_ref(),
            Entity::Function(f) => f.location.as_ref(),
            Entity::Alias(a) => a.location.as_ref(),
            Entity::Enum(e) => e.location.as_ref(),
            Entity::Global(g) => g.location.as_ref(),
        }
    }

    /// Whether this entity introduces a type name (class, alias or enum).
    pub fn is_type(&self) -> bool {
        matches!(self, Entity::Class(_) | Entity::Alias(_) | Entity::Enum(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassEntity {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `@class Name : Parent, Other`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    /// `@class List<T>` type parameters
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "crate::render::json::last_wins"
    )]
    pub fields: Vec<FieldEntity>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "crate::render::json::last_wins"
    )]
    pub methods: Vec<FunctionEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldEntity {
    pub owner: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Literal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `private`, `protected`, `public` or `package`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FunctionEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub returns: Vec<Return>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overloads: Vec<FunctionSignature>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub nodiscard: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(rename = "async", skip_serializing_if = "is_false")]
    pub is_async: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub see: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// An alternate call signature of a function.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FunctionSignature {
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub returns: Vec<Return>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Return {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AliasEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `---| "value" # description` lines
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<AliasVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasVariant {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnumEntity {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub members: Vec<EnumMember>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: String,
    /// Literal text, never re-interpreted
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Literal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl GlobalEntity {
    /// A bare `name = {}` namespace table.
    pub fn is_namespace_table(&self) -> bool {
        self.ty == "table" && self.value.is_none()
    }
}

/// A class member waiting for (or missing) its owner class.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(FieldEntity),
    Method(FunctionEntity),
}

impl Member {
    pub fn owner(&self) -> &str {
        match self {
            Member::Field(f) => &f.owner,
            Member::Method(m) => m.owner.as_deref().unwrap_or_default(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Member::Field(f) => &f.name,
            Member::Method(m) => &m.name,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Member::Field(f) => f.location.as_ref(),
            Member::Method(m) => m.location.as_ref(),
        }
    }
}

/// An unrecognized or malformed tag, kept verbatim for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownTag {
    /// The word after `@`
    pub word: String,
    pub raw: String,
    /// Whether the word names a known tag whose payload did not parse
    pub malformed: bool,
    pub location: Location,
    /// Entity the enclosing block documented, if any
    pub attached: Option<String>,
}

/// The full documentation graph.
#[derive(Debug, Default)]
pub struct DocModel {
    /// First-seen order, duplicates included
    entities: Vec<Entity>,
    /// Name → index of the first entity with that name
    index: HashMap<String, usize>,
    /// Members whose owner class never appeared
    pub unresolved: Vec<Member>,
    pub unknown_tags: Vec<UnknownTag>,
}

impl DocModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).map(|&i| &self.entities[i])
    }

    /// Position of the first class named `name`, even when another kind
    /// of entity took the name first.
    fn class_position(&self, name: &str) -> Option<usize> {
        let first = *self.index.get(name)?;
        self.entities[first..]
            .iter()
            .position(|e| matches!(e, Entity::Class(c) if c.name == name))
            .map(|n| first + n)
    }

    pub fn class(&self, name: &str) -> Option<&ClassEntity> {
        match &self.entities[self.class_position(name)?] {
            Entity::Class(class) => Some(class),
            _ => None,
        }
    }

    fn class_mut(&mut self, name: &str) -> Option<&mut ClassEntity> {
        let i = self.class_position(name)?;
        match &mut self.entities[i] {
            Entity::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.class(name).is_some()
    }

    /// Whether `name` is already a bare namespace table global.
    pub fn is_namespace_table(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Entity::Global(g)) if g.is_namespace_table())
    }

    /// Names introduced by classes, aliases and enums.
    pub fn type_names(&self) -> HashSet<&str> {
        self.entities
            .iter()
            .filter(|e| e.is_type())
            .map(|e| e.name())
            .collect()
    }

    /// Append an entity. A name seen before keeps its index entry; the
    /// duplicate stays in the entity list so validation can flag it.
    pub fn insert(&mut self, entity: Entity) {
        let name = entity.name().to_string();
        self.index.entry(name).or_insert(self.entities.len());
        self.entities.push(entity);
    }

    /// Add a class, merging into an existing class of the same name.
    ///
    /// A namespace table global of the same name is promoted to the class
    /// in place, keeping its position in the output. Any other entity of
    /// that name stays, and the class is appended after it.
    pub fn upsert_class(&mut self, class: ClassEntity) {
        if let Some(existing) = self.class_mut(&class.name) {
            if existing.description.is_none() {
                existing.description = class.description;
            }
            for parent in class.parents {
                if !existing.parents.contains(&parent) {
                    existing.parents.push(parent);
                }
            }
            for generic in class.generics {
                if !existing.generics.contains(&generic) {
                    existing.generics.push(generic);
                }
            }
            existing.deprecated |= class.deprecated;
            existing.fields.extend(class.fields);
            existing.methods.extend(class.methods);
            if existing.location.is_none() {
                existing.location = class.location;
            }
            return;
        }

        let Some(&i) = self.index.get(&class.name) else {
            self.insert(Entity::Class(class));
            return;
        };
        let namespace = match &mut self.entities[i] {
            Entity::Global(global) if global.is_namespace_table() => Some(global.description.take()),
            _ => None,
        };
        let mut class = class;
        match namespace {
            Some(description) => {
                if class.description.is_none() {
                    class.description = description;
                }
                self.entities[i] = Entity::Class(class);
            }
            None => self.entities.push(Entity::Class(class)),
        }
    }

    /// Attach a member to its owner class, handing it back when the owner
    /// is not a class (yet).
    pub fn add_member(&mut self, member: Member) -> Result<(), Member> {
        let owner = member.owner().to_string();
        let Some(class) = self.class_mut(&owner) else {
            return Err(member);
        };
        match member {
            Member::Field(field) => class.fields.push(field),
            Member::Method(method) => class.methods.push(method),
        }
        Ok(())
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}
