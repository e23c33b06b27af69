//! Validator — read-only checks over a finished model.
//!
//! Checks run in a fixed order and all of them always run:
//! unresolved owners, duplicates, unknown tags, unresolved types.

use crate::config::Config;
use crate::diagnostics::{Code, Diagnostic};
use crate::model::{DocModel, Entity, FunctionEntity, FunctionSignature, Location, Member};
use crate::types::referenced_names;
use std::collections::{HashMap, HashSet};

/// Validate a model, returning diagnostics in check order.
pub fn validate(model: &DocModel, config: &Config) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    unresolved_owners(model, &mut diagnostics);
    duplicates(model, &mut diagnostics);
    unknown_tags(model, &mut diagnostics);
    unresolved_types(model, config, &mut diagnostics);
    diagnostics
}

fn unresolved_owners(model: &DocModel, out: &mut Vec<Diagnostic>) {
    for member in &model.unresolved {
        let what = match member {
            Member::Field(_) => "field",
            Member::Method(_) => "method",
        };
        out.push(
            Diagnostic::error(
                Code::UnresolvedOwner,
                format!(
                    "class `{}` is never declared ({} `{}`)",
                    member.owner(),
                    what,
                    member.name()
                ),
            )
            .at(member.location().cloned())
            .on(member.owner()),
        );
    }
}

fn duplicates(model: &DocModel, out: &mut Vec<Diagnostic>) {
    for entity in model.entities() {
        let Entity::Class(class) = entity else {
            continue;
        };

        let mut fields: HashMap<&str, &str> = HashMap::new();
        for field in &class.fields {
            match fields.get(field.name.as_str()) {
                Some(&ty) if ty != field.ty => out.push(
                    Diagnostic::warning(
                        Code::DuplicateMember,
                        format!(
                            "field `{}` of `{}` declared as `{}` and `{}`",
                            field.name, class.name, ty, field.ty
                        ),
                    )
                    .at(field.location.clone())
                    .on(class.name.clone()),
                ),
                Some(_) => {}
                None => {
                    fields.insert(&field.name, &field.ty);
                }
            }
        }

        let mut methods: HashSet<&str> = HashSet::new();
        for method in &class.methods {
            if !methods.insert(&method.name) {
                out.push(
                    Diagnostic::warning(
                        Code::DuplicateMember,
                        format!("method `{}` of `{}` is declared twice", method.name, class.name),
                    )
                    .at(method.location.clone())
                    .on(class.name.clone()),
                );
            }
        }
    }

    let mut seen: HashMap<&str, &Entity> = HashMap::new();
    for entity in model.entities() {
        let Some(first) = seen.get(entity.name()) else {
            seen.insert(entity.name(), entity);
            continue;
        };
        let diagnostic = if first.kind_name() != entity.kind_name() {
            Diagnostic::error(
                Code::ConflictingDefinition,
                format!(
                    "`{}` is declared as both {} and {}",
                    entity.name(),
                    first.kind_name(),
                    entity.kind_name()
                ),
            )
        } else {
            Diagnostic::warning(
                Code::Redefinition,
                format!("{} `{}` is declared more than once", entity.kind_name(), entity.name()),
            )
        };
        out.push(diagnostic.at(entity.location().cloned()).on(entity.name()));
    }
}

fn unknown_tags(model: &DocModel, out: &mut Vec<Diagnostic>) {
    for tag in &model.unknown_tags {
        let target = tag.attached.as_deref().unwrap_or("unattached");
        let (code, message) = if tag.malformed {
            (
                Code::MalformedTag,
                format!("malformed @{} `{}` on {}", tag.word, tag.raw, target),
            )
        } else {
            (Code::UnknownTag, format!("unknown tag @{} on {}", tag.word, target))
        };
        let diagnostic = Diagnostic::warning(code, message).at(Some(tag.location.clone()));
        out.push(match &tag.attached {
            Some(entity) => diagnostic.on(entity.clone()),
            None => diagnostic,
        });
    }
}

/// Type expressions of one entity, with the generic names in scope.
struct TypeRefs<'a> {
    entity: String,
    location: Option<Location>,
    generics: Vec<&'a str>,
    exprs: Vec<&'a str>,
}

/// `outer` holds the type parameters of the owning class, if any.
fn function_refs<'a>(
    entity: String,
    function: &'a FunctionEntity,
    outer: &'a [String],
) -> TypeRefs<'a> {
    let signature = |s: &'a FunctionSignature| {
        s.params
            .iter()
            .map(|p| p.ty.as_str())
            .chain(s.returns.iter().map(|r| r.ty.as_str()))
    };
    let exprs = function
        .params
        .iter()
        .map(|p| p.ty.as_str())
        .chain(function.returns.iter().map(|r| r.ty.as_str()))
        .chain(function.overloads.iter().flat_map(signature))
        .collect();
    TypeRefs {
        entity,
        location: function.location.clone(),
        generics: outer
            .iter()
            .chain(&function.generics)
            .map(String::as_str)
            .collect(),
        exprs,
    }
}

fn type_refs(model: &DocModel) -> Vec<TypeRefs<'_>> {
    let mut refs = Vec::new();
    for entity in model.entities() {
        match entity {
            Entity::Class(class) => {
                refs.push(TypeRefs {
                    entity: class.name.clone(),
                    location: class.location.clone(),
                    generics: class.generics.iter().map(String::as_str).collect(),
                    exprs: class
                        .parents
                        .iter()
                        .chain(class.fields.iter().map(|f| &f.ty))
                        .map(String::as_str)
                        .collect(),
                });
                for method in &class.methods {
                    refs.push(function_refs(
                        format!("{}.{}", class.name, method.name),
                        method,
                        &class.generics,
                    ));
                }
            }
            Entity::Function(function) => {
                refs.push(function_refs(function.name.clone(), function, &[]))
            }
            Entity::Alias(alias) => refs.push(TypeRefs {
                entity: alias.name.clone(),
                location: alias.location.clone(),
                generics: Vec::new(),
                exprs: vec![alias.ty.as_str()],
            }),
            Entity::Global(global) => refs.push(TypeRefs {
                entity: global.name.clone(),
                location: global.location.clone(),
                generics: Vec::new(),
                exprs: vec![global.ty.as_str()],
            }),
            Entity::Enum(_) => {}
        }
    }
    refs
}

fn unresolved_types(model: &DocModel, config: &Config, out: &mut Vec<Diagnostic>) {
    let declared = model.type_names();
    for refs in type_refs(model) {
        let mut reported: HashSet<String> = HashSet::new();
        for expr in &refs.exprs {
            for name in referenced_names(expr) {
                let known = config.is_known_type(&name)
                    || declared.contains(name.as_str())
                    || refs.generics.contains(&name.as_str());
                if known || !reported.insert(name.clone()) {
                    continue;
                }
                out.push(
                    Diagnostic::warning(
                        Code::UnresolvedType,
                        format!("`{}` in `{}` names no known type", name, refs.entity),
                    )
                    .at(refs.location.clone())
                    .on(refs.entity.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::diagnostics::Severity;
    use crate::parser::{parse_source, ParsedFile};

    fn check(sources: &[(&str, &str)], config: &Config) -> Vec<Diagnostic> {
        let files: Vec<ParsedFile> = sources
            .iter()
            .map(|(name, src)| parse_source(name, src, config))
            .collect();
        let (model, _) = build(&files);
        validate(&model, config)
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<Code> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn unresolved_field_owner_is_one_error() {
        let diagnostics = check(
            &[("broken.lua", "---@field volume number\nmixer = {}\n")],
            &Config::default(),
        );
        assert_eq!(codes(&diagnostics), vec![Code::UnresolvedOwner]);
        let error = &diagnostics[0];
        assert_eq!(error.severity, Severity::Error);
        assert_eq!(error.entity.as_deref(), Some("mixer"));
        assert!(error.message.contains("mixer"));
        assert_eq!(error.location.as_ref().unwrap().line, 1);
    }

    #[test]
    fn conflicting_field_types_warn() {
        let diagnostics = check(
            &[(
                "a.lua",
                "---@class Track\n---@field name string\n---@field name integer\n---@field name string\n",
            )],
            &Config::default(),
        );
        assert_eq!(codes(&diagnostics), vec![Code::DuplicateMember]);
    }

    #[test]
    fn method_declared_twice_warns() {
        let diagnostics = check(
            &[(
                "a.lua",
                "---@class Track\nTrack = {}\nfunction Track:mute() end\nfunction Track:mute() end\n",
            )],
            &Config::default(),
        );
        assert_eq!(codes(&diagnostics), vec![Code::DuplicateMember]);
    }

    #[test]
    fn kind_conflicts_and_redefinitions() {
        let diagnostics = check(
            &[(
                "a.lua",
                "---@alias Mode string\n\nMode = 1\n\nVERSION = 1\nVERSION = 2\n",
            )],
            &Config::default(),
        );
        assert_eq!(
            codes(&diagnostics),
            vec![Code::ConflictingDefinition, Code::Redefinition]
        );
        assert!(diagnostics[0].is_error());
        assert!(!diagnostics[1].is_error());
    }

    #[test]
    fn unknown_and_malformed_tags_warn() {
        let diagnostics = check(
            &[("a.lua", "---@frob x\n---@param\nfunction f() end\n")],
            &Config::default(),
        );
        assert_eq!(codes(&diagnostics), vec![Code::UnknownTag, Code::MalformedTag]);
        assert!(diagnostics[0].message.ends_with("on f"));
    }

    #[test]
    fn unattached_tag_message() {
        let diagnostics = check(&[("a.lua", "---@frob x\n")], &Config::default());
        assert_eq!(diagnostics[0].message, "unknown tag @frob on unattached");
    }

    #[test]
    fn unresolved_types_once_per_entity() {
        let diagnostics = check(
            &[(
                "a.lua",
                "---@param a Widget\n---@param b Widget|string\n---@return Gadget\nfunction make(a, b) end\n",
            )],
            &Config::default(),
        );
        let names: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "`Widget` in `make` names no known type",
                "`Gadget` in `make` names no known type",
            ]
        );
    }

    #[test]
    fn generics_and_known_types_resolve() {
        let config = Config {
            known_types: vec!["Gadget".to_string()],
            ..Default::default()
        };
        let diagnostics = check(
            &[(
                "a.lua",
                "---@generic T\n---@param value T\n---@return Gadget\nfunction wrap(value) end\n",
            )],
            &config,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn class_type_parameters_resolve() {
        let diagnostics = check(
            &[(
                "list.lua",
                "---@class List<T>\n---@field items T[]\nList = {}\n\n---@param item T\n---@return Missing\nfunction List:push(item) end\n",
            )],
            &Config::default(),
        );
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["`Missing` in `List.push` names no known type"]);
    }

    #[test]
    fn class_sharing_a_function_name_conflicts_but_resolves() {
        let diagnostics = check(
            &[(
                "vec.lua",
                "function Vec(x) end\n\n---@class Vec\nVec = {}\n\nfunction Vec:len() end\n",
            )],
            &Config::default(),
        );
        assert_eq!(codes(&diagnostics), vec![Code::ConflictingDefinition]);
    }

    #[test]
    fn declared_types_resolve() {
        let diagnostics = check(
            &[(
                "a.lua",
                "---@class Song\n---@field tracks Track[]\n\n---@class Track : Song\n\n---@alias Mode \"a\"|\"b\"\n\n---@type Mode\nmode = \"a\"\n",
            )],
            &Config::default(),
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }
}
