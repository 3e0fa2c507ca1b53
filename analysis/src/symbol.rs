//! Symbol identity model for declared name occurrences
//!
//! A name occurrence is built in two phases. The parser produces an
//! [`Occurrence`] while walking a file; the resolution phase turns it into a
//! [`Symbol`] exactly once. A `Symbol` never changes after that, so its
//! equality and hash are stable for the lifetime of the value.
//!
//! Identity is `(name, text_position, resolved_type)`. Flags, modifiers and
//! the declaring type are presentation metadata and do not take part in
//! equality, which lets an index replace a re-resolved occurrence in place.

use crate::descriptor::CandidateUnit;
use crate::descriptor::FieldDescriptor;
use crate::types::TextRange;
use serde::Deserialize;
use serde::Serialize;
use std::hash::Hash;
use std::hash::Hasher;

/// An unresolved name occurrence, as produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    name: String,
    text_position: usize,
    range: TextRange,
    is_declaration: bool,
    is_parameter: bool,
    is_field: bool,
    parameter_index: Option<u32>,
    modifiers: Option<String>,
    declaring_type: Option<String>,
}

impl Occurrence {
    pub fn new(name: impl Into<String>, text_position: usize, range: TextRange) -> Self {
        Self {
            name: name.into(),
            text_position,
            range,
            is_declaration: false,
            is_parameter: false,
            is_field: false,
            parameter_index: None,
            modifiers: None,
            declaring_type: None,
        }
    }

    /// Mark this occurrence as the declaring site of the name
    pub fn declaration(mut self) -> Self {
        self.is_declaration = true;
        self
    }

    /// Mark this occurrence as a field of `declaring_type`
    pub fn field(mut self, modifiers: Option<&str>, declaring_type: impl Into<String>) -> Self {
        self.is_field = true;
        self.modifiers = modifiers.map(str::to_string);
        self.declaring_type = Some(declaring_type.into());
        self
    }

    /// Mark this occurrence as the `index`-th formal parameter
    pub fn parameter(mut self, index: u32) -> Self {
        self.is_parameter = true;
        self.parameter_index = Some(index);
        self
    }

    pub fn with_modifiers(mut self, modifiers: impl Into<String>) -> Self {
        self.modifiers = Some(modifiers.into());
        self
    }

    /// Record the enclosing type of a non-field occurrence
    pub fn declared_in(mut self, declaring_type: impl Into<String>) -> Self {
        self.declaring_type = Some(declaring_type.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn text_position(&self) -> usize {
        self.text_position
    }

    /// Resolution step: attach the resolved type and freeze the occurrence
    pub fn resolve(self, resolved_type: Option<String>) -> Symbol {
        Symbol {
            occurrence: self,
            resolved_type,
        }
    }

    /// Freeze the occurrence without a type (resolution failed or was skipped)
    pub fn unresolved(self) -> Symbol {
        self.resolve(None)
    }
}

/// A resolved declared-name occurrence (variable, parameter, or field)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    occurrence: Occurrence,
    resolved_type: Option<String>,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.occurrence.name
    }

    pub const fn text_position(&self) -> usize {
        self.occurrence.text_position
    }

    pub const fn range(&self) -> TextRange {
        self.occurrence.range
    }

    pub fn resolved_type(&self) -> Option<&str> {
        self.resolved_type.as_deref()
    }

    pub const fn is_declaration(&self) -> bool {
        self.occurrence.is_declaration
    }

    pub const fn is_parameter(&self) -> bool {
        self.occurrence.is_parameter
    }

    pub const fn is_field(&self) -> bool {
        self.occurrence.is_field
    }

    /// Formal parameter index, `None` when not a parameter
    pub const fn parameter_index(&self) -> Option<u32> {
        self.occurrence.parameter_index
    }

    pub fn modifiers(&self) -> Option<&str> {
        self.occurrence.modifiers.as_deref()
    }

    pub fn declaring_type(&self) -> Option<&str> {
        self.occurrence.declaring_type.as_deref()
    }

    pub const fn occurrence(&self) -> &Occurrence {
        &self.occurrence
    }

    /// Produce the symbol an incremental pass yields when the type changes.
    /// The result is a distinct identity whenever the type differs.
    pub fn reresolve(&self, resolved_type: Option<String>) -> Self {
        self.occurrence.clone().resolve(resolved_type)
    }

    pub fn to_candidate_unit(&self) -> CandidateUnit {
        CandidateUnit::variable(self.name(), self.resolved_type.clone())
    }

    /// Declared-field fast path; `None` unless this is a field declaration
    /// with known modifiers.
    pub fn to_field_descriptor(&self) -> Option<FieldDescriptor> {
        let occurrence = &self.occurrence;
        if !(occurrence.is_field && occurrence.is_declaration) {
            return None;
        }
        let modifiers = occurrence.modifiers.as_ref()?;
        Some(FieldDescriptor::new(
            occurrence.declaring_type.clone(),
            occurrence.name.clone(),
            modifiers.clone(),
            self.resolved_type.clone(),
        ))
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.occurrence.text_position == other.occurrence.text_position
            && self.occurrence.name == other.occurrence.name
            && self.resolved_type == other.resolved_type
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.occurrence.name.hash(state);
        self.occurrence.text_position.hash(state);
        self.resolved_type.hash(state);
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let occurrence = &self.occurrence;
        write!(
            f,
            "Symbol{{modifiers={}, name={}, type={}, range={}, isField={}, isDecl={}, isParameter={}, pos={}}}",
            occurrence.modifiers.as_deref().unwrap_or("null"),
            occurrence.name,
            self.resolved_type.as_deref().unwrap_or("null"),
            occurrence.range,
            occurrence.is_field,
            occurrence.is_declaration,
            occurrence.is_parameter,
            occurrence.text_position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::CandidateKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn local(name: &str, pos: usize) -> Occurrence {
        Occurrence::new(name, pos, TextRange::on_line(1, pos as u32, name.len() as u32))
    }

    #[test]
    fn test_flags_do_not_affect_identity() {
        let plain = local("count", 12).resolve(Some("int".to_string()));
        let field = local("count", 12)
            .declaration()
            .field(Some("private"), "Counter")
            .resolve(Some("int".to_string()));

        assert_eq!(plain, field);

        let mut set = HashSet::new();
        set.insert(plain);
        assert!(!set.insert(field));
    }

    #[test]
    fn test_resolved_type_is_part_of_identity() {
        let before = local("value", 40).unresolved();
        let after = before.reresolve(Some("java.lang.String".to_string()));

        assert_ne!(before, after);
        assert_eq!(after.resolved_type(), Some("java.lang.String"));
        assert_eq!(after.name(), "value");
        assert_eq!(after.text_position(), 40);
    }

    #[test]
    fn test_field_descriptor_only_for_declared_fields_with_modifiers() {
        let declared = local("name", 3)
            .declaration()
            .field(Some("private final"), "com.example.User")
            .resolve(Some("String".to_string()));
        let descriptor = declared.to_field_descriptor().unwrap();
        assert_eq!(descriptor.declaring_type.as_deref(), Some("com.example.User"));
        assert_eq!(descriptor.modifiers, "private final");
        assert_eq!(descriptor.type_name.as_deref(), Some("String"));

        let no_modifiers = local("name", 3)
            .declaration()
            .field(None, "com.example.User")
            .unresolved();
        assert!(no_modifiers.to_field_descriptor().is_none());

        let field_use = local("name", 30)
            .field(Some("private"), "com.example.User")
            .unresolved();
        assert!(field_use.to_field_descriptor().is_none());

        let parameter = local("arg", 8)
            .declaration()
            .parameter(0)
            .with_modifiers("final")
            .resolve(Some("int".to_string()));
        assert!(parameter.to_field_descriptor().is_none());
        assert_eq!(parameter.parameter_index(), Some(0));
    }

    #[test]
    fn test_candidate_unit_is_total() {
        let unresolved = local("tmp", 0).unresolved();
        let unit = unresolved.to_candidate_unit();
        assert_eq!(unit.kind, CandidateKind::Variable);
        assert_eq!(unit.name, "tmp");
        assert_eq!(unit.type_name, None);
        assert_eq!(unit.declaring_type, "");
    }

    #[test]
    fn test_declared_in_keeps_local_out_of_fields() {
        let local_in_method = local("buffer", 17)
            .declaration()
            .declared_in("com.example.Reader")
            .with_modifiers("final")
            .resolve(Some("byte[]".to_string()));

        assert_eq!(local_in_method.declaring_type(), Some("com.example.Reader"));
        assert!(!local_in_method.is_field());
        assert!(local_in_method.to_field_descriptor().is_none());
        assert_eq!(local_in_method.to_candidate_unit().declaring_type, "");
    }

    #[test]
    fn test_display() {
        let symbol = local("x", 4).declaration().resolve(Some("int".to_string()));
        assert_eq!(
            symbol.to_string(),
            "Symbol{modifiers=null, name=x, type=int, range=1:4-5, isField=false, isDecl=true, isParameter=false, pos=4}"
        );
    }

    proptest! {
        #[test]
        fn equality_is_keyed_on_name_position_and_type(
            name_a in "[a-c]{1,2}",
            name_b in "[a-c]{1,2}",
            pos_a in 0usize..4,
            pos_b in 0usize..4,
            ty_a in proptest::option::of("[xy]"),
            ty_b in proptest::option::of("[xy]"),
            field_a in any::<bool>(),
            param_b in any::<bool>(),
            modifiers_a in proptest::option::of("(public|private)"),
        ) {
            let mut a = local(&name_a, pos_a);
            if field_a {
                a = a.declaration().field(None, "T");
            }
            if let Some(modifiers) = modifiers_a {
                a = a.with_modifiers(modifiers);
            }
            let mut b = local(&name_b, pos_b);
            if param_b {
                b = b.parameter(1);
            }
            let a = a.resolve(ty_a.clone());
            let b = b.resolve(ty_b.clone());

            let expected = (name_a, pos_a, ty_a) == (name_b, pos_b, ty_b);
            prop_assert_eq!(a == b, expected);
        }
    }
}
