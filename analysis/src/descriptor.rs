//! Read-only projections of symbols consumed by completion and indexing

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// Kind of a completion candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateKind {
    Variable,
    Field,
}

impl CandidateKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Variable => "VAR",
            Self::Field => "FIELD",
        }
    }
}

/// Minimal (name, type) projection of a symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateUnit {
    pub kind: CandidateKind,
    pub name: String,
    /// Resolved type, `None` while unresolved
    pub type_name: Option<String>,
    /// Declaring type, empty for local variables
    pub declaring_type: String,
}

impl CandidateUnit {
    pub fn variable(name: impl Into<String>, type_name: Option<String>) -> Self {
        Self {
            kind: CandidateKind::Variable,
            name: name.into(),
            type_name,
            declaring_type: String::new(),
        }
    }

    /// Text shown next to the candidate, e.g. `count : int`
    pub fn display_declaration(&self) -> String {
        match &self.type_name {
            Some(ty) => format!("{} : {}", self.name, ty),
            None => self.name.clone(),
        }
    }
}

/// Projection of a declared field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub declaring_type: Option<String>,
    pub name: String,
    pub modifiers: String,
    pub type_name: Option<String>,
    pub type_parameters: BTreeSet<String>,
}

impl FieldDescriptor {
    pub fn new(
        declaring_type: Option<String>,
        name: impl Into<String>,
        modifiers: impl Into<String>,
        type_name: Option<String>,
    ) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            modifiers: modifiers.into(),
            type_name,
            type_parameters: BTreeSet::new(),
        }
    }

    /// Source-like declaration text: `private final String name`
    pub fn declaration(&self) -> String {
        let ty = self.type_name.as_deref().unwrap_or("?");
        if self.modifiers.is_empty() {
            format!("{} {}", ty, self.name)
        } else {
            format!("{} {} {}", self.modifiers, ty, self.name)
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.split_whitespace().any(|m| m == "static")
    }

    pub fn to_candidate_unit(&self) -> CandidateUnit {
        CandidateUnit {
            kind: CandidateKind::Field,
            name: self.name.clone(),
            type_name: self.type_name.clone(),
            declaring_type: self.declaring_type.clone().unwrap_or_default(),
        }
    }
}
