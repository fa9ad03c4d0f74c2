//! Document models
//!
//! Every field is optional or defaults to empty: include/exclude projections
//! may strip any part of a stored document, and the same structs must still
//! deserialize what is left.

mod gene;
mod ontology;
mod transcript;
mod variant;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::predicate::EntitySchema;
use crate::query::EntityQuery;

pub use gene::{Disease, Drug, Expression, Gene, GeneAnnotation, GENE_SCHEMA};
pub use ontology::{OntologyTerm, ONTOLOGY_SCHEMA};
pub use transcript::{Exon, Tfbs, Transcript, TRANSCRIPT_SCHEMA};
pub use variant::{
    ConsequenceType, SequenceOntologyTerm, StructuralVariation, Variant, VariantAnnotation,
    VARIANT_SCHEMA,
};

/// The kinds of biological entity the engine can query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Gene,
    Transcript,
    Variant,
    Ontology,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Gene => "gene",
            EntityKind::Transcript => "transcript",
            EntityKind::Variant => "variant",
            EntityKind::Ontology => "ontology",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queryable document type, tied to its query object and field catalog
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    type Query: EntityQuery;

    fn schema() -> &'static EntitySchema;

    fn kind() -> EntityKind {
        Self::schema().kind
    }
}

/// Cross-reference to an external database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Xref {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
}
