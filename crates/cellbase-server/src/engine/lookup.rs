//! Gene and transcript sub-resources
//!
//! Each operation resolves its inputs through the gene identifier fields
//! (`transcripts.xrefs.id`) and returns one envelope per input, in input
//! order, with the envelope `id` set to the input.

use super::EntityManager;
use crate::error::EngineResult;
use crate::models::{Gene, Transcript};
use crate::query::{EntityQuery, GeneQuery, QueryOptions};
use crate::result::DataResult;

/// Default projection of the binding-site lookup
pub const TFBS_INCLUDE: &[&str] = &["id", "name", "transcripts.id", "transcripts.tfbs"];

/// Projection used to fetch transcript sequences out of gene documents
pub const SEQUENCE_INCLUDE: &[&str] = &["transcripts.id", "transcripts.cDnaSequence"];

fn include(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|path| (*path).to_string()).collect()
}

impl EntityManager<Gene> {
    /// Transcription factor binding sites of the transcripts of each gene
    ///
    /// Without an explicit `include` only the gene and transcript ids and
    /// the binding sites are returned.
    pub async fn tfbs(
        &self,
        template: &GeneQuery,
        ids: Vec<String>,
    ) -> EngineResult<Vec<DataResult<Gene>>> {
        let mut template = template.clone();
        if template.options().include.is_empty() {
            template.options_mut().include = include(TFBS_INCLUDE);
        }
        self.info(&template, ids).await
    }

    /// cDNA sequence of each transcript
    ///
    /// The gene carrying the transcript is looked up by the transcript id;
    /// the envelope holds that transcript's sequence, or nothing when the
    /// transcript is unknown or has no stored sequence.
    #[tracing::instrument(skip_all, fields(inputs = ids.len()))]
    pub async fn transcript_sequences(
        &self,
        ids: Vec<String>,
    ) -> EngineResult<Vec<DataResult<String>>> {
        let template = GeneQuery::default().with_options(QueryOptions {
            include: include(SEQUENCE_INCLUDE),
            ..Default::default()
        });
        self.prepare(&template)?;

        Ok(self
            .batch
            .run(self.kind(), ids, |_, id| {
                let query = template.clone().with_identifier(id.clone());
                async move {
                    let genes = self.search(&query).await?;
                    let wanted = id.as_str();
                    let sequences = genes.flat_map_results(move |gene| {
                        gene.transcripts
                            .into_iter()
                            .filter(move |t| t.id.as_deref() == Some(wanted))
                            .filter_map(|t: Transcript| t.cdna_sequence)
                    });
                    Ok(sequences)
                }
            })
            .await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::backend::{InMemoryBackend, SharedBackend};
    use crate::config::QueryConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn genes() -> EntityManager<Gene> {
        let backend: SharedBackend = Arc::new(InMemoryBackend::new().with_collection(
            "gene",
            vec![
                json!({"id": "G1", "name": "BRCA2",
                       "transcripts": [
                           {"id": "T1", "xrefs": [{"id": "T1"}, {"id": "BRCA2"}],
                            "cDnaSequence": "ACGT", "tfbs": [{"id": "CTCF", "start": 10, "end": 20}]},
                           {"id": "T2", "xrefs": [{"id": "T2"}, {"id": "BRCA2"}]}
                       ]}),
                json!({"id": "G2", "name": "TP53",
                       "transcripts": [{"id": "T3", "xrefs": [{"id": "T3"}], "cDnaSequence": "TTGA"}]}),
            ],
        ));
        EntityManager::new(backend, Arc::new(QueryConfig::default()))
    }

    #[tokio::test]
    async fn test_transcript_sequences_follow_input_order() {
        let ids = vec!["T3".to_string(), "T2".to_string(), "T1".to_string(), "T9".to_string()];
        let results = genes().transcript_sequences(ids).await.unwrap();

        let returned: Vec<&str> = results.iter().map(|r| r.id()).collect();
        assert_eq!(returned, ["T3", "T2", "T1", "T9"]);
        assert_eq!(results[0].results(), ["TTGA"]);
        assert_eq!(results[1].num_results(), 0);
        assert_eq!(results[2].results(), ["ACGT"]);
        assert_eq!(results[3].num_results(), 0);
    }

    #[tokio::test]
    async fn test_tfbs_projects_binding_sites() {
        let results = genes()
            .tfbs(&GeneQuery::default(), vec!["BRCA2".into()])
            .await
            .unwrap();
        let gene = &results[0].results()[0];
        assert_eq!(results[0].id(), "BRCA2");
        assert_eq!(gene.name.as_deref(), Some("BRCA2"));
        assert_eq!(gene.transcripts[0].tfbs[0].id.as_deref(), Some("CTCF"));
        assert!(gene.transcripts.iter().all(|t| t.xrefs.is_empty() && t.cdna_sequence.is_none()));

        let explicit = GeneQuery::default().with_options(QueryOptions {
            include: vec!["id".into()],
            ..Default::default()
        });
        let results = genes().tfbs(&explicit, vec!["BRCA2".into()]).await.unwrap();
        assert!(results[0].results()[0].transcripts.is_empty());
    }
}
