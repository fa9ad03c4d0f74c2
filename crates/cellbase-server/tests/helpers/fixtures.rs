//! Test fixtures and document builders for CellBase server tests
//!
//! Small, hand-picked collections covering the shapes the engine has to
//! handle: genes with nested transcripts and annotation, point and
//! copy-number variants, and ontology terms without coordinates.

use serde_json::{json, Value};

// ============================================================================
// Gene Fixtures
// ============================================================================

/// Builder for gene documents
#[derive(Debug, Clone)]
pub struct GeneFixture {
    id: String,
    name: String,
    biotype: String,
    chromosome: String,
    start: i64,
    end: i64,
    strand: String,
    transcripts: Vec<Value>,
    diseases: Vec<Value>,
}

impl GeneFixture {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            biotype: "protein_coding".to_string(),
            chromosome: "1".to_string(),
            start: 1,
            end: 1000,
            strand: "+".to_string(),
            transcripts: Vec::new(),
            diseases: Vec::new(),
        }
    }

    pub fn biotype(mut self, biotype: impl Into<String>) -> Self {
        self.biotype = biotype.into();
        self
    }

    pub fn at(mut self, chromosome: impl Into<String>, start: i64, end: i64) -> Self {
        self.chromosome = chromosome.into();
        self.start = start;
        self.end = end;
        self
    }

    pub fn reverse(mut self) -> Self {
        self.strand = "-".to_string();
        self
    }

    /// Adds a transcript cross-referenced by its own id and the gene name
    pub fn transcript(mut self, id: &str, biotype: &str) -> Self {
        let name = format!("{}-{}", self.name, 201 + self.transcripts.len());
        self.transcripts.push(json!({
            "id": id,
            "name": name,
            "biotype": biotype,
            "xrefs": [{"id": id, "dbName": "ensembl_transcript"}, {"id": self.name, "dbName": "hgnc_symbol"}],
        }));
        self
    }

    /// Sets the cDNA of the most recently added transcript
    pub fn cdna(mut self, sequence: &str) -> Self {
        if let Some(Value::Object(transcript)) = self.transcripts.last_mut() {
            transcript.insert("cDnaSequence".to_string(), json!(sequence));
        }
        self
    }

    /// Adds a binding site to the most recently added transcript
    pub fn tfbs(mut self, id: &str, start: i64, end: i64) -> Self {
        if let Some(Value::Object(transcript)) = self.transcripts.last_mut() {
            let sites = transcript.entry("tfbs").or_insert_with(|| json!([]));
            if let Value::Array(sites) = sites {
                sites.push(json!({"id": id, "start": start, "end": end}));
            }
        }
        self
    }

    pub fn disease(mut self, id: &str, name: &str) -> Self {
        self.diseases.push(json!({"id": id, "name": name, "source": "clinvar"}));
        self
    }

    pub fn build(self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "biotype": self.biotype,
            "chromosome": self.chromosome,
            "start": self.start,
            "end": self.end,
            "strand": self.strand,
            "source": "ensembl",
            "transcripts": self.transcripts,
            "annotation": {"diseases": self.diseases},
        })
    }
}

pub fn genes() -> Vec<Value> {
    vec![
        GeneFixture::new("ENSG00000139618", "BRCA2")
            .at("13", 32315474, 32400266)
            .transcript("ENST00000380152", "protein_coding")
            .disease("OMIM:612555", "Fanconi anemia")
            .build(),
        GeneFixture::new("ENSG00000012048", "BRCA1")
            .at("17", 43044295, 43125483)
            .reverse()
            .transcript("ENST00000357654", "protein_coding")
            .cdna("ATGGATTTATCTGCTCTTCGCGTTGAAGAAG")
            .tfbs("MA0139.1", 43125400, 43125419)
            .transcript("ENST00000461221", "nonsense_mediated_decay")
            .disease("OMIM:604370", "Breast-ovarian cancer")
            .build(),
        GeneFixture::new("ENSG00000141510", "TP53")
            .at("17", 7661779, 7687550)
            .reverse()
            .transcript("ENST00000269305", "protein_coding")
            .cdna("ATGGAGGAGCCGCAGTCAGATCCTAGC")
            .build(),
        GeneFixture::new("ENSG00000284190", "MIR21")
            .biotype("miRNA")
            .at("17", 59841266, 59841337)
            .transcript("ENST00000362134", "miRNA")
            .build(),
        GeneFixture::new("ENSG00000230368", "FAM41C")
            .biotype("lncRNA")
            .at("1", 868071, 876903)
            .reverse()
            .build(),
    ]
}

// ============================================================================
// Transcript Fixtures
// ============================================================================

pub fn transcripts() -> Vec<Value> {
    vec![
        json!({"id": "ENST00000380152", "name": "BRCA2-201", "biotype": "protein_coding",
               "chromosome": "13", "start": 32315474, "end": 32400266, "strand": "+",
               "geneId": "ENSG00000139618", "geneName": "BRCA2",
               "xrefs": [{"id": "BRCA2"}], "flags": ["canonical", "MANE Select"]}),
        json!({"id": "ENST00000357654", "name": "BRCA1-203", "biotype": "protein_coding",
               "chromosome": "17", "start": 43044295, "end": 43125364, "strand": "-",
               "geneId": "ENSG00000012048", "geneName": "BRCA1",
               "xrefs": [{"id": "BRCA1"}], "flags": ["canonical"]}),
        json!({"id": "ENST00000269305", "name": "TP53-201", "biotype": "protein_coding",
               "chromosome": "17", "start": 7661779, "end": 7687538, "strand": "-",
               "geneId": "ENSG00000141510", "geneName": "TP53", "xrefs": [{"id": "TP53"}]}),
    ]
}

// ============================================================================
// Variant Fixtures
// ============================================================================

fn snv(id: &str, chromosome: &str, position: i64, reference: &str, alternate: &str, gene: &str) -> Value {
    json!({
        "id": id,
        "chromosome": chromosome,
        "start": position,
        "end": position,
        "reference": reference,
        "alternate": alternate,
        "type": "SNV",
        "annotation": {
            "consequenceTypes": [
                {"geneName": gene, "sequenceOntologyTerms": [{"accession": "SO:0001583", "name": "missense_variant"}]}
            ],
            "xrefs": [{"id": id, "source": "dbSNP"}],
        },
    })
}

pub fn variants() -> Vec<Value> {
    vec![
        snv("rs699", "1", 230710048, "A", "G", "AGT"),
        snv("rs6025", "1", 169549811, "C", "T", "F5"),
        snv("rs113488022", "7", 140753336, "A", "T", "BRAF"),
        json!({
            "id": "1:1000000-2000000:N:<CN0>",
            "chromosome": "1", "start": 1000000, "end": 2000000,
            "reference": "N", "alternate": "<CN0>", "type": "CNV",
            "sv": {"ciStartLeft": 999000, "ciStartRight": 1001000,
                   "ciEndLeft": 1999000, "ciEndRight": 2001000, "copyNumber": 0},
        }),
        json!({
            "id": "1:5000000-6000000:N:<CN3>",
            "chromosome": "1", "start": 5000000, "end": 6000000,
            "reference": "N", "alternate": "<CN3>", "type": "CNV",
            "sv": {"ciStartLeft": 5000000, "ciStartRight": 5000000,
                   "ciEndLeft": 6000000, "ciEndRight": 6000000, "copyNumber": 3},
        }),
    ]
}

// ============================================================================
// Ontology Fixtures
// ============================================================================

pub fn ontology_terms() -> Vec<Value> {
    vec![
        json!({"id": "GO:0008150", "name": "biological_process", "namespace": "biological_process",
               "source": "GO", "children": ["GO:0009987"],
               "definition": "A biological process is the execution of a genetically-encoded biological module."}),
        json!({"id": "GO:0009987", "name": "cellular process", "namespace": "biological_process",
               "source": "GO", "parents": ["GO:0008150"], "synonyms": ["cell physiology"]}),
        json!({"id": "HP:0000118", "name": "Phenotypic abnormality", "namespace": "human_phenotype",
               "source": "HP", "synonyms": ["Organ abnormality"]}),
    ]
}
