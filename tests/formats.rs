use std::fs;
use std::sync::Arc;

use bow_corpus::{
    CorpusError, Dictionary, MatrixMarketCorpus, MatrixMarketWriter, MemoryCorpus, SparseVec,
    SvmLightCorpus, SvmLightWriter, TextCorpus, TfidfModel, VectorCorpus,
};
use temp_dir::TempDir;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn collect<N, C>(corpus: &C) -> Vec<SparseVec<N>>
where
    N: num::Num + Copy,
    C: VectorCorpus<N>,
{
    corpus
        .try_iter()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// The corpus the original tutorial serializes: one one-entry document,
/// then an empty one.
fn tiny_corpus() -> MemoryCorpus<f64> {
    MemoryCorpus::new(vec![
        SparseVec::from_pairs([(1, 0.5)]),
        SparseVec::new(),
    ])
}

#[test]
fn matrix_market_round_trip_keeps_positions() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let path = dir.child("corpus.mm");

    MatrixMarketWriter::serialize(&path, &tiny_corpus()).unwrap();
    let corpus = MatrixMarketCorpus::open(&path).unwrap();
    assert_eq!(corpus.num_docs(), 2);
    assert_eq!(corpus.num_terms(), 2);
    assert_eq!(corpus.num_nnz(), 1);

    let docs = collect(&corpus);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].entries(), &[(1, 0.5)]);
    assert!(docs[1].is_empty());
}

#[test]
fn matrix_market_empty_documents_in_the_middle() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let path = dir.child("gaps.mm");

    let original = MemoryCorpus::new(vec![
        SparseVec::from_pairs([(0, 1.0), (1, 1.0)]),
        SparseVec::new(),
        SparseVec::new(),
        SparseVec::from_pairs([(2, 3.0)]),
    ]);
    MatrixMarketWriter::serialize(&path, &original).unwrap();

    let corpus = MatrixMarketCorpus::open(&path).unwrap();
    assert_eq!(corpus.num_docs(), 4);
    assert_eq!(collect(&corpus), original.documents().to_vec());
}

#[test]
fn matrix_market_is_restartable() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let path = dir.child("restart.mm");
    MatrixMarketWriter::serialize(&path, &tiny_corpus()).unwrap();

    let corpus = MatrixMarketCorpus::open(&path).unwrap();
    assert_eq!(collect(&corpus), collect(&corpus));
}

#[test]
fn matrix_market_empty_corpus() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let path = dir.child("empty.mm");
    MatrixMarketWriter::serialize(&path, &MemoryCorpus::<f64>::default()).unwrap();

    let corpus = MatrixMarketCorpus::open(&path).unwrap();
    assert_eq!(corpus.num_docs(), 0);
    assert!(collect(&corpus).is_empty());
}

#[test]
fn matrix_market_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.child("garbage.mm");
    fs::write(&path, "not a matrix\n1 1 1\n").unwrap();
    assert!(matches!(
        MatrixMarketCorpus::open(&path).unwrap_err(),
        CorpusError::Format { line: 1, .. }
    ));
}

#[test]
fn svmlight_round_trip_keeps_positions() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let path = dir.child("corpus.svmlight");

    SvmLightWriter::serialize(&path, &tiny_corpus()).unwrap();

    let corpus = SvmLightCorpus::new(&path).unwrap();
    let docs = collect(&corpus);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].entries(), &[(1, 0.5)]);
    assert!(docs[1].is_empty());
    // restartable like any corpus
    assert_eq!(docs, collect(&corpus));
}

#[test]
fn text_corpus_through_tfidf_to_matrix_market() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let text_path = dir.child("mycorpus.txt");
    fs::write(
        &text_path,
        "human machine interface\nhuman computer survey\ngraph trees computer\n",
    )
    .unwrap();

    let dict = Arc::new(Dictionary::from_documents(
        fs::read_to_string(&text_path)
            .unwrap()
            .lines()
            .map(bow_corpus::tokenize::simple_tokenize),
    ));
    let corpus = TextCorpus::new(&text_path, Arc::clone(&dict)).unwrap();

    let model = TfidfModel::fit(&corpus).unwrap();
    let weighted = model.transform(&corpus);

    let mm_path = dir.child("weighted.mm");
    MatrixMarketWriter::serialize(&mm_path, &weighted).unwrap();

    let round_tripped = MatrixMarketCorpus::open(&mm_path).unwrap();
    assert_eq!(round_tripped.num_docs(), 3);

    let expected = collect(&weighted);
    let observed = collect(&round_tripped);
    assert_eq!(expected.len(), observed.len());
    for (exp, obs) in expected.iter().zip(&observed) {
        assert_eq!(exp.nnz(), obs.nnz());
        for (&(id_e, w_e), &(id_o, w_o)) in exp.iter().zip(obs.iter()) {
            assert_eq!(id_e, id_o);
            assert!((w_e - w_o).abs() < 1e-12, "{} vs {}", w_e, w_o);
        }
    }
    // "human" appears in two of three documents, so it carries a nonzero
    // weight; every per-document vector is unit length
    for doc in &expected {
        let norm: f64 = doc.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }
}
