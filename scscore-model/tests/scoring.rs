use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use proptest::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

use scscore_core::compress::zstd_compress;
use scscore_core::ScscoreError;
use scscore_model::{FingerprintMode, FingerprintVector, Scorer, ScorerConfig};

const HIDDEN: usize = 8;

fn lcg(state: &mut u64) -> f64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (*state >> 11) as f64 / (1u64 << 53) as f64
}

/// A 1024 -> 8 -> 1 network. `counts` writes the first matrix as small
/// non-negative integers, which marks a count-fingerprint model.
fn network_json(width: usize, counts: bool) -> Value {
    let mut state = 42u64;
    let w1: Vec<Vec<Value>> = (0..width)
        .map(|_| {
            (0..HIDDEN)
                .map(|_| {
                    if counts {
                        json!((lcg(&mut state) * 4.0) as u64)
                    } else {
                        json!(lcg(&mut state) - 0.5)
                    }
                })
                .collect()
        })
        .collect();
    let b1: Vec<f64> = (0..HIDDEN).map(|_| lcg(&mut state) * 0.1).collect();
    let w2: Vec<Vec<f64>> = (0..HIDDEN).map(|_| vec![lcg(&mut state) - 0.5]).collect();
    json!([w1, b1, w2, [0.1]])
}

fn write_gz(dir: &Path, name: &str, doc: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&serde_json::to_vec(doc).unwrap()).unwrap();
    std::fs::write(&path, enc.finish().unwrap()).unwrap();
    path
}

fn bit_scorer(dir: &TempDir) -> Scorer {
    let path = write_gz(dir.path(), "bits.json.gz", &network_json(1024, false));
    Scorer::from_path(ScorerConfig::default(), path).unwrap()
}

#[test]
fn demo_molecules_score_in_range() {
    let dir = TempDir::new().unwrap();
    let scorer = bit_scorer(&dir);
    assert_eq!(scorer.fingerprint_mode(), Some(FingerprintMode::Bits));

    for smi in ["CCCOCCC", "CCCNc1ccccc1"] {
        let r = scorer.score(smi).unwrap();
        assert!(!r.smiles.is_empty());
        assert!(r.score > 0.0 && r.score <= 5.0, "{smi}: {}", r.score);
        assert!(r.score >= 1.0);
    }
}

#[test]
fn empty_input() {
    let dir = TempDir::new().unwrap();
    let r = bit_scorer(&dir).score("").unwrap();
    assert_eq!(r.smiles, "");
    assert_eq!(r.score, 0.0);
}

#[test]
fn weights_digest_is_recorded() {
    let dir = TempDir::new().unwrap();
    let scorer = bit_scorer(&dir);
    let digest = scorer.weights().and_then(|w| w.digest()).unwrap();
    assert_eq!(digest.len(), 64);
}

#[test]
fn uint_weights_select_count_mode() {
    let dir = TempDir::new().unwrap();
    let path = write_gz(dir.path(), "counts.json.gz", &network_json(1024, true));
    let scorer = Scorer::from_path(ScorerConfig::default(), path).unwrap();
    assert_eq!(scorer.fingerprint_mode(), Some(FingerprintMode::Counts));

    let FingerprintVector::Counts(counts) = scorer.smiles_to_fingerprint("CCCOCCC").unwrap() else {
        panic!("expected a count fingerprint");
    };
    assert_eq!(counts.len(), 1024);
    assert!(counts.iter().any(|&c| c > 1));

    let r = scorer.score("CCCOCCC").unwrap();
    assert!((1.0..=5.0).contains(&r.score));
}

#[test]
fn bit_mode_fingerprint_is_binary() {
    let dir = TempDir::new().unwrap();
    let scorer = bit_scorer(&dir);
    let fp = scorer.smiles_to_fingerprint("CCCOCCC").unwrap();
    assert_eq!(fp.mode(), FingerprintMode::Bits);
    assert!(fp.to_f64().iter().all(|&x| x == 0.0 || x == 1.0));
}

#[test]
fn zstd_weight_file_loads() {
    let dir = TempDir::new().unwrap();
    let raw = serde_json::to_vec(&network_json(1024, false)).unwrap();
    let path = dir.path().join("bits.json.zst");
    std::fs::write(&path, zstd_compress(&raw, 3).unwrap()).unwrap();

    let zstd = Scorer::from_path(ScorerConfig::default(), &path).unwrap();
    let gzip = bit_scorer(&dir);
    assert_eq!(zstd.score("CCCNc1ccccc1").unwrap(), gzip.score("CCCNc1ccccc1").unwrap());
}

#[test]
fn config_weights_path_is_used() {
    let dir = TempDir::new().unwrap();
    let path = write_gz(dir.path(), "bits.json.gz", &network_json(1024, false));
    let config = ScorerConfig { weights: Some(path), ..Default::default() };
    let mut scorer = Scorer::new(config).unwrap();
    scorer.restore(None).unwrap();
    assert!(scorer.is_restored());
}

#[test]
fn scale_changes_range() {
    let dir = TempDir::new().unwrap();
    let path = write_gz(dir.path(), "bits.json.gz", &network_json(1024, false));
    let config = ScorerConfig { score_scale: 10.0, ..Default::default() };
    let wide = Scorer::from_path(config, &path).unwrap();
    let narrow = Scorer::from_path(ScorerConfig::default(), &path).unwrap();

    let a = narrow.score("CCCOCCC").unwrap().score;
    let b = wide.score("CCCOCCC").unwrap().score;
    // same sigmoid, different stretch
    assert!(((a - 1.0) / 4.0 - (b - 1.0) / 9.0).abs() < 1e-12);
}

#[test]
fn missing_weight_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Scorer::from_path(ScorerConfig::default(), dir.path().join("nope.json.gz"))
        .unwrap_err();
    assert!(matches!(err, ScscoreError::Io(_)));
}

#[test]
fn corrupt_weight_files_are_rejected() {
    let dir = TempDir::new().unwrap();

    let plain = dir.path().join("plain.json");
    std::fs::write(&plain, b"[[1.0]]").unwrap();
    assert!(matches!(
        Scorer::from_path(ScorerConfig::default(), &plain),
        Err(ScscoreError::Compression(_))
    ));

    let bad_json = dir.path().join("bad.json.gz");
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(b"[[1.0], ").unwrap();
    std::fs::write(&bad_json, enc.finish().unwrap()).unwrap();
    assert!(matches!(
        Scorer::from_path(ScorerConfig::default(), &bad_json),
        Err(ScscoreError::Json(_))
    ));

    let ragged = write_gz(dir.path(), "ragged.json.gz", &json!([[[1.0, 2.0], [3.0]], [0.0, 0.0]]));
    assert!(matches!(
        Scorer::from_path(ScorerConfig::default(), &ragged),
        Err(ScscoreError::InvalidInput(_))
    ));
}

#[test]
fn width_mismatch_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_gz(dir.path(), "small.json.gz", &network_json(64, false));
    let err = Scorer::from_path(ScorerConfig::default(), &path).unwrap_err();
    assert!(matches!(err, ScscoreError::InvalidInput(_)));
}

#[test]
fn failed_restore_keeps_previous_weights() {
    let dir = TempDir::new().unwrap();
    let mut scorer = bit_scorer(&dir);
    let before = scorer.score("CCCOCCC").unwrap();
    assert!(scorer.restore(Some(&dir.path().join("missing.json.gz"))).is_err());
    assert_eq!(scorer.score("CCCOCCC").unwrap(), before);
}

#[test]
fn scorer_is_shareable_across_threads() {
    let dir = TempDir::new().unwrap();
    let scorer = bit_scorer(&dir);
    let expected = scorer.score("CCCNc1ccccc1").unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| scorer.score("CCCNc1ccccc1").unwrap())).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

fn smiles_strategy() -> impl Strategy<Value = String> {
    let atoms = prop::sample::select(vec!["C", "N", "O", "S", "Cl", "c1ccccc1", "C(=O)", "[NH3+]", "[C@@H](C)"]);
    prop::collection::vec(atoms, 1..8).prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn valid_smiles_score_in_range(smi in smiles_strategy()) {
        let dir = TempDir::new().unwrap();
        let scorer = bit_scorer(&dir);
        let r = scorer.score(&smi).unwrap();
        prop_assert!(r.score == 0.0 || (1.0..=5.0).contains(&r.score));
        prop_assert!(!r.smiles.is_empty());
        prop_assert_eq!(scorer.score(&smi).unwrap(), r);
    }

    #[test]
    fn fingerprint_length_is_fixed(s in "\\PC{0,24}") {
        let dir = TempDir::new().unwrap();
        let scorer = bit_scorer(&dir);
        prop_assert_eq!(scorer.smiles_to_fingerprint(&s).unwrap().len(), 1024);
        let r = scorer.score(&s).unwrap();
        prop_assert!(r.score == 0.0 || (1.0..=5.0).contains(&r.score));
    }
}
