use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scscore_chem::{canonical_smiles, morgan_counts, morgan_fingerprint_with, parse_smiles};

/// A set of representative drug-like SMILES strings
const SMILES_SET: &[&str] = &[
    "CCCOCCC",                              // dipropyl ether
    "CCCNc1ccccc1",                         // N-propylaniline
    "CC(=O)Oc1ccccc1C(=O)O",                // aspirin
    "CC12CCC3C(C1CCC2O)CCC4=CC(=O)CCC34C",  // testosterone
    "CN1C=NC2=C1C(=O)N(C(=O)N2C)C",         // caffeine
    "CC(C)CC1=CC=C(C=C1)C(C)C(=O)O",        // ibuprofen
    "N[C@@H](C)C(=O)O",                     // L-alanine
    "c1ccc2ccccc2c1",                       // naphthalene
    "c1cc[nH]c1",                           // pyrrole
    "CC(=O)NC1=CC=C(C=C1)O",                // acetaminophen
];

fn bench_smiles_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("smiles_parse");
    let smiles_1k: Vec<&str> = SMILES_SET.iter().copied().cycle().take(1000).collect();

    group.bench_function("1k_mols", |b| {
        b.iter(|| {
            for &smi in black_box(&smiles_1k) {
                let _ = parse_smiles(smi);
            }
        })
    });
    group.finish();
}

fn bench_canonical(c: &mut Criterion) {
    let mols: Vec<_> = SMILES_SET.iter().filter_map(|s| parse_smiles(s).ok()).collect();

    c.bench_function("canonical_smiles_10", |b| {
        b.iter(|| {
            for mol in black_box(&mols) {
                let _ = canonical_smiles(mol);
            }
        })
    });
}

fn bench_morgan(c: &mut Criterion) {
    let mut group = c.benchmark_group("morgan");
    let mols: Vec<_> = SMILES_SET.iter().filter_map(|s| parse_smiles(s).ok()).collect();
    let mols_1k: Vec<_> = mols.iter().cycle().take(1000).collect();

    group.bench_function("bits_1k_r2_1024", |b| {
        b.iter(|| {
            for mol in black_box(&mols_1k) {
                let _ = morgan_fingerprint_with(mol, 2, 1024, true);
            }
        })
    });
    group.bench_function("counts_1k_r2", |b| {
        b.iter(|| {
            for mol in black_box(&mols_1k) {
                let _ = morgan_counts(mol, 2, true);
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_smiles_parse, bench_canonical, bench_morgan);
criterion_main!(benches);
