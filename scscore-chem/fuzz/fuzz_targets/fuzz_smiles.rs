#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(mol) = scscore_chem::parse_smiles(data) {
        let _ = scscore_chem::canonical_smiles(&mol);
        let _ = scscore_chem::morgan_counts(&mol, 2, true);
    }
});
