//! Element symbols and default valences.

/// A chemical element as far as SMILES handling needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub atomic_number: u8,
    pub symbol: &'static str,
}

/// The SMILES wildcard atom `*`, atomic number 0.
pub const WILDCARD: Element = Element { atomic_number: 0, symbol: "*" };

/// Symbols for H (1) through Og (118), indexed by `atomic_number - 1`.
static SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Look up an element by its symbol (e.g. "C", "Fe", or "*").
pub fn element_by_symbol(symbol: &str) -> Option<Element> {
    if symbol == WILDCARD.symbol {
        return Some(WILDCARD);
    }
    SYMBOLS
        .iter()
        .position(|&s| s == symbol)
        .map(|i| Element { atomic_number: (i + 1) as u8, symbol: SYMBOLS[i] })
}

/// Look up an element by its atomic number; 0 is the wildcard.
pub fn element_by_number(n: u8) -> Option<Element> {
    if n == 0 {
        return Some(WILDCARD);
    }
    let idx = (n as usize).checked_sub(1)?;
    SYMBOLS.get(idx).map(|&symbol| Element { atomic_number: n, symbol })
}

/// Allowed valences of the SMILES organic subset, smallest first.
///
/// Implicit hydrogens fill an atom up to the smallest listed valence that is
/// at least its explicit bond-order sum. Elements outside the subset have none.
pub fn default_valences(atomic_number: u8) -> &'static [u8] {
    match atomic_number {
        5 => &[3],
        6 => &[4],
        7 | 15 => &[3, 5],
        8 => &[2],
        16 => &[2, 4, 6],
        9 | 17 | 35 | 53 => &[1],
        _ => &[],
    }
}

/// Whether an unbracketed atom of this element may appear in SMILES.
pub fn is_organic_subset(atomic_number: u8, is_aromatic: bool) -> bool {
    if is_aromatic {
        matches!(atomic_number, 5 | 6 | 7 | 8 | 15 | 16)
    } else {
        atomic_number == 0 || !default_valences(atomic_number).is_empty()
    }
}
