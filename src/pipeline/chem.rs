//! Ligand structure parsing
//!
//! The cleaner only needs two things from a chemistry toolkit: whether a
//! SMILES string describes a valid molecule, and how many atoms it has.
//! `MoleculeParser` is that seam; `SmilesParser` implements it for
//! OpenSMILES syntax (organic subset, bracket atoms, bonds, branches, ring
//! closures and disconnected components).
//!
//! After the graph is built it is sanitised: aromatic atoms must sit in a
//! ring, every aromatic system must have a Kekule form, and no atom may
//! exceed its allowed valence given its charge and hydrogen count.

use std::collections::{HashMap, VecDeque};
use std::iter::Peekable;
use std::str::Chars;

use super::error::{CurateError, CurateResult};

/// Element symbols accepted inside bracket atoms
const ELEMENTS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Aromatic symbols allowed inside brackets
const BRACKET_AROMATICS: [&str; 8] = ["b", "c", "n", "o", "p", "s", "se", "as"];

/// Collaborator that validates structure strings and reports atom counts.
pub trait MoleculeParser {
    /// Parse `structure`, failing with `CurateError::Chemistry` if invalid.
    fn parse(&self, structure: &str) -> CurateResult<Molecule>;

    /// Number of atoms in the parsed molecule
    fn atom_count(&self, structure: &str) -> CurateResult<usize> {
        Ok(self.parse(structure)?.num_atoms())
    }
}

/// Atom of a parsed molecule
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub symbol: String,
    pub aromatic: bool,
    pub isotope: Option<u16>,
    pub charge: i32,
    /// Hydrogens written inside the brackets; always 0 for organic-subset atoms
    pub hydrogens: u32,
    pub bracket: bool,
}

impl Atom {
    fn is_plain_hydrogen(&self) -> bool {
        self.symbol == "H" && self.isotope.is_none()
    }

    fn atomic_number(&self) -> Option<i32> {
        ELEMENTS
            .iter()
            .position(|e| *e == self.symbol)
            .map(|i| i as i32 + 1)
    }

    /// Allowed valences, looked up for the isoelectronic element so that
    /// `[N+]` behaves like carbon and `[O-]` like fluorine.
    ///
    /// `None` for elements without a fixed valence (metals, noble gases, `*`).
    fn allowed_valences(&self) -> Option<&'static [u32]> {
        let valences: &'static [u32] = match self.atomic_number()? - self.charge {
            1 | 3 | 9 | 11 | 17 | 19 | 35 => &[1],
            5 => &[3],
            6 | 14 => &[4],
            7 => &[3],
            8 | 12 | 20 => &[2],
            15 | 33 => &[3, 5, 7],
            16 | 34 | 52 => &[2, 4, 6],
            53 => &[1, 3, 5],
            _ => return None,
        };
        Some(valences)
    }
}

/// Bond order as written (or implied) in the SMILES string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {
    fn from_symbol(symbol: char) -> Self {
        match symbol {
            '=' => Self::Double,
            '#' => Self::Triple,
            '$' => Self::Quadruple,
            ':' => Self::Aromatic,
            _ => Self::Single,
        }
    }

    /// Valence contribution with aromatic bonds counted as single
    fn valence(self) -> u32 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quadruple => 4,
        }
    }
}

/// Bond between two atoms of a parsed molecule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

impl Bond {
    fn touches(&self, atom: usize) -> bool {
        self.begin == atom || self.end == atom
    }

    fn joins(&self, a: usize, b: usize) -> bool {
        (self.begin == a && self.end == b) || (self.begin == b && self.end == a)
    }
}

/// Molecular graph produced by the parser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

impl Molecule {
    /// Atom count with hydrogens kept implicit.
    ///
    /// Explicit `[H]` atoms bonded to a heavier atom are folded into their
    /// neighbour the way a toolkit's default hydrogen removal does; isotopic,
    /// isolated and H-H bonded hydrogens still count.
    pub fn num_atoms(&self) -> usize {
        let mut folded = vec![false; self.atoms.len()];
        for bond in &self.bonds {
            let (a, b) = (bond.begin, bond.end);
            let (atom_a, atom_b) = (&self.atoms[a], &self.atoms[b]);
            if atom_a.is_plain_hydrogen() && !atom_b.is_plain_hydrogen() {
                folded[a] = true;
            }
            if atom_b.is_plain_hydrogen() && !atom_a.is_plain_hydrogen() {
                folded[b] = true;
            }
        }
        folded.iter().filter(|f| !**f).count()
    }
}

/// OpenSMILES parser
#[derive(Debug, Clone, Copy, Default)]
pub struct SmilesParser;

impl MoleculeParser for SmilesParser {
    fn parse(&self, structure: &str) -> CurateResult<Molecule> {
        parse_smiles(structure).map_err(|reason| CurateError::Chemistry {
            smiles: structure.to_string(),
            reason,
        })
    }
}

struct ParseState {
    molecule: Molecule,
    current: Option<usize>,
    pending_bond: Option<char>,
    branches: Vec<Option<usize>>,
    /// Open ring closures: atom and the bond symbol written at the opening digit
    rings: HashMap<u32, (usize, Option<char>)>,
}

impl ParseState {
    fn add_bond(&mut self, begin: usize, end: usize, symbol: Option<char>) {
        let atoms = &self.molecule.atoms;
        let order = match symbol {
            Some(s) => BondOrder::from_symbol(s),
            None if atoms[begin].aromatic && atoms[end].aromatic => BondOrder::Aromatic,
            None => BondOrder::Single,
        };
        self.molecule.bonds.push(Bond { begin, end, order });
    }

    fn add_atom(&mut self, atom: Atom) {
        let idx = self.molecule.atoms.len();
        self.molecule.atoms.push(atom);
        if let Some(prev) = self.current {
            self.add_bond(prev, idx, self.pending_bond);
        }
        self.pending_bond = None;
        self.current = Some(idx);
    }

    fn ring_closure(&mut self, number: u32) -> Result<(), String> {
        let current = self
            .current
            .ok_or_else(|| format!("ring closure {} without a preceding atom", number))?;
        match self.rings.remove(&number) {
            Some((open, _)) if open == current => {
                Err(format!("ring closure {} bonds an atom to itself", number))
            }
            Some((open, opening_symbol)) => {
                if self.molecule.bonds.iter().any(|b| b.joins(open, current)) {
                    return Err(format!("ring closure {} duplicates an existing bond", number));
                }
                let symbol = match (opening_symbol, self.pending_bond) {
                    (Some(x), Some(y)) if BondOrder::from_symbol(x) != BondOrder::from_symbol(y) => {
                        return Err(format!("ring closure {} has conflicting bond orders", number));
                    }
                    (x, y) => y.or(x),
                };
                self.add_bond(open, current, symbol);
                self.pending_bond = None;
                Ok(())
            }
            None => {
                self.rings.insert(number, (current, self.pending_bond));
                self.pending_bond = None;
                Ok(())
            }
        }
    }
}

fn parse_smiles(smiles: &str) -> Result<Molecule, String> {
    let smiles = smiles.trim();
    if smiles.is_empty() {
        return Err("empty structure".to_string());
    }

    let mut state = ParseState {
        molecule: Molecule::default(),
        current: None,
        pending_bond: None,
        branches: Vec::new(),
        rings: HashMap::new(),
    };
    // set after '(' until the branch gets its first atom
    let mut branch_opened = false;
    let mut chars = smiles.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            '-' | '=' | '#' | '$' | ':' | '/' | '\\' => {
                if state.current.is_none() {
                    return Err(format!("bond '{}' without a preceding atom", ch));
                }
                if state.pending_bond.is_some() {
                    return Err(format!("consecutive bond symbols at '{}'", ch));
                }
                state.pending_bond = Some(ch);
                chars.next();
            }
            '(' => {
                if state.current.is_none() || state.pending_bond.is_some() {
                    return Err("branch opened without a preceding atom".to_string());
                }
                state.branches.push(state.current);
                branch_opened = true;
                chars.next();
            }
            ')' => {
                if branch_opened {
                    return Err("empty branch".to_string());
                }
                if state.pending_bond.is_some() {
                    return Err("branch ends with a dangling bond".to_string());
                }
                let prev = state
                    .branches
                    .pop()
                    .ok_or_else(|| "unmatched ')'".to_string())?;
                state.current = prev;
                chars.next();
            }
            '.' => {
                if state.current.is_none() || state.pending_bond.is_some() {
                    return Err("misplaced '.' component separator".to_string());
                }
                if !state.branches.is_empty() {
                    return Err("component separator inside a branch".to_string());
                }
                state.current = None;
                chars.next();
            }
            '%' => {
                chars.next();
                let d1 = take_digit(&mut chars).ok_or("'%' must be followed by two digits")?;
                let d2 = take_digit(&mut chars).ok_or("'%' must be followed by two digits")?;
                state.ring_closure(d1 * 10 + d2)?;
            }
            '0'..='9' => {
                chars.next();
                state.ring_closure(ch as u32 - '0' as u32)?;
            }
            '[' => {
                chars.next();
                let atom = parse_bracket_atom(&mut chars)?;
                branch_opened = false;
                state.add_atom(atom);
            }
            _ => {
                let atom = parse_organic_atom(&mut chars)?;
                branch_opened = false;
                state.add_atom(atom);
            }
        }
    }

    if state.pending_bond.is_some() {
        return Err("structure ends with a dangling bond".to_string());
    }
    if !state.branches.is_empty() {
        return Err("unclosed branch".to_string());
    }
    if let Some(number) = state.rings.keys().min() {
        return Err(format!("unclosed ring {}", number));
    }
    if state.molecule.atoms.is_empty() {
        return Err("no atoms".to_string());
    }

    let mut molecule = state.molecule;
    sanitize(&mut molecule)?;
    Ok(molecule)
}

/// Check aromaticity and valences of a freshly parsed graph
fn sanitize(molecule: &mut Molecule) -> Result<(), String> {
    let in_ring = ring_bonds(molecule);

    // an aromatic bond outside any ring (biphenyl's linker) is single
    for (bond, &ring) in molecule.bonds.iter_mut().zip(&in_ring) {
        if bond.order == BondOrder::Aromatic && !ring {
            bond.order = BondOrder::Single;
        }
    }

    for (i, atom) in molecule.atoms.iter().enumerate() {
        let ring_atom = molecule
            .bonds
            .iter()
            .zip(&in_ring)
            .any(|(b, &ring)| ring && b.touches(i));
        if atom.aromatic && !ring_atom {
            return Err(format!("non-ring atom {} ({}) marked aromatic", i, atom.symbol));
        }
    }

    let double = kekulize(molecule)?;
    for (i, atom) in molecule.atoms.iter().enumerate() {
        let Some(allowed) = atom.allowed_valences() else {
            continue;
        };
        let valence = atom.hydrogens
            + molecule
                .bonds
                .iter()
                .zip(&double)
                .filter(|(b, _)| b.touches(i))
                .map(|(b, &d)| if d { 2 } else { b.order.valence() })
                .sum::<u32>();
        let max = allowed.iter().copied().max().unwrap_or(0);
        if valence > max {
            return Err(format!(
                "explicit valence {} for atom {} ({}) exceeds {}",
                valence, i, atom.symbol, max
            ));
        }
    }
    Ok(())
}

/// Flags bonds that lie on a cycle: their endpoints stay connected without them
fn ring_bonds(molecule: &Molecule) -> Vec<bool> {
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); molecule.atoms.len()];
    for (i, bond) in molecule.bonds.iter().enumerate() {
        adjacency[bond.begin].push((bond.end, i));
        adjacency[bond.end].push((bond.begin, i));
    }

    molecule
        .bonds
        .iter()
        .enumerate()
        .map(|(skip, bond)| {
            let mut seen = vec![false; molecule.atoms.len()];
            let mut queue = VecDeque::from([bond.begin]);
            seen[bond.begin] = true;
            while let Some(atom) = queue.pop_front() {
                for &(next, via) in &adjacency[atom] {
                    if via != skip && !seen[next] {
                        seen[next] = true;
                        queue.push_back(next);
                    }
                }
            }
            seen[bond.end]
        })
        .collect()
}

/// Whether aromatic atom `i` must take a double bond in the Kekule form.
///
/// True when the smallest allowed valence at or above its current
/// valence (aromatic bonds as single) leaves room for one more bond.
fn needs_double_bond(molecule: &Molecule, i: usize) -> bool {
    let atom = &molecule.atoms[i];
    let Some(allowed) = atom.allowed_valences() else {
        return false;
    };
    let valence = atom.hydrogens
        + molecule
            .bonds
            .iter()
            .filter(|b| b.touches(i))
            .map(|b| b.order.valence())
            .sum::<u32>();
    allowed
        .iter()
        .copied()
        .find(|&v| v >= valence)
        .map_or(false, |target| target > valence)
}

/// Assign double bonds to aromatic bonds so every atom that needs one gets
/// exactly one. Returns a per-bond flag of the chosen double bonds.
fn kekulize(molecule: &Molecule) -> Result<Vec<bool>, String> {
    let n = molecule.atoms.len();
    let needs: Vec<bool> = (0..n)
        .map(|i| molecule.atoms[i].aromatic && needs_double_bond(molecule, i))
        .collect();

    let mut candidates: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    for (i, bond) in molecule.bonds.iter().enumerate() {
        if bond.order == BondOrder::Aromatic && needs[bond.begin] && needs[bond.end] {
            candidates[bond.begin].push((bond.end, i));
            candidates[bond.end].push((bond.begin, i));
        }
    }

    let mut partner: Vec<Option<usize>> = vec![None; n];
    if !match_atoms(&needs, &candidates, &mut partner) {
        return Err("cannot kekulize aromatic system".to_string());
    }

    let mut double = vec![false; molecule.bonds.len()];
    for bond in partner.into_iter().flatten() {
        double[bond] = true;
    }
    Ok(double)
}

/// Backtracking perfect matching over the atoms that need a double bond,
/// always extending the most constrained atom first
fn match_atoms(
    needs: &[bool],
    candidates: &[Vec<(usize, usize)>],
    partner: &mut [Option<usize>],
) -> bool {
    let mut pick: Option<(usize, usize)> = None;
    for atom in (0..needs.len()).filter(|&a| needs[a] && partner[a].is_none()) {
        let free = candidates[atom]
            .iter()
            .filter(|(other, _)| partner[*other].is_none())
            .count();
        if free == 0 {
            return false;
        }
        if pick.map_or(true, |(_, best)| free < best) {
            pick = Some((atom, free));
        }
    }
    let Some((atom, _)) = pick else {
        return true;
    };

    for &(other, bond) in &candidates[atom] {
        if partner[other].is_none() {
            partner[atom] = Some(bond);
            partner[other] = Some(bond);
            if match_atoms(needs, candidates, partner) {
                return true;
            }
            partner[atom] = None;
            partner[other] = None;
        }
    }
    false
}

fn take_digit(chars: &mut Peekable<Chars<'_>>) -> Option<u32> {
    let d = chars.peek()?.to_digit(10)?;
    chars.next();
    Some(d)
}

fn take_number(chars: &mut Peekable<Chars<'_>>) -> Option<u32> {
    let mut value: Option<u32> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d));
        chars.next();
    }
    value
}

fn organic(symbol: &str, aromatic: bool) -> Atom {
    Atom {
        symbol: symbol.to_string(),
        aromatic,
        isotope: None,
        charge: 0,
        hydrogens: 0,
        bracket: false,
    }
}

/// Organic-subset atom outside brackets: B C N O P S F Cl Br I, b c n o p s, *
fn parse_organic_atom(chars: &mut Peekable<Chars<'_>>) -> Result<Atom, String> {
    let ch = chars.next().ok_or("unexpected end of structure")?;
    let atom = match ch {
        'C' if chars.peek() == Some(&'l') => {
            chars.next();
            organic("Cl", false)
        }
        'B' if chars.peek() == Some(&'r') => {
            chars.next();
            organic("Br", false)
        }
        'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' => organic(&ch.to_string(), false),
        'b' | 'c' | 'n' | 'o' | 'p' | 's' => organic(&ch.to_ascii_uppercase().to_string(), true),
        '*' => organic("*", false),
        other => return Err(format!("unexpected character '{}'", other)),
    };
    Ok(atom)
}

/// Bracket atom: `[isotope? symbol chirality? hcount? charge? class?]`
fn parse_bracket_atom(chars: &mut Peekable<Chars<'_>>) -> Result<Atom, String> {
    let isotope = take_number(chars).map(|n| n.min(u16::MAX as u32) as u16);

    let first = chars.next().ok_or("unterminated bracket atom")?;
    let (symbol, aromatic) = if first == '*' {
        ("*".to_string(), false)
    } else if first.is_ascii_uppercase() {
        let mut symbol = first.to_string();
        if let Some(&next) = chars.peek() {
            if next.is_ascii_lowercase() {
                let two = format!("{}{}", first, next);
                if ELEMENTS.contains(&two.as_str()) {
                    chars.next();
                    symbol = two;
                }
            }
        }
        if !ELEMENTS.contains(&symbol.as_str()) {
            return Err(format!("unknown element '{}'", symbol));
        }
        (symbol, false)
    } else if first.is_ascii_lowercase() {
        let mut symbol = first.to_string();
        if let Some(&next) = chars.peek() {
            let two = format!("{}{}", first, next);
            if BRACKET_AROMATICS.contains(&two.as_str()) {
                chars.next();
                symbol = two;
            }
        }
        if !BRACKET_AROMATICS.contains(&symbol.as_str()) {
            return Err(format!("unknown aromatic element '{}'", symbol));
        }
        let mut upper = symbol.chars();
        let canonical = match upper.next() {
            Some(c) => c.to_ascii_uppercase().to_string() + upper.as_str(),
            None => symbol.clone(),
        };
        (canonical, true)
    } else {
        return Err(format!("unexpected '{}' in bracket atom", first));
    };

    // chirality: @, @@, @TH1, @AL2, @SP3, @TB12, @OH25
    let mut chiral = false;
    while chars.peek() == Some(&'@') {
        chars.next();
        chiral = true;
    }
    if chiral {
        while chars.peek().map_or(false, |c| c.is_ascii_uppercase() && *c != 'H') {
            chars.next();
        }
        take_number(chars);
    }

    let mut hydrogens = 0;
    if chars.peek() == Some(&'H') {
        chars.next();
        hydrogens = take_number(chars).unwrap_or(1);
    }

    let mut charge = 0i32;
    if let Some(&sign) = chars.peek() {
        if sign == '+' || sign == '-' {
            let unit = if sign == '+' { 1 } else { -1 };
            chars.next();
            match take_number(chars) {
                Some(n) => charge = unit * n as i32,
                None => {
                    charge = unit;
                    while chars.peek() == Some(&sign) {
                        chars.next();
                        charge += unit;
                    }
                }
            }
        }
    }

    if chars.peek() == Some(&':') {
        chars.next();
        take_number(chars).ok_or("atom class must be a number")?;
    }

    match chars.next() {
        Some(']') => Ok(Atom {
            symbol,
            aromatic,
            isotope,
            charge,
            hydrogens,
            bracket: true,
        }),
        Some(other) => Err(format!("unexpected '{}' in bracket atom", other)),
        None => Err("unterminated bracket atom".to_string()),
    }
}
