//! Molar-mass computation and display-molecule expansion.
//!
//! The molecule shapes generated here are for on-screen rendering only: a
//! linear chain or a loose cluster, not chemically accurate topology.

use std::collections::HashMap;

use serde::Serialize;

/// One element of a formula with its atom count.
#[derive(Clone, Debug)]
pub struct ElementCount {
  pub symbol: String,
  pub count: u32,
}

impl ElementCount {
  pub fn new(symbol: &str, count: u32) -> Self {
    Self { symbol: symbol.to_string(), count }
  }
}

/// Sum of count × atomic mass. Symbols absent from the table contribute 0;
/// the games treat an incomplete table as "mass unknown", not an error.
pub fn molar_mass(elements: &[ElementCount], atomic_masses: &HashMap<String, f64>) -> f64 {
  elements
    .iter()
    .map(|e| e.count as f64 * atomic_masses.get(&e.symbol).copied().unwrap_or(0.0))
    .sum()
}

/// Atomic masses for the elements the games actually use.
pub fn standard_atomic_masses() -> HashMap<String, f64> {
  [
    ("H", 1.008),
    ("C", 12.011),
    ("N", 14.007),
    ("O", 15.999),
    ("Na", 22.990),
    ("Mg", 24.305),
    ("Al", 26.982),
    ("P", 30.974),
    ("S", 32.06),
    ("Cl", 35.45),
    ("K", 39.098),
    ("Ca", 40.078),
    ("Fe", 55.845),
    ("Cu", 63.546),
    ("Zn", 65.38),
  ]
  .into_iter()
  .map(|(s, m)| (s.to_string(), m))
  .collect()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Atom {
  pub id: String,
  pub symbol: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Bond {
  pub from: String,
  pub to: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Molecule {
  pub id: String,
  pub formula: String,
  pub name: String,
  pub atoms: Vec<Atom>,
  pub bonds: Vec<Bond>,
}

/// Expand each element into individual atom records (ids
/// `"{lowercased-symbol}-{running index}"`, input order) and chain them into
/// a path graph with `atoms.len() - 1` bonds.
pub fn to_linear_molecule(
  elements: &[ElementCount],
  formula: &str,
  name: Option<&str>,
) -> Molecule {
  let atoms = expand_atoms(elements);
  let bonds = atoms
    .windows(2)
    .map(|pair| Bond { from: pair[0].id.clone(), to: pair[1].id.clone() })
    .collect();
  Molecule {
    id: molecule_id(formula),
    formula: formula.to_string(),
    name: name.unwrap_or(formula).to_string(),
    atoms,
    bonds,
  }
}

/// Same atoms as the linear variant, zero bonds.
pub fn to_cluster_molecule(
  elements: &[ElementCount],
  formula: &str,
  name: Option<&str>,
) -> Molecule {
  Molecule {
    id: molecule_id(formula),
    formula: formula.to_string(),
    name: name.unwrap_or(formula).to_string(),
    atoms: expand_atoms(elements),
    bonds: Vec::new(),
  }
}

fn expand_atoms(elements: &[ElementCount]) -> Vec<Atom> {
  let mut atoms = Vec::new();
  let mut index = 0usize;
  for element in elements {
    let symbol_lower = element.symbol.to_lowercase();
    for _ in 0..element.count {
      atoms.push(Atom {
        id: format!("{}-{}", symbol_lower, index),
        symbol: element.symbol.clone(),
      });
      index += 1;
    }
  }
  atoms
}

/// Strip unicode subscript digits (U+2080–U+2089) and lowercase.
fn molecule_id(formula: &str) -> String {
  formula
    .chars()
    .filter(|c| !('\u{2080}'..='\u{2089}').contains(c))
    .collect::<String>()
    .to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_formula_weighs_nothing() {
    assert_eq!(molar_mass(&[], &standard_atomic_masses()), 0.0);
  }

  #[test]
  fn unknown_symbols_contribute_zero() {
    let table = HashMap::from([("H".to_string(), 1.008)]);
    assert_eq!(molar_mass(&[ElementCount::new("Xx", 5)], &table), 0.0);
    // Known and unknown mixed: only the known part counts.
    let mixed = [ElementCount::new("H", 2), ElementCount::new("Xx", 1)];
    assert!((molar_mass(&mixed, &table) - 2.016).abs() < 1e-9);
  }

  #[test]
  fn water_weighs_in_correctly() {
    let water = [ElementCount::new("H", 2), ElementCount::new("O", 1)];
    let mass = molar_mass(&water, &standard_atomic_masses());
    assert!((mass - 18.015).abs() < 1e-9);
  }

  #[test]
  fn molar_mass_is_pure() {
    let water = [ElementCount::new("H", 2), ElementCount::new("O", 1)];
    let table = standard_atomic_masses();
    assert_eq!(molar_mass(&water, &table), molar_mass(&water, &table));
  }

  #[test]
  fn linear_molecule_chains_atoms_in_input_order() {
    let water = [ElementCount::new("H", 2), ElementCount::new("O", 1)];
    let m = to_linear_molecule(&water, "H₂O", Some("Vatn"));

    let ids: Vec<&str> = m.atoms.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["h-0", "h-1", "o-2"]);
    assert_eq!(m.bonds.len(), m.atoms.len() - 1);
    assert_eq!(m.bonds[0], Bond { from: "h-0".into(), to: "h-1".into() });
    assert_eq!(m.bonds[1], Bond { from: "h-1".into(), to: "o-2".into() });
    assert_eq!(m.name, "Vatn");
  }

  #[test]
  fn cluster_molecule_has_no_bonds() {
    let co2 = [ElementCount::new("C", 1), ElementCount::new("O", 2)];
    let m = to_cluster_molecule(&co2, "CO₂", None);
    assert_eq!(m.atoms.len(), 3);
    assert!(m.bonds.is_empty());
    assert_eq!(m.name, "CO₂");
  }

  #[test]
  fn molecule_id_strips_subscripts_and_lowercases() {
    let m = to_linear_molecule(&[ElementCount::new("H", 2)], "H₂O", None);
    assert_eq!(m.id, "ho");
    let m = to_linear_molecule(&[ElementCount::new("C", 1)], "CO2", None);
    assert_eq!(m.id, "co2");
  }
}
