//! Hess's-law calculations: step summation, reaction enthalpy from
//! formation enthalpies, and the 2% relative tolerance check used by the
//! enthalpy games.

use std::collections::HashMap;

use crate::games::scoring::ToleranceCheck;

/// Relative tolerance applied to enthalpy answers.
pub const ENTHALPY_TOLERANCE: f64 = 0.02;

/// One step in a Hess's-law combination.
#[derive(Clone, Copy, Debug)]
pub struct EquationStep {
  /// Enthalpy change of the step as written, kJ/mol.
  pub delta_h: f64,
  /// Positive scaling applied to the step.
  pub multiplier: f64,
  /// Reversed steps contribute with flipped sign.
  pub is_reversed: bool,
}

/// Algebraic sum of step contributions. Zero steps sum to exactly 0.
pub fn sum_contributions(steps: &[EquationStep]) -> f64 {
  steps
    .iter()
    .map(|s| s.delta_h * s.multiplier * if s.is_reversed { -1.0 } else { 1.0 })
    .sum()
}

/// 2% relative tolerance. The window scales with |correct|, so a correct
/// answer of exactly 0 requires an exact match; intentional.
pub fn within_tolerance(user_answer: f64, correct_answer: f64) -> bool {
  ToleranceCheck::Relative(ENTHALPY_TOLERANCE).passes(user_answer, correct_answer)
}

/// One species of a reaction with its stoichiometric coefficient and
/// formation enthalpy.
#[derive(Clone, Debug)]
pub struct ReactionTerm {
  pub formula: String,
  pub coefficient: u32,
  pub delta_hf: f64,
}

impl ReactionTerm {
  pub fn new(formula: &str, coefficient: u32, delta_hf: f64) -> Self {
    Self { formula: formula.to_string(), coefficient, delta_hf }
  }
}

/// ΔH°rxn = Σ(n·ΔH°f products) − Σ(n·ΔH°f reactants). No rounding is
/// applied here; callers format for display.
pub fn reaction_enthalpy(products: &[ReactionTerm], reactants: &[ReactionTerm]) -> f64 {
  let side = |terms: &[ReactionTerm]| -> f64 {
    terms.iter().map(|t| t.coefficient as f64 * t.delta_hf).sum()
  };
  side(products) - side(reactants)
}

/// Formation enthalpy table entry.
#[derive(Clone, Copy, Debug)]
pub struct FormationEnthalpy {
  /// kJ/mol at standard state.
  pub value: f64,
  /// Icelandic display name.
  pub name: &'static str,
}

/// Standard formation enthalpies keyed by formula-with-state. Pure elements
/// in their standard state carry exactly 0. The games assert on these
/// literal values, so they must not be "corrected" against other tables.
pub fn formation_enthalpies() -> HashMap<&'static str, FormationEnthalpy> {
  let e = |value, name| FormationEnthalpy { value, name };
  HashMap::from_iter([
    // Elements in standard state
    ("H2(g)", e(0.0, "Vetni")),
    ("O2(g)", e(0.0, "Súrefni")),
    ("N2(g)", e(0.0, "Nitur")),
    ("C(s)", e(0.0, "Kolefni (grafít)")),
    ("S(s)", e(0.0, "Brennisteinn")),
    // Oxides
    ("H2O(l)", e(-285.8, "Vatn (vökvi)")),
    ("H2O(g)", e(-241.8, "Vatnsgufa")),
    ("CO2(g)", e(-393.5, "Koltvíoxíð")),
    ("CO(g)", e(-110.5, "Kolmónoxíð")),
    ("SO2(g)", e(-296.8, "Brennisteinstvíoxíð")),
    ("SO3(g)", e(-395.7, "Brennisteinsþríoxíð")),
    ("NO(g)", e(90.3, "Niturmónoxíð")),
    ("NO2(g)", e(33.2, "Niturtvíoxíð")),
    ("N2O(g)", e(82.1, "Tvínituroxíð")),
    ("MgO(s)", e(-601.7, "Magnesíumoxíð")),
    ("CaO(s)", e(-635.1, "Kalsíumoxíð")),
    ("Fe2O3(s)", e(-824.2, "Járn(III)oxíð")),
    ("Al2O3(s)", e(-1675.7, "Áloxíð")),
    // Hydrocarbons and organics
    ("CH4(g)", e(-74.8, "Metan")),
    ("C2H6(g)", e(-84.7, "Etan")),
    ("C3H8(g)", e(-103.8, "Própan")),
    ("C2H4(g)", e(52.3, "Eten")),
    ("C2H2(g)", e(226.7, "Etýn")),
    ("C6H6(l)", e(49.0, "Bensen")),
    ("CH3OH(l)", e(-238.7, "Metanól")),
    ("C2H5OH(l)", e(-277.7, "Etanól")),
    // Other compounds
    ("NH3(g)", e(-46.1, "Ammóníak")),
    ("HCl(g)", e(-92.3, "Vetnisklóríð")),
    ("H2S(g)", e(-20.6, "Brennisteinsvetni")),
    ("NaCl(s)", e(-411.2, "Natríumklóríð")),
    ("CaCO3(s)", e(-1206.9, "Kalsíumkarbónat")),
  ])
}

#[cfg(test)]
mod tests {
  use super::*;

  fn step(delta_h: f64, multiplier: f64, is_reversed: bool) -> EquationStep {
    EquationStep { delta_h, multiplier, is_reversed }
  }

  #[test]
  fn empty_sum_is_exactly_zero() {
    assert_eq!(sum_contributions(&[]), 0.0);
  }

  #[test]
  fn reversed_step_cancels_forward_step() {
    let steps = [step(100.0, 1.0, false), step(100.0, 1.0, true)];
    assert_eq!(sum_contributions(&steps), 0.0);
  }

  #[test]
  fn multipliers_scale_contributions() {
    let steps = [step(-50.0, 2.0, false), step(10.0, 0.5, true)];
    assert!((sum_contributions(&steps) - (-105.0)).abs() < 1e-12);
  }

  #[test]
  fn methane_combustion_scenario() {
    let products = [
      ReactionTerm::new("CO2(g)", 1, -393.5),
      ReactionTerm::new("H2O(l)", 2, -285.8),
    ];
    let reactants = [
      ReactionTerm::new("CH4(g)", 1, -74.8),
      ReactionTerm::new("O2(g)", 2, 0.0),
    ];
    let dh = reaction_enthalpy(&products, &reactants);
    assert!((dh - (-890.3)).abs() < 1e-9);
  }

  #[test]
  fn swapping_roles_flips_the_sign() {
    let a = [ReactionTerm::new("NO(g)", 2, 90.3)];
    let b = [ReactionTerm::new("N2(g)", 1, 0.0), ReactionTerm::new("O2(g)", 1, 0.0)];
    assert_eq!(reaction_enthalpy(&a, &b), -reaction_enthalpy(&b, &a));
  }

  #[test]
  fn tolerance_accepts_the_correct_value_itself() {
    for correct in [-890.3, 0.0, 42.0, 1e6] {
      assert!(within_tolerance(correct, correct));
    }
  }

  #[test]
  fn tolerance_rejects_three_percent_off() {
    let correct: f64 = -890.3;
    assert!(!within_tolerance(correct + correct.abs() * 0.03, correct));
    assert!(within_tolerance(correct + correct.abs() * 0.019, correct));
  }

  #[test]
  fn zero_answer_demands_exact_match() {
    assert!(within_tolerance(0.0, 0.0));
    assert!(!within_tolerance(0.0001, 0.0));
  }

  #[test]
  fn table_reproduces_listed_values() {
    let table = formation_enthalpies();
    assert_eq!(table["H2O(l)"].value, -285.8);
    assert_eq!(table["NO(g)"].value, 90.3);
    assert_eq!(table["CH4(g)"].value, -74.8);
  }

  #[test]
  fn elements_in_standard_state_are_zero() {
    let table = formation_enthalpies();
    for key in ["H2(g)", "O2(g)", "N2(g)", "C(s)", "S(s)"] {
      assert_eq!(table[key].value, 0.0, "{key}");
    }
  }
}
