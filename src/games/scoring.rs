//! Per-game scoring and tolerance policies, plus numeric input validation.
//!
//! Several games carry superficially similar "check the answer, award
//! points" logic with subtly different rules: kinetics scoring never floors,
//! molar-mass scoring floors at 5, Hess's law accepts 2% relative error,
//! molar-mass validation accepts ±0.5 absolute. These stay distinct named
//! policies selected explicitly per game; unifying them would silently
//! change observed game behavior.

use serde::Serialize;

/// How a game converts correctness + hint usage into points.
#[derive(Clone, Copy, Debug)]
pub enum ScoringPolicy {
  /// Kinetics-style: one flat penalty if any hint was used, no floor.
  /// Can go negative when `hint_penalty > base_points`.
  FlatWithHintPenalty { base_points: i32, hint_penalty: i32 },
  /// Molar-mass-style: per-hint penalty, clamped to a minimum.
  FlooredWithHintPenalty { base_points: i32, hint_penalty: i32, floor: i32 },
}

impl ScoringPolicy {
  /// The kinetics game's policy (20 base, 10 hint penalty).
  pub fn kinetics() -> Self {
    Self::FlatWithHintPenalty { base_points: 20, hint_penalty: 10 }
  }

  /// The level-1 molar-mass game's policy (20 base, 5 per hint, floor 5).
  pub fn molar_mass() -> Self {
    Self::FlooredWithHintPenalty { base_points: 20, hint_penalty: 5, floor: 5 }
  }

  /// Incorrect answers always score 0, regardless of hints or parameters.
  pub fn score(&self, is_correct: bool, hints_used: u32) -> i32 {
    if !is_correct {
      return 0;
    }
    match *self {
      Self::FlatWithHintPenalty { base_points, hint_penalty } => {
        if hints_used > 0 {
          base_points - hint_penalty
        } else {
          base_points
        }
      }
      Self::FlooredWithHintPenalty { base_points, hint_penalty, floor } => {
        (base_points - hint_penalty * hints_used as i32).max(floor)
      }
    }
  }
}

/// Pass/fail comparison against a reference value. Two distinct semantics
/// coexist across the games and must not be merged.
#[derive(Clone, Copy, Debug)]
pub enum ToleranceCheck {
  /// Window scales with |correct|; a correct value of 0 demands exactness.
  Relative(f64),
  /// Fixed window around the correct value.
  Absolute(f64),
}

impl ToleranceCheck {
  pub fn passes(&self, user: f64, correct: f64) -> bool {
    match *self {
      Self::Relative(fraction) => (user - correct).abs() <= (correct * fraction).abs(),
      Self::Absolute(delta) => (user - correct).abs() <= delta,
    }
  }
}

/// The molar-mass game's ±0.5 absolute check.
pub fn within_absolute_tolerance(user: f64, correct: f64) -> bool {
  ToleranceCheck::Absolute(0.5).passes(user, correct)
}

/// Outcome of sanitizing a raw answer-field string.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct InputValidation {
  pub valid: bool,
  pub error: String,
}

impl InputValidation {
  fn ok() -> Self {
    Self { valid: true, error: String::new() }
  }
  fn bad(error: &str) -> Self {
    Self { valid: false, error: error.to_string() }
  }
}

/// Empty/whitespace input means "not yet answered" and is valid with no
/// error. Non-numeric text, zero, negatives and values ≥ 1000 are invalid.
pub fn validate_numeric_input(raw: &str) -> InputValidation {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return InputValidation::ok();
  }
  let value = match trimmed.parse::<f64>() {
    Ok(v) if v.is_finite() => v,
    _ => return InputValidation::bad("Svarið verður að vera tala."),
  };
  if value <= 0.0 {
    return InputValidation::bad("Svarið verður að vera stærra en 0.");
  }
  if value >= 1000.0 {
    return InputValidation::bad("Svarið verður að vera minna en 1000.");
  }
  InputValidation::ok()
}

/// Minimal per-challenge-type feedback line. Unknown kinds get the plain
/// correct/incorrect message rather than an error.
pub fn feedback_message(kind: &str, is_correct: bool) -> String {
  match (kind, is_correct) {
    ("molar_mass", true) => "Rétt! Mólmassinn er réttur.".to_string(),
    ("molar_mass", false) => "Rangt. Leggðu saman atómmassana og reyndu aftur.".to_string(),
    ("enthalpy", true) => "Rétt! ΔH stemmir samkvæmt lögmáli Hess.".to_string(),
    ("enthalpy", false) => "Rangt. Athugaðu formerki og margfaldara hvers skrefs.".to_string(),
    ("kinetics", true) => "Rétt! Hraðajafnan er rétt.".to_string(),
    ("kinetics", false) => "Rangt. Skoðaðu hvernig styrkur hefur áhrif á hraðann.".to_string(),
    (_, true) => "Rétt!".to_string(),
    (_, false) => "Rangt.".to_string(),
  }
}
