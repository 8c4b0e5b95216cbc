//! Coefficient scaling of balanced chemical equation strings.
//!
//! Terms are joined by the literal `" + "`. A term is an optional leading
//! coefficient (ASCII integer or one of the unicode vulgar fractions
//! ½ ⅓ ¼ ⅔ ¾) followed by a formula token; state annotations like `(g)`
//! are part of the formula and pass through untouched.

/// Vulgar fraction glyphs accepted as leading coefficients.
const FRACTIONS: [(char, f64); 5] = [
  ('½', 0.5),
  ('⅓', 1.0 / 3.0),
  ('¼', 0.25),
  ('⅔', 2.0 / 3.0),
  ('¾', 0.75),
];

/// Multiply every coefficient in `equation` by `multiplier`.
///
/// `multiplier == 1` returns the input byte-for-byte: deliberately no
/// reformatting, even where a fraction could be simplified.
pub fn scale_equation(equation: &str, multiplier: u32) -> String {
  if multiplier == 1 {
    return equation.to_string();
  }
  equation
    .split(" + ")
    .map(|term| scale_term(term, multiplier))
    .collect::<Vec<_>>()
    .join(" + ")
}

fn scale_term(term: &str, multiplier: u32) -> String {
  let mut chars = term.chars();
  let first = match chars.next() {
    Some(c) => c,
    None => return String::new(),
  };

  if let Some((_, value)) = FRACTIONS.iter().find(|(glyph, _)| *glyph == first) {
    let rest: String = chars.collect();
    let product = value * multiplier as f64;
    return if is_whole(product) {
      let n = product.round() as i64;
      if n == 1 {
        rest
      } else {
        format!("{}{}", n, rest)
      }
    } else {
      format!("{}{}", render_fraction(product), rest)
    };
  }

  if first.is_ascii_digit() {
    let digits: String = term.chars().take_while(|c| c.is_ascii_digit()).collect();
    let rest = &term[digits.len()..];
    // Coefficients in real equations are tiny; overflow is not a concern.
    let coefficient: u64 = digits.parse().unwrap_or(1);
    return format!("{}{}", coefficient * multiplier as u64, rest);
  }

  // Implicit coefficient 1. Unrecognized leading glyphs land here too,
  // which prefixes the multiplier onto the existing coefficient; kept
  // as-is, the games only feed coefficients from the grammar above.
  format!("{}{}", multiplier, term)
}

fn is_whole(x: f64) -> bool {
  (x - x.round()).abs() < 1e-9
}

/// Common half-step products keep their vulgar form; everything else falls
/// back to the raw decimal rendering.
fn render_fraction(x: f64) -> String {
  if (x - 0.5).abs() < 1e-9 {
    "½".to_string()
  } else if (x - 1.5).abs() < 1e-9 {
    "³⁄₂".to_string()
  } else if (x - 2.5).abs() < 1e-9 {
    "⁵⁄₂".to_string()
  } else {
    x.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn multiplier_one_is_identity() {
    let eq = "½O₂(g) + H₂(g)";
    assert_eq!(scale_equation(eq, 1), eq);
    assert_eq!(scale_equation("2CO₂(g)", 1), "2CO₂(g)");
  }

  #[test]
  fn implicit_coefficient_gets_prefixed() {
    assert_eq!(scale_equation("CH₄(g)", 2), "2CH₄(g)");
    assert_eq!(scale_equation("X", 3), "3X");
  }

  #[test]
  fn integer_coefficients_multiply() {
    assert_eq!(scale_equation("2H₂O(l)", 3), "6H₂O(l)");
    assert_eq!(scale_equation("2H₂(g) + O₂(g)", 2), "4H₂(g) + 2O₂(g)");
  }

  #[test]
  fn half_doubles_to_bare_formula() {
    // ½ × 2 = 1 and a coefficient of one is omitted entirely.
    assert_eq!(scale_equation("½O₂(g)", 2), "O₂(g)");
  }

  #[test]
  fn half_tripled_renders_three_halves() {
    assert_eq!(scale_equation("½O₂(g)", 3), "³⁄₂O₂(g)");
  }

  #[test]
  fn five_halves_comes_from_the_lookup() {
    assert_eq!(scale_equation("½O₂(g)", 5), "⁵⁄₂O₂(g)");
  }

  #[test]
  fn quarter_scales_to_integers_and_fractions() {
    assert_eq!(scale_equation("¼P₄(s)", 4), "P₄(s)");
    assert_eq!(scale_equation("¼P₄(s)", 2), "½P₄(s)");
    assert_eq!(scale_equation("¾O₂(g)", 2), "³⁄₂O₂(g)");
  }

  #[test]
  fn third_with_awkward_multiplier_falls_back_to_decimal() {
    // ⅓ × 2 has no glyph in the lookup; the raw decimal leaks through.
    let scaled = scale_equation("⅓Fe₂O₃(s)", 2);
    assert!(scaled.starts_with("0.666"));
    assert!(scaled.ends_with("Fe₂O₃(s)"));
  }

  #[test]
  fn state_annotations_survive_verbatim(){
    assert_eq!(
      scale_equation("CH₄(g) + 2O₂(g) + H₂O(l)", 2),
      "2CH₄(g) + 4O₂(g) + 2H₂O(l)"
    );
  }

  #[test]
  fn unrecognized_leading_glyph_falls_through() {
    // Known sharp edge: an unknown fraction glyph is treated as part of the
    // formula, so the multiplier is prefixed onto it.
    assert_eq!(scale_equation("⅚X", 2), "2⅚X");
  }
}
