//! Printable vocabulary flashcards ("spjöld") for the Icelandic games.
//!
//! Category records carry a vocabulary list plus per-level sentence frames
//! and guiding questions. Built-in seed categories guarantee the endpoint is
//! useful without external config; a TOML bank (SPJALD_CONFIG_PATH) can
//! shadow or extend them.

use std::collections::HashMap;
use std::str::FromStr;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// CEFR-style proficiency level ("stig"). Only these three are printable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stig {
  A1,
  A2,
  B1,
}

impl FromStr for Stig {
  type Err = ();
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "A1" => Ok(Self::A1),
      "A2" => Ok(Self::A2),
      "B1" => Ok(Self::B1),
      _ => Err(()),
    }
  }
}

impl std::fmt::Display for Stig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::A1 => write!(f, "A1"),
      Self::A2 => write!(f, "A2"),
      Self::B1 => write!(f, "B1"),
    }
  }
}

/// Sentence frames and guiding questions for one level.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LevelMaterial {
  #[serde(default)]
  pub frames: Vec<String>,
  #[serde(default)]
  pub questions: Vec<String>,
}

/// One flashcard category ("flokkur").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub vocabulary: Vec<String>,
  #[serde(default)]
  pub a1: LevelMaterial,
  #[serde(default)]
  pub a2: LevelMaterial,
  #[serde(default)]
  pub b1: LevelMaterial,
}

impl Category {
  pub fn material(&self, stig: Stig) -> &LevelMaterial {
    match stig {
      Stig::A1 => &self.a1,
      Stig::A2 => &self.a2,
      Stig::B1 => &self.b1,
    }
  }
}

/// Index categories by id, built-ins first so a TOML bank can shadow them.
pub fn category_index(bank: Option<crate::config::FlashcardBank>) -> HashMap<String, Category> {
  let mut index = HashMap::new();
  for c in builtin_categories() {
    index.insert(c.id.clone(), c);
  }
  if let Some(bank) = bank {
    for c in bank.categories {
      index.insert(c.id.clone(), c);
    }
  }
  index
}

/// Minimal set of built-in categories so the endpoint works without config.
pub fn builtin_categories() -> Vec<Category> {
  let lm = |frames: &[&str], questions: &[&str]| LevelMaterial {
    frames: frames.iter().map(|s| s.to_string()).collect(),
    questions: questions.iter().map(|s| s.to_string()).collect(),
  };
  vec![
    Category {
      id: "dyr".into(),
      title: "Dýr".into(),
      vocabulary: vec![
        "hundur - dog".into(),
        "köttur - cat".into(),
        "hestur - horse".into(),
        "fugl - bird".into(),
        "fiskur - fish".into(),
        "kind - sheep".into(),
        "kýr - cow".into(),
        "mús - mouse".into(),
      ],
      a1: lm(
        &["Þetta er ___.", "Ég á ___."],
        &["Hvaða dýr er þetta?", "Áttu gæludýr?"],
      ),
      a2: lm(
        &["Hundurinn er ___ en kötturinn er ___.", "Mér finnst ___ skemmtilegast af því að ___."],
        &["Hvaða dýr finnst þér skemmtilegast?", "Hvar búa þessi dýr?"],
      ),
      b1: lm(
        &["Ef ég ætti ___, myndi ég ___.", "___ eru algeng á Íslandi vegna þess að ___."],
        &["Hvernig hugsa Íslendingar um húsdýr?", "Berðu saman tvö dýr að eigin vali."],
      ),
    },
    Category {
      id: "matur".into(),
      title: "Matur".into(),
      vocabulary: vec![
        "brauð - bread".into(),
        "mjólk - milk".into(),
        "ostur - cheese".into(),
        "epli - apple".into(),
        "fiskur - fish".into(),
        "kjöt - meat".into(),
        "grænmeti - vegetables".into(),
        "súpa - soup".into(),
      ],
      a1: lm(
        &["Ég borða ___.", "Mig langar í ___."],
        &["Hvað borðar þú í morgunmat?", "Hvað finnst þér gott?"],
      ),
      a2: lm(
        &["Í hádeginu borða ég oftast ___ með ___.", "Ég kaupi ___ í búðinni."],
        &["Hvað eldar þú heima?", "Hvað er í ísskápnum þínum?"],
      ),
      b1: lm(
        &["Hefðbundinn íslenskur matur er ___, til dæmis ___.", "Ég myndi mæla með ___ af því að ___."],
        &["Berðu saman mat frá þínu landi og íslenskan mat.", "Hvernig hefur mataræði breyst?"],
      ),
    },
    Category {
      id: "skoli".into(),
      title: "Skólinn".into(),
      vocabulary: vec![
        "kennari - teacher".into(),
        "nemandi - student".into(),
        "bók - book".into(),
        "stofa - classroom".into(),
        "próf - exam".into(),
        "heimavinna - homework".into(),
        "stundatafla - timetable".into(),
        "frímínútur - recess".into(),
      ],
      a1: lm(
        &["Ég er í ___.", "Kennarinn heitir ___."],
        &["Hvað heitir skólinn þinn?", "Hvaða fag finnst þér skemmtilegast?"],
      ),
      a2: lm(
        &["Á mánudögum er ég í ___ og ___.", "Eftir skóla ___ ég."],
        &["Hvernig er venjulegur skóladagur hjá þér?", "Hvað gerir þú í frímínútum?"],
      ),
      b1: lm(
        &["Ég valdi þennan skóla vegna þess að ___.", "Ef ég gæti breytt einhverju í skólanum, myndi ég ___."],
        &["Berðu saman skóla hér og í öðru landi.", "Hvernig undirbýrð þú þig fyrir próf?"],
      ),
    },
  ]
}

// Layout constants for the A4 sheet.
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_STEP: f32 = 7.0;

/// Cursor-based writer over a printpdf document; adds pages as text flows
/// past the bottom margin.
struct SheetWriter {
  doc: PdfDocumentReference,
  layer: PdfLayerReference,
  regular: IndirectFontRef,
  bold: IndirectFontRef,
  y: f32,
}

impl SheetWriter {
  fn new(title: &str) -> Result<Self, printpdf::Error> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let layer = doc.get_page(page).get_layer(layer);
    Ok(Self { doc, layer, regular, bold, y: PAGE_H - MARGIN })
  }

  fn write(&mut self, text: &str, size: f32, bold: bool) {
    if self.y < MARGIN {
      let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
      self.layer = self.doc.get_page(page).get_layer(layer);
      self.y = PAGE_H - MARGIN;
    }
    let font = if bold { &self.bold } else { &self.regular };
    self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
    self.y -= LINE_STEP;
  }

  fn gap(&mut self, mm: f32) {
    self.y -= mm;
  }

  fn finish(self) -> Result<Vec<u8>, printpdf::Error> {
    self.doc.save_to_bytes()
  }
}

/// Render one category at one level as a printable A4 flashcard sheet.
#[instrument(level = "info", skip(category), fields(flokkur = %category.id, %stig))]
pub fn render_pdf(category: &Category, stig: Stig) -> Result<Vec<u8>, printpdf::Error> {
  let mut sheet = SheetWriter::new(&format!("Spjald - {} ({})", category.title, stig))?;

  sheet.write(&format!("{} - stig {}", category.title, stig), 18.0, true);
  sheet.gap(4.0);

  sheet.write("Orðaforði", 13.0, true);
  for word in &category.vocabulary {
    sheet.write(word, 11.0, false);
  }
  sheet.gap(4.0);

  let material = category.material(stig);
  sheet.write("Setningarammar", 13.0, true);
  for frame in &material.frames {
    sheet.write(frame, 11.0, false);
  }
  sheet.gap(4.0);

  sheet.write("Spurningar", 13.0, true);
  for question in &material.questions {
    sheet.write(question, 11.0, false);
  }

  sheet.finish()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stig_parses_the_three_levels_only() {
    assert_eq!("A1".parse::<Stig>(), Ok(Stig::A1));
    assert_eq!("A2".parse::<Stig>(), Ok(Stig::A2));
    assert_eq!("B1".parse::<Stig>(), Ok(Stig::B1));
    assert!("C1".parse::<Stig>().is_err());
    assert!("a1".parse::<Stig>().is_err());
    assert!("".parse::<Stig>().is_err());
  }

  #[test]
  fn builtin_categories_are_indexed_by_id() {
    let index = category_index(None);
    assert!(index.contains_key("dyr"));
    assert!(index.contains_key("matur"));
    assert!(index.contains_key("skoli"));
  }

  #[test]
  fn toml_bank_shadows_builtins() {
    let bank: crate::config::FlashcardBank = toml::from_str(
      r#"
        [[categories]]
        id = "dyr"
        title = "Villt dýr"
        vocabulary = ["refur - fox"]
      "#,
    )
    .expect("valid bank");
    let index = category_index(Some(bank));
    assert_eq!(index["dyr"].title, "Villt dýr");
    assert!(index.contains_key("matur"));
  }

  #[test]
  fn rendered_sheet_is_a_pdf() {
    let index = category_index(None);
    let bytes = render_pdf(&index["dyr"], Stig::A1).expect("render");
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 500);
  }

  #[test]
  fn every_level_renders_for_every_builtin() {
    for category in builtin_categories() {
      for stig in [Stig::A1, Stig::A2, Stig::B1] {
        assert!(render_pdf(&category, stig).is_ok(), "{} {}", category.id, stig);
      }
    }
  }
}
