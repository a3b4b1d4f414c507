//! Text normalization ahead of vectorization, including a rule-based
//! Indonesian affix stripper.
//!
//! The stripper follows the Porter-style design for Bahasa Indonesia: a word's
//! measure is its vowel count, and affixes are only removed while the measure
//! stays above two syllables. Inflectional suffixes go first (particles, then
//! possessives), followed by the first-order prefix, and then the derivational
//! suffix and second-order prefix in an order that depends on whether a
//! first-order prefix was found.
//!
//! There is no full root dictionary. A short list of common roots stops
//! stripping early and decides whether `mem-`/`pem-` before a vowel hides an
//! `m`- or a `p`-initial root. Roots outside the list fall back to `p`, so
//! `memaksa` still stems to `paksa` while an unlisted `m`-root is mangled.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("regex"));

const PARTICLES: [&str; 3] = ["kah", "lah", "pun"];
const POSSESSIVES: [&str; 3] = ["nya", "ku", "mu"];
const DERIVATIONAL: [&str; 3] = ["kan", "an", "i"];

/// Words that look affixed but are roots, and the `m`-initial roots that the
/// nasal prefixes would otherwise recode to `p`.
const ROOTS: &[&str] = &[
    "berat", "beras", "berita", "dinas", "dinding", "dingin", "diskusi", "kembali", "kemarin",
    "makan", "maksud", "malam", "malas", "malu", "mandi", "marah", "masak", "masalah", "masuk",
    "mati", "merah", "milik", "minta", "minum", "mohon", "mulai", "mundur", "murah", "pakai",
    "perak", "perang", "pergi", "perlu", "sekolah", "terang", "terima",
];

/// Lowercases the text and collapses every run of non-alphanumeric
/// characters to a single space, then stems each word when `stem` is set.
pub fn normalize(text: &str, stem: bool) -> String {
    let filtered = filter(text);
    if stem {
        stem_text(&filtered)
    } else {
        filtered
    }
}

pub fn filter(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_ALNUM.replace_all(&lowered, " ").trim().to_string()
}

pub fn stem_text(text: &str) -> String {
    text.split_whitespace()
        .map(stem_word)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn stem_word(word: &str) -> String {
    if word.is_empty() || !word.bytes().all(|b| b.is_ascii_lowercase()) {
        return word.to_string();
    }
    let mut w = Word::new(word);
    if w.measure <= 2 || is_root(&w.text) {
        return w.text;
    }
    w.remove_any_suffix(&PARTICLES);
    if w.measure > 2 && !is_root(&w.text) {
        w.remove_any_suffix(&POSSESSIVES);
    }
    if w.measure <= 2 || is_root(&w.text) {
        return w.text;
    }
    let steps: [fn(&mut Word) -> bool; 2] = if w.remove_first_order_prefix() {
        [Word::remove_derivational_suffix, Word::remove_second_order_prefix]
    } else {
        [Word::remove_second_order_prefix, Word::remove_derivational_suffix]
    };
    for step in steps {
        if w.measure <= 2 || is_root(&w.text) {
            break;
        }
        step(&mut w);
    }
    w.text
}

fn is_root(word: &str) -> bool {
    ROOTS.contains(&word)
}

/// True when `word` is a listed root, optionally followed by a derivational
/// suffix.
fn is_root_with_suffix(word: &str) -> bool {
    ROOTS.iter().any(|root| {
        word.strip_prefix(root)
            .is_some_and(|rest| rest.is_empty() || DERIVATIONAL.contains(&rest))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    None,
    Di,
    Meng,
    Ter,
    Ke,
    Peng,
    Ber,
    Per,
}

struct Word {
    text: String,
    measure: usize,
    prefix: Prefix,
}

impl Word {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            measure: text.bytes().filter(|b| is_vowel(*b)).count(),
            prefix: Prefix::None,
        }
    }

    fn remove_any_suffix(&mut self, suffixes: &[&str]) -> bool {
        for suffix in suffixes {
            if self.text.len() > suffix.len() && self.text.ends_with(suffix) {
                self.drop_suffix(suffix.len());
                return true;
            }
        }
        false
    }

    fn remove_first_order_prefix(&mut self) -> bool {
        let t = self.text.as_str();
        let (strip, replacement, kind) = if t.starts_with("meng") {
            (4, "", Prefix::Meng)
        } else if t.starts_with("meny") && self.vowel_at(4) {
            (4, "s", Prefix::Meng)
        } else if t.starts_with("mem") {
            (3, self.nasal_recoding(3), Prefix::Meng)
        } else if t.starts_with("men") {
            (3, "", Prefix::Meng)
        } else if t.starts_with("me") {
            (2, "", Prefix::Meng)
        } else if t.starts_with("peng") {
            (4, "", Prefix::Peng)
        } else if t.starts_with("peny") && self.vowel_at(4) {
            (4, "s", Prefix::Peng)
        } else if t.starts_with("pem") {
            (3, self.nasal_recoding(3), Prefix::Peng)
        } else if t.starts_with("pen") {
            (3, "", Prefix::Peng)
        } else if t.starts_with("di") {
            (2, "", Prefix::Di)
        } else if t.starts_with("ter") {
            (3, "", Prefix::Ter)
        } else if t.starts_with("ke") {
            (2, "", Prefix::Ke)
        } else {
            return false;
        };
        self.text.replace_range(..strip, replacement);
        self.measure -= 1;
        self.prefix = kind;
        true
    }

    fn remove_second_order_prefix(&mut self) -> bool {
        let t = self.text.as_str();
        let (strip, kind) = if t.starts_with("belajar") {
            (3, Prefix::Ber)
        } else if t.starts_with("ber") {
            (3, Prefix::Ber)
        } else if t.starts_with("be") && self.consonant_then_er(2) {
            (2, Prefix::Ber)
        } else if t.starts_with("pelajar") {
            (3, Prefix::Per)
        } else if t.starts_with("per") {
            (3, Prefix::Per)
        } else if t.starts_with("pe") {
            (2, Prefix::Per)
        } else {
            return false;
        };
        self.text.replace_range(..strip, "");
        self.measure -= 1;
        if self.prefix == Prefix::None {
            self.prefix = kind;
        }
        true
    }

    fn remove_derivational_suffix(&mut self) -> bool {
        let allowed = if self.text.ends_with("kan") {
            !matches!(self.prefix, Prefix::Ke | Prefix::Peng) && self.text.len() > 3
        } else if self.text.ends_with("an") {
            !matches!(self.prefix, Prefix::Di | Prefix::Meng | Prefix::Ter) && self.text.len() > 2
        } else if self.text.ends_with('i') {
            let before = self.text.len().checked_sub(2).map(|i| self.text.as_bytes()[i]);
            !matches!(self.prefix, Prefix::Ber | Prefix::Ke | Prefix::Peng)
                && before.is_some()
                && before != Some(b's')
        } else {
            false
        };
        if !allowed {
            return false;
        }
        let len = if self.text.ends_with("kan") {
            3
        } else if self.text.ends_with("an") {
            2
        } else {
            1
        };
        self.drop_suffix(len);
        true
    }

    fn drop_suffix(&mut self, len: usize) {
        let keep = self.text.len() - len;
        self.text.truncate(keep);
        self.measure -= 1;
    }

    /// Letter restored after a stripped `mem`/`pem` at `idx`.
    fn nasal_recoding(&self, idx: usize) -> &'static str {
        if !self.vowel_at(idx) {
            ""
        } else if is_root_with_suffix(&format!("m{}", &self.text[idx..])) {
            "m"
        } else {
            "p"
        }
    }

    fn vowel_at(&self, idx: usize) -> bool {
        self.text.as_bytes().get(idx).is_some_and(|b| is_vowel(*b))
    }

    fn consonant_then_er(&self, idx: usize) -> bool {
        let bytes = self.text.as_bytes();
        bytes.get(idx).is_some_and(|b| !is_vowel(*b))
            && bytes.get(idx + 1) == Some(&b'e')
            && bytes.get(idx + 2) == Some(&b'r')
    }
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}
