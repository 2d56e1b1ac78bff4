//! Syllable estimation and Flesch formulas.

use serde::Serialize;

use crate::round_to;

/// Estimate the syllables of one word.
///
/// Non-letters are dropped; words of up to three letters count as one
/// syllable; a silent trailing `e` is dropped unless it follows `l`, `e`,
/// `a` or `s`; the rest is the number of vowel groups (`aeiouy`), at least 1.
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<u8> = word
        .to_lowercase()
        .bytes()
        .filter(u8::is_ascii_lowercase)
        .collect();
    if letters.len() <= 3 {
        return 1;
    }

    let n = letters.len();
    let silent_e =
        letters[n - 1] == b'e' && !matches!(letters[n - 2], b'l' | b'e' | b'a' | b's');
    let stem = if silent_e {
        &letters[..n - 1]
    } else {
        &letters[..]
    };

    let mut groups = 0;
    let mut in_vowel = false;
    for &b in stem {
        let vowel = matches!(b, b'a' | b'e' | b'i' | b'o' | b'u' | b'y');
        if vowel && !in_vowel {
            groups += 1;
        }
        in_vowel = vowel;
    }
    groups.max(1)
}

/// Flesch Reading Ease, clamped to `[0, 100]` and rounded.
pub fn flesch_reading_ease(words_per_sentence: f64, syllables_per_word: f64) -> f64 {
    let score = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    score.clamp(0.0, 100.0).round()
}

/// Flesch-Kincaid grade level, at least 0, rounded to one decimal.
pub fn flesch_kincaid_grade(words_per_sentence: f64, syllables_per_word: f64) -> f64 {
    let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;
    round_to(grade.max(0.0), 1)
}

/// Verbal band of a Flesch Reading Ease score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadabilityLevel {
    VeryEasy,
    Easy,
    FairlyEasy,
    Standard,
    FairlyDifficult,
    Difficult,
    VeryDifficult,
}

impl ReadabilityLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::VeryEasy,
            s if s >= 80.0 => Self::Easy,
            s if s >= 70.0 => Self::FairlyEasy,
            s if s >= 60.0 => Self::Standard,
            s if s >= 50.0 => Self::FairlyDifficult,
            s if s >= 30.0 => Self::Difficult,
            _ => Self::VeryDifficult,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VeryEasy => "Very Easy",
            Self::Easy => "Easy",
            Self::FairlyEasy => "Fairly Easy",
            Self::Standard => "Standard",
            Self::FairlyDifficult => "Fairly Difficult",
            Self::Difficult => "Difficult",
            Self::VeryDifficult => "Very Difficult",
        }
    }
}
