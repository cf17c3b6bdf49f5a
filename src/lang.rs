//! Reply language detection
//!
//! Best-effort Unicode-script classifier over short text. The detected
//! two-letter code selects the synthesis voice; there is no accuracy
//! guarantee. Ambiguous or script-free input falls back to the
//! configured default code, since synthesis always needs *some* code.

/// Scripts the classifier distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Latin,
    Arabic,
    Devanagari,
    Han,
    Hangul,
    Cyrillic,
}

impl Script {
    fn of(c: char) -> Option<Self> {
        match c {
            'a'..='z' | 'A'..='Z' | '\u{00C0}'..='\u{024F}' => Some(Self::Latin),
            '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{FB50}'..='\u{FEFF}' => {
                Some(Self::Arabic)
            }
            '\u{0900}'..='\u{097F}' => Some(Self::Devanagari),
            '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' => Some(Self::Han),
            '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}' => Some(Self::Hangul),
            '\u{0400}'..='\u{04FF}' => Some(Self::Cyrillic),
            _ => None,
        }
    }

    /// Two-letter synthesis language for a script
    ///
    /// Arabic script maps to Urdu: this assistant's voice path is tuned
    /// for Urdu/English, and the transcription locale is ur-PK.
    const fn language(self) -> &'static str {
        match self {
            Self::Latin => "en",
            Self::Arabic => "ur",
            Self::Devanagari => "hi",
            Self::Han => "zh",
            Self::Hangul => "ko",
            Self::Cyrillic => "ru",
        }
    }
}

/// Minimum share of classified characters a script needs to win
const DOMINANCE_THRESHOLD: f32 = 0.5;

/// Detects the language of generated reply text
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    default_language: String,
}

impl LanguageDetector {
    /// Create a detector with the fallback code used for undetectable input
    #[must_use]
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            default_language: default_language.into(),
        }
    }

    /// Best-guess two-letter language code for `text`
    ///
    /// Falls back to the configured default when no script reaches a
    /// majority of the classified characters.
    #[must_use]
    pub fn detect(&self, text: &str) -> String {
        let mut counts: [(Script, usize); 6] = [
            (Script::Latin, 0),
            (Script::Arabic, 0),
            (Script::Devanagari, 0),
            (Script::Han, 0),
            (Script::Hangul, 0),
            (Script::Cyrillic, 0),
        ];

        let mut total = 0usize;
        for c in text.chars() {
            if let Some(script) = Script::of(c) {
                total += 1;
                for entry in &mut counts {
                    if entry.0 == script {
                        entry.1 += 1;
                    }
                }
            }
        }

        if total == 0 {
            tracing::debug!(fallback = %self.default_language, "no script characters, using default");
            return self.default_language.clone();
        }

        let (script, count) = counts
            .iter()
            .max_by_key(|(_, n)| *n)
            .copied()
            .unwrap_or((Script::Latin, 0));

        #[allow(clippy::cast_precision_loss)]
        let share = count as f32 / total as f32;
        if share >= DOMINANCE_THRESHOLD {
            let lang = script.language();
            tracing::debug!(lang, share, "detected reply language");
            lang.to_string()
        } else {
            tracing::debug!(
                share,
                fallback = %self.default_language,
                "no dominant script, using default"
            );
            self.default_language.clone()
        }
    }
}
