//! Maps classifier output onto monitor readings.

use serde::Deserialize;

use crate::reading::{Level, Reading};

const NEGATIVE_EMOTIONS: [&str; 5] = ["sad", "angry", "fear", "anxious", "neutral"];

const NEGATIVE_WORDS: [&str; 17] = [
    "not", "no", "never", "don't", "cant", "can't", "wont", "won't", "bad", "sad", "angry",
    "upset", "terrible", "horrible", "sick", "ill", "pain",
];

const POSITIVE_WORDS: [&str; 8] = [
    "happy",
    "joy",
    "great",
    "good",
    "wonderful",
    "amazing",
    "excellent",
    "fantastic",
];

const STRESS_WORDS: [&str; 7] = [
    "stress",
    "anxious",
    "worried",
    "angry",
    "sad",
    "upset",
    "frustrated",
];

const HIGH: Level = Level::percent(90);
const ELEVATED: Level = Level::percent(70);
const ADJUSTED_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Deserialize)]
pub struct EmotionAnalysis {
    pub emotion: String,
    pub confidence: f64,
    #[serde(default)]
    pub text: String,
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.contains(word))
}

impl EmotionAnalysis {
    /// Corrects the classifier label when the transcript clearly contradicts it.
    pub fn adjusted(&self) -> EmotionAnalysis {
        let text = self.text.to_lowercase();
        let emotion = self.emotion.trim().to_lowercase();
        let (emotion, confidence) = match emotion.as_str() {
            "joy" | "happy" if contains_any(&text, &NEGATIVE_WORDS) => {
                ("sad".to_string(), ADJUSTED_CONFIDENCE)
            }
            "sad" | "fear" if contains_any(&text, &POSITIVE_WORDS) => {
                ("happy".to_string(), ADJUSTED_CONFIDENCE)
            }
            _ => (emotion, self.confidence),
        };
        EmotionAnalysis {
            emotion,
            confidence,
            text: self.text.clone(),
        }
    }

    pub fn is_negative(&self) -> bool {
        let emotion = self.emotion.trim().to_lowercase();
        NEGATIVE_EMOTIONS.contains(&emotion.as_str())
    }

    pub fn high_intensity(&self) -> bool {
        self.confidence > 0.5
    }

    pub fn high_stress(&self) -> bool {
        let text = self.text.to_lowercase();
        contains_any(&text, &NEGATIVE_WORDS) && contains_any(&text, &STRESS_WORDS)
    }

    /// Returns a reading only when the adjusted analysis looks like distress.
    pub fn to_reading(&self) -> Option<Reading> {
        let analysis = self.adjusted();
        if !analysis.is_negative() {
            return None;
        }
        let high_intensity = analysis.high_intensity();
        let high_stress = analysis.high_stress();
        if !high_intensity && !high_stress {
            return None;
        }

        Some(Reading::new(
            if high_intensity { HIGH } else { ELEVATED },
            if high_stress { HIGH } else { ELEVATED },
        ))
    }
}
