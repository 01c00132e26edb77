//! Presentation content.

use keepsake_core::error::DomainError;
use keepsake_core::view::StepId;
use serde::{Deserialize, Serialize};

/// One timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moment {
    /// Caption shown under the image.
    pub caption: String,
    /// Image reference, resolved by the view.
    pub image: String,
}

impl Moment {
    fn new(caption: &str, image: &str) -> Self {
        Self {
            caption: caption.to_owned(),
            image: image.to_owned(),
        }
    }
}

/// A prompt with the options offered at a choice step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoicePrompt {
    /// The question.
    pub prompt: String,
    /// Option labels; every option leads to the same next step.
    pub options: Vec<String>,
}

/// Everything the presentation says and shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Lines typed one after another on the intro step.
    pub intro_lines: Vec<String>,
    /// First choice.
    pub question: ChoicePrompt,
    /// Timeline entries, in order.
    pub moments: Vec<Moment>,
    /// Chat messages, in order.
    pub chat_messages: Vec<String>,
    /// Second choice.
    pub reflection: ChoicePrompt,
    /// Message revealed by the envelope.
    pub final_message: String,
    /// Shown when the user freezes the ending.
    pub freeze_acknowledgement: String,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            intro_lines: vec![
                "Every story starts with a moment...".to_owned(),
                "This is ours.".to_owned(),
            ],
            question: ChoicePrompt {
                prompt: "Do you remember how it started?".to_owned(),
                options: vec!["I remember".to_owned(), "Remind me".to_owned()],
            },
            moments: vec![
                Moment::new("The first time...", "assets/The first time.jpg"),
                Moment::new("The first laugh...", "assets/The first laugh.jpg"),
                Moment::new("The first silence...", "assets/The first silence.jpg"),
                Moment::new(
                    "The moment everything changed.",
                    "assets/The moment everything changed.jpg",
                ),
            ],
            chat_messages: vec![
                "I never said this out loud...".to_owned(),
                "But I felt it every time.".to_owned(),
                "You felt like home.".to_owned(),
            ],
            reflection: ChoicePrompt {
                prompt: "What would you keep?".to_owned(),
                options: vec!["Every moment".to_owned(), "Just this one".to_owned()],
            },
            final_message: "Some moments are meant to be kept.".to_owned(),
            freeze_acknowledgement: "The moment is yours to keep.".to_owned(),
        }
    }
}

impl Script {
    /// Parses a script from YAML and validates it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfig` if the YAML is malformed or the
    /// script fails [`Script::validate`].
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        let script: Self = serde_yaml::from_str(source)
            .map_err(|e| DomainError::InvalidConfig(format!("script: {e}")))?;
        script.validate()?;
        Ok(script)
    }

    /// Checks that the timeline and both choices have something to offer.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfig` naming the empty section.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.moments.is_empty() {
            return Err(DomainError::InvalidConfig(
                "script needs at least one moment".to_owned(),
            ));
        }
        for (name, prompt) in [("question", &self.question), ("reflection", &self.reflection)] {
            if prompt.options.is_empty() {
                return Err(DomainError::InvalidConfig(format!(
                    "{name} needs at least one option"
                )));
            }
        }
        Ok(())
    }

    /// The prompt shown at a choice step.
    #[must_use]
    pub fn prompt(&self, step: StepId) -> Option<&ChoicePrompt> {
        match step {
            StepId::Question => Some(&self.question),
            StepId::Reflection => Some(&self.reflection),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_script_has_original_content() {
        let script = Script::default();

        assert_eq!(script.validate(), Ok(()));
        assert_eq!(script.intro_lines.len(), 2);
        assert_eq!(script.moments.len(), 4);
        assert_eq!(script.chat_messages.len(), 3);
        assert_eq!(script.moments[3].caption, "The moment everything changed.");
    }

    #[test]
    fn test_script_parses_from_yaml() {
        // Arrange
        let yaml = r#"
intro_lines: ["Hello."]
question: { prompt: "Ready?", options: ["Yes", "Also yes"] }
moments:
  - { caption: "Only moment", image: "only.jpg" }
chat_messages: []
reflection: { prompt: "And now?", options: ["Go on"] }
final_message: "Bye."
freeze_acknowledgement: "Kept."
"#;

        // Act
        let script = Script::from_yaml(yaml).unwrap();

        // Assert
        assert_eq!(script.intro_lines, vec!["Hello.".to_owned()]);
        assert_eq!(script.moments[0].image, "only.jpg");
        assert!(script.chat_messages.is_empty());
        assert_eq!(script.reflection.options.len(), 1);
    }

    #[test]
    fn test_script_with_unknown_field_is_invalid_config() {
        let yaml = "intro_lines: []\nsoundtrack: song.mp3\n";

        assert!(matches!(
            Script::from_yaml(yaml),
            Err(DomainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_script_without_moments_is_invalid_config() {
        let script = Script {
            moments: Vec::new(),
            ..Script::default()
        };

        assert!(matches!(script.validate(), Err(DomainError::InvalidConfig(_))));
    }

    #[test]
    fn test_choice_without_options_is_invalid_config() {
        let mut script = Script::default();
        script.reflection.options.clear();

        let result = script.validate();

        assert!(matches!(result, Err(DomainError::InvalidConfig(m)) if m.contains("reflection")));
    }

    #[test]
    fn test_prompt_exists_only_for_choice_steps() {
        let script = Script::default();

        for step in StepId::ALL {
            assert_eq!(script.prompt(step).is_some(), step.is_choice(), "{step}");
        }
    }
}
