//! LLM prompt engineering for show-booking extraction

use crate::types::{FieldGroup, PromptStyle};

/// Builds prompts for one field group
pub struct PromptBuilder<'a> {
    group: FieldGroup,
    text: &'a str,
    style: PromptStyle,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(group: FieldGroup, text: &'a str) -> Self {
        Self {
            group,
            text,
            style: PromptStyle::Standard,
        }
    }

    /// Use a different prompting style
    pub fn with_style(mut self, style: PromptStyle) -> Self {
        self.style = style;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Shared instructions and the group being requested
        prompt.push_str(BASE_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("FIELD GROUP: {}\n", self.group));
        prompt.push_str(group_instructions(self.group));
        prompt.push_str("\n\n");

        // 2. Stricter second pass
        if self.style == PromptStyle::Improved {
            prompt.push_str(IMPROVE_INSTRUCTIONS);
            prompt.push_str("\n\n");
        }

        // 3. The text to analyze
        prompt.push_str("Document:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        // 4. Output format reminder
        prompt.push_str("Output format (JSON only):\n");
        prompt.push_str(schema(self.group));
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

/// JSON shape expected back for a field group
pub fn schema(group: FieldGroup) -> &'static str {
    match group {
        FieldGroup::Show => SHOW_SCHEMA,
        FieldGroup::Venue => VENUE_SCHEMA,
        FieldGroup::Contacts => CONTACTS_SCHEMA,
    }
}

fn group_instructions(group: FieldGroup) -> &'static str {
    match group {
        FieldGroup::Show => SHOW_INSTRUCTIONS,
        FieldGroup::Venue => VENUE_INSTRUCTIONS,
        FieldGroup::Contacts => CONTACTS_INSTRUCTIONS,
    }
}

const BASE_INSTRUCTIONS: &str = r#"You read booking documents for live music and touring: offers, confirmations, routing sheets, advance sheets and forwarded e-mails.
Extract only what the document states. Never guess or fill in plausible values.

Rules:
- Any field not stated in the document must be null
- Copy names exactly as written
- Dates as YYYY-MM-DD when the year is known; otherwise copy the date as written
- Times as written (e.g. "8:00 PM")
- Report one "confidence" between 0.0 and 1.0 for how sure you are about the whole answer:
  - Mostly guessing: 0.2-0.4
  - Stated but ambiguous: 0.5-0.7
  - Stated plainly: 0.8-0.95"#;

const SHOW_INSTRUCTIONS: &str = r#"Extract every show (performance date) in the document. Routing sheets list several shows; return each one.
Fields per show: artist, title, date, start_time, door_time, status (confirmed, hold, offer, cancelled), fee, currency, deal_type (guarantee, versus, door deal, flat), ticket_price, venue_name, city.
"fee" is the guaranteed amount as a number without currency symbols or separators."#;

const VENUE_INSTRUCTIONS: &str = r#"Extract the venue the document is about.
Fields: name, address, city, region (state or province), country, capacity."#;

const CONTACTS_INSTRUCTIONS: &str = r#"Extract every person named as a contact: promoters, agents, production managers, box office.
Fields per contact: name, email, phone, role."#;

const IMPROVE_INSTRUCTIONS: &str = r#"A previous pass over this document missed or mangled fields.
Re-read the whole document slowly, including headers, signatures and tables.
Check every field against the document before answering; prefer null over a guess.
Normalize every date you can to YYYY-MM-DD."#;

const SHOW_SCHEMA: &str = r#"{
  "shows": [
    {
      "artist": "string or null",
      "title": "string or null",
      "date": "YYYY-MM-DD or null",
      "start_time": "string or null",
      "door_time": "string or null",
      "status": "string or null",
      "fee": "number or null",
      "currency": "string or null",
      "deal_type": "string or null",
      "ticket_price": "string or null",
      "venue_name": "string or null",
      "city": "string or null"
    }
  ],
  "confidence": 0.0
}"#;

const VENUE_SCHEMA: &str = r#"{
  "name": "string or null",
  "address": "string or null",
  "city": "string or null",
  "region": "string or null",
  "country": "string or null",
  "capacity": "string or null",
  "confidence": 0.0
}"#;

const CONTACTS_SCHEMA: &str = r#"{
  "contacts": [
    {
      "name": "string or null",
      "email": "string or null",
      "phone": "string or null",
      "role": "string or null"
    }
  ],
  "confidence": 0.0
}"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Remember: Return ONLY valid JSON, no markdown code blocks, no explanations.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_group() {
        let prompt = PromptBuilder::new(FieldGroup::Venue, "text").build();
        assert!(prompt.contains("FIELD GROUP: venue"));
        assert!(prompt.contains("\"capacity\""));
    }

    #[test]
    fn test_prompt_includes_text() {
        let prompt = PromptBuilder::new(FieldGroup::Show, "Show at The Fillmore").build();
        assert!(prompt.contains("---\nShow at The Fillmore\n---"));
    }

    #[test]
    fn test_improved_style_adds_instructions() {
        let standard = PromptBuilder::new(FieldGroup::Show, "x").build();
        let improved = PromptBuilder::new(FieldGroup::Show, "x")
            .with_style(PromptStyle::Improved)
            .build();
        assert!(!standard.contains("previous pass"));
        assert!(improved.contains("previous pass"));
    }

    #[test]
    fn test_each_group_has_a_schema() {
        for group in [FieldGroup::Show, FieldGroup::Venue, FieldGroup::Contacts] {
            let schema: serde_json::Value = serde_json::from_str(schema(group)).unwrap();
            assert!(schema.get("confidence").is_some());
        }
    }
}
