// Prompt rendering for the theme-mapping call.
//
// The prompt is a pure function of (vocabulary snapshot, batch). The
// vocabulary is rendered sorted, so identical state always yields
// byte-identical prompts.

use crate::articles::Article;

use super::models::ThemeVocabulary;

const INSTRUCTIONS: &str = r#"You are a Theme Mapper. Assign every article below to a theme.

PRIORITY ORDER:
1. FIRST: map an article to an existing theme if it fits.
2. SECOND: find 2 or more articles that share a topic and create ONE shared new theme name for them.
3. LAST RESORT ONLY: give an article its own theme if it cannot be grouped with anything else.

Focus on GROUPING articles together rather than creating individual themes.
Every article_id in the input must appear in doc_to_theme exactly once.
List every theme you use that is not in existing_themes in new_theme_names.

Return ONLY a JSON object of this exact shape, with no markdown and no commentary:

{
  "doc_to_theme": {"<article_id>": "<theme_name>"},
  "new_theme_names": ["<theme_name>", ...]
}"#;

const EXAMPLES: &str = r#"EXAMPLE A (no existing themes, first batch):
existing_themes: []
new_articles: [
  {"article_id": "0", "summary": "Eye exams can detect early Alzheimer's signs..."},
  {"article_id": "1", "summary": "Fiber intake important for digestive health..."},
  {"article_id": "2", "summary": "Common eye conditions in older adults like cataracts..."},
  {"article_id": "3", "summary": "Sunglasses protect against UV damage to eyes..."},
  {"article_id": "4", "summary": "Vitamin deficiencies cause fatigue and weakness..."}
]
Output:
{"doc_to_theme": {"0": "Eye Health", "2": "Eye Health", "3": "Eye Health", "1": "Nutrition", "4": "Nutrition"},
 "new_theme_names": ["Eye Health", "Nutrition"]}

EXAMPLE B (existing themes plus one new shared theme):
existing_themes: ["Eye Health", "Nutrition"]
new_articles: [
  {"article_id": "5", "summary": "New contact lens technology improves vision..."},
  {"article_id": "6", "summary": "Heart disease prevention through exercise..."},
  {"article_id": "7", "summary": "Different types of cardio workouts for seniors..."},
  {"article_id": "8", "summary": "Protein supplements for muscle building..."}
]
Output:
{"doc_to_theme": {"5": "Eye Health", "6": "Heart Health", "7": "Heart Health", "8": "Nutrition"},
 "new_theme_names": ["Heart Health"]}

EXAMPLE C (mostly existing themes plus one unique):
existing_themes: ["Eye Health", "Heart Health", "Nutrition"]
new_articles: [
  {"article_id": "9", "summary": "Glaucoma screening recommendations..."},
  {"article_id": "10", "summary": "Omega-3 fatty acids in fish..."},
  {"article_id": "11", "summary": "Rare genetic disorder affects 1 in a million people..."}
]
Output:
{"doc_to_theme": {"9": "Eye Health", "10": "Nutrition", "11": "Rare Genetic Disorders"},
 "new_theme_names": ["Rare Genetic Disorders"]}"#;

/// Render the theme-mapping prompt for one batch.
pub fn render_prompt(vocabulary: &ThemeVocabulary, batch: &[Article]) -> String {
    let existing = to_pretty_json(&vocabulary.sorted());
    let articles = to_pretty_json(&batch);

    format!(
        "{INSTRUCTIONS}\n\n{EXAMPLES}\n\n\
         ========================\n\
         NOW PROCESS THE REAL INPUT\n\
         ========================\n\
         existing_themes:\n{existing}\n\n\
         new_articles:\n{articles}\n"
    )
}

/// Render the repair prompt: ask for `raw` reformatted into the exact
/// response shape, without re-classifying anything.
pub fn render_repair_prompt(raw: &str, decode_error: &str) -> String {
    format!(
        "The text below was supposed to be a JSON object with exactly two fields:\n\
         \"doc_to_theme\" (an object mapping article id strings to theme name strings) and\n\
         \"new_theme_names\" (an array of theme name strings).\n\n\
         It failed to parse with this error:\n{decode_error}\n\n\
         Rewrite it as that JSON object. Keep every id and theme name exactly as written.\n\
         Return ONLY the JSON object, with no markdown fences and no commentary.\n\n\
         --- TEXT ---\n{raw}\n--- END TEXT ---\n"
    )
}

// Serializing a Vec<&str> or a slice of Articles cannot fail.
fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}
