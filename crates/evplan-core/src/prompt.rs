//! Prompt construction for the generative endpoint.
//!
//! Pure logic: the same input always yields the same prompt.

use crate::form::FormInput;

/// The suggestion arrays requested from the model, with their suggested sizes.
pub const SUGGESTION_FIELDS: [(&str, usize, &str); 4] = [
    ("theme_suggestions", 3, "party themes"),
    ("activities", 4, "activities for the event"),
    ("todo_list", 5, "preparation tasks for the host"),
    ("gift_ideas", 4, "gift ideas"),
];

const FORMAT_RULES: &str = "Respond with the JSON object only. \
Do not wrap it in markdown code fences, do not add commentary, \
and do not include any text before or after the JSON.";

/// Build the prompt for one form submission.
pub fn build_prompt(input: &FormInput) -> String {
    let mut prompt = String::with_capacity(768);

    prompt.push_str("You are an expert event planner.\n\n");
    prompt.push_str(&format!(
        "Plan a {} for {}, who is {} years old (gender: {}).\n\n",
        input.event_type.trim(),
        input.name.trim(),
        input.age.trim(),
        input.gender,
    ));

    prompt.push_str("Return a JSON object with exactly these four keys, each an array of strings:\n");
    for (key, count, what) in SUGGESTION_FIELDS {
        prompt.push_str(&format!("- \"{key}\": {count} {what}\n"));
    }
    prompt.push('\n');

    prompt.push_str("Example shape:\n");
    prompt.push_str(
        "{\"theme_suggestions\": [\"...\"], \"activities\": [\"...\"], \
         \"todo_list\": [\"...\"], \"gift_ideas\": [\"...\"]}\n\n",
    );
    prompt.push_str(FORMAT_RULES);

    prompt
}
