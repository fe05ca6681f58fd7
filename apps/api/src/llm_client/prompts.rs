// Prompt templates sent to the generator.
// Placeholders are substituted with `str::replace` before sending.

/// Question-set prompt. Replace `{count}` before sending.
pub const QUESTION_SET_PROMPT_TEMPLATE: &str = r#"You're a senior Excel Interview Agent. Generate a set of {count} advanced-level Excel interview questions.

The questions must test deep proficiency in:
- INDEX-MATCH vs XLOOKUP
- PivotTables and Power Query
- Dynamic named ranges and array formulas
- Data validation, error handling (IFERROR, ISERROR)
- Excel Charts, VBA, Conditional Formatting
- Advanced formulas and data cleaning

Return ONLY a list of strings (no variable name, no explanation).
["Question 1...", "Question 2...", "Question 3..."]"#;

/// Answer evaluation prompt. Replace `{question}` and `{answer}` before sending.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"You are an AI Excel Interviewer.

Evaluate the following answer to this interview question:

Question: "{question}"
Answer: "{answer}"

Return ONLY a JSON object in this exact format:

{
  "score": <number from 0 to 10>,
  "feedback": "<1-2 line explanation>",
  "improvement": "<short suggestion>"
}

DO NOT add any commentary before or after the JSON. Just return the JSON."#;

pub fn question_set_prompt(count: usize) -> String {
    QUESTION_SET_PROMPT_TEMPLATE.replace("{count}", &count.to_string())
}

pub fn evaluation_prompt(question: &str, answer: &str) -> String {
    // Answer is substituted last so candidate text containing "{question}" stays literal.
    EVALUATION_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{answer}", answer)
}
