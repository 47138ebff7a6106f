//! Outbound prompt construction.

/// Instructions prepended to every caller prompt.
pub const FRONTEND_PREAMBLE: &str = "You are an expert frontend developer. \
Generate only the HTML, CSS, and JavaScript code, without explanations. \
Place all CSS within a <style> tag in the <head> of the HTML. \
Place all JavaScript within a <script> tag at the end of the <body>.";

/// Build the prompt sent to the provider for a caller's page description.
pub fn build_prompt(user_prompt: &str) -> String {
    format!("{} {}", FRONTEND_PREAMBLE, user_prompt)
}
