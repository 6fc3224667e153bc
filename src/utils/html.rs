// src/utils/html.rs

use ammonia;

/// Clean administrator-supplied text using the ammonia library.
///
/// Question prompts, options and the quiz title are entered in the admin
/// panel and rendered back to every quiz taker, so they pass through a
/// whitelist-based sanitizer: safe tags survive, anything like <script> or
/// an onclick attribute is stripped. This is the fail-safe against stored
/// XSS reaching the quiz page.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_tags() {
        let cleaned = clean_html("What is 2+2?<script>alert('x')</script>");
        assert_eq!(cleaned, "What is 2+2?");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean_html("Just a question"), "Just a question");
    }
}
