//! Text normalization used to compare a player's guess against the round target.

/// Cut a title at the first parenthetical or dash qualifier, keeping the leading part.
///
/// A qualifier only counts once some letter or digit precedes it, so titles opening with a
/// parenthetical keep it.
fn strip_qualifiers(text: &str) -> &str {
    cut_before(cut_before(text, '('), '-')
}

fn cut_before(text: &str, marker: char) -> &str {
    text.match_indices(marker)
        .map(|(index, _)| index)
        .find(|&index| text[..index].chars().any(char::is_alphanumeric))
        .map_or(text, |index| &text[..index])
}

/// Reduce free text to a comparable token.
///
/// Lowercases, drops everything from the first `(` and then from the first `-` that follow some
/// text, and keeps only alphabetic or numeric characters of any script. The result may be empty.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    strip_qualifiers(&lowered)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Title with parenthetical and dash qualifiers removed, case and spacing preserved.
pub fn clean_title(title: &str) -> String {
    strip_qualifiers(title).trim().to_string()
}

/// Whether `guess` names the same item as `target`.
///
/// An empty guess token never matches a target with a non-empty token. Titles made only of
/// symbols normalize to nothing, so those are compared on their trimmed lowercase text instead.
pub fn is_correct_guess(guess: &str, target: &str) -> bool {
    let target_token = normalize(target);
    if target_token.is_empty() {
        let guess = guess.trim();
        return !guess.is_empty() && guess.to_lowercase() == target.trim().to_lowercase();
    }

    let guess_token = normalize(guess);
    !guess_token.is_empty() && guess_token == target_token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parenthetical_qualifiers_are_ignored() {
        assert_eq!(
            normalize("Thriller (25th Anniversary Edition)"),
            normalize("thriller")
        );
        assert_eq!(normalize("Thriller (25th Anniversary Edition)"), "thriller");
    }

    #[test]
    fn dash_qualifiers_are_ignored() {
        assert_eq!(normalize("Yesterday - Remastered 2009"), "yesterday");
        assert_eq!(normalize("Song (Live) - Single Version"), "song");
    }

    #[test]
    fn punctuation_and_spaces_are_removed() {
        assert_eq!(normalize("Sgt. Pepper's Lonely Hearts Club Band"), "sgtpepperslonelyheartsclubband");
        assert_eq!(normalize("  Abbey   Road! "), "abbeyroad");
    }

    #[test]
    fn letters_of_any_script_survive() {
        assert_eq!(normalize("Ænima"), "ænima");
        assert_eq!(normalize("東京 2020"), "東京2020");
        assert_eq!(normalize("Ça Plane Pour Moi"), "çaplanepourmoi");
    }

    #[test]
    fn normalize_is_idempotent() {
        for text in ["Abbey Road", "OK Computer (OKNOTOK)", "Ænima", "1999 - Remaster"] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn empty_guess_never_matches_a_real_title() {
        assert!(!is_correct_guess("", "Abbey Road"));
        assert!(!is_correct_guess("?!", "Abbey Road"));
        assert!(!is_correct_guess("(Remastered)", "Abbey Road"));
    }

    #[test]
    fn leading_parenthetical_is_part_of_the_title() {
        let title = "(What's the Story) Morning Glory? (Remastered)";
        assert_eq!(normalize(title), "whatsthestorymorningglory");
        assert_eq!(clean_title(title), "(What's the Story) Morning Glory?");
        assert!(is_correct_guess("whats the story morning glory", title));
        assert!(!is_correct_guess("Morning Glory", title));
        assert_eq!(normalize("-ism - Live"), "ism");
    }

    #[test]
    fn equivalent_guesses_match() {
        assert!(is_correct_guess("abbey road", "Abbey Road"));
        assert!(!is_correct_guess("ABBEY-ROAD", "Abbey Road (Remastered)"));
        assert!(is_correct_guess("abbeyroad", "Abbey Road (Remastered)"));
        assert!(is_correct_guess("thriller", "Thriller (25th Anniversary Edition)"));
    }

    #[test]
    fn symbol_only_titles_compare_raw_text() {
        assert!(is_correct_guess(" ÷ ", "÷"));
        assert!(!is_correct_guess("?", "÷"));
        assert!(!is_correct_guess("   ", "÷"));
    }

    #[test]
    fn clean_title_keeps_case_and_inner_spacing() {
        assert_eq!(clean_title("Abbey Road (Remastered)"), "Abbey Road");
        assert_eq!(clean_title("Get Lucky - Radio Edit"), "Get Lucky");
        assert_eq!(clean_title("Blue"), "Blue");
    }
}
