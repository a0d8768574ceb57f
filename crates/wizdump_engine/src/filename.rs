/// Character substituted for anything that cannot appear in a file name.
pub const REPLACEMENT_CHAR: char = '-';

/// Maps a note title to a file name that is valid on every supported platform.
///
/// Each forbidden character is replaced one-for-one, so the result has the same
/// number of characters as the input.
pub fn sanitize_file_name(title: &str) -> String {
    title
        .chars()
        .map(|c| if is_forbidden(c) { REPLACEMENT_CHAR } else { c })
        .collect()
}

/// Sanitizes an attachment name the way the note store encodes it on disk:
/// apostrophes and commas are folded as well.
pub fn sanitize_attachment_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if is_forbidden(c) || matches!(c, '\'' | ',') {
                REPLACEMENT_CHAR
            } else {
                c
            }
        })
        .collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_characters_are_replaced_one_for_one() {
        assert_eq!(sanitize_file_name("a/b:c*d?"), "a-b-c-d-");
        assert_eq!(sanitize_file_name("tab\there"), "tab-here");
        assert_eq!(sanitize_file_name("Plain title.md"), "Plain title.md");
    }

    #[test]
    fn attachment_names_also_fold_apostrophe_and_comma() {
        assert_eq!(sanitize_attachment_name("Bob's list, v2.pdf"), "Bob-s list- v2.pdf");
        assert_eq!(sanitize_file_name("Bob's list, v2.pdf"), "Bob's list, v2.pdf");
    }

    #[test]
    fn unicode_titles_are_left_alone() {
        assert_eq!(sanitize_file_name("笔记 <草稿>"), "笔记 -草稿-");
    }
}
