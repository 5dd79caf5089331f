#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCell {
    Items(Vec<String>),
    NotAList,
    Malformed,
}

/// Fail-soft reading of a string-serialized list such as `['Bitcoin', 'Ethereum']`.
pub fn parse_list_cell(value: &str) -> Vec<String> {
    match classify_list_cell(value) {
        ListCell::Items(items) => items,
        ListCell::NotAList | ListCell::Malformed => Vec::new(),
    }
}

pub fn classify_list_cell(value: &str) -> ListCell {
    let trimmed = value.trim();
    if !trimmed.starts_with('[') {
        return ListCell::NotAList;
    }
    match parse_literal_list(trimmed) {
        Some(items) => ListCell::Items(items),
        None => ListCell::Malformed,
    }
}

// Accepts a bracketed list of single- or double-quoted strings with an
// optional trailing comma. Anything else (numbers, nesting, bare words) is rejected.
fn parse_literal_list(value: &str) -> Option<Vec<String>> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(_) => return None,
        };

        let mut item = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next()? {
                    'n' => item.push('\n'),
                    't' => item.push('\t'),
                    other => item.push(other),
                },
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => item.push(c),
            }
        }
        if !closed {
            return None;
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return None,
        }
    }

    Some(items)
}

#[cfg(test)]
mod tests {
    use super::{classify_list_cell, parse_list_cell, ListCell};

    #[test]
    fn parses_python_style_lists() {
        assert_eq!(
            parse_list_cell("['Bitcoin', 'Ethereum']"),
            vec!["Bitcoin", "Ethereum"]
        );
        assert_eq!(parse_list_cell(r#" ["Solana",] "#), vec!["Solana"]);
        assert_eq!(parse_list_cell("[]"), Vec::<String>::new());
        assert_eq!(parse_list_cell(r"['Bitcoin\'s fork']"), vec!["Bitcoin's fork"]);
    }

    #[test]
    fn list_items_are_kept_verbatim() {
        assert_eq!(parse_list_cell("['', ' Bitcoin ']"), vec!["", " Bitcoin "]);
        assert_eq!(parse_list_cell(r#"["Ethereum ", 'Solana']"#), vec!["Ethereum ", "Solana"]);
    }

    #[test]
    fn non_lists_and_garbage_degrade_to_empty() {
        assert_eq!(parse_list_cell("not a list"), Vec::<String>::new());
        assert_eq!(parse_list_cell("NaN"), Vec::<String>::new());
        assert_eq!(parse_list_cell(""), Vec::<String>::new());
        assert_eq!(classify_list_cell("['unterminated"), ListCell::Malformed);
        assert_eq!(classify_list_cell("[1, 2]"), ListCell::Malformed);
        assert_eq!(classify_list_cell("[,]"), ListCell::Malformed);
        assert_eq!(classify_list_cell("['a' 'b']"), ListCell::Malformed);
        assert_eq!(classify_list_cell("Bitcoin"), ListCell::NotAList);
    }
}
