//! Text helpers shared by the page renderers.

use pulldown_cmark::{html, Parser};

/// Splits an identifier into word tokens and joins them lowercased with `-`.
///
/// Tokens are, in order of preference at each position: an optional capital
/// followed by lowercase letters, an uppercase run of two or more that ends
/// before a capitalised word, a digit, a non-word character or the end of the
/// input, or a run of digits. Everything else is dropped.
pub fn convert_to_kebab(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if let Some(end) = capitalised_word_end(&chars, i)
            .or_else(|| acronym_end(&chars, i))
            .or_else(|| digit_run_end(&chars, i))
        {
            let word: String = chars[i..end].iter().collect();
            words.push(word.to_ascii_lowercase());
            i = end;
        } else {
            i += 1;
        }
    }

    words.join("-")
}

fn is_upper(c: Option<&char>) -> bool {
    c.is_some_and(|c| c.is_ascii_uppercase())
}

fn is_lower(c: Option<&char>) -> bool {
    c.is_some_and(|c| c.is_ascii_lowercase())
}

fn is_digit(c: Option<&char>) -> bool {
    c.is_some_and(|c| c.is_ascii_digit())
}

fn run_end(chars: &[char], start: usize, pred: impl Fn(Option<&char>) -> bool) -> usize {
    let mut end = start;
    while pred(chars.get(end)) {
        end += 1;
    }
    end
}

fn capitalised_word_end(chars: &[char], start: usize) -> Option<usize> {
    let first_lower = if is_upper(chars.get(start)) && is_lower(chars.get(start + 1)) {
        start + 1
    } else if is_lower(chars.get(start)) {
        start
    } else {
        return None;
    };
    Some(run_end(chars, first_lower, is_lower))
}

fn acronym_end(chars: &[char], start: usize) -> Option<usize> {
    let run = run_end(chars, start, is_upper);
    (start + 2..=run)
        .rev()
        .find(|&end| acronym_boundary(chars, end))
}

fn acronym_boundary(chars: &[char], at: usize) -> bool {
    match chars.get(at) {
        None => true,
        Some(c) if c.is_ascii_digit() => true,
        Some(c) if !(c.is_alphanumeric() || *c == '_') => true,
        Some(c) => c.is_ascii_uppercase() && is_lower(chars.get(at + 1)),
    }
}

fn digit_run_end(chars: &[char], start: usize) -> Option<usize> {
    let end = run_end(chars, start, is_digit);
    (end > start).then_some(end)
}

/// First path segment, used to highlight the active top-level nav item.
pub fn get_nav_path(path: &str) -> String {
    path.split('/').nth(1).unwrap_or_default().to_string()
}

/// Second path segment, used for the secondary navigation.
pub fn get_secondary_nav_path(path: &str) -> String {
    path.split('/').nth(2).unwrap_or_default().to_string()
}

/// Lowercase ASCII slug with runs of other characters collapsed into `-`.
pub fn slug(text: &str) -> String {
    let mut slug = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>();
    while slug.contains("--") {
        slug = slug.replace("--", "-");
    }
    slug.trim_matches('-').to_string()
}

/// Markdown to HTML.
pub fn markup(text: &str) -> String {
    let parser = Parser::new(text);
    let mut rendered = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut rendered, parser);
    rendered
}

/// Strips scripts, event handlers and other unsafe markup from third-party HTML.
pub fn sanitize_html(raw: &str) -> String {
    ammonia::clean(raw)
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Reverses one level of HTML entity escaping. Greenhouse ships job bodies
/// escaped; unknown named entities are left as written.
pub fn unescape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}
