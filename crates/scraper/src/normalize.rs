// ABOUTME: Pure text, count and date normalization used by every field resolver.
// ABOUTME: Entity decoding, tag stripping, "1.5M" style counts, localized air dates and URL absolutizing.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Origin prefixed to site-relative links.
pub const BASE_URL: &str = "https://www.imdb.com";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]*>").expect("valid tag regex"));

static COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]+(?:[.,][0-9]+)*)\s*(mln|m|k)?").expect("valid count regex")
});

/// Cleans scraped text.
///
/// Decodes HTML entities, drops non-breaking spaces, strips tags, collapses
/// whitespace runs to one space and trims. The pass is repeated until the
/// text stops changing, so `clean(clean(s)) == clean(s)` for every input.
pub fn clean(text: &str) -> String {
    let mut current = clean_once(text);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let decoded = decode_entities(text).replace('\u{a0}', "");
    let stripped = TAG_RE.replace_all(&decoded, "");
    collapse_whitespace(&stripped)
}

/// Decodes common HTML entities to their character equivalents.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let entities = [
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&apos;", "'"),
        ("&nbsp;", "\u{a0}"),
        ("&ndash;", "–"),
        ("&mdash;", "—"),
        ("&lsquo;", "\u{2018}"),
        ("&rsquo;", "\u{2019}"),
        ("&ldquo;", "\u{201C}"),
        ("&rdquo;", "\u{201D}"),
        ("&hellip;", "…"),
        ("&bull;", "•"),
        ("&middot;", "·"),
        ("&copy;", "©"),
        ("&reg;", "®"),
        ("&trade;", "™"),
        ("&eacute;", "é"),
        ("&egrave;", "è"),
        ("&agrave;", "à"),
        ("&ograve;", "ò"),
        ("&ugrave;", "ù"),
        ("&igrave;", "ì"),
        ("&ccedil;", "ç"),
        ("&ntilde;", "ñ"),
        ("&uuml;", "ü"),
        ("&ouml;", "ö"),
        ("&auml;", "ä"),
    ];

    let mut result = s.to_string();
    for (entity, replacement) in &entities {
        result = result.replace(entity, replacement);
    }

    // &amp; last so "&amp;lt;" decodes one level per pass
    decode_numeric_entities(&result).replace("&amp;", "&")
}

/// Decodes numeric HTML entities like &#123; and &#x7B;
fn decode_numeric_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("&#") {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        let (is_hex, digits_start) = match after.as_bytes().first() {
            Some(b'x') | Some(b'X') => (true, 1),
            _ => (false, 0),
        };
        let body = &after[digits_start..];
        let digits_len = body
            .find(|c: char| !(if is_hex { c.is_ascii_hexdigit() } else { c.is_ascii_digit() }))
            .unwrap_or(body.len());
        let digits = &body[..digits_len];
        let terminated = body[digits_len..].starts_with(';');

        let decoded = if digits.is_empty() || !terminated {
            None
        } else if is_hex {
            u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
        } else {
            digits.parse::<u32>().ok().and_then(char::from_u32)
        };

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &body[digits_len + 1..];
            }
            None => {
                result.push_str("&#");
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Collapses whitespace runs into single spaces and trims.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a human formatted count such as "1.5M", "12K" or "2,3 mln".
///
/// The leading numeric token may use `,` or `.` as decimal separator. A single
/// separator is read as a decimal point; several are read as thousands
/// grouping. `k` multiplies by a thousand, `m`/`mln` by a million. The result
/// is truncated towards zero.
pub fn parse_count(text: &str) -> Option<u64> {
    let caps = COUNT_RE.captures(text)?;
    let number = caps.get(1)?.as_str();
    let multiplier: u64 = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(ref s) if s == "k" => 1_000,
        Some(_) => 1_000_000,
        None => 1,
    };

    let groups: Vec<&str> = number.split(|c| c == '.' || c == ',').collect();
    let (int_part, frac_part) = match groups.as_slice() {
        [int, frac] => (int.to_string(), *frac),
        _ => (groups.concat(), ""),
    };

    let int_value: u64 = int_part.parse().ok()?;
    let mut value = int_value.checked_mul(multiplier)?;
    if !frac_part.is_empty() {
        // Integer arithmetic avoids float truncation surprises (0.29 * 1000).
        let frac_digits = &frac_part[..frac_part.len().min(18)];
        let scale = 10u128.pow(frac_digits.len() as u32);
        let frac: u128 = frac_digits.parse().ok()?;
        value = value.checked_add((frac * multiplier as u128 / scale) as u64)?;
    }
    Some(value)
}

/// Date layouts, tried in order; the first that matches wins.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    const WEEKDAY: &str = r"(?:[^\s,\d]+\.?,?\s+)?";
    [
        // Mon, Sep 22, 2014
        format!(r"^{WEEKDAY}(?P<month>[^\s\d,]+)\s+(?P<day>\d{{1,2}}),\s*(?P<year>\d{{4}})$"),
        // lun, 22 sept 2014 / dom, 21 set 2014
        format!(r"^{WEEKDAY}(?P<day>\d{{1,2}})\.?\s+(?P<month>[^\s\d,]+)\s+(?P<year>\d{{4}})$"),
        // seg., 22 de set. de 2014
        format!(r"^{WEEKDAY}(?P<day>\d{{1,2}})\s+de\s+(?P<month>[^\s\d,]+)\s+de\s+(?P<year>\d{{4}})$"),
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid date regex"))
    .collect()
});

/// Month names and abbreviations across the supported page locales.
const MONTHS: &[(u32, &[&str])] = &[
    (1, &["jan", "january", "janvier", "janv", "gennaio", "gen", "enero", "ene", "janeiro", "januar", "jän"]),
    (2, &["feb", "february", "février", "fevrier", "févr", "fevr", "fév", "febbraio", "febrero", "fevereiro", "fev", "februar"]),
    (3, &["mar", "march", "mars", "marzo", "março", "marco", "märz", "mär"]),
    (4, &["apr", "april", "avril", "avr", "aprile", "abril", "abr"]),
    (5, &["may", "mai", "maggio", "mag", "mayo", "maio"]),
    (6, &["jun", "june", "juin", "giugno", "giu", "junio", "junho"]),
    (7, &["jul", "july", "juillet", "juil", "luglio", "lug", "julio", "julho"]),
    (8, &["aug", "august", "août", "aout", "agosto", "ago"]),
    (9, &["sep", "sept", "september", "septembre", "settembre", "set", "septiembre", "setembro"]),
    (10, &["oct", "october", "octobre", "ottobre", "ott", "octubre", "outubro", "out", "okt", "oktober"]),
    (11, &["nov", "november", "novembre", "noviembre", "novembro"]),
    (12, &["dec", "december", "décembre", "decembre", "déc", "dicembre", "dic", "diciembre", "dezembro", "dez", "dezember"]),
];

fn month_number(name: &str) -> Option<u32> {
    let name = name.trim_end_matches('.').to_lowercase();
    MONTHS
        .iter()
        .find(|(_, names)| names.contains(&name.as_str()))
        .map(|(n, _)| *n)
}

/// Parses a localized air date ("Mon, Sep 22, 2014", "lun, 22 sept 2014")
/// into `YYYY-MM-DD`.
pub fn parse_date(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for pattern in DATE_PATTERNS.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let date = month_number(&caps["month"]).and_then(|month| {
            let day = caps["day"].parse().ok()?;
            let year = caps["year"].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        });
        if let Some(date) = date {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Prefixes site-relative links with [`BASE_URL`] and strips any query string.
pub fn absolutize_url(url: &str) -> String {
    absolutize_url_with(BASE_URL, url)
}

/// [`absolutize_url`] against an explicit origin.
pub fn absolutize_url_with(base: &str, url: &str) -> String {
    let url = url.trim();
    let absolute = if url.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), url)
    } else {
        url.to_string()
    };
    match absolute.split_once('?') {
        Some((head, _)) => head.to_string(),
        None => absolute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_strips_tags_entities_and_whitespace() {
        assert_eq!(clean("  <b>Tom</b> &amp; <i>Jerry</i>\n\n "), "Tom & Jerry");
        assert_eq!(clean("Life&nbsp;Is\u{a0}Beautiful"), "LifeIsBeautiful");
        assert_eq!(clean("a\tb\n c"), "a b c");
    }

    #[test]
    fn clean_is_idempotent() {
        let inputs = [
            "&amp;lt;b&amp;gt;bold&amp;lt;/b&amp;gt;",
            "&l<x>t;b&gt;",
            "  &#60;p&#62; hi &#x3C;/p&#x3E; ",
            "<<b>b>",
            "a < b > c",
            "&#;&#x;&amp",
            "",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn decode_numeric() {
        assert_eq!(decode_entities("&#38;&#x26;&#169;"), "&&©");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn parse_count_suffixes() {
        assert_eq!(parse_count("1.5M"), Some(1_500_000));
        assert_eq!(parse_count("1.2K"), Some(1_200));
        assert_eq!(parse_count("1.8"), Some(1));
        assert_eq!(parse_count("2,3 mln"), Some(2_300_000));
        assert_eq!(parse_count("0.29k"), Some(290));
        assert_eq!(parse_count("(812)"), Some(812));
        assert_eq!(parse_count("1,234,567"), Some(1_234_567));
        assert_eq!(parse_count("not a number"), None);
    }

    #[test]
    fn parse_date_layouts() {
        assert_eq!(parse_date("Mon, Sep 22, 2014").as_deref(), Some("2014-09-22"));
        assert_eq!(parse_date("lun, 22 sept 2014").as_deref(), Some("2014-09-22"));
        assert_eq!(parse_date("seg., 22 de set. de 2014").as_deref(), Some("2014-09-22"));
        assert_eq!(parse_date("dom, 21 set 2014").as_deref(), Some("2014-09-21"));
        assert_eq!(parse_date("Sep 22, 2014").as_deref(), Some("2014-09-22"));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("Coming soon"), None);
        assert_eq!(parse_date("Mon, Foo 22, 2014"), None);
        assert_eq!(parse_date("Mon, Feb 30, 2014"), None);
    }

    #[test]
    fn absolutize() {
        assert_eq!(
            absolutize_url("/title/tt1234567/"),
            "https://www.imdb.com/title/tt1234567/"
        );
        assert_eq!(absolutize_url("https://x/y?z=1"), "https://x/y");
        assert_eq!(
            absolutize_url("/name/nm0000123/?ref_=tt_cl_t_1"),
            "https://www.imdb.com/name/nm0000123/"
        );
    }
}
