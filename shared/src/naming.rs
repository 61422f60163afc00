//! Naming Transform
//!
//! Derives ASCII account handles from a Cyrillic full name written in
//! "Last First Middle" order. Pure functions, no I/O.

/// Default corporate mail domain
pub const DEFAULT_EMAIL_DOMAIN: &str = "teplocentral.org";

/// Local part used when the name has no tokens at all
const FALLBACK_LOCAL_PART: &str = "user";

const MESSENGER_PREFIX: &str = "msg.";

/// Lowercase Cyrillic letter to Latin sequence
fn translit_lower(c: char) -> Option<&'static str> {
    let s = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(s)
}

/// Transliterate Cyrillic letters to Latin.
///
/// Uppercase letters keep their case on the first output character
/// (`Щ` → `Shch`). Anything outside the table passes through unchanged.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        match translit_lower(lower) {
            Some(latin) if lower != c => {
                let mut chars = latin.chars();
                if let Some(first) = chars.next() {
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                }
            }
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
    out
}

fn initial(token: &str) -> String {
    transliterate(token)
        .chars()
        .next()
        .map(String::from)
        .unwrap_or_default()
}

/// Build the corporate mailbox for a full name.
///
/// | tokens | local part |
/// |--------|------------|
/// | 3+ | `f.m.last` |
/// | 2 | `f.last` |
/// | 1 | `token` |
/// | 0 | `user` |
///
/// Tokens past the third are ignored.
pub fn corporate_email(full_name: &str, domain: &str) -> String {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    let local = match tokens.as_slice() {
        [] => FALLBACK_LOCAL_PART.to_string(),
        [only] => transliterate(only),
        [last, first] => format!("{}.{}", initial(first), transliterate(last)),
        [last, first, middle, ..] => format!(
            "{}.{}.{}",
            initial(first),
            initial(middle),
            transliterate(last)
        ),
    };
    format!("{}@{}", local.to_lowercase(), domain)
}

/// Part of an address before `@` (the whole string if there is none)
pub fn local_part(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}

/// Messenger handle: `msg.` plus the transliterated, lowercased name
/// with whitespace runs collapsed to dots.
pub fn messenger_handle(full_name: &str) -> String {
    let joined = full_name
        .split_whitespace()
        .map(transliterate)
        .collect::<Vec<_>>()
        .join(".");
    format!("{}{}", MESSENGER_PREFIX, joined.to_lowercase())
}

/// Account handles derived for a new hire
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AccountHandles {
    pub email: String,
    pub directory_account: String,
    pub messenger_handle: String,
}

impl AccountHandles {
    pub fn for_name(full_name: &str, domain: &str) -> Self {
        let email = corporate_email(full_name, domain);
        Self {
            directory_account: local_part(&email).to_string(),
            messenger_handle: messenger_handle(full_name),
            email,
        }
    }
}
