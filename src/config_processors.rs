use justconfig::error::ConfigError;
use justconfig::item::{MapAction, StringItem};

/// Cleans raw configuration strings before they are parsed.
pub trait ValueCleanup
where
    Self: Sized,
{
    /// Trims the value and strips one pair of surrounding double quotes, if present.
    fn unquote(self) -> Result<StringItem, ConfigError>;

    /// Expands `\t`, `\n` and `\\` escapes, so a tab separator can be written as `"\t"`.
    fn unescape(self) -> Result<StringItem, ConfigError>;
}

fn strip_quotes(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

fn expand_escapes(value: &str) -> String {
    let mut expanded = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            expanded.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => expanded.push('\t'),
            Some('n') => expanded.push('\n'),
            Some('\\') => expanded.push('\\'),
            Some(other) => {
                expanded.push('\\');
                expanded.push(other);
            }
            None => expanded.push('\\'),
        }
    }
    expanded
}

impl ValueCleanup for Result<StringItem, ConfigError> {
    fn unquote(self) -> Result<StringItem, ConfigError> {
        self?.map(|v| match strip_quotes(v) {
            Some(inner) => MapAction::Replace(vec![inner.to_owned()]),
            None => MapAction::Keep,
        })
    }

    fn unescape(self) -> Result<StringItem, ConfigError> {
        self?.map(|v| {
            if v.contains('\\') {
                MapAction::Replace(vec![expand_escapes(v)])
            } else {
                MapAction::Keep
            }
        })
    }
}
