//! Go struct tag parsing: `json:"name,omitempty" validate:"required"`.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("bad syntax for struct tag pair")]
    Syntax,
    #[error("bad syntax for struct tag key")]
    KeySyntax,
    #[error("bad syntax for struct tag value")]
    ValueSyntax,
}

/// One `key:"value"` pair. `name` is the value up to the first comma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub name: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructTags {
    tags: Vec<Tag>,
}

impl StructTags {
    pub fn parse(raw: &str) -> Result<Self, TagError> {
        let mut tags = Vec::new();
        let mut rest = raw;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }

            let key_len = rest
                .bytes()
                .take_while(|&b| b > b' ' && b != b':' && b != b'"' && b != 0x7f)
                .count();
            if key_len == 0 {
                return Err(TagError::KeySyntax);
            }
            let bytes = rest.as_bytes();
            if key_len + 1 >= bytes.len() || bytes[key_len] != b':' {
                return Err(TagError::Syntax);
            }
            if bytes[key_len + 1] != b'"' {
                return Err(TagError::ValueSyntax);
            }
            let key = &rest[..key_len];
            rest = &rest[key_len + 1..];

            // closing quote, skipping escaped characters
            let bytes = rest.as_bytes();
            let mut i = 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            if i >= bytes.len() {
                return Err(TagError::ValueSyntax);
            }
            let value = unquote(&rest[1..i])?;
            rest = &rest[i + 1..];

            let mut parts = value.split(',');
            let name = parts.next().unwrap_or_default().to_string();
            let options = parts.map(str::to_string).collect();
            tags.push(Tag { key: key.to_string(), name, options });
        }
        Ok(Self { tags })
    }

    /// First tag with this key.
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.key == key)
    }

    pub fn is_empty(&self) -> bool { self.tags.is_empty() }
}

/// Go double-quoted string body → its value.
pub(crate) fn unquote(body: &str) -> Result<String, TagError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\n' => return Err(TagError::ValueSyntax),
            '\\' => {}
            c => {
                out.push(c);
                continue;
            }
        }
        let escaped = chars.next().ok_or(TagError::ValueSyntax)?;
        let decoded = match escaped {
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0b}',
            '\\' => '\\',
            '"' => '"',
            // a single byte; only ASCII survives into a `String`
            'x' => ascii(hex_escape(&mut chars, 2)?)?,
            'u' => hex_escape(&mut chars, 4)?,
            'U' => hex_escape(&mut chars, 8)?,
            '0'..='7' => {
                let mut code = escaped.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    let d = chars.next().and_then(|c| c.to_digit(8)).ok_or(TagError::ValueSyntax)?;
                    code = code * 8 + d;
                }
                ascii(char::from_u32(code).ok_or(TagError::ValueSyntax)?)?
            }
            _ => return Err(TagError::ValueSyntax),
        };
        out.push(decoded);
    }
    Ok(out)
}

fn ascii(c: char) -> Result<char, TagError> {
    if c.is_ascii() { Ok(c) } else { Err(TagError::ValueSyntax) }
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<char, TagError> {
    let mut code = 0u32;
    for _ in 0..digits {
        let d = chars.next().and_then(|c| c.to_digit(16)).ok_or(TagError::ValueSyntax)?;
        code = code * 16 + d;
    }
    char::from_u32(code).ok_or(TagError::ValueSyntax)
}

// ------------------------------- Tests ------------------------------------ //
