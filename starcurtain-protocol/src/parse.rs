//! Frame parsing for the Starcurtain protocol
//!
//! Frame format:
//! - PREFIX: `!!`
//! - HEADER: `type:command`, optionally followed by a `:`
//! - BODY: `{key=value,key=value,...}`
//! - SUFFIX: `##`
//!
//! The header is everything between the prefix and the first `{`; the body is
//! everything between that `{` and the last `}`. Only whitespace may follow
//! the body before the suffix. Segments without `=` are bare keys and are
//! recorded with an empty value.

use crate::command::{Command, CommandError};

/// Frame start marker
pub const FRAME_PREFIX: &str = "!!";

/// Frame end marker
pub const FRAME_SUFFIX: &str = "##";

/// Errors that can occur during parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Input does not start with `!!`
    MissingPrefix,
    /// Input does not end with `##`
    MissingSuffix,
    /// `{` or `}` missing, or `}` before `{`
    MalformedBraces,
    /// Header has no `:` between type and command
    MissingHeader,
    /// A field exceeds its capacity
    FieldTooLong,
    /// Too many distinct parameters
    TooManyParams,
}

impl ParseError {
    /// Stable human-readable reason, reported back over the wire
    ///
    /// Never contains frame markers, commas or braces so it can travel as a
    /// parameter value.
    pub fn reason(&self) -> &'static str {
        match self {
            ParseError::MissingPrefix => "Missing frame prefix",
            ParseError::MissingSuffix => "Missing frame suffix",
            ParseError::MalformedBraces => "Malformed braces",
            ParseError::MissingHeader => "Header must be 'type:command'",
            ParseError::FieldTooLong => "Field too long",
            ParseError::TooManyParams => "Too many parameters",
        }
    }
}

impl From<CommandError> for ParseError {
    fn from(e: CommandError) -> Self {
        match e {
            CommandError::TooManyParams => ParseError::TooManyParams,
            CommandError::FieldTooLong | CommandError::BufferTooSmall => ParseError::FieldTooLong,
        }
    }
}

/// Parse one complete frame into a [`Command`]
///
/// Duplicate keys overwrite earlier ones (last write wins).
pub fn parse(input: &str) -> Result<Command, ParseError> {
    if !input.starts_with(FRAME_PREFIX) {
        return Err(ParseError::MissingPrefix);
    }
    if input.len() < FRAME_PREFIX.len() + FRAME_SUFFIX.len() || !input.ends_with(FRAME_SUFFIX) {
        return Err(ParseError::MissingSuffix);
    }

    let (open, close) = match (input.find('{'), input.rfind('}')) {
        (Some(open), Some(close)) if close > open => (open, close),
        _ => return Err(ParseError::MalformedBraces),
    };
    if !input[close + 1..input.len() - FRAME_SUFFIX.len()].trim().is_empty() {
        return Err(ParseError::MalformedBraces);
    }

    let header = &input[FRAME_PREFIX.len()..open];
    let header = header.strip_suffix(':').unwrap_or(header);
    let (msg_type, command) = header.split_once(':').ok_or(ParseError::MissingHeader)?;

    let mut out = Command::new(msg_type.trim(), command.trim())?;

    for segment in input[open + 1..close].split(',') {
        let (key, value) = match segment.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (segment.trim(), ""),
        };
        if key.is_empty() {
            continue;
        }
        out.set_param(key, value)?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_basic() {
        let cmd = parse("!!config:set:{fade=0.9,wrap=1}##").unwrap();
        assert_eq!(cmd.msg_type.as_str(), "config");
        assert_eq!(cmd.command.as_str(), "set");
        assert_eq!(cmd.param("fade"), Some("0.9"));
        assert_eq!(cmd.param("wrap"), Some("1"));
    }

    #[test]
    fn test_parse_empty_body() {
        let cmd = parse("!!system:ping:{}##").unwrap();
        assert!(cmd.is("system", "ping"));
        assert!(cmd.params().is_empty());
    }

    #[test]
    fn test_parse_header_without_trailing_colon() {
        let cmd = parse("!!star:info{}##").unwrap();
        assert!(cmd.is("star", "info"));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let cmd = parse("!! star : add :{ count = 3 , speed= 12.5 }##").unwrap();
        assert!(cmd.is("star", "add"));
        assert_eq!(cmd.param("count"), Some("3"));
        assert_eq!(cmd.param("speed"), Some("12.5"));
    }

    #[test]
    fn test_parse_bare_key() {
        let cmd = parse("!!t:c:{flag,k=v,}##").unwrap();
        assert!(cmd.has_param("flag"));
        assert_eq!(cmd.param("flag"), Some(""));
        assert_eq!(cmd.param("k"), Some("v"));
        assert_eq!(cmd.params().len(), 2);
    }

    #[test]
    fn test_parse_value_keeps_extra_equals() {
        let cmd = parse("!!t:c:{expr=a=b}##").unwrap();
        assert_eq!(cmd.param("expr"), Some("a=b"));
    }

    #[test]
    fn test_parse_duplicate_last_wins() {
        let cmd = parse("!!t:c:{a=1,b=2,a=3}##").unwrap();
        assert_eq!(cmd.param("a"), Some("3"));
        assert_eq!(cmd.params().len(), 2);
    }

    #[test]
    fn test_parse_errors_are_distinct() {
        assert_eq!(parse("config:set:{}##"), Err(ParseError::MissingPrefix));
        assert_eq!(parse("!!config:set:{}"), Err(ParseError::MissingSuffix));
        assert_eq!(parse("!!config:set:##"), Err(ParseError::MalformedBraces));
        assert_eq!(parse("!!config:set:{##"), Err(ParseError::MalformedBraces));
        assert_eq!(parse("!!config:set:}{##"), Err(ParseError::MalformedBraces));
        assert_eq!(parse("!!t:c:{}junk##"), Err(ParseError::MalformedBraces));
        assert_eq!(parse("!!t:c:{k=v}x##"), Err(ParseError::MalformedBraces));
        assert!(parse("!!t:c:{k=v} ##").unwrap().is("t", "c"));
        assert_eq!(parse("!!configset:{}##"), Err(ParseError::MissingHeader));
        assert_eq!(parse("!##"), Err(ParseError::MissingPrefix));
        assert_eq!(parse("!!#"), Err(ParseError::MissingSuffix));
    }

    #[test]
    fn test_reasons_are_stable() {
        assert_eq!(ParseError::MissingPrefix.reason(), "Missing frame prefix");
        assert_eq!(ParseError::MissingSuffix.reason(), "Missing frame suffix");
        assert_eq!(ParseError::MalformedBraces.reason(), "Malformed braces");
        assert_ne!(
            ParseError::MissingPrefix.reason(),
            ParseError::MalformedBraces.reason()
        );
    }

    #[test]
    fn test_parse_too_many_params() {
        let frame = "!!t:c:{a=1,b=1,c=1,d=1,e=1,f=1,g=1,h=1,i=1,j=1,k=1,l=1,m=1}##";
        assert_eq!(parse(frame), Err(ParseError::TooManyParams));
    }

    #[test]
    fn test_roundtrip_serialize() {
        let original = parse("!!star:add:{count=3,color=#FF0000,size=4}##").unwrap();
        let wire = original.encode_to_string().unwrap();
        assert_eq!(wire.as_str(), "!!star:add:{count=3,color=#FF0000,size=4}##");
        assert_eq!(parse(&wire).unwrap(), original);
    }

    fn ident() -> impl Strategy<Value = std::string::String> {
        "[a-zA-Z][a-zA-Z0-9_]{0,7}"
    }

    fn value() -> impl Strategy<Value = std::string::String> {
        "[a-zA-Z0-9_.#-]{0,12}"
    }

    proptest! {
        #[test]
        fn prop_parse_serialize_parse_is_stable(
            msg_type in ident(),
            command in ident(),
            params in proptest::collection::vec((ident(), value()), 0..8),
        ) {
            let mut frame = std::format!("!!{}:{}:{{", msg_type, command);
            for (i, (k, v)) in params.iter().enumerate() {
                if i > 0 {
                    frame.push(',');
                }
                frame.push_str(&std::format!("{}={}", k, v));
            }
            frame.push_str("}##");

            let first = parse(&frame).unwrap();
            let wire = first.encode_to_string().unwrap();
            let second = parse(&wire).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_missing_prefix_always_rejected(body in "[a-z:{}=,]{0,20}") {
            let frame = std::format!("x{}##", body);
            prop_assert_eq!(parse(&frame), Err(ParseError::MissingPrefix));
        }
    }
}
