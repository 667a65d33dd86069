use std::{
    error::Error,
    fmt::Display,
    iter::{Enumerate, Peekable},
    mem::swap,
    str::{FromStr, Lines},
};

use lazy_static::lazy_static;
use regex::Regex;

use crate::format::{M3uEntry, M3uItem, M3uPlaylist, directives};

/// Grammar error. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line that should open a metadata block does not start with `#`
    MissingMetadata { line: usize },
    /// A metadata block without any `#EXTINF` line
    MissingExtInf { line: usize },
    InvalidRuntime { line: usize },
    MalformedAttribute { line: usize, near: String },
    MissingSeparator { line: usize },
    MissingLink { line: usize },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMetadata { line } => {
                write!(f, "Line {}: expected a metadata line starting with '#'", line)
            }
            Self::MissingExtInf { line } => write!(
                f,
                "Line {}: metadata block has no {} line",
                line,
                directives::EXTINF
            ),
            Self::InvalidRuntime { line } => write!(f, "Line {}: invalid runtime", line),
            Self::MalformedAttribute { line, near } => {
                write!(f, "Line {}: malformed attribute near `{}`", line, near)
            }
            Self::MissingSeparator { line } => {
                write!(f, "Line {}: missing ',' before the title", line)
            }
            Self::MissingLink { line } => write!(f, "Line {}: expected a link", line),
        }
    }
}

impl Error for ParseError {}

lazy_static! {
    static ref RUNTIME_REGEX: Regex =
        Regex::new(r"^-?\d+(?:\.\d+)?").expect("Regular expression error");
    static ref ATTRIBUTE_REGEX: Regex = Regex::new(
        r#"^[ \t]*([A-Za-z0-9_\-#$%><\[\]{}()]+)[ \t]*=[ \t]*(?:"([^"]*)"|'([^']*)')"#
    )
    .expect("Regular expression error");
}

const INLINE_WHITESPACE: [char; 2] = [' ', '\t'];

/// Parses one `#EXTINF:` line into an entry without a link
fn parse_ext_inf(line: usize, input: &str) -> Result<M3uEntry, ParseError> {
    let rest = &input[directives::EXTINF_PREFIX.len()..];

    // runtime
    let runtime = RUNTIME_REGEX
        .find(rest)
        .ok_or(ParseError::InvalidRuntime { line })?;
    let mut entry = M3uEntry {
        runtime: runtime
            .as_str()
            .parse()
            .map_err(|_| ParseError::InvalidRuntime { line })?,
        ..Default::default()
    };

    // attributes
    let mut rest = &rest[runtime.end()..];
    while let Some(captures) = ATTRIBUTE_REGEX.captures(rest) {
        let value = captures
            .get(2)
            .or_else(|| captures.get(3))
            .map(|x| x.as_str())
            .unwrap_or_default();
        entry.push_attribute(&captures[1], value);

        let end = captures.get(0).map_or(rest.len(), |x| x.end());
        rest = &rest[end..];
    }

    // title
    let rest = rest.trim_start_matches(INLINE_WHITESPACE);
    match rest.strip_prefix(',') {
        Some(title) => {
            entry.title = title.trim_start_matches(INLINE_WHITESPACE).into();
            Ok(entry)
        }
        None if rest.is_empty() => Err(ParseError::MissingSeparator { line }),
        None => Err(ParseError::MalformedAttribute {
            line,
            near: rest.chars().take(32).collect(),
        }),
    }
}

/// Parser of extended m3u text.
///
/// The input is a sequence of items, each a block of `#` lines followed by
/// one link line. The first `#EXTINF` line of a block that parses supplies the
/// metadata; every other `#` line in the block is a comment and is dropped.
pub struct Parser<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    playlist: M3uPlaylist,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let input = input
            .strip_prefix('\u{feff}')
            .unwrap_or(input)
            .trim_end_matches(['\r', '\n']);

        Self {
            lines: input.lines().enumerate().peekable(),
            playlist: M3uPlaylist::default(),
        }
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines
            .next()
            .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
    }

    fn peek_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines
            .peek()
            .map(|&(index, line)| (index + 1, line.trim_end_matches('\r')))
    }

    /// Parses the next item, `None` once the input is exhausted
    fn parse_item(&mut self) -> Result<Option<M3uItem>, ParseError> {
        let Some((block_start, first_line)) = self.peek_line() else {
            return Ok(None);
        };
        if !first_line.starts_with(directives::COMMENT) {
            return Err(ParseError::MissingMetadata { line: block_start });
        }

        // metadata block
        let mut metadata = None;
        let mut failure = None;
        let mut block_end = block_start;
        while let Some((number, line)) = self.peek_line() {
            if !line.starts_with(directives::COMMENT) {
                break;
            }
            self.next_line();
            block_end = number;

            if metadata.is_some() || !line.starts_with(directives::EXTINF_PREFIX) {
                continue;
            }
            match parse_ext_inf(number, line) {
                Ok(entry) => metadata = Some(entry),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }

        let Some((number, link)) = self.next_line() else {
            // end of input right after the block
            return match (metadata, failure) {
                (None, None) => Ok(None), // trailing comments
                (None, Some(e)) => Err(e),
                (Some(_), _) => Err(ParseError::MissingLink {
                    line: block_end + 1,
                }),
            };
        };

        let mut entry = match (metadata, failure) {
            (Some(entry), _) => entry,
            (None, Some(e)) => return Err(e),
            (None, None) => return Err(ParseError::MissingExtInf { line: block_start }),
        };

        if link.trim().is_empty() {
            return Err(ParseError::MissingLink { line: number });
        }
        entry.link = link.into();

        Ok(Some(entry.into()))
    }

    pub fn parse(&mut self) -> Result<(), ParseError> {
        while let Some(item) = self.parse_item()? {
            self.playlist.items.push(item);
        }

        Ok(())
    }

    pub fn get_result(&mut self) -> M3uPlaylist {
        let mut result = M3uPlaylist::default();
        swap(&mut self.playlist, &mut result);
        result
    }
}

impl FromStr for M3uPlaylist {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s);
        parser.parse()?;
        Ok(parser.get_result())
    }
}

#[cfg(test)]
mod tests {
    use smol_str::SmolStr;

    use super::*;

    fn parse(data: &str) -> Result<M3uPlaylist, ParseError> {
        data.parse()
    }

    fn parse_line(line: &str) -> Result<M3uEntry, ParseError> {
        parse_ext_inf(1, line)
    }

    #[test]
    fn test_parse_attribute_quotes() {
        for line in [
            "#EXTINF:-1 something='this is it!',T",
            "#EXTINF:-1 something=\"this is it!\",T",
        ] {
            let entry = parse_line(line).unwrap();
            assert_eq!(entry.attribute("something").unwrap(), "this is it!");
        }
    }

    #[test]
    fn test_parse_attribute_whitespace() {
        for line in [
            "#EXTINF:-1      something  = 'this is it!',T",
            "#EXTINF:-1      something  ='this is it!',T",
            "#EXTINF:-1 something=\t'this is it!' ,T",
        ] {
            let entry = parse_line(line).unwrap();
            assert_eq!(entry.attribute("something").unwrap(), "this is it!");
            assert_eq!(entry.title, "T");
        }
    }

    #[test]
    fn test_parse_many_attributes() {
        let entry = parse_line(
            "#EXTINF:-1   something  = 'this is it!' id='1' owner=  \"Mr Lebowski\" master=\"The dude\",T",
        )
        .unwrap();
        let attributes = entry
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            attributes,
            vec![
                ("something", "this is it!"),
                ("id", "1"),
                ("owner", "Mr Lebowski"),
                ("master", "The dude"),
            ]
        );
    }

    #[test]
    fn test_parse_identifier_characters() {
        let entry = parse_line("#EXTINF:0 a_b-c#$%<>[x]{y}(z)=\"v\",T").unwrap();
        assert_eq!(entry.attribute("a_b-c#$%<>[x]{y}(z)").unwrap(), "v");
    }

    #[test]
    fn test_parse_ext_inf_line() {
        let entry = parse_line(
            "#EXTINF:-1 tvg-id=\"\" tvg-name=\"Spycraft S01 E08\" tvg-logo=\"https://image.tmdb.org/t/p/w600_and_h900_bestv2/kjolcJPFXiLqtJXb4fVosop6sba.jpg\" group-title=\"Series: Netflix\",Spycraft S01 E08",
        )
        .unwrap();
        assert_eq!(entry.runtime, -1.0);
        assert_eq!(entry.title, "Spycraft S01 E08");
        assert_eq!(entry.attribute("tvg-id").unwrap(), "");
        assert_eq!(entry.attribute("group-title").unwrap(), "Series: Netflix");
        assert_eq!(entry.attributes.len(), 4);
    }

    #[test]
    fn test_parse_runtime() {
        assert_eq!(parse_line("#EXTINF:-1,T").unwrap().runtime, -1.0);
        assert_eq!(parse_line("#EXTINF:320,T").unwrap().runtime, 320.0);
        assert_eq!(parse_line("#EXTINF:6.5,").unwrap().runtime, 6.5);
        assert_eq!(
            parse_line("#EXTINF:abc,T"),
            Err(ParseError::InvalidRuntime { line: 1 })
        );
    }

    #[test]
    fn test_parse_title_keeps_commas() {
        let entry = parse_line("#EXTINF:-1 a=\"1\",  Hello, World ").unwrap();
        assert_eq!(entry.title, "Hello, World ");
    }

    #[test]
    fn test_parse_ext_inf_errors() {
        assert_eq!(
            parse_line("#EXTINF:-1 a=\"1\""),
            Err(ParseError::MissingSeparator { line: 1 })
        );
        assert_eq!(
            parse_line("#EXTINF:-1 a=1,T"),
            Err(ParseError::MalformedAttribute {
                line: 1,
                near: "a=1,T".into()
            })
        );
        assert!(matches!(
            parse_line("#EXTINF:-1 a=\"1,T"),
            Err(ParseError::MalformedAttribute { .. })
        ));
    }

    #[test]
    fn test_parse_single_item() {
        let playlist =
            parse("#EXTINF:-1 tvg-id=\"\" tvg-name=\"X\" group-title=\"G\",X\nhttp://h/1").unwrap();
        assert_eq!(playlist.len(), 1);

        let item = &playlist.items[0];
        assert_eq!(item.runtime(), -1.0);
        assert_eq!(item.title(), "X");
        assert_eq!(item.link(), "http://h/1");
        let expected: Vec<(SmolStr, Option<SmolStr>)> = vec![
            ("tvg-id".into(), Some("".into())),
            ("tvg-name".into(), Some("X".into())),
            ("group-title".into(), Some("G".into())),
        ];
        assert_eq!(item.attributes(), expected);
    }

    #[test]
    fn test_parse_metadata_block_with_comments() {
        let data = r#"#EXTM3U
#EXTINF:-1 tvg-id="" tvg-name="Spycraft S01 E08" group-title="Series: Netflix",Spycraft S01 E08
#NOTE: i just wrote this here as my own comment... so what?
#EXTINF:5 tvg-id="ignored",Ignored
http://nothing.com/here/72628.mkv"#;
        let playlist = parse(data).unwrap();
        assert_eq!(playlist.len(), 1);

        let item = &playlist.items[0];
        assert_eq!(item.title(), "Spycraft S01 E08");
        assert_eq!(item.attribute("tvg-id").unwrap(), "");
        assert_eq!(item.runtime(), -1.0);
        assert_eq!(item.link(), "http://nothing.com/here/72628.mkv");
    }

    #[test]
    fn test_parse_first_valid_ext_inf_wins() {
        let data = "#EXTINF:-1 broken,Broken\n#EXTINF:10 a=\"b\",Fine\nhttp://h/1";
        let playlist = parse(data).unwrap();
        assert_eq!(playlist.items[0].title(), "Fine");
        assert_eq!(playlist.items[0].runtime(), 10.0);
    }

    #[test]
    fn test_parse_list() {
        let data = r#"#EXTM3U
#EXTINF:-1 tvg-id="" tvg-name="▬ beIN Media Group ▬" tvg-logo="https://picon-13398.kxcdn.com/beinmediagroupflag.jpg" group-title="Live: beIN Media Group",▬ beIN Media Group ▬
http://nothing.com/here/16504
#EXTINF:-1 tvg-id="AMC.qa" tvg-name="beIN SPORTS 1 4K QA" tvg-logo="https://picon-13398.kxcdn.com/beinsports1.jpg" group-title="Live: beIN Media Group",beIN SPORTS 1 4K QA
http://nothing.com/here/24697
#EXTINF:-1 tvg-id="BeinSports3.fr" tvg-name="beIN SPORTS 1 FHD QA" tvg-logo="https://picon-13398.kxcdn.com/beinsport1hd.jpg" group-title="Live: beIN Media Group",beIN SPORTS 1 FHD QA
http://nothing.com/here/22157
"#;
        let playlist = parse(data).unwrap();
        assert_eq!(playlist.len(), 3);
        assert_eq!(playlist.items[0].title(), "▬ beIN Media Group ▬");
        assert_eq!(playlist.items[1].attribute("tvg-id").unwrap(), "AMC.qa");
        assert_eq!(
            playlist.items[2].attribute("tvg-name").unwrap(),
            "beIN SPORTS 1 FHD QA"
        );
        assert_eq!(playlist.items[2].link(), "http://nothing.com/here/22157");
    }

    #[test]
    fn test_parse_crlf() {
        let playlist = parse("#EXTM3U\r\n#EXTINF:-1 a=\"1\",A\r\nhttp://h/a\r\n").unwrap();
        assert_eq!(playlist.items[0].title(), "A");
        assert_eq!(playlist.items[0].link(), "http://h/a");
    }

    #[test]
    fn test_parse_empty_and_header_only() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("#EXTM3U\n").unwrap().is_empty());
        assert!(parse("\u{feff}#EXTM3U").unwrap().is_empty());
    }

    #[test]
    fn test_parse_missing_ext_inf() {
        assert_eq!(
            parse("#EXTM3U\n#COMMENT\nhttp://h/1"),
            Err(ParseError::MissingExtInf { line: 1 })
        );
    }

    #[test]
    fn test_parse_missing_link() {
        assert_eq!(
            parse("#EXTINF:-1,A\nhttp://h/a\n#EXTINF:-1,B"),
            Err(ParseError::MissingLink { line: 4 })
        );
    }

    #[test]
    fn test_parse_blank_line_is_an_error() {
        assert_eq!(
            parse("#EXTINF:-1,A\nhttp://h/a\n\n#EXTINF:-1,B\nhttp://h/b"),
            Err(ParseError::MissingMetadata { line: 3 })
        );
        assert_eq!(
            parse("#EXTINF:-1,A\n\nhttp://h/a"),
            Err(ParseError::MissingLink { line: 2 })
        );
    }

    #[test]
    fn test_parse_two_links_in_a_row() {
        assert_eq!(
            parse("#EXTINF:-1,A\nhttp://h/a\nhttp://h/b"),
            Err(ParseError::MissingMetadata { line: 3 })
        );
    }

    #[test]
    fn test_parse_reports_malformed_ext_inf() {
        assert_eq!(
            parse("#EXTM3U\n#EXTINF:-1 tvg-id=\"1\"\nhttp://h/1"),
            Err(ParseError::MissingSeparator { line: 2 })
        );
    }

    #[test]
    fn test_parse_error_message() {
        let e = parse("#EXTINF:-1 a=1,T\nhttp://h/1").unwrap_err();
        assert_eq!(e.to_string(), "Line 1: malformed attribute near `a=1,T`");
    }
}
