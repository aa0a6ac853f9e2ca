// tokenizer.rs - Source text -> linear token stream.
//
// Tokens come out in source order. Escape classification, group-kind
// detection, quantifier scanning, and class boundaries all happen here;
// the parser never re-reads the source. Numeric escapes resolve to
// backreferences only when that many capturing groups already lie to
// the left, so the tokenizer counts capturing `GroupOpen`s as it goes.

use smallvec::{smallvec, SmallVec};

use crate::ast::{
    AssertionKind, CharacterSetKind, FlagGroupModifiers, FlagsNode, GroupRef, QuantifierKind,
    TextSegmentMode, REPEAT_INFINITE,
};
use crate::error::{RegexError, Result};
use crate::unicode::{is_posix_class_name, normalize_property_name, slug, PropertyMap};

const MAX_REPEAT_COUNT: u32 = 100_000;

// === Token Model ===

/// Byte range of a token's raw lexeme in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn raw<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Alternator,
    Assertion {
        kind: AssertionKind,
        negate: bool,
    },
    Backreference {
        target: GroupRef,
    },
    Character {
        value: u32,
    },
    CharacterClassClose,
    CharacterClassHyphen,
    CharacterClassIntersector,
    CharacterClassOpen {
        negate: bool,
    },
    CharacterSet {
        kind: CharacterSetKind,
        negate: bool,
        value: Option<String>,
    },
    Directive {
        kind: DirectiveToken,
    },
    GroupClose,
    GroupOpen {
        kind: GroupOpenKind,
    },
    Quantifier {
        min: u32,
        max: u32,
        kind: QuantifierKind,
    },
    Subroutine {
        target: GroupRef,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveToken {
    Keep,
    Flags(FlagGroupModifiers),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupOpenKind {
    /// Bare `(`; whether it captures depends on whole-pattern context,
    /// which is the parser's call.
    Bare,
    /// `(?<name>` / `(?'name'`.
    Named { name: String },
    /// `(?:` or `(?imx-imx:`.
    NonCapturing { flags: Option<FlagGroupModifiers> },
    /// `(?>`.
    Atomic,
    /// `(?=` / `(?!`.
    Lookahead { negate: bool },
    /// `(?<=` / `(?<!`.
    Lookbehind { negate: bool },
    /// `(?~`, repeater form.
    Absent,
}

/// Tokenizer output: the stream plus the whole-pattern flag record.
#[derive(Clone, Debug)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub flags: FlagsNode,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokenizerOptions<'a> {
    /// Flag string: `i m x D P S W` and `y{g}` / `y{w}`.
    pub flags: &'a str,
    /// ONIG_OPTION_SINGLELINE: `^` -> `\A`, `$` -> `\Z`.
    pub singleline: bool,
    pub skip_property_name_validation: bool,
    pub normalize_unknown_property_names: bool,
    pub property_map: Option<&'a PropertyMap>,
}

/// Parse a whole-pattern flag string into a flag record.
pub fn parse_flag_string(flags: &str) -> Result<FlagsNode> {
    let mut out = FlagsNode::default();
    let mut chars = flags.chars().peekable();
    while let Some(c) = chars.next() {
        let dup = match c {
            'i' => std::mem::replace(&mut out.ignore_case, true),
            'm' => std::mem::replace(&mut out.dot_all, true),
            'x' => std::mem::replace(&mut out.extended, true),
            'D' => std::mem::replace(&mut out.digit_is_ascii, true),
            'P' => std::mem::replace(&mut out.posix_is_ascii, true),
            'S' => std::mem::replace(&mut out.space_is_ascii, true),
            'W' => std::mem::replace(&mut out.word_is_ascii, true),
            'y' => {
                let mode = match (chars.next(), chars.next(), chars.next()) {
                    (Some('{'), Some('g'), Some('}')) => TextSegmentMode::Grapheme,
                    (Some('{'), Some('w'), Some('}')) => TextSegmentMode::Word,
                    _ => {
                        return Err(RegexError::Syntax(
                            "flag 'y' takes the form y{g} or y{w}".to_string(),
                        ))
                    }
                };
                out.text_segment_mode.replace(mode).is_some()
            }
            _ => return Err(RegexError::Syntax(format!("unknown flag '{}'", c))),
        };
        if dup {
            return Err(RegexError::Syntax(format!("duplicate flag '{}'", c)));
        }
    }
    Ok(out)
}

/// Tokenize `source` under `options`, producing the stream and the
/// final flag record.
pub fn tokenize(source: &str, options: TokenizerOptions<'_>) -> Result<TokenStream> {
    let flags = parse_flag_string(options.flags)?;
    let mut tk = Tokenizer {
        chars: source.char_indices().collect(),
        src_len: source.len(),
        pos: 0,
        tokens: Vec::new(),
        captures_seen: 0,
        class_depth: 0,
        class_just_opened: false,
        x_stack: smallvec![flags.extended],
        options,
    };
    tk.run()?;
    Ok(TokenStream {
        tokens: tk.tokens,
        flags,
    })
}

struct Tokenizer<'a> {
    chars: Vec<(usize, char)>,
    src_len: usize,
    pos: usize,
    tokens: Vec<Token>,
    captures_seen: u32,
    class_depth: usize,
    class_just_opened: bool,
    /// Extended-mode state, scoped per open group.
    x_stack: SmallVec<[bool; 8]>,
    options: TokenizerOptions<'a>,
}

impl<'a> Tokenizer<'a> {
    // Cursor helpers.

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek_at(&self, k: usize) -> Option<char> {
        self.chars.get(self.pos + k).map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn byte_offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(off, _)| off)
            .unwrap_or(self.src_len)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let was_class_open = matches!(kind, TokenKind::CharacterClassOpen { .. });
        self.tokens.push(Token {
            kind,
            span: Span {
                start,
                end: self.byte_offset(),
            },
        });
        self.class_just_opened = was_class_open;
    }

    fn extended(&self) -> bool {
        *self.x_stack.last().unwrap()
    }

    // === Main Loop ===

    fn run(&mut self) -> Result<()> {
        while let Some(c) = self.peek() {
            let start = self.byte_offset();
            if self.class_depth > 0 {
                self.scan_in_class(c, start)?;
            } else {
                self.scan_outside_class(c, start)?;
            }
        }
        if self.class_depth > 0 {
            return Err(RegexError::Syntax("unclosed character class".to_string()));
        }
        if self.x_stack.len() > 1 {
            return Err(RegexError::Syntax("unclosed group".to_string()));
        }
        Ok(())
    }

    fn scan_outside_class(&mut self, c: char, start: usize) -> Result<()> {
        if self.extended() {
            if matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r') {
                self.pos += 1;
                return Ok(());
            }
            if c == '#' {
                while let Some(ch) = self.bump() {
                    if ch == '\n' {
                        break;
                    }
                }
                return Ok(());
            }
        }

        match c {
            '\\' => self.scan_escape(start),
            '(' => self.scan_group_open(start),
            ')' => {
                self.pos += 1;
                if self.x_stack.len() == 1 {
                    return Err(RegexError::Syntax("unmatched close parenthesis".to_string()));
                }
                self.x_stack.pop();
                self.push(TokenKind::GroupClose, start);
                Ok(())
            }
            '|' => {
                self.pos += 1;
                self.push(TokenKind::Alternator, start);
                Ok(())
            }
            '^' => {
                self.pos += 1;
                let kind = if self.options.singleline {
                    AssertionKind::StringStart
                } else {
                    AssertionKind::LineStart
                };
                self.push(TokenKind::Assertion { kind, negate: false }, start);
                Ok(())
            }
            '$' => {
                self.pos += 1;
                let kind = if self.options.singleline {
                    AssertionKind::StringEndNewline
                } else {
                    AssertionKind::LineEnd
                };
                self.push(TokenKind::Assertion { kind, negate: false }, start);
                Ok(())
            }
            '.' => {
                self.pos += 1;
                self.push(
                    TokenKind::CharacterSet {
                        kind: CharacterSetKind::Dot,
                        negate: false,
                        value: None,
                    },
                    start,
                );
                Ok(())
            }
            '[' => {
                self.pos += 1;
                let negate = self.eat('^');
                self.class_depth += 1;
                self.push(TokenKind::CharacterClassOpen { negate }, start);
                Ok(())
            }
            '?' | '*' | '+' => {
                self.pos += 1;
                let (min, max) = match c {
                    '?' => (0, 1),
                    '*' => (0, REPEAT_INFINITE),
                    _ => (1, REPEAT_INFINITE),
                };
                let kind = if self.eat('?') {
                    QuantifierKind::Lazy
                } else if self.eat('+') {
                    QuantifierKind::Possessive
                } else {
                    QuantifierKind::Greedy
                };
                self.push(TokenKind::Quantifier { min, max, kind }, start);
                Ok(())
            }
            '{' => {
                if let Some((min, max, kind)) = self.try_scan_interval()? {
                    self.push(TokenKind::Quantifier { min, max, kind }, start);
                } else {
                    self.pos += 1;
                    self.push(TokenKind::Character { value: '{' as u32 }, start);
                }
                Ok(())
            }
            _ => {
                self.pos += 1;
                self.push(TokenKind::Character { value: c as u32 }, start);
                Ok(())
            }
        }
    }

    fn scan_in_class(&mut self, c: char, start: usize) -> Result<()> {
        match c {
            '\\' => self.scan_escape(start),
            ']' => {
                self.pos += 1;
                if self.class_just_opened {
                    // `[]...` and `[^]...`: a leading `]` is a literal.
                    self.push(TokenKind::Character { value: ']' as u32 }, start);
                } else {
                    self.class_depth -= 1;
                    self.push(TokenKind::CharacterClassClose, start);
                }
                Ok(())
            }
            '[' => {
                if let Some(tok) = self.try_scan_posix_bracket()? {
                    self.push(tok, start);
                } else {
                    self.pos += 1;
                    let negate = self.eat('^');
                    self.class_depth += 1;
                    self.push(TokenKind::CharacterClassOpen { negate }, start);
                }
                Ok(())
            }
            '&' if self.peek_at(1) == Some('&') => {
                self.pos += 2;
                self.push(TokenKind::CharacterClassIntersector, start);
                Ok(())
            }
            '-' => {
                self.pos += 1;
                self.push(TokenKind::CharacterClassHyphen, start);
                Ok(())
            }
            _ => {
                self.pos += 1;
                self.push(TokenKind::Character { value: c as u32 }, start);
                Ok(())
            }
        }
    }

    // === Groups ===

    fn scan_group_open(&mut self, start: usize) -> Result<()> {
        self.pos += 1; // '('
        if !self.eat('?') {
            self.captures_seen += 1;
            self.x_stack.push(self.extended());
            self.push(
                TokenKind::GroupOpen {
                    kind: GroupOpenKind::Bare,
                },
                start,
            );
            return Ok(());
        }

        let c = match self.peek() {
            Some(c) => c,
            None => return Err(RegexError::Syntax("unterminated group".to_string())),
        };
        match c {
            ':' => {
                self.pos += 1;
                self.x_stack.push(self.extended());
                self.push(
                    TokenKind::GroupOpen {
                        kind: GroupOpenKind::NonCapturing { flags: None },
                    },
                    start,
                );
                Ok(())
            }
            '>' => {
                self.pos += 1;
                self.x_stack.push(self.extended());
                self.push(
                    TokenKind::GroupOpen {
                        kind: GroupOpenKind::Atomic,
                    },
                    start,
                );
                Ok(())
            }
            '=' | '!' => {
                self.pos += 1;
                self.x_stack.push(self.extended());
                self.push(
                    TokenKind::GroupOpen {
                        kind: GroupOpenKind::Lookahead { negate: c == '!' },
                    },
                    start,
                );
                Ok(())
            }
            '<' => {
                self.pos += 1;
                match self.peek() {
                    Some('=') | Some('!') => {
                        let negate = self.bump() == Some('!');
                        self.x_stack.push(self.extended());
                        self.push(
                            TokenKind::GroupOpen {
                                kind: GroupOpenKind::Lookbehind { negate },
                            },
                            start,
                        );
                        Ok(())
                    }
                    _ => {
                        let name = self.scan_group_name('>')?;
                        self.captures_seen += 1;
                        self.x_stack.push(self.extended());
                        self.push(
                            TokenKind::GroupOpen {
                                kind: GroupOpenKind::Named { name },
                            },
                            start,
                        );
                        Ok(())
                    }
                }
            }
            '\'' => {
                self.pos += 1;
                let name = self.scan_group_name('\'')?;
                self.captures_seen += 1;
                self.x_stack.push(self.extended());
                self.push(
                    TokenKind::GroupOpen {
                        kind: GroupOpenKind::Named { name },
                    },
                    start,
                );
                Ok(())
            }
            '~' => {
                self.pos += 1;
                if self.peek() == Some('|') {
                    return Err(RegexError::Feature(
                        "only the repeater form of absent functions is supported".to_string(),
                    ));
                }
                self.x_stack.push(self.extended());
                self.push(
                    TokenKind::GroupOpen {
                        kind: GroupOpenKind::Absent,
                    },
                    start,
                );
                Ok(())
            }
            '#' => {
                // (?#...) comment; no token.
                self.pos += 1;
                loop {
                    match self.bump() {
                        Some(')') => break,
                        Some('\\') => {
                            self.bump();
                        }
                        Some(_) => {}
                        None => {
                            return Err(RegexError::Syntax("unterminated comment".to_string()))
                        }
                    }
                }
                Ok(())
            }
            '(' => Err(RegexError::Feature(
                "conditional groups are not supported".to_string(),
            )),
            _ => self.scan_flag_group(start),
        }
    }

    /// `(?imxWDSP-imx:` or the directive form `(?imx-imx)`.
    fn scan_flag_group(&mut self, start: usize) -> Result<()> {
        let mut mods = FlagGroupModifiers::default();
        let mut in_disable = false;
        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => return Err(RegexError::Syntax("unterminated group options".to_string())),
            };
            match c {
                ':' => {
                    if mods.is_empty() && !in_disable {
                        return Err(RegexError::Syntax("empty group options".to_string()));
                    }
                    let mut x = self.extended();
                    if mods.enable.extended {
                        x = true;
                    }
                    if mods.disable.extended {
                        x = false;
                    }
                    self.x_stack.push(x);
                    self.push(
                        TokenKind::GroupOpen {
                            kind: GroupOpenKind::NonCapturing { flags: Some(mods) },
                        },
                        start,
                    );
                    return Ok(());
                }
                ')' => {
                    if mods.is_empty() {
                        return Err(RegexError::Syntax("empty flags directive".to_string()));
                    }
                    // A flags directive changes the mode for the rest of
                    // the current group.
                    let top = self.x_stack.last_mut().unwrap();
                    if mods.enable.extended {
                        *top = true;
                    }
                    if mods.disable.extended {
                        *top = false;
                    }
                    self.push(
                        TokenKind::Directive {
                            kind: DirectiveToken::Flags(mods),
                        },
                        start,
                    );
                    return Ok(());
                }
                '-' => {
                    if in_disable {
                        return Err(RegexError::Syntax("invalid group options".to_string()));
                    }
                    in_disable = true;
                }
                'i' | 'm' | 'x' => {
                    let set = if in_disable {
                        &mut mods.disable
                    } else {
                        &mut mods.enable
                    };
                    match c {
                        'i' => set.ignore_case = true,
                        'm' => set.dot_all = true,
                        _ => set.extended = true,
                    }
                }
                'W' | 'D' | 'S' | 'P' if !in_disable => match c {
                    'W' => mods.enable.word_is_ascii = true,
                    'D' => mods.enable.digit_is_ascii = true,
                    'S' => mods.enable.space_is_ascii = true,
                    _ => mods.enable.posix_is_ascii = true,
                },
                _ => {
                    return Err(RegexError::Syntax(format!(
                        "invalid group option '{}'",
                        c
                    )))
                }
            }
        }
    }

    fn scan_group_name(&mut self, close: char) -> Result<String> {
        let mut name = String::new();
        loop {
            match self.bump() {
                Some(c) if c == close => break,
                Some(c) => name.push(c),
                None => return Err(RegexError::Syntax("unterminated group name".to_string())),
            }
        }
        if name.is_empty() {
            return Err(RegexError::Syntax("group name is empty".to_string()));
        }
        Ok(name)
    }

    // === Quantifier Intervals ===

    /// `{n}`, `{n,}`, `{n,m}`, `{,m}`, each with an optional lazy `?`.
    /// Returns `None` (cursor unmoved) when the braces don't form an
    /// interval, in which case `{` is a literal. Reversed bounds are
    /// passed through; the parser applies the possessive
    /// reinterpretation.
    fn try_scan_interval(&mut self) -> Result<Option<(u32, u32, QuantifierKind)>> {
        let mark = self.pos;
        self.pos += 1; // '{'

        let min_digits = self.scan_digit_run();
        let comma = self.eat(',');
        let max_digits = if comma { self.scan_digit_run() } else { String::new() };

        if !self.eat('}') || (min_digits.is_empty() && max_digits.is_empty()) {
            self.pos = mark;
            return Ok(None);
        }

        let parse_bound = |digits: &str| -> Result<u32> {
            let v: u32 = digits
                .parse()
                .map_err(|_| RegexError::Syntax("repeat count too large".to_string()))?;
            if v > MAX_REPEAT_COUNT {
                return Err(RegexError::Syntax("repeat count too large".to_string()));
            }
            Ok(v)
        };

        let min = if min_digits.is_empty() {
            0
        } else {
            parse_bound(&min_digits)?
        };
        let max = if !comma {
            min
        } else if max_digits.is_empty() {
            REPEAT_INFINITE
        } else {
            parse_bound(&max_digits)?
        };

        let kind = if self.eat('?') {
            QuantifierKind::Lazy
        } else {
            // `{n,m}+` is an interval followed by a `+` quantifier, not
            // a possessive interval.
            QuantifierKind::Greedy
        };
        Ok(Some((min, max, kind)))
    }

    fn scan_digit_run(&mut self) -> String {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        digits
    }

    // === POSIX Brackets ===

    /// `[:name:]` / `[:^name:]` at the current `[`, valid only inside a
    /// class. Returns `None` when the shape doesn't match (then `[`
    /// opens a nested class).
    fn try_scan_posix_bracket(&mut self) -> Result<Option<TokenKind>> {
        if self.peek_at(1) != Some(':') {
            return Ok(None);
        }
        let mut k = 2;
        let negate = if self.peek_at(k) == Some('^') {
            k += 1;
            true
        } else {
            false
        };
        let mut name = String::new();
        while let Some(c) = self.peek_at(k) {
            if c.is_ascii_lowercase() {
                name.push(c);
                k += 1;
            } else {
                break;
            }
        }
        if name.is_empty() || self.peek_at(k) != Some(':') || self.peek_at(k + 1) != Some(']') {
            return Ok(None);
        }
        if !is_posix_class_name(&name) {
            return Err(RegexError::Syntax(format!(
                "invalid POSIX class '{}'",
                name
            )));
        }
        self.pos += k + 2;
        Ok(Some(TokenKind::CharacterSet {
            kind: CharacterSetKind::Posix,
            negate,
            value: Some(name),
        }))
    }

    // === Escapes ===

    fn scan_escape(&mut self, start: usize) -> Result<()> {
        self.pos += 1; // '\'
        let c = match self.bump() {
            Some(c) => c,
            None => return Err(RegexError::Syntax("pattern ends with a backslash".to_string())),
        };
        let in_class = self.class_depth > 0;

        match c {
            'd' | 'D' | 's' | 'S' | 'w' | 'W' | 'h' | 'H' => {
                let kind = match c.to_ascii_lowercase() {
                    'd' => CharacterSetKind::Digit,
                    's' => CharacterSetKind::Space,
                    'w' => CharacterSetKind::Word,
                    _ => CharacterSetKind::Hex,
                };
                self.push(
                    TokenKind::CharacterSet {
                        kind,
                        negate: c.is_ascii_uppercase(),
                        value: None,
                    },
                    start,
                );
                Ok(())
            }
            'p' | 'P' => {
                let tok = self.scan_property(c == 'P')?;
                self.push(tok, start);
                Ok(())
            }
            'R' | 'N' | 'O' | 'X' if !in_class => {
                let (kind, negate) = match c {
                    'R' => (CharacterSetKind::Newline, false),
                    'N' => (CharacterSetKind::Newline, true),
                    'O' => (CharacterSetKind::Any, false),
                    _ => (CharacterSetKind::Grapheme, false),
                };
                self.push(
                    TokenKind::CharacterSet {
                        kind,
                        negate,
                        value: None,
                    },
                    start,
                );
                Ok(())
            }
            'A' | 'z' | 'Z' | 'G' | 'B' | 'y' | 'Y' if !in_class => {
                let (kind, negate) = match c {
                    'A' => (AssertionKind::StringStart, false),
                    'z' => (AssertionKind::StringEnd, false),
                    'Z' => (AssertionKind::StringEndNewline, false),
                    'G' => (AssertionKind::SearchStart, false),
                    'B' => (AssertionKind::WordBoundary, true),
                    'y' => (AssertionKind::GraphemeBoundary, false),
                    _ => (AssertionKind::GraphemeBoundary, true),
                };
                self.push(TokenKind::Assertion { kind, negate }, start);
                Ok(())
            }
            'b' => {
                if in_class {
                    // `[\b]` is a backspace.
                    self.push(TokenKind::Character { value: 0x08 }, start);
                } else {
                    self.push(
                        TokenKind::Assertion {
                            kind: AssertionKind::WordBoundary,
                            negate: false,
                        },
                        start,
                    );
                }
                Ok(())
            }
            'K' if !in_class => {
                self.push(
                    TokenKind::Directive {
                        kind: DirectiveToken::Keep,
                    },
                    start,
                );
                Ok(())
            }
            'k' if !in_class => {
                let target = self.scan_enclosed_ref('k')?;
                self.push(TokenKind::Backreference { target }, start);
                Ok(())
            }
            'g' if !in_class => {
                let target = self.scan_enclosed_ref('g')?;
                self.push(TokenKind::Subroutine { target }, start);
                Ok(())
            }
            '1'..='9' if !in_class => self.scan_numeric_escape(c, start),
            '0'..='7' => {
                // Octal, up to three digits including the first.
                let mut value = c.to_digit(8).unwrap();
                for _ in 0..2 {
                    match self.peek() {
                        Some(d) if ('0'..='7').contains(&d) => {
                            value = value * 8 + d.to_digit(8).unwrap();
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                self.push(TokenKind::Character { value }, start);
                Ok(())
            }
            't' | 'n' | 'v' | 'f' | 'r' | 'a' | 'e' => {
                let value = match c {
                    't' => 0x09,
                    'n' => 0x0A,
                    'v' => 0x0B,
                    'f' => 0x0C,
                    'r' => 0x0D,
                    'a' => 0x07,
                    _ => 0x1B,
                };
                self.push(TokenKind::Character { value }, start);
                Ok(())
            }
            'x' => {
                let value = self.scan_hex_escape()?;
                self.push(TokenKind::Character { value }, start);
                Ok(())
            }
            'u' => {
                let value = self.scan_fixed_hex(4)?;
                self.push(TokenKind::Character { value }, start);
                Ok(())
            }
            'o' => {
                if !self.eat('{') {
                    return Err(RegexError::Syntax("\\o requires braces".to_string()));
                }
                let mut value: u32 = 0;
                let mut any = false;
                loop {
                    match self.bump() {
                        Some('}') => break,
                        Some(d) if ('0'..='7').contains(&d) => {
                            any = true;
                            value = value
                                .checked_mul(8)
                                .and_then(|v| v.checked_add(d.to_digit(8).unwrap()))
                                .ok_or_else(|| {
                                    RegexError::Syntax("octal escape too large".to_string())
                                })?;
                        }
                        _ => {
                            return Err(RegexError::Syntax("invalid octal escape".to_string()))
                        }
                    }
                }
                if !any {
                    return Err(RegexError::Syntax("empty octal escape".to_string()));
                }
                self.push(TokenKind::Character { value }, start);
                Ok(())
            }
            'c' => {
                let value = self.scan_control_char()?;
                self.push(TokenKind::Character { value }, start);
                Ok(())
            }
            'C' => {
                if !self.eat('-') {
                    return Err(RegexError::Syntax("\\C requires the form \\C-X".to_string()));
                }
                let value = self.scan_control_char()?;
                self.push(TokenKind::Character { value }, start);
                Ok(())
            }
            'M' => Err(RegexError::Feature("meta escapes (\\M-) are not supported".to_string())),
            'Q' | 'E' => Err(RegexError::Feature(
                "\\Q...\\E quoting is not supported".to_string(),
            )),
            _ if c.is_alphanumeric() => Err(RegexError::Syntax(format!(
                "invalid escape \\{}{}",
                c,
                if in_class { " in character class" } else { "" }
            ))),
            _ => {
                // Identity escape for punctuation.
                self.push(TokenKind::Character { value: c as u32 }, start);
                Ok(())
            }
        }
    }

    /// `\1`..`\999` outside a class: a backreference when that many
    /// groups exist to the left, else octal if the digits allow it.
    /// An unresolvable non-octal run still becomes a backreference
    /// token; whether that is an error or an orphan is the parser's
    /// decision.
    fn scan_numeric_escape(&mut self, first: char, start: usize) -> Result<()> {
        let mut digits = String::from(first);
        while digits.len() < 3 {
            match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    digits.push(d);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let num: u32 = digits.parse().unwrap();
        if num > self.captures_seen
            && digits.len() > 1
            && digits.bytes().all(|b| (b'0'..=b'7').contains(&b))
        {
            let value = u32::from_str_radix(&digits, 8).unwrap();
            self.push(TokenKind::Character { value }, start);
            return Ok(());
        }
        self.push(
            TokenKind::Backreference {
                target: GroupRef::Number(num),
            },
            start,
        );
        Ok(())
    }

    /// `\k<...>` / `\k'...'` / `\g<...>` / `\g'...'`. Relative numeric
    /// forms resolve here against the running capture count.
    fn scan_enclosed_ref(&mut self, esc: char) -> Result<GroupRef> {
        let close = match self.bump() {
            Some('<') => '>',
            Some('\'') => '\'',
            _ => {
                return Err(RegexError::Syntax(format!(
                    "\\{} requires <...> or '...'",
                    esc
                )))
            }
        };
        let mut body = String::new();
        loop {
            match self.bump() {
                Some(c) if c == close => break,
                Some(c) => body.push(c),
                None => {
                    return Err(RegexError::Syntax(format!(
                        "unterminated \\{} reference",
                        esc
                    )))
                }
            }
        }
        if body.is_empty() {
            return Err(RegexError::Syntax(format!("empty \\{} reference", esc)));
        }

        let is_backref = esc == 'k';
        let numeric = body
            .strip_prefix(['+', '-'])
            .unwrap_or(&body)
            .bytes()
            .all(|b| b.is_ascii_digit())
            && body.len() > body.starts_with(['+', '-']) as usize;

        if numeric {
            let relative = body.starts_with(['+', '-']);
            let resolved = if let Some(rest) = body.strip_prefix('-') {
                let n: u32 = rest
                    .parse()
                    .map_err(|_| RegexError::Syntax("reference number too large".to_string()))?;
                (self.captures_seen + 1).checked_sub(n)
            } else if let Some(rest) = body.strip_prefix('+') {
                if is_backref {
                    return Err(RegexError::Syntax(
                        "forward-relative backreferences are not allowed".to_string(),
                    ));
                }
                let n: u32 = rest
                    .parse()
                    .map_err(|_| RegexError::Syntax("reference number too large".to_string()))?;
                self.captures_seen.checked_add(n)
            } else {
                let n: u32 = body
                    .parse()
                    .map_err(|_| RegexError::Syntax("reference number too large".to_string()))?;
                if is_backref && n == 0 {
                    return Err(RegexError::Syntax(
                        "backreference to group 0 is not allowed".to_string(),
                    ));
                }
                Some(n)
            };
            // Only a literal `0` may mean whole-pattern recursion; a
            // relative form resolving to 0 points before group 1.
            return match resolved {
                Some(n) if n > 0 || (!is_backref && !relative) => Ok(GroupRef::Number(n)),
                _ => Err(RegexError::Syntax(format!(
                    "relative reference \\{}<{}> resolves before group 1",
                    esc, body
                ))),
            };
        }

        // Level-bearing forms like \k<name+1> are Onigmo-only.
        if body.contains(['+', '-']) {
            return Err(RegexError::Feature(format!(
                "reference '{}' uses an unsupported level form",
                body
            )));
        }
        Ok(GroupRef::Name(body))
    }

    fn scan_property(&mut self, mut negate: bool) -> Result<TokenKind> {
        if !self.eat('{') {
            return Err(RegexError::Syntax(
                "\\p must be followed by {...}".to_string(),
            ));
        }
        if self.eat('^') {
            negate = !negate;
        }
        let mut name = String::new();
        loop {
            match self.bump() {
                Some('}') => break,
                Some(c) => name.push(c),
                None => {
                    return Err(RegexError::Syntax("unterminated property name".to_string()))
                }
            }
        }
        if name.is_empty() {
            return Err(RegexError::Syntax("empty property name".to_string()));
        }

        // POSIX names spelled through \p{...} keep POSIX semantics.
        if is_posix_class_name(&name) {
            return Ok(TokenKind::CharacterSet {
                kind: CharacterSetKind::Posix,
                negate,
                value: Some(name),
            });
        }

        let value = match self.options.property_map {
            None => name,
            Some(map) => match map.get(&slug(&name)) {
                Some(canonical) => canonical.to_string(),
                None if self.options.normalize_unknown_property_names => {
                    normalize_property_name(&name)
                }
                None if self.options.skip_property_name_validation => name,
                None => {
                    return Err(RegexError::Syntax(format!(
                        "invalid Unicode property '{}'",
                        name
                    )))
                }
            },
        };
        Ok(TokenKind::CharacterSet {
            kind: CharacterSetKind::Property,
            negate,
            value: Some(value),
        })
    }

    /// `\xH`, `\xHH`, or `\x{H...}`.
    fn scan_hex_escape(&mut self) -> Result<u32> {
        if self.eat('{') {
            let mut value: u32 = 0;
            let mut any = false;
            loop {
                match self.bump() {
                    Some('}') => break,
                    Some(d) if d.is_ascii_hexdigit() => {
                        any = true;
                        value = value
                            .checked_mul(16)
                            .and_then(|v| v.checked_add(d.to_digit(16).unwrap()))
                            .ok_or_else(|| {
                                RegexError::Syntax("code point escape too large".to_string())
                            })?;
                    }
                    _ => return Err(RegexError::Syntax("invalid hex escape".to_string())),
                }
            }
            if !any {
                return Err(RegexError::Syntax("empty hex escape".to_string()));
            }
            return Ok(value);
        }
        let mut value: u32 = 0;
        let mut any = false;
        for _ in 0..2 {
            match self.peek() {
                Some(d) if d.is_ascii_hexdigit() => {
                    any = true;
                    value = value * 16 + d.to_digit(16).unwrap();
                    self.pos += 1;
                }
                _ => break,
            }
        }
        if !any {
            return Err(RegexError::Syntax("invalid hex escape".to_string()));
        }
        Ok(value)
    }

    fn scan_fixed_hex(&mut self, len: usize) -> Result<u32> {
        let mut value: u32 = 0;
        for _ in 0..len {
            match self.bump() {
                Some(d) if d.is_ascii_hexdigit() => {
                    value = value * 16 + d.to_digit(16).unwrap();
                }
                _ => return Err(RegexError::Syntax("invalid \\uHHHH escape".to_string())),
            }
        }
        Ok(value)
    }

    fn scan_control_char(&mut self) -> Result<u32> {
        match self.bump() {
            Some('?') => Ok(0x7F),
            Some(c) if c.is_ascii() => Ok((c as u32) & 0x1F),
            _ => Err(RegexError::Syntax("invalid control escape".to_string())),
        }
    }
}
