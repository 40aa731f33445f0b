use crate::error::LexicalError;
use crate::token::{keyword_from_ident, Token, TokenKind, Unit};

/// Stateless with respect to its inputs: `lex(source)` always returns the same
/// tokens (or the same errors) for the same bytes.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    errors: Vec<LexicalError>,
}

/// Scan `source` into a token stream, or a list of lexical errors if any were
/// found. Scanning never stops at the first error: it resynchronizes at the
/// next line boundary so a single pass can report every error in the file.
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<LexicalError>> {
    let mut lexer = Lexer::new(source);
    lexer.run();
    if lexer.errors.is_empty() {
        Ok(lexer.tokens)
    } else {
        Err(lexer.errors)
    }
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(&mut self) {
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else { break };
            let start_line = self.line;
            let start_col = self.column;

            match c {
                '/' if self.peek_at(1) == Some('/') => self.scan_line_comment(),
                '#' => self.scan_hash(start_line, start_col),
                '"' => self.scan_string(start_line, start_col),
                c if c.is_ascii_digit() => self.scan_number(start_line, start_col),
                c if is_ident_start(c) => self.scan_identifier(start_line, start_col),
                '@' => self.scan_at_directive(start_line, start_col),
                '$' => {
                    self.advance();
                    self.push(TokenKind::Dollar, "$", start_line, start_col);
                }
                '{' => self.single(TokenKind::LBrace, start_line, start_col),
                '}' => self.single(TokenKind::RBrace, start_line, start_col),
                '[' => self.single(TokenKind::LBracket, start_line, start_col),
                ']' => self.single(TokenKind::RBracket, start_line, start_col),
                '(' => self.single(TokenKind::LParen, start_line, start_col),
                ')' => self.single(TokenKind::RParen, start_line, start_col),
                ':' => self.single(TokenKind::Colon, start_line, start_col),
                ',' => self.single(TokenKind::Comma, start_line, start_col),
                ';' => self.single(TokenKind::Semicolon, start_line, start_col),
                '.' => self.single(TokenKind::Dot, start_line, start_col),
                '+' => self.single(TokenKind::Plus, start_line, start_col),
                '-' => self.single(TokenKind::Minus, start_line, start_col),
                '*' => self.single(TokenKind::Star, start_line, start_col),
                '/' => self.single(TokenKind::Slash, start_line, start_col),
                '%' => self.single(TokenKind::Percent, start_line, start_col),
                '?' => self.single(TokenKind::Question, start_line, start_col),
                '!' => self.scan_bang(start_line, start_col),
                '=' => self.scan_eq(start_line, start_col),
                '<' => self.scan_lt(start_line, start_col),
                '>' => self.scan_gt(start_line, start_col),
                '&' => self.scan_and(start_line, start_col),
                '|' => self.scan_or(start_line, start_col),
                other => {
                    self.advance();
                    self.error(start_line, start_col, format!("unknown character '{other}'"));
                    self.resync_to_next_line();
                }
            }
        }
        self.push(TokenKind::Eof, "", self.line, self.column);
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) {
        self.tokens.push(Token::new(kind, lexeme, line, column));
    }

    fn single(&mut self, kind: TokenKind, line: u32, column: u32) {
        let c = self.advance().unwrap();
        self.push(kind, c.to_string(), line, column);
    }

    fn error(&mut self, line: u32, column: u32, message: impl Into<String>) {
        self.errors.push(LexicalError::new(line, column, message));
    }

    fn resync_to_next_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                self.advance();
                break;
            }
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// `#RRGGBB[AA]` is a color literal; any other `#...` is a line comment.
    fn scan_hash(&mut self, line: u32, column: u32) {
        let rest: String = self.chars[self.pos + 1..]
            .iter()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect();
        if rest.len() == 6 || rest.len() == 8 {
            self.advance(); // '#'
            let mut lexeme = String::from("#");
            for _ in 0..rest.len() {
                lexeme.push(self.advance().unwrap());
            }
            let r = u8::from_str_radix(&rest[0..2], 16).unwrap();
            let g = u8::from_str_radix(&rest[2..4], 16).unwrap();
            let b = u8::from_str_radix(&rest[4..6], 16).unwrap();
            let a = if rest.len() == 8 {
                u8::from_str_radix(&rest[6..8], 16).unwrap()
            } else {
                0xFF
            };
            self.push(TokenKind::ColorLiteral(r, g, b, a), lexeme, line, column);
        } else {
            self.scan_line_comment();
        }
    }

    fn scan_string(&mut self, line: u32, column: u32) {
        self.advance(); // opening quote
        let mut buf = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error(line, column, "unterminated string literal");
                    self.resync_to_next_line();
                    return;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    if !buf.is_empty() || self.tokens.last().map(|t| &t.kind) != Some(&TokenKind::TemplateExprEnd) {
                        self.push(TokenKind::TemplateStringPart(std::mem::take(&mut buf)), "", line, column);
                    }
                    self.advance();
                    self.advance();
                    self.push(TokenKind::TemplateExprStart, "${", self.line, self.column);
                    self.scan_template_expr();
                    self.push(TokenKind::TemplateExprEnd, "}", self.line, self.column);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('n') => { buf.push('\n'); self.advance(); }
                        Some('t') => { buf.push('\t'); self.advance(); }
                        Some('r') => { buf.push('\r'); self.advance(); }
                        Some('\\') => { buf.push('\\'); self.advance(); }
                        Some('"') => { buf.push('"'); self.advance(); }
                        Some('u') => {
                            self.advance();
                            let hex: String = (0..4).filter_map(|_| self.advance()).collect();
                            match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                                Some(c) => buf.push(c),
                                None => self.error(line, column, format!("invalid unicode escape \\u{hex}")),
                            }
                        }
                        Some(other) => {
                            self.error(line, column, format!("invalid escape sequence '\\{other}'"));
                            self.advance();
                        }
                        None => {
                            self.error(line, column, "unterminated string literal");
                            return;
                        }
                    }
                }
                Some(c) => {
                    buf.push(c);
                    self.advance();
                }
            }
        }
        if !buf.is_empty() || self.tokens.last().map(|t| &t.kind) != Some(&TokenKind::TemplateExprEnd) {
            self.push(TokenKind::StringLiteral(buf.clone()), format!("\"{buf}\""), line, column);
        }
    }

    /// Lex the embedded expression inside `${...}`, tracking brace depth so
    /// nested object literals don't terminate the template early.
    fn scan_template_expr(&mut self) {
        let mut depth = 0i32;
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else { return };
            let line = self.line;
            let col = self.column;
            match c {
                '}' if depth == 0 => return,
                '{' => { depth += 1; self.single(TokenKind::LBrace, line, col); }
                '}' => { depth -= 1; self.single(TokenKind::RBrace, line, col); }
                '"' => self.scan_string(line, col),
                c if c.is_ascii_digit() => self.scan_number(line, col),
                c if is_ident_start(c) => self.scan_identifier(line, col),
                '.' => self.single(TokenKind::Dot, line, col),
                '+' => self.single(TokenKind::Plus, line, col),
                '-' => self.single(TokenKind::Minus, line, col),
                '*' => self.single(TokenKind::Star, line, col),
                '/' => self.single(TokenKind::Slash, line, col),
                '%' => self.single(TokenKind::Percent, line, col),
                '?' => self.single(TokenKind::Question, line, col),
                ':' => self.single(TokenKind::Colon, line, col),
                ',' => self.single(TokenKind::Comma, line, col),
                '(' => self.single(TokenKind::LParen, line, col),
                ')' => self.single(TokenKind::RParen, line, col),
                '[' => self.single(TokenKind::LBracket, line, col),
                ']' => self.single(TokenKind::RBracket, line, col),
                '!' => self.scan_bang(line, col),
                '=' => self.scan_eq(line, col),
                '<' => self.scan_lt(line, col),
                '>' => self.scan_gt(line, col),
                '&' => self.scan_and(line, col),
                '|' => self.scan_or(line, col),
                other => {
                    self.advance();
                    self.error(line, col, format!("unknown character '{other}' in template expression"));
                }
            }
        }
    }

    fn scan_number(&mut self, line: u32, column: u32) {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        let value: f64 = digits.parse().unwrap_or(0.0);

        let unit_start = self.pos;
        if self.peek() == Some('%') {
            self.advance();
        } else {
            while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                self.advance();
            }
        }
        let suffix: String = self.chars[unit_start..self.pos].iter().collect();
        let unit = match Unit::from_suffix(&suffix) {
            Some(u) => u,
            None => {
                self.error(line, column, format!("unknown unit suffix '{suffix}'"));
                Unit::None
            }
        };
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        self.push(TokenKind::NumberLiteral(value, unit), lexeme, line, column);
    }

    fn scan_identifier(&mut self, line: u32, column: u32) {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }
        let ident: String = self.chars[start..self.pos].iter().collect();
        let kind = keyword_from_ident(&ident).unwrap_or_else(|| TokenKind::Identifier(ident.clone()));
        self.push(kind, ident, line, column);
    }

    fn scan_at_directive(&mut self, line: u32, column: u32) {
        let start = self.pos;
        self.advance(); // '@'
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }
        let lexeme: String = self.chars[start..self.pos].iter().collect();
        let kind = match lexeme.as_str() {
            "@for" => TokenKind::AtFor,
            "@if" => TokenKind::AtIf,
            "@elif" => TokenKind::AtElif,
            "@else" => TokenKind::AtElse,
            "@const_for" => TokenKind::AtConstFor,
            "@const_if" => TokenKind::AtConstIf,
            "@var" => TokenKind::AtVar,
            "@watch" => TokenKind::AtWatch,
            "@event" => TokenKind::AtEvent,
            other => {
                self.error(line, column, format!("unknown directive '{other}'"));
                TokenKind::AtEvent
            }
        };
        self.push(kind, lexeme, line, column);
    }

    fn scan_bang(&mut self, line: u32, column: u32) {
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            self.push(TokenKind::NotEq, "!=", line, column);
        } else {
            self.push(TokenKind::Bang, "!", line, column);
        }
    }

    fn scan_eq(&mut self, line: u32, column: u32) {
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            self.push(TokenKind::EqEq, "==", line, column);
        } else {
            self.push(TokenKind::Eq, "=", line, column);
        }
    }

    fn scan_lt(&mut self, line: u32, column: u32) {
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            self.push(TokenKind::LtEq, "<=", line, column);
        } else {
            self.push(TokenKind::Lt, "<", line, column);
        }
    }

    fn scan_gt(&mut self, line: u32, column: u32) {
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            self.push(TokenKind::GtEq, ">=", line, column);
        } else {
            self.push(TokenKind::Gt, ">", line, column);
        }
    }

    fn scan_and(&mut self, line: u32, column: u32) {
        self.advance();
        if self.peek() == Some('&') {
            self.advance();
            self.push(TokenKind::AndAnd, "&&", line, column);
        } else {
            self.error(line, column, "unexpected '&'");
        }
    }

    fn scan_or(&mut self, line: u32, column: u32) {
        self.advance();
        if self.peek() == Some('|') {
            self.advance();
            self.push(TokenKind::OrOr, "||", line, column);
        } else {
            self.error(line, column, "unexpected '|'");
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_simple_property() {
        let tokens = lex(r#"width = 100px"#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier("width".into()));
        assert_eq!(tokens[1].kind, TokenKind::Eq);
        assert_eq!(tokens[2].kind, TokenKind::NumberLiteral(100.0, Unit::Px));
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn lexes_color_literal() {
        let tokens = lex("#FF8800").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::ColorLiteral(0xFF, 0x88, 0x00, 0xFF));
    }

    #[test]
    fn lexes_keywords_and_directives() {
        let tokens = lex("component @const_for state").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Component);
        assert_eq!(tokens[1].kind, TokenKind::AtConstFor);
        assert_eq!(tokens[2].kind, TokenKind::State);
    }

    #[test]
    fn lexes_template_string() {
        let tokens = lex(r#""hello ${name}!""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::TemplateStringPart("hello ".into()));
        assert_eq!(tokens[1].kind, TokenKind::TemplateExprStart);
        assert_eq!(tokens[2].kind, TokenKind::Identifier("name".into()));
        assert_eq!(tokens[3].kind, TokenKind::TemplateExprEnd);
        assert_eq!(tokens[4].kind, TokenKind::StringLiteral("!".into()));
    }

    #[test]
    fn reports_multiple_errors_in_one_pass() {
        let err = lex("width = 1~00px\nheight = 2~00px").unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(err[0].line, 1);
        assert_eq!(err[1].line, 2);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = lex("\"unterminated").unwrap_err();
        assert_eq!(err.len(), 1);
    }
}
