use phf::{phf_map, Map};

use crate::error::Error;
use crate::token::{Literal, Token, Type};

pub struct Scanner;

impl Scanner {
    const KEYWORDS: Map<&'static str, Type> = phf_map! {
        "and" => Type::And,
        "class" => Type::Class,
        "else" => Type::Else,
        "false" => Type::False,
        "for" => Type::For,
        "fun" => Type::Fun,
        "if" => Type::If,
        "nil" => Type::Nil,
        "or" => Type::Or,
        "print" => Type::Print,
        "return" => Type::Return,
        "super" => Type::Super,
        "this" => Type::This,
        "true" => Type::True,
        "var" => Type::Var,
        "while" => Type::While,
    };

    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Scanner
    }

    pub fn scan_tokens<'a, 'b>(&'a mut self, src: &'b str) -> TokenStream
    where
        'b: 'a,
    {
        TokenStream::new(src)
    }
}

pub struct TokenStream<'a> {
    src: &'a str,
    line: usize,

    // `start` and `current` point to the start and end of the token being scanned
    start: usize,
    current: usize,

    // Line the current token started on. Strings may span newlines, so `line`
    // can move past this before the token is emitted.
    token_line: usize,

    // This flag is set to `true` once the eof token has been emitted, so the
    // iterator knows to stop instead of emitting it again.
    eof: bool,
    errors: Vec<Error>,
}

impl<'a> TokenStream<'a> {
    pub fn new(src: &'a str) -> Self {
        TokenStream {
            src,
            line: 1,
            start: 0,
            current: 0,
            token_line: 1,
            eof: false,
            errors: Vec::new(),
        }
    }

    // Lexical errors collected so far. Scanning recovers and keeps going, so
    // this is only complete once the stream has been exhausted.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    fn scan_token(&mut self) -> Result<Option<Token>, Error> {
        let c = self.advance();

        let token = match c {
            '(' => Some(self.make_token(Type::LeftParen)),
            ')' => Some(self.make_token(Type::RightParen)),
            '{' => Some(self.make_token(Type::LeftBrace)),
            '}' => Some(self.make_token(Type::RightBrace)),
            ',' => Some(self.make_token(Type::Comma)),
            '.' => Some(self.make_token(Type::Dot)),
            '-' => Some(self.make_token(Type::Minus)),
            '+' => Some(self.make_token(Type::Plus)),
            ';' => Some(self.make_token(Type::SemiColon)),
            '*' => Some(self.make_token(Type::Star)),

            '!' => {
                if self.match_char('=') {
                    Some(self.make_token(Type::BangEqual))
                } else {
                    Some(self.make_token(Type::Bang))
                }
            }

            '=' => {
                if self.match_char('=') {
                    Some(self.make_token(Type::EqualEqual))
                } else {
                    Some(self.make_token(Type::Equal))
                }
            }

            '<' => {
                if self.match_char('=') {
                    Some(self.make_token(Type::LessEqual))
                } else {
                    Some(self.make_token(Type::Less))
                }
            }

            '>' => {
                if self.match_char('=') {
                    Some(self.make_token(Type::GreaterEqual))
                } else {
                    Some(self.make_token(Type::Greater))
                }
            }

            '/' => {
                if self.match_char('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                    None
                } else {
                    Some(self.make_token(Type::Slash))
                }
            }

            '"' => Some(self.string()?),

            // White spaces, do nothing
            ' ' | '\t' | '\r' => None,

            // Increment for new line
            '\n' => {
                self.line += 1;
                None
            }

            _ => {
                if c.is_ascii_digit() {
                    Some(self.number())
                } else if c.is_ascii_alphabetic() || c == '_' {
                    Some(self.identifier())
                } else {
                    return Err(Error::UnexpectedCharacter {
                        ch: c,
                        line: self.line,
                    });
                }
            }
        };

        Ok(token)
    }

    fn string(&mut self) -> Result<Token, Error> {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }

            self.advance();
        }

        if self.is_at_end() {
            return Err(Error::UnterminatedString { line: self.line });
        }

        // consume the closing "
        self.advance();
        Ok(self.make_token_with_val(
            Type::String,
            Literal::from(String::from(&self.src[self.start + 1..self.current - 1])),
        ))
    }

    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A trailing '.' with no digit after it belongs to the next token.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        self.make_token_with_val(
            Type::Number,
            Literal::Num(self.src[self.start..self.current].parse::<f64>().unwrap()),
        )
    }

    fn identifier(&mut self) -> Token {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = &self.src[self.start..self.current];

        match Scanner::KEYWORDS.get(text) {
            None => self.make_token(Type::Identifier),
            Some(ty @ Type::True) | Some(ty @ Type::False) => {
                let val = match ty {
                    Type::True => Literal::Bool(true),
                    _ => Literal::Bool(false),
                };

                self.make_token_with_val(*ty, val)
            }
            Some(keyword) => self.make_token(*keyword),
        }
    }

    fn current(&self) -> char {
        self.src.as_bytes()[self.current] as char
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.current()
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.src.len() {
            '\0'
        } else {
            self.src.as_bytes()[self.current + 1] as char
        }
    }

    fn advance(&mut self) -> char {
        let res = self.current();
        self.current += 1;
        res
    }

    fn match_char(&mut self, c: char) -> bool {
        if self.is_at_end() || self.current() != c {
            false
        } else {
            self.current += 1;
            true
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.src.len()
    }

    fn make_token(&mut self, ty: Type) -> Token {
        self.make_token_with_val(ty, Literal::Nil)
    }

    fn make_token_with_val(&mut self, ty: Type, val: Literal) -> Token {
        let lexeme = match ty {
            Type::Eof => String::new(),
            _ => String::from(&self.src[self.start..self.current]),
        };

        Token::new(ty, lexeme, self.token_line, val)
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof {
            return None;
        }

        while !self.is_at_end() {
            self.start = self.current;
            self.token_line = self.line;

            match self.scan_token() {
                Ok(None) => continue,
                Ok(Some(token)) => return Some(token),
                Err(err) => {
                    // Record and keep scanning from the next character.
                    self.errors.push(err);
                    continue;
                }
            }
        }

        self.eof = true;
        self.start = self.current;
        self.token_line = self.line;
        Some(self.make_token(Type::Eof))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::scanner::Scanner;
    use crate::token::{Literal, Token, Type};

    #[test]
    fn test_basic_scanning() {
        let source = "var foo = bar; 12.45 \"hello\" true false nil // this is a comment";
        let mut scanner = Scanner::new();
        let stream = scanner.scan_tokens(source);

        assert_eq!(
            stream.collect::<Vec<Token>>(),
            vec![
                Token::new(Type::Var, String::from("var"), 1, Literal::Nil),
                Token::new(Type::Identifier, String::from("foo"), 1, Literal::Nil),
                Token::new(Type::Equal, String::from("="), 1, Literal::Nil),
                Token::new(Type::Identifier, String::from("bar"), 1, Literal::Nil),
                Token::new(Type::SemiColon, String::from(";"), 1, Literal::Nil),
                Token::new(
                    Type::Number,
                    String::from("12.45"),
                    1,
                    Literal::Num(12.45)
                ),
                Token::new(
                    Type::String,
                    String::from("\"hello\""),
                    1,
                    Literal::from("hello")
                ),
                Token::new(Type::True, String::from("true"), 1, Literal::Bool(true)),
                Token::new(
                    Type::False,
                    String::from("false"),
                    1,
                    Literal::Bool(false)
                ),
                Token::new(Type::Nil, String::from("nil"), 1, Literal::Nil),
                Token::new(Type::Eof, String::new(), 1, Literal::Nil),
            ]
        );
    }

    #[test]
    fn test_operator_kinds() {
        let source = "1+2";
        let mut scanner = Scanner::new();
        let stream = scanner.scan_tokens(source);
        let tokens: Vec<Token> = stream.collect();

        assert_eq!(
            tokens.iter().map(|t| t.ty).collect::<Vec<Type>>(),
            vec![Type::Number, Type::Plus, Type::Number, Type::Eof]
        );
        assert_eq!(tokens[0].value, Literal::Num(1.0));
        assert_eq!(tokens[2].value, Literal::Num(2.0));
        assert!(tokens.iter().all(|t| t.line == 1));
    }

    #[test]
    fn test_maximal_munch() {
        let source = "! != = == < <= > >= / //";
        let mut scanner = Scanner::new();
        let stream = scanner.scan_tokens(source);

        assert_eq!(
            stream.map(|t| t.ty).collect::<Vec<Type>>(),
            vec![
                Type::Bang,
                Type::BangEqual,
                Type::Equal,
                Type::EqualEqual,
                Type::Less,
                Type::LessEqual,
                Type::Greater,
                Type::GreaterEqual,
                Type::Slash,
                Type::Eof,
            ]
        );
    }

    #[test]
    fn test_line_accounting() {
        let source = "var a;\n// comment line\nprint a;";
        let mut scanner = Scanner::new();
        let stream = scanner.scan_tokens(source);
        let tokens: Vec<Token> = stream.collect();

        assert_eq!(tokens[0].line, 1); // var
        assert_eq!(tokens[3].line, 3); // print
        assert_eq!(tokens.last().unwrap().line, 3); // eof
    }

    #[test]
    fn test_multiline_string_keeps_start_line() {
        let source = "\"a\nb\"\nfoo";
        let mut scanner = Scanner::new();
        let stream = scanner.scan_tokens(source);
        let tokens: Vec<Token> = stream.collect();

        assert_eq!(tokens[0].ty, Type::String);
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[0].value, Literal::from("a\nb"));
        assert_eq!(tokens[1].ty, Type::Identifier);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_number_with_trailing_dot() {
        let source = "123.";
        let mut scanner = Scanner::new();
        let stream = scanner.scan_tokens(source);

        assert_eq!(
            stream.map(|t| t.ty).collect::<Vec<Type>>(),
            vec![Type::Number, Type::Dot, Type::Eof]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let source = "var a = \"hello";
        let mut scanner = Scanner::new();
        let mut stream = scanner.scan_tokens(source);
        let tokens: Vec<Token> = stream.by_ref().collect();

        // The scan still runs to completion and terminates with eof.
        assert_eq!(tokens.last().unwrap().ty, Type::Eof);
        assert_eq!(stream.errors(), &[Error::UnterminatedString { line: 1 }]);
    }

    #[test]
    fn test_unexpected_character_is_skipped() {
        let source = "var a = @ 1;";
        let mut scanner = Scanner::new();
        let mut stream = scanner.scan_tokens(source);
        let tokens: Vec<Token> = stream.by_ref().collect();

        assert_eq!(
            tokens.iter().map(|t| t.ty).collect::<Vec<Type>>(),
            vec![
                Type::Var,
                Type::Identifier,
                Type::Equal,
                Type::Number,
                Type::SemiColon,
                Type::Eof,
            ]
        );
        assert_eq!(
            stream.errors(),
            &[Error::UnexpectedCharacter { ch: '@', line: 1 }]
        );
    }
}
