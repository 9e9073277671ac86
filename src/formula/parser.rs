//! Recursive-descent parser for the formula mini-language.

use super::error::{FormulaError, FormulaResult};
use super::{Formula, Term};
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Plus,
    Minus,
}

/// Formula parser over a character stream.
pub struct FormulaParser<'a> {
    chars: Peekable<Chars<'a>>,
    original: &'a str,
    position: usize,
}

impl<'a> FormulaParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            original: input,
            position: 0,
        }
    }

    /// Parse a complete formula.
    pub fn parse(formula: &str) -> FormulaResult<Formula> {
        FormulaParser::new(formula).parse_formula()
    }

    fn parse_formula(&mut self) -> FormulaResult<Formula> {
        self.skip_whitespace();
        if self.peek_char().is_none() {
            return Err(FormulaError::syntax(self.position, "empty formula"));
        }

        let response = if self.original.contains('~') {
            let response = self.parse_response()?;
            self.expect('~')?;
            response
        } else {
            None
        };

        let mut formula = Formula {
            response,
            terms: Vec::new(),
            offsets: Vec::new(),
            has_intercept: true,
            original: self.original.to_string(),
        };
        self.parse_rhs(&mut formula)?;

        Ok(formula)
    }

    fn parse_response(&mut self) -> FormulaResult<Option<String>> {
        self.skip_whitespace();
        if self.peek_char() == Some('~') {
            return Ok(None);
        }
        let ident = self.parse_identifier()?;
        self.skip_whitespace();
        Ok(Some(ident))
    }

    fn parse_rhs(&mut self, formula: &mut Formula) -> FormulaResult<()> {
        self.skip_whitespace();
        if self.peek_char().is_none() {
            return Err(FormulaError::syntax(
                self.position,
                "empty right-hand side",
            ));
        }

        let mut sign = Sign::Plus;
        if self.peek_char() == Some('-') {
            self.advance();
            sign = Sign::Minus;
        } else if self.peek_char() == Some('+') {
            return Err(FormulaError::syntax(self.position, "expected term before '+'"));
        }

        loop {
            self.skip_whitespace();
            match self.peek_char() {
                None => {
                    return Err(FormulaError::syntax(
                        self.position,
                        "expected term after operator",
                    ))
                }
                Some(c) if c.is_ascii_digit() => self.parse_intercept(sign, formula)?,
                Some(_) => self.parse_item(sign, formula)?,
            }

            self.skip_whitespace();
            sign = match self.peek_char() {
                None => return Ok(()),
                Some('+') => Sign::Plus,
                Some('-') => Sign::Minus,
                Some(c) => {
                    return Err(FormulaError::syntax(
                        self.position,
                        format!("unexpected character '{}'", c),
                    ))
                }
            };
            self.advance();
        }
    }

    /// `0` and `1` switch the intercept; `-1` removes it and `-0` restores it.
    fn parse_intercept(&mut self, sign: Sign, formula: &mut Formula) -> FormulaResult<()> {
        let start = self.position;
        let mut digits = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || c == '.' {
                digits.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let one = match digits.as_str() {
            "1" => true,
            "0" => false,
            other => {
                return Err(FormulaError::syntax(
                    start,
                    format!("numeric term '{}' is not allowed; use 0 or 1", other),
                ))
            }
        };
        formula.has_intercept = match sign {
            Sign::Plus => one,
            Sign::Minus => !one,
        };
        Ok(())
    }

    fn parse_item(&mut self, sign: Sign, formula: &mut Formula) -> FormulaResult<()> {
        let start = self.position;
        let name = self.parse_identifier()?;
        self.skip_whitespace();

        if self.peek_char() == Some('(') {
            if name != "offset" {
                return Err(FormulaError::UnsupportedFunction(name));
            }
            self.advance();
            self.skip_whitespace();
            let column = self.parse_identifier()?;
            self.skip_whitespace();
            self.expect(')')?;

            match sign {
                Sign::Plus if !formula.offsets.contains(&column) => formula.offsets.push(column),
                Sign::Plus => {}
                Sign::Minus => formula.offsets.retain(|o| o != &column),
            }
            return Ok(());
        }

        let mut factors = vec![name];
        while self.peek_char() == Some(':') {
            self.advance();
            self.skip_whitespace();
            factors.push(self.parse_identifier()?);
            self.skip_whitespace();
        }

        let mut seen = Vec::with_capacity(factors.len());
        for factor in &factors {
            if seen.contains(factor) {
                return Err(FormulaError::syntax(
                    start,
                    format!("factor '{}' repeated within one term", factor),
                ));
            }
            seen.push(factor.clone());
        }

        let term = Term { factors };
        match sign {
            Sign::Plus => {
                if !formula.terms.iter().any(|t| t.same_factors(&term)) {
                    formula.terms.push(term);
                }
            }
            Sign::Minus => formula.terms.retain(|t| !t.same_factors(&term)),
        }
        Ok(())
    }

    fn parse_identifier(&mut self) -> FormulaResult<String> {
        self.skip_whitespace();
        let start = self.position;
        let mut ident = String::new();

        match self.peek_char() {
            Some(c) if c.is_alphabetic() || c == '_' || c == '.' => {}
            Some(c) => {
                return Err(FormulaError::syntax(
                    start,
                    format!("expected variable name, found '{}'", c),
                ))
            }
            None => {
                return Err(FormulaError::syntax(
                    start,
                    "expected variable name, found end of formula",
                ))
            }
        }

        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' || c == '.' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        Ok(ident)
    }

    fn expect(&mut self, expected: char) -> FormulaResult<()> {
        self.skip_whitespace();
        match self.peek_char() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(FormulaError::syntax(
                self.position,
                format!("expected '{}', found '{}'", expected, c),
            )),
            None => Err(FormulaError::syntax(
                self.position,
                format!("expected '{}', found end of formula", expected),
            )),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) {
        if self.chars.next().is_some() {
            self.position += 1;
        }
    }
}
