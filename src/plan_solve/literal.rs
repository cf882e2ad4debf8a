//! Python 字面量解析（只接受数据，不执行任何表达式）
//!
//! 支持：字符串（单/双引号、三引号、r/u 前缀、相邻字符串拼接）、整数、浮点数、True / False / None、
//! list、tuple、set、dict。名称、函数调用、属性访问、运算符（数字前的正负号除外）一律拒绝，
//! 模型输出即使夹带 `__import__('os').system(...)` 也只会得到一个解析错误。

use thiserror::Error;

/// 解析得到的字面量
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Set(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Python 中对应的类型名，用于错误信息
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::None => "NoneType",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
            Literal::Set(_) => "set",
            Literal::Dict(_) => "dict",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct LiteralError {
    /// 出错位置（字节偏移）
    pub offset: usize,
    pub message: String,
}

/// 解析完整输入为一个字面量；首尾空白与 `#` 注释会被忽略，其后不允许有其它内容
pub fn parse_literal(src: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser {
        src,
        pos: 0,
        depth: 0,
    };
    parser.skip_ws();
    let value = parser.parse_value()?;
    parser.skip_ws();
    if parser.pos < src.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

/// Python `repr(str)`：默认单引号，只含单引号不含双引号时改用双引号
pub fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Python `repr(list[str])`，例如 `['a', 'b']`
pub fn repr_str_list(items: &[String]) -> String {
    let inner = items
        .iter()
        .map(|s| repr_str(s))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", inner)
}

/// 容器最大嵌套层数，超过即报错
const MAX_DEPTH: usize = 100;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// 当前所在的 `[` / `(` / `{` 层数
    depth: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// 空白（含换行）与 `#` 注释
    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn parse_value(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('[') | Some('(') | Some('{') => self.parse_nested(),
            Some('\'') | Some('"') => self.parse_strings(),
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(false),
            Some('-') | Some('+') => {
                let negative = self.bump() == Some('-');
                self.skip_ws();
                match self.peek() {
                    Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(negative),
                    _ => Err(self.error("unary sign is only allowed before a number")),
                }
            }
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_name(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
        }
    }

    fn parse_nested(&mut self) -> Result<Literal, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let value = match self.peek() {
            Some('(') => self.parse_paren(),
            Some('{') => self.parse_brace(),
            _ => {
                self.bump();
                self.parse_sequence(']').map(Literal::List)
            }
        };
        self.depth -= 1;
        value
    }

    /// 逗号分隔的元素直到 `close`，允许尾随逗号
    fn parse_sequence(&mut self, close: char) -> Result<Vec<Literal>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.parse_value()?);
            self.skip_ws();
            if self.eat(close) {
                return Ok(items);
            }
            if !self.eat(',') {
                return Err(self.error(format!("expected ',' or '{}'", close)));
            }
        }
    }

    /// `()` 空元组，`(x)` 仅为括号，`(x,)` / `(x, y)` 为元组
    fn parse_paren(&mut self) -> Result<Literal, LiteralError> {
        self.bump();
        self.skip_ws();
        if self.eat(')') {
            return Ok(Literal::Tuple(Vec::new()));
        }
        let first = self.parse_value()?;
        self.skip_ws();
        if self.eat(')') {
            return Ok(first);
        }
        if !self.eat(',') {
            return Err(self.error("expected ',' or ')'"));
        }
        let mut items = vec![first];
        items.extend(self.parse_sequence(')')?);
        Ok(Literal::Tuple(items))
    }

    /// `{}` 空字典；首元素后跟 `:` 为字典，否则为集合
    fn parse_brace(&mut self) -> Result<Literal, LiteralError> {
        self.bump();
        self.skip_ws();
        if self.eat('}') {
            return Ok(Literal::Dict(Vec::new()));
        }
        let first = self.parse_value()?;
        self.skip_ws();
        if !self.eat(':') {
            let mut items = vec![first];
            if !self.eat('}') {
                if !self.eat(',') {
                    return Err(self.error("expected ',' or '}'"));
                }
                items.extend(self.parse_sequence('}')?);
            }
            return Ok(Literal::Set(items));
        }

        let mut entries = Vec::new();
        let mut key = first;
        loop {
            self.skip_ws();
            let value = self.parse_value()?;
            entries.push((key, value));
            self.skip_ws();
            if self.eat('}') {
                return Ok(Literal::Dict(entries));
            }
            if !self.eat(',') {
                return Err(self.error("expected ',' or '}'"));
            }
            self.skip_ws();
            if self.eat('}') {
                return Ok(Literal::Dict(entries));
            }
            key = self.parse_value()?;
            self.skip_ws();
            if !self.eat(':') {
                return Err(self.error("expected ':'"));
            }
        }
    }

    /// 关键字或字符串前缀；其余名称（变量、函数、模块）一律拒绝
    fn parse_name(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let name = &self.src[start..self.pos];
        let quoted = matches!(self.peek(), Some('\'') | Some('"'));

        match name {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            "r" | "R" | "u" | "U" if quoted => {
                self.pos = start;
                self.parse_strings()
            }
            _ if quoted && name.len() <= 2 && name.chars().all(|c| "bBfFrR".contains(c)) => {
                self.pos = start;
                Err(self.error(format!("'{}' string literals are not supported", name)))
            }
            _ => {
                self.pos = start;
                Err(self.error(format!("name '{}' is not allowed in a literal", name)))
            }
        }
    }

    /// 一个或多个相邻字符串字面量，按 Python 规则拼接
    fn parse_strings(&mut self) -> Result<Literal, LiteralError> {
        let mut out = self.parse_string()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if self.at_string_start() {
                out.push_str(&self.parse_string()?);
            } else {
                self.pos = save;
                return Ok(Literal::Str(out));
            }
        }
    }

    fn at_string_start(&self) -> bool {
        match self.peek() {
            Some('\'') | Some('"') => true,
            Some('r') | Some('R') | Some('u') | Some('U') => {
                matches!(self.peek_nth(1), Some('\'') | Some('"'))
            }
            _ => false,
        }
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let mut raw = false;
        if let Some(c) = self.peek() {
            if "rRuU".contains(c) {
                raw = c == 'r' || c == 'R';
                self.bump();
            }
        }

        let start = self.pos;
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected string")),
        };
        let triple = self.peek() == Some(quote) && self.peek_nth(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let mut out = String::new();
        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => {
                    self.pos = start;
                    return Err(self.error("unterminated string literal"));
                }
            };
            if c == quote {
                if !triple {
                    return Ok(out);
                }
                if self.peek() == Some(quote) && self.peek_nth(1) == Some(quote) {
                    self.bump();
                    self.bump();
                    return Ok(out);
                }
                out.push(c);
            } else if c == '\n' && !triple {
                self.pos = start;
                return Err(self.error("unterminated string literal"));
            } else if c == '\\' {
                match self.bump() {
                    None => {
                        self.pos = start;
                        return Err(self.error("unterminated string literal"));
                    }
                    Some(next) if raw => {
                        out.push('\\');
                        out.push(next);
                    }
                    Some(next) => self.unescape(next, &mut out)?,
                }
            } else {
                out.push(c);
            }
        }
    }

    fn unescape(&mut self, c: char, out: &mut String) -> Result<(), LiteralError> {
        match c {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            'x' => out.push(self.hex_escape(2)?),
            'u' => out.push(self.hex_escape(4)?),
            'U' => out.push(self.hex_escape(8)?),
            '0'..='7' => {
                let mut value = c.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).ok_or_else(|| self.error("invalid octal escape"))?);
            }
            'N' => return Err(self.error("\\N{...} escapes are not supported")),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let d = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("truncated hex escape"))?;
            value = value * 16 + d;
            self.bump();
        }
        char::from_u32(value).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn parse_number(&mut self, negative: bool) -> Result<Literal, LiteralError> {
        let start = self.pos;

        if self.peek() == Some('0') {
            let radix = match self.peek_nth(1) {
                Some('x') | Some('X') => Some(16),
                Some('o') | Some('O') => Some(8),
                Some('b') | Some('B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.bump();
                self.bump();
                let digits_start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_digit(radix) || c == '_') {
                    self.bump();
                }
                let digits: String = self.src[digits_start..self.pos]
                    .chars()
                    .filter(|c| *c != '_')
                    .collect();
                let value = i64::from_str_radix(&digits, radix).map_err(|e| LiteralError {
                    offset: start,
                    message: format!("invalid integer literal: {}", e),
                })?;
                self.reject_identifier_tail()?;
                return Ok(Literal::Int(if negative { -value } else { value }));
            }
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                self.bump();
            } else if c == '.' && !is_float {
                is_float = true;
                self.bump();
            } else if c == 'e' || c == 'E' {
                is_float = true;
                self.bump();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.bump();
                }
            } else {
                break;
            }
        }
        if matches!(self.peek(), Some('j') | Some('J')) {
            return Err(self.error("complex literals are not supported"));
        }
        self.reject_identifier_tail()?;

        let text: String = self.src[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let invalid = |message: String| LiteralError {
            offset: start,
            message,
        };
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| invalid(format!("invalid float literal '{}'", text)))?;
            Ok(Literal::Float(if negative { -value } else { value }))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| invalid(format!("invalid integer literal '{}'", text)))?;
            Ok(Literal::Int(if negative { -value } else { value }))
        }
    }

    /// `1abc`、`1.real` 之类数字后紧跟名称的写法
    fn reject_identifier_tail(&self) -> Result<(), LiteralError> {
        match self.peek() {
            Some(c) if c.is_alphanumeric() || c == '_' => {
                Err(self.error("invalid suffix after number"))
            }
            _ => Ok(()),
        }
    }
}
