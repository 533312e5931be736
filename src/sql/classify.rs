//! Statement classifier: maps one SQL statement to a typed DDL operation.
//!
//! Only five single-statement forms are recognized. Anything else, including
//! malformed instances of those forms, classifies as [`Classification::NotRecognized`].

use super::lexer::{Lexer, Token};
use crate::schema::Column;
use serde::Serialize;
use thiserror::Error;

/// A recognized DDL operation with its captured operands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    AddColumn {
        table: String,
        column: String,
        data_type: String,
    },
    DropColumn {
        table: String,
        column: String,
    },
    RenameColumn {
        table: String,
        old: String,
        new: String,
    },
    CreateTable {
        table: String,
        columns: Vec<Column>,
        constraints: Vec<TableConstraint>,
    },
    CreateIndex {
        index: String,
        table: String,
        column: String,
        unique: bool,
    },
}

/// Table-level key clauses of a CREATE TABLE body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableConstraint {
    PrimaryKey { columns: Vec<String> },
    ForeignKey { columns: Vec<String>, target: String },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::AddColumn { .. } => "add_column",
            Operation::DropColumn { .. } => "drop_column",
            Operation::RenameColumn { .. } => "rename_column",
            Operation::CreateTable { .. } => "create_table",
            Operation::CreateIndex { .. } => "create_index",
        }
    }

    /// The table the operation targets.
    pub fn table(&self) -> &str {
        match self {
            Operation::AddColumn { table, .. }
            | Operation::DropColumn { table, .. }
            | Operation::RenameColumn { table, .. }
            | Operation::CreateTable { table, .. }
            | Operation::CreateIndex { table, .. } => table,
        }
    }
}

/// Why a statement cannot be simulated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unsupported {
    #[error("empty statement")]
    Empty,
    #[error("multiple statements are not supported")]
    MultipleStatements,
    #[error("unsupported statement: {0}")]
    Statement(String),
    #[error("unsupported ALTER TABLE action: {0}")]
    AlterAction(String),
    #[error("compound ALTER TABLE statements are not supported")]
    CompoundAlter,
    #[error("IF [NOT] EXISTS clauses are not supported")]
    Conditional,
    #[error("indexes over multiple columns are not supported")]
    CompositeIndex,
    #[error("malformed {statement} statement: {detail}")]
    Malformed {
        statement: &'static str,
        detail: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Recognized(Operation),
    NotRecognized(Unsupported),
}

/// Classify a single SQL statement. Never panics on arbitrary input.
pub fn classify(sql: &str) -> Classification {
    let tokens = Lexer::new(sql).tokenize();
    match Parser::new(tokens).parse() {
        Ok(op) => Classification::Recognized(op),
        Err(reason) => Classification::NotRecognized(reason),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type ParseResult<T> = Result<T, Unsupported>;

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn next(&self) -> &Token {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check_word(&self, word: &str) -> bool {
        matches!(self.current(), Token::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    fn expect(&mut self, expected: Token, statement: &'static str) -> ParseResult<()> {
        if *self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(malformed(
                statement,
                format!("expected {}, found {}", expected, self.current()),
            ))
        }
    }

    fn parse(&mut self) -> ParseResult<Operation> {
        // Leading empty statements (";;") carry nothing
        while *self.current() == Token::Semicolon {
            self.advance();
        }

        let op = match self.current() {
            Token::Eof => return Err(Unsupported::Empty),
            Token::Alter => {
                self.advance();
                self.parse_alter()?
            }
            Token::Create => {
                self.advance();
                self.parse_create()?
            }
            other => return Err(Unsupported::Statement(other.to_string())),
        };

        self.finish(statement_name(&op))?;
        Ok(op)
    }

    /// Accept an optional trailing `;` and require end of input.
    fn finish(&mut self, statement: &'static str) -> ParseResult<()> {
        if *self.current() == Token::Semicolon {
            self.advance();
            while *self.current() == Token::Semicolon {
                self.advance();
            }
            if *self.current() != Token::Eof {
                return Err(Unsupported::MultipleStatements);
            }
        }
        match self.current() {
            Token::Eof => Ok(()),
            Token::Comma if statement.starts_with("ALTER") => Err(Unsupported::CompoundAlter),
            tok => Err(malformed(statement, format!("unexpected {}", tok))),
        }
    }

    /// Identifier, possibly schema-qualified. The last part is the name.
    fn parse_name(&mut self, statement: &'static str, what: &str) -> ParseResult<String> {
        let mut name = match name_of(self.current()) {
            Some(s) => s,
            None => {
                let tok = self.current();
                return Err(malformed(
                    statement,
                    format!("expected {} name, found {}", what, tok),
                ));
            }
        };
        self.advance();

        while *self.current() == Token::Dot {
            self.advance();
            match name_of(self.current()) {
                Some(s) => {
                    name = s;
                    self.advance();
                }
                None => {
                    let tok = self.current();
                    return Err(malformed(
                        statement,
                        format!("expected {} name after '.', found {}", what, tok),
                    ));
                }
            }
        }

        if name.is_empty() {
            return Err(malformed(statement, format!("empty {} name", what)));
        }
        Ok(name)
    }

    fn parse_alter(&mut self) -> ParseResult<Operation> {
        const STMT: &str = "ALTER TABLE";

        match self.current() {
            Token::Table => self.advance(),
            Token::Eof | Token::Semicolon => {
                return Err(malformed(STMT, "expected TABLE".to_string()));
            }
            tok => return Err(Unsupported::Statement(format!("ALTER {}", tok))),
        }
        if *self.current() == Token::If {
            return Err(Unsupported::Conditional);
        }

        let table = self.parse_name(STMT, "table")?;

        match self.current() {
            Token::Add => {
                self.advance();
                if *self.current() != Token::Column {
                    return Err(Unsupported::AlterAction(format!("ADD {}", self.current())));
                }
                self.advance();
                if *self.current() == Token::If {
                    return Err(Unsupported::Conditional);
                }
                let column = self.parse_name("ALTER TABLE ADD COLUMN", "column")?;
                let data_type = self.parse_type("ALTER TABLE ADD COLUMN")?;
                // Column constraints do not change the simulated column
                self.parse_modifiers("ALTER TABLE ADD COLUMN")?;
                if *self.current() == Token::Comma {
                    return Err(Unsupported::CompoundAlter);
                }
                Ok(Operation::AddColumn {
                    table,
                    column,
                    data_type,
                })
            }
            Token::Drop => {
                self.advance();
                if *self.current() != Token::Column {
                    return Err(Unsupported::AlterAction(format!("DROP {}", self.current())));
                }
                self.advance();
                if *self.current() == Token::If {
                    return Err(Unsupported::Conditional);
                }
                let column = self.parse_name("ALTER TABLE DROP COLUMN", "column")?;
                if self.check_word("CASCADE") || self.check_word("RESTRICT") {
                    self.advance();
                }
                if *self.current() == Token::Comma {
                    return Err(Unsupported::CompoundAlter);
                }
                Ok(Operation::DropColumn { table, column })
            }
            Token::Rename => {
                self.advance();
                if *self.current() != Token::Column {
                    return Err(Unsupported::AlterAction(format!(
                        "RENAME {}",
                        self.current()
                    )));
                }
                self.advance();
                let old = self.parse_name("ALTER TABLE RENAME COLUMN", "column")?;
                self.expect(Token::To, "ALTER TABLE RENAME COLUMN")?;
                let new = self.parse_name("ALTER TABLE RENAME COLUMN", "column")?;
                Ok(Operation::RenameColumn { table, old, new })
            }
            Token::Eof | Token::Semicolon => Err(malformed(STMT, "missing action".to_string())),
            tok => Err(Unsupported::AlterAction(tok.to_string())),
        }
    }

    fn parse_create(&mut self) -> ParseResult<Operation> {
        match self.current() {
            Token::Table => {
                self.advance();
                self.parse_create_table()
            }
            Token::Index => {
                self.advance();
                self.parse_create_index(false)
            }
            Token::Unique if *self.next() == Token::Index => {
                self.advance();
                self.advance();
                self.parse_create_index(true)
            }
            tok => Err(Unsupported::Statement(format!("CREATE {}", tok))),
        }
    }

    fn parse_create_index(&mut self, unique: bool) -> ParseResult<Operation> {
        const STMT: &str = "CREATE INDEX";

        if *self.current() == Token::If {
            return Err(Unsupported::Conditional);
        }
        let index = self.parse_name(STMT, "index")?;
        self.expect(Token::On, STMT)?;
        let table = self.parse_name(STMT, "table")?;

        // USING <method>
        if self.check_word("USING") {
            self.advance();
            if let Token::Ident(_) = self.current() {
                self.advance();
            }
        }

        self.expect(Token::LParen, STMT)?;
        let column = match (name_of(self.current()), self.current()) {
            (Some(name), _) if *self.next() != Token::LParen => name,
            (_, Token::RParen) => return Err(malformed(STMT, "empty column list".to_string())),
            (_, tok) => {
                return Err(malformed(
                    STMT,
                    format!("expected column name, found {}", tok),
                ));
            }
        };
        self.advance();
        if self.check_word("ASC") || self.check_word("DESC") {
            self.advance();
        }
        if *self.current() == Token::Comma {
            return Err(Unsupported::CompositeIndex);
        }
        self.expect(Token::RParen, STMT)?;

        Ok(Operation::CreateIndex {
            index,
            table,
            column,
            unique,
        })
    }

    fn parse_create_table(&mut self) -> ParseResult<Operation> {
        const STMT: &str = "CREATE TABLE";

        if *self.current() == Token::If {
            return Err(Unsupported::Conditional);
        }
        let table = self.parse_name(STMT, "table")?;

        if *self.current() != Token::LParen {
            return Err(Unsupported::Statement(format!(
                "CREATE TABLE ... {}",
                self.current()
            )));
        }
        self.advance();

        let mut columns = Vec::new();
        let mut constraints = Vec::new();

        loop {
            match self.current() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                }
                Token::Constraint => {
                    // Named constraint: the clause follows the name
                    self.advance();
                    if let Token::Ident(_) = self.current() {
                        self.advance();
                    }
                }
                Token::Primary => {
                    self.advance();
                    self.expect(Token::Key, STMT)?;
                    let cols = self.parse_column_list(STMT)?;
                    constraints.push(TableConstraint::PrimaryKey { columns: cols });
                }
                Token::Foreign => {
                    self.advance();
                    self.expect(Token::Key, STMT)?;
                    let cols = self.parse_column_list(STMT)?;
                    self.expect(Token::References, STMT)?;
                    let target = self.parse_reference(STMT)?;
                    self.skip_on_actions();
                    constraints.push(TableConstraint::ForeignKey {
                        columns: cols,
                        target,
                    });
                }
                Token::Unique => {
                    self.advance();
                    if matches!(self.current(), Token::Key | Token::Index) {
                        self.advance();
                    }
                    // Optional index name
                    if matches!(self.current(), Token::Ident(_)) && *self.next() == Token::LParen {
                        self.advance();
                    }
                    self.parse_column_list(STMT)?;
                }
                Token::Check => {
                    self.advance();
                    self.skip_parenthesized();
                }
                // MySQL `KEY idx (col)` / `INDEX (col)`
                Token::Index | Token::Key if self.starts_index_clause() => {
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Ident(_) | Token::Index | Token::Key => {
                    columns.push(self.parse_column_def(STMT)?);
                }
                Token::Eof | Token::Semicolon => {
                    return Err(malformed(STMT, "unterminated column list".to_string()));
                }
                tok => {
                    return Err(malformed(STMT, format!("unexpected {}", tok)));
                }
            }
        }

        if columns.is_empty() {
            return Err(malformed(STMT, "no column definitions".to_string()));
        }

        // Table options (ENGINE=..., WITH (...)) do not affect the model
        self.skip_until(&[Token::Semicolon]);

        Ok(Operation::CreateTable {
            table,
            columns,
            constraints,
        })
    }

    /// At `KEY`/`INDEX`: an index clause is followed by its column list,
    /// optionally preceded by an index name. Anything else is a column named
    /// `key` or `index`.
    fn starts_index_clause(&self) -> bool {
        match self.next() {
            Token::LParen => true,
            Token::Ident(_) => {
                *self.peek_at(2) == Token::LParen && name_of(self.peek_at(3)).is_some()
            }
            _ => false,
        }
    }

    fn parse_column_def(&mut self, statement: &'static str) -> ParseResult<Column> {
        let name = self.parse_name(statement, "column")?;
        let data_type = self.parse_type(statement)?;
        let modifiers = self.parse_modifiers(statement)?;

        Ok(Column {
            name,
            data_type,
            is_nullable: !(modifiers.not_null || modifiers.primary_key),
            is_primary_key: modifiers.primary_key,
            is_foreign_key: modifiers.references,
        })
    }

    /// Data type text: words separated by spaces, parameters kept verbatim.
    fn parse_type(&mut self, statement: &'static str) -> ParseResult<String> {
        let mut typ = String::new();
        let mut depth = 0usize;

        loop {
            match self.current() {
                Token::Ident(t) => {
                    if !typ.is_empty() && !typ.ends_with('(') && depth == 0 {
                        typ.push(' ');
                    }
                    typ.push_str(t);
                    self.advance();
                }
                Token::Num(n) if depth > 0 => {
                    typ.push_str(n);
                    self.advance();
                }
                // ENUM('a', 'b')
                Token::Str(v) if depth > 0 => {
                    typ.push('\'');
                    typ.push_str(v);
                    typ.push('\'');
                    self.advance();
                }
                Token::LParen if !typ.is_empty() => {
                    depth += 1;
                    typ.push('(');
                    self.advance();
                }
                Token::RParen if depth > 0 => {
                    depth -= 1;
                    typ.push(')');
                    self.advance();
                }
                Token::Comma if depth > 0 => {
                    typ.push(',');
                    self.advance();
                }
                // Postgres array suffix
                Token::Other('[') if depth == 0 && !typ.is_empty() => {
                    self.advance();
                    if *self.current() == Token::Other(']') {
                        self.advance();
                        typ.push_str("[]");
                    } else {
                        return Err(malformed(statement, "unterminated array type".to_string()));
                    }
                }
                Token::Eof | Token::Semicolon if depth > 0 => {
                    return Err(malformed(statement, "unterminated type parameters".to_string()));
                }
                _ if depth > 0 => {
                    return Err(malformed(
                        statement,
                        format!("unexpected {} in type parameters", self.current()),
                    ));
                }
                _ => break,
            }
        }

        if typ.is_empty() {
            return Err(malformed(
                statement,
                format!("missing data type before {}", self.current()),
            ));
        }
        Ok(typ)
    }

    /// Column constraints up to the next `,`, `)` or end of statement.
    fn parse_modifiers(&mut self, statement: &'static str) -> ParseResult<Modifiers> {
        let mut modifiers = Modifiers::default();

        loop {
            match self.current() {
                Token::Primary => {
                    self.advance();
                    if *self.current() == Token::Key {
                        self.advance();
                    }
                    modifiers.primary_key = true;
                }
                Token::Not => {
                    self.advance();
                    if *self.current() == Token::Null {
                        self.advance();
                        modifiers.not_null = true;
                    }
                }
                Token::Null => {
                    self.advance();
                    modifiers.not_null = false;
                }
                Token::Unique => {
                    self.advance();
                    if *self.current() == Token::Key {
                        self.advance();
                    }
                }
                Token::Default => {
                    self.advance();
                    self.skip_default_value();
                }
                Token::References => {
                    self.advance();
                    self.parse_reference(statement)?;
                    self.skip_on_actions();
                    modifiers.references = true;
                }
                Token::Check => {
                    self.advance();
                    self.skip_parenthesized();
                }
                Token::Constraint => {
                    self.advance();
                    if let Token::Ident(_) = self.current() {
                        self.advance();
                    }
                }
                Token::LParen => self.skip_parenthesized(),
                Token::Comma | Token::RParen | Token::Semicolon | Token::Eof => break,
                _ => self.advance(),
            }
        }

        Ok(modifiers)
    }

    fn skip_default_value(&mut self) {
        match self.current() {
            Token::LParen => self.skip_parenthesized(),
            Token::Ident(_) => {
                self.advance();
                // Function calls like NOW()
                if *self.current() == Token::LParen {
                    self.skip_parenthesized();
                }
            }
            Token::Comma | Token::RParen | Token::Semicolon | Token::Eof => {}
            _ => self.advance(),
        }
    }

    /// `<table> [( <column> )]`, returning the table name.
    fn parse_reference(&mut self, statement: &'static str) -> ParseResult<String> {
        let target = self.parse_name(statement, "referenced table")?;
        if *self.current() == Token::LParen {
            self.parse_column_list(statement)?;
        }
        Ok(target)
    }

    fn parse_column_list(&mut self, statement: &'static str) -> ParseResult<Vec<String>> {
        self.expect(Token::LParen, statement)?;
        let mut cols = Vec::new();

        loop {
            if let Some(name) = name_of(self.current()) {
                cols.push(name);
                self.advance();
                continue;
            }
            match self.current() {
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof | Token::Semicolon => {
                    return Err(malformed(statement, "unterminated column list".to_string()));
                }
                tok => {
                    return Err(malformed(
                        statement,
                        format!("unexpected {} in column list", tok),
                    ));
                }
            }
        }

        if cols.is_empty() {
            return Err(malformed(statement, "empty column list".to_string()));
        }
        Ok(cols)
    }

    fn skip_on_actions(&mut self) {
        while *self.current() == Token::On {
            self.advance();
            // DELETE or UPDATE
            if self.check_word("DELETE") || self.check_word("UPDATE") {
                self.advance();
            }
            // CASCADE, RESTRICT, SET NULL, SET DEFAULT, NO ACTION
            if self.check_word("SET") {
                self.advance();
                if matches!(self.current(), Token::Null | Token::Default) {
                    self.advance();
                }
            } else if self.check_word("NO") {
                self.advance();
                if self.check_word("ACTION") {
                    self.advance();
                }
            } else if self.check_word("CASCADE") || self.check_word("RESTRICT") {
                self.advance();
            }
        }
    }

    fn skip_parenthesized(&mut self) {
        if *self.current() != Token::LParen {
            return;
        }
        self.advance();
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_until(&mut self, tokens: &[Token]) {
        while !tokens.contains(self.current()) && *self.current() != Token::Eof {
            if *self.current() == Token::LParen {
                self.skip_parenthesized();
            } else {
                self.advance();
            }
        }
    }
}

#[derive(Default)]
struct Modifiers {
    primary_key: bool,
    not_null: bool,
    references: bool,
}

/// Identifier text, including the keywords that are also common column names.
fn name_of(token: &Token) -> Option<String> {
    match token {
        Token::Ident(s) => Some(s.clone()),
        Token::Key => Some("key".to_string()),
        Token::Index => Some("index".to_string()),
        _ => None,
    }
}

fn malformed(statement: &'static str, detail: String) -> Unsupported {
    Unsupported::Malformed { statement, detail }
}

fn statement_name(op: &Operation) -> &'static str {
    match op {
        Operation::AddColumn { .. } => "ALTER TABLE ADD COLUMN",
        Operation::DropColumn { .. } => "ALTER TABLE DROP COLUMN",
        Operation::RenameColumn { .. } => "ALTER TABLE RENAME COLUMN",
        Operation::CreateTable { .. } => "CREATE TABLE",
        Operation::CreateIndex { .. } => "CREATE INDEX",
    }
}
