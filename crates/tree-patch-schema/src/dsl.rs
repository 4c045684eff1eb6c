//! Textual schema loader.
//!
//! Accepts the declaration subset used by patch instructions:
//!
//! ```text
//! # comment
//! type Op enum { | add | remove ("rm") }
//! type Operation struct {
//!     op Op
//!     value optional Any
//!     from optional nullable String (rename "source")
//! }
//! type OperationSequence [Operation]
//! type Details {String:String}
//! type Result union { | Error "error" | Link "result" } representation keyed
//! type Beta union { | Gamma "gamma" } representation stringprefix ":"
//! type Gamma string
//! ```
//!
//! Inline `[T]` and `{K:V}` references are synthesized into named types
//! (`List__T`, `Map__K__V`).

use std::collections::BTreeMap;

use crate::error::SchemaError;
use crate::system::TypeSystem;
use crate::types::{
    EnumType, ListType, MapType, ScalarKind, StructField, StructRepr, StructType, TypeDef,
    UnionRepr, UnionType,
};

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Punct(char),
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, SchemaError> {
    let mut out = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1;
    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '{' | '}' | '[' | ']' | '|' | ':' | '(' | ')' => {
                chars.next();
                out.push(Token { tok: Tok::Punct(c), line });
            }
            '"' => {
                chars.next();
                let start_line = line;
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('"') => s.push('"'),
                            Some('\\') => s.push('\\'),
                            other => {
                                return Err(SchemaError::Syntax {
                                    line,
                                    message: format!("invalid escape {other:?}"),
                                })
                            }
                        },
                        Some('\n') => {
                            return Err(SchemaError::Syntax {
                                line: start_line,
                                message: "unterminated string".into(),
                            })
                        }
                        Some(c) => s.push(c),
                        None => {
                            return Err(SchemaError::Syntax {
                                line: start_line,
                                message: "unterminated string".into(),
                            })
                        }
                    }
                }
                out.push(Token { tok: Tok::Str(s), line: start_line });
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut s = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        s.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push(Token { tok: Tok::Ident(s), line });
            }
            other => {
                return Err(SchemaError::Syntax {
                    line,
                    message: format!("unexpected character {other:?}"),
                })
            }
        }
    }
    Ok(out)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    system: TypeSystem,
}

/// Parse schema text into a validated [`TypeSystem`].
pub fn parse_schema(input: &str) -> Result<TypeSystem, SchemaError> {
    let mut parser = Parser {
        tokens: tokenize(input)?,
        pos: 0,
        system: TypeSystem::new(),
    };
    while !parser.is_at_end() {
        parser.parse_decl()?;
    }
    parser.system.validate()?;
    tracing::trace!(types = parser.system.len(), "loaded schema");
    Ok(parser.system)
}

impl Parser {
    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn error(&self, message: impl Into<String>) -> SchemaError {
        SchemaError::Syntax {
            line: self.line(),
            message: message.into(),
        }
    }

    fn ident(&mut self) -> Result<String, SchemaError> {
        match self.peek() {
            Some(Tok::Ident(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            other => Err(self.error(format!("expected identifier, found {other:?}"))),
        }
    }

    fn string(&mut self) -> Result<String, SchemaError> {
        match self.peek() {
            Some(Tok::Str(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            other => Err(self.error(format!("expected string literal, found {other:?}"))),
        }
    }

    fn expect(&mut self, c: char) -> Result<(), SchemaError> {
        if self.peek() == Some(&Tok::Punct(c)) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}', found {:?}", self.peek())))
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek() == Some(&Tok::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Ident(s)) if s == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_decl(&mut self) -> Result<(), SchemaError> {
        if !self.eat_keyword("type") {
            return Err(self.error("expected 'type'"));
        }
        let name = self.ident()?;
        let def = match self.peek() {
            Some(Tok::Punct('[')) => TypeDef::List(self.parse_list_body()?),
            Some(Tok::Punct('{')) => TypeDef::Map(self.parse_map_body()?),
            Some(Tok::Ident(word)) => match word.clone().as_str() {
                "enum" => {
                    self.pos += 1;
                    TypeDef::Enum(self.parse_enum()?)
                }
                "struct" => {
                    self.pos += 1;
                    TypeDef::Struct(self.parse_struct()?)
                }
                "union" => {
                    self.pos += 1;
                    TypeDef::Union(self.parse_union()?)
                }
                "any" => {
                    self.pos += 1;
                    TypeDef::Any
                }
                other => match ScalarKind::from_keyword(other) {
                    Some(kind) => {
                        self.pos += 1;
                        TypeDef::Scalar(kind)
                    }
                    None => return Err(self.error(format!("unknown type kind {other}"))),
                },
            },
            other => return Err(self.error(format!("expected type body, found {other:?}"))),
        };
        if self.system.type_by_name(&name).is_some() {
            return Err(SchemaError::DuplicateType(name));
        }
        self.system.accumulate(name, def)
    }

    fn parse_enum(&mut self) -> Result<EnumType, SchemaError> {
        self.expect('{')?;
        let mut e = EnumType::default();
        while self.eat_punct('|') {
            let member = self.ident()?;
            if self.eat_punct('(') {
                let wire = self.string()?;
                self.expect(')')?;
                e.renames.insert(member.clone(), wire);
            }
            if e.has_member(&member) {
                return Err(self.error(format!("duplicate enum member {member}")));
            }
            e.members.push(member);
        }
        self.expect('}')?;
        if self.eat_keyword("representation") && !self.eat_keyword("string") {
            return Err(self.error("enums support only the string representation"));
        }
        Ok(e)
    }

    fn parse_struct(&mut self) -> Result<StructType, SchemaError> {
        self.expect('{')?;
        let mut fields = Vec::new();
        let mut renames = BTreeMap::new();
        while !self.eat_punct('}') {
            if self.is_at_end() {
                return Err(self.error("unterminated struct"));
            }
            let mut field = StructField::new(self.ident()?, String::new());
            if self.eat_keyword("optional") {
                field.optional = true;
            }
            if self.eat_keyword("nullable") {
                field.nullable = true;
            }
            field.type_name = self.parse_type_ref()?;
            if self.eat_punct('(') {
                if !self.eat_keyword("rename") {
                    return Err(self.error("expected 'rename'"));
                }
                renames.insert(field.name.clone(), self.string()?);
                self.expect(')')?;
            }
            if fields.iter().any(|f: &StructField| f.name == field.name) {
                return Err(self.error(format!("duplicate field {}", field.name)));
            }
            fields.push(field);
        }
        if self.eat_keyword("representation") && !self.eat_keyword("map") {
            return Err(self.error("structs support only the map representation"));
        }
        Ok(StructType {
            fields,
            repr: StructRepr::Map { renames },
        })
    }

    fn parse_union(&mut self) -> Result<UnionType, SchemaError> {
        self.expect('{')?;
        let mut members = Vec::new();
        let mut discriminants = BTreeMap::new();
        while self.eat_punct('|') {
            let member = self.parse_type_ref()?;
            let discriminant = self.string()?;
            if discriminants.insert(discriminant.clone(), member.clone()).is_some() {
                return Err(self.error(format!("duplicate discriminant {discriminant:?}")));
            }
            members.push(member);
        }
        self.expect('}')?;
        if !self.eat_keyword("representation") {
            return Err(self.error("unions require a representation"));
        }
        let repr = if self.eat_keyword("keyed") {
            UnionRepr::Keyed { discriminants }
        } else if self.eat_keyword("stringprefix") {
            UnionRepr::StringPrefix {
                delimiter: self.string()?,
                discriminants,
            }
        } else {
            return Err(self.error("expected 'keyed' or 'stringprefix'"));
        };
        Ok(UnionType { members, repr })
    }

    fn parse_list_body(&mut self) -> Result<ListType, SchemaError> {
        self.expect('[')?;
        let value_nullable = self.eat_keyword("nullable");
        let value_type = self.parse_type_ref()?;
        self.expect(']')?;
        Ok(ListType {
            value_type,
            value_nullable,
        })
    }

    fn parse_map_body(&mut self) -> Result<MapType, SchemaError> {
        self.expect('{')?;
        let key_type = self.ident()?;
        self.expect(':')?;
        let value_nullable = self.eat_keyword("nullable");
        let value_type = self.parse_type_ref()?;
        self.expect('}')?;
        Ok(MapType {
            key_type,
            value_type,
            value_nullable,
        })
    }

    /// A type reference in field/member position. Inline list and map
    /// references are registered under a synthesized name.
    fn parse_type_ref(&mut self) -> Result<String, SchemaError> {
        match self.peek() {
            Some(Tok::Punct('[')) => {
                let list = self.parse_list_body()?;
                let name = if list.value_nullable {
                    format!("List__Nullable__{}", list.value_type)
                } else {
                    format!("List__{}", list.value_type)
                };
                self.system.accumulate(name.clone(), TypeDef::List(list))?;
                Ok(name)
            }
            Some(Tok::Punct('{')) => {
                let map = self.parse_map_body()?;
                let name = if map.value_nullable {
                    format!("Map__{}__Nullable__{}", map.key_type, map.value_type)
                } else {
                    format!("Map__{}__{}", map.key_type, map.value_type)
                };
                self.system.accumulate(name.clone(), TypeDef::Map(map))?;
                Ok(name)
            }
            _ => self.ident(),
        }
    }
}
