//! Monarch export
//!
//!     The browser editor consumes tokenizers in the declarative Monarch format. Exporting the
//!     grammar from here keeps the site's highlighting identical to what [crate::dsl::tokenizer]
//!     produces. Rule and case order is part of the format's semantics, so everything that
//!     carries order is serialized as a sequence or an ordered map.

use crate::dsl::grammar::{Action, LexicalGrammar, Rule};
use crate::dsl::mode::{Mode, Transition};
use crate::dsl::token::TokenKind;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Ordered `cases` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Cases(pub Vec<(String, String)>);

impl Serialize for Cases {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (guard, token) in &self.0 {
            map.serialize_entry(guard, token)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MonarchAction {
    Token(String),
    Cases {
        cases: Cases,
    },
    Action {
        token: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        bracket: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        next: Option<String>,
    },
}

/// `[regex, action]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonarchRule(pub String, pub MonarchAction);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonarchBracket {
    pub open: String,
    pub close: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonarchTokenizer {
    pub root: Vec<MonarchRule>,
    pub string: Vec<MonarchRule>,
    pub comment: Vec<MonarchRule>,
}

/// A Monarch language definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonarchDefinition {
    pub default_token: String,
    pub keywords: Vec<String>,
    pub operators: Vec<String>,
    pub builtin_functions: Vec<String>,
    pub brackets: Vec<MonarchBracket>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    pub tokenizer: MonarchTokenizer,
}

fn next_state(transition: Transition) -> Option<String> {
    match transition {
        Transition::Stay => None,
        Transition::Next(mode) => Some(format!("@{}", mode.name())),
        Transition::Push => Some("@push".to_string()),
        Transition::Pop => Some("@pop".to_string()),
    }
}

fn export_rule(rule: &Rule) -> MonarchRule {
    let action = match rule.action() {
        Action::Emit {
            kind,
            bracket: None,
            transition: Transition::Stay,
        } => MonarchAction::Token(kind.as_str().to_string()),
        Action::Emit {
            kind,
            bracket,
            transition,
        } => MonarchAction::Action {
            token: kind.as_str().to_string(),
            bracket: bracket.map(|b| b.as_str().to_string()),
            next: next_state(transition),
        },
        Action::Words => MonarchAction::Cases {
            cases: Cases(vec![
                ("@keywords".into(), TokenKind::Keyword.as_str().into()),
                ("@builtinFunctions".into(), TokenKind::Predefined.as_str().into()),
                ("@default".into(), TokenKind::Identifier.as_str().into()),
            ]),
        },
        Action::Symbols => MonarchAction::Cases {
            cases: Cases(vec![
                ("@operators".into(), TokenKind::Operator.as_str().into()),
                ("@default".into(), TokenKind::Unclassified.as_str().into()),
            ]),
        },
        Action::Brackets => MonarchAction::Token("@brackets".to_string()),
    };
    MonarchRule(rule.source().to_string(), action)
}

impl MonarchDefinition {
    pub fn from_grammar(grammar: &LexicalGrammar) -> Self {
        let rules = |mode: Mode| grammar.rules(mode).iter().map(export_rule).collect();

        Self {
            default_token: String::new(),
            keywords: grammar.keywords().to_vec(),
            operators: grammar.operators().to_vec(),
            builtin_functions: grammar.builtins().to_vec(),
            brackets: grammar
                .brackets()
                .iter()
                .map(|pair| MonarchBracket {
                    open: pair.open.to_string(),
                    close: pair.close.to_string(),
                    token: pair.kind.as_str().to_string(),
                })
                .collect(),
            attributes: grammar
                .attributes()
                .iter()
                .map(|(name, source)| (name.to_string(), source.to_string()))
                .collect(),
            tokenizer: MonarchTokenizer {
                root: rules(Mode::Root),
                string: rules(Mode::String),
                comment: rules(Mode::Comment),
            },
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::grammar::build_grammar;
    use serde_json::json;

    fn exported() -> serde_json::Value {
        serde_json::to_value(MonarchDefinition::from_grammar(&build_grammar())).unwrap()
    }

    #[test]
    fn test_word_tables() {
        let json = exported();
        assert_eq!(json["keywords"][0], "grayscale");
        assert_eq!(json["builtinFunctions"][9], "b");
        assert_eq!(json["operators"][6], "=>");
        assert_eq!(json["defaultToken"], "");
    }

    #[test]
    fn test_attributes_are_top_level() {
        let json = exported();
        assert_eq!(json["digits"], r"[0-9]+(_+[0-9]*)*");
        assert!(json["escapes"].as_str().unwrap().starts_with(r"\\(?:"));
    }

    #[test]
    fn test_rules_and_actions() {
        let json = exported();
        let root = &json["tokenizer"]["root"];
        assert_eq!(root[0][0], "[a-zA-Z_][a-zA-Z0-9_]*");
        assert_eq!(root[3], json!(["(@digits)", "number"]));
        assert_eq!(
            root[5],
            json!(["\"", {"token": "string.quote", "bracket": "@open", "next": "@string"}])
        );
        assert_eq!(root[9], json!(["[{}()\\[\\]]", "@brackets"]));

        let comment = &json["tokenizer"]["comment"];
        assert_eq!(comment[1][1]["next"], "@push");
        assert_eq!(comment[2][1]["next"], "@pop");
    }

    #[test]
    fn test_case_order_is_preserved() {
        let text = MonarchDefinition::from_grammar(&build_grammar())
            .to_json_pretty()
            .unwrap();
        let keywords = text.find("\"@keywords\"").unwrap();
        let builtins = text.find("\"@builtinFunctions\"").unwrap();
        let default = text.find("\"@default\"").unwrap();
        assert!(keywords < builtins && builtins < default);

        let root = text.find("\"root\"").unwrap();
        let string = text.find("\"string\": [").unwrap();
        let comment = text.find("\"comment\": [").unwrap();
        assert!(root < string && string < comment);
    }
}
