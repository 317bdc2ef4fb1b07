//! Registration against editor hosts
//!
//! Uses the in-memory registry plus recording and failing hosts to check that registration
//! runs its steps in order, repeats safely, and surfaces host rejections.

use pipe_syntax::dsl::language::LanguageConfiguration;
use pipe_syntax::dsl::registry::{HostError, LanguageInfo};
use pipe_syntax::dsl::{
    build_grammar, grammar, register, EditorHost, LanguageRegistry, LexicalGrammar,
    RegistrationError, LANGUAGE_ID,
};
use std::sync::Arc;

/// Records every call made against it
#[derive(Default)]
struct RecordingHost {
    calls: Vec<String>,
}

impl EditorHost for RecordingHost {
    fn register_language(&mut self, info: LanguageInfo) -> Result<(), HostError> {
        self.calls.push(format!("register:{}", info.id));
        Ok(())
    }

    fn set_tokens_provider(
        &mut self,
        id: &str,
        _grammar: Arc<LexicalGrammar>,
    ) -> Result<(), HostError> {
        self.calls.push(format!("tokens:{}", id));
        Ok(())
    }

    fn set_language_configuration(
        &mut self,
        id: &str,
        _configuration: LanguageConfiguration,
    ) -> Result<(), HostError> {
        self.calls.push(format!("configuration:{}", id));
        Ok(())
    }
}

/// Rejects the tokenizer step
struct RejectingHost;

impl EditorHost for RejectingHost {
    fn register_language(&mut self, _info: LanguageInfo) -> Result<(), HostError> {
        Ok(())
    }

    fn set_tokens_provider(
        &mut self,
        _id: &str,
        _grammar: Arc<LexicalGrammar>,
    ) -> Result<(), HostError> {
        Err(HostError::new("monaco is not loaded"))
    }

    fn set_language_configuration(
        &mut self,
        _id: &str,
        _configuration: LanguageConfiguration,
    ) -> Result<(), HostError> {
        panic!("configuration must not be installed after a failed step");
    }
}

#[test]
fn steps_run_in_order() {
    let mut host = RecordingHost::default();
    register(&mut host, &grammar()).unwrap();
    assert_eq!(
        host.calls,
        vec![
            "register:imageDsl",
            "tokens:imageDsl",
            "configuration:imageDsl"
        ]
    );
}

#[test]
fn registering_twice_matches_registering_once() {
    let shared = grammar();

    let mut once = LanguageRegistry::new();
    register(&mut once, &shared).unwrap();

    let mut twice = LanguageRegistry::new();
    register(&mut twice, &shared).unwrap();
    register(&mut twice, &shared).unwrap();

    assert_eq!(twice.len(), once.len());
    assert_eq!(twice.ids().collect::<Vec<_>>(), once.ids().collect::<Vec<_>>());
    assert_eq!(twice.language(LANGUAGE_ID), once.language(LANGUAGE_ID));
    assert_eq!(
        twice.configuration(LANGUAGE_ID),
        once.configuration(LANGUAGE_ID)
    );
    assert!(Arc::ptr_eq(
        twice.tokens_provider(LANGUAGE_ID).unwrap(),
        once.tokens_provider(LANGUAGE_ID).unwrap()
    ));
}

#[test]
fn re_registration_overwrites_the_provider() {
    let mut registry = LanguageRegistry::new();
    let first = Arc::new(build_grammar());
    let second = Arc::new(build_grammar());

    register(&mut registry, &first).unwrap();
    register(&mut registry, &second).unwrap();

    assert_eq!(registry.len(), 1);
    assert!(Arc::ptr_eq(
        registry.tokens_provider(LANGUAGE_ID).unwrap(),
        &second
    ));
    // the registry holds no extra reference to the replaced grammar
    assert_eq!(Arc::strong_count(&first), 1);
}

#[test]
fn host_rejection_is_reported() {
    let err = register(&mut RejectingHost, &grammar()).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::Tokenizer {
            id: LANGUAGE_ID.to_string(),
            source: HostError::new("monaco is not loaded"),
        }
    );
    assert_eq!(
        err.to_string(),
        "editor host rejected tokenizer for 'imageDsl': monaco is not loaded"
    );
}

#[test]
fn registered_grammar_tokenizes() {
    let mut registry = LanguageRegistry::new();
    register(&mut registry, &grammar()).unwrap();

    let provider = registry.tokens_provider(LANGUAGE_ID).unwrap();
    assert_eq!(provider.classify_word("sobel_x").as_str(), "keyword");
    assert_eq!(provider.classify_word("rgb").as_str(), "predefined");
}
