use serde::Serialize;
use tracing::debug;

use super::interpreter::{AnswerInterpreter, Answers, PassthroughPreprocessor, TextPreprocessor};
use crate::core::config::ResolverConfig;
use crate::toolkit::body_parts::BodyPartTable;
use crate::toolkit::search::ConceptResolver;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictorOptions {
    /// Also resolve the tokens of body-part answers.
    pub search_body_parts: bool,
    /// Restrict body-part tokens to the part's subtrees.
    pub pruning: bool,
}

impl Default for PredictorOptions {
    fn default() -> Self {
        Self {
            search_body_parts: true,
            pruning: true,
        }
    }
}

impl From<&ResolverConfig> for PredictorOptions {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            search_body_parts: config.search_body_parts,
            pruning: config.pruning,
        }
    }
}


/// Concepts found for one sentence and every token that was tried.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentencePrediction {
    pub predictions: Vec<String>,
    pub tokens: Vec<String>,
}


pub struct Predictor<'a, P: TextPreprocessor = PassthroughPreprocessor> {
    resolver: &'a ConceptResolver,
    body_parts: &'a BodyPartTable,
    interpreter: AnswerInterpreter<P>,
    options: PredictorOptions,
}

impl<'a> Predictor<'a> {
    pub fn new(resolver: &'a ConceptResolver, body_parts: &'a BodyPartTable, options: PredictorOptions) -> Self {
        Self::with_interpreter(resolver, body_parts, AnswerInterpreter::default(), options)
    }
}

impl<'a, P: TextPreprocessor> Predictor<'a, P> {
    pub fn with_interpreter(
        resolver: &'a ConceptResolver,
        body_parts: &'a BodyPartTable,
        interpreter: AnswerInterpreter<P>,
        options: PredictorOptions,
    ) -> Self {
        Self {
            resolver,
            body_parts,
            interpreter,
            options,
        }
    }


    /// Symptom tokens are matched against the whole index; body-part tokens
    /// against the pruned index, or the whole one with pruning off.
    pub fn predict(&self, answers: &Answers) -> SentencePrediction {
        let tokens = self.interpreter.tokens_for_answers(answers, self.body_parts);
        let mut out = SentencePrediction::default();

        for token in tokens.symptoms {
            let result = self.resolver.resolve_symptom_token(&token);
            if let Some(id) = result.concept_id() {
                out.predictions.push(id.to_string());
            }
            out.tokens.push(token);
        }

        if self.options.search_body_parts {
            for (body_part, body_tokens) in tokens.body_parts {
                for token in body_tokens {
                    let result = if self.options.pruning {
                        self.resolver.resolve_body_part_token(&token, &body_part)
                    } else {
                        self.resolver.resolve_symptom_token(&token)
                    };
                    if let Some(id) = result.concept_id() {
                        out.predictions.push(id.to_string());
                    }
                    out.tokens.push(token);
                }
            }
        }

        debug!(
            "Predicted {} concepts from {} tokens",
            out.predictions.len(),
            out.tokens.len()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::answers::interpreter::QuestionKey;
    use crate::toolkit::body_parts::BodyPart;
    use crate::toolkit::search::resolver::tests::sample_resolver;

    fn table() -> BodyPartTable {
        BodyPartTable::from_parts(vec![
            BodyPart::new(2, vec!["chest".into()]).with_root_nodes(vec!["chest pain".into()]),
        ])
        .unwrap()
    }

    fn answers() -> Answers {
        let mut answers = Answers::new();
        answers.insert(QuestionKey::Symptoms, "headache and dizziness".into());
        answers.insert(QuestionKey::ProblemBodyPart(2), "fever".into());
        answers
    }

    #[test]
    fn test_predict_with_body_parts() {
        let resolver = sample_resolver(0.1);
        let table = table();
        let predictor = Predictor::new(&resolver, &table, PredictorOptions::default());

        let out = predictor.predict(&answers());
        assert_eq!(out.tokens, vec!["headache", "dizziness", "fever chest"]);
        assert_eq!(out.predictions, vec!["C0018681", "C0008031"]);
    }

    #[test]
    fn test_predict_without_body_part_search() {
        let resolver = sample_resolver(0.1);
        let table = table();
        let options = PredictorOptions {
            search_body_parts: false,
            pruning: true,
        };

        let out = Predictor::new(&resolver, &table, options).predict(&answers());
        assert_eq!(out.tokens, vec!["headache", "dizziness"]);
        assert_eq!(out.predictions, vec!["C0018681"]);
    }

    #[test]
    fn test_options_from_config() {
        let config = ResolverConfig {
            pruning: false,
            ..ResolverConfig::default()
        };
        let options = PredictorOptions::from(&config);
        assert!(options.search_body_parts);
        assert!(!options.pruning);
    }
}
