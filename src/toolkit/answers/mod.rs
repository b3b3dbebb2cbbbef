

pub mod interpreter;
pub mod predictor;

pub use interpreter::{
    split_on_conjunctions, AnswerError, AnswerInterpreter, AnswerTokens, Answers, PassthroughPreprocessor,
    QuestionKey, TextPreprocessor,
};
pub use predictor::{Predictor, PredictorOptions, SentencePrediction};
