//! Text processing: cleanup and token counting

mod clean;
mod tokenizer;

pub use clean::TextCleaner;
pub use tokenizer::{
    estimate_tokens, load_token_counter, HeuristicCounter, SharedTokenCounter, TiktokenCounter,
    TokenCounter,
};
