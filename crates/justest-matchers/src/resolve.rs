//! Extractors shared by the built-in matchers.

use justest_core::{
    ChannelExtractor, FuncExtractor, Kind, PointerExtractor, T, Value, ValueExtractor,
    extract_same_value, extractor_unsupported,
};

/// Resolves channels and functions, keeps everything else as is.
pub fn standard() -> ValueExtractor {
    ValueExtractor::new(extract_same_value)
        .with(Kind::Chan, ChannelExtractor::new(true))
        .with(Kind::Func, FuncExtractor::new(true))
}

/// Resolves to text-bearing values, following pointers.
pub fn textual() -> ValueExtractor {
    ValueExtractor::new(extractor_unsupported)
        .with(Kind::String, extract_same_value)
        .with(Kind::Bytes, extract_same_value)
        .with(Kind::Pointer, PointerExtractor::new(true))
        .with(Kind::Chan, ChannelExtractor::new(true))
        .with(Kind::Func, FuncExtractor::new(true))
}

/// Resolves every actual through `ve`, failing if one is not available yet.
pub fn resolve_all(t: &dyn T, ve: &ValueExtractor, actuals: &[Value]) -> Vec<Value> {
    actuals
        .iter()
        .enumerate()
        .map(|(i, v)| resolve(t, ve, i, v))
        .collect()
}

/// Resolves actual number `idx`.
pub fn resolve(t: &dyn T, ve: &ValueExtractor, idx: usize, v: &Value) -> Value {
    match ve.extract(t, v) {
        Some(resolved) => resolved,
        None => t.fatal(format!("Actual {idx} is not available yet: {v:?}")),
    }
}
