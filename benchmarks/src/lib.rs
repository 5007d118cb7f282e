//! Criterion benchmarks for ectls; see `benches/`.

#![forbid(unsafe_code)]
