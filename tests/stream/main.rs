//! Integration tests for Layer 1: Stream
//!
//! Tests for the input cursor, excision, and the path tokenizer.
