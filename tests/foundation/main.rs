//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, ActorId, and the error families.
