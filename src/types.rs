//! Common types used throughout fhir-stream
//!
//! Records are opaque documents: the pipeline batches and forwards them
//! without validating or transforming their contents.

// ============================================================================
// Type Aliases
// ============================================================================

/// One domain entity returned by the upstream API (e.g. a FHIR bundle entry)
pub type Record = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, serde_json::Value>;
