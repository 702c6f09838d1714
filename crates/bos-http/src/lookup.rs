// crates/bos-http/src/lookup.rs
// ============================================================================
// Module: Request Lookup Traits
// Description: Transport-agnostic accessors for header and body fields.
// Purpose: Let the context resolver read a request without depending on any
//          concrete HTTP server or client type.
// Dependencies: none
// ============================================================================

/// Reads a named header value from an inbound request.
///
/// Header names are matched case-sensitively by this crate (callers adapting
/// a real server's header map are expected to normalise case at the edge,
/// the way most HTTP server crates already do internally).
pub trait HeaderLookup {
    /// Returns the value of `name`, if present.
    fn header(&self, name: &str) -> Option<&str>;
}

/// Reads a named field from a parsed request body.
///
/// Field presence is meaningful: a command body that omits `business_id`
/// entirely is not the same as one that supplies a mismatched value, so
/// implementations must return `None` only when the field is genuinely
/// absent.
pub trait BodyLookup {
    /// Returns the value of `name`, if present.
    fn field(&self, name: &str) -> Option<&str>;
}
