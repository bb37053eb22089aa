//! Static lookup tables for JA3 numeric identifiers.

/// Cipher suite IDs and their handshake identifiers.
///
/// Only suites in this table can be offered; an ID outside it aborts
/// fingerprint construction.
const CIPHER_SUITES: &[(u16, &str)] = &[
    (4865, "TLS_AES_128_GCM_SHA256"),
    (4866, "TLS_AES_256_GCM_SHA384"),
    (4867, "TLS_CHACHA20_POLY1305_SHA256"),
    (49195, "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256"),
    (49199, "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"),
    (49196, "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384"),
    (49200, "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384"),
    (52393, "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256"),
    (52392, "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256"),
    (49171, "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA"),
    (49172, "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA"),
    (156, "TLS_RSA_WITH_AES_128_GCM_SHA256"),
    (157, "TLS_RSA_WITH_AES_256_GCM_SHA384"),
    (47, "TLS_RSA_WITH_AES_128_CBC_SHA"),
    (53, "TLS_RSA_WITH_AES_256_CBC_SHA"),
];

/// Supported-group IDs and their curve names for the TLS backend.
const CURVES: &[(u16, &str)] = &[
    (29, "x25519"),
    (23, "P-256"),
    (24, "P-384"),
    (25, "P-521"),
];

/// Translate a numeric cipher suite ID to its handshake identifier.
pub fn cipher_suite_name(id: u16) -> Option<&'static str> {
    CIPHER_SUITES
        .iter()
        .find(|(cid, _)| *cid == id)
        .map(|(_, name)| *name)
}

/// Translate a supported-group ID to a curve name, if known.
pub fn curve_name(id: u16) -> Option<&'static str> {
    CURVES.iter().find(|(gid, _)| *gid == id).map(|(_, name)| *name)
}
