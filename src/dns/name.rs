/// Ensures `name` ends with a trailing dot (the normative FQDN form used
/// throughout the cache fingerprint and the wire encoder).
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Encodes a domain name in wire format. Never emits a compression pointer —
/// every name this resolver writes is either a client's own question (echoed
/// back) or a synthesized admin record, both short enough that the few extra
/// bytes of an uncompressed name are irrelevant.
pub fn encode_name(name: &str, out: &mut Vec<u8>) {
    let trimmed = name.trim_end_matches('.');
    if !trimmed.is_empty() {
        for label in trimmed.split('.') {
            let bytes = label.as_bytes();
            out.push(bytes.len() as u8);
            out.extend_from_slice(bytes);
        }
    }
    out.push(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fqdn_adds_trailing_dot() {
        assert_eq!(fqdn("google.bg"), "google.bg.");
        assert_eq!(fqdn("google.bg."), "google.bg.");
    }

    #[test]
    fn encode_name_root() {
        let mut out = Vec::new();
        encode_name(".", &mut out);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn encode_name_labels() {
        let mut out = Vec::new();
        encode_name("a.bg.", &mut out);
        assert_eq!(out, vec![1, b'a', 2, b'b', b'g', 0]);
    }
}
