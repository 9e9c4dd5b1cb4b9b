use crate::dns::{DnsType, fqdn};

/// The normative cache key for a single-question A/AAAA query:
/// `FQDN(name) || type-mnemonic || "."`, always dot-terminated. Earlier
/// revisions of this resolver built the key inconsistently (some call sites
/// skipped the trailing dot); every caller now goes through this one
/// function (spec.md §9).
pub fn fingerprint(name: &str, qtype: DnsType) -> Option<String> {
    let mnemonic = qtype.mnemonic()?;
    Some(format!("{}{}.", fqdn(name), mnemonic))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_dot_terminated_key() {
        assert_eq!(
            fingerprint("google.bg", DnsType::A),
            Some("google.bg.A.".to_string())
        );
        assert_eq!(
            fingerprint("google.bg.", DnsType::Aaaa),
            Some("google.bg.AAAA.".to_string())
        );
    }

    #[test]
    fn non_cacheable_type_has_no_fingerprint() {
        assert_eq!(fingerprint("example.com", DnsType::Other(15)), None);
    }
}
