/// The cache's admission policy tag. Only `Default` has distinct behavior
/// (hard capacity ceiling, no displacement); `KeepMostUsed` is accepted at
/// config-validation time but is a no-op alias, per spec.md §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Default,
    KeepMostUsed,
}

impl Policy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Policy::Default),
            "keep-most-used" => Some(Policy::KeepMostUsed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_policy() {
        assert_eq!(Policy::parse("lru"), None);
    }

    #[test]
    fn accepts_known_policies() {
        assert_eq!(Policy::parse("default"), Some(Policy::Default));
        assert_eq!(Policy::parse("keep-most-used"), Some(Policy::KeepMostUsed));
    }
}
