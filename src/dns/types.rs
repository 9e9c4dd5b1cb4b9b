/// A DNS RR type. Only A and AAAA are distinguished — every other code point
/// passes through as `Other`, since the resolver only ever inspects A/AAAA
/// questions (spec.md §3: "the core treats DNS messages as opaque values...
/// except where it inspects question type").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsType {
    A,
    Aaaa,
    Other(u16),
}

impl DnsType {
    /// The cache fingerprint mnemonic for this type, or `None` if the type is
    /// not cacheable.
    pub fn mnemonic(self) -> Option<&'static str> {
        match self {
            DnsType::A => Some("A"),
            DnsType::Aaaa => Some("AAAA"),
            DnsType::Other(_) => None,
        }
    }
}

impl From<u16> for DnsType {
    fn from(value: u16) -> Self {
        match value {
            1 => DnsType::A,
            28 => DnsType::Aaaa,
            other => DnsType::Other(other),
        }
    }
}

impl From<DnsType> for u16 {
    fn from(value: DnsType) -> Self {
        match value {
            DnsType::A => 1,
            DnsType::Aaaa => 28,
            DnsType::Other(code) => code,
        }
    }
}

/// A DNS RR class. The resolver only ever speaks class IN, but preserves
/// whatever class a pass-through query or upstream answer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsClass {
    In,
    Other(u16),
}

impl From<u16> for DnsClass {
    fn from(value: u16) -> Self {
        match value {
            1 => DnsClass::In,
            other => DnsClass::Other(other),
        }
    }
}

impl From<DnsClass> for u16 {
    fn from(value: DnsClass) -> Self {
        match value {
            DnsClass::In => 1,
            DnsClass::Other(code) => code,
        }
    }
}

impl Default for DnsClass {
    fn default() -> Self {
        DnsClass::In
    }
}

/// DNS response codes this resolver assigns itself. Upstream rcodes outside
/// this set are preserved numerically via `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rcode {
    NoError,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,
    Other(u8),
}

impl Rcode {
    pub fn is_success(self) -> bool {
        matches!(self, Rcode::NoError)
    }
}

impl From<u8> for Rcode {
    fn from(value: u8) -> Self {
        match value {
            0 => Rcode::NoError,
            1 => Rcode::FormatError,
            2 => Rcode::ServerFailure,
            3 => Rcode::NameError,
            4 => Rcode::NotImplemented,
            5 => Rcode::Refused,
            other => Rcode::Other(other),
        }
    }
}

impl From<Rcode> for u8 {
    fn from(value: Rcode) -> Self {
        match value {
            Rcode::NoError => 0,
            Rcode::FormatError => 1,
            Rcode::ServerFailure => 2,
            Rcode::NameError => 3,
            Rcode::NotImplemented => 4,
            Rcode::Refused => 5,
            Rcode::Other(code) => code,
        }
    }
}
