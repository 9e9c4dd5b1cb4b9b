use std::net::{Ipv4Addr, Ipv6Addr};

use super::name::encode_name;
use super::{DnsClass, DnsType, Reader};
use crate::error::DnsCachedError;

/// Record data. Typed for A/AAAA (the only types the cache or the admin
/// surface construct or inspect); everything else is carried as the raw
/// RDATA bytes so pass-through relay stays byte-faithful without this crate
/// needing to understand every record type in existence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Raw(Vec<u8>),
}

impl RData {
    pub fn len(&self) -> usize {
        match self {
            RData::A(_) => 4,
            RData::Aaaa(_) => 16,
            RData::Raw(bytes) => bytes.len(),
        }
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        match self {
            RData::A(addr) => out.extend_from_slice(&addr.octets()),
            RData::Aaaa(addr) => out.extend_from_slice(&addr.octets()),
            RData::Raw(bytes) => out.extend_from_slice(bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: String,
    pub rtype: DnsType,
    pub rclass: DnsClass,
    pub ttl: u32,
    pub rdata: RData,
}

impl DnsRecord {
    pub fn new_a(name: impl Into<String>, addr: Ipv4Addr, ttl: u32) -> Self {
        Self {
            name: name.into(),
            rtype: DnsType::A,
            rclass: DnsClass::In,
            ttl,
            rdata: RData::A(addr),
        }
    }

    pub fn new_aaaa(name: impl Into<String>, addr: Ipv6Addr, ttl: u32) -> Self {
        Self {
            name: name.into(),
            rtype: DnsType::Aaaa,
            rclass: DnsClass::In,
            ttl,
            rdata: RData::Aaaa(addr),
        }
    }

    pub fn parse(reader: &mut Reader<'_>) -> Result<Self, DnsCachedError> {
        let name = reader.name()?;
        let rtype = DnsType::from(reader.u16()?);
        let rclass = DnsClass::from(reader.u16()?);
        let ttl = reader.u32()?;
        let rdlength = reader.u16()? as usize;

        let rdata = match rtype {
            DnsType::A if rdlength == 4 => {
                let bytes = reader.bytes(4)?;
                RData::A(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]))
            }
            DnsType::Aaaa if rdlength == 16 => {
                let bytes = reader.bytes(16)?;
                let mut octets = [0u8; 16];
                octets.copy_from_slice(bytes);
                RData::Aaaa(Ipv6Addr::from(octets))
            }
            _ => RData::Raw(reader.bytes(rdlength)?.to_vec()),
        };

        Ok(Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        encode_name(&self.name, out);
        out.extend_from_slice(&u16::from(self.rtype).to_be_bytes());
        out.extend_from_slice(&u16::from(self.rclass).to_be_bytes());
        out.extend_from_slice(&self.ttl.to_be_bytes());
        out.extend_from_slice(&(self.rdata.len() as u16).to_be_bytes());
        self.rdata.write(out);
    }
}
