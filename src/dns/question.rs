use super::{DnsClass, DnsType, Reader};
use super::name::encode_name;
use crate::error::DnsCachedError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String,
    pub qtype: DnsType,
    pub qclass: DnsClass,
}

impl DnsQuestion {
    pub fn parse(reader: &mut Reader<'_>) -> Result<Self, DnsCachedError> {
        let name = reader.name()?;
        let qtype = DnsType::from(reader.u16()?);
        let qclass = DnsClass::from(reader.u16()?);
        Ok(Self {
            name,
            qtype,
            qclass,
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        encode_name(&self.name, out);
        out.extend_from_slice(&u16::from(self.qtype).to_be_bytes());
        out.extend_from_slice(&u16::from(self.qclass).to_be_bytes());
    }
}
