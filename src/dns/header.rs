use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use std::io::Cursor;

use crate::error::DnsCachedError;

/// The 12-byte DNS message header (RFC 1035 §4.1.1). The flag byte and the
/// rcode/z nibble don't fall on byte boundaries, so this is the one place in
/// the codec that reaches for `bitstream_io` rather than the plain cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub qr: bool,
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: u8,
    pub rcode: u8,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl DnsHeader {
    pub const WIRE_LEN: usize = 12;

    pub fn write(&self, out: &mut Vec<u8>) -> Result<(), DnsCachedError> {
        let mut writer = BitWriter::endian(&mut *out, BigEndian);
        writer
            .write_var::<u16>(16, self.id)
            .and_then(|_| writer.write_var::<u8>(1, self.qr as u8))
            .and_then(|_| writer.write_var::<u8>(4, self.opcode))
            .and_then(|_| writer.write_var::<u8>(1, self.aa as u8))
            .and_then(|_| writer.write_var::<u8>(1, self.tc as u8))
            .and_then(|_| writer.write_var::<u8>(1, self.rd as u8))
            .and_then(|_| writer.write_var::<u8>(1, self.ra as u8))
            .and_then(|_| writer.write_var::<u8>(3, self.z))
            .and_then(|_| writer.write_var::<u8>(4, self.rcode))
            .and_then(|_| writer.write_var::<u16>(16, self.qdcount))
            .and_then(|_| writer.write_var::<u16>(16, self.ancount))
            .and_then(|_| writer.write_var::<u16>(16, self.nscount))
            .and_then(|_| writer.write_var::<u16>(16, self.arcount))
            .map_err(|e| DnsCachedError::Decode(format!("header encode: {e}")))
    }

    pub fn parse(buf: &[u8]) -> Result<Self, DnsCachedError> {
        if buf.len() < Self::WIRE_LEN {
            return Err(DnsCachedError::Decode("message shorter than header".into()));
        }
        let mut reader = BitReader::endian(Cursor::new(buf), BigEndian);
        let read = || -> std::io::Result<DnsHeader> {
            let id = reader.read_var::<u16>(16)?;
            let qr = reader.read_var::<u8>(1)? == 1;
            let opcode = reader.read_var::<u8>(4)?;
            let aa = reader.read_var::<u8>(1)? == 1;
            let tc = reader.read_var::<u8>(1)? == 1;
            let rd = reader.read_var::<u8>(1)? == 1;
            let ra = reader.read_var::<u8>(1)? == 1;
            let z = reader.read_var::<u8>(3)?;
            let rcode = reader.read_var::<u8>(4)?;
            let qdcount = reader.read_var::<u16>(16)?;
            let ancount = reader.read_var::<u16>(16)?;
            let nscount = reader.read_var::<u16>(16)?;
            let arcount = reader.read_var::<u16>(16)?;
            Ok(DnsHeader {
                id,
                qr,
                opcode,
                aa,
                tc,
                rd,
                ra,
                z,
                rcode,
                qdcount,
                ancount,
                nscount,
                arcount,
            })
        };
        read().map_err(|e| DnsCachedError::Decode(format!("header decode: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let header = DnsHeader {
            id: 0xBEEF,
            qr: true,
            opcode: 0,
            aa: false,
            tc: false,
            rd: true,
            ra: true,
            z: 0,
            rcode: 3,
            qdcount: 1,
            ancount: 0,
            nscount: 0,
            arcount: 0,
        };
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(buf.len(), DnsHeader::WIRE_LEN);
        let parsed = DnsHeader::parse(&buf).unwrap();
        assert_eq!(parsed, header);
    }
}
