use super::{DnsHeader, DnsQuestion, DnsRecord, Reader};
use crate::error::DnsCachedError;
use crate::dns::types::Rcode;

/// A decoded DNS message: header, question section, and the three RR
/// sections. Kept whole for byte-faithful cache replay (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsMessage {
    pub header: DnsHeader,
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<DnsRecord>,
    pub authorities: Vec<DnsRecord>,
    pub additional: Vec<DnsRecord>,
}

impl DnsMessage {
    pub fn parse(buf: &[u8]) -> Result<Self, DnsCachedError> {
        let header = DnsHeader::parse(buf)?;
        let mut reader = Reader::new(buf);
        // Skip past the fixed header; the reader re-walks from byte 0 so that
        // name compression pointers (which are absolute offsets into the
        // whole message) resolve correctly.
        for _ in 0..DnsHeader::WIRE_LEN {
            reader.u8()?;
        }

        let mut questions = Vec::with_capacity(header.qdcount as usize);
        for _ in 0..header.qdcount {
            questions.push(DnsQuestion::parse(&mut reader)?);
        }

        let mut answers = Vec::with_capacity(header.ancount as usize);
        for _ in 0..header.ancount {
            answers.push(DnsRecord::parse(&mut reader)?);
        }

        let mut authorities = Vec::with_capacity(header.nscount as usize);
        for _ in 0..header.nscount {
            authorities.push(DnsRecord::parse(&mut reader)?);
        }

        let mut additional = Vec::with_capacity(header.arcount as usize);
        for _ in 0..header.arcount {
            additional.push(DnsRecord::parse(&mut reader)?);
        }

        Ok(Self {
            header,
            questions,
            answers,
            authorities,
            additional,
        })
    }

    pub fn to_wire(&self) -> Result<Vec<u8>, DnsCachedError> {
        let mut header = self.header.clone();
        header.qdcount = self.questions.len() as u16;
        header.ancount = self.answers.len() as u16;
        header.nscount = self.authorities.len() as u16;
        header.arcount = self.additional.len() as u16;

        let mut out = Vec::new();
        header.write(&mut out)?;
        for q in &self.questions {
            q.write(&mut out);
        }
        for r in self
            .answers
            .iter()
            .chain(&self.authorities)
            .chain(&self.additional)
        {
            r.write(&mut out);
        }
        Ok(out)
    }

    /// The minimum TTL across the answer section, or `None` if there are no
    /// answers (callers must reject empty-answer messages before caching —
    /// see `Cache::insert`).
    pub fn min_answer_ttl(&self) -> Option<u32> {
        self.answers.iter().map(|rr| rr.ttl).min()
    }

    pub fn rcode(&self) -> Rcode {
        Rcode::from(self.header.rcode)
    }

    /// Builds an outbound query for `questions`, with a fresh transaction ID
    /// and recursion desired — mirrors the original's `makeRequest`.
    pub fn new_query(id: u16, questions: Vec<DnsQuestion>) -> Self {
        Self {
            header: DnsHeader {
                id,
                qr: false,
                opcode: 0,
                aa: false,
                tc: false,
                rd: true,
                ra: false,
                z: 0,
                rcode: 0,
                qdcount: questions.len() as u16,
                ancount: 0,
                nscount: 0,
                arcount: 0,
            },
            questions,
            answers: Vec::new(),
            authorities: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Builds a reply to `request` carrying `source`'s answer/authority/
    /// additional sections, with the client's transaction ID and QR/flags
    /// substituted in (the DNS library's "set reply" semantics, spec.md §4.4).
    pub fn reply_from(request: &DnsMessage, source: &DnsMessage) -> Self {
        Self {
            header: DnsHeader {
                id: request.header.id,
                qr: true,
                opcode: request.header.opcode,
                aa: false,
                tc: false,
                rd: request.header.rd,
                ra: true,
                z: 0,
                rcode: source.header.rcode,
                qdcount: request.questions.len() as u16,
                ancount: source.answers.len() as u16,
                nscount: source.authorities.len() as u16,
                arcount: source.additional.len() as u16,
            },
            questions: request.questions.clone(),
            answers: source.answers.clone(),
            authorities: source.authorities.clone(),
            additional: source.additional.clone(),
        }
    }

    /// Builds an error reply to `request` with no answer sections — used for
    /// SERVFAIL-on-exhaustion and for relaying a non-NOERROR upstream rcode.
    pub fn error_reply(request: &DnsMessage, rcode: Rcode) -> Self {
        Self {
            header: DnsHeader {
                id: request.header.id,
                qr: true,
                opcode: request.header.opcode,
                aa: false,
                tc: false,
                rd: request.header.rd,
                ra: true,
                z: 0,
                rcode: rcode.into(),
                qdcount: request.questions.len() as u16,
                ancount: 0,
                nscount: 0,
                arcount: 0,
            },
            questions: request.questions.clone(),
            answers: Vec::new(),
            authorities: Vec::new(),
            additional: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{DnsClass, DnsType};
    use std::net::Ipv4Addr;

    fn question(name: &str) -> DnsQuestion {
        DnsQuestion {
            name: name.to_string(),
            qtype: DnsType::A,
            qclass: DnsClass::In,
        }
    }

    #[test]
    fn round_trips_a_answer() {
        let mut msg = DnsMessage::new_query(42, vec![question("google.bg.")]);
        msg.header.qr = true;
        msg.answers.push(DnsRecord::new_a(
            "google.bg.",
            Ipv4Addr::new(93, 123, 23, 52),
            300,
        ));

        let wire = msg.to_wire().unwrap();
        let parsed = DnsMessage::parse(&wire).unwrap();

        assert_eq!(parsed.header.id, 42);
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].name, "google.bg.");
        assert_eq!(parsed.answers.len(), 1);
        assert_eq!(parsed.answers[0].ttl, 300);
        assert_eq!(parsed.min_answer_ttl(), Some(300));
    }

    #[test]
    fn reply_from_substitutes_client_id() {
        let request = DnsMessage::new_query(7, vec![question("example.com.")]);
        let mut upstream = DnsMessage::new_query(999, vec![question("example.com.")]);
        upstream.header.qr = true;
        upstream.answers.push(DnsRecord::new_a(
            "example.com.",
            Ipv4Addr::new(1, 1, 1, 1),
            60,
        ));

        let reply = DnsMessage::reply_from(&request, &upstream);
        assert_eq!(reply.header.id, 7);
        assert!(reply.header.qr);
        assert_eq!(reply.answers.len(), 1);
    }

    #[test]
    fn compressed_name_round_trip() {
        // Hand-build a minimal message with a second question... actually
        // exercise compression via an answer pointing back at the question name.
        let mut msg = DnsMessage::new_query(1, vec![question("a.bg.")]);
        msg.header.qr = true;
        // Encode the question manually, then splice a compressed answer name
        // pointing at offset 12 (start of the question name) to mimic what a
        // real upstream sends.
        let mut wire = msg.to_wire().unwrap();
        // answer: pointer(0xC0,0x0C) + type A + class IN + ttl + rdlen + ip
        wire.extend_from_slice(&[0xC0, 0x0C]);
        wire.extend_from_slice(&u16::from(DnsType::A).to_be_bytes());
        wire.extend_from_slice(&u16::from(DnsClass::In).to_be_bytes());
        wire.extend_from_slice(&300u32.to_be_bytes());
        wire.extend_from_slice(&4u16.to_be_bytes());
        wire.extend_from_slice(&[9, 9, 9, 9]);
        // fix up ancount
        wire[6] = 0;
        wire[7] = 1;

        let parsed = DnsMessage::parse(&wire).unwrap();
        assert_eq!(parsed.answers.len(), 1);
        assert_eq!(parsed.answers[0].name, "a.bg.");
    }
}
