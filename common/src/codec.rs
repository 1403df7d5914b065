//! Wire framing for the two discovery messages.
//!
//! One codec, two encodings: the text framing used over plain UDP
//! broadcast and the fixed binary framing used over the peer link.
//! Which one a deployment speaks is configuration; everything above
//! this module handles `Message` values only.

use std::str::FromStr;

use crate::error::{DiscoveryError, ParseError};
use crate::types::DeviceType;

/// Request tag, both the text frame itself and the payload of the
/// binary request.
pub const REQUEST_TAG: &str = "DISCOVER";
/// Prefix of the text response frame.
pub const RESPONSE_TAG: &str = "RESPONSE";
/// Largest datagram either side will read. Bytes past the parsed
/// message are ignored.
pub const MAX_DATAGRAM: usize = 128;

const KIND_REQUEST: u8 = 0;
const KIND_RESPONSE: u8 = 1;
const BINARY_REQUEST_PAYLOAD: usize = 32;
const BINARY_REQUEST_LEN: usize = 1 + BINARY_REQUEST_PAYLOAD;
const BINARY_RESPONSE_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    #[default]
    Text,
    Binary,
}

impl FromStr for WireFormat {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(WireFormat::Text),
            "binary" => Ok(WireFormat::Binary),
            other => Err(DiscoveryError::Config(format!(
                "unknown wire format {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryResponse {
    pub device_type: DeviceType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Request(DiscoveryRequest),
    Response(DiscoveryResponse),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Codec {
    format: WireFormat,
}

impl Codec {
    pub fn new(format: WireFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    pub fn encode_request(&self) -> Vec<u8> {
        match self.format {
            WireFormat::Text => REQUEST_TAG.as_bytes().to_vec(),
            WireFormat::Binary => {
                let mut frame = Vec::with_capacity(BINARY_REQUEST_LEN);
                frame.push(KIND_REQUEST);
                let mut payload = [0u8; BINARY_REQUEST_PAYLOAD];
                payload[..REQUEST_TAG.len()].copy_from_slice(REQUEST_TAG.as_bytes());
                frame.extend_from_slice(&payload);
                frame
            }
        }
    }

    pub fn encode_response(&self, device_type: DeviceType) -> Vec<u8> {
        match self.format {
            WireFormat::Text => {
                format!("{} {}", RESPONSE_TAG, device_type.wire_name()).into_bytes()
            }
            WireFormat::Binary => vec![KIND_RESPONSE, device_type.ordinal()],
        }
    }

    pub fn decode(&self, frame: &[u8]) -> Result<Message, ParseError> {
        match self.format {
            WireFormat::Text => decode_text(frame),
            WireFormat::Binary => decode_binary(frame),
        }
    }
}

fn decode_text(frame: &[u8]) -> Result<Message, ParseError> {
    // Both tags are eight bytes; anything shorter cannot carry a kind.
    if frame.len() < REQUEST_TAG.len() {
        return Err(ParseError::TruncatedFrame(frame.len()));
    }
    if frame.starts_with(REQUEST_TAG.as_bytes()) {
        return Ok(Message::Request(DiscoveryRequest {
            tag: REQUEST_TAG.to_string(),
        }));
    }
    if frame.starts_with(RESPONSE_TAG.as_bytes()) {
        let rest = &frame[RESPONSE_TAG.len()..];
        if rest.len() < 2 {
            return Err(ParseError::TruncatedFrame(frame.len()));
        }
        if rest[0] != b' ' {
            return Err(ParseError::Malformed("missing type delimiter"));
        }
        let token_bytes = rest[1..]
            .split(|b| *b == 0 || b.is_ascii_whitespace())
            .next()
            .unwrap_or(&[]);
        if token_bytes.is_empty() {
            return Err(ParseError::Malformed("empty type name"));
        }
        let token = String::from_utf8_lossy(token_bytes);
        return match DeviceType::from_wire_name(&token) {
            Some(device_type) => Ok(Message::Response(DiscoveryResponse { device_type })),
            None => Err(ParseError::UnknownDeviceType(token.into_owned())),
        };
    }
    Err(ParseError::UnknownKind)
}

fn decode_binary(frame: &[u8]) -> Result<Message, ParseError> {
    let kind = *frame.first().ok_or(ParseError::TruncatedFrame(0))?;
    match kind {
        KIND_REQUEST => {
            if frame.len() < BINARY_REQUEST_LEN {
                return Err(ParseError::TruncatedFrame(frame.len()));
            }
            let payload = &frame[1..BINARY_REQUEST_LEN];
            let tag_bytes = payload.split(|b| *b == 0).next().unwrap_or(&[]);
            Ok(Message::Request(DiscoveryRequest {
                tag: String::from_utf8_lossy(tag_bytes).into_owned(),
            }))
        }
        KIND_RESPONSE => {
            if frame.len() < BINARY_RESPONSE_LEN {
                return Err(ParseError::TruncatedFrame(frame.len()));
            }
            match DeviceType::from_ordinal(frame[1]) {
                Some(device_type) => {
                    Ok(Message::Response(DiscoveryResponse { device_type }))
                }
                None => Err(ParseError::UnknownDeviceType(frame[1].to_string())),
            }
        }
        _ => Err(ParseError::UnknownKind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_round_trips_for_every_type() {
        for format in [WireFormat::Text, WireFormat::Binary] {
            let codec = Codec::new(format);
            for ty in DeviceType::ALL {
                let frame = codec.encode_response(ty);
                match codec.decode(&frame).unwrap() {
                    Message::Response(resp) => assert_eq!(resp.device_type, ty),
                    other => panic!("expected response, got {:?}", other),
                }
            }
        }
    }

    #[test]
    fn request_round_trips_in_both_formats() {
        for format in [WireFormat::Text, WireFormat::Binary] {
            let codec = Codec::new(format);
            let frame = codec.encode_request();
            match codec.decode(&frame).unwrap() {
                Message::Request(req) => assert_eq!(req.tag, REQUEST_TAG),
                other => panic!("expected request, got {:?}", other),
            }
        }
    }

    #[test]
    fn short_frames_are_truncated_not_read_past() {
        let text = Codec::new(WireFormat::Text);
        assert_eq!(text.decode(b"abc"), Err(ParseError::TruncatedFrame(3)));
        assert_eq!(text.decode(b""), Err(ParseError::TruncatedFrame(0)));
        // Tag present but no room for a delimited type name.
        assert_eq!(text.decode(b"RESPONSE"), Err(ParseError::TruncatedFrame(8)));
        assert_eq!(text.decode(b"RESPONSE "), Err(ParseError::TruncatedFrame(9)));

        let binary = Codec::new(WireFormat::Binary);
        assert_eq!(binary.decode(&[]), Err(ParseError::TruncatedFrame(0)));
        assert_eq!(binary.decode(&[0u8]), Err(ParseError::TruncatedFrame(1)));
        assert_eq!(binary.decode(&[0u8; 16]), Err(ParseError::TruncatedFrame(16)));
        assert_eq!(binary.decode(&[1u8]), Err(ParseError::TruncatedFrame(1)));
    }

    #[test]
    fn unknown_discriminants_are_rejected() {
        let text = Codec::new(WireFormat::Text);
        assert_eq!(text.decode(b"NONSENSE FRAME"), Err(ParseError::UnknownKind));

        let binary = Codec::new(WireFormat::Binary);
        assert_eq!(binary.decode(&[9u8, 1]), Err(ParseError::UnknownKind));
    }

    #[test]
    fn unknown_type_names_surface_as_typed_errors() {
        let text = Codec::new(WireFormat::Text);
        assert_eq!(
            text.decode(b"RESPONSE FOO"),
            Err(ParseError::UnknownDeviceType("FOO".to_string()))
        );

        let binary = Codec::new(WireFormat::Binary);
        assert_eq!(
            binary.decode(&[1u8, 9]),
            Err(ParseError::UnknownDeviceType("9".to_string()))
        );
    }

    #[test]
    fn bytes_past_the_message_are_ignored() {
        let text = Codec::new(WireFormat::Text);
        assert!(matches!(
            text.decode(b"DISCOVER-and-some-trailing-noise"),
            Ok(Message::Request(_))
        ));
        match text.decode(b"RESPONSE CAM extra tokens").unwrap() {
            Message::Response(resp) => assert_eq!(resp.device_type, DeviceType::Cam),
            other => panic!("expected response, got {:?}", other),
        }

        let binary = Codec::new(WireFormat::Binary);
        let mut frame = binary.encode_response(DeviceType::Router);
        frame.extend_from_slice(&[0xaa; 16]);
        match binary.decode(&frame).unwrap() {
            Message::Response(resp) => assert_eq!(resp.device_type, DeviceType::Router),
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[test]
    fn malformed_text_responses_are_rejected() {
        let text = Codec::new(WireFormat::Text);
        assert_eq!(
            text.decode(b"RESPONSE_CAM"),
            Err(ParseError::Malformed("missing type delimiter"))
        );
        assert_eq!(
            text.decode(b"RESPONSE \0\0"),
            Err(ParseError::Malformed("empty type name"))
        );
    }
}
