use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("expected a JSON command frame on the command channel")]
    NotJson,
    #[error("failed to decode command frame: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unknown command code {0}")]
    UnknownCommand(u32),
    #[error("command code {0} is not valid as a request")]
    UnexpectedCommand(u32),
    #[error("malformed PORT argument: {0:?}")]
    MalformedPortArgument(String),
}

/// Command codes exchanged between the controller and the transfer worker.
///
/// The integer values are the wire contract; both sides must agree on them,
/// so they are fixed here and covered by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandCode {
    PasvStandbyReq = 101,
    PasvStandbyRes = 102,
    PortStandbyReq = 103,
    PortStandbyRes = 104,
    TryConnectReq = 105,
    TryConnectRes = 106,
    SendCommandReq = 107,
    SendCommandRes = 108,
    FileUploadReq = 109,
    FileUploadRes = 110,
    FileDownloadReq = 111,
    FileDownloadRes = 112,
    AbortReq = 113,
}

impl CommandCode {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for CommandCode {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            101 => Ok(CommandCode::PasvStandbyReq),
            102 => Ok(CommandCode::PasvStandbyRes),
            103 => Ok(CommandCode::PortStandbyReq),
            104 => Ok(CommandCode::PortStandbyRes),
            105 => Ok(CommandCode::TryConnectReq),
            106 => Ok(CommandCode::TryConnectRes),
            107 => Ok(CommandCode::SendCommandReq),
            108 => Ok(CommandCode::SendCommandRes),
            109 => Ok(CommandCode::FileUploadReq),
            110 => Ok(CommandCode::FileUploadRes),
            111 => Ok(CommandCode::FileDownloadReq),
            112 => Ok(CommandCode::FileDownloadRes),
            113 => Ok(CommandCode::AbortReq),
            other => Err(ProtocolError::UnknownCommand(other)),
        }
    }
}

/// The JSON command unit carried between controller and worker.
///
/// Requests fill `cmdtype` and, where a payload is needed, `content`.
/// Responses fill all three fields. `status` and `content` default when a
/// peer omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFrame {
    pub cmdtype: u32,
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub content: String,
}

impl CommandFrame {
    pub fn request(code: CommandCode) -> Self {
        Self {
            cmdtype: code.as_u32(),
            status: false,
            content: String::new(),
        }
    }

    pub fn request_with(code: CommandCode, content: impl Into<String>) -> Self {
        Self {
            cmdtype: code.as_u32(),
            status: false,
            content: content.into(),
        }
    }

    pub fn response(code: CommandCode, status: bool, content: impl Into<String>) -> Self {
        Self {
            cmdtype: code.as_u32(),
            status,
            content: content.into(),
        }
    }

    pub fn code(&self) -> Result<CommandCode, ProtocolError> {
        CommandCode::try_from(self.cmdtype)
    }

    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Where an envelope came from or is headed. Routing metadata only; command
/// handlers never consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Controller,
    Client,
    Unset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Binary,
}

/// Payload of an envelope. Command frames stay typed while they travel
/// in-process; raw bytes are what the relay writes to the client untouched.
#[derive(Debug, Clone)]
pub enum EnvelopeBody {
    Command(CommandFrame),
    Raw(Vec<u8>),
}

/// The unit of exchange between the transfer worker, the controller and the
/// client data socket.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub body: EnvelopeBody,
    pub source: Endpoint,
    pub destination: Endpoint,
}

impl Envelope {
    pub fn command(frame: CommandFrame) -> Self {
        Self {
            body: EnvelopeBody::Command(frame),
            source: Endpoint::Unset,
            destination: Endpoint::Unset,
        }
    }

    pub fn raw(bytes: Vec<u8>) -> Self {
        Self {
            body: EnvelopeBody::Raw(bytes),
            source: Endpoint::Unset,
            destination: Endpoint::Unset,
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self.body {
            EnvelopeBody::Command(_) => ContentType::Json,
            EnvelopeBody::Raw(_) => ContentType::Binary,
        }
    }

    /// Serializes the payload for a byte boundary. Command frames go out as
    /// their JSON encoding, raw payloads as-is.
    pub fn to_wire(&self) -> Result<Vec<u8>, ProtocolError> {
        match &self.body {
            EnvelopeBody::Command(frame) => frame.encode(),
            EnvelopeBody::Raw(bytes) => Ok(bytes.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_codes_are_stable() {
        assert_eq!(CommandCode::PasvStandbyReq.as_u32(), 101);
        assert_eq!(CommandCode::PasvStandbyRes.as_u32(), 102);
        assert_eq!(CommandCode::PortStandbyReq.as_u32(), 103);
        assert_eq!(CommandCode::PortStandbyRes.as_u32(), 104);
        assert_eq!(CommandCode::TryConnectReq.as_u32(), 105);
        assert_eq!(CommandCode::TryConnectRes.as_u32(), 106);
        assert_eq!(CommandCode::SendCommandReq.as_u32(), 107);
        assert_eq!(CommandCode::SendCommandRes.as_u32(), 108);
        assert_eq!(CommandCode::FileUploadReq.as_u32(), 109);
        assert_eq!(CommandCode::FileUploadRes.as_u32(), 110);
        assert_eq!(CommandCode::FileDownloadReq.as_u32(), 111);
        assert_eq!(CommandCode::FileDownloadRes.as_u32(), 112);
        assert_eq!(CommandCode::AbortReq.as_u32(), 113);
    }

    #[test]
    fn frame_round_trips_through_json() {
        let frame = CommandFrame::response(CommandCode::FileDownloadRes, true, "10000 bytes");
        let bytes = frame.encode().unwrap();
        let back = CommandFrame::decode(&bytes).unwrap();
        assert_eq!(back, frame);
        assert_eq!(back.code().unwrap(), CommandCode::FileDownloadRes);
    }

    #[test]
    fn missing_fields_default() {
        let back = CommandFrame::decode(br#"{"cmdtype":101}"#).unwrap();
        assert_eq!(back.code().unwrap(), CommandCode::PasvStandbyReq);
        assert!(!back.status);
        assert!(back.content.is_empty());
    }

    #[test]
    fn unknown_code_is_rejected() {
        let frame = CommandFrame::decode(br#"{"cmdtype":9999}"#).unwrap();
        assert!(matches!(
            frame.code(),
            Err(ProtocolError::UnknownCommand(9999))
        ));
    }

    #[test]
    fn envelope_content_type_follows_body() {
        let env = Envelope::command(CommandFrame::request(CommandCode::TryConnectReq));
        assert_eq!(env.content_type(), ContentType::Json);
        let env = Envelope::raw(b"150 data".to_vec());
        assert_eq!(env.content_type(), ContentType::Binary);
        assert_eq!(env.to_wire().unwrap(), b"150 data".to_vec());
    }
}
