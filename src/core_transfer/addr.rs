//! Address and port codecs for PASV replies and PORT arguments.
//!
//! The packed `u32` form keeps the four dotted octets at bit offsets
//! 0/8/16/24, first octet in the low byte. That layout is shared with the
//! controller and must not depend on host integer representation, so packing
//! is done octet by octet.

use crate::core_transfer::envelope::ProtocolError;

pub fn pack_octets(octets: [u8; 4]) -> u32 {
    u32::from(octets[0])
        | u32::from(octets[1]) << 8
        | u32::from(octets[2]) << 16
        | u32::from(octets[3]) << 24
}

pub fn unpack_octets(packed: u32) -> [u8; 4] {
    [
        packed as u8,
        (packed >> 8) as u8,
        (packed >> 16) as u8,
        (packed >> 24) as u8,
    ]
}

/// Parses a PORT argument of the form `o0,o1,o2,o3,p_hi,p_lo`.
///
/// Clients are allowed to leave line terminators or stray spaces in the
/// argument; those are stripped before parsing. Returns the packed peer
/// address and the peer port (`p_hi * 256 + p_lo`).
pub fn parse_port_argument(arg: &str) -> Result<(u32, u16), ProtocolError> {
    let cleaned: String = arg
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | ' '))
        .collect();

    let malformed = || ProtocolError::MalformedPortArgument(arg.to_string());

    let fields: Vec<u8> = cleaned
        .split(',')
        .map(|part| part.parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| malformed())?;
    if fields.len() != 6 {
        return Err(malformed());
    }

    let peer_ip = pack_octets([fields[0], fields[1], fields[2], fields[3]]);
    let peer_port = u16::from(fields[4]) | u16::from(fields[5]) << 8;
    Ok((peer_ip, peer_port))
}

/// Formats the canonical PASV reply text. The controller prepends the FTP
/// status code; this string itself is what clients parse, byte for byte.
pub fn format_pasv_reply(octets: [u8; 4], port: u16) -> String {
    format!(
        "Entering PASV mode ({},{},{},{},{},{})",
        octets[0],
        octets[1],
        octets[2],
        octets[3],
        port / 256,
        port % 256
    )
}
