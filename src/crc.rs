/// Dallas/Maxim CRC-8 (x^8 + x^5 + x^4 + 1), continuing from `crc`
pub fn compute_partial_crc8(crc: u8, data: &[u8]) -> u8 {
    let mut crc = crc;
    for byte in data.iter() {
        let mut byte = *byte;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0x00 {
                crc ^= 0x8C;
            }
            byte >>= 1;
        }
    }
    crc
}

pub fn compute_crc8(data: &[u8]) -> u8 {
    compute_partial_crc8(0u8, data)
}

/// Checks a sequence whose last byte is the CRC-8 of everything before it.
/// An empty sequence carries no CRC and never validates.
pub fn validate_crc8(data: &[u8]) -> bool {
    match data.split_last() {
        Some((crc, payload)) => compute_crc8(payload) == *crc,
        None => false,
    }
}
