use crate::land::normalize_address;

/// Deterministic owner tint via CRC32 hash of the normalized address.
/// Returns (r, g, b) from first 3 bytes of hash.
pub fn owner_color(address: &str) -> (u8, u8, u8) {
    let hash = crc32fast::hash(normalize_address(address).as_bytes());
    let bytes = hash.to_be_bytes();
    (bytes[0], bytes[1], bytes[2])
}

#[cfg(test)]
mod tests {
    use super::owner_color;

    #[test]
    fn owner_color_is_deterministic() {
        assert_eq!(owner_color("0xAbC1"), owner_color("0xAbC1"));
    }

    #[test]
    fn owner_color_ignores_address_case() {
        assert_eq!(owner_color("0xABC1"), owner_color("0xabc1"));
    }

    #[test]
    fn owner_color_varies_for_different_owners() {
        assert_ne!(owner_color("0x01"), owner_color("0x02"));
    }
}
