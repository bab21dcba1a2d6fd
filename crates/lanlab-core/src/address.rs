//! IPv4 address validation
//!
//! Parsing is strict decimal: exactly four dot-separated octets, each made of
//! one to three ASCII digits with no leading zero (a lone `0` is fine), no
//! whitespace and no sign. The boolean helpers never fail; `parse_ipv4` and
//! `parse_mask` report why an address was rejected.

use std::net::Ipv4Addr;

use crate::error::AddressError;

/// Mask assigned to freshly placed devices (/24)
pub const DEFAULT_SUBNET_MASK: &str = "255.255.255.0";

/// Parse a dotted-quad IPv4 address
pub fn parse_ipv4(text: &str) -> Result<Ipv4Addr, AddressError> {
    if text.is_empty() {
        return Err(AddressError::Empty);
    }

    let segments: Vec<&str> = text.split('.').collect();
    if segments.len() != 4 {
        return Err(AddressError::OctetCount {
            text: text.to_string(),
            count: segments.len(),
        });
    }

    let mut octets = [0u8; 4];
    for (slot, segment) in octets.iter_mut().zip(&segments) {
        let well_formed = !segment.is_empty()
            && segment.len() <= 3
            && segment.bytes().all(|b| b.is_ascii_digit())
            && !(segment.len() > 1 && segment.starts_with('0'));
        if !well_formed {
            return Err(AddressError::InvalidOctet {
                text: text.to_string(),
                octet: segment.to_string(),
            });
        }

        let value: u32 = segment.parse().map_err(|_| AddressError::InvalidOctet {
            text: text.to_string(),
            octet: segment.to_string(),
        })?;
        *slot = u8::try_from(value).map_err(|_| AddressError::OutOfRange {
            text: text.to_string(),
            value,
        })?;
    }

    Ok(Ipv4Addr::from(octets))
}

/// Parse a subnet mask, requiring a contiguous run of leading one bits
pub fn parse_mask(text: &str) -> Result<Ipv4Addr, AddressError> {
    let mask = parse_ipv4(text)?;
    let bits = u32::from(mask);
    if bits.leading_ones() + bits.trailing_zeros() != 32 {
        return Err(AddressError::NonContiguousMask(text.to_string()));
    }
    Ok(mask)
}

/// True iff `text` is four decimal octets in 0..=255
pub fn is_valid_ip(text: &str) -> bool {
    parse_ipv4(text).is_ok()
}

/// True iff `text` is a valid address in 10/8, 172.16/12 or 192.168/16
pub fn is_private_ip(text: &str) -> bool {
    match parse_ipv4(text) {
        Ok(addr) => {
            let [a, b, _, _] = addr.octets();
            a == 10 || (a == 172 && (16..=31).contains(&b)) || (a == 192 && b == 168)
        }
        Err(_) => false,
    }
}

/// True iff both addresses share the same network under `mask`
///
/// Any unparsable input yields `false`.
pub fn is_in_same_subnet(a: &str, b: &str, mask: &str) -> bool {
    match (parse_ipv4(a), parse_ipv4(b), parse_ipv4(mask)) {
        (Ok(a), Ok(b), Ok(mask)) => {
            let mask = u32::from(mask);
            u32::from(a) & mask == u32::from(b) & mask
        }
        _ => false,
    }
}

/// Same-subnet test under the default /24 mask
pub fn is_in_same_default_subnet(a: &str, b: &str) -> bool {
    is_in_same_subnet(a, b, DEFAULT_SUBNET_MASK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        assert!(is_valid_ip("192.168.1.1"));
        assert!(is_valid_ip("0.0.0.0"));
        assert!(is_valid_ip("255.255.255.255"));
        assert!(is_valid_ip("8.8.8.8"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_valid_ip("256.1.1.1"));
        assert!(!is_valid_ip(""));
        assert!(!is_valid_ip("10.0.0"));
        assert!(!is_valid_ip("10.0.0.1.5"));
        assert!(!is_valid_ip("10..0.1"));
        assert!(!is_valid_ip("10.0.0.a"));
        assert!(!is_valid_ip("-1.0.0.1"));
        assert!(!is_valid_ip("+1.0.0.1"));
        assert!(!is_valid_ip(" 10.0.0.1"));
        assert!(!is_valid_ip("10.0.0.1 "));
        assert!(!is_valid_ip("1000.0.0.1"));
    }

    #[test]
    fn test_leading_zeros_rejected() {
        assert!(!is_valid_ip("192.168.01.1"));
        assert!(!is_valid_ip("00.0.0.0"));
        assert!(is_valid_ip("192.168.0.1"));
    }

    #[test]
    fn test_parse_reports_reason() {
        assert_eq!(parse_ipv4(""), Err(AddressError::Empty));
        assert!(matches!(parse_ipv4("1.2.3"), Err(AddressError::OctetCount { count: 3, .. })));
        assert!(matches!(parse_ipv4("1.2.3.300"), Err(AddressError::OutOfRange { value: 300, .. })));
        assert!(matches!(parse_ipv4("1.2.x.4"), Err(AddressError::InvalidOctet { .. })));
    }

    #[test]
    fn test_private_ranges() {
        assert!(is_private_ip("10.0.0.5"));
        assert!(is_private_ip("172.20.5.5"));
        assert!(is_private_ip("172.16.0.1"));
        assert!(is_private_ip("172.31.255.255"));
        assert!(is_private_ip("192.168.1.10"));
        assert!(!is_private_ip("172.32.0.1"));
        assert!(!is_private_ip("172.15.0.1"));
        assert!(!is_private_ip("192.169.1.1"));
        assert!(!is_private_ip("8.8.8.8"));
        assert!(!is_private_ip(""));
        assert!(!is_private_ip("10.0.0.256"));
    }

    #[test]
    fn test_same_subnet() {
        assert!(is_in_same_default_subnet("192.168.1.10", "192.168.1.20"));
        assert!(!is_in_same_default_subnet("192.168.1.10", "192.168.2.10"));
        assert!(is_in_same_subnet("10.1.2.3", "10.200.0.1", "255.0.0.0"));
        assert!(!is_in_same_subnet("10.1.2.3", "", DEFAULT_SUBNET_MASK));
        assert!(!is_in_same_subnet("10.1.2.3", "10.1.2.4", "bogus"));
    }

    #[test]
    fn test_mask_contiguity() {
        assert!(parse_mask("255.255.255.0").is_ok());
        assert!(parse_mask("255.255.240.0").is_ok());
        assert!(parse_mask("0.0.0.0").is_ok());
        assert!(matches!(parse_mask("255.0.255.0"), Err(AddressError::NonContiguousMask(_))));
    }
}
