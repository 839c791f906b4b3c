use atem_scan_rs::error::InterfaceError;
use atem_scan_rs::netdetect::{candidate_range, ipv4_to_default_cidr, resolve_interface_ipv4};
use std::collections::HashSet;
use std::net::Ipv4Addr;

#[test]
fn default_cidr_is_24() {
    let cidr = ipv4_to_default_cidr(Ipv4Addr::new(192, 168, 42, 99));
    assert_eq!(cidr.to_string(), "192.168.42.0/24");
}

#[test]
fn range_covers_every_neighbour_exactly_once() {
    let seed = Ipv4Addr::new(192, 168, 42, 99);
    let range = candidate_range(seed);
    let unique: HashSet<_> = range.iter().copied().collect();
    assert_eq!(range.len(), 254);
    assert_eq!(unique.len(), 254);

    for k in 1..=255u8 {
        let ip = Ipv4Addr::new(192, 168, 42, k);
        assert_eq!(unique.contains(&ip), k != 99, "unexpected membership for {ip}");
    }
}

#[test]
fn seed_at_either_edge_is_excluded() {
    for last in [1u8, 255] {
        let seed = Ipv4Addr::new(10, 20, 30, last);
        let range = candidate_range(seed);
        assert_eq!(range.len(), 254);
        assert!(!range.contains(&seed));
        assert!(range.iter().all(|ip| ip.octets()[..3] == [10, 20, 30]));
    }
}

#[test]
fn unknown_interface_is_not_found() {
    let err = resolve_interface_ipv4("atem-no-such-if0").unwrap_err();
    assert!(matches!(err, InterfaceError::NotFound { .. }), "got {err:?}");
    assert!(err.to_string().contains("atem-no-such-if0"));
}
