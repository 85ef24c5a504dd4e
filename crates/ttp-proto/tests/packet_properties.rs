//! Property-based tests for the packet codec.

use std::time::Duration;

use bytes::Bytes;
use proptest::prelude::*;
use ttp_proto::{Packet, decode_packet, encode_packet};

const WINDOW: Duration = Duration::from_millis(50);

fn arbitrary_header() -> impl Strategy<Value = i32> {
    prop_oneof![
        Just(0),
        Just(1),
        Just(100),
        Just(101),
        Just(102),
        Just(103),
        Just(200),
        Just(201),
        any::<i32>(),
    ]
}

fn arbitrary_body() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..1024)
}

fn arbitrary_packet() -> impl Strategy<Value = Packet> {
    (arbitrary_header(), arbitrary_body(), any::<u16>())
        .prop_map(|(header, body, footer)| Packet::raw(header, Bytes::from(body), footer))
}

proptest! {
    #[test]
    fn prop_packet_round_trip(packet in arbitrary_packet()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let decoded = rt.block_on(async {
            let (mut client, mut server) = tokio::io::duplex(64 * 1024);
            encode_packet(&mut client, &packet).await.unwrap();
            decode_packet(&mut server, WINDOW).await.unwrap()
        });
        prop_assert_eq!(decoded, packet);
    }

    #[test]
    fn prop_display_string_is_always_bracketed(packet in arbitrary_packet()) {
        let s = packet.to_string();
        prop_assert!(s.starts_with('['));
        prop_assert!(s.ends_with(']'));
    }

    #[test]
    fn prop_footer_survives_encoding(header in arbitrary_header(), footer in any::<u16>()) {
        let packet = Packet::raw(header, Bytes::new(), footer);
        prop_assert_eq!(packet.footer(), footer);
    }
}
