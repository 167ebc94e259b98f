use anyhow::bail;
use bytes::{Buf, BufMut};
use bytes_varint::try_get_fixed::TryGetFixedSupport;

/// The fixed-size header prefixing every packet on the wire. All four fields are serialized
///  explicitly as big-endian u32 - the header is never cast over raw buffer memory, so the
///  layout is identical on every platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketHeader {
    pub sequence: u32,
    pub ack: u32,
    pub ack_bitfield: u32,
}

impl PacketHeader {
    pub const PROTOCOL_VERSION: u32 = 0;

    /// Fixed tag in the top 3 bits of the magic field. XORing it out must yield the protocol
    ///  version, otherwise the packet came from an incompatible or garbage sender.
    pub const MAGIC_TAG: u32 = 0b101 << 29;

    pub const SERIALIZED_LEN: usize = 4 * size_of::<u32>();

    pub fn ser(&self, buf: &mut impl BufMut) {
        buf.put_u32(Self::PROTOCOL_VERSION ^ Self::MAGIC_TAG);
        buf.put_u32(self.sequence);
        buf.put_u32(self.ack);
        buf.put_u32(self.ack_bitfield);
    }

    pub fn deser(buf: &mut impl Buf) -> anyhow::Result<PacketHeader> {
        let magic = buf.try_get_u32()?;
        let version = magic ^ Self::MAGIC_TAG;
        if version != Self::PROTOCOL_VERSION {
            bail!("unsupported protocol version {}", version);
        }

        let sequence = buf.try_get_u32()?;
        let ack = buf.try_get_u32()?;
        let ack_bitfield = buf.try_get_u32()?;
        Ok(PacketHeader {
            sequence,
            ack,
            ack_bitfield,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use rstest::rstest;

    #[rstest]
    #[case::initial(0, 0, 0)]
    #[case::small(1, 0, 0)]
    #[case::with_ack(17, 16, 0xffff_0000)]
    #[case::all_bits(9999, 9998, 0xffff_ffff)]
    #[case::max(u32::MAX, u32::MAX, u32::MAX)]
    fn test_ser_deser(#[case] sequence: u32, #[case] ack: u32, #[case] ack_bitfield: u32) {
        let original = PacketHeader { sequence, ack, ack_bitfield };

        let mut buf = BytesMut::new();
        original.ser(&mut buf);
        assert_eq!(buf.len(), PacketHeader::SERIALIZED_LEN);

        let mut b: &[u8] = &buf;
        let deser = PacketHeader::deser(&mut b).unwrap();
        assert!(b.is_empty());
        assert_eq!(deser, original);
    }

    #[test]
    fn test_wire_layout() {
        let header = PacketHeader {
            sequence: 0x01020304,
            ack: 0x05060708,
            ack_bitfield: 0x090a0b0c,
        };

        let mut buf = BytesMut::new();
        header.ser(&mut buf);

        assert_eq!(buf.as_ref(), &[
            0xa0, 0, 0, 0,
            1, 2, 3, 4,
            5, 6, 7, 8,
            9, 0xa, 0xb, 0xc,
        ]);
    }

    #[rstest]
    #[case::version_off_by_one(vec![0xa0, 0, 0, 1, 0,0,0,0, 0,0,0,0, 0,0,0,0])]
    #[case::missing_tag(vec![0, 0, 0, 0, 0,0,0,0, 0,0,0,0, 0,0,0,0])]
    #[case::wrong_tag(vec![0x20, 0, 0, 0, 0,0,0,0, 0,0,0,0, 0,0,0,0])]
    #[case::truncated(vec![0xa0, 0, 0, 0, 0, 0])]
    #[case::empty(vec![])]
    fn test_deser_rejects(#[case] bytes: Vec<u8>) {
        let mut b: &[u8] = &bytes;
        assert!(PacketHeader::deser(&mut b).is_err());
    }
}
