use bytestream::{ByteReader, ByteWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    U8(u8),
    I16(i16),
    U32(u32),
    I64(i64),
    Str(Vec<u8>),
    Raw(Vec<u8>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::U8),
        any::<i16>().prop_map(Op::I16),
        any::<u32>().prop_map(Op::U32),
        any::<i64>().prop_map(Op::I64),
        prop::collection::vec(1u8..=255, 0..32).prop_map(Op::Str),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Op::Raw),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = ByteWriter::new();
        for op in &ops {
            match op {
                Op::U8(v) => writer.write_u8(*v),
                Op::I16(v) => writer.write_i16(*v),
                Op::U32(v) => writer.write_u32(*v),
                Op::I64(v) => writer.write_i64(*v),
                Op::Str(s) => writer.write_cstr(s),
                Op::Raw(b) => writer.write_bytes(b),
            }
        }
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        for op in &ops {
            match op {
                Op::U8(v) => prop_assert_eq!(reader.read_u8().unwrap(), *v),
                Op::I16(v) => prop_assert_eq!(reader.read_i16().unwrap(), *v),
                Op::U32(v) => prop_assert_eq!(reader.read_u32().unwrap(), *v),
                Op::I64(v) => prop_assert_eq!(reader.read_i64().unwrap(), *v),
                Op::Str(s) => prop_assert_eq!(reader.read_cstr().unwrap(), s.as_slice()),
                Op::Raw(b) => prop_assert_eq!(reader.read_bytes(b.len()).unwrap(), b.as_slice()),
            }
        }
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn prop_reader_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut reader = ByteReader::new(&data);
        loop {
            let before = reader.position();
            if reader.read_cstr().is_err() && reader.read_u16().is_err() && reader.read_u8().is_err() {
                break;
            }
            prop_assert!(reader.position() > before);
        }
        prop_assert!(reader.remaining() <= 1);
    }
}
