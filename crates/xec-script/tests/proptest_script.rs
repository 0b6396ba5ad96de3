//! Property tests for the op codec and script iteration.

use proptest::prelude::*;

use xec_primitives::ser::{BytesReader, BytesWriter};
use xec_script::{push_bytes_op, read_op, write_op, Op, Script};

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        // Plain opcodes outside the push range.
        (0x4fu8..=0xff).prop_map(Op::Code),
        Just(Op::Code(0x00)),
        // Minimal pushes of arbitrary payloads.
        proptest::collection::vec(any::<u8>(), 0..300)
            .prop_map(|data| push_bytes_op(data).unwrap()),
    ]
}

proptest! {
    #[test]
    fn prop_op_codec_roundtrip(op in arb_op()) {
        let mut writer = BytesWriter::new();
        write_op(&op, &mut writer).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = BytesReader::new(&bytes);
        prop_assert_eq!(read_op(&mut reader).unwrap(), op);
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn prop_script_ops_roundtrip(ops in proptest::collection::vec(arb_op(), 0..32)) {
        let script = Script::from_ops(ops.clone()).unwrap();
        let decoded: Vec<Op> = script.ops().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(decoded, ops);
    }

    #[test]
    fn prop_strip_codeseps_idempotent(ops in proptest::collection::vec(arb_op(), 0..32)) {
        let script = Script::from_ops(ops).unwrap();
        let stripped = script.strip_codeseps().unwrap();
        prop_assert_eq!(stripped.strip_codeseps().unwrap(), stripped.clone());
        prop_assert!(!stripped.as_bytes().iter().any(|&b| b == 0xab)
            || stripped.ops().filter_map(Result::ok).all(|op| op != Op::Code(0xab)));
    }
}
