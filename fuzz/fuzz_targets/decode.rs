#![no_main]

use libfuzzer_sys::fuzz_target;
use lodestone_config::{CodecConfig, TreeTagPolicy};
use lodestone_protocol::ser::NetworkReadExt;
use lodestone_protocol::{PacketBuf, RawPacket};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };

    let mut config = CodecConfig::default();
    if selector & 0x80 != 0 {
        config.nbt.tag_policy = TreeTagPolicy::Lenient;
    }
    let mut buf = PacketBuf::from(rest).with_config(config);

    // Errors are expected, panics are not
    let _ = match selector & 0x07 {
        0 => buf.get_var_int().map(drop),
        1 => buf.get_string().map(drop),
        2 => buf
            .get_end_of_sequence_terminated(|buf| {
                let index = buf.get_u8_be()?;
                let value = buf.get_var_int()?;
                Ok((index, value))
            })
            .map(drop),
        3 => buf
            .get_continuation_terminated(|buf, index| Ok((index, buf.get_u8_be()?)))
            .map(drop),
        4 => buf.get_optional_nbt().map(drop),
        5 => buf.get_list(|buf| buf.get_identifier()).map(drop),
        6 => buf.get_block_pos().map(drop),
        _ => RawPacket::read(&mut buf).map(drop),
    };
});
