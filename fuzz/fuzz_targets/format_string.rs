#![no_main]

use libfuzzer_sys::fuzz_target;
use sugarlift_transforms::format_string::{plan, tokenize, Segment};
use sugarlift_transforms::FormatToken;

fuzz_target!(|data: &[u8]| {
    let Some((&count, rest)) = data.split_first() else {
        return;
    };
    let Ok(format) = std::str::from_utf8(rest) else {
        return;
    };

    let tokens = tokenize(format);
    if let Some(pos) = tokens.iter().position(|t| *t == FormatToken::Error) {
        assert_eq!(pos, tokens.len() - 1, "error token must end the stream");
    }

    let count = usize::from(count % 8);
    if let Ok(segments) = plan(format, count) {
        let indices: Vec<usize> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Argument { index, .. } => Some(*index),
                Segment::Text(_) => None,
            })
            .collect();
        assert_eq!(indices, (0..count).collect::<Vec<_>>());
    }
});
