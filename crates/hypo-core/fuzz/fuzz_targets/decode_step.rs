#![no_main]

use hypo_core::{
    checked_address, run, CoreConfig, CoreState, Decoder, ErrorPolicy, Word, MEMORY_SIZE,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 9 {
        return;
    }

    let strict = data[0] & 1 == 1;
    let words: Vec<Word> = data[1..]
        .chunks_exact(8)
        .take(MEMORY_SIZE)
        .map(|chunk| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            Word::from_le_bytes(bytes)
        })
        .collect();

    for word in &words {
        let decoded = Decoder::decode(*word);
        assert_eq!(decoded.encode(), *word);
        let _ = checked_address(*word);
    }

    let config = CoreConfig {
        error_policy: if strict {
            ErrorPolicy::Halt
        } else {
            ErrorPolicy::Continue
        },
        max_steps: Some(1_024),
        ..CoreConfig::default()
    };
    let mut state = CoreState::with_config(&config);
    state.memory[..words.len()].copy_from_slice(&words);
    let _ = run(&mut state, &config);
});
