#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let lexed = lv6::lexer::lex(s);
        if !lexed.truncated && s.is_ascii() {
            assert_eq!(lexed.reconstruct(s), s);
        }
    }
});
