#![no_main]

use interfacegen_parser::lexer::{Lexer, Tok};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let mut lx = Lexer::new(&s);

    let mut max_end = 0usize;
    let mut last_real_end = 0usize;
    let mut steps = 0usize;
    let max_steps = s.len().saturating_mul(4) + 64;

    for (start, tok, end) in lx.by_ref() {
        assert!(start <= end);
        assert!(end <= s.len());

        // Inserted semicolons are empty; a semicolon before a multi-line
        // block comment sits at the comment start.
        let injected = matches!(tok, Tok::Semi) && start == end;

        assert!(start >= last_real_end);
        if !injected {
            last_real_end = end;
            assert!(end >= max_end);
        }
        if let Tok::Comment(text) = tok {
            assert!(text.starts_with("//") || text.starts_with("/*"));
        }

        max_end = max_end.max(end);

        steps += 1;
        assert!(steps <= max_steps);
    }
    let _ = lx.take_diags();
});
