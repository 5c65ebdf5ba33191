#![no_main]

use interfacegen_parser::ast::Decl;
use interfacegen_parser::{parse_source, printer, LineIndex};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };

    match parse_source(src) {
        Ok(file) => {
            for decl in &file.decls {
                if let Decl::Func(func) = decl {
                    assert!(func.raw_params.starts_with('('));
                    let _ = printer::print_signature(&func.sig);
                }
            }
        }
        Err(failure) => {
            assert!(!failure.diags.is_empty());
            let lines = LineIndex::new(src);
            for d in &failure.diags {
                assert!(d.span.start as usize <= src.len());
                let _ = lines.line_col(d.span.start as usize);
            }
        }
    }
});
